//! Patchbay Client - client runtime for a JACK-style routing server
//!
//! Opens named clients on a server, registers ports, makes connections, and
//! delivers the server's notifications to per-client callbacks on a
//! dedicated thread.
//!
//! # Core Abstractions
//!
//! - [`Client`] - A named participant: lifecycle, ports, connections, callbacks
//! - [`Port`] - Handle to a port, seen through one client
//! - [`Transport`] - What a client needs from a server
//! - [`LocalServer`] - In-process server behind [`Transport`]
//! - [`ProcessHandler`] - Real-time process callback, handed to a driver
//!
//! # Delivery
//!
//! Every active client gets every notification, in the order the server
//! produced it, including notifications about its own ports. Callbacks run
//! one at a time on the client's notification thread and never under a lock,
//! so they may call any client method. A panicking callback is logged and
//! delivery continues.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//!
//! use patchbay_client::{Client, ClientOptions, Direction, LocalServer, PortFlags, PortType};
//!
//! let server = LocalServer::default();
//! let client = Client::open(server.clone(), "synth", ClientOptions::new()).unwrap();
//!
//! let seen = Arc::new(AtomicUsize::new(0));
//! client
//!     .set_port_registered_callback(seen.clone(), |_, _, seen| {
//!         seen.fetch_add(1, Ordering::SeqCst);
//!     })
//!     .unwrap();
//! client.activate().unwrap();
//!
//! let port = client
//!     .register_port("out_l", PortType::Audio, Direction::Output, PortFlags::NONE)
//!     .unwrap();
//! assert!(client.wait_for_idle(Duration::from_secs(5)));
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! assert_eq!(port.name().unwrap(), "synth:out_l");
//!
//! client.close();
//! ```

mod callbacks;
pub mod client;
mod dispatcher;
pub mod local;
pub mod port;
pub mod process;
pub mod queue;
pub mod transport;

// Re-export main types at crate root
pub use client::{Client, ClientOptions};
pub use local::LocalServer;
pub use port::Port;
pub use process::{Control, ProcessHandler, ProcessScope};
pub use queue::{EventSender, EventStream, event_channel};
pub use transport::{Session, Transport};

pub use patchbay_core::{
    ClientId, ClientState, Direction, Error, NamePolicy, Notification, NotificationKind,
    PortFilter, PortFlags, PortId, PortInfo, PortType, Result,
};
