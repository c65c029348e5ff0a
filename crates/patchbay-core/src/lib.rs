//! Patchbay Core - port graph model for a JACK-style routing server
//!
//! This crate holds the server-side state of an audio/MIDI routing server as
//! plain data structures: named clients, the ports they own, and the global
//! graph of connections between those ports. It has no threads and no locks;
//! `patchbay-client` wraps a [`Registry`] in a lock and delivers its
//! notifications.
//!
//! # Core Abstractions
//!
//! - [`name`] - Naming rules for clients, ports, and aliases
//! - [`PortInfo`] - Snapshot of a port (identity, direction, type, flags, aliases)
//! - [`ConnectionGraph`] - Output → input edges, in creation order
//! - [`ClientState`] - Client lifecycle state machine
//! - [`Notification`] - Events produced by graph mutations
//! - [`Registry`] - Clients, ports, and connections of one server
//! - [`PortFilter`] - Regex-based port queries
//!
//! # Example
//!
//! ```rust
//! use patchbay_core::{Direction, NamePolicy, PortFlags, PortType, Registry};
//!
//! let mut registry = Registry::default();
//! let (a, _) = registry.open_client("A", NamePolicy::Exact).unwrap();
//! let (b, _) = registry.open_client("B", NamePolicy::Exact).unwrap();
//!
//! let input = registry
//!     .register_port(a, "in1", PortType::Midi, Direction::Input, PortFlags::NONE)
//!     .unwrap();
//! let output = registry
//!     .register_port(b, "out1", PortType::Midi, Direction::Output, PortFlags::NONE)
//!     .unwrap();
//!
//! registry.connect(b, output.id, input.id).unwrap();
//! assert_eq!(registry.peers(input.id)[0].full_name, "B:out1");
//! ```

pub mod error;
pub mod event;
pub mod filter;
pub mod graph;
pub mod lifecycle;
pub mod name;
pub mod port;
pub mod registry;

// Re-export main types at crate root
pub use error::{Error, Result};
pub use event::{Delivery, Notification, NotificationKind};
pub use filter::PortFilter;
pub use graph::{Connection, ConnectionGraph, EdgeId};
pub use lifecycle::ClientState;
pub use name::{Limits, NamePolicy, SEPARATOR};
pub use port::{ClientId, Direction, PortFlags, PortId, PortInfo, PortType};
pub use registry::Registry;
