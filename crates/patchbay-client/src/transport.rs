//! Transport boundary between a client and its server.
//!
//! [`Transport`] is everything a [`Client`](crate::Client) needs from a
//! server: open and close a named client, lifecycle requests, graph mutations,
//! and queries. It is object safe so clients hold an `Arc<dyn Transport>` and
//! never see the concrete server type.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │       Client / Port          │
//! └──────────────┬───────────────┘
//!                │ Arc<dyn Transport>
//!                ▼
//! ┌──────────────────────────────┐
//! │       Transport trait        │
//! └──────────────┬───────────────┘
//!                │ implemented by
//!                ▼
//! ┌──────────────────────────────┐
//! │ LocalServer (in-process)     │
//! └──────────────────────────────┘
//! ```
//!
//! Every call is a synchronous round trip. Mutations take the calling
//! client's ID; queries see the whole server.

use patchbay_core::{
    ClientId, ClientState, Direction, NamePolicy, PortFilter, PortFlags, PortId, PortInfo,
    PortType, Result,
};

use crate::queue::EventStream;

/// A client opened on a server.
#[derive(Debug)]
pub struct Session {
    /// Server-assigned client ID.
    pub id: ClientId,
    /// Effective client name.
    pub name: String,
    /// The client's notifications, in server order.
    pub events: EventStream,
}

/// Requests a client can make of its server.
pub trait Transport: Send + Sync {
    /// Name of the server.
    fn server_name(&self) -> &str;

    /// Identifies this server instance within the process.
    fn instance_id(&self) -> u64;

    /// Open a client. The returned stream ends after [`close_client`](Self::close_client).
    fn open_client(&self, name: &str, policy: NamePolicy) -> Result<Session>;

    /// Close a client, unregistering its ports. Closing twice is a no-op.
    fn close_client(&self, client: ClientId);

    /// Current lifecycle state of a client.
    fn client_state(&self, client: ClientId) -> ClientState;

    /// Start notification delivery.
    fn activate(&self, client: ClientId) -> Result<()>;

    /// Stop notification delivery.
    fn deactivate(&self, client: ClientId) -> Result<()>;

    /// Register a port owned by `client`.
    fn register_port(
        &self,
        client: ClientId,
        short_name: &str,
        port_type: PortType,
        direction: Direction,
        flags: PortFlags,
    ) -> Result<PortInfo>;

    /// Unregister a port owned by `client`.
    fn unregister_port(&self, client: ClientId, port: PortId) -> Result<()>;

    /// Change a port's short name.
    fn rename_port(&self, client: ClientId, port: PortId, short_name: &str) -> Result<PortInfo>;

    /// Add an alias to a port.
    fn set_alias(&self, client: ClientId, port: PortId, alias: &str) -> Result<()>;

    /// Remove an alias from a port.
    fn unset_alias(&self, client: ClientId, port: PortId, alias: &str) -> Result<()>;

    /// Connect an output to an input.
    fn connect(&self, client: ClientId, source: PortId, sink: PortId) -> Result<()>;

    /// Remove a connection.
    fn disconnect(&self, client: ClientId, source: PortId, sink: PortId) -> Result<()>;

    /// Connect two ports by full name or alias.
    fn connect_by_name(&self, client: ClientId, source: &str, sink: &str) -> Result<()>;

    /// Disconnect two ports by full name or alias.
    fn disconnect_by_name(&self, client: ClientId, source: &str, sink: &str) -> Result<()>;

    /// Snapshot of a port.
    fn port(&self, port: PortId) -> Option<PortInfo>;

    /// Look a port up by full name or alias.
    fn find_port(&self, name: &str) -> Option<PortInfo>;

    /// Ports matching `filter`, in registration order.
    fn ports(&self, filter: &PortFilter) -> Vec<PortInfo>;

    /// Ports connected to `port`, in connection order.
    fn peers(&self, port: PortId) -> Vec<PortInfo>;

    /// Whether `port` has any connection.
    fn is_connected(&self, port: PortId) -> bool;

    /// Whether `a` and `b` are connected to each other.
    fn is_connected_to(&self, a: PortId, b: PortId) -> bool;
}
