//! Port handles.

use core::fmt;
use std::hash::{Hash, Hasher};

use patchbay_core::{ClientId, Direction, Error, PortId, PortInfo, PortType, Result};

use crate::client::Client;

/// Handle to a port on a server, seen through one client.
///
/// Direction, type, and flags are fixed at registration and cached; names,
/// aliases, and connections are read from the server on every call. Two
/// handles are equal if they refer to the same port on the same server.
#[derive(Clone)]
pub struct Port {
    id: PortId,
    owner: ClientId,
    direction: Direction,
    port_type: PortType,
    physical: bool,
    terminal: bool,
    client: Client,
}

impl Port {
    pub(crate) fn from_info(client: &Client, info: &PortInfo) -> Self {
        Self {
            id: info.id,
            owner: info.client,
            direction: info.direction,
            port_type: info.port_type.clone(),
            physical: info.flags.physical,
            terminal: info.flags.terminal,
            client: client.clone(),
        }
    }

    /// Server-wide port ID.
    pub fn id(&self) -> PortId {
        self.id
    }

    /// Current snapshot of the port.
    ///
    /// Fails with [`Error::PortNotFound`] once the port is unregistered.
    pub fn info(&self) -> Result<PortInfo> {
        self.client.ensure_live()?;
        self.client
            .transport()
            .port(self.id)
            .ok_or_else(|| Error::PortNotFound(self.id.to_string()))
    }

    /// Full name, `client:short`.
    pub fn name(&self) -> Result<String> {
        Ok(self.info()?.full_name)
    }

    /// Name within the owning client.
    pub fn short_name(&self) -> Result<String> {
        Ok(self.info()?.short_name)
    }

    /// Name of the owning client.
    pub fn client_name(&self) -> Result<String> {
        Ok(self.info()?.client_name)
    }

    /// Aliases: the filled alias slots, in slot order.
    pub fn aliases(&self) -> Result<Vec<String>> {
        Ok(self.info()?.aliases)
    }

    /// Rename the port within its client. Only the owning client may rename.
    pub fn set_short_name(&self, short_name: &str) -> Result<()> {
        self.client.ensure_live()?;
        self.client
            .transport()
            .rename_port(self.client.id(), self.id, short_name)
            .map(|_| ())
    }

    /// Add an alias.
    pub fn set_alias(&self, alias: &str) -> Result<()> {
        self.client.ensure_live()?;
        self.client
            .transport()
            .set_alias(self.client.id(), self.id, alias)
    }

    /// Remove an alias.
    pub fn unset_alias(&self, alias: &str) -> Result<()> {
        self.client.ensure_live()?;
        self.client
            .transport()
            .unset_alias(self.client.id(), self.id, alias)
    }

    /// Data flow direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns `true` if the port receives data.
    pub fn is_input(&self) -> bool {
        self.direction == Direction::Input
    }

    /// Returns `true` if data can be read from the port.
    pub fn is_output(&self) -> bool {
        self.direction == Direction::Output
    }

    /// Data type.
    pub fn port_type(&self) -> &PortType {
        &self.port_type
    }

    /// Hardware-facing port.
    pub fn is_physical(&self) -> bool {
        self.physical
    }

    /// Data originates or terminates here.
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Returns `true` if the client this handle was obtained through owns the port.
    pub fn is_mine(&self) -> bool {
        self.owner == self.client.id()
    }

    /// Ports connected to this one, in connection order.
    pub fn connections(&self) -> Result<Vec<PortInfo>> {
        self.client.get_connections(self)
    }

    /// Returns `true` if the port has any connection.
    pub fn is_connected(&self) -> Result<bool> {
        self.client.is_connected(self)
    }

    /// Returns `true` if this port and `other` are connected to each other.
    pub fn is_connected_to(&self, other: &Port) -> Result<bool> {
        self.client.is_connected_to(self, other)
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    fn server(&self) -> u64 {
        self.client.transport().instance_id()
    }
}

impl PartialEq for Port {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.server() == other.server()
    }
}

impl Eq for Port {}

impl Hash for Port {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.server().hash(state);
        self.id.hash(state);
    }
}

impl fmt::Debug for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.client.transport().port(self.id) {
            Some(info) => write!(f, "{info}"),
            None => f
                .debug_struct("Port")
                .field("id", &self.id)
                .field("direction", &self.direction)
                .field("port_type", &self.port_type)
                .finish_non_exhaustive(),
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
