//! Port identity, direction, type, and snapshot types.
//!
//! A [`PortInfo`] is an immutable snapshot of a port taken under the registry
//! lock. Notifications carry snapshots, so a `PortUnregistered` payload stays
//! readable after the port itself is gone.

use core::fmt;

/// Unique identifier for a client on a server.
///
/// Client IDs are assigned sequentially and never reused within a registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub(crate) u32);

impl ClientId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientId({})", self.0)
    }
}

/// Unique identifier for a port on a server.
///
/// Port IDs are assigned sequentially and never reused, so ordering by ID is
/// registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId(pub(crate) u32);

impl PortId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PortId({})", self.0)
    }
}

/// Data flow direction of a port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The port receives data.
    Input,
    /// Data can be read from the port.
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => f.write_str("Input"),
            Direction::Output => f.write_str("Output"),
        }
    }
}

/// Data type carried by a port. Two ports are compatible iff their types are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PortType {
    /// Mono 32-bit float audio.
    Audio,
    /// Raw MIDI bytes.
    Midi,
    /// Any other type, identified by its type string.
    Custom(String),
}

impl PortType {
    /// Type string of [`PortType::Audio`].
    pub const AUDIO: &'static str = "32 bit float mono audio";

    /// Type string of [`PortType::Midi`].
    pub const MIDI: &'static str = "8 bit raw midi";

    /// Parse a type string, mapping the two well-known strings to their variants.
    pub fn from_type_str(s: &str) -> Self {
        match s {
            Self::AUDIO => PortType::Audio,
            Self::MIDI => PortType::Midi,
            other => PortType::Custom(other.to_string()),
        }
    }

    /// Returns the type string.
    pub fn as_str(&self) -> &str {
        match self {
            PortType::Audio => Self::AUDIO,
            PortType::Midi => Self::MIDI,
            PortType::Custom(s) => s,
        }
    }

    /// Returns `true` if data can flow between ports of these types.
    pub fn is_compatible(&self, other: &PortType) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flags set at registration time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PortFlags {
    /// The port corresponds to a physical (hardware) connector.
    pub physical: bool,
    /// Data terminates at (input) or originates from (output) this port.
    pub terminal: bool,
}

impl PortFlags {
    /// No flags set.
    pub const NONE: PortFlags = PortFlags {
        physical: false,
        terminal: false,
    };

    /// Set the physical flag.
    pub fn physical(mut self) -> Self {
        self.physical = true;
        self
    }

    /// Set the terminal flag.
    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }
}

/// Snapshot of a port at the time it was read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortInfo {
    /// Port identifier.
    pub id: PortId,
    /// Owning client.
    pub client: ClientId,
    /// Name of the owning client.
    pub client_name: String,
    /// Name unique within the owning client.
    pub short_name: String,
    /// `client_name:short_name`.
    pub full_name: String,
    /// Data flow direction.
    pub direction: Direction,
    /// Data type.
    pub port_type: PortType,
    /// Physical/terminal flags.
    pub flags: PortFlags,
    /// Alternate names: the filled alias slots, in slot order.
    pub aliases: Vec<String>,
}

impl PortInfo {
    /// Returns `true` if the port receives data.
    pub fn is_input(&self) -> bool {
        self.direction == Direction::Input
    }

    /// Returns `true` if data can be read from the port.
    pub fn is_output(&self) -> bool {
        self.direction == Direction::Output
    }

    /// Returns `true` if `name` is the full name or one of the aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.full_name == name || self.aliases.iter().any(|a| a == name)
    }
}

impl fmt::Display for PortInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Port(name = '{}', type = '{}', direction = {}, physical = {}, terminal = {})",
            self.full_name, self.port_type, self.direction, self.flags.physical, self.flags.terminal
        )
    }
}
