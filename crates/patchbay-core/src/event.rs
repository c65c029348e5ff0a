//! Graph notifications.

use core::fmt;

use crate::port::{ClientId, PortInfo};

/// An event produced by a server-side mutation.
///
/// Ports are snapshots taken when the event was emitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// A port was registered.
    PortRegistered {
        /// The new port.
        port: PortInfo,
    },
    /// A port was unregistered. The snapshot is the port's last state.
    PortUnregistered {
        /// The removed port.
        port: PortInfo,
    },
    /// A port's short name changed.
    PortRenamed {
        /// The port after the rename.
        port: PortInfo,
        /// Full name before the rename.
        old_name: String,
        /// Full name after the rename.
        new_name: String,
    },
    /// Two ports were connected.
    PortsConnected {
        /// The output port.
        source: PortInfo,
        /// The input port.
        sink: PortInfo,
    },
    /// Two ports were disconnected.
    PortsDisconnected {
        /// The output port.
        source: PortInfo,
        /// The input port.
        sink: PortInfo,
    },
    /// The server shut down.
    Shutdown {
        /// Why the server stopped.
        reason: String,
    },
}

/// Discriminant of a [`Notification`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// [`Notification::PortRegistered`]
    PortRegistered,
    /// [`Notification::PortUnregistered`]
    PortUnregistered,
    /// [`Notification::PortRenamed`]
    PortRenamed,
    /// [`Notification::PortsConnected`]
    PortsConnected,
    /// [`Notification::PortsDisconnected`]
    PortsDisconnected,
    /// [`Notification::Shutdown`]
    Shutdown,
}

impl Notification {
    /// Returns the event's kind.
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::PortRegistered { .. } => NotificationKind::PortRegistered,
            Notification::PortUnregistered { .. } => NotificationKind::PortUnregistered,
            Notification::PortRenamed { .. } => NotificationKind::PortRenamed,
            Notification::PortsConnected { .. } => NotificationKind::PortsConnected,
            Notification::PortsDisconnected { .. } => NotificationKind::PortsDisconnected,
            Notification::Shutdown { .. } => NotificationKind::Shutdown,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationKind::PortRegistered => "port_registered",
            NotificationKind::PortUnregistered => "port_unregistered",
            NotificationKind::PortRenamed => "port_renamed",
            NotificationKind::PortsConnected => "ports_connected",
            NotificationKind::PortsDisconnected => "ports_disconnected",
            NotificationKind::Shutdown => "shutdown",
        };
        f.write_str(s)
    }
}

/// A notification addressed to one client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    /// Recipient.
    pub client: ClientId,
    /// Payload.
    pub notification: Notification,
}
