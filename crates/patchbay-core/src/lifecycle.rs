//! Client lifecycle state machine.
//!
//! ```text
//! Created ──activate──▶ Activated ──deactivate──▶ Deactivated
//!    │                     ▲                           │
//!    │                     └────────activate───────────┘
//!    └──────────── close (any state) ──────────▶ Closed
//!          server shutdown (any open state) ──▶ ShutdownReceived
//! ```
//!
//! `Closed` and `ShutdownReceived` are both dead: every later operation fails
//! with [`Error::ClientClosed`]. A shut-down client can still be closed, which
//! releases its handle-side resources.

use core::fmt;

use crate::error::{Error, Result};

/// Lifecycle state of a client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClientState {
    /// Opened, not yet activated. Ports may be registered.
    #[default]
    Created,
    /// Receiving notifications.
    Activated,
    /// Previously active, notifications paused.
    Deactivated,
    /// Closed by the caller. Terminal.
    Closed,
    /// The server shut down while the client was open.
    ShutdownReceived,
}

impl ClientState {
    /// Returns `true` for `Closed` and `ShutdownReceived`.
    pub fn is_dead(self) -> bool {
        matches!(self, ClientState::Closed | ClientState::ShutdownReceived)
    }

    /// Fails with [`Error::ClientClosed`] if the client is dead.
    pub fn ensure_live(self) -> Result<()> {
        if self.is_dead() {
            Err(Error::ClientClosed)
        } else {
            Ok(())
        }
    }

    /// Returns `true` if graph notifications should be enqueued for the client.
    pub fn receives_notifications(self) -> bool {
        self == ClientState::Activated
    }

    /// `Created | Deactivated → Activated`.
    pub fn activate(self) -> Result<Self> {
        match self {
            ClientState::Created | ClientState::Deactivated => Ok(ClientState::Activated),
            ClientState::Activated => Err(Error::AlreadyActive),
            ClientState::Closed | ClientState::ShutdownReceived => Err(Error::ClientClosed),
        }
    }

    /// `Activated → Deactivated`. Created and Deactivated stay where they are.
    pub fn deactivate(self) -> Result<Self> {
        match self {
            ClientState::Activated => Ok(ClientState::Deactivated),
            ClientState::Created | ClientState::Deactivated => Ok(self),
            ClientState::Closed | ClientState::ShutdownReceived => Err(Error::ClientClosed),
        }
    }

    /// Any state → `Closed`.
    pub fn close(self) -> Self {
        ClientState::Closed
    }

    /// Any open state → `ShutdownReceived`. A closed client stays closed.
    pub fn shutdown(self) -> Self {
        match self {
            ClientState::Closed => ClientState::Closed,
            _ => ClientState::ShutdownReceived,
        }
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClientState::Created => "created",
            ClientState::Activated => "activated",
            ClientState::Deactivated => "deactivated",
            ClientState::Closed => "closed",
            ClientState::ShutdownReceived => "shutdown",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_transitions() {
        assert_eq!(ClientState::Created.activate(), Ok(ClientState::Activated));
        assert_eq!(ClientState::Deactivated.activate(), Ok(ClientState::Activated));
        assert_eq!(ClientState::Activated.activate(), Err(Error::AlreadyActive));
        assert_eq!(ClientState::Closed.activate(), Err(Error::ClientClosed));
        assert_eq!(ClientState::ShutdownReceived.activate(), Err(Error::ClientClosed));
    }

    #[test]
    fn deactivate_transitions() {
        assert_eq!(ClientState::Activated.deactivate(), Ok(ClientState::Deactivated));
        assert_eq!(ClientState::Created.deactivate(), Ok(ClientState::Created));
        assert_eq!(ClientState::Deactivated.deactivate(), Ok(ClientState::Deactivated));
        assert_eq!(ClientState::Closed.deactivate(), Err(Error::ClientClosed));
    }

    #[test]
    fn shutdown_does_not_reopen_closed() {
        assert_eq!(ClientState::Activated.shutdown(), ClientState::ShutdownReceived);
        assert_eq!(ClientState::Created.shutdown(), ClientState::ShutdownReceived);
        assert_eq!(ClientState::Closed.shutdown(), ClientState::Closed);
    }

    #[test]
    fn only_active_clients_receive_notifications() {
        assert!(ClientState::Activated.receives_notifications());
        for state in [
            ClientState::Created,
            ClientState::Deactivated,
            ClientState::Closed,
            ClientState::ShutdownReceived,
        ] {
            assert!(!state.receives_notifications(), "{state}");
        }
    }

    #[test]
    fn dead_states() {
        assert!(ClientState::Closed.ensure_live().is_err());
        assert!(ClientState::ShutdownReceived.ensure_live().is_err());
        assert!(ClientState::Deactivated.ensure_live().is_ok());
    }
}
