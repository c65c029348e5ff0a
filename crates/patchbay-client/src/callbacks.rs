//! Per-client callback table.
//!
//! One handler slot per event kind; setting a slot replaces whatever was
//! there. Port registration has two mutually exclusive modes: split (one
//! handler for registered, one for unregistered) and combined (one handler
//! taking a `registered` flag). Installing a handler of one mode clears the
//! other mode. Within split mode the two handlers are independent.
//!
//! Handlers never run under the table's lock. [`dispatch`] takes the handler
//! out of its slot, runs it, and puts it back unless the slot was set or
//! cleared in the meantime, in which case the old handler is dropped after it
//! returns. This lets a handler call any client method, including the
//! setters and `close`.

use std::panic::{AssertUnwindSafe, catch_unwind};

use parking_lot::Mutex;

use patchbay_core::{Notification, PortInfo};

use crate::client::Client;

/// Handler for `PortRegistered` or `PortUnregistered` alone.
pub(crate) type PortHandler = Box<dyn FnMut(&Client, &PortInfo) + Send>;
/// Handler for both registration events, with `registered = true` on registration.
pub(crate) type RegistrationHandler = Box<dyn FnMut(&Client, &PortInfo, bool) + Send>;
/// Handler for `PortRenamed`: port, old full name, new full name.
pub(crate) type RenameHandler = Box<dyn FnMut(&Client, &PortInfo, &str, &str) + Send>;
/// Handler for `PortsConnected` / `PortsDisconnected`: source, sink.
pub(crate) type ConnectionHandler = Box<dyn FnMut(&Client, &PortInfo, &PortInfo) + Send>;
/// Handler for `Shutdown`: reason.
pub(crate) type ShutdownHandler = Box<dyn FnMut(&Client, &str) + Send>;

/// A handler slot with a generation counter bumped on every set or clear.
pub(crate) struct Slot<H> {
    handler: Option<H>,
    generation: u64,
}

impl<H> Default for Slot<H> {
    fn default() -> Self {
        Self {
            handler: None,
            generation: 0,
        }
    }
}

impl<H> Slot<H> {
    pub(crate) fn set(&mut self, handler: Option<H>) {
        self.handler = handler;
        self.generation = self.generation.wrapping_add(1);
    }

    pub(crate) fn is_set(&self) -> bool {
        self.handler.is_some()
    }

    fn take(&mut self) -> Option<(H, u64)> {
        self.handler.take().map(|h| (h, self.generation))
    }

    /// Put a taken handler back. Hands it back if the slot moved on.
    fn restore(&mut self, handler: H, generation: u64) -> Option<H> {
        if self.generation == generation && self.handler.is_none() {
            self.handler = Some(handler);
            None
        } else {
            Some(handler)
        }
    }

    /// Empty the slot, returning the old contents.
    fn retire(&mut self) -> Slot<H> {
        let old = Slot {
            handler: self.handler.take(),
            generation: self.generation,
        };
        self.generation = self.generation.wrapping_add(1);
        old
    }
}

/// Handler table of one client.
#[derive(Default)]
pub(crate) struct CallbackRegistry {
    pub(crate) registered: Slot<PortHandler>,
    pub(crate) unregistered: Slot<PortHandler>,
    pub(crate) registration: Slot<RegistrationHandler>,
    pub(crate) renamed: Slot<RenameHandler>,
    pub(crate) connected: Slot<ConnectionHandler>,
    pub(crate) disconnected: Slot<ConnectionHandler>,
    pub(crate) shutdown: Slot<ShutdownHandler>,
}

impl CallbackRegistry {
    /// Install or clear the split-mode registered handler.
    pub(crate) fn set_registered(&mut self, handler: Option<PortHandler>) {
        if handler.is_some() {
            self.registration.set(None);
        }
        self.registered.set(handler);
    }

    /// Install or clear the split-mode unregistered handler.
    pub(crate) fn set_unregistered(&mut self, handler: Option<PortHandler>) {
        if handler.is_some() {
            self.registration.set(None);
        }
        self.unregistered.set(handler);
    }

    /// Install or clear the combined registration handler.
    pub(crate) fn set_registration(&mut self, handler: Option<RegistrationHandler>) {
        if handler.is_some() {
            self.registered.set(None);
            self.unregistered.set(None);
        }
        self.registration.set(handler);
    }

    /// Empty every slot and hand back the old handlers, so the caller can
    /// drop them after releasing the lock.
    pub(crate) fn clear(&mut self) -> CallbackRegistry {
        CallbackRegistry {
            registered: self.registered.retire(),
            unregistered: self.unregistered.retire(),
            registration: self.registration.retire(),
            renamed: self.renamed.retire(),
            connected: self.connected.retire(),
            disconnected: self.disconnected.retire(),
            shutdown: self.shutdown.retire(),
        }
    }
}

/// Outcome of offering a notification to one slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Empty,
    Handled,
    Panicked,
}

impl Outcome {
    fn or_else(self, f: impl FnOnce() -> Outcome) -> Outcome {
        if self == Outcome::Empty { f() } else { self }
    }
}

/// Runs the handler in the selected slot, if any, without holding the lock.
fn run_slot<H>(
    table: &Mutex<CallbackRegistry>,
    select: fn(&mut CallbackRegistry) -> &mut Slot<H>,
    call: impl FnOnce(&mut H),
) -> Outcome {
    let Some((mut handler, generation)) = select(&mut table.lock()).take() else {
        return Outcome::Empty;
    };
    let result = catch_unwind(AssertUnwindSafe(|| call(&mut handler)));
    let stale = select(&mut table.lock()).restore(handler, generation);
    drop(stale);
    if result.is_ok() {
        Outcome::Handled
    } else {
        Outcome::Panicked
    }
}

/// Deliver one notification to the matching handler.
///
/// A panicking handler is logged and kept; delivery goes on.
pub(crate) fn dispatch(table: &Mutex<CallbackRegistry>, client: &Client, notification: &Notification) {
    let outcome = match notification {
        Notification::PortRegistered { port } => {
            run_slot(table, |r| &mut r.registration, |h| h(client, port, true))
                .or_else(|| run_slot(table, |r| &mut r.registered, |h| h(client, port)))
        }
        Notification::PortUnregistered { port } => {
            run_slot(table, |r| &mut r.registration, |h| h(client, port, false))
                .or_else(|| run_slot(table, |r| &mut r.unregistered, |h| h(client, port)))
        }
        Notification::PortRenamed {
            port,
            old_name,
            new_name,
        } => run_slot(table, |r| &mut r.renamed, |h| h(client, port, old_name.as_str(), new_name.as_str())),
        Notification::PortsConnected { source, sink } => {
            run_slot(table, |r| &mut r.connected, |h| h(client, source, sink))
        }
        Notification::PortsDisconnected { source, sink } => {
            run_slot(table, |r| &mut r.disconnected, |h| h(client, source, sink))
        }
        Notification::Shutdown { reason } => {
            run_slot(table, |r| &mut r.shutdown, |h| h(client, reason.as_str()))
        }
    };
    if outcome == Outcome::Panicked {
        tracing::error!(kind = %notification.kind(), client = %client.name(), "callback panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port_handler() -> Option<PortHandler> {
        Some(Box::new(|_, _| {}))
    }

    fn registration_handler() -> Option<RegistrationHandler> {
        Some(Box::new(|_, _, _| {}))
    }

    #[test]
    fn combined_mode_clears_split_mode() {
        let mut table = CallbackRegistry::default();
        table.set_registered(port_handler());
        table.set_unregistered(port_handler());
        table.set_registration(registration_handler());
        assert!(table.registration.is_set());
        assert!(!table.registered.is_set());
        assert!(!table.unregistered.is_set());
    }

    #[test]
    fn split_mode_clears_combined_but_keeps_its_partner() {
        let mut table = CallbackRegistry::default();
        table.set_registration(registration_handler());
        table.set_unregistered(port_handler());
        table.set_registered(port_handler());
        assert!(!table.registration.is_set());
        assert!(table.registered.is_set());
        assert!(table.unregistered.is_set());
    }

    #[test]
    fn clearing_one_mode_leaves_the_other() {
        let mut table = CallbackRegistry::default();
        table.set_registration(registration_handler());
        table.set_registered(None);
        assert!(table.registration.is_set());
    }

    #[test]
    fn clear_hands_back_old_handlers() {
        let mut table = CallbackRegistry::default();
        table.set_registration(registration_handler());
        let old = table.clear();
        assert!(old.registration.is_set());
        assert!(!table.registration.is_set());
    }

    #[test]
    fn restore_respects_replacement() {
        let mut slot: Slot<u32> = Slot::default();
        slot.set(Some(1));
        let (taken, generation) = slot.take().unwrap();
        slot.set(Some(2));
        slot.restore(taken, generation);
        assert_eq!(slot.handler, Some(2));

        let (taken, generation) = slot.take().unwrap();
        slot.restore(taken, generation);
        assert_eq!(slot.handler, Some(2));

        let (taken, generation) = slot.take().unwrap();
        slot.set(None);
        slot.restore(taken, generation);
        assert_eq!(slot.handler, None);
    }
}
