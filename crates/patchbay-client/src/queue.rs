//! Per-client notification queue.
//!
//! An unbounded crossbeam channel plus a counter of notifications that were
//! sent but not yet fully handled. The server side holds the [`EventSender`],
//! the client's dispatcher thread holds the [`EventStream`]. Dropping the
//! sender ends the stream once everything already queued has been received.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::{Condvar, Mutex};

use patchbay_core::Notification;

/// Count of in-flight notifications, with a wakeup for waiters.
#[derive(Debug, Default)]
pub(crate) struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Pending {
    fn increment(&self) {
        *self.count.lock() += 1;
    }

    fn decrement(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    /// Blocks until the count reaches zero or `timeout` elapses.
    pub(crate) fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.count.lock();
        while *count > 0 {
            if self.idle.wait_until(&mut count, deadline).timed_out() {
                return *count == 0;
            }
        }
        true
    }
}

/// Server-side end of a client's queue.
#[derive(Debug)]
pub struct EventSender {
    tx: Sender<Notification>,
    pending: Arc<Pending>,
}

impl EventSender {
    /// Queue a notification. Returns `false` if the client's stream is gone.
    pub fn send(&self, notification: Notification) -> bool {
        self.pending.increment();
        if self.tx.send(notification).is_err() {
            self.pending.decrement();
            return false;
        }
        true
    }
}

/// Client-side end of a queue: notifications in server order.
#[derive(Debug)]
pub struct EventStream {
    rx: Receiver<Notification>,
    pending: Arc<Pending>,
}

impl EventStream {
    /// Blocks for the next notification. `None` once the sender is gone and
    /// the queue is drained.
    pub fn recv(&self) -> Option<Notification> {
        self.rx.recv().ok()
    }

    /// Marks one received notification as fully handled.
    pub fn done(&self) {
        self.pending.decrement();
    }

    pub(crate) fn pending(&self) -> Arc<Pending> {
        Arc::clone(&self.pending)
    }
}

/// Create a connected sender/stream pair.
pub fn event_channel() -> (EventSender, EventStream) {
    let (tx, rx) = unbounded();
    let pending = Arc::new(Pending::default());
    (
        EventSender {
            tx,
            pending: Arc::clone(&pending),
        },
        EventStream { rx, pending },
    )
}
