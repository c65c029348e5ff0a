//! Notification thread.
//!
//! One thread per client, named `patchbay-dispatch-<client>`, drains the
//! client's queue in order and hands each notification to the callback
//! table. It holds only a weak reference to the client: once every handle is
//! gone, remaining notifications are received and discarded. The thread exits
//! when the server drops the client's queue and the queue is empty.

use std::sync::Weak;
use std::thread::{self, JoinHandle};

use patchbay_core::{Error, Result};

use crate::callbacks;
use crate::client::{Client, ClientInner};
use crate::queue::EventStream;

/// Start the notification thread for `client`.
pub(crate) fn spawn(name: &str, events: EventStream, client: Weak<ClientInner>) -> Result<JoinHandle<()>> {
    let span_name = name.to_string();
    thread::Builder::new()
        .name(format!("patchbay-dispatch-{name}"))
        .spawn(move || run(&span_name, &events, &client))
        .map_err(|e| Error::ThreadSpawn(e.to_string()))
}

fn run(name: &str, events: &EventStream, client: &Weak<ClientInner>) {
    let span = tracing::debug_span!("dispatcher", client = %name);
    let _enter = span.enter();
    tracing::debug!("dispatcher started");

    while let Some(notification) = events.recv() {
        if let Some(inner) = client.upgrade() {
            let client = Client::from_inner(inner);
            callbacks::dispatch(client.callback_table(), &client, &notification);
        } else {
            tracing::trace!(kind = %notification.kind(), "client gone, notification discarded");
        }
        events.done();
    }

    tracing::debug!("dispatcher stopped");
}
