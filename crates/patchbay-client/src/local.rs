//! In-process server.
//!
//! [`LocalServer`] owns a [`Registry`] behind one `parking_lot::Mutex`. Each
//! mutation runs under the lock and, before the lock is released, the
//! registry's outbox is fanned out to the per-client queues. Every client
//! therefore sees notifications in the same global order, and a notification
//! caused by a call is queued before that call returns.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use patchbay_config::ServerConfig;
use patchbay_core::{
    ClientId, ClientState, Direction, Limits, NamePolicy, PortFilter, PortFlags, PortId,
    PortInfo, PortType, Registry, Result,
};

use crate::queue::{EventSender, event_channel};
use crate::transport::{Session, Transport};

#[derive(Debug)]
struct ServerState {
    registry: Registry,
    queues: HashMap<ClientId, EventSender>,
}

impl ServerState {
    /// Moves pending notifications into the client queues.
    fn flush(&mut self) {
        for delivery in self.registry.take_outbox() {
            let kind = delivery.notification.kind();
            match self.queues.get(&delivery.client) {
                Some(queue) => {
                    if !queue.send(delivery.notification) {
                        tracing::warn!(client = %delivery.client, %kind, "client queue closed, notification dropped");
                    }
                }
                None => {
                    tracing::warn!(client = %delivery.client, %kind, "no queue for client, notification dropped");
                }
            }
        }
    }
}

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct Shared {
    instance: u64,
    name: String,
    state: Mutex<ServerState>,
}

/// A server living in this process. Cloning shares the same server.
#[derive(Debug, Clone)]
pub struct LocalServer {
    inner: Arc<Shared>,
}

impl Default for LocalServer {
    fn default() -> Self {
        Self::new(patchbay_config::DEFAULT_SERVER_NAME, Limits::default())
    }
}

impl LocalServer {
    /// Create a running server.
    pub fn new(name: impl Into<String>, limits: Limits) -> Self {
        let name = name.into();
        tracing::info!(server = %name, "server started");
        Self {
            inner: Arc::new(Shared {
                instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
                name,
                state: Mutex::new(ServerState {
                    registry: Registry::new(limits),
                    queues: HashMap::new(),
                }),
            }),
        }
    }

    /// Create a server from a loaded configuration.
    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.name.clone(), config.limits())
    }

    /// Name of the server.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns `false` after [`shutdown`](Self::shutdown).
    pub fn is_running(&self) -> bool {
        self.inner.state.lock().registry.is_running()
    }

    /// Names of the clients currently holding a record.
    pub fn client_names(&self) -> Vec<String> {
        self.inner.state.lock().registry.client_names()
    }

    /// Stop the server.
    ///
    /// Every open client is marked shut down before this returns, so any later
    /// call on it fails with [`Error::ClientClosed`](patchbay_core::Error::ClientClosed), and is sent a
    /// `Shutdown` notification. Clients are not closed; their owners close them.
    pub fn shutdown(&self, reason: &str) {
        let mut state = self.inner.state.lock();
        state.registry.shutdown(reason);
        state.flush();
    }

    /// Run `op` under the lock, then fan out its notifications.
    fn mutate<T>(&self, op: impl FnOnce(&mut Registry) -> Result<T>) -> Result<T> {
        let mut state = self.inner.state.lock();
        let result = op(&mut state.registry);
        state.flush();
        result
    }

    fn query<T>(&self, op: impl FnOnce(&Registry) -> T) -> T {
        op(&self.inner.state.lock().registry)
    }
}

impl Transport for LocalServer {
    fn server_name(&self) -> &str {
        self.name()
    }

    fn instance_id(&self) -> u64 {
        self.inner.instance
    }

    fn open_client(&self, name: &str, policy: NamePolicy) -> Result<Session> {
        let mut state = self.inner.state.lock();
        let (id, name) = state.registry.open_client(name, policy)?;
        let (sender, events) = event_channel();
        state.queues.insert(id, sender);
        Ok(Session { id, name, events })
    }

    fn close_client(&self, client: ClientId) {
        let mut state = self.inner.state.lock();
        state.registry.close_client(client);
        state.flush();
        // Ends the client's stream once it has drained.
        state.queues.remove(&client);
    }

    fn client_state(&self, client: ClientId) -> ClientState {
        self.query(|r| r.client_state(client))
    }

    fn activate(&self, client: ClientId) -> Result<()> {
        self.mutate(|r| r.activate(client))
    }

    fn deactivate(&self, client: ClientId) -> Result<()> {
        self.mutate(|r| r.deactivate(client))
    }

    fn register_port(
        &self,
        client: ClientId,
        short_name: &str,
        port_type: PortType,
        direction: Direction,
        flags: PortFlags,
    ) -> Result<PortInfo> {
        self.mutate(|r| r.register_port(client, short_name, port_type, direction, flags))
    }

    fn unregister_port(&self, client: ClientId, port: PortId) -> Result<()> {
        self.mutate(|r| r.unregister_port(client, port))
    }

    fn rename_port(&self, client: ClientId, port: PortId, short_name: &str) -> Result<PortInfo> {
        self.mutate(|r| r.rename_port(client, port, short_name))
    }

    fn set_alias(&self, client: ClientId, port: PortId, alias: &str) -> Result<()> {
        self.mutate(|r| r.set_alias(client, port, alias))
    }

    fn unset_alias(&self, client: ClientId, port: PortId, alias: &str) -> Result<()> {
        self.mutate(|r| r.unset_alias(client, port, alias))
    }

    fn connect(&self, client: ClientId, source: PortId, sink: PortId) -> Result<()> {
        self.mutate(|r| r.connect(client, source, sink))
    }

    fn disconnect(&self, client: ClientId, source: PortId, sink: PortId) -> Result<()> {
        self.mutate(|r| r.disconnect(client, source, sink))
    }

    fn connect_by_name(&self, client: ClientId, source: &str, sink: &str) -> Result<()> {
        self.mutate(|r| r.connect_by_name(client, source, sink))
    }

    fn disconnect_by_name(&self, client: ClientId, source: &str, sink: &str) -> Result<()> {
        self.mutate(|r| r.disconnect_by_name(client, source, sink))
    }

    fn port(&self, port: PortId) -> Option<PortInfo> {
        self.query(|r| r.port(port).cloned())
    }

    fn find_port(&self, name: &str) -> Option<PortInfo> {
        self.query(|r| r.find_port(name).cloned())
    }

    fn ports(&self, filter: &PortFilter) -> Vec<PortInfo> {
        self.query(|r| r.ports(filter))
    }

    fn peers(&self, port: PortId) -> Vec<PortInfo> {
        self.query(|r| r.peers(port))
    }

    fn is_connected(&self, port: PortId) -> bool {
        self.query(|r| r.is_connected(port))
    }

    fn is_connected_to(&self, a: PortId, b: PortId) -> bool {
        self.query(|r| r.is_connected_to(a, b))
    }
}
