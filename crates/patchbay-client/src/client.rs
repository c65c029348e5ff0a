//! Client handles.
//!
//! A [`Client`] is a cheap, cloneable handle to one named participant on a
//! server. All clones share the same state; the client is closed by
//! [`Client::close`] or when the last handle (including [`Port`] handles and
//! the handle lent to a running callback) is dropped.
//!
//! Callbacks that capture a clone of their own client keep it alive until
//! [`Client::close`] is called, which drops every registered callback.

use core::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use patchbay_config::ClientConfig;
use patchbay_core::{
    ClientId, ClientState, Direction, Error, NamePolicy, PortFilter, PortFlags, PortId, PortInfo,
    PortType, Result,
};

use crate::callbacks::CallbackRegistry;
use crate::dispatcher;
use crate::port::Port;
use crate::process::ProcessHandler;
use crate::queue::Pending;
use crate::transport::Transport;

/// How a client is opened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// What to do when the requested name is taken.
    pub name_policy: NamePolicy,
    /// Refuse to open unless the server has this name.
    pub server_name: Option<String>,
}

impl ClientOptions {
    /// Default options: disambiguate taken names, any server.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with [`Error::NameConflict`] instead of taking a suffixed name.
    pub fn exact_name(mut self) -> Self {
        self.name_policy = NamePolicy::Exact;
        self
    }

    /// Require the server to have this name.
    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }
}

impl From<&ClientConfig> for ClientOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            name_policy: config.name_policy(),
            server_name: config.server_name.clone(),
        }
    }
}

pub(crate) struct ClientInner {
    id: ClientId,
    name: String,
    transport: Arc<dyn Transport>,
    callbacks: Mutex<CallbackRegistry>,
    process: Mutex<Option<Box<dyn ProcessHandler>>>,
    closed: AtomicBool,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    pending: Arc<Pending>,
}

impl ClientInner {
    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let handlers = self.callbacks.lock().clear();
        let process = self.process.lock().take();
        drop(handlers);
        drop(process);

        self.transport.close_client(self.id);
        tracing::debug!(client = %self.name, "client handle closed");

        let handle = self.dispatcher.lock().take();
        if let Some(handle) = handle {
            // From inside a callback the thread winds down on its own.
            if handle.thread().id() != thread::current().id() && handle.join().is_err() {
                tracing::error!(client = %self.name, "notification thread panicked");
            }
        }
    }
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        self.close();
    }
}

/// A named participant on a server.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    /// Open a client on `server`.
    ///
    /// The effective name may differ from `name` under
    /// [`NamePolicy::Disambiguate`]; read it back with [`Client::name`].
    pub fn open<T>(server: T, name: &str, options: ClientOptions) -> Result<Client>
    where
        T: Transport + 'static,
    {
        Self::open_with(Arc::new(server), name, options)
    }

    /// Open a client through an already shared transport.
    pub fn open_with(transport: Arc<dyn Transport>, name: &str, options: ClientOptions) -> Result<Client> {
        if let Some(wanted) = &options.server_name
            && wanted != transport.server_name()
        {
            return Err(Error::ServerUnavailable);
        }

        let session = transport.open_client(name, options.name_policy)?;
        let pending = session.events.pending();
        let inner = Arc::new(ClientInner {
            id: session.id,
            name: session.name,
            transport,
            callbacks: Mutex::new(CallbackRegistry::default()),
            process: Mutex::new(None),
            closed: AtomicBool::new(false),
            dispatcher: Mutex::new(None),
            pending,
        });

        // On failure `inner` drops here and closes the server-side client.
        let handle = dispatcher::spawn(&inner.name, session.events, Arc::downgrade(&inner))?;
        *inner.dispatcher.lock() = Some(handle);

        Ok(Client { inner })
    }

    pub(crate) fn from_inner(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.inner.transport.as_ref()
    }

    pub(crate) fn callback_table(&self) -> &Mutex<CallbackRegistry> {
        &self.inner.callbacks
    }

    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.inner.closed.load(Ordering::Acquire) {
            return Err(Error::ClientClosed);
        }
        self.transport().client_state(self.inner.id).ensure_live()
    }

    /// Effective client name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Server-assigned client ID.
    pub fn id(&self) -> ClientId {
        self.inner.id
    }

    /// Name of the server the client is on.
    pub fn server_name(&self) -> &str {
        self.transport().server_name()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ClientState {
        if self.inner.closed.load(Ordering::Acquire) {
            return ClientState::Closed;
        }
        self.transport().client_state(self.inner.id)
    }

    /// Returns `true` while notifications are delivered.
    pub fn is_active(&self) -> bool {
        self.state() == ClientState::Activated
    }

    /// Start receiving notifications.
    pub fn activate(&self) -> Result<()> {
        self.ensure_live()?;
        self.transport().activate(self.inner.id)
    }

    /// Stop receiving notifications. A no-op unless active.
    pub fn deactivate(&self) -> Result<()> {
        self.ensure_live()?;
        self.transport().deactivate(self.inner.id)
    }

    /// Close the client.
    ///
    /// Unregisters every owned port (other clients see the disconnections and
    /// unregistrations), drops every callback, and stops the notification
    /// thread once it has delivered what was already queued. Closing twice is
    /// a no-op. Safe to call from inside a callback.
    pub fn close(&self) {
        self.inner.close();
    }

    // --- ports ---

    /// Register a port owned by this client.
    pub fn register_port(
        &self,
        short_name: &str,
        port_type: PortType,
        direction: Direction,
        flags: PortFlags,
    ) -> Result<Port> {
        self.ensure_live()?;
        let info = self
            .transport()
            .register_port(self.inner.id, short_name, port_type, direction, flags)?;
        Ok(Port::from_info(self, &info))
    }

    /// Unregister a port owned by this client, disconnecting it first.
    pub fn unregister_port(&self, port: &Port) -> Result<()> {
        self.ensure_live()?;
        self.check_server(port)?;
        self.transport().unregister_port(self.inner.id, port.id())
    }

    /// Every port on the server matching `filter`, in registration order.
    pub fn get_ports(&self, filter: &PortFilter) -> Result<Vec<PortInfo>> {
        self.ensure_live()?;
        Ok(self.transport().ports(filter))
    }

    /// Look a port up by full name or alias.
    pub fn port_by_name(&self, name: &str) -> Result<Option<Port>> {
        self.ensure_live()?;
        Ok(self
            .transport()
            .find_port(name)
            .map(|info| Port::from_info(self, &info)))
    }

    /// Look a port up by ID.
    pub fn port_by_id(&self, id: PortId) -> Result<Option<Port>> {
        self.ensure_live()?;
        Ok(self
            .transport()
            .port(id)
            .map(|info| Port::from_info(self, &info)))
    }

    // --- connections ---

    /// Connect an output port to an input port. Any two ports on the server
    /// may be connected, whoever owns them.
    pub fn connect(&self, source: &Port, sink: &Port) -> Result<()> {
        self.ensure_live()?;
        self.check_server(source)?;
        self.check_server(sink)?;
        self.transport().connect(self.inner.id, source.id(), sink.id())
    }

    /// Remove the connection from `source` to `sink`.
    pub fn disconnect(&self, source: &Port, sink: &Port) -> Result<()> {
        self.ensure_live()?;
        self.check_server(source)?;
        self.check_server(sink)?;
        self.transport().disconnect(self.inner.id, source.id(), sink.id())
    }

    /// Connect two ports by full name or alias.
    pub fn connect_by_name(&self, source: &str, sink: &str) -> Result<()> {
        self.ensure_live()?;
        self.transport().connect_by_name(self.inner.id, source, sink)
    }

    /// Disconnect two ports by full name or alias.
    pub fn disconnect_by_name(&self, source: &str, sink: &str) -> Result<()> {
        self.ensure_live()?;
        self.transport().disconnect_by_name(self.inner.id, source, sink)
    }

    /// Returns `true` if `port` has any connection.
    pub fn is_connected(&self, port: &Port) -> Result<bool> {
        self.ensure_live()?;
        self.check_server(port)?;
        Ok(self.transport().is_connected(port.id()))
    }

    /// Returns `true` if `a` and `b` are connected to each other.
    pub fn is_connected_to(&self, a: &Port, b: &Port) -> Result<bool> {
        self.ensure_live()?;
        self.check_server(a)?;
        self.check_server(b)?;
        Ok(self.transport().is_connected_to(a.id(), b.id()))
    }

    /// Ports connected to `port`, in connection order.
    pub fn get_connections(&self, port: &Port) -> Result<Vec<PortInfo>> {
        self.ensure_live()?;
        self.check_server(port)?;
        Ok(self.transport().peers(port.id()))
    }

    fn check_server(&self, port: &Port) -> Result<()> {
        if port.client().transport().instance_id() == self.transport().instance_id() {
            Ok(())
        } else {
            Err(Error::PortNotFound(port.id().to_string()))
        }
    }

    // --- callbacks ---

    /// Call `callback` for every port registered on the server.
    ///
    /// Replaces a combined registration callback. `context` is passed to every call.
    pub fn set_port_registered_callback<C, F>(&self, context: C, mut callback: F) -> Result<()>
    where
        C: Send + 'static,
        F: FnMut(&Client, &PortInfo, &C) + Send + 'static,
    {
        self.ensure_live()?;
        self.inner
            .callbacks
            .lock()
            .set_registered(Some(Box::new(move |client, port| {
                callback(client, port, &context)
            })));
        Ok(())
    }

    /// Call `callback` for every port unregistered on the server.
    ///
    /// By the time the callback runs the port is already gone from the
    /// server: [`Client::port_by_id`] returns `None` and [`Port`] handles to it
    /// fail. The `PortInfo` argument is the port's last snapshot, taken while
    /// it was still registered. Replaces a combined registration callback.
    pub fn set_port_unregistered_callback<C, F>(&self, context: C, mut callback: F) -> Result<()>
    where
        C: Send + 'static,
        F: FnMut(&Client, &PortInfo, &C) + Send + 'static,
    {
        self.ensure_live()?;
        self.inner
            .callbacks
            .lock()
            .set_unregistered(Some(Box::new(move |client, port| {
                callback(client, port, &context)
            })));
        Ok(())
    }

    /// Call `callback` for every registration (`true`) and unregistration (`false`).
    ///
    /// Unregistrations behave as with
    /// [`set_port_unregistered_callback`](Self::set_port_unregistered_callback).
    /// Replaces both split registration callbacks.
    pub fn set_port_registration_callback<C, F>(&self, context: C, mut callback: F) -> Result<()>
    where
        C: Send + 'static,
        F: FnMut(&Client, &PortInfo, bool, &C) + Send + 'static,
    {
        self.ensure_live()?;
        self.inner
            .callbacks
            .lock()
            .set_registration(Some(Box::new(move |client, port, registered| {
                callback(client, port, registered, &context)
            })));
        Ok(())
    }

    /// Call `callback(client, port, old_name, new_name, context)` on every rename.
    pub fn set_port_renamed_callback<C, F>(&self, context: C, mut callback: F) -> Result<()>
    where
        C: Send + 'static,
        F: FnMut(&Client, &PortInfo, &str, &str, &C) + Send + 'static,
    {
        self.ensure_live()?;
        self.inner
            .callbacks
            .lock()
            .renamed
            .set(Some(Box::new(move |client, port, old, new| {
                callback(client, port, old, new, &context)
            })));
        Ok(())
    }

    /// Call `callback(client, source, sink, context)` on every new connection.
    pub fn set_ports_connected_callback<C, F>(&self, context: C, mut callback: F) -> Result<()>
    where
        C: Send + 'static,
        F: FnMut(&Client, &PortInfo, &PortInfo, &C) + Send + 'static,
    {
        self.ensure_live()?;
        self.inner
            .callbacks
            .lock()
            .connected
            .set(Some(Box::new(move |client, source, sink| {
                callback(client, source, sink, &context)
            })));
        Ok(())
    }

    /// Call `callback(client, source, sink, context)` on every removed connection.
    pub fn set_ports_disconnected_callback<C, F>(&self, context: C, mut callback: F) -> Result<()>
    where
        C: Send + 'static,
        F: FnMut(&Client, &PortInfo, &PortInfo, &C) + Send + 'static,
    {
        self.ensure_live()?;
        self.inner
            .callbacks
            .lock()
            .disconnected
            .set(Some(Box::new(move |client, source, sink| {
                callback(client, source, sink, &context)
            })));
        Ok(())
    }

    /// Call `callback(client, reason, context)` when the server shuts down.
    ///
    /// The client is already unusable when this runs; close it from here or later.
    pub fn set_shutdown_callback<C, F>(&self, context: C, mut callback: F) -> Result<()>
    where
        C: Send + 'static,
        F: FnMut(&Client, &str, &C) + Send + 'static,
    {
        self.ensure_live()?;
        self.inner
            .callbacks
            .lock()
            .shutdown
            .set(Some(Box::new(move |client, reason| {
                callback(client, reason, &context)
            })));
        Ok(())
    }

    /// Remove the split-mode registered callback.
    pub fn clear_port_registered_callback(&self) {
        self.inner.callbacks.lock().set_registered(None);
    }

    /// Remove the split-mode unregistered callback.
    pub fn clear_port_unregistered_callback(&self) {
        self.inner.callbacks.lock().set_unregistered(None);
    }

    /// Remove the combined registration callback.
    pub fn clear_port_registration_callback(&self) {
        self.inner.callbacks.lock().set_registration(None);
    }

    /// Remove the rename callback.
    pub fn clear_port_renamed_callback(&self) {
        self.inner.callbacks.lock().renamed.set(None);
    }

    /// Remove the connected callback.
    pub fn clear_ports_connected_callback(&self) {
        self.inner.callbacks.lock().connected.set(None);
    }

    /// Remove the disconnected callback.
    pub fn clear_ports_disconnected_callback(&self) {
        self.inner.callbacks.lock().disconnected.set(None);
    }

    /// Remove the shutdown callback.
    pub fn clear_shutdown_callback(&self) {
        self.inner.callbacks.lock().shutdown.set(None);
    }

    // --- process ---

    /// Register the real-time process handler.
    ///
    /// Only allowed before activation: fails with [`Error::AlreadyActive`]
    /// while the client is active.
    pub fn set_process_callback<P>(&self, handler: P) -> Result<()>
    where
        P: ProcessHandler + 'static,
    {
        self.ensure_live()?;
        if self.is_active() {
            return Err(Error::AlreadyActive);
        }
        *self.inner.process.lock() = Some(Box::new(handler));
        Ok(())
    }

    /// Hand the process handler to a driver.
    pub fn take_process_callback(&self) -> Option<Box<dyn ProcessHandler>> {
        self.inner.process.lock().take()
    }

    // --- test support ---

    /// Block until every notification queued so far has been handled, or
    /// `timeout` elapses. Returns `true` if idle.
    ///
    /// Calling this from inside a callback waits for the full timeout.
    pub fn wait_for_idle(&self, timeout: Duration) -> bool {
        self.inner.pending.wait_idle(timeout)
    }
}

impl PartialEq for Client {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Client {}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("server", &self.server_name())
            .finish_non_exhaustive()
    }
}
