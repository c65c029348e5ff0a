//! Server-global registry of clients, ports, and connections.
//!
//! [`Registry`] is the single source of truth a server holds. Every mutating
//! operation validates, applies, and then appends the resulting notifications
//! to an outbox, addressed to every client that was activated at emission
//! time. The owner of the registry drains the outbox with
//! [`Registry::take_outbox`] while still holding whatever lock serialises the
//! mutation, which gives every client the same global event order.
//!
//! Clients and ports are keyed by sequential IDs that are never reused, and
//! only live entries are stored, so iteration follows open and registration
//! order and closed clients or removed ports cost nothing afterwards.
//!
//! The registry does no locking and spawns no threads.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};
use crate::event::{Delivery, Notification};
use crate::filter::PortFilter;
use crate::graph::{Connection, ConnectionGraph};
use crate::lifecycle::ClientState;
use crate::name::{self, Limits, NamePolicy};
use crate::port::{ClientId, Direction, PortFlags, PortId, PortInfo, PortType};

#[derive(Debug)]
struct ClientRecord {
    name: String,
    state: ClientState,
    /// Owned ports in registration order.
    ports: Vec<PortId>,
}

#[derive(Debug)]
struct PortRecord {
    info: PortInfo,
    /// A freed slot stays empty until the next alias claims it.
    alias_slots: Vec<Option<String>>,
}

impl PortRecord {
    fn sync_aliases(&mut self) {
        self.info.aliases = self.alias_slots.iter().flatten().cloned().collect();
    }
}

/// Clients, ports, and the connection graph of one server.
#[derive(Debug)]
pub struct Registry {
    limits: Limits,
    clients: BTreeMap<ClientId, ClientRecord>,
    ports: BTreeMap<PortId, PortRecord>,
    next_client: u32,
    next_port: u32,
    /// Full name → port.
    by_name: HashMap<String, PortId>,
    graph: ConnectionGraph,
    running: bool,
    outbox: Vec<Delivery>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl Registry {
    /// Creates an empty, running registry.
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            clients: BTreeMap::new(),
            ports: BTreeMap::new(),
            next_client: 0,
            next_port: 0,
            by_name: HashMap::new(),
            graph: ConnectionGraph::with_limit(limits.max_connections_per_port),
            running: true,
            outbox: Vec::new(),
        }
    }

    /// Returns the naming and connection limits.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Returns `false` once [`shutdown`](Self::shutdown) has run.
    pub fn is_running(&self) -> bool {
        self.running
    }

    // --- clients ---

    /// Opens a client and returns its ID and effective name.
    ///
    /// With [`NamePolicy::Disambiguate`] a taken name is replaced by a suffixed
    /// one; with [`NamePolicy::Exact`] it fails with [`Error::NameConflict`].
    pub fn open_client(&mut self, requested: &str, policy: NamePolicy) -> Result<(ClientId, String)> {
        if !self.running {
            return Err(Error::ServerUnavailable);
        }
        name::validate_client_name(requested, &self.limits)?;

        let name = if self.client_by_name(requested).is_none() {
            requested.to_string()
        } else {
            match policy {
                NamePolicy::Exact => return Err(Error::NameConflict(requested.to_string())),
                NamePolicy::Disambiguate => {
                    let name = name::disambiguate(requested, &self.limits, |candidate| {
                        self.client_by_name(candidate).is_some()
                    })?;
                    tracing::warn!(requested, assigned = %name, "client name taken, disambiguated");
                    name
                }
            }
        };

        let id = ClientId(self.next_client);
        self.next_client = self.next_client.checked_add(1).ok_or(Error::ServerUnavailable)?;
        self.clients.insert(
            id,
            ClientRecord {
                name: name.clone(),
                state: ClientState::Created,
                ports: Vec::new(),
            },
        );
        tracing::info!(client = %name, id = id.index(), "client opened");
        Ok((id, name))
    }

    /// Closes a client: unregisters its ports (cascading disconnections) and
    /// releases its record. Closing an unknown or already closed client is a no-op.
    pub fn close_client(&mut self, client: ClientId) {
        let Some(record) = self.record_mut(client) else {
            return;
        };
        // Stop delivery to the closing client before its ports go away.
        record.state = record.state.close();
        let owned = std::mem::take(&mut record.ports);
        let name = record.name.clone();

        for port in owned {
            self.remove_port(port);
        }
        self.clients.remove(&client);
        tracing::info!(client = %name, "client closed");
    }

    /// Returns the client's lifecycle state. Released clients report `Closed`.
    pub fn client_state(&self, client: ClientId) -> ClientState {
        self.record(client).map_or(ClientState::Closed, |r| r.state)
    }

    /// Returns the client's effective name.
    pub fn client_name(&self, client: ClientId) -> Result<&str> {
        self.record(client)
            .map(|r| r.name.as_str())
            .ok_or(Error::ClientClosed)
    }

    /// Looks up an open client by name.
    pub fn client_by_name(&self, name: &str) -> Option<ClientId> {
        self.clients
            .iter()
            .find(|(_, r)| r.name == name)
            .map(|(id, _)| *id)
    }

    /// Names of every client still holding a record, in open order.
    pub fn client_names(&self) -> Vec<String> {
        self.clients.values().map(|r| r.name.clone()).collect()
    }

    /// Enables notification delivery for the client.
    pub fn activate(&mut self, client: ClientId) -> Result<()> {
        let record = self.record_mut(client).ok_or(Error::ClientClosed)?;
        record.state = record.state.activate()?;
        tracing::info!(client = %record.name, "client activated");
        Ok(())
    }

    /// Stops notification delivery for the client.
    pub fn deactivate(&mut self, client: ClientId) -> Result<()> {
        let record = self.record_mut(client).ok_or(Error::ClientClosed)?;
        let next = record.state.deactivate()?;
        if next != record.state {
            record.state = next;
            tracing::info!(client = %record.name, "client deactivated");
        }
        Ok(())
    }

    /// Shuts the server down.
    ///
    /// Every open client moves to [`ClientState::ShutdownReceived`] and gets a
    /// [`Notification::Shutdown`], whether or not it is activated. Later
    /// attempts to open clients fail with [`Error::ServerUnavailable`].
    pub fn shutdown(&mut self, reason: &str) {
        if !self.running {
            return;
        }
        self.running = false;
        let mut notified = 0usize;
        for (id, record) in &mut self.clients {
            if record.state.is_dead() {
                continue;
            }
            record.state = record.state.shutdown();
            self.outbox.push(Delivery {
                client: *id,
                notification: Notification::Shutdown {
                    reason: reason.to_string(),
                },
            });
            notified += 1;
        }
        tracing::info!(reason, clients = notified, "server shutdown");
    }

    // --- ports ---

    /// Registers a port owned by `client`.
    pub fn register_port(
        &mut self,
        client: ClientId,
        short_name: &str,
        port_type: PortType,
        direction: Direction,
        flags: PortFlags,
    ) -> Result<PortInfo> {
        let record = self.live_record(client)?;
        name::validate_port_name(&record.name, short_name, &self.limits)?;
        let client_name = record.name.clone();
        let full_name = name::full_name(&client_name, short_name);
        if self.by_name.contains_key(&full_name) {
            return Err(Error::NameConflict(full_name));
        }

        let id = PortId(self.next_port);
        self.next_port = self.next_port.checked_add(1).ok_or(Error::ServerUnavailable)?;
        let info = PortInfo {
            id,
            client,
            client_name,
            short_name: short_name.to_string(),
            full_name: full_name.clone(),
            direction,
            port_type: PortType::from_type_str(port_type.as_str()),
            flags,
            aliases: Vec::new(),
        };
        self.ports.insert(
            id,
            PortRecord {
                info: info.clone(),
                alias_slots: vec![None; self.limits.max_aliases],
            },
        );
        self.by_name.insert(full_name, id);
        if let Some(record) = self.record_mut(client) {
            record.ports.push(id);
        }

        tracing::debug!(port = %info.full_name, port_type = %info.port_type, direction = %info.direction, "registry_register");
        self.emit(Notification::PortRegistered { port: info.clone() });
        Ok(info)
    }

    /// Unregisters a port owned by `client`, disconnecting it first.
    pub fn unregister_port(&mut self, client: ClientId, port: PortId) -> Result<()> {
        self.live_record(client)?;
        self.owned_port(client, port)?;
        if let Some(record) = self.record_mut(client) {
            record.ports.retain(|p| *p != port);
        }
        self.remove_port(port);
        Ok(())
    }

    /// Changes a port's short name. Renaming to the current name does nothing.
    pub fn rename_port(&mut self, client: ClientId, port: PortId, new_short: &str) -> Result<PortInfo> {
        self.live_record(client)?;
        let current = self.owned_port(client, port)?.clone();
        if current.short_name == new_short {
            return Ok(current);
        }
        name::validate_port_name(&current.client_name, new_short, &self.limits)?;
        let new_name = name::full_name(&current.client_name, new_short);
        if self.by_name.contains_key(&new_name) {
            return Err(Error::NameConflict(new_name));
        }

        let old_name = current.full_name;
        self.by_name.remove(&old_name);
        self.by_name.insert(new_name.clone(), port);
        let info = {
            let record = self.port_record_mut(port)?;
            record.info.short_name = new_short.to_string();
            record.info.full_name.clone_from(&new_name);
            record.info.clone()
        };

        tracing::debug!(old = %old_name, new = %new_name, "registry_rename");
        self.emit(Notification::PortRenamed {
            port: info.clone(),
            old_name,
            new_name,
        });
        Ok(info)
    }

    /// Assigns an alias to a port owned by `client`, in the first free slot.
    ///
    /// Assigning an alias the port already has does nothing.
    pub fn set_alias(&mut self, client: ClientId, port: PortId, alias: &str) -> Result<()> {
        self.live_record(client)?;
        self.owned_port(client, port)?;
        name::validate_alias(alias, &self.limits)?;
        let limit = self.limits.max_aliases;
        let record = self.port_record_mut(port)?;
        if record.info.aliases.iter().any(|a| a == alias) {
            return Ok(());
        }
        let Some(free) = record.alias_slots.iter_mut().find(|slot| slot.is_none()) else {
            return Err(Error::AliasLimit {
                port: record.info.full_name.clone(),
                limit,
            });
        };
        *free = Some(alias.to_string());
        record.sync_aliases();
        tracing::debug!(port = %record.info.full_name, alias, "registry_set_alias");
        Ok(())
    }

    /// Removes an alias from a port owned by `client`. The other aliases keep
    /// their slots.
    pub fn unset_alias(&mut self, client: ClientId, port: PortId, alias: &str) -> Result<()> {
        self.live_record(client)?;
        self.owned_port(client, port)?;
        let record = self.port_record_mut(port)?;
        let Some(slot) = record
            .alias_slots
            .iter_mut()
            .find(|slot| slot.as_deref() == Some(alias))
        else {
            return Err(Error::AliasNotFound {
                port: record.info.full_name.clone(),
                alias: alias.to_string(),
            });
        };
        *slot = None;
        record.sync_aliases();
        tracing::debug!(port = %record.info.full_name, alias, "registry_unset_alias");
        Ok(())
    }

    /// Returns a snapshot of the port.
    pub fn port(&self, port: PortId) -> Option<&PortInfo> {
        self.ports.get(&port).map(|r| &r.info)
    }

    /// Looks a port up by full name, then by alias.
    pub fn find_port(&self, name: &str) -> Option<&PortInfo> {
        if let Some(id) = self.by_name.get(name) {
            return self.port(*id);
        }
        self.ports.values().map(|r| &r.info).find(|p| p.answers_to(name))
    }

    /// Returns every port matching `filter`, in registration order.
    pub fn ports(&self, filter: &PortFilter) -> Vec<PortInfo> {
        self.ports
            .values()
            .map(|r| &r.info)
            .filter(|p| filter.matches(p))
            .cloned()
            .collect()
    }

    /// Returns the ports owned by `client`, in registration order.
    pub fn client_ports(&self, client: ClientId) -> Vec<PortInfo> {
        self.record(client)
            .map(|r| r.ports.iter().filter_map(|id| self.port(*id)).cloned().collect())
            .unwrap_or_default()
    }

    // --- connections ---

    /// Connects an output port to an input port. Any live client may connect any ports.
    pub fn connect(&mut self, client: ClientId, source: PortId, sink: PortId) -> Result<()> {
        self.live_record(client)?;
        let source = self.existing_port(source)?.clone();
        let sink = self.existing_port(sink)?.clone();
        self.graph.connect(&source, &sink)?;
        self.emit(Notification::PortsConnected { source, sink });
        Ok(())
    }

    /// Removes the connection between two ports.
    pub fn disconnect(&mut self, client: ClientId, source: PortId, sink: PortId) -> Result<()> {
        self.live_record(client)?;
        let source = self.existing_port(source)?.clone();
        let sink = self.existing_port(sink)?.clone();
        self.graph.disconnect(&source, &sink)?;
        self.emit(Notification::PortsDisconnected { source, sink });
        Ok(())
    }

    /// Connects two ports given by full name or alias.
    pub fn connect_by_name(&mut self, client: ClientId, source: &str, sink: &str) -> Result<()> {
        let (source, sink) = self.resolve_pair(source, sink)?;
        self.connect(client, source, sink)
    }

    /// Disconnects two ports given by full name or alias.
    pub fn disconnect_by_name(&mut self, client: ClientId, source: &str, sink: &str) -> Result<()> {
        let (source, sink) = self.resolve_pair(source, sink)?;
        self.disconnect(client, source, sink)
    }

    /// Returns `true` if the port has any connection.
    pub fn is_connected(&self, port: PortId) -> bool {
        self.graph.is_connected(port)
    }

    /// Returns `true` if the two ports are connected, in either direction.
    pub fn is_connected_to(&self, a: PortId, b: PortId) -> bool {
        self.graph.is_connected_to(a, b)
    }

    /// Returns snapshots of the port's peers, in connection order.
    pub fn peers(&self, port: PortId) -> Vec<PortInfo> {
        self.graph
            .peers(port)
            .into_iter()
            .filter_map(|id| self.port(id))
            .cloned()
            .collect()
    }

    /// Returns every connection, in creation order.
    pub fn connections(&self) -> Vec<Connection> {
        self.graph.connections().collect()
    }

    /// Drains the pending notifications, in emission order.
    pub fn take_outbox(&mut self) -> Vec<Delivery> {
        std::mem::take(&mut self.outbox)
    }

    // --- internals ---

    fn record(&self, client: ClientId) -> Option<&ClientRecord> {
        self.clients.get(&client)
    }

    fn record_mut(&mut self, client: ClientId) -> Option<&mut ClientRecord> {
        self.clients.get_mut(&client)
    }

    fn live_record(&self, client: ClientId) -> Result<&ClientRecord> {
        let record = self.record(client).ok_or(Error::ClientClosed)?;
        record.state.ensure_live()?;
        Ok(record)
    }

    fn existing_port(&self, port: PortId) -> Result<&PortInfo> {
        self.port(port).ok_or_else(|| Error::PortNotFound(port.to_string()))
    }

    fn owned_port(&self, client: ClientId, port: PortId) -> Result<&PortInfo> {
        let info = self.existing_port(port)?;
        if info.client != client {
            return Err(Error::NotOwner {
                port: info.full_name.clone(),
                client: self.client_name(client).unwrap_or_default().to_string(),
            });
        }
        Ok(info)
    }

    fn port_record_mut(&mut self, port: PortId) -> Result<&mut PortRecord> {
        self.ports
            .get_mut(&port)
            .ok_or_else(|| Error::PortNotFound(port.to_string()))
    }

    fn resolve_pair(&self, source: &str, sink: &str) -> Result<(PortId, PortId)> {
        let source = self
            .find_port(source)
            .ok_or_else(|| Error::PortNotFound(source.to_string()))?
            .id;
        let sink = self
            .find_port(sink)
            .ok_or_else(|| Error::PortNotFound(sink.to_string()))?
            .id;
        Ok((source, sink))
    }

    /// Disconnects and removes a port, emitting the cascade.
    fn remove_port(&mut self, port: PortId) {
        for edge in self.graph.remove_port(port) {
            if let (Some(source), Some(sink)) = (self.port(edge.source), self.port(edge.sink)) {
                let (source, sink) = (source.clone(), sink.clone());
                self.emit(Notification::PortsDisconnected { source, sink });
            }
        }
        let Some(PortRecord { info, .. }) = self.ports.remove(&port) else {
            return;
        };
        self.by_name.remove(&info.full_name);
        tracing::debug!(port = %info.full_name, "registry_unregister");
        self.emit(Notification::PortUnregistered { port: info });
    }

    /// Queues `notification` for every activated client.
    fn emit(&mut self, notification: Notification) {
        let recipients: Vec<ClientId> = self
            .clients
            .iter()
            .filter(|(_, r)| r.state.receives_notifications())
            .map(|(id, _)| *id)
            .collect();
        for client in recipients {
            self.outbox.push(Delivery {
                client,
                notification: notification.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NotificationKind;

    fn kinds_for(deliveries: &[Delivery], client: ClientId) -> Vec<NotificationKind> {
        deliveries
            .iter()
            .filter(|d| d.client == client)
            .map(|d| d.notification.kind())
            .collect()
    }

    #[test]
    fn exact_policy_rejects_taken_name() {
        let mut reg = Registry::default();
        reg.open_client("test", NamePolicy::Exact).unwrap();
        assert_eq!(
            reg.open_client("test", NamePolicy::Exact),
            Err(Error::NameConflict("test".into()))
        );
    }

    #[test]
    fn default_policy_disambiguates() {
        let mut reg = Registry::default();
        let (_, first) = reg.open_client("test", NamePolicy::default()).unwrap();
        let (_, second) = reg.open_client("test", NamePolicy::default()).unwrap();
        let (_, third) = reg.open_client("test", NamePolicy::default()).unwrap();
        assert_eq!(first, "test");
        assert_eq!(second, "test-01");
        assert_eq!(third, "test-02");
    }

    #[test]
    fn name_released_on_close() {
        let mut reg = Registry::default();
        let (id, _) = reg.open_client("test", NamePolicy::Exact).unwrap();
        reg.close_client(id);
        assert!(reg.open_client("test", NamePolicy::Exact).is_ok());
    }

    #[test]
    fn port_names_unique_per_client() {
        let mut reg = Registry::default();
        let (a, _) = reg.open_client("A", NamePolicy::Exact).unwrap();
        let (b, _) = reg.open_client("B", NamePolicy::Exact).unwrap();
        reg.register_port(a, "in", PortType::Audio, Direction::Input, PortFlags::NONE)
            .unwrap();
        reg.register_port(b, "in", PortType::Audio, Direction::Input, PortFlags::NONE)
            .unwrap();
        assert_eq!(
            reg.register_port(a, "in", PortType::Midi, Direction::Output, PortFlags::NONE),
            Err(Error::NameConflict("A:in".into()))
        );
    }

    #[test]
    fn notifications_only_reach_activated_clients() {
        let mut reg = Registry::default();
        let (a, _) = reg.open_client("A", NamePolicy::Exact).unwrap();
        let (b, _) = reg.open_client("B", NamePolicy::Exact).unwrap();
        reg.activate(a).unwrap();
        reg.register_port(b, "out", PortType::Midi, Direction::Output, PortFlags::NONE)
            .unwrap();
        let outbox = reg.take_outbox();
        assert_eq!(kinds_for(&outbox, a), vec![NotificationKind::PortRegistered]);
        assert!(kinds_for(&outbox, b).is_empty());
        assert!(reg.take_outbox().is_empty());
    }

    #[test]
    fn unregister_cascades_disconnects_before_removal() {
        let mut reg = Registry::default();
        let (a, _) = reg.open_client("A", NamePolicy::Exact).unwrap();
        let (b, _) = reg.open_client("B", NamePolicy::Exact).unwrap();
        let input = reg
            .register_port(a, "in1", PortType::Midi, Direction::Input, PortFlags::NONE)
            .unwrap();
        let output = reg
            .register_port(b, "out1", PortType::Midi, Direction::Output, PortFlags::NONE)
            .unwrap();
        reg.connect(b, output.id, input.id).unwrap();
        reg.activate(b).unwrap();

        assert!(matches!(
            reg.unregister_port(b, input.id),
            Err(Error::NotOwner { .. })
        ));
        reg.unregister_port(a, input.id).unwrap();

        let outbox = reg.take_outbox();
        assert_eq!(
            kinds_for(&outbox, b),
            vec![
                NotificationKind::PortsDisconnected,
                NotificationKind::PortUnregistered
            ]
        );
        match &outbox[1].notification {
            Notification::PortUnregistered { port } => assert_eq!(port.full_name, "A:in1"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!reg.is_connected(output.id));
        assert_eq!(
            reg.unregister_port(a, input.id),
            Err(Error::PortNotFound(input.id.to_string()))
        );
    }

    #[test]
    fn rename_updates_full_name_and_index() {
        let mut reg = Registry::default();
        let (a, _) = reg.open_client("A", NamePolicy::Exact).unwrap();
        reg.activate(a).unwrap();
        let port = reg
            .register_port(a, "in1", PortType::Midi, Direction::Input, PortFlags::NONE)
            .unwrap();
        reg.take_outbox();

        let renamed = reg.rename_port(a, port.id, "in2").unwrap();
        assert_eq!(renamed.full_name, "A:in2");
        assert!(reg.find_port("A:in1").is_none());
        assert_eq!(reg.find_port("A:in2").map(|p| p.id), Some(port.id));

        let outbox = reg.take_outbox();
        assert_eq!(
            outbox[0].notification,
            Notification::PortRenamed {
                port: renamed.clone(),
                old_name: "A:in1".into(),
                new_name: "A:in2".into(),
            }
        );

        // Same name: no event.
        reg.rename_port(a, port.id, "in2").unwrap();
        assert!(reg.take_outbox().is_empty());
    }

    #[test]
    fn aliases_are_bounded_and_resolvable() {
        let mut reg = Registry::default();
        let (sys, _) = reg.open_client("system", NamePolicy::Exact).unwrap();
        let port = reg
            .register_port(sys, "capture_1", PortType::Audio, Direction::Output, PortFlags::NONE.physical())
            .unwrap();
        reg.set_alias(sys, port.id, "alsa_pcm:capture_1").unwrap();
        reg.set_alias(sys, port.id, "mic").unwrap();
        assert!(matches!(
            reg.set_alias(sys, port.id, "third"),
            Err(Error::AliasLimit { limit: 2, .. })
        ));
        assert_eq!(reg.find_port("mic").map(|p| p.id), Some(port.id));

        reg.unset_alias(sys, port.id, "mic").unwrap();
        assert!(matches!(
            reg.unset_alias(sys, port.id, "mic"),
            Err(Error::AliasNotFound { .. })
        ));
        assert_eq!(
            reg.port(port.id).map(|p| p.aliases.clone()),
            Some(vec!["alsa_pcm:capture_1".to_string()])
        );
    }

    #[test]
    fn shutdown_reaches_every_open_client() {
        let mut reg = Registry::default();
        let (a, _) = reg.open_client("A", NamePolicy::Exact).unwrap();
        let (b, _) = reg.open_client("B", NamePolicy::Exact).unwrap();
        reg.activate(a).unwrap();
        reg.shutdown("server stopped");

        assert_eq!(reg.client_state(a), ClientState::ShutdownReceived);
        assert_eq!(reg.client_state(b), ClientState::ShutdownReceived);
        let outbox = reg.take_outbox();
        assert_eq!(kinds_for(&outbox, a), vec![NotificationKind::Shutdown]);
        assert_eq!(kinds_for(&outbox, b), vec![NotificationKind::Shutdown]);

        assert_eq!(
            reg.register_port(a, "x", PortType::Audio, Direction::Input, PortFlags::NONE),
            Err(Error::ClientClosed)
        );
        assert_eq!(
            reg.open_client("C", NamePolicy::Exact),
            Err(Error::ServerUnavailable)
        );
    }

    #[test]
    fn separator_rejected_in_short_names() {
        let mut reg = Registry::default();
        let (a, _) = reg.open_client("A", NamePolicy::Exact).unwrap();
        assert!(matches!(
            reg.register_port(a, "in:1", PortType::Midi, Direction::Input, PortFlags::NONE),
            Err(Error::InvalidName { .. })
        ));
        let port = reg
            .register_port(a, "in1", PortType::Midi, Direction::Input, PortFlags::NONE)
            .unwrap();
        assert!(matches!(
            reg.rename_port(a, port.id, "in:1"),
            Err(Error::InvalidName { .. })
        ));
        assert_eq!(reg.port(port.id).map(|p| p.full_name.as_str()), Some("A:in1"));
    }

    #[test]
    fn freed_alias_slot_is_reused_in_place() {
        let mut reg = Registry::default();
        let (a, _) = reg.open_client("A", NamePolicy::Exact).unwrap();
        let port = reg
            .register_port(a, "out", PortType::Audio, Direction::Output, PortFlags::NONE)
            .unwrap();
        reg.set_alias(a, port.id, "one").unwrap();
        reg.set_alias(a, port.id, "two").unwrap();

        reg.unset_alias(a, port.id, "one").unwrap();
        assert_eq!(reg.port(port.id).map(|p| p.aliases.clone()), Some(vec!["two".to_string()]));

        reg.set_alias(a, port.id, "three").unwrap();
        assert_eq!(
            reg.port(port.id).map(|p| p.aliases.clone()),
            Some(vec!["three".to_string(), "two".to_string()])
        );
        assert!(matches!(
            reg.set_alias(a, port.id, "four"),
            Err(Error::AliasLimit { limit: 2, .. })
        ));
    }

    #[test]
    fn churn_releases_storage() {
        let mut reg = Registry::default();
        let (hub, _) = reg.open_client("hub", NamePolicy::Exact).unwrap();
        reg.activate(hub).unwrap();
        let sink = reg
            .register_port(hub, "in", PortType::Audio, Direction::Input, PortFlags::NONE)
            .unwrap();

        let mut last_port = sink.id;
        for _ in 0..5_000 {
            let (c, _) = reg.open_client("temp", NamePolicy::Exact).unwrap();
            let out = reg
                .register_port(c, "out", PortType::Audio, Direction::Output, PortFlags::NONE)
                .unwrap();
            assert!(out.id > last_port);
            last_port = out.id;
            reg.connect(c, out.id, sink.id).unwrap();
            reg.disconnect(c, out.id, sink.id).unwrap();
            reg.connect(c, out.id, sink.id).unwrap();
            reg.close_client(c);
            reg.take_outbox();
        }

        assert_eq!(reg.clients.len(), 1);
        assert_eq!(reg.ports.len(), 1);
        assert_eq!(reg.by_name.len(), 1);
        assert!(reg.graph.is_empty());
        assert_eq!(reg.client_names(), vec!["hub".to_string()]);
        assert_eq!(reg.ports(&PortFilter::new()).len(), 1);
    }
}
