//! Server-wide connection graph.
//!
//! [`ConnectionGraph`] holds every edge between ports, across all clients. It
//! owns the is-connected relation and enforces the structural rules of a
//! connection:
//!
//! - edges run from an [`Output`](Direction::Output) to an [`Input`](Direction::Input),
//! - both endpoints carry compatible [`PortType`](crate::PortType)s,
//! - at most one edge exists per `(source, sink)` pair,
//! - optionally, no port exceeds a per-port connection limit.
//!
//! Only live edges are stored, keyed by a sequential [`EdgeId`], so
//! enumeration follows creation order for the whole graph and for the peers
//! of a single port, and removed edges leave nothing behind.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};
use crate::port::{Direction, PortId, PortInfo};

/// Unique identifier for an edge in the connection graph.
///
/// Edge IDs are assigned sequentially and never reused, so they order edges by
/// creation time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub(crate) u64);

impl EdgeId {
    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u64 {
        self.0
    }
}

/// A directed connection from an output port to an input port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Connection {
    /// The output port.
    pub source: PortId,
    /// The input port.
    pub sink: PortId,
}

impl Connection {
    /// Returns `true` if `port` is either endpoint.
    pub fn touches(&self, port: PortId) -> bool {
        self.source == port || self.sink == port
    }

    /// Returns the endpoint opposite to `port`.
    pub fn peer_of(&self, port: PortId) -> Option<PortId> {
        if self.source == port {
            Some(self.sink)
        } else if self.sink == port {
            Some(self.source)
        } else {
            None
        }
    }
}

/// Directed bipartite graph over all ports.
#[derive(Debug, Default)]
pub struct ConnectionGraph {
    edges: BTreeMap<EdgeId, Connection>,
    /// Edges touching each port, in creation order.
    adjacency: HashMap<PortId, Vec<EdgeId>>,
    next_edge: u64,
    max_per_port: Option<usize>,
}

impl ConnectionGraph {
    /// Creates an empty graph without a per-port connection limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph that caps the number of connections per port.
    pub fn with_limit(max_per_port: Option<usize>) -> Self {
        Self {
            max_per_port,
            ..Self::default()
        }
    }

    /// Returns the per-port connection limit.
    pub fn limit(&self) -> Option<usize> {
        self.max_per_port
    }

    /// Connects `source` to `sink`.
    ///
    /// Returns the new edge's ID, or an error if:
    /// - the edge would not run from an output to an input
    /// - the port types are incompatible
    /// - the edge already exists
    /// - either port is at the connection limit
    pub fn connect(&mut self, source: &PortInfo, sink: &PortInfo) -> Result<EdgeId> {
        if source.direction != Direction::Output || sink.direction != Direction::Input {
            return Err(Error::IncompatibleDirections {
                from: source.full_name.clone(),
                to: sink.full_name.clone(),
            });
        }
        if !source.port_type.is_compatible(&sink.port_type) {
            return Err(Error::IncompatibleTypes {
                from: source.full_name.clone(),
                to: sink.full_name.clone(),
            });
        }
        if self.find_edge(source.id, sink.id).is_some() {
            return Err(Error::ConnectionExists {
                from: source.full_name.clone(),
                to: sink.full_name.clone(),
            });
        }
        if let Some(limit) = self.max_per_port {
            for port in [source, sink] {
                if self.connection_count(port.id) >= limit {
                    return Err(Error::ConnectionLimit {
                        port: port.full_name.clone(),
                        limit,
                    });
                }
            }
        }

        let edge_id = EdgeId(self.next_edge);
        self.next_edge += 1;
        self.edges.insert(
            edge_id,
            Connection {
                source: source.id,
                sink: sink.id,
            },
        );
        self.adjacency.entry(source.id).or_default().push(edge_id);
        self.adjacency.entry(sink.id).or_default().push(edge_id);

        tracing::debug!(
            source = %source.full_name,
            sink = %sink.full_name,
            "graph_connect"
        );
        Ok(edge_id)
    }

    /// Removes the edge from `source` to `sink`.
    ///
    /// Returns [`Error::ConnectionNotFound`] if the ports are not connected.
    pub fn disconnect(&mut self, source: &PortInfo, sink: &PortInfo) -> Result<()> {
        let edge_id = self
            .find_edge(source.id, sink.id)
            .ok_or_else(|| Error::ConnectionNotFound {
                from: source.full_name.clone(),
                to: sink.full_name.clone(),
            })?;
        self.disconnect_internal(edge_id);
        tracing::debug!(
            source = %source.full_name,
            sink = %sink.full_name,
            "graph_disconnect"
        );
        Ok(())
    }

    /// Removes every edge touching `port` and returns them in creation order.
    pub fn remove_port(&mut self, port: PortId) -> Vec<Connection> {
        let Some(edge_ids) = self.adjacency.remove(&port) else {
            return Vec::new();
        };
        let removed = edge_ids
            .into_iter()
            .filter_map(|id| self.disconnect_internal(id))
            .collect::<Vec<_>>();
        if !removed.is_empty() {
            tracing::debug!(port = %port, count = removed.len(), "graph_remove_port");
        }
        removed
    }

    /// Returns `true` if `port` has at least one connection.
    pub fn is_connected(&self, port: PortId) -> bool {
        self.adjacency.get(&port).is_some_and(|edges| !edges.is_empty())
    }

    /// Returns `true` if `a` and `b` are connected, in either direction.
    pub fn is_connected_to(&self, a: PortId, b: PortId) -> bool {
        self.find_edge(a, b).is_some() || self.find_edge(b, a).is_some()
    }

    /// Returns the ports connected to `port`, in connection creation order.
    pub fn peers(&self, port: PortId) -> Vec<PortId> {
        self.adjacency
            .get(&port)
            .into_iter()
            .flatten()
            .filter_map(|id| self.edge(*id))
            .filter_map(|edge| edge.peer_of(port))
            .collect()
    }

    /// Returns the number of connections touching `port`.
    pub fn connection_count(&self, port: PortId) -> usize {
        self.adjacency.get(&port).map_or(0, Vec::len)
    }

    /// Returns every connection, in creation order.
    pub fn connections(&self) -> impl Iterator<Item = Connection> + '_ {
        self.edges.values().copied()
    }

    /// Returns the number of live connections.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if there are no connections.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn edge(&self, id: EdgeId) -> Option<Connection> {
        self.edges.get(&id).copied()
    }

    fn find_edge(&self, source: PortId, sink: PortId) -> Option<EdgeId> {
        self.adjacency
            .get(&source)?
            .iter()
            .copied()
            .find(|id| self.edge(*id).is_some_and(|e| e.source == source && e.sink == sink))
    }

    /// Drops the edge and unlinks it from both endpoints.
    fn disconnect_internal(&mut self, id: EdgeId) -> Option<Connection> {
        let edge = self.edges.remove(&id)?;
        for port in [edge.source, edge.sink] {
            if let Some(list) = self.adjacency.get_mut(&port) {
                list.retain(|e| *e != id);
                if list.is_empty() {
                    self.adjacency.remove(&port);
                }
            }
        }
        Some(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{ClientId, PortFlags, PortType};

    fn port(id: u32, name: &str, direction: Direction, port_type: PortType) -> PortInfo {
        let (client, short) = name.split_once(':').unwrap();
        PortInfo {
            id: PortId(id),
            client: ClientId(0),
            client_name: client.into(),
            short_name: short.into(),
            full_name: name.into(),
            direction,
            port_type,
            flags: PortFlags::NONE,
            aliases: Vec::new(),
        }
    }

    #[test]
    fn connect_and_query() {
        let mut graph = ConnectionGraph::new();
        let out = port(0, "B:out1", Direction::Output, PortType::Midi);
        let inp = port(1, "A:in1", Direction::Input, PortType::Midi);

        graph.connect(&out, &inp).unwrap();
        assert!(graph.is_connected(out.id));
        assert!(graph.is_connected(inp.id));
        assert!(graph.is_connected_to(inp.id, out.id));
        assert_eq!(graph.peers(inp.id), vec![out.id]);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn reversed_direction_rejected() {
        let mut graph = ConnectionGraph::new();
        let out = port(0, "B:out1", Direction::Output, PortType::Midi);
        let inp = port(1, "A:in1", Direction::Input, PortType::Midi);
        let err = graph.connect(&inp, &out).unwrap_err();
        assert!(matches!(err, Error::IncompatibleDirections { .. }));
        assert!(graph.is_empty());
    }

    #[test]
    fn same_direction_rejected() {
        let mut graph = ConnectionGraph::new();
        let a = port(0, "A:out", Direction::Output, PortType::Audio);
        let b = port(1, "B:out", Direction::Output, PortType::Audio);
        assert!(matches!(
            graph.connect(&a, &b),
            Err(Error::IncompatibleDirections { .. })
        ));
    }

    #[test]
    fn mismatched_types_rejected() {
        let mut graph = ConnectionGraph::new();
        let out = port(0, "A:out", Direction::Output, PortType::Audio);
        let inp = port(1, "B:in", Direction::Input, PortType::Midi);
        assert!(matches!(
            graph.connect(&out, &inp),
            Err(Error::IncompatibleTypes { .. })
        ));
    }

    #[test]
    fn duplicate_and_missing_edges() {
        let mut graph = ConnectionGraph::new();
        let out = port(0, "A:out", Direction::Output, PortType::Audio);
        let inp = port(1, "B:in", Direction::Input, PortType::Audio);

        graph.connect(&out, &inp).unwrap();
        assert!(matches!(
            graph.connect(&out, &inp),
            Err(Error::ConnectionExists { .. })
        ));
        graph.disconnect(&out, &inp).unwrap();
        assert!(matches!(
            graph.disconnect(&out, &inp),
            Err(Error::ConnectionNotFound { .. })
        ));
        assert!(!graph.is_connected(out.id));
    }

    #[test]
    fn peers_follow_creation_order() {
        let mut graph = ConnectionGraph::new();
        let sink = port(0, "mix:in", Direction::Input, PortType::Audio);
        let sources: Vec<_> = (1..=4)
            .map(|i| port(i, &format!("s{i}:out"), Direction::Output, PortType::Audio))
            .collect();
        for i in [2usize, 0, 3, 1] {
            graph.connect(&sources[i], &sink).unwrap();
        }
        let ids: Vec<_> = [2usize, 0, 3, 1].iter().map(|&i| sources[i].id).collect();
        assert_eq!(graph.peers(sink.id), ids);

        // Removing one keeps the relative order of the rest.
        graph.disconnect(&sources[0], &sink).unwrap();
        let ids: Vec<_> = [2usize, 3, 1].iter().map(|&i| sources[i].id).collect();
        assert_eq!(graph.peers(sink.id), ids);
        let all: Vec<_> = graph.connections().map(|c| c.source).collect();
        assert_eq!(all, ids);
    }

    #[test]
    fn remove_port_drops_touching_edges() {
        let mut graph = ConnectionGraph::new();
        let out = port(0, "A:out", Direction::Output, PortType::Audio);
        let in1 = port(1, "B:in1", Direction::Input, PortType::Audio);
        let in2 = port(2, "B:in2", Direction::Input, PortType::Audio);
        let other = port(3, "C:out", Direction::Output, PortType::Audio);
        graph.connect(&out, &in1).unwrap();
        graph.connect(&other, &in2).unwrap();
        graph.connect(&out, &in2).unwrap();

        let removed = graph.remove_port(out.id);
        assert_eq!(
            removed,
            vec![
                Connection { source: out.id, sink: in1.id },
                Connection { source: out.id, sink: in2.id },
            ]
        );
        assert!(!graph.is_connected(in1.id));
        assert_eq!(graph.peers(in2.id), vec![other.id]);
        assert_eq!(graph.len(), 1);
        assert!(graph.remove_port(out.id).is_empty());
    }

    #[test]
    fn connection_limit() {
        let mut graph = ConnectionGraph::with_limit(Some(1));
        let out = port(0, "A:out", Direction::Output, PortType::Audio);
        let in1 = port(1, "B:in1", Direction::Input, PortType::Audio);
        let in2 = port(2, "B:in2", Direction::Input, PortType::Audio);
        graph.connect(&out, &in1).unwrap();
        let err = graph.connect(&out, &in2).unwrap_err();
        assert_eq!(
            err,
            Error::ConnectionLimit {
                port: "A:out".into(),
                limit: 1
            }
        );
    }

    #[test]
    fn churn_leaves_no_dead_edges() {
        let mut graph = ConnectionGraph::new();
        let out = port(0, "A:out", Direction::Output, PortType::Audio);
        let inp = port(1, "B:in", Direction::Input, PortType::Audio);
        let keep = port(2, "B:keep", Direction::Input, PortType::Audio);
        graph.connect(&out, &keep).unwrap();

        let mut last = None;
        for _ in 0..10_000 {
            let id = graph.connect(&out, &inp).unwrap();
            assert!(last.is_none_or(|prev| id > prev));
            last = Some(id);
            graph.disconnect(&out, &inp).unwrap();
        }
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.adjacency.len(), 2);
        assert_eq!(graph.peers(out.id), vec![keep.id]);
    }
}
