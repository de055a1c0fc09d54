//! Transit network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_to[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edge_travel_min`, `edge_names`)
//! are sorted by source node and indexed by `EdgeId`. Iteration over a stop's
//! departures is a contiguous memory scan, which keeps the Dijkstra inner
//! loops tight. The sort is stable, so edges out of one stop keep their input
//! order and shortest-path tie-breaking stays reproducible.
//!
//! # Naming
//!
//! Edge names are deterministic: `"<start> to <end>"`. Because schedule
//! assembly reconstructs these names from consecutive node pairs, a second
//! edge between the same ordered pair would be unreachable by name; the
//! builder rejects it outright.

use rustc_hash::{FxHashMap, FxHashSet};

use pt_core::{EdgeId, GeoPoint, NodeId};

use crate::error::{NetworkError, NetworkResult};

// ── TransitGraph ──────────────────────────────────────────────────────────────

/// Immutable directed stop/edge graph in CSR format.
///
/// Do not construct directly; use [`TransitGraphBuilder`].
#[derive(Debug)]
pub struct TransitGraph {
    // ── Node data (indexed by NodeId = position in the input table) ───────
    node_names: Vec<String>,
    node_pos: Vec<GeoPoint>,
    daily_passengers: Vec<u32>,
    node_index: FxHashMap<String, NodeId>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer. Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`. Length = node_count + 1.
    node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    edge_from: Vec<NodeId>,
    edge_to: Vec<NodeId>,
    edge_travel_min: Vec<u32>,
    edge_names: Vec<String>,
}

impl TransitGraph {
    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_names.is_empty()
    }

    // ── Node accessors ────────────────────────────────────────────────────

    /// Resolve a node name to its id.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.node_index.get(name).copied()
    }

    /// Like [`node_id`](Self::node_id) but failing with `UnknownNode`.
    pub fn require_node(&self, name: &str) -> NetworkResult<NodeId> {
        self.node_id(name)
            .ok_or_else(|| NetworkError::UnknownNode(name.to_owned()))
    }

    #[inline]
    pub fn node_name(&self, node: NodeId) -> &str {
        &self.node_names[node.index()]
    }

    #[inline]
    pub fn position(&self, node: NodeId) -> GeoPoint {
        self.node_pos[node.index()]
    }

    /// Daily passenger volume starting (and ending) at this stop.
    #[inline]
    pub fn daily_passengers(&self, node: NodeId) -> u32 {
        self.daily_passengers[node.index()]
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.node_count()).map(|i| NodeId(i as u32))
    }

    // ── Edge accessors ────────────────────────────────────────────────────

    #[inline]
    pub fn edge_start(&self, edge: EdgeId) -> NodeId {
        self.edge_from[edge.index()]
    }

    #[inline]
    pub fn edge_end(&self, edge: EdgeId) -> NodeId {
        self.edge_to[edge.index()]
    }

    /// Travel time along the edge in whole minutes (always >= 1).
    #[inline]
    pub fn edge_travel_min(&self, edge: EdgeId) -> u32 {
        self.edge_travel_min[edge.index()]
    }

    #[inline]
    pub fn edge_name(&self, edge: EdgeId) -> &str {
        &self.edge_names[edge.index()]
    }

    // ── Traversal ─────────────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all departures from `node`, in input
    /// order. A contiguous index range, no heap allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// The unique edge from `from` to `to`, if one exists.
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.out_edges(from).find(|&e| self.edge_to[e.index()] == to)
    }
}

// ── TransitGraphBuilder ───────────────────────────────────────────────────────

/// Construct a [`TransitGraph`] incrementally, then call [`build`](Self::build).
///
/// Stops must be added before the edges that reference them. `build()` sorts
/// edges by source node and constructs the CSR arrays.
pub struct TransitGraphBuilder {
    node_names: Vec<String>,
    node_pos: Vec<GeoPoint>,
    daily_passengers: Vec<u32>,
    node_index: FxHashMap<String, NodeId>,
    raw_edges: Vec<RawEdge>,
    edge_pairs: FxHashSet<(NodeId, NodeId)>,
}

struct RawEdge {
    from: NodeId,
    to: NodeId,
    travel_min: u32,
    name: String,
}

impl TransitGraphBuilder {
    pub fn new() -> Self {
        Self {
            node_names: Vec::new(),
            node_pos: Vec::new(),
            daily_passengers: Vec::new(),
            node_index: FxHashMap::default(),
            raw_edges: Vec::new(),
            edge_pairs: FxHashSet::default(),
        }
    }

    /// Add a stop and return its `NodeId` (sequential from 0).
    pub fn add_stop(
        &mut self,
        name: &str,
        pos: GeoPoint,
        daily_passengers: u32,
    ) -> NetworkResult<NodeId> {
        if self.node_index.contains_key(name) {
            return Err(NetworkError::DuplicateNode(name.to_owned()));
        }
        let id = NodeId(self.node_names.len() as u32);
        self.node_index.insert(name.to_owned(), id);
        self.node_names.push(name.to_owned());
        self.node_pos.push(pos);
        self.daily_passengers.push(daily_passengers);
        Ok(id)
    }

    /// Add a **directed** edge between two already-added stops.
    ///
    /// The edge is named `"<start> to <end>"`. A second edge between the same
    /// ordered pair is rejected with [`NetworkError::DuplicateEdge`].
    pub fn add_link(&mut self, start: &str, end: &str, travel_min: i64) -> NetworkResult<()> {
        let from = self.resolve(start)?;
        let to = self.resolve(end)?;
        if travel_min <= 0 {
            return Err(NetworkError::BadTravelTime {
                start: start.to_owned(),
                end: end.to_owned(),
                minutes: travel_min,
            });
        }
        if !self.edge_pairs.insert((from, to)) {
            return Err(NetworkError::DuplicateEdge {
                start: start.to_owned(),
                end: end.to_owned(),
            });
        }
        self.raw_edges.push(RawEdge {
            from,
            to,
            travel_min: travel_min as u32,
            name: format!("{start} to {end}"),
        });
        Ok(())
    }

    /// Convenience: add edges in **both directions** with the same travel
    /// time, the expansion of a `Bidirectional = Yes` input row.
    pub fn add_two_way(&mut self, a: &str, b: &str, travel_min: i64) -> NetworkResult<()> {
        self.add_link(a, b, travel_min)?;
        self.add_link(b, a, travel_min)
    }

    pub fn node_count(&self) -> usize {
        self.node_names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.raw_edges.len()
    }

    fn resolve(&self, name: &str) -> NetworkResult<NodeId> {
        self.node_index
            .get(name)
            .copied()
            .ok_or_else(|| NetworkError::UnknownNode(name.to_owned()))
    }

    /// Consume the builder and produce a [`TransitGraph`].
    ///
    /// Time complexity: O(E log E) for the stable edge sort.
    pub fn build(self) -> TransitGraph {
        let node_count = self.node_names.len();
        let edge_count = self.raw_edges.len();

        // Stable sort keeps each stop's departures in input order, which is
        // what makes shortest-path tie-breaking reproducible.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_from: Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to: Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_travel_min: Vec<u32> = raw.iter().map(|e| e.travel_min).collect();
        let edge_names: Vec<String> = raw.into_iter().map(|e| e.name).collect();

        // Build CSR row pointer (node_out_start).
        let mut node_out_start = vec![0u32; node_count + 1];
        for from in &edge_from {
            node_out_start[from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        TransitGraph {
            node_names: self.node_names,
            node_pos: self.node_pos,
            daily_passengers: self.daily_passengers,
            node_index: self.node_index,
            node_out_start,
            edge_from,
            edge_to,
            edge_travel_min,
            edge_names,
        }
    }
}

impl Default for TransitGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
