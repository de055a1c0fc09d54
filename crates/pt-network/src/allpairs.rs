//! All-pairs ideal travel times with path recovery.
//!
//! "Ideal" means uncongested and timetable-free: the minutes a vehicle would
//! need if one departed the instant the passenger arrived at every transfer.
//! The gravity model uses these times as its cost surface, and the recovered
//! edge paths identify which links carry each origin-destination flow.
//!
//! Algorithm: one Dijkstra per source node over the directed edge graph.
//! Costs are non-negative integer minutes; ties resolve to the first-found
//! neighbour, stable with edge input order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use pt_core::{EdgeId, NodeId};

use crate::graph::TransitGraph;

/// Sentinel distance for "no path".
pub const UNREACHED: u32 = u32::MAX;

// ── IdealTimes ────────────────────────────────────────────────────────────────

/// `N × N` uncongested travel-time matrix plus the edge sequence realising
/// each entry. Row = origin, column = destination.
pub struct IdealTimes {
    n: usize,
    /// Row-major minutes; `UNREACHED` where no path exists.
    minutes: Vec<u32>,
    /// Row-major edge paths; empty on the diagonal and for unreached pairs.
    paths: Vec<Vec<EdgeId>>,
}

impl IdealTimes {
    /// Run Dijkstra from every node of `graph`.
    pub fn compute(graph: &TransitGraph) -> IdealTimes {
        let n = graph.node_count();
        let mut minutes = vec![UNREACHED; n * n];
        let mut paths = vec![Vec::new(); n * n];

        for source in graph.node_ids() {
            let (dist, prev_edge) = single_source(graph, source);
            let row = source.index() * n;
            for target in 0..n {
                minutes[row + target] = dist[target];
                if dist[target] != UNREACHED {
                    paths[row + target] = reconstruct(graph, &prev_edge, NodeId(target as u32));
                }
            }
        }

        IdealTimes { n, minutes, paths }
    }

    pub fn node_count(&self) -> usize {
        self.n
    }

    /// Ideal minutes from `from` to `to`; `None` if unreachable.
    #[inline]
    pub fn minutes(&self, from: NodeId, to: NodeId) -> Option<u32> {
        match self.minutes[from.index() * self.n + to.index()] {
            UNREACHED => None,
            m => Some(m),
        }
    }

    /// Ideal minutes as a float cost, `f64::INFINITY` if unreachable. The
    /// form the gravity model wants.
    #[inline]
    pub fn cost(&self, from: NodeId, to: NodeId) -> f64 {
        match self.minutes[from.index() * self.n + to.index()] {
            UNREACHED => f64::INFINITY,
            m => m as f64,
        }
    }

    /// The edges of the shortest path from `from` to `to`, in travel order.
    /// Empty for the diagonal and for unreached pairs.
    pub fn path_edges(&self, from: NodeId, to: NodeId) -> &[EdgeId] {
        &self.paths[from.index() * self.n + to.index()]
    }

    /// Edge-name rendering of [`path_edges`](Self::path_edges), for
    /// diagnostics and tests.
    pub fn path_names<'g>(&self, graph: &'g TransitGraph, from: NodeId, to: NodeId) -> Vec<&'g str> {
        self.path_edges(from, to)
            .iter()
            .map(|&e| graph.edge_name(e))
            .collect()
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

fn single_source(graph: &TransitGraph, source: NodeId) -> (Vec<u32>, Vec<EdgeId>) {
    let n = graph.node_count();
    let mut dist = vec![UNREACHED; n];
    // prev_edge[v] = edge that reached v; EdgeId::INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[source.index()] = 0;

    // Min-heap: (cost, node). Reverse makes BinaryHeap (max) behave as min.
    // Secondary key NodeId gives deterministic pop order on equal costs.
    let mut heap: BinaryHeap<Reverse<(u32, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, source)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in graph.out_edges(node) {
            let neighbor = graph.edge_end(edge);
            let new_cost = cost.saturating_add(graph.edge_travel_min(edge));

            // Strict improvement only: on a tie the first-found path stays.
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                heap.push(Reverse((new_cost, neighbor)));
            }
        }
    }

    (dist, prev_edge)
}

fn reconstruct(graph: &TransitGraph, prev_edge: &[EdgeId], to: NodeId) -> Vec<EdgeId> {
    let mut edges = Vec::new();
    let mut cur = to;
    loop {
        let e = prev_edge[cur.index()];
        if e == EdgeId::INVALID {
            break;
        }
        edges.push(e);
        cur = graph.edge_start(e);
    }
    edges.reverse();
    edges
}
