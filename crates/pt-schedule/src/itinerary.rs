//! Itinerary templates.
//!
//! An itinerary is the immutable description of one vehicle run: N stops,
//! the N-1 edges linking consecutive pairs, and cumulative arrival offsets in
//! minutes from dispatch (`offsets[0] = 0`,
//! `offsets[k] = offsets[k-1] + edge[k-1].travel_time`).
//!
//! Vehicles share the template by `ItineraryId` and keep only a per-instance
//! cursor, so dispatching a vehicle copies nothing but a few integers.

use pt_core::{EdgeId, NodeId};
use pt_network::TransitGraph;

use crate::error::{ScheduleError, ScheduleResult};

// ── ItinerarySpec ─────────────────────────────────────────────────────────────

/// One row of the schedule table after parsing, before node resolution.
///
/// Simple schedules carry the stop list verbatim; complex schedules arrive
/// here after segment-chain assembly.
#[derive(Clone, Debug)]
pub struct ItinerarySpec {
    pub name: String,
    /// Minutes between successive dispatches.
    pub headway_min: u32,
    /// Minute of the first dispatch.
    pub first_offset: u32,
    /// Last minute at which a dispatch may still occur.
    pub last_departure: u32,
    /// Ordered stop names.
    pub stop_names: Vec<String>,
}

// ── Itinerary ─────────────────────────────────────────────────────────────────

/// An ordered node/edge sequence with cumulative arrival offsets.
/// Immutable after construction.
#[derive(Clone, Debug)]
pub struct Itinerary {
    name: String,
    stops: Vec<NodeId>,
    edges: Vec<EdgeId>,
    offsets: Vec<u32>,
}

impl Itinerary {
    /// Resolve an ordered stop-name list against the graph.
    ///
    /// Fails if the list has fewer than two stops, a name is unknown, or a
    /// consecutive pair has no connecting edge.
    pub fn from_stop_names(
        name: &str,
        stop_names: &[String],
        graph: &TransitGraph,
    ) -> ScheduleResult<Itinerary> {
        if stop_names.len() < 2 {
            return Err(ScheduleError::TooShort { name: name.to_owned() });
        }

        let mut stops = Vec::with_capacity(stop_names.len());
        let mut edges = Vec::with_capacity(stop_names.len() - 1);
        let mut offsets = Vec::with_capacity(stop_names.len());

        for stop_name in stop_names {
            stops.push(graph.require_node(stop_name)?);
        }
        offsets.push(0);
        for pair in stops.windows(2) {
            let edge = graph.edge_between(pair[0], pair[1]).ok_or_else(|| {
                ScheduleError::MissingEdge {
                    name: name.to_owned(),
                    from: graph.node_name(pair[0]).to_owned(),
                    to: graph.node_name(pair[1]).to_owned(),
                }
            })?;
            edges.push(edge);
            offsets.push(offsets.last().unwrap() + graph.edge_travel_min(edge));
        }

        Ok(Itinerary { name: name.to_owned(), stops, edges, offsets })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn stops(&self) -> &[NodeId] {
        &self.stops
    }

    #[inline]
    pub fn stop(&self, idx: usize) -> NodeId {
        self.stops[idx]
    }

    /// Index of the final stop.
    #[inline]
    pub fn last_index(&self) -> usize {
        self.stops.len() - 1
    }

    #[inline]
    pub fn edge(&self, leg: usize) -> EdgeId {
        self.edges[leg]
    }

    /// Cumulative minutes from dispatch to arrival at each stop.
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    #[inline]
    pub fn offset(&self, idx: usize) -> u32 {
        self.offsets[idx]
    }

    /// Travel minutes of the leg departing stop `idx`.
    #[inline]
    pub fn leg_travel_min(&self, idx: usize) -> u32 {
        self.offsets[idx + 1] - self.offsets[idx]
    }

    /// End-to-end minutes of one full run.
    #[inline]
    pub fn length_min(&self) -> u32 {
        *self.offsets.last().unwrap()
    }

    /// First position of `node` along the run, if the itinerary serves it.
    ///
    /// A loop route visits its origin twice; boarding semantics use the
    /// first occurrence, like the original timetable search.
    pub fn first_position_of(&self, node: NodeId) -> Option<usize> {
        self.stops.iter().position(|&s| s == node)
    }

    /// The stops strictly after position `idx`, with in-vehicle minutes from
    /// `idx` to each.
    pub fn downstream(&self, idx: usize) -> impl Iterator<Item = (NodeId, u32)> + '_ {
        let base = self.offsets[idx];
        self.stops[idx + 1..]
            .iter()
            .zip(&self.offsets[idx + 1..])
            .map(move |(&stop, &offset)| (stop, offset - base))
    }
}
