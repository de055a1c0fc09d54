//! Per-stop runtime state.
//!
//! Stop state is stored structure-of-arrays so the spawn phase can borrow the
//! route caches mutably while reading every stop's service board immutably
//! (and, with the `parallel` feature, fan the caches out across a Rayon
//! pool).
//!
//! # Service boards
//!
//! For each stop, one [`StopService`] per itinerary serving it: the absolute
//! minutes at which that itinerary's vehicles arrive (dispatch times plus the
//! stop's cumulative offset) and the downstream stops reachable without
//! transferring, with in-vehicle minutes to each. Both are precomputed at
//! setup from the dispatch queues; the per-tick refresh only advances a head
//! index past arrivals already in the past.

use pt_core::{ItineraryId, Minute, NodeId};
use pt_network::TransitGraph;
use pt_schedule::{DispatchQueue, Itinerary};

use crate::plan::Group;
use crate::router::RouteCache;

// ── StopService ───────────────────────────────────────────────────────────────

/// One itinerary's timetable as seen from one stop.
#[derive(Clone, Debug)]
pub struct StopService {
    pub itinerary: ItineraryId,
    /// Absolute arrival minutes at this stop, sorted ascending.
    arrivals: Vec<Minute>,
    /// First arrival not yet in the past.
    head: usize,
    /// Stops after this one on the itinerary, with ride minutes to each.
    beyond: Vec<(NodeId, u32)>,
}

impl StopService {
    pub(crate) fn new(
        itinerary: ItineraryId,
        arrivals: Vec<Minute>,
        beyond: Vec<(NodeId, u32)>,
    ) -> Self {
        debug_assert!(arrivals.windows(2).all(|w| w[0] <= w[1]));
        Self { itinerary, arrivals, head: 0, beyond }
    }

    /// Earliest remaining arrival at or after `t`, or `None` if the service
    /// has finished for the day.
    #[inline]
    pub fn next_at_or_after(&self, t: Minute) -> Option<Minute> {
        let rest = &self.arrivals[self.head..];
        let idx = rest.partition_point(|&a| a < t);
        rest.get(idx).copied()
    }

    /// The head-of-queue arrival, if any.
    #[inline]
    pub fn head_time(&self) -> Option<Minute> {
        self.arrivals.get(self.head).copied()
    }

    /// Drop arrivals before `now`. Returns `true` if the head moved.
    pub fn drop_before(&mut self, now: Minute) -> bool {
        let start = self.head;
        while self.head < self.arrivals.len() && self.arrivals[self.head] < now {
            self.head += 1;
        }
        self.head != start
    }

    pub fn beyond(&self) -> &[(NodeId, u32)] {
        &self.beyond
    }
}

// ── Stops ─────────────────────────────────────────────────────────────────────

/// Runtime state of every stop, owned and mutated only by the simulation
/// core.
pub struct Stops {
    /// FIFO waiting groups per stop.
    waiting: Vec<Vec<Group>>,
    /// Cached passenger totals of `waiting`.
    waiting_count: Vec<u32>,
    /// Serving itineraries per stop.
    boards: Vec<Vec<StopService>>,
    /// Per-origin pathfinding caches.
    caches: Vec<RouteCache>,
}

impl Stops {
    /// Precompute service boards from the timetable.
    pub fn build(
        graph: &TransitGraph,
        itineraries: &[Itinerary],
        dispatch: &[DispatchQueue],
    ) -> Stops {
        let n = graph.node_count();
        let mut boards: Vec<Vec<StopService>> = vec![Vec::new(); n];

        for (idx, (itinerary, queue)) in itineraries.iter().zip(dispatch).enumerate() {
            let id = ItineraryId(idx as u32);
            for node in graph.node_ids() {
                // First occurrence decides the boarding position, like the
                // original timetable search; a loop's repeated terminus gets
                // no separate board entry.
                let Some(pos) = itinerary.first_position_of(node) else {
                    continue;
                };
                let offset = itinerary.offset(pos);
                let arrivals: Vec<Minute> =
                    queue.all_times().iter().map(|&d| d + offset).collect();
                let beyond: Vec<(NodeId, u32)> = itinerary.downstream(pos).collect();
                boards[node.index()].push(StopService::new(id, arrivals, beyond));
            }
        }

        Stops {
            waiting: vec![Vec::new(); n],
            waiting_count: vec![0; n],
            boards,
            caches: (0..n).map(|i| RouteCache::new(NodeId(i as u32), n)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    // ── Waiting lists ─────────────────────────────────────────────────────

    pub fn push_waiting(&mut self, node: NodeId, group: Group) {
        self.waiting_count[node.index()] += group.size;
        self.waiting[node.index()].push(group);
    }

    pub fn waiting(&self, node: NodeId) -> &[Group] {
        &self.waiting[node.index()]
    }

    /// Per-stop waiting passenger totals, indexed by node.
    pub fn waiting_counts(&self) -> &[u32] {
        &self.waiting_count
    }

    pub fn total_waiting(&self) -> u64 {
        self.waiting_count.iter().map(|&c| c as u64).sum()
    }

    /// Temporarily take one stop's waiting list for the FIFO board walk.
    /// Return it (filtered) with [`put_back_waiting`](Self::put_back_waiting).
    pub(crate) fn take_waiting(&mut self, node: NodeId) -> Vec<Group> {
        std::mem::take(&mut self.waiting[node.index()])
    }

    pub(crate) fn put_back_waiting(&mut self, node: NodeId, groups: Vec<Group>) {
        self.waiting_count[node.index()] = groups.iter().map(|g| g.size).sum();
        self.waiting[node.index()] = groups;
    }

    // ── Service boards ────────────────────────────────────────────────────

    pub fn board(&self, node: NodeId) -> &[StopService] {
        &self.boards[node.index()]
    }

    /// Phase 3: drop past arrivals everywhere; a stop whose head-of-queue
    /// changed gets a dirty route cache.
    pub fn refresh(&mut self, now: Minute) {
        for (services, cache) in self.boards.iter_mut().zip(&mut self.caches) {
            let mut changed = false;
            for service in services.iter_mut() {
                changed |= service.drop_before(now);
            }
            if changed {
                cache.mark_dirty();
            }
        }
    }

    // ── Route caches ──────────────────────────────────────────────────────

    pub fn cache(&self, node: NodeId) -> &RouteCache {
        &self.caches[node.index()]
    }

    pub fn mark_dirty(&mut self, node: NodeId) {
        self.caches[node.index()].mark_dirty();
    }

    /// Split borrow for the spawn phase: every origin's cache mutably, every
    /// stop's service board immutably.
    pub(crate) fn routing_parts(&mut self) -> (&mut [RouteCache], &[Vec<StopService>]) {
        (&mut self.caches, &self.boards)
    }
}
