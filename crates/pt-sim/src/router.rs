//! The time-dependent earliest-arrival router.
//!
//! # Search
//!
//! Labels are absolute arrival minutes per stop. Relaxation from stop `u`
//! labelled `τ`: for every itinerary serving `u`, board its earliest arrival
//! at or after `τ` and alight at each downstream stop `v`, arriving at
//! `board_time + ride(u → v)`. A strict improvement overwrites the label and
//! records the plan `plan(u) ++ [Board(S), Alight(v)]`, so the winning plan
//! to every stop is rebuilt alongside the search. Ties keep the first-found
//! label (lowest stop index first).
//!
//! The settled set advances one stop per round, picking the unsettled stop
//! with the smallest label by linear scan. Transit networks are small enough
//! that the O(N²) scan beats maintaining a heap across resumptions.
//!
//! # Cache semantics
//!
//! The cache persists across ticks. Each query settles at most the stops it
//! needs: the search stops as soon as every destination with positive demand
//! this minute is settled, and a later query resumes where it left off.
//! Whenever the origin's upcoming service times shift (head-of-queue change
//! or a boarding event), the stop is marked dirty and the next query restarts
//! from scratch; without the reset, a vanished service's stale label could
//! remain selected.

use pt_core::{Minute, NodeId};

use crate::plan::PlanStep;
use crate::stop::StopService;

/// Sentinel label for "not reachable (yet)".
const UNREACHED: u32 = u32::MAX;

// ── RouteCache ────────────────────────────────────────────────────────────────

/// One origin's resumable earliest-arrival search.
pub struct RouteCache {
    origin: NodeId,
    /// Absolute arrival minute per destination; `UNREACHED` if unknown.
    labels: Vec<u32>,
    /// Token plan realising each label.
    plans: Vec<Vec<PlanStep>>,
    settled: Vec<bool>,
    dirty: bool,
}

impl RouteCache {
    /// A cache that will initialise itself on first query.
    pub fn new(origin: NodeId, node_count: usize) -> Self {
        Self {
            origin,
            labels: vec![UNREACHED; node_count],
            plans: vec![Vec::new(); node_count],
            settled: vec![false; node_count],
            dirty: true,
        }
    }

    pub fn origin(&self) -> NodeId {
        self.origin
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Invalidate: the next query restarts the search.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn reset(&mut self, depart: Minute) {
        self.labels.fill(UNREACHED);
        for plan in &mut self.plans {
            plan.clear();
        }
        self.settled.fill(false);
        self.labels[self.origin.index()] = depart.0;
    }

    // ── Query ─────────────────────────────────────────────────────────────

    /// Settle every destination with `demanded[j] == true`, restarting first
    /// if the cache is dirty. Destinations the service graph cannot reach
    /// keep an unset label.
    ///
    /// `boards[n]` is stop `n`'s service board; the whole array is read-only
    /// during a query.
    pub fn ensure_routes(
        &mut self,
        depart: Minute,
        demanded: &[bool],
        boards: &[Vec<StopService>],
    ) {
        if self.dirty {
            self.reset(depart);
            self.dirty = false;
        }

        let mut remaining = demanded
            .iter()
            .zip(&self.settled)
            .filter(|&(&d, &s)| d && !s)
            .count();

        while remaining > 0 {
            // Unsettled stop with the smallest label; lowest index on ties.
            let mut best = UNREACHED;
            let mut best_idx = usize::MAX;
            for (i, (&label, &settled)) in self.labels.iter().zip(&self.settled).enumerate() {
                if !settled && label < best {
                    best = label;
                    best_idx = i;
                }
            }
            if best == UNREACHED {
                // Everything reachable is settled; the remaining demanded
                // destinations have no route.
                break;
            }

            let u = best_idx;
            let tau = Minute(best);
            let base_plan = self.plans[u].clone();

            for service in &boards[u] {
                let Some(board_time) = service.next_at_or_after(tau) else {
                    continue;
                };
                for &(v, ride) in service.beyond() {
                    let cand = board_time.0 + ride;
                    if cand < self.labels[v.index()] && !self.settled[v.index()] {
                        self.labels[v.index()] = cand;
                        let mut plan = base_plan.clone();
                        plan.push(PlanStep::Board(service.itinerary));
                        plan.push(PlanStep::Alight(v));
                        self.plans[v.index()] = plan;
                    }
                }
            }

            self.settled[u] = true;
            if demanded[u] {
                remaining -= 1;
            }
        }
    }

    // ── Results ───────────────────────────────────────────────────────────

    /// Earliest known arrival at `dest`; `None` if unreachable.
    #[inline]
    pub fn arrival(&self, dest: NodeId) -> Option<Minute> {
        match self.labels[dest.index()] {
            UNREACHED => None,
            m => Some(Minute(m)),
        }
    }

    /// The boarding plan realising [`arrival`](Self::arrival). Empty for the
    /// origin itself and for unreached destinations.
    pub fn plan_steps(&self, dest: NodeId) -> &[PlanStep] {
        &self.plans[dest.index()]
    }
}
