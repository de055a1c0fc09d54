//! Passenger plans and groups.
//!
//! A plan is a consumable alternating sequence of tokens:
//! board itinerary `S`, alight at node `v`, board `S'`, alight at `v'`, ...
//! Tokens are integer ids, so the hot board/alight phases never compare
//! strings; names appear only in logs.
//!
//! A group bundles passengers who spawned together with the same plan. Groups
//! split only on boarding, when a vehicle's residual capacity is smaller than
//! the group: the splinter boards with a copy of the plan, the remainder
//! stays waiting with the original plan untouched.

use pt_core::{ItineraryId, Minute, NodeId};

// ── PlanStep ──────────────────────────────────────────────────────────────────

/// One action of a passenger's journey.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlanStep {
    /// Board the next vehicle of this itinerary.
    Board(ItineraryId),
    /// Leave the vehicle at this stop.
    Alight(NodeId),
}

// ── TravelPlan ────────────────────────────────────────────────────────────────

/// An ordered token sequence with a consumption cursor.
///
/// The cursor advances by exactly one on every successful board or alight;
/// tokens behind it are kept for diagnostics but never revisited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TravelPlan {
    steps: Vec<PlanStep>,
    next: usize,
}

impl TravelPlan {
    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self { steps, next: 0 }
    }

    /// The token the group will consume next, `None` once the journey is
    /// complete.
    #[inline]
    pub fn next_step(&self) -> Option<PlanStep> {
        self.steps.get(self.next).copied()
    }

    /// Consume the next token.
    #[inline]
    pub fn advance(&mut self) {
        debug_assert!(self.next < self.steps.len(), "advancing an exhausted plan");
        self.next += 1;
    }

    /// Tokens not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.steps.len() - self.next
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.next == self.steps.len()
    }

    /// `true` if the next token boards this itinerary.
    #[inline]
    pub fn wants_board(&self, itinerary: ItineraryId) -> bool {
        self.next_step() == Some(PlanStep::Board(itinerary))
    }

    /// `true` if the next token alights at this stop.
    #[inline]
    pub fn wants_alight(&self, stop: NodeId) -> bool {
        self.next_step() == Some(PlanStep::Alight(stop))
    }

    /// The stop this plan alights at after its pending board token, if the
    /// next token is a board.
    #[inline]
    pub fn alight_after_board(&self) -> Option<NodeId> {
        match self.steps.get(self.next + 1) {
            Some(&PlanStep::Alight(node)) if matches!(self.next_step(), Some(PlanStep::Board(_))) => {
                Some(node)
            }
            _ => None,
        }
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }
}

// ── Group ─────────────────────────────────────────────────────────────────────

/// A bundle of identically-routed passengers treated as one scheduling unit.
#[derive(Clone, Debug)]
pub struct Group {
    pub origin: NodeId,
    pub destination: NodeId,
    /// Minute the group spawned.
    pub created: Minute,
    /// Passengers in the bundle, always >= 1.
    pub size: u32,
    pub plan: TravelPlan,
}

impl Group {
    pub fn new(
        origin: NodeId,
        destination: NodeId,
        created: Minute,
        size: u32,
        plan: TravelPlan,
    ) -> Self {
        debug_assert!(size >= 1, "empty passenger group");
        Self { origin, destination, created, size, plan }
    }

    /// Carve `boarding` passengers off the front of this group.
    ///
    /// The splinter inherits a copy of the plan; `self` keeps the original
    /// plan and the remaining passengers.
    pub fn split(&mut self, boarding: u32) -> Group {
        debug_assert!(boarding >= 1 && boarding < self.size, "invalid split");
        self.size -= boarding;
        Group {
            origin: self.origin,
            destination: self.destination,
            created: self.created,
            size: boarding,
            plan: self.plan.clone(),
        }
    }
}
