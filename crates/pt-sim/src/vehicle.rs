//! The vehicle state machine.
//!
//! A vehicle traverses one itinerary instance. The shared template (stops,
//! edges, cumulative offsets) lives in the timetable; the vehicle carries
//! only its cursor: the index of the stop it last occupied and an AtStop /
//! Moving state with an integer move timer.
//!
//! # Transitions per tick
//!
//! | From       | Condition                         | To                      |
//! |------------|-----------------------------------|-------------------------|
//! | AtStop     | at final stop index               | Terminated              |
//! | AtStop     | next edge takes 1 minute          | AtStop at the next stop |
//! | AtStop     | otherwise                         | Moving, timer = 1       |
//! | Moving     | timer == edge_len - 1             | AtStop at the next stop |
//! | Moving     | otherwise                         | timer += 1              |
//!
//! Arrival at the terminus therefore leaves the vehicle AtStop for the rest
//! of that tick (one alight opportunity); the advance phase of the *next*
//! tick observes the terminal index and removes it.

use pt_core::{GeoPoint, ItineraryId, Minute, NodeId};
use pt_network::TransitGraph;
use pt_schedule::Itinerary;

use crate::plan::Group;

// ── State ─────────────────────────────────────────────────────────────────────

/// Where the vehicle is relative to its itinerary.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VehicleState {
    /// Parked at the stop with index `at`.
    AtStop,
    /// Between stops `at` and `at + 1`. `move_timer` counts minutes spent on
    /// the edge so far, in `[1, edge_len - 1]`.
    Moving { move_timer: u32, edge_len: u32 },
}

/// Result of one state-machine step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The vehicle had already stopped at its terminus; remove it.
    Terminated,
    /// The vehicle is at a stop this minute (arrived, dwelling, or teleported
    /// over a one-minute edge).
    AtStop,
    /// The vehicle is mid-edge.
    Moving,
}

// ── Vehicle ───────────────────────────────────────────────────────────────────

/// One itinerary instance in flight, carrying passenger groups.
#[derive(Debug)]
pub struct Vehicle {
    /// `"<dispatch minute> <itinerary name>"`, for logs and the renderer.
    name: String,
    itinerary: ItineraryId,
    dispatched: Minute,
    /// Index of the stop the vehicle last occupied.
    at: usize,
    state: VehicleState,
    groups: Vec<Group>,
    /// Cached passenger total of `groups`.
    aboard: u32,
}

impl Vehicle {
    /// Spawn a vehicle parked at the itinerary's first stop.
    pub fn dispatch(id: ItineraryId, template: &Itinerary, now: Minute) -> Vehicle {
        Vehicle {
            name: format!("{now} {}", template.name()),
            itinerary: id,
            dispatched: now,
            at: 0,
            state: VehicleState::AtStop,
            groups: Vec::new(),
            aboard: 0,
        }
    }

    // ── State machine ─────────────────────────────────────────────────────

    /// Advance one minute along `template` (the vehicle's own itinerary).
    pub fn step(&mut self, template: &Itinerary) -> StepOutcome {
        match self.state {
            VehicleState::AtStop => {
                if self.at == template.last_index() {
                    return StepOutcome::Terminated;
                }
                let edge_len = template.leg_travel_min(self.at);
                if edge_len == 1 {
                    // Degenerate edge: appear at the next stop within the
                    // same tick, never entering Moving.
                    self.at += 1;
                    StepOutcome::AtStop
                } else {
                    self.state = VehicleState::Moving { move_timer: 1, edge_len };
                    StepOutcome::Moving
                }
            }
            VehicleState::Moving { move_timer, edge_len } => {
                if move_timer == edge_len - 1 {
                    self.at += 1;
                    self.state = VehicleState::AtStop;
                    StepOutcome::AtStop
                } else {
                    self.state = VehicleState::Moving { move_timer: move_timer + 1, edge_len };
                    StepOutcome::Moving
                }
            }
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn itinerary(&self) -> ItineraryId {
        self.itinerary
    }

    pub fn dispatched(&self) -> Minute {
        self.dispatched
    }

    #[inline]
    pub fn is_at_stop(&self) -> bool {
        matches!(self.state, VehicleState::AtStop)
    }

    pub fn state(&self) -> VehicleState {
        self.state
    }

    /// Index of the stop last occupied.
    #[inline]
    pub fn stop_index(&self) -> usize {
        self.at
    }

    /// The stop the vehicle is parked at. Meaningful while `is_at_stop`.
    #[inline]
    pub fn current_stop(&self, template: &Itinerary) -> NodeId {
        template.stop(self.at)
    }

    /// `true` if `stop` still lies ahead on the run.
    pub fn will_reach(&self, template: &Itinerary, stop: NodeId) -> bool {
        template.stops()[self.at + 1..].contains(&stop)
    }

    /// Geographic position: the parked stop, or the straight-line
    /// interpolation between the edge's endpoints while moving.
    pub fn position(&self, template: &Itinerary, graph: &TransitGraph) -> GeoPoint {
        let here = graph.position(template.stop(self.at));
        match self.state {
            VehicleState::AtStop => here,
            VehicleState::Moving { move_timer, edge_len } => {
                let next = graph.position(template.stop(self.at + 1));
                here.lerp(next, move_timer as f32 / edge_len as f32)
            }
        }
    }

    // ── Passengers ────────────────────────────────────────────────────────

    #[inline]
    pub fn passengers_aboard(&self) -> u32 {
        self.aboard
    }

    /// Free space up to the standing limit.
    #[inline]
    pub fn residual_capacity(&self, max_standing: u32) -> u32 {
        max_standing.saturating_sub(self.aboard)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Take a group aboard. Capacity is the caller's responsibility; the
    /// board phase splits groups so overflow cannot occur.
    pub fn board(&mut self, group: Group) {
        self.aboard += group.size;
        self.groups.push(group);
    }

    /// Remove and return every group whose next token alights at `stop`,
    /// consuming that token. Remaining groups keep their aboard order.
    pub fn take_alighting(&mut self, stop: NodeId) -> Vec<Group> {
        let mut leaving = Vec::new();
        let aboard = std::mem::take(&mut self.groups);
        for mut group in aboard {
            if group.plan.wants_alight(stop) {
                group.plan.advance();
                self.aboard -= group.size;
                leaving.push(group);
            } else {
                self.groups.push(group);
            }
        }
        leaving
    }
}
