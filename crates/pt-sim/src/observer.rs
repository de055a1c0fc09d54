//! Observer hooks for per-tick output.
//!
//! The simulation core knows nothing about rendering or files; it hands each
//! finished tick to a [`SimObserver`] as a [`TickFrame`] borrowing the
//! per-vehicle and per-stop snapshot arrays. `pt-output` implements the
//! observers that accumulate logs and write CSV.

use pt_core::Minute;

use crate::sim::RunCounters;

// ── Snapshot rows ─────────────────────────────────────────────────────────────

/// One vehicle as the renderer sees it this tick.
#[derive(Clone, Debug, PartialEq)]
pub struct VehicleObservation {
    pub name: String,
    pub lat: f32,
    pub lon: f32,
    pub passengers: u32,
}

/// Borrowed view of one finished tick.
///
/// `time` is the clock value *after* the tick's increment, so the first frame
/// of a run carries time 1. `node_waiting[n]` is the waiting passenger total
/// at stop `n`.
#[derive(Copy, Clone)]
pub struct TickFrame<'a> {
    pub time: Minute,
    pub vehicles: &'a [VehicleObservation],
    pub node_waiting: &'a [u32],
}

// ── SimObserver ───────────────────────────────────────────────────────────────

/// Callbacks fired at tick boundaries. All hooks default to no-ops.
pub trait SimObserver {
    fn on_tick_start(&mut self, _now: Minute) {}

    /// The tick's phases have all run and the clock has advanced.
    fn on_tick_end(&mut self, _frame: &TickFrame<'_>) {}

    /// The run reached its stop time.
    fn on_sim_end(&mut self, _counters: &RunCounters) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
