//! In-memory per-tick log capture.
//!
//! `TickLog` records the renderer contract verbatim: for every tick, the
//! clock value, the vehicles on the map (latitude, longitude, name,
//! passengers aboard), and each stop's waiting total, as parallel
//! lists-of-lists. The evaluator reduces the same structure to costs, so one
//! observer feeds both consumers.

use pt_sim::{RunCounters, SimObserver, TickFrame};

/// Per-tick snapshot arrays for a whole run. Index `k` across every field
/// describes the same tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickLog {
    /// Clock value after each tick (1-based by construction).
    pub times: Vec<u32>,
    pub vehicle_names: Vec<Vec<String>>,
    pub vehicle_lats: Vec<Vec<f32>>,
    pub vehicle_lons: Vec<Vec<f32>>,
    /// Passengers aboard each vehicle, matching `vehicle_names` order.
    pub vehicle_passengers: Vec<Vec<u32>>,
    /// Waiting passenger total per stop, indexed by node id.
    pub node_waiting: Vec<Vec<u32>>,
    /// Final spawn/completion/failure counts, set by `on_sim_end`.
    pub counters: RunCounters,
}

impl TickLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks captured so far.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

impl SimObserver for TickLog {
    fn on_tick_end(&mut self, frame: &TickFrame<'_>) {
        self.times.push(frame.time.0);
        self.vehicle_names
            .push(frame.vehicles.iter().map(|v| v.name.clone()).collect());
        self.vehicle_lats
            .push(frame.vehicles.iter().map(|v| v.lat).collect());
        self.vehicle_lons
            .push(frame.vehicles.iter().map(|v| v.lon).collect());
        self.vehicle_passengers
            .push(frame.vehicles.iter().map(|v| v.passengers).collect());
        self.node_waiting.push(frame.node_waiting.to_vec());
    }

    fn on_sim_end(&mut self, counters: &RunCounters) {
        self.counters = *counters;
    }
}
