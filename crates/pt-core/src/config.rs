//! Shared run configuration: vehicle parameters, the cost model, and the
//! traffic scenario.
//!
//! These structs are the already-parsed form of the `parameters`, `eval`, and
//! `scenario` input tables. The edge crates deserialize the tables; everything
//! downstream (optimiser, simulation core, evaluator) consumes these types.

use crate::{MINUTES_PER_HOUR, Minute};

// ── VehicleParams ─────────────────────────────────────────────────────────────

/// Fleet-wide vehicle capacities and the scenario sampling interval.
#[derive(Copy, Clone, Debug)]
pub struct VehicleParams {
    /// Maximum passengers who can sit inside a vehicle.
    pub max_seated: u32,
    /// Maximum passengers who fit inside a vehicle, seated plus standing.
    pub max_standing: u32,
    /// Minutes between consecutive traffic-multiplier breakpoints.
    pub traffic_time_gap: u32,
}

// ── CostModel ─────────────────────────────────────────────────────────────────

/// Marginal costs used by the headway optimiser and the evaluator.
///
/// All rates are dollars per hour except `unfinished_penalty`, a flat dollar
/// amount per passenger who never reaches their destination (roughly the cost
/// of a late-night taxi ride).
#[derive(Copy, Clone, Debug)]
pub struct CostModel {
    /// Marginal cost of running one vehicle.
    pub vehicle_cost: f64,
    /// Value of a passenger's seated in-vehicle time.
    pub agent_cost_seated: f64,
    /// Value of standing time, higher because standing is unpleasant.
    pub agent_cost_standing: f64,
    /// Value of waiting time at a stop, higher again.
    pub agent_cost_waiting: f64,
    /// Flat penalty per passenger with no feasible route.
    pub unfinished_penalty: f64,
}

// ── Scenario ──────────────────────────────────────────────────────────────────

/// The daily demand profile: one traffic multiplier per breakpoint, applied
/// at minute `k * time_gap` and linearly interpolated in between.
#[derive(Clone, Debug)]
pub struct Scenario {
    multipliers: Vec<f64>,
    time_gap: u32,
}

impl Scenario {
    /// # Panics
    /// Panics in debug mode if `time_gap == 0`.
    pub fn new(multipliers: Vec<f64>, time_gap: u32) -> Self {
        debug_assert!(time_gap > 0, "traffic time gap must be positive");
        Self { multipliers, time_gap }
    }

    /// The minute at which the simulation stops: the last breakpoint.
    #[inline]
    pub fn stop_time(&self) -> Minute {
        let breaks = self.multipliers.len().saturating_sub(1) as u32;
        Minute(breaks * self.time_gap)
    }

    /// Demand multiplier at minute `now`, interpolated between the two
    /// surrounding breakpoints. Zero at and beyond the stop time.
    pub fn multiplier_at(&self, now: Minute) -> f64 {
        if now >= self.stop_time() {
            return 0.0;
        }
        let period = (now.0 / self.time_gap) as usize;
        let period_start = period as u32 * self.time_gap;
        let frac = (now.0 - period_start) as f64 / self.time_gap as f64;
        let start = self.multipliers[period];
        let end = self.multipliers[period + 1];
        start * (1.0 - frac) + end * frac
    }

    /// Mean multiplier across all breakpoints; the optimiser's estimate of
    /// average daily demand.
    pub fn mean_multiplier(&self) -> f64 {
        if self.multipliers.is_empty() {
            return 0.0;
        }
        self.multipliers.iter().sum::<f64>() / self.multipliers.len() as f64
    }

    /// Per-hour demand converted to a per-tick expectation at minute `now`.
    #[inline]
    pub fn per_minute_rate(&self, hourly: f64, now: Minute) -> f64 {
        hourly / MINUTES_PER_HOUR as f64 * self.multiplier_at(now)
    }

    pub fn breakpoints(&self) -> &[f64] {
        &self.multipliers
    }
}
