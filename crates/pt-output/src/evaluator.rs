//! The cost evaluator.
//!
//! Reduces a run's per-tick logs to passenger-minutes, dollar costs, and
//! per-trip averages. Each tick contributes one minute of the current state:
//! a vehicle with `a` passengers aboard adds `min(a, seated_cap)` seated and
//! `max(a - seated_cap, 0)` standing passenger-minutes, every waiting
//! passenger adds a waiting minute, and every live vehicle adds a vehicle
//! minute. Accumulated minutes convert to hours against the hourly cost
//! rates, and each unroutable passenger adds the flat unfinished penalty.

use std::fmt;

use pt_core::{CostModel, MINUTES_PER_HOUR, VehicleParams};

use crate::logger::TickLog;

// ── Evaluator ─────────────────────────────────────────────────────────────────

/// Holds the cost rates and capacity split; stateless across runs.
pub struct Evaluator {
    costs: CostModel,
    params: VehicleParams,
}

impl Evaluator {
    pub fn new(costs: CostModel, params: VehicleParams) -> Self {
        Self { costs, params }
    }

    /// Reduce a full run log to a [`CostSummary`].
    pub fn evaluate(&self, log: &TickLog) -> CostSummary {
        let seated_cap = self.params.max_seated;

        // ── Per-tick accumulation (passenger- and vehicle-minutes) ────────
        let mut seated_min = 0u64;
        let mut standing_min = 0u64;
        let mut waiting_min = 0u64;
        let mut vehicle_min = 0u64;
        let mut max_vehicles_at_once = 0usize;
        let mut max_passengers_in_vehicle = 0u32;

        for (aboard, waiting) in log.vehicle_passengers.iter().zip(&log.node_waiting) {
            for &passengers in aboard {
                seated_min += passengers.min(seated_cap) as u64;
                standing_min += passengers.saturating_sub(seated_cap) as u64;
                max_passengers_in_vehicle = max_passengers_in_vehicle.max(passengers);
            }
            waiting_min += waiting.iter().map(|&w| w as u64).sum::<u64>();
            vehicle_min += aboard.len() as u64;
            max_vehicles_at_once = max_vehicles_at_once.max(aboard.len());
        }

        // ── Hours and dollars ─────────────────────────────────────────────
        let per_hour = MINUTES_PER_HOUR as f64;
        let seated_hours = seated_min as f64 / per_hour;
        let standing_hours = standing_min as f64 / per_hour;
        let waiting_hours = waiting_min as f64 / per_hour;
        let vehicle_hours = vehicle_min as f64 / per_hour;
        let passenger_hours = seated_hours + standing_hours + waiting_hours;

        let cost_seated = seated_hours * self.costs.agent_cost_seated;
        let cost_standing = standing_hours * self.costs.agent_cost_standing;
        let cost_waiting = waiting_hours * self.costs.agent_cost_waiting;
        let cost_unfinished = log.counters.failed as f64 * self.costs.unfinished_penalty;
        let cost_vehicle_operation = vehicle_hours * self.costs.vehicle_cost;
        let total_cost =
            cost_seated + cost_standing + cost_waiting + cost_unfinished + cost_vehicle_operation;

        // ── Per-trip averages ─────────────────────────────────────────────
        let trips = log.counters.total_trips();
        let per_trip = |hours: f64| {
            if trips == 0 {
                0.0
            } else {
                hours / trips as f64 * per_hour
            }
        };
        let per_trip_cost = |cost: f64| if trips == 0 { 0.0 } else { cost / trips as f64 };

        CostSummary {
            trips,
            failure_rate: if trips == 0 {
                0.0
            } else {
                log.counters.failed as f64 / trips as f64
            },
            minutes_per_passenger: per_trip(passenger_hours),
            minutes_seated: per_trip(seated_hours),
            minutes_standing: per_trip(standing_hours),
            minutes_waiting: per_trip(waiting_hours),
            vehicle_hours,
            cost_vehicle_operation,
            cost_unfinished,
            total_cost,
            cost_per_passenger: per_trip_cost(cost_vehicle_operation),
            total_cost_per_passenger: per_trip_cost(total_cost),
            max_vehicles_at_once,
            max_passengers_in_vehicle,
        }
    }
}

// ── CostSummary ───────────────────────────────────────────────────────────────

/// Aggregate outcome of a run. `Display` renders the terminal report.
#[derive(Clone, Debug, PartialEq)]
pub struct CostSummary {
    /// Demand that materialised: spawned plus failed passengers.
    pub trips: u64,
    /// Fraction of trips that never found a route.
    pub failure_rate: f64,
    /// Mean in-system minutes per trip (seated + standing + waiting).
    pub minutes_per_passenger: f64,
    pub minutes_seated: f64,
    pub minutes_standing: f64,
    pub minutes_waiting: f64,
    pub vehicle_hours: f64,
    pub cost_vehicle_operation: f64,
    pub cost_unfinished: f64,
    /// Financial plus time cost, dollars.
    pub total_cost: f64,
    /// Operating dollars per trip.
    pub cost_per_passenger: f64,
    /// Holistic dollars per trip.
    pub total_cost_per_passenger: f64,
    pub max_vehicles_at_once: usize,
    pub max_passengers_in_vehicle: u32,
}

impl fmt::Display for CostSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Num Passenger Trips = {}", thousands(self.trips))?;
        writeln!(f, "% Trips Unfinished = {:.2}%", self.failure_rate * 100.0)?;
        writeln!(
            f,
            "Total Time per Passenger = {:.2} Mins",
            self.minutes_per_passenger
        )?;
        writeln!(f, "Time Seated = {:.2} Mins", self.minutes_seated)?;
        writeln!(f, "Time Standing = {:.2} Mins", self.minutes_standing)?;
        writeln!(f, "Time Waiting = {:.2} Mins", self.minutes_waiting)?;
        writeln!(
            f,
            "Cost of Vehicle Operation = ${}",
            money(self.cost_vehicle_operation, 0)
        )?;
        writeln!(
            f,
            "Max Number of Vehicles at Once = {}",
            thousands(self.max_vehicles_at_once as u64)
        )?;
        writeln!(
            f,
            "Max Passengers in a Vehicle = {}",
            thousands(self.max_passengers_in_vehicle as u64)
        )?;
        writeln!(
            f,
            "Combined Financial and Time Cost = ${}",
            money(self.total_cost, 2)
        )?;
        writeln!(
            f,
            "Financial Cost per Passenger = ${:.2}",
            self.cost_per_passenger
        )?;
        write!(
            f,
            "Total Cost per Passenger = ${:.2}",
            self.total_cost_per_passenger
        )
    }
}

// ── Number formatting ─────────────────────────────────────────────────────────

/// Group an integer with comma thousands separators.
pub(crate) fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Dollar amount with grouped integer part and `decimals` fraction digits.
pub(crate) fn money(x: f64, decimals: usize) -> String {
    let rounded = format!("{x:.decimals$}");
    match rounded.split_once('.') {
        Some((whole, frac)) => {
            let w: u64 = whole.parse().unwrap_or(0);
            format!("{}.{frac}", thousands(w))
        }
        None => thousands(rounded.parse().unwrap_or(0)),
    }
}
