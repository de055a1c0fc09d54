//! CSV loaders for the `parameters`, `eval`, and `scenario` input tables.
//!
//! # Table formats
//!
//! `parameters` and `eval` are single-row tables:
//!
//! ```csv
//! Vehicle Max Seated,Vehicle Max Standing,Traffic Time Gap
//! 50,100,60
//! ```
//!
//! ```csv
//! Vehicle Cost,Agent Cost Seated,Agent Cost Standing,Agent Cost Waiting,Unfinished Penalty
//! 100,10,15,20,50
//! ```
//!
//! `Vehicle Max Standing` is the total capacity including the seated.
//!
//! `scenario` is one multiplier per row; the k-th value applies at minute
//! `k * Traffic Time Gap`:
//!
//! ```csv
//! Traffic Multiplier
//! 0.5
//! 1.0
//! 0.5
//! ```

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use pt_core::{CostModel, Scenario, VehicleParams};

use crate::error::{SimError, SimResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ParamsRecord {
    #[serde(rename = "Vehicle Max Seated")]
    max_seated: i64,
    #[serde(rename = "Vehicle Max Standing")]
    max_standing: i64,
    #[serde(rename = "Traffic Time Gap")]
    traffic_time_gap: i64,
}

#[derive(Deserialize)]
struct CostRecord {
    #[serde(rename = "Vehicle Cost")]
    vehicle_cost: f64,
    #[serde(rename = "Agent Cost Seated")]
    agent_cost_seated: f64,
    #[serde(rename = "Agent Cost Standing")]
    agent_cost_standing: f64,
    #[serde(rename = "Agent Cost Waiting")]
    agent_cost_waiting: f64,
    #[serde(rename = "Unfinished Penalty")]
    unfinished_penalty: f64,
}

#[derive(Deserialize)]
struct ScenarioRecord {
    #[serde(rename = "Traffic Multiplier")]
    traffic_multiplier: f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load vehicle parameters from the single-row `parameters` table.
pub fn load_params_csv(path: &Path) -> SimResult<VehicleParams> {
    load_params_reader(std::fs::File::open(path)?)
}

/// Like [`load_params_csv`] but accepting any `Read` source.
pub fn load_params_reader<R: Read>(reader: R) -> SimResult<VehicleParams> {
    let row: ParamsRecord = single_row(reader, "parameters")?;
    if row.max_seated < 0 || row.max_standing < row.max_seated {
        return Err(SimError::Config(format!(
            "vehicle capacities seated={} standing={} are inconsistent",
            row.max_seated, row.max_standing
        )));
    }
    if row.traffic_time_gap <= 0 {
        return Err(SimError::Config(format!(
            "Traffic Time Gap must be positive, got {}",
            row.traffic_time_gap
        )));
    }
    Ok(VehicleParams {
        max_seated: row.max_seated as u32,
        max_standing: row.max_standing as u32,
        traffic_time_gap: row.traffic_time_gap as u32,
    })
}

/// Load the cost model from the single-row `eval` table.
pub fn load_costs_csv(path: &Path) -> SimResult<CostModel> {
    load_costs_reader(std::fs::File::open(path)?)
}

/// Like [`load_costs_csv`] but accepting any `Read` source.
pub fn load_costs_reader<R: Read>(reader: R) -> SimResult<CostModel> {
    let row: CostRecord = single_row(reader, "eval")?;
    Ok(CostModel {
        vehicle_cost: row.vehicle_cost,
        agent_cost_seated: row.agent_cost_seated,
        agent_cost_standing: row.agent_cost_standing,
        agent_cost_waiting: row.agent_cost_waiting,
        unfinished_penalty: row.unfinished_penalty,
    })
}

/// Load the scenario's traffic multipliers. `traffic_time_gap` comes from the
/// parameters table.
pub fn load_scenario_csv(path: &Path, traffic_time_gap: u32) -> SimResult<Scenario> {
    load_scenario_reader(std::fs::File::open(path)?, traffic_time_gap)
}

/// Like [`load_scenario_csv`] but accepting any `Read` source.
pub fn load_scenario_reader<R: Read>(reader: R, traffic_time_gap: u32) -> SimResult<Scenario> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut multipliers = Vec::new();
    for result in csv_reader.deserialize::<ScenarioRecord>() {
        let row = result?;
        if row.traffic_multiplier < 0.0 {
            return Err(SimError::Config(format!(
                "negative Traffic Multiplier {}",
                row.traffic_multiplier
            )));
        }
        multipliers.push(row.traffic_multiplier);
    }
    if multipliers.is_empty() {
        return Err(SimError::Config("scenario table has no rows".into()));
    }
    Ok(Scenario::new(multipliers, traffic_time_gap))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn single_row<R: Read, T: for<'de> Deserialize<'de>>(reader: R, table: &str) -> SimResult<T> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = csv_reader.deserialize::<T>();
    match rows.next() {
        Some(row) => Ok(row?),
        None => Err(SimError::Config(format!("{table} table has no rows"))),
    }
}
