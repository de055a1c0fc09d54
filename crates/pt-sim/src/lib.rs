//! `pt-sim` — the minute-by-minute simulation core.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`plan`]     | `PlanStep`, `TravelPlan`, `Group` (passenger bundles)      |
//! | [`vehicle`]  | `Vehicle`: the AtStop/Moving state machine                 |
//! | [`stop`]     | `Stops`: waiting lists, service boards, route caches       |
//! | [`router`]   | `RouteCache`: time-dependent earliest-arrival search       |
//! | [`sim`]      | `Simulation` + `SimulationBuilder`: the eight-phase tick   |
//! | [`observer`] | `SimObserver`, `TickFrame`, `NoopObserver`                 |
//! | [`loader`]   | `parameters` / `eval` / `scenario` CSV tables              |
//! | [`error`]    | `SimError`, `SimResult<T>`                                 |
//!
//! # Tick phases
//!
//! Each minute, in strict order: interpolate the demand multiplier, advance
//! vehicles (removing terminated ones), refresh per-stop next-service heads,
//! alight, dispatch, spawn (with routing), board, then increment the clock.
//! No phase observes mutations made by a later phase within the same minute.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                      |
//! |------------|-------------------------------------------------------------|
//! | `parallel` | Spawn/routing phase fans origins out over a Rayon pool.     |

pub mod error;
pub mod loader;
pub mod observer;
pub mod plan;
pub mod router;
pub mod sim;
pub mod stop;
pub mod vehicle;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{SimError, SimResult};
pub use loader::{
    load_costs_csv, load_costs_reader, load_params_csv, load_params_reader, load_scenario_csv,
    load_scenario_reader,
};
pub use observer::{NoopObserver, SimObserver, TickFrame, VehicleObservation};
pub use plan::{Group, PlanStep, TravelPlan};
pub use router::RouteCache;
pub use sim::{REFERENCE_SEED, RunCounters, Simulation, SimulationBuilder};
pub use stop::{StopService, Stops};
pub use vehicle::{StepOutcome, Vehicle, VehicleState};
