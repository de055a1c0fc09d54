//! `pt-core` — foundational types for the `pt` transit-network simulator.
//!
//! This crate is a dependency of every other `pt-*` crate. It intentionally
//! has no `pt-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                |
//! |-------------|---------------------------------------------------------|
//! | [`ids`]     | `NodeId`, `EdgeId`, `ItineraryId`                       |
//! | [`geo`]     | `GeoPoint`, linear interpolation for moving vehicles    |
//! | [`time`]    | `Minute`, the integer simulation clock unit             |
//! | [`rng`]     | `SimRng` (global), `OriginRng` (per-origin spawn)       |
//! | [`config`]  | `VehicleParams`, `CostModel`, `Scenario`                |
//! | [`error`]   | `CoreError`, `CoreResult`                               |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{CostModel, Scenario, VehicleParams};
pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{EdgeId, ItineraryId, NodeId};
pub use rng::{OriginRng, SimRng};
pub use time::{MINUTES_PER_HOUR, Minute};
