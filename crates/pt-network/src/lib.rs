//! `pt-network` — the physical transit network and its demand model.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`graph`]    | `TransitGraph` (CSR multigraph) + `TransitGraphBuilder`  |
//! | [`allpairs`] | `IdealTimes`: all-pairs uncongested minutes + edge paths |
//! | [`demand`]   | Doubly-constrained gravity OD assignment                 |
//! | [`loader`]   | `nodes` / `edges` CSV tables → `TransitGraph`            |
//! | [`error`]    | `NetworkError`, `NetworkResult<T>`                       |
//!
//! The graph is immutable after `build()`; every downstream component refers
//! to stops and edges by the integer ids minted here.

pub mod allpairs;
pub mod demand;
pub mod error;
pub mod graph;
pub mod loader;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use allpairs::IdealTimes;
pub use demand::{Convergence, GravityParams, OdMatrix, gravity_assignment};
pub use error::{NetworkError, NetworkResult};
pub use graph::{TransitGraph, TransitGraphBuilder};
pub use loader::{load_network_csv, load_network_reader};
