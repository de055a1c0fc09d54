//! `pt-output` — what leaves the simulation: logs, files, and the bill.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`logger`]    | `TickLog`: in-memory per-tick arrays for the renderer    |
//! | [`row`]       | Flat output row types                                    |
//! | [`writer`]    | `OutputWriter` backend trait                             |
//! | [`csv`]       | CSV backend (`vehicle_snapshots.csv`, `stop_waiting.csv`)|
//! | [`observer`]  | `SimOutputObserver<W>`: bridges `SimObserver` to a writer|
//! | [`evaluator`] | `Evaluator`: per-tick logs → cost summary                |
//! | [`error`]     | `OutputError`, `OutputResult<T>`                         |

pub mod csv;
pub mod error;
pub mod evaluator;
pub mod logger;
pub mod observer;
pub mod row;
pub mod writer;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use evaluator::{CostSummary, Evaluator};
pub use logger::TickLog;
pub use observer::SimOutputObserver;
pub use row::{VehicleRow, WaitingRow};
pub use writer::OutputWriter;
