//! Output backend trait.

use crate::error::OutputResult;
use crate::row::{VehicleRow, WaitingRow};

/// A sink for per-tick simulation output.
///
/// Backends buffer as they see fit; `finish` must flush everything and is
/// idempotent.
pub trait OutputWriter {
    fn write_vehicle_rows(&mut self, rows: &[VehicleRow]) -> OutputResult<()>;

    fn write_waiting_rows(&mut self, rows: &[WaitingRow]) -> OutputResult<()>;

    fn finish(&mut self) -> OutputResult<()>;
}
