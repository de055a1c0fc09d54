//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `vehicle_snapshots.csv`
//! - `stop_waiting.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::error::OutputResult;
use crate::row::{VehicleRow, WaitingRow};
use crate::writer::OutputWriter;

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    vehicles: Writer<File>,
    waiting: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut vehicles = Writer::from_path(dir.join("vehicle_snapshots.csv"))?;
        vehicles.write_record(["time", "name", "lat", "lon", "passengers"])?;

        let mut waiting = Writer::from_path(dir.join("stop_waiting.csv"))?;
        waiting.write_record(["time", "node", "waiting"])?;

        Ok(Self {
            vehicles,
            waiting,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_vehicle_rows(&mut self, rows: &[VehicleRow]) -> OutputResult<()> {
        for row in rows {
            self.vehicles.write_record(&[
                row.time.to_string(),
                row.name.clone(),
                row.lat.to_string(),
                row.lon.to_string(),
                row.passengers.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_waiting_rows(&mut self, rows: &[WaitingRow]) -> OutputResult<()> {
        for row in rows {
            self.waiting.write_record(&[
                row.time.to_string(),
                row.node.to_string(),
                row.waiting.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.vehicles.flush()?;
        self.waiting.flush()?;
        Ok(())
    }
}
