//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use pt_sim::{RunCounters, SimObserver, TickFrame};

use crate::error::OutputError;
use crate::row::{VehicleRow, WaitingRow};
use crate::writer::OutputWriter;

/// A [`SimObserver`] that streams every tick to an [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because observer hooks have
/// no return value. After the run, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer: W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after the run finishes.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, frame: &TickFrame<'_>) {
        let vehicle_rows: Vec<VehicleRow> = frame
            .vehicles
            .iter()
            .map(|v| VehicleRow {
                time: frame.time.0,
                name: v.name.clone(),
                lat: v.lat,
                lon: v.lon,
                passengers: v.passengers,
            })
            .collect();
        if !vehicle_rows.is_empty() {
            let result = self.writer.write_vehicle_rows(&vehicle_rows);
            self.store_err(result);
        }

        let waiting_rows: Vec<WaitingRow> = frame
            .node_waiting
            .iter()
            .enumerate()
            .map(|(node, &waiting)| WaitingRow {
                time: frame.time.0,
                node: node as u32,
                waiting,
            })
            .collect();
        let result = self.writer.write_waiting_rows(&waiting_rows);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _counters: &RunCounters) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
