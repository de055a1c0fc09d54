//! CSV loaders for the `schedule` and `segments` input tables.
//!
//! # Simple schedules
//!
//! ```csv
//! Name,Gap,Offset,Finish,Schedule
//! T1,30,0,120,"A,B,A"
//! ```
//!
//! `Schedule` is a comma-separated list of stop names.
//!
//! # Complex schedules
//!
//! The `Schedule` column is replaced by `Schedule Segments`, a comma-separated
//! list of segment names resolved against the `segments` table:
//!
//! ```csv
//! Route,Modifier,Schedule
//! A-C,,"A,B,C"
//! A-C,fast,"A,C"
//! ```
//!
//! Each segment row auto-generates its reverse; chains are validated at every
//! junction (see [`SegmentTable::assemble`]).

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ScheduleError, ScheduleResult};
use crate::itinerary::ItinerarySpec;
use crate::segment::SegmentTable;

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SimpleScheduleRecord {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Gap")]
    gap: i64,
    #[serde(rename = "Offset")]
    offset: u32,
    #[serde(rename = "Finish")]
    finish: u32,
    #[serde(rename = "Schedule")]
    schedule: String,
}

#[derive(Deserialize)]
struct ComplexScheduleRecord {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Gap")]
    gap: i64,
    #[serde(rename = "Offset")]
    offset: u32,
    #[serde(rename = "Finish")]
    finish: u32,
    #[serde(rename = "Schedule Segments")]
    segments: String,
}

#[derive(Deserialize)]
struct SegmentRecord {
    #[serde(rename = "Route")]
    route: String,
    #[serde(rename = "Modifier", default)]
    modifier: String,
    #[serde(rename = "Schedule")]
    schedule: String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load simple-schedule specs from a CSV file.
pub fn load_simple_schedules_csv(path: &Path) -> ScheduleResult<Vec<ItinerarySpec>> {
    load_simple_schedules_reader(std::fs::File::open(path)?)
}

/// Like [`load_simple_schedules_csv`] but accepting any `Read` source.
pub fn load_simple_schedules_reader<R: Read>(reader: R) -> ScheduleResult<Vec<ItinerarySpec>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut specs = Vec::new();
    for result in csv_reader.deserialize::<SimpleScheduleRecord>() {
        let row = result?;
        specs.push(ItinerarySpec {
            headway_min: positive_gap(&row.name, row.gap)?,
            first_offset: row.offset,
            last_departure: row.finish,
            stop_names: split_name_list(&row.schedule),
            name: row.name,
        });
    }
    Ok(specs)
}

/// Load complex-schedule specs from the schedule and segments CSV files.
pub fn load_complex_schedules_csv(
    schedules: &Path,
    segments: &Path,
) -> ScheduleResult<Vec<ItinerarySpec>> {
    load_complex_schedules_reader(
        std::fs::File::open(schedules)?,
        std::fs::File::open(segments)?,
    )
}

/// Like [`load_complex_schedules_csv`] but accepting any `Read` sources.
pub fn load_complex_schedules_reader<S: Read, G: Read>(
    schedules: S,
    segments: G,
) -> ScheduleResult<Vec<ItinerarySpec>> {
    // ── Segment table, forward + reverse ──────────────────────────────────
    let mut table = SegmentTable::new();
    let mut segment_reader = csv::Reader::from_reader(segments);
    for result in segment_reader.deserialize::<SegmentRecord>() {
        let row = result?;
        table.add_row(
            row.route.trim(),
            row.modifier.trim(),
            split_name_list(&row.schedule),
        )?;
    }

    // ── Schedule rows, assembled through the table ────────────────────────
    let mut csv_reader = csv::Reader::from_reader(schedules);
    let mut specs = Vec::new();
    for result in csv_reader.deserialize::<ComplexScheduleRecord>() {
        let row = result?;
        let chain = split_name_list(&row.segments);
        let stop_names = table.assemble(&row.name, &chain)?;
        specs.push(ItinerarySpec {
            headway_min: positive_gap(&row.name, row.gap)?,
            first_offset: row.offset,
            last_departure: row.finish,
            stop_names,
            name: row.name,
        });
    }
    Ok(specs)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Split a comma-separated name list, trimming surrounding whitespace.
pub fn split_name_list(s: &str) -> Vec<String> {
    s.split(',').map(|part| part.trim().to_owned()).collect()
}

fn positive_gap(name: &str, gap: i64) -> ScheduleResult<u32> {
    if gap <= 0 {
        return Err(ScheduleError::BadHeadway {
            name: name.to_owned(),
            headway: gap,
        });
    }
    Ok(gap as u32)
}
