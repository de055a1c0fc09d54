//! `pt-schedule` — timetables: what runs where, and how often.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`itinerary`] | `Itinerary`: ordered stops/edges with cumulative offsets  |
//! | [`segment`]   | Complex-schedule segment table and chain assembly         |
//! | [`dispatch`]  | `DispatchQueue`: absolute dispatch minutes per itinerary  |
//! | [`headway`]   | `HeadwayPolicy` and the square-root headway optimiser     |
//! | [`timetable`] | `Timetable`: built itineraries + dispatch queues          |
//! | [`loader`]    | `schedule` / `segments` CSV tables → `ItinerarySpec`s     |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                      |
//!
//! A `Timetable` is immutable once built; vehicles reference itineraries by
//! `ItineraryId` and copy only their own cursor at dispatch.

pub mod dispatch;
pub mod error;
pub mod headway;
pub mod itinerary;
pub mod loader;
pub mod segment;
pub mod timetable;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use dispatch::DispatchQueue;
pub use error::{ScheduleError, ScheduleResult};
pub use headway::{HeadwayPolicy, square_root_headways};
pub use itinerary::{Itinerary, ItinerarySpec};
pub use loader::{
    load_complex_schedules_csv, load_complex_schedules_reader, load_simple_schedules_csv,
    load_simple_schedules_reader,
};
pub use segment::SegmentTable;
pub use timetable::Timetable;
