//! Schedule-subsystem error type.

use thiserror::Error;

use pt_network::NetworkError;

/// Errors produced while assembling timetables. All are fatal at setup.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("itinerary {name:?} has fewer than two stops")]
    TooShort { name: String },

    #[error("itinerary {name:?}: no edge from {from:?} to {to:?}")]
    MissingEdge {
        name: String,
        from: String,
        to: String,
    },

    #[error("itinerary {name:?} has non-positive headway {headway}")]
    BadHeadway { name: String, headway: i64 },

    #[error("unknown segment name {0:?}")]
    UnknownSegment(String),

    #[error("duplicate segment name {0:?} (reverse of another segment?)")]
    DuplicateSegment(String),

    #[error(
        "schedule {schedule:?}: segment {prev_segment:?} ends at {prev_last:?} \
         but segment {next_segment:?} starts at {next_first:?}"
    )]
    JunctionMismatch {
        schedule: String,
        prev_segment: String,
        prev_last: String,
        next_segment: String,
        next_first: String,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
