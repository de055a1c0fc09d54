//! Network-subsystem error type.

use thiserror::Error;

/// Errors produced by `pt-network`. All are fatal at setup.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("unknown node name {0:?}")]
    UnknownNode(String),

    #[error("duplicate node name {0:?}")]
    DuplicateNode(String),

    #[error("duplicate edge from {start:?} to {end:?}: parallel edges between one ordered pair are unsupported")]
    DuplicateEdge { start: String, end: String },

    #[error("edge from {start:?} to {end:?} has non-positive travel time {minutes}")]
    BadTravelTime { start: String, end: String, minutes: i64 },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
