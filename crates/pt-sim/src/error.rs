//! Simulation-subsystem error type.

use thiserror::Error;

/// Errors raised while wiring a simulation together. Runtime conditions
/// (unreachable destinations, non-convergence) are counters, not errors.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("OD matrix is {od}x{od} but the network has {nodes} nodes")]
    DemandDimension { od: usize, nodes: usize },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
