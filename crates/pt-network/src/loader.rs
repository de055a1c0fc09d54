//! CSV loaders for the `nodes` and `edges` input tables.
//!
//! # Table formats
//!
//! Column names are the contract (case-sensitive):
//!
//! ```csv
//! Name,Location,Daily Passengers
//! Central,"-33.883, 151.207","12,000"
//! Newtown,"-33.896, 151.179",4000
//! ```
//!
//! `Location` is `"<lat>, <lon>"`; `Daily Passengers` is an integer and may
//! carry thousands separators (quoted in the CSV).
//!
//! ```csv
//! Start,End,Time,Bidirectional
//! Central,Newtown,4,Yes
//! ```
//!
//! `Time` is positive whole minutes. `Bidirectional = Yes` rows expand to two
//! directed edges; `No` rows to one.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use pt_core::GeoPoint;

use crate::error::{NetworkError, NetworkResult};
use crate::graph::{TransitGraph, TransitGraphBuilder};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Daily Passengers")]
    daily_passengers: String,
}

#[derive(Deserialize)]
struct EdgeRecord {
    #[serde(rename = "Start")]
    start: String,
    #[serde(rename = "End")]
    end: String,
    #[serde(rename = "Time")]
    time: i64,
    #[serde(rename = "Bidirectional")]
    bidirectional: String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a [`TransitGraph`] from the `nodes` and `edges` CSV files.
pub fn load_network_csv(nodes: &Path, edges: &Path) -> NetworkResult<TransitGraph> {
    let nodes_file = std::fs::File::open(nodes)?;
    let edges_file = std::fs::File::open(edges)?;
    load_network_reader(nodes_file, edges_file)
}

/// Like [`load_network_csv`] but accepting any `Read` sources.
///
/// Useful for testing (pass `std::io::Cursor`s) or embedded fixtures.
pub fn load_network_reader<N: Read, E: Read>(
    nodes: N,
    edges: E,
) -> NetworkResult<TransitGraph> {
    let mut builder = TransitGraphBuilder::new();

    // ── Node rows ─────────────────────────────────────────────────────────
    let mut node_reader = csv::Reader::from_reader(nodes);
    for result in node_reader.deserialize::<NodeRecord>() {
        let row = result?;
        let pos = parse_location(&row.location)?;
        let daily = parse_grouped_int(&row.daily_passengers)?;
        builder.add_stop(&row.name, pos, daily)?;
    }

    // ── Edge rows ─────────────────────────────────────────────────────────
    let mut edge_reader = csv::Reader::from_reader(edges);
    for result in edge_reader.deserialize::<EdgeRecord>() {
        let row = result?;
        match row.bidirectional.trim() {
            "Yes" => builder.add_two_way(&row.start, &row.end, row.time)?,
            "No" => builder.add_link(&row.start, &row.end, row.time)?,
            other => {
                return Err(NetworkError::Parse(format!(
                    "invalid Bidirectional value {other:?}: expected \"Yes\" or \"No\""
                )));
            }
        }
    }

    Ok(builder.build())
}

// ── Field parsers ─────────────────────────────────────────────────────────────

/// Parse a `"<lat>, <lon>"` coordinate pair (the format map tools copy out).
pub fn parse_location(s: &str) -> NetworkResult<GeoPoint> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| NetworkError::Parse(format!("invalid Location {s:?}: missing comma")))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f32>()
            .map_err(|_| NetworkError::Parse(format!("invalid Location {s:?}: bad coordinate")))
    };
    Ok(GeoPoint::new(parse(lat)?, parse(lon)?))
}

/// Parse an integer that may carry thousands separators, e.g. `"12,000"`.
pub fn parse_grouped_int(s: &str) -> NetworkResult<u32> {
    let cleaned: String = s.trim().chars().filter(|&c| c != ',').collect();
    cleaned
        .parse::<u32>()
        .map_err(|_| NetworkError::Parse(format!("invalid integer {s:?}")))
}
