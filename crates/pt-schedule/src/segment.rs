//! Complex-schedule segments.
//!
//! A segment describes a short route through the network, named by its
//! endpoints (`"A-B"`) plus an optional modifier (`"A-B fast"`). Every input
//! row also generates the reverse segment (`"B-A"`) with the reversed stop
//! list and the same modifier, so timetable authors describe each corridor
//! once.
//!
//! Complex schedules are chains of segment names. Consecutive segments must
//! share their junction stop (segment i's last stop = segment i+1's first
//! stop); the junction stop is emitted once in the assembled stop list. A
//! mismatch is fatal and names the offending pair.

use rustc_hash::FxHashMap;

use crate::error::{ScheduleError, ScheduleResult};

// ── SegmentTable ──────────────────────────────────────────────────────────────

/// All segments by name, forward and auto-generated reverse.
pub struct SegmentTable {
    index: FxHashMap<String, usize>,
    stop_lists: Vec<Vec<String>>,
}

impl SegmentTable {
    pub fn new() -> Self {
        Self {
            index: FxHashMap::default(),
            stop_lists: Vec::new(),
        }
    }

    /// Register one input row: the forward segment and its reverse.
    ///
    /// Reverse segments inherit the forward modifier verbatim, so a table
    /// that already names both directions of a modified corridor collides
    /// here and is rejected.
    pub fn add_row(
        &mut self,
        route: &str,
        modifier: &str,
        stops: Vec<String>,
    ) -> ScheduleResult<()> {
        let forward = segment_name(route, modifier);
        let reverse_route = reverse_route_name(route)?;
        let reverse = segment_name(&reverse_route, modifier);

        let mut reversed_stops = stops.clone();
        reversed_stops.reverse();

        self.insert(forward, stops)?;
        self.insert(reverse, reversed_stops)
    }

    fn insert(&mut self, name: String, stops: Vec<String>) -> ScheduleResult<()> {
        if self.index.contains_key(&name) {
            return Err(ScheduleError::DuplicateSegment(name));
        }
        self.index.insert(name, self.stop_lists.len());
        self.stop_lists.push(stops);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.stop_lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stop_lists.is_empty()
    }

    pub fn stops_of(&self, name: &str) -> Option<&[String]> {
        self.index.get(name).map(|&i| self.stop_lists[i].as_slice())
    }

    /// Concatenate a chain of segment names into one stop list, validating
    /// every junction.
    pub fn assemble(&self, schedule: &str, chain: &[String]) -> ScheduleResult<Vec<String>> {
        let mut stops: Vec<String> = Vec::new();
        let mut prev_name: Option<&str> = None;

        for segment in chain {
            let segment_stops = self
                .stops_of(segment)
                .ok_or_else(|| ScheduleError::UnknownSegment(segment.clone()))?;

            match prev_name {
                None => stops.extend_from_slice(segment_stops),
                Some(prev) => {
                    let junction = stops.last().expect("chained segment is never empty");
                    let first = segment_stops
                        .first()
                        .ok_or_else(|| ScheduleError::UnknownSegment(segment.clone()))?;
                    if junction != first {
                        return Err(ScheduleError::JunctionMismatch {
                            schedule: schedule.to_owned(),
                            prev_segment: prev.to_owned(),
                            prev_last: junction.clone(),
                            next_segment: segment.clone(),
                            next_first: first.clone(),
                        });
                    }
                    // The junction stop appears once in the assembled run.
                    stops.extend_from_slice(&segment_stops[1..]);
                }
            }
            prev_name = Some(segment.as_str());
        }

        Ok(stops)
    }
}

impl Default for SegmentTable {
    fn default() -> Self {
        Self::new()
    }
}

// ── Name helpers ──────────────────────────────────────────────────────────────

fn segment_name(route: &str, modifier: &str) -> String {
    if modifier.is_empty() {
        route.to_owned()
    } else {
        format!("{route} {modifier}")
    }
}

/// `"A-B"` becomes `"B-A"`.
fn reverse_route_name(route: &str) -> ScheduleResult<String> {
    let (start, end) = route.split_once('-').ok_or_else(|| {
        ScheduleError::Parse(format!("invalid segment Route {route:?}: expected \"A-B\""))
    })?;
    Ok(format!("{end}-{start}"))
}
