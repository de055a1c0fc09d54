//! Per-itinerary dispatch queues.
//!
//! A queue is the precomputed, sorted list of absolute minutes at which a
//! vehicle of one itinerary is created:
//! `{first_offset, first_offset + h, ..., <= last_departure}`.
//!
//! During simulation the dispatcher pops strictly from the head; at most one
//! vehicle per itinerary is created per minute by construction (headway is at
//! least one). Dispatches that coincide with a still-active predecessor are
//! allowed; terminal bunching is the operator's problem.

use pt_core::Minute;

use crate::error::{ScheduleError, ScheduleResult};

/// Sorted queue of future dispatch minutes for one itinerary.
#[derive(Clone, Debug)]
pub struct DispatchQueue {
    times: Vec<Minute>,
    head: usize,
}

impl DispatchQueue {
    /// Precompute all dispatch minutes for `(first_offset, headway,
    /// last_departure)`. An itinerary whose offset is already past its finish
    /// simply never dispatches.
    pub fn build(
        name: &str,
        first_offset: u32,
        headway_min: u32,
        last_departure: u32,
    ) -> ScheduleResult<DispatchQueue> {
        if headway_min == 0 {
            return Err(ScheduleError::BadHeadway {
                name: name.to_owned(),
                headway: 0,
            });
        }
        let mut times = Vec::new();
        let mut t = first_offset;
        while t <= last_departure {
            times.push(Minute(t));
            t += headway_min;
        }
        Ok(DispatchQueue { times, head: 0 })
    }

    /// Pop the head entry if it equals `now`. Returns whether a vehicle is
    /// due this minute.
    #[inline]
    pub fn pop_due(&mut self, now: Minute) -> bool {
        if self.head < self.times.len() && self.times[self.head] == now {
            self.head += 1;
            true
        } else {
            false
        }
    }

    /// Every dispatch minute of the run, including already-popped ones.
    /// Service boards are precomputed from this full list at setup.
    pub fn all_times(&self) -> &[Minute] {
        &self.times
    }

    /// Dispatches not yet popped.
    pub fn remaining(&self) -> &[Minute] {
        &self.times[self.head..]
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}
