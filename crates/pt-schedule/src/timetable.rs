//! The built timetable: itineraries plus their dispatch queues.

use pt_core::{CostModel, ItineraryId, Scenario};
use pt_network::TransitGraph;

use crate::dispatch::DispatchQueue;
use crate::error::ScheduleResult;
use crate::headway::{HeadwayPolicy, square_root_headways};
use crate::itinerary::{Itinerary, ItinerarySpec};

/// Every itinerary of the run, indexed by `ItineraryId`, with the dispatch
/// minutes each will produce. Built once at setup; the simulation core owns
/// the mutable queue cursors.
pub struct Timetable {
    itineraries: Vec<Itinerary>,
    dispatch: Vec<DispatchQueue>,
    headways: Vec<u32>,
}

impl Timetable {
    /// Resolve specs against the graph and build dispatch queues under the
    /// chosen headway policy.
    pub fn build(
        specs: &[ItinerarySpec],
        graph: &TransitGraph,
        policy: HeadwayPolicy,
        costs: &CostModel,
        scenario: &Scenario,
    ) -> ScheduleResult<Timetable> {
        let itineraries: Vec<Itinerary> = specs
            .iter()
            .map(|spec| Itinerary::from_stop_names(&spec.name, &spec.stop_names, graph))
            .collect::<ScheduleResult<_>>()?;

        let table_gaps: Vec<u32> = specs.iter().map(|s| s.headway_min).collect();
        let headways = match policy {
            HeadwayPolicy::FixedFromTable => table_gaps,
            HeadwayPolicy::SquareRoot => {
                square_root_headways(&itineraries, graph, costs, scenario, &table_gaps)
            }
        };

        let dispatch: Vec<DispatchQueue> = specs
            .iter()
            .zip(&headways)
            .map(|(spec, &headway)| {
                DispatchQueue::build(&spec.name, spec.first_offset, headway, spec.last_departure)
            })
            .collect::<ScheduleResult<_>>()?;

        Ok(Timetable { itineraries, dispatch, headways })
    }

    pub fn len(&self) -> usize {
        self.itineraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.itineraries.is_empty()
    }

    #[inline]
    pub fn itinerary(&self, id: ItineraryId) -> &Itinerary {
        &self.itineraries[id.index()]
    }

    pub fn itineraries(&self) -> &[Itinerary] {
        &self.itineraries
    }

    /// The headway each queue was built with (table or optimised).
    pub fn headways(&self) -> &[u32] {
        &self.headways
    }

    pub fn dispatch_queues(&self) -> &[DispatchQueue] {
        &self.dispatch
    }

    /// Hand the mutable queue cursors to the simulation core.
    pub fn into_parts(self) -> (Vec<Itinerary>, Vec<DispatchQueue>) {
        (self.itineraries, self.dispatch)
    }

    pub fn ids(&self) -> impl Iterator<Item = ItineraryId> + '_ {
        (0..self.itineraries.len()).map(|i| ItineraryId(i as u32))
    }

    /// Find an itinerary by name, for tests and diagnostics.
    pub fn id_of(&self, name: &str) -> Option<ItineraryId> {
        self.itineraries
            .iter()
            .position(|i| i.name() == name)
            .map(|i| ItineraryId(i as u32))
    }
}
