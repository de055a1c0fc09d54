//! Headway selection.
//!
//! # The square-root rule
//!
//! For one itinerary, total cost per hour as a function of headway `h` is
//! approximately
//!
//! ```text
//! operating(h) + waiting(h) = (L/60) * vehicle_cost / h  +  W * waiting_cost * h / 2
//! ```
//!
//! where `L` is the route length in minutes and `W` the hourly demand weight
//! of the stops served. Minimising over `h` gives the classic square-root
//! headway
//!
//! ```text
//! h* = sqrt(2 * (L/60) * vehicle_cost / (W * waiting_cost))
//! ```
//!
//! in hours, rounded here to whole minutes. Demand weight `W` sums each
//! served stop's daily total scaled by the scenario's mean multiplier, split
//! evenly across the itineraries serving that stop.

use log::{debug, warn};

use pt_core::{CostModel, Scenario};
use pt_network::TransitGraph;

use crate::itinerary::Itinerary;

/// Where dispatch headways come from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HeadwayPolicy {
    /// Use the `Gap` column of the schedule table as-is.
    FixedFromTable,
    /// Replace every gap with the square-root-rule optimum.
    SquareRoot,
}

/// Compute the optimal headway in minutes for every itinerary.
///
/// `fallback[i]` (the table gap) is kept for any itinerary whose demand
/// weight is zero, where the rule has no finite optimum.
pub fn square_root_headways(
    itineraries: &[Itinerary],
    graph: &TransitGraph,
    costs: &CostModel,
    scenario: &Scenario,
    fallback: &[u32],
) -> Vec<u32> {
    let mean_multiplier = scenario.mean_multiplier();

    // Itineraries serving each stop, counted per visit so that a loop route
    // claims its terminus twice, mirroring its doubled dwell there.
    let mut serving = vec![0u32; graph.node_count()];
    for itinerary in itineraries {
        for &stop in itinerary.stops() {
            serving[stop.index()] += 1;
        }
    }

    itineraries
        .iter()
        .zip(fallback)
        .map(|(itinerary, &table_gap)| {
            let run_cost = itinerary.length_min() as f64 / 60.0 * costs.vehicle_cost;

            let weighted_demand: f64 = itinerary
                .stops()
                .iter()
                .map(|&stop| {
                    graph.daily_passengers(stop) as f64 * mean_multiplier
                        / serving[stop.index()] as f64
                })
                .sum();

            let denominator = weighted_demand * costs.agent_cost_waiting;
            if denominator <= 0.0 {
                warn!(
                    "itinerary {:?} has no demand weight; keeping table headway {table_gap}",
                    itinerary.name()
                );
                return table_gap;
            }

            let optimal_hours = (2.0 * run_cost / denominator).sqrt();
            let headway = (optimal_hours * 60.0).round().max(1.0) as u32;
            debug!(
                "itinerary {:?}: optimal headway {headway} min (demand weight {weighted_demand:.1})",
                itinerary.name()
            );
            headway
        })
        .collect()
}
