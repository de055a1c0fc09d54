//! Unit tests for pt-schedule.

use pt_core::GeoPoint;
use pt_network::{TransitGraph, TransitGraphBuilder};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn pos(i: usize) -> GeoPoint {
    GeoPoint::new(i as f32 * 0.01, 151.0)
}

/// A =10= B =15= C, bidirectional, with daily passenger volumes.
fn shuttle_graph() -> TransitGraph {
    let mut b = TransitGraphBuilder::new();
    b.add_stop("A", pos(0), 60).unwrap();
    b.add_stop("B", pos(1), 60).unwrap();
    b.add_stop("C", pos(2), 30).unwrap();
    b.add_two_way("A", "B", 10).unwrap();
    b.add_two_way("B", "C", 15).unwrap();
    b.build()
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ── Itinerary construction ────────────────────────────────────────────────────

#[cfg(test)]
mod itinerary_tests {
    use super::*;
    use crate::error::ScheduleError;
    use crate::itinerary::Itinerary;

    #[test]
    fn offsets_accumulate_edge_times() {
        let g = shuttle_graph();
        let it = Itinerary::from_stop_names("T1", &names(&["A", "B", "C"]), &g).unwrap();
        assert_eq!(it.offsets(), [0, 10, 25]);
        assert_eq!(it.length_min(), 25);
        assert_eq!(it.leg_travel_min(0), 10);
        assert_eq!(it.leg_travel_min(1), 15);
    }

    #[test]
    fn loop_route_visits_origin_twice() {
        let g = shuttle_graph();
        let it = Itinerary::from_stop_names("Loop", &names(&["A", "B", "A"]), &g).unwrap();
        assert_eq!(it.stop_count(), 3);
        assert_eq!(it.stop(0), it.stop(2));
        assert_eq!(it.last_index(), 2);
        assert_eq!(it.offsets(), [0, 10, 20]);
        // First occurrence wins for boarding lookups.
        assert_eq!(it.first_position_of(it.stop(0)), Some(0));
    }

    #[test]
    fn downstream_lists_later_stops_with_ride_minutes() {
        let g = shuttle_graph();
        let it = Itinerary::from_stop_names("T1", &names(&["A", "B", "C"]), &g).unwrap();
        let b = g.node_id("B").unwrap();
        let c = g.node_id("C").unwrap();
        let from_b: Vec<_> = it.downstream(1).collect();
        assert_eq!(from_b, [(c, 15)]);
        let from_a: Vec<_> = it.downstream(0).collect();
        assert_eq!(from_a, [(b, 10), (c, 25)]);
    }

    #[test]
    fn single_stop_rejected() {
        let g = shuttle_graph();
        let err = Itinerary::from_stop_names("Stub", &names(&["A"]), &g).unwrap_err();
        assert!(matches!(err, ScheduleError::TooShort { .. }));
    }

    #[test]
    fn unlinked_pair_rejected() {
        let g = shuttle_graph();
        let err = Itinerary::from_stop_names("Skip", &names(&["A", "C"]), &g).unwrap_err();
        assert!(matches!(err, ScheduleError::MissingEdge { .. }));
    }

    #[test]
    fn unknown_stop_rejected() {
        let g = shuttle_graph();
        assert!(Itinerary::from_stop_names("Ghost", &names(&["A", "Xanadu"]), &g).is_err());
    }
}

// ── Dispatch queues ───────────────────────────────────────────────────────────

#[cfg(test)]
mod dispatch_tests {
    use crate::dispatch::DispatchQueue;
    use crate::error::ScheduleError;
    use pt_core::Minute;

    #[test]
    fn queue_spans_offset_to_finish_inclusive() {
        let q = DispatchQueue::build("T1", 0, 30, 120).unwrap();
        let minutes: Vec<u32> = q.all_times().iter().map(|m| m.0).collect();
        assert_eq!(minutes, [0, 30, 60, 90, 120]);
    }

    #[test]
    fn offset_past_finish_never_dispatches() {
        let q = DispatchQueue::build("Late", 200, 30, 120).unwrap();
        assert!(q.is_empty());
    }

    #[test]
    fn pops_strictly_from_the_head() {
        let mut q = DispatchQueue::build("T1", 10, 20, 60).unwrap();
        assert!(!q.pop_due(Minute(0)));
        assert!(q.pop_due(Minute(10)));
        assert!(!q.pop_due(Minute(10)), "at most one vehicle per minute");
        assert!(!q.pop_due(Minute(20)));
        assert!(q.pop_due(Minute(30)));
        assert_eq!(q.remaining(), [Minute(50)]);
    }

    #[test]
    fn zero_headway_rejected() {
        assert!(matches!(
            DispatchQueue::build("T1", 0, 0, 60),
            Err(ScheduleError::BadHeadway { .. })
        ));
    }
}

// ── Headway optimiser ─────────────────────────────────────────────────────────

#[cfg(test)]
mod headway_tests {
    use super::*;
    use crate::headway::square_root_headways;
    use crate::itinerary::Itinerary;
    use pt_core::{CostModel, Scenario};

    fn costs(vehicle: f64, waiting: f64) -> CostModel {
        CostModel {
            vehicle_cost: vehicle,
            agent_cost_seated: 10.0,
            agent_cost_standing: 15.0,
            agent_cost_waiting: waiting,
            unfinished_penalty: 50.0,
        }
    }

    #[test]
    fn square_root_rule_by_hand() {
        // Loop A-B-A: length 20 min, run cost 20/60*100. A is visited twice
        // by the only itinerary, so its 60 daily passengers split in half per
        // visit; B contributes its full 60.
        //   W = 30 + 60 + 30 = 120
        //   h* = sqrt(2 * 33.33 / (120 * 20)) h = 0.1667 h = 10 min
        let g = shuttle_graph();
        let it = Itinerary::from_stop_names("Loop", &names(&["A", "B", "A"]), &g).unwrap();
        let scenario = Scenario::new(vec![1.0, 1.0], 60);
        let h = square_root_headways(&[it], &g, &costs(100.0, 20.0), &scenario, &[30]);
        assert_eq!(h, [10]);
    }

    #[test]
    fn demand_split_between_serving_itineraries() {
        // Two identical itineraries halve each stop's weight, so each
        // optimal headway grows by sqrt(2).
        let g = shuttle_graph();
        let i1 = Itinerary::from_stop_names("L1", &names(&["A", "B", "A"]), &g).unwrap();
        let i2 = Itinerary::from_stop_names("L2", &names(&["A", "B", "A"]), &g).unwrap();
        let scenario = Scenario::new(vec![1.0, 1.0], 60);
        let h = square_root_headways(
            &[i1, i2],
            &g,
            &costs(100.0, 20.0),
            &scenario,
            &[30, 30],
        );
        // W halves to 60: h* = 0.2357 h = 14.14 min, rounded to 14.
        assert_eq!(h, [14, 14]);
    }

    #[test]
    fn zero_demand_falls_back_to_table_gap() {
        let mut b = TransitGraphBuilder::new();
        b.add_stop("A", pos(0), 0).unwrap();
        b.add_stop("B", pos(1), 0).unwrap();
        b.add_two_way("A", "B", 10).unwrap();
        let g = b.build();
        let it = Itinerary::from_stop_names("Empty", &names(&["A", "B"]), &g).unwrap();
        let scenario = Scenario::new(vec![1.0, 1.0], 60);
        let h = square_root_headways(&[it], &g, &costs(100.0, 20.0), &scenario, &[45]);
        assert_eq!(h, [45]);
    }
}

// ── Segments and complex assembly ─────────────────────────────────────────────

#[cfg(test)]
mod segment_tests {
    use super::*;
    use crate::error::ScheduleError;
    use crate::segment::SegmentTable;

    #[test]
    fn rows_generate_reverse_segments() {
        let mut t = SegmentTable::new();
        t.add_row("A-C", "", names(&["A", "B", "C"])).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.stops_of("A-C").unwrap(), ["A", "B", "C"]);
        assert_eq!(t.stops_of("C-A").unwrap(), ["C", "B", "A"]);
    }

    #[test]
    fn modifier_becomes_part_of_both_names() {
        let mut t = SegmentTable::new();
        t.add_row("A-C", "fast", names(&["A", "C"])).unwrap();
        assert!(t.stops_of("A-C fast").is_some());
        assert!(t.stops_of("C-A fast").is_some());
        assert!(t.stops_of("A-C").is_none());
    }

    #[test]
    fn chains_share_their_junction_stop_once() {
        let mut t = SegmentTable::new();
        t.add_row("A-C", "", names(&["A", "B", "C"])).unwrap();
        t.add_row("C-E", "", names(&["C", "D", "E"])).unwrap();
        let stops = t
            .assemble("T1", &names(&["A-C", "C-E"]))
            .unwrap();
        assert_eq!(stops, ["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn reverse_chain_assembles_too() {
        let mut t = SegmentTable::new();
        t.add_row("A-C", "", names(&["A", "B", "C"])).unwrap();
        t.add_row("C-E", "", names(&["C", "D", "E"])).unwrap();
        let stops = t
            .assemble("T1 back", &names(&["E-C", "C-A"]))
            .unwrap();
        assert_eq!(stops, ["E", "D", "C", "B", "A"]);
    }

    #[test]
    fn junction_mismatch_is_fatal_and_names_the_pair() {
        let mut t = SegmentTable::new();
        t.add_row("A-C", "", names(&["A", "B", "C"])).unwrap();
        t.add_row("D-F", "", names(&["D", "E", "F"])).unwrap();
        let err = t
            .assemble("Broken", &names(&["A-C", "D-F"]))
            .unwrap_err();
        match err {
            ScheduleError::JunctionMismatch {
                schedule,
                prev_last,
                next_first,
                ..
            } => {
                assert_eq!(schedule, "Broken");
                assert_eq!(prev_last, "C");
                assert_eq!(next_first, "D");
            }
            other => panic!("expected JunctionMismatch, got {other}"),
        }
    }

    #[test]
    fn unknown_segment_rejected() {
        let t = SegmentTable::new();
        assert!(matches!(
            t.assemble("T1", &names(&["A-B"])),
            Err(ScheduleError::UnknownSegment(_))
        ));
    }

    #[test]
    fn explicit_reverse_row_collides_with_generated_one() {
        let mut t = SegmentTable::new();
        t.add_row("A-B", "", names(&["A", "B"])).unwrap();
        assert!(matches!(
            t.add_row("B-A", "", names(&["B", "A"])),
            Err(ScheduleError::DuplicateSegment(_))
        ));
    }
}

// ── Loaders and timetable ─────────────────────────────────────────────────────

#[cfg(test)]
mod loader_tests {
    use std::io::Cursor;

    use super::*;
    use crate::error::ScheduleError;
    use crate::headway::HeadwayPolicy;
    use crate::loader::{load_complex_schedules_reader, load_simple_schedules_reader};
    use crate::timetable::Timetable;
    use pt_core::{CostModel, Minute, Scenario};

    const SIMPLE: &str = "\
Name,Gap,Offset,Finish,Schedule
T1,30,0,120,\"A,B,A\"
T2,20,5,60,\"B,C\"
";

    fn costs() -> CostModel {
        CostModel {
            vehicle_cost: 100.0,
            agent_cost_seated: 10.0,
            agent_cost_standing: 15.0,
            agent_cost_waiting: 20.0,
            unfinished_penalty: 50.0,
        }
    }

    #[test]
    fn simple_schedules_parse() {
        let specs = load_simple_schedules_reader(Cursor::new(SIMPLE)).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "T1");
        assert_eq!(specs[0].headway_min, 30);
        assert_eq!(specs[0].stop_names, ["A", "B", "A"]);
        assert_eq!(specs[1].first_offset, 5);
        assert_eq!(specs[1].last_departure, 60);
    }

    #[test]
    fn non_positive_gap_rejected() {
        let bad = "Name,Gap,Offset,Finish,Schedule\nT1,0,0,120,\"A,B\"\n";
        assert!(matches!(
            load_simple_schedules_reader(Cursor::new(bad)),
            Err(ScheduleError::BadHeadway { .. })
        ));
    }

    #[test]
    fn complex_schedules_assemble_from_segments() {
        let schedules = "\
Name,Gap,Offset,Finish,Schedule Segments
Through,15,0,60,\"A-B,B-C\"
Back,15,0,60,\"C-B,B-A\"
";
        let segments = "\
Route,Modifier,Schedule
A-B,,\"A,B\"
B-C,,\"B,C\"
";
        let specs =
            load_complex_schedules_reader(Cursor::new(schedules), Cursor::new(segments)).unwrap();
        assert_eq!(specs[0].stop_names, ["A", "B", "C"]);
        assert_eq!(specs[1].stop_names, ["C", "B", "A"]);
    }

    #[test]
    fn timetable_builds_with_table_headways() {
        let g = shuttle_graph();
        let specs = load_simple_schedules_reader(Cursor::new(SIMPLE)).unwrap();
        let scenario = Scenario::new(vec![1.0, 1.0], 60);
        let tt =
            Timetable::build(&specs, &g, HeadwayPolicy::FixedFromTable, &costs(), &scenario)
                .unwrap();
        assert_eq!(tt.len(), 2);
        assert_eq!(tt.headways(), [30, 20]);
        let t1 = tt.id_of("T1").unwrap();
        assert_eq!(tt.itinerary(t1).length_min(), 20);
        let minutes: Vec<Minute> = tt.dispatch_queues()[t1.index()].all_times().to_vec();
        assert_eq!(minutes, [Minute(0), Minute(30), Minute(60), Minute(90), Minute(120)]);
    }

    #[test]
    fn timetable_optimised_headways_replace_table_gaps() {
        let g = shuttle_graph();
        let specs = load_simple_schedules_reader(Cursor::new("\
Name,Gap,Offset,Finish,Schedule
Loop,30,0,120,\"A,B,A\"
")).unwrap();
        let scenario = Scenario::new(vec![1.0, 1.0], 60);
        let tt = Timetable::build(&specs, &g, HeadwayPolicy::SquareRoot, &costs(), &scenario)
            .unwrap();
        assert_eq!(tt.headways(), [10]);
    }
}
