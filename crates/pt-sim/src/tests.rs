//! Integration tests for pt-sim.

use std::io::Cursor;

use pt_core::{CostModel, GeoPoint, ItineraryId, Minute, Scenario, VehicleParams};
use pt_network::{OdMatrix, TransitGraph, TransitGraphBuilder};
use pt_schedule::{HeadwayPolicy, Itinerary, Timetable, load_simple_schedules_reader};

use crate::observer::{SimObserver, TickFrame, VehicleObservation};
use crate::sim::{RunCounters, Simulation, SimulationBuilder};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn pos(i: usize) -> GeoPoint {
    GeoPoint::new(i as f32, 151.0)
}

fn costs() -> CostModel {
    CostModel {
        vehicle_cost: 100.0,
        agent_cost_seated: 10.0,
        agent_cost_standing: 15.0,
        agent_cost_waiting: 20.0,
        unfinished_penalty: 50.0,
    }
}

fn params(max_seated: u32, max_standing: u32) -> VehicleParams {
    VehicleParams { max_seated, max_standing, traffic_time_gap: 60 }
}

/// Two stops 10 minutes apart, bidirectional.
fn shuttle_graph() -> TransitGraph {
    let mut b = TransitGraphBuilder::new();
    b.add_stop("A", pos(0), 60).unwrap();
    b.add_stop("B", pos(1), 60).unwrap();
    b.add_two_way("A", "B", 10).unwrap();
    b.build()
}

fn timetable(graph: &TransitGraph, schedule_csv: &str, scenario: &Scenario) -> Timetable {
    let specs = load_simple_schedules_reader(Cursor::new(schedule_csv)).unwrap();
    Timetable::build(&specs, graph, HeadwayPolicy::FixedFromTable, &costs(), scenario).unwrap()
}

fn build_sim(
    graph: TransitGraph,
    schedule_csv: &str,
    od_rows: Vec<f64>,
    multipliers: Vec<f64>,
    caps: VehicleParams,
) -> Simulation {
    let scenario = Scenario::new(multipliers, caps.traffic_time_gap);
    let tt = timetable(&graph, schedule_csv, &scenario);
    let n = graph.node_count();
    SimulationBuilder::new(graph, tt, OdMatrix::from_trips(n, od_rows), scenario, caps)
        .build()
        .unwrap()
}

/// Observer that copies every frame and the final counters.
#[derive(Default)]
struct Collector {
    frames: Vec<(u32, Vec<VehicleObservation>, Vec<u32>)>,
    counters: Option<RunCounters>,
}

impl SimObserver for Collector {
    fn on_tick_end(&mut self, frame: &TickFrame<'_>) {
        self.frames.push((
            frame.time.0,
            frame.vehicles.to_vec(),
            frame.node_waiting.to_vec(),
        ));
    }

    fn on_sim_end(&mut self, counters: &RunCounters) {
        self.counters = Some(*counters);
    }
}

fn distinct_vehicle_names(frames: &[(u32, Vec<VehicleObservation>, Vec<u32>)]) -> Vec<String> {
    let mut names: Vec<String> = frames
        .iter()
        .flat_map(|(_, vehicles, _)| vehicles.iter().map(|v| v.name.clone()))
        .collect();
    names.sort();
    names.dedup();
    names
}

// ── Vehicle state machine ─────────────────────────────────────────────────────

#[cfg(test)]
mod vehicle_tests {
    use super::*;
    use crate::vehicle::{StepOutcome, Vehicle, VehicleState};

    fn itinerary(graph: &TransitGraph, stops: &[&str]) -> Itinerary {
        let names: Vec<String> = stops.iter().map(|s| s.to_string()).collect();
        Itinerary::from_stop_names("T", &names, graph).unwrap()
    }

    #[test]
    fn travels_one_edge_and_terminates_next_tick() {
        let mut b = TransitGraphBuilder::new();
        b.add_stop("A", pos(0), 0).unwrap();
        b.add_stop("B", pos(1), 0).unwrap();
        b.add_two_way("A", "B", 2).unwrap();
        let g = b.build();
        let it = itinerary(&g, &["A", "B"]);
        let mut v = Vehicle::dispatch(ItineraryId(0), &it, Minute(0));

        assert!(v.is_at_stop());
        assert_eq!(v.step(&it), StepOutcome::Moving);
        assert_eq!(v.step(&it), StepOutcome::AtStop);
        assert_eq!(v.stop_index(), 1);
        // One alight opportunity at the terminus, removal on the next step.
        assert_eq!(v.step(&it), StepOutcome::Terminated);
    }

    #[test]
    fn one_minute_edge_never_enters_moving() {
        let mut b = TransitGraphBuilder::new();
        b.add_stop("A", pos(0), 0).unwrap();
        b.add_stop("B", pos(1), 0).unwrap();
        b.add_two_way("A", "B", 1).unwrap();
        let g = b.build();
        let it = itinerary(&g, &["A", "B"]);
        let mut v = Vehicle::dispatch(ItineraryId(0), &it, Minute(3));

        assert_eq!(v.step(&it), StepOutcome::AtStop);
        assert_eq!(v.stop_index(), 1);
        assert_eq!(v.state(), VehicleState::AtStop);
    }

    #[test]
    fn moving_position_interpolates_between_stops() {
        let mut b = TransitGraphBuilder::new();
        b.add_stop("A", GeoPoint::new(0.0, 0.0), 0).unwrap();
        b.add_stop("B", GeoPoint::new(1.0, 1.0), 0).unwrap();
        b.add_two_way("A", "B", 4).unwrap();
        let g = b.build();
        let it = itinerary(&g, &["A", "B"]);
        let mut v = Vehicle::dispatch(ItineraryId(0), &it, Minute(0));

        v.step(&it); // timer = 1
        v.step(&it); // timer = 2 of edge_len 4
        let p = v.position(&it, &g);
        assert!((p.lat - 0.5).abs() < 1e-6);
        assert!((p.lon - 0.5).abs() < 1e-6);
    }

    #[test]
    fn loop_route_terminates_only_at_final_index() {
        let g = shuttle_graph();
        let it = itinerary(&g, &["A", "B", "A"]);
        let mut v = Vehicle::dispatch(ItineraryId(0), &it, Minute(0));

        // Out (10 min) and back (10 min): 20 steps to the terminus.
        for _ in 0..20 {
            assert_ne!(v.step(&it), StepOutcome::Terminated, "terminated mid-lap");
        }
        assert_eq!(v.stop_index(), 2);
        assert!(v.is_at_stop());
        assert_eq!(v.step(&it), StepOutcome::Terminated);
    }

    #[test]
    fn vehicle_name_is_minute_then_itinerary() {
        let g = shuttle_graph();
        let it = itinerary(&g, &["A", "B"]);
        let v = Vehicle::dispatch(ItineraryId(0), &it, Minute(90));
        assert_eq!(v.name(), "90 T");
    }
}

// ── Time-dependent router ─────────────────────────────────────────────────────

#[cfg(test)]
mod router_tests {
    use super::*;
    use crate::plan::PlanStep;
    use crate::stop::Stops;

    /// A, B, C with a slow direct A-C edge and a faster two-leg path.
    fn transfer_graph() -> TransitGraph {
        let mut b = TransitGraphBuilder::new();
        b.add_stop("A", pos(0), 60).unwrap();
        b.add_stop("B", pos(1), 60).unwrap();
        b.add_stop("C", pos(2), 60).unwrap();
        b.add_link("A", "B", 10).unwrap();
        b.add_link("B", "C", 15).unwrap();
        b.add_link("A", "C", 30).unwrap();
        b.build()
    }

    #[test]
    fn prefers_earlier_two_leg_arrival_over_later_direct() {
        // Direct departs A at minute 20, arriving C at 50. Leg1 departs A at
        // 0 reaching B at 10; Leg2 calls at B at 12, reaching C at 27.
        let g = transfer_graph();
        let scenario = Scenario::new(vec![1.0, 1.0], 60);
        let tt = timetable(
            &g,
            "Name,Gap,Offset,Finish,Schedule\n\
             Direct,30,20,20,\"A,C\"\n\
             Leg1,30,0,0,\"A,B\"\n\
             Leg2,30,12,12,\"B,C\"\n",
            &scenario,
        );
        let direct = tt.id_of("Direct").unwrap();
        let leg1 = tt.id_of("Leg1").unwrap();
        let leg2 = tt.id_of("Leg2").unwrap();

        let mut stops = Stops::build(&g, tt.itineraries(), tt.dispatch_queues());
        let (caches, boards) = stops.routing_parts();
        let cache = &mut caches[0];

        let c = g.node_id("C").unwrap();
        let demanded = [false, false, true];
        cache.ensure_routes(Minute(0), &demanded, boards);

        assert_eq!(cache.arrival(c), Some(Minute(27)));
        let b = g.node_id("B").unwrap();
        assert_eq!(
            cache.plan_steps(c),
            [
                PlanStep::Board(leg1),
                PlanStep::Alight(b),
                PlanStep::Board(leg2),
                PlanStep::Alight(c),
            ]
        );
        // The direct itinerary lost the relaxation, not its existence.
        assert_ne!(cache.plan_steps(c)[0], PlanStep::Board(direct));
    }

    #[test]
    fn dirty_reset_discards_vanished_services() {
        let g = shuttle_graph();
        let scenario = Scenario::new(vec![1.0, 1.0], 60);
        // Single departure from A at minute 5.
        let tt = timetable(
            &g,
            "Name,Gap,Offset,Finish,Schedule\nOnce,30,5,5,\"A,B\"\n",
            &scenario,
        );
        let mut stops = Stops::build(&g, tt.itineraries(), tt.dispatch_queues());
        let b_id = g.node_id("B").unwrap();
        let demanded = [false, true];

        {
            let (caches, boards) = stops.routing_parts();
            caches[0].ensure_routes(Minute(0), &demanded, boards);
            assert_eq!(caches[0].arrival(b_id), Some(Minute(15)));
        }

        // Minute 6: the only departure is in the past. The head change marks
        // the cache dirty and the re-run finds nothing.
        stops.refresh(Minute(6));
        {
            let (caches, boards) = stops.routing_parts();
            assert!(caches[0].is_dirty());
            caches[0].ensure_routes(Minute(6), &demanded, boards);
            assert_eq!(caches[0].arrival(b_id), None);
        }
    }

    #[test]
    fn resumes_for_destinations_demanded_later() {
        let g = transfer_graph();
        let scenario = Scenario::new(vec![1.0, 1.0], 60);
        let tt = timetable(
            &g,
            "Name,Gap,Offset,Finish,Schedule\n\
             Leg1,30,0,60,\"A,B\"\n\
             Leg2,30,12,72,\"B,C\"\n",
            &scenario,
        );
        let mut stops = Stops::build(&g, tt.itineraries(), tt.dispatch_queues());
        let (caches, boards) = stops.routing_parts();
        let cache = &mut caches[0];
        let b = g.node_id("B").unwrap();
        let c = g.node_id("C").unwrap();

        // First minute only B is demanded; C stays unsettled.
        cache.ensure_routes(Minute(0), &[false, true, false], boards);
        assert_eq!(cache.arrival(b), Some(Minute(10)));

        // A later query (cache still clean) extends the search to C.
        cache.ensure_routes(Minute(0), &[false, false, true], boards);
        assert_eq!(cache.arrival(c), Some(Minute(27)));
    }
}

// ── Simulation scenarios ──────────────────────────────────────────────────────

#[cfg(test)]
mod sim_tests {
    use super::*;
    use crate::plan::PlanStep;

    /// Two-node shuttle, demand 60/hr each way, four in-run dispatches.
    fn shuttle_sim() -> Simulation {
        build_sim(
            shuttle_graph(),
            "Name,Gap,Offset,Finish,Schedule\nShuttle,30,0,120,\"A,B,A\"\n",
            vec![0.0, 60.0, 60.0, 0.0],
            vec![1.0, 1.0, 0.0],
            params(50, 50),
        )
    }

    #[test]
    fn shuttle_runs_four_dispatches_with_no_failures() {
        let mut sim = shuttle_sim();
        let mut log = Collector::default();
        sim.run(&mut log);

        assert_eq!(sim.clock(), Minute(120));
        let names = distinct_vehicle_names(&log.frames);
        assert_eq!(names.len(), 4, "dispatches at 0, 30, 60, 90: {names:?}");

        let counters = log.counters.unwrap();
        assert_eq!(counters.failed, 0, "B is always reachable from A");
        assert!(counters.spawned > 0);
        let completion = counters.completed as f64 / counters.spawned as f64;
        assert!(
            completion >= 0.9,
            "expected at least 90% completion, got {completion:.3} \
             ({counters:?})"
        );
    }

    #[test]
    fn unreachable_demand_fails_at_spawn_time() {
        // A-B linked; C isolated. Demand flows only A -> C.
        let mut b = TransitGraphBuilder::new();
        b.add_stop("A", pos(0), 60).unwrap();
        b.add_stop("B", pos(1), 60).unwrap();
        b.add_stop("C", pos(2), 60).unwrap();
        b.add_two_way("A", "B", 10).unwrap();
        let graph = b.build();

        let mut od = vec![0.0; 9];
        od[2] = 60.0; // A -> C, one passenger per minute
        let mut sim = build_sim(
            graph,
            "Name,Gap,Offset,Finish,Schedule\nShuttle,30,0,60,\"A,B,A\"\n",
            od,
            vec![1.0, 1.0],
            params(50, 50),
        );

        sim.run_ticks(10, &mut crate::observer::NoopObserver);
        let counters = sim.counters();
        assert_eq!(counters.failed, 10, "one doomed passenger per minute");
        assert_eq!(counters.spawned, 0, "failed passengers never enter the system");
        assert_eq!(counters.completed, 0);
        assert_eq!(sim.stops().total_waiting(), 0);
    }

    #[test]
    fn oversized_group_splits_at_the_door() {
        // One dispatch, capacity 10, a 25-passenger group waiting.
        let mut b = TransitGraphBuilder::new();
        b.add_stop("N", pos(0), 0).unwrap();
        b.add_stop("M", pos(1), 0).unwrap();
        b.add_two_way("N", "M", 5).unwrap();
        let graph = b.build();
        let n = graph.node_id("N").unwrap();
        let m = graph.node_id("M").unwrap();

        let mut sim = build_sim(
            graph,
            "Name,Gap,Offset,Finish,Schedule\nExpress,60,0,0,\"N,M\"\n",
            vec![0.0, 1500.0, 0.0, 0.0], // 25 passengers per minute N -> M
            vec![1.0, 1.0],
            params(5, 10),
        );

        sim.run_ticks(1, &mut crate::observer::NoopObserver);

        let vehicle = &sim.vehicles()[0];
        assert_eq!(vehicle.passengers_aboard(), 10);
        assert_eq!(vehicle.groups().len(), 1);
        let aboard = &vehicle.groups()[0];
        assert_eq!(aboard.size, 10);
        assert_eq!(aboard.plan.next_step(), Some(PlanStep::Alight(m)));

        // The remainder keeps the untouched plan at the stop.
        assert_eq!(sim.stops().waiting_counts()[n.index()], 15);
        let waiting = &sim.stops().waiting(n)[0];
        assert_eq!(waiting.size, 15);
        assert!(waiting.plan.wants_board(ItineraryId(0)));
    }

    #[test]
    fn integer_demand_rates_spawn_deterministically() {
        let mut sim = build_sim(
            shuttle_graph(),
            "Name,Gap,Offset,Finish,Schedule\nShuttle,30,0,120,\"A,B,A\"\n",
            vec![0.0, 60.0, 0.0, 0.0], // exactly one A -> B passenger per minute
            vec![1.0, 1.0, 1.0],
            params(50, 50),
        );
        sim.run_ticks(30, &mut crate::observer::NoopObserver);
        assert_eq!(sim.counters().spawned, 30);
    }

    #[test]
    fn passengers_are_conserved() {
        let mut sim = shuttle_sim();
        sim.run_ticks(75, &mut crate::observer::NoopObserver);

        let counters = sim.counters();
        let accounted =
            sim.passengers_aboard() + sim.stops().total_waiting() + counters.completed;
        assert_eq!(counters.spawned, accounted);
    }

    #[test]
    fn identical_seeds_replay_identically() {
        let mut first = Collector::default();
        shuttle_sim().run(&mut first);
        let mut second = Collector::default();
        shuttle_sim().run(&mut second);

        assert_eq!(first.counters, second.counters);
        assert_eq!(first.frames.len(), second.frames.len());
        for (a, b) in first.frames.iter().zip(&second.frames) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_seed_changes_the_draw_stream() {
        let graph = shuttle_graph();
        let scenario = Scenario::new(vec![0.5, 0.5], 60);
        let tt = timetable(
            &graph,
            "Name,Gap,Offset,Finish,Schedule\nShuttle,30,0,60,\"A,B,A\"\n",
            &scenario,
        );
        // Fractional rate: 0.5 passengers per minute, decided by the stream.
        let od = OdMatrix::from_trips(2, vec![0.0, 60.0, 0.0, 0.0]);
        let mut sim = SimulationBuilder::new(graph, tt, od, scenario, params(50, 50))
            .seed(1)
            .build()
            .unwrap();
        sim.run_ticks(60, &mut crate::observer::NoopObserver);
        // With probability 2^-60 this is flaky; in practice the stream moved.
        let total = sim.counters().total_trips();
        assert!(total > 0 && total < 60, "got {total}");
    }

    #[test]
    fn od_dimension_mismatch_rejected() {
        let graph = shuttle_graph();
        let scenario = Scenario::new(vec![1.0, 1.0], 60);
        let tt = timetable(
            &graph,
            "Name,Gap,Offset,Finish,Schedule\nShuttle,30,0,60,\"A,B,A\"\n",
            &scenario,
        );
        let od = OdMatrix::from_trips(3, vec![0.0; 9]);
        let result = SimulationBuilder::new(graph, tt, od, scenario, params(50, 50)).build();
        assert!(matches!(result, Err(crate::error::SimError::DemandDimension { .. })));
    }

    #[test]
    fn standing_below_seated_rejected() {
        let graph = shuttle_graph();
        let scenario = Scenario::new(vec![1.0, 1.0], 60);
        let tt = timetable(
            &graph,
            "Name,Gap,Offset,Finish,Schedule\nShuttle,30,0,60,\"A,B,A\"\n",
            &scenario,
        );
        let od = OdMatrix::from_trips(2, vec![0.0; 4]);
        let result =
            SimulationBuilder::new(graph, tt, od, scenario, params(50, 20)).build();
        assert!(matches!(result, Err(crate::error::SimError::Config(_))));
    }
}

// ── Config loaders ────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader_tests {
    use std::io::Cursor;

    use crate::error::SimError;
    use crate::loader::{load_costs_reader, load_params_reader, load_scenario_reader};
    use pt_core::Minute;

    #[test]
    fn parameters_table_parses() {
        let csv = "Vehicle Max Seated,Vehicle Max Standing,Traffic Time Gap\n50,100,60\n";
        let p = load_params_reader(Cursor::new(csv)).unwrap();
        assert_eq!(p.max_seated, 50);
        assert_eq!(p.max_standing, 100);
        assert_eq!(p.traffic_time_gap, 60);
    }

    #[test]
    fn standing_below_seated_rejected() {
        let csv = "Vehicle Max Seated,Vehicle Max Standing,Traffic Time Gap\n50,40,60\n";
        assert!(matches!(
            load_params_reader(Cursor::new(csv)),
            Err(SimError::Config(_))
        ));
    }

    #[test]
    fn eval_table_parses() {
        let csv = "Vehicle Cost,Agent Cost Seated,Agent Cost Standing,Agent Cost Waiting,Unfinished Penalty\n\
                   100,10,15,20,50\n";
        let c = load_costs_reader(Cursor::new(csv)).unwrap();
        assert_eq!(c.vehicle_cost, 100.0);
        assert_eq!(c.agent_cost_waiting, 20.0);
        assert_eq!(c.unfinished_penalty, 50.0);
    }

    #[test]
    fn scenario_rows_become_breakpoints() {
        let csv = "Traffic Multiplier\n0.5\n1.0\n0.5\n";
        let s = load_scenario_reader(Cursor::new(csv), 60).unwrap();
        assert_eq!(s.breakpoints(), [0.5, 1.0, 0.5]);
        assert_eq!(s.stop_time(), Minute(120));
    }

    #[test]
    fn empty_scenario_rejected() {
        let csv = "Traffic Multiplier\n";
        assert!(matches!(
            load_scenario_reader(Cursor::new(csv), 60),
            Err(SimError::Config(_))
        ));
    }
}
