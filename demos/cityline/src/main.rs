//! cityline — a small end-to-end run of the pt transit simulator.
//!
//! Simulates a six-stop inner-city rail corridor over one compressed service
//! day: CSV tables in, gravity demand assignment, square-root headway
//! optimisation, the minute tick loop, and finally the evaluator's cost
//! report plus renderer CSV files under `output/cityline/`.

use std::io::Cursor;
use std::path::Path;

use anyhow::Result;

use pt_core::NodeId;
use pt_network::{GravityParams, IdealTimes, gravity_assignment, load_network_reader};
use pt_output::{CostSummary, CsvWriter, Evaluator, SimOutputObserver, TickLog};
use pt_schedule::{HeadwayPolicy, Timetable, load_simple_schedules_reader};
use pt_sim::{
    RunCounters, SimObserver, SimulationBuilder, TickFrame, load_costs_reader,
    load_params_reader, load_scenario_reader,
};

// ── Input tables ──────────────────────────────────────────────────────────────

const NODES_CSV: &str = "\
Name,Location,Daily Passengers
Central,\"-33.883, 151.207\",\"1,800\"
Town Hall,\"-33.873, 151.207\",\"1,500\"
Newtown,\"-33.896, 151.179\",600
Ashfield,\"-33.888, 151.125\",500
Strathfield,\"-33.872, 151.094\",700
Chatswood,\"-33.797, 151.183\",900
";

const EDGES_CSV: &str = "\
Start,End,Time,Bidirectional
Central,Town Hall,3,Yes
Central,Newtown,6,Yes
Newtown,Ashfield,7,Yes
Ashfield,Strathfield,6,Yes
Town Hall,Chatswood,12,Yes
Central,Strathfield,11,Yes
";

const SCHEDULE_CSV: &str = "\
Name,Gap,Offset,Finish,Schedule
Inner West,10,0,540,\"Central,Newtown,Ashfield,Strathfield,Ashfield,Newtown,Central\"
North Shore,8,2,540,\"Strathfield,Central,Town Hall,Chatswood,Town Hall,Central,Strathfield\"
";

const PARAMETERS_CSV: &str = "\
Vehicle Max Seated,Vehicle Max Standing,Traffic Time Gap
60,120,60
";

const EVAL_CSV: &str = "\
Vehicle Cost,Agent Cost Seated,Agent Cost Standing,Agent Cost Waiting,Unfinished Penalty
280,12,18,25,60
";

// A compressed service day: shoulder, two peaks, a midday lull, shutdown.
const SCENARIO_CSV: &str = "\
Traffic Multiplier
0.2
1.0
1.4
0.8
0.6
1.2
1.0
0.4
0.0
";

const HEADWAY_POLICY: HeadwayPolicy = HeadwayPolicy::SquareRoot;

// ── Observer: keep the log in memory and stream CSV files ─────────────────────

struct TeeObserver {
    log: TickLog,
    files: SimOutputObserver<CsvWriter>,
}

impl SimObserver for TeeObserver {
    fn on_tick_end(&mut self, frame: &TickFrame<'_>) {
        self.log.on_tick_end(frame);
        self.files.on_tick_end(frame);
    }

    fn on_sim_end(&mut self, counters: &RunCounters) {
        self.log.on_sim_end(counters);
        self.files.on_sim_end(counters);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    println!("=== cityline — pt transit simulator ===");
    println!();

    // 1. Network.
    let graph = load_network_reader(Cursor::new(NODES_CSV), Cursor::new(EDGES_CSV))?;
    println!(
        "Network: {} stops, {} directed edges",
        graph.node_count(),
        graph.edge_count()
    );

    // 2. Run configuration.
    let params = load_params_reader(Cursor::new(PARAMETERS_CSV))?;
    let costs = load_costs_reader(Cursor::new(EVAL_CSV))?;
    let scenario = load_scenario_reader(Cursor::new(SCENARIO_CSV), params.traffic_time_gap)?;
    println!(
        "Service day: {} minutes, peak multiplier {:.1}",
        scenario.stop_time(),
        scenario
            .breakpoints()
            .iter()
            .cloned()
            .fold(0.0f64, f64::max)
    );

    // 3. Demand: ideal travel times feed the gravity model.
    let ideal = IdealTimes::compute(&graph);
    let totals: Vec<f64> = graph
        .node_ids()
        .map(|n| graph.daily_passengers(n) as f64)
        .collect();
    let (od, convergence) =
        gravity_assignment(&totals, &totals, &ideal, GravityParams::default());
    println!(
        "Gravity model: {} iterations, converged = {}",
        convergence.iterations, convergence.converged
    );

    // 4. Timetable with optimised headways.
    let specs = load_simple_schedules_reader(Cursor::new(SCHEDULE_CSV))?;
    let timetable = Timetable::build(&specs, &graph, HEADWAY_POLICY, &costs, &scenario)?;
    for (itinerary, &headway) in timetable.itineraries().iter().zip(timetable.headways()) {
        println!(
            "  {:<12} every {:>2} min, {} min end to end",
            itinerary.name(),
            headway,
            itinerary.length_min()
        );
    }
    println!();

    // 5. Simulate.
    let out_dir = Path::new("output/cityline");
    std::fs::create_dir_all(out_dir)?;
    let mut observer = TeeObserver {
        log: TickLog::new(),
        files: SimOutputObserver::new(CsvWriter::new(out_dir)?),
    };

    let mut sim = SimulationBuilder::new(graph, timetable, od, scenario, params).build()?;
    sim.run(&mut observer);
    if let Some(e) = observer.files.take_error() {
        eprintln!("output error: {e}");
    }

    // 6. Report.
    let summary: CostSummary = Evaluator::new(costs, params).evaluate(&observer.log);
    println!("{summary}");
    println!();
    println!("Busiest stops at close of day:");
    let waiting_now = observer.log.node_waiting.last().cloned().unwrap_or_default();
    let graph = sim.graph();
    let mut by_waiting: Vec<(u32, NodeId)> = waiting_now
        .iter()
        .enumerate()
        .map(|(i, &w)| (w, NodeId(i as u32)))
        .collect();
    by_waiting.sort_by(|a, b| b.0.cmp(&a.0));
    for &(waiting, node) in by_waiting.iter().take(3) {
        println!("  {:<12} {waiting} waiting", graph.node_name(node));
    }
    println!();
    println!("Renderer files written to {}", out_dir.display());

    Ok(())
}
