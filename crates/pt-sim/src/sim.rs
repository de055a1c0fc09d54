//! The `Simulation` struct and its eight-phase tick.
//!
//! # Phase order
//!
//! 1. **Multiplier**: interpolate the scenario's demand multiplier.
//! 2. **Advance**: step every vehicle; remove the terminated.
//! 3. **Refresh**: drop past arrivals from every service board; a stop whose
//!    head-of-queue changed gets a dirty route cache.
//! 4. **Alight**: groups whose next token names the current stop leave their
//!    vehicle; exhausted plans count as completions, the rest join the stop.
//! 5. **Dispatch**: pop due dispatch minutes; create vehicles.
//! 6. **Spawn**: per-origin demand draws, one routing call per origin, one
//!    group per reachable destination; unreachable demand counts as failed.
//! 7. **Board**: FIFO walk of each stopped vehicle's stop, with capacity
//!    splitting.
//! 8. **Clock** increments.
//!
//! Vehicles advance before alighting so the minute a vehicle arrives is the
//! minute its passengers can get off; alight precedes board so terminating
//! passengers free capacity; spawn precedes board so passengers arriving in
//! minute `t` may catch a vehicle already stopped in minute `t`.
//!
//! # Spawn-phase parallelism
//!
//! The spawn phase is produce-then-apply: the produce pass touches only one
//! origin's route cache and RNG stream (plus the read-only boards and OD
//! row), so the `parallel` feature can fan it across Rayon workers; the apply
//! pass runs sequentially in ascending origin order either way, keeping runs
//! bit-identical.

use log::debug;

use pt_core::{ItineraryId, Minute, NodeId, OriginRng, Scenario, SimRng, VehicleParams};
use pt_network::{OdMatrix, TransitGraph};
use pt_schedule::{DispatchQueue, Itinerary, Timetable};

use crate::error::{SimError, SimResult};
use crate::observer::{SimObserver, TickFrame, VehicleObservation};
use crate::plan::{Group, TravelPlan};
use crate::router::RouteCache;
use crate::stop::{StopService, Stops};
use crate::vehicle::{StepOutcome, Vehicle};

/// Seed of the reference runs; `SimulationBuilder` defaults to it.
pub const REFERENCE_SEED: u64 = 30699;

// ── RunCounters ───────────────────────────────────────────────────────────────

/// Passenger accounting over a whole run.
///
/// `spawned` counts passengers who found a route and entered the system;
/// `failed` counts demand the router labelled unreachable, which never
/// spawns. At every tick boundary
/// `spawned == aboard + waiting + completed` (mass conservation).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub spawned: u64,
    pub completed: u64,
    pub failed: u64,
}

impl RunCounters {
    /// Total trip demand that materialised, routable or not.
    pub fn total_trips(&self) -> u64 {
        self.spawned + self.failed
    }
}

// ── SimulationBuilder ─────────────────────────────────────────────────────────

/// Wire a [`Simulation`] together from its already-built parts.
pub struct SimulationBuilder {
    graph: TransitGraph,
    timetable: Timetable,
    od: OdMatrix,
    scenario: Scenario,
    params: VehicleParams,
    seed: u64,
}

impl SimulationBuilder {
    pub fn new(
        graph: TransitGraph,
        timetable: Timetable,
        od: OdMatrix,
        scenario: Scenario,
        params: VehicleParams,
    ) -> Self {
        Self {
            graph,
            timetable,
            od,
            scenario,
            params,
            seed: REFERENCE_SEED,
        }
    }

    /// Override the RNG seed (default [`REFERENCE_SEED`]).
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> SimResult<Simulation> {
        let n = self.graph.node_count();
        if self.od.node_count() != n {
            return Err(SimError::DemandDimension {
                od: self.od.node_count(),
                nodes: n,
            });
        }
        if self.params.max_standing < self.params.max_seated {
            return Err(SimError::Config(format!(
                "standing capacity {} is below seated capacity {}",
                self.params.max_standing, self.params.max_seated
            )));
        }

        let stops = Stops::build(
            &self.graph,
            self.timetable.itineraries(),
            self.timetable.dispatch_queues(),
        );
        let (itineraries, dispatch) = self.timetable.into_parts();
        let spawn_rngs = SimRng::new(self.seed).origin_streams(n);

        Ok(Simulation {
            graph: self.graph,
            itineraries,
            dispatch,
            od: self.od,
            scenario: self.scenario,
            params: self.params,
            stops,
            vehicles: Vec::new(),
            clock: Minute::ZERO,
            multiplier: 0.0,
            spawn_rngs,
            counters: RunCounters::default(),
            frame_vehicles: Vec::new(),
        })
    }
}

// ── Simulation ────────────────────────────────────────────────────────────────

/// All run state. Stops, vehicles, and the route caches are owned here and
/// mutated only by the tick phases; itinerary templates stay immutable and
/// shared by id.
pub struct Simulation {
    graph: TransitGraph,
    itineraries: Vec<Itinerary>,
    dispatch: Vec<DispatchQueue>,
    od: OdMatrix,
    scenario: Scenario,
    params: VehicleParams,
    stops: Stops,
    vehicles: Vec<Vehicle>,
    clock: Minute,
    multiplier: f64,
    spawn_rngs: Vec<OriginRng>,
    counters: RunCounters,
    /// Reused per-tick snapshot buffer for [`TickFrame`].
    frame_vehicles: Vec<VehicleObservation>,
}

impl Simulation {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current minute to the scenario's stop time.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) {
        let stop_time = self.scenario.stop_time();
        while self.clock < stop_time {
            observer.on_tick_start(self.clock);
            self.tick();
            self.capture_frame();
            observer.on_tick_end(&TickFrame {
                time: self.clock,
                vehicles: &self.frame_vehicles,
                node_waiting: self.stops.waiting_counts(),
            });
        }
        observer.on_sim_end(&self.counters);
    }

    /// Run exactly `n` ticks from the current position (ignores the stop
    /// time). Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u32, observer: &mut O) {
        for _ in 0..n {
            observer.on_tick_start(self.clock);
            self.tick();
            self.capture_frame();
            observer.on_tick_end(&TickFrame {
                time: self.clock,
                vehicles: &self.frame_vehicles,
                node_waiting: self.stops.waiting_counts(),
            });
        }
    }

    /// Advance one minute through all eight phases.
    pub fn tick(&mut self) {
        let now = self.clock;

        // Phase order is load-bearing; see the module docs.
        self.multiplier = self.scenario.multiplier_at(now);
        self.advance_vehicles();
        self.stops.refresh(now);
        self.alight_passengers();
        self.dispatch_vehicles(now);
        self.spawn_passengers(now);
        self.board_passengers();
        self.clock = now + 1;

        #[cfg(debug_assertions)]
        self.assert_invariants();
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn clock(&self) -> Minute {
        self.clock
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    pub fn graph(&self) -> &TransitGraph {
        &self.graph
    }

    pub fn itineraries(&self) -> &[Itinerary] {
        &self.itineraries
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn stops(&self) -> &Stops {
        &self.stops
    }

    pub fn passengers_aboard(&self) -> u64 {
        self.vehicles
            .iter()
            .map(|v| v.passengers_aboard() as u64)
            .sum()
    }

    // ── Phase 2: advance ──────────────────────────────────────────────────

    fn advance_vehicles(&mut self) {
        let itineraries = &self.itineraries;
        self.vehicles.retain_mut(|vehicle| {
            let template = &itineraries[vehicle.itinerary().index()];
            match vehicle.step(template) {
                StepOutcome::Terminated => {
                    debug_assert_eq!(
                        vehicle.passengers_aboard(),
                        0,
                        "vehicle {} terminated with passengers aboard",
                        vehicle.name()
                    );
                    debug!("vehicle {} completed its run", vehicle.name());
                    false
                }
                StepOutcome::AtStop | StepOutcome::Moving => true,
            }
        });
    }

    // ── Phase 4: alight ───────────────────────────────────────────────────

    fn alight_passengers(&mut self) {
        for vehicle in &mut self.vehicles {
            if !vehicle.is_at_stop() {
                continue;
            }
            let template = &self.itineraries[vehicle.itinerary().index()];
            let stop = vehicle.current_stop(template);
            for group in vehicle.take_alighting(stop) {
                if group.plan.is_done() {
                    self.counters.completed += group.size as u64;
                } else {
                    self.stops.push_waiting(stop, group);
                }
            }
        }
    }

    // ── Phase 5: dispatch ─────────────────────────────────────────────────

    fn dispatch_vehicles(&mut self, now: Minute) {
        for (idx, queue) in self.dispatch.iter_mut().enumerate() {
            if queue.pop_due(now) {
                let id = ItineraryId(idx as u32);
                let vehicle = Vehicle::dispatch(id, &self.itineraries[idx], now);
                debug!("vehicle {} created", vehicle.name());
                self.vehicles.push(vehicle);
            }
        }
    }

    // ── Phase 6: spawn ────────────────────────────────────────────────────

    fn spawn_passengers(&mut self, now: Minute) {
        let batches = self.produce_spawns(now);
        for batch in batches {
            self.counters.failed += batch.failed;
            for group in batch.groups {
                self.counters.spawned += group.size as u64;
                self.stops.push_waiting(batch.origin, group);
            }
        }
    }

    /// Produce pass: demand draws plus routing, one batch per origin.
    fn produce_spawns(&mut self, now: Minute) -> Vec<SpawnBatch> {
        let n = self.graph.node_count();
        let multiplier = self.multiplier;
        let od = &self.od;
        let (caches, boards) = self.stops.routing_parts();
        let rngs = &mut self.spawn_rngs;

        let origin_task = move |i: usize, cache: &mut RouteCache, rng: &mut OriginRng| {
            spawn_one_origin(NodeId(i as u32), od, multiplier, now, cache, rng, boards)
        };

        #[cfg(not(feature = "parallel"))]
        {
            caches
                .iter_mut()
                .zip(rngs.iter_mut())
                .enumerate()
                .map(|(i, (cache, rng))| origin_task(i, cache, rng))
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            caches
                .par_iter_mut()
                .zip(rngs.par_iter_mut())
                .enumerate()
                .map(|(i, (cache, rng))| origin_task(i, cache, rng))
                .collect()
        }
    }

    // ── Phase 7: board ────────────────────────────────────────────────────

    fn board_passengers(&mut self) {
        let itineraries = &self.itineraries;
        let max_standing = self.params.max_standing;

        for vehicle in &mut self.vehicles {
            if !vehicle.is_at_stop() {
                continue;
            }
            let template = &itineraries[vehicle.itinerary().index()];
            let stop = vehicle.current_stop(template);
            let mut residual = vehicle.residual_capacity(max_standing);
            let mut boarded_any = false;

            let queue = self.stops.take_waiting(stop);
            let mut staying = Vec::with_capacity(queue.len());

            for mut group in queue {
                if !group.plan.wants_board(vehicle.itinerary()) {
                    staying.push(group);
                    continue;
                }
                // A vehicle already past the group's alight stop (possible on
                // loop routes with repeated stops) would strand it; wait for
                // the next run instead.
                if let Some(alight) = group.plan.alight_after_board() {
                    if !vehicle.will_reach(template, alight) {
                        staying.push(group);
                        continue;
                    }
                }
                if residual == 0 {
                    staying.push(group);
                    continue;
                }

                if group.size <= residual {
                    residual -= group.size;
                    group.plan.advance();
                    vehicle.board(group);
                } else {
                    let mut splinter = group.split(residual);
                    splinter.plan.advance();
                    vehicle.board(splinter);
                    residual = 0;
                    staying.push(group);
                }
                boarded_any = true;
            }

            self.stops.put_back_waiting(stop, staying);
            if boarded_any {
                self.stops.mark_dirty(stop);
            }
        }
    }

    // ── Snapshot + invariants ─────────────────────────────────────────────

    fn capture_frame(&mut self) {
        self.frame_vehicles.clear();
        for vehicle in &self.vehicles {
            let template = &self.itineraries[vehicle.itinerary().index()];
            let pos = vehicle.position(template, &self.graph);
            self.frame_vehicles.push(VehicleObservation {
                name: vehicle.name().to_owned(),
                lat: pos.lat,
                lon: pos.lon,
                passengers: vehicle.passengers_aboard(),
            });
        }
    }

    #[cfg(debug_assertions)]
    fn assert_invariants(&self) {
        for vehicle in &self.vehicles {
            debug_assert!(
                vehicle.passengers_aboard() <= self.params.max_standing,
                "vehicle {} exceeds capacity",
                vehicle.name()
            );
        }
        let accounted =
            self.passengers_aboard() + self.stops.total_waiting() + self.counters.completed;
        debug_assert_eq!(
            self.counters.spawned, accounted,
            "mass conservation violated at {}",
            self.clock
        );
    }
}

// ── Spawn internals ───────────────────────────────────────────────────────────

struct SpawnBatch {
    origin: NodeId,
    groups: Vec<Group>,
    failed: u64,
}

/// Demand draws and routing for one origin. Touches only that origin's cache
/// and RNG stream; everything else is read-only.
fn spawn_one_origin(
    origin: NodeId,
    od: &OdMatrix,
    multiplier: f64,
    now: Minute,
    cache: &mut RouteCache,
    rng: &mut OriginRng,
    boards: &[Vec<StopService>],
) -> SpawnBatch {
    let n = od.node_count();
    let row = od.row(origin);

    // floor + Bernoulli(frac) per destination; the diagonal's zero demand
    // never produces a passenger but still consumes a draw, keeping the
    // stream aligned however demand shifts within the minute.
    let mut counts = vec![0u32; n];
    let mut any = false;
    for (j, &daily) in row.iter().enumerate() {
        let expected = daily / 60.0 * multiplier;
        let whole = expected.floor();
        let count = whole as u32 + rng.chance(expected - whole) as u32;
        if count > 0 {
            counts[j] = count;
            any = true;
        }
    }
    if !any {
        return SpawnBatch { origin, groups: Vec::new(), failed: 0 };
    }

    let demanded: Vec<bool> = counts.iter().map(|&c| c > 0).collect();
    cache.ensure_routes(now, &demanded, boards);

    let mut groups = Vec::new();
    let mut failed = 0u64;
    for (j, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let dest = NodeId(j as u32);
        if cache.arrival(dest).is_none() {
            failed += count as u64;
            continue;
        }
        let plan = TravelPlan::new(cache.plan_steps(dest).to_vec());
        groups.push(Group::new(origin, dest, now, count, plan));
    }

    SpawnBatch { origin, groups, failed }
}
