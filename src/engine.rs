use tracing::{info, trace};

use crate::error::Result;
use crate::events::{Event, EventQueue, Request};
use crate::models::{validate_arrival_rate, PolicyConfig, SimConfig};
use crate::policies::build_policy;
use crate::router::{Router, RouterContext};
use crate::state::{RunCounters, RunReport, TraceEntry};
use crate::stats::reduce;
use crate::variates::{Exponential, VariateGenerator};

#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Fixed seed for the variate generator; `None` draws one from entropy.
    pub seed: Option<u64>,
    pub record_trace: bool,
}

pub struct SimulationEngine {
    groups: usize,
    arrival_rate: f64,
    policy: PolicyConfig,
    horizon: f64,
    seed: Option<u64>,
    arrival: Exponential,
    router: Router,
    events: EventQueue,
    variates: VariateGenerator,
    now: f64,
    occupancy_area: f64,
    events_processed: u64,
    peak_admission: usize,
    trace: Option<Vec<TraceEntry>>,
}

impl SimulationEngine {
    /// Validates the configuration for `groups` and builds a fresh run.
    pub fn new(
        config: &SimConfig,
        groups: usize,
        arrival_rate: f64,
        options: &RunOptions,
    ) -> Result<Self> {
        let table = config.validate_system()?;
        let service_rate = config.validate_groups(&table, groups)?;
        validate_arrival_rate(arrival_rate)?;

        let arrival = Exponential::new(arrival_rate)?;
        let service = Exponential::new(service_rate)?;
        let policy = build_policy(config.policy, groups, config.queue_capacity);
        let router = Router::new(
            groups,
            config.total_servers / groups,
            config.queue_capacity,
            service,
            policy,
        );
        let variates = match options.seed {
            Some(seed) => VariateGenerator::seeded(seed),
            None => VariateGenerator::from_entropy(),
        };

        Ok(Self {
            groups,
            arrival_rate,
            policy: config.policy,
            horizon: config.horizon,
            seed: options.seed,
            arrival,
            router,
            events: EventQueue::new(),
            variates,
            now: 0.0,
            occupancy_area: 0.0,
            events_processed: 0,
            peak_admission: 0,
            trace: options.record_trace.then(Vec::new),
        })
    }

    pub fn run(mut self) -> RunReport {
        let first = self.variates.exponential(&self.arrival);
        self.events.schedule_at(first, Event::Arrival);

        while let Some(time) = self.events.peek_time() {
            if time > self.horizon {
                break;
            }
            let Some(scheduled) = self.events.pop_earliest() else {
                break;
            };
            self.advance_to(scheduled.time);
            trace!(now = self.now, kind = ?scheduled.event.kind(), "event");
            if let Some(trace) = self.trace.as_mut() {
                trace.push(TraceEntry {
                    time: scheduled.time,
                    kind: scheduled.event.kind(),
                });
            }
            self.handle(scheduled.event);
            self.events_processed += 1;
            self.peak_admission = self.peak_admission.max(self.router.admission_len());
        }
        // Occupancy stays constant from the last event to the horizon.
        let horizon = self.horizon;
        self.advance_to(horizon);

        self.finish()
    }

    fn advance_to(&mut self, time: f64) {
        self.occupancy_area += self.router.occupancy() as f64 * (time - self.now);
        self.now = time;
    }

    fn handle(&mut self, event: Event) {
        let mut ctx = RouterContext {
            now: self.now,
            events: &mut self.events,
            variates: &mut self.variates,
        };
        match event {
            Event::Arrival => {
                let category = ctx.variates.category(self.groups);
                let request = Request {
                    arrival_time: ctx.now,
                    category,
                };
                self.router.receive(&mut ctx, request);
                let next = ctx.now + ctx.variates.exponential(&self.arrival);
                ctx.events.schedule_at(next, Event::Arrival);
            }
            Event::EndRouting => self.router.on_end_routing(&mut ctx),
            Event::EndService { server, request } => {
                self.router.on_end_service(&mut ctx, server, request)
            }
        }
    }

    fn finish(self) -> RunReport {
        let router = self.router;
        let counters = RunCounters {
            elapsed: self.now,
            occupancy_area: self.occupancy_area,
            arrivals: router.arrivals(),
            completed: router.completed(),
            lost_at_admission: router.lost_at_admission(),
            lost_at_dispatch: router.lost_at_dispatch(),
            in_system_at_end: router.occupancy() as u64,
            events_processed: self.events_processed,
            peak_admission: self.peak_admission,
            response_times: router.into_response_times(),
        };
        let statistics = reduce(&counters);

        info!(
            groups = self.groups,
            arrival_rate = self.arrival_rate,
            arrivals = counters.arrivals,
            completed = counters.completed,
            lost = counters.lost(),
            mean_response_time = statistics.mean_response_time,
            loss_rate = statistics.loss_rate,
            "run finished"
        );

        RunReport {
            groups: self.groups,
            arrival_rate: self.arrival_rate,
            policy: self.policy,
            seed: self.seed,
            counters,
            statistics,
            trace: self.trace.unwrap_or_default(),
        }
    }
}

pub fn run_simulation(config: &SimConfig, groups: usize, arrival_rate: f64) -> Result<RunReport> {
    let options = RunOptions {
        seed: config.seed,
        record_trace: false,
    };
    run_simulation_with_options(config, groups, arrival_rate, &options)
}

#[tracing::instrument(skip(config, options), fields(seed = ?options.seed))]
pub fn run_simulation_with_options(
    config: &SimConfig,
    groups: usize,
    arrival_rate: f64,
    options: &RunOptions,
) -> Result<RunReport> {
    let engine = SimulationEngine::new(config, groups, arrival_rate, options)?;
    Ok(engine.run())
}

/// Mean response time and loss rate of one run.
pub fn simulate(config: &SimConfig, groups: usize, arrival_rate: f64) -> Result<(f64, f64)> {
    let report = run_simulation(config, groups, arrival_rate)?;
    Ok((
        report.statistics.mean_response_time,
        report.statistics.loss_rate,
    ))
}
