use std::collections::VecDeque;
use tracing::{debug, trace};

use crate::events::{Event, EventQueue, Request};
use crate::policies::{OverflowPolicy, Parked};
use crate::state::{RouterPhase, Server, ServerRef};
use crate::variates::{Exponential, VariateGenerator};

/// Borrowed simulation services a router operation may use.
pub struct RouterContext<'a> {
    pub now: f64,
    pub events: &'a mut EventQueue,
    pub variates: &'a mut VariateGenerator,
}

/// Front-end router feeding category-partitioned server pools.
///
/// Requests enter a bounded admission queue, pass one at a time through a
/// fixed routing delay, then start service on the first idle server of their
/// group. Requests that find every server of their group busy are handed to
/// the overflow policy.
pub struct Router {
    groups: usize,
    queue_capacity: usize,
    routing_delay: f64,
    service: Exponential,
    phase: RouterPhase,
    admission: VecDeque<Request>,
    pools: Vec<Vec<Server>>,
    policy: Box<dyn OverflowPolicy>,
    busy_servers: usize,
    arrivals: u64,
    completed: u64,
    lost_at_admission: u64,
    lost_at_dispatch: u64,
    response_times: Vec<f64>,
}

impl Router {
    /// `servers_per_group` servers are created for each of the `groups` pools.
    pub fn new(
        groups: usize,
        servers_per_group: usize,
        queue_capacity: usize,
        service: Exponential,
        policy: Box<dyn OverflowPolicy>,
    ) -> Self {
        Self {
            groups,
            queue_capacity,
            routing_delay: routing_delay(groups),
            service,
            phase: RouterPhase::Idle,
            admission: VecDeque::new(),
            pools: (0..groups)
                .map(|_| vec![Server::default(); servers_per_group])
                .collect(),
            policy,
            busy_servers: 0,
            arrivals: 0,
            completed: 0,
            lost_at_admission: 0,
            lost_at_dispatch: 0,
            response_times: Vec::new(),
        }
    }

    pub fn receive(&mut self, ctx: &mut RouterContext, request: Request) {
        self.arrivals += 1;
        let held = self.admission.len() + self.policy.admission_slots();
        if held >= self.queue_capacity {
            self.lost_at_admission += 1;
            trace!(now = ctx.now, category = request.category, "admission queue full");
            return;
        }

        self.admission.push_back(request);
        if self.phase == RouterPhase::Idle && !self.policy.halts_routing() {
            self.start_routing(ctx);
        }
    }

    pub fn on_end_routing(&mut self, ctx: &mut RouterContext) {
        self.phase = RouterPhase::Idle;
        let Some(request) = self.admission.pop_front() else {
            return;
        };
        self.dispatch(ctx, request);

        if self.policy.halts_routing() {
            debug!(now = ctx.now, category = request.category, "routing blocked");
            return;
        }
        if !self.admission.is_empty() {
            self.start_routing(ctx);
        }
    }

    /// Starts `request` on the first idle server of its group, or hands it to
    /// the overflow policy.
    pub fn dispatch(&mut self, ctx: &mut RouterContext, request: Request) {
        let idle = self.pools[request.category]
            .iter()
            .position(|server| !server.busy);
        match idle {
            Some(slot) => {
                let server = ServerRef {
                    group: request.category,
                    slot,
                };
                self.start_service(ctx, server, request);
            }
            None => {
                if self.policy.park(request) == Parked::Lost {
                    self.lost_at_dispatch += 1;
                    trace!(
                        now = ctx.now,
                        category = request.category,
                        "no server and no room to wait"
                    );
                }
            }
        }
    }

    pub fn on_end_service(&mut self, ctx: &mut RouterContext, server: ServerRef, request: Request) {
        let was_halted = self.policy.halts_routing();

        self.pools[server.group][server.slot].busy = false;
        self.busy_servers -= 1;
        self.completed += 1;
        self.response_times.push(ctx.now - request.arrival_time);

        // Already routed, so the freed server takes it without another routing delay.
        if let Some(next) = self.policy.release(server.group) {
            self.start_service(ctx, server, next);
        }

        if was_halted && !self.policy.halts_routing() {
            debug!(now = ctx.now, group = server.group, "routing unblocked");
            if self.phase == RouterPhase::Idle && !self.admission.is_empty() {
                self.start_routing(ctx);
            }
        }
    }

    fn start_routing(&mut self, ctx: &mut RouterContext) {
        self.phase = RouterPhase::Routing;
        ctx.events.schedule_at(ctx.now + self.routing_delay, Event::EndRouting);
    }

    fn start_service(&mut self, ctx: &mut RouterContext, server: ServerRef, request: Request) {
        let end = ctx.now + ctx.variates.exponential(&self.service);
        let slot = &mut self.pools[server.group][server.slot];
        debug_assert!(!slot.busy);
        slot.busy = true;
        self.busy_servers += 1;
        ctx.events.schedule_at(end, Event::EndService { server, request });
    }

    /// Requests currently in the system: queued, parked or in service.
    pub fn occupancy(&self) -> usize {
        self.admission.len() + self.policy.parked() + self.busy_servers
    }

    pub fn groups(&self) -> usize {
        self.groups
    }

    pub fn phase(&self) -> RouterPhase {
        self.phase
    }

    pub fn admission_len(&self) -> usize {
        self.admission.len()
    }

    pub fn parked(&self) -> usize {
        self.policy.parked()
    }

    pub fn busy_servers(&self) -> usize {
        self.busy_servers
    }

    pub fn pool(&self, group: usize) -> &[Server] {
        &self.pools[group]
    }

    pub fn arrivals(&self) -> u64 {
        self.arrivals
    }

    pub fn completed(&self) -> u64 {
        self.completed
    }

    pub fn lost_at_admission(&self) -> u64 {
        self.lost_at_admission
    }

    pub fn lost_at_dispatch(&self) -> u64 {
        self.lost_at_dispatch
    }

    pub fn response_times(&self) -> &[f64] {
        &self.response_times
    }

    pub fn into_response_times(self) -> Vec<f64> {
        self.response_times
    }
}

/// Per-request routing cost, growing with the number of groups to tell apart.
pub fn routing_delay(groups: usize) -> f64 {
    let groups = groups.max(1) as f64;
    (groups - 1.0) / groups
}
