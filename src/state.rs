use serde::Serialize;

use crate::events::EventKind;
use crate::models::PolicyConfig;
use crate::stats::RunStatistics;

#[derive(Clone, Debug, Default)]
pub struct Server {
    pub busy: bool,
}

/// Position of a server inside the per-group pools.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ServerRef {
    pub group: usize,
    pub slot: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RouterPhase {
    Idle,
    Routing,
}

/// Raw counters accumulated by one run, before reduction.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunCounters {
    pub elapsed: f64,
    pub occupancy_area: f64,
    pub arrivals: u64,
    pub completed: u64,
    pub lost_at_admission: u64,
    pub lost_at_dispatch: u64,
    pub in_system_at_end: u64,
    pub events_processed: u64,
    pub peak_admission: usize,
    #[serde(skip)]
    pub response_times: Vec<f64>,
}

impl RunCounters {
    pub fn lost(&self) -> u64 {
        self.lost_at_admission + self.lost_at_dispatch
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TraceEntry {
    pub time: f64,
    pub kind: EventKind,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub groups: usize,
    pub arrival_rate: f64,
    pub policy: PolicyConfig,
    pub seed: Option<u64>,
    pub counters: RunCounters,
    pub statistics: RunStatistics,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceEntry>,
}
