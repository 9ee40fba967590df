use serde::Serialize;
use std::fmt::Write;

use crate::error::{Error, Result};
use crate::models::{RateSweep, SimConfig};
use crate::state::RunReport;
use crate::sweep::SweepReport;

pub trait Formatter {
    fn run(&self, report: &RunReport) -> Result<String>;
    fn sweep(&self, report: &SweepReport) -> Result<String>;
}

pub struct HumanFormatter;
pub struct SummaryFormatter;
pub struct JsonFormatter;

impl Formatter for HumanFormatter {
    fn run(&self, report: &RunReport) -> Result<String> {
        let mut out = String::new();
        write_run_metadata(&mut out, report);

        let counters = &report.counters;
        out.push_str("Counters:\n");
        let _ = writeln!(out, "arrivals: {}", counters.arrivals);
        let _ = writeln!(out, "completed: {}", counters.completed);
        let _ = writeln!(out, "lost_at_admission: {}", counters.lost_at_admission);
        let _ = writeln!(out, "lost_at_dispatch: {}", counters.lost_at_dispatch);
        let _ = writeln!(out, "in_system_at_end: {}", counters.in_system_at_end);
        let _ = writeln!(out, "peak_admission: {}", counters.peak_admission);
        let _ = writeln!(out, "events_processed: {}", counters.events_processed);

        let stats = &report.statistics;
        out.push_str("Statistics:\n");
        let _ = writeln!(out, "mean_in_system: {:.4}", stats.mean_in_system);
        let _ = writeln!(out, "effective_throughput: {:.4}", stats.effective_throughput);
        let _ = writeln!(out, "mean_response_time: {:.4}", stats.mean_response_time);
        let _ = writeln!(
            out,
            "littles_law_response_time: {:.4}",
            stats.littles_law_response_time
        );
        let _ = writeln!(out, "loss_rate: {:.4}", stats.loss_rate);

        if !report.trace.is_empty() {
            out.push_str("Trace:\n");
            for entry in &report.trace {
                let _ = writeln!(out, "{:.6} {}", entry.time, entry.kind);
            }
        }
        Ok(out)
    }

    fn sweep(&self, report: &SweepReport) -> Result<String> {
        let mut out = String::new();
        out.push_str("Sweep:\n");
        let _ = writeln!(out, "policy: {}", report.policy);
        let _ = writeln!(out, "replications: {}", report.replications);
        let _ = writeln!(out, "max_loss_rate: {}", report.max_loss_rate);
        let _ = writeln!(out, "seed: {}", seed_label(report.seed));

        out.push_str("Results:\n");
        for point in &report.points {
            let _ = writeln!(
                out,
                "groups={} arrival_rate={:.2} W={:.4} ±{:.4} loss={:.2}% ±{:.2}%",
                point.groups,
                point.arrival_rate,
                point.response_time.mean,
                point.response_time.half_width,
                point.loss_rate.mean * 100.0,
                point.loss_rate.half_width * 100.0
            );
        }
        write_selection(&mut out, report);
        Ok(out)
    }
}

impl Formatter for SummaryFormatter {
    fn run(&self, report: &RunReport) -> Result<String> {
        Ok(format!(
            "groups={} arrival_rate={:.2} W={:.4} loss={:.2}%\n",
            report.groups,
            report.arrival_rate,
            report.statistics.mean_response_time,
            report.statistics.loss_rate * 100.0
        ))
    }

    fn sweep(&self, report: &SweepReport) -> Result<String> {
        let mut out = String::new();
        write_selection(&mut out, report);
        Ok(out)
    }
}

impl Formatter for JsonFormatter {
    fn run(&self, report: &RunReport) -> Result<String> {
        to_json(report)
    }

    fn sweep(&self, report: &SweepReport) -> Result<String> {
        to_json(report)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    let mut out =
        serde_json::to_string_pretty(value).map_err(|err| Error::Output(err.to_string()))?;
    out.push('\n');
    Ok(out)
}

fn write_run_metadata(out: &mut String, report: &RunReport) {
    out.push_str("Run:\n");
    let _ = writeln!(out, "groups: {}", report.groups);
    let _ = writeln!(out, "arrival_rate: {}", report.arrival_rate);
    let _ = writeln!(out, "policy: {}", report.policy);
    let _ = writeln!(out, "seed: {}", seed_label(report.seed));
}

fn write_selection(out: &mut String, report: &SweepReport) {
    let ceiling = report.max_loss_rate * 100.0;
    out.push_str("Saturation:\n");
    for threshold in &report.thresholds {
        match threshold.arrival_rate {
            Some(rate) => {
                let _ = writeln!(
                    out,
                    "groups={}: loss exceeds {:.2}% from arrival_rate={:.2}",
                    threshold.groups, ceiling, rate
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "groups={}: loss stays within {:.2}%",
                    threshold.groups, ceiling
                );
            }
        }
    }

    out.push_str("Optimal:\n");
    for choice in &report.choices {
        match (choice.groups, choice.mean_response_time) {
            (Some(groups), Some(w)) => {
                let _ = writeln!(
                    out,
                    "arrival_rate={:.2}: groups={} (W={:.4})",
                    choice.arrival_rate, groups, w
                );
            }
            _ => {
                let _ = writeln!(out, "arrival_rate={:.2}: none", choice.arrival_rate);
            }
        }
    }
}

fn seed_label(seed: Option<u64>) -> String {
    match seed {
        Some(seed) => seed.to_string(),
        None => "entropy".to_string(),
    }
}

pub fn render_config(config: &SimConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Servers: {}", config.total_servers);
    let _ = writeln!(out, "Queue capacity: {}", config.queue_capacity);
    let _ = writeln!(out, "Horizon: {}", config.horizon);
    let _ = writeln!(out, "Policy: {}", config.policy);
    let _ = writeln!(out, "Seed: {}", seed_label(config.seed));
    let _ = writeln!(out, "Replications: {}", config.replications);
    let _ = writeln!(out, "Max loss rate: {}", config.max_loss_rate);
    let groups = config
        .group_counts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "Group counts: {}", groups);
    let rates = match &config.arrival_rates {
        RateSweep::List(values) => values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        RateSweep::Range { start, stop, step } => {
            format!("{} to {} step {}", start, stop, step)
        }
    };
    let _ = writeln!(out, "Arrival rates: {}", rates);
    out.push_str("Service rates:\n");
    for entry in &config.service_rates {
        let _ = writeln!(out, "- {} groups: {} per server", entry.groups, entry.rate);
    }
    out
}
