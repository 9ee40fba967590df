use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use crate::engine::{run_simulation_with_options, RunOptions};
use crate::error::Result;
use crate::models::{PolicyConfig, SimConfig};
use crate::stats::{confidence_interval, Estimate};

#[derive(Clone, Debug, Serialize)]
pub struct SweepPoint {
    pub groups: usize,
    pub arrival_rate: f64,
    pub response_time: Estimate,
    pub loss_rate: Estimate,
}

/// First swept arrival rate at which mean loss exceeds the ceiling.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SaturationThreshold {
    pub groups: usize,
    pub arrival_rate: Option<f64>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct OptimalChoice {
    pub arrival_rate: f64,
    pub groups: Option<usize>,
    pub mean_response_time: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SweepReport {
    pub policy: PolicyConfig,
    pub replications: usize,
    pub max_loss_rate: f64,
    pub seed: Option<u64>,
    pub points: Vec<SweepPoint>,
    pub thresholds: Vec<SaturationThreshold>,
    pub choices: Vec<OptimalChoice>,
}

/// Runs `replications` independent simulations for every
/// (group count, arrival rate) pair of the grid.
///
/// With a master seed every run gets its own seed drawn in grid order, so the
/// whole sweep is reproducible.
pub fn run_sweep(config: &SimConfig) -> Result<SweepReport> {
    config.validate()?;
    let rates = config.arrival_rates.values()?;
    let mut seeds = config.seed.map(StdRng::seed_from_u64);

    info!(
        groups = config.group_counts.len(),
        rates = rates.len(),
        replications = config.replications,
        "starting sweep"
    );

    let mut points = Vec::new();
    for &groups in &config.group_counts {
        for &arrival_rate in &rates {
            let mut response_times = Vec::new();
            let mut loss_rates = Vec::new();
            for _ in 0..config.replications {
                let options = RunOptions {
                    seed: seeds.as_mut().map(|rng| rng.gen::<u64>()),
                    record_trace: false,
                };
                let report = run_simulation_with_options(config, groups, arrival_rate, &options)?;
                response_times.push(report.statistics.mean_response_time);
                loss_rates.push(report.statistics.loss_rate);
            }
            let point = SweepPoint {
                groups,
                arrival_rate,
                response_time: confidence_interval(&response_times),
                loss_rate: confidence_interval(&loss_rates),
            };
            debug!(
                groups,
                arrival_rate,
                mean_response_time = point.response_time.mean,
                mean_loss_rate = point.loss_rate.mean,
                "sweep point"
            );
            points.push(point);
        }
    }

    let thresholds = config
        .group_counts
        .iter()
        .map(|&groups| SaturationThreshold {
            groups,
            arrival_rate: saturation_threshold(&points, groups, config.max_loss_rate),
        })
        .collect();
    let choices = rates
        .iter()
        .map(|&arrival_rate| {
            let best = select_optimal(&points, arrival_rate, config.max_loss_rate);
            OptimalChoice {
                arrival_rate,
                groups: best.map(|(groups, _)| groups),
                mean_response_time: best.map(|(_, w)| w),
            }
        })
        .collect();

    Ok(SweepReport {
        policy: config.policy,
        replications: config.replications,
        max_loss_rate: config.max_loss_rate,
        seed: config.seed,
        points,
        thresholds,
        choices,
    })
}

pub fn saturation_threshold(
    points: &[SweepPoint],
    groups: usize,
    max_loss_rate: f64,
) -> Option<f64> {
    points
        .iter()
        .filter(|point| point.groups == groups)
        .find(|point| point.loss_rate.mean > max_loss_rate)
        .map(|point| point.arrival_rate)
}

/// Group count with the lowest mean response time among those whose mean
/// loss stays within `max_loss_rate` at `arrival_rate`. Ties keep the
/// earlier point.
pub fn select_optimal(
    points: &[SweepPoint],
    arrival_rate: f64,
    max_loss_rate: f64,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for point in points {
        if point.arrival_rate != arrival_rate || point.loss_rate.mean > max_loss_rate {
            continue;
        }
        let w = point.response_time.mean;
        let better = match best {
            Some((_, best_w)) => w < best_w,
            None => w.is_finite(),
        };
        if better {
            best = Some((point.groups, w));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RateSweep;

    fn point(groups: usize, arrival_rate: f64, w: f64, loss: f64) -> SweepPoint {
        SweepPoint {
            groups,
            arrival_rate,
            response_time: Estimate {
                mean: w,
                half_width: 0.0,
            },
            loss_rate: Estimate {
                mean: loss,
                half_width: 0.0,
            },
        }
    }

    #[test]
    fn selects_fastest_group_within_loss_ceiling() {
        let points = vec![
            point(1, 1.0, 6.0, 0.0),
            point(2, 1.0, 4.0, 0.01),
            point(3, 1.0, 3.0, 0.2),
            point(1, 2.0, 1.0, 0.0),
        ];
        assert_eq!(select_optimal(&points, 1.0, 0.05), Some((2, 4.0)));
    }

    #[test]
    fn no_choice_when_every_group_loses_too_much() {
        let points = vec![point(1, 3.0, 6.0, 0.3), point(6, 3.0, 9.0, 0.5)];
        assert_eq!(select_optimal(&points, 3.0, 0.05), None);
    }

    #[test]
    fn infinite_response_time_is_never_chosen() {
        let points = vec![point(1, 0.1, f64::INFINITY, 0.0)];
        assert_eq!(select_optimal(&points, 0.1, 0.05), None);
    }

    #[test]
    fn threshold_is_first_rate_over_ceiling() {
        let points = vec![
            point(6, 0.5, 2.0, 0.0),
            point(6, 1.0, 3.0, 0.04),
            point(6, 1.5, 5.0, 0.12),
            point(6, 2.0, 9.0, 0.30),
            point(1, 2.0, 5.0, 0.0),
        ];
        assert_eq!(saturation_threshold(&points, 6, 0.05), Some(1.5));
        assert_eq!(saturation_threshold(&points, 1, 0.05), None);
    }

    #[test]
    fn less_pooling_saturates_earlier() {
        let config = SimConfig {
            group_counts: vec![1, 6],
            arrival_rates: RateSweep::List(vec![0.5, 1.0, 1.5, 2.0, 2.5, 3.0]),
            replications: 2,
            seed: Some(31),
            ..SimConfig::default()
        };
        let report = run_sweep(&config).expect("sweep should succeed");
        assert_eq!(report.points.len(), 12);

        let six = report.thresholds[1].arrival_rate.expect("six groups should saturate");
        let pooled = report.thresholds[0].arrival_rate.unwrap_or(f64::INFINITY);
        assert!(six < pooled, "six={} pooled={}", six, pooled);
        assert!(report
            .choices
            .iter()
            .all(|choice| choice.groups.is_some() || choice.arrival_rate >= six));
    }

    #[test]
    fn seeded_sweep_is_reproducible() {
        let config = SimConfig {
            group_counts: vec![2, 3],
            arrival_rates: RateSweep::List(vec![0.8, 1.6]),
            replications: 3,
            horizon: 200.0,
            seed: Some(4),
            ..SimConfig::default()
        };
        let a = run_sweep(&config).unwrap();
        let b = run_sweep(&config).unwrap();
        for (left, right) in a.points.iter().zip(&b.points) {
            assert_eq!(left.response_time, right.response_time);
            assert_eq!(left.loss_rate, right.loss_rate);
        }
        assert_eq!(a.choices, b.choices);
    }

    #[test]
    fn invalid_grid_is_rejected_up_front() {
        let config = SimConfig {
            group_counts: vec![1, 5],
            ..SimConfig::default()
        };
        assert!(run_sweep(&config).is_err());
    }
}
