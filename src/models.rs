use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};

/// Immutable description of one simulated system and of the sweep grid
/// explored over it.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub total_servers: usize,
    pub queue_capacity: usize,
    pub horizon: f64,
    pub group_counts: Vec<usize>,
    pub arrival_rates: RateSweep,
    pub service_rates: Vec<ServiceRate>,
    pub policy: PolicyConfig,
    pub replications: usize,
    pub max_loss_rate: f64,
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            total_servers: 12,
            queue_capacity: 100,
            horizon: 1000.0,
            group_counts: vec![1, 2, 3, 6],
            arrival_rates: RateSweep::Range {
                start: 0.1,
                stop: 6.0,
                step: 0.35,
            },
            service_rates: default_service_rates(),
            policy: PolicyConfig::default(),
            replications: 10,
            max_loss_rate: 0.05,
            seed: None,
        }
    }
}

/// Per-server service rate used when the pool is split into `groups`.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct ServiceRate {
    pub groups: usize,
    pub rate: f64,
}

/// A fixed total capacity of 20 units redistributed across groups.
fn default_service_rates() -> Vec<ServiceRate> {
    [(1, 4.0), (2, 7.0), (3, 10.0), (6, 14.0)]
        .into_iter()
        .map(|(groups, units)| ServiceRate {
            groups,
            rate: units / 20.0,
        })
        .collect()
}

/// Upper bound on the number of arrival rates a range may expand to.
pub const MAX_SWEEP_RATES: usize = 10_000;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum RateSweep {
    List(Vec<f64>),
    Range { start: f64, stop: f64, step: f64 },
}

impl RateSweep {
    /// Expands the sweep into concrete arrival rates. Ranges are half-open.
    pub fn values(&self) -> Result<Vec<f64>> {
        match self {
            RateSweep::List(values) => Ok(values.clone()),
            RateSweep::Range { start, stop, step } => {
                let valid = start.is_finite()
                    && stop.is_finite()
                    && step.is_finite()
                    && *step > 0.0
                    && start < stop;
                if !valid {
                    return Err(Error::InvalidRateRange {
                        start: *start,
                        stop: *stop,
                        step: *step,
                    });
                }
                let count = ((stop - start) / step).ceil();
                if count > MAX_SWEEP_RATES as f64 {
                    return Err(Error::TooManyRates {
                        count,
                        limit: MAX_SWEEP_RATES,
                    });
                }
                // Index-based stepping keeps accumulated float error out of the grid.
                let values = (0..=count as usize)
                    .map(|idx| start + step * idx as f64)
                    .take_while(|value| value < stop)
                    .collect();
                Ok(values)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyConfig {
    #[default]
    WaitingList,
    Reject,
    HeadOfLine,
}

impl PolicyConfig {
    pub const ALL: [PolicyConfig; 3] = [
        PolicyConfig::WaitingList,
        PolicyConfig::Reject,
        PolicyConfig::HeadOfLine,
    ];
}

impl fmt::Display for PolicyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PolicyConfig::WaitingList => "waiting-list",
            PolicyConfig::Reject => "reject",
            PolicyConfig::HeadOfLine => "head-of-line",
        };
        f.write_str(label)
    }
}

/// Validated lookup from group count to per-server service rate.
#[derive(Clone, Debug)]
pub struct ServiceRateTable {
    entries: Vec<ServiceRate>,
}

impl ServiceRateTable {
    pub fn new(entries: &[ServiceRate]) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in entries {
            if entry.groups == 0 {
                return Err(Error::GroupsZero);
            }
            if !(entry.rate.is_finite() && entry.rate > 0.0) {
                return Err(Error::InvalidServiceRate {
                    groups: entry.groups,
                    rate: entry.rate,
                });
            }
            if !seen.insert(entry.groups) {
                return Err(Error::DuplicateServiceRate(entry.groups));
            }
        }
        Ok(Self {
            entries: entries.to_vec(),
        })
    }

    pub fn rate_for(&self, groups: usize) -> Result<f64> {
        self.entries
            .iter()
            .find(|entry| entry.groups == groups)
            .map(|entry| entry.rate)
            .ok_or(Error::MissingServiceRate(groups))
    }
}

impl SimConfig {
    /// Checks everything a single run depends on.
    pub fn validate_system(&self) -> Result<ServiceRateTable> {
        if self.total_servers == 0 {
            return Err(Error::ServersZero);
        }
        if self.queue_capacity == 0 {
            return Err(Error::QueueCapacityZero);
        }
        if !(self.horizon.is_finite() && self.horizon > 0.0) {
            return Err(Error::InvalidHorizon(self.horizon));
        }
        ServiceRateTable::new(&self.service_rates)
    }

    /// Checks that `groups` is usable against this system and returns its
    /// per-server service rate.
    pub fn validate_groups(&self, table: &ServiceRateTable, groups: usize) -> Result<f64> {
        if groups == 0 {
            return Err(Error::GroupsZero);
        }
        if self.total_servers % groups != 0 {
            return Err(Error::UnevenPartition {
                groups,
                servers: self.total_servers,
            });
        }
        table.rate_for(groups)
    }

    /// Full validation, including the sweep grid.
    pub fn validate(&self) -> Result<()> {
        let table = self.validate_system()?;
        if self.replications == 0 {
            return Err(Error::ReplicationsZero);
        }
        if !(0.0..=1.0).contains(&self.max_loss_rate) {
            return Err(Error::InvalidLossCeiling(self.max_loss_rate));
        }
        let rates = self.arrival_rates.values()?;
        if self.group_counts.is_empty() || rates.is_empty() {
            return Err(Error::EmptySweep);
        }
        for groups in &self.group_counts {
            self.validate_groups(&table, *groups)?;
        }
        for rate in rates {
            validate_arrival_rate(rate)?;
        }
        Ok(())
    }
}

pub fn validate_arrival_rate(rate: f64) -> Result<()> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidArrivalRate(rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        SimConfig::default().validate().expect("defaults should validate");
    }

    #[test]
    fn default_service_rates_split_twenty_units() {
        let table = ServiceRateTable::new(&default_service_rates()).unwrap();
        assert_eq!(table.rate_for(1).unwrap(), 0.2);
        assert_eq!(table.rate_for(2).unwrap(), 0.35);
        assert_eq!(table.rate_for(3).unwrap(), 0.5);
        assert_eq!(table.rate_for(6).unwrap(), 0.7);
        assert!(matches!(table.rate_for(4), Err(Error::MissingServiceRate(4))));
    }

    #[test]
    fn range_sweep_is_half_open() {
        let sweep = RateSweep::Range {
            start: 0.5,
            stop: 2.0,
            step: 0.5,
        };
        assert_eq!(sweep.values().unwrap(), vec![0.5, 1.0, 1.5]);
    }

    #[test]
    fn default_range_has_seventeen_points() {
        let values = SimConfig::default().arrival_rates.values().unwrap();
        assert_eq!(values.len(), 17);
        assert!((values[16] - 5.7).abs() < 1e-9);
    }

    #[test]
    fn range_rejects_oversized_expansion() {
        let sweep = RateSweep::Range {
            start: 0.1,
            stop: 6.0,
            step: 1e-9,
        };
        assert!(matches!(
            sweep.values(),
            Err(Error::TooManyRates {
                limit: MAX_SWEEP_RATES,
                ..
            })
        ));

        let fine = RateSweep::Range {
            start: 0.0,
            stop: 1.0,
            step: 0.001,
        };
        let values = fine.values().unwrap();
        assert!((999..=1000).contains(&values.len()), "len was {}", values.len());
        assert!(values.iter().all(|value| *value < 1.0));
    }

    #[test]
    fn range_rejects_non_positive_step() {
        let sweep = RateSweep::Range {
            start: 0.5,
            stop: 2.0,
            step: 0.0,
        };
        assert!(sweep.values().is_err());
    }

    #[test]
    fn uneven_partition_is_rejected() {
        let mut config = SimConfig::default();
        config.service_rates.push(ServiceRate {
            groups: 5,
            rate: 0.6,
        });
        let table = config.validate_system().unwrap();
        let err = config.validate_groups(&table, 5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "5 groups do not evenly partition 12 servers"
        );
    }

    #[test]
    fn duplicate_service_rates_are_rejected() {
        let entries = [
            ServiceRate {
                groups: 2,
                rate: 0.3,
            },
            ServiceRate {
                groups: 2,
                rate: 0.4,
            },
        ];
        assert!(matches!(
            ServiceRateTable::new(&entries),
            Err(Error::DuplicateServiceRate(2))
        ));
    }

    #[test]
    fn non_positive_service_rate_is_rejected() {
        let entries = [ServiceRate {
            groups: 1,
            rate: 0.0,
        }];
        assert!(ServiceRateTable::new(&entries).is_err());
    }

    #[test]
    fn zero_queue_capacity_is_rejected() {
        let config = SimConfig {
            queue_capacity: 0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate_system(),
            Err(Error::QueueCapacityZero)
        ));
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: SimConfig = toml::from_str(
            r#"
queue_capacity = 20
policy = "head-of-line"
arrival_rates = [0.5, 1.0]
"#,
        )
        .unwrap();
        assert_eq!(config.queue_capacity, 20);
        assert_eq!(config.total_servers, 12);
        assert_eq!(config.policy, PolicyConfig::HeadOfLine);
        assert_eq!(config.arrival_rates, RateSweep::List(vec![0.5, 1.0]));
    }
}
