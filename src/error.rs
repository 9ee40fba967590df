use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("arrival rate must be > 0 (got {0})")]
    InvalidArrivalRate(f64),
    #[error("service rate must be > 0 for {groups} groups (got {rate})")]
    InvalidServiceRate { groups: usize, rate: f64 },
    #[error("rate must be a positive finite number (got {0})")]
    InvalidRate(f64),
    #[error("no service rate configured for {0} groups")]
    MissingServiceRate(usize),
    #[error("duplicate service rate entry for {0} groups")]
    DuplicateServiceRate(usize),
    #[error("groups must be greater than 0")]
    GroupsZero,
    #[error("servers must be greater than 0")]
    ServersZero,
    #[error("{groups} groups do not evenly partition {servers} servers")]
    UnevenPartition { groups: usize, servers: usize },
    #[error("queue capacity must be greater than 0")]
    QueueCapacityZero,
    #[error("horizon must be > 0 (got {0})")]
    InvalidHorizon(f64),
    #[error("replications must be greater than 0")]
    ReplicationsZero,
    #[error("sweep must contain at least one group count and one arrival rate")]
    EmptySweep,
    #[error("invalid arrival rate range: start={start}, stop={stop}, step={step}")]
    InvalidRateRange { start: f64, stop: f64, step: f64 },
    #[error("arrival rate range expands to {count} values (limit {limit})")]
    TooManyRates { count: f64, limit: usize },
    #[error("max loss rate must be within [0, 1] (got {0})")]
    InvalidLossCeiling(f64),
    #[error("{0}")]
    ConfigIo(String),
    #[error("{0}")]
    ConfigParse(String),
    #[error("unsupported config format '{0}'")]
    UnsupportedConfigFormat(String),
    #[error("failed to serialize output: {0}")]
    Output(String),
    #[error("{0}")]
    Cli(String),
}

pub type Result<T> = std::result::Result<T, Error>;
