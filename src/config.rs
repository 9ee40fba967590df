use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::{PolicyConfig, SimConfig};

#[derive(Parser, Debug)]
#[command(
    name = "router-sim",
    about = "Simulate a router feeding category-partitioned server pools"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one simulation and report its statistics
    Run(RunArgs),
    /// Repeat simulations over the configured grid of group counts and arrival rates
    Sweep(SweepArgs),
    /// Print the effective configuration
    ShowConfig(ConfigArgs),
    /// Print the supported overflow policies
    ListPolicies,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// TOML or JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub servers: Option<usize>,
    #[arg(long)]
    pub queue_capacity: Option<usize>,
    #[arg(long)]
    pub horizon: Option<f64>,
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
    #[arg(long, help = "Seed the variate generator; omit for a randomized run")]
    pub seed: Option<u64>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    #[arg(long)]
    pub groups: usize,
    #[arg(long)]
    pub arrival_rate: f64,
    /// Include the processed event sequence in the output
    #[arg(long)]
    pub trace: bool,
    #[arg(long, value_enum, default_value_t = FormatArg::Human)]
    pub format: FormatArg,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
    #[arg(long)]
    pub replications: Option<usize>,
    #[arg(long)]
    pub max_loss_rate: Option<f64>,
    #[arg(long, value_enum, default_value_t = FormatArg::Human)]
    pub format: FormatArg,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatArg {
    Human,
    Summary,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyArg {
    WaitingList,
    Reject,
    HeadOfLine,
}

impl From<PolicyArg> for PolicyConfig {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::WaitingList => PolicyConfig::WaitingList,
            PolicyArg::Reject => PolicyConfig::Reject,
            PolicyArg::HeadOfLine => PolicyConfig::HeadOfLine,
        }
    }
}

pub fn parse_args() -> Result<Args> {
    Args::try_parse().map_err(|e| Error::Cli(e.to_string()))
}

/// Loads the configuration file, if any, and applies command-line overrides.
pub fn build_config(args: &ConfigArgs) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SimConfig::default(),
    };
    if let Some(servers) = args.servers {
        config.total_servers = servers;
    }
    if let Some(queue_capacity) = args.queue_capacity {
        config.queue_capacity = queue_capacity;
    }
    if let Some(horizon) = args.horizon {
        config.horizon = horizon;
    }
    if let Some(policy) = args.policy {
        config.policy = policy.into();
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

pub fn build_sweep_config(args: &SweepArgs) -> Result<SimConfig> {
    let mut config = build_config(&args.config)?;
    if let Some(replications) = args.replications {
        config.replications = replications;
    }
    if let Some(max_loss_rate) = args.max_loss_rate {
        config.max_loss_rate = max_loss_rate;
    }
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<SimConfig> {
    let contents = fs::read_to_string(path).map_err(|err| {
        Error::ConfigIo(format!(
            "failed to read config '{}': {}",
            path.display(),
            err
        ))
    })?;
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .unwrap_or("");

    match ext {
        "toml" => toml::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse TOML: {}", err))),
        "json" => serde_json::from_str(&contents)
            .map_err(|err| Error::ConfigParse(format!("failed to parse JSON: {}", err))),
        "" => Err(Error::UnsupportedConfigFormat("unknown".to_string())),
        _ => Err(Error::UnsupportedConfigFormat(ext.to_string())),
    }
}
