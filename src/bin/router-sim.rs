use router_sim::config::{self, Command, FormatArg};
use router_sim::engine::{self, RunOptions};
use router_sim::error::Result;
use router_sim::models::PolicyConfig;
use router_sim::output::{self, Formatter, HumanFormatter, JsonFormatter, SummaryFormatter};
use router_sim::sweep;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = config::parse_args()?;

    let output = match args.command {
        Command::Run(args) => {
            let config = config::build_config(&args.config)?;
            let options = RunOptions {
                seed: config.seed,
                record_trace: args.trace,
            };
            let report = engine::run_simulation_with_options(
                &config,
                args.groups,
                args.arrival_rate,
                &options,
            )?;
            formatter_for(args.format).run(&report)?
        }
        Command::Sweep(args) => {
            let config = config::build_sweep_config(&args)?;
            let report = sweep::run_sweep(&config)?;
            formatter_for(args.format).sweep(&report)?
        }
        Command::ShowConfig(args) => {
            let config = config::build_config(&args)?;
            config.validate()?;
            output::render_config(&config)
        }
        Command::ListPolicies => PolicyConfig::ALL
            .iter()
            .map(|policy| format!("{}\n", policy))
            .collect(),
    };
    print!("{}", output);

    Ok(())
}

fn formatter_for(format: FormatArg) -> Box<dyn Formatter> {
    match format {
        FormatArg::Human => Box::new(HumanFormatter),
        FormatArg::Summary => Box::new(SummaryFormatter),
        FormatArg::Json => Box::new(JsonFormatter),
    }
}
