//! CLI driver for the idle game scheduling core.

mod commands;
mod game;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::simulate::SimulateOptions;

#[derive(Parser)]
#[command(
    name = "idle",
    about = "Idle game scheduling core: consolidated timers, category loops, passive income",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log filter (e.g. "debug", "idle_timers=trace"). Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demo game in virtual time and report the outcome
    Simulate {
        /// Simulated seconds
        #[arg(short = 'n', long, default_value = "60")]
        seconds: u64,

        /// RNG seed for the simulated clicks
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Average simulated clicks per second
        #[arg(short, long, default_value = "4.0")]
        clicks_per_second: f64,

        /// JSON file overriding timer, loop, tick, and economy settings
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Also show per-system statistics and purchases
        #[arg(short, long)]
        verbose: bool,

        /// Follow the wall clock instead of advancing virtual time
        #[arg(long)]
        realtime: bool,
    },

    /// Show how requested intervals map onto frequency groups
    Normalize {
        /// Requested intervals in milliseconds
        #[arg(required = true)]
        intervals: Vec<u64>,
    },
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let result = match cli.command {
        Commands::Simulate {
            seconds,
            seed,
            clicks_per_second,
            config,
            json,
            verbose,
            realtime,
        } => commands::simulate::run(&SimulateOptions {
            seconds,
            seed,
            clicks_per_second,
            config,
            json,
            verbose,
            realtime,
        }),
        Commands::Normalize { intervals } => commands::normalize::run(&intervals),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
