//! Tracemine CLI
//!
//! Thin command-line entry point over the mining engine. Consumes an
//! already-ingested event log encoded as a JSON array of traces (each an
//! array of activity strings) and emits the discovered model descriptions
//! as JSON; matrices render as text tables.
//!
//! ## Usage
//!
//! ```bash
//! # Alpha miner: Petri-net description
//! tracemine alpha --log log.json
//!
//! # Footprint matrix instead of the net
//! tracemine alpha --log log.json --footprint
//!
//! # Heuristic miner: dependency graph, causal net, labelled bindings
//! tracemine heuristic --log log.json --direct-follows-min 5 --dependency-measure-min 0.8
//!
//! # Dependency-measure matrix
//! tracemine heuristic --log log.json --matrix
//!
//! # Effective configuration
//! tracemine config
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracemine::{AlphaMiner, Config, EventLog, HeuristicMiner, Trace};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tracemine", version, about = "Process mining from event logs")]
struct Cli {
    /// Path to a configuration file (defaults to config.toml + environment)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Discover a Petri net with the alpha miner
    Alpha {
        /// Event log: JSON array of traces (arrays of activity strings)
        #[arg(long)]
        log: PathBuf,

        /// Print the footprint matrix instead of the net description
        #[arg(long)]
        footprint: bool,
    },

    /// Discover a dependency graph and causal net with the heuristic miner
    Heuristic {
        /// Event log: JSON array of traces (arrays of activity strings)
        #[arg(long)]
        log: PathBuf,

        /// Drop direct-follow pairs with count below this
        #[arg(long)]
        direct_follows_min: Option<i64>,

        /// Drop pairs with dependency measure below this
        #[arg(long)]
        dependency_measure_min: Option<f64>,

        /// Print the dependency-measure matrix instead of the descriptions
        #[arg(long)]
        matrix: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Serialize)]
struct HeuristicOutput {
    dependency_graph: tracemine::DependencyGraph,
    causal_net: tracemine::CausalNet,
    bindings: tracemine::BindingReport,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config);

    match cli.command {
        Command::Alpha { log, footprint } => {
            let log = read_log(&log)?;
            let miner = AlphaMiner::new();
            if footprint {
                print!("{}", miner.footprint(&log));
            } else {
                let net = miner.discover(&log);
                println!("{}", serde_json::to_string_pretty(&net)?);
            }
        }
        Command::Heuristic {
            log,
            direct_follows_min,
            dependency_measure_min,
            matrix,
        } => {
            let log = read_log(&log)?;
            let mut mining = config.mining.clone();
            if let Some(threshold) = direct_follows_min {
                mining.thresholds.direct_follows_min = threshold;
            }
            if let Some(threshold) = dependency_measure_min {
                mining.thresholds.dependency_measure_min = threshold;
            }
            let miner = HeuristicMiner::with_config(mining);
            if matrix {
                print!("{}", miner.measure_matrix(&log));
            } else {
                let output = HeuristicOutput {
                    dependency_graph: miner.dependency_graph(&log)?,
                    bindings: miner.bindings(&log)?.labelled(),
                    causal_net: miner.causal_net(&log)?,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
        Command::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(&path.to_string_lossy())
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::load().context("failed to load configuration")?,
    };
    Ok(config)
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_log(path: &std::path::Path) -> Result<EventLog> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event log {}", path.display()))?;
    let traces: Vec<Trace> = serde_json::from_str(&raw)
        .with_context(|| format!("event log {} is not a JSON array of traces", path.display()))?;
    tracing::info!(traces = traces.len(), "event_log_loaded");
    Ok(EventLog::from_traces(traces))
}
