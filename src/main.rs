use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use combo_meta::config::AppConfig;
use combo_meta::engine::MetaEngine;
use combo_meta::models::Scope;
use combo_meta::parser::RecordingTrace;
use combo_meta::ranking::RankHistory;
use combo_meta::storage::{JsonlStore, StorageConfig};

#[derive(Parser)]
#[command(name = "combo-meta")]
#[command(about = "Build-name parser and tournament ranking engine for spinning-top combos")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a build name into its parts
    Parse {
        /// Build name, e.g. "Dran Sword 3-60F"
        name: String,

        /// Print every parse decision
        #[arg(long)]
        explain: bool,
    },

    /// Player, combo and part statistics with standings
    Stats {
        /// Restrict to one tournament
        #[arg(long)]
        tournament: Option<String>,

        /// Restrict to one phase of the tournament
        #[arg(long, requires = "tournament")]
        phase: Option<u32>,
    },

    /// Tournament leaderboard
    Leaderboard {
        /// Tournament to rank
        #[arg(long)]
        tournament: String,

        /// Restrict to one phase
        #[arg(long)]
        phase: Option<u32>,
    },
}

fn load_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))
    } else {
        Ok(AppConfig::default())
    }
}

fn scope_of(tournament: Option<String>, phase: Option<u32>) -> Scope {
    match (tournament, phase) {
        (Some(id), Some(phase)) => Scope::tournament(id).with_phase(phase),
        (Some(id), None) => Scope::tournament(id),
        (None, _) => Scope::All,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    let log_level = cli.log_level.unwrap_or_else(|| config.log_level.clone());

    // Initialize tracing; stdout is reserved for command output
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    let json_layer = cli.json_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!cli.json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    tracing::info!("Starting combo-meta v{}", env!("CARGO_PKG_VERSION"));

    let store = JsonlStore::new(StorageConfig::new(config.data_dir.clone()));
    let engine = MetaEngine::load(&store, &config)?;

    match cli.command {
        Commands::Parse { name, explain } => {
            let mut trace = RecordingTrace::default();
            let build = engine.parser().parse(&name, &mut trace);

            if explain {
                for event in &trace.events {
                    println!("{:?}", event);
                }
            }
            for input in trace.ambiguous() {
                tracing::warn!("{:?} also reads as a custom build", input);
            }
            match build.display_name() {
                Some(canonical) => tracing::info!("Resolved {:?} as {}", name, canonical),
                None => tracing::warn!("Could not resolve {:?}", name),
            }
            println!("{}", serde_json::to_string_pretty(&build)?);
        }

        Commands::Stats { tournament, phase } => {
            let scope = scope_of(tournament, phase);
            let mut history = RankHistory::new();
            let report = engine.recompute(&store, &scope, &mut history)?;

            if report.unattributed > 0 {
                tracing::warn!(
                    "{} build appearances could not be resolved",
                    report.unattributed
                );
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Leaderboard { tournament, phase } => {
            let scope = scope_of(Some(tournament), phase);
            let mut history = RankHistory::new();
            let report = engine.recompute(&store, &scope, &mut history)?;

            println!("{}", serde_json::to_string_pretty(&report.standings)?);
        }
    }

    Ok(())
}
