//! Merit Command Line Interface
//!
//! Thin entry points for the two coordinator roles. All wiring comes from
//! the TOML config: file-backed providers feed the pipeline, and the
//! emitted propose/approve instructions are printed as JSON for the
//! external registry submitter.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use merit_coordinator::{
    FileProviders, FileTreeStore, GuardianOutcome, RetryPolicy, RewardsConfig,
    RootCoordinator, SystemClock, UpdaterOutcome,
};
use merit_types::BlockNumber;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "merit")]
#[command(about = "Merit reward root updater and guardian", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the rewards configuration file
    #[arg(long, default_value = "merit.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute rewards for a block range and emit a propose instruction
    Updater {
        /// First block of the cycle range (exclusive)
        #[arg(long)]
        start_block: BlockNumber,
        /// Last block of the cycle range (inclusive)
        #[arg(long)]
        end_block: BlockNumber,
    },
    /// Verify the pending root and emit an approve instruction on match
    Guardian {
        /// Expected first block of the pending range (exclusive)
        #[arg(long, requires = "end_block")]
        start_block: Option<BlockNumber>,
        /// Expected last block of the pending range (inclusive)
        #[arg(long, requires = "start_block")]
        end_block: Option<BlockNumber>,
    },
}

#[derive(Serialize)]
struct RunResult<T: Serialize> {
    role: &'static str,
    /// False for normal skip outcomes (rate limit, no pending root)
    ran: bool,
    outcome: T,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = RewardsConfig::load(&cli.config)?;
    let providers = FileProviders::from_paths(&config.providers)
        .context("wiring file providers from config")?;
    let store = FileTreeStore::new(&config.store_dir);

    let coordinator = RootCoordinator::new(
        config,
        providers.boosts,
        Arc::new(providers.snapshots),
        Arc::new(providers.schedules),
        Arc::new(providers.block_times),
        Arc::new(providers.registry),
        Arc::new(store),
        Arc::new(SystemClock),
    )?;

    let retry = RetryPolicy::default();
    match cli.command {
        Commands::Updater {
            start_block,
            end_block,
        } => {
            let outcome = retry.run("updater", || {
                coordinator.run_updater(start_block, end_block)
            })?;
            let ran = matches!(outcome, UpdaterOutcome::Proposed(_));
            print_result(RunResult {
                role: "updater",
                ran,
                outcome,
            })
        }
        Commands::Guardian {
            start_block,
            end_block,
        } => {
            let expected = start_block.zip(end_block);
            let outcome = retry.run("guardian", || coordinator.run_guardian(expected))?;
            let ran = matches!(outcome, GuardianOutcome::Approved(_));
            print_result(RunResult {
                role: "guardian",
                ran,
                outcome,
            })
        }
    }
}

fn print_result<T: Serialize>(result: RunResult<T>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
