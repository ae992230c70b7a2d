// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dt - deployment project tracker

mod commands;
mod config;
mod error;
mod output;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use commands::{checklist, phase, project, seed, stats, status, timeline, Context};
use config::Config;
use dt_storage::ProjectStore;
use output::OutputFormat;
use std::path::PathBuf;
use std::process::ExitCode;

/// Environment variable holding the log filter
const LOG_ENV: &str = "DT_LOG";

#[derive(Parser)]
#[command(
    name = "dt",
    version,
    about = "dt - track deployment projects through preparation, execution, and validation"
)]
struct Cli {
    /// Data directory (defaults to $DT_DATA_DIR, then the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Email of the person making changes
    #[arg(long, global = true)]
    actor: Option<String>,

    /// Output format
    #[arg(short = 'o', long = "output", global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project management
    #[command(subcommand)]
    Project(project::ProjectCommand),
    /// Phase transitions
    #[command(subcommand)]
    Phase(phase::PhaseCommand),
    /// Hold, cancel, or resume a project
    #[command(subcommand)]
    Status(status::StatusCommand),
    /// Project history
    Timeline(timeline::TimelineArgs),
    /// Deployment checklists
    #[command(subcommand)]
    Checklist(checklist::ChecklistCommand),
    /// Dashboard counts
    Stats(stats::StatsArgs),
    /// Create demo projects
    Seed(seed::SeedArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprint!("{}", error::report(err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.data_dir)?;
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("cannot create {}", config.data_dir.display()))?;
    let _guard = setup_logging(&config)?;

    tracing::debug!(data_dir = %config.data_dir.display(), "opening store");
    let ctx = Context {
        store: ProjectStore::open(&config.data_dir)?,
        directory: config.directory(),
        actor: cli.actor,
        format: cli.output,
    };

    match cli.command {
        Commands::Project(command) => project::handle(command, &ctx),
        Commands::Phase(command) => phase::handle(command, &ctx),
        Commands::Status(command) => status::handle(command, &ctx),
        Commands::Timeline(args) => timeline::handle(args, &ctx),
        Commands::Checklist(command) => checklist::handle(command, &ctx),
        Commands::Stats(args) => stats::handle(args, &ctx),
        Commands::Seed(args) => seed::handle(args, &ctx),
    }
}

/// Log to stderr and to `<data-dir>/dt.log`.
///
/// The filter comes from `DT_LOG`, then `log_level` in the config file,
/// then `warn`.
fn setup_logging(config: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let dir = config
        .log_path
        .parent()
        .context("log path has no parent directory")?;
    let file_name = config
        .log_path
        .file_name()
        .context("log path has no file name")?;
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(config.log_level.as_deref().unwrap_or("warn"))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .try_init()
        .context("failed to install logger")?;

    Ok(guard)
}
