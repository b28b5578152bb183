//! CLI for the taskq job scheduler.

mod commands;
mod console;
mod copy_job;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use taskq_core::config;

use commands::{run_config, run_history, run_jobs, run_recent};

/// Top-level CLI for taskq.
#[derive(Debug, Parser)]
#[command(name = "taskq")]
#[command(about = "taskq: run file jobs under a concurrency limit and keep a history", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Copy files into a destination folder as scheduled jobs and exit when all are done.
    Run {
        /// Files to process.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Jobs working at once; overrides `upload_limit`. 0 means unbounded.
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        limit: Option<i32>,
        /// Destination folder (default: current directory).
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
        /// Do not record completed jobs in the history log.
        #[arg(long)]
        no_history: bool,
    },

    /// Show the most recent history records.
    History {
        /// Number of records to show.
        #[arg(long, default_value = "20", value_name = "N")]
        limit: usize,
    },

    /// Show the recent-task list.
    Recent,

    /// Print the config file location and effective settings.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                files,
                limit,
                out,
                no_history,
            } => {
                let out = match out {
                    Some(dir) => dir,
                    None => std::env::current_dir()?,
                };
                run_jobs(cfg, &files, limit, &out, no_history).await?;
            }
            CliCommand::History { limit } => run_history(limit)?,
            CliCommand::Recent => run_recent(&cfg)?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
