//! CLI for the cadence upload queue runner.

mod commands;
mod control_socket;

use std::sync::Arc;

use anyhow::Result;
use cadence_core::config;
use cadence_core::queue_db::QueueDb;
use cadence_core::scheduler::Decision;
use clap::{Parser, Subcommand};

use commands::{
    run_add, run_completions, run_decision, run_pause, run_queue, run_remove, run_status,
    RunMode,
};

/// Top-level CLI for cadence.
#[derive(Debug, Parser)]
#[command(name = "cadence")]
#[command(about = "cadence: paced upload-then-archive queue runner", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Append payloads to a queue (the queue is created if needed).
    Add {
        /// Queue name.
        queue: String,
        /// Payloads handed to the upload command, in order.
        #[arg(required = true)]
        payloads: Vec<String>,
    },

    /// Run a queue from its saved position until it completes or stops.
    Run {
        /// Queue name.
        queue: String,
    },

    /// Resume a paused or halted queue.
    Resume {
        /// Queue name.
        queue: String,
        /// Continue at this item number (1-based) instead of the saved position.
        #[arg(long, value_name = "ITEM")]
        from: Option<usize>,
    },

    /// Pause a queue. If `cadence run` is active, it stops at its next checkpoint.
    Pause {
        /// Queue name.
        queue: String,
    },

    /// Skip the item a halted queue stopped at.
    Skip {
        /// Queue name.
        queue: String,
    },

    /// Replace the payload of the item a halted queue stopped at.
    Replace {
        /// Queue name.
        queue: String,
        /// New payload for that item.
        payload: String,
    },

    /// Show all queues, or the items of one queue.
    Status {
        /// Queue name.
        queue: Option<String>,
    },

    /// Remove a queue and its items.
    Remove {
        /// Queue name.
        queue: String,
    },

    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        if let CliCommand::Completions { shell } = cli.command {
            run_completions(shell);
            return Ok(());
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let db = Arc::new(QueueDb::open_default().await?);

        match cli.command {
            CliCommand::Add { queue, payloads } => run_add(&db, &queue, &payloads).await?,
            CliCommand::Run { queue } => run_queue(db, &cfg, &queue, RunMode::Run).await?,
            CliCommand::Resume { queue, from } => {
                let mode = match from {
                    Some(0) => anyhow::bail!("item numbers start at 1"),
                    Some(n) => RunMode::ResumeFrom(n - 1),
                    None => RunMode::Resume,
                };
                run_queue(db, &cfg, &queue, mode).await?;
            }
            CliCommand::Pause { queue } => run_pause(&db, &queue).await?,
            CliCommand::Skip { queue } => run_decision(&db, &queue, Decision::Skip).await?,
            CliCommand::Replace { queue, payload } => {
                run_decision(&db, &queue, Decision::Replace { payload }).await?
            }
            CliCommand::Status { queue } => run_status(&db, queue.as_deref()).await?,
            CliCommand::Remove { queue } => run_remove(&db, &queue).await?,
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
