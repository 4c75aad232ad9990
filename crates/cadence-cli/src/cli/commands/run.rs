//! `cadence run` / `cadence resume` – drive one queue against the configured remote.

use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use cadence_core::config::{self, CadenceConfig};
use cadence_core::control::RunControl;
use cadence_core::cooldown::GlobalCooldown;
use cadence_core::queue_db::QueueDb;
use cadence_core::remote::CommandRemote;
use cadence_core::scheduler::{Orchestrator, PauseCause, Phase, RunOutcome};
use tokio::sync::mpsc::UnboundedReceiver;

use super::queue_id;
use crate::cli::control_socket;

/// Where the run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Saved position; a paused queue stays paused.
    Run,
    /// Clear the pause and continue from the saved position.
    Resume,
    /// Clear the pause and continue at this 0-based index.
    ResumeFrom(usize),
}

pub async fn run_queue(
    db: Arc<QueueDb>,
    cfg: &CadenceConfig,
    queue: &str,
    mode: RunMode,
) -> Result<()> {
    let id = queue_id(&db, queue).await?;
    let remote_cfg = cfg.remote.clone().ok_or_else(|| {
        let path = config::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "config.toml".to_string());
        anyhow!("no [remote] upload/archive commands configured in {path}")
    })?;

    let recovered = db.recover_uploading_queues().await?;
    if recovered > 0 {
        tracing::info!("recovered {} queue(s) from a previous run", recovered);
    }

    let control = Arc::new(RunControl::new());
    let pause = control.register(id);
    if let Ok(socket_path) = cadence_core::control::default_control_socket_path() {
        match control_socket::spawn_control_listener(Arc::clone(&control), &socket_path) {
            Ok(_) => tracing::debug!(path = %socket_path.display(), "control socket listening"),
            Err(e) => tracing::warn!(path = %socket_path.display(), "control socket bind: {}", e),
        }
    }

    let (phase_tx, phase_rx) = tokio::sync::mpsc::unbounded_channel();
    let printer = tokio::spawn(print_phases(phase_rx));

    let orch = Orchestrator::new(
        db.clone(),
        Arc::new(CommandRemote::new(remote_cfg)),
        GlobalCooldown::new(),
        cfg,
    )
    .with_pause_flag(pause)
    .with_phase_observer(phase_tx);

    let result = match mode {
        RunMode::Run => orch.run(id).await,
        RunMode::Resume => orch.resume(id).await,
        RunMode::ResumeFrom(index) => orch.resume_from(id, index).await,
    };
    control.unregister(id);
    drop(orch);
    let _ = printer.await;

    report(queue, &result?);
    Ok(())
}

/// Print phase changes; countdown ticks overwrite one line.
async fn print_phases(mut rx: UnboundedReceiver<Phase>) {
    let mut on_tick_line = false;
    while let Some(phase) = rx.recv().await {
        if phase.is_tick() {
            print!("\r  {phase}    ");
            let _ = std::io::stdout().flush();
            on_tick_line = true;
        } else {
            if on_tick_line {
                println!();
                on_tick_line = false;
            }
            println!("  {phase}");
        }
    }
    if on_tick_line {
        println!();
    }
}

fn report(queue: &str, outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Completed => println!("Queue {queue} completed."),
        RunOutcome::Paused {
            resume_index,
            cause,
        } => {
            let why = match cause {
                PauseCause::Requested => "paused",
                PauseCause::Lockout => "paused after account lockout; check the account",
                PauseCause::Escalation => "paused after repeated failures; check the account",
                PauseCause::AccountLocked => "not started: account is locked out",
            };
            println!(
                "Queue {queue} {why}. `cadence resume {queue}` continues at item {}.",
                resume_index + 1
            );
        }
        RunOutcome::SessionExpired { resume_index } => println!(
            "Session expired at item {}. Sign in again, then `cadence resume {queue}`.",
            resume_index + 1
        ),
        RunOutcome::ItemRejected { index, reason } => println!(
            "Item {} was rejected ({reason}). Use `cadence skip {queue}` or `cadence replace {queue} <payload>`, then resume.",
            index + 1
        ),
    }
}
