//! Upload orchestration.
//!
//! Walks a queue in order: upload, a short human-like delay, archive, then a
//! longer paced wait before the next item. Failures are classified and turned
//! into retry waits, network waits, escalation or lockout countdowns, or a halt
//! that needs a person. Every stop persists the progress ledger so a later
//! resume continues at exactly the right item.

mod attempt;
mod decision;
mod phase;
mod run;
mod waits;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc::UnboundedSender;

use crate::config::{CadenceConfig, NetworkConfig, PacingConfig};
use crate::control::PauseFlag;
use crate::cooldown::GlobalCooldown;
use crate::queue_db::QueueId;
use crate::remote::RemoteService;
use crate::retry::RetryPolicy;
use crate::store::QueueStore;

pub use decision::{apply_decision, Decision};
pub use phase::{PauseCause, Phase, RunOutcome};

use run::QueueRun;

/// Drives queue runs against one remote account.
///
/// One `Orchestrator` runs one queue at a time; several orchestrators may share
/// a [`GlobalCooldown`] by cloning it.
pub struct Orchestrator {
    store: Arc<dyn QueueStore>,
    remote: Arc<dyn RemoteService>,
    cooldown: GlobalCooldown,
    policy: RetryPolicy,
    pacing: PacingConfig,
    network: NetworkConfig,
    pause: PauseFlag,
    observer: Option<UnboundedSender<Phase>>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn QueueStore>,
        remote: Arc<dyn RemoteService>,
        cooldown: GlobalCooldown,
        cfg: &CadenceConfig,
    ) -> Self {
        let retry = cfg.retry.clone().unwrap_or_default();
        Self {
            store,
            remote,
            cooldown,
            policy: RetryPolicy::from_config(cfg.max_attempts, &retry),
            pacing: cfg.pacing.clone(),
            network: cfg.network.clone(),
            pause: PauseFlag::new(),
            observer: None,
        }
    }

    /// Use an externally owned pause token (e.g. one from `RunControl::register`).
    pub fn with_pause_flag(mut self, pause: PauseFlag) -> Self {
        self.pause = pause;
        self
    }

    /// Send every phase change to `tx`. Dropped receivers are ignored.
    pub fn with_phase_observer(mut self, tx: UnboundedSender<Phase>) -> Self {
        self.observer = Some(tx);
        self
    }

    pub fn pause_flag(&self) -> &PauseFlag {
        &self.pause
    }

    /// Run a queue from its saved position.
    ///
    /// A queue whose ledger says it is paused stays paused; use [`Self::resume`].
    pub async fn run(&self, queue: QueueId) -> Result<RunOutcome> {
        let ledger = self
            .store
            .load_ledger(queue)
            .await
            .with_context(|| format!("load ledger for queue {queue}"))?;
        let items = self.store.items(queue).await?;
        QueueRun::new(self, queue, ledger, items).execute().await
    }

    /// Clear the pause state and continue from the saved resume index.
    pub async fn resume(&self, queue: QueueId) -> Result<RunOutcome> {
        self.pause.clear();
        let mut ledger = self.store.load_ledger(queue).await?;
        ledger.is_paused = false;
        self.store.save_ledger(queue, &ledger).await?;
        self.run(queue).await
    }

    /// Like [`Self::resume`], but continue at `index` (0-based). Items below it
    /// are not touched by this run.
    pub async fn resume_from(&self, queue: QueueId, index: usize) -> Result<RunOutcome> {
        let total = self.store.items(queue).await?.len();
        if index >= total {
            anyhow::bail!("resume index {index} is out of range (queue has {total} items)");
        }
        self.pause.clear();
        let mut ledger = self.store.load_ledger(queue).await?;
        ledger.is_paused = false;
        ledger.resume_index = Some(index);
        self.store.save_ledger(queue, &ledger).await?;
        self.run(queue).await
    }

    fn emit(&self, phase: Phase) {
        if phase.is_tick() {
            tracing::trace!(%phase, "phase");
        } else {
            tracing::debug!(%phase, "phase");
        }
        if let Some(tx) = &self.observer {
            let _ = tx.send(phase);
        }
    }
}
