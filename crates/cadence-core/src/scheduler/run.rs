//! One pass over a queue: preconditions, the item loop, and every way it stops.

use anyhow::Result;

use super::phase::{PauseCause, Phase, RunOutcome};
use super::Orchestrator;
use crate::delay::{countdown, SleepOutcome};
use crate::ledger::ProgressLedger;
use crate::queue_db::{QueueId, QueueItem, QueueStatus};
use crate::store::QueueStore;

/// Per-run state. The ledger is owned here for the duration of the run and
/// written back through the store at every checkpoint that changes it.
pub(super) struct QueueRun<'a> {
    pub(super) orch: &'a Orchestrator,
    pub(super) queue: QueueId,
    pub(super) ledger: ProgressLedger,
    pub(super) items: Vec<QueueItem>,
}

impl<'a> QueueRun<'a> {
    pub(super) fn new(
        orch: &'a Orchestrator,
        queue: QueueId,
        mut ledger: ProgressLedger,
        items: Vec<QueueItem>,
    ) -> Self {
        ledger.total = items.len();
        Self {
            orch,
            queue,
            ledger,
            items,
        }
    }

    pub(super) fn store(&self) -> &'a dyn QueueStore {
        self.orch.store.as_ref()
    }

    pub(super) async fn save(&self) -> Result<()> {
        self.store().save_ledger(self.queue, &self.ledger).await
    }

    pub(super) async fn execute(mut self) -> Result<RunOutcome> {
        self.orch.emit(Phase::Idle);
        let start = self.ledger.start_index();
        tracing::info!(
            queue = self.queue,
            start,
            total = self.ledger.total,
            "queue run starting"
        );

        if self.ledger.is_paused || self.orch.pause.is_requested() {
            return self.pause_at(start, PauseCause::Requested).await;
        }
        if let Some(outcome) = self.check_lockout(start).await? {
            return Ok(outcome);
        }
        if let Some(outcome) = self.finish_hold(start).await? {
            return Ok(outcome);
        }
        if let Some(outcome) = self.wait_initial_cooldown(start).await? {
            return Ok(outcome);
        }

        self.ledger.resume_index = None;
        self.ledger.is_paused = false;
        self.save().await?;
        self.store()
            .set_queue_status(self.queue, QueueStatus::Uploading)
            .await?;

        let mut index = start;
        while index < self.items.len() {
            if self.items[index].is_completed() {
                if self.ledger.current_index == index {
                    self.ledger.current_index = index + 1;
                }
                index += 1;
                continue;
            }
            if self.orch.pause.is_requested() {
                return self.pause_at(index, PauseCause::Requested).await;
            }
            if let Some(outcome) = self.check_lockout(index).await? {
                return Ok(outcome);
            }
            if let Some(outcome) = self.process_item(index).await? {
                return Ok(outcome);
            }

            let Some(next) = self.next_pending(index + 1) else {
                break;
            };
            if let Some(outcome) = self.wait_next_item(next).await? {
                return Ok(outcome);
            }
            index = next;
        }

        self.complete().await
    }

    /// First index at or after `from` that still needs work.
    fn next_pending(&self, from: usize) -> Option<usize> {
        (from..self.items.len()).find(|&i| !self.items[i].is_completed())
    }

    /// The remote's own bot-detection flag. Stops without advancing.
    async fn check_lockout(&mut self, index: usize) -> Result<Option<RunOutcome>> {
        if !self.orch.remote.is_account_locked_out().await {
            return Ok(None);
        }
        tracing::warn!(queue = self.queue, index, "account is locked out; not starting work");
        self.pause_at(index, PauseCause::AccountLocked)
            .await
            .map(Some)
    }

    /// Wait out a cooldown that is already active before the first attempt.
    async fn wait_initial_cooldown(&mut self, index: usize) -> Result<Option<RunOutcome>> {
        let orch = self.orch;
        let status = orch.cooldown.refresh(orch.remote.as_ref()).await;
        if !status.active {
            return Ok(None);
        }
        tracing::info!(
            queue = self.queue,
            secs = status.remaining_secs,
            "account cooldown active, waiting before first upload"
        );
        let outcome = countdown(status.remaining_secs, &orch.pause, |remaining| {
            orch.emit(Phase::Cooldown { remaining })
        })
        .await;
        match outcome {
            SleepOutcome::Elapsed => Ok(None),
            SleepOutcome::Interrupted { .. } => self
                .pause_at(index, PauseCause::Requested)
                .await
                .map(Some),
        }
    }

    async fn complete(&mut self) -> Result<RunOutcome> {
        self.ledger.current_index = self.ledger.total;
        self.ledger.resume_index = None;
        self.ledger.is_paused = false;
        self.ledger.hold = None;
        self.save().await?;
        self.store()
            .set_queue_status(self.queue, QueueStatus::Completed)
            .await?;
        self.orch.emit(Phase::Completed);
        tracing::info!(queue = self.queue, total = self.ledger.total, "queue completed");
        Ok(RunOutcome::Completed)
    }

    /// Persist an early stop before item `index` and set the queue's status.
    pub(super) async fn halt(&mut self, index: usize, status: QueueStatus) -> Result<()> {
        self.ledger.stop_at(index);
        self.ledger.is_paused = true;
        self.save().await?;
        self.store().set_queue_status(self.queue, status).await
    }

    pub(super) async fn pause_at(&mut self, index: usize, cause: PauseCause) -> Result<RunOutcome> {
        self.halt(index, QueueStatus::Paused).await?;
        self.orch.emit(Phase::Paused);
        tracing::info!(queue = self.queue, resume_index = index, ?cause, "queue paused");
        Ok(RunOutcome::Paused {
            resume_index: index,
            cause,
        })
    }
}
