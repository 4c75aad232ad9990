//! Waiting states: lockout/escalation holds, network recovery, and the paced
//! gap between items.

use std::time::Duration;

use anyhow::Result;

use super::phase::{PauseCause, Phase, RunOutcome};
use super::run::QueueRun;
use crate::delay::{countdown, random_secs, SleepOutcome};
use crate::ledger::{Hold, HoldKind};
use crate::queue_db::QueueStatus;

fn hold_phase(kind: HoldKind, remaining: u64) -> Phase {
    match kind {
        HoldKind::Lockout => Phase::LockedOut { remaining },
        HoldKind::Escalation => Phase::EscalatedPause { remaining },
    }
}

impl QueueRun<'_> {
    /// Run a fixed lockout or escalation countdown before item `index`.
    ///
    /// The hold is persisted first so a pause (or a crash) leaves the remaining
    /// seconds in the ledger; `None` means the countdown reached zero.
    pub(super) async fn hold(
        &mut self,
        kind: HoldKind,
        secs: u64,
        index: usize,
    ) -> Result<Option<RunOutcome>> {
        let orch = self.orch;
        self.ledger.hold = Some(Hold {
            kind,
            remaining_secs: secs,
        });
        self.ledger.stop_at(index);
        self.save().await?;
        self.store()
            .set_queue_status(self.queue, QueueStatus::Paused)
            .await?;
        tracing::warn!(queue = self.queue, kind = kind.as_str(), secs, "hold started");

        let outcome = countdown(secs, &orch.pause, |remaining| {
            orch.emit(hold_phase(kind, remaining))
        })
        .await;
        match outcome {
            SleepOutcome::Elapsed => {
                self.ledger.hold = None;
                self.save().await?;
                Ok(None)
            }
            SleepOutcome::Interrupted { remaining_secs } => {
                self.ledger.hold = Some(Hold {
                    kind,
                    remaining_secs,
                });
                self.pause_at(index, PauseCause::Requested).await.map(Some)
            }
        }
    }

    /// A hold left over from an earlier run must reach zero before any remote
    /// call. Once it does, the run continues without another pause.
    pub(super) async fn finish_hold(&mut self, index: usize) -> Result<Option<RunOutcome>> {
        let Some(hold) = self.ledger.hold else {
            return Ok(None);
        };
        tracing::info!(
            queue = self.queue,
            kind = hold.kind.as_str(),
            secs = hold.remaining_secs,
            "finishing interrupted hold"
        );
        self.hold(hold.kind, hold.remaining_secs, index).await
    }

    /// Poll the network probe until it succeeds or the ceiling passes, then
    /// let the connection settle. `None` means go ahead and retry.
    pub(super) async fn wait_for_network(
        &mut self,
        index: usize,
        attempt: u32,
    ) -> Result<Option<RunOutcome>> {
        let orch = self.orch;
        let net = &orch.network;
        orch.emit(Phase::WaitingNetwork { attempt });

        let poll = net.poll_interval_secs.max(1);
        let deadline = tokio::time::Instant::now() + Duration::from_secs(net.ceiling_secs);
        loop {
            if orch.pause.is_requested() {
                return self.pause_at(index, PauseCause::Requested).await.map(Some);
            }
            match orch.remote.probe_network().await {
                Ok(()) => break,
                Err(e) => tracing::debug!(queue = self.queue, error = %e, "network still unstable"),
            }
            if tokio::time::Instant::now() >= deadline {
                tracing::warn!(
                    queue = self.queue,
                    ceiling = net.ceiling_secs,
                    "network did not recover before the ceiling; retrying anyway"
                );
                break;
            }
            if countdown(poll, &orch.pause, |_| {}).await.is_interrupted() {
                return self.pause_at(index, PauseCause::Requested).await.map(Some);
            }
        }

        if countdown(net.settle_secs, &orch.pause, |_| {})
            .await
            .is_interrupted()
        {
            return self.pause_at(index, PauseCause::Requested).await.map(Some);
        }
        Ok(None)
    }

    /// Paced wait before item `next`. Prefers an active account cooldown plus
    /// jitter over the fallback window.
    pub(super) async fn wait_next_item(&mut self, next: usize) -> Result<Option<RunOutcome>> {
        let orch = self.orch;
        let pacing = &orch.pacing;
        let status = orch.cooldown.refresh(orch.remote.as_ref()).await;
        let secs = if status.active {
            status.remaining_secs.saturating_add(random_secs(
                pacing.cooldown_jitter_min_secs,
                pacing.cooldown_jitter_max_secs,
            ))
        } else {
            random_secs(pacing.inter_item_min_secs, pacing.inter_item_max_secs)
        };
        tracing::debug!(queue = self.queue, next = next + 1, secs, "waiting before next item");

        let outcome = countdown(secs, &orch.pause, |remaining| {
            orch.emit(Phase::WaitingNextItem {
                next: next + 1,
                remaining,
            })
        })
        .await;
        if outcome.is_interrupted() {
            return self.pause_at(next, PauseCause::Requested).await.map(Some);
        }
        Ok(None)
    }
}
