//! Processing a single item: attempts, failure classification, and the
//! branch each retry decision takes.

use anyhow::Result;

use super::phase::{PauseCause, Phase, RunOutcome};
use super::run::QueueRun;
use crate::delay::{countdown, random_secs};
use crate::ledger::HoldKind;
use crate::queue_db::{ItemStatus, QueueStatus};
use crate::retry::{
    classify, parse_wait_secs, ErrorKind, HaltReason, RemoteError, RetryDecision, ESCALATION_SECS,
    LOCKOUT_SECS,
};

/// Result of one upload+archive attempt.
enum Attempt {
    Archived,
    /// Pause was requested during the pre-archive delay.
    Interrupted,
    Failed(RemoteError),
}

impl QueueRun<'_> {
    /// Drive item `index` until it is archived (`None`) or the run stops.
    pub(super) async fn process_item(&mut self, index: usize) -> Result<Option<RunOutcome>> {
        let mut attempt: u32 = 1;
        loop {
            if self.orch.pause.is_requested() {
                return self.pause_at(index, PauseCause::Requested).await.map(Some);
            }
            match self.attempt_once(index).await? {
                Attempt::Archived => return Ok(None),
                Attempt::Interrupted => {
                    return self.pause_at(index, PauseCause::Requested).await.map(Some)
                }
                Attempt::Failed(err) => {
                    if let Some(outcome) = self.handle_failure(index, attempt, err).await? {
                        return Ok(Some(outcome));
                    }
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt_once(&mut self, index: usize) -> Result<Attempt> {
        let orch = self.orch;
        let item_no = index + 1;
        let id = self.items[index].id;

        let handle = match self.items[index].remote_handle.clone() {
            Some(handle) => {
                tracing::debug!(queue = self.queue, item = item_no, "already uploaded, archiving only");
                handle
            }
            None => {
                orch.emit(Phase::Uploading { item: item_no });
                self.store().set_item_status(id, ItemStatus::Uploading).await?;
                let payload = self.items[index].payload.clone();
                match orch.remote.upload(&payload).await {
                    Ok(handle) => {
                        self.store().record_upload(id, &handle).await?;
                        let item = &mut self.items[index];
                        item.remote_handle = Some(handle.clone());
                        item.status = ItemStatus::Uploaded;
                        item.last_error = None;
                        handle
                    }
                    Err(e) => return Ok(Attempt::Failed(e)),
                }
            }
        };

        let delay = random_secs(
            orch.pacing.pre_archive_min_secs,
            orch.pacing.pre_archive_max_secs,
        );
        if countdown(delay, &orch.pause, |_| {}).await.is_interrupted() {
            return Ok(Attempt::Interrupted);
        }

        orch.emit(Phase::Archiving { item: item_no });
        self.store().set_item_status(id, ItemStatus::Archiving).await?;
        match orch.remote.archive(&handle).await {
            Ok(true) => {
                self.store().set_item_status(id, ItemStatus::Completed).await?;
                self.items[index].status = ItemStatus::Completed;
                self.ledger.record_archived(index);
                self.save().await?;
                tracing::info!(queue = self.queue, item = item_no, "item archived");
                Ok(Attempt::Archived)
            }
            Ok(false) => Ok(Attempt::Failed(RemoteError::new(
                "archive was declined by the remote",
            ))),
            Err(e) => Ok(Attempt::Failed(e)),
        }
    }

    /// Record the failure, ask the policy, and act on its decision. `None`
    /// means retry the same item.
    async fn handle_failure(
        &mut self,
        index: usize,
        attempt: u32,
        err: RemoteError,
    ) -> Result<Option<RunOutcome>> {
        let orch = self.orch;
        let kind = classify(&err);
        let declared = match kind {
            ErrorKind::CooldownActive => parse_wait_secs(&err.message),
            _ => None,
        };
        let decision = orch.policy.decide(
            kind,
            attempt,
            self.ledger.consecutive_auto_retries,
            declared,
        );
        tracing::warn!(
            queue = self.queue,
            item = index + 1,
            attempt,
            consecutive = self.ledger.consecutive_auto_retries,
            ?kind,
            ?decision,
            error = %err,
            "attempt failed"
        );

        let id = self.items[index].id;
        self.store().record_failure(id, &err.message).await?;
        let item = &mut self.items[index];
        item.status = ItemStatus::Failed;
        item.last_error = Some(err.message.clone());

        if kind == ErrorKind::CooldownActive {
            orch.cooldown
                .extend(declared.unwrap_or(orch.policy.cooldown_floor_secs));
        }

        match decision {
            RetryDecision::Halt(HaltReason::SessionExpired) => {
                self.halt(index, QueueStatus::Error).await?;
                orch.emit(Phase::SessionExpired);
                Ok(Some(RunOutcome::SessionExpired {
                    resume_index: index,
                }))
            }
            RetryDecision::Halt(HaltReason::LockedOut) => {
                if let Some(outcome) = self.hold(HoldKind::Lockout, LOCKOUT_SECS, index).await? {
                    return Ok(Some(outcome));
                }
                self.pause_at(index, PauseCause::Lockout).await.map(Some)
            }
            RetryDecision::Halt(HaltReason::ItemRejected) => {
                self.halt(index, QueueStatus::Error).await?;
                orch.emit(Phase::ItemRejected { item: index + 1 });
                Ok(Some(RunOutcome::ItemRejected {
                    index,
                    reason: err.message,
                }))
            }
            RetryDecision::RetryAfter(secs) => {
                let outcome = countdown(secs, &orch.pause, |remaining| {
                    orch.emit(Phase::AutoRetrying { remaining, attempt })
                })
                .await;
                if outcome.is_interrupted() {
                    return self.pause_at(index, PauseCause::Requested).await.map(Some);
                }
                self.ledger.record_auto_retry();
                self.save().await?;
                Ok(None)
            }
            RetryDecision::RetryWhenNetworkRecovers => {
                if let Some(outcome) = self.wait_for_network(index, attempt).await? {
                    return Ok(Some(outcome));
                }
                self.ledger.record_auto_retry();
                self.save().await?;
                Ok(None)
            }
            RetryDecision::Escalate => {
                if let Some(outcome) = self
                    .hold(HoldKind::Escalation, ESCALATION_SECS, index)
                    .await?
                {
                    return Ok(Some(outcome));
                }
                self.pause_at(index, PauseCause::Escalation).await.map(Some)
            }
        }
    }
}
