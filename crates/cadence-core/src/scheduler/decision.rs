//! User decisions at a halted item: skip it or give it a new payload.

use anyhow::{bail, Result};

use crate::queue_db::{QueueId, QueueStatus};
use crate::store::QueueStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Abandon the item; the next resume starts at the following index.
    Skip,
    /// Swap the payload and retry the same index from upload.
    Replace { payload: String },
}

/// Apply `decision` to the item a halted run stopped at.
///
/// Only the intent is recorded; the queue stays paused until resumed. Returns
/// the index the next resume will start at.
pub async fn apply_decision(
    store: &dyn QueueStore,
    queue: QueueId,
    decision: Decision,
) -> Result<usize> {
    let mut ledger = store.load_ledger(queue).await?;
    let Some(index) = ledger.resume_index else {
        bail!("queue {queue} is not stopped at an item");
    };
    let items = store.items(queue).await?;
    let Some(item) = items.get(index) else {
        bail!("queue {queue} has no item at index {index}");
    };
    if item.is_completed() {
        bail!("item {} is already completed", index + 1);
    }

    let next = match decision {
        Decision::Skip => {
            let reason = match &item.last_error {
                Some(e) => format!("skipped: {e}"),
                None => "skipped".to_string(),
            };
            store.record_failure(item.id, &reason).await?;
            if ledger.current_index == index {
                ledger.current_index = index + 1;
            }
            tracing::info!(queue, item = index + 1, "item skipped");
            index + 1
        }
        Decision::Replace { payload } => {
            store.replace_payload(item.id, &payload).await?;
            tracing::info!(queue, item = index + 1, "item payload replaced");
            index
        }
    };

    ledger.resume_index = Some(next);
    ledger.is_paused = true;
    ledger.hold = None;
    store.save_ledger(queue, &ledger).await?;
    store.set_queue_status(queue, QueueStatus::Paused).await?;
    Ok(next)
}
