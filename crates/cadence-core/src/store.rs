//! Queue-owning collaborator seam.
//!
//! The orchestrator reads items and writes every status, handle, error, and
//! ledger change through [`QueueStore`]. [`QueueDb`](crate::queue_db::QueueDb)
//! is the SQLite implementation.

use anyhow::Result;
use async_trait::async_trait;

use crate::ledger::ProgressLedger;
use crate::queue_db::{ItemId, ItemStatus, QueueId, QueueItem, QueueStatus};

#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Items in stable processing order.
    async fn items(&self, queue: QueueId) -> Result<Vec<QueueItem>>;

    async fn set_item_status(&self, item: ItemId, status: ItemStatus) -> Result<()>;

    /// Store the upload handle; the item becomes `uploaded`.
    async fn record_upload(&self, item: ItemId, remote_handle: &str) -> Result<()>;

    /// The item becomes `failed` with `error` as its last error.
    async fn record_failure(&self, item: ItemId, error: &str) -> Result<()>;

    /// New payload, back to `pending` with no handle.
    async fn replace_payload(&self, item: ItemId, payload: &str) -> Result<()>;

    async fn set_queue_status(&self, queue: QueueId, status: QueueStatus) -> Result<()>;

    async fn load_ledger(&self, queue: QueueId) -> Result<ProgressLedger>;

    async fn save_ledger(&self, queue: QueueId, ledger: &ProgressLedger) -> Result<()>;
}
