//! `QueueStore` implementation for the SQLite database.

use anyhow::Result;
use async_trait::async_trait;

use crate::ledger::ProgressLedger;
use crate::store::QueueStore;

use super::db::QueueDb;
use super::types::{ItemId, ItemStatus, QueueId, QueueItem, QueueStatus};

#[async_trait]
impl QueueStore for QueueDb {
    async fn items(&self, queue: QueueId) -> Result<Vec<QueueItem>> {
        self.list_items(queue).await
    }

    async fn set_item_status(&self, item: ItemId, status: ItemStatus) -> Result<()> {
        QueueDb::set_item_status(self, item, status).await
    }

    async fn record_upload(&self, item: ItemId, remote_handle: &str) -> Result<()> {
        QueueDb::record_upload(self, item, remote_handle).await
    }

    async fn record_failure(&self, item: ItemId, error: &str) -> Result<()> {
        QueueDb::record_failure(self, item, error).await
    }

    async fn replace_payload(&self, item: ItemId, payload: &str) -> Result<()> {
        QueueDb::replace_payload(self, item, payload).await
    }

    async fn set_queue_status(&self, queue: QueueId, status: QueueStatus) -> Result<()> {
        QueueDb::set_queue_status(self, queue, status).await
    }

    async fn load_ledger(&self, queue: QueueId) -> Result<ProgressLedger> {
        QueueDb::load_ledger(self, queue).await
    }

    async fn save_ledger(&self, queue: QueueId, ledger: &ProgressLedger) -> Result<()> {
        QueueDb::save_ledger(self, queue, ledger).await
    }
}
