//! Queue and item write operations: create, enqueue, status, ledger, remove.

use anyhow::{Context, Result};
use sqlx::Row;

use super::super::db::{unix_timestamp, QueueDb};
use super::super::types::{ItemId, ItemStatus, QueueId, QueueStatus};
use crate::ledger::ProgressLedger;

impl QueueDb {
    /// Create a new, empty queue. Fails if the name is taken.
    pub async fn create_queue(&self, name: &str) -> Result<QueueId> {
        let now = unix_timestamp();
        let id = sqlx::query(
            r#"
            INSERT INTO queues (name, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(name)
        .bind(QueueStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .with_context(|| format!("create queue {name:?}"))?
        .last_insert_rowid();
        Ok(id)
    }

    /// Return the id of the queue named `name`, creating it if needed.
    pub async fn ensure_queue(&self, name: &str) -> Result<QueueId> {
        match self.find_queue(name).await? {
            Some(id) => Ok(id),
            None => self.create_queue(name).await,
        }
    }

    /// Append a pending item at the end of the queue.
    pub async fn add_item(&self, queue_id: QueueId, payload: &str) -> Result<ItemId> {
        let now = unix_timestamp();
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            r#"SELECT COALESCE(MAX(position), -1) AS last FROM items WHERE queue_id = ?1"#,
        )
        .bind(queue_id)
        .fetch_one(&mut *tx)
        .await?;
        let position: i64 = row.get::<i64, _>("last") + 1;
        let id = sqlx::query(
            r#"
            INSERT INTO items (
                queue_id, position, payload, remote_handle, status, last_error,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, NULL, ?4, NULL, ?5, ?6)
            "#,
        )
        .bind(queue_id)
        .bind(position)
        .bind(payload)
        .bind(ItemStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();
        tx.commit().await?;
        Ok(id)
    }

    /// Update only the status of an item.
    pub async fn set_item_status(&self, id: ItemId, status: ItemStatus) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            UPDATE items
            SET status = ?1,
                updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(status.as_str())
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Persist the handle returned by a successful upload (status `uploaded`).
    /// From here on a restart resumes at the archive step.
    pub async fn record_upload(&self, id: ItemId, remote_handle: &str) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            UPDATE items
            SET remote_handle = ?1,
                status = ?2,
                last_error = NULL,
                updated_at = ?3
            WHERE id = ?4
            "#,
        )
        .bind(remote_handle)
        .bind(ItemStatus::Uploaded.as_str())
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Mark an item failed with a human-readable reason. The handle is kept.
    pub async fn record_failure(&self, id: ItemId, error: &str) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            UPDATE items
            SET status = ?1,
                last_error = ?2,
                updated_at = ?3
            WHERE id = ?4
            "#,
        )
        .bind(ItemStatus::Failed.as_str())
        .bind(error)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Swap an item's payload and reset it to `pending` (handle and error cleared).
    pub async fn replace_payload(&self, id: ItemId, payload: &str) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            UPDATE items
            SET payload = ?1,
                remote_handle = NULL,
                last_error = NULL,
                status = ?2,
                updated_at = ?3
            WHERE id = ?4
            "#,
        )
        .bind(payload)
        .bind(ItemStatus::Pending.as_str())
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Update the aggregate status of a queue.
    pub async fn set_queue_status(&self, id: QueueId, status: QueueStatus) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            UPDATE queues
            SET status = ?1,
                updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(status.as_str())
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Persist the progress ledger (`total` is derived from the items, not stored).
    pub async fn save_ledger(&self, id: QueueId, ledger: &ProgressLedger) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            UPDATE queues
            SET current_index = ?1,
                resume_index = ?2,
                consecutive_auto_retries = ?3,
                is_paused = ?4,
                hold_kind = ?5,
                hold_remaining_secs = ?6,
                updated_at = ?7
            WHERE id = ?8
            "#,
        )
        .bind(ledger.current_index as i64)
        .bind(ledger.resume_index.map(|i| i as i64))
        .bind(i64::from(ledger.consecutive_auto_retries))
        .bind(ledger.is_paused)
        .bind(ledger.hold.map(|h| h.kind.as_str()))
        .bind(ledger.hold.map(|h| h.remaining_secs as i64))
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Set or clear only the paused flag (used by `cadence pause` / `resume`).
    pub async fn set_paused(&self, id: QueueId, paused: bool) -> Result<()> {
        let now = unix_timestamp();
        sqlx::query(
            r#"
            UPDATE queues
            SET is_paused = ?1,
                updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(paused)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Normalize any queue left in `uploading` to `paused` (e.g. after a crash).
    /// The ledger already points at the first uncommitted item, so nothing else changes.
    /// Returns the number of queues reset.
    pub async fn recover_uploading_queues(&self) -> Result<u64> {
        let now = unix_timestamp();
        let r = sqlx::query(
            r#"
            UPDATE queues
            SET status = 'paused',
                updated_at = ?1
            WHERE status = 'uploading'
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(r.rows_affected())
    }

    /// Permanently remove a queue and all of its items.
    pub async fn remove_queue(&self, id: QueueId) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(r#"DELETE FROM items WHERE queue_id = ?1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(r#"DELETE FROM queues WHERE id = ?1"#)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
