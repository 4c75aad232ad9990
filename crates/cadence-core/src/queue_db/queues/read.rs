//! Queue and item read operations: lookup, list, ledger.

use anyhow::{anyhow, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::super::db::QueueDb;
use super::super::types::{ItemStatus, QueueId, QueueItem, QueueStatus, QueueSummary};
use crate::ledger::{Hold, HoldKind, ProgressLedger};

fn ledger_from_row(row: &SqliteRow, total: usize) -> ProgressLedger {
    let resume_index: Option<i64> = row.get("resume_index");
    let hold_kind: Option<String> = row.get("hold_kind");
    let hold_remaining: Option<i64> = row.get("hold_remaining_secs");
    let hold = match (hold_kind.as_deref().and_then(HoldKind::from_str), hold_remaining) {
        (Some(kind), Some(secs)) => Some(Hold {
            kind,
            remaining_secs: secs.max(0) as u64,
        }),
        _ => None,
    };
    ProgressLedger {
        current_index: row.get::<i64, _>("current_index").max(0) as usize,
        total,
        consecutive_auto_retries: row.get::<i64, _>("consecutive_auto_retries").max(0) as u32,
        resume_index: resume_index.map(|i| i.max(0) as usize),
        is_paused: row.get("is_paused"),
        hold,
    }
}

impl QueueDb {
    /// Look up a queue id by name.
    pub async fn find_queue(&self, name: &str) -> Result<Option<QueueId>> {
        let row = sqlx::query(r#"SELECT id FROM queues WHERE name = ?1"#)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("id")))
    }

    /// List all queues with their ledgers, oldest first.
    pub async fn list_queues(&self) -> Result<Vec<QueueSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT q.id, q.name, q.status, q.current_index, q.resume_index,
                   q.consecutive_auto_retries, q.is_paused, q.hold_kind,
                   q.hold_remaining_secs,
                   (SELECT COUNT(*) FROM items i WHERE i.queue_id = q.id) AS total,
                   (SELECT COUNT(*) FROM items i
                     WHERE i.queue_id = q.id AND i.status = 'completed') AS completed
            FROM queues q
            ORDER BY q.created_at ASC, q.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let total = row.get::<i64, _>("total").max(0) as usize;
            let status: String = row.get("status");
            out.push(QueueSummary {
                id: row.get("id"),
                name: row.get("name"),
                status: QueueStatus::from_str(&status),
                completed: row.get::<i64, _>("completed").max(0) as usize,
                ledger: ledger_from_row(&row, total),
            });
        }
        Ok(out)
    }

    /// Items of a queue in stable (position) order.
    pub async fn list_items(&self, queue_id: QueueId) -> Result<Vec<QueueItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, queue_id, position, payload, remote_handle, status, last_error
            FROM items
            WHERE queue_id = ?1
            ORDER BY position ASC, id ASC
            "#,
        )
        .bind(queue_id)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let status: String = row.get("status");
            out.push(QueueItem {
                id: row.get("id"),
                queue_id: row.get("queue_id"),
                position: row.get("position"),
                payload: row.get("payload"),
                remote_handle: row.get("remote_handle"),
                status: ItemStatus::from_str(&status),
                last_error: row.get("last_error"),
            });
        }
        Ok(out)
    }

    /// Load the progress ledger of a queue; `total` is the current item count.
    pub async fn load_ledger(&self, queue_id: QueueId) -> Result<ProgressLedger> {
        let row = sqlx::query(
            r#"
            SELECT current_index, resume_index, consecutive_auto_retries, is_paused,
                   hold_kind, hold_remaining_secs,
                   (SELECT COUNT(*) FROM items WHERE queue_id = ?1) AS total
            FROM queues
            WHERE id = ?1
            "#,
        )
        .bind(queue_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| anyhow!("queue {queue_id} not found"))?;
        let total = row.get::<i64, _>("total").max(0) as usize;
        Ok(ledger_from_row(&row, total))
    }

    /// Aggregate status of a queue, if it exists.
    pub async fn queue_status(&self, queue_id: QueueId) -> Result<Option<QueueStatus>> {
        let row = sqlx::query(r#"SELECT status FROM queues WHERE id = ?1"#)
            .bind(queue_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| QueueStatus::from_str(&r.get::<String, _>("status"))))
    }
}
