//! Types used by the queue database.

use serde::Serialize;

use crate::ledger::ProgressLedger;

/// Queue identifier.
pub type QueueId = i64;

/// Item identifier.
pub type ItemId = i64;

/// Per-item status stored as a string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Pending,
    Uploading,
    Uploaded,
    Archiving,
    Completed,
    Failed,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Uploading => "uploading",
            ItemStatus::Uploaded => "uploaded",
            ItemStatus::Archiving => "archiving",
            ItemStatus::Completed => "completed",
            ItemStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "pending" => ItemStatus::Pending,
            "uploading" => ItemStatus::Uploading,
            "uploaded" => ItemStatus::Uploaded,
            "archiving" => ItemStatus::Archiving,
            "completed" => ItemStatus::Completed,
            _ => ItemStatus::Failed,
        }
    }
}

/// Aggregate queue status, so consumers need not inspect individual items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Pending,
    Uploading,
    Paused,
    Error,
    Completed,
}

impl QueueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            QueueStatus::Pending => "pending",
            QueueStatus::Uploading => "uploading",
            QueueStatus::Paused => "paused",
            QueueStatus::Error => "error",
            QueueStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "pending" => QueueStatus::Pending,
            "uploading" => QueueStatus::Uploading,
            "paused" => QueueStatus::Paused,
            "completed" => QueueStatus::Completed,
            _ => QueueStatus::Error,
        }
    }
}

/// One upload+archive unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueItem {
    pub id: ItemId,
    pub queue_id: QueueId,
    pub position: i64,
    pub payload: String,
    pub remote_handle: Option<String>,
    pub status: ItemStatus,
    pub last_error: Option<String>,
}

impl QueueItem {
    /// Archived and final; must never be sent to the remote again.
    pub fn is_completed(&self) -> bool {
        self.status == ItemStatus::Completed
    }
}

/// Summary view used by the CLI `status` command.
#[derive(Debug, Clone, Serialize)]
pub struct QueueSummary {
    pub id: QueueId,
    pub name: String,
    pub status: QueueStatus,
    pub completed: usize,
    pub ledger: ProgressLedger,
}
