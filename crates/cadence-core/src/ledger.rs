//! Progress/resume ledger: the minimal state that lets a queue run resume exactly.
//!
//! Owned by the orchestrator while a run is active and persisted through the
//! queue store at every checkpoint that changes it.

use serde::{Deserialize, Serialize};

/// Which fixed countdown was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldKind {
    Lockout,
    Escalation,
}

impl HoldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HoldKind::Lockout => "lockout",
            HoldKind::Escalation => "escalation",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "lockout" => Some(HoldKind::Lockout),
            "escalation" => Some(HoldKind::Escalation),
            _ => None,
        }
    }
}

/// A lockout or escalation countdown that was cut short by a pause. The next
/// resume finishes it before any remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
    pub kind: HoldKind,
    pub remaining_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressLedger {
    /// Number of items committed in order (index of the next item to do).
    pub current_index: usize,
    pub total: usize,
    /// Auto-retries since the last successful archive, across items.
    pub consecutive_auto_retries: u32,
    /// Where a halted run continues. Set whenever a run stops early.
    pub resume_index: Option<usize>,
    pub is_paused: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold: Option<Hold>,
}

impl ProgressLedger {
    /// Index the next run starts at.
    pub fn start_index(&self) -> usize {
        self.resume_index.unwrap_or(self.current_index)
    }

    /// Record that execution stopped before item `index` was committed.
    pub fn stop_at(&mut self, index: usize) {
        self.resume_index = Some(index);
    }

    /// Item `index` was archived: advance and reset the retry streak.
    pub fn record_archived(&mut self, index: usize) {
        self.current_index = index + 1;
        self.consecutive_auto_retries = 0;
    }

    pub fn record_auto_retry(&mut self) {
        self.consecutive_auto_retries = self.consecutive_auto_retries.saturating_add(1);
    }

    /// Nothing left to do: no pending resume point and every item committed.
    pub fn is_finished(&self) -> bool {
        self.resume_index.is_none() && self.current_index >= self.total
    }
}
