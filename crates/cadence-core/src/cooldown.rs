//! Account-wide cooldown gate shared by every queue.
//!
//! The remote's rate limit is per account, so one deadline is shared across
//! queue runs in the process. It is fed from two places: cooldown failures seen
//! by the orchestrator, and the cooldown the remote itself reports. Readers
//! treat it as eventually consistent.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use crate::remote::RemoteService;
use crate::retry::MAX_COOLDOWN_SECS;

/// Snapshot answer to "may we upload now?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CooldownStatus {
    pub active: bool,
    pub remaining_secs: u64,
}

impl CooldownStatus {
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Active when `remaining_secs > 0`.
    pub fn for_secs(remaining_secs: u64) -> Self {
        Self {
            active: remaining_secs > 0,
            remaining_secs,
        }
    }
}

/// Shared "next allowed upload time". Cloning shares the same deadline.
#[derive(Debug, Clone, Default)]
pub struct GlobalCooldown {
    until: Arc<Mutex<Option<Instant>>>,
}

impl GlobalCooldown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the deadline to at least `secs` from now (at most
    /// [`MAX_COOLDOWN_SECS`]). Never shortens it.
    pub fn extend(&self, secs: u64) {
        if secs == 0 {
            return;
        }
        let secs = secs.min(MAX_COOLDOWN_SECS);
        let Some(candidate) = Instant::now().checked_add(Duration::from_secs(secs)) else {
            return;
        };
        if let Ok(mut until) = self.until.lock() {
            *until = Some(match *until {
                Some(current) if current > candidate => current,
                _ => candidate,
            });
        }
    }

    pub fn clear(&self) {
        if let Ok(mut until) = self.until.lock() {
            *until = None;
        }
    }

    /// Remaining cooldown, rounded up to whole seconds.
    pub fn is_on_cooldown(&self) -> CooldownStatus {
        let Ok(until) = self.until.lock() else {
            return CooldownStatus::inactive();
        };
        let Some(deadline) = *until else {
            return CooldownStatus::inactive();
        };
        let left = deadline.saturating_duration_since(Instant::now());
        let secs = left.as_secs() + u64::from(left.subsec_nanos() > 0);
        CooldownStatus::for_secs(secs)
    }

    /// Merge the cooldown reported by the remote, then answer.
    pub async fn refresh(&self, remote: &dyn RemoteService) -> CooldownStatus {
        let reported = remote.cooldown_status().await;
        if reported.active {
            self.extend(reported.remaining_secs);
        }
        self.is_on_cooldown()
    }
}
