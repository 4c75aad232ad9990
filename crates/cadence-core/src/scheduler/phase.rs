//! Externally observable orchestration phase and run outcomes.

use std::fmt;

use serde::Serialize;

/// What the orchestrator is doing right now.
///
/// Item numbers are 1-based (`Uploading { item: 1 }` is the first item); all
/// `remaining` values are seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Uploading { item: usize },
    Archiving { item: usize },
    WaitingNextItem { next: usize, remaining: u64 },
    Cooldown { remaining: u64 },
    AutoRetrying { remaining: u64, attempt: u32 },
    WaitingNetwork { attempt: u32 },
    EscalatedPause { remaining: u64 },
    LockedOut { remaining: u64 },
    ItemRejected { item: usize },
    SessionExpired,
    Paused,
    Completed,
}

impl Phase {
    /// Countdown phases re-emitted every second.
    pub fn is_tick(&self) -> bool {
        matches!(
            self,
            Phase::WaitingNextItem { .. }
                | Phase::Cooldown { .. }
                | Phase::AutoRetrying { .. }
                | Phase::EscalatedPause { .. }
                | Phase::LockedOut { .. }
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Uploading { item } => write!(f, "uploading item {item}"),
            Phase::Archiving { item } => write!(f, "archiving item {item}"),
            Phase::WaitingNextItem { next, remaining } => {
                write!(f, "next item {next} in {remaining}s")
            }
            Phase::Cooldown { remaining } => write!(f, "account cooldown, {remaining}s left"),
            Phase::AutoRetrying { remaining, attempt } => {
                write!(f, "retrying in {remaining}s (attempt {attempt} failed)")
            }
            Phase::WaitingNetwork { attempt } => {
                write!(f, "waiting for network (attempt {attempt} failed)")
            }
            Phase::EscalatedPause { remaining } => {
                write!(f, "too many failures, cooling down {remaining}s")
            }
            Phase::LockedOut { remaining } => write!(f, "account locked out, {remaining}s left"),
            Phase::ItemRejected { item } => write!(f, "item {item} rejected, skip or replace it"),
            Phase::SessionExpired => write!(f, "session expired, sign in again"),
            Phase::Paused => write!(f, "paused"),
            Phase::Completed => write!(f, "completed"),
        }
    }
}

/// Why a run ended up paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseCause {
    /// The pause flag was set (user action) or the queue was already paused.
    Requested,
    /// Bot detection: the lockout countdown ran to zero.
    Lockout,
    /// Repeated recoverable failures: the escalation countdown ran to zero.
    Escalation,
    /// The remote reported the account as locked out before an attempt.
    AccountLocked,
}

/// How a call to run or resume a queue ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    Paused { resume_index: usize, cause: PauseCause },
    SessionExpired { resume_index: usize },
    ItemRejected { index: usize, reason: String },
}

impl RunOutcome {
    /// Index a later resume continues from, if the run stopped early.
    pub fn resume_index(&self) -> Option<usize> {
        match self {
            RunOutcome::Completed => None,
            RunOutcome::Paused { resume_index, .. } => Some(*resume_index),
            RunOutcome::SessionExpired { resume_index } => Some(*resume_index),
            RunOutcome::ItemRejected { index, .. } => Some(*index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_one_based_items() {
        assert_eq!(Phase::Uploading { item: 1 }.to_string(), "uploading item 1");
        assert_eq!(
            Phase::WaitingNextItem {
                next: 3,
                remaining: 42
            }
            .to_string(),
            "next item 3 in 42s"
        );
    }

    #[test]
    fn only_countdowns_tick() {
        assert!(Phase::LockedOut { remaining: 1 }.is_tick());
        assert!(!Phase::WaitingNetwork { attempt: 1 }.is_tick());
        assert!(!Phase::Paused.is_tick());
    }

    #[test]
    fn outcome_resume_index() {
        assert_eq!(RunOutcome::Completed.resume_index(), None);
        assert_eq!(
            RunOutcome::Paused {
                resume_index: 4,
                cause: PauseCause::Requested
            }
            .resume_index(),
            Some(4)
        );
        assert_eq!(
            RunOutcome::ItemRejected {
                index: 2,
                reason: "bad format".into()
            }
            .resume_index(),
            Some(2)
        );
    }

    #[test]
    fn phase_serializes_with_tag() {
        let json = serde_json::to_string(&Phase::LockedOut { remaining: 900 }).unwrap();
        assert_eq!(json, r#"{"phase":"locked_out","remaining":900}"#);
    }
}
