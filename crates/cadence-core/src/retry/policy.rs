use crate::config::RetryConfig;
use crate::delay::random_secs;

/// Fixed lockout window after the remote flags automated behavior.
pub const LOCKOUT_SECS: u64 = 900;

/// Fixed cool-down after repeated recoverable failures.
pub const ESCALATION_SECS: u64 = 300;

/// Longest cooldown taken from the remote's word (a day). Longer declared
/// waits are clamped to this.
pub const MAX_COOLDOWN_SECS: u64 = 24 * 60 * 60;

/// High-level classification of a remote failure for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The authenticated session is gone; needs re-authentication.
    SessionExpired,
    /// The remote flagged automated behavior (challenge, checkpoint, spam).
    BotDetected,
    /// The payload itself was refused; waiting will not help.
    ItemRejected,
    /// Server-imposed "wait N" rate limit.
    CooldownActive,
    /// Connectivity-layer failure (timeout, DNS, offline).
    NetworkTransient,
    /// Anything else.
    GenericTransient,
}

impl ErrorKind {
    /// Kinds that may be retried automatically (bounded).
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::CooldownActive | ErrorKind::NetworkTransient | ErrorKind::GenericTransient
        )
    }
}

/// Why a run stopped without retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    SessionExpired,
    LockedOut,
    ItemRejected,
}

impl HaltReason {
    pub fn as_str(self) -> &'static str {
        match self {
            HaltReason::SessionExpired => "session_expired",
            HaltReason::LockedOut => "locked_out",
            HaltReason::ItemRejected => "item_rejected",
        }
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the same item after the given number of seconds.
    RetryAfter(u64),
    /// Retry once the network probe succeeds (or its polling ceiling is hit).
    RetryWhenNetworkRecovers,
    /// Stop auto-retrying: run the escalation pause, then wait for a human.
    Escalate,
    /// Stop without retrying.
    Halt(HaltReason),
}

/// Bounded retry policy keyed by error kind.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts per item (including the first); also the
    /// ceiling for consecutive auto-retries across items.
    pub max_attempts: u32,
    pub cooldown_margin_secs: u64,
    pub cooldown_floor_secs: u64,
    pub generic_base_secs: u64,
    pub generic_jitter_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(3, &RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(max_attempts: u32, cfg: &RetryConfig) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            cooldown_margin_secs: cfg.cooldown_margin_secs,
            cooldown_floor_secs: cfg.cooldown_floor_secs,
            generic_base_secs: cfg.generic_base_secs,
            generic_jitter_secs: cfg.generic_jitter_secs,
        }
    }

    /// Decide what to do after a failed attempt.
    ///
    /// `attempt` is 1-based (1 = the first attempt for this item just failed).
    /// `consecutive` is the run-wide count of auto-retries since the last
    /// successful archive. `declared_wait_secs` is the duration parsed from a
    /// cooldown message, if any.
    pub fn decide(
        &self,
        kind: ErrorKind,
        attempt: u32,
        consecutive: u32,
        declared_wait_secs: Option<u64>,
    ) -> RetryDecision {
        if !kind.is_retryable() {
            return RetryDecision::Halt(match kind {
                ErrorKind::SessionExpired => HaltReason::SessionExpired,
                ErrorKind::BotDetected => HaltReason::LockedOut,
                _ => HaltReason::ItemRejected,
            });
        }

        if consecutive >= self.max_attempts || attempt >= self.max_attempts {
            return RetryDecision::Escalate;
        }

        match kind {
            ErrorKind::CooldownActive => RetryDecision::RetryAfter(self.cooldown_wait(declared_wait_secs)),
            ErrorKind::NetworkTransient => RetryDecision::RetryWhenNetworkRecovers,
            _ => RetryDecision::RetryAfter(
                self.generic_base_secs
                    .saturating_add(random_secs(0, self.generic_jitter_secs)),
            ),
        }
    }

    /// Wait for a cooldown response: declared duration (at most
    /// [`MAX_COOLDOWN_SECS`]) plus the safety margin, or the floor when the
    /// message carried no duration.
    pub fn cooldown_wait(&self, declared_wait_secs: Option<u64>) -> u64 {
        match declared_wait_secs {
            Some(secs) => secs
                .min(MAX_COOLDOWN_SECS)
                .saturating_add(self.cooldown_margin_secs)
                .max(self.cooldown_floor_secs),
            None => self.cooldown_floor_secs,
        }
    }
}
