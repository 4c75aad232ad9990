//! Failure classification and retry policy.
//!
//! This module maps opaque remote failures to error kinds (session, bot
//! detection, rejected payload, cooldown, network, generic) and decides per
//! kind whether to retry, wait for the network, escalate, or halt, so the
//! orchestrator only acts on decisions.

mod classify;
mod error;
mod policy;

pub use classify::{classify, parse_wait_secs};
pub use error::RemoteError;
pub use policy::{
    ErrorKind, HaltReason, RetryDecision, RetryPolicy, ESCALATION_SECS, LOCKOUT_SECS,
    MAX_COOLDOWN_SECS,
};
