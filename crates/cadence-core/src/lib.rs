//! Paced upload-then-archive orchestration against a rate-limited remote.
//!
//! The [`scheduler::Orchestrator`] walks a queue stored in [`queue_db`], talks
//! to the remote through [`remote::RemoteService`], and leans on [`retry`] for
//! failure classification and on [`delay`] for interruptible countdowns.

pub mod config;
pub mod control;
pub mod cooldown;
pub mod delay;
pub mod ledger;
pub mod logging;
pub mod queue_db;
pub mod remote;
pub mod retry;
pub mod scheduler;
pub mod store;
