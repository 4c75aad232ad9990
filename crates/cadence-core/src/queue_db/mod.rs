//! Persistent queue database (SQLite via sqlx).
//!
//! Stores queues (aggregate status plus the progress ledger) and their items
//! (payload, remote handle, status, last error) so a run can resume exactly
//! after a pause, a failure, or a restart.

pub mod db;
mod queues;
mod store;
pub mod types;

pub use db::*;
pub use types::*;
