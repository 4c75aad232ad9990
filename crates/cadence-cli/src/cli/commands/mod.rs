//! CLI command handlers, one file per command.

mod add;
mod completions;
mod decision;
mod pause;
mod remove;
mod run;
mod status;

use anyhow::{anyhow, Result};
use cadence_core::queue_db::{QueueDb, QueueId};

pub use add::run_add;
pub use completions::run_completions;
pub use decision::run_decision;
pub use pause::run_pause;
pub use remove::run_remove;
pub use run::{run_queue, RunMode};
pub use status::run_status;

/// Resolve a queue name, failing with a readable error if it does not exist.
pub(crate) async fn queue_id(db: &QueueDb, name: &str) -> Result<QueueId> {
    db.find_queue(name)
        .await?
        .ok_or_else(|| anyhow!("no queue named {name:?}"))
}
