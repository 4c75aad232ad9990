//! `cadence remove <queue>` – delete a queue and its items.

use anyhow::Result;
use cadence_core::queue_db::QueueDb;

use super::queue_id;

pub async fn run_remove(db: &QueueDb, queue: &str) -> Result<()> {
    let id = queue_id(db, queue).await?;
    db.remove_queue(id).await?;
    println!("Removed queue {queue}");
    Ok(())
}
