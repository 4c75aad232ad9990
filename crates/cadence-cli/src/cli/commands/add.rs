//! `cadence add <queue> <payload>...` – append items to a queue.

use anyhow::Result;
use cadence_core::queue_db::QueueDb;

pub async fn run_add(db: &QueueDb, queue: &str, payloads: &[String]) -> Result<()> {
    let id = db.ensure_queue(queue).await?;
    for payload in payloads {
        db.add_item(id, payload).await?;
    }
    println!("Added {} item(s) to queue {queue}", payloads.len());
    Ok(())
}
