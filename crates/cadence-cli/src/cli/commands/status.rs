//! `cadence status [queue]` – show queues, or one queue's items.

use anyhow::Result;
use cadence_core::queue_db::QueueDb;

use super::queue_id;

pub async fn run_status(db: &QueueDb, queue: Option<&str>) -> Result<()> {
    match queue {
        Some(name) => show_items(db, name).await,
        None => show_queues(db).await,
    }
}

async fn show_queues(db: &QueueDb) -> Result<()> {
    let queues = db.list_queues().await?;
    if queues.is_empty() {
        println!("No queues in database.");
        return Ok(());
    }
    println!("{:<6} {:<20} {:<10} {:<8} {}", "ID", "NAME", "STATUS", "DONE", "NEXT");
    for q in queues {
        let start = q.ledger.start_index();
        let next = match q.ledger.hold {
            _ if q.ledger.is_finished() => "-".to_string(),
            Some(hold) => format!(
                "item {} after {} {}s",
                start + 1,
                hold.kind.as_str(),
                hold.remaining_secs
            ),
            None if start < q.ledger.total => format!("item {}", start + 1),
            None => "-".to_string(),
        };
        println!(
            "{:<6} {:<20} {:<10} {:<8} {}",
            q.id,
            q.name,
            q.status.as_str(),
            format!("{}/{}", q.completed, q.ledger.total),
            next
        );
    }
    Ok(())
}

async fn show_items(db: &QueueDb, name: &str) -> Result<()> {
    let id = queue_id(db, name).await?;
    let items = db.list_items(id).await?;
    if items.is_empty() {
        println!("Queue {name} is empty.");
        return Ok(());
    }
    println!("{:<5} {:<10} {:<30} {}", "#", "STATUS", "PAYLOAD", "LAST ERROR");
    for (i, item) in items.iter().enumerate() {
        println!(
            "{:<5} {:<10} {:<30} {}",
            i + 1,
            item.status.as_str(),
            item.payload,
            item.last_error.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
