//! `cadence pause <queue>` – pause a queue. If `cadence run` is active, signals it to stop.

use anyhow::Result;
use cadence_core::queue_db::{QueueDb, QueueStatus};

use super::queue_id;
use crate::cli::control_socket;

pub async fn run_pause(db: &QueueDb, queue: &str) -> Result<()> {
    let id = queue_id(db, queue).await?;
    let delivered = match cadence_core::control::default_control_socket_path() {
        Ok(path) => match control_socket::send_pause(&path, id).await {
            Ok(delivered) => delivered,
            Err(e) => {
                tracing::warn!(path = %path.display(), "control socket send: {:#}", e);
                false
            }
        },
        Err(e) => {
            tracing::warn!("control socket path: {}", e);
            false
        }
    };

    // A live run owns the ledger row and saves the pause itself.
    if delivered {
        println!("Pause requested; queue {queue} stops at its next checkpoint");
        return Ok(());
    }
    db.set_paused(id, true).await?;
    if db.queue_status(id).await? != Some(QueueStatus::Completed) {
        db.set_queue_status(id, QueueStatus::Paused).await?;
    }
    println!("Paused queue {queue}");
    Ok(())
}
