//! `cadence skip` / `cadence replace` – settle a halted item, then `cadence resume`.

use anyhow::Result;
use cadence_core::queue_db::QueueDb;
use cadence_core::scheduler::{apply_decision, Decision};

use super::queue_id;

pub async fn run_decision(db: &QueueDb, queue: &str, decision: Decision) -> Result<()> {
    let id = queue_id(db, queue).await?;
    let skipping = matches!(decision, Decision::Skip);
    let next = apply_decision(db, id, decision).await?;
    if skipping {
        println!("Skipped; queue {queue} will resume at item {}", next + 1);
    } else {
        println!("Replaced payload of item {}; run `cadence resume {queue}`", next + 1);
    }
    Ok(())
}
