//! In-memory single-queue `QueueStore`.

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use cadence_core::ledger::ProgressLedger;
use cadence_core::queue_db::{ItemId, ItemStatus, QueueId, QueueItem, QueueStatus};
use cadence_core::store::QueueStore;

pub const QUEUE: QueueId = 1;

struct State {
    items: Vec<QueueItem>,
    ledger: ProgressLedger,
    status: QueueStatus,
    status_history: Vec<QueueStatus>,
}

pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn with_payloads(payloads: &[&str]) -> Self {
        let items = payloads
            .iter()
            .enumerate()
            .map(|(i, p)| QueueItem {
                id: i as ItemId + 100,
                queue_id: QUEUE,
                position: i as i64,
                payload: p.to_string(),
                remote_handle: None,
                status: ItemStatus::Pending,
                last_error: None,
            })
            .collect::<Vec<_>>();
        let ledger = ProgressLedger {
            total: items.len(),
            ..Default::default()
        };
        Self {
            state: Mutex::new(State {
                items,
                ledger,
                status: QueueStatus::Pending,
                status_history: Vec::new(),
            }),
        }
    }

    pub fn snapshot_items(&self) -> Vec<QueueItem> {
        self.state.lock().unwrap().items.clone()
    }

    pub fn ledger(&self) -> ProgressLedger {
        self.state.lock().unwrap().ledger.clone()
    }

    pub fn set_ledger(&self, ledger: ProgressLedger) {
        self.state.lock().unwrap().ledger = ledger;
    }

    pub fn status(&self) -> QueueStatus {
        self.state.lock().unwrap().status
    }

    pub fn status_history(&self) -> Vec<QueueStatus> {
        self.state.lock().unwrap().status_history.clone()
    }

    pub fn mark_completed(&self, index: usize) {
        let mut state = self.state.lock().unwrap();
        state.items[index].status = ItemStatus::Completed;
        state.items[index].remote_handle = Some(format!("h-{}", state.items[index].payload));
    }

    fn with_item<F: FnOnce(&mut QueueItem)>(&self, id: ItemId, f: F) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let item = state
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| anyhow!("no item {id}"))?;
        f(item);
        Ok(())
    }
}

#[async_trait]
impl QueueStore for MemoryStore {
    async fn items(&self, _queue: QueueId) -> Result<Vec<QueueItem>> {
        Ok(self.snapshot_items())
    }

    async fn set_item_status(&self, item: ItemId, status: ItemStatus) -> Result<()> {
        self.with_item(item, |i| i.status = status)
    }

    async fn record_upload(&self, item: ItemId, remote_handle: &str) -> Result<()> {
        self.with_item(item, |i| {
            i.remote_handle = Some(remote_handle.to_string());
            i.status = ItemStatus::Uploaded;
            i.last_error = None;
        })
    }

    async fn record_failure(&self, item: ItemId, error: &str) -> Result<()> {
        self.with_item(item, |i| {
            i.status = ItemStatus::Failed;
            i.last_error = Some(error.to_string());
        })
    }

    async fn replace_payload(&self, item: ItemId, payload: &str) -> Result<()> {
        self.with_item(item, |i| {
            i.payload = payload.to_string();
            i.remote_handle = None;
            i.last_error = None;
            i.status = ItemStatus::Pending;
        })
    }

    async fn set_queue_status(&self, _queue: QueueId, status: QueueStatus) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.status = status;
        state.status_history.push(status);
        Ok(())
    }

    async fn load_ledger(&self, _queue: QueueId) -> Result<ProgressLedger> {
        let state = self.state.lock().unwrap();
        let mut ledger = state.ledger.clone();
        ledger.total = state.items.len();
        Ok(ledger)
    }

    async fn save_ledger(&self, _queue: QueueId, ledger: &ProgressLedger) -> Result<()> {
        self.state.lock().unwrap().ledger = ledger.clone();
        Ok(())
    }
}
