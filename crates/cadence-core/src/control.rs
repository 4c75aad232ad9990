//! Run control for pause: shared pause tokens and optional IPC.
//!
//! When the orchestrator runs a queue under a `RunControl`, the queue is
//! registered with a pause token. A control client (e.g. `cadence pause uploads`
//! via socket) can request a pause; the run loop checks the token at every
//! checkpoint and stops with its resume index saved.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::queue_db::QueueId;

/// Cooperative pause token. Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct PauseFlag(Arc<AtomicBool>);

impl PauseFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run loop to stop at its next checkpoint.
    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Shared registry of queue id -> pause token. Used by the CLI `run` command to
/// hand a token to the orchestrator and by the control socket to signal pause.
#[derive(Default)]
pub struct RunControl {
    queues: RwLock<HashMap<QueueId, PauseFlag>>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a running queue; returns the pause token to pass to the orchestrator.
    pub fn register(&self, queue_id: QueueId) -> PauseFlag {
        let flag = PauseFlag::new();
        if let Ok(mut queues) = self.queues.write() {
            queues.insert(queue_id, flag.clone());
        }
        flag
    }

    /// Unregister a queue (call when its run returns, whatever the outcome).
    pub fn unregister(&self, queue_id: QueueId) {
        if let Ok(mut queues) = self.queues.write() {
            queues.remove(&queue_id);
        }
    }

    /// Request pause for a queue. Returns false if no run for it is registered.
    pub fn request_pause(&self, queue_id: QueueId) -> bool {
        match self.queues.read() {
            Ok(queues) => match queues.get(&queue_id) {
                Some(flag) => {
                    flag.request();
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }
}

/// Default path for the control socket (same XDG state dir as the DB).
pub fn default_control_socket_path() -> std::io::Result<PathBuf> {
    let dirs = xdg::BaseDirectories::with_prefix("cadence")
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    dirs.place_state_file("control.sock")
}
