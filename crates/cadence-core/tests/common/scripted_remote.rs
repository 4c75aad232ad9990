//! `RemoteService` that replays scripted failures and records every call.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use cadence_core::cooldown::CooldownStatus;
use cadence_core::remote::{RemoteError, RemoteService};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Upload(String),
    Archive(String),
    Probe,
}

/// Uploads succeed with handle `h-<payload>` and archives succeed, unless a
/// failure was queued for that payload or handle.
#[derive(Default)]
pub struct ScriptedRemote {
    upload_failures: Mutex<HashMap<String, VecDeque<RemoteError>>>,
    archive_results: Mutex<HashMap<String, VecDeque<Result<bool, RemoteError>>>>,
    probe_results: Mutex<VecDeque<Result<(), RemoteError>>>,
    calls: Mutex<Vec<Call>>,
    locked_out: AtomicBool,
    cooldown: Mutex<CooldownStatus>,
}

pub fn handle_for(payload: &str) -> String {
    format!("h-{payload}")
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_upload(&self, payload: &str, message: &str) {
        self.upload_failures
            .lock()
            .unwrap()
            .entry(payload.to_string())
            .or_default()
            .push_back(RemoteError::new(message));
    }

    pub fn archive_result(&self, payload: &str, result: Result<bool, RemoteError>) {
        self.archive_results
            .lock()
            .unwrap()
            .entry(handle_for(payload))
            .or_default()
            .push_back(result);
    }

    pub fn probe_result(&self, result: Result<(), RemoteError>) {
        self.probe_results.lock().unwrap().push_back(result);
    }

    pub fn set_locked_out(&self, locked: bool) {
        self.locked_out.store(locked, Ordering::Relaxed);
    }

    pub fn set_cooldown(&self, status: CooldownStatus) {
        *self.cooldown.lock().unwrap() = status;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn uploads_of(&self, payload: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == Call::Upload(payload.to_string()))
            .count()
    }

    pub fn archives_of(&self, payload: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == Call::Archive(handle_for(payload)))
            .count()
    }
}

#[async_trait]
impl RemoteService for ScriptedRemote {
    async fn upload(&self, payload: &str) -> Result<String, RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Upload(payload.to_string()));
        let scripted = self
            .upload_failures
            .lock()
            .unwrap()
            .get_mut(payload)
            .and_then(|q| q.pop_front());
        match scripted {
            Some(err) => Err(err),
            None => Ok(handle_for(payload)),
        }
    }

    async fn archive(&self, handle: &str) -> Result<bool, RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Archive(handle.to_string()));
        self.archive_results
            .lock()
            .unwrap()
            .get_mut(handle)
            .and_then(|q| q.pop_front())
            .unwrap_or(Ok(true))
    }

    async fn probe_network(&self) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(Call::Probe);
        self.probe_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn is_account_locked_out(&self) -> bool {
        self.locked_out.load(Ordering::Relaxed)
    }

    async fn cooldown_status(&self) -> CooldownStatus {
        *self.cooldown.lock().unwrap()
    }
}
