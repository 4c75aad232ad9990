//! `RemoteService` backed by shell command templates.

use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::RemoteCommandConfig;
use crate::cooldown::CooldownStatus;

use super::{RemoteError, RemoteService};

/// Runs the configured `upload` / `archive` / `probe` / `lockout` commands via `sh -c`.
///
/// A failing command's stderr becomes the [`RemoteError`] message, so the
/// uploader tool's own wording ("please wait 2m", "login required") drives
/// classification.
#[derive(Debug, Clone)]
pub struct CommandRemote {
    cfg: RemoteCommandConfig,
}

impl CommandRemote {
    pub fn new(cfg: RemoteCommandConfig) -> Self {
        Self { cfg }
    }
}

/// Single-quote a value for `sh`.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn render(template: &str, placeholder: &str, value: &str) -> String {
    template.replace(placeholder, &shell_quote(value))
}

async fn run_shell(command: &str) -> Result<Output, RemoteError> {
    tracing::trace!(command, "running remote command");
    Command::new("sh")
        .arg("-c")
        .arg(command)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| RemoteError::new(format!("could not spawn remote command: {e}")))
}

fn failure_message(output: &Output) -> Option<String> {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
        return Some(stderr);
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!stdout.is_empty()).then_some(stdout)
}

#[async_trait]
impl RemoteService for CommandRemote {
    async fn upload(&self, payload: &str) -> Result<String, RemoteError> {
        let output = run_shell(&render(&self.cfg.upload, "{payload}", payload)).await?;
        if !output.status.success() {
            let msg = failure_message(&output)
                .unwrap_or_else(|| format!("upload command failed ({})", output.status));
            return Err(RemoteError::new(msg));
        }
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
            .ok_or_else(|| RemoteError::new("upload command printed no remote handle"))
    }

    async fn archive(&self, handle: &str) -> Result<bool, RemoteError> {
        let output = run_shell(&render(&self.cfg.archive, "{handle}", handle)).await?;
        if output.status.success() {
            return Ok(true);
        }
        match failure_message(&output) {
            Some(msg) => Err(RemoteError::new(msg)),
            None => Ok(false),
        }
    }

    async fn probe_network(&self) -> Result<(), RemoteError> {
        let Some(probe) = &self.cfg.probe else {
            return Ok(());
        };
        let output = run_shell(probe).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(RemoteError::new(
                failure_message(&output).unwrap_or_else(|| "network probe failed".to_string()),
            ))
        }
    }

    async fn is_account_locked_out(&self) -> bool {
        let Some(lockout) = &self.cfg.lockout else {
            return false;
        };
        match run_shell(lockout).await {
            Ok(output) => output.status.success(),
            Err(e) => {
                tracing::warn!("lockout check failed, assuming not locked out: {}", e);
                false
            }
        }
    }

    /// Shell commands have no channel to declare a cooldown; cooldowns come
    /// from "please wait" failures instead.
    async fn cooldown_status(&self) -> CooldownStatus {
        CooldownStatus::inactive()
    }
}
