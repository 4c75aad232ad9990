//! Remote media service seam.
//!
//! The orchestrator only talks to the service through [`RemoteService`]; the
//! protocol behind it is not our concern. [`CommandRemote`] is the adapter used
//! by the CLI: it shells out to user-configured commands.

mod command;

use async_trait::async_trait;

use crate::cooldown::CooldownStatus;
pub use crate::retry::RemoteError;

pub use command::CommandRemote;

/// Capabilities the orchestrator needs from the remote service.
///
/// Calls are awaited to completion; there is no timeout at this layer.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Upload a payload; returns the handle the archive step needs.
    async fn upload(&self, payload: &str) -> Result<String, RemoteError>;

    /// Archive a previously uploaded handle. `Ok(false)` means the remote
    /// declined without an error message.
    async fn archive(&self, handle: &str) -> Result<bool, RemoteError>;

    /// Fails while the connection is unstable or has just changed.
    async fn probe_network(&self) -> Result<(), RemoteError>;

    /// External bot-detection flag for the account.
    async fn is_account_locked_out(&self) -> bool;

    /// Cooldown the remote currently declares for the account.
    async fn cooldown_status(&self) -> CooldownStatus;
}
