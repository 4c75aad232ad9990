use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Pacing windows between remote calls (all values in seconds).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PacingConfig {
    /// Lower bound of the human-like pause between upload and archive.
    pub pre_archive_min_secs: u64,
    /// Upper bound of the human-like pause between upload and archive.
    pub pre_archive_max_secs: u64,
    /// Lower bound of the fallback inter-item delay (no remote cooldown active).
    pub inter_item_min_secs: u64,
    /// Upper bound of the fallback inter-item delay.
    pub inter_item_max_secs: u64,
    /// Jitter added on top of an active remote cooldown before the next item.
    pub cooldown_jitter_min_secs: u64,
    pub cooldown_jitter_max_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            pre_archive_min_secs: 5,
            pre_archive_max_secs: 10,
            inter_item_min_secs: 160,
            inter_item_max_secs: 220,
            cooldown_jitter_min_secs: 5,
            cooldown_jitter_max_secs: 15,
        }
    }
}

/// Network-recovery polling for connectivity failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Seconds between network probes while waiting for recovery.
    pub poll_interval_secs: u64,
    /// Give up polling after this many seconds and retry anyway.
    pub ceiling_secs: u64,
    /// Extra wait after the probe succeeds, before the retried call.
    pub settle_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            ceiling_secs: 120,
            settle_secs: 3,
        }
    }
}

/// Retry delay parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryConfig {
    /// Safety margin added to a server-declared cooldown.
    pub cooldown_margin_secs: u64,
    /// Wait used when a cooldown message carries no parsable duration.
    pub cooldown_floor_secs: u64,
    /// Base delay for generic transient failures.
    pub generic_base_secs: u64,
    /// Random extra (0..=n) added to the generic base delay.
    pub generic_jitter_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            cooldown_margin_secs: 30,
            cooldown_floor_secs: 30,
            generic_base_secs: 60,
            generic_jitter_secs: 30,
        }
    }
}

/// Shell command templates for the command-backed remote.
///
/// `{payload}` and `{handle}` are substituted before the command is run with `sh -c`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteCommandConfig {
    /// Uploads `{payload}`; prints the remote handle on stdout.
    pub upload: String,
    /// Archives `{handle}`; exit status 0 means archived.
    pub archive: String,
    /// Exit status 0 means the connection is usable.
    #[serde(default)]
    pub probe: Option<String>,
    /// Exit status 0 means the account is currently locked out.
    #[serde(default)]
    pub lockout: Option<String>,
}

/// Global configuration loaded from `~/.config/cadence/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CadenceConfig {
    /// Attempts per item (including the first) before escalating.
    pub max_attempts: u32,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    /// Optional retry delays; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Remote command templates; `cadence run` needs this section.
    #[serde(default)]
    pub remote: Option<RemoteCommandConfig>,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            pacing: PacingConfig::default(),
            network: NetworkConfig::default(),
            retry: None,
            remote: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("cadence")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CadenceConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = CadenceConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: CadenceConfig = toml::from_str(&data)?;
    Ok(cfg)
}
