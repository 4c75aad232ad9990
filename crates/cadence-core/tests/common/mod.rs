//! Test doubles for driving the orchestrator without a database or a network.

#![allow(dead_code)]

pub mod memory_store;
pub mod scripted_remote;

use cadence_core::config::{CadenceConfig, NetworkConfig, PacingConfig};

/// Default config with every pacing window collapsed to a fixed value, so
/// tests can assert exact countdowns.
pub fn fixed_pacing_config(pre_archive: u64, inter_item: u64) -> CadenceConfig {
    CadenceConfig {
        pacing: PacingConfig {
            pre_archive_min_secs: pre_archive,
            pre_archive_max_secs: pre_archive,
            inter_item_min_secs: inter_item,
            inter_item_max_secs: inter_item,
            cooldown_jitter_min_secs: 0,
            cooldown_jitter_max_secs: 0,
        },
        network: NetworkConfig {
            poll_interval_secs: 5,
            ceiling_secs: 120,
            settle_secs: 3,
        },
        ..CadenceConfig::default()
    }
}
