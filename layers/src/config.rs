//! UE stack configuration
//!
//! Loaded from TOML; every field has a default so an empty file is a valid
//! configuration.

use std::path::Path;

use anyhow::{bail, Context};
use common::buffer::{DEFAULT_POOL_CAPACITY, MAX_BUFFER_SIZE_BYTES};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StackConfig {
    #[serde(default)]
    pub rrc: RrcConfig,
    #[serde(default)]
    pub pdcp: PdcpConfig,
    #[serde(default)]
    pub pool: PoolConfig,
}

/// RRC timing knobs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RrcConfig {
    /// Interval between SI window retries in ms
    #[serde(default = "default_sib_search_interval_ms")]
    pub sib_search_interval_ms: u64,
    /// Delay between PHY sync and the first window computation, in ms
    #[serde(default = "default_sync_settle_ms")]
    pub sync_settle_ms: u64,
    /// Hold off cell acquisition for the wait time of a Connection Reject
    #[serde(default = "default_true")]
    pub honor_reject_wait_time: bool,
}

fn default_sib_search_interval_ms() -> u64 {
    100
}

fn default_sync_settle_ms() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

impl Default for RrcConfig {
    fn default() -> Self {
        Self {
            sib_search_interval_ms: default_sib_search_interval_ms(),
            sync_settle_ms: default_sync_settle_ms(),
            honor_reject_wait_time: true,
        }
    }
}

/// PDCP configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PdcpConfig {
    /// Uplink COUNT values available per bearer; COUNT never wraps
    #[serde(default = "default_max_count")]
    pub max_count: u32,
}

fn default_max_count() -> u32 {
    u32::MAX
}

impl Default for PdcpConfig {
    fn default() -> Self {
        Self { max_count: default_max_count() }
    }
}

/// Byte buffer pool sizing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PoolConfig {
    /// Buffers handed out concurrently
    #[serde(default = "default_pool_capacity")]
    pub capacity: usize,
    /// Bytes per buffer
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

fn default_pool_capacity() -> usize {
    DEFAULT_POOL_CAPACITY
}

fn default_buffer_size() -> usize {
    MAX_BUFFER_SIZE_BYTES
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: default_pool_capacity(),
            buffer_size: default_buffer_size(),
        }
    }
}

impl StackConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let config: StackConfig = toml::from_str(contents).context("invalid stack configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rrc.sib_search_interval_ms == 0 {
            bail!("rrc.sib_search_interval_ms must be greater than 0");
        }
        if self.pdcp.max_count == 0 {
            bail!("pdcp.max_count must be greater than 0");
        }
        if self.pool.capacity == 0 {
            bail!("pool.capacity must be greater than 0");
        }
        // A 2-byte status PDU or a 5-byte control PDU must fit
        if self.pool.buffer_size < 16 {
            bail!("pool.buffer_size of {} bytes is too small", self.pool.buffer_size);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = StackConfig::from_toml_str("").unwrap();
        assert_eq!(config.rrc.sib_search_interval_ms, 100);
        assert_eq!(config.rrc.sync_settle_ms, 10);
        assert!(config.rrc.honor_reject_wait_time);
        assert_eq!(config.pdcp.max_count, u32::MAX);
        assert_eq!(config.pool.buffer_size, MAX_BUFFER_SIZE_BYTES);
    }

    #[test]
    fn test_partial_sections() {
        let config = StackConfig::from_toml_str(
            r#"
            [rrc]
            honor_reject_wait_time = false

            [pool]
            capacity = 64
            "#,
        )
        .unwrap();
        assert!(!config.rrc.honor_reject_wait_time);
        assert_eq!(config.rrc.sib_search_interval_ms, 100);
        assert_eq!(config.pool.capacity, 64);
        assert_eq!(config.pool.buffer_size, MAX_BUFFER_SIZE_BYTES);
    }

    #[test]
    fn test_validation() {
        assert!(StackConfig::from_toml_str("[rrc]\nsib_search_interval_ms = 0").is_err());
        assert!(StackConfig::from_toml_str("[pdcp]\nmax_count = 0").is_err());
        assert!(StackConfig::from_toml_str("[pool]\nbuffer_size = 4").is_err());
        assert!(StackConfig::from_toml_str("[rrc]\nsib_search_interval_ms = \"fast\"").is_err());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("ue_stack_config_{}.toml", std::process::id()));
        std::fs::write(&path, "[pdcp]\nmax_count = 32\n").unwrap();
        let config = StackConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.pdcp.max_count, 32);

        assert!(StackConfig::from_file("/nonexistent/ue_stack.toml").is_err());
    }
}
