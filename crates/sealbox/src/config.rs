//! Configuration loading and validation.
//!
//! Values are read from `SEALBOX_`-prefixed environment variables. Every field
//! has a default, so an empty environment yields a valid configuration.

use anyhow::{Context, Result};
use config::builder::{ConfigBuilder, DefaultState};
use serde::Deserialize;

use crate::audit::{AuditConfig, DEFAULT_BLOCK_SIZE};
use crate::crypto::{Sealer, DEFAULT_MAX_PLAINTEXT_LEN};

/// Environment variable prefix, e.g. `SEALBOX_MAX_PLAINTEXT_LEN`.
pub const ENV_PREFIX: &str = "SEALBOX";

/// Largest block size the audit accepts.
const MAX_AUDIT_BLOCK_SIZE: usize = 256;

/// Validated configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Largest plaintext (and ciphertext) a [`Sealer`] will process.
    #[serde(default = "default_max_plaintext_len")]
    pub max_plaintext_len: usize,

    /// Block size used by the repeated-block audit.
    #[serde(default = "default_audit_block_size")]
    pub audit_block_size: usize,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX).try_parsing(true)
}

fn default_max_plaintext_len() -> usize {
    DEFAULT_MAX_PLAINTEXT_LEN
}
fn default_audit_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_plaintext_len: default_max_plaintext_len(),
            audit_block_size: default_audit_block_size(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Config::builder().add_source(env_source()))
    }

    fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let cfg = builder
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.max_plaintext_len == 0 {
            anyhow::bail!("SEALBOX_MAX_PLAINTEXT_LEN must be > 0");
        }
        if self.audit_block_size == 0 || self.audit_block_size > MAX_AUDIT_BLOCK_SIZE {
            anyhow::bail!("SEALBOX_AUDIT_BLOCK_SIZE must be between 1 and {MAX_AUDIT_BLOCK_SIZE}");
        }
        if self.log_level.trim().is_empty() {
            anyhow::bail!("SEALBOX_LOG_LEVEL must not be empty");
        }
        Ok(())
    }

    /// A [`Sealer`] enforcing the configured plaintext limit.
    pub fn sealer(&self) -> Sealer {
        Sealer::new(self.max_plaintext_len)
    }

    /// Audit parameters from this configuration.
    pub fn audit(&self) -> AuditConfig {
        AuditConfig {
            block_size: self.audit_block_size,
        }
    }
}
