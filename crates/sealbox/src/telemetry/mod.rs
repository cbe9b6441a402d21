//! Structured logging setup.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the embedding application, which may call [`init_tracing`].
//!
//! # Telemetry invariants
//!
//! - **No key material, plaintext, or associated data** may appear in any event
//!   field. Events carry the envelope version, lengths, and error codes only.
//! - Log level comes from `RUST_LOG` if set, else the configured level.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialise the global tracing subscriber with JSON-formatted output.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(log_level: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .context("failed to initialise tracing subscriber")?;

    Ok(())
}
