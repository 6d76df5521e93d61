//! Installs the global `tracing` subscriber of the binaries.

use anyhow::anyhow;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Builds the filter from `RUST_LOG`, falling back to `default_directive` if it is unset or
/// invalid.
///
/// # Errors
///
/// Returns an error if `default_directive` is not a valid filter either.
pub fn env_filter(default_directive: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .map_err(|err| anyhow!("invalid log filter {default_directive:?}: {err}"))
}

/// Logs formatted events to stderr, filtered by [`env_filter`].
///
/// # Errors
///
/// Returns an error if the filter is invalid or a global subscriber is already installed.
pub fn init_tracing(default_directive: &str) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(default_directive)?)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}
