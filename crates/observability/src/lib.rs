//! Process-wide tracing setup.

/// Subscriber settings and installation.
pub mod tracing;

pub use crate::tracing::{LogFormat, LogSettings};

/// Install the global subscriber using settings from the environment
/// (`RUST_LOG`, `SHOPFRONT_LOG_FORMAT`).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::install(&LogSettings::from_env());
}
