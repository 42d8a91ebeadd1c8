//! Tracing subscriber setup for hosts.
//!
//! The engine emits structured `tracing` events (phase transitions,
//! computation milestones). Hosts that have no subscriber of their own can
//! install the default one here; `RUST_LOG` overrides the chosen level.

use tracing_subscriber::EnvFilter;

/// Install a compact stderr subscriber.
///
/// `verbose` raises the default level from `info` to `debug`. Returns
/// quietly if a global subscriber is already set, so embedding hosts keep
/// their own.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("canopysurvey={}", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
