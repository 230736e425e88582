//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Build the filter: `RUST_LOG` wins, `fallback` otherwise.
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Initialize JSON tracing output for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops). Revaluation
/// decisions are logged under the `stockcost_inventory` target, so e.g.
/// `RUST_LOG=info,stockcost_inventory=debug` shows skipped lines and layer
/// restores.
pub fn init(fallback: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(fallback))
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .try_init();
}
