//! Tracing initialization (§7 "Logging").

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initializes the global `tracing` subscriber: an `RUST_LOG`-filtered
/// `fmt` layer, falling back to `level` when `RUST_LOG` isn't set.
///
/// Mirrors the teacher's `init_tracing`, minus the OpenTelemetry layer —
/// this binary has no network API to export spans to (§6 Non-goals).
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
