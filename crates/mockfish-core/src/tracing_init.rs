//! Tracing/logging initialization for the server binary.
//!
//! Sets up `tracing_subscriber` with an env-filter and optional JSON output.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise the global tracing subscriber.
///
/// * `default_filter` -- filter used when `RUST_LOG` is unset or unparsable
///   (e.g. `"mockfish_server=info,tower_http=info"`).
/// * `log_json` -- emit one JSON object per line instead of the
///   human-readable format.
///
/// Fails when a global subscriber is already installed.
pub fn init_tracing(default_filter: &str, log_json: bool) -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(env_filter);
    if log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    }
}
