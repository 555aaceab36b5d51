use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. `RUST_LOG` takes precedence over
/// `default_filter`. Returns `false` when a global subscriber was already set,
/// in which case the existing one stays in place.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    match tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        Ok(()) => true,
        Err(err) => {
            debug!(error = %err, "tracing subscriber already installed; keeping it");
            false
        }
    }
}

#[cfg(test)]
#[path = "tests/telemetry_tests.rs"]
mod tests;
