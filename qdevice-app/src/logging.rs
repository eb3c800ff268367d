//! Subscriber installation.
//!
//! Filter precedence is `RUST_LOG`, then the configured directives, then
//! [`DEFAULT_FILTER`].

use tracing_subscriber::EnvFilter;

/// Directives used when neither `RUST_LOG` nor the config supplies any.
pub const DEFAULT_FILTER: &str = "info";

/// Build the filter: `RUST_LOG` wins, then `configured`, then [`DEFAULT_FILTER`].
pub fn env_filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global fmt subscriber. Later calls are ignored.
pub fn init(configured: Option<&str>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(configured))
        .with_writer(std::io::stderr)
        .try_init();
}
