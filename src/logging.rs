//! Logging setup.
//!
//! Logs go to stderr so answers on stdout stay clean. `RUST_LOG` overrides
//! the configured level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::domain::error::FundchatError;

pub const DEFAULT_LEVEL: &str = "warn";

/// Build the filter from `RUST_LOG`, falling back to `level`.
pub fn filter(level: &str) -> Result<EnvFilter, FundchatError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| FundchatError::ConfigInvalid {
        section: "logging".to_string(),
        key: "level".to_string(),
        reason: e.to_string(),
    })
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(level: &str) -> Result<(), FundchatError> {
    let filter = filter(level)?;
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
    Ok(())
}

/// Initialize logging for tests (captured by the test harness).
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
