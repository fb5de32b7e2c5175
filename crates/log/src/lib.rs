//! # Rangepool Log
//!
//! Subscriber bootstrap for processes embedding the range pool.
//!
//! ```ignore
//! fn main() -> rangepool_log::LogResult<()> {
//!     let _guard = rangepool_log::auto_init()?;
//!
//!     rangepool_log::info!(namespace = "vlan", "allocator starting");
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;

pub use builder::{LoggerBuilder, LoggerGuard};
pub use config::{Config, DisplayConfig, Format, Writer};

// Re-export tracing macros
pub use tracing::{debug, error, info, instrument, span, trace, warn};

/// Result type for logger operations
pub type LogResult<T> = Result<T, LogError>;

/// Error type for logger operations
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Filter directive could not be parsed
    #[error("Invalid filter: {0}")]
    Filter(String),

    /// A global subscriber is already installed
    #[error("Logger initialization failed: {0}")]
    Init(String),
}

// ============================================================================
// Initialization Functions
// ============================================================================

/// Pick a configuration from the environment and build profile
///
/// `RANGEPOOL_LOG` or `RUST_LOG` select [`Config::from_env`]; otherwise debug
/// builds use [`Config::development`] and release builds
/// [`Config::production`].
pub fn auto_init() -> LogResult<LoggerGuard> {
    if std::env::var("RANGEPOOL_LOG").is_ok() || std::env::var("RUST_LOG").is_ok() {
        init_with(Config::from_env())
    } else if cfg!(debug_assertions) {
        init_with(Config::development())
    } else {
        init_with(Config::production())
    }
}

/// Initialize with default configuration
pub fn init() -> LogResult<LoggerGuard> {
    init_with(Config::default())
}

/// Initialize with custom configuration
pub fn init_with(config: Config) -> LogResult<LoggerGuard> {
    LoggerBuilder::from_config(config).build()
}

/// Initialize for tests
///
/// Output goes through the libtest capture. Safe to call from every test:
/// once a subscriber is installed, later calls return a no-op guard.
pub fn init_test() -> LogResult<LoggerGuard> {
    if tracing::dispatcher::has_been_set() {
        return Ok(LoggerGuard::noop());
    }
    match init_with(Config::test()) {
        // Another test thread installed its subscriber first.
        Err(LogError::Init(_)) => Ok(LoggerGuard::noop()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_is_idempotent() {
        let _first = init_test().unwrap();
        let _second = init_test().unwrap();
        info!("logged after init");
    }

    #[test]
    fn test_invalid_filter_is_reported() {
        let config = Config {
            level: "info,rangepool=loud".to_string(),
            ..Config::test()
        };
        let err = init_with(config).unwrap_err();
        assert!(matches!(err, LogError::Filter(_)));
    }
}
