//! Configuration presets for common scenarios

use super::{Config, DisplayConfig, Format, Writer};

impl Config {
    /// Create configuration from environment variables
    ///
    /// Level comes from `RANGEPOOL_LOG`, falling back to `RUST_LOG`; format
    /// from `RANGEPOOL_LOG_FORMAT` (`pretty`, `json`, anything else compact).
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("RANGEPOOL_LOG") {
            config.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            config.level = level;
        }

        if let Ok(format) = std::env::var("RANGEPOOL_LOG_FORMAT") {
            config.format = match format.to_lowercase().as_str() {
                "pretty" => Format::Pretty,
                "json" => Format::Json,
                _ => Format::Compact,
            };
        }

        config
    }

    /// Development configuration (pretty, debug level)
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: Format::Pretty,
            display: DisplayConfig {
                colors: true,
                source: true,
                ..DisplayConfig::default()
            },
            ..Self::default()
        }
    }

    /// Production configuration (JSON, info level)
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Json,
            display: DisplayConfig {
                colors: false,
                source: false,
                ..DisplayConfig::default()
            },
            ..Self::default()
        }
    }

    /// Test configuration (captured by libtest)
    #[must_use]
    pub fn test() -> Self {
        Self {
            level: "debug".to_string(),
            format: Format::Compact,
            writer: Writer::Test,
            display: DisplayConfig {
                colors: false,
                ..DisplayConfig::default()
            },
            service: None,
        }
    }
}
