//! Logger builder implementation

// External dependencies
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// Internal crates
use crate::config::{Config, Format};
use crate::{LogError, LogResult};

/// Logger builder
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

/// Guard that keeps the logger's root span entered
///
/// Drop it on shutdown; events emitted afterwards are no longer attributed to
/// the service span.
#[derive(Debug)]
pub struct LoggerGuard {
    _root_span: Option<tracing::span::EnteredSpan>,
}

impl LoggerBuilder {
    /// Create builder from config
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Build and install the global subscriber
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Filter string cannot be parsed
    /// - A global subscriber is already installed
    pub fn build(self) -> LogResult<LoggerGuard> {
        let filter = EnvFilter::try_new(&self.config.level)
            .map_err(|e| LogError::Filter(format!("{}: {e}", self.config.level)))?;
        let display = &self.config.display;
        let writer = self.config.writer.make_writer();
        let registry = Registry::default().with(filter);

        let installed = match self.config.format {
            Format::Pretty => registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_ansi(display.colors)
                        .with_target(display.target)
                        .with_file(display.source)
                        .with_line_number(display.source)
                        .with_thread_ids(display.thread_ids)
                        .with_writer(writer),
                )
                .try_init(),
            Format::Compact => registry
                .with(
                    fmt::layer()
                        .compact()
                        .with_ansi(display.colors)
                        .with_target(display.target)
                        .with_file(display.source)
                        .with_line_number(display.source)
                        .with_thread_ids(display.thread_ids)
                        .with_writer(writer),
                )
                .try_init(),
            Format::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_ansi(false)
                        .with_target(display.target)
                        .with_file(display.source)
                        .with_line_number(display.source)
                        .with_thread_ids(display.thread_ids)
                        .with_writer(writer),
                )
                .try_init(),
        };
        installed.map_err(|e| LogError::Init(e.to_string()))?;

        let root_span = self
            .config
            .service
            .as_deref()
            .map(|service| tracing::info_span!("service", name = service).entered());

        Ok(LoggerGuard {
            _root_span: root_span,
        })
    }
}

impl LoggerGuard {
    pub(crate) fn noop() -> Self {
        Self { _root_span: None }
    }
}
