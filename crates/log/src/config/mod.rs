//! Logger configuration

mod presets;

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::{TestWriter, writer::BoxMakeWriter};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level filter (e.g., "info", "debug,rangepool_storage=warn")
    pub level: String,

    /// Output format
    pub format: Format,

    /// Output destination
    pub writer: Writer,

    /// Display options
    pub display: DisplayConfig,

    /// Service name recorded on a root span, if set
    pub service: Option<String>,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Human-readable, multi-line
    Pretty,
    /// Compact single-line output
    Compact,
    /// Structured JSON output
    Json,
}

/// Output destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Writer {
    /// Standard error
    Stderr,
    /// Standard output
    Stdout,
    /// libtest output capture
    Test,
}

impl Writer {
    pub(crate) fn make_writer(self) -> BoxMakeWriter {
        match self {
            Self::Stderr => BoxMakeWriter::new(std::io::stderr),
            Self::Stdout => BoxMakeWriter::new(std::io::stdout),
            Self::Test => BoxMakeWriter::new(TestWriter::new()),
        }
    }
}

/// Display options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// ANSI colors
    pub colors: bool,
    /// Event target (module path)
    pub target: bool,
    /// Source file and line
    pub source: bool,
    /// Thread IDs
    pub thread_ids: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            colors: true,
            target: true,
            source: false,
            thread_ids: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Compact,
            writer: Writer::Stderr,
            display: DisplayConfig::default(),
            service: None,
        }
    }
}
