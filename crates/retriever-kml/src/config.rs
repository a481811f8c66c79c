//! Run configuration
//!
//! A [`ReconcileConfig`] is built once at startup and passed to
//! [`crate::run`]; nothing about a run is held in process-wide state.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Input used when none is given on the command line
pub const DEFAULT_INPUT_FILE: &str = "~/Downloads/NC State-Owned_Lands.kml";

/// Output directory used when none is given on the command line
pub const DEFAULT_OUTPUT_PATH: &str = "~/fixed_kml/";

/// Extended data field whose value becomes each placemark's `<name>`
pub const DEFAULT_NAME_FIELD: &str = "ComplexNam";

/// Minimum severity written to the log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Progress messages (default)
    #[default]
    Info,
    /// Per-field detail
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" | "critical" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(format!(
                "unknown log level '{other}' (expected error, warn, info, debug or trace)"
            )),
        }
    }
}

/// Everything one reconciliation run needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// KML file to read
    pub input_path: PathBuf,
    /// Directory the fixed KML and the CSV are written to (created if missing)
    pub output_dir: PathBuf,
    /// Log verbosity
    pub log_level: LogLevel,
    /// Extended data field used as the placemark name
    pub name_field: String,
    /// Accepted from the command line but not used by reconciliation
    pub start_with: Option<u32>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_FILE, DEFAULT_OUTPUT_PATH)
    }
}

impl ReconcileConfig {
    /// Configuration with default name field and log level
    #[must_use = "creates a run configuration"]
    pub fn new(input_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_dir: output_dir.into(),
            log_level: LogLevel::default(),
            name_field: DEFAULT_NAME_FIELD.to_string(),
            start_with: None,
        }
    }

    /// Override the field placemark names are taken from
    #[must_use]
    pub fn with_name_field(mut self, name_field: impl Into<String>) -> Self {
        self.name_field = name_field.into();
        self
    }

    /// Override the log level
    #[must_use]
    pub const fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    /// Record the `--start-with` value
    #[must_use]
    pub const fn with_start_with(mut self, start_with: Option<u32>) -> Self {
        self.start_with = start_with;
        self
    }
}

/// Expand a leading `~` and make the path absolute against the working directory
///
/// # Errors
///
/// Returns an error if the working directory cannot be determined.
pub fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let expanded = expand_home(path);
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(std::env::current_dir()?.join(expanded))
    }
}

fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
