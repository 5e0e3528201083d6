//! Runtime configuration for a harvesting run

use std::path::PathBuf;
use std::time::Duration;

use crate::transform::OutputMode;

/// Everything the runner needs for one run. Assembled by the CLI crate from
/// flags and the optional config file; the runner treats it as read-only.
#[derive(Debug, Clone)]
pub struct Config {
    /// Raw user pattern; normalized by the runner
    pub pattern: String,
    /// Duplicate the output stream into this file
    pub output_file: Option<PathBuf>,
    pub mode: OutputMode,
    /// Comma-separated include extension list (overrides exclude when set)
    pub include_ext: String,
    /// Comma-separated exclude extension list
    pub exclude_ext: String,
    /// Concurrent page fetchers (clamped to the page count at runtime)
    pub fetchers: usize,
    /// Concurrent record-processing workers
    pub workers: usize,
    /// Per-request timeout
    pub timeout: Duration,
}
