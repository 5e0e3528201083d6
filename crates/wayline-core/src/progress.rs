//! Progress reporting for TTY and non-TTY environments.
//!
//! TTY mode: one pipeline-wide indicatif bar on stderr, with a short
//! bracketed status message after the counters.
//! Non-TTY mode: the bar is hidden and status messages become log lines on
//! stderr, so piped stdout stays safe to redirect.

use std::fmt::Write as _;
use std::io::IsTerminal;
use std::sync::Arc;

use indicatif::{MultiProgress, ProgressBar, ProgressState, ProgressStyle};

/// Maximum rendered length of the bracketed status message
const MAX_STATUS_LEN: usize = 60;

/// Severity of a transient status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

fn status_color(level: StatusLevel) -> &'static str {
    match level {
        StatusLevel::Info => "\x1b[32m",
        StatusLevel::Warn => "\x1b[33m",
        StatusLevel::Error => "\x1b[31m",
    }
}

/// Pipeline bar: `#`/`.` glyphs, page counters, one-decimal percentage,
/// then the bracketed status message.
fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("[{bar:40.green/238}] {pos}/{len} ({pct}%) {msg}")
        .expect("invalid template")
        .with_key("pct", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
            let pct = (state.fraction() * 100.0).clamp(0.0, 100.0);
            let _ = write!(w, "{pct:.1}");
        })
        .progress_chars("##.")
}

/// Central progress context. The mode (interactive or not) is fixed at
/// construction and never revisited per call: off-TTY the bar handed out is
/// a hidden no-op object.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    /// Create new context, detecting TTY automatically.
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty: std::io::stderr().is_terminal(),
        }
    }

    /// The single bar tracking completed pages out of the fixed total.
    ///
    /// The bar owns the completed counter; `inc` from any worker is an
    /// atomic increment and a re-render, serialized internally.
    pub fn pipeline_bar(&self, total_pages: usize) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new(total_pages as u64));
        pb.set_style(bar_style());
        pb
    }

    /// Post a transient status message.
    ///
    /// TTY: shown bracketed after the bar, colorized by severity and
    /// truncated with an ellipsis when too long.
    /// Non-TTY: emitted as a discrete log line on stderr instead.
    pub fn status(&self, pb: &ProgressBar, level: StatusLevel, msg: &str) {
        if self.is_tty {
            pb.set_message(format!(
                "[{}{}\x1b[0m]",
                status_color(level),
                truncate_status(msg)
            ));
        } else {
            match level {
                StatusLevel::Info => log::info!("{msg}"),
                StatusLevel::Warn => log::warn!("{msg}"),
                StatusLevel::Error => log::error!("{msg}"),
            }
        }
    }

    /// Run `f` with the progress line cleared, redrawing afterwards.
    ///
    /// Result lines written to stdout go through here so data and the
    /// progress line never interleave on a shared terminal.
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        if self.is_tty { self.multi.suspend(f) } else { f() }
    }

    /// Print a line above the bar (stderr).
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.is_tty {
            let _ = self.multi.println(msg);
        } else {
            eprintln!("{}", msg.as_ref());
        }
    }

    /// Complete the bar: drop the stale status, move past the progress line
    /// and stop redrawing.
    pub fn finish(&self, pb: &ProgressBar) {
        pb.finish_with_message("");
    }

    /// Whether running in TTY mode.
    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// Get reference to `MultiProgress` for the log bridge.
    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe wrapper for `ProgressContext`.
pub type SharedProgress = Arc<ProgressContext>;

fn truncate_status(s: &str) -> String {
    if s.chars().count() <= MAX_STATUS_LEN {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(MAX_STATUS_LEN - 3).collect();
    cut.push_str("...");
    cut
}

/// Format number with thousand separators.
pub fn fmt_num(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
