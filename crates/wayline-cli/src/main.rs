//! wayline - stream the historical URL inventory for a site pattern
//!
//! Queries the Wayback Machine CDX index page by page, filters and reshapes
//! each record through a worker pool, and streams unique results to stdout
//! with a live progress line that never touches piped data.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use wayline_cdx::{OutputMode, RunSummary};
use wayline_core::progress::fmt_num;

mod config;

use config::FileConfig;

#[derive(Parser)]
#[command(name = "wayline")]
#[command(about = "Stream every URL the Wayback Machine has seen for a site pattern")]
#[command(version)]
struct Cli {
    /// Target URL pattern (e.g. *.example.com)
    #[arg(short, long)]
    url: String,

    /// Also write results to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output only full query strings
    #[arg(long, group = "shape")]
    only_query: bool,

    /// Output each query parameter key on its own line
    #[arg(long, group = "shape")]
    only_query_keys: bool,

    /// Remove query strings from URLs
    #[arg(long, group = "shape")]
    no_query: bool,

    /// Comma-separated extensions to exclude (defaults to common static assets)
    #[arg(long)]
    exclude_ext: Option<String>,

    /// Comma-separated extensions to include (overrides any exclude list)
    #[arg(long)]
    include_ext: Option<String>,

    /// Concurrent page fetches
    #[arg(long)]
    fetchers: Option<usize>,

    /// Concurrent record-processing workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// HTTP timeout per request, in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Config file path (default: ./wayline.toml or ~/.config/wayline/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        if self.only_query {
            OutputMode::QueryOnly
        } else if self.only_query_keys {
            OutputMode::QueryKeys
        } else if self.no_query {
            OutputMode::StripQuery
        } else {
            OutputMode::Full
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Progress context (TTY auto-detect)
    let progress = Arc::new(wayline_core::ProgressContext::new());

    // Logging:
    //   TTY:     quiet (warn) unless --debug  (the bar shows activity)
    //   non-TTY: info unless --debug          (logs are the only progress indicator)
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = is_tty && !cli.debug;
    wayline_core::init_logging(quiet, cli.debug, multi);

    let file_config = match &cli.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::load()?,
    };

    let run_config = wayline_cdx::Config {
        pattern: cli.url.clone(),
        output_file: cli.output.clone(),
        mode: cli.output_mode(),
        include_ext: cli.include_ext.clone().unwrap_or_default(),
        exclude_ext: cli
            .exclude_ext
            .clone()
            .unwrap_or(file_config.filter.exclude_ext),
        fetchers: cli.fetchers.unwrap_or(file_config.workers.fetchers),
        workers: cli.workers.unwrap_or(file_config.workers.processors),
        timeout: Duration::from_secs(cli.timeout.unwrap_or(file_config.http.timeout)),
    };

    let summary = wayline_cdx::run(&run_config, &progress)?;

    if is_tty {
        print_summary(&summary);
    } else {
        log::info!(
            "{} unique lines from {} records across {}/{} pages ({} failed) in {:.1}s",
            summary.unique,
            summary.records,
            summary.pages_ok,
            summary.total_pages,
            summary.pages_failed,
            summary.elapsed.as_secs_f64()
        );
    }

    Ok(())
}

/// Print a key-value run summary table on stderr
fn print_summary(summary: &RunSummary) {
    use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Run").fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    table.add_row(vec![
        "Pages".to_string(),
        format!(
            "{}/{} ({} failed)",
            summary.pages_ok, summary.total_pages, summary.pages_failed
        ),
    ]);
    table.add_row(vec!["Records".to_string(), fmt_num(summary.records)]);
    table.add_row(vec!["Result lines".to_string(), fmt_num(summary.lines)]);
    table.add_row(vec!["Unique written".to_string(), fmt_num(summary.unique)]);
    table.add_row(vec![
        "Time".to_string(),
        format!("{:.1}s", summary.elapsed.as_secs_f64()),
    ]);

    eprintln!("\n{table}");
}
