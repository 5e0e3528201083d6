//! Fetch and processing worker loops

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use indicatif::ProgressBar;
use wayline_core::progress::{ProgressContext, StatusLevel};
use wayline_core::{PageCursor, retry};

use crate::api;
use crate::filter::ExtFilter;
use crate::pattern::IndexPattern;
use crate::transform::{self, OutputMode};

/// Per-worker fetch totals, summed by the runner after join.
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchStats {
    pub pages_ok: usize,
    pub pages_failed: usize,
    pub records: usize,
}

/// Fetch worker loop: claim pages from the cursor until it is exhausted.
///
/// Each page gets up to [`retry::MAX_ATTEMPTS`] attempts with linear
/// backoff; a page that still fails is skipped with an error-level status,
/// never fatal. Raw lines are trimmed and pushed onto the record channel;
/// the send blocks when the channel is full, which is the backpressure that
/// stalls fetchers behind a slow downstream stage.
pub fn fetch_pages(
    pages: &PageCursor,
    pattern: &IndexPattern,
    timeout: Duration,
    records: &Sender<String>,
    progress: &ProgressContext,
    bar: &ProgressBar,
) -> FetchStats {
    let mut stats = FetchStats::default();
    while let Some(page) = pages.next() {
        let result = retry::with_retries(
            || api::fetch_page(pattern, page, timeout),
            |attempt, err| {
                progress.status(
                    bar,
                    StatusLevel::Warn,
                    &format!(
                        "page {page}: attempt {attempt}/{} failed: {err}",
                        retry::MAX_ATTEMPTS
                    ),
                );
            },
        );
        match result {
            Ok(body) => {
                stats.pages_ok += 1;
                for line in body.lines() {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    stats.records += 1;
                    if records.send(line.to_string()).is_err() {
                        // downstream hung up; no point fetching more pages
                        bar.inc(1);
                        return stats;
                    }
                }
            }
            Err(err) => {
                stats.pages_failed += 1;
                progress.status(
                    bar,
                    StatusLevel::Error,
                    &format!(
                        "page {page}: giving up after {} attempts: {err}",
                        retry::MAX_ATTEMPTS
                    ),
                );
            }
        }
        // Counted exactly once per claimed page, success or not
        bar.inc(1);
    }
    stats
}

/// Per-worker processing totals.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessStats {
    pub records_in: usize,
    pub lines_out: usize,
}

/// Processing worker loop: drain raw records until the channel closes.
///
/// Pure per-record work, no retries; a record that produces no output lines
/// is simply dropped.
pub fn process_records(
    records: &Receiver<String>,
    results: &Sender<String>,
    filter: Option<&ExtFilter>,
    mode: OutputMode,
) -> ProcessStats {
    let mut stats = ProcessStats::default();
    let mut out = Vec::new();
    for raw in records {
        stats.records_in += 1;
        transform::process_record(&raw, filter, mode, &mut out);
        stats.lines_out += out.len();
        for line in out.drain(..) {
            if results.send(line).is_err() {
                return stats;
            }
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_worker_drains_until_close() {
        let (record_tx, record_rx) = crossbeam_channel::bounded::<String>(16);
        let (result_tx, result_rx) = crossbeam_channel::bounded::<String>(16);

        record_tx.send("https://a.example/x?k=1".to_string()).unwrap();
        record_tx.send("https://a.example/pic.png".to_string()).unwrap();
        record_tx.send("https://a.example/y".to_string()).unwrap();
        drop(record_tx);

        let filter = ExtFilter::compile("", "png").unwrap();
        let stats = process_records(&record_rx, &result_tx, filter.as_ref(), OutputMode::Full);
        drop(result_tx);

        assert_eq!(stats.records_in, 3);
        assert_eq!(stats.lines_out, 2);
        let lines: Vec<String> = result_rx.iter().collect();
        assert_eq!(lines, vec!["https://a.example/x?k=1", "https://a.example/y"]);
    }

    #[test]
    fn process_worker_fans_out_query_keys() {
        let (record_tx, record_rx) = crossbeam_channel::bounded::<String>(4);
        let (result_tx, result_rx) = crossbeam_channel::bounded::<String>(16);

        record_tx
            .send("https://a.example/p?a=1&b=2&a=3".to_string())
            .unwrap();
        drop(record_tx);

        let stats = process_records(&record_rx, &result_tx, None, OutputMode::QueryKeys);
        drop(result_tx);

        assert_eq!(stats.records_in, 1);
        assert_eq!(stats.lines_out, 3);
        let lines: Vec<String> = result_rx.iter().collect();
        assert_eq!(lines, vec!["a", "b", "a"]);
    }

    #[test]
    fn process_worker_stops_when_results_hung_up() {
        let (record_tx, record_rx) = crossbeam_channel::bounded::<String>(4);
        let (result_tx, result_rx) = crossbeam_channel::bounded::<String>(4);
        drop(result_rx);

        record_tx.send("https://a.example/x".to_string()).unwrap();
        drop(record_tx);

        let stats = process_records(&record_rx, &result_tx, None, OutputMode::Full);
        assert_eq!(stats.records_in, 1);
    }
}
