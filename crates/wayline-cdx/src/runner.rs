//! Run orchestration: page count, pool wiring, shutdown ordering

use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use wayline_core::progress::ProgressContext;
use wayline_core::{DedupSink, PageCursor, SinkSummary};

use crate::api::{self, PageCount};
use crate::config::Config;
use crate::filter::ExtFilter;
use crate::pattern::IndexPattern;
use crate::worker::{self, FetchStats, ProcessStats};

/// Buffer depth for the record and results channels. Deep enough to smooth
/// per-page bursts; shallow enough that a stalled stage caps memory.
const STAGE_QUEUE_DEPTH: usize = 4096;

/// Totals for a completed run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub total_pages: usize,
    pub pages_ok: usize,
    pub pages_failed: usize,
    /// Raw records scanned out of fetched pages
    pub records: usize,
    /// Lines produced by filtering/transforming, duplicates included
    pub lines: usize,
    /// Unique lines written
    pub unique: usize,
    pub elapsed: Duration,
}

/// Execute one harvesting run.
///
/// Fatal errors (unreachable index for the page count, invalid extension
/// filter, unusable output file) come back as `Err` before any pipeline
/// work; everything past that point is contained per page.
pub fn run(config: &Config, progress: &ProgressContext) -> anyhow::Result<RunSummary> {
    let start = Instant::now();
    let pattern = IndexPattern::normalize(&config.pattern);

    let filter = ExtFilter::compile(&config.include_ext, &config.exclude_ext)
        .context("Invalid extension filter")?;

    log::debug!("Querying page count for {pattern}");
    let reported = api::page_count(&pattern, config.timeout)
        .map_err(|e| anyhow::anyhow!("Cannot reach the index for a page count: {e}"))?;
    let total_pages = match reported {
        PageCount::Empty | PageCount::Pages(0) => {
            log::info!("{pattern}: the index reports no history");
            return Ok(RunSummary {
                elapsed: start.elapsed(),
                ..RunSummary::default()
            });
        }
        PageCount::Pages(n) => n,
        PageCount::Unparseable(line) => {
            log::warn!("Unparseable page count {line:?}, assuming a single page");
            1
        }
    };

    let fetchers = config.fetchers.clamp(1, total_pages);
    let workers = config.workers.max(1);
    log::debug!("{total_pages} pages, {fetchers} fetchers, {workers} processors");

    let pages = PageCursor::new(total_pages);
    let bar = progress.pipeline_bar(total_pages);
    let (record_tx, record_rx) = crossbeam_channel::bounded::<String>(STAGE_QUEUE_DEPTH);
    let (result_tx, result_rx) = crossbeam_channel::bounded::<String>(STAGE_QUEUE_DEPTH);

    let sink = DedupSink::to_stdout(config.output_file.as_deref())
        .context("Cannot create the output file")?;

    let scope_result: anyhow::Result<(FetchStats, ProcessStats, SinkSummary)> =
        thread::scope(|s| {
            // Single consumer; must outlive every producer. Write failures
            // stop the writing but the drain continues, so no producer can
            // block forever on a full channel.
            let sink_handle = s.spawn(move || {
                let mut sink = sink;
                let mut broken = false;
                for line in result_rx {
                    if broken {
                        continue;
                    }
                    if let Err(e) = sink.accept(line, progress) {
                        if e.kind() != std::io::ErrorKind::BrokenPipe {
                            log::error!("Write failed: {e}");
                        }
                        broken = true;
                    }
                }
                sink.finalize()
            });

            let proc_handles: Vec<_> = (0..workers)
                .map(|_| {
                    let rx = record_rx.clone();
                    let tx = result_tx.clone();
                    let filter = filter.as_ref();
                    let mode = config.mode;
                    s.spawn(move || worker::process_records(&rx, &tx, filter, mode))
                })
                .collect();

            let fetch_handles: Vec<_> = (0..fetchers)
                .map(|_| {
                    let tx = record_tx.clone();
                    let (pages, pattern, bar) = (&pages, &pattern, &bar);
                    let timeout = config.timeout;
                    s.spawn(move || worker::fetch_pages(pages, pattern, timeout, &tx, progress, bar))
                })
                .collect();

            // The close protocol: only the workers hold senders now. When
            // the fetchers finish the record channel closes, the processors
            // drain and finish, the results channel closes, and the sink
            // drains out.
            drop(record_rx);
            drop(record_tx);
            drop(result_tx);

            let mut fetch = FetchStats::default();
            for h in fetch_handles {
                let st = h.join().expect("fetch worker panicked");
                fetch.pages_ok += st.pages_ok;
                fetch.pages_failed += st.pages_failed;
                fetch.records += st.records;
            }
            let mut processed = ProcessStats::default();
            for h in proc_handles {
                let st = h.join().expect("processing worker panicked");
                processed.records_in += st.records_in;
                processed.lines_out += st.lines_out;
            }
            let sink_summary = sink_handle
                .join()
                .expect("sink thread panicked")
                .context("Finalizing output failed")?;

            Ok((fetch, processed, sink_summary))
        });
    let (fetch, processed, sink_summary) = scope_result?;

    progress.finish(&bar);

    if fetch.pages_failed > 0 {
        log::warn!(
            "{} of {total_pages} pages failed after retries and were skipped",
            fetch.pages_failed
        );
    }

    Ok(RunSummary {
        total_pages,
        pages_ok: fetch.pages_ok,
        pages_failed: fetch.pages_failed,
        records: fetch.records,
        lines: processed.lines_out,
        unique: sink_summary.unique,
        elapsed: start.elapsed(),
    })
}
