//! End-to-end pipeline tests without the network: a processing worker pool
//! and the deduplicating sink wired over real bounded channels.

use std::thread;

use wayline_cdx::filter::ExtFilter;
use wayline_cdx::transform::OutputMode;
use wayline_cdx::worker;
use wayline_core::progress::ProgressContext;
use wayline_core::sink::DedupSink;

/// Feed `records` through a pool of processing workers into a dedup sink,
/// returning the unique lines in the order they were written.
fn run_pipeline(
    records: Vec<String>,
    filter: Option<ExtFilter>,
    mode: OutputMode,
    workers: usize,
) -> Vec<String> {
    let (record_tx, record_rx) = crossbeam_channel::bounded::<String>(8);
    let (result_tx, result_rx) = crossbeam_channel::bounded::<String>(8);
    let progress = ProgressContext::new();

    thread::scope(|s| {
        let sink_handle = s.spawn(|| {
            let mut sink = DedupSink::new(Vec::new(), None).unwrap();
            let mut written = Vec::new();
            for line in result_rx {
                let before = sink.unique();
                sink.accept(line.clone(), &progress).unwrap();
                if sink.unique() > before {
                    written.push(line);
                }
            }
            written
        });

        let proc_handles: Vec<_> = (0..workers)
            .map(|_| {
                let rx = record_rx.clone();
                let tx = result_tx.clone();
                let filter = filter.as_ref();
                s.spawn(move || worker::process_records(&rx, &tx, filter, mode))
            })
            .collect();
        drop(record_rx);
        drop(result_tx);

        // Bounded send blocks when the pool lags, the same backpressure the
        // fetch workers see.
        for r in records {
            record_tx.send(r).unwrap();
        }
        drop(record_tx);

        for h in proc_handles {
            h.join().unwrap();
        }
        sink_handle.join().unwrap()
    })
}

fn lines(records: &[&str]) -> Vec<String> {
    records.iter().map(|s| s.to_string()).collect()
}

#[test]
fn output_is_free_of_duplicates() {
    let out = run_pipeline(
        lines(&[
            "https://a.example/one",
            "https://a.example/two",
            "https://a.example/one",
            "https://a.example/one",
            "https://a.example/three",
            "https://a.example/two",
        ]),
        None,
        OutputMode::Full,
        4,
    );
    assert_eq!(out.len(), 3);
    let mut dedup = out.clone();
    dedup.sort();
    dedup.dedup();
    assert_eq!(dedup.len(), 3);
}

#[test]
fn query_keys_dedupe_across_the_run() {
    // a=1&b=2&a=3 yields keys a, b, a; the sink collapses to first-seen a, b
    let out = run_pipeline(
        lines(&["https://x.example/p?a=1&b=2&a=3"]),
        None,
        OutputMode::QueryKeys,
        1,
    );
    assert_eq!(out, vec!["a", "b"]);
}

#[test]
fn excluded_extensions_never_reach_the_sink() {
    let filter = ExtFilter::compile("", "js,png").unwrap();
    let out = run_pipeline(
        lines(&[
            "https://a.example/app.JS",
            "https://a.example/api/users",
            "https://a.example/logo.png",
        ]),
        filter,
        OutputMode::Full,
        2,
    );
    assert_eq!(out, vec!["https://a.example/api/users"]);
}

#[test]
fn many_workers_emit_every_unique_line_once() {
    // Ordering across workers is not guaranteed; the set must be complete.
    let records: Vec<String> = (0..200)
        .map(|i| format!("https://a.example/page/{}", i % 50))
        .collect();
    let out = run_pipeline(records, None, OutputMode::Full, 8);
    assert_eq!(out.len(), 50);
    let mut dedup = out;
    dedup.sort();
    dedup.dedup();
    assert_eq!(dedup.len(), 50);
}

#[test]
fn pipeline_handles_empty_input() {
    let out = run_pipeline(Vec::new(), None, OutputMode::Full, 3);
    assert!(out.is_empty());
}
