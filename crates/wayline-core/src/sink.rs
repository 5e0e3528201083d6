//! Streaming deduplicating sink for pipeline results

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::progress::ProgressContext;

/// Totals reported by [`DedupSink::finalize`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SinkSummary {
    /// Lines that reached the sink, duplicates included
    pub received: usize,
    /// Lines actually written
    pub unique: usize,
}

/// Single-consumer sink that suppresses lines already emitted this run and
/// writes survivors immediately, in first-seen order.
///
/// The seen-set is owned here exclusively; no other stage touches it, so it
/// needs no lock. An optional copy file receives the identical byte stream.
pub struct DedupSink<W: Write> {
    seen: FxHashSet<String>,
    primary: W,
    copy: Option<(BufWriter<File>, PathBuf)>,
    received: usize,
}

impl<W: Write> std::fmt::Debug for DedupSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DedupSink")
            .field("received", &self.received)
            .field("unique", &self.seen.len())
            .finish_non_exhaustive()
    }
}

impl DedupSink<io::Stdout> {
    /// Sink writing to stdout, optionally duplicating to `copy_path`.
    pub fn to_stdout(copy_path: Option<&Path>) -> io::Result<Self> {
        Self::new(io::stdout(), copy_path)
    }
}

impl<W: Write> DedupSink<W> {
    pub fn new(primary: W, copy_path: Option<&Path>) -> io::Result<Self> {
        let copy = match copy_path {
            Some(path) => {
                let file = File::create(path)?;
                Some((BufWriter::new(file), path.to_path_buf()))
            }
            None => None,
        };
        Ok(Self {
            seen: FxHashSet::default(),
            primary,
            copy,
            received: 0,
        })
    }

    /// Accept one result line: discard silently if already emitted this run,
    /// otherwise write it out immediately.
    ///
    /// The write happens inside the reporter's suspend window: progress line
    /// cleared before, redrawn after the flush.
    pub fn accept(&mut self, line: String, progress: &ProgressContext) -> io::Result<()> {
        self.received += 1;
        if self.seen.contains(&line) {
            return Ok(());
        }
        let primary = &mut self.primary;
        let copy = &mut self.copy;
        progress.suspend(|| -> io::Result<()> {
            writeln!(primary, "{line}")?;
            primary.flush()?;
            if let Some((file, _)) = copy {
                writeln!(file, "{line}")?;
            }
            Ok(())
        })?;
        self.seen.insert(line);
        Ok(())
    }

    /// Unique lines emitted so far
    pub fn unique(&self) -> usize {
        self.seen.len()
    }

    /// Flush and close the copy file if one is open, then report totals.
    pub fn finalize(mut self) -> io::Result<SinkSummary> {
        if let Some((mut file, path)) = self.copy.take() {
            file.flush()?;
            log::info!("Saved a copy of the results to {}", path.display());
        }
        Ok(SinkSummary {
            received: self.received,
            unique: self.seen.len(),
        })
    }
}
