//! Per-record filtering and output-shape transformation.
//!
//! Pure and deterministic: one raw index line in, zero or more output lines
//! out. A line that does not parse as a URL is not an error: the whole line
//! doubles as the path for extension filtering, and the query-dependent
//! shapes simply emit nothing for it.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::filter::ExtFilter;

/// Output shape for surviving records. Exactly one is active per run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Emit the original line unchanged
    #[default]
    Full,
    /// Emit the raw query string verbatim, when non-empty
    QueryOnly,
    /// Emit each percent-decoded query parameter key on its own line
    QueryKeys,
    /// Emit the URL with its query (and fragment) removed
    StripQuery,
}

/// Filter and transform one raw record, appending results to `out`.
pub fn process_record(
    raw: &str,
    filter: Option<&ExtFilter>,
    mode: OutputMode,
    out: &mut Vec<String>,
) {
    let line = raw.trim();
    if line.is_empty() {
        return;
    }

    let parsed = Url::parse(line).ok();
    let path = match parsed.as_ref().map(Url::path) {
        Some(p) if !p.is_empty() => p,
        _ => line,
    };

    if let Some(f) = filter {
        if !f.keeps(path) {
            return;
        }
    }

    match mode {
        OutputMode::Full => out.push(line.to_string()),
        OutputMode::QueryOnly => {
            if let Some(q) = parsed.as_ref().and_then(Url::query) {
                if !q.is_empty() {
                    out.push(q.to_string());
                }
            }
        }
        OutputMode::QueryKeys => {
            if let Some(q) = parsed.as_ref().and_then(Url::query) {
                push_query_keys(q, out);
            }
        }
        OutputMode::StripQuery => match parsed {
            Some(mut u) => {
                u.set_query(None);
                u.set_fragment(None);
                out.push(u.into());
            }
            // Nothing to strip from a line that is not a URL
            None => out.push(line.to_string()),
        },
    }
}

/// Split a raw query into parameter keys.
///
/// Raw segment splitting on `&`/`;`, not structured parsing: repeated keys
/// and malformed-but-present fragments are preserved in order of appearance.
/// Keys that percent-decode to the empty string are skipped.
fn push_query_keys(query: &str, out: &mut Vec<String>) {
    for segment in query.split(['&', ';']) {
        if segment.is_empty() {
            continue;
        }
        let key = segment.split('=').next().unwrap_or(segment);
        let key = percent_decode_str(key).decode_utf8_lossy();
        if !key.is_empty() {
            out.push(key.into_owned());
        }
    }
}
