//! CDX index queries

use std::time::Duration;

use url::Url;
use wayline_core::{FetchError, get_text};

use crate::pattern::IndexPattern;

/// Wayback Machine CDX search endpoint
const CDX_ENDPOINT: &str = "https://web.archive.org/cdx/search/cdx";

/// Page count reported by the index for a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCount {
    /// The index reports this many pages
    Pages(usize),
    /// Blank or absent body, meaning the pattern has no recorded history
    Empty,
    /// A first line was present but not a decimal integer
    Unparseable(String),
}

fn base_query(pattern: &IndexPattern) -> Url {
    let mut u = Url::parse(CDX_ENDPOINT).expect("endpoint URL is valid");
    u.query_pairs_mut().append_pair("url", pattern.as_str());
    u
}

/// Ask the index how many pages the pattern spans.
///
/// A transport or HTTP failure here is the one fatal error of a run; the
/// caller aborts before any pipeline work starts.
pub fn page_count(pattern: &IndexPattern, timeout: Duration) -> Result<PageCount, FetchError> {
    let mut u = base_query(pattern);
    u.query_pairs_mut().append_pair("showNumPages", "true");
    let body = get_text(u.as_str(), timeout)?;
    Ok(parse_page_count(&body))
}

/// First non-blank line of the body is the count; no such line means the
/// pattern has no history at all.
fn parse_page_count(body: &str) -> PageCount {
    match body.lines().map(str::trim).find(|l| !l.is_empty()) {
        None => PageCount::Empty,
        Some(line) => match line.parse::<usize>() {
            Ok(n) => PageCount::Pages(n),
            Err(_) => PageCount::Unparseable(line.to_string()),
        },
    }
}

/// URL for one page of records: canonical field only, index-side collapse
/// of adjacent identical keys (coarse dedup; the sink still does the exact
/// one).
pub fn page_url(pattern: &IndexPattern, page: usize) -> String {
    let mut u = base_query(pattern);
    u.query_pairs_mut()
        .append_pair("fl", "original")
        .append_pair("collapse", "urlkey")
        .append_pair("page", &page.to_string());
    u.into()
}

/// Fetch one page of newline-delimited records.
pub fn fetch_page(
    pattern: &IndexPattern,
    page: usize,
    timeout: Duration,
) -> Result<String, FetchError> {
    get_text(&page_url(pattern, page), timeout)
}
