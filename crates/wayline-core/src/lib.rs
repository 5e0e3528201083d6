//! Wayline Core - shared infrastructure for the CDX harvesting pipeline
//!
//! HTTP plumbing, retry policy, page distribution, progress rendering,
//! logging, and the deduplicating output sink. The index-specific pipeline
//! lives in `wayline-cdx`.

pub mod error;
pub mod http;
pub mod logging;
pub mod progress;
pub mod queue;
pub mod retry;
pub mod sink;

// Re-exports for convenience
pub use error::FetchError;
pub use http::{SHARED_RUNTIME, get_text, http_client};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, StatusLevel};
pub use queue::PageCursor;
pub use retry::{MAX_ATTEMPTS, backoff_duration, with_retries};
pub use sink::{DedupSink, SinkSummary};
