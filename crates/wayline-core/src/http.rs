//! HTTP access to the index service.
//!
//! Uses async reqwest internally but presents a sync interface, so the
//! worker threads stay plain blocking threads. One shared client, one shared
//! runtime, per-request timeouts supplied by the caller.

use std::sync::LazyLock;
use std::time::Duration;

use crate::error::FetchError;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared async HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .pool_max_idle_per_host(8)
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// HTTP GET returning the response body as text.
///
/// `timeout` bounds the whole exchange for this one attempt. Non-2xx
/// statuses come back as [`FetchError::Http`] with the status filled in.
pub fn get_text(url: &str, timeout: Duration) -> Result<String, FetchError> {
    SHARED_RUNTIME.handle().block_on(async {
        let response = SHARED_CLIENT
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::from_reqwest(&e))?;
        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))
    })
}
