//! Retry with linear backoff for page fetches

use std::time::Duration;

use crate::error::FetchError;

/// Attempts per page before the page is skipped
pub const MAX_ATTEMPTS: u32 = 3;

/// Linear backoff: `attempt` seconds (1s, 2s, ...)
pub const fn backoff_duration(attempt: u32) -> Duration {
    Duration::from_secs(attempt as u64)
}

/// Retry a fallible fetch with linear backoff.
///
/// Every failure class is retryable, transport errors and non-2xx statuses
/// alike. `on_retry` runs after each failed attempt that will be retried,
/// with the number of the attempt that just failed; the backoff sleep
/// happens after it returns. Returns the final error once [`MAX_ATTEMPTS`]
/// are exhausted.
pub fn with_retries<T>(
    attempt_fn: impl FnMut() -> Result<T, FetchError>,
    on_retry: impl FnMut(u32, &FetchError),
) -> Result<T, FetchError> {
    retry_loop(attempt_fn, on_retry, std::thread::sleep)
}

fn retry_loop<T>(
    mut attempt_fn: impl FnMut() -> Result<T, FetchError>,
    mut on_retry: impl FnMut(u32, &FetchError),
    mut sleep: impl FnMut(Duration),
) -> Result<T, FetchError> {
    let mut attempt = 1u32;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if attempt < MAX_ATTEMPTS => {
                on_retry(attempt, &e);
                sleep(backoff_duration(attempt));
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure() -> FetchError {
        FetchError::Http {
            status: Some(500),
            message: "test".to_string(),
        }
    }

    #[test]
    fn backoff_linear() {
        assert_eq!(backoff_duration(1), Duration::from_secs(1));
        assert_eq!(backoff_duration(2), Duration::from_secs(2));
        assert_eq!(backoff_duration(3), Duration::from_secs(3));
    }

    #[test]
    fn first_attempt_success_skips_retries() {
        let mut retries = 0;
        let result = retry_loop(|| Ok(42), |_, _| retries += 1, |_| {});
        assert_eq!(result.unwrap(), 42);
        assert_eq!(retries, 0);
    }

    #[test]
    fn succeeds_on_final_attempt_exactly_once() {
        // Fails twice, succeeds on attempt 3; linear sleeps between attempts.
        let mut calls = 0;
        let mut retried = Vec::new();
        let mut slept = Vec::new();
        let result = retry_loop(
            || {
                calls += 1;
                if calls < 3 { Err(failure()) } else { Ok("body") }
            },
            |attempt, _| retried.push(attempt),
            |d| slept.push(d),
        );
        assert_eq!(result.unwrap(), "body");
        assert_eq!(calls, 3);
        assert_eq!(retried, vec![1, 2]);
        assert_eq!(slept, vec![Duration::from_secs(1), Duration::from_secs(2)]);
    }

    #[test]
    fn exhaustion_returns_last_error() {
        let mut calls = 0;
        let result: Result<(), _> = retry_loop(
            || {
                calls += 1;
                Err(failure())
            },
            |_, _| {},
            |_| {},
        );
        assert!(result.is_err());
        assert_eq!(calls, MAX_ATTEMPTS);
    }
}
