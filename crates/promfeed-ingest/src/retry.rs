//! Retry with exponential backoff for transient fetch failures.

use std::future::Future;
use std::time::Duration;

use crate::error::FeedError;

/// Rate limiting (429) and network-level failures are worth another attempt.
/// Everything else (404, other non-2xx, malformed XML, local I/O) will fail
/// the same way again.
fn is_retriable(err: &FeedError) -> bool {
    matches!(err, FeedError::RateLimited { .. } | FeedError::Http(_))
}

/// Executes `operation`, retrying retriable errors up to `max_retries` extra
/// times. The wait before retry `n` (1-based) is `backoff_base_secs * 2^(n-1)`.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, FeedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FeedError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if !is_retriable(&err) || attempt >= max_retries => return Err(err),
            Err(err) => err,
        };

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient feed error; retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn rate_limited() -> FeedError {
        FeedError::RateLimited {
            feed_id: "1".to_string(),
            retry_after_secs: 0,
        }
    }

    #[tokio::test]
    async fn returns_first_success_without_retrying() {
        let calls = Cell::new(0u32);
        let result = retry_with_backoff(3, 0, || {
            calls.set(calls.get() + 1);
            async { Ok::<_, FeedError>(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = Cell::new(0u32);
        let result = retry_with_backoff(3, 0, || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err(rate_limited())
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Cell::new(0u32);
        let result: Result<(), _> = retry_with_backoff(2, 0, || {
            calls.set(calls.get() + 1);
            async { Err(rate_limited()) }
        })
        .await;
        assert!(matches!(result, Err(FeedError::RateLimited { .. })));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn non_retriable_errors_fail_immediately() {
        let calls = Cell::new(0u32);
        let result: Result<(), _> = retry_with_backoff(5, 0, || {
            calls.set(calls.get() + 1);
            async {
                Err(FeedError::UnexpectedStatus {
                    status: 500,
                    url: "http://feeds.test/1.xml".to_string(),
                })
            }
        })
        .await;
        assert!(matches!(
            result,
            Err(FeedError::UnexpectedStatus { status: 500, .. })
        ));
        assert_eq!(calls.get(), 1);
    }
}
