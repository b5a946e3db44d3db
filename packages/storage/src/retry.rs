// ABOUTME: Bounded retry with exponential backoff for contended writes
// ABOUTME: Re-runs an operation while it fails with a retryable storage error

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::StorageResult;

pub const MAX_RETRIES: u32 = 5;
pub const INITIAL_BACKOFF_MS: u64 = 10;

/// Run `attempt` until it succeeds, fails with a non-retryable error, or
/// exhausts [`MAX_RETRIES`]. Each attempt must be self-contained (its own
/// transaction), so a failed attempt leaves nothing behind.
pub async fn with_retry<T, F, Fut>(operation: &str, mut attempt: F) -> StorageResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StorageResult<T>>,
{
    let mut tries = 0;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && tries + 1 < MAX_RETRIES => {
                let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(tries);
                warn!(
                    "{} attempt {} failed ({}), retrying in {}ms",
                    operation,
                    tries + 1,
                    err,
                    backoff_ms
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                tries += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn conflict() -> StorageError {
        StorageError::Conflict {
            operation: "inserting supervisor".to_string(),
            message: "UNIQUE constraint failed: supervisors.code".to_string(),
        }
    }

    #[tokio::test]
    async fn test_retries_conflicts_until_success() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result = with_retry("resolving supervisor", move || async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(conflict())
            } else {
                Ok("sup-1")
            }
        })
        .await
        .unwrap();

        assert_eq!(result, "sup-1");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: StorageResult<()> = with_retry("resolving supervisor", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(conflict())
        })
        .await;

        assert!(matches!(result, Err(StorageError::Conflict { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), MAX_RETRIES);
    }

    #[tokio::test]
    async fn test_does_not_retry_other_errors() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: StorageResult<()> = with_retry("loading review", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::NotFound("review".to_string()))
        })
        .await;

        assert!(matches!(result, Err(StorageError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
