//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound the time spent fetching and translating one upstream resource
//! - Cancel the exchange cleanly when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Timed-out requests return 502 Bad Gateway
//! - Streaming a passthrough body happens after the deadline is lifted

use std::future::Future;
use std::time::Duration;

use crate::http::error::GatewayError;

/// Run `fut`, failing with [`GatewayError::Timeout`] once `limit` elapses.
///
/// The inner future is dropped on expiry, which closes its upstream connection.
pub async fn with_deadline<T, F>(limit: Duration, fut: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(limit_secs = limit.as_secs(), "Upstream deadline exceeded");
            Err(GatewayError::Timeout(limit))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let value = with_deadline(Duration::from_secs(1), async { Ok::<_, GatewayError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let err = with_deadline(Duration::from_secs(1), async {
            Err::<(), _>(GatewayError::NotFound)
        })
        .await
        .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound));
    }

    #[tokio::test]
    async fn test_deadline_expires() {
        let err = with_deadline(Duration::from_millis(20), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, GatewayError>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, GatewayError::Timeout(d) if d == Duration::from_millis(20)));
    }
}
