use std::{future::Future, time::Duration};

use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::engine::error::{ApiError, EngineError};

/// Timeout and retry settings applied to every remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per call, the first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Retry-after hints above this are treated as a refusal.
    pub max_retry_after: Duration,
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            max_retry_after: Duration::from_secs(120),
            call_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RetryError {
    Failed { attempts: u32, last: ApiError },
    Cancelled,
}

impl RetryError {
    pub(crate) fn into_engine(self, playlist_id: &str) -> EngineError {
        match self {
            RetryError::Failed { attempts, last } => {
                EngineError::from_api(playlist_id, attempts, last)
            }
            RetryError::Cancelled => EngineError::Cancelled,
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following failed attempt number `attempt`
    /// (1-based). A server hint replaces the exponential delay; `None` means
    /// the hint is too long to wait for.
    pub fn backoff(&self, attempt: u32, hint: Option<Duration>) -> Option<Duration> {
        if let Some(hint) = hint {
            return (hint <= self.max_retry_after).then_some(hint);
        }

        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        Some(self.base_delay.saturating_mul(factor).min(self.max_delay))
    }

    /// Runs `op` until it succeeds, fails permanently or runs out of
    /// attempts. `cancel` is checked before every attempt and while waiting.
    pub(crate) async fn run<T, F, Fut>(
        &self,
        operation: &str,
        cancel: Option<&CancellationToken>,
        mut op: F,
    ) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 0;

        loop {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(RetryError::Cancelled);
            }

            attempt += 1;
            let err = match timeout(self.call_timeout, op()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(err)) => err,
                Err(_) => ApiError::Timeout,
            };

            if !err.is_transient() || attempt >= self.max_attempts.max(1) {
                return Err(RetryError::Failed {
                    attempts: attempt,
                    last: err,
                });
            }

            let Some(delay) = self.backoff(attempt, err.retry_after()) else {
                warn!(
                    operation,
                    retry_after = ?err.retry_after(),
                    "retry-after hint is abnormally high, giving up"
                );
                return Err(RetryError::Failed {
                    attempts: attempt,
                    last: err,
                });
            };

            warn!(operation, attempt, ?delay, error = %err, "remote call failed, retrying");

            match cancel {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => return Err(RetryError::Cancelled),
                        _ = sleep(delay) => {}
                    }
                }
                None => sleep(delay).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn fast() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            max_retry_after: Duration::from_millis(50),
            call_timeout: Duration::from_millis(200),
        }
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let policy = RetryPolicy {
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.backoff(1, None), Some(Duration::from_millis(100)));
        assert_eq!(policy.backoff(2, None), Some(Duration::from_millis(200)));
        assert_eq!(policy.backoff(3, None), Some(Duration::from_millis(350)));
        assert_eq!(policy.backoff(40, None), Some(Duration::from_millis(350)));
    }

    #[test]
    fn backoff_honors_retry_after() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.backoff(1, Some(Duration::from_secs(7))),
            Some(Duration::from_secs(7))
        );
        assert_eq!(policy.backoff(1, Some(Duration::from_secs(3600))), None);
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let result = fast()
            .run("test", None, || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ApiError::Server {
                        status: 503,
                        message: "unavailable".into(),
                        retry_after: None,
                    })
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast()
            .run("test", None, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::RateLimited {
                    retry_after: Some(Duration::from_millis(1)),
                })
            })
            .await;

        assert!(matches!(result, Err(RetryError::Failed { attempts: 3, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn never_retries_permanent_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast()
            .run("test", None, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::Auth("token expired".into()))
            })
            .await;

        assert_eq!(
            result,
            Err(RetryError::Failed {
                attempts: 1,
                last: ApiError::Auth("token expired".into())
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_calls_time_out() {
        let policy = RetryPolicy {
            max_attempts: 2,
            call_timeout: Duration::from_millis(10),
            ..fast()
        };
        let result: Result<(), _> = policy
            .run("test", None, || async {
                sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert_eq!(
            result,
            Err(RetryError::Failed {
                attempts: 2,
                last: ApiError::Timeout
            })
        );
    }

    #[tokio::test]
    async fn cancelled_token_stops_before_calling() {
        let token = CancellationToken::new();
        token.cancel();
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast()
            .run("test", Some(&token), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert_eq!(result, Err(RetryError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn too_long_retry_after_is_not_awaited() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast()
            .run("test", None, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::RateLimited {
                    retry_after: Some(Duration::from_secs(600)),
                })
            })
            .await;

        assert!(matches!(result, Err(RetryError::Failed { attempts: 1, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn server_error_hint_replaces_backoff() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast()
            .run("test", None, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::Server {
                    status: 503,
                    message: "unavailable".into(),
                    retry_after: Some(Duration::from_secs(600)),
                })
            })
            .await;

        // A 503 asking for ten minutes is treated like an oversized 429 hint.
        assert!(matches!(result, Err(RetryError::Failed { attempts: 1, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
