//! Timeout and bounded retry around a single oracle call

use super::{OracleError, OracleResult};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// How one oracle call is attempted.
///
/// Each attempt runs under `timeout`. Failed attempts are retried up to
/// `max_attempts` total, sleeping `backoff` in between. The last error is
/// returned when every attempt fails.
#[derive(Debug, Clone)]
pub struct CallPolicy {
    pub timeout: Duration,
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            max_attempts: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

impl CallPolicy {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, max_attempts: u32, backoff: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.backoff = backoff;
        self
    }

    /// Run `call` under this policy. `label` only feeds the debug log.
    pub async fn call<T, F, Fut>(&self, label: &str, mut call: F) -> OracleResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = OracleResult<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last_error = OracleError::InvocationFailed(format!("{label}: no attempt made"));

        for attempt in 1..=attempts {
            match tokio::time::timeout(self.timeout, call()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => last_error = e,
                Err(_) => last_error = OracleError::Timeout(self.timeout),
            }
            debug!(label, attempt, attempts, error = %last_error, "oracle attempt failed");
            if attempt < attempts && !self.backoff.is_zero() {
                tokio::time::sleep(self.backoff).await;
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick(max_attempts: u32) -> CallPolicy {
        CallPolicy::default().with_retries(max_attempts, Duration::ZERO)
    }

    #[tokio::test]
    async fn success_returns_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result = quick(3)
            .call("ok", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, OracleError>(7)
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_failure_is_retried() {
        let calls = AtomicU32::new(0);
        let result = quick(3)
            .call("flaky", || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(OracleError::InvocationFailed("busy".into()))
                } else {
                    Ok("done")
                }
            })
            .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn persistent_failure_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: OracleResult<()> = quick(2)
            .call("down", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(OracleError::Unavailable("offline".into()))
            })
            .await;
        assert!(matches!(result, Err(OracleError::Unavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_attempts_still_calls_once() {
        let calls = AtomicU32::new(0);
        let _ = quick(0)
            .call("zero", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, OracleError>(())
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_call_times_out() {
        let policy = quick(1).with_timeout(Duration::from_millis(10));
        let result: OracleResult<()> = policy
            .call("slow", || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        match result {
            Err(OracleError::Timeout(after)) => assert_eq!(after, Duration::from_millis(10)),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
