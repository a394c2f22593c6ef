// Retry with exponential backoff for transient GitHub failures
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts after the first one
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Single attempt. For callers that already have a fallback value.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Pause before retry number `retry` (1-based), capped at `max_delay`
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1) as i32;
        let scaled = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::from_secs_f64(scaled.min(self.max_delay.as_secs_f64()))
    }
}

/// Errors that know whether another attempt could succeed
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Run `operation` until it succeeds, fails permanently, or runs out of retries
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display + Retryable,
{
    let mut retry = 0;

    loop {
        let err = match operation().await {
            Ok(value) => {
                if retry > 0 {
                    debug!("Request succeeded on retry {}", retry);
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if !err.is_retryable() || retry >= config.max_retries {
            if retry > 0 {
                warn!("Giving up after {} retries: {}", retry, err);
            }
            return Err(err);
        }

        retry += 1;
        let delay = config.delay_for(retry);
        warn!(
            "Transient failure ({}), retry {}/{} in {:?}",
            err, retry, config.max_retries, delay
        );
        sleep(delay).await;
    }
}

/// 5xx, 429 and 408 are worth another attempt
pub fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status.is_server_error()
        || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, PartialEq)]
    enum FetchError {
        Flaky,
        Gone,
    }

    impl std::fmt::Display for FetchError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    impl Retryable for FetchError {
        fn is_retryable(&self) -> bool {
            *self == FetchError::Flaky
        }
    }

    fn quick(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(20),
            backoff_multiplier: 2.0,
        }
    }

    /// Fails with `error` for the first `failures` calls, then returns 7
    async fn run(
        config: &RetryConfig,
        failures: u32,
        error: fn() -> FetchError,
    ) -> (Result<u32, FetchError>, u32) {
        let calls = AtomicU32::new(0);
        let result = with_retry(config, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < failures {
                Err(error())
            } else {
                Ok(7)
            }
        })
        .await;
        (result, calls.load(Ordering::SeqCst))
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for(1), Duration::from_secs(1));
        assert_eq!(config.delay_for(2), Duration::from_secs(2));
        assert_eq!(config.delay_for(3), Duration::from_secs(4));
        assert_eq!(config.delay_for(10), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_flaky_call_recovers() {
        let (result, calls) = run(&quick(3), 2, || FetchError::Flaky).await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let (result, calls) = run(&quick(2), u32::MAX, || FetchError::Flaky).await;
        assert_eq!(result, Err(FetchError::Flaky));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_permanent_error_returns_at_once() {
        let (result, calls) = run(&quick(3), u32::MAX, || FetchError::Gone).await;
        assert_eq!(result, Err(FetchError::Gone));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_none_is_a_single_attempt() {
        let (result, calls) = run(&RetryConfig::none(), u32::MAX, || FetchError::Flaky).await;
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_retryable_statuses() {
        for code in [500, 502, 503, 429, 408] {
            assert!(is_retryable_status(reqwest::StatusCode::from_u16(code).unwrap()));
        }
        for code in [400, 401, 403, 404] {
            assert!(!is_retryable_status(reqwest::StatusCode::from_u16(code).unwrap()));
        }
    }
}
