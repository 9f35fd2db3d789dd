use std::future::Future;
use std::time::Duration;

use super::classification::ErrorClassification;
use super::types::ReportError;
use tracing::{debug, warn};

const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Backoff policy for idempotent catalog reads.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryConfig {
    pub fn disabled() -> Self {
        Self { max_retries: 0, base_delay: Duration::ZERO }
    }

    /// Wait before retry number `attempt` (0-indexed), capped at 30s.
    ///
    /// Rate limits back off linearly in steps of five base delays; everything
    /// else doubles per attempt with up to one base delay of jitter.
    pub fn backoff(&self, classification: &ErrorClassification, attempt: u32) -> Duration {
        let base = self.base_delay;
        let delay = if classification.error_type == "RateLimitError" {
            base * 5 * (attempt + 1)
        } else {
            base * 2u32.saturating_pow(attempt.min(16)) + base.mul_f64(rand::random::<f64>())
        };
        delay.min(MAX_BACKOFF)
    }
}

/// Run `factory` until it succeeds, fails with a non-retryable error, or the
/// retry budget runs out.
///
/// Only for reads. Generation requests are not idempotent on the backend and
/// must never go through here.
pub async fn with_retry<F, Fut, T>(
    operation: &str,
    config: &RetryConfig,
    mut factory: F,
) -> Result<T, ReportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ReportError>>,
{
    let mut attempt = 0;
    loop {
        let err = match factory().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(operation, attempts = attempt + 1, "Recovered after retry");
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        let classification = err.classify();
        if !classification.retryable || attempt >= config.max_retries {
            warn!(
                operation,
                attempts = attempt + 1,
                error_type = classification.error_type,
                error = %err,
                "Giving up"
            );
            return Err(err);
        }

        let delay = config.backoff(&classification, attempt);
        warn!(
            operation,
            attempt = attempt + 1,
            error_type = classification.error_type,
            delay_ms = delay.as_millis() as u64,
            "Transient failure, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_rate_limit_backoff_is_linear_and_capped() {
        let config = RetryConfig { max_retries: 3, base_delay: Duration::from_secs(1) };
        let rate_limited = ReportError::RateLimit("slow down".into()).classify();
        assert_eq!(config.backoff(&rate_limited, 0), Duration::from_secs(5));
        assert_eq!(config.backoff(&rate_limited, 1), Duration::from_secs(10));
        assert_eq!(config.backoff(&rate_limited, 9), MAX_BACKOFF);
    }

    #[test]
    fn test_network_backoff_doubles_with_jitter() {
        let config = RetryConfig::default();
        let network = ReportError::Network("reset".into()).classify();
        let first = config.backoff(&network, 0);
        let second = config.backoff(&network, 1);
        assert!(first >= Duration::from_millis(500) && first < Duration::from_millis(1000));
        assert!(second >= Duration::from_millis(1000) && second < Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_permission_error_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = with_retry("get_template", &RetryConfig::default(), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(ReportError::Permission("forbidden".into()))
            }
        })
        .await;

        assert!(matches!(result, Err(ReportError::Permission(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disabled_config_makes_one_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = with_retry("list_templates", &RetryConfig::disabled(), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(ReportError::Timeout("catalog".into()))
            }
        })
        .await;

        assert!(matches!(result, Err(ReportError::Timeout(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
