//! Retry with exponential backoff for HTTP generation calls.
//!
//! Retries on transient errors (408, 429, 5xx, network failures).
//! Client errors (400, 401, 403, 404) fail on the first attempt.

use reqwest::{Response, StatusCode};
use sentia_core::{EngineError, Result};
use std::time::Duration;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Multiplier applied after each retry.
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            backoff_factor: 2.0,
        }
    }
}

impl RetryConfig {
    /// `max_retries` counts retries, not attempts.
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_attempts: max_retries + 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.backoff_factor.powi(retry.saturating_sub(1) as i32);
        let secs = (self.initial_delay.as_secs_f64() * factor).min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::INTERNAL_SERVER_ERROR
        || status == StatusCode::BAD_GATEWAY
        || status == StatusCode::SERVICE_UNAVAILABLE
        || status == StatusCode::GATEWAY_TIMEOUT
        || status == StatusCode::REQUEST_TIMEOUT
}

/// Run `operation` until it yields a successful response, a non-retryable
/// error, or the attempt budget runs out.
///
/// A client-side timeout on the final attempt surfaces as
/// [`EngineError::GenerationTimeout`]; everything else is a
/// [`EngineError::GenerationError`].
pub async fn with_retry<F, Fut>(
    config: &RetryConfig,
    provider_name: &str,
    request_timeout: Duration,
    operation: F,
) -> Result<Response>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = reqwest::Result<Response>>,
{
    let attempts = config.max_attempts.max(1);
    let mut last_error = EngineError::GenerationError(format!("{}: no attempt made", provider_name));

    for attempt in 1..=attempts {
        match operation().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    if attempt > 1 {
                        tracing::info!("{} succeeded on attempt {}", provider_name, attempt);
                    }
                    return Ok(response);
                }

                let error_text = response.text().await.unwrap_or_default();
                if !is_retryable_status(status) {
                    return Err(EngineError::GenerationError(format!(
                        "{} API error ({}): {}",
                        provider_name, status, error_text
                    )));
                }

                tracing::warn!(
                    "{} returned {} on attempt {}/{}: {}",
                    provider_name,
                    status,
                    attempt,
                    attempts,
                    error_text.chars().take(200).collect::<String>()
                );
                last_error = EngineError::GenerationError(format!(
                    "{} ({}): {}",
                    provider_name, status, error_text
                ));
            }
            Err(e) => {
                tracing::warn!(
                    "{} network error on attempt {}/{}: {}",
                    provider_name,
                    attempt,
                    attempts,
                    e
                );
                last_error = if e.is_timeout() {
                    EngineError::GenerationTimeout(request_timeout)
                } else {
                    EngineError::GenerationError(format!("{}: {}", provider_name, e))
                };
            }
        }

        if attempt < attempts {
            let delay = config.delay_for(attempt);
            tracing::info!(
                "{} retrying in {:.1}s (attempt {}/{})",
                provider_name,
                delay.as_secs_f64(),
                attempt + 1,
                attempts
            );
            tokio::time::sleep(delay).await;
        }
    }

    Err(last_error)
}
