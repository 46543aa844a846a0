//! Shared HTTP plumbing for provider clients
//!
//! Sends a prepared `RequestBuilder`, logs the exchange, turns transport
//! failures and throttling into [`ProviderError`] and optionally retries
//! transient failures. Signing, URL layout and body parsing stay with each
//! provider.

use std::time::Duration;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::ProviderError;
use crate::utils::log_sanitizer::truncate_for_log;

/// Upper bound for a single backoff sleep.
const MAX_BACKOFF_MS: u64 = 10_000;
/// Upper bound honored for a server supplied `Retry-After`.
const MAX_RETRY_AFTER_SECS: u64 = 30;

/// Raw HTTP exchange result: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Send one request.
    ///
    /// * HTTP 429 becomes [`ProviderError::RateLimited`] (honoring `Retry-After`)
    /// * HTTP 502/503/504 become [`ProviderError::NetworkError`]
    /// * every other status is returned to the caller untouched
    pub async fn send(
        request: RequestBuilder,
        provider: &str,
        what: &str,
    ) -> Result<HttpReply, ProviderError> {
        log::debug!("[{provider}] {what}");

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    provider: provider.to_string(),
                    detail: e.to_string(),
                }
            } else {
                ProviderError::NetworkError {
                    provider: provider.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError {
                provider: provider.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!(
            "[{provider}] {what} -> {status}: {}",
            truncate_for_log(&body)
        );

        match status {
            429 => {
                log::warn!("[{provider}] Rate limited, retry_after={retry_after:?}");
                Err(ProviderError::RateLimited {
                    provider: provider.to_string(),
                    retry_after,
                    raw_message: Some(body),
                })
            }
            502..=504 => Err(ProviderError::NetworkError {
                provider: provider.to_string(),
                detail: format!("HTTP {status}: {}", truncate_for_log(&body)),
            }),
            _ => Ok(HttpReply { status, body }),
        }
    }

    /// Send with up to `max_retries` extra attempts for transient failures.
    ///
    /// Business errors are never retried. A request whose body cannot be
    /// cloned is sent once.
    pub async fn send_with_retry(
        request: RequestBuilder,
        provider: &str,
        what: &str,
        max_retries: u32,
    ) -> Result<HttpReply, ProviderError> {
        let mut attempt = 0;
        loop {
            let Some(req) = request.try_clone() else {
                log::warn!("[{provider}] Cannot clone request, sending without retry");
                return Self::send(request, provider, what).await;
            };

            match Self::send(req, provider, what).await {
                Err(e) if attempt < max_retries && e.is_retryable() => {
                    let delay = retry_delay(&e, attempt);
                    attempt += 1;
                    log::warn!(
                        "[{provider}] {what} failed (attempt {attempt}/{max_retries}), retrying in {:.1}s: {e}",
                        delay.as_secs_f32()
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    /// Parse a JSON body into `T`.
    pub fn parse_json<T>(body: &str, provider: &str) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(body).map_err(|e| {
            log::error!(
                "[{provider}] JSON parse failed: {e}; body: {}",
                truncate_for_log(body)
            );
            ProviderError::ParseError {
                provider: provider.to_string(),
                detail: e.to_string(),
            }
        })
    }
}

fn retry_delay(error: &ProviderError, attempt: u32) -> Duration {
    if let ProviderError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        Duration::from_secs((*secs).min(MAX_RETRY_AFTER_SECS))
    } else {
        backoff_delay(attempt)
    }
}

/// 100ms, 200ms, 400ms, ... capped at 10s
fn backoff_delay(attempt: u32) -> Duration {
    let shift = attempt.min(20);
    Duration::from_millis(100_u64.saturating_mul(1_u64 << shift).min(MAX_BACKOFF_MS))
}
