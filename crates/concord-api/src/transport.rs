//! Rate-limit-compliant HTTP transport.
//!
//! Single choke point for every platform call: enforces the per-call
//! timeout, honors 429 retry delays exactly, and bounds retries for
//! transient network failures. Structural 4xx/5xx responses are returned
//! immediately as errors carrying a truncated body. Every retry is
//! preceded by an explicit sleep; the transport never spins.

use std::thread;
use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::{Client, Response};
use serde_json::Value;

use crate::error::ApiError;
use crate::retry::RetryPolicy;

/// Per-call timeout.
const CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Cap on response-body bytes carried inside an error.
const ERROR_BODY_CAP: usize = 256;

/// Fallback delay when a 429 carries no usable retry hint.
const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(1);

pub struct RateLimitedTransport {
    client: Client,
    credential: String,
    retry: RetryPolicy,
}

impl RateLimitedTransport {
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(CALL_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            credential: credential.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Issue one logical request, absorbing 429 waits and transient
    /// network retries. Returns the decoded JSON body, or `Value::Null`
    /// for an empty 2xx response.
    pub fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let mut rate_limit_attempts = 0u32;
        let mut network_attempts = 0u32;

        loop {
            match self.execute(&method, url, body) {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    if status == 429 {
                        rate_limit_attempts += 1;
                        if rate_limit_attempts > self.retry.max_rate_limit_retries {
                            return Err(ApiError::RateLimitExhausted {
                                method: method.to_string(),
                                url: url.to_string(),
                                attempts: rate_limit_attempts,
                            });
                        }
                        let delay = retry_delay(resp);
                        tracing::warn!(
                            url = %url,
                            delay_ms = delay.as_millis() as u64,
                            attempt = rate_limit_attempts,
                            "rate limited, waiting before retry"
                        );
                        thread::sleep(delay);
                        continue;
                    }

                    if !(200..300).contains(&status) {
                        return Err(ApiError::Status {
                            method: method.to_string(),
                            url: url.to_string(),
                            status,
                            body: truncate(resp.text().unwrap_or_default()),
                        });
                    }

                    let text = resp.text().map_err(|e| ApiError::Decode {
                        url: url.to_string(),
                        message: e.to_string(),
                    })?;
                    if text.is_empty() {
                        return Ok(Value::Null);
                    }
                    return serde_json::from_str(&text).map_err(|e| ApiError::Decode {
                        url: url.to_string(),
                        message: e.to_string(),
                    });
                }
                Err(err) => {
                    network_attempts += 1;
                    if network_attempts > self.retry.max_network_retries {
                        return Err(ApiError::Network {
                            method: method.to_string(),
                            url: url.to_string(),
                            attempts: network_attempts,
                            message: err.to_string(),
                        });
                    }
                    let delay = self.retry.network_delay();
                    tracing::warn!(
                        url = %url,
                        error = %err,
                        attempt = network_attempts,
                        "network failure, retrying after backoff"
                    );
                    thread::sleep(delay);
                }
            }
        }
    }

    fn execute(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Response, reqwest::Error> {
        let mut req = self.client.request(method.clone(), url).header(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {}", self.credential),
        );
        if let Some(json) = body {
            req = req.json(json);
        }
        req.send()
    }
}

/// Read the platform's retry delay from a 429 response: the `Retry-After`
/// header first, then a `retry_after` field in the JSON body (seconds,
/// possibly fractional). Rounded up to whole seconds.
fn retry_delay(resp: Response) -> Duration {
    if let Some(header) = resp.headers().get(reqwest::header::RETRY_AFTER) {
        if let Some(secs) = header.to_str().ok().and_then(|v| v.parse::<f64>().ok()) {
            return whole_seconds(secs);
        }
    }
    if let Ok(body) = resp.json::<Value>() {
        if let Some(secs) = body.get("retry_after").and_then(Value::as_f64) {
            return whole_seconds(secs);
        }
    }
    DEFAULT_RATE_LIMIT_DELAY
}

fn whole_seconds(secs: f64) -> Duration {
    if !secs.is_finite() || secs < 0.0 {
        return DEFAULT_RATE_LIMIT_DELAY;
    }
    Duration::from_secs(secs.ceil() as u64)
}

fn truncate(body: String) -> String {
    if body.chars().count() <= ERROR_BODY_CAP {
        return body;
    }
    let mut out: String = body.chars().take(ERROR_BODY_CAP).collect();
    out.push_str("...");
    out
}
