use crate::config::FetcherSettings;
use crate::errors::FetchError;
use crate::http::RetryPolicy;
use crate::rate_limiter::RateLimiter;
use anyhow::{Context, Result};
use log::{debug, error, warn};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// HTTP client with built-in rate limiting and retries
pub struct RateLimitedClient {
    client: Client,
    rate_limiter: RateLimiter,
    retry: RetryPolicy,
}

impl RateLimitedClient {
    pub fn new(settings: &FetcherSettings) -> Result<Self> {
        let client = Self::build_client(&settings.user_agent, settings.timeout_secs)?;
        let rate_limiter = RateLimiter::new(settings.rate_limit_ms);

        Ok(Self {
            client,
            rate_limiter,
            retry: RetryPolicy::new(settings.retries),
        })
    }

    /// GET `url` and decode the body as JSON.
    ///
    /// Transient failures are retried with backoff; the last error is
    /// returned once attempts are exhausted.
    pub async fn get_json(&mut self, url: &str) -> Result<Value, FetchError> {
        self.rate_limiter.wait().await;

        let max_attempts = self.retry.max_attempts();
        let mut attempt = 1;

        loop {
            debug!("Fetching URL (attempt {}): {}", attempt, url);

            let error = match self.send_get_request(url).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if !error.is_transient() {
                warn!("Fetch failed for {}: {}", url, error);
                return Err(error);
            }

            warn!("Fetch failed for {} (attempt {}/{}): {}", url, attempt, max_attempts, error);

            if attempt >= max_attempts {
                error!("Giving up fetching {} after {} attempts", url, attempt);
                return Err(error);
            }

            tokio::time::sleep(self.retry.delay_for(attempt)).await;
            attempt += 1;
        }
    }

    fn build_client(user_agent: &str, timeout_secs: u64) -> Result<Client> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }

    async fn send_get_request(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(url, status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| Self::request_error(url, e))?;

        serde_json::from_str(&text).map_err(|source| FetchError::Malformed {
            url: url.to_string(),
            source,
        })
    }

    fn request_error(url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Connection {
                url: url.to_string(),
                source: error,
            }
        }
    }
}
