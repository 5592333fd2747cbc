//! NiceApe REST data-API client implementation.
//!
//! The [`NiceapeApiClient`] provides a type-safe interface for the snapshot
//! endpoints backing the token pages: chart history, transaction pages, and
//! the recent-token list.
//!
//! # Example
//!
//! ```rust,ignore
//! use niceape::api::NiceapeApiClient;
//! use niceape::chart::ChartTimeInterval;
//! use niceape::api::types::ChartRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NiceapeApiClient::new("https://datapi.jup.ag")?;
//!
//!     let request = ChartRequest::new("mint1", ChartTimeInterval::FifteenMinutes);
//!     let chart = client.get_chart_bars(&request).await?;
//!     println!("Fetched {} bars", chart.bars.len());
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::api::types::{ChartRequest, ChartResponse, RecentTokensResponse, TokenTxsResponse};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum allowed limit for paginated API requests.
const MAX_PAGINATION_LIMIT: u32 = 500;

/// Retry configuration for the API client.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = disabled)
    pub max_retries: u32,
    /// Base delay before first retry (ms)
    pub base_delay_ms: u64,
    /// Maximum delay between retries (ms)
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 100,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with the given max retries.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Set the base delay in milliseconds.
    pub fn with_base_delay_ms(mut self, ms: u64) -> Self {
        self.base_delay_ms = ms;
        self
    }

    /// Set the maximum delay in milliseconds.
    pub fn with_max_delay_ms(mut self, ms: u64) -> Self {
        self.max_delay_ms = ms;
        self
    }

    /// Calculate delay for a given attempt with exponential backoff and jitter.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp_delay = self.base_delay_ms.saturating_mul(1 << attempt.min(10));
        let capped_delay = exp_delay.min(self.max_delay_ms);
        // Jitter: 75-100% of calculated delay
        let jitter_range = capped_delay / 4;
        let jitter = rand::random::<u64>() % (jitter_range + 1);
        Duration::from_millis(capped_delay - jitter_range + jitter)
    }
}

/// Builder for configuring [`NiceapeApiClient`].
#[derive(Debug, Clone)]
pub struct NiceapeApiClientBuilder {
    base_url: String,
    timeout: Duration,
    retry_config: RetryConfig,
}

impl NiceapeApiClientBuilder {
    /// Create a new builder with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry_config: RetryConfig::default(),
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Enable retries with exponential backoff.
    pub fn with_retry(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Build the client.
    pub fn build(self) -> ApiResult<NiceapeApiClient> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let http_client = Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(10)
            .default_headers(headers)
            .build()?;

        Ok(NiceapeApiClient {
            http_client,
            base_url: self.base_url,
            retry_config: self.retry_config,
        })
    }
}

/// NiceApe REST data-API client.
#[derive(Debug, Clone)]
pub struct NiceapeApiClient {
    http_client: Client,
    base_url: String,
    retry_config: RetryConfig,
}

impl NiceapeApiClient {
    /// Create a new client with the given base URL.
    ///
    /// Uses default settings (30s timeout, connection pooling).
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        NiceapeApiClientBuilder::new(base_url).build()
    }

    /// Create a new client builder for custom configuration.
    pub fn builder(base_url: impl Into<String>) -> NiceapeApiClientBuilder {
        NiceapeApiClientBuilder::new(base_url)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // Endpoints
    // =========================================================================

    /// Fetch historical chart bars for an asset.
    pub async fn get_chart_bars(&self, request: &ChartRequest) -> ApiResult<ChartResponse> {
        if request.asset.is_empty() {
            return Err(ApiError::InvalidParameter("asset must not be empty".to_string()));
        }

        let mut url = format!(
            "{}/charts/{}?interval={}",
            self.base_url, request.asset, request.interval
        );
        if let Some(from) = request.from {
            url.push_str(&format!("&from={}", from));
        }
        if let Some(to) = request.to {
            url.push_str(&format!("&to={}", to));
        }

        self.get(&url).await
    }

    /// Fetch one page of an asset's trade history, newest first.
    pub async fn get_token_txs(
        &self,
        asset: &str,
        limit: Option<u32>,
        cursor: Option<&str>,
    ) -> ApiResult<TokenTxsResponse> {
        if asset.is_empty() {
            return Err(ApiError::InvalidParameter("asset must not be empty".to_string()));
        }
        if let Some(limit) = limit {
            if limit == 0 || limit > MAX_PAGINATION_LIMIT {
                return Err(ApiError::InvalidParameter(format!(
                    "limit must be between 1 and {}",
                    MAX_PAGINATION_LIMIT
                )));
            }
        }

        let mut url = format!("{}/txs/{}", self.base_url, asset);
        let mut sep = '?';
        if let Some(limit) = limit {
            url.push_str(&format!("{}limit={}", sep, limit));
            sep = '&';
        }
        if let Some(cursor) = cursor {
            url.push_str(&format!("{}cursor={}", sep, cursor));
        }

        self.get(&url).await
    }

    /// Fetch the most recently created tokens.
    pub async fn get_recent_tokens(&self, limit: Option<u32>) -> ApiResult<RecentTokensResponse> {
        if let Some(limit) = limit {
            if limit == 0 || limit > MAX_PAGINATION_LIMIT {
                return Err(ApiError::InvalidParameter(format!(
                    "limit must be between 1 and {}",
                    MAX_PAGINATION_LIMIT
                )));
            }
        }

        let mut url = format!("{}/tokens/recent", self.base_url);
        if let Some(limit) = limit {
            url.push_str(&format!("?limit={}", limit));
        }

        self.get(&url).await
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    /// Execute a GET request with optional retry logic.
    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        self.execute_with_retry(|| self.http_client.get(url).send()).await
    }

    /// Execute a request with retry logic.
    async fn execute_with_retry<T, F, Fut>(&self, request_fn: F) -> ApiResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
        T: serde::de::DeserializeOwned,
    {
        let mut attempt = 0;

        loop {
            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return response.json::<T>().await.map_err(|e| {
                            ApiError::Deserialize(format!("Failed to deserialize response: {}", e))
                        });
                    }

                    let error = Self::parse_error_response(response).await;

                    if attempt < self.retry_config.max_retries && Self::is_retryable_status(status) {
                        let delay = self.retry_config.delay_for_attempt(attempt);
                        tracing::debug!(
                            attempt = attempt + 1,
                            max_retries = self.retry_config.max_retries,
                            delay_ms = delay.as_millis(),
                            status = %status,
                            "Retrying request after error"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    return Err(error);
                }
                Err(e) => {
                    let is_retryable = e.is_connect() || e.is_timeout() || e.is_request();

                    if attempt < self.retry_config.max_retries && is_retryable {
                        let delay = self.retry_config.delay_for_attempt(attempt);
                        tracing::debug!(
                            attempt = attempt + 1,
                            max_retries = self.retry_config.max_retries,
                            delay_ms = delay.as_millis(),
                            error = %e,
                            "Retrying request after network error"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    return Err(ApiError::Http(e));
                }
            }
        }
    }

    /// Whether an HTTP status warrants a retry.
    fn is_retryable_status(status: StatusCode) -> bool {
        status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
    }

    /// Map an error response to an [`ApiError`].
    async fn parse_error_response(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let message = match response.json::<ErrorResponse>().await {
            Ok(body) => body.get_message(),
            Err(_) => "Unknown error".to_string(),
        };

        match status {
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::BAD_REQUEST => ApiError::BadRequest(message),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(message),
            s if s.is_server_error() => ApiError::ServerError(message),
            s => ApiError::UnexpectedStatus(s.as_u16(), message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartTimeInterval;

    #[test]
    fn test_builder_trims_trailing_slash() {
        let client = NiceapeApiClient::new("https://datapi.jup.ag/").unwrap();
        assert_eq!(client.base_url(), "https://datapi.jup.ag");
    }

    #[test]
    fn test_retry_delay_stays_within_bounds() {
        let config = RetryConfig::new(3)
            .with_base_delay_ms(100)
            .with_max_delay_ms(1000);

        for attempt in 0..5 {
            let delay = config.delay_for_attempt(attempt).as_millis() as u64;
            assert!(delay <= 1000);
        }
    }

    #[tokio::test]
    async fn test_invalid_limit_rejected() {
        let client = NiceapeApiClient::new("https://datapi.jup.ag").unwrap();

        let result = client.get_token_txs("mint1", Some(0), None).await;
        assert!(matches!(result, Err(ApiError::InvalidParameter(_))));

        let result = client.get_token_txs("mint1", Some(9999), None).await;
        assert!(matches!(result, Err(ApiError::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn test_empty_asset_rejected() {
        let client = NiceapeApiClient::new("https://datapi.jup.ag").unwrap();

        let request = ChartRequest::new("", ChartTimeInterval::FifteenMinutes);
        let result = client.get_chart_bars(&request).await;
        assert!(matches!(result, Err(ApiError::InvalidParameter(_))));
    }
}
