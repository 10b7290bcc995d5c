//! HTTP fetcher for facility status pages
//!
//! One bounded-time GET per facility, with:
//! - A hard per-request timeout (facilities that answer late are marked
//!   failed, never retried within the sweep)
//! - A fixed identifying `User-Agent` header
//! - Politeness pacing between consecutive requests via a governor quota,
//!   so a sweep never bursts the upstream host

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use crate::config::FetchConfig;
use crate::models::Facility;

/// Errors that can occur while fetching a facility page
///
/// Callers treat every variant the same way (the facility is marked failed
/// for this sweep); the split only feeds logging.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request exceeded the per-request budget
    #[error("request timeout")]
    Timeout,

    /// Upstream answered with a non-success status
    #[error("server error: {0}")]
    ServerError(u16),
}

/// Facility status page fetcher
pub struct Fetcher {
    /// HTTP client with configured timeout and identifying header
    client: Client,

    /// Inter-request pacing; `None` when the configured gap is zero
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,

    /// Optional base URL override for testing with mock servers
    base_url: Option<String>,
}

impl Fetcher {
    /// Create a fetcher from configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .build()?;

        let limiter = Quota::with_period(Duration::from_millis(config.request_gap_ms))
            .map(RateLimiter::direct);

        Ok(Self {
            client,
            limiter,
            base_url: None,
        })
    }

    /// Create a fetcher that targets a mock server instead of the
    /// facilities' own base URLs
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_base_url(config: &FetchConfig, base_url: &str) -> Result<Self, FetchError> {
        let mut fetcher = Self::new(config)?;
        fetcher.base_url = Some(base_url.to_string());
        Ok(fetcher)
    }

    /// Fetch the raw status page for one facility
    ///
    /// Blocks on the pacing quota first, then performs a single GET to the
    /// facility endpoint with its `page_id` query parameter. Any transport
    /// condition (timeout, DNS, refused connection, non-2xx) is a failure;
    /// there are no retries at this layer.
    ///
    /// # Errors
    ///
    /// Returns a `FetchError` variant describing the transport failure
    pub async fn fetch(&self, facility: &Facility) -> Result<String, FetchError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let base = self
            .base_url
            .as_deref()
            .unwrap_or(facility.base_url.as_str());

        let response = self
            .client
            .get(base)
            .query(&[("page_id", facility.page_id)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::ServerError(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}
