//! Timeout-bounded JSON client for the financial data endpoint.
//!
//! ```rust
//! use std::time::Duration;
//! use tcmarket::FetchClient;
//!
//! let client = FetchClient::new("fd-key")
//!     .with_base_url("http://localhost:9000/")
//!     .with_timeout(Duration::from_secs(2));
//!
//! assert_eq!(client.endpoint("/news/"), "http://localhost:9000/news/");
//! assert_eq!(client.timeout(), Duration::from_secs(2));
//! ```

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use tcprovider::SecretString;

use crate::FetchError;

pub const FINANCIAL_DATASETS_BASE_URL: &str = "https://api.financialdatasets.ai";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const API_KEY_HEADER: &str = "X-API-KEY";

#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
    timeout: Duration,
}

impl FetchClient {
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self::with_client(Client::new(), api_key)
    }

    /// Builds on an existing connection pool instead of opening a new one.
    pub fn with_client(client: Client, api_key: impl Into<SecretString>) -> Self {
        Self {
            client,
            base_url: FINANCIAL_DATASETS_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn fetch_json<Q>(&self, path: &str, query: &Q) -> Result<Value, FetchError>
    where
        Q: Serialize + ?Sized,
    {
        self.fetch_json_within(path, query, self.timeout).await
    }

    pub async fn fetch_json_within<Q>(
        &self,
        path: &str,
        query: &Q,
        timeout: Duration,
    ) -> Result<Value, FetchError>
    where
        Q: Serialize + ?Sized,
    {
        let builder = self.client.get(self.endpoint(path)).query(query);
        self.send(path, builder, timeout).await
    }

    pub async fn post_json<B>(&self, path: &str, body: &B) -> Result<Value, FetchError>
    where
        B: Serialize + ?Sized,
    {
        self.post_json_within(path, body, self.timeout).await
    }

    pub async fn post_json_within<B>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<Value, FetchError>
    where
        B: Serialize + ?Sized,
    {
        let builder = self.client.post(self.endpoint(path)).json(body);
        self.send(path, builder, timeout).await
    }

    /// Dropping the inner future on expiry cancels the in-flight request.
    async fn send(
        &self,
        path: &str,
        builder: RequestBuilder,
        timeout: Duration,
    ) -> Result<Value, FetchError> {
        let request = builder.header(API_KEY_HEADER, self.api_key.expose());

        match tokio::time::timeout(timeout, Self::execute(request)).await {
            Ok(result) => {
                if let Err(error) = &result {
                    tracing::warn!(path, error = %error, "financial data request failed");
                }
                result
            }
            Err(_) => {
                tracing::warn!(path, timeout_ms = timeout.as_millis() as u64, "financial data request timed out");
                Err(FetchError::timeout(format!(
                    "request to {path} exceeded {}ms",
                    timeout.as_millis()
                )))
            }
        }
    }

    async fn execute(request: RequestBuilder) -> Result<Value, FetchError> {
        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                FetchError::timeout(err.to_string())
            } else {
                FetchError::transport(err.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::upstream(
                status.as_u16(),
                format!("HTTP error! status: {}", status.as_u16()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| FetchError::transport(err.to_string()))?;
        serde_json::from_slice(&body).map_err(|err| FetchError::decode(err.to_string()))
    }
}
