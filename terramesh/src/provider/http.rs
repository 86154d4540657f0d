//! HTTP client abstraction for testability

use bytes::Bytes;

use super::types::FetchError;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Trait for async HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Returns
    ///
    /// The response body as bytes, or an error. Statuses outside [200, 304]
    /// are reported as [`FetchError::HttpStatus`]; requests that never
    /// produce an HTTP response as [`FetchError::Transport`].
    async fn get(&self, url: &str) -> Result<Bytes, FetchError>;

    /// Performs an HTTP GET request with an explicit `Accept` header.
    async fn get_with_accept(&self, url: &str, accept: &str) -> Result<Bytes, FetchError>;
}

/// Real async HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new client with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new client with a custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Bytes, FetchError> {
        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        if !(200..=304).contains(&status) {
            return Err(FetchError::HttpStatus(status));
        }

        response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(format!("Failed to read response body: {}", e)))
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Bytes, FetchError> {
        self.execute(self.client.get(url)).await
    }

    async fn get_with_accept(&self, url: &str, accept: &str) -> Result<Bytes, FetchError> {
        self.execute(self.client.get(url).header(reqwest::header::ACCEPT, accept))
            .await
    }
}
