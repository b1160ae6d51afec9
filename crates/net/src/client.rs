//! HTTP client with connection pooling

use artifetch_errors::{Error, NetworkError};
use futures::StreamExt;
use reqwest::{Client, Response};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            connect_timeout: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: format!("artifetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Thin wrapper around a pooled reqwest client
///
/// Requests are attempted once. A failed download surfaces as the job's
/// outcome and is retried by running the tool again.
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created with default settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Execute a GET request, rejecting non-success statuses
    ///
    /// # Errors
    ///
    /// Returns an error on timeouts, connection failures, or a non-2xx status.
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        let url = url::Url::parse(url).map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| map_reqwest_error(&e, url.as_str()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpError {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            }
            .into());
        }

        Ok(response)
    }

    /// Stream the response body of `url` into a new file at `dest`
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the file cannot be written.
    pub async fn download_to(&self, url: &str, dest: &Path) -> Result<u64, Error> {
        let response = self.get(url).await?;

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| NetworkError::DownloadFailed(e.to_string()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::io_with_path(&e, dest))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;
        Ok(written)
    }
}

fn map_reqwest_error(err: &reqwest::Error, url: &str) -> Error {
    if err.is_timeout() {
        NetworkError::Timeout {
            url: url.to_string(),
        }
        .into()
    } else if err.is_connect() {
        NetworkError::ConnectionRefused(err.to_string()).into()
    } else {
        NetworkError::DownloadFailed(err.to_string()).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NetConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("artifetch/"));
    }

    #[tokio::test]
    async fn test_invalid_url_rejected_before_request() {
        let client = NetClient::with_defaults().unwrap();
        let err = client.get("not a url").await.unwrap_err();
        assert!(matches!(err, Error::Network(NetworkError::InvalidUrl(_))));
    }
}
