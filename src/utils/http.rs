// src/utils/http.rs

//! HTTP client utilities and the transport seam.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::FetchConfig;

/// Fetches a URL and returns its decoded text.
///
/// The only blocking points of a run go through this trait, so tests swap in
/// an in-memory implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &FetchConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// `reqwest`-backed transport. Non-success statuses are errors.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    encoding: String,
}

impl HttpTransport {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            encoding: config.encoding.clone(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<String> {
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text_with_charset(&self.encoding).await?)
    }
}
