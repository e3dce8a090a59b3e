//! HTTP client with reactive basic authentication.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::config::ServerSettings;

/// Errors raised while fetching report pages or artifacts.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
}

/// HTTP client for the observatory server.
///
/// Requests go out unauthenticated first; a 401 challenge is answered once
/// with basic credentials from the settings. No retry beyond that.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    credentials: Option<(String, String)>,
}

impl HttpClient {
    /// Create a new HTTP client from server settings.
    pub fn new(settings: &ServerSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .gzip(true)
            .build()?;

        let credentials = match (&settings.username, &settings.password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        };

        Ok(Self {
            client,
            credentials,
        })
    }

    /// Fetch a page as text.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.get(url).await?;
        Ok(response.text().await?)
    }

    /// Fetch a resource as raw bytes.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.get(url).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn get(&self, url: &str) -> Result<Response, FetchError> {
        let mut response = self.client.get(url).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some((user, pass)) = &self.credentials {
                debug!("authorization challenge for {}, retrying with credentials", url);
                response = self
                    .client
                    .get(url)
                    .basic_auth(user, Some(pass))
                    .send()
                    .await?;
            }
        }

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }
}
