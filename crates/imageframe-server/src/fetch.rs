//! Download of original assets from the photo server.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Header carrying the photo server API key.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS, timeout or body read failure.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// What the photo server answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    pub status: u16,
    /// Response body, only read when the status is 200.
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct AssetFetcher {
    client: reqwest::Client,
    server_url: String,
    api_key: String,
}

impl AssetFetcher {
    pub fn new(
        server_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, server_url, api_key))
    }

    pub fn with_client(
        client: reqwest::Client,
        server_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            server_url: server_url.into(),
            api_key: api_key.into(),
        }
    }

    /// URL of the original file for `asset_id`. The id is inserted verbatim.
    pub fn asset_url(&self, asset_id: &str) -> String {
        format!(
            "{}/{}/original",
            self.server_url.trim_end_matches('/'),
            asset_id
        )
    }

    /// GET the original asset.
    ///
    /// Any HTTP status is a successful fetch; the body is only downloaded
    /// for 200.
    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self, asset_id: &str) -> Result<FetchedAsset, FetchError> {
        let url = self.asset_url(asset_id);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "photo server responded");

        if status != StatusCode::OK {
            return Ok(FetchedAsset {
                status: status.as_u16(),
                body: None,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport { url, source })?;

        Ok(FetchedAsset {
            status: status.as_u16(),
            body: Some(body.to_vec()),
        })
    }
}
