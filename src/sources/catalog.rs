//! Catalog page fetcher
//!
//! Requests the live catalog page through one proxy and decodes the embedded
//! data blob. Every failure mode (transport, status, missing marker, decode) is
//! reported the same way to the caller: this proxy did not work.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::CatalogConfig;
use crate::errors::{SourceError, SourceResult};
use crate::models::ProxyHandle;
use crate::sources::blob;
use crate::sources::traits::CatalogSource;
use crate::utils::HttpClientFactory;

pub struct CatalogFetcher {
    factory: HttpClientFactory,
    url: String,
    marker: String,
    timeout: Duration,
}

impl CatalogFetcher {
    pub fn new(factory: HttpClientFactory, url: impl Into<String>, config: &CatalogConfig) -> Self {
        Self {
            factory,
            url: url.into(),
            marker: config.marker.clone(),
            timeout: config.request_timeout,
        }
    }

    /// Fetch and decode with an already-built client
    pub async fn fetch_with(&self, client: &Client) -> SourceResult<Value> {
        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(&self.url, e))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(SourceError::status(response.status(), self.url.as_str()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::from_reqwest(&self.url, e))?;
        let html = String::from_utf8_lossy(&bytes);
        debug!("Fetched {} bytes of catalog markup", bytes.len());

        let value = blob::extract_catalog(&html, &self.marker)?;
        info!("Decoded catalog data from {}", self.url);
        Ok(value)
    }
}

#[async_trait]
impl CatalogSource for CatalogFetcher {
    async fn fetch(&self, proxy: &ProxyHandle) -> SourceResult<Value> {
        let client = self.factory.through_proxy(proxy, self.timeout)?;
        self.fetch_with(&client).await
    }
}
