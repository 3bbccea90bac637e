//! Proxy listing source
//!
//! Asks a proxyscrape-style listing service for proxies in a country and wraps
//! each `host:port` line as a [`ProxyHandle`].

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::ProxyConfig;
use crate::errors::{SourceError, SourceResult};
use crate::models::{ProxyHandle, Region};
use crate::sources::traits::ProxyProvider;
use crate::utils::{HttpClientFactory, UrlUtils};

/// Proxy pool backed by a listing service
pub struct ProxyPool {
    client: Client,
    listing_url: String,
    config: ProxyConfig,
}

impl ProxyPool {
    pub fn new(
        factory: &HttpClientFactory,
        listing_url: impl Into<String>,
        config: ProxyConfig,
    ) -> SourceResult<Self> {
        Ok(Self {
            client: factory.direct(config.request_timeout)?,
            listing_url: listing_url.into(),
            config,
        })
    }

    fn query(&self, region: &Region) -> Vec<(&'static str, String)> {
        vec![
            ("request", "displayproxies".to_string()),
            ("protocol", self.config.protocol.clone()),
            ("timeout", self.config.listing_timeout_ms.to_string()),
            ("country", region.upper()),
            ("ssl", self.config.ssl.clone()),
            ("anonymity", self.config.anonymity.clone()),
        ]
    }

    /// Fetch the listing, failing on transport errors, non-success status
    /// and empty bodies
    pub async fn fetch_listing(&self, region: &Region) -> SourceResult<Vec<ProxyHandle>> {
        let url = UrlUtils::obfuscate_credentials(&self.listing_url).into_owned();
        debug!("Fetching proxy list for {} from {}", region, url);

        let response = self
            .client
            .get(&self.listing_url)
            .query(&self.query(region))
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(&url, e))?;

        if !response.status().is_success() {
            return Err(SourceError::status(response.status(), url));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::from_reqwest(&url, e))?;

        let proxies = parse_listing(&self.config.protocol, &body);
        if proxies.is_empty() {
            return Err(SourceError::extraction(format!(
                "proxy listing for {region} was empty"
            )));
        }
        Ok(proxies)
    }
}

/// Parse a newline-separated `host:port` listing
pub fn parse_listing(protocol: &str, body: &str) -> Vec<ProxyHandle> {
    body.lines()
        .filter_map(|line| ProxyHandle::from_listing_line(protocol, line))
        .collect()
}

#[async_trait]
impl ProxyProvider for ProxyPool {
    async fn fetch(&self, region: &Region) -> Vec<ProxyHandle> {
        match self.fetch_listing(region).await {
            Ok(proxies) => {
                info!("Found {} {} proxies for {}", proxies.len(), self.config.protocol, region);
                proxies
            }
            Err(e) => {
                warn!("Failed to fetch proxies for {}: {}", region, e);
                Vec::new()
            }
        }
    }
}
