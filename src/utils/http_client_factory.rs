//! HTTP Client Factory
//!
//! Centralizes construction of `reqwest` clients so every request carries a
//! timeout and the same user agent, whether it goes out directly or through
//! an egress proxy.

use reqwest::{Client, Proxy};
use std::time::Duration;
use tracing::debug;

use crate::errors::{SourceError, SourceResult};
use crate::models::ProxyHandle;

/// Factory for timeout-bounded HTTP clients
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    user_agent: String,
}

impl HttpClientFactory {
    /// Create a new HTTP client factory
    /// Automatically generates a standard user agent format
    pub fn new() -> Self {
        Self {
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }

    /// Client that connects directly
    pub fn direct(&self, timeout: Duration) -> SourceResult<Client> {
        Client::builder()
            .timeout(timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| SourceError::transport("client", e))
    }

    /// Client whose every request egresses through `proxy`
    pub fn through_proxy(&self, proxy: &ProxyHandle, timeout: Duration) -> SourceResult<Client> {
        let proxy_url = proxy.url();
        let egress = Proxy::all(&proxy_url)
            .map_err(|e| SourceError::transport(proxy_url.clone(), format!("invalid proxy: {e}")))?;

        debug!("Creating HTTP client through proxy {} (timeout {:?})", proxy_url, timeout);
        Client::builder()
            .proxy(egress)
            .timeout(timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| SourceError::transport(proxy_url, e))
    }
}

impl Default for HttpClientFactory {
    fn default() -> Self {
        Self::new()
    }
}
