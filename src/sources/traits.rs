//! Source trait definitions
//!
//! Each upstream the pipeline talks to sits behind one focused async trait so
//! the orchestrator can be driven against fakes in tests and against the real
//! HTTP implementations in production.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SourceResult;
use crate::models::{ProxyHandle, Region, Station};

/// Supplies candidate egress proxies for a region
#[async_trait]
pub trait ProxyProvider: Send + Sync {
    /// Candidate proxies in upstream order. Listing failures are soft: they
    /// are logged and reported as an empty list.
    async fn fetch(&self, region: &Region) -> Vec<ProxyHandle>;
}

/// Fetches and decodes the catalog blob through one proxy
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self, proxy: &ProxyHandle) -> SourceResult<Value>;
}

/// Fetches programming rows for a list of content ids
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// `proxy` is the egress that served the catalog, for sources that route
    /// their requests through it.
    async fn fetch(&self, content_ids: &[String], proxy: Option<&ProxyHandle>) -> Vec<Station>;
}
