//! Utility modules for the harvester
//!
//! This module contains reusable utilities that can be used
//! across different parts of the system.

pub mod http_client_factory;
pub mod json;
pub mod time;
pub mod url;

// Re-export commonly used types for convenience
pub use http_client_factory::HttpClientFactory;
pub use json::ValueExt;
pub use url::UrlUtils;
