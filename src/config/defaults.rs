/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Region defaults
pub const DEFAULT_REGIONS: &[&str] = &["US"];
pub const DEFAULT_MAX_RETRIES: u32 = 10;
pub const DEFAULT_MAX_CONCURRENT_REGIONS: usize = 1;

// Endpoint defaults
pub const DEFAULT_CATALOG_URL: &str = "https://tubitv.com/live";
pub const DEFAULT_EPG_URL: &str = "https://tubitv.com/oz/epg/programming";
pub const DEFAULT_PROXY_LIST_URL: &str = "https://api.proxyscrape.com/v2/";
pub const DEFAULT_GUIDE_URL_TEMPLATE: &str =
    "https://github.com/dtankdempse/tubi-m3u/raw/refs/heads/main/tubi_epg_{region}.xml";

// Proxy listing defaults
pub const DEFAULT_PROXY_PROTOCOL: &str = "socks4";
pub const DEFAULT_PROXY_LISTING_TIMEOUT_MS: u32 = 10_000;
pub const DEFAULT_PROXY_SSL: &str = "all";
pub const DEFAULT_PROXY_ANONYMITY: &str = "elite";
pub const DEFAULT_PROXY_REQUEST_TIMEOUT_SECS: u64 = 30;

// Catalog defaults
pub const DEFAULT_CATALOG_MARKER: &str = "window.__data";
pub const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 10;

// EPG defaults
pub const DEFAULT_EPG_BATCH_SIZE: usize = 150;
pub const DEFAULT_EPG_BATCH_CONCURRENCY: usize = 4;
pub const DEFAULT_EPG_TIMEOUT_SECS: u64 = 10;

// Output defaults
pub const DEFAULT_OUTPUT_DIRECTORY: &str = ".";
pub const DEFAULT_PLAYLIST_PATTERN: &str = "tubi_playlist_{region}.m3u";
pub const DEFAULT_GUIDE_PATTERN: &str = "tubi_epg_{region}.xml";

/// Placeholder substituted with the lower-cased region code
pub const REGION_PLACEHOLDER: &str = "{region}";
