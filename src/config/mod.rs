use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::models::Region;

pub mod defaults;
pub mod duration_serde;

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Region codes to harvest, e.g. `["US", "CA"]`
    #[serde(default = "default_regions")]
    pub regions: Vec<String>,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub epg: EpgConfig,
    #[serde(default)]
    pub guide: GuideConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of proxies tried per region before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
    #[serde(default = "default_epg_url")]
    pub epg_url: String,
    #[serde(default = "default_proxy_list_url")]
    pub proxy_list_url: String,
    /// `url-tvg` value written into the playlist header
    #[serde(default = "default_guide_url_template")]
    pub guide_url_template: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy scheme requested from the listing service and used for egress
    #[serde(default = "default_proxy_protocol")]
    pub protocol: String,
    /// Liveness timeout passed through to the listing service, in milliseconds
    #[serde(default = "default_proxy_listing_timeout_ms")]
    pub listing_timeout_ms: u32,
    #[serde(default = "default_proxy_ssl")]
    pub ssl: String,
    #[serde(default = "default_proxy_anonymity")]
    pub anonymity: String,
    /// Timeout for the listing request itself
    #[serde(default = "default_proxy_request_timeout", with = "duration_serde::duration")]
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Prefix identifying the script block that carries the catalog blob
    #[serde(default = "default_catalog_marker")]
    pub marker: String,
    #[serde(default = "default_catalog_timeout", with = "duration_serde::duration")]
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpgConfig {
    /// Content ids per programming request
    #[serde(default = "default_epg_batch_size")]
    pub batch_size: usize,
    /// Batches in flight at once
    #[serde(default = "default_epg_batch_concurrency")]
    pub batch_concurrency: usize,
    #[serde(default = "default_epg_timeout", with = "duration_serde::duration")]
    pub request_timeout: Duration,
    /// Send programming requests through the proxy that served the catalog
    #[serde(default)]
    pub route_through_proxy: bool,
}

/// What to do with a programme whose timestamp is not `YYYY-MM-DDTHH:MM:SSZ`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidTimestampPolicy {
    /// Write the upstream string unchanged
    #[default]
    PassThrough,
    /// Drop the programme
    Skip,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuideConfig {
    #[serde(default)]
    pub invalid_timestamps: InvalidTimestampPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_playlist_pattern")]
    pub playlist_pattern: String,
    #[serde(default = "default_guide_pattern")]
    pub guide_pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Regions harvested in parallel
    #[serde(default = "default_max_concurrent_regions")]
    pub max_concurrent_regions: usize,
}

fn default_regions() -> Vec<String> {
    DEFAULT_REGIONS.iter().map(|r| r.to_string()).collect()
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_epg_url() -> String {
    DEFAULT_EPG_URL.to_string()
}

fn default_proxy_list_url() -> String {
    DEFAULT_PROXY_LIST_URL.to_string()
}

fn default_guide_url_template() -> String {
    DEFAULT_GUIDE_URL_TEMPLATE.to_string()
}

fn default_proxy_protocol() -> String {
    DEFAULT_PROXY_PROTOCOL.to_string()
}

fn default_proxy_listing_timeout_ms() -> u32 {
    DEFAULT_PROXY_LISTING_TIMEOUT_MS
}

fn default_proxy_ssl() -> String {
    DEFAULT_PROXY_SSL.to_string()
}

fn default_proxy_anonymity() -> String {
    DEFAULT_PROXY_ANONYMITY.to_string()
}

fn default_proxy_request_timeout() -> Duration {
    Duration::from_secs(DEFAULT_PROXY_REQUEST_TIMEOUT_SECS)
}

fn default_catalog_marker() -> String {
    DEFAULT_CATALOG_MARKER.to_string()
}

fn default_catalog_timeout() -> Duration {
    Duration::from_secs(DEFAULT_CATALOG_TIMEOUT_SECS)
}

fn default_epg_batch_size() -> usize {
    DEFAULT_EPG_BATCH_SIZE
}

fn default_epg_batch_concurrency() -> usize {
    DEFAULT_EPG_BATCH_CONCURRENCY
}

fn default_epg_timeout() -> Duration {
    Duration::from_secs(DEFAULT_EPG_TIMEOUT_SECS)
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIRECTORY)
}

fn default_playlist_pattern() -> String {
    DEFAULT_PLAYLIST_PATTERN.to_string()
}

fn default_guide_pattern() -> String {
    DEFAULT_GUIDE_PATTERN.to_string()
}

fn default_max_concurrent_regions() -> usize {
    DEFAULT_MAX_CONCURRENT_REGIONS
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            catalog_url: default_catalog_url(),
            epg_url: default_epg_url(),
            proxy_list_url: default_proxy_list_url(),
            guide_url_template: default_guide_url_template(),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            protocol: default_proxy_protocol(),
            listing_timeout_ms: default_proxy_listing_timeout_ms(),
            ssl: default_proxy_ssl(),
            anonymity: default_proxy_anonymity(),
            request_timeout: default_proxy_request_timeout(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            marker: default_catalog_marker(),
            request_timeout: default_catalog_timeout(),
        }
    }
}

impl Default for EpgConfig {
    fn default() -> Self {
        Self {
            batch_size: default_epg_batch_size(),
            batch_concurrency: default_epg_batch_concurrency(),
            request_timeout: default_epg_timeout(),
            route_through_proxy: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            playlist_pattern: default_playlist_pattern(),
            guide_pattern: default_guide_pattern(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_concurrent_regions: default_max_concurrent_regions(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            regions: default_regions(),
            retry: RetryConfig::default(),
            endpoints: EndpointConfig::default(),
            proxy: ProxyConfig::default(),
            catalog: CatalogConfig::default(),
            epg: EpgConfig::default(),
            guide: GuideConfig::default(),
            output: OutputConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

/// Substitute the lower-cased region code into a `{region}` template.
pub fn render_region_template(template: &str, region: &str) -> String {
    template.replace(REGION_PLACEHOLDER, &region.to_lowercase())
}

impl Config {
    /// Read the config file, or write the defaults to it when it does not exist yet.
    pub fn load_from_file(config_file: &str) -> AppResult<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)
                .map_err(|e| AppError::io(config_file, e))?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents).map_err(|e| AppError::io(config_file, e))?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }

    /// Reject configurations that cannot produce any output.
    pub fn validate(&self) -> AppResult<()> {
        if self.regions.iter().all(|r| r.trim().is_empty()) {
            return Err(AppError::configuration("no regions configured"));
        }
        if self.retry.max_retries == 0 {
            return Err(AppError::configuration("retry.max_retries must be at least 1"));
        }
        if self.epg.batch_size == 0 {
            return Err(AppError::configuration("epg.batch_size must be at least 1"));
        }
        if self.epg.batch_concurrency == 0 || self.runtime.max_concurrent_regions == 0 {
            return Err(AppError::configuration("concurrency limits must be at least 1"));
        }
        for (field, template) in [
            ("output.playlist_pattern", &self.output.playlist_pattern),
            ("output.guide_pattern", &self.output.guide_pattern),
        ] {
            if !template.contains(REGION_PLACEHOLDER) {
                return Err(AppError::configuration(format!(
                    "{field} must contain {REGION_PLACEHOLDER} so regions do not overwrite each other"
                )));
            }
        }
        Ok(())
    }

    /// Configured regions, trimmed, with blanks and case-insensitive repeats
    /// removed
    pub fn region_list(&self) -> Vec<Region> {
        let mut regions: Vec<Region> = Vec::new();
        for code in &self.regions {
            let region = Region::new(code.as_str());
            if region.code().is_empty() || regions.iter().any(|r| r.lower() == region.lower()) {
                continue;
            }
            regions.push(region);
        }
        regions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.regions, vec!["US".to_string()]);
        assert_eq!(config.retry.max_retries, 10);
        assert_eq!(config.epg.batch_size, 150);
        assert_eq!(config.guide.invalid_timestamps, InvalidTimestampPolicy::PassThrough);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            regions = ["US", "CA"]

            [epg]
            batch_size = 50
            request_timeout = "3s"

            [guide]
            invalid_timestamps = "skip"
            "#,
        )
        .unwrap();

        assert_eq!(config.regions.len(), 2);
        assert_eq!(config.epg.batch_size, 50);
        assert_eq!(config.epg.request_timeout, Duration::from_secs(3));
        assert_eq!(config.epg.batch_concurrency, DEFAULT_EPG_BATCH_CONCURRENCY);
        assert_eq!(config.guide.invalid_timestamps, InvalidTimestampPolicy::Skip);
        assert_eq!(config.catalog.marker, "window.__data");
    }

    #[test]
    fn test_validation_rejects_empty_regions() {
        let config = Config {
            regions: vec![],
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("no regions configured"));
    }

    #[test]
    fn test_validation_rejects_pattern_without_region() {
        let mut config = Config::default();
        config.output.guide_pattern = "epg.xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_writes_defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let path_str = path.to_str().unwrap();

        let config = Config::load_from_file(path_str).unwrap();
        assert!(path.exists());
        assert_eq!(config.retry.max_retries, DEFAULT_MAX_RETRIES);

        let reloaded = Config::load_from_file(path_str).unwrap();
        assert_eq!(reloaded.endpoints.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(reloaded.catalog.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_render_region_template_lowercases() {
        assert_eq!(
            render_region_template("tubi_epg_{region}.xml", "US"),
            "tubi_epg_us.xml"
        );
    }

    #[test]
    fn test_region_list_drops_blanks_and_repeats() {
        let config = Config {
            regions: vec!["US".into(), " ".into(), "us".into(), " ca ".into()],
            ..Config::default()
        };
        let codes: Vec<String> = config.region_list().iter().map(|r| r.code().to_string()).collect();
        assert_eq!(codes, vec!["US", "ca"]);
    }
}
