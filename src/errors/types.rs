//! Error type definitions for the harvester
//!
//! The hierarchy mirrors the pipeline boundaries: everything that can go wrong
//! while talking to the upstream site is a [`SourceError`], everything that can
//! go wrong around it (configuration, files) is an [`AppError`].

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Source handling errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Output file errors
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config file could not be rendered
    #[error("Config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

/// Errors raised while talking to the proxy listing service, the catalog page
/// or the EPG endpoint
#[derive(Error, Debug)]
pub enum SourceError {
    /// Connection failures, proxy failures and timeouts
    #[error("Transport error: {url} - {message}")]
    Transport { url: String, message: String },

    /// Non-success HTTP status
    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    /// The embedded data blob could not be located in the page
    #[error("Extraction failed: {message}")]
    Extraction { message: String },

    /// The repaired blob is still not valid JSON
    #[error("Decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// A single EPG batch failed; other batches are unaffected
    #[error("EPG batch {batch} failed: {message}")]
    BatchPartialFailure { batch: usize, message: String },
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wrap an I/O error with the path it happened on
    pub fn io<P: Into<String>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl SourceError {
    /// Create a transport error for a URL
    pub fn transport<U: Into<String>, M: ToString>(url: U, message: M) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create an upstream status error
    pub fn status<U: Into<String>>(status: reqwest::StatusCode, url: U) -> Self {
        Self::UpstreamStatus {
            status: status.as_u16(),
            url: url.into(),
        }
    }

    /// Create an extraction error
    pub fn extraction<S: Into<String>>(message: S) -> Self {
        Self::Extraction {
            message: message.into(),
        }
    }

    /// Classify a reqwest failure. Timeouts and connection errors are both
    /// transport failures; a body that fails to decode is reported as such.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::status(status, url);
        }
        let message = if err.is_timeout() {
            format!("timed out: {err}")
        } else {
            err.to_string()
        };
        Self::transport(url, message)
    }

    /// Whether the orchestrator should move on to the next proxy
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::BatchPartialFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_errors_are_retryable() {
        assert!(SourceError::transport("http://x", "refused").is_retryable());
        assert!(SourceError::extraction("marker not found").is_retryable());
        assert!(
            SourceError::UpstreamStatus {
                status: 403,
                url: "http://x".into()
            }
            .is_retryable()
        );
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(SourceError::from(decode).is_retryable());
    }

    #[test]
    fn batch_failures_are_not_retryable() {
        let err = SourceError::BatchPartialFailure {
            batch: 2,
            message: "HTTP 500".into(),
        };
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "EPG batch 2 failed: HTTP 500");
    }

    #[test]
    fn source_errors_convert_into_app_errors() {
        let app: AppError = SourceError::extraction("missing").into();
        assert!(matches!(app, AppError::Source(SourceError::Extraction { .. })));
    }
}
