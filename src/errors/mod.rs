//! Centralized error handling for the harvester
//!
//! Fetch-time failures are modelled by [`SourceError`]; they are recovered at the
//! orchestrator's retry boundary and never abort a run. [`AppError`] wraps them
//! together with the configuration and I/O failures that can stop a region's
//! write step.
//!
//! # Error Categories
//!
//! - **Transport**: connection failures and timeouts, including proxy failures
//! - **Upstream status**: non-success HTTP responses
//! - **Extraction**: the embedded catalog blob could not be located
//! - **Decode**: the repaired blob still failed to parse
//! - **Batch partial failure**: one EPG batch was lost, the others survive
//!
//! # Usage
//!
//! ```rust
//! use tubi_m3u::errors::{SourceError, SourceResult};
//!
//! fn locate(body: &str) -> SourceResult<&str> {
//!     body.find('{')
//!         .map(|start| &body[start..])
//!         .ok_or_else(|| SourceError::extraction("no object literal in script"))
//! }
//!
//! assert!(locate("{}").is_ok());
//! assert!(locate("nothing").is_err());
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;
