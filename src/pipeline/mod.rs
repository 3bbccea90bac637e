//! Per-region acquisition pipeline
//!
//! [`Orchestrator`] drives each region through the [`RegionRun`] state machine,
//! writes outputs through [`OutputWriter`] and collects a [`RunSummary`].

pub mod orchestrator;
pub mod output;
pub mod state;
pub mod summary;

pub use orchestrator::Orchestrator;
pub use output::OutputWriter;
pub use state::{RegionRun, RegionState};
pub use summary::{RegionOutcome, RegionReport, RunSummary};
