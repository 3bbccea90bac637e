//! Run results

use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

use crate::models::Region;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RegionOutcome {
    Success {
        attempts: u32,
        channels: usize,
        stations: usize,
        playlist_path: PathBuf,
        guide_path: PathBuf,
    },
    /// Every allowed proxy failed, or none were available
    Exhausted {
        attempts: u32,
        last_error: Option<String>,
    },
    /// Data was fetched but the outputs could not be written
    WriteFailed { attempts: u32, message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionReport {
    pub region: Region,
    #[serde(flatten)]
    pub outcome: RegionOutcome,
}

impl RegionReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, RegionOutcome::Success { .. })
    }

    /// The single summary line for this region
    pub fn log(&self) {
        match &self.outcome {
            RegionOutcome::Success {
                attempts,
                channels,
                stations,
                playlist_path,
                guide_path,
            } => info!(
                "Region {}: success after {} attempt(s); {} channels, {} stations -> {}, {}",
                self.region,
                attempts,
                channels,
                stations,
                playlist_path.display(),
                guide_path.display()
            ),
            RegionOutcome::Exhausted {
                attempts,
                last_error,
            } => error!(
                "Region {}: exhausted after {} attempt(s); last error: {}",
                self.region,
                attempts,
                last_error.as_deref().unwrap_or("none")
            ),
            RegionOutcome::WriteFailed { attempts, message } => error!(
                "Region {}: fetched after {} attempt(s) but writing failed: {}",
                self.region, attempts, message
            ),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub regions: Vec<RegionReport>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.regions.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.regions.len() - self.succeeded()
    }

    pub fn report(&self, region: &str) -> Option<&RegionReport> {
        self.regions
            .iter()
            .find(|r| r.region.code().eq_ignore_ascii_case(region))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_lookup() {
        let summary = RunSummary {
            regions: vec![
                RegionReport {
                    region: Region::new("US"),
                    outcome: RegionOutcome::Success {
                        attempts: 2,
                        channels: 3,
                        stations: 3,
                        playlist_path: "a.m3u".into(),
                        guide_path: "a.xml".into(),
                    },
                },
                RegionReport {
                    region: Region::new("xx"),
                    outcome: RegionOutcome::Exhausted {
                        attempts: 0,
                        last_error: None,
                    },
                },
            ],
        };

        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 1);
        assert!(summary.report("us").unwrap().is_success());
        assert!(summary.report("XX").is_some());
        assert!(summary.report("ca").is_none());

        let json = serde_json::to_value(&summary.regions[1]).unwrap();
        assert_eq!(json["outcome"], "exhausted");
        assert_eq!(json["region"], "xx");
    }
}
