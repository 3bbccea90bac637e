//! Per-region retry state machine
//!
//! `Idle -> FetchingProxies -> TryingProxy* -> Success | Exhausted`
//!
//! One [`RegionRun`] value is owned by each region's pipeline and passed by
//! mutable reference through the retry loop. Proxies are consumed from the
//! front of the queue, so none is tried twice within one run.

use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

use crate::errors::SourceError;
use crate::models::{ProxyHandle, Region};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionState {
    Idle,
    FetchingProxies,
    TryingProxy { attempt: u32, proxy: String },
    Success,
    Exhausted,
}

impl RegionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RegionState::Success | RegionState::Exhausted)
    }
}

impl fmt::Display for RegionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionState::Idle => write!(f, "idle"),
            RegionState::FetchingProxies => write!(f, "fetching_proxies"),
            RegionState::TryingProxy { attempt, proxy } => {
                write!(f, "trying_proxy(#{attempt} {proxy})")
            }
            RegionState::Success => write!(f, "success"),
            RegionState::Exhausted => write!(f, "exhausted"),
        }
    }
}

#[derive(Debug)]
pub struct RegionRun {
    region: Region,
    state: RegionState,
    queue: VecDeque<ProxyHandle>,
    attempts: u32,
    max_retries: u32,
    last_error: Option<String>,
}

impl RegionRun {
    pub fn new(region: Region, max_retries: u32) -> Self {
        Self {
            region,
            state: RegionState::Idle,
            queue: VecDeque::new(),
            attempts: 0,
            max_retries,
            last_error: None,
        }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn state(&self) -> &RegionState {
        &self.state
    }

    /// Proxies tried so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn begin_fetching_proxies(&mut self) {
        debug_assert_eq!(self.state, RegionState::Idle);
        self.state = RegionState::FetchingProxies;
    }

    /// Install the candidate proxies; an empty list exhausts the region
    pub fn load_proxies(&mut self, proxies: Vec<ProxyHandle>) {
        if proxies.is_empty() {
            self.last_error = Some("no proxies available".to_string());
            self.state = RegionState::Exhausted;
        } else {
            self.queue = proxies.into();
        }
    }

    /// Pop the next proxy to try, or exhaust the region when the retry bound
    /// is hit or the queue is empty.
    pub fn next_proxy(&mut self) -> Option<ProxyHandle> {
        if self.state.is_terminal() {
            return None;
        }
        if self.attempts >= self.max_retries {
            self.state = RegionState::Exhausted;
            return None;
        }
        let Some(proxy) = self.queue.pop_front() else {
            self.state = RegionState::Exhausted;
            return None;
        };

        self.attempts += 1;
        self.state = RegionState::TryingProxy {
            attempt: self.attempts,
            proxy: proxy.url(),
        };
        Some(proxy)
    }

    pub fn record_failure(&mut self, error: &SourceError) {
        self.last_error = Some(error.to_string());
    }

    /// Stop trying proxies after a failure another proxy cannot fix
    pub fn abandon(&mut self) {
        self.state = RegionState::Exhausted;
    }

    pub fn succeed(&mut self) {
        self.state = RegionState::Success;
    }
}
