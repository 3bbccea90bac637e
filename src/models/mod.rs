use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub mod station;

pub use station::{Manifest, Program, ProgramRecord, Station, StationImages, VideoResource};

/// Group label used when a content id has no category
pub const DEFAULT_GROUP: &str = "Other";

/// Country/region code selecting a proxy pool and an output file set
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(String);

impl Region {
    pub fn new<S: Into<String>>(code: S) -> Self {
        Self(code.into().trim().to_string())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// Form sent to the proxy listing service (`US`)
    pub fn upper(&self) -> String {
        self.0.to_uppercase()
    }

    /// Form used in file names and the guide URL (`us`)
    pub fn lower(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Egress proxy descriptor (`socks4://host:port`) owned by a single fetch attempt
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProxyHandle {
    scheme: String,
    address: String,
}

impl ProxyHandle {
    pub fn new<S: Into<String>, A: Into<String>>(scheme: S, address: A) -> Self {
        Self {
            scheme: scheme.into(),
            address: address.into(),
        }
    }

    /// Parse one `host:port` line from the listing service. Blank lines and
    /// lines without a port separator yield `None`.
    pub fn from_listing_line(scheme: &str, line: &str) -> Option<Self> {
        let address = line.trim();
        if address.is_empty() || !address.contains(':') {
            return None;
        }
        Some(Self::new(scheme, address))
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn url(&self) -> String {
        format!("{}://{}", self.scheme, self.address)
    }
}

impl fmt::Display for ProxyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.address)
    }
}

/// `content_id -> group label`, built once per catalog fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupMapping {
    groups: HashMap<String, String>,
}

impl GroupMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the group for an id. A later insert for the same id replaces the
    /// earlier one.
    pub fn insert<I: Into<String>, G: Into<String>>(&mut self, content_id: I, group: G) {
        self.groups.insert(content_id.into(), group.into());
    }

    /// Group label for an id, `Other` when unknown
    pub fn group_for(&self, content_id: &str) -> &str {
        self.groups
            .get(content_id)
            .map(String::as_str)
            .unwrap_or(DEFAULT_GROUP)
    }

    pub fn content_ids(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Output of channel extraction: ids in catalog order plus their group labels
#[derive(Debug, Clone, Default)]
pub struct ChannelIndex {
    /// Concatenation of every category's contents; may contain duplicates
    pub content_ids: Vec<String>,
    pub groups: GroupMapping,
}

impl ChannelIndex {
    pub fn is_empty(&self) -> bool {
        self.content_ids.is_empty()
    }
}
