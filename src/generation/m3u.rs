//! M3U playlist generation
//!
//! Stations are sorted by title (case-insensitive), reduced to one entry per
//! canonical stream URL, and written as `#EXTINF` + URL line pairs under a
//! header that points players at the matching guide document.

use std::collections::HashSet;
use tracing::debug;

use crate::config::render_region_template;
use crate::models::{GroupMapping, Region, Station};
use crate::utils::UrlUtils;

pub const UNKNOWN_CHANNEL: &str = "Unknown Channel";

/// One surviving playlist channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub content_id: String,
    pub title: String,
    pub group: String,
    pub logo_url: String,
    pub stream_url: String,
}

impl PlaylistEntry {
    pub fn extinf_line(&self) -> String {
        format!(
            "#EXTINF:-1 tvg-id=\"{}\" tvg-logo=\"{}\" group-title=\"{}\",{}",
            single_line(&self.content_id),
            single_line(&self.logo_url),
            single_line(&self.group),
            single_line(&self.title)
        )
    }
}

/// Keep every entry on its own line
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

pub struct PlaylistBuilder {
    guide_url_template: String,
}

impl PlaylistBuilder {
    pub fn new(guide_url_template: impl Into<String>) -> Self {
        Self {
            guide_url_template: guide_url_template.into(),
        }
    }

    pub fn guide_url(&self, region: &Region) -> String {
        render_region_template(&self.guide_url_template, region.code())
    }

    /// Sorted, deduplicated entries
    pub fn entries(stations: &[Station], groups: &GroupMapping) -> Vec<PlaylistEntry> {
        let mut sorted: Vec<&Station> = stations.iter().collect();
        sorted.sort_by_cached_key(|station| {
            station.title.as_deref().unwrap_or_default().to_lowercase()
        });

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(sorted.len());
        for station in sorted {
            let stream_url = UrlUtils::canonical_stream_url(station.raw_stream_url().unwrap_or_default());
            if stream_url.is_empty() || !seen.insert(stream_url.clone()) {
                continue;
            }

            entries.push(PlaylistEntry {
                content_id: station.content_id.clone(),
                title: station
                    .title
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_CHANNEL.to_string()),
                group: groups.group_for(&station.content_id).to_string(),
                logo_url: station.logo_url().unwrap_or_default().to_string(),
                stream_url,
            });
        }

        debug!(
            "Playlist keeps {} of {} stations after URL dedup",
            entries.len(),
            stations.len()
        );
        entries
    }

    /// Render the full playlist document
    pub fn build(&self, stations: &[Station], groups: &GroupMapping, region: &Region) -> String {
        let mut playlist = format!("#EXTM3U url-tvg=\"{}\"\n", self.guide_url(region));
        for entry in Self::entries(stations, groups) {
            playlist.push_str(&entry.extinf_line());
            playlist.push('\n');
            playlist.push_str(&entry.stream_url);
            playlist.push('\n');
        }
        playlist
    }
}
