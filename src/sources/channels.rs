//! Channel extraction from the decoded catalog
//!
//! The catalog lists its channels under
//! `epg.contentIdsByContainer.<container>[].{name, contents}`. Any level may be
//! missing; missing levels contribute nothing.

use serde_json::Value;
use tracing::debug;

use crate::models::station::id_to_string;
use crate::models::{ChannelIndex, DEFAULT_GROUP};
use crate::utils::ValueExt;
use crate::utils::json::items_of;

const CONTAINER_PATH: &[&str] = &["epg", "contentIdsByContainer"];

pub struct ChannelExtractor;

impl ChannelExtractor {
    /// Collect content ids in catalog order and map each to its category name.
    ///
    /// Ids listed in several categories appear once per listing in the id list,
    /// and take the name of the last category that lists them.
    pub fn extract(decoded: &Value) -> ChannelIndex {
        let mut index = ChannelIndex::default();

        for item in decoded.as_list() {
            let Some(containers) = item.path(CONTAINER_PATH).and_then(ValueExt::members) else {
                continue;
            };

            for categories in containers.values() {
                for category in categories.items() {
                    let name = category.str_field("name").unwrap_or(DEFAULT_GROUP);
                    for content_id in items_of(category.field("contents"))
                        .iter()
                        .filter_map(id_to_string)
                    {
                        index.groups.insert(content_id.clone(), name);
                        index.content_ids.push(content_id);
                    }
                }
            }
        }

        debug!(
            "Extracted {} content ids across {} distinct channels",
            index.content_ids.len(),
            index.groups.len()
        );
        index
    }
}
