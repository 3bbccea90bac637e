//! Rows returned by the EPG programming endpoint.
//!
//! Every field is optional upstream; missing values deserialize to empty
//! defaults so one sparse row never sinks the rest of its batch.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One channel row with its schedule
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Station {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub content_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: StationImages,
    #[serde(default, deserialize_with = "null_as_default")]
    pub video_resources: Vec<VideoResource>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub programs: Vec<Program>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationImages {
    #[serde(default, deserialize_with = "null_as_default")]
    pub thumbnail: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoResource {
    #[serde(default)]
    pub manifest: Option<Manifest>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub url: Option<String>,
}

/// One schedule entry as served upstream
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

/// A schedule entry flattened together with its station's identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramRecord {
    pub content_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Upstream timestamp, `YYYY-MM-DDTHH:MM:SSZ` when well-formed
    pub start: String,
    pub stop: String,
    pub stream_url: Option<String>,
    pub logo_url: Option<String>,
}

impl Station {
    /// First thumbnail, used as the channel logo
    pub fn logo_url(&self) -> Option<&str> {
        self.images
            .thumbnail
            .first()
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }

    /// Manifest URL of the first video resource, as served (still encoded)
    pub fn raw_stream_url(&self) -> Option<&str> {
        self.video_resources
            .first()
            .and_then(|resource| resource.manifest.as_ref())
            .and_then(|manifest| manifest.url.as_deref())
            .filter(|url| !url.is_empty())
    }

    /// Flatten this station's schedule into records
    pub fn program_records(&self) -> impl Iterator<Item = ProgramRecord> + '_ {
        let logo_url = self.logo_url().map(str::to_string);
        let stream_url = self.raw_stream_url().map(str::to_string);
        self.programs.iter().map(move |program| ProgramRecord {
            content_id: self.content_id.clone(),
            title: program.title.clone().unwrap_or_default(),
            description: program.description.clone().filter(|d| !d.is_empty()),
            start: program.start_time.clone().unwrap_or_default(),
            stop: program.end_time.clone().unwrap_or_default(),
            stream_url: stream_url.clone(),
            logo_url: logo_url.clone(),
        })
    }
}

/// Stringify a content id that may arrive as a JSON number or string
pub fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(id_to_string(&value).unwrap_or_default())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_station_accepts_numeric_ids_and_nulls() {
        let station: Station = serde_json::from_value(json!({
            "content_id": 400000123,
            "title": "News 24",
            "images": { "thumbnail": null },
            "video_resources": null,
            "programs": [
                { "title": "Morning", "start_time": "2024-05-01T06:00:00Z", "end_time": "2024-05-01T07:00:00Z" }
            ]
        }))
        .unwrap();

        assert_eq!(station.content_id, "400000123");
        assert!(station.logo_url().is_none());
        assert!(station.raw_stream_url().is_none());
        assert_eq!(station.programs.len(), 1);
    }

    #[test]
    fn test_program_records_carry_station_identity() {
        let station: Station = serde_json::from_value(json!({
            "content_id": "42",
            "images": { "thumbnail": ["https://img/42.png"] },
            "video_resources": [ { "manifest": { "url": "https://cdn/42.m3u8?token=a" } } ],
            "programs": [
                { "title": "A", "description": "", "start_time": "x", "end_time": "y" },
                { "title": "B", "description": "second" }
            ]
        }))
        .unwrap();

        let records: Vec<ProgramRecord> = station.program_records().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content_id, "42");
        assert_eq!(records[0].description, None);
        assert_eq!(records[1].description.as_deref(), Some("second"));
        assert_eq!(records[1].start, "");
        assert_eq!(records[0].logo_url.as_deref(), Some("https://img/42.png"));
        assert_eq!(
            records[0].stream_url.as_deref(),
            Some("https://cdn/42.m3u8?token=a")
        );
    }
}
