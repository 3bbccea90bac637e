//! XMLTV guide generation
//!
//! Channel definitions come first (one per distinct content id, first station
//! wins), followed by every programme in station order. Text and attribute
//! values are escaped with `quick_xml::escape::escape`.

use quick_xml::escape::escape;
use std::collections::HashSet;
use tracing::debug;

use crate::config::InvalidTimestampPolicy;
use crate::models::{ProgramRecord, Station};
use crate::utils::time::to_xmltv_time;

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const GENERATOR_NAME: &str = "tubi-m3u";

pub struct GuideBuilder {
    invalid_timestamps: InvalidTimestampPolicy,
}

impl GuideBuilder {
    pub fn new(invalid_timestamps: InvalidTimestampPolicy) -> Self {
        Self { invalid_timestamps }
    }

    /// Convert both timestamps, applying the invalid-timestamp policy
    fn programme_times(&self, record: &ProgramRecord) -> Option<(String, String)> {
        match (to_xmltv_time(&record.start), to_xmltv_time(&record.stop)) {
            (Some(start), Some(stop)) => Some((start, stop)),
            (start, stop) => match self.invalid_timestamps {
                InvalidTimestampPolicy::PassThrough => Some((
                    start.unwrap_or_else(|| record.start.clone()),
                    stop.unwrap_or_else(|| record.stop.clone()),
                )),
                InvalidTimestampPolicy::Skip => None,
            },
        }
    }

    fn write_channel(out: &mut String, station: &Station) {
        out.push_str(&format!(
            "  <channel id=\"{}\">\n",
            escape(station.content_id.as_str())
        ));
        out.push_str(&format!(
            "    <display-name>{}</display-name>\n",
            escape(station.title.as_deref().unwrap_or(UNKNOWN_TITLE))
        ));
        if let Some(logo_url) = station.logo_url() {
            out.push_str(&format!("    <icon src=\"{}\"/>\n", escape(logo_url)));
        }
        out.push_str("  </channel>\n");
    }

    fn write_programme(out: &mut String, record: &ProgramRecord, start: &str, stop: &str) {
        out.push_str(&format!(
            "  <programme start=\"{}\" stop=\"{}\" channel=\"{}\">\n",
            escape(start),
            escape(stop),
            escape(record.content_id.as_str())
        ));
        out.push_str(&format!("    <title>{}</title>\n", escape(record.title.as_str())));
        if let Some(description) = &record.description {
            out.push_str(&format!("    <desc>{}</desc>\n", escape(description.as_str())));
        }
        out.push_str("  </programme>\n");
    }

    /// Render the full guide document
    pub fn build(&self, stations: &[Station]) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.push_str(&format!("<tv generator-info-name=\"{GENERATOR_NAME}\">\n"));

        // A content id repeated across rows keeps only its first row
        let mut channel_ids = HashSet::new();
        let unique: Vec<&Station> = stations
            .iter()
            .filter(|station| channel_ids.insert(station.content_id.as_str()))
            .collect();

        for station in &unique {
            Self::write_channel(&mut out, station);
        }

        let mut programmes = 0usize;
        let mut skipped = 0usize;
        for record in unique.iter().flat_map(|station| station.program_records()) {
            match self.programme_times(&record) {
                Some((start, stop)) => {
                    Self::write_programme(&mut out, &record, &start, &stop);
                    programmes += 1;
                }
                None => skipped += 1,
            }
        }

        out.push_str("</tv>\n");
        debug!(
            "Guide: channels={} programmes={} skipped_invalid_timestamps={}",
            channel_ids.len(),
            programmes,
            skipped
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::Reader;
    use quick_xml::events::Event;
    use serde_json::{Value, json};

    fn station(value: Value) -> Station {
        serde_json::from_value(value).unwrap()
    }

    /// Count start/empty elements by name and collect their `id` attributes
    fn scan(xml: &str) -> (usize, usize, Vec<String>) {
        let mut reader = Reader::from_str(xml);
        let (mut channels, mut programmes, mut ids) = (0, 0, Vec::new());
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                    b"channel" => {
                        channels += 1;
                        let id = e.try_get_attribute("id").unwrap().unwrap();
                        ids.push(String::from_utf8(id.value.into_owned()).unwrap());
                    }
                    b"programme" => programmes += 1,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }
        (channels, programmes, ids)
    }

    #[test]
    fn test_one_channel_per_id() {
        let stations = vec![
            station(json!({ "content_id": 1, "title": "First", "programs": [
                { "title": "a", "start_time": "2024-05-01T06:00:00Z", "end_time": "2024-05-01T07:00:00Z" },
                { "title": "b", "start_time": "2024-05-01T07:00:00Z", "end_time": "2024-05-01T08:00:00Z" }
            ]})),
            station(json!({ "content_id": "1", "title": "Duplicate" })),
            station(json!({ "content_id": 2 })),
        ];

        let xml = GuideBuilder::new(InvalidTimestampPolicy::PassThrough).build(&stations);
        let (channels, programmes, ids) = scan(&xml);
        assert_eq!(channels, 2);
        assert_eq!(programmes, 2);
        assert_eq!(ids, vec!["1", "2"]);
        assert!(xml.contains("<display-name>First</display-name>"));
        assert!(!xml.contains("Duplicate"));
        assert!(xml.contains("<display-name>Unknown Title</display-name>"));
    }

    #[test]
    fn test_programme_times_and_optional_desc() {
        let stations = vec![station(json!({
            "content_id": 9,
            "title": "Nine",
            "images": { "thumbnail": ["https://img/9.png?w=1&h=2"] },
            "programs": [
                { "title": "Tom & Jerry", "description": "Cat <and> mouse",
                  "start_time": "2024-05-01T06:00:00Z", "end_time": "2024-05-01T06:30:00Z" },
                { "title": "No desc", "description": "",
                  "start_time": "2024-05-01T06:30:00Z", "end_time": "2024-05-01T07:00:00Z" }
            ]
        }))];

        let xml = GuideBuilder::new(InvalidTimestampPolicy::PassThrough).build(&stations);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<tv generator-info-name=\"tubi-m3u\">"));
        assert!(xml.contains(
            "<programme start=\"20240501060000 +0000\" stop=\"20240501063000 +0000\" channel=\"9\">"
        ));
        assert!(xml.contains("<title>Tom &amp; Jerry</title>"));
        assert!(xml.contains("<desc>Cat &lt;and&gt; mouse</desc>"));
        assert_eq!(xml.matches("<desc>").count(), 1);
        assert!(xml.contains("<icon src=\"https://img/9.png?w=1&amp;h=2\"/>"));

        let channel_pos = xml.find("<channel").unwrap();
        let programme_pos = xml.find("<programme").unwrap();
        assert!(channel_pos < programme_pos);
    }

    #[test]
    fn test_invalid_timestamp_policies() {
        let stations = vec![station(json!({
            "content_id": 5,
            "programs": [
                { "title": "odd", "start_time": "2024-05-01 06:00", "end_time": "2024-05-01T07:00:00Z" },
                { "title": "fine", "start_time": "2024-05-01T07:00:00Z", "end_time": "2024-05-01T08:00:00Z" }
            ]
        }))];

        let passed = GuideBuilder::new(InvalidTimestampPolicy::PassThrough).build(&stations);
        assert!(passed.contains("start=\"2024-05-01 06:00\" stop=\"20240501070000 +0000\""));
        assert_eq!(scan(&passed).1, 2);

        let skipped = GuideBuilder::new(InvalidTimestampPolicy::Skip).build(&stations);
        assert!(!skipped.contains("odd"));
        assert_eq!(scan(&skipped).1, 1);
    }

    #[test]
    fn test_repeated_station_rows_emit_schedule_once() {
        let row = json!({ "content_id": 7, "title": "Seven", "programs": [
            { "title": "only", "start_time": "2024-05-01T06:00:00Z", "end_time": "2024-05-01T07:00:00Z" }
        ]});
        let stations = vec![station(row.clone()), station(row)];

        let xml = GuideBuilder::new(InvalidTimestampPolicy::PassThrough).build(&stations);
        let (channels, programmes, ids) = scan(&xml);
        assert_eq!(channels, 1);
        assert_eq!(programmes, 1);
        assert_eq!(ids, vec!["7"]);
    }

    #[test]
    fn test_empty_guide_is_well_formed() {
        let xml = GuideBuilder::new(InvalidTimestampPolicy::default()).build(&[]);
        assert_eq!(scan(&xml), (0, 0, Vec::<String>::new()));
        assert!(xml.ends_with("</tv>\n"));
    }
}
