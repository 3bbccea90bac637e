//! XMLTV timestamp conversion

use chrono::{DateTime, NaiveDateTime, Utc};

/// Timestamp format served by the programming endpoint
pub const UPSTREAM_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// XMLTV timestamp format (`YYYYMMDDHHMMSS +0000`)
pub const XMLTV_TIME_FORMAT: &str = "%Y%m%d%H%M%S +0000";

/// Parse an upstream `YYYY-MM-DDTHH:MM:SSZ` timestamp
pub fn parse_upstream_time(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, UPSTREAM_TIME_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}

/// Format an instant as an XMLTV timestamp
pub fn format_xmltv_time(dt: &DateTime<Utc>) -> String {
    dt.format(XMLTV_TIME_FORMAT).to_string()
}

/// Parse an XMLTV `YYYYMMDDHHMMSS +0000` timestamp
pub fn parse_xmltv_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, "%Y%m%d%H%M%S %z")
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Convert an upstream timestamp to XMLTV form, `None` if it does not match
/// the expected pattern exactly.
///
/// # Examples
///
/// ```rust
/// use tubi_m3u::utils::time::to_xmltv_time;
///
/// assert_eq!(to_xmltv_time("2024-05-01T06:30:00Z").as_deref(), Some("20240501063000 +0000"));
/// assert_eq!(to_xmltv_time("2024-05-01 06:30"), None);
/// ```
pub fn to_xmltv_time(value: &str) -> Option<String> {
    parse_upstream_time(value).map(|dt| format_xmltv_time(&dt))
}
