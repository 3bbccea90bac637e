//! Embedded catalog blob extraction and repair
//!
//! The catalog page ships its state as a JavaScript assignment
//! (`window.__data = {...};`) inside a `<script>` element. The object literal
//! is close to JSON but not quite: it contains bare `undefined` and
//! `new Date("...")` constructor calls.
//!
//! [`repair_blob`] applies a fixed whitelist of textual rewrites before the text
//! is handed to `serde_json`. This is a best-effort heuristic, not a JavaScript
//! parser: it fixes the constructs the page is known to emit and nothing else,
//! and a blob with other non-JSON syntax will still fail to decode.

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::OnceLock;

use crate::errors::{SourceError, SourceResult};

/// Locate the text of the first `<script>` element whose trimmed content
/// starts with `marker`.
pub fn find_marked_script(html: &str, marker: &str) -> SourceResult<String> {
    let selector = Selector::parse("script")
        .map_err(|e| SourceError::extraction(format!("invalid script selector: {e:?}")))?;
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .find(|text| text.trim_start().starts_with(marker))
        .ok_or_else(|| {
            SourceError::extraction(format!("no script block starting with '{marker}'"))
        })
}

/// Substring from the first `{` to the last `}` inclusive
pub fn outer_object_span(script: &str) -> SourceResult<&str> {
    let start = script.find('{');
    let end = script.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if end > start => Ok(&script[start..=end]),
        _ => Err(SourceError::extraction(
            "script block does not contain an object literal",
        )),
    }
}

fn date_constructor() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"new Date\("([^"]*)"\)"#).expect("date constructor pattern"))
}

fn undefined_literal() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bundefined\b").expect("undefined literal pattern"))
}

/// Rewrite the known non-JSON constructs:
///
/// - `new Date("2024-01-01T00:00:00Z")` becomes `"2024-01-01T00:00:00Z"`
/// - the bare token `undefined` becomes `null`
pub fn repair_blob(blob: &str) -> String {
    let unwrapped = date_constructor().replace_all(blob, r#""$1""#);
    undefined_literal().replace_all(&unwrapped, "null").into_owned()
}

/// Full extraction: locate, cut, repair, decode
pub fn extract_catalog(html: &str, marker: &str) -> SourceResult<Value> {
    let script = find_marked_script(html, marker)?;
    let blob = outer_object_span(&script)?;
    let repaired = repair_blob(blob);
    Ok(serde_json::from_str(&repaired)?)
}
