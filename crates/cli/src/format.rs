//! Result → human/json string formatting.
//!
//! Two modes:
//! - **Human** (default): one locator line per record, record text below it,
//!   `NOT FOUND` for misses
//! - **JSON** (`--json`): `serde_json`, one document per record or batch line

use sdfdex_core::{IndexError, IndexHit};
use sdfdex_engine::BuildReport;
use sdfdex_storage::IndexMeta;
use serde_json::json;

/// Marker printed for keys without a record.
pub const NOT_FOUND: &str = "NOT FOUND";

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Format the report of a finished build; JSON in both modes.
pub fn format_report(report: &BuildReport) -> String {
    match serde_json::to_value(report) {
        Ok(value) => pretty(&value),
        Err(e) => format!("{{\"error\": \"{}\"}}", e),
    }
}

/// Format the meta entry of an index; JSON in both modes.
pub fn format_meta(meta: &IndexMeta) -> String {
    match serde_json::to_value(meta) {
        Ok(value) => pretty(&value),
        Err(e) => format!("{{\"error\": \"{}\"}}", e),
    }
}

/// Format one identifier + locator line.
pub fn format_hit_line(hit: &IndexHit, path: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Human => format!("alid={} {} path={}", hit.alid, hit.locator, path),
        OutputMode::Json => json!({
            "alid": hit.alid,
            "locator": hit.locator,
            "path": path,
        })
        .to_string(),
    }
}

/// Format a resolved record with its text.
pub fn format_record(hit: &IndexHit, path: &str, text: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Human => format!("{}\n{}", format_hit_line(hit, path, mode), text.trim_end_matches(['\r', '\n'])),
        OutputMode::Json => pretty(&json!({
            "alid": hit.alid,
            "locator": hit.locator,
            "path": path,
            "record": text,
        })),
    }
}

/// Format a lookup that found nothing.
pub fn format_miss(key: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Human => format!("{}\t{}", key, NOT_FOUND),
        OutputMode::Json => json!({ "key": key, "hit": null }).to_string(),
    }
}

/// Format one batch result line.
pub fn format_batch_line(key: &str, hit: Option<&IndexHit>, mode: OutputMode) -> String {
    match (hit, mode) {
        (None, _) => format_miss(key, mode),
        (Some(hit), OutputMode::Human) => format!("{}\talid={} {}", key, hit.alid, hit.locator),
        (Some(hit), OutputMode::Json) => json!({
            "key": key,
            "hit": { "alid": hit.alid, "locator": hit.locator },
        })
        .to_string(),
    }
}

/// Format an error.
pub fn format_error(err: &IndexError, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => json!({ "error": err.to_string() }).to_string(),
        OutputMode::Human => format!("(error) {}", err),
    }
}
