//! Timestamp parsing for document metadata and persisted snapshots.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Format used when persisting timestamps (`2024-01-01T10:00:00`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Removes a trailing timezone annotation such as `(CET)` or `(CEST)`.
pub fn strip_zone_annotation(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.ends_with(')') {
        if let Some(open) = trimmed.rfind('(') {
            return trimmed[..open].trim_end();
        }
    }
    trimmed
}

/// Parses an ISO-8601 style timestamp, ignoring any trailing zone annotation.
///
/// Accepts `T` or space separators, optional seconds and fractions, bare dates
/// (midnight) and RFC 3339 offsets, which are dropped in favour of the local
/// wall-clock time the document was written in.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = strip_zone_annotation(raw);
    if s.is_empty() {
        return None;
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.naive_local());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parses a `"<start> - <end>"` window where both sides are timestamps.
pub fn parse_window(raw: &str) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let (start, end) = raw.split_once(" - ")?;
    Some((parse_timestamp(start)?, parse_timestamp(end)?))
}

/// Formats a timestamp the way snapshots persist it.
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Extracts the collection date encoded in a snapshot name: the ISO date
/// prefix before the first `T`.
pub fn date_from_snapshot_name(name: &str) -> Option<NaiveDate> {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let (prefix, _) = file_name.split_once('T')?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}
