// ChiloDisco - core/timestamp.rs
//
// Timestamp parsing and per-line time resolution.
//
// Zone handling: server timestamps carry an explicit offset in the normal
// case. Timestamps without one (server or embedded in the line text) are
// read as wall-clock time in the dashboard's local zone, which callers pass
// in as a `FixedOffset` so tests stay independent of the host zone.

use super::first_seen::FirstSeenCache;
use super::model::LogLine;
use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// Naive date-time layouts accepted after separator normalisation.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"];

/// Matches a full date-time (`YYYY-MM-DD[ T]HH:MM:SS[.frac]`, `/` also
/// accepted as the date separator) or a bare `HH:MM:SS`.
/// Group 1 is the full form, group 2 the bare time.
fn embedded_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(\b\d{4}[-/]\d{2}[-/]\d{2}[ T]\d{2}:\d{2}:\d{2}(?:\.\d+)?\b)|(\b\d{2}:\d{2}:\d{2}\b)",
        )
        .expect("embedded timestamp regex is valid")
    })
}

/// Byte ranges of every timestamp-looking substring in `text`, left to right.
///
/// Used by the markup renderer to highlight timestamps. A range is returned
/// even when its value is impossible (e.g. `99:99:99`); highlighting is
/// purely lexical.
pub fn timestamp_spans(text: &str) -> Vec<Range<usize>> {
    embedded_regex().find_iter(text).map(|m| m.range()).collect()
}

/// Interpret a naive local date-time in `tz`.
fn local_to_utc(ndt: &NaiveDateTime, tz: &FixedOffset) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(ndt)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_naive(normalised: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(normalised, fmt).ok())
}

/// Parse an ISO 8601 timestamp as sent by the server.
///
/// RFC 3339 with an offset is taken as-is; a date-time without an offset
/// (`T` or space separated, optional fraction) is local time in `tz`.
pub fn parse_iso_timestamp(raw: &str, tz: &FixedOffset) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    let normalised = trimmed.replacen(' ', "T", 1);
    parse_naive(&normalised).and_then(|ndt| local_to_utc(&ndt, tz))
}

/// Find and parse the first valid timestamp embedded in `text`.
///
/// A bare `HH:MM:SS` is placed on today's date, where "today" is the local
/// date of `now` in `tz`, or on the day before when that would put it in
/// the future. Candidates that match lexically but cannot be
/// parsed are skipped.
pub fn parse_embedded_timestamp(
    text: &str,
    now: DateTime<Utc>,
    tz: &FixedOffset,
) -> Option<DateTime<Utc>> {
    for caps in embedded_regex().captures_iter(text) {
        let parsed = if let Some(full) = caps.get(1) {
            let normalised = full.as_str().replace('/', "-").replacen(' ', "T", 1);
            parse_naive(&normalised).and_then(|ndt| local_to_utc(&ndt, tz))
        } else if let Some(time) = caps.get(2) {
            NaiveTime::parse_from_str(time.as_str(), "%H:%M:%S")
                .ok()
                .and_then(|t| {
                    let today = now.with_timezone(tz).date_naive();
                    let at = local_to_utc(&today.and_time(t), tz)?;
                    // Written before midnight, read after it.
                    if at > now {
                        Some(at - chrono::Duration::days(1))
                    } else {
                        Some(at)
                    }
                })
        } else {
            None
        };
        if parsed.is_some() {
            return parsed;
        }
    }
    None
}

/// Seconds elapsed from `at` to `now`, never negative.
pub fn age_secs(at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - at).num_milliseconds();
    (millis as f64 / 1000.0).max(0.0)
}

// =============================================================================
// Line time resolution
// =============================================================================

/// Where a line's timestamp came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    /// The server sent a timestamp with the line.
    Server,
    /// Taken from the session first-seen cache.
    FirstSeen,
    /// Parsed from the line text itself.
    Embedded,
    /// Nothing could be determined.
    Unknown,
}

/// Outcome of resolving a line's timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTime {
    pub at: Option<DateTime<Utc>>,
    pub source: TimeSource,
}

impl ResolvedTime {
    const UNKNOWN: ResolvedTime = ResolvedTime {
        at: None,
        source: TimeSource::Unknown,
    };

    /// Age in seconds relative to `now`, `None` when unknown.
    pub fn age_secs(&self, now: DateTime<Utc>) -> Option<f64> {
        self.at.map(|at| age_secs(at, now))
    }
}

/// Resolve a line's timestamp.
///
/// Priority: server timestamp, then the first-seen cache entry for the
/// identical raw text, then a timestamp embedded in `clean_text`.
/// An unparseable server timestamp counts as absent.
pub fn resolve_line_time(
    line: &LogLine,
    clean_text: &str,
    cache: &FirstSeenCache,
    now: DateTime<Utc>,
    tz: &FixedOffset,
) -> ResolvedTime {
    if let Some(at) = line
        .timestamp
        .as_deref()
        .and_then(|raw| parse_iso_timestamp(raw, tz))
    {
        return ResolvedTime {
            at: Some(at),
            source: TimeSource::Server,
        };
    }
    if let Some(at) = cache.get(&line.text) {
        return ResolvedTime {
            at: Some(at),
            source: TimeSource::FirstSeen,
        };
    }
    if let Some(at) = parse_embedded_timestamp(clean_text, now, tz) {
        return ResolvedTime {
            at: Some(at),
            source: TimeSource::Embedded,
        };
    }
    ResolvedTime::UNKNOWN
}
