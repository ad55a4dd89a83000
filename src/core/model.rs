// ChiloDisco - core/model.rs
//
// Wire types for the `/api/logs` snapshot. Pure data definitions with no
// I/O, no UI, no platform dependencies.
//
// Decoding is lenient per key: a single malformed log entry must not throw
// away the rest of the snapshot, so entries are first captured as raw JSON
// values and converted one by one.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Log line
// =============================================================================

/// One line of a tailed log file as delivered by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// Raw line text. A missing or `null` value decodes as an empty string.
    #[serde(rename = "s", default, deserialize_with = "null_as_empty")]
    pub text: String,

    /// Server-supplied timestamp (ISO 8601), when the server knows it.
    #[serde(rename = "t", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl LogLine {
    /// A line without a server timestamp.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: None,
        }
    }

    /// A line carrying a server timestamp.
    pub fn stamped(text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: Some(timestamp.into()),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Per-file entry
// =============================================================================

/// Metadata and tail lines of one watched log file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogFileInfo {
    /// Server-side path of the log file.
    #[serde(default)]
    pub path: String,

    /// Whether the file currently exists on the server.
    #[serde(default)]
    pub exists: bool,

    /// File size in bytes.
    #[serde(default)]
    pub size: i64,

    /// Last modification time (ISO 8601), `None` when unknown.
    #[serde(default)]
    pub mtime: Option<String>,

    /// Tail of the file, oldest line first.
    #[serde(default)]
    pub lines: Vec<LogLine>,
}

// =============================================================================
// Snapshot
// =============================================================================

/// Shape of the response body exactly as it arrives on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct RawSnapshot {
    /// Server clock at the time the snapshot was taken.
    #[serde(default)]
    pub now: Option<String>,

    /// Per-key entries, still undecoded.
    #[serde(default)]
    pub logs: Option<BTreeMap<String, serde_json::Value>>,
}

/// A decoded snapshot of every log the server tails.
///
/// `entries` is keyed by log key and therefore always iterates in ascending
/// key order. A key whose entry failed to decode maps to `None`: it still
/// takes part in panel reconciliation but its panel keeps its previous data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogSnapshot {
    /// Server clock (ISO 8601) as sent; parsed by the consumer.
    pub now: Option<String>,

    /// Decoded per-key entries.
    pub entries: BTreeMap<String, Option<LogFileInfo>>,
}

impl LogSnapshot {
    /// Decode the per-key entries of a raw snapshot.
    pub fn from_raw(raw: RawSnapshot) -> Self {
        let entries = raw
            .logs
            .unwrap_or_default()
            .into_iter()
            .map(|(key, value)| {
                let info = match serde_json::from_value::<LogFileInfo>(value) {
                    Ok(info) => Some(info),
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "Skipping malformed log entry");
                        None
                    }
                };
                (key, info)
            })
            .collect();

        Self {
            now: raw.now,
            entries,
        }
    }

    /// Decode a snapshot from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let raw: RawSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_raw(raw))
    }

    /// Log keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The decoded entry for `key`, if present and well-formed.
    pub fn entry(&self, key: &str) -> Option<&LogFileInfo> {
        self.entries.get(key).and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "now": "2026-10-16T12:00:00Z",
        "logs": {
            "PARSER_LOG_PATH": {
                "path": "/var/log/fuzz/parser.log",
                "exists": true,
                "size": 2048,
                "mtime": "2026-10-16T11:59:58Z",
                "lines": [ {"s": "first", "t": "2026-10-16T11:59:57Z"}, {"s": "second"} ]
            },
            "MAIN_LOG_PATH": {
                "path": "/var/log/fuzz/main.log",
                "exists": false,
                "size": 0,
                "mtime": null,
                "lines": []
            }
        }
    }"#;

    #[test]
    fn test_decode_full_snapshot() {
        let snap = LogSnapshot::from_json_str(SAMPLE).unwrap();
        assert_eq!(snap.now.as_deref(), Some("2026-10-16T12:00:00Z"));

        let keys: Vec<_> = snap.keys().collect();
        assert_eq!(keys, vec!["MAIN_LOG_PATH", "PARSER_LOG_PATH"]);

        let parser = snap.entry("PARSER_LOG_PATH").unwrap();
        assert!(parser.exists);
        assert_eq!(parser.size, 2048);
        assert_eq!(parser.lines.len(), 2);
        assert_eq!(parser.lines[0].timestamp.as_deref(), Some("2026-10-16T11:59:57Z"));
        assert_eq!(parser.lines[1], LogLine::plain("second"));

        let main = snap.entry("MAIN_LOG_PATH").unwrap();
        assert!(!main.exists);
        assert!(main.mtime.is_none());
    }

    #[test]
    fn test_malformed_entry_keeps_key_but_has_no_data() {
        let json = r#"{
            "now": "2026-10-16T12:00:00Z",
            "logs": {
                "GOOD": {"path": "a.log", "exists": true, "size": 1, "lines": []},
                "BAD": {"path": 42, "lines": "not a list"}
            }
        }"#;
        let snap = LogSnapshot::from_json_str(json).unwrap();
        assert_eq!(snap.keys().collect::<Vec<_>>(), vec!["BAD", "GOOD"]);
        assert!(snap.entry("BAD").is_none());
        assert!(snap.entry("GOOD").is_some());
    }

    #[test]
    fn test_missing_logs_and_null_text_are_tolerated() {
        let snap = LogSnapshot::from_json_str(r#"{"now": null}"#).unwrap();
        assert!(snap.entries.is_empty());
        assert!(snap.now.is_none());

        let json = r#"{"logs": {"K": {"exists": true, "lines": [{"s": null}]}}}"#;
        let snap = LogSnapshot::from_json_str(json).unwrap();
        assert_eq!(snap.entry("K").unwrap().lines[0].text, "");
    }
}
