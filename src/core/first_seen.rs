// ChiloDisco - core/first_seen.rs
//
// Per-panel map from raw line text to the timestamp first resolved for it.
// Keeps recency colours stable across polls: once a line has a time, later
// polls reuse it instead of re-deriving (and possibly shifting) it.
//
// Persisted as a JSON object of ISO 8601 strings (millisecond precision, Z).

use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirstSeenCache {
    entries: BTreeMap<String, DateTime<Utc>>,
}

impl FirstSeenCache {
    /// Cached timestamp for this exact line text.
    pub fn get(&self, text: &str) -> Option<DateTime<Utc>> {
        self.entries.get(text).copied()
    }

    /// Record (or overwrite) the timestamp of a line.
    pub fn record(&mut self, text: impl Into<String>, at: DateTime<Utc>) {
        self.entries.insert(text.into(), at);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialise to a JSON object `{ text: iso }`.
    pub fn to_json(&self) -> String {
        let map: BTreeMap<&str, String> = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.to_rfc3339_opts(SecondsFormat::Millis, true)))
            .collect();
        // A map of strings to strings always serialises.
        serde_json::to_string(&map).unwrap_or_else(|_| "{}".to_string())
    }

    /// Parse the JSON form. Entries whose value is not a valid RFC 3339
    /// timestamp are dropped; a document that is not an object of strings
    /// is an error.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let map: BTreeMap<String, String> = serde_json::from_str(json)?;
        let entries = map
            .into_iter()
            .filter_map(|(text, iso)| {
                DateTime::parse_from_rfc3339(&iso)
                    .ok()
                    .map(|dt| (text, dt.with_timezone(&Utc)))
            })
            .collect();
        Ok(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_json_uses_millisecond_iso_strings() {
        let mut cache = FirstSeenCache::default();
        cache.record("hello", at("2026-10-16T12:00:00.123Z"));
        assert_eq!(cache.to_json(), r#"{"hello":"2026-10-16T12:00:00.123Z"}"#);
    }

    #[test]
    fn test_invalid_values_are_dropped_on_load() {
        let cache =
            FirstSeenCache::from_json(r#"{"a":"2026-10-16T12:00:00.000Z","b":"later"}"#).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a"), Some(at("2026-10-16T12:00:00Z")));
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn test_non_object_is_an_error() {
        assert!(FirstSeenCache::from_json("[1,2,3]").is_err());
        assert!(FirstSeenCache::from_json("{{").is_err());
    }
}
