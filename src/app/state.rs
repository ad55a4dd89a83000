// ChiloDisco - app/state.rs
//
// Dashboard state: the panel list, the reactive poll parameters, and the
// session store holding per-panel preferences.
// Owned by the eframe::App implementation (or the headless runner) and only
// ever touched from that thread.

use crate::app::store::{
    init_stick_preference, load_first_seen, save_first_seen, set_stick_preference,
    stick_preference, KeyValueStore,
};
use crate::core::labels::LabelSet;
use crate::core::model::LogSnapshot;
use crate::core::panel::{reconcile_panels, update_panel, Panel, RenderContext};
use crate::core::scroll::ViewportMetrics;
use crate::core::timestamp::parse_iso_timestamp;
use crate::util::constants::{
    DEFAULT_MAX_LINES, DEFAULT_POLL_INTERVAL_MS, MAX_MAX_LINES, MAX_POLL_INTERVAL_MS,
    MIN_MAX_LINES, MIN_POLL_INTERVAL_MS,
};
use crate::util::error::{ConfigError, FetchError};
use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use std::time::Duration;

/// Reactive poll parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Milliseconds between polls.
    pub interval_ms: u64,
    /// Lines kept per panel, counted from the end of the file.
    pub max_lines: usize,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_lines: DEFAULT_MAX_LINES,
        }
    }
}

impl PollSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Validate a poll interval against its named bounds.
pub fn validate_interval_ms(value: u64) -> Result<u64, ConfigError> {
    if (MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::ValueOutOfRange {
            field: "interval_ms".to_string(),
            value: value.to_string(),
            expected: format!("{MIN_POLL_INTERVAL_MS}..={MAX_POLL_INTERVAL_MS}"),
        })
    }
}

/// Validate a per-panel line limit against its named bounds.
pub fn validate_max_lines(value: usize) -> Result<usize, ConfigError> {
    if (MIN_MAX_LINES..=MAX_MAX_LINES).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::ValueOutOfRange {
            field: "max_lines".to_string(),
            value: value.to_string(),
            expected: format!("{MIN_MAX_LINES}..={MAX_MAX_LINES}"),
        })
    }
}

/// Offset of the host's local zone right now.
pub fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

/// Top-level dashboard state.
pub struct DashboardState {
    /// One panel per log key, sorted by key.
    pub panels: Vec<Panel>,

    pub settings: PollSettings,

    pub labels: LabelSet,

    /// Zone used for offset-less timestamps and displayed times.
    pub tz: FixedOffset,

    /// Client time of the last applied snapshot.
    pub last_success: Option<DateTime<Utc>>,

    /// Failed polls since the last success.
    pub consecutive_failures: u32,

    /// Status message for the status bar.
    pub status_message: String,

    store: Box<dyn KeyValueStore>,
}

impl DashboardState {
    pub fn new(settings: PollSettings, labels: LabelSet, store: Box<dyn KeyValueStore>) -> Self {
        Self {
            panels: Vec::new(),
            settings,
            labels,
            tz: local_offset(),
            last_success: None,
            consecutive_failures: 0,
            status_message: "Waiting for first snapshot...".to_string(),
            store,
        }
    }

    /// Use a fixed zone instead of the host's.
    pub fn with_timezone(mut self, tz: FixedOffset) -> Self {
        self.tz = tz;
        self
    }

    /// Reference clock for a snapshot: the server's `now`, else ours.
    fn reference_now(&self, snapshot: &LogSnapshot) -> DateTime<Utc> {
        snapshot
            .now
            .as_deref()
            .and_then(|raw| parse_iso_timestamp(raw, &self.tz))
            .unwrap_or_else(Utc::now)
    }

    /// Apply a freshly fetched snapshot: reconcile the panel list, re-render
    /// every panel that has a well-formed entry, and persist preferences.
    pub fn apply_snapshot(&mut self, snapshot: &LogSnapshot) {
        let now = self.reference_now(snapshot);

        let previous = std::mem::take(&mut self.panels);
        let known: Vec<String> = previous.iter().map(|p| p.key.clone()).collect();
        self.panels = reconcile_panels(previous, snapshot.keys(), self.labels);

        let ctx = RenderContext {
            now,
            tz: self.tz,
            max_lines: self.settings.max_lines,
            labels: self.labels,
        };

        let store = self.store.as_mut();
        for panel in &mut self.panels {
            if !known.contains(&panel.key) {
                init_stick_preference(store, &panel.key);
            }

            panel.scroll.before_update(stick_preference(store, &panel.key));

            let Some(info) = snapshot.entry(&panel.key) else {
                // Malformed entry: the panel keeps whatever it showed before.
                continue;
            };

            let cache = load_first_seen(store, &panel.key);
            let next = update_panel(panel, info, &cache, &ctx);
            save_first_seen(store, &panel.key, &next);
        }

        if let Err(e) = self.store.flush() {
            tracing::debug!(error = %e, "Session store flush failed");
        }

        self.last_success = Some(Utc::now());
        self.consecutive_failures = 0;
        self.status_message = format!(
            "{} panel(s), updated {}",
            self.panels.len(),
            now.with_timezone(&self.tz).format("%H:%M:%S")
        );
    }

    /// Record a failed poll. Panels are left exactly as they were.
    pub fn record_failure(&mut self, error: &FetchError) {
        self.consecutive_failures += 1;
        tracing::debug!(
            failures = self.consecutive_failures,
            error = %error,
            "Keeping previous panels after failed poll"
        );
    }

    /// Feed back a panel's viewport after a frame.
    ///
    /// Persists a new stick preference when the user scrolled, and returns
    /// the offset the viewport must be moved to, if any.
    pub fn observe_viewport(&mut self, key: &str, metrics: ViewportMetrics) -> Option<f32> {
        let panel = self.panels.iter_mut().find(|p| p.key == key)?;
        let outcome = panel.scroll.after_frame(metrics);
        if let Some(stick) = outcome.stick_changed {
            tracing::debug!(key, stick, "User scrolled panel");
            set_stick_preference(self.store.as_mut(), key, stick);
            if let Err(e) = self.store.flush() {
                tracing::debug!(error = %e, "Session store flush failed");
            }
        }
        outcome.move_to
    }

    pub fn stick_preference(&self, key: &str) -> bool {
        stick_preference(self.store.as_ref(), key)
    }

    /// Change the poll interval. Returns the new interval when it changed,
    /// in which case the poll timer must restart.
    pub fn set_interval_ms(&mut self, value: u64) -> Result<Option<Duration>, ConfigError> {
        let value = validate_interval_ms(value)?;
        if value == self.settings.interval_ms {
            return Ok(None);
        }
        self.settings.interval_ms = value;
        Ok(Some(self.settings.interval()))
    }

    /// Change the line limit. Returns `true` when it changed, in which case
    /// an immediate refetch is due.
    pub fn set_max_lines(&mut self, value: usize) -> Result<bool, ConfigError> {
        let value = validate_max_lines(value)?;
        if value == self.settings.max_lines {
            return Ok(false);
        }
        self.settings.max_lines = value;
        Ok(true)
    }

    pub fn panel(&self, key: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.key == key)
    }

    /// Plain-text dump of every panel: a header line, then its markup.
    pub fn report(&self) -> String {
        let mut out = String::new();
        for panel in &self.panels {
            out.push_str(&format!(
                "== {} | {} | {} | {} | {} ==\n",
                self.labels.display_name(&panel.key),
                panel.filename,
                panel.size_text,
                panel.mtime_text,
                panel.bucket_label,
            ));
            out.push_str(&panel.html);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::store::MemoryStore;
    use crate::core::panel::PanelState;

    const SNAPSHOT: &str = r#"{
        "now": "2026-10-16T12:00:00Z",
        "logs": {
            "PARSER_LOG_PATH": {
                "path": "/var/log/fuzz/parser.log", "exists": true, "size": 10,
                "mtime": "2026-10-16T11:59:59Z",
                "lines": [{"s": "parsed at 11:59:58"}]
            },
            "MAIN_LOG_PATH": {
                "path": "/var/log/fuzz/main.log", "exists": true, "size": 10,
                "mtime": "2026-10-16T11:59:59Z",
                "lines": [{"s": "hello", "t": "2026-10-16T11:59:59Z"}, {"s": "world"}]
            }
        }
    }"#;

    fn state() -> DashboardState {
        DashboardState::new(
            PollSettings::default(),
            LabelSet::English,
            Box::new(MemoryStore::new()),
        )
        .with_timezone(FixedOffset::east_opt(0).unwrap())
    }

    fn snapshot(json: &str) -> LogSnapshot {
        LogSnapshot::from_json_str(json).unwrap()
    }

    #[test]
    fn test_apply_snapshot_builds_sorted_populated_panels() {
        let mut s = state();
        s.apply_snapshot(&snapshot(SNAPSHOT));

        let keys: Vec<_> = s.panels.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["MAIN_LOG_PATH", "PARSER_LOG_PATH"]);
        assert!(s.panels.iter().all(|p| p.state == PanelState::Populated));
        assert!(s.stick_preference("MAIN_LOG_PATH"));
        assert!(s.last_success.is_some());
        assert!(s.status_message.contains("12:00:00"));
    }

    #[test]
    fn test_first_seen_survives_between_polls() {
        let mut s = state();
        s.apply_snapshot(&snapshot(SNAPSHOT));
        let first_age = s.panel("PARSER_LOG_PATH").unwrap().lines[0].age_secs;
        assert_eq!(first_age, Some(2.0));

        let later = SNAPSHOT.replace(
            r#""now": "2026-10-16T12:00:00Z""#,
            r#""now": "2026-10-16T12:00:05Z""#,
        );
        s.apply_snapshot(&snapshot(&later));
        let parser = s.panel("PARSER_LOG_PATH").unwrap();
        assert_eq!(parser.lines[0].age_secs, Some(7.0));
        assert_eq!(parser.revision, 2);

        // "world" carries no time at all; it ages from the first poll.
        let world = &s.panel("MAIN_LOG_PATH").unwrap().lines[1];
        assert_eq!(world.age_secs, Some(5.0));
    }

    #[test]
    fn test_removed_key_drops_panel_and_malformed_entry_keeps_data() {
        let mut s = state();
        s.apply_snapshot(&snapshot(SNAPSHOT));
        let before = s.panel("MAIN_LOG_PATH").unwrap().html.clone();

        s.apply_snapshot(&snapshot(
            r#"{"now": "2026-10-16T12:00:01Z", "logs": {"MAIN_LOG_PATH": {"lines": 7}}}"#,
        ));
        assert_eq!(s.panels.len(), 1);
        let main = s.panel("MAIN_LOG_PATH").unwrap();
        assert_eq!(main.html, before);
        assert_eq!(main.revision, 1);
    }

    #[test]
    fn test_new_key_without_entry_stays_loading() {
        let mut s = state();
        s.apply_snapshot(&snapshot(r#"{"logs": {"X": null}}"#));
        assert_eq!(s.panels[0].state, PanelState::Loading);
        assert_eq!(s.panels[0].html, "(loading)");
    }

    #[test]
    fn test_failure_changes_nothing_but_the_counter() {
        let mut s = state();
        s.apply_snapshot(&snapshot(SNAPSHOT));
        let html: Vec<_> = s.panels.iter().map(|p| p.html.clone()).collect();

        s.record_failure(&FetchError::Status {
            url: "http://x/api/logs".to_string(),
            status: 502,
        });
        assert_eq!(s.consecutive_failures, 1);
        let after: Vec<_> = s.panels.iter().map(|p| p.html.clone()).collect();
        assert_eq!(html, after);
    }

    #[test]
    fn test_user_scroll_updates_stick_preference() {
        let mut s = state();
        s.apply_snapshot(&snapshot(SNAPSHOT));
        let m = |top| ViewportMetrics {
            scroll_top: top,
            scroll_height: 1000.0,
            client_height: 300.0,
        };

        // First frame after the update: forced to the bottom.
        assert_eq!(s.observe_viewport("MAIN_LOG_PATH", m(0.0)), Some(700.0));
        assert_eq!(s.observe_viewport("MAIN_LOG_PATH", m(700.0)), None);

        // The user scrolls up.
        s.observe_viewport("MAIN_LOG_PATH", m(100.0));
        assert!(!s.stick_preference("MAIN_LOG_PATH"));

        // The next snapshot keeps the user's offset.
        s.apply_snapshot(&snapshot(SNAPSHOT));
        assert_eq!(s.observe_viewport("MAIN_LOG_PATH", m(100.0)), None);
        assert!(s.observe_viewport("NOPE", m(0.0)).is_none());
    }

    #[test]
    fn test_settings_are_validated() {
        let mut s = state();
        assert!(s.set_interval_ms(10).is_err());
        assert!(s.set_interval_ms(60_001).is_err());
        assert_eq!(s.set_interval_ms(500).unwrap(), None);
        assert_eq!(s.set_interval_ms(1000).unwrap(), Some(Duration::from_secs(1)));

        assert!(s.set_max_lines(0).is_err());
        assert!(s.set_max_lines(10_001).is_err());
        assert!(!s.set_max_lines(500).unwrap());
        assert!(s.set_max_lines(50).unwrap());
        assert_eq!(s.settings.max_lines, 50);
    }

    #[test]
    fn test_report_lists_header_and_markup_per_panel() {
        let mut s = state();
        s.apply_snapshot(&snapshot(SNAPSHOT));
        let report = s.report();
        let first = report.lines().next().unwrap();
        assert_eq!(
            first,
            "== Main log | main.log | 10 B | 2026-10-16 11:59:59 | 0\u{2013}2s =="
        );
        assert!(report.contains("<span class=\"timestamp\""));
        assert_eq!(report.matches("== ").count(), 2);
    }

    #[test]
    fn test_missing_server_now_uses_client_clock() {
        let mut s = state();
        let json = r#"{"logs": {"K": {"exists": true, "lines": [{"s": "x", "t": "2000-01-01T00:00:00Z"}]}}}"#;
        s.apply_snapshot(&snapshot(json));
        let age = s.panel("K").unwrap().lines[0].age_secs.unwrap();
        assert!(age > 365.0 * 24.0 * 3600.0);
    }
}
