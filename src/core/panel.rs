// ChiloDisco - core/panel.rs
//
// Panel view-models: one per log key, kept across polls by key so that UI
// state (scroll bookkeeping) survives re-renders.
//
// `reconcile_panels` mirrors a snapshot's key set; `update_panel` rebuilds a
// single panel's metadata and colourised lines from its log entry.

use super::age::{age_or_unknown, bucket_for_age, glow_for_age, hue_for_age};
use super::first_seen::FirstSeenCache;
use super::format::{file_name_of, format_mtime, human_size};
use super::labels::LabelSet;
use super::markup::{
    hsl_css, line_html, placeholder_html, segment_line, strip_leading, LineStyle, Segment,
};
use super::model::LogFileInfo;
use super::scroll::ScrollTracker;
use super::timestamp::{age_secs, parse_iso_timestamp, resolve_line_time, TimeSource};
use crate::util::constants::{NOT_AVAILABLE, PLACEHOLDER_HUE, UNKNOWN_AGE_SECS};
use chrono::{DateTime, FixedOffset, Utc};
use std::collections::HashMap;

/// Lifecycle of a panel. A failed poll never moves a panel backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    /// Created for a new key; no entry has been applied yet.
    #[default]
    Loading,
    /// At least one entry has been applied.
    Populated,
}

/// One colourised line ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLine {
    /// Line text with leading whitespace stripped.
    pub text: String,
    pub style: LineStyle,
    /// Age in seconds, `None` when no timestamp could be resolved.
    pub age_secs: Option<f64>,
    pub source: TimeSource,
    pub segments: Vec<Segment>,
}

/// View-model for one log key.
#[derive(Debug, Clone)]
pub struct Panel {
    pub key: String,
    pub filename: String,
    pub size_text: String,
    pub mtime_text: String,
    /// File-level hue derived from the file's modification age.
    pub hue: u16,
    /// CSS colour matching `hue`, used for the badge and border.
    pub accent: String,
    pub bucket_label: String,
    /// Colourised markup of the current window.
    pub html: String,
    pub lines: Vec<RenderedLine>,
    /// Incremented every time an entry is applied.
    pub revision: u64,
    pub state: PanelState,
    pub scroll: ScrollTracker,
}

impl Panel {
    /// Placeholder for a key seen for the first time.
    pub fn placeholder(key: impl Into<String>, labels: LabelSet) -> Self {
        Self {
            key: key.into(),
            filename: String::new(),
            size_text: NOT_AVAILABLE.to_string(),
            mtime_text: NOT_AVAILABLE.to_string(),
            hue: PLACEHOLDER_HUE,
            accent: hsl_css(PLACEHOLDER_HUE),
            bucket_label: String::new(),
            html: labels.loading().to_string(),
            lines: Vec::new(),
            revision: 0,
            state: PanelState::Loading,
            scroll: ScrollTracker::default(),
        }
    }

    pub fn is_populated(&self) -> bool {
        self.state == PanelState::Populated
    }
}

/// Build the panel list for a new key set.
///
/// The result is sorted by key and holds exactly the given keys. Existing
/// panels are moved over untouched; new keys get a placeholder.
pub fn reconcile_panels<'k>(
    old: Vec<Panel>,
    keys: impl IntoIterator<Item = &'k str>,
    labels: LabelSet,
) -> Vec<Panel> {
    let mut by_key: HashMap<String, Panel> =
        old.into_iter().map(|p| (p.key.clone(), p)).collect();

    let mut keys: Vec<&str> = keys.into_iter().collect();
    keys.sort_unstable();
    keys.dedup();

    keys.into_iter()
        .map(|k| by_key.remove(k).unwrap_or_else(|| Panel::placeholder(k, labels)))
        .collect()
}

/// Inputs shared by every panel update within one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    /// Reference clock for ages (the server's `now` when available).
    pub now: DateTime<Utc>,
    /// Zone for timestamps without an offset and for displayed times.
    pub tz: FixedOffset,
    /// Lines kept per panel, counted from the end.
    pub max_lines: usize,
    pub labels: LabelSet,
}

/// Apply one log entry to a panel.
///
/// `cache` is the panel's first-seen cache as loaded from the session. The
/// returned cache holds one entry per line of the new window: the time
/// resolved for it, or `ctx.now` for a line seen without any time, so the
/// next poll ages it from this observation. Callers persist it in place of
/// the old one.
pub fn update_panel(
    panel: &mut Panel,
    info: &LogFileInfo,
    cache: &FirstSeenCache,
    ctx: &RenderContext,
) -> FirstSeenCache {
    panel.filename = file_name_of(&info.path).to_string();

    let mtime = info
        .mtime
        .as_deref()
        .and_then(|raw| parse_iso_timestamp(raw, &ctx.tz));

    let file_age = if info.exists {
        panel.size_text = human_size(info.size);
        panel.mtime_text = format_mtime(mtime, &ctx.tz);
        mtime.map_or(UNKNOWN_AGE_SECS, |mt| age_secs(mt, ctx.now))
    } else {
        panel.size_text = ctx.labels.missing().to_string();
        panel.mtime_text = NOT_AVAILABLE.to_string();
        UNKNOWN_AGE_SECS
    };

    panel.hue = hue_for_age(file_age);
    panel.accent = hsl_css(panel.hue);
    panel.bucket_label = ctx.labels.bucket_label(bucket_for_age(file_age)).to_string();

    let window_start = info.lines.len().saturating_sub(ctx.max_lines.max(1));
    let window = &info.lines[window_start..];

    let mut next_cache = FirstSeenCache::default();
    let mut rendered = Vec::with_capacity(window.len());
    let mut html_lines = Vec::with_capacity(window.len());

    for line in window {
        let clean = strip_leading(&line.text);
        let resolved = resolve_line_time(line, clean, cache, ctx.now, &ctx.tz);
        let age = resolved.age_secs(ctx.now);

        next_cache.record(line.text.as_str(), resolved.at.unwrap_or(ctx.now));

        let style = LineStyle {
            hue: age.map_or(panel.hue, hue_for_age),
            glow: glow_for_age(age_or_unknown(age)),
        };
        let segments = segment_line(clean);
        html_lines.push(line_html(&segments, &style));
        rendered.push(RenderedLine {
            text: clean.to_string(),
            style,
            age_secs: age,
            source: resolved.source,
            segments,
        });
    }

    panel.html = if html_lines.is_empty() {
        placeholder_html(ctx.labels.empty())
    } else {
        html_lines.join("\n")
    };
    panel.lines = rendered;
    panel.revision += 1;
    panel.state = PanelState::Populated;

    next_cache
}
