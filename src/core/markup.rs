// ChiloDisco - core/markup.rs
//
// Colourised line rendering. Produces both an HTML fragment (the canonical
// markup a panel exposes) and a list of plain/timestamp segments that the
// native renderer draws from.
//
// Embedded timestamps are wrapped in their own span nested inside the line
// span so they can be emphasised while sharing the line's colour and glow.
// Segments are computed on the unescaped text; HTML entities always begin
// and end with non-word characters, so timestamp boundaries are identical
// before and after escaping.

use super::age::Glow;
use super::timestamp::timestamp_spans;
use crate::util::constants::{
    COLOUR_LIGHTNESS, COLOUR_SATURATION, EMPTY_PLACEHOLDER_COLOUR, GLOW_LIGHTNESS,
};

/// Colour and glow applied to a whole line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub hue: u16,
    pub glow: Glow,
}

impl LineStyle {
    /// CSS `color` value.
    pub fn colour_css(&self) -> String {
        hsl_css(self.hue)
    }

    /// CSS `text-shadow` value: two concentric glows, or `none`.
    pub fn shadow_css(&self) -> String {
        if self.glow.is_none() {
            return "none".to_string();
        }
        let inner = self.glow.blur;
        let outer = u16::from(self.glow.blur) * 2;
        format!(
            "0 0 {inner}px hsla({h} {COLOUR_SATURATION}% {GLOW_LIGHTNESS}% / {a1}), \
             0 0 {outer}px hsla({h} {COLOUR_SATURATION}% {GLOW_LIGHTNESS}% / {a2})",
            h = self.hue,
            a1 = css_number(self.glow.alpha),
            a2 = css_number(self.glow.outer_alpha()),
        )
    }

    fn style_attr(&self) -> String {
        format!(
            "color:{}; text-shadow:{}",
            self.colour_css(),
            self.shadow_css()
        )
    }
}

/// `hsl(H 100% 55%)` for a hue.
pub fn hsl_css(hue: u16) -> String {
    format!("hsl({hue} {COLOUR_SATURATION}% {COLOUR_LIGHTNESS}%)")
}

/// Format a 0-1 fraction with at most two decimals and no trailing zeros.
fn css_number(value: f32) -> String {
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Strip a leading BOM, CR/LF and any leading whitespace (including NBSP,
/// the U+2000-U+200B spaces and the ideographic space). Interior text is
/// left untouched.
pub fn strip_leading(raw: &str) -> &str {
    raw.trim_start_matches(|c: char| {
        c.is_whitespace()
            || c == '\u{FEFF}'
            || c == '\u{00A0}'
            || ('\u{2000}'..='\u{200B}').contains(&c)
            || c == '\u{3000}'
    })
}

/// Escape the five HTML-significant characters.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// A run of line text, flagged when it is an embedded timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub timestamp: bool,
}

/// Split already-stripped line text into plain and timestamp segments.
pub fn segment_line(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;
    for span in timestamp_spans(text) {
        if span.start > cursor {
            segments.push(Segment {
                text: text[cursor..span.start].to_string(),
                timestamp: false,
            });
        }
        segments.push(Segment {
            text: text[span.clone()].to_string(),
            timestamp: true,
        });
        cursor = span.end;
    }
    if cursor < text.len() {
        segments.push(Segment {
            text: text[cursor..].to_string(),
            timestamp: false,
        });
    }
    segments
}

/// Render segments as one HTML span, timestamps in nested spans.
pub fn line_html(segments: &[Segment], style: &LineStyle) -> String {
    let attr = style.style_attr();
    let mut inner = String::new();
    for seg in segments {
        let escaped = escape_html(&seg.text);
        if seg.timestamp {
            inner.push_str(&format!(
                r#"<span class="timestamp" style="{attr}">{escaped}</span>"#
            ));
        } else {
            inner.push_str(&escaped);
        }
    }
    format!(r#"<span style="{attr}">{inner}</span>"#)
}

/// Muted placeholder shown when a panel's window holds no lines.
pub fn placeholder_html(text: &str) -> String {
    format!(
        r#"<span style="color:{EMPTY_PLACEHOLDER_COLOUR}">{}</span>"#,
        escape_html(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::age::glow_for_age;

    #[test]
    fn test_strip_leading_only_touches_prefix() {
        assert_eq!(strip_leading("\u{FEFF}\r\n  \tabc  def "), "abc  def ");
        assert_eq!(strip_leading("\u{00A0}\u{3000}\u{200B}x"), "x");
        assert_eq!(strip_leading("no-prefix"), "no-prefix");
        assert_eq!(strip_leading("   "), "");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_shadow_none_without_glow() {
        let style = LineStyle {
            hue: 0,
            glow: Glow::NONE,
        };
        assert_eq!(style.shadow_css(), "none");
        assert_eq!(style.colour_css(), "hsl(0 100% 55%)");
    }

    #[test]
    fn test_shadow_for_fresh_line() {
        let style = LineStyle {
            hue: 140,
            glow: glow_for_age(1.0),
        };
        assert_eq!(
            style.shadow_css(),
            "0 0 12px hsla(140 100% 60% / 0.9), 0 0 24px hsla(140 100% 60% / 0.54)"
        );
    }

    #[test]
    fn test_segments_split_around_timestamps() {
        let segs = segment_line("at 10:00:01 ok");
        assert_eq!(
            segs,
            vec![
                Segment { text: "at ".into(), timestamp: false },
                Segment { text: "10:00:01".into(), timestamp: true },
                Segment { text: " ok".into(), timestamp: false },
            ]
        );
        assert!(segment_line("").is_empty());
    }

    #[test]
    fn test_line_html_nests_timestamp_span() {
        let style = LineStyle {
            hue: 60,
            glow: Glow::NONE,
        };
        let html = line_html(&segment_line("<b> 12:00:00"), &style);
        assert_eq!(
            html,
            "<span style=\"color:hsl(60 100% 55%); text-shadow:none\">&lt;b&gt; \
             <span class=\"timestamp\" style=\"color:hsl(60 100% 55%); text-shadow:none\">\
             12:00:00</span></span>"
        );
    }

    #[test]
    fn test_placeholder_is_escaped_and_muted() {
        assert_eq!(
            placeholder_html("(empty)"),
            "<span style=\"color:#7a8aa3\">(empty)</span>"
        );
    }
}
