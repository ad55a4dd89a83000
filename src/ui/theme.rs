// ChiloDisco - ui/theme.rs
//
// Colour conversion for recency hues, global visuals, and layout constants.
// No dependencies on app state or business logic.

use crate::core::age::Glow;
use crate::util::constants::{COLOUR_LIGHTNESS, COLOUR_SATURATION, GLOW_LIGHTNESS};
use egui::Color32;

/// Muted colour of the "(empty)" placeholder (#7a8aa3).
pub const EMPTY_TEXT: Color32 = Color32::from_rgb(0x7a, 0x8a, 0xa3);

/// Status bar colours.
pub const STATUS_BG: Color32 = Color32::from_rgb(31, 41, 55); // Gray 800
pub const STATUS_TEXT: Color32 = Color32::from_rgb(209, 213, 219); // Gray 300

/// Text drawn on top of an accent-coloured badge.
pub const BADGE_TEXT: Color32 = Color32::from_rgb(17, 24, 39); // Gray 900

/// Layout constants.
pub const PANEL_SPACING: f32 = 8.0;
pub const PANEL_BORDER_WIDTH: f32 = 1.5;
pub const CONTROL_BAR_HEIGHT: f32 = 32.0;

/// Convert HSL (hue in degrees, saturation and lightness in percent) to RGB.
pub fn hsl_to_rgb(hue: u16, saturation: u8, lightness: u8) -> [u8; 3] {
    let h = f32::from(hue % 360) / 60.0;
    let s = f32::from(saturation.min(100)) / 100.0;
    let l = f32::from(lightness.min(100)) / 100.0;

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h as u8 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_byte = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [to_byte(r), to_byte(g), to_byte(b)]
}

/// Line colour for a hue: `hsl(H 100% 55%)`.
pub fn hue_colour(hue: u16) -> Color32 {
    let [r, g, b] = hsl_to_rgb(hue, COLOUR_SATURATION, COLOUR_LIGHTNESS);
    Color32::from_rgb(r, g, b)
}

/// Translucent backdrop approximating a text glow: `hsla(H 100% 60% / a)`.
///
/// egui has no text shadows, so the glow is drawn as a faint background
/// behind the glyphs, using the outer ring's opacity.
pub fn glow_colour(hue: u16, glow: Glow) -> Color32 {
    if glow.is_none() {
        return Color32::TRANSPARENT;
    }
    let [r, g, b] = hsl_to_rgb(hue, COLOUR_SATURATION, GLOW_LIGHTNESS);
    let alpha = (glow.outer_alpha() * 0.5 * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(r, g, b, alpha)
}

/// Apply the global theme and the monospace body size.
pub fn apply(ctx: &egui::Context, dark_mode: bool, font_size: f32) {
    ctx.set_visuals(if dark_mode {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    });
    ctx.style_mut(|style| {
        if let Some(font) = style.text_styles.get_mut(&egui::TextStyle::Monospace) {
            font.size = font_size;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::age::glow_for_age;

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb(0, 100, 50), [255, 0, 0]);
        assert_eq!(hsl_to_rgb(120, 100, 50), [0, 255, 0]);
        assert_eq!(hsl_to_rgb(240, 100, 50), [0, 0, 255]);
        assert_eq!(hsl_to_rgb(0, 0, 100), [255, 255, 255]);
    }

    #[test]
    fn test_freshest_hue_is_green_and_oldest_red() {
        let fresh = hue_colour(140);
        assert!(fresh.g() > fresh.r() && fresh.g() > fresh.b());
        let old = hue_colour(0);
        assert!(old.r() > old.g() && old.r() > old.b());
    }

    #[test]
    fn test_no_glow_is_transparent() {
        assert_eq!(glow_colour(0, glow_for_age(500.0)), Color32::TRANSPARENT);
        assert!(glow_colour(140, glow_for_age(0.0)).a() > 0);
    }
}
