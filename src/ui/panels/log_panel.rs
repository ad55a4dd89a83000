// ChiloDisco - ui/panels/log_panel.rs
//
// One log panel: header (display name, filename, size, mtime, recency badge)
// above a colourised, scrollable body framed in the panel's accent colour.
//
// Each line is one paragraph of a single LayoutJob. Embedded timestamps are
// underlined in the line's colour; recent lines get a faint glow backdrop.
// The scroll area reports its metrics back so the caller can run scroll
// retention, and accepts a forced offset from the previous frame.

use crate::core::labels::LabelSet;
use crate::core::panel::{Panel, PanelState};
use crate::core::scroll::ViewportMetrics;
use crate::ui::theme;
use egui::text::{LayoutJob, TextFormat};
use egui::{Color32, FontId, RichText, Stroke};

/// Layout options shared by every panel.
#[derive(Debug, Clone, Copy)]
pub struct PanelLayout {
    pub body_height: f32,
    pub font_size: f32,
}

/// Render one panel and return its viewport metrics for this frame.
pub fn render(
    ui: &mut egui::Ui,
    panel: &Panel,
    labels: LabelSet,
    layout: PanelLayout,
) -> ViewportMetrics {
    let accent = theme::hue_colour(panel.hue);

    egui::Frame::group(ui.style())
        .stroke(Stroke::new(theme::PANEL_BORDER_WIDTH, accent))
        .show(ui, |ui| {
            render_header(ui, panel, labels, accent);
            ui.separator();
            render_body(ui, panel, labels, layout)
        })
        .inner
}

fn render_header(ui: &mut egui::Ui, panel: &Panel, labels: LabelSet, accent: Color32) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(labels.display_name(&panel.key)).strong());
        if !panel.filename.is_empty() {
            ui.label(RichText::new(&panel.filename).monospace().weak());
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if !panel.bucket_label.is_empty() {
                ui.label(
                    RichText::new(format!(" {} ", panel.bucket_label))
                        .small()
                        .strong()
                        .color(theme::BADGE_TEXT)
                        .background_color(accent),
                );
            }
            ui.label(RichText::new(&panel.mtime_text).small().weak());
            ui.label(RichText::new(&panel.size_text).small().weak());
        });
    });
}

fn render_body(
    ui: &mut egui::Ui,
    panel: &Panel,
    labels: LabelSet,
    layout: PanelLayout,
) -> ViewportMetrics {
    let mut area = egui::ScrollArea::vertical()
        .id_salt(("log_panel", panel.key.as_str()))
        .max_height(layout.body_height)
        .min_scrolled_height(layout.body_height)
        .auto_shrink([false; 2]);
    if let Some(offset) = panel.scroll.requested_offset() {
        area = area.vertical_scroll_offset(offset);
    }

    let output = area.show(ui, |ui| {
        let font = FontId::monospace(layout.font_size);
        match (panel.state, panel.lines.is_empty()) {
            (PanelState::Loading, _) => {
                ui.label(
                    RichText::new(&panel.html)
                        .font(font)
                        .color(theme::hue_colour(panel.hue)),
                );
            }
            (PanelState::Populated, true) => {
                ui.label(RichText::new(labels.empty()).font(font).color(theme::EMPTY_TEXT));
            }
            (PanelState::Populated, false) => {
                ui.label(lines_job(panel, font, ui.available_width()));
            }
        }
    });

    ViewportMetrics {
        scroll_top: output.state.offset.y,
        scroll_height: output.content_size.y,
        client_height: output.inner_rect.height(),
    }
}

/// Build the colourised text of a populated panel.
fn lines_job(panel: &Panel, font: FontId, wrap_width: f32) -> LayoutJob {
    let mut job = LayoutJob::default();
    job.wrap.max_width = wrap_width;

    for (i, line) in panel.lines.iter().enumerate() {
        let colour = theme::hue_colour(line.style.hue);
        let backdrop = theme::glow_colour(line.style.hue, line.style.glow);
        let plain = TextFormat {
            font_id: font.clone(),
            color: colour,
            background: backdrop,
            ..Default::default()
        };

        if i > 0 {
            job.append("\n", 0.0, plain.clone());
        }
        for segment in &line.segments {
            let format = if segment.timestamp {
                TextFormat {
                    underline: Stroke::new(1.0, colour),
                    ..plain.clone()
                }
            } else {
                plain.clone()
            };
            job.append(&segment.text, 0.0, format);
        }
    }
    job
}
