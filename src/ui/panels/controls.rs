// ChiloDisco - ui/panels/controls.rs
//
// Top control bar: poll interval, lines per panel, manual refresh.
// Changes are reported back as `ControlAction`s; the caller validates them
// through the dashboard state and drives the poller.

use crate::app::state::DashboardState;
use crate::util::constants::{
    MAX_MAX_LINES, MAX_POLL_INTERVAL_MS, MIN_MAX_LINES, MIN_POLL_INTERVAL_MS,
};

/// What the user asked for this frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ControlAction {
    pub interval_ms: Option<u64>,
    pub max_lines: Option<usize>,
    /// The line limit edit finished (drag released or text committed).
    pub max_lines_committed: bool,
    pub refresh: bool,
}

/// Render the control bar.
pub fn render(ui: &mut egui::Ui, state: &DashboardState, polling: bool) -> ControlAction {
    let mut action = ControlAction::default();

    ui.horizontal(|ui| {
        ui.label("Interval");
        let mut interval = state.settings.interval_ms;
        let resp = ui.add(
            egui::DragValue::new(&mut interval)
                .range(MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS)
                .speed(10)
                .suffix(" ms"),
        );
        if resp.changed() {
            action.interval_ms = Some(interval);
        }

        ui.separator();

        ui.label("Lines");
        let mut max_lines = state.settings.max_lines;
        let resp = ui.add(
            egui::DragValue::new(&mut max_lines)
                .range(MIN_MAX_LINES..=MAX_MAX_LINES)
                .speed(5),
        );
        if resp.changed() {
            action.max_lines = Some(max_lines);
        }
        action.max_lines_committed =
            resp.drag_stopped() || (resp.changed() && !resp.dragged());

        ui.separator();

        if ui
            .button("\u{27f3} Refresh")
            .on_hover_text("Fetch a snapshot now")
            .clicked()
        {
            action.refresh = true;
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if polling {
                ui.label(
                    egui::RichText::new(" \u{25cf} LIVE ")
                        .strong()
                        .color(egui::Color32::from_rgb(34, 197, 94)) // Green 500
                        .background_color(egui::Color32::from_rgba_premultiplied(
                            34, 197, 94, 30,
                        )),
                );
            }
        });
    });

    action
}
