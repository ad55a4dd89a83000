// ChiloDisco - gui.rs
//
// Top-level eframe::App implementation.
// Wires the control bar, the panel grid and the status bar together, drains
// the poll thread each frame, and runs scroll retention on every panel.

use crate::app::client::SnapshotSource;
use crate::app::poll::{PollManager, PollProgress};
use crate::app::state::DashboardState;
use crate::core::scroll::ViewportMetrics;
use crate::ui;
use crate::ui::panels::log_panel::PanelLayout;
use crate::util::constants::MAX_POLL_MESSAGES_PER_FRAME;

/// Presentation options resolved from config and CLI.
#[derive(Debug, Clone, Copy)]
pub struct DashboardOptions {
    pub dark_mode: bool,
    pub font_size: f32,
    pub columns: usize,
    pub panel_height: f32,
}

/// The ChiloDisco application.
pub struct DashboardApp {
    pub state: DashboardState,
    pub poller: PollManager,
    options: DashboardOptions,
    /// Window size seen last frame, for resize-triggered refreshes.
    last_screen_size: Option<egui::Vec2>,
}

impl DashboardApp {
    /// Create the application and start polling `source` right away.
    pub fn new(
        ctx: &egui::Context,
        state: DashboardState,
        source: Box<dyn SnapshotSource>,
        options: DashboardOptions,
    ) -> Self {
        ui::theme::apply(ctx, options.dark_mode, options.font_size);

        let mut poller = PollManager::new();
        poller.start(source, state.settings.interval());

        Self {
            state,
            poller,
            options,
            last_screen_size: None,
        }
    }

    fn drain_poller(&mut self, ctx: &egui::Context) {
        for msg in self.poller.poll_progress(MAX_POLL_MESSAGES_PER_FRAME) {
            match msg {
                PollProgress::Started { source, .. } => {
                    self.state.status_message = format!("Polling {source}");
                }
                PollProgress::Snapshot { snapshot, .. } => {
                    self.state.apply_snapshot(&snapshot);
                    ctx.request_repaint();
                }
                PollProgress::Failed { error, .. } => {
                    self.state.record_failure(&error);
                }
                PollProgress::Stopped { generation } => {
                    tracing::info!(generation, "Poll thread exited");
                }
            }
        }
    }

    fn handle_controls(&mut self, action: ui::panels::controls::ControlAction) {
        if let Some(ms) = action.interval_ms {
            match self.state.set_interval_ms(ms) {
                Ok(Some(interval)) => self.poller.set_interval(interval),
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Interval rejected"),
            }
        }
        if let Some(n) = action.max_lines {
            if let Err(e) = self.state.set_max_lines(n) {
                tracing::warn!(error = %e, "Line limit rejected");
            }
        }
        // Mid-drag values only update the field; the refetch waits for release.
        if action.refresh || action.max_lines_committed {
            self.poller.request_refresh();
        }
    }

    /// Refetch when the window changes size.
    fn detect_resize(&mut self, ctx: &egui::Context) {
        let size = ctx.screen_rect().size();
        if let Some(prev) = self.last_screen_size {
            if prev != size {
                tracing::debug!(width = size.x, height = size.y, "Window resized, refreshing");
                self.poller.request_refresh();
            }
        }
        self.last_screen_size = Some(size);
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_poller(ctx);
        self.detect_resize(ctx);

        // Control bar
        let action = egui::TopBottomPanel::top("controls")
            .min_height(ui::theme::CONTROL_BAR_HEIGHT)
            .show(ctx, |ui| {
                ui::panels::controls::render(ui, &self.state, self.poller.is_active())
            })
            .inner;
        self.handle_controls(action);

        // Status bar
        egui::TopBottomPanel::bottom("status_bar")
            .frame(egui::Frame::default().fill(ui::theme::STATUS_BG).inner_margin(4.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(&self.state.status_message)
                            .color(ui::theme::STATUS_TEXT),
                    );
                    if self.state.consecutive_failures > 0 {
                        ui.separator();
                        ui.label(
                            egui::RichText::new(format!(
                                "{} failed poll(s)",
                                self.state.consecutive_failures
                            ))
                            .color(ui::theme::STATUS_TEXT)
                            .weak(),
                        );
                    }
                });
            });

        // Panel grid
        let layout = PanelLayout {
            body_height: self.options.panel_height,
            font_size: self.options.font_size,
        };
        let columns = self.options.columns.max(1);
        let labels = self.state.labels;
        let mut metrics: Vec<(String, ViewportMetrics)> = Vec::new();

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.panels.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label(labels.loading());
                });
                return;
            }
            egui::ScrollArea::vertical()
                .id_salt("dashboard")
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    for row in self.state.panels.chunks(columns) {
                        ui.columns(columns, |cols| {
                            for (col, panel) in cols.iter_mut().zip(row) {
                                let m = ui::panels::log_panel::render(col, panel, labels, layout);
                                metrics.push((panel.key.clone(), m));
                            }
                        });
                        ui.add_space(ui::theme::PANEL_SPACING);
                    }
                });
        });

        // Scroll retention runs after layout so the metrics describe the
        // content that was just drawn.
        for (key, m) in metrics {
            if self.state.observe_viewport(&key, m).is_some() {
                ctx.request_repaint();
            }
        }

        ctx.request_repaint_after(self.state.settings.interval());
    }

    /// Called by eframe when the application window is about to close.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.poller.stop();
    }
}
