use egui::{CentralPanel, Context, SidePanel, TopBottomPanel, Vec2};
use winit::dpi::LogicalSize;

use super::editor::EditorPane;
use crate::config::EditorConfig;

/// What one UI frame asks of the rest of the app.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameResponse {
    pub text_changed: bool,
    /// New canvas size in window logical pixels, when it differs from last
    /// frame. Already corrected for egui's zoom.
    pub canvas_resized: Option<LogicalSize<f64>>,
}

/// Splits the window: editor over build log on the right, shader canvas
/// filling the rest. The canvas touches the window's left and bottom edges,
/// so its GL viewport origin is (0, 0).
#[derive(Debug, Default)]
pub struct HostLayout {
    canvas: Option<Vec2>,
}

impl HostLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(
        &mut self,
        ctx: &Context,
        editor: &mut EditorPane,
        config: &EditorConfig,
        dark: bool,
    ) -> FrameResponse {
        let mut text_changed = false;
        let half_width = ctx.screen_rect().width() * 0.5;

        SidePanel::right("editor_panel")
            .resizable(true)
            .min_width(config.editor_min_width)
            .default_width(half_width.max(config.editor_min_width))
            .show(ctx, |ui| {
                TopBottomPanel::bottom("log_panel")
                    .resizable(true)
                    .min_height(config.log_min_height)
                    .default_height(config.log_height)
                    .show_inside(ui, |ui| {
                        ui.label("Compilation Errors:");
                        editor.show_log(ui);
                    });
                CentralPanel::default().show_inside(ui, |ui| {
                    text_changed = editor.show_code(ui, dark);
                });
            });

        let canvas = ctx.available_rect().size();
        FrameResponse {
            text_changed,
            canvas_resized: self.track_canvas(canvas, ctx.zoom_factor()),
        }
    }

    /// Records the canvas size, given in egui points under `zoom`, and
    /// returns it in window logical pixels when it changed.
    ///
    /// egui points only equal window logical pixels at zoom 1. Keyboard zoom
    /// changes egui's scale without touching the window's.
    pub fn track_canvas(&mut self, points: Vec2, zoom: f32) -> Option<LogicalSize<f64>> {
        let zoom = if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 };
        let size = Vec2::new(points.x.max(0.0), points.y.max(0.0)) * zoom;
        if self.canvas == Some(size) {
            return None;
        }
        self.canvas = Some(size);
        Some(LogicalSize::new(size.x as f64, size.y as f64))
    }
}
