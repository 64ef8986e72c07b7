use egui::text::CCursor;
use egui::text_selection::CCursorRange;
use egui::{Event, FontId, Key, ScrollArea, TextEdit, Ui};

use super::highlight::{self, Palette};
use super::indent;
use crate::config::EditorConfig;
use crate::playground::EditorBridge;
use crate::render::shaders::harness;

/// Shader source editor and its diagnostics pane.
pub struct EditorPane {
    text: String,
    diagnostics: String,
    indent_width: usize,
    font_size: f32,
    word_wrap: bool,
}

impl EditorPane {
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_text(config, harness::DEFAULT_FRAGMENT_BODY)
    }

    pub fn with_text(config: &EditorConfig, text: &str) -> Self {
        Self {
            text: text.to_string(),
            diagnostics: String::new(),
            indent_width: config.indent_width,
            font_size: config.font_size,
            word_wrap: config.word_wrap,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn diagnostics(&self) -> &str {
        &self.diagnostics
    }

    /// Draws the code editor. Returns true when the text changed this frame.
    pub fn show_code(&mut self, ui: &mut Ui, dark: bool) -> bool {
        let palette = Palette::for_dark_mode(dark);
        let font_id = FontId::monospace(self.font_size);
        let word_wrap = self.word_wrap;
        let mut layouter = |ui: &Ui, text: &str, wrap_width: f32| {
            let mut job = highlight::layout_job(text, &palette, &font_id);
            job.wrap.max_width = if word_wrap { wrap_width } else { f32::INFINITY };
            ui.fonts(|fonts| fonts.layout_job(job))
        };

        let typed = ui.input(|input| typed_trigger(&input.events));

        let output = ScrollArea::vertical()
            .id_source("shader_source")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                TextEdit::multiline(&mut self.text)
                    .id_source("shader_source_edit")
                    .code_editor()
                    .lock_focus(true)
                    .desired_width(f32::INFINITY)
                    .desired_rows(24)
                    .layouter(&mut layouter)
                    .show(ui)
            })
            .inner;

        let changed = output.response.changed();
        if changed {
            if let (Some(ch), Some(range)) = (typed, output.cursor_range) {
                let cursor = range.primary.ccursor.index;
                let moved = indent::on_char_added(&mut self.text, cursor, ch, self.indent_width);
                if moved != cursor {
                    let mut state = output.state;
                    state
                        .cursor
                        .set_char_range(Some(CCursorRange::one(CCursor::new(moved))));
                    state.store(ui.ctx(), output.response.id);
                }
            }
        }
        changed
    }

    /// Read-only build log.
    pub fn show_log(&mut self, ui: &mut Ui) {
        let mut log = self.diagnostics.as_str();
        ScrollArea::vertical()
            .id_source("build_log")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add(
                    TextEdit::multiline(&mut log)
                        .font(FontId::monospace(self.font_size))
                        .desired_width(f32::INFINITY),
                );
            });
    }
}

impl EditorBridge for EditorPane {
    fn source_text(&self) -> &str {
        &self.text
    }

    fn show_diagnostics(&mut self, log: &str) {
        self.diagnostics.clear();
        self.diagnostics.push_str(log);
    }
}

/// The auto-indent trigger typed this frame, if any.
fn typed_trigger(events: &[Event]) -> Option<char> {
    events.iter().rev().find_map(|event| match event {
        Event::Key {
            key: Key::Enter,
            pressed: true,
            ..
        } => Some('\n'),
        Event::Text(text) if text == "}" => Some('}'),
        _ => None,
    })
}
