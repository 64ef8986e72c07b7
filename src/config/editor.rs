use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Follow the system appearance.
    #[default]
    Auto,
    Dark,
    Light,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub font_size: f32,
    pub indent_width: usize,
    pub theme: Theme,
    pub word_wrap: bool,
    pub editor_min_width: f32,
    pub log_height: f32,
    pub log_min_height: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            font_size: 13.0,
            indent_width: 4,
            theme: Theme::Auto,
            word_wrap: true,
            editor_min_width: 200.0,
            log_height: 100.0,
            log_min_height: 50.0,
        }
    }
}
