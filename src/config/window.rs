use serde::{Deserialize, Serialize};

/// Main window geometry, in logical pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub min_width: f64,
    pub min_height: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Shader Playground".to_string(),
            width: 1200.0,
            height: 600.0,
            min_width: 800.0,
            min_height: 400.0,
        }
    }
}
