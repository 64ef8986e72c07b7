use serde::{Deserialize, Serialize};

use crate::render::shaders::DEFAULT_DIAGNOSTIC_LIMIT;

pub const DEFAULT_FPS: f64 = 60.0;
pub const MIN_FPS: f64 = 1.0;
pub const MAX_FPS: f64 = 240.0;

/// Frame rate the timer can run at. Non-finite input falls back to the default.
pub fn clamp_fps(fps: f64) -> f64 {
    if fps.is_finite() {
        fps.clamp(MIN_FPS, MAX_FPS)
    } else {
        DEFAULT_FPS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Redraw rate of the frame timer.
    pub fps: f64,
    pub vsync: bool,
    /// Characters kept from each driver message in the build log.
    pub diagnostic_limit: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            vsync: true,
            diagnostic_limit: DEFAULT_DIAGNOSTIC_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_fps_bounds() {
        assert_eq!(clamp_fps(0.0), MIN_FPS);
        assert_eq!(clamp_fps(10_000.0), MAX_FPS);
        assert_eq!(clamp_fps(30.0), 30.0);
    }

    #[test]
    fn test_clamp_fps_non_finite() {
        assert_eq!(clamp_fps(f64::NAN), DEFAULT_FPS);
        assert_eq!(clamp_fps(f64::INFINITY), DEFAULT_FPS);
        assert_eq!(clamp_fps(f64::NEG_INFINITY), DEFAULT_FPS);
    }
}
