use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use log::{debug, warn, LevelFilter};
use serde::{Deserialize, Serialize};

use super::rendering::clamp_fps;
use super::{EditorConfig, RenderConfig, WindowConfig};
use crate::utils::error::ConfigError;

pub const CONFIG_FILE: &str = "config.toml";
/// Overrides the config file location.
pub const CONFIG_ENV: &str = "SHADERPAD_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebuildConfig {
    /// Quiet period after an edit before rebuilding. 0 rebuilds on every change.
    pub debounce_ms: u64,
}

impl RebuildConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    pub log_level: String,
    pub window: WindowConfig,
    pub render: RenderConfig,
    pub editor: EditorConfig,
    pub rebuild: RebuildConfig,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            window: WindowConfig::default(),
            render: RenderConfig::default(),
            editor: EditorConfig::default(),
            rebuild: RebuildConfig::default(),
        }
    }
}

impl PlaygroundConfig {
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        ProjectDirs::from("com", "shaderpad", "shaderpad")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// `SHADERPAD_CONFIG` if set, else the per-user config directory.
    pub fn resolve_path() -> Result<PathBuf, ConfigError> {
        match env::var_os(CONFIG_ENV) {
            Some(path) => Ok(PathBuf::from(path)),
            None => Self::default_path(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        Ok(config.sanitized())
    }

    /// Never fails: a missing file means defaults, a broken one is logged.
    pub fn load_or_default() -> Self {
        let path = match Self::resolve_path() {
            Ok(path) => path,
            Err(e) => {
                warn!("{e}; using default configuration");
                return Self::default();
            }
        };

        match Self::load_from(&path) {
            Ok(config) => {
                debug!("Loaded configuration from {}", path.display());
                config
            }
            Err(ConfigError::NotFound(_)) => {
                debug!("No config at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("Ignoring {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Clamps values the rest of the program cannot work with.
    pub fn sanitized(mut self) -> Self {
        self.render.fps = clamp_fps(self.render.fps);
        self.render.diagnostic_limit = self.render.diagnostic_limit.max(1);
        self.editor.indent_width = self.editor.indent_width.max(1);
        if !(self.editor.font_size.is_finite() && self.editor.font_size > 0.0) {
            self.editor.font_size = EditorConfig::default().font_size;
        }
        self.window.min_width = self.window.min_width.max(1.0);
        self.window.min_height = self.window.min_height.max(1.0);
        self.window.width = self.window.width.max(self.window.min_width);
        self.window.height = self.window.height.max(self.window.min_height);
        self
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_reference_layout() {
        let config = PlaygroundConfig::default();
        assert_eq!(config.window.width, 1200.0);
        assert_eq!(config.window.min_height, 400.0);
        assert_eq!(config.render.fps, 60.0);
        assert_eq!(config.render.diagnostic_limit, 512);
        assert_eq!(config.editor.indent_width, 4);
        assert_eq!(config.rebuild.debounce(), Duration::ZERO);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "log_level = \"debug\"\n[editor]\ntheme = \"dark\"\n[rebuild]\ndebounce_ms = 150\n",
        )
        .unwrap();

        let config = PlaygroundConfig::load_from(&path).unwrap();

        assert_eq!(config.log_level(), LevelFilter::Debug);
        assert_eq!(config.editor.theme, Theme::Dark);
        assert_eq!(config.editor.font_size, 13.0);
        assert_eq!(config.rebuild.debounce(), Duration::from_millis(150));
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let mut config = PlaygroundConfig::default();
        config.render.fps = 30.0;
        config.editor.theme = Theme::Light;

        config.save_to(&path).unwrap();
        let loaded = PlaygroundConfig::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_reports_not_found() {
        let dir = tempdir().unwrap();
        let result = PlaygroundConfig::load_from(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[render\nfps = ").unwrap();
        assert!(matches!(
            PlaygroundConfig::load_from(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_sanitize_clamps_values() {
        let mut config = PlaygroundConfig::default();
        config.render.fps = 10_000.0;
        config.render.diagnostic_limit = 0;
        config.editor.indent_width = 0;
        config.editor.font_size = -1.0;
        config.window.width = 10.0;

        let config = config.sanitized();

        assert_eq!(config.render.fps, 240.0);
        assert_eq!(config.render.diagnostic_limit, 1);
        assert_eq!(config.editor.indent_width, 1);
        assert_eq!(config.editor.font_size, 13.0);
        assert_eq!(config.window.width, config.window.min_width);
    }

    #[test]
    fn test_unknown_log_level_falls_back() {
        let config = PlaygroundConfig {
            log_level: "loud".into(),
            ..PlaygroundConfig::default()
        };
        assert_eq!(config.log_level(), LevelFilter::Info);
    }
}
