use std::path::PathBuf;
use thiserror::Error;

/// Failures of the render path. Shader compile and link problems are not
/// errors; they end up in the build log.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Could not resolve OpenGL functions: {}", .0.join(", "))]
    MissingFunctions(Vec<String>),
    #[error("OpenGL context error: {0}")]
    Context(String),
    #[error("OpenGL surface error: {0}")]
    Surface(String),
    #[error("No compatible OpenGL configuration: {0}")]
    NoCompatibleConfig(String),
    #[error("GPU allocation failed: {0}")]
    Allocation(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("No config directory available on this platform")]
    NoConfigDir,
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, RenderError>;
