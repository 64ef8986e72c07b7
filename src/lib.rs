pub mod config;
pub mod playground;
pub mod render;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use config::PlaygroundConfig;
pub use playground::{EditorBridge, Playground, RebuildScheduler};
pub use render::shaders::harness;
pub use render::{
    BuildStatus, FrameTimer, GlPlatform, GlutinPlatform, GpuBackend, RenderSurface, ShaderProgram,
    SurfaceEvent,
};
pub use ui::{EditorPane, FailureNotice, HostLayout};
pub use utils::error::{ConfigError, RenderError};
