pub mod backend;
pub mod platform;
pub mod quad;
pub mod shaders;
pub mod surface;
pub mod timer;

#[cfg(test)]
pub(crate) mod fake;

pub use backend::{FunctionTable, GlowBackend, GpuBackend};
pub use platform::GlutinPlatform;
pub use shaders::{BuildStatus, ShaderProgram};
pub use surface::{GlPlatform, RenderSurface, SurfaceEvent};
pub use timer::{FrameClock, FrameTimer};
