pub mod core;
pub mod editor;
pub mod rendering;
pub mod window;

pub use self::core::{PlaygroundConfig, RebuildConfig};
pub use editor::{EditorConfig, Theme};
pub use rendering::RenderConfig;
pub use window::WindowConfig;
