pub mod editor;
pub mod highlight;
pub mod indent;
pub mod layout;
pub mod notice;

pub use editor::EditorPane;
pub use layout::{FrameResponse, HostLayout};
pub use notice::FailureNotice;
