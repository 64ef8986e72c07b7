use rfd::{MessageButtons, MessageDialog, MessageLevel};

/// Native error dialog for failures that leave nothing to paint with.
///
/// Uses the platform's own dialog, so it works without a GL context.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureNotice {
    pub title: String,
    pub description: String,
}

impl FailureNotice {
    /// The window or context could not be created; the app is about to exit.
    pub fn startup(app_title: &str, message: &str) -> Self {
        Self {
            title: format!("{app_title} - OpenGL initialization error"),
            description: format!("Cannot open an OpenGL window: {message}"),
        }
    }

    /// The surface failed after the window opened; the editor keeps running.
    pub fn platform(app_title: &str, message: &str) -> Self {
        Self {
            title: format!("{app_title} - OpenGL initialization error"),
            description: format!("{message}\n\nShader rendering is disabled for this session."),
        }
    }

    /// Blocks until dismissed.
    pub fn show(&self) {
        let _ = MessageDialog::new()
            .set_level(MessageLevel::Error)
            .set_title(&self.title)
            .set_description(&self.description)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}
