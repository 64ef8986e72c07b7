//! Wiring between the editor, the rebuild path and the render surface.
//!
//! Every text change leads to a rebuild (optionally after a short quiet
//! period), and every finished rebuild pushes the build log back to the
//! editor, even when it is empty.

use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver};
use log::{debug, error};

use crate::config::PlaygroundConfig;
use crate::render::shaders::{BuildStatus, ShaderProgram};
use crate::render::surface::{GlPlatform, RenderSurface, SurfaceEvent};

/// What the playground needs from the text editor.
pub trait EditorBridge {
    /// The full current text.
    fn source_text(&self) -> &str;
    /// Replaces the diagnostics shown to the user. May be empty.
    fn show_diagnostics(&mut self, log: &str);
}

/// Coalesces bursts of edits into one rebuild.
#[derive(Debug, Clone)]
pub struct RebuildScheduler {
    debounce: Duration,
    pending_since: Option<Instant>,
}

impl RebuildScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending_since: None,
        }
    }

    pub fn text_changed(&mut self, now: Instant) {
        self.pending_since = Some(now);
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending_since.map(|since| since + self.debounce)
    }

    /// True once per burst, when the quiet period has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }
}

pub struct Playground<P: GlPlatform> {
    surface: RenderSurface<P>,
    events: Receiver<SurfaceEvent>,
    scheduler: RebuildScheduler,
    platform_failure: Option<String>,
}

impl<P: GlPlatform> Playground<P> {
    pub fn new(platform: P, config: &PlaygroundConfig) -> Self {
        let (tx, rx) = unbounded();
        let program =
            ShaderProgram::with_default_vertex().with_diagnostic_limit(config.render.diagnostic_limit);
        Self {
            surface: RenderSurface::new(platform, program, tx),
            events: rx,
            scheduler: RebuildScheduler::new(config.rebuild.debounce()),
            platform_failure: None,
        }
    }

    pub fn surface(&self) -> &RenderSurface<P> {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut RenderSurface<P> {
        &mut self.surface
    }

    /// Editor "text changed" signal.
    pub fn on_text_changed<E: EditorBridge>(&mut self, editor: &mut E, now: Instant) {
        self.scheduler.text_changed(now);
        self.poll_rebuild(editor, now);
    }

    /// Runs a rebuild whose quiet period has elapsed.
    pub fn poll_rebuild<E: EditorBridge>(&mut self, editor: &mut E, now: Instant) {
        if self.scheduler.take_due(now) {
            self.rebuild(editor);
        }
    }

    /// Rebuilds from the editor's current text and reports back.
    pub fn rebuild<E: EditorBridge>(&mut self, editor: &mut E) -> BuildStatus {
        let status = self.surface.install_program(editor.source_text());
        match status {
            BuildStatus::Deferred => debug!("Rebuild deferred until the surface initializes"),
            _ => editor.show_diagnostics(self.surface.build_log()),
        }
        status
    }

    /// Handles surface notifications; the first build runs on `Initialized`.
    pub fn process_events<E: EditorBridge>(&mut self, editor: &mut E) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                SurfaceEvent::Initialized => {
                    self.rebuild(editor);
                }
                SurfaceEvent::PlatformFailure(message) => {
                    error!("Rendering disabled: {message}");
                    self.platform_failure = Some(message);
                }
            }
        }
    }

    /// A platform failure not yet shown to the user.
    pub fn take_platform_failure(&mut self) -> Option<String> {
        self.platform_failure.take()
    }

    /// When a coalesced rebuild is due, if one is pending.
    pub fn rebuild_deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }
}
