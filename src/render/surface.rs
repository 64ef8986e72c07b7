//! The render surface: owns the GL context, the quad, the frame clock and
//! the live shader program, and drives one draw per timer tick.
//!
//! The surface starts `Uninitialized` and moves to `Initialized` exactly
//! once, on the first lifecycle signal that finds it shown on screen. Host
//! layouts do not reliably send an initial resize to a freshly split pane,
//! so every early signal (shown, resize) runs the same lazy check. If the
//! platform cannot provide a usable context the surface goes to `Failed`
//! and stays there; every later call is a no-op.

use crossbeam_channel::Sender;
use log::{debug, error, info};
use winit::dpi::{LogicalSize, PhysicalSize};

use super::backend::GpuBackend;
use super::quad::Quad;
use super::shaders::{BuildStatus, ShaderProgram};
use super::timer::FrameClock;
use crate::utils::error::Result;

/// Uniform names the fragment harness exposes to user code.
pub const RESOLUTION_UNIFORM: &str = "iResolution";
pub const TIME_UNIFORM: &str = "iTime";

/// The window-system side of the surface.
pub trait GlPlatform {
    type Backend: GpuBackend;

    /// Makes the GL context current on this thread. Required before any GL call.
    fn make_current(&self) -> Result<()>;
    /// Resolves the GL function table. Called once, with the context current.
    fn load_functions(&self) -> Result<Self::Backend>;
    fn present(&self) -> Result<()>;
    /// Schedules a paint; must not draw synchronously.
    fn request_redraw(&self);
    fn is_shown_on_screen(&self) -> bool;
    /// Physical pixels per logical pixel.
    fn content_scale_factor(&self) -> f64;
}

/// Notifications for whoever owns the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// The context is ready; shader builds can run now.
    Initialized,
    /// The render path is unusable. Sent once.
    PlatformFailure(String),
}

struct GpuState<B> {
    gl: B,
    quad: Quad,
    clock: FrameClock,
}

enum SurfaceState<B> {
    Uninitialized,
    Initialized(GpuState<B>),
    Failed,
}

pub struct RenderSurface<P: GlPlatform> {
    platform: P,
    state: SurfaceState<P::Backend>,
    program: ShaderProgram,
    logical_size: LogicalSize<f64>,
    drawable_size: PhysicalSize<u32>,
    elapsed_seconds: f32,
    events: Sender<SurfaceEvent>,
}

/// Depth clear value matching the current depth test direction.
pub fn depth_clear_value(depth_func: u32) -> f64 {
    if depth_func == glow::LESS {
        1.0
    } else {
        0.0
    }
}

impl<P: GlPlatform> RenderSurface<P> {
    pub fn new(platform: P, program: ShaderProgram, events: Sender<SurfaceEvent>) -> Self {
        Self {
            platform,
            state: SurfaceState::Uninitialized,
            program,
            logical_size: LogicalSize::new(0.0, 0.0),
            drawable_size: PhysicalSize::new(0, 0),
            elapsed_seconds: 0.0,
            events,
        }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn build_log(&self) -> &str {
        self.program.build_log()
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.state, SurfaceState::Initialized(_))
    }

    pub fn has_failed(&self) -> bool {
        matches!(self.state, SurfaceState::Failed)
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed_seconds
    }

    /// Latest known size in device pixels.
    pub fn drawable_size(&self) -> PhysicalSize<u32> {
        self.drawable_size
    }

    pub fn logical_size(&self) -> LogicalSize<f64> {
        self.logical_size
    }

    pub fn backend(&self) -> Option<&P::Backend> {
        match &self.state {
            SurfaceState::Initialized(gpu) => Some(&gpu.gl),
            _ => None,
        }
    }

    /// Brings up GL state. Does nothing unless the surface is still
    /// uninitialized; a failure is reported once and is final.
    pub fn initialize(&mut self) -> Result<()> {
        if !matches!(self.state, SurfaceState::Uninitialized) {
            return Ok(());
        }

        match self.create_gpu_state() {
            Ok(gpu) => {
                self.state = SurfaceState::Initialized(gpu);
                self.apply_viewport();
                info!("Render surface initialized");
                self.notify(SurfaceEvent::Initialized);
                Ok(())
            }
            Err(e) => {
                error!("Render surface initialization failed: {e}");
                self.state = SurfaceState::Failed;
                self.notify(SurfaceEvent::PlatformFailure(e.to_string()));
                Err(e)
            }
        }
    }

    fn create_gpu_state(&self) -> Result<GpuState<P::Backend>> {
        self.platform.make_current()?;
        let gl = self.platform.load_functions()?;
        debug!("{}", gl.driver_info());
        let quad = Quad::new(&gl)?;
        Ok(GpuState {
            gl,
            quad,
            clock: FrameClock::start(),
        })
    }

    /// Lazy first-visibility check shared by every early lifecycle signal.
    /// Returns whether the surface is initialized afterwards.
    pub fn ensure_initialized(&mut self) -> bool {
        if matches!(self.state, SurfaceState::Uninitialized) && self.platform.is_shown_on_screen() {
            // Failure has already been reported through the event channel.
            let _ = self.initialize();
        }
        self.is_initialized()
    }

    /// Visibility signal from the host.
    pub fn on_shown(&mut self) {
        self.ensure_initialized();
    }

    /// New logical size for the surface. The viewport is set in device pixels.
    pub fn on_resize(&mut self, size: LogicalSize<f64>) {
        self.logical_size = size;
        self.drawable_size = size.to_physical(self.platform.content_scale_factor());

        if self.ensure_initialized() {
            self.apply_viewport();
        }
    }

    /// Re-derives the device size after the content scale factor changed.
    pub fn on_scale_changed(&mut self) {
        let size = self.logical_size;
        self.on_resize(size);
    }

    fn apply_viewport(&self) {
        let SurfaceState::Initialized(gpu) = &self.state else {
            return;
        };
        if self.drawable_size.width == 0 || self.drawable_size.height == 0 {
            return;
        }
        if let Err(e) = self.platform.make_current() {
            error!("Cannot set viewport: {e}");
            return;
        }
        gpu.gl.viewport(
            0,
            0,
            self.drawable_size.width as i32,
            self.drawable_size.height as i32,
        );
    }

    /// Timer tick: refresh `iTime` and schedule a paint.
    pub fn on_tick(&mut self) {
        if let SurfaceState::Initialized(gpu) = &self.state {
            self.elapsed_seconds = gpu.clock.elapsed_seconds();
            self.platform.request_redraw();
        }
    }

    pub fn on_draw(&mut self) -> Result<()> {
        self.on_draw_with(|_| {})
    }

    /// Draws a frame, lets `overlay` paint on top, then presents.
    pub fn on_draw_with<F>(&mut self, overlay: F) -> Result<()>
    where
        F: FnOnce(&P::Backend),
    {
        let SurfaceState::Initialized(gpu) = &self.state else {
            return Ok(());
        };
        self.platform.make_current()?;

        let gl = &gpu.gl;
        if self.drawable_size.width > 0 && self.drawable_size.height > 0 {
            gl.viewport(
                0,
                0,
                self.drawable_size.width as i32,
                self.drawable_size.height as i32,
            );
        }
        gl.clear_color(0.0, 0.0, 0.0, 1.0);
        gl.clear_depth(depth_clear_value(gl.depth_func()));
        gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

        if let Some(program) = self.program.handle() {
            gl.use_program(Some(program));
            gl.set_uniform_2f(
                program,
                RESOLUTION_UNIFORM,
                self.drawable_size.width as f32,
                self.drawable_size.height as f32,
            );
            gl.set_uniform_1f(program, TIME_UNIFORM, self.elapsed_seconds);
            gpu.quad.draw(gl);
        }

        overlay(gl);
        self.platform.present()
    }

    /// Rebuilds the live program from new fragment text.
    pub fn install_program(&mut self, fragment_source: &str) -> BuildStatus {
        let SurfaceState::Initialized(gpu) = &self.state else {
            self.program.set_fragment_source(fragment_source);
            return BuildStatus::Deferred;
        };
        if let Err(e) = self.platform.make_current() {
            error!("Cannot rebuild shader: {e}");
            return BuildStatus::Failed;
        }
        self.program.build(&gpu.gl, fragment_source)
    }

    fn notify(&self, event: SurfaceEvent) {
        if self.events.send(event).is_err() {
            debug!("Surface event dropped; no listener");
        }
    }

    /// Releases GL objects. Safe to call more than once.
    pub fn release(&mut self) {
        let state = std::mem::replace(&mut self.state, SurfaceState::Failed);
        if let SurfaceState::Initialized(gpu) = state {
            match self.platform.make_current() {
                Ok(()) => {
                    self.program.release(&gpu.gl);
                    gpu.quad.release(&gpu.gl);
                }
                Err(e) => error!("Leaking GL objects, context unavailable: {e}"),
            }
        } else {
            self.state = state;
        }
    }
}

impl<P: GlPlatform> Drop for RenderSurface<P> {
    fn drop(&mut self) {
        self.release();
    }
}
