use std::num::NonZeroU32;

use glutin::{
    config::{Config, ConfigTemplateBuilder},
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    display::{Display, GetGlDisplay, GlDisplay},
    prelude::*,
    surface::{Surface, SwapInterval, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use log::{info, warn};
use raw_window_handle::HasRawWindowHandle;
use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event_loop::EventLoopWindowTarget,
    window::{Window, WindowBuilder},
};

use super::backend::{FunctionTable, GlowBackend};
use super::surface::GlPlatform;
use crate::config::WindowConfig;
use crate::utils::error::{RenderError, Result};

/// winit window plus the glutin context and surface bound to it.
pub struct GlutinPlatform {
    // Field order is drop order: surface and context go before the window.
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    display: Display,
    window: Window,
}

impl GlutinPlatform {
    /// Opens the window and an OpenGL 3.3 core context for it.
    ///
    /// Fails when the display offers no usable pixel format or context.
    pub fn new<T>(
        target: &EventLoopWindowTarget<T>,
        window_config: &WindowConfig,
        vsync: bool,
    ) -> Result<Self> {
        let window_builder = WindowBuilder::new()
            .with_title(&window_config.title)
            .with_inner_size(LogicalSize::new(window_config.width, window_config.height))
            .with_min_inner_size(LogicalSize::new(
                window_config.min_width,
                window_config.min_height,
            ));

        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_depth_size(24);

        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));
        let (window, gl_config) = display_builder
            .build(target, template, pick_config)
            .map_err(|e| RenderError::NoCompatibleConfig(e.to_string()))?;
        let window = window
            .ok_or_else(|| RenderError::Surface("window creation failed".into()))?;

        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(Some(window.raw_window_handle()));

        let display = gl_config.display();
        let not_current = unsafe { display.create_context(&gl_config, &context_attributes) }
            .map_err(|e| {
                RenderError::Context(format!("an OpenGL 3.3 capable driver is required ({e})"))
            })?;

        let attrs = window.build_surface_attributes(<_>::default());
        let surface = unsafe { display.create_window_surface(&gl_config, &attrs) }
            .map_err(|e| RenderError::Surface(e.to_string()))?;

        let context = not_current
            .make_current(&surface)
            .map_err(|e| RenderError::Context(e.to_string()))?;

        let interval = if vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&context, interval) {
            warn!("Could not set swap interval: {e}");
        }

        info!(
            "Created GL surface with {} samples, depth {}",
            gl_config.num_samples(),
            gl_config.depth_size()
        );

        Ok(Self {
            surface,
            context,
            display,
            window,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Resizes the window's default framebuffer. Zero sizes are ignored.
    pub fn resize_drawable(&self, size: PhysicalSize<u32>) {
        if let (Some(width), Some(height)) =
            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        {
            self.surface.resize(&self.context, width, height);
        }
    }
}

/// glutin's picker must return a config and is only called with a
/// non-empty list; an empty one is reported as an error before this runs.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    most_samples(configs, |config| config.num_samples())
        .expect("glutin calls the config picker with at least one config")
}

/// First item with the highest sample count.
fn most_samples<T>(items: impl Iterator<Item = T>, samples: impl Fn(&T) -> u8) -> Option<T> {
    items.reduce(|best, item| {
        if samples(&item) > samples(&best) {
            item
        } else {
            best
        }
    })
}

impl GlPlatform for GlutinPlatform {
    type Backend = GlowBackend;

    fn make_current(&self) -> Result<()> {
        self.context
            .make_current(&self.surface)
            .map_err(|e| RenderError::Context(e.to_string()))
    }

    fn load_functions(&self) -> Result<GlowBackend> {
        let gl = FunctionTable::resolve(|symbol| self.display.get_proc_address(symbol))?;
        Ok(GlowBackend::new(gl))
    }

    fn present(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .map_err(|e| RenderError::Surface(e.to_string()))
    }

    fn request_redraw(&self) {
        self.window.request_redraw();
    }

    fn is_shown_on_screen(&self) -> bool {
        let size = self.window.inner_size();
        self.window.is_visible().unwrap_or(true)
            && !self.window.is_minimized().unwrap_or(false)
            && size.width > 0
            && size.height > 0
    }

    fn content_scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }
}
