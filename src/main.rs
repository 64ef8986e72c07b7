use std::time::Instant;

use anyhow::Result;
use glow::HasContext;
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopWindowTarget},
    window::Theme as WindowTheme,
};

use shaderpad::{
    config::Theme, ui::FrameResponse, EditorPane, FailureNotice, FrameTimer, GlPlatform,
    GlutinPlatform, HostLayout, Playground, PlaygroundConfig,
};

struct App {
    config: PlaygroundConfig,
    playground: Playground<GlutinPlatform>,
    editor: EditorPane,
    layout: HostLayout,
    egui_ctx: egui::Context,
    egui_winit: egui_winit::State,
    painter: Option<egui_glow::Painter>,
    painter_failed: bool,
    timer: FrameTimer,
    dark: bool,
}

impl App {
    fn new(event_loop: &EventLoop<()>, config: PlaygroundConfig) -> Result<Self> {
        let platform = GlutinPlatform::new(&**event_loop, &config.window, config.render.vsync)?;

        let dark = match config.editor.theme {
            Theme::Dark => true,
            Theme::Light => false,
            Theme::Auto => platform.window().theme() != Some(WindowTheme::Light),
        };

        let egui_ctx = egui::Context::default();
        egui_ctx.set_visuals(if dark {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });
        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            event_loop,
            Some(platform.window().scale_factor() as f32),
            None,
        );

        let editor = EditorPane::new(&config.editor);
        let playground = Playground::new(platform, &config);
        let timer = FrameTimer::new(config.render.fps, Instant::now());

        Ok(Self {
            config,
            playground,
            editor,
            layout: HostLayout::new(),
            egui_ctx,
            egui_winit,
            painter: None,
            painter_failed: false,
            timer,
            dark,
        })
    }

    fn handle_event(&mut self, event: Event<()>, elwt: &EventLoopWindowTarget<()>) {
        match event {
            Event::Resumed => self.playground.surface_mut().on_shown(),
            Event::NewEvents(_) => {
                let now = Instant::now();
                if self.timer.poll(now) {
                    self.playground.surface_mut().on_tick();
                }
                self.playground.poll_rebuild(&mut self.editor, now);
            }
            Event::WindowEvent { event, .. } => self.handle_window_event(event, elwt),
            Event::AboutToWait => {
                let deadline = match self.playground.rebuild_deadline() {
                    Some(rebuild) => rebuild.min(self.timer.deadline()),
                    None => self.timer.deadline(),
                };
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            }
            Event::LoopExiting => self.shutdown(),
            _ => {}
        }
        self.process_surface_events();
    }

    fn handle_window_event(&mut self, event: WindowEvent, elwt: &EventLoopWindowTarget<()>) {
        let window = self.playground.surface().platform().window();
        let response = self.egui_winit.on_window_event(window, &event);
        if response.repaint {
            window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(size) => {
                self.playground.surface().platform().resize_drawable(size);
                // Split layouts may never resize the canvas itself on first show.
                self.playground.surface_mut().ensure_initialized();
                self.playground.surface().platform().request_redraw();
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                self.playground.surface_mut().on_scale_changed();
            }
            WindowEvent::Occluded(false) | WindowEvent::Focused(true) => {
                self.playground.surface_mut().on_shown();
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn redraw(&mut self) {
        if !self.playground.surface().is_initialized() {
            return;
        }

        let window = self.playground.surface().platform().window();
        let screen_size = window.inner_size();
        let raw_input = self.egui_winit.take_egui_input(window);

        let editor = &mut self.editor;
        let layout = &mut self.layout;
        let editor_config = &self.config.editor;
        let dark = self.dark;
        let mut frame = FrameResponse::default();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            frame = layout.show(ctx, editor, editor_config, dark);
        });
        self.egui_winit
            .handle_platform_output(window, full_output.platform_output);

        if frame.text_changed {
            self.playground.on_text_changed(&mut self.editor, Instant::now());
        }
        if let Some(size) = frame.canvas_resized {
            self.playground.surface_mut().on_resize(size);
        }

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let textures_delta = full_output.textures_delta;
        let pixels_per_point = full_output.pixels_per_point;
        let painter = &mut self.painter;

        let result = self.playground.surface_mut().on_draw_with(|gl| {
            if let Some(painter) = painter {
                painter.paint_and_update_textures(
                    [screen_size.width, screen_size.height],
                    pixels_per_point,
                    &primitives,
                    &textures_delta,
                );
            }
            // The painter leaves these on; the next surface frame expects them off.
            unsafe {
                gl.context().disable(glow::SCISSOR_TEST);
                gl.context().disable(glow::BLEND);
            }
        });
        if let Err(e) = result {
            error!("Frame failed: {e}");
        }
    }

    fn process_surface_events(&mut self) {
        self.playground.process_events(&mut self.editor);

        if self.painter.is_none() && !self.painter_failed {
            if let Some(backend) = self.playground.surface().backend() {
                match egui_glow::Painter::new(backend.context().clone(), "", None) {
                    Ok(painter) => self.painter = Some(painter),
                    Err(e) => {
                        error!("UI painter unavailable: {e}");
                        self.painter_failed = true;
                    }
                }
                self.playground.surface().platform().request_redraw();
            }
        }

        if let Some(message) = self.playground.take_platform_failure() {
            let notice = FailureNotice::platform(&self.config.window.title, &message);
            let window = self.playground.surface().platform().window();
            window.set_title(&notice.title);
            notice.show();
        }
    }

    fn shutdown(&mut self) {
        if let Some(mut painter) = self.painter.take() {
            if self.playground.surface().platform().make_current().is_ok() {
                painter.destroy();
            }
        }
        self.playground.surface_mut().release();
        info!("Shut down");
    }
}

fn main() -> Result<()> {
    SimpleLogger::new().with_level(LevelFilter::Trace).init()?;
    let config = PlaygroundConfig::load_or_default();
    log::set_max_level(config.log_level());
    info!("Starting {}", config.window.title);

    let event_loop = EventLoopBuilder::new().build()?;
    let title = config.window.title.clone();
    let mut app = App::new(&event_loop, config).map_err(|e| {
        error!("Cannot open a GL window: {e}");
        FailureNotice::startup(&title, &e.to_string()).show();
        e
    })?;

    event_loop.run(move |event, elwt| app.handle_event(event, elwt))?;
    Ok(())
}
