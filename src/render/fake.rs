//! Recording GL backend and window platform for tests.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::{HashMap, HashSet};
use std::num::NonZeroU32;
use std::rc::Rc;

use super::backend::{BufferId, GpuBackend, ProgramId, ShaderId, ShaderStage, VertexArrayId};
use super::surface::GlPlatform;
use crate::utils::error::{RenderError, Result};

/// Text the fake compiler rejects.
pub const BAD_SOURCE: &str = "this is not glsl";

#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    UseProgram(Option<u32>),
    Uniform1f(String, f32),
    Uniform2f(String, f32, f32),
    Viewport(i32, i32, i32, i32),
    ClearColor([f32; 4]),
    ClearDepth(f64),
    Clear(u32),
    BindVertexArray(Option<u32>),
    DrawArrays(u32, i32, i32),
    Other(&'static str),
}

#[derive(Debug)]
pub struct FakeShader {
    pub source: String,
    pub compiled: bool,
}

#[derive(Debug, Default)]
pub struct FakeProgram {
    pub attached: Vec<u32>,
    pub linked: bool,
}

#[derive(Debug)]
pub struct FakeGlState {
    next_id: u32,
    pub shaders: HashMap<u32, FakeShader>,
    pub programs: HashMap<u32, FakeProgram>,
    pub buffers: HashSet<u32>,
    pub vertex_arrays: HashSet<u32>,
    pub shaders_created: usize,
    pub programs_created: usize,
    pub calls: Vec<GlCall>,
    pub viewport: Option<(i32, i32, i32, i32)>,
    pub uploaded: Vec<f32>,
    pub attributes: Vec<(u32, i32)>,
    pub depth_func: u32,
    pub compile_log: String,
    pub presents_seen: usize,
    pub fail_shader_allocation: bool,
    pub fail_program_allocation: bool,
    pub fail_buffer_allocation: bool,
}

impl Default for FakeGlState {
    fn default() -> Self {
        Self {
            next_id: 0,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashSet::new(),
            vertex_arrays: HashSet::new(),
            shaders_created: 0,
            programs_created: 0,
            calls: Vec::new(),
            viewport: None,
            uploaded: Vec::new(),
            attributes: Vec::new(),
            depth_func: glow::LESS,
            compile_log: String::new(),
            presents_seen: 0,
            fail_shader_allocation: false,
            fail_program_allocation: false,
            fail_buffer_allocation: false,
        }
    }
}

impl FakeGlState {
    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len() + self.vertex_arrays.len()
    }

    fn next_id(&mut self) -> NonZeroU32 {
        self.next_id += 1;
        NonZeroU32::new(self.next_id).unwrap()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeGl {
    state: Rc<RefCell<FakeGlState>>,
}

impl FakeGl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Ref<'_, FakeGlState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, FakeGlState> {
        self.state.borrow_mut()
    }

    fn record(&self, call: GlCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl GpuBackend for FakeGl {
    fn create_shader(&self, _stage: ShaderStage) -> std::result::Result<ShaderId, String> {
        self.record(GlCall::Other("create_shader"));
        let mut state = self.state_mut();
        if state.fail_shader_allocation {
            return Err("out of memory".into());
        }
        let id = state.next_id();
        state.shaders.insert(
            id.get(),
            FakeShader {
                source: String::new(),
                compiled: false,
            },
        );
        state.shaders_created += 1;
        Ok(ShaderId(id))
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        self.record(GlCall::Other("shader_source"));
        if let Some(s) = self.state_mut().shaders.get_mut(&shader.0.get()) {
            s.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: ShaderId) {
        self.record(GlCall::Other("compile_shader"));
        if let Some(s) = self.state_mut().shaders.get_mut(&shader.0.get()) {
            s.compiled = !s.source.contains(BAD_SOURCE);
        }
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        self.state()
            .shaders
            .get(&shader.0.get())
            .map(|s| s.compiled)
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        let state = self.state();
        match state.shaders.get(&shader.0.get()) {
            Some(s) if !s.compiled && !state.compile_log.is_empty() => state.compile_log.clone(),
            Some(s) if !s.compiled => "0:1(1): error: syntax error, unexpected IDENTIFIER\n".into(),
            _ => String::new(),
        }
    }

    fn delete_shader(&self, shader: ShaderId) {
        self.record(GlCall::Other("delete_shader"));
        self.state_mut().shaders.remove(&shader.0.get());
    }

    fn create_program(&self) -> std::result::Result<ProgramId, String> {
        self.record(GlCall::Other("create_program"));
        let mut state = self.state_mut();
        if state.fail_program_allocation {
            return Err("out of memory".into());
        }
        let id = state.next_id();
        state.programs.insert(id.get(), FakeProgram::default());
        state.programs_created += 1;
        Ok(ProgramId(id))
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        self.record(GlCall::Other("attach_shader"));
        if let Some(p) = self.state_mut().programs.get_mut(&program.0.get()) {
            p.attached.push(shader.0.get());
        }
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        self.record(GlCall::Other("detach_shader"));
        if let Some(p) = self.state_mut().programs.get_mut(&program.0.get()) {
            p.attached.retain(|s| *s != shader.0.get());
        }
    }

    fn link_program(&self, program: ProgramId) {
        self.record(GlCall::Other("link_program"));
        let mut state = self.state_mut();
        let all_compiled = state
            .programs
            .get(&program.0.get())
            .map(|p| {
                p.attached
                    .iter()
                    .all(|s| state.shaders.get(s).map(|s| s.compiled).unwrap_or(false))
            })
            .unwrap_or(false);
        if let Some(p) = state.programs.get_mut(&program.0.get()) {
            p.linked = all_compiled;
        }
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        self.state()
            .programs
            .get(&program.0.get())
            .map(|p| p.linked)
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        if self.program_link_status(program) {
            String::new()
        } else {
            "error: linking with uncompiled/unspecialized shader".into()
        }
    }

    fn delete_program(&self, program: ProgramId) {
        self.record(GlCall::Other("delete_program"));
        self.state_mut().programs.remove(&program.0.get());
    }

    fn use_program(&self, program: Option<ProgramId>) {
        self.record(GlCall::UseProgram(program.map(|p| p.0.get())));
    }

    fn set_uniform_1f(&self, _program: ProgramId, name: &str, value: f32) {
        self.record(GlCall::Uniform1f(name.to_string(), value));
    }

    fn set_uniform_2f(&self, _program: ProgramId, name: &str, x: f32, y: f32) {
        self.record(GlCall::Uniform2f(name.to_string(), x, y));
    }

    fn create_vertex_array(&self) -> std::result::Result<VertexArrayId, String> {
        self.record(GlCall::Other("create_vertex_array"));
        let mut state = self.state_mut();
        let id = state.next_id();
        state.vertex_arrays.insert(id.get());
        Ok(VertexArrayId(id))
    }

    fn bind_vertex_array(&self, vao: Option<VertexArrayId>) {
        self.record(GlCall::BindVertexArray(vao.map(|v| v.0.get())));
    }

    fn delete_vertex_array(&self, vao: VertexArrayId) {
        self.record(GlCall::Other("delete_vertex_array"));
        self.state_mut().vertex_arrays.remove(&vao.0.get());
    }

    fn create_buffer(&self) -> std::result::Result<BufferId, String> {
        self.record(GlCall::Other("create_buffer"));
        let mut state = self.state_mut();
        if state.fail_buffer_allocation {
            return Err("out of memory".into());
        }
        let id = state.next_id();
        state.buffers.insert(id.get());
        Ok(BufferId(id))
    }

    fn upload_array_buffer(&self, _buffer: BufferId, data: &[f32]) {
        self.record(GlCall::Other("upload_array_buffer"));
        self.state_mut().uploaded = data.to_vec();
    }

    fn delete_buffer(&self, buffer: BufferId) {
        self.record(GlCall::Other("delete_buffer"));
        self.state_mut().buffers.remove(&buffer.0.get());
    }

    fn vertex_attrib_f32(&self, index: u32, components: i32) {
        self.record(GlCall::Other("vertex_attrib_f32"));
        self.state_mut().attributes.push((index, components));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport(x, y, width, height));
        self.state_mut().viewport = Some((x, y, width, height));
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(GlCall::ClearColor([r, g, b, a]));
    }

    fn clear_depth(&self, depth: f64) {
        self.record(GlCall::ClearDepth(depth));
    }

    fn depth_func(&self) -> u32 {
        self.state().depth_func
    }

    fn clear(&self, mask: u32) {
        self.record(GlCall::Clear(mask));
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        self.record(GlCall::DrawArrays(mode, first, count));
    }

    fn driver_info(&self) -> String {
        "Fake GL 3.3".into()
    }
}

/// Window platform whose visibility, scale and loader outcome tests control.
#[derive(Debug, Default)]
pub struct FakePlatform {
    pub gl: FakeGl,
    pub shown: Cell<bool>,
    pub scale: Cell<f64>,
    pub fail_load: Cell<bool>,
    pub fail_make_current: Cell<bool>,
    pub loads: Cell<usize>,
    pub presents: Cell<usize>,
    pub redraws: Cell<usize>,
}

impl FakePlatform {
    pub fn hidden() -> Self {
        let platform = Self::default();
        platform.scale.set(1.0);
        platform
    }

    pub fn shown() -> Self {
        let platform = Self::hidden();
        platform.shown.set(true);
        platform
    }
}

impl GlPlatform for FakePlatform {
    type Backend = FakeGl;

    fn make_current(&self) -> Result<()> {
        if self.fail_make_current.get() {
            return Err(RenderError::Context("context lost".into()));
        }
        Ok(())
    }

    fn load_functions(&self) -> Result<FakeGl> {
        self.loads.set(self.loads.get() + 1);
        if self.fail_load.get() {
            return Err(RenderError::MissingFunctions(vec!["glCreateShader".into()]));
        }
        Ok(self.gl.clone())
    }

    fn present(&self) -> Result<()> {
        self.presents.set(self.presents.get() + 1);
        self.gl.state_mut().presents_seen += 1;
        Ok(())
    }

    fn request_redraw(&self) {
        self.redraws.set(self.redraws.get() + 1);
    }

    fn is_shown_on_screen(&self) -> bool {
        self.shown.get()
    }

    fn content_scale_factor(&self) -> f64 {
        self.scale.get()
    }
}
