//! The slice of OpenGL the playground talks to.
//!
//! Everything above this module goes through [`GpuBackend`], so the shader
//! pipeline and the surface state machine never touch raw GL and can be
//! exercised without a driver. [`GlowBackend`] is the real implementation
//! on top of `glow`.

use std::ffi::{c_void, CStr, CString};
use std::num::NonZeroU32;
use std::sync::Arc;

use glow::HasContext;
use log::debug;

use crate::utils::error::{RenderError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub NonZeroU32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub NonZeroU32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub NonZeroU32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayId(pub NonZeroU32);

/// Programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_enum(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Vertex => "Vertex",
            Self::Fragment => "Fragment",
        }
    }
}

/// GL calls issued by the shader pipeline and the render surface.
///
/// Object creation returns the driver's message on failure; status queries
/// and info logs are returned as plain values.
pub trait GpuBackend {
    fn create_shader(&self, stage: ShaderStage) -> std::result::Result<ShaderId, String>;
    fn shader_source(&self, shader: ShaderId, source: &str);
    fn compile_shader(&self, shader: ShaderId);
    fn shader_compile_status(&self, shader: ShaderId) -> bool;
    fn shader_info_log(&self, shader: ShaderId) -> String;
    fn delete_shader(&self, shader: ShaderId);

    fn create_program(&self) -> std::result::Result<ProgramId, String>;
    fn attach_shader(&self, program: ProgramId, shader: ShaderId);
    fn detach_shader(&self, program: ProgramId, shader: ShaderId);
    fn link_program(&self, program: ProgramId);
    fn program_link_status(&self, program: ProgramId) -> bool;
    fn program_info_log(&self, program: ProgramId) -> String;
    fn delete_program(&self, program: ProgramId);
    fn use_program(&self, program: Option<ProgramId>);

    /// Silently skipped when the uniform is absent or optimised out.
    fn set_uniform_1f(&self, program: ProgramId, name: &str, value: f32);
    fn set_uniform_2f(&self, program: ProgramId, name: &str, x: f32, y: f32);

    fn create_vertex_array(&self) -> std::result::Result<VertexArrayId, String>;
    fn bind_vertex_array(&self, vao: Option<VertexArrayId>);
    fn delete_vertex_array(&self, vao: VertexArrayId);
    fn create_buffer(&self) -> std::result::Result<BufferId, String>;
    /// Binds `buffer` as the array buffer and uploads `data` as static draw.
    fn upload_array_buffer(&self, buffer: BufferId, data: &[f32]);
    fn delete_buffer(&self, buffer: BufferId);
    /// Float attribute with `components` values per vertex, tightly packed.
    fn vertex_attrib_f32(&self, index: u32, components: i32);

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear_depth(&self, depth: f64);
    /// Current `GL_DEPTH_FUNC`.
    fn depth_func(&self) -> u32;
    fn clear(&self, mask: u32);
    fn draw_arrays(&self, mode: u32, first: i32, count: i32);

    fn driver_info(&self) -> String;
}

/// Entry points the playground cannot run without.
pub const REQUIRED_FUNCTIONS: &[&str] = &[
    "glCreateShader",
    "glShaderSource",
    "glCompileShader",
    "glGetShaderiv",
    "glGetShaderInfoLog",
    "glDeleteShader",
    "glCreateProgram",
    "glAttachShader",
    "glDetachShader",
    "glLinkProgram",
    "glGetProgramiv",
    "glGetProgramInfoLog",
    "glDeleteProgram",
    "glUseProgram",
    "glGetUniformLocation",
    "glUniform1f",
    "glUniform2f",
    "glGenVertexArrays",
    "glBindVertexArray",
    "glDeleteVertexArrays",
    "glGenBuffers",
    "glBindBuffer",
    "glBufferData",
    "glDeleteBuffers",
    "glVertexAttribPointer",
    "glEnableVertexAttribArray",
    "glViewport",
    "glClear",
    "glClearColor",
    "glClearDepth",
    "glGetIntegerv",
    "glDrawArrays",
];

/// Resolves the GL function pointer table through a platform loader.
pub struct FunctionTable;

impl FunctionTable {
    /// Names from [`REQUIRED_FUNCTIONS`] the loader returns null for.
    pub fn missing<F>(mut loader: F) -> Vec<String>
    where
        F: FnMut(&CStr) -> *const c_void,
    {
        REQUIRED_FUNCTIONS
            .iter()
            .filter(|name| match CString::new(**name) {
                Ok(symbol) => loader(symbol.as_c_str()).is_null(),
                Err(_) => true,
            })
            .map(|name| name.to_string())
            .collect()
    }

    /// Checks every required entry point, then builds a `glow` context from
    /// the same loader. The GL context must be current on this thread.
    pub fn resolve<F>(mut loader: F) -> Result<glow::Context>
    where
        F: FnMut(&CStr) -> *const c_void,
    {
        let missing = Self::missing(&mut loader);
        if !missing.is_empty() {
            return Err(RenderError::MissingFunctions(missing));
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|name| match CString::new(name) {
                Ok(symbol) => loader(symbol.as_c_str()),
                Err(_) => std::ptr::null(),
            })
        };
        debug!("Resolved {} required GL entry points", REQUIRED_FUNCTIONS.len());
        Ok(gl)
    }
}

/// [`GpuBackend`] over a native `glow` context.
#[derive(Clone)]
pub struct GlowBackend {
    gl: Arc<glow::Context>,
}

impl GlowBackend {
    pub fn new(gl: glow::Context) -> Self {
        Self { gl: Arc::new(gl) }
    }

    /// Shared handle for other GL users on the same context (the UI painter).
    pub fn context(&self) -> &Arc<glow::Context> {
        &self.gl
    }
}

impl GpuBackend for GlowBackend {
    fn create_shader(&self, stage: ShaderStage) -> std::result::Result<ShaderId, String> {
        unsafe { self.gl.create_shader(stage.gl_enum()) }.map(|s| ShaderId(s.0))
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        unsafe { self.gl.shader_source(glow::NativeShader(shader.0), source) }
    }

    fn compile_shader(&self, shader: ShaderId) {
        unsafe { self.gl.compile_shader(glow::NativeShader(shader.0)) }
    }

    fn shader_compile_status(&self, shader: ShaderId) -> bool {
        unsafe { self.gl.get_shader_compile_status(glow::NativeShader(shader.0)) }
    }

    fn shader_info_log(&self, shader: ShaderId) -> String {
        unsafe { self.gl.get_shader_info_log(glow::NativeShader(shader.0)) }
    }

    fn delete_shader(&self, shader: ShaderId) {
        unsafe { self.gl.delete_shader(glow::NativeShader(shader.0)) }
    }

    fn create_program(&self) -> std::result::Result<ProgramId, String> {
        unsafe { self.gl.create_program() }.map(|p| ProgramId(p.0))
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe {
            self.gl
                .attach_shader(glow::NativeProgram(program.0), glow::NativeShader(shader.0))
        }
    }

    fn detach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe {
            self.gl
                .detach_shader(glow::NativeProgram(program.0), glow::NativeShader(shader.0))
        }
    }

    fn link_program(&self, program: ProgramId) {
        unsafe { self.gl.link_program(glow::NativeProgram(program.0)) }
    }

    fn program_link_status(&self, program: ProgramId) -> bool {
        unsafe { self.gl.get_program_link_status(glow::NativeProgram(program.0)) }
    }

    fn program_info_log(&self, program: ProgramId) -> String {
        unsafe { self.gl.get_program_info_log(glow::NativeProgram(program.0)) }
    }

    fn delete_program(&self, program: ProgramId) {
        unsafe { self.gl.delete_program(glow::NativeProgram(program.0)) }
    }

    fn use_program(&self, program: Option<ProgramId>) {
        unsafe { self.gl.use_program(program.map(|p| glow::NativeProgram(p.0))) }
    }

    fn set_uniform_1f(&self, program: ProgramId, name: &str, value: f32) {
        unsafe {
            let location = self
                .gl
                .get_uniform_location(glow::NativeProgram(program.0), name);
            if let Some(location) = location {
                self.gl.uniform_1_f32(Some(&location), value);
            }
        }
    }

    fn set_uniform_2f(&self, program: ProgramId, name: &str, x: f32, y: f32) {
        unsafe {
            let location = self
                .gl
                .get_uniform_location(glow::NativeProgram(program.0), name);
            if let Some(location) = location {
                self.gl.uniform_2_f32(Some(&location), x, y);
            }
        }
    }

    fn create_vertex_array(&self) -> std::result::Result<VertexArrayId, String> {
        unsafe { self.gl.create_vertex_array() }.map(|v| VertexArrayId(v.0))
    }

    fn bind_vertex_array(&self, vao: Option<VertexArrayId>) {
        unsafe {
            self.gl
                .bind_vertex_array(vao.map(|v| glow::NativeVertexArray(v.0)))
        }
    }

    fn delete_vertex_array(&self, vao: VertexArrayId) {
        unsafe { self.gl.delete_vertex_array(glow::NativeVertexArray(vao.0)) }
    }

    fn create_buffer(&self) -> std::result::Result<BufferId, String> {
        unsafe { self.gl.create_buffer() }.map(|b| BufferId(b.0))
    }

    fn upload_array_buffer(&self, buffer: BufferId, data: &[f32]) {
        unsafe {
            self.gl
                .bind_buffer(glow::ARRAY_BUFFER, Some(glow::NativeBuffer(buffer.0)));
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(data),
                glow::STATIC_DRAW,
            );
        }
    }

    fn delete_buffer(&self, buffer: BufferId) {
        unsafe { self.gl.delete_buffer(glow::NativeBuffer(buffer.0)) }
    }

    fn vertex_attrib_f32(&self, index: u32, components: i32) {
        let stride = components * std::mem::size_of::<f32>() as i32;
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, components, glow::FLOAT, false, stride, 0);
            self.gl.enable_vertex_attrib_array(index);
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { self.gl.clear_color(r, g, b, a) }
    }

    fn clear_depth(&self, depth: f64) {
        unsafe { self.gl.clear_depth_f64(depth) }
    }

    fn depth_func(&self) -> u32 {
        unsafe { self.gl.get_parameter_i32(glow::DEPTH_FUNC) as u32 }
    }

    fn clear(&self, mask: u32) {
        unsafe { self.gl.clear(mask) }
    }

    fn draw_arrays(&self, mode: u32, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(mode, first, count) }
    }

    fn driver_info(&self) -> String {
        unsafe {
            format!(
                "OpenGL {} ({} / {})",
                self.gl.get_parameter_string(glow::VERSION),
                self.gl.get_parameter_string(glow::VENDOR),
                self.gl.get_parameter_string(glow::RENDERER),
            )
        }
    }
}
