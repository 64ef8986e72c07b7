// shaders.rs - Shader program build pipeline and the fragment harness

use std::borrow::Cow;

use log::{debug, warn};

use super::backend::{GpuBackend, ProgramId, ShaderId, ShaderStage};

/// Native info logs are cut to this many characters unless configured otherwise.
pub const DEFAULT_DIAGNOSTIC_LIMIT: usize = 512;

/// Fixed shader sources and the wrapper that turns an editor body into a
/// complete fragment program.
pub mod harness {
    use std::borrow::Cow;

    pub const GLSL_VERSION: &str = "#version 330 core";

    /// Pass-through vertex stage for the full-screen quad.
    pub const VERTEX_SRC: &str = r#"#version 330 core

layout(location = 0) in vec3 inPosition;

void main()
{
    gl_Position = vec4(inPosition, 1.0);
}
"#;

    /// Uniforms, output and entry point wrapped around a `mainImage` body.
    pub const FRAGMENT_PRELUDE: &str = r#"
uniform vec2 iResolution;
uniform float iTime;

out vec4 FragColor;

void mainImage( out vec4 fragColor, in vec2 fragCoord );

void main()
{
    mainImage(FragColor, gl_FragCoord.xy);
}
"#;

    /// Body preloaded into the editor: an animated colour gradient.
    pub const DEFAULT_FRAGMENT_BODY: &str = r#"void mainImage( out vec4 fragColor, in vec2 fragCoord )
{
    // Normalized pixel coordinates (from 0 to 1)
    vec2 uv = fragCoord/iResolution.xy;

    // Time varying pixel color
    vec3 col = 0.5 + 0.5*cos(iTime+uv.xyx+vec3(0,2,4));

    // Output to screen
    fragColor = vec4(col,1.0);
}
"#;

    /// Text carrying its own `#version` directive is a complete program.
    pub fn is_complete_program(text: &str) -> bool {
        text.lines()
            .any(|line| line.trim_start().starts_with("#version"))
    }

    /// Complete programs pass through untouched. Bodies get the prelude
    /// and a `#line 1` so compiler line numbers match the editor.
    pub fn assemble(text: &str) -> Cow<'_, str> {
        if is_complete_program(text) {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(format!("{GLSL_VERSION}\n{FRAGMENT_PRELUDE}\n#line 1\n{text}"))
        }
    }
}

/// Result of one build attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// Both stages compiled and the program linked; it is now installed.
    Linked,
    /// Something failed; see the build log. The previous program stays installed.
    Failed,
    /// No usable GL context. The source is kept for a later build.
    Deferred,
}

/// One vertex + fragment program and the diagnostics of its last build.
///
/// The installed program is only replaced by a build that compiled and
/// linked cleanly. A failed rebuild leaves the last good program in place.
#[derive(Debug)]
pub struct ShaderProgram {
    vertex_source: String,
    fragment_source: String,
    program: Option<ProgramId>,
    build_log: String,
    diagnostic_limit: usize,
}

impl ShaderProgram {
    pub fn new(vertex_source: impl Into<String>) -> Self {
        Self {
            vertex_source: vertex_source.into(),
            fragment_source: String::new(),
            program: None,
            build_log: String::new(),
            diagnostic_limit: DEFAULT_DIAGNOSTIC_LIMIT,
        }
    }

    /// Program with the fixed quad vertex stage.
    pub fn with_default_vertex() -> Self {
        Self::new(harness::VERTEX_SRC)
    }

    pub fn with_diagnostic_limit(mut self, limit: usize) -> Self {
        self.diagnostic_limit = limit.max(1);
        self
    }

    pub fn handle(&self) -> Option<ProgramId> {
        self.program
    }

    pub fn build_log(&self) -> &str {
        &self.build_log
    }

    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }

    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }

    /// Records the fragment source without building it.
    pub fn set_fragment_source(&mut self, source: &str) {
        self.fragment_source.clear();
        self.fragment_source.push_str(source);
    }

    /// Compiles both stages and links them.
    ///
    /// A stage that fails to compile does not stop the link attempt, so a
    /// single pass reports every diagnostic the driver produces. Transient
    /// shader objects are always released before returning.
    pub fn build<B: GpuBackend>(&mut self, gl: &B, fragment_source: &str) -> BuildStatus {
        self.set_fragment_source(fragment_source);
        self.build_log.clear();

        let fragment_text = harness::assemble(&self.fragment_source);
        let limit = self.diagnostic_limit;

        let vertex = compile_stage(gl, ShaderStage::Vertex, &self.vertex_source, limit, &mut self.build_log);
        let fragment = compile_stage(gl, ShaderStage::Fragment, &fragment_text, limit, &mut self.build_log);

        let status = match (vertex, fragment) {
            (Some(vertex), Some(fragment)) => {
                let compiled = vertex.compiled && fragment.compiled;
                let status = self.link(gl, vertex.id, fragment.id, compiled);
                gl.delete_shader(vertex.id);
                gl.delete_shader(fragment.id);
                status
            }
            (vertex, fragment) => {
                for stage in [vertex, fragment].into_iter().flatten() {
                    gl.delete_shader(stage.id);
                }
                BuildStatus::Failed
            }
        };

        match status {
            BuildStatus::Linked => debug!("Shader program linked"),
            _ => warn!(
                "Shader build failed: {}",
                self.build_log.lines().next().unwrap_or_default()
            ),
        }
        status
    }

    fn link<B: GpuBackend>(
        &mut self,
        gl: &B,
        vertex: ShaderId,
        fragment: ShaderId,
        compiled: bool,
    ) -> BuildStatus {
        let program = match gl.create_program() {
            Ok(program) => program,
            Err(e) => {
                self.append(&format!("Unable to allocate shader program: {e}"));
                return BuildStatus::Failed;
            }
        };

        gl.attach_shader(program, vertex);
        gl.attach_shader(program, fragment);
        gl.link_program(program);

        if !gl.program_link_status(program) {
            let info = gl.program_info_log(program);
            let message = format!(
                "Shader program linking failed: {}",
                driver_message(&info, self.diagnostic_limit)
            );
            self.append(&message);
            gl.delete_program(program);
            return BuildStatus::Failed;
        }

        if !compiled {
            // Some drivers link around a failed stage; never install that.
            gl.delete_program(program);
            return BuildStatus::Failed;
        }

        gl.detach_shader(program, vertex);
        gl.detach_shader(program, fragment);
        if let Some(previous) = self.program.replace(program) {
            gl.delete_program(previous);
        }
        BuildStatus::Linked
    }

    /// Deletes the installed program. The context must be current.
    pub fn release<B: GpuBackend>(&mut self, gl: &B) {
        if let Some(program) = self.program.take() {
            gl.delete_program(program);
        }
    }

    fn append(&mut self, message: &str) {
        self.build_log.push_str(message);
        self.build_log.push('\n');
    }
}

struct CompiledStage {
    id: ShaderId,
    compiled: bool,
}

fn compile_stage<B: GpuBackend>(
    gl: &B,
    stage: ShaderStage,
    source: &str,
    limit: usize,
    log: &mut String,
) -> Option<CompiledStage> {
    let shader = match gl.create_shader(stage) {
        Ok(shader) => shader,
        Err(e) => {
            log.push_str(&format!("Unable to allocate {} shader: {e}\n", stage.label().to_lowercase()));
            return None;
        }
    };

    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    let compiled = gl.shader_compile_status(shader);
    if !compiled {
        let info = gl.shader_info_log(shader);
        log.push_str(&format!(
            "{} shader compilation failed: {}\n",
            stage.label(),
            driver_message(&info, limit)
        ));
    }

    Some(CompiledStage { id: shader, compiled })
}

/// Trims trailing whitespace and NULs and cuts the text to `limit` characters.
fn driver_message(info: &str, limit: usize) -> Cow<'_, str> {
    let trimmed = info.trim_end_matches(|c: char| c == '\0' || c.is_whitespace());
    if trimmed.is_empty() {
        return Cow::Borrowed("(no message from driver)");
    }
    match trimmed.char_indices().nth(limit) {
        Some((end, _)) => Cow::Borrowed(&trimmed[..end]),
        None => Cow::Borrowed(trimmed),
    }
}
