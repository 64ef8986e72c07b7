use super::backend::{BufferId, GpuBackend, VertexArrayId};
use crate::utils::error::{RenderError, Result};

/// Full-screen quad as a 4-vertex triangle strip, xyz per vertex.
pub const QUAD_VERTICES: [f32; 12] = [
    -1.0, -1.0, 0.0, // bottom-left
    1.0, -1.0, 0.0, // bottom-right
    -1.0, 1.0, 0.0, // top-left
    1.0, 1.0, 0.0, // top-right
];

pub const QUAD_VERTEX_COUNT: i32 = 4;

/// Static GPU buffers for the quad. Created once per context.
#[derive(Debug)]
pub struct Quad {
    vao: VertexArrayId,
    vbo: BufferId,
}

impl Quad {
    pub fn new<B: GpuBackend>(gl: &B) -> Result<Self> {
        let vao = gl.create_vertex_array().map_err(RenderError::Allocation)?;
        let vbo = match gl.create_buffer() {
            Ok(vbo) => vbo,
            Err(e) => {
                gl.delete_vertex_array(vao);
                return Err(RenderError::Allocation(e));
            }
        };

        gl.bind_vertex_array(Some(vao));
        gl.upload_array_buffer(vbo, &QUAD_VERTICES);
        gl.vertex_attrib_f32(0, 3);

        Ok(Self { vao, vbo })
    }

    pub fn draw<B: GpuBackend>(&self, gl: &B) {
        gl.bind_vertex_array(Some(self.vao));
        gl.draw_arrays(glow::TRIANGLE_STRIP, 0, QUAD_VERTEX_COUNT);
    }

    pub fn release<B: GpuBackend>(self, gl: &B) {
        gl.delete_buffer(self.vbo);
        gl.delete_vertex_array(self.vao);
    }
}
