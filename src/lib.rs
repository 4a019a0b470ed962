//! Real-time Lambert shading of a single static mesh in a WebGL2 canvas.
//!
//! Normals are computed once from the raw triangle list, uploaded alongside
//! the positions, and every animation frame redraws the mesh with the light
//! direction the arrow keys steer.

mod camera;
mod config;
mod context;
mod device;
mod error;
mod input;
mod logging;
mod mesh;
mod normals;
mod render_loop;
mod scene;
mod shader;
mod web;
mod webgl;

#[cfg(test)]
mod testing;

pub use camera::{
    MATRIX_FLOATS, Matrix4, identity_matrix, invert, multiply, perspective_matrix, translate,
    transpose,
};
pub use config::ViewerConfig;
pub use context::{
    AttributeLayout, BufferData, BufferHandle, GpuMesh, GraphicsContext, ProgramHandle,
    ShaderHandle, UniformHandle, VertexArrayBinding, VertexArrayHandle,
};
pub use device::{BufferTarget, GraphicsDevice, ShaderStage};
pub use error::{MeshError, RenderError};
pub use input::Key;
pub use logging::{LoggingConfig, init_logging};
pub use mesh::Mesh;
pub use normals::{FALLBACK_NORMAL, NormalSet, compute_normals};
pub use render_loop::{FrameOutcome, LoopState, RenderLoop, Surface};
pub use scene::{LightState, SceneState, Transforms};
pub use shader::{
    LAMBERT_FRAGMENT_SOURCE, LAMBERT_VERTEX_SOURCE, ShaderProgram, ShaderSources, Uniforms,
};
pub use web::{Viewer, start_demo};
pub use webgl::WebGl2Device;

use wasm_bindgen::prelude::*;

/// Computes per-vertex normals for JavaScript callers.
#[wasm_bindgen(js_name = computeNormals)]
pub fn compute_normals_js(
    vertices: &js_sys::Float32Array,
    indices: &js_sys::Uint16Array,
) -> Result<js_sys::Float32Array, JsValue> {
    let normals = compute_normals(&vertices.to_vec(), &indices.to_vec()).map_err(RenderError::from)?;
    Ok(js_sys::Float32Array::from(normals.as_slice()))
}
