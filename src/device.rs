//! The slice of the graphics API the pipeline talks to.
//!
//! Method names follow the underlying WebGL2 calls closely so the
//! bind/upload/unbind sequencing in [`crate::context`] reads the same as it
//! would against the raw context. Every method takes `&self`: the device is
//! global, implicitly bound state and the implementations mutate it through
//! shared references just like `web_sys::WebGl2RenderingContext` does.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data.
    Array,
    /// Triangle indices.
    ElementArray,
}

pub trait GraphicsDevice {
    type Shader;
    type Program;
    type Buffer;
    type VertexArray;
    type UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Option<Self::Shader>;
    /// Sets the source text and compiles it.
    fn compile_shader(&self, shader: &Self::Shader, source: &str);
    fn shader_compiled(&self, shader: &Self::Shader) -> bool;
    fn shader_info_log(&self, shader: &Self::Shader) -> Option<String>;
    fn delete_shader(&self, shader: &Self::Shader);

    fn create_program(&self) -> Option<Self::Program>;
    fn attach_shader(&self, program: &Self::Program, shader: &Self::Shader);
    fn link_program(&self, program: &Self::Program);
    fn program_linked(&self, program: &Self::Program) -> bool;
    fn program_info_log(&self, program: &Self::Program) -> Option<String>;
    fn use_program(&self, program: Option<&Self::Program>);
    fn delete_program(&self, program: &Self::Program);
    fn attrib_location(&self, program: &Self::Program, name: &str) -> Option<u32>;
    fn uniform_location(&self, program: &Self::Program, name: &str)
    -> Option<Self::UniformLocation>;

    fn create_buffer(&self) -> Option<Self::Buffer>;
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<&Self::Buffer>);
    /// Static-usage upload into the buffer currently bound to `target`.
    fn buffer_data_f32(&self, target: BufferTarget, data: &[f32]);
    fn buffer_data_u16(&self, target: BufferTarget, data: &[u16]);
    fn delete_buffer(&self, buffer: &Self::Buffer);

    fn create_vertex_array(&self) -> Option<Self::VertexArray>;
    fn bind_vertex_array(&self, vao: Option<&Self::VertexArray>);
    fn delete_vertex_array(&self, vao: &Self::VertexArray);
    /// Enables `location` and points it at tightly packed floats in the bound
    /// array buffer.
    fn enable_vertex_attribute(&self, location: u32, components: i32);

    fn set_clear_color(&self, color: [f32; 4]);
    fn enable_depth_test(&self);
    /// Clears both the color and depth buffers.
    fn clear(&self);
    fn viewport(&self, width: i32, height: i32);

    fn uniform_matrix4(&self, location: &Self::UniformLocation, value: &[f32; 16]);
    fn uniform_vec3(&self, location: &Self::UniformLocation, value: &[f32; 3]);
    fn uniform_vec4(&self, location: &Self::UniformLocation, value: &[f32; 4]);

    /// Indexed triangle-list draw of `index_count` u16 indices from the bound
    /// vertex array.
    fn draw_triangles(&self, index_count: i32);
    /// Pops the oldest pending device error, if any.
    fn take_error(&self) -> Option<u32>;
    fn is_context_lost(&self) -> bool;
}
