use js_sys::{Float32Array, Uint16Array};
use web_sys::{
    WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlShader, WebGlUniformLocation,
    WebGlVertexArrayObject,
};

use crate::device::{BufferTarget, GraphicsDevice, ShaderStage};

/// [`GraphicsDevice`] backed by a browser WebGL2 context.
#[derive(Clone)]
pub struct WebGl2Device {
    gl: Gl,
}

impl WebGl2Device {
    pub fn new(gl: Gl) -> Self {
        Self { gl }
    }
}

fn stage_enum(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => Gl::VERTEX_SHADER,
        ShaderStage::Fragment => Gl::FRAGMENT_SHADER,
    }
}

fn target_enum(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => Gl::ARRAY_BUFFER,
        BufferTarget::ElementArray => Gl::ELEMENT_ARRAY_BUFFER,
    }
}

impl GraphicsDevice for WebGl2Device {
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type Buffer = WebGlBuffer;
    type VertexArray = WebGlVertexArrayObject;
    type UniformLocation = WebGlUniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Option<WebGlShader> {
        self.gl.create_shader(stage_enum(stage))
    }

    fn compile_shader(&self, shader: &WebGlShader, source: &str) {
        self.gl.shader_source(shader, source);
        self.gl.compile_shader(shader);
    }

    fn shader_compiled(&self, shader: &WebGlShader) -> bool {
        self.gl
            .get_shader_parameter(shader, Gl::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: &WebGlShader) -> Option<String> {
        self.gl.get_shader_info_log(shader)
    }

    fn delete_shader(&self, shader: &WebGlShader) {
        self.gl.delete_shader(Some(shader));
    }

    fn create_program(&self) -> Option<WebGlProgram> {
        self.gl.create_program()
    }

    fn attach_shader(&self, program: &WebGlProgram, shader: &WebGlShader) {
        self.gl.attach_shader(program, shader);
    }

    fn link_program(&self, program: &WebGlProgram) {
        self.gl.link_program(program);
    }

    fn program_linked(&self, program: &WebGlProgram) -> bool {
        self.gl
            .get_program_parameter(program, Gl::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: &WebGlProgram) -> Option<String> {
        self.gl.get_program_info_log(program)
    }

    fn use_program(&self, program: Option<&WebGlProgram>) {
        self.gl.use_program(program);
    }

    fn delete_program(&self, program: &WebGlProgram) {
        self.gl.delete_program(Some(program));
    }

    fn attrib_location(&self, program: &WebGlProgram, name: &str) -> Option<u32> {
        // -1 when the attribute is absent or optimized away
        self.gl.get_attrib_location(program, name).try_into().ok()
    }

    fn uniform_location(&self, program: &WebGlProgram, name: &str) -> Option<WebGlUniformLocation> {
        self.gl.get_uniform_location(program, name)
    }

    fn create_buffer(&self) -> Option<WebGlBuffer> {
        self.gl.create_buffer()
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<&WebGlBuffer>) {
        self.gl.bind_buffer(target_enum(target), buffer);
    }

    fn buffer_data_f32(&self, target: BufferTarget, data: &[f32]) {
        // The view must not outlive `data` and nothing may allocate in wasm
        // memory while it is alive.
        let view = unsafe { Float32Array::view(data) };
        self.gl
            .buffer_data_with_array_buffer_view(target_enum(target), &view, Gl::STATIC_DRAW);
    }

    fn buffer_data_u16(&self, target: BufferTarget, data: &[u16]) {
        let view = unsafe { Uint16Array::view(data) };
        self.gl
            .buffer_data_with_array_buffer_view(target_enum(target), &view, Gl::STATIC_DRAW);
    }

    fn delete_buffer(&self, buffer: &WebGlBuffer) {
        self.gl.delete_buffer(Some(buffer));
    }

    fn create_vertex_array(&self) -> Option<WebGlVertexArrayObject> {
        self.gl.create_vertex_array()
    }

    fn bind_vertex_array(&self, vao: Option<&WebGlVertexArrayObject>) {
        self.gl.bind_vertex_array(vao);
    }

    fn delete_vertex_array(&self, vao: &WebGlVertexArrayObject) {
        self.gl.delete_vertex_array(Some(vao));
    }

    fn enable_vertex_attribute(&self, location: u32, components: i32) {
        self.gl.enable_vertex_attrib_array(location);
        self.gl
            .vertex_attrib_pointer_with_i32(location, components, Gl::FLOAT, false, 0, 0);
    }

    fn set_clear_color(&self, color: [f32; 4]) {
        self.gl.clear_color(color[0], color[1], color[2], color[3]);
    }

    fn enable_depth_test(&self) {
        self.gl.enable(Gl::DEPTH_TEST);
        self.gl.depth_func(Gl::LEQUAL);
    }

    fn clear(&self) {
        self.gl.clear_depth(1.0);
        self.gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
    }

    fn viewport(&self, width: i32, height: i32) {
        self.gl.viewport(0, 0, width, height);
    }

    fn uniform_matrix4(&self, location: &WebGlUniformLocation, value: &[f32; 16]) {
        self.gl
            .uniform_matrix4fv_with_f32_array(Some(location), false, value);
    }

    fn uniform_vec3(&self, location: &WebGlUniformLocation, value: &[f32; 3]) {
        self.gl.uniform3fv_with_f32_array(Some(location), value);
    }

    fn uniform_vec4(&self, location: &WebGlUniformLocation, value: &[f32; 4]) {
        self.gl.uniform4fv_with_f32_array(Some(location), value);
    }

    fn draw_triangles(&self, index_count: i32) {
        self.gl
            .draw_elements_with_i32(Gl::TRIANGLES, index_count, Gl::UNSIGNED_SHORT, 0);
    }

    fn take_error(&self) -> Option<u32> {
        match self.gl.get_error() {
            Gl::NO_ERROR => None,
            code => Some(code),
        }
    }

    fn is_context_lost(&self) -> bool {
        self.gl.is_context_lost()
    }
}
