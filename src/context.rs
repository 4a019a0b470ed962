use crate::device::{BufferTarget, GraphicsDevice, ShaderStage};
use crate::error::{RenderError, Result};
use crate::mesh::{Mesh, NORMAL_COMPONENTS, POSITION_COMPONENTS};
use crate::normals::NormalSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexArrayHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformHandle(usize);

/// Data for a one-time static upload; the variant picks the bind target.
#[derive(Debug, Clone, Copy)]
pub enum BufferData<'a> {
    Attribute(&'a [f32]),
    Indices(&'a [u16]),
}

impl BufferData<'_> {
    fn target(&self) -> BufferTarget {
        match self {
            BufferData::Attribute(_) => BufferTarget::Array,
            BufferData::Indices(_) => BufferTarget::ElementArray,
        }
    }
}

/// Attribute locations a mesh upload wires its buffers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeLayout {
    pub position: u32,
    pub normal: u32,
}

/// Buffers and vertex array of an uploaded mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuMesh {
    pub vao: VertexArrayHandle,
    pub positions: BufferHandle,
    pub normals: BufferHandle,
    pub indices: BufferHandle,
    pub index_count: i32,
}

/// Owns the device and every object created through it.
///
/// Objects are addressed through copyable handles; [`GraphicsContext::release`]
/// deletes whatever is still alive and runs again on drop.
pub struct GraphicsContext<D: GraphicsDevice> {
    device: D,
    shaders: Vec<Option<D::Shader>>,
    programs: Vec<Option<D::Program>>,
    buffers: Vec<Option<D::Buffer>>,
    vertex_arrays: Vec<Option<D::VertexArray>>,
    uniforms: Vec<D::UniformLocation>,
}

impl<D: GraphicsDevice> GraphicsContext<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            shaders: Vec::new(),
            programs: Vec::new(),
            buffers: Vec::new(),
            vertex_arrays: Vec::new(),
            uniforms: Vec::new(),
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle> {
        let shader = self
            .device
            .create_shader(stage)
            .ok_or_else(|| RenderError::ShaderCompile {
                stage,
                log: "failed to create shader".into(),
            })?;
        self.device.compile_shader(&shader, source);

        if !self.device.shader_compiled(&shader) {
            let log = self
                .device
                .shader_info_log(&shader)
                .filter(|log| !log.trim().is_empty())
                .unwrap_or_else(|| "unknown shader error".into());
            self.device.delete_shader(&shader);
            return Err(RenderError::ShaderCompile { stage, log });
        }

        self.shaders.push(Some(shader));
        Ok(ShaderHandle(self.shaders.len() - 1))
    }

    pub fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramHandle> {
        let vert = live(&self.shaders, vertex.0, "shader")?;
        let frag = live(&self.shaders, fragment.0, "shader")?;
        let program = self
            .device
            .create_program()
            .ok_or_else(|| RenderError::Link("failed to create program".into()))?;
        self.device.attach_shader(&program, vert);
        self.device.attach_shader(&program, frag);
        self.device.link_program(&program);

        if !self.device.program_linked(&program) {
            let log = self
                .device
                .program_info_log(&program)
                .filter(|log| !log.trim().is_empty())
                .unwrap_or_else(|| "unknown program error".into());
            self.device.delete_program(&program);
            return Err(RenderError::Link(log));
        }

        self.programs.push(Some(program));
        Ok(ProgramHandle(self.programs.len() - 1))
    }

    pub fn use_program(&self, program: Option<ProgramHandle>) -> Result<()> {
        match program {
            Some(handle) => {
                let program = live(&self.programs, handle.0, "program")?;
                self.device.use_program(Some(program));
            }
            None => self.device.use_program(None),
        }
        Ok(())
    }

    pub fn resolve_attribute(&self, program: ProgramHandle, name: &str) -> Result<u32> {
        let program = live(&self.programs, program.0, "program")?;
        self.device
            .attrib_location(program, name)
            .ok_or_else(|| RenderError::MissingAttribute(name.to_owned()))
    }

    pub fn resolve_uniform(&mut self, program: ProgramHandle, name: &str) -> Result<UniformHandle> {
        let program = live(&self.programs, program.0, "program")?;
        let location = self
            .device
            .uniform_location(program, name)
            .ok_or_else(|| RenderError::MissingUniform(name.to_owned()))?;
        self.uniforms.push(location);
        Ok(UniformHandle(self.uniforms.len() - 1))
    }

    pub fn upload_buffer(&mut self, data: BufferData<'_>) -> Result<BufferHandle> {
        let buffer = self
            .device
            .create_buffer()
            .ok_or(RenderError::BufferCreation("buffer"))?;
        let target = data.target();
        self.device.bind_buffer(target, Some(&buffer));
        match data {
            BufferData::Attribute(values) => self.device.buffer_data_f32(target, values),
            BufferData::Indices(values) => self.device.buffer_data_u16(target, values),
        }
        self.device.bind_buffer(target, None);

        self.buffers.push(Some(buffer));
        Ok(BufferHandle(self.buffers.len() - 1))
    }

    pub fn create_vertex_array(&mut self) -> Result<VertexArrayHandle> {
        let vao = self
            .device
            .create_vertex_array()
            .ok_or(RenderError::BufferCreation("vertex array"))?;
        self.vertex_arrays.push(Some(vao));
        Ok(VertexArrayHandle(self.vertex_arrays.len() - 1))
    }

    /// Binds `vao` until the returned guard is dropped.
    pub fn bind_vertex_array(&self, vao: VertexArrayHandle) -> Result<VertexArrayBinding<'_, D>> {
        let handle = live(&self.vertex_arrays, vao.0, "vertex array")?;
        self.device.bind_vertex_array(Some(handle));
        Ok(VertexArrayBinding { context: self })
    }

    /// Uploads positions, normals and indices, then records them in a fresh
    /// vertex array.
    ///
    /// Buffers are uploaded before the vertex array is bound: unbinding the
    /// element buffer while a vertex array is bound would detach it.
    pub fn upload_mesh(
        &mut self,
        mesh: &Mesh,
        normals: &NormalSet,
        layout: AttributeLayout,
    ) -> Result<GpuMesh> {
        let positions = self.upload_buffer(BufferData::Attribute(mesh.vertices()))?;
        let normal_buffer = self.upload_buffer(BufferData::Attribute(normals.as_slice()))?;
        let indices = self.upload_buffer(BufferData::Indices(mesh.indices()))?;
        let vao = self.create_vertex_array()?;

        {
            let binding = self.bind_vertex_array(vao)?;
            binding.attach_attribute(positions, layout.position, POSITION_COMPONENTS as i32)?;
            binding.attach_attribute(normal_buffer, layout.normal, NORMAL_COMPONENTS as i32)?;
            binding.attach_indices(indices)?;
        }

        Ok(GpuMesh {
            vao,
            positions,
            normals: normal_buffer,
            indices,
            index_count: mesh.index_count() as i32,
        })
    }

    pub fn set_uniform_matrix4(&self, uniform: UniformHandle, value: &[f32; 16]) -> Result<()> {
        self.device.uniform_matrix4(self.uniform(uniform)?, value);
        Ok(())
    }

    pub fn set_uniform_vec3(&self, uniform: UniformHandle, value: &[f32; 3]) -> Result<()> {
        self.device.uniform_vec3(self.uniform(uniform)?, value);
        Ok(())
    }

    pub fn set_uniform_vec4(&self, uniform: UniformHandle, value: &[f32; 4]) -> Result<()> {
        self.device.uniform_vec4(self.uniform(uniform)?, value);
        Ok(())
    }

    pub fn set_clear_color(&self, color: [f32; 4]) {
        self.device.set_clear_color(color);
    }

    pub fn enable_depth_test(&self) {
        self.device.enable_depth_test();
    }

    pub fn clear(&self) {
        self.device.clear();
    }

    pub fn viewport(&self, width: u32, height: u32) {
        self.device
            .viewport(width.max(1) as i32, height.max(1) as i32);
    }

    /// Indexed triangle draw of `vao`; bindings are back to none afterwards
    /// whether or not the device reported an error.
    pub fn draw(&self, vao: VertexArrayHandle, index_count: i32) -> Result<()> {
        // Flags left by earlier calls belong to those calls, not this draw.
        while let Some(code) = self.device.take_error() {
            log::debug!("discarding stale device error {code:#06x}");
        }
        let _binding = self.bind_vertex_array(vao)?;
        self.device.draw_triangles(index_count);
        match self.device.take_error() {
            Some(code) => Err(RenderError::Draw(code)),
            None => Ok(()),
        }
    }

    pub fn is_context_lost(&self) -> bool {
        self.device.is_context_lost()
    }

    /// Deletes every live object: vertex arrays, buffers, programs, then
    /// shaders. Safe to call more than once.
    pub fn release(&mut self) {
        self.device.bind_vertex_array(None);
        self.device.use_program(None);
        for vao in self.vertex_arrays.iter_mut().filter_map(Option::take) {
            self.device.delete_vertex_array(&vao);
        }
        for buffer in self.buffers.iter_mut().filter_map(Option::take) {
            self.device.delete_buffer(&buffer);
        }
        for program in self.programs.iter_mut().filter_map(Option::take) {
            self.device.delete_program(&program);
        }
        for shader in self.shaders.iter_mut().filter_map(Option::take) {
            self.device.delete_shader(&shader);
        }
        self.uniforms.clear();
    }

    pub fn live_objects(&self) -> usize {
        self.shaders.iter().flatten().count()
            + self.programs.iter().flatten().count()
            + self.buffers.iter().flatten().count()
            + self.vertex_arrays.iter().flatten().count()
    }

    fn uniform(&self, uniform: UniformHandle) -> Result<&D::UniformLocation> {
        self.uniforms
            .get(uniform.0)
            .ok_or(RenderError::StaleHandle("uniform"))
    }
}

impl<D: GraphicsDevice> Drop for GraphicsContext<D> {
    fn drop(&mut self) {
        if self.live_objects() > 0 {
            self.release();
        }
    }
}

fn live<'a, T>(slots: &'a [Option<T>], index: usize, kind: &'static str) -> Result<&'a T> {
    slots
        .get(index)
        .and_then(Option::as_ref)
        .ok_or(RenderError::StaleHandle(kind))
}

/// Scoped vertex-array binding. Dropping it unbinds the vertex array first
/// and then both buffer targets.
pub struct VertexArrayBinding<'a, D: GraphicsDevice> {
    context: &'a GraphicsContext<D>,
}

impl<D: GraphicsDevice> VertexArrayBinding<'_, D> {
    pub fn attach_attribute(&self, buffer: BufferHandle, location: u32, components: i32) -> Result<()> {
        let buffer = live(&self.context.buffers, buffer.0, "buffer")?;
        let device = &self.context.device;
        device.bind_buffer(BufferTarget::Array, Some(buffer));
        device.enable_vertex_attribute(location, components);
        Ok(())
    }

    pub fn attach_indices(&self, buffer: BufferHandle) -> Result<()> {
        let buffer = live(&self.context.buffers, buffer.0, "buffer")?;
        self.context
            .device
            .bind_buffer(BufferTarget::ElementArray, Some(buffer));
        Ok(())
    }
}

impl<D: GraphicsDevice> Drop for VertexArrayBinding<'_, D> {
    fn drop(&mut self) {
        let device = &self.context.device;
        device.bind_vertex_array(None);
        device.bind_buffer(BufferTarget::Array, None);
        device.bind_buffer(BufferTarget::ElementArray, None);
    }
}
