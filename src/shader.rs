use crate::config::ViewerConfig;
use crate::context::{AttributeLayout, GraphicsContext, ProgramHandle, ShaderHandle, UniformHandle};
use crate::device::{GraphicsDevice, ShaderStage};
use crate::error::Result;
use crate::scene::Transforms;

pub const POSITION_ATTRIBUTE: &str = "position";
pub const NORMAL_ATTRIBUTE: &str = "normal";

/// Gouraud-shaded Lambert pair used when the host supplies no shaders.
pub const LAMBERT_VERTEX_SOURCE: &str = include_str!("../shaders/lambert.vert");
pub const LAMBERT_FRAGMENT_SOURCE: &str = include_str!("../shaders/lambert.frag");

#[derive(Debug, Clone, Copy)]
pub struct ShaderSources<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
}

impl Default for ShaderSources<'static> {
    fn default() -> Self {
        Self {
            vertex: LAMBERT_VERTEX_SOURCE,
            fragment: LAMBERT_FRAGMENT_SOURCE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Uniforms {
    pub projection: UniformHandle,
    pub model_view: UniformHandle,
    pub normal: UniformHandle,
    pub light_direction: UniformHandle,
    pub light_ambient: UniformHandle,
    pub light_diffuse: UniformHandle,
    pub material_diffuse: UniformHandle,
}

/// Linked program plus every location the draw loop writes to.
#[derive(Debug, Clone, Copy)]
pub struct ShaderProgram {
    pub vertex: ShaderHandle,
    pub fragment: ShaderHandle,
    pub program: ProgramHandle,
    pub attributes: AttributeLayout,
    pub uniforms: Uniforms,
}

impl ShaderProgram {
    pub fn build<D: GraphicsDevice>(
        ctx: &mut GraphicsContext<D>,
        sources: ShaderSources<'_>,
    ) -> Result<Self> {
        let vertex = ctx.compile_shader(ShaderStage::Vertex, sources.vertex)?;
        let fragment = ctx.compile_shader(ShaderStage::Fragment, sources.fragment)?;
        let program = ctx.link_program(vertex, fragment)?;

        let attributes = AttributeLayout {
            position: ctx.resolve_attribute(program, POSITION_ATTRIBUTE)?,
            normal: ctx.resolve_attribute(program, NORMAL_ATTRIBUTE)?,
        };
        let uniforms = Uniforms {
            projection: ctx.resolve_uniform(program, "projectionMatrix")?,
            model_view: ctx.resolve_uniform(program, "modelViewMatrix")?,
            normal: ctx.resolve_uniform(program, "normalMatrix")?,
            light_direction: ctx.resolve_uniform(program, "lightDirection")?,
            light_ambient: ctx.resolve_uniform(program, "lightAmbient")?,
            light_diffuse: ctx.resolve_uniform(program, "lightDiffuse")?,
            material_diffuse: ctx.resolve_uniform(program, "materialDiffuse")?,
        };

        Ok(Self {
            vertex,
            fragment,
            program,
            attributes,
            uniforms,
        })
    }

    /// Makes the program current and writes every uniform for one frame.
    pub fn upload_frame<D: GraphicsDevice>(
        &self,
        ctx: &GraphicsContext<D>,
        transforms: &Transforms,
        light_direction: [f32; 3],
        config: &ViewerConfig,
    ) -> Result<()> {
        let u = &self.uniforms;
        ctx.use_program(Some(self.program))?;
        ctx.set_uniform_matrix4(u.projection, &transforms.projection)?;
        ctx.set_uniform_matrix4(u.model_view, &transforms.model_view)?;
        ctx.set_uniform_matrix4(u.normal, &transforms.normal)?;
        ctx.set_uniform_vec3(u.light_direction, &light_direction)?;
        ctx.set_uniform_vec4(u.light_ambient, &config.light_ambient)?;
        ctx.set_uniform_vec4(u.light_diffuse, &config.light_diffuse)?;
        ctx.set_uniform_vec4(u.material_diffuse, &config.material_diffuse)?;
        Ok(())
    }
}
