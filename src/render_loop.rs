//! Frame driver: owns the context, the scene and the lifecycle state.
//!
//! The loop never schedules itself. The host calls [`RenderLoop::frame`]
//! from its display-synchronized callback and asks for another callback
//! only while the outcome is [`FrameOutcome::Continue`].

use crate::config::ViewerConfig;
use crate::context::{GpuMesh, GraphicsContext};
use crate::device::GraphicsDevice;
use crate::error::{RenderError, Result};
use crate::input::Key;
use crate::mesh::Mesh;
use crate::scene::SceneState;
use crate::shader::{ShaderProgram, ShaderSources};

/// Host-side drawable. Queried every frame; sizes are never cached.
pub trait Surface {
    fn size(&self) -> (u32, u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Ready,
    Running,
    Stopped,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Halt,
}

struct Pipeline {
    program: ShaderProgram,
    mesh: GpuMesh,
}

pub struct RenderLoop<D: GraphicsDevice, S: Surface> {
    state: LoopState,
    context: GraphicsContext<D>,
    surface: S,
    scene: SceneState,
    config: ViewerConfig,
    pipeline: Option<Pipeline>,
    frames_drawn: u64,
    frames_skipped: u64,
}

impl<D: GraphicsDevice, S: Surface> RenderLoop<D, S> {
    pub fn new(device: D, surface: S, config: ViewerConfig) -> Self {
        let scene = SceneState::new(&config);
        Self {
            state: LoopState::Uninitialized,
            context: GraphicsContext::new(device),
            surface,
            scene,
            config,
            pipeline: None,
            frames_drawn: 0,
            frames_skipped: 0,
        }
    }

    /// Builds the program and uploads `mesh`. Any failure releases what was
    /// created and leaves the loop in [`LoopState::Failed`].
    pub fn initialize(&mut self, mesh: &Mesh, sources: ShaderSources<'_>) -> Result<()> {
        self.expect_state(LoopState::Uninitialized)?;
        match self.build_pipeline(mesh, sources) {
            Ok(pipeline) => {
                self.pipeline = Some(pipeline);
                self.state = LoopState::Ready;
                log::info!(
                    "pipeline ready: {} vertices, {} indices",
                    mesh.vertex_count(),
                    mesh.index_count()
                );
                Ok(())
            }
            Err(err) => {
                log::error!("initialization failed: {err}");
                self.fail();
                Err(err)
            }
        }
    }

    fn build_pipeline(&mut self, mesh: &Mesh, sources: ShaderSources<'_>) -> Result<Pipeline> {
        if self.context.is_context_lost() {
            return Err(RenderError::DeviceUnavailable("context lost before initialization".into()));
        }
        self.context.set_clear_color(self.config.clear_color);
        self.context.enable_depth_test();

        let program = ShaderProgram::build(&mut self.context, sources)?;
        let normals = mesh.compute_normals();
        let mesh = self.context.upload_mesh(mesh, &normals, program.attributes)?;
        Ok(Pipeline { program, mesh })
    }

    pub fn start(&mut self) -> Result<()> {
        self.expect_state(LoopState::Ready)?;
        self.state = LoopState::Running;
        log::info!("render loop running");
        Ok(())
    }

    /// Renders one frame while running. Draw failures skip the frame but keep
    /// the loop alive; a lost context is terminal.
    pub fn frame(&mut self) -> FrameOutcome {
        if self.state != LoopState::Running {
            return FrameOutcome::Halt;
        }
        if self.context.is_context_lost() {
            log::error!("graphics context lost, halting");
            self.fail();
            return FrameOutcome::Halt;
        }
        match self.render_frame() {
            Ok(()) => self.frames_drawn += 1,
            Err(err) => {
                self.frames_skipped += 1;
                log::warn!("skipping frame: {err}");
            }
        }
        FrameOutcome::Continue
    }

    fn render_frame(&self) -> Result<()> {
        let pipeline = self
            .pipeline
            .as_ref()
            .ok_or(RenderError::StaleHandle("pipeline"))?;
        let (width, height) = self.surface.size();
        let (width, height) = (width.max(1), height.max(1));

        self.context.clear();
        self.context.viewport(width, height);

        let transforms = self.scene.current_transforms(width as f32 / height as f32)?;
        pipeline.program.upload_frame(
            &self.context,
            &transforms,
            self.scene.current_light_direction(),
            &self.config,
        )?;
        self.context.draw(pipeline.mesh.vao, pipeline.mesh.index_count)
    }

    /// Applies an arrow key immediately; returns whether the key was used.
    pub fn handle_key(&mut self, name: &str) -> bool {
        self.apply_key(Key::from_name(name))
    }

    pub fn handle_key_code(&mut self, code: u32) -> bool {
        self.apply_key(Key::from_key_code(code))
    }

    fn apply_key(&mut self, key: Option<Key>) -> bool {
        match key {
            Some(key) => {
                self.scene.on_key(key);
                true
            }
            None => false,
        }
    }

    /// Stops scheduling and releases every GPU object. A failed loop stays
    /// failed.
    pub fn stop(&mut self) {
        if matches!(self.state, LoopState::Ready | LoopState::Running) {
            self.state = LoopState::Stopped;
            log::info!(
                "render loop stopped after {} frames ({} skipped)",
                self.frames_drawn,
                self.frames_skipped
            );
        }
        self.pipeline = None;
        self.context.release();
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn context(&self) -> &GraphicsContext<D> {
        &self.context
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn frames_skipped(&self) -> u64 {
        self.frames_skipped
    }

    fn fail(&mut self) {
        self.state = LoopState::Failed;
        self.pipeline = None;
        self.context.release();
    }

    fn expect_state(&self, expected: LoopState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(RenderError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }
}
