use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::device::ShaderStage;
use crate::render_loop::LoopState;

/// Topology problems found while validating raw mesh arrays.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    #[error("mesh requires at least one vertex")]
    NoVertices,
    #[error("mesh vertices must be (x, y, z) triples, got {0} floats")]
    VerticesNotTriples(usize),
    #[error("index count {0} is not a multiple of three")]
    IndicesNotTriples(usize),
    #[error("index {index} at position {position} exceeds vertex count {vertex_count}")]
    IndexOutOfRange {
        position: usize,
        index: u16,
        vertex_count: usize,
    },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("drawable surface unavailable: {0}")]
    SurfaceUnavailable(String),
    #[error("graphics device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("failed to compile {stage} shader: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("failed to link program: {0}")]
    Link(String),
    #[error("{0} uniform missing")]
    MissingUniform(String),
    #[error("{0} attribute missing")]
    MissingAttribute(String),
    #[error("failed to create {0}")]
    BufferCreation(&'static str),
    #[error("invalid mesh topology: {0}")]
    Mesh(#[from] MeshError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("invalid projection: {0}")]
    Projection(&'static str),
    #[error("draw failed with device error {0:#06x}")]
    Draw(u32),
    #[error("{0} handle does not refer to a live resource")]
    StaleHandle(&'static str),
    #[error("render loop is {actual:?}, expected {expected:?}")]
    InvalidState {
        expected: LoopState,
        actual: LoopState,
    },
}

impl RenderError {
    /// Diagnostic text reported by the device, if the error carries one.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            RenderError::ShaderCompile { log, .. } => Some(log),
            RenderError::Link(log) => Some(log),
            _ => None,
        }
    }
}

impl From<RenderError> for JsValue {
    fn from(err: RenderError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        RenderError::Config(err.to_string())
    }
}

pub type Result<T, E = RenderError> = std::result::Result<T, E>;
