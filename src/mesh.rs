use crate::error::MeshError;
use crate::normals::{self, NormalSet};

pub const POSITION_COMPONENTS: usize = 3;
pub const NORMAL_COMPONENTS: usize = 3;

/// Triangle-list geometry: flattened xyz positions plus u16 indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<f32>,
    indices: Vec<u16>,
}

impl Mesh {
    pub fn new(vertices: Vec<f32>, indices: Vec<u16>) -> Result<Self, MeshError> {
        validate_topology(&vertices, &indices)?;
        Ok(Self { vertices, indices })
    }

    /// The 1×1 square centred on the origin in the z = 0 plane.
    pub fn unit_square() -> Self {
        Self {
            vertices: vec![
                -0.5, 0.5, 0.0, //
                -0.5, -0.5, 0.0, //
                0.5, -0.5, 0.0, //
                0.5, 0.5, 0.0, //
            ],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / POSITION_COMPONENTS
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn compute_normals(&self) -> NormalSet {
        normals::accumulate(&self.vertices, &self.indices)
    }
}

pub(crate) fn validate_topology(vertices: &[f32], indices: &[u16]) -> Result<(), MeshError> {
    if vertices.is_empty() {
        return Err(MeshError::NoVertices);
    }
    if vertices.len() % POSITION_COMPONENTS != 0 {
        return Err(MeshError::VerticesNotTriples(vertices.len()));
    }
    if indices.len() % 3 != 0 {
        return Err(MeshError::IndicesNotTriples(indices.len()));
    }
    let vertex_count = vertices.len() / POSITION_COMPONENTS;
    if let Some((position, &index)) = indices
        .iter()
        .enumerate()
        .find(|&(_, &index)| index as usize >= vertex_count)
    {
        return Err(MeshError::IndexOutOfRange {
            position,
            index,
            vertex_count,
        });
    }
    Ok(())
}
