//! Per-vertex normals for triangle lists.
//!
//! Each triangle `(i0, i1, i2)` contributes the raw cross product
//! `(p2 - p1) × (p0 - p1)` to all three of its vertices. The sums are
//! normalized once every triangle has been visited; no area or angle
//! weighting is applied beyond what the raw cross product carries.

use crate::error::MeshError;
use crate::mesh::{NORMAL_COMPONENTS, validate_topology};

/// Unit normal given to vertices whose accumulated normal has zero length.
pub const FALLBACK_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

/// Flattened xyz unit normals, one per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalSet {
    data: Vec<f32>,
}

impl NormalSet {
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.data.len() / NORMAL_COMPONENTS
    }

    pub fn normal(&self, vertex: usize) -> Option<[f32; 3]> {
        let start = vertex * NORMAL_COMPONENTS;
        let slice = self.data.get(start..start + NORMAL_COMPONENTS)?;
        Some([slice[0], slice[1], slice[2]])
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }
}

pub fn compute_normals(vertices: &[f32], indices: &[u16]) -> Result<NormalSet, MeshError> {
    validate_topology(vertices, indices)?;
    Ok(accumulate(vertices, indices))
}

/// Callers must have validated the topology.
pub(crate) fn accumulate(vertices: &[f32], indices: &[u16]) -> NormalSet {
    let mut data = vec![0.0f32; vertices.len()];

    for triangle in indices.chunks_exact(3) {
        let p0 = position(vertices, triangle[0]);
        let p1 = position(vertices, triangle[1]);
        let p2 = position(vertices, triangle[2]);

        let v1 = sub(p2, p1);
        let v2 = sub(p0, p1);
        let face = cross(v1, v2);

        for &index in triangle {
            let base = index as usize * NORMAL_COMPONENTS;
            data[base] += face[0];
            data[base + 1] += face[1];
            data[base + 2] += face[2];
        }
    }

    for normal in data.chunks_exact_mut(NORMAL_COMPONENTS) {
        let unit = normalize_or([normal[0], normal[1], normal[2]], FALLBACK_NORMAL);
        normal.copy_from_slice(&unit);
    }

    NormalSet { data }
}

#[inline]
fn position(vertices: &[f32], index: u16) -> [f32; 3] {
    let base = index as usize * 3;
    [vertices[base], vertices[base + 1], vertices[base + 2]]
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize_or(v: [f32; 3], fallback: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len == 0.0 {
        return fallback;
    }
    [v[0] / len, v[1] / len, v[2] / len]
}
