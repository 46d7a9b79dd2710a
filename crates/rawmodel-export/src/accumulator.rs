//! Combined vertex/index buffer
//!
//! Meshes are appended one at a time. Each append records the vertex count
//! before it (the index offset), and triangle indices of that mesh are
//! rebased by that offset so they address the combined buffer.

use rawmodel_core::{Vec2, Vec3, Vec4};
use rawmodel_scene::Mesh;
use serde::{Deserialize, Serialize};

use crate::vertex::{Vertex, VertexTransform};

/// A contiguous slice of the index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmeshRange {
    pub start_index: u32,
    pub num_indices: u32,
}

impl SubmeshRange {
    /// One past the last index
    pub fn end_index(&self) -> u32 {
        self.start_index + self.num_indices
    }
}

/// Growing vertex and index buffers for one export
#[derive(Debug, Default)]
pub struct GeometryAccumulator {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl GeometryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve room for `vertices` more vertices and `indices` more indices
    pub fn reserve(&mut self, vertices: usize, indices: usize) {
        self.vertices.reserve(vertices);
        self.indices.reserve(indices);
    }

    /// Append transformed vertices and return the index offset for them
    ///
    /// `normals`, `tangents` and `texcoords` may be empty; missing entries
    /// default to a zero normal, a `(0, 0, 0, 1)` tangent and a zero UV.
    pub fn append(
        &mut self,
        transform: &VertexTransform,
        positions: &[Vec3],
        normals: &[Vec3],
        tangents: &[Vec4],
        texcoords: &[Vec2],
    ) -> u32 {
        let index_offset = self.vertex_count();
        self.vertices.reserve(positions.len());

        for (i, &position) in positions.iter().enumerate() {
            let normal = normals.get(i).copied().unwrap_or(Vec3::ZERO);
            let tangent = tangents.get(i).copied().unwrap_or(Vec4::IDENTITY);
            let uv = texcoords.get(i).copied().unwrap_or(Vec2::ZERO);
            self.vertices.push(transform.apply(position, normal, tangent, uv));
        }

        index_offset
    }

    /// Append all vertices of `mesh`
    pub fn append_mesh(&mut self, transform: &VertexTransform, mesh: &Mesh) -> u32 {
        self.append(transform, &mesh.positions, &mesh.normals, &mesh.tangents, &mesh.uvs)
    }

    /// Append one submesh's indices rebased by `index_offset`
    pub fn append_triangles(&mut self, indices: &[u32], index_offset: u32) -> SubmeshRange {
        let start_index = self.index_count();
        self.indices.extend(indices.iter().map(|&i| i + index_offset));

        SubmeshRange {
            start_index,
            num_indices: indices.len() as u32,
        }
    }

    /// Vertices appended so far, also the offset of the next append
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Indices appended so far, also the start of the next range
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Triangles in the index buffer; every appended range is a triangle list
    pub fn triangle_count(&self) -> u32 {
        self.index_count() / 3
    }

    /// Transformed vertices in blob order
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}
