//! Source mesh data as exposed by the host scene

use rawmodel_core::{BoundingBox, Error, Mat4x4, Result, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Primitive topology of a submesh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    #[default]
    Triangles,
    Quads,
    Lines,
    LineStrip,
    Points,
}

impl Topology {
    /// Indices per primitive, `None` for strips
    pub fn indices_per_primitive(&self) -> Option<usize> {
        match self {
            Topology::Triangles => Some(3),
            Topology::Quads => Some(4),
            Topology::Lines => Some(2),
            Topology::Points => Some(1),
            Topology::LineStrip => None,
        }
    }
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Topology::Triangles => "triangles",
            Topology::Quads => "quads",
            Topology::Lines => "lines",
            Topology::LineStrip => "line_strip",
            Topology::Points => "points",
        };
        f.write_str(name)
    }
}

/// A contiguous group of primitives sharing one material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submesh {
    #[serde(default)]
    pub topology: Topology,
    pub indices: Vec<u32>,
}

impl Submesh {
    /// Create a triangle-list submesh
    pub fn triangles(indices: Vec<u32>) -> Self {
        Self {
            topology: Topology::Triangles,
            indices,
        }
    }

    pub fn is_triangle_list(&self) -> bool {
        self.topology == Topology::Triangles
    }
}

/// A source mesh in its local space
///
/// Normals, tangents and UVs are optional; when present they must have one
/// entry per position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(default)]
    pub name: String,
    pub positions: Vec<Vec3>,
    #[serde(default)]
    pub normals: Vec<Vec3>,
    /// Tangent direction with bitangent handedness in W
    #[serde(default)]
    pub tangents: Vec<Vec4>,
    #[serde(default)]
    pub uvs: Vec<Vec2>,
    #[serde(default)]
    pub submeshes: Vec<Submesh>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Total indices over all submeshes
    pub fn index_count(&self) -> usize {
        self.submeshes.iter().map(|s| s.indices.len()).sum()
    }

    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    /// Bounds of the positions after applying `transform`
    pub fn world_bounds(&self, transform: &Mat4x4) -> BoundingBox {
        BoundingBox::from_points(self.positions.iter().map(|&p| transform.transform_point(p)))
    }

    /// Check attribute counts and index ranges
    pub fn validate(&self) -> Result<()> {
        let count = self.vertex_count();

        let attributes = [
            ("normals", self.normals.len()),
            ("tangents", self.tangents.len()),
            ("uvs", self.uvs.len()),
        ];
        for (attribute, len) in attributes {
            if len != 0 && len != count {
                return Err(Error::invalid_data(format!(
                    "mesh '{}': {} {} for {} positions",
                    self.name, len, attribute, count
                )));
            }
        }

        for (i, submesh) in self.submeshes.iter().enumerate() {
            if let Some(per_primitive) = submesh.topology.indices_per_primitive() {
                if submesh.indices.len() % per_primitive != 0 {
                    return Err(Error::invalid_data(format!(
                        "mesh '{}' submesh {}: {} indices is not a whole number of {}",
                        self.name,
                        i,
                        submesh.indices.len(),
                        submesh.topology
                    )));
                }
            }
            if let Some(&bad) = submesh.indices.iter().find(|&&idx| idx as usize >= count) {
                return Err(Error::invalid_data(format!(
                    "mesh '{}' submesh {}: index {} out of range ({} vertices)",
                    self.name, i, bad, count
                )));
            }
        }

        Ok(())
    }
}
