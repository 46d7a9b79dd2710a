//! Output vertex layout and the local-to-world normalizer

use bytemuck::{Pod, Zeroable};
use rawmodel_core::{Mat4x4, Vec2, Vec3, Vec4};

use crate::options::NormalTransform;

/// Bytes per vertex in the rawbuffer
pub const VERTEX_SIZE: usize = 48;

/// Interleaved output vertex
///
/// Field order and width are the rawbuffer record layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Tangent direction, bitangent handedness (+1/-1) in W
    pub tangent: [f32; 4],
    pub texcoord: [f32; 2],
}

const _: () = assert!(std::mem::size_of::<Vertex>() == VERTEX_SIZE);

impl Vertex {
    /// The 12 floats in record order
    pub fn as_floats(&self) -> &[f32; 12] {
        bytemuck::cast_ref(self)
    }

    pub fn from_floats(floats: [f32; 12]) -> Self {
        bytemuck::cast(floats)
    }
}

/// Per-object transform state, computed once and applied to every vertex
#[derive(Debug, Clone, Copy)]
pub struct VertexTransform {
    world: Mat4x4,
    normal: Mat4x4,
}

impl VertexTransform {
    pub fn new(world: Mat4x4, mode: NormalTransform) -> Self {
        let normal = match mode {
            NormalTransform::Forward => world,
            // singular matrices keep the forward behavior
            NormalTransform::InverseTranspose => world.inverse_transpose_3x3().unwrap_or(world),
        };
        Self { world, normal }
    }

    /// Position as a point, normal and tangent as directions, `v` flipped
    /// from the engine's bottom-left UV origin to top-left.
    pub fn apply(&self, position: Vec3, normal: Vec3, tangent: Vec4, uv: Vec2) -> Vertex {
        Vertex {
            position: self.world.transform_point(position).to_array(),
            normal: self.normal.transform_vector(normal).to_array(),
            tangent: self
                .world
                .transform_vector(tangent.truncate())
                .extend(tangent.w)
                .to_array(),
            texcoord: [uv.x, 1.0 - uv.y],
        }
    }
}

/// Transform one vertex with the forward world matrix
pub fn transform_vertex(
    world: &Mat4x4,
    position: Vec3,
    normal: Vec3,
    tangent: Vec3,
    tangent_w: f32,
    uv: Vec2,
) -> Vertex {
    VertexTransform::new(*world, NormalTransform::Forward).apply(
        position,
        normal,
        tangent.extend(tangent_w),
        uv,
    )
}
