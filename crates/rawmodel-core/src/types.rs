//! Common math types used across rawmodel
//!
//! Vectors serialize as plain arrays (`[x, y, z]`) so scene documents and
//! manifests stay compact.

use serde::{Deserialize, Serialize};

/// 2D vector (UV coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }
}

impl Default for Vec2 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from(v: [f32; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<Vec2> for [f32; 2] {
    fn from(v: Vec2) -> Self {
        v.to_array()
    }
}

/// 3D vector (position, normal, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0, z: 1.0 };
    pub const UP: Self = Self { x: 0.0, y: 1.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn splat(v: f32) -> Self {
        Self { x: v, y: v, z: v }
    }

    /// Component-wise minimum
    pub fn min(&self, other: &Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Component-wise maximum
    pub fn max(&self, other: &Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    pub fn extend(self, w: f32) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, w)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

/// 4D vector (tangent with handedness, quaternion, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0, z: 1.0, w: 1.0 };
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn truncate(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl Default for Vec4 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[f32; 4]> for Vec4 {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Vec4> for [f32; 4] {
    fn from(v: Vec4) -> Self {
        v.to_array()
    }
}

/// 4x4 transformation matrix
///
/// Stored column-major: `m[c]` is column `c`, and `m[3]` holds the
/// translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4x4 {
    pub m: [[f32; 4]; 4],
}

impl Mat4x4 {
    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Create a new matrix from a flat column-major array
    pub fn from_flat(data: &[f32; 16]) -> Self {
        Self {
            m: [
                [data[0], data[1], data[2], data[3]],
                [data[4], data[5], data[6], data[7]],
                [data[8], data[9], data[10], data[11]],
                [data[12], data[13], data[14], data[15]],
            ],
        }
    }

    pub fn from_translation(t: Vec3) -> Self {
        let mut out = Self::IDENTITY;
        out.m[3] = [t.x, t.y, t.z, 1.0];
        out
    }

    pub fn from_scale(s: Vec3) -> Self {
        let mut out = Self::IDENTITY;
        out.m[0][0] = s.x;
        out.m[1][1] = s.y;
        out.m[2][2] = s.z;
        out
    }

    /// Build translation * rotation * scale; `rotation` is an xyzw quaternion
    pub fn from_trs(translation: Vec3, rotation: Vec4, scale: Vec3) -> Self {
        let q = {
            let len = (rotation.x * rotation.x
                + rotation.y * rotation.y
                + rotation.z * rotation.z
                + rotation.w * rotation.w)
                .sqrt();
            if len > 0.0 {
                Vec4::new(rotation.x / len, rotation.y / len, rotation.z / len, rotation.w / len)
            } else {
                Vec4::IDENTITY
            }
        };
        let (x, y, z, w) = (q.x, q.y, q.z, q.w);

        Self {
            m: [
                [
                    (1.0 - 2.0 * (y * y + z * z)) * scale.x,
                    (2.0 * (x * y + w * z)) * scale.x,
                    (2.0 * (x * z - w * y)) * scale.x,
                    0.0,
                ],
                [
                    (2.0 * (x * y - w * z)) * scale.y,
                    (1.0 - 2.0 * (x * x + z * z)) * scale.y,
                    (2.0 * (y * z + w * x)) * scale.y,
                    0.0,
                ],
                [
                    (2.0 * (x * z + w * y)) * scale.z,
                    (2.0 * (y * z - w * x)) * scale.z,
                    (1.0 - 2.0 * (x * x + y * y)) * scale.z,
                    0.0,
                ],
                [translation.x, translation.y, translation.z, 1.0],
            ],
        }
    }

    /// Get translation component
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.m[3][0], self.m[3][1], self.m[3][2])
    }

    /// Matrix product `self * rhs`
    pub fn mul(&self, rhs: &Self) -> Self {
        let mut out = [[0.0f32; 4]; 4];
        for (c, column) in out.iter_mut().enumerate() {
            for (r, value) in column.iter_mut().enumerate() {
                *value = (0..4).map(|k| self.m[k][r] * rhs.m[c][k]).sum();
            }
        }
        Self { m: out }
    }

    /// Transform a point (translation applied, projective divide when w != 1)
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let m = &self.m;
        let x = m[0][0] * p.x + m[1][0] * p.y + m[2][0] * p.z + m[3][0];
        let y = m[0][1] * p.x + m[1][1] * p.y + m[2][1] * p.z + m[3][1];
        let z = m[0][2] * p.x + m[1][2] * p.y + m[2][2] * p.z + m[3][2];
        let w = m[0][3] * p.x + m[1][3] * p.y + m[2][3] * p.z + m[3][3];
        if w != 1.0 && w != 0.0 {
            Vec3::new(x / w, y / w, z / w)
        } else {
            Vec3::new(x, y, z)
        }
    }

    /// Transform a direction (translation ignored)
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            m[0][0] * v.x + m[1][0] * v.y + m[2][0] * v.z,
            m[0][1] * v.x + m[1][1] * v.y + m[2][1] * v.z,
            m[0][2] * v.x + m[1][2] * v.y + m[2][2] * v.z,
        )
    }

    /// Inverse-transpose of the upper 3x3, the correct matrix for normals
    /// under non-uniform scale. `None` when the 3x3 is singular.
    pub fn inverse_transpose_3x3(&self) -> Option<Self> {
        // a[r][c], row-major view of the upper 3x3
        let a = |r: usize, c: usize| self.m[c][r];

        let c00 = a(1, 1) * a(2, 2) - a(1, 2) * a(2, 1);
        let c01 = -(a(1, 0) * a(2, 2) - a(1, 2) * a(2, 0));
        let c02 = a(1, 0) * a(2, 1) - a(1, 1) * a(2, 0);
        let c10 = -(a(0, 1) * a(2, 2) - a(0, 2) * a(2, 1));
        let c11 = a(0, 0) * a(2, 2) - a(0, 2) * a(2, 0);
        let c12 = -(a(0, 0) * a(2, 1) - a(0, 1) * a(2, 0));
        let c20 = a(0, 1) * a(1, 2) - a(0, 2) * a(1, 1);
        let c21 = -(a(0, 0) * a(1, 2) - a(0, 2) * a(1, 0));
        let c22 = a(0, 0) * a(1, 1) - a(0, 1) * a(1, 0);

        let det = a(0, 0) * c00 + a(0, 1) * c01 + a(0, 2) * c02;
        if det.abs() <= f32::EPSILON {
            return None;
        }
        let inv = 1.0 / det;

        // (A^-1)^T == cofactor(A) / det; stored column-major
        Some(Self {
            m: [
                [c00 * inv, c10 * inv, c20 * inv, 0.0],
                [c01 * inv, c11 * inv, c21 * inv, 0.0],
                [c02 * inv, c12 * inv, c22 * inv, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        })
    }
}

impl Default for Mat4x4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Axis-aligned bounding box
///
/// `EMPTY` uses the largest finite floats rather than infinities so an
/// empty box still round-trips through JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub const EMPTY: Self = Self {
        min: Vec3 { x: f32::MAX, y: f32::MAX, z: f32::MAX },
        max: Vec3 { x: f32::MIN, y: f32::MIN, z: f32::MIN },
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point; `EMPTY` for no points
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut bbox = Self::EMPTY;
        for p in points {
            bbox.expand(p);
        }
        bbox
    }

    /// True once at least one point has been added
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min(&point);
        self.max = self.max.max(&point);
    }

    /// Grow to contain `other`; an empty `other` leaves the box untouched
    pub fn encapsulate(&mut self, other: &BoundingBox) {
        if other.is_valid() {
            self.expand(other.min);
            self.expand(other.max);
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Linear RGBA color with float channels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "[f32; 4]")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn to_rgb(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl TryFrom<Vec<f32>> for Color {
    type Error = String;

    fn try_from(v: Vec<f32>) -> Result<Self, Self::Error> {
        match v.as_slice() {
            [r, g, b] => Ok(Color::rgb(*r, *g, *b)),
            [r, g, b, a] => Ok(Color::new(*r, *g, *b, *a)),
            other => Err(format!("color needs 3 or 4 components, got {}", other.len())),
        }
    }
}

impl From<Color> for [f32; 4] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5 && (a.z - b.z).abs() < 1e-5
    }

    #[test]
    fn test_vec3_min_max() {
        let a = Vec3::new(1.0, 5.0, -3.0);
        let b = Vec3::new(4.0, 2.0, 6.0);

        assert_eq!(a.min(&b), Vec3::new(1.0, 2.0, -3.0));
        assert_eq!(a.max(&b), Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_point_vs_vector_transform() {
        let m = Mat4x4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(m.transform_point(Vec3::ONE), Vec3::new(11.0, 1.0, 1.0));
        assert_eq!(m.transform_vector(Vec3::ONE), Vec3::ONE);
    }

    #[test]
    fn test_trs_rotation() {
        // 90 degrees around +Y maps +X to -Z
        let half = std::f32::consts::FRAC_PI_4;
        let rot = Vec4::new(0.0, half.sin(), 0.0, half.cos());
        let m = Mat4x4::from_trs(Vec3::ZERO, rot, Vec3::ONE);
        assert!(approx(m.transform_vector(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_mul_applies_rhs_first() {
        let t = Mat4x4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let s = Mat4x4::from_scale(Vec3::splat(2.0));
        let ts = t.mul(&s);
        assert_eq!(ts.transform_point(Vec3::ONE), Vec3::new(3.0, 2.0, 2.0));
    }

    #[test]
    fn test_inverse_transpose_non_uniform_scale() {
        let m = Mat4x4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = m.inverse_transpose_3x3().unwrap();
        assert!(approx(n.transform_vector(Vec3::new(1.0, 1.0, 0.0)), Vec3::new(0.5, 1.0, 0.0)));

        let singular = Mat4x4::from_scale(Vec3::new(0.0, 1.0, 1.0));
        assert!(singular.inverse_transpose_3x3().is_none());
    }

    #[test]
    fn test_bounding_box_encapsulate() {
        let mut bbox = BoundingBox::EMPTY;
        assert!(!bbox.is_valid());

        bbox.encapsulate(&BoundingBox::EMPTY);
        assert_eq!(bbox, BoundingBox::EMPTY);

        bbox.encapsulate(&BoundingBox::new(Vec3::ZERO, Vec3::ONE));
        bbox.expand(Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(bbox.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(bbox.max, Vec3::ONE);
    }

    #[test]
    fn test_color_serde_accepts_rgb() {
        let c: Color = serde_json::from_str("[0.5, 0.25, 1.0]").unwrap();
        assert_eq!(c, Color::rgb(0.5, 0.25, 1.0));
        assert!(serde_json::from_str::<Color>("[1.0]").is_err());
    }
}
