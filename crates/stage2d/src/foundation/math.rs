//! Math utilities and types
//!
//! Provides the fundamental math types for 2D rendering. Matrices stay 4x4 so
//! the view-projection handed to the backend matches what a GPU shader expects.

pub use nalgebra::{Matrix3, Matrix4, Vector2, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type (2D affine transforms)
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Degrees to radians conversion factor
pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

/// Radians to degrees conversion factor
pub const RAD_TO_DEG: f32 = 180.0 / std::f32::consts::PI;

/// Width/height pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Size {
    /// Create a new size
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero or negative
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Axis-aligned rectangle with a top-left origin (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width (negative widths encode a horizontal flip on source rects)
    pub width: f32,
    /// Height (negative heights encode a vertical flip on source rects)
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle from an origin and a size
    pub fn from_origin_size(origin: Vec2, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Left edge
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Rectangle size
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// True when the rectangle has no area
    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    /// Point containment test (edges inclusive on the top-left, exclusive on the bottom-right)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left() && point.x < self.right() && point.y >= self.top() && point.y < self.bottom()
    }
}

/// RGBA color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Color {
    /// Opaque black
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Opaque white
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    /// Opaque red
    pub const RED: Self = Self::rgba(1.0, 0.0, 0.0, 1.0);
    /// Opaque green
    pub const GREEN: Self = Self::rgba(0.0, 1.0, 0.0, 1.0);
    /// Opaque blue
    pub const BLUE: Self = Self::rgba(0.0, 0.0, 1.0, 1.0);
    /// Fully transparent
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);

    /// Create a color from RGBA components
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from RGB components
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Same color with alpha multiplied by `opacity`
    #[must_use]
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self { a: self.a * opacity.clamp(0.0, 1.0), ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// 2D affine helpers built on homogeneous 3x3 matrices
pub mod affine {
    use super::{Mat3, Vec2, DEG_TO_RAD};

    /// Translation matrix
    pub fn translation(offset: Vec2) -> Mat3 {
        Mat3::new_translation(&offset)
    }

    /// Rotation matrix (degrees, clockwise on a y-down screen)
    pub fn rotation(degrees: f32) -> Mat3 {
        Mat3::new_rotation(degrees * DEG_TO_RAD)
    }

    /// Non-uniform scale matrix
    pub fn scale(factors: Vec2) -> Mat3 {
        Mat3::new_nonuniform_scaling(&factors)
    }

    /// Translate * rotate * scale
    pub fn trs(position: Vec2, degrees: f32, factors: Vec2) -> Mat3 {
        translation(position) * rotation(degrees) * scale(factors)
    }

    /// Apply an affine matrix to a point
    pub fn transform_point(m: &Mat3, point: Vec2) -> Vec2 {
        let p = m * nalgebra::Vector3::new(point.x, point.y, 1.0);
        Vec2::new(p.x, p.y)
    }

    /// Extract the scale factors of an affine matrix
    pub fn extract_scale(m: &Mat3) -> Vec2 {
        Vec2::new(
            Vec2::new(m[(0, 0)], m[(1, 0)]).norm(),
            Vec2::new(m[(0, 1)], m[(1, 1)]).norm(),
        )
    }

    /// Extract the rotation of an affine matrix in degrees
    pub fn extract_rotation(m: &Mat3) -> f32 {
        m[(1, 0)].atan2(m[(0, 0)]) * super::RAD_TO_DEG
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rect_edges_and_contains() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_relative_eq!(rect.right(), 110.0);
        assert_relative_eq!(rect.bottom(), 70.0);
        assert_relative_eq!(rect.center().x, 60.0);
        assert!(rect.contains(Vec2::new(10.0, 20.0)));
        assert!(!rect.contains(Vec2::new(110.0, 20.0)));
        assert!(Rect::new(0.0, 0.0, 0.0, 5.0).is_empty());
    }

    #[test]
    fn test_color_opacity_clamps() {
        let c = Color::rgba(1.0, 0.5, 0.25, 0.8).with_opacity(0.5);
        assert_relative_eq!(c.a, 0.4);
        assert_relative_eq!(Color::WHITE.with_opacity(2.0).a, 1.0);
    }

    #[test]
    fn test_affine_trs_roundtrip_components() {
        let m = affine::trs(Vec2::new(5.0, 6.0), 90.0, Vec2::new(2.0, 3.0));
        let scale = affine::extract_scale(&m);
        assert_relative_eq!(scale.x, 2.0, epsilon = 1e-5);
        assert_relative_eq!(scale.y, 3.0, epsilon = 1e-5);
        assert_relative_eq!(affine::extract_rotation(&m), 90.0, epsilon = 1e-4);

        let p = affine::transform_point(&m, Vec2::new(1.0, 0.0));
        assert_relative_eq!(p.x, 5.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 8.0, epsilon = 1e-5);
    }
}
