//! # 2D Camera
//!
//! Orthographic camera with position, rotation (degrees) and zoom. The
//! projection maps the viewport rectangle to clip space with y pointing down,
//! so scene coordinates match screen pixels at zoom 1.
//!
//! Transitions temporarily mutate position, zoom and rotation around a render
//! call; [`CameraState`] is the snapshot they save and restore.

use crate::foundation::math::{Mat4, Rect, Vec2, Vec3, Vec4, DEG_TO_RAD};

/// Snapshot of the mutable camera parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// Camera position
    pub position: Vec2,
    /// Rotation in degrees
    pub rotation: f32,
    /// Zoom factor
    pub zoom: f32,
}

/// 2D orthographic camera
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec2,
    rotation: f32,
    zoom: f32,
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    bounds: Option<Rect>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(-1.0, 1.0, -1.0, 1.0)
    }
}

impl Camera {
    /// Create a camera from explicit viewport edges
    pub fn new(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            zoom: 1.0,
            left,
            right,
            bottom,
            top,
            bounds: None,
        }
    }

    /// Create a pixel-space camera for a viewport of `width` x `height`
    /// (origin top-left, y down)
    pub fn for_viewport(width: f32, height: f32) -> Self {
        Self::new(0.0, width, height, 0.0)
    }

    /// Camera position
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Set the camera position
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        log::trace!("Camera position updated to: {position:?}");
    }

    /// Rotation in degrees
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Set the rotation in degrees
    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
    }

    /// Zoom factor (1 = pixels map one to one)
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set the zoom factor
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }

    /// Move the camera by an offset
    pub fn move_by(&mut self, offset: Vec2) {
        self.position += offset;
    }

    /// Center the camera on a world point
    pub fn look_at(&mut self, target: Vec2) {
        self.position = target;
    }

    /// Replace the viewport edges. Zero-width or zero-height extents are
    /// ignored and the previous viewport is kept.
    pub fn set_viewport(&mut self, left: f32, right: f32, bottom: f32, top: f32) {
        let (width, height) = (right - left, bottom - top);
        if !(width.is_finite() && height.is_finite()) || width.abs() <= f32::EPSILON || height.abs() <= f32::EPSILON {
            log::debug!("Camera: ignoring degenerate viewport {width}x{height}");
            return;
        }
        self.left = left;
        self.right = right;
        self.bottom = bottom;
        self.top = top;
    }

    /// Viewport as a rectangle (top-left origin)
    pub fn viewport(&self) -> Rect {
        Rect::new(self.left, self.top, self.right - self.left, self.bottom - self.top)
    }

    /// Save the mutable parameters
    pub fn state(&self) -> CameraState {
        CameraState {
            position: self.position,
            rotation: self.rotation,
            zoom: self.zoom,
        }
    }

    /// Restore parameters saved with [`Camera::state`]
    pub fn restore(&mut self, state: CameraState) {
        self.position = state.position;
        self.rotation = state.rotation;
        self.zoom = state.zoom;
    }

    /// Restrict the camera position to `bounds` (see [`Camera::clamp_to_bounds`])
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = Some(bounds);
    }

    /// Remove the position restriction
    pub fn clear_bounds(&mut self) {
        self.bounds = None;
    }

    /// Keep the visible area inside the bounds. If the visible area is larger
    /// than the bounds along an axis, the camera centers on the bounds instead.
    pub fn clamp_to_bounds(&mut self) {
        let Some(bounds) = self.bounds else {
            return;
        };
        let visible_width = (self.right - self.left) / self.zoom;
        let visible_height = (self.bottom - self.top) / self.zoom;

        let min_x = bounds.left() + visible_width * 0.5;
        let max_x = bounds.right() - visible_width * 0.5;
        let min_y = bounds.top() + visible_height * 0.5;
        let max_y = bounds.bottom() - visible_height * 0.5;

        let center = bounds.center();
        self.position.x = if min_x > max_x { center.x } else { self.position.x.clamp(min_x, max_x) };
        self.position.y = if min_y > max_y { center.y } else { self.position.y.clamp(min_y, max_y) };
    }

    /// View matrix: pan, then rotate and zoom around the viewport center
    pub fn view_matrix(&self) -> Mat4 {
        let center = Vec3::new((self.left + self.right) * 0.5, (self.top + self.bottom) * 0.5, 0.0);
        let pivot = Mat4::new_translation(&center);
        let unpivot = Mat4::new_translation(&-center);
        let rotation = Mat4::from_axis_angle(&Vec3::z_axis(), -self.rotation * DEG_TO_RAD);
        let zoom = Mat4::new_nonuniform_scaling(&Vec3::new(self.zoom, self.zoom, 1.0));
        let pan = Mat4::new_translation(&Vec3::new(-self.position.x, -self.position.y, 0.0));

        pivot * zoom * rotation * unpivot * pan
    }

    /// Orthographic projection of the viewport rectangle
    pub fn projection_matrix(&self) -> Mat4 {
        if (self.right - self.left).abs() <= f32::EPSILON || (self.bottom - self.top).abs() <= f32::EPSILON {
            return Mat4::identity();
        }
        Mat4::new_orthographic(self.left, self.right, self.bottom, self.top, -1.0, 1.0)
    }

    /// Combined projection * view
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Map a screen (viewport) point to world space
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let width = self.right - self.left;
        let height = self.bottom - self.top;
        let clip = Vec4::new(
            (screen.x - self.left) / width * 2.0 - 1.0,
            1.0 - (screen.y - self.top) / height * 2.0,
            0.0,
            1.0,
        );
        let inverse = self.view_projection().try_inverse().unwrap_or_else(Mat4::identity);
        let world = inverse * clip;
        Vec2::new(world.x, world.y)
    }

    /// Map a world point to screen (viewport) space
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let clip = self.view_projection() * Vec4::new(world.x, world.y, 0.0, 1.0);
        Vec2::new(
            (clip.x + 1.0) * 0.5 * (self.right - self.left) + self.left,
            (1.0 - clip.y) * 0.5 * (self.bottom - self.top) + self.top,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pixel_camera_maps_corners_to_clip_space() {
        let camera = Camera::for_viewport(800.0, 600.0);
        let vp = camera.view_projection();

        let top_left = vp * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(top_left.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(top_left.y, 1.0, epsilon = 1e-5);

        let bottom_right = vp * Vec4::new(800.0, 600.0, 0.0, 1.0);
        assert_relative_eq!(bottom_right.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(bottom_right.y, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_screen_world_roundtrip_with_pan_zoom_rotation() {
        let mut camera = Camera::for_viewport(800.0, 600.0);
        camera.set_position(Vec2::new(120.0, -40.0));
        camera.set_zoom(2.0);
        camera.set_rotation(30.0);

        let world = Vec2::new(333.0, 222.0);
        let back = camera.screen_to_world(camera.world_to_screen(world));
        assert_relative_eq!(back.x, world.x, epsilon = 1e-2);
        assert_relative_eq!(back.y, world.y, epsilon = 1e-2);
    }

    #[test]
    fn test_pan_shifts_screen_position() {
        let mut camera = Camera::for_viewport(800.0, 600.0);
        camera.set_position(Vec2::new(100.0, 0.0));
        let screen = camera.world_to_screen(Vec2::new(100.0, 50.0));
        assert_relative_eq!(screen.x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(screen.y, 50.0, epsilon = 1e-3);
    }

    #[test]
    fn test_state_save_restore() {
        let mut camera = Camera::for_viewport(100.0, 100.0);
        let saved = camera.state();
        camera.set_zoom(0.25);
        camera.set_rotation(90.0);
        camera.move_by(Vec2::new(5.0, 5.0));
        camera.restore(saved);
        assert_eq!(camera, Camera::for_viewport(100.0, 100.0));
    }

    #[test]
    fn test_clamp_to_bounds() {
        let mut camera = Camera::for_viewport(100.0, 100.0);
        camera.set_bounds(Rect::new(0.0, 0.0, 1000.0, 50.0));
        camera.set_position(Vec2::new(-500.0, 10.0));
        camera.clamp_to_bounds();
        assert_relative_eq!(camera.position().x, 50.0);
        // Visible height exceeds the bounds: centered.
        assert_relative_eq!(camera.position().y, 25.0);
    }

    #[test]
    fn test_degenerate_viewport_is_ignored() {
        let mut camera = Camera::for_viewport(640.0, 480.0);
        camera.set_viewport(0.0, 0.0, 0.0, 0.0);
        assert_eq!(camera.viewport(), Rect::new(0.0, 0.0, 640.0, 480.0));
        camera.set_viewport(0.0, 320.0, 0.0, 0.0);
        assert_eq!(camera.viewport(), Rect::new(0.0, 0.0, 640.0, 480.0));

        let collapsed = Camera::new(10.0, 10.0, 0.0, 0.0);
        assert_eq!(collapsed.projection_matrix(), Mat4::identity());
    }
}
