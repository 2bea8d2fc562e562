//! Backend abstraction for the 2D renderer
//!
//! The engine never draws itself: it hands primitives to whatever implements
//! [`RenderBackend`]. Backends must be `Send` because in multi-threaded mode
//! the backend moves onto the render thread and comes back when it stops.

use crate::assets::{FontAtlas, Texture};
use crate::foundation::math::{Color, Mat4, Rect, Vec2};

/// Pixel viewport
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Viewport {
    /// Create a viewport
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering `width` x `height` from the origin
    pub const fn with_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }
}

/// Primitive drawing interface consumed by the engine
pub trait RenderBackend: Send {
    /// Start a frame, clearing to `clear_color`
    fn begin_frame(&mut self, clear_color: Color);

    /// Finish the frame (flush pending batches)
    fn end_frame(&mut self);

    /// Set the pixel viewport
    fn set_viewport(&mut self, viewport: Viewport);

    /// Set the view-projection matrix for subsequent draws
    fn set_view_projection(&mut self, matrix: &Mat4);

    /// Draw a solid rectangle
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw a rectangle outline
    fn draw_rect(&mut self, rect: Rect, color: Color, width: f32);

    /// Draw a line segment
    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32);

    /// Draw a textured quad
    #[allow(clippy::too_many_arguments)]
    fn draw_sprite(&mut self, texture: &Texture, dest: Rect, source: Rect, color: Color, rotation: f32, anchor: Vec2);

    /// Draw a text run
    fn draw_text(&mut self, font: &FontAtlas, text: &str, position: Vec2, color: Color);

    /// Open a sprite batch; consecutive sprites until [`RenderBackend::end_sprite_batch`] may be merged
    fn begin_sprite_batch(&mut self);

    /// Close the current sprite batch
    fn end_sprite_batch(&mut self);

    /// Backend name for logging
    fn name(&self) -> &str {
        "render backend"
    }
}
