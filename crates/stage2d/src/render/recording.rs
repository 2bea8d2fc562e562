//! Recording backend
//!
//! A [`RenderBackend`] that draws nothing and logs every call into a shared
//! list. The list outlives the backend (see [`RecordingBackend::handle`]),
//! so callers can inspect what the render thread executed after the backend
//! has moved onto it. Used by headless runs and tests.

use std::sync::{Arc, Mutex, PoisonError};

use super::{RenderBackend, Viewport};
use crate::assets::{FontAtlas, Texture, TextureId};
use crate::foundation::math::{Color, Mat4, Rect, Vec2};

/// One recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    /// `begin_frame`
    BeginFrame(Color),
    /// `end_frame`
    EndFrame,
    /// `set_viewport`
    Viewport(Viewport),
    /// `set_view_projection`
    ViewProjection(Mat4),
    /// `fill_rect`
    FillRect(Rect, Color),
    /// `draw_rect`
    StrokeRect(Rect, Color, f32),
    /// `draw_line`
    Line(Vec2, Vec2, Color),
    /// `draw_sprite`
    Sprite {
        /// Texture drawn
        texture: TextureId,
        /// Destination rectangle
        dest: Rect,
        /// Tint
        color: Color,
    },
    /// `draw_text`
    Text {
        /// Text drawn
        text: String,
        /// Position
        position: Vec2,
        /// Color
        color: Color,
    },
    /// `begin_sprite_batch`
    BeginBatch,
    /// `end_sprite_batch`
    EndBatch,
}

impl DrawCall {
    /// Short name of the call
    pub fn label(&self) -> &'static str {
        match self {
            Self::BeginFrame(_) => "begin_frame",
            Self::EndFrame => "end_frame",
            Self::Viewport(_) => "viewport",
            Self::ViewProjection(_) => "view_projection",
            Self::FillRect(..) => "fill_rect",
            Self::StrokeRect(..) => "stroke_rect",
            Self::Line(..) => "line",
            Self::Sprite { .. } => "sprite",
            Self::Text { .. } => "text",
            Self::BeginBatch => "begin_batch",
            Self::EndBatch => "end_batch",
        }
    }
}

/// Shared view of the calls a [`RecordingBackend`] has seen
#[derive(Debug, Clone, Default)]
pub struct RecordingHandle {
    calls: Arc<Mutex<Vec<DrawCall>>>,
}

impl RecordingHandle {
    fn push(&self, call: DrawCall) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(call);
    }

    /// Copy of every call recorded so far
    pub fn snapshot(&self) -> Vec<DrawCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Drain the recorded calls
    pub fn take(&self) -> Vec<DrawCall> {
        std::mem::take(&mut *self.calls.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of recorded calls
    pub fn len(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of completed frames
    pub fn frames(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| matches!(call, DrawCall::EndFrame))
            .count()
    }

    /// Clear colors of every frame begun, in order
    pub fn clear_colors(&self) -> Vec<Color> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(|call| match call {
                DrawCall::BeginFrame(color) => Some(*color),
                _ => None,
            })
            .collect()
    }
}

/// Backend that records calls instead of drawing
#[derive(Debug, Default)]
pub struct RecordingBackend {
    handle: RecordingHandle,
    batch_depth: u32,
}

impl RecordingBackend {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle onto the call list, valid after the backend is moved or dropped
    pub fn handle(&self) -> RecordingHandle {
        self.handle.clone()
    }
}

impl RenderBackend for RecordingBackend {
    fn begin_frame(&mut self, clear_color: Color) {
        log::trace!("begin_frame clear={clear_color:?}");
        self.handle.push(DrawCall::BeginFrame(clear_color));
    }

    fn end_frame(&mut self) {
        if self.batch_depth > 0 {
            log::warn!("Frame ended with {} open sprite batch(es)", self.batch_depth);
            self.batch_depth = 0;
        }
        self.handle.push(DrawCall::EndFrame);
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.handle.push(DrawCall::Viewport(viewport));
    }

    fn set_view_projection(&mut self, matrix: &Mat4) {
        self.handle.push(DrawCall::ViewProjection(*matrix));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.handle.push(DrawCall::FillRect(rect, color));
    }

    fn draw_rect(&mut self, rect: Rect, color: Color, width: f32) {
        self.handle.push(DrawCall::StrokeRect(rect, color, width));
    }

    fn draw_line(&mut self, from: Vec2, to: Vec2, color: Color, _width: f32) {
        self.handle.push(DrawCall::Line(from, to, color));
    }

    fn draw_sprite(&mut self, texture: &Texture, dest: Rect, _source: Rect, color: Color, _rotation: f32, _anchor: Vec2) {
        self.handle.push(DrawCall::Sprite {
            texture: texture.id(),
            dest,
            color,
        });
    }

    fn draw_text(&mut self, _font: &FontAtlas, text: &str, position: Vec2, color: Color) {
        self.handle.push(DrawCall::Text {
            text: text.to_string(),
            position,
            color,
        });
    }

    fn begin_sprite_batch(&mut self) {
        self.batch_depth += 1;
        self.handle.push(DrawCall::BeginBatch);
    }

    fn end_sprite_batch(&mut self) {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        self.handle.push(DrawCall::EndBatch);
    }

    fn name(&self) -> &str {
        "recording"
    }
}
