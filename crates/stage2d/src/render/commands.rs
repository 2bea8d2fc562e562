//! Render commands
//!
//! Flattened, owned drawing instructions. The scene graph emits these into a
//! [`crate::threading::FrameData`]; the executor replays them against a
//! [`super::RenderBackend`]. Commands carry everything they need, resources
//! included (as `Arc` handles), so a frame can cross to the render thread
//! without referencing any scene object.

use std::sync::Arc;

use crate::assets::{FontAtlas, Texture};
use crate::foundation::math::{Color, Mat4, Rect, Vec2};

/// Textured quad
#[derive(Debug, Clone)]
pub struct SpriteCommand {
    /// Texture to sample
    pub texture: Arc<Texture>,
    /// Destination rectangle in world space
    pub dest: Rect,
    /// Source rectangle in texels
    pub source: Rect,
    /// Tint
    pub color: Color,
    /// Rotation in degrees around `anchor`
    pub rotation: f32,
    /// Normalized pivot inside `dest` (0,0 = top-left)
    pub anchor: Vec2,
}

impl SpriteCommand {
    /// Draw the whole texture into `dest`
    pub fn new(texture: Arc<Texture>, dest: Rect) -> Self {
        let source = Rect::new(0.0, 0.0, texture.width() as f32, texture.height() as f32);
        Self {
            texture,
            dest,
            source,
            color: Color::WHITE,
            rotation: 0.0,
            anchor: Vec2::new(0.5, 0.5),
        }
    }
}

/// Text run drawn with a font atlas
#[derive(Debug, Clone)]
pub struct TextCommand {
    /// Font to draw with
    pub font: Arc<FontAtlas>,
    /// UTF-8 text
    pub text: String,
    /// Top-left of the first glyph
    pub position: Vec2,
    /// Text color
    pub color: Color,
}

/// A single render instruction
#[derive(Debug, Clone)]
pub enum RenderCommand {
    /// Replace the active view-projection matrix for the commands that follow
    ViewProjection(Mat4),
    /// Textured quad
    Sprite(SpriteCommand),
    /// Solid rectangle
    FillRect {
        /// Rectangle
        rect: Rect,
        /// Fill color
        color: Color,
    },
    /// Rectangle outline
    StrokeRect {
        /// Rectangle
        rect: Rect,
        /// Stroke color
        color: Color,
        /// Stroke width
        width: f32,
    },
    /// Line segment
    Line {
        /// Start point
        from: Vec2,
        /// End point
        to: Vec2,
        /// Line color
        color: Color,
        /// Line width
        width: f32,
    },
    /// Text run
    Text(TextCommand),
}

impl RenderCommand {
    /// Solid rectangle
    pub fn fill_rect(rect: Rect, color: Color) -> Self {
        Self::FillRect { rect, color }
    }

    /// Rectangle outline
    pub fn stroke_rect(rect: Rect, color: Color, width: f32) -> Self {
        Self::StrokeRect { rect, color, width }
    }

    /// Line segment
    pub fn line(from: Vec2, to: Vec2, color: Color, width: f32) -> Self {
        Self::Line { from, to, color, width }
    }

    /// Text run
    pub fn text(font: Arc<FontAtlas>, text: impl Into<String>, position: Vec2, color: Color) -> Self {
        Self::Text(TextCommand {
            font,
            text: text.into(),
            position,
            color,
        })
    }

    /// Whether this command draws a sprite (and so belongs in a sprite batch)
    pub fn is_sprite(&self) -> bool {
        matches!(self, Self::Sprite(_))
    }

    /// Multiply the command's alpha by `opacity`
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        if opacity >= 1.0 {
            return self;
        }
        match &mut self {
            Self::ViewProjection(_) => {}
            Self::Sprite(sprite) => sprite.color = sprite.color.with_opacity(opacity),
            Self::Text(text) => text.color = text.color.with_opacity(opacity),
            Self::FillRect { color, .. } | Self::StrokeRect { color, .. } | Self::Line { color, .. } => {
                *color = color.with_opacity(opacity);
            }
        }
        self
    }
}
