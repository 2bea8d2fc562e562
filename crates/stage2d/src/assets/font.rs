//! Font atlases
//!
//! Glyph rasterization belongs to the backend; the engine only needs stable
//! metrics to lay out labels and size buttons, so atlases carry fixed-advance
//! metrics derived from the pixel size.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::math::Vec2;

static NEXT_FONT_ID: AtomicU64 = AtomicU64::new(1);

/// Horizontal advance as a fraction of the pixel size
const ADVANCE_RATIO: f32 = 0.6;
/// Line height as a fraction of the pixel size
const LINE_HEIGHT_RATIO: f32 = 1.2;

/// Unique font identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(u64);

/// Font face at one pixel size
#[derive(Debug)]
pub struct FontAtlas {
    id: FontId,
    name: String,
    size: u32,
    advance: f32,
    line_height: f32,
}

impl FontAtlas {
    /// Create an atlas for `name` at `size` pixels
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        let pixels = size as f32;
        Self {
            id: FontId(NEXT_FONT_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            size,
            advance: pixels * ADVANCE_RATIO,
            line_height: pixels * LINE_HEIGHT_RATIO,
        }
    }

    /// Font id
    pub fn id(&self) -> FontId {
        self.id
    }

    /// Face name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pixel size
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Distance between consecutive lines
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Bounding size of `text`, honoring `\n`
    pub fn measure_text(&self, text: &str) -> Vec2 {
        if text.is_empty() {
            return Vec2::zeros();
        }
        let (lines, widest) = text
            .split('\n')
            .fold((0usize, 0usize), |(lines, widest), line| (lines + 1, widest.max(line.chars().count())));
        Vec2::new(widest as f32 * self.advance, lines as f32 * self.line_height)
    }
}
