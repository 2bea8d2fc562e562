//! Textures
//!
//! CPU-side RGBA8 image plus a process-unique id. Backends key their GPU copy
//! by [`TextureId`]; the engine shares textures as `Arc<Texture>` so a frame
//! in flight on the render thread keeps its textures alive.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use super::ResourceError;

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique texture identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

impl TextureId {
    fn next() -> Self {
        Self(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Loaded image data ready for upload
pub struct Texture {
    id: TextureId,
    name: String,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Texture {
    /// Blank (transparent) texture of the given size
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self::solid_color(name, width, height, [0, 0, 0, 0])
    }

    /// Texture filled with a single RGBA color
    pub fn solid_color(name: impl Into<String>, width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            id: TextureId::next(),
            name: name.into(),
            width,
            height,
            pixels: color.repeat(pixel_count),
        }
    }

    /// Decode an image file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        log::debug!("Loading image from: {path:?}");

        let image = image::open(path).map_err(|e| ResourceError::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::info!("Loaded texture {width}x{height} from {path:?}");

        Ok(Self {
            id: TextureId::next(),
            name: path.display().to_string(),
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// Decode an in-memory image (embedded resources)
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, ResourceError> {
        let name = name.into();
        let image = image::load_from_memory(bytes).map_err(|e| ResourceError::Decode {
            path: name.clone(),
            reason: e.to_string(),
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self {
            id: TextureId::next(),
            name,
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// Texture id
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// Name or source path
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA8 pixel data
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Whether the texture has any pixels to draw
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        log::trace!("Releasing texture {:?} '{}'", self.id, self.name);
    }
}
