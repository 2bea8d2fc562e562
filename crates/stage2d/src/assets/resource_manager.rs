//! Resource Manager - texture and font caching
//!
//! Resolves relative paths against the configured search paths, caches loaded
//! resources by key and hands out `Arc`s. Failed loads are logged and return
//! `None`, so a missing texture skips a sprite instead of stopping the loop.
//!
//! **Ownership**: the engine owns the manager on the main thread. Frames on
//! the render thread hold their own `Arc`s, and the engine only clears the
//! cache after the render thread has stopped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use super::{FontAtlas, Texture};

/// Resource Manager errors
#[derive(Debug, Error)]
pub enum ResourceError {
    /// No search path contains the file
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The file exists but could not be decoded
    #[error("Failed to decode {path}: {reason}")]
    Decode {
        /// Offending path or name
        path: String,
        /// Decoder message
        reason: String,
    },

    /// A font was requested at size zero
    #[error("Invalid font size {size} for '{name}'")]
    InvalidFontSize {
        /// Font name
        name: String,
        /// Requested size
        size: u32,
    },
}

/// Texture and font cache
#[derive(Debug, Default)]
pub struct ResourceManager {
    search_paths: Vec<PathBuf>,
    textures: HashMap<String, Arc<Texture>>,
    fonts: HashMap<(String, u32), Arc<FontAtlas>>,
}

impl ResourceManager {
    /// Create a manager searching `search_paths` in order
    pub fn new<P: Into<PathBuf>>(search_paths: impl IntoIterator<Item = P>) -> Self {
        Self {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Append a search path
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    /// Resolve `path`: absolute or existing paths as-is, else the first search path containing it
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let direct = Path::new(path);
        if direct.is_absolute() || direct.exists() {
            return direct.exists().then(|| direct.to_path_buf());
        }
        self.search_paths.iter().map(|dir| dir.join(path)).find(|candidate| candidate.exists())
    }

    /// Load (or fetch from cache) a texture, reporting failures
    pub fn try_load_texture(&mut self, path: &str) -> Result<Arc<Texture>, ResourceError> {
        if let Some(texture) = self.textures.get(path) {
            return Ok(Arc::clone(texture));
        }
        let resolved = self.resolve(path).ok_or_else(|| ResourceError::NotFound(path.to_string()))?;
        let texture = Arc::new(Texture::from_file(&resolved)?);
        self.textures.insert(path.to_string(), Arc::clone(&texture));
        Ok(texture)
    }

    /// Load (or fetch from cache) a texture; `None` on failure
    pub fn load_texture(&mut self, path: &str) -> Option<Arc<Texture>> {
        self.try_load_texture(path)
            .map_err(|e| log::warn!("Texture '{path}' unavailable: {e}"))
            .ok()
    }

    /// Create and cache a generated solid-color texture under `name`
    pub fn create_texture(&mut self, name: &str, width: u32, height: u32, color: [u8; 4]) -> Arc<Texture> {
        let texture = Arc::new(Texture::solid_color(name, width, height, color));
        if self.textures.insert(name.to_string(), Arc::clone(&texture)).is_some() {
            log::debug!("Replaced cached texture '{name}'");
        }
        texture
    }

    /// Cached texture by key, without loading
    pub fn texture(&self, key: &str) -> Option<Arc<Texture>> {
        self.textures.get(key).cloned()
    }

    /// Load (or fetch from cache) a font atlas; `None` on failure
    pub fn load_font(&mut self, name: &str, size: u32) -> Option<Arc<FontAtlas>> {
        if size == 0 {
            let e = ResourceError::InvalidFontSize {
                name: name.to_string(),
                size,
            };
            log::warn!("{e}");
            return None;
        }
        let font = self
            .fonts
            .entry((name.to_string(), size))
            .or_insert_with(|| {
                log::debug!("Created font atlas '{name}' @ {size}px");
                Arc::new(FontAtlas::new(name, size))
            });
        Some(Arc::clone(font))
    }

    /// Drop cache entries nothing else references; returns how many went
    pub fn purge_unused(&mut self) -> usize {
        let before = self.textures.len() + self.fonts.len();
        self.textures.retain(|_, texture| Arc::strong_count(texture) > 1);
        self.fonts.retain(|_, font| Arc::strong_count(font) > 1);
        let purged = before - (self.textures.len() + self.fonts.len());
        if purged > 0 {
            log::debug!("Purged {purged} unused resource(s)");
        }
        purged
    }

    /// Drop every cache entry
    pub fn clear(&mut self) {
        log::debug!("Clearing {} texture(s) and {} font(s)", self.textures.len(), self.fonts.len());
        self.textures.clear();
        self.fonts.clear();
    }

    /// Number of cached textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Number of cached fonts
    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("stage2d-assets-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_png_from_search_path() {
        let dir = temp_dir("png");
        image::RgbaImage::new(4, 2).save(dir.join("ship.png")).unwrap();

        let mut resources = ResourceManager::new([&dir]);
        let texture = resources.load_texture("ship.png").unwrap();
        assert_eq!((texture.width(), texture.height()), (4, 2));

        // Cached: same allocation.
        let again = resources.load_texture("ship.png").unwrap();
        assert!(Arc::ptr_eq(&texture, &again));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_texture_degrades_to_none() {
        let mut resources = ResourceManager::new(["does-not-exist"]);
        assert!(resources.load_texture("nope.png").is_none());
        assert!(matches!(resources.try_load_texture("nope.png"), Err(ResourceError::NotFound(_))));
    }

    #[test]
    fn test_fonts_cached_per_size() {
        let mut resources = ResourceManager::default();
        let a = resources.load_font("mono", 16).unwrap();
        let b = resources.load_font("mono", 16).unwrap();
        let c = resources.load_font("mono", 24).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert!(resources.load_font("mono", 0).is_none());
    }

    #[test]
    fn test_purge_unused_keeps_referenced() {
        let mut resources = ResourceManager::default();
        let kept = resources.create_texture("kept", 1, 1, [255; 4]);
        let _ = resources.create_texture("dropped", 1, 1, [0; 4]);
        let _font = resources.load_font("mono", 12);

        assert_eq!(resources.purge_unused(), 1);
        assert!(resources.texture("kept").is_some());
        assert!(resources.texture("dropped").is_none());
        drop(kept);
        assert_eq!(resources.purge_unused(), 1);
        assert_eq!(resources.font_count(), 1);
    }
}
