//! # Application Configuration
//!
//! Top-level settings consumed by [`crate::Engine`]. The render section selects
//! the concurrency regime: `multi_threaded` hands frames to a dedicated render
//! thread, `vsync` and `fps_limit` decide whether the main loop paces itself.
//!
//! Every section is `#[serde(default)]`, so partial files only override what
//! they mention.

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};
use crate::foundation::math::Color;

/// Window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Window title
    pub title: String,
    /// Client area width in pixels
    pub width: u32,
    /// Client area height in pixels
    pub height: u32,
    /// Whether the window can be resized
    pub resizable: bool,
    /// Start in fullscreen
    pub fullscreen: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "stage2d application".to_string(),
            width: 800,
            height: 600,
            resizable: true,
            fullscreen: false,
        }
    }
}

/// Render pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Execute frames on a dedicated render thread
    pub multi_threaded: bool,
    /// Synchronize buffer swaps with the display
    pub vsync: bool,
    /// Frame-rate cap applied with a sleep when vsync is off (0 = uncapped)
    pub fps_limit: u32,
    /// Requested MSAA samples (0 = off)
    pub msaa_samples: u32,
    /// Clear color used when no scene is active
    pub clear_color: Color,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            multi_threaded: false,
            vsync: true,
            fps_limit: 0,
            msaa_samples: 0,
            clear_color: Color::BLACK,
        }
    }
}

/// Core loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Log filter passed to the logger (`"info"`, `"stage2d=debug"`, ...)
    pub log_level: String,
    /// Fixed simulation step in seconds; `None` disables fixed updates
    pub fixed_timestep: Option<f32>,
    /// Upper bound for a single frame delta, so a stall does not explode the simulation
    pub max_frame_delta: f32,
    /// Directories searched, in order, for relative asset paths
    pub asset_paths: Vec<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            fixed_timestep: None,
            max_frame_delta: 0.25,
            asset_paths: vec!["assets".to_string()],
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Window settings
    pub window: WindowSettings,
    /// Render pipeline settings
    pub render: RenderSettings,
    /// Core loop settings
    pub engine: EngineSettings,
}

impl AppConfig {
    /// Create a configuration with the given window title
    pub fn new(title: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.window.title = title.into();
        config
    }

    /// Set the window size
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Enable or disable the dedicated render thread
    #[must_use]
    pub fn with_multi_threaded(mut self, enabled: bool) -> Self {
        self.render.multi_threaded = enabled;
        self
    }

    /// Enable or disable vsync
    #[must_use]
    pub fn with_vsync(mut self, enabled: bool) -> Self {
        self.render.vsync = enabled;
        self
    }

    /// Set the frame-rate cap (0 = uncapped)
    #[must_use]
    pub fn with_fps_limit(mut self, fps: u32) -> Self {
        self.render.fps_limit = fps;
        self
    }

    /// Set the fixed simulation step
    #[must_use]
    pub fn with_fixed_timestep(mut self, step: f32) -> Self {
        self.engine.fixed_timestep = Some(step);
        self
    }

    /// Set the log filter
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.engine.log_level = level.into();
        self
    }

    /// Target frame duration when the loop paces itself, if it should
    pub fn frame_budget(&self) -> Option<std::time::Duration> {
        if self.render.vsync || self.render.fps_limit == 0 {
            return None;
        }
        Some(std::time::Duration::from_secs_f64(1.0 / f64::from(self.render.fps_limit)))
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if let Some(step) = self.engine.fixed_timestep {
            if step <= 0.0 || !step.is_finite() {
                return Err(ConfigError::Invalid(format!("fixed_timestep must be positive, got {step}")));
            }
        }
        if self.engine.max_frame_delta <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "max_frame_delta must be positive, got {}",
                self.engine.max_frame_delta
            )));
        }
        Ok(())
    }
}

impl Config for AppConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("stage2d-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_defaults_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.render.multi_threaded);
        assert!(config.frame_budget().is_none());
    }

    #[test]
    fn test_frame_budget_only_without_vsync() {
        let config = AppConfig::new("t").with_vsync(false).with_fps_limit(50);
        let budget = config.frame_budget().expect("pacing expected");
        assert_eq!(budget.as_millis(), 20);
        assert!(config.with_vsync(true).frame_budget().is_none());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(AppConfig::new("t").with_size(0, 10).validate().is_err());
        assert!(AppConfig::new("t").with_fixed_timestep(0.0).validate().is_err());
    }

    #[test]
    fn test_toml_partial_file_keeps_defaults() {
        let path = temp_path("partial.toml");
        std::fs::write(&path, "[render]\nmulti_threaded = true\nfps_limit = 30\n").unwrap();

        let config = AppConfig::load_from_file(&path).unwrap();
        assert!(config.render.multi_threaded);
        assert_eq!(config.render.fps_limit, 30);
        assert_eq!(config.window.width, 800);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_ron_save_and_load() {
        let path = temp_path("config.ron");
        let config = AppConfig::new("ron test").with_size(320, 240).with_fixed_timestep(0.02);
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.window.title, "ron test");
        assert_eq!(loaded.window.height, 240);
        assert_eq!(loaded.engine.fixed_timestep, Some(0.02));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unsupported_extension() {
        let err = AppConfig::default().save_to_file(temp_path("config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
