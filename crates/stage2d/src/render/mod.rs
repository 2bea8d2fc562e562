//! # Rendering
//!
//! Everything between the scene graph and the pixels: the camera, flattened
//! [`RenderCommand`]s, the [`RenderBackend`] trait that actually draws, and the
//! window/context abstraction the render thread needs.
//!
//! ## Architecture
//!
//! - **Camera**: 2D orthographic view-projection per scene
//! - **Commands**: owned draw instructions, safe to ship across threads
//! - **Executor**: the single path from commands to backend calls
//! - **Window / GraphicsContext**: main-thread window plus a shareable context
//! - **Headless / Recording**: display-less implementations for CI and tools

pub mod backend;
pub mod camera;
pub mod commands;
pub mod executor;
#[cfg(feature = "glfw")]
pub mod glfw_window;
pub mod headless;
pub mod recording;
pub mod window;

pub use backend::{RenderBackend, Viewport};
pub use camera::{Camera, CameraState};
pub use commands::{RenderCommand, SpriteCommand, TextCommand};
pub use executor::{execute_commands, execute_frame};
#[cfg(feature = "glfw")]
pub use glfw_window::GlfwWindow;
pub use headless::{HeadlessContext, HeadlessStats, HeadlessWindow};
pub use recording::{DrawCall, RecordingBackend, RecordingHandle};
pub use window::{GraphicsContext, SharedContext, Window, WindowError, WindowEvent, WindowResult};

use thiserror::Error;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// The shared rendering context could not be created
    #[error("Context creation failed: {0}")]
    ContextCreation(#[from] WindowError),

    /// GPU function bindings could not be loaded on the render thread
    #[error("GPU bindings unavailable: {0}")]
    BindingsUnavailable(String),

    /// The OS refused to spawn the render thread
    #[error("Failed to spawn render thread: {0}")]
    ThreadSpawn(#[from] std::io::Error),
}
