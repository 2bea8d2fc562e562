//! Window and graphics-context abstraction
//!
//! The window stays on the main thread and is not `Send`. What crosses to the
//! render thread is a [`GraphicsContext`]: a secondary context created on the
//! main thread that shares GPU resources with the window's own context and is
//! made current inside the worker.

use std::any::Any;

use thiserror::Error;

use super::RenderError;
use crate::input::{KeyCode, MouseButton};

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// Windowing system could not be initialized
    #[error("Window system initialization failed: {0}")]
    InitializationFailed(String),

    /// The window itself could not be created
    #[error("Window creation failed: {0}")]
    CreationFailed(String),

    /// A shared rendering context could not be created
    #[error("Shared context creation failed: {0}")]
    SharedContextFailed(String),
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// Platform-independent window event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowEvent {
    /// User asked to close the window
    Close,
    /// Client area resized
    Resized {
        /// New width in pixels
        width: u32,
        /// New height in pixels
        height: u32,
    },
    /// Key pressed or released
    Key {
        /// Key
        key: KeyCode,
        /// `true` on press
        pressed: bool,
    },
    /// Mouse button pressed or released
    MouseButton {
        /// Button
        button: MouseButton,
        /// `true` on press
        pressed: bool,
    },
    /// Cursor moved, in window pixels
    CursorMoved {
        /// X position
        x: f32,
        /// Y position
        y: f32,
    },
    /// Window gained (`true`) or lost focus
    Focus(bool),
}

/// Secondary graphics context owned by the render thread
pub trait GraphicsContext: Send {
    /// Bind the context to the calling thread
    fn make_current(&mut self);

    /// Load GPU function bindings; called once after [`GraphicsContext::make_current`]
    fn load_bindings(&mut self) -> Result<(), RenderError>;

    /// Present the finished frame
    fn swap_buffers(&mut self);

    /// Unbind the context from the calling thread
    fn release_current(&mut self);
}

/// Result of [`Window::create_shared_context`]
pub struct SharedContext {
    /// Context handed to the render thread
    pub context: Box<dyn GraphicsContext>,
    /// Native object backing the context; stays on the main thread and is
    /// destroyed only after the render thread has joined
    pub surface: Box<dyn Any>,
}

impl std::fmt::Debug for SharedContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedContext").finish_non_exhaustive()
    }
}

/// Main-thread window
pub trait Window {
    /// Client area size in pixels
    fn size(&self) -> (u32, u32);

    /// Whether the window has been asked to close
    fn should_close(&self) -> bool;

    /// Request (or cancel) closing
    fn set_should_close(&mut self, should_close: bool);

    /// Pump the platform queue and return the events since the last call
    fn poll_events(&mut self) -> Vec<WindowEvent>;

    /// Present the main context's back buffer
    fn swap_buffers(&mut self);

    /// Enable or disable vsync for the main context
    fn set_vsync(&mut self, enabled: bool);

    /// Create a context sharing GPU resources with this window's context.
    /// Must be called on the main thread; the window's own context stays current.
    fn create_shared_context(&mut self) -> WindowResult<SharedContext>;
}
