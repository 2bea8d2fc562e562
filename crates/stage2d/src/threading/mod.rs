//! Frame handoff between the main thread and the render thread

pub mod frame_data;
pub mod render_thread;

pub use frame_data::{FrameData, FrameDataBuffer};
pub use render_thread::{RenderThread, StartError};
