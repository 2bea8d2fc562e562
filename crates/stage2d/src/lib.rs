//! # stage2d
//!
//! A 2D scene-graph engine whose frames run either inline or on a dedicated
//! render thread.
//!
//! ## Features
//!
//! - **Scene graph**: arena-backed node tree with sprites, shapes, labels and buttons
//! - **Scene stack**: push/pop/replace with fade, slide, scale, flip and box transitions
//! - **Threaded rendering**: double-buffered frame data handed to a render thread
//!   that owns a shared graphics context, with fallback to inline rendering
//! - **Headless**: window, context and backend stand-ins for CI and tools
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stage2d::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let mut scene = Scene::new("title");
//!         scene.add_node(Node::rect(200.0, 80.0, Color::RED).at(400.0, 300.0));
//!         engine.enter_scene(scene.into_ref());
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::new("demo").with_multi_threaded(true);
//!     let window = HeadlessWindow::new(800, 600).close_after(120);
//!     let mut engine = Engine::new(config, Box::new(window), Box::new(RecordingBackend::new()))?;
//!     engine.run(&mut MyApp)?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::cast_precision_loss
)]

// Core engine modules
pub mod config;
pub mod core;

pub mod assets;
pub mod events;
pub mod foundation;
pub mod input;
pub mod render;
pub mod scene;
pub mod threading;

mod application;
mod engine;

pub use application::{AppError, Application};
pub use engine::{Engine, EngineError, RenderMode};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{FontAtlas, ResourceManager, Texture},
        core::{AppConfig, Config},
        events::{Event, EventType},
        foundation::{
            math::{Color, Rect, Size, Vec2},
            time::{Stopwatch, Timer},
        },
        input::{InputManager, KeyCode, MouseButton},
        render::{Camera, HeadlessWindow, RecordingBackend, RenderBackend, Window, WindowEvent},
        scene::{
            Behavior, ButtonStyle, FlipAxis, Node, NodeId, NodeKind, Scene, SceneManager, SceneRef, SceneScript,
            SlideDirection, Transition, TransitionType,
        },
        AppError, Application, Engine, EngineError, RenderMode,
    };
}
