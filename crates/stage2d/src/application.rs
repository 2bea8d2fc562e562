//! Hooks a game or tool plugs into the engine loop

use crate::assets::ResourceError;
use crate::config::ConfigError;
use crate::engine::{Engine, EngineError};
use crate::render::WindowEvent;
use thiserror::Error;

/// Callbacks driven by [`Engine::run`]
pub trait Application {
    /// Called once before the first frame. Build the first scene, load
    /// assets and schedule timers here.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Called every frame that is not paused, before the scene manager
    /// updates.
    ///
    /// `delta_time` is in seconds, clamped to `max_frame_delta`.
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Fixed-step update
    ///
    /// Called zero or more times per frame with the configured
    /// `fixed_timestep`. Only used when a fixed step is configured.
    fn fixed_update(&mut self, _engine: &mut Engine, _step: f32) -> Result<(), AppError> {
        Ok(())
    }

    /// Handle a window event
    ///
    /// The default forwards to the engine, which feeds input, event listeners
    /// and the active scene.
    fn handle_event(&mut self, engine: &mut Engine, event: &WindowEvent) -> Result<(), AppError> {
        engine.handle_event(event);
        Ok(())
    }

    /// Called once after the loop ends and before the engine shuts down.
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Errors an application hook can return
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine call failed
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Anything else, described by the application
    #[error("Application error: {0}")]
    Custom(String),

    /// Asset loading error
    #[error("Asset error: {0}")]
    Asset(#[from] ResourceError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
