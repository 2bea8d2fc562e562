//! # Scene System
//!
//! Retained scene graph and scene lifecycle:
//!
//! - **Node tree**: arena of nodes with data-driven draw kinds and behaviors
//! - **Scene**: one node tree plus camera, listeners and an optional script
//! - **Transitions**: timed blends between two scenes
//! - **SceneManager**: the scene stack and its transition state machine

mod node;
#[allow(clippy::module_inception)]
mod scene;
mod scene_manager;
mod transition;

pub use node::{Behavior, ButtonStyle, Node, NodeFlags, NodeId, NodeKind, NodeTransform, NodeTree, UiState};
pub use scene::{Scene, SceneRef, SceneScript, SceneState};
pub use scene_manager::SceneManager;
pub use transition::{ease_in_out_quad, ease_out_quad, FlipAxis, SlideDirection, Transition, TransitionType};
