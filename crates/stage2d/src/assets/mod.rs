//! Asset management system

pub mod font;
pub mod resource_manager;
pub mod texture;

pub use font::{FontAtlas, FontId};
pub use resource_manager::{ResourceError, ResourceManager};
pub use texture::{Texture, TextureId};
