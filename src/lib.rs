pub mod animation;
pub mod audio;
pub mod component;
pub mod components;
pub mod config;
pub mod formats;
mod ident;
pub mod math;
pub mod node;
pub mod render;
pub mod resources;
pub mod scene;
pub mod tileset;
pub mod value;

pub use component::registry::{initialize_component_registry, registry};
pub use scene::Scene;

/// Version written to and expected in `.anim`, `.statemachine` and `.spriteanim` files.
pub const RESOURCE_FORMAT_VERSION: &str = "1.0";
