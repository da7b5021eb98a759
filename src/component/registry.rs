use indexmap::IndexMap;
use once_cell::sync::OnceCell;

use crate::components;
use crate::node::{Control, Node2D, Node3D, NodeKind};

use super::Component;

pub type ComponentFactory = fn() -> Box<dyn Component>;
pub type NodeFactory = fn() -> NodeKind;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
	#[error("Unknown component type {0:?}")]
	UnknownType(String),
	#[error("Component registry is already initialized")]
	AlreadyInitialized,
}

#[derive(Debug, Clone, Copy)]
pub struct ComponentInfo {
	pub type_name: &'static str,
	pub category: &'static str,
	pub description: &'static str,
	pub factory: ComponentFactory,
}

/// Type name to factory mapping for components and node types.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
	components: IndexMap<&'static str, ComponentInfo>,
	node_types: IndexMap<&'static str, NodeFactory>,
}

fn make<T: Component + Default>() -> Box<dyn Component> {
	Box::new(T::default())
}

impl ComponentRegistry {
	/// The four node kinds and the built-in component catalog.
	pub fn with_builtins() -> Self {
		let mut reg = Self::default();

		reg.register_node_type("Node", || NodeKind::Node);
		reg.register_node_type("Node2D", || NodeKind::Node2D(Node2D::default()));
		reg.register_node_type("Node3D", || NodeKind::Node3D(Node3D::default()));
		reg.register_node_type("Control", || NodeKind::Control(Control::default()));

		reg.register::<components::Sprite2D>("Sprite2D", "2D", "Draws a textured quad");
		reg.register::<components::AnimatedSprite2D>("AnimatedSprite2D", "2D", "Plays frame-based sprite animations");
		reg.register::<components::Camera2D>("Camera2D", "2D", "Orthographic view that can follow a node");
		reg.register::<components::Tilemap2D>("Tilemap2D", "2D", "Grid of tiles from a tileset");
		reg.register::<components::Label>("Label", "UI", "Draws text inside a control");
		reg.register::<components::Panel>("Panel", "UI", "Filled rectangle with an optional border");
		reg.register::<components::ColorRectangle>("ColorRectangle", "UI", "Solid colour rectangle");
		reg.register::<components::ProgressBar>("ProgressBar", "UI", "Horizontal or vertical fill gauge");
		reg.register::<components::TextureRectangle>("TextureRectangle", "UI", "Texture fitted to a control");
		reg.register::<components::NinePatchPanel>("NinePatchPanel", "UI", "Texture with stretchable centre and fixed borders");
		reg.register::<components::Animator>("Animator", "Animation", "Plays keyframed tween clips");
		reg.register::<components::StateAnimator>("StateAnimator", "Animation", "Layered state machine driving tween clips");
		reg.register::<components::AudioSource>("AudioSource", "Audio", "Plays an audio clip");

		reg
	}

	pub fn register<T: Component + Default>(&mut self, type_name: &'static str, category: &'static str, description: &'static str) {
		self.register_component(ComponentInfo {
			type_name,
			category,
			description,
			factory: make::<T>,
		});
	}

	/// A later registration under the same name replaces the earlier one.
	pub fn register_component(&mut self, info: ComponentInfo) {
		self.components.insert(info.type_name, info);
	}

	pub fn register_node_type(&mut self, type_name: &'static str, factory: NodeFactory) {
		self.node_types.insert(type_name, factory);
	}

	pub fn create_component(&self, type_name: &str) -> Result<Box<dyn Component>, RegistryError> {
		match self.components.get(type_name) {
			Some(info) => Ok((info.factory)()),
			None => Err(RegistryError::UnknownType(type_name.to_owned())),
		}
	}

	pub fn create_node_kind(&self, type_name: &str) -> Option<NodeKind> {
		self.node_types.get(type_name).map(|factory| factory())
	}

	pub fn info(&self, type_name: &str) -> Option<&ComponentInfo> {
		self.components.get(type_name)
	}

	pub fn is_registered(&self, type_name: &str) -> bool {
		self.components.contains_key(type_name)
	}

	pub fn component_types(&self) -> impl Iterator<Item = &ComponentInfo> {
		self.components.values()
	}

	pub fn node_types(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.node_types.keys().copied()
	}

	/// Distinct categories in registration order.
	pub fn categories(&self) -> Vec<&'static str> {
		let mut out = Vec::new();
		for info in self.components.values() {
			if !out.contains(&info.category) {
				out.push(info.category);
			}
		}
		out
	}

	pub fn components_in(&self, category: &str) -> impl Iterator<Item = &ComponentInfo> {
		let category = category.to_owned();
		self.components.values().filter(move |info| info.category == category)
	}
}

static REGISTRY: OnceCell<ComponentRegistry> = OnceCell::new();

/// Installs the process-wide registry with the built-in types.
///
/// Must run before any scene is loaded; a registry that was already read or installed
/// cannot be replaced.
pub fn initialize_component_registry() -> Result<(), RegistryError> {
	initialize_component_registry_with(|_| {})
}

/// Like [`initialize_component_registry`], letting the host add its own types first.
pub fn initialize_component_registry_with(extend: impl FnOnce(&mut ComponentRegistry)) -> Result<(), RegistryError> {
	let mut reg = ComponentRegistry::with_builtins();
	extend(&mut reg);
	REGISTRY.set(reg).map_err(|_| RegistryError::AlreadyInitialized)
}

/// The process-wide registry, built with the built-in types on first use.
pub fn registry() -> &'static ComponentRegistry {
	REGISTRY.get_or_init(ComponentRegistry::with_builtins)
}

pub fn create_component(type_name: &str) -> Result<Box<dyn Component>, RegistryError> {
	registry().create_component(type_name)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builtins_create_by_name() {
		let reg = ComponentRegistry::with_builtins();
		for info in reg.component_types() {
			let component = reg.create_component(info.type_name).unwrap();
			assert_eq!(component.type_name(), info.type_name);
			assert_eq!(component.category(), info.category);
		}
		assert_eq!(reg.categories(), ["2D", "UI", "Animation", "Audio"]);
	}

	#[test]
	fn unknown_type() {
		let reg = ComponentRegistry::with_builtins();
		assert_eq!(
			reg.create_component("Rigidbody").err(),
			Some(RegistryError::UnknownType("Rigidbody".to_owned()))
		);
		assert!(reg.create_node_kind("Node4D").is_none());
		assert!(matches!(reg.create_node_kind("Control"), Some(NodeKind::Control(_))));
	}

	#[test]
	fn fresh_instances_have_fresh_uuids() {
		let a = create_component("Sprite2D").unwrap();
		let b = create_component("Sprite2D").unwrap();
		assert_ne!(a.uuid(), b.uuid());
	}

	#[test]
	fn global_registry_installs_once() {
		let _ = initialize_component_registry();
		assert_eq!(initialize_component_registry(), Err(RegistryError::AlreadyInitialized));
		assert!(registry().is_registered("Label"));
	}
}
