mod lifecycle;
pub mod tree;

use std::path::PathBuf;

use crate::component::InputEvent;
use crate::config::RuntimeConfig;
use crate::node::{Node, NodeUuid};
use crate::resources::Services;

pub use crate::ident::SceneUuid;
use tree::{NodeKey, NodeTree, TreeError};

/// Root container: one node tree plus metadata and the collaborators its components use.
pub struct Scene {
	pub uuid: SceneUuid,
	pub name: String,
	/// File the scene was last loaded from or saved to.
	pub path: Option<PathBuf>,
	modified: bool,
	root: Option<NodeTree>,
	services: Services,
	config: RuntimeConfig,
}

impl Scene {
	pub fn new(name: &str) -> Self {
		Self::with_services(name, Services::default(), RuntimeConfig::default())
	}

	pub fn with_services(name: &str, services: Services, config: RuntimeConfig) -> Self {
		Self {
			uuid: SceneUuid::new(),
			name: name.to_owned(),
			path: None,
			modified: false,
			root: None,
			services,
			config,
		}
	}

	pub fn services(&self) -> &Services {
		&self.services
	}

	pub fn set_services(&mut self, services: Services) {
		self.services = services;
	}

	pub fn config(&self) -> &RuntimeConfig {
		&self.config
	}

	pub fn config_mut(&mut self) -> &mut RuntimeConfig {
		&mut self.config
	}

	// tree

	pub fn root(&self) -> Option<&NodeTree> {
		self.root.as_ref()
	}

	pub fn root_mut(&mut self) -> Option<&mut NodeTree> {
		self.root.as_mut()
	}

	/// Installs a new root and hands back the previous tree.
	pub fn set_root(&mut self, tree: NodeTree) -> Option<NodeTree> {
		self.modified = true;
		self.root.replace(tree)
	}

	/// Builds a root from a single node.
	pub fn create_root(&mut self, node: Node) -> NodeUuid {
		let uuid = node.uuid;
		self.set_root(NodeTree::new(node));
		uuid
	}

	pub fn take_root(&mut self) -> Option<NodeTree> {
		let old = self.root.take();
		if old.is_some() {
			self.modified = true;
		}
		old
	}

	pub fn root_uuid(&self) -> Option<NodeUuid> {
		self.root.as_ref().map(NodeTree::root_uuid)
	}

	/// Adds a node under `parent` and marks the scene modified.
	pub fn add_node(&mut self, parent: NodeUuid, node: Node) -> Result<NodeUuid, TreeError> {
		let tree = self.root.as_mut().ok_or(TreeError::NodeNotFound(parent))?;
		let uuid = tree.add_node(parent, node)?;
		self.modified = true;
		Ok(uuid)
	}

	/// Detaches a non-root node and marks the scene modified.
	pub fn remove_node(&mut self, uuid: NodeUuid) -> Option<NodeTree> {
		let removed = self.root.as_mut()?.detach(uuid)?;
		self.modified = true;
		Some(removed)
	}

	pub fn get_node(&self, uuid: NodeUuid) -> Option<&Node> {
		self.root.as_ref()?.get_node(uuid)
	}

	pub fn get_node_mut(&mut self, uuid: NodeUuid) -> Option<&mut Node> {
		self.root.as_mut()?.get_node_mut(uuid)
	}

	/// Looks a node up by uuid, by name, or by a string that may hold either.
	///
	/// A string that parses as a uuid of a node in the scene wins over a name match.
	pub fn find_node<'k>(&self, key: impl Into<NodeKey<'k>>) -> Option<NodeUuid> {
		let tree = self.root.as_ref()?;
		match key.into() {
			NodeKey::Name(text) => match NodeUuid::parse(text) {
				Ok(uuid) if tree.contains(uuid) => Some(uuid),
				_ => tree.find(text),
			},
			key => tree.find(key),
		}
	}

	/// Every node in pre-order, root first.
	pub fn all_nodes(&self) -> Vec<NodeUuid> {
		self.root.as_ref().map(NodeTree::all_node_uuids).unwrap_or_default()
	}

	// lifecycle

	pub fn on_enter(&mut self) {
		if let Some(tree) = self.root.as_mut() {
			tree.propagate_ready(&self.services, &self.config);
		}
	}

	pub fn on_update(&mut self, dt: f32) {
		if let Some(tree) = self.root.as_mut() {
			tree.propagate_update(&self.services, &self.config, dt);
		}
	}

	pub fn on_physics_process(&mut self, dt: f32) {
		if let Some(tree) = self.root.as_mut() {
			tree.propagate_physics(&self.services, &self.config, dt);
		}
	}

	pub fn on_input(&mut self, event: &InputEvent) {
		if let Some(tree) = self.root.as_mut() {
			tree.propagate_input(&self.services, &self.config, event);
		}
	}

	// modified state

	/// Set explicitly or by any export variable written since the last save.
	pub fn is_modified(&self) -> bool {
		self.modified || self.root.as_ref().map(NodeTree::has_dirty_exports).unwrap_or(false)
	}

	pub fn mark_modified(&mut self) {
		self.modified = true;
	}

	pub fn mark_saved(&mut self) {
		self.modified = false;
		if let Some(tree) = self.root.as_mut() {
			tree.mark_exports_clean();
		}
	}
}

impl std::fmt::Debug for Scene {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Scene")
			.field("uuid", &self.uuid)
			.field("name", &self.name)
			.field("path", &self.path)
			.field("modified", &self.modified)
			.field("root", &self.root)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::Sprite2D;
	use crate::value::PropertyValue;

	fn sample() -> (Scene, NodeUuid, NodeUuid) {
		let mut scene = Scene::new("Main");
		let root = scene.create_root(Node::new_2d("Root"));
		let player = scene.add_node(root, Node::new_2d("Player")).unwrap();
		scene.mark_saved();
		(scene, root, player)
	}

	#[test]
	fn find_node_by_any_key() {
		let (scene, root, player) = sample();
		assert_eq!(scene.find_node("Player"), Some(player));
		assert_eq!(scene.find_node(player), Some(player));
		assert_eq!(scene.find_node(player.to_string().as_str()), Some(player));
		assert_eq!(scene.find_node("Enemy"), None);
		assert_eq!(scene.all_nodes(), [root, player]);
	}

	#[test]
	fn export_writes_mark_modified() {
		let (mut scene, _, player) = sample();
		assert!(!scene.is_modified());

		let node = scene.get_node_mut(player).unwrap();
		let uuid = node.add_component(Box::new(Sprite2D::default()));
		scene.mark_saved();

		let component = scene.get_node_mut(player).unwrap().component_mut(uuid).unwrap();
		component
			.set_export("texture_path", PropertyValue::FilePath("t.png".to_owned()))
			.unwrap();
		assert!(scene.is_modified());

		scene.mark_saved();
		assert!(!scene.is_modified());
	}

	#[test]
	fn structure_edits_mark_modified() {
		let (mut scene, root, player) = sample();
		let removed = scene.remove_node(player).unwrap();
		assert!(scene.is_modified());
		assert_eq!(removed.root_uuid(), player);
		assert_eq!(scene.all_nodes(), [root]);
	}
}
