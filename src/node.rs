mod control;
mod spatial;

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::error;

use crate::component::{Component, ComponentUuid};

pub use crate::ident::NodeUuid;
pub use control::{AnchorPreset, Control, UnknownAnchorPresetError};
pub use spatial::{Node2D, Node3D};

/// Transform data a node carries, by node type.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum NodeKind {
	#[default]
	Node,
	Node2D(Node2D),
	Node3D(Node3D),
	Control(Control),
}

impl NodeKind {
	pub fn base_type_name(&self) -> &'static str {
		match self {
			NodeKind::Node => "Node",
			NodeKind::Node2D(_) => "Node2D",
			NodeKind::Node3D(_) => "Node3D",
			NodeKind::Control(_) => "Control",
		}
	}
}

/// Named hierarchical entity. Parent and children live in the owning [`NodeTree`].
///
/// [`NodeTree`]: crate::scene::tree::NodeTree
pub struct Node {
	pub uuid: NodeUuid,
	pub name: String,
	pub active: bool,
	pub visible: bool,
	pub kind: NodeKind,
	type_name: String,
	pub(crate) components: Vec<Box<dyn Component>>,
}

impl Node {
	pub fn new(name: &str) -> Self {
		Self::with_kind(name, NodeKind::Node)
	}

	pub fn new_2d(name: &str) -> Self {
		Self::with_kind(name, NodeKind::Node2D(Node2D::default()))
	}

	pub fn new_3d(name: &str) -> Self {
		Self::with_kind(name, NodeKind::Node3D(Node3D::default()))
	}

	pub fn new_control(name: &str) -> Self {
		Self::with_kind(name, NodeKind::Control(Control::default()))
	}

	pub fn with_kind(name: &str, kind: NodeKind) -> Self {
		Self {
			uuid: NodeUuid::new(),
			name: name.to_owned(),
			active: true,
			visible: true,
			kind,
			type_name: kind.base_type_name().to_owned(),
			components: Vec::new(),
		}
	}

	/// Stand-in left in an arena slot whose node was moved out.
	pub(crate) fn vacant() -> Self {
		Self {
			uuid: NodeUuid::nil(),
			name: String::new(),
			active: false,
			visible: false,
			kind: NodeKind::Node,
			type_name: String::new(),
			components: Vec::new(),
		}
	}

	/// Registered node type name; defaults to the name of the node kind.
	pub fn type_name(&self) -> &str {
		&self.type_name
	}

	/// For node types registered on top of the four built-in kinds.
	pub fn set_type_name(&mut self, type_name: &str) {
		self.type_name = type_name.to_owned();
	}

	pub fn as_2d(&self) -> Option<&Node2D> {
		match &self.kind {
			NodeKind::Node2D(n) => Some(n),
			_ => None,
		}
	}

	pub fn as_2d_mut(&mut self) -> Option<&mut Node2D> {
		match &mut self.kind {
			NodeKind::Node2D(n) => Some(n),
			_ => None,
		}
	}

	pub fn as_3d(&self) -> Option<&Node3D> {
		match &self.kind {
			NodeKind::Node3D(n) => Some(n),
			_ => None,
		}
	}

	pub fn as_3d_mut(&mut self) -> Option<&mut Node3D> {
		match &mut self.kind {
			NodeKind::Node3D(n) => Some(n),
			_ => None,
		}
	}

	pub fn as_control(&self) -> Option<&Control> {
		match &self.kind {
			NodeKind::Control(n) => Some(n),
			_ => None,
		}
	}

	pub fn as_control_mut(&mut self) -> Option<&mut Control> {
		match &mut self.kind {
			NodeKind::Control(n) => Some(n),
			_ => None,
		}
	}

	// components

	pub fn components(&self) -> &[Box<dyn Component>] {
		&self.components
	}

	/// Sets the owner, runs `on_awake` and appends.
	pub fn add_component(&mut self, mut component: Box<dyn Component>) -> ComponentUuid {
		component.base_mut().owner = Some(self.uuid);
		component.on_awake();
		let uuid = component.uuid();
		self.components.push(component);
		uuid
	}

	/// Runs `on_destroy`, clears the owner and hands the component back.
	pub fn remove_component(&mut self, uuid: ComponentUuid) -> Option<Box<dyn Component>> {
		let index = self.component_index(uuid)?;
		let mut component = self.components.remove(index);
		component.on_destroy();
		component.base_mut().owner = None;
		component.base_mut().ready = false;
		Some(component)
	}

	pub(crate) fn component_index(&self, uuid: ComponentUuid) -> Option<usize> {
		self.components.iter().position(|c| c.uuid() == uuid)
	}

	pub fn component(&self, uuid: ComponentUuid) -> Option<&dyn Component> {
		self.components.iter().find(|c| c.uuid() == uuid).map(|c| c.as_ref())
	}

	pub fn component_mut(&mut self, uuid: ComponentUuid) -> Option<&mut (dyn Component + 'static)> {
		self.components.iter_mut().find(|c| c.uuid() == uuid).map(|c| c.as_mut())
	}

	/// First component whose type name matches, ignoring ASCII case.
	pub fn component_by_type_name(&self, type_name: &str) -> Option<&dyn Component> {
		self.components
			.iter()
			.find(|c| c.type_name().eq_ignore_ascii_case(type_name))
			.map(|c| c.as_ref())
	}

	pub fn component_by_type_name_mut(&mut self, type_name: &str) -> Option<&mut (dyn Component + 'static)> {
		self.components
			.iter_mut()
			.find(|c| c.type_name().eq_ignore_ascii_case(type_name))
			.map(|c| c.as_mut())
	}

	pub fn get_component<T: Component>(&self) -> Option<&T> {
		self.components.iter().find_map(|c| c.downcast_ref::<T>())
	}

	pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
		self.components.iter_mut().find_map(|c| c.downcast_mut::<T>())
	}

	pub fn get_components<T: Component>(&self) -> impl Iterator<Item = &T> {
		self.components.iter().filter_map(|c| c.downcast_ref::<T>())
	}

	pub fn has_component<T: Component>(&self) -> bool {
		self.get_component::<T>().is_some()
	}

	/// Whether any export variable of any component was written since the last save.
	pub fn has_dirty_exports(&self) -> bool {
		self.components.iter().any(|c| c.exports().is_dirty())
	}

	pub(crate) fn mark_exports_clean(&mut self) {
		for component in &mut self.components {
			component.exports_mut().mark_clean();
		}
	}

	/// Destroys components last-added first. Panics in `on_destroy` are logged and swallowed.
	pub(crate) fn destroy_components(&mut self) {
		while let Some(mut component) = self.components.pop() {
			let res = catch_unwind(AssertUnwindSafe(|| component.on_destroy()));
			if res.is_err() {
				error!(
					"{} component {:?} on node {:?} panicked in on_destroy",
					component.type_name(),
					component.name(),
					self.name
				);
			}
			component.base_mut().owner = None;
		}
	}
}

impl Drop for Node {
	fn drop(&mut self) {
		self.destroy_components();
	}
}

impl std::fmt::Debug for Node {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Node")
			.field("uuid", &self.uuid)
			.field("name", &self.name)
			.field("type_name", &self.type_name)
			.field("active", &self.active)
			.field("visible", &self.visible)
			.field("kind", &self.kind)
			.field(
				"components",
				&self.components.iter().map(|c| c.type_name().to_owned()).collect::<Vec<_>>(),
			)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;
	use crate::component::testing::Probe;
	use crate::components::{Label, Sprite2D};

	#[test]
	fn add_component_sets_owner_and_awakes() {
		let log = Rc::new(RefCell::new(Vec::new()));
		let mut node = Node::new("N");
		let uuid = node.add_component(Box::new(Probe::new("a", &log)));

		assert_eq!(node.component(uuid).unwrap().owner(), Some(node.uuid));
		assert_eq!(*log.borrow(), ["a:awake"]);

		let removed = node.remove_component(uuid).unwrap();
		assert_eq!(removed.owner(), None);
		assert_eq!(*log.borrow(), ["a:awake", "a:destroy"]);
		assert!(node.components().is_empty());
	}

	#[test]
	fn typed_lookup_is_direct_only() {
		let mut node = Node::new_2d("N");
		node.add_component(Box::new(Sprite2D::default()));
		node.add_component(Box::new(Sprite2D::default()));

		assert!(node.get_component::<Sprite2D>().is_some());
		assert_eq!(node.get_components::<Sprite2D>().count(), 2);
		assert!(node.get_component::<Label>().is_none());
		assert!(node.component_by_type_name("sprite2d").is_some());
	}

	#[test]
	fn drop_destroys_components_in_reverse() {
		let log = Rc::new(RefCell::new(Vec::new()));
		{
			let mut node = Node::new("N");
			node.add_component(Box::new(Probe::new("first", &log)));
			node.add_component(Box::new(Probe::new("second", &log)));
		}
		assert_eq!(
			*log.borrow(),
			["first:awake", "second:awake", "second:destroy", "first:destroy"]
		);
	}
}
