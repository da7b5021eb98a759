use std::collections::HashMap;
use std::fmt::Display;

use glam::{Mat3, Mat4, Quat, Vec2, Vec3};
use indextree::{Arena, NodeId};
use tracing::warn;

use crate::component::registry::registry;
use crate::math::rect::Rect;
use crate::math::transform::{Transform2D, Transform3D};
use crate::node::{Node, NodeKind, NodeUuid};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TreeError {
	#[error("Node {0} is not in the tree")]
	NodeNotFound(NodeUuid),
	#[error("Node {0} is already in the tree")]
	DuplicateUuid(NodeUuid),
	#[error("Moving node {node} under {new_parent} would create a cycle")]
	WouldCreateCycle { node: NodeUuid, new_parent: NodeUuid },
	#[error("The root node cannot be moved")]
	CannotMoveRoot,
}

/// Either way of naming a node in lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKey<'a> {
	Uuid(NodeUuid),
	Name(&'a str),
}

impl From<NodeUuid> for NodeKey<'_> {
	fn from(uuid: NodeUuid) -> Self {
		NodeKey::Uuid(uuid)
	}
}

impl<'a> From<&'a str> for NodeKey<'a> {
	fn from(name: &'a str) -> Self {
		NodeKey::Name(name)
	}
}

impl NodeKey<'_> {
	fn matches(&self, node: &Node) -> bool {
		match self {
			NodeKey::Uuid(uuid) => node.uuid == *uuid,
			NodeKey::Name(name) => node.name == *name,
		}
	}
}

/// A rooted tree of nodes.
///
/// Parents own children through the arena; a subtree detached from a tree is a tree of its
/// own, so ownership moves by moving `NodeTree` values.
#[derive(Debug)]
pub struct NodeTree {
	root: NodeId,
	arena: Arena<Node>,
	uuids: HashMap<NodeUuid, NodeId>,
}

impl NodeTree {
	pub fn new(root: Node) -> Self {
		let mut arena = Arena::new();
		let uuid = root.uuid;
		let root = arena.new_node(root);
		Self {
			root,
			arena,
			uuids: HashMap::from([(uuid, root)]),
		}
	}

	fn node_id(&self, uuid: NodeUuid) -> Option<NodeId> {
		self.uuids.get(&uuid).copied()
	}

	fn node_at(&self, id: NodeId) -> &Node {
		self.arena[id].get()
	}

	pub fn root_uuid(&self) -> NodeUuid {
		self.node_at(self.root).uuid
	}

	pub fn root(&self) -> &Node {
		self.node_at(self.root)
	}

	pub fn root_mut(&mut self) -> &mut Node {
		self.arena[self.root].get_mut()
	}

	pub fn contains(&self, uuid: NodeUuid) -> bool {
		self.uuids.contains_key(&uuid)
	}

	pub fn len(&self) -> usize {
		self.uuids.len()
	}

	pub fn is_empty(&self) -> bool {
		self.uuids.is_empty()
	}

	pub fn get_node(&self, uuid: NodeUuid) -> Option<&Node> {
		Some(self.node_at(self.node_id(uuid)?))
	}

	pub fn get_node_mut(&mut self, uuid: NodeUuid) -> Option<&mut Node> {
		let id = self.node_id(uuid)?;
		Some(self.arena[id].get_mut())
	}

	pub fn get_parent(&self, uuid: NodeUuid) -> Option<&Node> {
		let id = self.node_id(uuid)?;
		Some(self.node_at(self.arena[id].parent()?))
	}

	pub fn parent_uuid(&self, uuid: NodeUuid) -> Option<NodeUuid> {
		self.get_parent(uuid).map(|n| n.uuid)
	}

	/// Direct children in insertion order; empty for an unknown node.
	pub fn children_uuids(&self, uuid: NodeUuid) -> Vec<NodeUuid> {
		match self.node_id(uuid) {
			Some(id) => id.children(&self.arena).map(|c| self.node_at(c).uuid).collect(),
			None => Vec::new(),
		}
	}

	pub fn children(&self, uuid: NodeUuid) -> impl Iterator<Item = &Node> {
		self.node_id(uuid)
			.into_iter()
			.flat_map(move |id| id.children(&self.arena))
			.map(move |c| self.node_at(c))
	}

	/// Every node of the subtree at `uuid` in pre-order, `uuid` first.
	pub fn descendants(&self, uuid: NodeUuid) -> Vec<NodeUuid> {
		match self.node_id(uuid) {
			Some(id) => id.descendants(&self.arena).map(|d| self.node_at(d).uuid).collect(),
			None => Vec::new(),
		}
	}

	/// All nodes in pre-order.
	pub fn all_node_uuids(&self) -> Vec<NodeUuid> {
		self.descendants(self.root_uuid())
	}

	/// From the parent of `uuid` up to the root.
	pub fn ancestors(&self, uuid: NodeUuid) -> Vec<NodeUuid> {
		match self.node_id(uuid) {
			Some(id) => id.ancestors(&self.arena).skip(1).map(|a| self.node_at(a).uuid).collect(),
			None => Vec::new(),
		}
	}

	// structure edits

	/// Moves every node of `subtree` under `parent`, after its existing children.
	///
	/// `subtree` is detached by construction: nodes leave a tree only through
	/// [`remove_child`](Self::remove_child) or [`detach`](Self::detach).
	pub fn add_child(&mut self, parent: NodeUuid, mut subtree: NodeTree) -> Result<NodeUuid, TreeError> {
		let parent_id = self.node_id(parent).ok_or(TreeError::NodeNotFound(parent))?;
		if let Some(dup) = subtree.uuids.keys().find(|uuid| self.uuids.contains_key(uuid)) {
			return Err(TreeError::DuplicateUuid(*dup));
		}

		let child_uuid = subtree.root_uuid();
		let order: Vec<NodeId> = subtree.root.descendants(&subtree.arena).collect();
		let mut mapping = HashMap::with_capacity(order.len());

		for old_id in order {
			let old_parent = subtree.arena[old_id].parent();
			let node = std::mem::replace(subtree.arena[old_id].get_mut(), Node::vacant());
			let uuid = node.uuid;
			let new_id = self.arena.new_node(node);
			let new_parent = old_parent
				.and_then(|p| mapping.get(&p).copied())
				.unwrap_or(parent_id);
			new_parent.append(new_id, &mut self.arena);
			self.uuids.insert(uuid, new_id);
			mapping.insert(old_id, new_id);
		}
		subtree.uuids.clear();

		Ok(child_uuid)
	}

	/// Convenience for a single fresh node.
	pub fn add_node(&mut self, parent: NodeUuid, node: Node) -> Result<NodeUuid, TreeError> {
		self.add_child(parent, NodeTree::new(node))
	}

	/// Detaches a direct child of `parent` and hands its subtree back.
	pub fn remove_child(&mut self, parent: NodeUuid, child: NodeUuid) -> Option<NodeTree> {
		if self.parent_uuid(child)? != parent {
			return None;
		}
		self.detach(child)
	}

	/// Detaches any non-root node with its subtree.
	pub fn detach(&mut self, uuid: NodeUuid) -> Option<NodeTree> {
		let id = self.node_id(uuid)?;
		if id == self.root {
			return None;
		}

		let order: Vec<NodeId> = id.descendants(&self.arena).collect();
		let top = std::mem::replace(self.arena[id].get_mut(), Node::vacant());
		self.uuids.remove(&top.uuid);

		let mut out = NodeTree::new(top);
		let mut mapping = HashMap::from([(id, out.root)]);
		for old_id in order.into_iter().skip(1) {
			let old_parent = self.arena[old_id].parent();
			let node = std::mem::replace(self.arena[old_id].get_mut(), Node::vacant());
			let node_uuid = node.uuid;
			self.uuids.remove(&node_uuid);

			let new_id = out.arena.new_node(node);
			if let Some(p) = old_parent.and_then(|p| mapping.get(&p).copied()) {
				p.append(new_id, &mut out.arena);
			}
			out.uuids.insert(node_uuid, new_id);
			mapping.insert(old_id, new_id);
		}

		id.remove_subtree(&mut self.arena);
		Some(out)
	}

	/// Reparents a node within this tree, keeping its subtree.
	pub fn move_child(&mut self, uuid: NodeUuid, new_parent: NodeUuid) -> Result<(), TreeError> {
		let id = self.node_id(uuid).ok_or(TreeError::NodeNotFound(uuid))?;
		let parent_id = self.node_id(new_parent).ok_or(TreeError::NodeNotFound(new_parent))?;
		if id == self.root {
			return Err(TreeError::CannotMoveRoot);
		}
		if parent_id.ancestors(&self.arena).any(|a| a == id) {
			return Err(TreeError::WouldCreateCycle { node: uuid, new_parent });
		}

		id.detach(&mut self.arena);
		parent_id.append(id, &mut self.arena);
		Ok(())
	}

	// lookups

	/// Searches the children of `parent`, pre-order when `recursive`.
	pub fn find_child<'k>(&self, parent: NodeUuid, key: impl Into<NodeKey<'k>>, recursive: bool) -> Option<NodeUuid> {
		let key = key.into();
		let id = self.node_id(parent)?;
		if recursive {
			id.descendants(&self.arena)
				.skip(1)
				.map(|d| self.node_at(d))
				.find(|n| key.matches(n))
				.map(|n| n.uuid)
		} else {
			id.children(&self.arena)
				.map(|c| self.node_at(c))
				.find(|n| key.matches(n))
				.map(|n| n.uuid)
		}
	}

	/// Searches the whole tree, root included, in pre-order.
	pub fn find<'k>(&self, key: impl Into<NodeKey<'k>>) -> Option<NodeUuid> {
		let key = key.into();
		if let NodeKey::Uuid(uuid) = key {
			return self.contains(uuid).then_some(uuid);
		}
		self.root
			.descendants(&self.arena)
			.map(|d| self.node_at(d))
			.find(|n| key.matches(n))
			.map(|n| n.uuid)
	}

	/// Resolves a `/`-separated name path from the root.
	///
	/// Empty segments are skipped and a leading segment equal to the root name is consumed.
	/// Each remaining segment picks the first direct child with that name.
	pub fn resolve_path(&self, path: &str) -> Option<NodeUuid> {
		let mut segments = path.split('/').filter(|s| !s.is_empty()).peekable();
		if segments.peek() == Some(&self.root().name.as_str()) {
			segments.next();
		}

		let mut current = self.root;
		for segment in segments {
			current = current
				.children(&self.arena)
				.find(|c| self.node_at(*c).name == segment)?;
		}
		Some(self.node_at(current).uuid)
	}

	/// Name path from the root, the inverse of [`resolve_path`](Self::resolve_path).
	pub fn path_of(&self, uuid: NodeUuid) -> Option<String> {
		let id = self.node_id(uuid)?;
		let mut names: Vec<&str> = id.ancestors(&self.arena).map(|a| self.node_at(a).name.as_str()).collect();
		names.reverse();
		Some(format!("/{}", names.join("/")))
	}

	// duplication

	/// Deep copy of the subtree at `uuid` with fresh identifiers.
	///
	/// Components are rebuilt through the registry by type name and get every export
	/// variable copied over. The name suffix only applies to the copied top node.
	pub fn duplicate(&self, uuid: NodeUuid, name_suffix: &str) -> Option<NodeTree> {
		let id = self.node_id(uuid)?;
		let mut top = self.duplicate_node(self.node_at(id));
		top.name.push_str(name_suffix);

		let mut out = NodeTree::new(top);
		let mut mapping = HashMap::from([(id, out.root)]);
		for old_id in id.descendants(&self.arena).skip(1) {
			let node = self.duplicate_node(self.node_at(old_id));
			let node_uuid = node.uuid;
			let new_id = out.arena.new_node(node);
			if let Some(p) = self.arena[old_id].parent().and_then(|p| mapping.get(&p).copied()) {
				p.append(new_id, &mut out.arena);
			}
			out.uuids.insert(node_uuid, new_id);
			mapping.insert(old_id, new_id);
		}
		Some(out)
	}

	fn duplicate_node(&self, source: &Node) -> Node {
		let mut node = Node::with_kind(&source.name, source.kind);
		node.set_type_name(source.type_name());
		node.active = source.active;
		node.visible = source.visible;

		for component in source.components() {
			let mut copy = match registry().create_component(component.type_name()) {
				Ok(copy) => copy,
				Err(e) => {
					warn!("Cannot duplicate component {:?}: {}", component.name(), e);
					continue;
				}
			};
			copy.base_mut().name = component.name().to_owned();
			copy.base_mut().active = component.is_active();
			for var in component.exports().iter() {
				if copy.exports().contains(&var.name) {
					if let Err(e) = copy.exports_mut().set(&var.name, var.value.clone()) {
						warn!("{}", e);
					}
				} else {
					copy.exports_mut().insert(var.clone());
				}
			}
			copy.update_from_export_variables();
			node.add_component(copy);
		}
		node
	}

	// spatial queries

	/// Composes the local matrices of the Node2D chain up to the root.
	/// Other node kinds contribute identity.
	pub fn global_matrix_2d(&self, uuid: NodeUuid) -> Mat3 {
		let Some(id) = self.node_id(uuid) else {
			return Mat3::IDENTITY;
		};
		id.ancestors(&self.arena)
			.filter_map(|a| self.node_at(a).as_2d().map(|n| n.local_matrix()))
			.fold(Mat3::IDENTITY, |acc, parent| parent * acc)
	}

	pub fn global_transform_2d(&self, uuid: NodeUuid) -> Transform2D {
		Transform2D::from_mat3(self.global_matrix_2d(uuid))
	}

	pub fn global_position_2d(&self, uuid: NodeUuid) -> Vec2 {
		self.global_transform_2d(uuid).translation
	}

	pub fn global_rotation_2d(&self, uuid: NodeUuid) -> f32 {
		self.global_transform_2d(uuid).rotation
	}

	pub fn global_scale_2d(&self, uuid: NodeUuid) -> Vec2 {
		self.global_transform_2d(uuid).scale
	}

	pub fn global_matrix_3d(&self, uuid: NodeUuid) -> Mat4 {
		let Some(id) = self.node_id(uuid) else {
			return Mat4::IDENTITY;
		};
		id.ancestors(&self.arena)
			.filter_map(|a| self.node_at(a).as_3d().map(|n| n.local_matrix()))
			.fold(Mat4::IDENTITY, |acc, parent| parent * acc)
	}

	pub fn global_position_3d(&self, uuid: NodeUuid) -> Vec3 {
		Transform3D::from_mat4(self.global_matrix_3d(uuid)).translation
	}

	pub fn global_rotation_3d(&self, uuid: NodeUuid) -> Quat {
		Transform3D::from_mat4(self.global_matrix_3d(uuid)).rotation
	}

	/// Screen rectangle of a Control, resolved against the nearest Control ancestor or the
	/// screen when there is none.
	pub fn control_global_rect(&self, uuid: NodeUuid, screen_size: Vec2) -> Option<Rect> {
		let id = self.node_id(uuid)?;
		let control = self.node_at(id).as_control()?;

		let parent_rect = id
			.ancestors(&self.arena)
			.skip(1)
			.find(|a| self.node_at(*a).as_control().is_some())
			.and_then(|a| self.control_global_rect(self.node_at(a).uuid, screen_size))
			.unwrap_or(Rect::new(Vec2::ZERO, screen_size));

		Some(control.rect_in(parent_rect))
	}

	pub fn control_contains_point(&self, uuid: NodeUuid, screen_size: Vec2, point: Vec2) -> bool {
		self.control_global_rect(uuid, screen_size)
			.map(|rect| rect.contains_point(point))
			.unwrap_or(false)
	}

	// state

	pub fn has_dirty_exports(&self) -> bool {
		self.uuids.values().any(|id| self.node_at(*id).has_dirty_exports())
	}

	pub(crate) fn mark_exports_clean(&mut self) {
		let ids: Vec<NodeId> = self.uuids.values().copied().collect();
		for id in ids {
			self.arena[id].get_mut().mark_exports_clean();
		}
	}

	pub(crate) fn arena(&self) -> &Arena<Node> {
		&self.arena
	}

	pub(crate) fn root_id(&self) -> NodeId {
		self.root
	}
}

impl Drop for NodeTree {
	/// Tears down in pre-order so a node's components go before its children.
	fn drop(&mut self) {
		let order: Vec<NodeId> = self.root.descendants(&self.arena).collect();
		for id in order {
			if let Some(node) = self.arena.get_mut(id) {
				node.get_mut().destroy_components();
			}
		}
	}
}

fn type_label(node: &Node) -> String {
	match node.kind {
		NodeKind::Node => node.type_name().to_owned(),
		_ if node.type_name() == node.kind.base_type_name() => node.type_name().to_owned(),
		_ => format!("{}: {}", node.type_name(), node.kind.base_type_name()),
	}
}

fn rec_fmt(indent: usize, f: &mut std::fmt::Formatter<'_>, node_id: NodeId, arena: &Arena<Node>) -> std::fmt::Result {
	let Some(node) = arena.get(node_id) else {
		return Ok(());
	};

	let node = node.get();

	let type_name = type_label(node);
	#[cfg(feature = "owo")]
	let type_name = {
		use owo_colors::OwoColorize;
		type_name.magenta().to_string()
	};

	write!(f, "{}- [{}] {}", "  ".repeat(indent), type_name, node.name)?;
	if !node.components().is_empty() {
		let names: Vec<&str> = node.components().iter().map(|c| c.type_name()).collect();
		write!(f, " ({})", names.join(", "))?;
	}
	writeln!(f)?;

	for child in node_id.children(arena) {
		rec_fmt(indent + 1, f, child, arena)?;
	}

	Ok(())
}

impl Display for NodeTree {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		rec_fmt(0, f, self.root, &self.arena)
	}
}

#[cfg(test)]
mod tests {
	mod structure {
		use std::cell::RefCell;
		use std::rc::Rc;

		use super::super::*;
		use crate::component::testing::Probe;

		fn sample() -> (NodeTree, NodeUuid, NodeUuid, NodeUuid) {
			let mut tree = NodeTree::new(Node::new_2d("Root"));
			let root = tree.root_uuid();
			let a = tree.add_node(root, Node::new_2d("A")).unwrap();
			let b = tree.add_node(root, Node::new("B")).unwrap();
			let c = tree.add_node(a, Node::new("C")).unwrap();
			(tree, a, b, c)
		}

		#[test]
		fn children_keep_insertion_order() {
			let (tree, a, b, c) = sample();
			assert_eq!(tree.children_uuids(tree.root_uuid()), [a, b]);
			assert_eq!(tree.all_node_uuids(), [tree.root_uuid(), a, c, b]);
			assert_eq!(tree.parent_uuid(c), Some(a));
			assert_eq!(tree.parent_uuid(tree.root_uuid()), None);
		}

		#[test]
		fn remove_child_hands_back_subtree() {
			let (mut tree, a, b, c) = sample();
			let root = tree.root_uuid();

			assert!(tree.remove_child(b, a).is_none());
			let sub = tree.remove_child(root, a).unwrap();

			assert_eq!(sub.root_uuid(), a);
			assert_eq!(sub.children_uuids(a), [c]);
			assert_eq!(sub.parent_uuid(a), None);
			assert!(!tree.contains(a) && !tree.contains(c));
			assert_eq!(tree.children_uuids(root), [b]);

			tree.add_child(b, sub).unwrap();
			assert_eq!(tree.parent_uuid(a), Some(b));
			assert_eq!(tree.parent_uuid(c), Some(a));
		}

		#[test]
		fn duplicate_uuids_are_refused() {
			let (mut tree, a, _, _) = sample();
			let copy = tree.duplicate(a, "").unwrap();
			let copy_root = copy.root_uuid();
			assert_ne!(copy_root, a);

			let mut clashing = Node::new("X");
			clashing.uuid = a;
			let clash = NodeTree::new(clashing);
			assert_eq!(tree.add_child(tree.root_uuid(), clash), Err(TreeError::DuplicateUuid(a)));
			assert!(tree.add_child(tree.root_uuid(), copy).is_ok());
			assert!(tree.contains(copy_root));
		}

		#[test]
		fn move_child_rejects_cycles() {
			let (mut tree, a, b, c) = sample();
			assert_eq!(
				tree.move_child(a, c),
				Err(TreeError::WouldCreateCycle { node: a, new_parent: c })
			);
			assert_eq!(tree.move_child(tree.root_uuid(), b), Err(TreeError::CannotMoveRoot));

			tree.move_child(c, b).unwrap();
			assert_eq!(tree.children_uuids(b), [c]);
			assert!(tree.children_uuids(a).is_empty());
		}

		#[test]
		fn dropping_a_tree_destroys_components_before_children() {
			let log = Rc::new(RefCell::new(Vec::new()));
			{
				let mut tree = NodeTree::new(Node::new("Root"));
				let root = tree.root_uuid();
				tree.root_mut().add_component(Box::new(Probe::new("root1", &log)));
				tree.root_mut().add_component(Box::new(Probe::new("root2", &log)));
				let child = tree.add_node(root, Node::new("Child")).unwrap();
				tree.get_node_mut(child)
					.unwrap()
					.add_component(Box::new(Probe::new("child", &log)));
				log.borrow_mut().clear();
			}
			assert_eq!(*log.borrow(), ["root2:destroy", "root1:destroy", "child:destroy"]);
		}
	}

	mod lookup {
		use super::super::*;

		#[test]
		fn find_by_name_is_pre_order() {
			let mut tree = NodeTree::new(Node::new("Root"));
			let root = tree.root_uuid();
			let a = tree.add_node(root, Node::new("A")).unwrap();
			let deep = tree.add_node(a, Node::new("Target")).unwrap();
			let shallow = tree.add_node(root, Node::new("Target")).unwrap();

			assert_eq!(tree.find("Target"), Some(deep));
			assert_eq!(tree.find_child(root, "Target", false), Some(shallow));
			assert_eq!(tree.find_child(root, "Target", true), Some(deep));
			assert_eq!(tree.find(shallow), Some(shallow));
			assert_eq!(tree.find("Nobody"), None);
		}

		#[test]
		fn paths_resolve_both_ways() {
			let mut tree = NodeTree::new(Node::new("R"));
			let root = tree.root_uuid();
			let body = tree.add_node(root, Node::new("Body")).unwrap();
			let arm = tree.add_node(body, Node::new("Arm")).unwrap();

			assert_eq!(tree.resolve_path("/R"), Some(root));
			assert_eq!(tree.resolve_path(""), Some(root));
			assert_eq!(tree.resolve_path("Body/Arm"), Some(arm));
			assert_eq!(tree.resolve_path("/R/Body//Arm/"), Some(arm));
			assert_eq!(tree.resolve_path("/R/Leg"), None);

			let path = tree.path_of(arm).unwrap();
			assert_eq!(path, "/R/Body/Arm");
			assert_eq!(tree.resolve_path(&path), Some(arm));
		}

		#[test]
		fn display_dump() {
			let mut tree = NodeTree::new(Node::new_2d("Root"));
			let root = tree.root_uuid();
			tree.add_node(root, Node::new_control("Hud")).unwrap();
			let dump = tree.to_string();
			assert!(dump.contains("Root"));
			assert!(dump.contains("  - ["));
			assert!(dump.contains("Hud"));
		}
	}

	mod spatial {
		use std::f32::consts::FRAC_PI_2;

		use glam::vec2;

		use super::super::*;
		use crate::node::{AnchorPreset, Node2D};

		#[test]
		fn node2d_globals_compose() {
			let mut tree = NodeTree::new(Node::with_kind(
				"Root",
				NodeKind::Node2D(Node2D::new(vec2(10.0, 0.0), FRAC_PI_2, Vec2::ONE)),
			));
			let root = tree.root_uuid();
			let plain = tree.add_node(root, Node::new("Plain")).unwrap();
			let child = tree
				.add_node(
					plain,
					Node::with_kind("Child", NodeKind::Node2D(Node2D::new(vec2(1.0, 0.0), 0.0, vec2(2.0, 2.0)))),
				)
				.unwrap();

			assert!(tree.global_position_2d(child).abs_diff_eq(vec2(10.0, 1.0), 1e-5));
			assert!((tree.global_rotation_2d(child) - FRAC_PI_2).abs() < 1e-5);
			assert!(tree.global_scale_2d(child).abs_diff_eq(vec2(2.0, 2.0), 1e-5));
		}

		#[test]
		fn nested_controls() {
			let screen = vec2(1920.0, 1080.0);
			let mut tree = NodeTree::new(Node::new_control("Hud"));
			let hud = tree.root_uuid();
			{
				let control = tree.root_mut().as_control_mut().unwrap();
				control.position = vec2(100.0, 100.0);
				control.size = vec2(400.0, 200.0);
			}
			let bar = tree.add_node(hud, Node::new_control("Bar")).unwrap();
			{
				let control = tree.get_node_mut(bar).unwrap().as_control_mut().unwrap();
				control.apply_anchor_preset(AnchorPreset::FullRect);
				control.set_margins([10.0, 10.0, 10.0, 10.0]);
			}

			let rect = tree.control_global_rect(bar, screen).unwrap();
			assert_eq!(rect.position, vec2(110.0, 110.0));
			assert_eq!(rect.size, vec2(380.0, 180.0));
			assert!(tree.control_contains_point(bar, screen, vec2(300.0, 200.0)));
			assert!(!tree.control_contains_point(bar, screen, vec2(105.0, 105.0)));
		}
	}
}
