use glam::Vec2;

use crate::component::{impl_component_base, Component, ComponentBase, NodeCtx};
use crate::config::RuntimeConfig;
use crate::node::NodeUuid;
use crate::render::CameraView;
use crate::scene::tree::NodeTree;
use crate::value::{ExportType, PropertyValue};

const MIN_ZOOM: f32 = 0.01;

/// Visible world edges of a camera. Y grows downwards, so `top < bottom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBounds {
	pub left: f32,
	pub top: f32,
	pub right: f32,
	pub bottom: f32,
}

/// Orthographic 2D camera placed at its node, optionally chasing another node.
#[derive(Debug)]
pub struct Camera2D {
	base: ComponentBase,
	pub offset: Vec2,
	/// At least 0.01.
	pub zoom: f32,
	pub rotation: f32,
	/// Nil when following nothing.
	pub follow_target: NodeUuid,
	/// Fraction of the distance left after one second, in `[0, 1]`. 0 snaps.
	pub follow_smoothing: f32,
	pub enabled: bool,
	pub is_current: bool,
	view: CameraView,
}

impl Default for Camera2D {
	fn default() -> Self {
		let mut camera = Self {
			base: ComponentBase::new("Camera2D"),
			offset: Vec2::ZERO,
			zoom: 1.0,
			rotation: 0.0,
			follow_target: NodeUuid::nil(),
			follow_smoothing: 0.1,
			enabled: true,
			is_current: false,
			view: CameraView::screen(crate::config::DEFAULT_SCREEN_SIZE),
		};
		camera
			.base
			.exports
			.add("offset", camera.offset, "Camera position offset from node position", ExportType::Vec2)
			.add("zoom", camera.zoom, "Camera zoom level (1.0 = normal)", ExportType::Float)
			.add("rotation", camera.rotation, "Camera rotation in radians", ExportType::Float)
			.add(
				"follow_target",
				PropertyValue::NodeReference(camera.follow_target),
				"Node to follow",
				ExportType::NodeReference,
			)
			.add("follow_smoothing", camera.follow_smoothing, "Follow smoothing factor (0.0 = instant)", ExportType::Float)
			.add("enabled", camera.enabled, "Whether camera is enabled", ExportType::Bool)
			.add("is_current", camera.is_current, "Whether camera is currently active", ExportType::Bool);
		camera
	}
}

impl Camera2D {
	pub fn set_offset(&mut self, offset: Vec2) {
		self.offset = offset;
		self.base.sync("offset", offset);
	}

	pub fn set_zoom(&mut self, zoom: f32) {
		self.zoom = zoom.max(MIN_ZOOM);
		self.base.sync("zoom", self.zoom);
	}

	pub fn set_rotation(&mut self, rotation: f32) {
		self.rotation = rotation;
		self.base.sync("rotation", rotation);
	}

	pub fn set_follow_target(&mut self, target: Option<NodeUuid>) {
		self.follow_target = target.unwrap_or(NodeUuid::nil());
		self.base.sync("follow_target", self.follow_target);
	}

	pub fn set_follow_smoothing(&mut self, smoothing: f32) {
		self.follow_smoothing = smoothing.clamp(0.0, 1.0);
		self.base.sync("follow_smoothing", self.follow_smoothing);
	}

	pub fn set_enabled(&mut self, enabled: bool) {
		self.enabled = enabled;
		self.base.sync("enabled", enabled);
	}

	pub fn set_current(&mut self, current: bool) {
		self.is_current = current;
		self.base.sync("is_current", current);
	}

	/// Whether the scene should look through this camera.
	pub fn is_active_camera(&self) -> bool {
		self.enabled && self.is_current
	}

	/// View from the owner's global position plus the offset.
	pub fn view(&self, tree: &NodeTree, owner: NodeUuid, config: &RuntimeConfig) -> CameraView {
		CameraView {
			position: tree.global_position_2d(owner) + self.offset,
			rotation: self.rotation,
			zoom: self.zoom.max(MIN_ZOOM),
			viewport: config.effective_screen_size(),
		}
	}

	/// The view computed on the last update.
	pub fn last_view(&self) -> &CameraView {
		&self.view
	}

	pub fn bounds(&self) -> CameraBounds {
		let rect = self.view.bounds();
		CameraBounds {
			left: rect.min().x,
			top: rect.min().y,
			right: rect.max().x,
			bottom: rect.max().y,
		}
	}

	pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
		self.view.screen_to_world(screen)
	}

	pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
		self.view.world_to_screen(world)
	}

	/// Moves the owner toward the target's global position. With smoothing `s` the gap
	/// shrinks by `1 - s^dt` per update.
	fn follow(&self, tree: &mut NodeTree, owner: NodeUuid, dt: f32) {
		if self.follow_target.is_nil() || self.follow_target == owner {
			return;
		}
		let Some(target) = tree.get_node(self.follow_target) else {
			return;
		};
		if target.as_2d().is_none() || tree.get_node(owner).and_then(|n| n.as_2d()).is_none() {
			return;
		}

		let target_pos = tree.global_position_2d(self.follow_target);
		let current = tree.global_position_2d(owner);
		let global = if self.follow_smoothing > 0.0 {
			current.lerp(target_pos, 1.0 - self.follow_smoothing.powf(dt))
		} else {
			target_pos
		};

		let local = match tree.parent_uuid(owner) {
			Some(parent) => tree.global_matrix_2d(parent).inverse().transform_point2(global),
			None => global,
		};
		if let Some(node) = tree.get_node_mut(owner).and_then(|n| n.as_2d_mut()) {
			node.set_position(local);
		}
	}
}

impl Component for Camera2D {
	impl_component_base!();

	fn type_name(&self) -> &str {
		"Camera2D"
	}

	fn category(&self) -> &str {
		"2D"
	}

	fn update_from_export_variables(&mut self) {
		let e = &self.base.exports;
		self.offset = e.get_or("offset", self.offset);
		self.zoom = e.get_or("zoom", self.zoom).max(MIN_ZOOM);
		self.rotation = e.get_or("rotation", self.rotation);
		self.follow_target = e.get_or("follow_target", self.follow_target);
		self.follow_smoothing = e.get_or("follow_smoothing", self.follow_smoothing).clamp(0.0, 1.0);
		self.enabled = e.get_or("enabled", self.enabled);
		self.is_current = e.get_or("is_current", self.is_current);
	}

	fn on_ready(&mut self, ctx: &mut NodeCtx) {
		self.update_from_export_variables();
		self.view = self.view(ctx.tree, ctx.owner, ctx.config);
	}

	fn on_update(&mut self, ctx: &mut NodeCtx, dt: f32) {
		if !self.enabled {
			return;
		}
		self.follow(ctx.tree, ctx.owner, dt);
		self.view = self.view(ctx.tree, ctx.owner, ctx.config);
	}
}

#[cfg(test)]
mod tests {
	use glam::vec2;

	use super::*;
	use crate::components::testing::config;
	use crate::node::Node;

	fn rig() -> (NodeTree, NodeUuid, NodeUuid) {
		let mut tree = NodeTree::new(Node::new_2d("World"));
		let root = tree.root_uuid();
		let cam = tree.add_node(root, Node::new_2d("Cam")).unwrap();
		let mut player = Node::new_2d("Player");
		player.as_2d_mut().unwrap().set_position(vec2(100.0, 0.0));
		let player = tree.add_node(root, player).unwrap();
		(tree, cam, player)
	}

	#[test]
	fn view_and_bounds() {
		let (tree, cam, _) = rig();
		let mut camera = Camera2D::default();
		camera.set_offset(vec2(10.0, 0.0));
		camera.set_zoom(2.0);
		camera.view = camera.view(&tree, cam, &config());

		assert_eq!(camera.last_view().position, vec2(10.0, 0.0));
		assert_eq!(
			camera.bounds(),
			CameraBounds {
				left: -190.0,
				top: -150.0,
				right: 210.0,
				bottom: 150.0,
			}
		);
		assert_eq!(camera.screen_to_world(vec2(400.0, 300.0)), vec2(10.0, 0.0));
		assert_eq!(camera.world_to_screen(vec2(-190.0, -150.0)), Vec2::ZERO);
	}

	#[test]
	fn zoom_and_smoothing_are_clamped() {
		let mut camera = Camera2D::default();
		camera.set_zoom(0.0);
		assert_eq!(camera.zoom, MIN_ZOOM);
		camera.set_follow_smoothing(4.0);
		assert_eq!(camera.follow_smoothing, 1.0);
		assert!(!camera.is_active_camera());
		camera.set_current(true);
		assert!(camera.is_active_camera());
	}

	#[test]
	fn follow_snaps_or_smooths() {
		let (mut tree, cam, player) = rig();
		let mut camera = Camera2D::default();
		camera.set_follow_target(Some(player));

		camera.set_follow_smoothing(0.5);
		camera.follow(&mut tree, cam, 1.0);
		assert!(tree.global_position_2d(cam).abs_diff_eq(vec2(50.0, 0.0), 1e-4));

		camera.set_follow_smoothing(0.0);
		camera.follow(&mut tree, cam, 1.0 / 60.0);
		assert!(tree.global_position_2d(cam).abs_diff_eq(vec2(100.0, 0.0), 1e-4));
	}

	#[test]
	fn follow_ignores_missing_target() {
		let (mut tree, cam, _) = rig();
		let mut camera = Camera2D::default();
		camera.set_follow_target(Some(NodeUuid::new()));
		camera.follow(&mut tree, cam, 1.0);
		assert_eq!(tree.global_position_2d(cam), Vec2::ZERO);
	}
}
