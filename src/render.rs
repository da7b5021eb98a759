use glam::{Mat4, Vec2, Vec4};

use crate::component::DrawCtx;
use crate::components::Camera2D;
use crate::math::rect::Rect;
use crate::node::NodeUuid;
use crate::scene::tree::NodeTree;
use crate::scene::Scene;
use crate::value::FontPath;

/// Coordinate space a primitive is given in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawSpace {
	/// Seen through the current 2D camera.
	#[default]
	World,
	/// Screen pixels, top-left origin, drawn over the world.
	Screen,
}

/// A unit quad centred on the origin, placed by `transform`.
#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
	pub transform: Mat4,
	/// RGBA
	pub color: Vec4,
	/// `None` draws a white placeholder.
	pub texture: Option<String>,
	/// Normalized `[x, y, w, h]` texture region.
	pub uv: Vec4,
	pub flip_h: bool,
	pub flip_v: bool,
	pub space: DrawSpace,
}

impl Quad {
	pub fn solid(transform: Mat4, color: Vec4, space: DrawSpace) -> Self {
		Self {
			transform,
			color,
			texture: None,
			uv: FULL_UV,
			flip_h: false,
			flip_v: false,
			space,
		}
	}

	/// Axis-aligned quad covering `rect`.
	pub fn rect(rect: Rect, color: Vec4, space: DrawSpace) -> Self {
		Self::solid(rect_transform(rect), color, space)
	}
}

pub const FULL_UV: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);

/// Transform placing the unit quad over `rect`.
pub fn rect_transform(rect: Rect) -> Mat4 {
	Mat4::from_translation(rect.center().extend(0.0)) * Mat4::from_scale(rect.size.extend(1.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
	#[default]
	Left,
	Center,
	Right,
	Justify,
}

impl TextAlign {
	/// Out of range indices fall back to `Left`.
	pub fn from_index(index: i32) -> Self {
		match index {
			1 => TextAlign::Center,
			2 => TextAlign::Right,
			3 => TextAlign::Justify,
			_ => TextAlign::Left,
		}
	}

	pub fn index(self) -> i32 {
		self as i32
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlign {
	#[default]
	Top,
	Center,
	Bottom,
}

impl VerticalAlign {
	pub fn from_index(index: i32) -> Self {
		match index {
			1 => VerticalAlign::Center,
			2 => VerticalAlign::Bottom,
			_ => VerticalAlign::Top,
		}
	}

	pub fn index(self) -> i32 {
		self as i32
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOutline {
	pub color: Vec4,
	pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextShadow {
	pub color: Vec4,
	pub offset: Vec2,
}

/// A block of text laid out inside `rect`. Glyph rasterization is up to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
	pub text: String,
	pub font: FontPath,
	pub font_size: f32,
	pub color: Vec4,
	pub rect: Rect,
	pub align: TextAlign,
	pub vertical_align: VerticalAlign,
	pub word_wrap: bool,
	pub line_spacing: f32,
	pub kerning: f32,
	pub outline: Option<TextOutline>,
	pub shadow: Option<TextShadow>,
	pub space: DrawSpace,
}

/// Orthographic 2D view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
	/// World point at the centre of the viewport.
	pub position: Vec2,
	pub rotation: f32,
	pub zoom: f32,
	pub viewport: Vec2,
}

impl CameraView {
	/// A view whose top-left corner is the world origin.
	pub fn screen(viewport: Vec2) -> Self {
		Self {
			position: viewport * 0.5,
			rotation: 0.0,
			zoom: 1.0,
			viewport,
		}
	}

	/// World-space rectangle seen by the camera, ignoring rotation.
	pub fn bounds(&self) -> Rect {
		let size = self.viewport / self.zoom;
		Rect::new(self.position - size * 0.5, size)
	}

	/// Rotates the world around the camera position.
	pub fn view_matrix(&self) -> Mat4 {
		let p = self.position.extend(0.0);
		Mat4::from_translation(p) * Mat4::from_rotation_z(-self.rotation) * Mat4::from_translation(-p)
	}

	/// Y grows downwards, as in screen space.
	pub fn projection(&self) -> Mat4 {
		let b = self.bounds();
		Mat4::orthographic_rh(b.min().x, b.max().x, b.max().y, b.min().y, -1.0, 1.0) * self.view_matrix()
	}

	/// Screen pixel (top-left origin) to world point.
	pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
		let local = (screen - self.viewport * 0.5) / self.zoom;
		self.position + Vec2::from_angle(self.rotation).rotate(local)
	}

	pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
		let local = Vec2::from_angle(-self.rotation).rotate(world - self.position);
		local * self.zoom + self.viewport * 0.5
	}
}

/// Rendering backend.
///
/// The core submits primitives in traversal order; batching, sorting and GPU state are the
/// backend's concern.
pub trait Renderer {
	/// Called once per frame before any primitive.
	fn set_camera(&mut self, camera: &CameraView);

	fn draw_quad(&mut self, quad: &Quad);

	fn draw_text(&mut self, text: &TextRun);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
	Quad(Quad),
	Text(TextRun),
}

/// Renderer that only records what it is asked to draw.
#[derive(Debug, Default, Clone)]
pub struct DrawRecorder {
	pub camera: Option<CameraView>,
	pub commands: Vec<DrawCommand>,
}

impl DrawRecorder {
	pub fn quads(&self) -> impl Iterator<Item = &Quad> {
		self.commands.iter().filter_map(|c| match c {
			DrawCommand::Quad(q) => Some(q),
			_ => None,
		})
	}

	pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
		self.commands.iter().filter_map(|c| match c {
			DrawCommand::Text(t) => Some(t),
			_ => None,
		})
	}

	pub fn clear(&mut self) {
		self.camera = None;
		self.commands.clear();
	}
}

impl Renderer for DrawRecorder {
	fn set_camera(&mut self, camera: &CameraView) {
		self.camera = Some(*camera);
	}

	fn draw_quad(&mut self, quad: &Quad) {
		self.commands.push(DrawCommand::Quad(quad.clone()));
	}

	fn draw_text(&mut self, text: &TextRun) {
		self.commands.push(DrawCommand::Text(text.clone()));
	}
}

/// Draws a scene: sets the current camera, then lets every active component of every
/// visible node submit its primitives in traversal order.
pub fn draw(renderer: &mut dyn Renderer, scene: &Scene) {
	let Some(tree) = scene.root() else {
		return;
	};

	let viewport = scene.config().effective_screen_size();
	let camera = current_camera(tree, scene).unwrap_or_else(|| CameraView::screen(viewport));
	renderer.set_camera(&camera);

	draw_node(renderer, tree, tree.root_uuid(), scene);
}

fn draw_node(renderer: &mut dyn Renderer, tree: &NodeTree, uuid: NodeUuid, scene: &Scene) {
	let Some(node) = tree.get_node(uuid) else {
		return;
	};
	if !node.active || !node.visible {
		return;
	}

	let ctx = DrawCtx {
		tree,
		owner: uuid,
		services: scene.services(),
		config: scene.config(),
	};
	for component in node.components().iter().filter(|c| c.is_active()) {
		component.draw(&ctx, renderer);
	}

	for child in tree.children_uuids(uuid) {
		draw_node(renderer, tree, child, scene);
	}
}

/// First enabled, current camera on an active node, in traversal order.
fn current_camera(tree: &NodeTree, scene: &Scene) -> Option<CameraView> {
	tree.all_node_uuids().into_iter().find_map(|uuid| {
		let node = tree.get_node(uuid)?;
		if !node.active {
			return None;
		}
		node.get_components::<Camera2D>()
			.find(|cam| cam.is_active_camera())
			.map(|cam| cam.view(tree, uuid, scene.config()))
	})
}

#[cfg(test)]
mod tests {
	use glam::vec2;

	use super::*;

	#[test]
	fn rect_transform_covers_rect() {
		let m = rect_transform(Rect::new(vec2(10.0, 20.0), vec2(100.0, 50.0)));
		let top_left = m.transform_point3(glam::vec3(-0.5, -0.5, 0.0));
		let bottom_right = m.transform_point3(glam::vec3(0.5, 0.5, 0.0));
		assert!(top_left.truncate().abs_diff_eq(vec2(10.0, 20.0), 1e-5));
		assert!(bottom_right.truncate().abs_diff_eq(vec2(110.0, 70.0), 1e-5));
	}

	#[test]
	fn camera_bounds_scale_with_zoom() {
		let mut cam = CameraView::screen(vec2(800.0, 600.0));
		assert_eq!(cam.bounds(), Rect::new(Vec2::ZERO, vec2(800.0, 600.0)));

		cam.zoom = 2.0;
		assert_eq!(cam.bounds(), Rect::new(vec2(200.0, 150.0), vec2(400.0, 300.0)));
	}

	#[test]
	fn screen_world_conversions_agree() {
		let cam = CameraView {
			position: vec2(100.0, 50.0),
			rotation: std::f32::consts::FRAC_PI_2,
			zoom: 2.0,
			viewport: vec2(800.0, 600.0),
		};
		assert!(cam.screen_to_world(vec2(400.0, 300.0)).abs_diff_eq(vec2(100.0, 50.0), 1e-4));

		let world = cam.screen_to_world(vec2(10.0, 20.0));
		assert!(cam.world_to_screen(world).abs_diff_eq(vec2(10.0, 20.0), 1e-3));

		let ndc = cam.projection().project_point3(world.extend(0.0));
		let from_ndc = vec2((ndc.x + 1.0) * 400.0, (1.0 - ndc.y) * 300.0);
		assert!(from_ndc.abs_diff_eq(vec2(10.0, 20.0), 1e-3));
	}

	#[test]
	fn recorder_splits_commands() {
		let mut rec = DrawRecorder::default();
		rec.draw_quad(&Quad::rect(Rect::default(), Vec4::ONE, DrawSpace::Screen));
		rec.set_camera(&CameraView::screen(vec2(10.0, 10.0)));
		assert_eq!(rec.quads().count(), 1);
		assert_eq!(rec.texts().count(), 0);
		assert!(rec.camera.is_some());
	}
}
