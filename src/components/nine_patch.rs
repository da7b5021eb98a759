use glam::{Vec2, Vec4};

use crate::component::{impl_component_base, Component, ComponentBase, DrawCtx};
use crate::math::rect::Rect;
use crate::render::{rect_transform, DrawSpace, Quad, Renderer};
use crate::value::{ExportType, PropertyValue};

use super::{control_area, resolve_texture};

/// Panel drawn from a texture whose corners keep their pixel size while edges and
/// centre stretch.
#[derive(Debug)]
pub struct NinePatchPanel {
	base: ComponentBase,
	pub texture_path: String,
	pub modulate_color: Vec4,
	pub left_border: f32,
	pub right_border: f32,
	pub top_border: f32,
	pub bottom_border: f32,
}

impl Default for NinePatchPanel {
	fn default() -> Self {
		let mut panel = Self {
			base: ComponentBase::new("NinePatchPanel"),
			texture_path: String::new(),
			modulate_color: Vec4::ONE,
			left_border: 8.0,
			right_border: 8.0,
			top_border: 8.0,
			bottom_border: 8.0,
		};
		panel
			.base
			.exports
			.add(
				"texture_path",
				PropertyValue::FilePath(String::new()),
				"Path to nine-patch texture file",
				ExportType::FilePath,
			)
			.add("modulate_color", PropertyValue::Color(panel.modulate_color), "Color modulation (RGBA)", ExportType::Color)
			.add("left_border", panel.left_border, "Left border size in pixels", ExportType::Float)
			.add("right_border", panel.right_border, "Right border size in pixels", ExportType::Float)
			.add("top_border", panel.top_border, "Top border size in pixels", ExportType::Float)
			.add("bottom_border", panel.bottom_border, "Bottom border size in pixels", ExportType::Float);
		panel
	}
}

impl NinePatchPanel {
	pub fn new(texture_path: &str, left: f32, top: f32, right: f32, bottom: f32) -> Self {
		let mut panel = Self::default();
		panel.set_texture_path(texture_path);
		panel.set_borders(left, top, right, bottom);
		panel
	}

	pub fn set_texture_path(&mut self, path: &str) {
		self.texture_path = path.to_owned();
		self.base.sync("texture_path", PropertyValue::FilePath(path.to_owned()));
	}

	pub fn set_modulate_color(&mut self, color: Vec4) {
		self.modulate_color = color;
		self.base.sync("modulate_color", PropertyValue::Color(color));
	}

	/// Negative sizes are raised to 0.
	pub fn set_borders(&mut self, left: f32, top: f32, right: f32, bottom: f32) {
		self.left_border = left.max(0.0);
		self.top_border = top.max(0.0);
		self.right_border = right.max(0.0);
		self.bottom_border = bottom.max(0.0);
		self.base.sync("left_border", self.left_border);
		self.base.sync("top_border", self.top_border);
		self.base.sync("right_border", self.right_border);
		self.base.sync("bottom_border", self.bottom_border);
	}

	/// The nine `(destination, uv)` patches, row by row from the top-left. Patches with no
	/// area are left out. Borders wider than the target shrink proportionally.
	pub fn patches(&self, target: Rect, texture_size: Vec2) -> Vec<(Rect, Vec4)> {
		let mut start = Vec2::new(self.left_border, self.top_border);
		let mut end = Vec2::new(self.right_border, self.bottom_border);

		let uv_start = (start / texture_size).clamp(Vec2::ZERO, Vec2::ONE);
		let uv_end = ((texture_size - end) / texture_size).clamp(uv_start, Vec2::ONE);

		let total = start + end;
		let shrink = Vec2::select(total.cmpgt(target.size), target.size / total, Vec2::ONE);
		start *= shrink;
		end *= shrink;

		let xs = [0.0, start.x, target.size.x - end.x, target.size.x];
		let ys = [0.0, start.y, target.size.y - end.y, target.size.y];
		let us = [0.0, uv_start.x, uv_end.x, 1.0];
		let vs = [0.0, uv_start.y, uv_end.y, 1.0];

		let mut patches = Vec::with_capacity(9);
		for row in 0..3 {
			for col in 0..3 {
				let pos = Vec2::new(xs[col], ys[row]);
				let size = Vec2::new(xs[col + 1], ys[row + 1]) - pos;
				if size.x <= 0.0 || size.y <= 0.0 {
					continue;
				}
				let uv = Vec4::new(us[col], vs[row], us[col + 1] - us[col], vs[row + 1] - vs[row]);
				patches.push((Rect::new(target.position + pos, size), uv));
			}
		}
		patches
	}
}

impl Component for NinePatchPanel {
	impl_component_base!();

	fn type_name(&self) -> &str {
		"NinePatchPanel"
	}

	fn category(&self) -> &str {
		"UI"
	}

	fn update_from_export_variables(&mut self) {
		let e = &self.base.exports;
		self.texture_path = e.get_or("texture_path", std::mem::take(&mut self.texture_path));
		self.modulate_color = e.get_or("modulate_color", self.modulate_color);
		self.left_border = e.get_or("left_border", self.left_border);
		self.right_border = e.get_or("right_border", self.right_border);
		self.top_border = e.get_or("top_border", self.top_border);
		self.bottom_border = e.get_or("bottom_border", self.bottom_border);
	}

	fn draw(&self, ctx: &DrawCtx, renderer: &mut dyn Renderer) {
		let (Some(texture), Some(size)) = resolve_texture(ctx, &self.texture_path) else {
			return;
		};
		let texture_size = size.as_vec2();
		if texture_size.cmple(Vec2::ZERO).any() {
			return;
		}

		let area = control_area(ctx).or_else(|| {
			ctx.tree.get_node(ctx.owner)?.as_2d()?;
			let global = ctx.tree.global_transform_2d(ctx.owner);
			Some((Rect::new(global.translation, texture_size * global.scale), DrawSpace::World))
		});
		let Some((target, space)) = area else {
			return;
		};

		for (rect, uv) in self.patches(target, texture_size) {
			renderer.draw_quad(&Quad {
				transform: rect_transform(rect),
				color: self.modulate_color,
				texture: Some(texture.clone()),
				uv,
				flip_h: false,
				flip_v: false,
				space,
			});
		}
	}
}
