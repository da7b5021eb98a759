use glam::{vec3, IVec2, Mat4, Quat, UVec2, Vec2, Vec4};

use crate::component::{impl_component_base, Component, ComponentBase, DrawCtx};
use crate::math::rect::Rect;
use crate::node::NodeUuid;
use crate::render::{DrawSpace, Quad, Renderer, FULL_UV};
use crate::scene::tree::NodeTree;
use crate::value::{ExportType, PropertyValue};

use super::resolve_texture;

/// Textured quad on a 2D node, optionally cut from a sprite sheet.
#[derive(Debug)]
pub struct Sprite2D {
	base: ComponentBase,
	pub texture_path: String,
	pub color: Vec4,
	pub modulate: Vec4,
	/// Size of the quad before node scale.
	pub size: Vec2,
	/// Normalized `[x, y, w, h]`.
	pub texture_region: Vec4,
	pub flip_h: bool,
	pub flip_v: bool,
	pub centered: bool,
	pub offset: Vec2,
	pub frame: i32,
	/// Column and row of `frame` in the `hframes` x `vframes` grid.
	pub frame_coords: IVec2,
	pub hframes: i32,
	pub vframes: i32,
	pub region_enabled: bool,
	pub region_filter_clip_enabled: bool,
	/// Pixel `[x, y, w, h]`, used over `texture_region` when `region_enabled`.
	pub region_rect: Vec4,
}

impl Default for Sprite2D {
	fn default() -> Self {
		let mut sprite = Self {
			base: ComponentBase::new("Sprite2D"),
			texture_path: String::new(),
			color: Vec4::ONE,
			modulate: Vec4::ONE,
			size: Vec2::splat(100.0),
			texture_region: FULL_UV,
			flip_h: false,
			flip_v: false,
			centered: true,
			offset: Vec2::ZERO,
			frame: 0,
			frame_coords: IVec2::ZERO,
			hframes: 1,
			vframes: 1,
			region_enabled: false,
			region_filter_clip_enabled: false,
			region_rect: Vec4::ZERO,
		};
		sprite.register_exports();
		sprite
	}
}

impl Sprite2D {
	fn register_exports(&mut self) {
		self.base
			.exports
			.add("texture_path", PropertyValue::FilePath(self.texture_path.clone()), "Path to texture file", ExportType::FilePath)
			.add("color", PropertyValue::Color(self.color), "Sprite color tint", ExportType::Color)
			.add("modulate", PropertyValue::Color(self.modulate), "Color modulation", ExportType::Color)
			.add("size", self.size, "Sprite size in pixels", ExportType::Vec2)
			.add("texture_region", self.texture_region, "Texture region (x, y, width, height) in 0-1 range", ExportType::Vec4)
			.add("flip_h", self.flip_h, "Flip sprite horizontally", ExportType::Bool)
			.add("flip_v", self.flip_v, "Flip sprite vertically", ExportType::Bool)
			.add("centered", self.centered, "Center sprite on node position", ExportType::Bool)
			.add("offset", self.offset, "Sprite offset from node position", ExportType::Vec2)
			.add("frame", self.frame, "Current frame index", ExportType::Int)
			.add("frame_coords", self.frame_coords.as_vec2(), "Frame coordinates (column, row)", ExportType::Vec2)
			.add("hframes", self.hframes, "Number of horizontal frames", ExportType::Int)
			.add("vframes", self.vframes, "Number of vertical frames", ExportType::Int)
			.add("region_enabled", self.region_enabled, "Use region_rect instead of texture_region", ExportType::Bool)
			.add("region_filter_clip_enabled", self.region_filter_clip_enabled, "Clip filtering to the region", ExportType::Bool)
			.add("region_rect", self.region_rect, "Region rectangle in pixels", ExportType::Vec4);
	}

	pub fn set_texture_path(&mut self, path: &str) {
		self.texture_path = path.to_owned();
		self.base.sync("texture_path", PropertyValue::FilePath(path.to_owned()));
	}

	pub fn set_color(&mut self, color: Vec4) {
		self.color = color;
		self.base.sync("color", color);
	}

	pub fn set_modulate(&mut self, modulate: Vec4) {
		self.modulate = modulate;
		self.base.sync("modulate", modulate);
	}

	pub fn set_size(&mut self, size: Vec2) {
		self.size = size;
		self.base.sync("size", size);
	}

	pub fn set_texture_region(&mut self, region: Vec4) {
		self.texture_region = region;
		self.base.sync("texture_region", region);
	}

	pub fn set_flip(&mut self, flip_h: bool, flip_v: bool) {
		self.flip_h = flip_h;
		self.flip_v = flip_v;
		self.base.sync("flip_h", flip_h);
		self.base.sync("flip_v", flip_v);
	}

	pub fn set_centered(&mut self, centered: bool) {
		self.centered = centered;
		self.base.sync("centered", centered);
	}

	pub fn set_offset(&mut self, offset: Vec2) {
		self.offset = offset;
		self.base.sync("offset", offset);
	}

	/// Selects a frame by index and updates `frame_coords` to match.
	pub fn set_frame(&mut self, frame: i32) {
		self.frame = frame;
		self.base.sync("frame", frame);
		if self.hframes > 0 && self.vframes > 0 {
			self.frame_coords = IVec2::new(frame % self.hframes, frame / self.hframes);
			self.base.sync("frame_coords", self.frame_coords.as_vec2());
		}
	}

	/// Selects a frame by column and row and updates `frame` to match.
	pub fn set_frame_coords(&mut self, coords: IVec2) {
		self.frame_coords = coords;
		self.frame = coords.y * self.hframes + coords.x;
		self.base.sync("frame_coords", coords.as_vec2());
		self.base.sync("frame", self.frame);
	}

	pub fn set_hframes(&mut self, hframes: i32) {
		self.hframes = hframes;
		self.base.sync("hframes", hframes);
		if hframes > 0 {
			self.set_frame(self.frame);
		}
	}

	pub fn set_vframes(&mut self, vframes: i32) {
		self.vframes = vframes;
		self.base.sync("vframes", vframes);
		if vframes > 0 {
			self.set_frame(self.frame);
		}
	}

	pub fn set_region(&mut self, enabled: bool, rect: Vec4) {
		self.region_enabled = enabled;
		self.region_rect = rect;
		self.base.sync("region_enabled", enabled);
		self.base.sync("region_rect", rect);
	}

	/// Normalized region sampled from the texture, given its pixel size when known.
	///
	/// `region_rect` replaces `texture_region` only when the texture size is known. The
	/// region is then split into the frame grid and the current cell is picked, clamped
	/// to the grid.
	pub fn uv_region(&self, texture_size: Option<UVec2>) -> Vec4 {
		let mut region = self.texture_region;

		if self.region_enabled {
			if let Some(size) = texture_size.filter(|s| s.x > 0 && s.y > 0) {
				let size = size.as_vec2();
				region = self.region_rect / Vec4::new(size.x, size.y, size.x, size.y);
			}
		}

		if self.hframes > 1 || self.vframes > 1 {
			let hframes = self.hframes.max(1);
			let vframes = self.vframes.max(1);
			let frame_w = region.z / hframes as f32;
			let frame_h = region.w / vframes as f32;
			let x = self.frame_coords.x.clamp(0, hframes - 1);
			let y = self.frame_coords.y.clamp(0, vframes - 1);
			region = Vec4::new(
				region.x + x as f32 * frame_w,
				region.y + y as f32 * frame_h,
				frame_w,
				frame_h,
			);
		}

		region
	}

	/// Model matrix of the quad: node position plus offset, node rotation, node scale
	/// times size. Non-centred sprites have their top-left corner at the origin.
	pub fn transform(&self, tree: &NodeTree, owner: NodeUuid) -> Mat4 {
		let global = tree.global_transform_2d(owner);
		let mut m = Mat4::from_scale_rotation_translation(
			(global.scale * self.size).extend(1.0),
			Quat::from_rotation_z(global.rotation),
			(global.translation + self.offset).extend(0.0),
		);
		if !self.centered {
			m *= Mat4::from_translation(vec3(0.5, 0.5, 0.0));
		}
		m
	}

	/// Rectangle covered in the owner's local space.
	pub fn local_rect(&self) -> Rect {
		if self.centered {
			Rect::new(self.offset - self.size * 0.5, self.size)
		} else {
			Rect::new(self.offset, self.size)
		}
	}

	/// Whether a local-space point falls on the sprite.
	pub fn contains_local_point(&self, point: Vec2) -> bool {
		let rect = self.local_rect();
		point.cmpge(rect.min()).all() && point.cmple(rect.max()).all()
	}
}

impl Component for Sprite2D {
	impl_component_base!();

	fn type_name(&self) -> &str {
		"Sprite2D"
	}

	fn category(&self) -> &str {
		"2D"
	}

	fn update_from_export_variables(&mut self) {
		let e = &self.base.exports;
		self.texture_path = e.get_or("texture_path", std::mem::take(&mut self.texture_path));
		self.color = e.get_or("color", self.color);
		self.modulate = e.get_or("modulate", self.modulate);
		self.size = e.get_or("size", self.size);
		self.texture_region = e.get_or("texture_region", self.texture_region);
		self.flip_h = e.get_or("flip_h", self.flip_h);
		self.flip_v = e.get_or("flip_v", self.flip_v);
		self.centered = e.get_or("centered", self.centered);
		self.offset = e.get_or("offset", self.offset);
		self.frame = e.get_or("frame", self.frame);
		self.frame_coords = e.get_or("frame_coords", self.frame_coords.as_vec2()).as_ivec2();
		self.hframes = e.get_or("hframes", self.hframes);
		self.vframes = e.get_or("vframes", self.vframes);
		self.region_enabled = e.get_or("region_enabled", self.region_enabled);
		self.region_filter_clip_enabled = e.get_or("region_filter_clip_enabled", self.region_filter_clip_enabled);
		self.region_rect = e.get_or("region_rect", self.region_rect);
	}

	fn draw(&self, ctx: &DrawCtx, renderer: &mut dyn Renderer) {
		let (texture, texture_size) = resolve_texture(ctx, &self.texture_path);
		renderer.draw_quad(&Quad {
			transform: self.transform(ctx.tree, ctx.owner),
			color: self.color * self.modulate,
			texture,
			uv: self.uv_region(texture_size),
			flip_h: self.flip_h,
			flip_v: self.flip_v,
			space: DrawSpace::World,
		});
	}
}
