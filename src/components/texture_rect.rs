use std::fmt;

use glam::{Vec2, Vec4};

use crate::component::{impl_component_base, Component, ComponentBase, DrawCtx};
use crate::math::rect::Rect;
use crate::render::{rect_transform, DrawSpace, Quad, Renderer, FULL_UV};
use crate::value::{ExportType, PropertyValue};

use super::{control_area, resolve_texture};

const STRETCH_MODES: [&str; 5] = ["Stretch", "Tile", "KeepAspect", "KeepAspectCentered", "KeepAspectCovered"];

/// How a texture is fitted into its rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StretchMode {
	/// Fills the rectangle, ignoring aspect ratio.
	#[default]
	Stretch,
	/// Repeats at native size from the top-left corner.
	Tile,
	/// Fits inside, anchored top-left.
	KeepAspect,
	/// Fits inside, centred.
	KeepAspectCentered,
	/// Covers the rectangle, centred, overflowing on one axis.
	KeepAspectCovered,
}

impl StretchMode {
	pub fn from_index(index: i32) -> Option<Self> {
		match index {
			0 => Some(StretchMode::Stretch),
			1 => Some(StretchMode::Tile),
			2 => Some(StretchMode::KeepAspect),
			3 => Some(StretchMode::KeepAspectCentered),
			4 => Some(StretchMode::KeepAspectCovered),
			_ => None,
		}
	}

	pub fn index(self) -> i32 {
		self as i32
	}

	pub fn as_str(self) -> &'static str {
		STRETCH_MODES[self as usize]
	}

	/// Rectangle the texture is drawn over, given the target and the texture's pixel size.
	///
	/// Aspect modes fall back to the target when the texture size is unknown or degenerate.
	pub fn fit(self, target: Rect, texture_size: Vec2) -> Rect {
		let usable = texture_size.x > 0.0 && texture_size.y > 0.0 && target.size.y > 0.0;
		if !usable || matches!(self, StretchMode::Stretch | StretchMode::Tile) {
			return target;
		}

		let texture_aspect = texture_size.x / texture_size.y;
		let target_aspect = target.size.x / target.size.y;
		let fit_width = Vec2::new(target.size.x, target.size.x / texture_aspect);
		let fit_height = Vec2::new(target.size.y * texture_aspect, target.size.y);

		let wider = texture_aspect > target_aspect;
		let size = match self {
			StretchMode::KeepAspectCovered if wider => fit_height,
			StretchMode::KeepAspectCovered => fit_width,
			_ if wider => fit_width,
			_ => fit_height,
		};
		let position = match self {
			StretchMode::KeepAspect => target.position,
			_ => target.position + (target.size - size) * 0.5,
		};
		Rect::new(position, size)
	}
}

impl fmt::Display for StretchMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown stretch mode {0:?}")]
pub struct UnknownStretchModeError(pub String);

impl TryFrom<&str> for StretchMode {
	type Error = UnknownStretchModeError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		STRETCH_MODES
			.iter()
			.position(|name| *name == value)
			.and_then(|i| StretchMode::from_index(i as i32))
			.ok_or_else(|| UnknownStretchModeError(value.to_owned()))
	}
}

/// Texture shown in a Control's rectangle, or at native size on a Node2D.
#[derive(Debug)]
pub struct TextureRectangle {
	base: ComponentBase,
	pub texture_path: String,
	pub modulate_color: Vec4,
	pub stretch_mode: StretchMode,
	pub flip_h: bool,
	pub flip_v: bool,
	/// Normalized `[x, y, w, h]`.
	pub texture_region: Vec4,
}

impl Default for TextureRectangle {
	fn default() -> Self {
		let mut rect = Self {
			base: ComponentBase::new("TextureRectangle"),
			texture_path: String::new(),
			modulate_color: Vec4::ONE,
			stretch_mode: StretchMode::Stretch,
			flip_h: false,
			flip_v: false,
			texture_region: FULL_UV,
		};
		rect.base
			.exports
			.add("texture_path", PropertyValue::FilePath(String::new()), "Path to texture file", ExportType::FilePath)
			.add("modulate_color", PropertyValue::Color(rect.modulate_color), "Color modulation (RGBA)", ExportType::Color)
			.add_enum("stretch_mode", rect.stretch_mode.index(), "Texture stretch mode", &STRETCH_MODES)
			.add("flip_h", rect.flip_h, "Flip texture horizontally", ExportType::Bool)
			.add("flip_v", rect.flip_v, "Flip texture vertically", ExportType::Bool)
			.add(
				"texture_region",
				rect.texture_region,
				"Texture region (x, y, width, height) in normalized coordinates",
				ExportType::Vec4,
			);
		rect
	}
}

impl TextureRectangle {
	pub fn new(texture_path: &str, stretch_mode: StretchMode) -> Self {
		let mut rect = Self::default();
		rect.set_texture_path(texture_path);
		rect.set_stretch_mode(stretch_mode);
		rect
	}

	pub fn set_texture_path(&mut self, path: &str) {
		self.texture_path = path.to_owned();
		self.base.sync("texture_path", PropertyValue::FilePath(path.to_owned()));
	}

	pub fn set_modulate_color(&mut self, color: Vec4) {
		self.modulate_color = color;
		self.base.sync("modulate_color", PropertyValue::Color(color));
	}

	pub fn set_stretch_mode(&mut self, mode: StretchMode) {
		self.stretch_mode = mode;
		self.base.sync("stretch_mode", mode.index());
	}

	pub fn set_flip(&mut self, flip_h: bool, flip_v: bool) {
		self.flip_h = flip_h;
		self.flip_v = flip_v;
		self.base.sync("flip_h", flip_h);
		self.base.sync("flip_v", flip_v);
	}

	pub fn set_texture_region(&mut self, region: Vec4) {
		self.texture_region = region;
		self.base.sync("texture_region", region);
	}

	/// Quad for the texture inside `target`. Tiling widens the UV region past 1 so the
	/// sampler repeats.
	fn quad(&self, texture: String, texture_size: Vec2, target: Rect, space: DrawSpace) -> Quad {
		let rect = self.stretch_mode.fit(target, texture_size);
		let mut uv = self.texture_region;
		if self.stretch_mode == StretchMode::Tile && texture_size.cmpgt(Vec2::ZERO).all() {
			let repeats = target.size / (texture_size * Vec2::new(uv.z, uv.w));
			uv.z *= repeats.x;
			uv.w *= repeats.y;
		}
		Quad {
			transform: rect_transform(rect),
			color: self.modulate_color,
			texture: Some(texture),
			uv,
			flip_h: self.flip_h,
			flip_v: self.flip_v,
			space,
		}
	}
}

impl Component for TextureRectangle {
	impl_component_base!();

	fn type_name(&self) -> &str {
		"TextureRectangle"
	}

	fn category(&self) -> &str {
		"UI"
	}

	fn update_from_export_variables(&mut self) {
		let e = &self.base.exports;
		self.texture_path = e.get_or("texture_path", std::mem::take(&mut self.texture_path));
		self.modulate_color = e.get_or("modulate_color", self.modulate_color);
		self.stretch_mode = StretchMode::from_index(e.get_or("stretch_mode", self.stretch_mode.index())).unwrap_or_default();
		self.flip_h = e.get_or("flip_h", self.flip_h);
		self.flip_v = e.get_or("flip_v", self.flip_v);
		self.texture_region = e.get_or("texture_region", self.texture_region);
	}

	fn draw(&self, ctx: &DrawCtx, renderer: &mut dyn Renderer) {
		let (Some(texture), Some(size)) = resolve_texture(ctx, &self.texture_path) else {
			return;
		};
		let texture_size = size.as_vec2();

		let area = control_area(ctx).or_else(|| {
			ctx.tree.get_node(ctx.owner)?.as_2d()?;
			let global = ctx.tree.global_transform_2d(ctx.owner);
			Some((Rect::new(global.translation, texture_size * global.scale), DrawSpace::World))
		});
		if let Some((target, space)) = area {
			renderer.draw_quad(&self.quad(texture, texture_size, target, space));
		}
	}
}
