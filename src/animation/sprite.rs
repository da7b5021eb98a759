//! Frame-by-frame sprite sheet animations, as stored in `.spriteanim` files.

use glam::{IVec2, Vec4};
use indexmap::IndexMap;

use crate::render::FULL_UV;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteFrame {
	/// Normalized `[x, y, w, h]`.
	pub texture_region: Vec4,
	/// Seconds.
	pub duration: f32,
}

impl SpriteFrame {
	pub fn new(texture_region: Vec4, duration: f32) -> Self {
		Self {
			texture_region,
			duration,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteAnimation {
	pub name: String,
	pub looping: bool,
	pub speed_scale: f32,
	pub frames: Vec<SpriteFrame>,
}

impl SpriteAnimation {
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_owned(),
			looping: true,
			speed_scale: 1.0,
			frames: Vec::new(),
		}
	}

	pub fn with_frame(mut self, frame: SpriteFrame) -> Self {
		self.frames.push(frame);
		self
	}

	pub fn total_duration(&self) -> f32 {
		self.frames.iter().map(|f| f.duration).sum()
	}
}

/// Named animations cut from one sprite sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpriteAnimationResource {
	pub texture_path: String,
	/// Pixel size of one cell.
	pub sprite_size: IVec2,
	/// Pixel size of the whole sheet.
	pub sheet_size: IVec2,
	pub default_animation: String,
	animations: IndexMap<String, SpriteAnimation>,
}

impl SpriteAnimationResource {
	pub fn new(texture_path: &str, sprite_size: IVec2, sheet_size: IVec2) -> Self {
		Self {
			texture_path: texture_path.to_owned(),
			sprite_size,
			sheet_size,
			..Self::default()
		}
	}

	/// Replaces any animation with the same name.
	pub fn add_animation(&mut self, animation: SpriteAnimation) -> Option<SpriteAnimation> {
		self.animations.insert(animation.name.clone(), animation)
	}

	pub fn with_animation(mut self, animation: SpriteAnimation) -> Self {
		self.add_animation(animation);
		self
	}

	pub fn remove_animation(&mut self, name: &str) -> Option<SpriteAnimation> {
		self.animations.shift_remove(name)
	}

	pub fn animation(&self, name: &str) -> Option<&SpriteAnimation> {
		self.animations.get(name)
	}

	pub fn animation_mut(&mut self, name: &str) -> Option<&mut SpriteAnimation> {
		self.animations.get_mut(name)
	}

	pub fn animations(&self) -> impl Iterator<Item = &SpriteAnimation> {
		self.animations.values()
	}

	pub fn animation_names(&self) -> impl Iterator<Item = &str> {
		self.animations.keys().map(String::as_str)
	}

	/// Columns and rows of the sheet grid, `None` when the sizes do not describe one.
	fn grid(&self) -> Option<IVec2> {
		if self.sprite_size.cmple(IVec2::ZERO).any() || self.sheet_size.cmple(IVec2::ZERO).any() {
			return None;
		}
		let grid = self.sheet_size / self.sprite_size;
		(grid.cmpgt(IVec2::ZERO).all()).then_some(grid)
	}

	/// Number of cells in the sheet grid.
	pub fn grid_frame_count(&self) -> i32 {
		self.grid().map(|g| g.x * g.y).unwrap_or(0)
	}

	/// Normalized region of a grid cell, counted row by row. Indices wrap around.
	pub fn grid_frame_region(&self, index: i32) -> Vec4 {
		let Some(grid) = self.grid() else {
			return FULL_UV;
		};
		let index = index.rem_euclid(grid.x * grid.y);
		let cell = IVec2::new(index % grid.x, index / grid.x);
		let sheet = self.sheet_size.as_vec2();
		let pos = (cell * self.sprite_size).as_vec2() / sheet;
		let size = self.sprite_size.as_vec2() / sheet;
		Vec4::new(pos.x, pos.y, size.x, size.y)
	}
}

#[cfg(test)]
mod tests {
	use glam::vec4;

	use super::*;

	#[test]
	fn grid_cells() {
		let res = SpriteAnimationResource::new("hero.png", IVec2::new(16, 16), IVec2::new(64, 32));
		assert_eq!(res.grid_frame_count(), 8);
		assert_eq!(res.grid_frame_region(5), vec4(0.25, 0.5, 0.25, 0.5));
		assert_eq!(res.grid_frame_region(9), res.grid_frame_region(1));

		let broken = SpriteAnimationResource::new("hero.png", IVec2::new(0, 16), IVec2::new(64, 32));
		assert_eq!(broken.grid_frame_count(), 0);
		assert_eq!(broken.grid_frame_region(3), FULL_UV);
	}

	#[test]
	fn animations_keep_order() {
		let res = SpriteAnimationResource::default()
			.with_animation(SpriteAnimation::new("walk"))
			.with_animation(SpriteAnimation::new("idle"));
		assert_eq!(res.animation_names().collect::<Vec<_>>(), ["walk", "idle"]);
		assert_eq!(
			SpriteAnimation::new("x")
				.with_frame(SpriteFrame::new(FULL_UV, 0.25))
				.with_frame(SpriteFrame::new(FULL_UV, 0.5))
				.total_duration(),
			0.75
		);
	}
}
