//! Tile atlases used by [`Tilemap2D`](crate::components::Tilemap2D).

use std::collections::BTreeMap;

use glam::{IVec2, UVec2, Vec2, Vec4};
use indexmap::IndexMap;

use crate::render::FULL_UV;

/// Collision outline of a tile, kept as data for whoever runs physics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileCollisionKind {
	#[default]
	None,
	Rectangle,
	Circle,
	Polygon,
}

impl TileCollisionKind {
	pub fn from_index(index: i32) -> Option<Self> {
		match index {
			0 => Some(TileCollisionKind::None),
			1 => Some(TileCollisionKind::Rectangle),
			2 => Some(TileCollisionKind::Circle),
			3 => Some(TileCollisionKind::Polygon),
			_ => None,
		}
	}

	pub fn index(self) -> i32 {
		self as i32
	}
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TileCollisionShape {
	pub kind: TileCollisionKind,
	pub offset: Vec2,
	pub size: Vec2,
	/// Polygon outline, relative to `offset`.
	pub points: Vec<Vec2>,
}

/// Typed value of a tile's custom data entry.
#[derive(Debug, Clone, PartialEq)]
pub enum TileDataValue {
	String(String),
	Integer(i32),
	Float(f32),
	Boolean(bool),
	Color(Vec4),
}

impl TileDataValue {
	/// Tag used in `.tileset` documents.
	pub fn type_index(&self) -> i32 {
		match self {
			TileDataValue::String(_) => 0,
			TileDataValue::Integer(_) => 1,
			TileDataValue::Float(_) => 2,
			TileDataValue::Boolean(_) => 3,
			TileDataValue::Color(_) => 4,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TileData {
	pub id: i32,
	/// Cell of the tile in the atlas grid.
	pub grid_position: IVec2,
	/// Pixel `[x, y, w, h]` in the atlas texture.
	pub texture_region: Vec4,
	pub collision: TileCollisionShape,
	pub custom_data: IndexMap<String, TileDataValue>,
}

impl TileData {
	pub fn new(id: i32, grid_position: IVec2) -> Self {
		Self {
			id,
			grid_position,
			..Self::default()
		}
	}
}

/// A texture cut into a grid of equally sized tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct Tileset2D {
	pub texture_path: String,
	/// Pixels.
	pub tile_size: IVec2,
	/// Columns and rows.
	pub grid_size: IVec2,
	/// Pixels between neighbouring tiles.
	pub spacing: i32,
	/// Pixels around the whole grid.
	pub margin: i32,
	tiles: BTreeMap<i32, TileData>,
}

impl Default for Tileset2D {
	fn default() -> Self {
		Self {
			texture_path: String::new(),
			tile_size: IVec2::splat(32),
			grid_size: IVec2::ONE,
			spacing: 0,
			margin: 0,
			tiles: BTreeMap::new(),
		}
	}
}

impl Tileset2D {
	pub fn new(texture_path: &str, tile_size: IVec2, grid_size: IVec2) -> Self {
		Self {
			texture_path: texture_path.to_owned(),
			tile_size,
			grid_size,
			..Self::default()
		}
	}

	/// Replaces any tile with the same id.
	pub fn add_tile(&mut self, tile: TileData) {
		self.tiles.insert(tile.id, tile);
	}

	pub fn remove_tile(&mut self, id: i32) -> Option<TileData> {
		self.tiles.remove(&id)
	}

	pub fn tile(&self, id: i32) -> Option<&TileData> {
		self.tiles.get(&id)
	}

	pub fn tile_mut(&mut self, id: i32) -> Option<&mut TileData> {
		self.tiles.get_mut(&id)
	}

	pub fn tile_at(&self, grid_position: IVec2) -> Option<&TileData> {
		self.tiles.values().find(|t| t.grid_position == grid_position)
	}

	/// Tiles by ascending id.
	pub fn tiles(&self) -> impl Iterator<Item = &TileData> {
		self.tiles.values()
	}

	pub fn tile_ids(&self) -> Vec<i32> {
		self.tiles.keys().copied().collect()
	}

	pub fn clear_tiles(&mut self) {
		self.tiles.clear();
	}

	/// Pixel region of a grid cell, honouring margin and spacing.
	pub fn texture_region(&self, grid_position: IVec2) -> Vec4 {
		let pos = IVec2::splat(self.margin) + grid_position * (self.tile_size + IVec2::splat(self.spacing));
		Vec4::new(pos.x as f32, pos.y as f32, self.tile_size.x as f32, self.tile_size.y as f32)
	}

	/// Normalizes a pixel region against the atlas size, clamped to the texture.
	pub fn normalize_region(region: Vec4, texture_size: UVec2) -> Vec4 {
		if texture_size.cmpeq(UVec2::ZERO).any() {
			return FULL_UV;
		}
		let size = texture_size.as_vec2();
		let start = (Vec2::new(region.x, region.y) / size).clamp(Vec2::ZERO, Vec2::ONE);
		let end = (Vec2::new(region.x + region.z, region.y + region.w) / size).clamp(Vec2::ZERO, Vec2::ONE);
		Vec4::new(start.x, start.y, end.x - start.x, end.y - start.y)
	}

	pub fn grid_position_of(&self, id: i32) -> IVec2 {
		if self.grid_size.x <= 0 {
			return IVec2::ZERO;
		}
		IVec2::new(id % self.grid_size.x, id / self.grid_size.x)
	}

	pub fn id_at(&self, grid_position: IVec2) -> i32 {
		grid_position.y * self.grid_size.x + grid_position.x
	}

	/// Replaces every tile with one plain tile per grid cell, ids counted row by row.
	pub fn generate_tiles_from_grid(&mut self) {
		self.tiles.clear();
		for y in 0..self.grid_size.y {
			for x in 0..self.grid_size.x {
				let pos = IVec2::new(x, y);
				let mut tile = TileData::new(self.id_at(pos), pos);
				tile.texture_region = self.texture_region(pos);
				self.tiles.insert(tile.id, tile);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use glam::{ivec2, uvec2, vec4};

	use super::*;

	#[test]
	fn grid_regions_with_margin_and_spacing() {
		let mut set = Tileset2D::new("atlas.png", ivec2(16, 16), ivec2(3, 2));
		set.margin = 2;
		set.spacing = 1;
		assert_eq!(set.texture_region(ivec2(2, 1)), vec4(36.0, 19.0, 16.0, 16.0));

		set.generate_tiles_from_grid();
		assert_eq!(set.tile_ids(), [0, 1, 2, 3, 4, 5]);
		assert_eq!(set.tile(4).unwrap().grid_position, ivec2(1, 1));
		assert_eq!(set.tile_at(ivec2(2, 0)).unwrap().id, 2);
		assert_eq!(set.grid_position_of(5), ivec2(2, 1));
	}

	#[test]
	fn normalized_regions() {
		let region = vec4(16.0, 0.0, 16.0, 16.0);
		assert_eq!(Tileset2D::normalize_region(region, uvec2(64, 32)), vec4(0.25, 0.0, 0.25, 0.5));
		assert_eq!(Tileset2D::normalize_region(region, UVec2::ZERO), FULL_UV);
		assert_eq!(
			Tileset2D::normalize_region(vec4(48.0, 0.0, 32.0, 32.0), uvec2(64, 32)),
			vec4(0.75, 0.0, 0.25, 1.0)
		);
	}
}
