use glam::{IVec2, Mat4, Vec2, Vec4};
use json::JsonValue;
use tracing::{debug, error, warn};

use crate::component::{impl_component_base, Component, ComponentBase, DrawCtx, NodeCtx};
use crate::formats::tileset::parse_tileset;
use crate::math::rect::Rect;
use crate::node::NodeUuid;
use crate::render::{rect_transform, DrawSpace, Quad, Renderer, FULL_UV};
use crate::resources::Services;
use crate::scene::tree::NodeTree;
use crate::tileset::Tileset2D;
use crate::value::{ExportType, PropertyValue};

use super::{resolve_texture, world_matrix};

/// Tile id of a cell with nothing in it. Every negative id counts as empty.
pub const EMPTY_TILE: i32 = -1;

/// Largest number of cells a map may hold.
pub const MAX_MAP_CELLS: usize = 4096 * 4096;

const GRID_LINE_WIDTH: f32 = 1.0;

#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
#[error("Map size {0} exceeds {MAX_MAP_CELLS} cells")]
pub struct MapSizeError(pub IVec2);

/// Row-major grid of tile ids.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
	size: IVec2,
	tiles: Vec<i32>,
}

impl Default for TileGrid {
	fn default() -> Self {
		let size = IVec2::splat(10);
		Self {
			size,
			tiles: vec![EMPTY_TILE; 100],
		}
	}
}

impl TileGrid {
	/// Empty grid. Negative dimensions count as zero.
	pub fn new(size: IVec2) -> Result<Self, MapSizeError> {
		let clamped = size.max(IVec2::ZERO);
		let cells = (clamped.x as usize)
			.checked_mul(clamped.y as usize)
			.filter(|n| *n <= MAX_MAP_CELLS)
			.ok_or(MapSizeError(size))?;
		Ok(Self {
			size: clamped,
			tiles: vec![EMPTY_TILE; cells],
		})
	}

	pub fn size(&self) -> IVec2 {
		self.size
	}

	fn index(&self, pos: IVec2) -> Option<usize> {
		let inside = pos.cmpge(IVec2::ZERO).all() && pos.cmplt(self.size).all();
		inside.then(|| (pos.y * self.size.x + pos.x) as usize)
	}

	/// [`EMPTY_TILE`] outside the grid.
	pub fn get(&self, pos: IVec2) -> i32 {
		self.index(pos).map(|i| self.tiles[i]).unwrap_or(EMPTY_TILE)
	}

	/// Returns whether `pos` is inside the grid.
	pub fn set(&mut self, pos: IVec2, id: i32) -> bool {
		match self.index(pos) {
			Some(i) => {
				self.tiles[i] = id;
				true
			}
			None => false,
		}
	}

	pub fn fill(&mut self, id: i32) {
		self.tiles.fill(id);
	}

	/// Replaces the 4-connected region of equal ids around `pos`.
	pub fn flood_fill(&mut self, pos: IVec2, id: i32) {
		let original = match self.index(pos) {
			Some(i) => self.tiles[i],
			None => return,
		};
		if original == id {
			return;
		}

		let mut stack = vec![pos];
		while let Some(pos) = stack.pop() {
			let Some(i) = self.index(pos) else {
				continue;
			};
			if self.tiles[i] != original {
				continue;
			}
			self.tiles[i] = id;
			stack.extend([IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y].map(|d| pos + d));
		}
	}

	/// Keeps the overlapping cells, new cells are empty. An oversized grid leaves this one
	/// untouched.
	pub fn resize(&mut self, size: IVec2) -> Result<(), MapSizeError> {
		let mut resized = TileGrid::new(size)?;
		let overlap = self.size.min(resized.size);
		for y in 0..overlap.y {
			for x in 0..overlap.x {
				let pos = IVec2::new(x, y);
				resized.set(pos, self.get(pos));
			}
		}
		*self = resized;
		Ok(())
	}

	/// Non-empty cells, row by row.
	pub fn occupied(&self) -> impl Iterator<Item = (IVec2, i32)> + '_ {
		let width = self.size.x.max(1);
		self.tiles
			.iter()
			.enumerate()
			.filter(|(_, id)| **id >= 0)
			.map(move |(i, id)| (IVec2::new(i as i32 % width, i as i32 / width), *id))
	}

	/// `{"size":[w,h],"tiles":[...]}`
	pub fn to_json_string(&self) -> String {
		let mut obj = json::object::Object::new();
		obj.insert("size", JsonValue::Array(vec![self.size.x.into(), self.size.y.into()]));
		obj.insert("tiles", JsonValue::Array(self.tiles.iter().map(|id| (*id).into()).collect()));
		json::stringify(JsonValue::Object(obj))
	}

	/// Reads [`to_json_string`](Self::to_json_string) output. A short or long tile list is
	/// padded with empty cells or cut to the size. `None` for malformed or oversized data.
	pub fn from_json_str(text: &str) -> Option<Self> {
		let doc = json::parse(text).ok()?;
		let size = IVec2::new(doc["size"][0].as_i32()?, doc["size"][1].as_i32()?);
		let JsonValue::Array(list) = &doc["tiles"] else {
			return None;
		};
		let mut grid = TileGrid::new(size).ok()?;
		for (cell, val) in grid.tiles.iter_mut().zip(list) {
			*cell = val.as_i32()?;
		}
		Some(grid)
	}
}

/// Grid of tiles drawn from a [`Tileset2D`] at a Node2D.
#[derive(Debug)]
pub struct Tilemap2D {
	base: ComponentBase,
	pub tileset_path: String,
	/// Pixels per cell, before node scale.
	pub tile_size: IVec2,
	pub modulate: Vec4,
	pub show_grid: bool,
	pub grid_color: Vec4,
	/// Read by a physics host, unused by the core.
	pub collision_enabled: bool,
	grid: TileGrid,
	serialized: String,
	tileset: Option<Tileset2D>,
	loaded_path: String,
}

impl Default for Tilemap2D {
	fn default() -> Self {
		let grid = TileGrid::default();
		let serialized = grid.to_json_string();
		let mut map = Self {
			base: ComponentBase::new("Tilemap2D"),
			tileset_path: String::new(),
			tile_size: IVec2::splat(32),
			modulate: Vec4::ONE,
			show_grid: false,
			grid_color: Vec4::new(1.0, 1.0, 1.0, 0.5),
			collision_enabled: false,
			grid,
			serialized,
			tileset: None,
			loaded_path: String::new(),
		};
		map.base
			.exports
			.add(
				"tileset_path",
				PropertyValue::FilePath(String::new()),
				"Path to tileset resource file",
				ExportType::FilePath,
			)
			.add("map_size", map.grid.size().as_vec2(), "Map size in tiles", ExportType::Vec2)
			.add("tile_size", map.tile_size.as_vec2(), "Tile size in pixels", ExportType::Vec2)
			.add("tilemap_data", map.serialized.as_str(), "Serialized tilemap data", ExportType::String)
			.add("modulate", PropertyValue::Color(map.modulate), "Color modulation (RGBA)", ExportType::Color)
			.add("show_grid", map.show_grid, "Show tile grid", ExportType::Bool)
			.add("grid_color", PropertyValue::Color(map.grid_color), "Grid line color (RGBA)", ExportType::Color)
			.add("collision_enabled", map.collision_enabled, "Enable collision detection", ExportType::Bool);
		map
	}
}

impl Tilemap2D {
	pub fn grid(&self) -> &TileGrid {
		&self.grid
	}

	pub fn map_size(&self) -> IVec2 {
		self.grid.size()
	}

	pub fn tileset(&self) -> Option<&Tileset2D> {
		self.tileset.as_ref()
	}

	/// Uses an in-memory tileset instead of loading `tileset_path`.
	pub fn set_tileset(&mut self, tileset: Tileset2D) {
		self.tileset = Some(tileset);
		self.loaded_path = self.tileset_path.clone();
	}

	pub fn set_tileset_path(&mut self, path: &str) {
		self.tileset_path = path.to_owned();
		self.base.sync("tileset_path", PropertyValue::FilePath(path.to_owned()));
	}

	pub fn set_tile_size(&mut self, size: IVec2) {
		self.tile_size = size;
		self.base.sync("tile_size", size.as_vec2());
	}

	pub fn set_modulate(&mut self, modulate: Vec4) {
		self.modulate = modulate;
		self.base.sync("modulate", PropertyValue::Color(modulate));
	}

	pub fn set_show_grid(&mut self, show: bool, color: Vec4) {
		self.show_grid = show;
		self.grid_color = color;
		self.base.sync("show_grid", show);
		self.base.sync("grid_color", PropertyValue::Color(color));
	}

	pub fn set_collision_enabled(&mut self, enabled: bool) {
		self.collision_enabled = enabled;
		self.base.sync("collision_enabled", enabled);
	}

	fn sync_grid(&mut self) {
		self.serialized = self.grid.to_json_string();
		self.base.sync("map_size", self.grid.size().as_vec2());
		self.base.sync("tilemap_data", self.serialized.clone());
	}

	pub fn get_tile(&self, pos: IVec2) -> i32 {
		self.grid.get(pos)
	}

	/// Returns whether `pos` is on the map.
	pub fn set_tile(&mut self, pos: IVec2, id: i32) -> bool {
		let inside = self.grid.set(pos, id);
		if inside {
			self.sync_grid();
		}
		inside
	}

	pub fn fill(&mut self, id: i32) {
		self.grid.fill(id);
		self.sync_grid();
	}

	pub fn flood_fill(&mut self, pos: IVec2, id: i32) {
		self.grid.flood_fill(pos, id);
		self.sync_grid();
	}

	pub fn clear(&mut self) {
		self.fill(EMPTY_TILE);
	}

	/// Returns whether the map took the new size. An oversized map keeps the current grid.
	pub fn resize(&mut self, size: IVec2) -> bool {
		let resized = match self.grid.resize(size) {
			Ok(()) => true,
			Err(e) => {
				warn!("Tilemap {:?} not resized: {}", self.base.name, e);
				false
			}
		};
		self.sync_grid();
		resized
	}

	/// Top-left corner of a cell in the node's local space.
	pub fn map_to_local(&self, cell: IVec2) -> Vec2 {
		(cell * self.tile_size).as_vec2()
	}

	/// Cell containing a local point. Points left of or above the map give negative cells.
	pub fn local_to_map(&self, local: Vec2) -> IVec2 {
		if self.tile_size.cmple(IVec2::ZERO).any() {
			return IVec2::ZERO;
		}
		(local / self.tile_size.as_vec2()).floor().as_ivec2()
	}

	/// Global position of a cell's top-left corner.
	pub fn tile_world_position(&self, tree: &NodeTree, owner: NodeUuid, cell: IVec2) -> Vec2 {
		tree.global_matrix_2d(owner).transform_point2(self.map_to_local(cell))
	}

	fn refresh_tileset(&mut self, services: &Services) {
		if self.tileset_path == self.loaded_path {
			return;
		}
		self.loaded_path = self.tileset_path.clone();
		self.tileset = None;
		if self.loaded_path.is_empty() {
			return;
		}

		let parsed = services
			.resources
			.read_text(&self.loaded_path)
			.map_err(|e| e.to_string())
			.and_then(|text| parse_tileset(&text).map_err(|e| e.to_string()));
		match parsed {
			Ok(set) => {
				debug!("Loaded tileset {:?}", self.loaded_path);
				self.tileset = Some(set);
			}
			Err(e) => error!("Cannot load tileset {:?}: {}", self.loaded_path, e),
		}
	}

	fn draw_grid_lines(&self, renderer: &mut dyn Renderer, world: Mat4) {
		let size = self.grid.size();
		let extent = (size * self.tile_size).as_vec2();
		let half = GRID_LINE_WIDTH * 0.5;
		let columns = (0..=size.x).map(|x| {
			Rect::new(Vec2::new((x * self.tile_size.x) as f32 - half, 0.0), Vec2::new(GRID_LINE_WIDTH, extent.y))
		});
		let rows = (0..=size.y).map(|y| {
			Rect::new(Vec2::new(0.0, (y * self.tile_size.y) as f32 - half), Vec2::new(extent.x, GRID_LINE_WIDTH))
		});
		for line in columns.chain(rows) {
			renderer.draw_quad(&Quad::solid(world * rect_transform(line), self.grid_color, DrawSpace::World));
		}
	}
}

impl Component for Tilemap2D {
	impl_component_base!();

	fn type_name(&self) -> &str {
		"Tilemap2D"
	}

	fn category(&self) -> &str {
		"2D"
	}

	fn update_from_export_variables(&mut self) {
		let e = &self.base.exports;
		self.tileset_path = e.get_or("tileset_path", std::mem::take(&mut self.tileset_path));
		self.tile_size = e.get_or("tile_size", self.tile_size.as_vec2()).as_ivec2();
		self.modulate = e.get_or("modulate", self.modulate);
		self.show_grid = e.get_or("show_grid", self.show_grid);
		self.grid_color = e.get_or("grid_color", self.grid_color);
		self.collision_enabled = e.get_or("collision_enabled", self.collision_enabled);

		let data: String = e.get_or("tilemap_data", String::new());
		let map_size = e.get_or("map_size", self.grid.size().as_vec2()).as_ivec2();
		if !data.is_empty() && data != self.serialized {
			match TileGrid::from_json_str(&data) {
				Some(grid) => {
					self.grid = grid;
					self.serialized = data;
				}
				None => warn!("Ignoring malformed or oversized tilemap data on {:?}", self.base.name),
			}
		}
		if map_size != self.grid.size() {
			self.resize(map_size);
		}
	}

	fn on_ready(&mut self, ctx: &mut NodeCtx) {
		self.update_from_export_variables();
		self.refresh_tileset(ctx.services);
	}

	fn on_update(&mut self, ctx: &mut NodeCtx, _dt: f32) {
		self.refresh_tileset(ctx.services);
	}

	fn draw(&self, ctx: &DrawCtx, renderer: &mut dyn Renderer) {
		if ctx.tree.get_node(ctx.owner).and_then(|n| n.as_2d()).is_none() {
			return;
		}
		let world = world_matrix(ctx.tree, ctx.owner);
		let tile_size = self.tile_size.as_vec2();

		if let Some(tileset) = &self.tileset {
			let (texture, texture_size) = resolve_texture(ctx, &tileset.texture_path);
			for (cell, id) in self.grid.occupied() {
				let Some(tile) = tileset.tile(id) else {
					continue;
				};
				let uv = texture_size
					.map(|size| Tileset2D::normalize_region(tile.texture_region, size))
					.unwrap_or(FULL_UV);
				let local = Rect::new(self.map_to_local(cell), tile_size);
				renderer.draw_quad(&Quad {
					transform: world * rect_transform(local),
					color: self.modulate,
					texture: texture.clone(),
					uv,
					flip_h: false,
					flip_v: false,
					space: DrawSpace::World,
				});
			}
		}

		if self.show_grid {
			self.draw_grid_lines(renderer, world);
		}
	}
}

#[cfg(test)]
mod tests {
	use glam::{ivec2, vec2, vec4};

	use super::*;
	use crate::components::testing::{record, services, single_node};
	use crate::node::Node;
	use crate::resources::MemoryResourceManager;

	mod grid {
		use super::*;

		#[test]
		fn cells_and_bounds() {
			let mut grid = TileGrid::new(ivec2(3, 2)).unwrap();
			assert!(grid.set(ivec2(2, 1), 7));
			assert!(!grid.set(ivec2(3, 0), 7));
			assert_eq!(grid.get(ivec2(2, 1)), 7);
			assert_eq!(grid.get(ivec2(-1, 0)), EMPTY_TILE);
			assert_eq!(grid.occupied().collect::<Vec<_>>(), [(ivec2(2, 1), 7)]);
		}

		#[test]
		fn flood_fill_stays_in_region() {
			let mut grid = TileGrid::new(ivec2(4, 3)).unwrap();
			// wall down the third column
			for y in 0..3 {
				grid.set(ivec2(2, y), 1);
			}
			grid.flood_fill(ivec2(0, 0), 5);
			assert_eq!(grid.get(ivec2(1, 2)), 5);
			assert_eq!(grid.get(ivec2(2, 1)), 1);
			assert_eq!(grid.get(ivec2(3, 0)), EMPTY_TILE);
		}

		#[test]
		fn resize_keeps_overlap() {
			let mut grid = TileGrid::new(ivec2(2, 2)).unwrap();
			grid.fill(3);
			grid.resize(ivec2(3, 1)).unwrap();
			assert_eq!(grid.size(), ivec2(3, 1));
			assert_eq!(grid.get(ivec2(1, 0)), 3);
			assert_eq!(grid.get(ivec2(2, 0)), EMPTY_TILE);
		}

		#[test]
		fn size_limits() {
			assert_eq!(TileGrid::new(ivec2(-3, 5)).unwrap().size(), ivec2(0, 5));
			assert_eq!(TileGrid::new(ivec2(70000, 70000)), Err(MapSizeError(ivec2(70000, 70000))));
			assert!(TileGrid::new(ivec2(4097, 4096)).is_err());
			assert!(TileGrid::new(ivec2(i32::MAX, i32::MAX)).is_err());

			let mut grid = TileGrid::new(ivec2(2, 2)).unwrap();
			grid.fill(1);
			assert!(grid.resize(ivec2(70000, 70000)).is_err());
			assert_eq!(grid.size(), ivec2(2, 2));
			assert_eq!(grid.get(ivec2(1, 1)), 1);
			assert_eq!(TileGrid::from_json_str(r#"{"size":[70000,70000],"tiles":[]}"#), None);
		}

		#[test]
		fn serialized_form() {
			let mut grid = TileGrid::new(ivec2(2, 1)).unwrap();
			grid.set(ivec2(1, 0), 4);
			assert_eq!(grid.to_json_string(), r#"{"size":[2,1],"tiles":[-1,4]}"#);
			assert_eq!(TileGrid::from_json_str(&grid.to_json_string()), Some(grid));

			let padded = TileGrid::from_json_str(r#"{"size":[2,2],"tiles":[0]}"#).unwrap();
			assert_eq!(padded.get(ivec2(0, 0)), 0);
			assert_eq!(padded.get(ivec2(1, 1)), EMPTY_TILE);
			assert_eq!(TileGrid::from_json_str(r#"{"tiles":[]}"#), None);
		}
	}

	mod component {
		use super::*;

		fn atlas() -> Tileset2D {
			let mut set = Tileset2D::new("terrain.png", ivec2(16, 16), ivec2(2, 1));
			set.generate_tiles_from_grid();
			set
		}

		#[test]
		fn edits_keep_exports_in_sync() {
			let mut map = Tilemap2D::default();
			map.resize(ivec2(2, 1));
			map.set_tile(ivec2(0, 0), 1);

			let c: &dyn Component = &map;
			assert_eq!(c.get_export("map_size", Vec2::ZERO), vec2(2.0, 1.0));
			assert_eq!(
				c.get_export("tilemap_data", String::new()),
				r#"{"size":[2,1],"tiles":[1,-1]}"#
			);
		}

		#[test]
		fn data_export_reloads_grid() {
			let mut map = Tilemap2D::default();
			let c: &mut dyn Component = &mut map;
			c.set_export("tilemap_data", PropertyValue::String(r#"{"size":[3,1],"tiles":[0,1,-1]}"#.to_owned()))
				.unwrap();
			c.set_export("map_size", PropertyValue::Vec2(vec2(3.0, 1.0))).unwrap();
			c.update_from_export_variables();
			assert_eq!(map.map_size(), ivec2(3, 1));
			assert_eq!(map.get_tile(ivec2(1, 0)), 1);
		}

		#[test]
		fn oversized_map_in_scene_keeps_grid() {
			let text = r#"{
				"name": "S",
				"root": {
					"name": "Root", "type": "Node2D",
					"components": [{
						"type": "Tilemap2D",
						"export_variables": {
							"map_size": { "type": "vec2", "value": [70000, 70000] },
							"tilemap_data": { "type": "string", "value": "{\"size\":[70000,70000],\"tiles\":[]}" }
						}
					}]
				}
			}"#;
			let scene = crate::formats::scene::parse_scene(text).unwrap();
			let root = scene.root().unwrap().root();
			let map = root.get_component::<Tilemap2D>().unwrap();
			assert_eq!(map.map_size(), ivec2(10, 10));

			let c: &dyn Component = map;
			assert_eq!(c.get_export("map_size", Vec2::ZERO), vec2(10.0, 10.0));
		}

		#[test]
		fn coordinate_conversion() {
			let map = Tilemap2D::default();
			assert_eq!(map.map_to_local(ivec2(2, 3)), vec2(64.0, 96.0));
			assert_eq!(map.local_to_map(vec2(63.9, 96.0)), ivec2(1, 3));
			assert_eq!(map.local_to_map(vec2(-1.0, 0.0)), ivec2(-1, 0));
		}

		#[test]
		fn draws_occupied_cells() {
			let (tree, owner) = single_node(Node::new_2d("Map"));
			let res = MemoryResourceManager::default().with_texture("terrain.png", 32, 16);
			let mut map = Tilemap2D::default();
			map.set_tileset(atlas());
			map.set_tile_size(ivec2(16, 16));
			map.set_tile(ivec2(1, 0), 1);
			map.set_tile(ivec2(0, 1), 9);

			let rec = record(&tree, owner, &map, &services(res));
			let quads: Vec<_> = rec.quads().collect();
			// id 9 is not in the atlas
			assert_eq!(quads.len(), 1);
			assert_eq!(quads[0].uv, vec4(0.5, 0.0, 0.5, 1.0));
			assert_eq!(quads[0].transform, rect_transform(Rect::new(vec2(16.0, 0.0), vec2(16.0, 16.0))));
		}

		#[test]
		fn grid_lines() {
			let (tree, owner) = single_node(Node::new_2d("Map"));
			let mut map = Tilemap2D::default();
			map.resize(ivec2(2, 1));
			map.set_show_grid(true, Vec4::ONE);

			let rec = record(&tree, owner, &map, &services(MemoryResourceManager::default()));
			assert_eq!(rec.quads().count(), 3 + 2);
		}
	}
}
