//! The `.tileset` document.
//!
//! ```text
//! { "type": "Tileset2D", "version", "texture_path", "tile_size": [w, h], "grid_size": [c, r],
//!   "spacing", "margin",
//!   "tiles": [{ "id", "grid_position": [x, y], "texture_region": [x, y, w, h],
//!               "collision": { "type", "offset", "size", "points": [[x, y]] },
//!               "custom_data": { name: { "type", "value" } } }] }
//! ```

use std::path::Path;

use glam::Vec2;
use json::JsonValue;
use tracing::warn;

use crate::tileset::{TileCollisionKind, TileCollisionShape, TileData, TileDataValue, Tileset2D};
use crate::RESOURCE_FORMAT_VERSION;

use super::json::{floats, num, optional, vec2_json, vec4_json, JsonError, JsonObject};
use super::{
	as_object, expect_type, parse_document, read_file, resource_error, vals, write_file, LoadError,
	ResourceParseError, ResourceParseResult,
};

pub const TILESET_TYPE: &str = "Tileset2D";

pub fn serialize_tileset(set: &Tileset2D) -> JsonValue {
	let mut obj = json::object::Object::new();
	obj.insert("type", TILESET_TYPE.into());
	obj.insert("version", RESOURCE_FORMAT_VERSION.into());
	obj.insert("texture_path", set.texture_path.as_str().into());
	obj.insert("tile_size", vec2_json(set.tile_size.as_vec2()));
	obj.insert("grid_size", vec2_json(set.grid_size.as_vec2()));
	obj.insert("spacing", set.spacing.into());
	obj.insert("margin", set.margin.into());
	obj.insert("tiles", JsonValue::Array(set.tiles().map(serialize_tile).collect()));
	JsonValue::Object(obj)
}

fn serialize_tile(tile: &TileData) -> JsonValue {
	let mut obj = json::object::Object::new();
	obj.insert("id", tile.id.into());
	obj.insert("grid_position", vec2_json(tile.grid_position.as_vec2()));
	obj.insert("texture_region", vec4_json(tile.texture_region));

	let shape = &tile.collision;
	let mut collision = json::object::Object::new();
	collision.insert("type", shape.kind.index().into());
	collision.insert("offset", vec2_json(shape.offset));
	collision.insert("size", vec2_json(shape.size));
	collision.insert("points", JsonValue::Array(shape.points.iter().map(|p| vec2_json(*p)).collect()));
	obj.insert("collision", JsonValue::Object(collision));

	let mut custom = json::object::Object::new();
	for (name, value) in &tile.custom_data {
		let mut entry = json::object::Object::new();
		entry.insert("type", value.type_index().into());
		let value = match value {
			TileDataValue::String(s) => s.as_str().into(),
			TileDataValue::Integer(i) => (*i).into(),
			TileDataValue::Float(f) => num(*f),
			TileDataValue::Boolean(b) => (*b).into(),
			TileDataValue::Color(c) => vec4_json(*c),
		};
		entry.insert("value", value);
		custom.insert(name, JsonValue::Object(entry));
	}
	obj.insert("custom_data", JsonValue::Object(custom));
	JsonValue::Object(obj)
}

pub fn tileset_to_string(set: &Tileset2D) -> String {
	json::stringify_pretty(serialize_tileset(set), 4)
}

pub fn deserialize_tileset(payload: &JsonValue) -> ResourceParseResult<Tileset2D> {
	let obj = as_object("(tileset)", payload)?;
	expect_type(obj, TILESET_TYPE)?;

	let mut set = Tileset2D::new(
		obj.get_str("texture_path")?,
		obj.get_vec2("tile_size")?.as_ivec2(),
		obj.get_vec2("grid_size")?.as_ivec2(),
	);
	set.spacing = optional(obj.get_i32("spacing"))?.unwrap_or(0);
	set.margin = optional(obj.get_i32("margin"))?.unwrap_or(0);

	let tiles = optional(obj.get_list("tiles"))?.unwrap_or_default();
	for (i, tile) in tiles.iter().enumerate() {
		let tile = vals("tiles", deserialize_tile(tile).map_err(|e| e.in_list(i)))?;
		set.add_tile(tile);
	}
	Ok(set)
}

fn deserialize_tile(val: &JsonValue) -> ResourceParseResult<TileData> {
	let obj = as_object("(tile)", val)?;
	let mut tile = TileData::new(obj.get_i32("id")?, obj.get_vec2("grid_position")?.as_ivec2());
	tile.texture_region = obj.get_vec4("texture_region")?;

	if let Some(collision) = optional(obj.get_object("collision"))? {
		tile.collision = vals("collision", deserialize_collision(collision))?;
	}
	if let Some(custom) = optional(obj.get_object("custom_data"))? {
		for (name, entry) in custom.0.iter() {
			let value = vals("custom_data", deserialize_data_value(entry).map_err(|e| e.nested(name)))?;
			tile.custom_data.insert(name.to_owned(), value);
		}
	}
	Ok(tile)
}

fn deserialize_collision(obj: JsonObject) -> ResourceParseResult<TileCollisionShape> {
	let index = optional(obj.get_i32("type"))?.unwrap_or(0);
	let kind = TileCollisionKind::from_index(index).unwrap_or_else(|| {
		warn!("Unknown tile collision type {}, treating it as none", index);
		TileCollisionKind::None
	});

	let mut points = Vec::new();
	for (i, point) in optional(obj.get_list("points"))?.unwrap_or_default().iter().enumerate() {
		let JsonValue::Array(list) = point else {
			return Err(JsonError::ValueIsNotList("points".to_owned()).in_list(i).into());
		};
		points.push(Vec2::from_array(floats("points", list)?));
	}

	Ok(TileCollisionShape {
		kind,
		offset: optional(obj.get_vec2("offset"))?.unwrap_or_default(),
		size: optional(obj.get_vec2("size"))?.unwrap_or_default(),
		points,
	})
}

fn deserialize_data_value(val: &JsonValue) -> ResourceParseResult<TileDataValue> {
	let obj = as_object("(custom data)", val)?;
	let value = match obj.get_i32("type")? {
		0 => TileDataValue::String(obj.get_str("value")?.to_owned()),
		1 => TileDataValue::Integer(obj.get_i32("value")?),
		2 => TileDataValue::Float(obj.get_f32("value")?),
		3 => TileDataValue::Boolean(obj.get_bool("value")?),
		4 => TileDataValue::Color(obj.get_vec4("value")?),
		unknown => return Err(ResourceParseError::UnknownTileDataType(unknown)),
	};
	Ok(value)
}

pub fn parse_tileset(text: &str) -> ResourceParseResult<Tileset2D> {
	deserialize_tileset(&parse_document(text)?)
}

pub fn load_tileset_file(path: impl AsRef<Path>) -> Result<Tileset2D, LoadError> {
	let path = path.as_ref();
	parse_tileset(&read_file(path)?).map_err(resource_error(path))
}

pub fn save_tileset_file(set: &Tileset2D, path: impl AsRef<Path>) -> Result<(), LoadError> {
	write_file(path.as_ref(), &tileset_to_string(set))
}

#[cfg(test)]
mod tests {
	use glam::{ivec2, vec2, vec4};

	use super::*;

	const ATLAS: &str = r#"{
		"type": "Tileset2D",
		"version": "1.0",
		"texture_path": "tiles/terrain.png",
		"tile_size": [16, 16],
		"grid_size": [4, 4],
		"spacing": 0,
		"margin": 0,
		"tiles": [
			{
				"id": 5,
				"grid_position": [1, 1],
				"texture_region": [16, 16, 16, 16],
				"collision": { "type": 3, "offset": [0, 0], "size": [16, 16], "points": [[0, 0], [16, 0], [8, 16]] },
				"custom_data": {
					"name": { "type": 0, "value": "grass" },
					"tint": { "type": 4, "value": [0.5, 1, 0.5, 1] }
				}
			},
			{ "id": 0, "grid_position": [0, 0], "texture_region": [0, 0, 16, 16] }
		]
	}"#;

	#[test]
	fn reads_atlas() {
		let set = parse_tileset(ATLAS).unwrap();
		assert_eq!(set.texture_path, "tiles/terrain.png");
		assert_eq!(set.grid_size, ivec2(4, 4));
		assert_eq!(set.tile_ids(), [0, 5]);

		let grass = set.tile(5).unwrap();
		assert_eq!(grass.collision.kind, TileCollisionKind::Polygon);
		assert_eq!(grass.collision.points[2], vec2(8.0, 16.0));
		assert_eq!(grass.custom_data["name"], TileDataValue::String("grass".to_owned()));
		assert_eq!(grass.custom_data["tint"], TileDataValue::Color(vec4(0.5, 1.0, 0.5, 1.0)));
		assert_eq!(set.tile(0).unwrap().collision, TileCollisionShape::default());
	}

	#[test]
	fn written_atlas_reads_back() {
		let mut set = parse_tileset(ATLAS).unwrap();
		set.margin = 1;
		let text = tileset_to_string(&set);
		assert_eq!(parse_tileset(&text).unwrap(), set);
	}

	#[test]
	fn rejects_bad_documents() {
		assert!(matches!(
			parse_tileset(r#"{"type": "SpriteAnimation"}"#),
			Err(ResourceParseError::WrongResourceType { .. })
		));
		let bad_value = ATLAS.replace(r#""type": 0, "value": "grass""#, r#""type": 9, "value": "grass""#);
		assert!(matches!(parse_tileset(&bad_value), Err(ResourceParseError::UnknownTileDataType(9))));
	}
}
