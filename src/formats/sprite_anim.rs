//! The `.spriteanim` document.
//!
//! ```text
//! { "type": "SpriteAnimation", "version", "texture_path", "sprite_size": [w, h],
//!   "sheet_size": [w, h], "default_animation",
//!   "animations": [{ "name", "looping", "speed_scale",
//!                    "frames": [{ "texture_region": [x, y, w, h], "duration" }] }] }
//! ```

use std::path::Path;

use json::JsonValue;

use crate::animation::sprite::{SpriteAnimation, SpriteAnimationResource, SpriteFrame};
use crate::RESOURCE_FORMAT_VERSION;

use super::json::{num, optional, vec2_json, vec4_json, JsonObject};
use super::{
	as_object, expect_type, parse_document, read_file, resource_error, vals, write_file, LoadError,
	ResourceParseResult,
};

pub const SPRITE_ANIMATION_TYPE: &str = "SpriteAnimation";

pub fn serialize_sprite_animation(res: &SpriteAnimationResource) -> JsonValue {
	let mut obj = json::object::Object::new();
	obj.insert("type", SPRITE_ANIMATION_TYPE.into());
	obj.insert("version", RESOURCE_FORMAT_VERSION.into());
	obj.insert("texture_path", res.texture_path.as_str().into());
	obj.insert("sprite_size", vec2_json(res.sprite_size.as_vec2()));
	obj.insert("sheet_size", vec2_json(res.sheet_size.as_vec2()));
	obj.insert("default_animation", res.default_animation.as_str().into());
	obj.insert(
		"animations",
		JsonValue::Array(res.animations().map(serialize_animation).collect()),
	);
	JsonValue::Object(obj)
}

fn serialize_animation(anim: &SpriteAnimation) -> JsonValue {
	let mut obj = json::object::Object::new();
	obj.insert("name", anim.name.as_str().into());
	obj.insert("looping", anim.looping.into());
	obj.insert("speed_scale", num(anim.speed_scale));
	obj.insert(
		"frames",
		JsonValue::Array(
			anim.frames
				.iter()
				.map(|frame| {
					let mut f = json::object::Object::new();
					f.insert("texture_region", vec4_json(frame.texture_region));
					f.insert("duration", num(frame.duration));
					JsonValue::Object(f)
				})
				.collect(),
		),
	);
	JsonValue::Object(obj)
}

pub fn sprite_animation_to_string(res: &SpriteAnimationResource) -> String {
	json::stringify_pretty(serialize_sprite_animation(res), 4)
}

pub fn deserialize_sprite_animation(payload: &JsonValue) -> ResourceParseResult<SpriteAnimationResource> {
	let obj = as_object("(sprite animation)", payload)?;
	expect_type(obj, SPRITE_ANIMATION_TYPE)?;

	let mut res = SpriteAnimationResource::new(
		optional(obj.get_str("texture_path"))?.unwrap_or_default(),
		optional(obj.get_vec2("sprite_size"))?.unwrap_or_default().as_ivec2(),
		optional(obj.get_vec2("sheet_size"))?.unwrap_or_default().as_ivec2(),
	);
	res.default_animation = optional(obj.get_str("default_animation"))?.unwrap_or_default().to_owned();

	let animations = vals("animations", optional(obj.get_list("animations")).map_err(Into::into))?;
	for (i, anim) in animations.unwrap_or_default().iter().enumerate() {
		let anim = vals("animations", deserialize_animation(anim).map_err(|e| e.in_list(i)))?;
		res.add_animation(anim);
	}
	Ok(res)
}

fn deserialize_animation(val: &JsonValue) -> ResourceParseResult<SpriteAnimation> {
	let obj = as_object("(animation)", val)?;
	let mut anim = SpriteAnimation::new(obj.get_str("name")?);
	anim.looping = optional(obj.get_bool("looping"))?.unwrap_or(true);
	anim.speed_scale = optional(obj.get_f32("speed_scale"))?.unwrap_or(1.0);

	for (i, frame) in obj.get_list("frames")?.iter().enumerate() {
		let frame = vals("frames", deserialize_frame(frame).map_err(|e| e.in_list(i)))?;
		anim.frames.push(frame);
	}
	Ok(anim)
}

fn deserialize_frame(val: &JsonValue) -> ResourceParseResult<SpriteFrame> {
	let obj: JsonObject = as_object("(frame)", val)?;
	Ok(SpriteFrame::new(obj.get_vec4("texture_region")?, obj.get_f32("duration")?))
}

pub fn parse_sprite_animation(text: &str) -> ResourceParseResult<SpriteAnimationResource> {
	deserialize_sprite_animation(&parse_document(text)?)
}

pub fn load_sprite_animation_file(path: impl AsRef<Path>) -> Result<SpriteAnimationResource, LoadError> {
	let path = path.as_ref();
	parse_sprite_animation(&read_file(path)?).map_err(resource_error(path))
}

pub fn save_sprite_animation_file(res: &SpriteAnimationResource, path: impl AsRef<Path>) -> Result<(), LoadError> {
	write_file(path.as_ref(), &sprite_animation_to_string(res))
}
