//! The `.anim` document.
//!
//! ```text
//! { "type": "TweenAnimation", "version",
//!   "clips": { name: { "duration", "looping",
//!     "tracks": [{ "node_path", "property_name", "property_type",
//!                  "keyframes": [{ "time", "value": { "type", "raw" }, "interpolation" }] }] } } }
//! ```
//!
//! Older files keep `clips` as a list of objects carrying their `name`, use enumeration
//! indices for `property_type` and `interpolation`, and store the raw value directly.
//! Both layouts are read, the keyed one is written.

use std::path::Path;

use glam::{Quat, Vec2, Vec3, Vec4};
use json::JsonValue;
use tracing::warn;

use crate::animation::{AnimType, AnimValue, AnimationClip, AnimationResource, Keyframe, Track};
use crate::math::easing::Interpolation;
use crate::RESOURCE_FORMAT_VERSION;

use super::json::{
	floats, num, optional, quat_json, vec2_json, vec3_json, vec4_json, JsonError, JsonObject, SerialExtend,
};
use super::{
	as_object, expect_type, parse_document, read_file, resource_error, vals, write_file, LoadError,
	ResourceParseError, ResourceParseResult,
};

pub const ANIMATION_TYPE: &str = "TweenAnimation";

pub fn serialize_animation(res: &AnimationResource) -> JsonValue {
	let mut clips = json::object::Object::new();
	for clip in res.clips() {
		clips.insert(&clip.name, serialize_clip(clip));
	}

	let mut obj = json::object::Object::new();
	obj.insert("type", ANIMATION_TYPE.into());
	obj.insert("version", RESOURCE_FORMAT_VERSION.into());
	obj.insert("clips", JsonValue::Object(clips));
	JsonValue::Object(obj)
}

fn serialize_clip(clip: &AnimationClip) -> JsonValue {
	let mut obj = json::object::Object::new();
	obj.insert("duration", num(clip.duration));
	obj.insert("looping", clip.looping.into());
	obj.insert("tracks", JsonValue::Array(clip.tracks.iter().map(serialize_track).collect()));
	JsonValue::Object(obj)
}

fn serialize_track(track: &Track) -> JsonValue {
	let mut obj = json::object::Object::new();
	obj.insert("node_path", track.node_path.as_str().into());
	obj.insert("property_name", track.property_name.as_str().into());
	obj.insert("property_type", track.property_type.as_str().into());

	let keyframes = track.keyframes.iter().map(|k| {
		let mut value = json::object::Object::new();
		value.insert("type", k.value.ty().as_str().into());
		value.insert("raw", raw_value_json(k.value));

		let mut kf = json::object::Object::new();
		kf.insert("time", num(k.time));
		kf.insert("value", JsonValue::Object(value));
		kf.insert("interpolation", k.interpolation.as_str().into());
		JsonValue::Object(kf)
	});
	obj.insert("keyframes", JsonValue::Array(keyframes.collect()));
	JsonValue::Object(obj)
}

fn raw_value_json(value: AnimValue) -> JsonValue {
	match value {
		AnimValue::Float(v) => num(v),
		AnimValue::Vec2(v) => vec2_json(v),
		AnimValue::Vec3(v) => vec3_json(v),
		AnimValue::Vec4(v) | AnimValue::Color(v) => vec4_json(v),
		AnimValue::Quat(q) => quat_json(q),
		AnimValue::Bool(v) => v.into(),
		AnimValue::Int(v) => v.into(),
	}
}

pub fn animation_to_string(res: &AnimationResource) -> String {
	json::stringify_pretty(serialize_animation(res), 4)
}

pub fn deserialize_animation(payload: &JsonValue) -> ResourceParseResult<AnimationResource> {
	let obj = as_object("(animation)", payload)?;
	expect_type(obj, ANIMATION_TYPE)?;

	let mut res = AnimationResource::new();
	match obj.get("clips")? {
		JsonValue::Object(clips) => {
			for (name, clip) in clips.iter() {
				let clip = vals("clips", deserialize_clip(Some(name), clip).map_err(|e| e.nested(name)))?;
				res.add_clip(clip);
			}
		}
		JsonValue::Array(clips) => {
			for (i, clip) in clips.iter().enumerate() {
				let clip = vals("clips", deserialize_clip(None, clip).map_err(|e| e.in_list(i)))?;
				res.add_clip(clip);
			}
		}
		_ => return Err(JsonError::ValueIsNotList("clips".to_owned()).into()),
	}
	Ok(res)
}

fn deserialize_clip(name: Option<&str>, val: &JsonValue) -> ResourceParseResult<AnimationClip> {
	let obj = as_object("(clip)", val)?;
	let name = match name {
		Some(name) => name,
		None => obj.get_str("name")?,
	};
	let mut clip = AnimationClip::new(
		name,
		optional(obj.get_f32("duration"))?.unwrap_or(0.0),
		optional(obj.get_bool("looping"))?.unwrap_or(false),
	);

	for (i, track) in optional(obj.get_list("tracks"))?.unwrap_or_default().iter().enumerate() {
		let mut track = vals("tracks", deserialize_track(track).map_err(|e| e.in_list(i)))?;
		if track.sort_keyframes() {
			warn!(
				"Keyframes of {:?}.{} in clip {:?} were out of order and have been sorted",
				track.node_path, track.property_name, clip.name
			);
		}
		clip.tracks.push(track);
	}
	Ok(clip)
}

fn deserialize_track(val: &JsonValue) -> ResourceParseResult<Track> {
	let obj = as_object("(track)", val)?;
	let ty = anim_type(obj.get("property_type")?)?;
	let mut track = Track::new(obj.get_str("node_path")?, obj.get_str("property_name")?, ty);

	// pushed in file order so the caller can tell an unsorted track apart
	for (i, kf) in obj.get_list("keyframes")?.iter().enumerate() {
		let kf = vals("keyframes", deserialize_keyframe(ty, kf).map_err(|e| e.in_list(i)))?;
		track.keyframes.push(kf);
	}
	Ok(track)
}

fn deserialize_keyframe(ty: AnimType, val: &JsonValue) -> ResourceParseResult<Keyframe> {
	let obj = as_object("(keyframe)", val)?;
	let interpolation = match optional(obj.get("interpolation"))? {
		Some(val) => interpolation(val)?,
		None => Interpolation::Linear,
	};

	let value = obj.get("value")?;
	let value = match value.as_object() {
		Some(tagged) => {
			let tagged = JsonObject(tagged);
			if let Some(tag) = optional(tagged.get("type"))? {
				let tag = anim_type(tag)?;
				if tag != ty {
					return Err(ResourceParseError::ValueTypeMismatch(ty.to_string()));
				}
			}
			raw_value(ty, tagged.get("raw")?)?
		}
		None => raw_value(ty, value)?,
	};
	Ok(Keyframe::new(obj.get_f32("time")?, value, interpolation))
}

/// Type name or enumeration index.
fn anim_type(val: &JsonValue) -> ResourceParseResult<AnimType> {
	if let Some(name) = val.as_str() {
		return AnimType::try_from(name).map_err(|e| ResourceParseError::UnknownPropertyType(e.0));
	}
	val.as_usize()
		.and_then(AnimType::from_index)
		.ok_or_else(|| ResourceParseError::UnknownPropertyType(val.dump()))
}

fn interpolation(val: &JsonValue) -> ResourceParseResult<Interpolation> {
	if let Some(name) = val.as_str() {
		return Interpolation::try_from(name).map_err(|e| ResourceParseError::UnknownInterpolation(e.0));
	}
	val.as_usize()
		.and_then(Interpolation::from_index)
		.ok_or_else(|| ResourceParseError::UnknownInterpolation(val.dump()))
}

fn raw_value(ty: AnimType, val: &JsonValue) -> ResourceParseResult<AnimValue> {
	let mismatch = || ResourceParseError::ValueTypeMismatch(ty.to_string());
	let list = match val {
		JsonValue::Array(list) => list.as_slice(),
		_ => &[],
	};

	let value = match ty {
		AnimType::Float => AnimValue::Float(val.as_f32().ok_or_else(mismatch)?),
		AnimType::Int => AnimValue::Int(val.as_i32().ok_or_else(mismatch)?),
		AnimType::Bool => AnimValue::Bool(val.as_bool().ok_or_else(mismatch)?),
		AnimType::Vec2 => AnimValue::Vec2(Vec2::from_array(floats("raw", list)?)),
		AnimType::Vec3 => AnimValue::Vec3(Vec3::from_array(floats("raw", list)?)),
		AnimType::Vec4 => AnimValue::Vec4(Vec4::from_array(floats("raw", list)?)),
		AnimType::Color => AnimValue::Color(Vec4::from_array(floats("raw", list)?)),
		AnimType::Quat => AnimValue::Quat(Quat::from_array(floats("raw", list)?).normalize()),
	};
	Ok(value)
}

pub fn parse_animation(text: &str) -> ResourceParseResult<AnimationResource> {
	deserialize_animation(&parse_document(text)?)
}

pub fn load_animation_file(path: impl AsRef<Path>) -> Result<AnimationResource, LoadError> {
	let path = path.as_ref();
	parse_animation(&read_file(path)?).map_err(resource_error(path))
}

pub fn save_animation_file(res: &AnimationResource, path: impl AsRef<Path>) -> Result<(), LoadError> {
	write_file(path.as_ref(), &animation_to_string(res))
}
