//! JSON API wrapper, with methods and structs similar to Java's `org.json`.

use glam::{Quat, Vec2, Vec3, Vec4};
use json::JsonValue;

pub(crate) trait SerialExtend {
	fn as_object(&self) -> Option<&json::object::Object>;
}

impl SerialExtend for json::JsonValue {
	fn as_object(&self) -> Option<&json::object::Object> {
		if let json::JsonValue::Object(obj) = self {
			Some(obj)
		} else {
			None
		}
	}
}

pub type JsonResult<T> = Result<T, JsonError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum JsonError {
	#[error("Key {0:?} does not exist")]
	KeyDoesNotExist(String),
	#[error("Value at {0:?} is not an object")]
	ValueIsNotObject(String),
	#[error("Value at {0:?} is not a list")]
	ValueIsNotList(String),
	#[error("Value at {0:?} is not a string")]
	ValueIsNotString(String),
	#[error("Value at {0:?} is not a number")]
	ValueIsNotNumber(String),
	#[error("Value at {0:?} is not a bool")]
	ValueIsNotBool(String),
	#[error("Error while parsing int at {0:?}\n  - number out of scope")]
	ParseIntError(String),
	#[error("Error while parsing vec{len} at {key:?}\n  - {msg}")]
	ParseVecError { key: String, len: usize, msg: String },
	#[error("Error in list at index {index}\n  - {inner}")]
	ErrorInList { index: usize, inner: Box<JsonError> },
	#[error("Error in object at {key:?}\n  - {inner}")]
	ErrorInObject { key: String, inner: Box<JsonError> },
}

impl JsonError {
	pub fn nested(self, key: &str) -> Self {
		Self::ErrorInObject {
			key: key.to_owned(),
			inner: Box::new(self),
		}
	}

	pub fn in_list(self, index: usize) -> Self {
		Self::ErrorInList {
			index,
			inner: Box::new(self),
		}
	}
}

/// Turns a missing key into `None`, keeping every other error.
pub fn optional<T>(res: JsonResult<T>) -> JsonResult<Option<T>> {
	match res {
		Ok(val) => Ok(Some(val)),
		Err(JsonError::KeyDoesNotExist(_)) => Ok(None),
		Err(e) => Err(e),
	}
}

#[derive(Clone, Copy)]
pub struct JsonObject<'a>(pub &'a json::object::Object);

impl<'a> JsonObject<'a> {
	pub fn get(&self, key: &str) -> JsonResult<&'a json::JsonValue> {
		match self.0.get(key) {
			Some(value) => Ok(value),
			None => Err(JsonError::KeyDoesNotExist(key.to_owned())),
		}
	}

	pub fn has(&self, key: &str) -> bool {
		self.0.get(key).is_some()
	}

	pub fn get_object(&self, key: &str) -> JsonResult<JsonObject<'a>> {
		match self.get(key)?.as_object() {
			Some(obj) => Ok(JsonObject(obj)),
			None => Err(JsonError::ValueIsNotObject(key.to_owned())),
		}
	}

	pub fn get_list(&self, key: &str) -> JsonResult<&'a [JsonValue]> {
		match self.get(key)? {
			json::JsonValue::Array(arr) => Ok(arr),
			_ => Err(JsonError::ValueIsNotList(key.to_owned())),
		}
	}

	pub fn get_str(&self, key: &str) -> JsonResult<&'a str> {
		match self.get(key)?.as_str() {
			Some(val) => Ok(val),
			None => Err(JsonError::ValueIsNotString(key.to_owned())),
		}
	}

	fn get_number(&self, key: &str) -> JsonResult<json::number::Number> {
		match self.get(key)?.as_number() {
			Some(val) => Ok(val),
			None => Err(JsonError::ValueIsNotNumber(key.to_owned())),
		}
	}

	pub fn get_f32(&self, key: &str) -> JsonResult<f32> {
		Ok(self.get_number(key)?.into())
	}

	pub fn get_i32(&self, key: &str) -> JsonResult<i32> {
		let val: f64 = self.get_number(key)?.into();
		if val.fract() != 0.0 || val < i32::MIN as f64 || val > i32::MAX as f64 {
			return Err(JsonError::ParseIntError(key.to_owned()));
		}
		Ok(val as i32)
	}

	pub fn get_u32(&self, key: &str) -> JsonResult<u32> {
		let val = self.get_i32(key)?;
		u32::try_from(val).map_err(|_| JsonError::ParseIntError(key.to_owned()))
	}

	pub fn get_bool(&self, key: &str) -> JsonResult<bool> {
		match self.get(key)?.as_bool() {
			Some(val) => Ok(val),
			None => Err(JsonError::ValueIsNotBool(key.to_owned())),
		}
	}

	pub fn get_vec2(&self, key: &str) -> JsonResult<Vec2> {
		Ok(Vec2::from_array(floats(key, self.get_list(key)?)?))
	}

	pub fn get_vec3(&self, key: &str) -> JsonResult<Vec3> {
		Ok(Vec3::from_array(floats(key, self.get_list(key)?)?))
	}

	pub fn get_vec4(&self, key: &str) -> JsonResult<Vec4> {
		Ok(Vec4::from_array(floats(key, self.get_list(key)?)?))
	}

	/// Quaternions are stored `[x, y, z, w]`.
	pub fn get_quat(&self, key: &str) -> JsonResult<Quat> {
		Ok(Quat::from_array(floats(key, self.get_list(key)?)?))
	}
}

/// Reads a fixed-length list of numbers.
pub fn floats<const N: usize>(key: &str, list: &[JsonValue]) -> JsonResult<[f32; N]> {
	if list.len() != N {
		return Err(JsonError::ParseVecError {
			key: key.to_owned(),
			len: N,
			msg: format!("expected list of length {}, but has length {}", N, list.len()),
		});
	}

	let mut out = [0.0; N];
	for (o, val) in out.iter_mut().zip(list) {
		*o = match val.as_number() {
			Some(val) => val.into(),
			None => {
				return Err(JsonError::ParseVecError {
					key: key.to_owned(),
					len: N,
					msg: "expected float, but did not get a number".to_owned(),
				})
			}
		};
	}
	Ok(out)
}

// writing

/// Writes an `f32` with its shortest decimal form instead of the widened `f64` one.
pub fn num(v: f32) -> JsonValue {
	let wide: f64 = v.to_string().parse().unwrap_or(v as f64);
	JsonValue::from(wide)
}

pub fn vec2_json(v: Vec2) -> JsonValue {
	JsonValue::Array(vec![num(v.x), num(v.y)])
}

pub fn vec3_json(v: Vec3) -> JsonValue {
	JsonValue::Array(vec![num(v.x), num(v.y), num(v.z)])
}

pub fn vec4_json(v: Vec4) -> JsonValue {
	JsonValue::Array(vec![num(v.x), num(v.y), num(v.z), num(v.w)])
}

pub fn quat_json(q: Quat) -> JsonValue {
	JsonValue::Array(vec![num(q.x), num(q.y), num(q.z), num(q.w)])
}
