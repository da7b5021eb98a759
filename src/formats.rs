//! Readers and writers of the JSON documents the core consumes: scenes, tween animations,
//! state machines, sprite animations and tilesets.

pub mod anim;
pub(crate) mod json;
pub mod scene;
pub mod sprite_anim;
pub mod state_machine;
pub mod tileset;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ::json::JsonValue;

pub use self::json::JsonError;
use self::json::{JsonObject, SerialExtend};
pub use scene::SceneParseError;

pub type ResourceParseResult<T> = Result<T, ResourceParseError>;

/// Errors of the resource readers (`.anim`, `.statemachine`, `.spriteanim`, `.tileset`).
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResourceParseError {
	#[error(transparent)]
	JsonError(#[from] JsonError),
	#[error("Malformed JSON: {0}")]
	JsonParse(String),
	#[error("Expected a {expected:?} resource, found {found:?}")]
	WrongResourceType { expected: &'static str, found: String },
	#[error("Unknown interpolation {0:?}")]
	UnknownInterpolation(String),
	#[error("Unknown property type {0:?}")]
	UnknownPropertyType(String),
	#[error("Unknown comparison operator {0:?}")]
	UnknownOperator(String),
	#[error("Unknown parameter type {0:?}")]
	UnknownParameterType(String),
	#[error("Keyframe value does not fit property type {0}")]
	ValueTypeMismatch(String),
	#[error("Unknown tile data type {0}")]
	UnknownTileDataType(i32),
}

impl ResourceParseError {
	pub fn nested(self, key: &str) -> Self {
		match self {
			ResourceParseError::JsonError(err) => ResourceParseError::JsonError(err.nested(key)),
			_ => self,
		}
	}

	pub fn in_list(self, index: usize) -> Self {
		match self {
			ResourceParseError::JsonError(err) => ResourceParseError::JsonError(err.in_list(index)),
			_ => self,
		}
	}
}

/// Failure of a `load_*_file` or `save_*_file` helper.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
	#[error("Could not access {path:?}: {source}")]
	Io { path: PathBuf, source: io::Error },
	#[error("Could not parse {path:?}\n  - {source}")]
	Scene { path: PathBuf, source: SceneParseError },
	#[error("Could not parse {path:?}\n  - {source}")]
	Resource { path: PathBuf, source: ResourceParseError },
}

pub(crate) fn read_file(path: &Path) -> Result<String, LoadError> {
	fs::read_to_string(path).map_err(|source| LoadError::Io {
		path: path.to_owned(),
		source,
	})
}

pub(crate) fn write_file(path: &Path, contents: &str) -> Result<(), LoadError> {
	fs::write(path, contents).map_err(|source| LoadError::Io {
		path: path.to_owned(),
		source,
	})
}

pub(crate) fn resource_error(path: &Path) -> impl FnOnce(ResourceParseError) -> LoadError + '_ {
	move |source| LoadError::Resource {
		path: path.to_owned(),
		source,
	}
}

// shared helpers of the resource readers

fn vals<T>(key: &str, res: ResourceParseResult<T>) -> ResourceParseResult<T> {
	res.map_err(|e| e.nested(key))
}

fn as_object<'file>(msg: &str, val: &'file JsonValue) -> ResourceParseResult<JsonObject<'file>> {
	if let Some(obj) = val.as_object() {
		Ok(JsonObject(obj))
	} else {
		Err(ResourceParseError::JsonError(JsonError::ValueIsNotObject(msg.to_owned())))
	}
}

fn parse_document(text: &str) -> ResourceParseResult<JsonValue> {
	::json::parse(text).map_err(|e| ResourceParseError::JsonParse(e.to_string()))
}

/// Checks the `type` tag of a resource document, when it has one.
fn expect_type(obj: JsonObject, expected: &'static str) -> ResourceParseResult<()> {
	match obj.get_str("type") {
		Ok(found) if found != expected => Err(ResourceParseError::WrongResourceType {
			expected,
			found: found.to_owned(),
		}),
		Ok(_) | Err(JsonError::KeyDoesNotExist(_)) => Ok(()),
		Err(e) => Err(e.into()),
	}
}
