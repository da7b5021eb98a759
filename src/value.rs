//! Tagged property values shared by export variables and the scene format.

mod font;

use std::fmt;

use glam::{Vec2, Vec3, Vec4};

use crate::node::NodeUuid;

pub use font::{FontPath, FontStyle, UnknownFontStyleError};

/// Declared type of an export variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportType {
	Bool,
	Int,
	Float,
	String,
	FilePath,
	FontPath,
	Color,
	Vec2,
	Vec3,
	Vec4,
	NodeReference,
	/// Int-valued, with a list of option labels on the variable.
	Enum,
}

impl ExportType {
	/// Tag used in scene documents.
	pub fn as_str(self) -> &'static str {
		match self {
			ExportType::Bool => "bool",
			ExportType::Int => "int",
			ExportType::Float => "float",
			ExportType::String => "string",
			ExportType::FilePath => "filepath",
			ExportType::FontPath => "fontpath",
			ExportType::Color => "color",
			ExportType::Vec2 => "vec2",
			ExportType::Vec3 => "vec3",
			ExportType::Vec4 => "vec4",
			ExportType::NodeReference => "noderef",
			ExportType::Enum => "enum",
		}
	}
}

impl fmt::Display for ExportType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown export type {0:?}")]
pub struct UnknownExportTypeError(pub String);

impl TryFrom<&str> for ExportType {
	type Error = UnknownExportTypeError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		match value {
			"bool" => Ok(ExportType::Bool),
			"int" => Ok(ExportType::Int),
			"float" => Ok(ExportType::Float),
			"string" => Ok(ExportType::String),
			"filepath" => Ok(ExportType::FilePath),
			"fontpath" => Ok(ExportType::FontPath),
			"color" => Ok(ExportType::Color),
			"vec2" => Ok(ExportType::Vec2),
			"vec3" => Ok(ExportType::Vec3),
			"vec4" => Ok(ExportType::Vec4),
			"noderef" => Ok(ExportType::NodeReference),
			"enum" => Ok(ExportType::Enum),
			unknown => Err(UnknownExportTypeError(unknown.to_owned())),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
	Bool(bool),
	Int(i32),
	Float(f32),
	String(String),
	FilePath(String),
	FontPath(FontPath),
	/// RGBA, each channel in `0..=1`.
	Color(Vec4),
	Vec2(Vec2),
	Vec3(Vec3),
	Vec4(Vec4),
	NodeReference(NodeUuid),
}

impl PropertyValue {
	/// Stable default of each tag. Colors default to opaque white.
	pub fn default_for(ty: ExportType) -> Self {
		match ty {
			ExportType::Bool => PropertyValue::Bool(false),
			ExportType::Int | ExportType::Enum => PropertyValue::Int(0),
			ExportType::Float => PropertyValue::Float(0.0),
			ExportType::String => PropertyValue::String(String::new()),
			ExportType::FilePath => PropertyValue::FilePath(String::new()),
			ExportType::FontPath => PropertyValue::FontPath(FontPath::default()),
			ExportType::Color => PropertyValue::Color(Vec4::ONE),
			ExportType::Vec2 => PropertyValue::Vec2(Vec2::ZERO),
			ExportType::Vec3 => PropertyValue::Vec3(Vec3::ZERO),
			ExportType::Vec4 => PropertyValue::Vec4(Vec4::ZERO),
			ExportType::NodeReference => PropertyValue::NodeReference(NodeUuid::nil()),
		}
	}

	/// The tag of this value. Int values report `Int`, never `Enum`.
	pub fn tag(&self) -> ExportType {
		match self {
			PropertyValue::Bool(_) => ExportType::Bool,
			PropertyValue::Int(_) => ExportType::Int,
			PropertyValue::Float(_) => ExportType::Float,
			PropertyValue::String(_) => ExportType::String,
			PropertyValue::FilePath(_) => ExportType::FilePath,
			PropertyValue::FontPath(_) => ExportType::FontPath,
			PropertyValue::Color(_) => ExportType::Color,
			PropertyValue::Vec2(_) => ExportType::Vec2,
			PropertyValue::Vec3(_) => ExportType::Vec3,
			PropertyValue::Vec4(_) => ExportType::Vec4,
			PropertyValue::NodeReference(_) => ExportType::NodeReference,
		}
	}

	/// Whether a variable declared as `ty` may hold this value.
	pub fn matches(&self, ty: ExportType) -> bool {
		match (self, ty) {
			(PropertyValue::Int(_), ExportType::Enum) => true,
			_ => self.tag() == ty,
		}
	}

	/// Re-tag a value whose representation is shared with `ty`
	/// (Vec4 and Color, String and FilePath, Int and Enum).
	pub fn coerce_to(self, ty: ExportType) -> Option<Self> {
		if self.matches(ty) {
			return Some(self);
		}
		match (self, ty) {
			(PropertyValue::Vec4(v), ExportType::Color) => Some(PropertyValue::Color(v)),
			(PropertyValue::Color(v), ExportType::Vec4) => Some(PropertyValue::Vec4(v)),
			(PropertyValue::String(s), ExportType::FilePath) => Some(PropertyValue::FilePath(s)),
			(PropertyValue::FilePath(s), ExportType::String) => Some(PropertyValue::String(s)),
			_ => None,
		}
	}
}

/// Rust types that can be read out of a [`PropertyValue`].
pub trait ExportValue: Sized {
	fn from_property(value: &PropertyValue) -> Option<Self>;
}

impl ExportValue for bool {
	fn from_property(value: &PropertyValue) -> Option<Self> {
		match value {
			PropertyValue::Bool(b) => Some(*b),
			_ => None,
		}
	}
}

impl ExportValue for i32 {
	fn from_property(value: &PropertyValue) -> Option<Self> {
		match value {
			PropertyValue::Int(i) => Some(*i),
			_ => None,
		}
	}
}

impl ExportValue for f32 {
	fn from_property(value: &PropertyValue) -> Option<Self> {
		match value {
			PropertyValue::Float(f) => Some(*f),
			_ => None,
		}
	}
}

impl ExportValue for String {
	fn from_property(value: &PropertyValue) -> Option<Self> {
		match value {
			PropertyValue::String(s) | PropertyValue::FilePath(s) => Some(s.clone()),
			_ => None,
		}
	}
}

impl ExportValue for Vec2 {
	fn from_property(value: &PropertyValue) -> Option<Self> {
		match value {
			PropertyValue::Vec2(v) => Some(*v),
			_ => None,
		}
	}
}

impl ExportValue for Vec3 {
	fn from_property(value: &PropertyValue) -> Option<Self> {
		match value {
			PropertyValue::Vec3(v) => Some(*v),
			_ => None,
		}
	}
}

impl ExportValue for Vec4 {
	fn from_property(value: &PropertyValue) -> Option<Self> {
		match value {
			PropertyValue::Vec4(v) | PropertyValue::Color(v) => Some(*v),
			_ => None,
		}
	}
}

impl ExportValue for FontPath {
	fn from_property(value: &PropertyValue) -> Option<Self> {
		match value {
			PropertyValue::FontPath(font) => Some(font.clone()),
			_ => None,
		}
	}
}

impl ExportValue for NodeUuid {
	fn from_property(value: &PropertyValue) -> Option<Self> {
		match value {
			PropertyValue::NodeReference(uuid) => Some(*uuid),
			_ => None,
		}
	}
}

impl From<bool> for PropertyValue {
	fn from(value: bool) -> Self {
		PropertyValue::Bool(value)
	}
}

impl From<i32> for PropertyValue {
	fn from(value: i32) -> Self {
		PropertyValue::Int(value)
	}
}

impl From<f32> for PropertyValue {
	fn from(value: f32) -> Self {
		PropertyValue::Float(value)
	}
}

impl From<&str> for PropertyValue {
	fn from(value: &str) -> Self {
		PropertyValue::String(value.to_owned())
	}
}

impl From<String> for PropertyValue {
	fn from(value: String) -> Self {
		PropertyValue::String(value)
	}
}

impl From<Vec2> for PropertyValue {
	fn from(value: Vec2) -> Self {
		PropertyValue::Vec2(value)
	}
}

impl From<Vec3> for PropertyValue {
	fn from(value: Vec3) -> Self {
		PropertyValue::Vec3(value)
	}
}

impl From<Vec4> for PropertyValue {
	fn from(value: Vec4) -> Self {
		PropertyValue::Vec4(value)
	}
}

impl From<FontPath> for PropertyValue {
	fn from(value: FontPath) -> Self {
		PropertyValue::FontPath(value)
	}
}

impl From<NodeUuid> for PropertyValue {
	fn from(value: NodeUuid) -> Self {
		PropertyValue::NodeReference(value)
	}
}
