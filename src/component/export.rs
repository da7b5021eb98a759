use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::value::{ExportType, ExportValue, PropertyValue};

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ExportVariableError {
	#[error("Export variable {0:?} does not exist")]
	NotFound(String),
	#[error("Export variable {name:?} is declared {expected}, got {got}")]
	TypeMismatch {
		name: String,
		expected: ExportType,
		got: ExportType,
	},
}

/// Typed, editor-visible property of a component.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportVariable {
	pub name: String,
	pub value: PropertyValue,
	pub default: PropertyValue,
	pub description: String,
	pub ty: ExportType,
	/// Option labels, only for [`ExportType::Enum`].
	pub enum_options: Vec<String>,
}

impl ExportVariable {
	pub fn new(name: &str, value: PropertyValue, description: &str, ty: ExportType) -> Self {
		let value = match value.coerce_to(ty) {
			Some(value) => value,
			None => {
				warn!("Export variable {:?} declared {} with a mismatched initial value", name, ty);
				PropertyValue::default_for(ty)
			}
		};
		Self {
			name: name.to_owned(),
			default: value.clone(),
			value,
			description: description.to_owned(),
			ty,
			enum_options: Vec::new(),
		}
	}

	/// Label of the selected option of an enum variable.
	pub fn enum_label(&self) -> Option<&str> {
		match self.value {
			PropertyValue::Int(i) => self.enum_options.get(usize::try_from(i).ok()?).map(String::as_str),
			_ => None,
		}
	}
}

/// Export variables of one component, keyed by name in registration order.
///
/// Every write that changes a value raises the dirty flag, which the scene reads as its
/// modified state.
#[derive(Debug, Clone, Default)]
pub struct ExportVariables {
	vars: IndexMap<String, ExportVariable>,
	dirty: bool,
}

impl ExportVariables {
	pub fn add(&mut self, name: &str, value: impl Into<PropertyValue>, description: &str, ty: ExportType) -> &mut Self {
		self.insert(ExportVariable::new(name, value.into(), description, ty));
		self
	}

	pub fn add_enum(&mut self, name: &str, index: i32, description: &str, options: &[&str]) -> &mut Self {
		let mut var = ExportVariable::new(name, PropertyValue::Int(index), description, ExportType::Enum);
		var.enum_options = options.iter().map(|opt| (*opt).to_owned()).collect();
		self.insert(var);
		self
	}

	/// Replaces a variable of the same name in place.
	pub fn insert(&mut self, var: ExportVariable) {
		self.vars.insert(var.name.clone(), var);
	}

	pub fn get(&self, name: &str) -> Option<&ExportVariable> {
		self.vars.get(name)
	}

	pub fn value(&self, name: &str) -> Option<&PropertyValue> {
		self.vars.get(name).map(|var| &var.value)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.vars.contains_key(name)
	}

	/// The stored value when it has the requested type, `fallback` otherwise.
	pub fn get_or<T: ExportValue>(&self, name: &str, fallback: T) -> T {
		let Some(var) = self.vars.get(name) else {
			return fallback;
		};
		match T::from_property(&var.value) {
			Some(val) => val,
			None => {
				debug!("Export variable {:?} holds a {}, using fallback", name, var.value.tag());
				fallback
			}
		}
	}

	/// Writes a value of the declared type and hands back the previous one.
	pub fn set(&mut self, name: &str, value: PropertyValue) -> Result<PropertyValue, ExportVariableError> {
		let var = self
			.vars
			.get_mut(name)
			.ok_or_else(|| ExportVariableError::NotFound(name.to_owned()))?;

		if !value.matches(var.ty) {
			return Err(ExportVariableError::TypeMismatch {
				name: name.to_owned(),
				expected: var.ty,
				got: value.tag(),
			});
		}

		if var.value != value {
			self.dirty = true;
		}
		Ok(std::mem::replace(&mut var.value, value))
	}

	/// Like [`set`](Self::set), re-tagging Vec4/Color and String/FilePath values first.
	pub fn set_coerced(&mut self, name: &str, value: PropertyValue) -> Result<PropertyValue, ExportVariableError> {
		let ty = self
			.vars
			.get(name)
			.map(|var| var.ty)
			.ok_or_else(|| ExportVariableError::NotFound(name.to_owned()))?;
		let got = value.tag();
		let value = value.coerce_to(ty).ok_or(ExportVariableError::TypeMismatch {
			name: name.to_owned(),
			expected: ty,
			got,
		})?;
		self.set(name, value)
	}

	/// Restores the registered default. Returns whether the stored value changed.
	pub fn reset(&mut self, name: &str) -> Result<bool, ExportVariableError> {
		let var = self
			.vars
			.get_mut(name)
			.ok_or_else(|| ExportVariableError::NotFound(name.to_owned()))?;

		let changed = var.value != var.default;
		if changed {
			var.value = var.default.clone();
			self.dirty = true;
		}
		Ok(changed)
	}

	pub fn iter(&self) -> impl Iterator<Item = &ExportVariable> {
		self.vars.values()
	}

	pub fn len(&self) -> usize {
		self.vars.len()
	}

	pub fn is_empty(&self) -> bool {
		self.vars.is_empty()
	}

	pub fn is_dirty(&self) -> bool {
		self.dirty
	}

	pub fn mark_dirty(&mut self) {
		self.dirty = true;
	}

	pub fn mark_clean(&mut self) {
		self.dirty = false;
	}
}

#[cfg(test)]
mod tests {
	use glam::{vec4, Vec4};

	use super::*;

	fn sample() -> ExportVariables {
		let mut vars = ExportVariables::default();
		vars.add("speed", 1.5_f32, "Playback speed", ExportType::Float)
			.add("color", PropertyValue::Color(Vec4::ONE), "Tint", ExportType::Color)
			.add_enum("mode", 1, "Stretch mode", &["Stretch", "Tile", "KeepAspect"]);
		vars
	}

	#[test]
	fn keeps_registration_order() {
		let names: Vec<_> = sample().iter().map(|var| var.name.clone()).collect();
		assert_eq!(names, ["speed", "color", "mode"]);
	}

	#[test]
	fn set_then_get() {
		let mut vars = sample();
		let old = vars.set("speed", PropertyValue::Float(3.0)).unwrap();
		assert_eq!(old, PropertyValue::Float(1.5));
		assert_eq!(vars.get_or("speed", 0.0_f32), 3.0);
		assert!(vars.is_dirty());
	}

	#[test]
	fn mismatched_writes_are_refused() {
		let mut vars = sample();
		let err = vars.set("speed", PropertyValue::Int(3)).unwrap_err();
		assert!(matches!(err, ExportVariableError::TypeMismatch { .. }));
		assert_eq!(vars.value("speed"), Some(&PropertyValue::Float(1.5)));
		assert!(!vars.is_dirty());

		assert!(matches!(
			vars.set("missing", PropertyValue::Int(3)),
			Err(ExportVariableError::NotFound(_))
		));
	}

	#[test]
	fn typed_read_falls_back_on_mismatch() {
		let vars = sample();
		assert_eq!(vars.get_or("speed", 7_i32), 7);
		assert_eq!(vars.get_or("nothing", true), true);
	}

	#[test]
	fn coerced_write_retags() {
		let mut vars = sample();
		vars.set_coerced("color", PropertyValue::Vec4(vec4(1.0, 0.0, 0.0, 1.0))).unwrap();
		assert_eq!(vars.value("color"), Some(&PropertyValue::Color(vec4(1.0, 0.0, 0.0, 1.0))));
	}

	#[test]
	fn reset_reports_change() {
		let mut vars = sample();
		assert_eq!(vars.reset("speed"), Ok(false));
		vars.set("speed", PropertyValue::Float(9.0)).unwrap();
		assert_eq!(vars.reset("speed"), Ok(true));
		assert_eq!(vars.value("speed"), Some(&PropertyValue::Float(1.5)));
	}

	#[test]
	fn enum_labels() {
		let mut vars = sample();
		assert_eq!(vars.get("mode").unwrap().enum_label(), Some("Tile"));
		vars.set("mode", PropertyValue::Int(2)).unwrap();
		assert_eq!(vars.get("mode").unwrap().enum_label(), Some("KeepAspect"));
	}
}
