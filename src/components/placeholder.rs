use crate::component::{impl_component_base, Component, ComponentBase};

/// Stands in for a component type the registry does not know.
///
/// It does nothing at runtime but keeps its type name and export variables, so a scene
/// saved again writes them back unchanged.
#[derive(Debug)]
pub struct PlaceholderComponent {
	base: ComponentBase,
	type_name: String,
}

impl PlaceholderComponent {
	pub fn new(type_name: &str) -> Self {
		Self {
			base: ComponentBase::new(type_name),
			type_name: type_name.to_owned(),
		}
	}
}

impl Component for PlaceholderComponent {
	impl_component_base!();

	fn type_name(&self) -> &str {
		&self.type_name
	}

	fn category(&self) -> &str {
		"Unknown"
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::value::{ExportType, PropertyValue};

	#[test]
	fn keeps_name_and_exports() {
		let mut comp = PlaceholderComponent::new("ScriptedThing");
		comp.base_mut().exports.add("speed", 3.0, "", ExportType::Float);

		let comp: Box<dyn Component> = Box::new(comp);
		assert_eq!(comp.type_name(), "ScriptedThing");
		assert_eq!(comp.category(), "Unknown");
		assert_eq!(comp.exports().value("speed"), Some(&PropertyValue::Float(3.0)));
	}
}
