//! Behaviour attached to nodes.
//!
//! A component is a trait object owned by its node. Its state that the editor and the scene
//! file see lives in [`ExportVariables`]; the typed fields of a concrete component mirror them.

mod export;
pub mod registry;

use std::any::Any;

use glam::Vec2;
use tracing::warn;

use crate::config::RuntimeConfig;
use crate::render::Renderer;
use crate::resources::Services;
use crate::scene::tree::NodeTree;
use crate::value::{ExportValue, PropertyValue};

pub use crate::ident::ComponentUuid;
use crate::ident::NodeUuid;
pub use export::{ExportVariable, ExportVariableError, ExportVariables};

pub trait AsAny: Any {
	fn as_any(&self) -> &dyn Any;
	fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}

/// State every component carries.
#[derive(Debug, Clone)]
pub struct ComponentBase {
	pub uuid: ComponentUuid,
	pub name: String,
	pub active: bool,
	pub(crate) owner: Option<NodeUuid>,
	pub(crate) ready: bool,
	pub exports: ExportVariables,
}

impl ComponentBase {
	pub fn new(name: &str) -> Self {
		Self {
			uuid: ComponentUuid::new(),
			name: name.to_owned(),
			active: true,
			owner: None,
			ready: false,
			exports: ExportVariables::default(),
		}
	}

	pub fn owner(&self) -> Option<NodeUuid> {
		self.owner
	}

	pub fn is_ready(&self) -> bool {
		self.ready
	}

	/// Mirrors a typed field into its export variable.
	///
	/// Lifecycle sweeps re-read exports into fields before every update, so setters of
	/// exported fields must come through here.
	pub fn sync(&mut self, name: &str, value: impl Into<PropertyValue>) {
		if let Err(e) = self.exports.set_coerced(name, value.into()) {
			warn!("{}: {}", self.name, e);
		}
	}
}

/// Host input forwarded through the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
	KeyDown(u32),
	KeyUp(u32),
	MouseMove(Vec2),
	MouseDown { button: u8, position: Vec2 },
	MouseUp { button: u8, position: Vec2 },
	Scroll(Vec2),
}

/// What a component sees while one of its callbacks runs.
///
/// The component itself is taken out of its node for the duration of the call, so it will
/// not find itself through `tree`.
pub struct NodeCtx<'a> {
	pub tree: &'a mut NodeTree,
	pub owner: NodeUuid,
	pub services: &'a Services,
	pub config: &'a RuntimeConfig,
}

pub struct DrawCtx<'a> {
	pub tree: &'a NodeTree,
	pub owner: NodeUuid,
	pub services: &'a Services,
	pub config: &'a RuntimeConfig,
}

pub trait Component: AsAny {
	fn base(&self) -> &ComponentBase;
	fn base_mut(&mut self) -> &mut ComponentBase;

	/// Registry name, also written to scene files.
	fn type_name(&self) -> &str;

	fn category(&self) -> &str {
		"General"
	}

	/// Pulls values written by the editor, a loader or an animator back into typed fields.
	fn update_from_export_variables(&mut self) {}

	fn on_awake(&mut self) {}

	fn on_ready(&mut self, _ctx: &mut NodeCtx) {}

	fn on_update(&mut self, _ctx: &mut NodeCtx, _dt: f32) {}

	fn on_physics_process(&mut self, _ctx: &mut NodeCtx, _dt: f32) {}

	fn on_input(&mut self, _ctx: &mut NodeCtx, _event: &InputEvent) {}

	fn on_destroy(&mut self) {}

	/// Submits draw primitives. Called only for active components of visible nodes.
	fn draw(&self, _ctx: &DrawCtx, _renderer: &mut dyn Renderer) {}
}

impl dyn Component {
	pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
		self.as_any().downcast_ref()
	}

	pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
		self.as_any_mut().downcast_mut()
	}

	pub fn is<T: Component>(&self) -> bool {
		self.as_any().is::<T>()
	}

	pub fn uuid(&self) -> ComponentUuid {
		self.base().uuid
	}

	pub fn name(&self) -> &str {
		&self.base().name
	}

	pub fn is_active(&self) -> bool {
		self.base().active
	}

	pub fn owner(&self) -> Option<NodeUuid> {
		self.base().owner
	}

	pub fn exports(&self) -> &ExportVariables {
		&self.base().exports
	}

	pub fn exports_mut(&mut self) -> &mut ExportVariables {
		&mut self.base_mut().exports
	}

	pub fn get_export<T: ExportValue>(&self, name: &str, fallback: T) -> T {
		self.exports().get_or(name, fallback)
	}

	/// Writes an export variable and refreshes the typed fields. Returns the previous value.
	pub fn set_export(&mut self, name: &str, value: PropertyValue) -> Result<PropertyValue, ExportVariableError> {
		let old = self.exports_mut().set(name, value)?;
		self.update_from_export_variables();
		Ok(old)
	}

	pub fn reset_export(&mut self, name: &str) -> Result<bool, ExportVariableError> {
		let changed = self.exports_mut().reset(name)?;
		if changed {
			self.update_from_export_variables();
		}
		Ok(changed)
	}
}

/// Forwards the two accessors to a `base` field.
macro_rules! impl_component_base {
	() => {
		fn base(&self) -> &$crate::component::ComponentBase {
			&self.base
		}

		fn base_mut(&mut self) -> &mut $crate::component::ComponentBase {
			&mut self.base
		}
	};
}

pub(crate) use impl_component_base;

#[cfg(test)]
pub(crate) mod testing {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;

	/// Records the callbacks it receives into a shared log.
	pub struct Probe {
		base: ComponentBase,
		pub label: &'static str,
		pub log: Rc<RefCell<Vec<String>>>,
		pub panic_on_update: bool,
	}

	impl Probe {
		pub fn new(label: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Self {
			Self {
				base: ComponentBase::new(label),
				label,
				log: Rc::clone(log),
				panic_on_update: false,
			}
		}

		fn record(&self, event: &str) {
			self.log.borrow_mut().push(format!("{}:{}", self.label, event));
		}
	}

	impl Component for Probe {
		impl_component_base!();

		fn type_name(&self) -> &str {
			"Probe"
		}

		fn on_awake(&mut self) {
			self.record("awake");
		}

		fn on_ready(&mut self, _ctx: &mut NodeCtx) {
			self.record("ready");
		}

		fn on_update(&mut self, _ctx: &mut NodeCtx, _dt: f32) {
			if self.panic_on_update {
				panic!("component {} failed", self.label);
			}
			self.record("update");
		}

		fn on_physics_process(&mut self, _ctx: &mut NodeCtx, _dt: f32) {
			self.record("physics");
		}

		fn on_destroy(&mut self) {
			self.record("destroy");
		}
	}
}
