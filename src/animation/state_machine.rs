//! State machine resources: parameters, layers, states and guarded transitions.

use std::fmt;

use glam::Vec2;
use indexmap::IndexMap;
use tracing::debug;

/// Tolerance of float equality in conditions.
pub const FLOAT_EPSILON: f32 = 0.001;

pub const DEFAULT_TRANSITION_DURATION: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
	Bool,
	Int,
	Float,
	/// One-shot bool, cleared by the first transition that observes it set.
	Trigger,
}

impl ParamType {
	pub const ALL: [ParamType; 4] = [ParamType::Bool, ParamType::Int, ParamType::Float, ParamType::Trigger];

	pub fn index(self) -> usize {
		self as usize
	}

	pub fn from_index(index: usize) -> Option<Self> {
		Self::ALL.get(index).copied()
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
	Bool(bool),
	Int(i32),
	Float(f32),
	Trigger(bool),
}

impl ParamValue {
	pub fn ty(&self) -> ParamType {
		match self {
			ParamValue::Bool(_) => ParamType::Bool,
			ParamValue::Int(_) => ParamType::Int,
			ParamValue::Float(_) => ParamType::Float,
			ParamValue::Trigger(_) => ParamType::Trigger,
		}
	}

	pub fn default_for(ty: ParamType) -> Self {
		match ty {
			ParamType::Bool => ParamValue::Bool(false),
			ParamType::Int => ParamValue::Int(0),
			ParamType::Float => ParamValue::Float(0.0),
			ParamType::Trigger => ParamValue::Trigger(false),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
	pub name: String,
	pub default: ParamValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
	Equals,
	NotEquals,
	Greater,
	GreaterEqual,
	Less,
	LessEqual,
	/// Trigger or bool parameter is set.
	IsSet,
}

impl CompareOp {
	/// In on-disk enumeration order.
	pub const ALL: [CompareOp; 7] = [
		CompareOp::Equals,
		CompareOp::NotEquals,
		CompareOp::Greater,
		CompareOp::GreaterEqual,
		CompareOp::Less,
		CompareOp::LessEqual,
		CompareOp::IsSet,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			CompareOp::Equals => "==",
			CompareOp::NotEquals => "!=",
			CompareOp::Greater => ">",
			CompareOp::GreaterEqual => ">=",
			CompareOp::Less => "<",
			CompareOp::LessEqual => "<=",
			CompareOp::IsSet => "is_set",
		}
	}

	pub fn index(self) -> usize {
		self as usize
	}

	pub fn from_index(index: usize) -> Option<Self> {
		Self::ALL.get(index).copied()
	}

	fn compare<T: PartialOrd>(self, lhs: T, rhs: T) -> bool {
		match self {
			CompareOp::Equals => lhs == rhs,
			CompareOp::NotEquals => lhs != rhs,
			CompareOp::Greater => lhs > rhs,
			CompareOp::GreaterEqual => lhs >= rhs,
			CompareOp::Less => lhs < rhs,
			CompareOp::LessEqual => lhs <= rhs,
			CompareOp::IsSet => false,
		}
	}
}

impl fmt::Display for CompareOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown comparison operator {0:?}")]
pub struct UnknownOperatorError(pub String);

impl TryFrom<&str> for CompareOp {
	type Error = UnknownOperatorError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		CompareOp::ALL
			.into_iter()
			.find(|op| op.as_str() == value)
			.ok_or_else(|| UnknownOperatorError(value.to_owned()))
	}
}

/// One clause of a transition predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
	pub parameter: String,
	pub op: CompareOp,
	pub value: ParamValue,
}

impl Condition {
	pub fn new(parameter: &str, op: CompareOp, value: ParamValue) -> Self {
		Self {
			parameter: parameter.to_owned(),
			op,
			value,
		}
	}

	/// `trigger` is set.
	pub fn trigger(parameter: &str) -> Self {
		Self::new(parameter, CompareOp::IsSet, ParamValue::Trigger(true))
	}

	/// Unknown parameters and parameters of another type never pass.
	pub fn evaluate(&self, params: &ParameterStore) -> bool {
		let Some(current) = params.get(&self.parameter) else {
			return false;
		};

		match (current, self.op, self.value) {
			(ParamValue::Bool(v) | ParamValue::Trigger(v), CompareOp::IsSet, _) => v,
			(ParamValue::Bool(a), op, ParamValue::Bool(b)) | (ParamValue::Trigger(a), op, ParamValue::Trigger(b)) => {
				match op {
					CompareOp::Equals => a == b,
					CompareOp::NotEquals => a != b,
					_ => false,
				}
			}
			(ParamValue::Int(a), op, ParamValue::Int(b)) => op.compare(a, b),
			(ParamValue::Float(a), CompareOp::Equals, ParamValue::Float(b)) => (a - b).abs() < FLOAT_EPSILON,
			(ParamValue::Float(a), CompareOp::NotEquals, ParamValue::Float(b)) => (a - b).abs() >= FLOAT_EPSILON,
			(ParamValue::Float(a), op, ParamValue::Float(b)) => op.compare(a, b),
			_ => false,
		}
	}

	/// Whether passing this clause consumes a trigger.
	pub(crate) fn observes_trigger(&self, params: &ParameterStore) -> bool {
		matches!(params.get(&self.parameter), Some(ParamValue::Trigger(true)))
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct State {
	pub name: String,
	/// Clip of the companion animation resource.
	pub clip: String,
	pub speed: f32,
	pub looping: bool,
	/// Editor graph position.
	pub position: Vec2,
}

impl State {
	pub fn new(name: &str, clip: &str) -> Self {
		Self {
			name: name.to_owned(),
			clip: clip.to_owned(),
			speed: 1.0,
			looping: true,
			position: Vec2::ZERO,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
	pub from: String,
	pub to: String,
	/// All clauses must pass. No clauses always passes.
	pub conditions: Vec<Condition>,
	/// Cross-fade length in seconds.
	pub duration: f32,
	/// Fraction of the source clip that must have played when `has_exit_time` is set.
	pub exit_time: f32,
	pub has_exit_time: bool,
	pub can_transition_to_self: bool,
}

impl Transition {
	pub fn new(from: &str, to: &str) -> Self {
		Self {
			from: from.to_owned(),
			to: to.to_owned(),
			conditions: Vec::new(),
			duration: DEFAULT_TRANSITION_DURATION,
			exit_time: 1.0,
			has_exit_time: false,
			can_transition_to_self: false,
		}
	}

	pub fn when(mut self, condition: Condition) -> Self {
		self.conditions.push(condition);
		self
	}

	pub fn with_duration(mut self, duration: f32) -> Self {
		self.duration = duration.max(0.0);
		self
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
	pub name: String,
	pub weight: f32,
	pub additive: bool,
	/// Empty falls back to the first state.
	pub default_state: String,
	pub states: Vec<State>,
	/// Evaluated in this order.
	pub transitions: Vec<Transition>,
}

impl Layer {
	pub fn new(name: &str) -> Self {
		Self {
			name: name.to_owned(),
			weight: 1.0,
			additive: false,
			default_state: String::new(),
			states: Vec::new(),
			transitions: Vec::new(),
		}
	}

	pub fn with_state(mut self, state: State) -> Self {
		self.states.push(state);
		self
	}

	pub fn with_transition(mut self, transition: Transition) -> Self {
		self.transitions.push(transition);
		self
	}

	pub fn state(&self, name: &str) -> Option<&State> {
		self.states.iter().find(|s| s.name == name)
	}

	/// State a fresh runtime starts in.
	pub fn entry_state(&self) -> Option<&State> {
		match self.default_state.as_str() {
			"" => self.states.first(),
			name => self.state(name),
		}
	}

	pub fn transitions_from<'a>(&'a self, state: &'a str) -> impl Iterator<Item = &'a Transition> + 'a {
		self.transitions.iter().filter(move |t| t.from == state)
	}

	/// Removes a state and every transition touching it.
	pub fn remove_state(&mut self, name: &str) -> Option<State> {
		let index = self.states.iter().position(|s| s.name == name)?;
		self.transitions.retain(|t| t.from != name && t.to != name);
		Some(self.states.remove(index))
	}
}

/// Contents of a `.statemachine` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateMachine {
	parameters: IndexMap<String, Parameter>,
	pub layers: Vec<Layer>,
}

impl StateMachine {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces a parameter with the same name.
	pub fn add_parameter(&mut self, name: &str, default: ParamValue) {
		self.parameters.insert(
			name.to_owned(),
			Parameter {
				name: name.to_owned(),
				default,
			},
		);
	}

	pub fn with_parameter(mut self, name: &str, default: ParamValue) -> Self {
		self.add_parameter(name, default);
		self
	}

	pub fn remove_parameter(&mut self, name: &str) -> Option<Parameter> {
		self.parameters.shift_remove(name)
	}

	pub fn parameter(&self, name: &str) -> Option<&Parameter> {
		self.parameters.get(name)
	}

	pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
		self.parameters.values()
	}

	pub fn with_layer(mut self, layer: Layer) -> Self {
		self.layers.push(layer);
		self
	}

	pub fn layer(&self, name: &str) -> Option<&Layer> {
		self.layers.iter().find(|l| l.name == name)
	}

	pub fn layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
		self.layers.iter_mut().find(|l| l.name == name)
	}
}

/// Live parameter values of a running state machine.
///
/// Only parameters the machine declares exist; writes to unknown names or of another type
/// are ignored and reads of them return zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterStore {
	values: IndexMap<String, ParamValue>,
}

impl ParameterStore {
	pub fn from_machine(machine: &StateMachine) -> Self {
		Self {
			values: machine.parameters().map(|p| (p.name.clone(), p.default)).collect(),
		}
	}

	pub fn get(&self, name: &str) -> Option<ParamValue> {
		self.values.get(name).copied()
	}

	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.values.keys().map(String::as_str)
	}

	fn set(&mut self, name: &str, value: ParamValue) {
		match self.values.get_mut(name) {
			Some(slot) if slot.ty() == value.ty() => *slot = value,
			Some(slot) => debug!("Parameter {:?} is {:?}, ignoring {:?}", name, slot.ty(), value),
			None => debug!("Unknown parameter {:?}", name),
		}
	}

	pub fn set_bool(&mut self, name: &str, value: bool) {
		self.set(name, ParamValue::Bool(value));
	}

	pub fn set_int(&mut self, name: &str, value: i32) {
		self.set(name, ParamValue::Int(value));
	}

	pub fn set_float(&mut self, name: &str, value: f32) {
		self.set(name, ParamValue::Float(value));
	}

	pub fn set_trigger(&mut self, name: &str) {
		self.set(name, ParamValue::Trigger(true));
	}

	pub fn reset_trigger(&mut self, name: &str) {
		self.set(name, ParamValue::Trigger(false));
	}

	/// Bool or trigger state.
	pub fn get_bool(&self, name: &str) -> bool {
		matches!(self.get(name), Some(ParamValue::Bool(true) | ParamValue::Trigger(true)))
	}

	pub fn get_int(&self, name: &str) -> i32 {
		match self.get(name) {
			Some(ParamValue::Int(v)) => v,
			_ => 0,
		}
	}

	pub fn get_float(&self, name: &str) -> f32 {
		match self.get(name) {
			Some(ParamValue::Float(v)) => v,
			_ => 0.0,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn params() -> ParameterStore {
		let machine = StateMachine::new()
			.with_parameter("grounded", ParamValue::Bool(true))
			.with_parameter("lives", ParamValue::Int(3))
			.with_parameter("speed", ParamValue::Float(0.0))
			.with_parameter("jump", ParamValue::Trigger(false));
		ParameterStore::from_machine(&machine)
	}

	mod store {
		use super::super::*;
		use super::*;

		#[test]
		fn typed_access() {
			let mut p = params();
			p.set_float("speed", 4.5);
			p.set_int("lives", 2);
			p.set_bool("grounded", false);
			assert_eq!(p.get_float("speed"), 4.5);
			assert_eq!(p.get_int("lives"), 2);
			assert!(!p.get_bool("grounded"));
		}

		#[test]
		fn unknown_and_mistyped_are_ignored() {
			let mut p = params();
			p.set_float("missing", 1.0);
			p.set_int("speed", 7);
			assert_eq!(p.get("missing"), None);
			assert_eq!(p.get_float("speed"), 0.0);
			assert_eq!(p.get_int("speed"), 0);
			assert!(!p.get_bool("missing"));
		}

		#[test]
		fn triggers_read_as_bools() {
			let mut p = params();
			assert!(!p.get_bool("jump"));
			p.set_trigger("jump");
			assert!(p.get_bool("jump"));
			p.reset_trigger("jump");
			assert!(!p.get_bool("jump"));
		}
	}

	mod conditions {
		use super::super::*;
		use super::*;

		#[test]
		fn numeric_comparisons() {
			let mut p = params();
			p.set_float("speed", 10.0);
			assert!(Condition::new("speed", CompareOp::Greater, ParamValue::Float(5.0)).evaluate(&p));
			assert!(!Condition::new("speed", CompareOp::Less, ParamValue::Float(5.0)).evaluate(&p));
			assert!(Condition::new("speed", CompareOp::Equals, ParamValue::Float(10.0005)).evaluate(&p));
			assert!(Condition::new("lives", CompareOp::GreaterEqual, ParamValue::Int(3)).evaluate(&p));
			assert!(!Condition::new("lives", CompareOp::NotEquals, ParamValue::Int(3)).evaluate(&p));
		}

		#[test]
		fn type_mismatch_never_passes() {
			let p = params();
			assert!(!Condition::new("lives", CompareOp::Equals, ParamValue::Float(3.0)).evaluate(&p));
			assert!(!Condition::new("nope", CompareOp::IsSet, ParamValue::Trigger(true)).evaluate(&p));
			assert!(!Condition::new("grounded", CompareOp::Greater, ParamValue::Bool(false)).evaluate(&p));
		}

		#[test]
		fn is_set() {
			let mut p = params();
			let cond = Condition::trigger("jump");
			assert!(!cond.evaluate(&p));
			p.set_trigger("jump");
			assert!(cond.evaluate(&p));
			assert!(cond.observes_trigger(&p));
			assert!(Condition::new("grounded", CompareOp::IsSet, ParamValue::Bool(true)).evaluate(&p));
		}

		#[test]
		fn operator_names() {
			assert_eq!(CompareOp::try_from(">=").unwrap(), CompareOp::GreaterEqual);
			assert_eq!(CompareOp::from_index(6), Some(CompareOp::IsSet));
			assert!(CompareOp::try_from("~").is_err());
		}
	}

	#[test]
	fn removing_a_state_drops_its_transitions() {
		let mut layer = Layer::new("Base")
			.with_state(State::new("A", "walk"))
			.with_state(State::new("B", "run"))
			.with_transition(Transition::new("A", "B"))
			.with_transition(Transition::new("B", "A"));
		assert_eq!(layer.entry_state().map(|s| s.name.as_str()), Some("A"));
		assert!(layer.remove_state("B").is_some());
		assert!(layer.transitions.is_empty());
		assert_eq!(layer.transitions_from("A").count(), 0);
	}
}
