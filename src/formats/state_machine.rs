//! The `.statemachine` document.
//!
//! ```text
//! { "type": "StateMachine", "version",
//!   "parameters": [{ "name", "type", "default_value" }],
//!   "layers": [{ "name", "weight", "additive", "default_state",
//!     "states": [{ "name", "animation_clip", "speed", "looping", "position": [x, y] }],
//!     "transitions": [{ "from_state", "to_state", "transition_duration", "exit_time",
//!                       "has_exit_time", "can_transition_to_self",
//!                       "conditions": [{ "parameter_name", "operator", "value" }] }] }] }
//! ```
//!
//! Parameter types and operators are enumeration indices. A condition value takes the type of
//! the parameter it names.

use std::path::Path;

use json::JsonValue;
use tracing::warn;

use crate::animation::state_machine::{
	CompareOp, Condition, Layer, ParamType, ParamValue, State, StateMachine, Transition,
	DEFAULT_TRANSITION_DURATION,
};
use crate::RESOURCE_FORMAT_VERSION;

use super::json::{num, optional, vec2_json, JsonError, JsonObject};
use super::{
	as_object, expect_type, parse_document, read_file, resource_error, vals, write_file, LoadError,
	ResourceParseError, ResourceParseResult,
};

pub const STATE_MACHINE_TYPE: &str = "StateMachine";

pub fn serialize_state_machine(machine: &StateMachine) -> JsonValue {
	let parameters = machine.parameters().map(|p| {
		let mut obj = json::object::Object::new();
		obj.insert("name", p.name.as_str().into());
		obj.insert("type", p.default.ty().index().into());
		obj.insert("default_value", param_value_json(p.default));
		JsonValue::Object(obj)
	});

	let mut obj = json::object::Object::new();
	obj.insert("type", STATE_MACHINE_TYPE.into());
	obj.insert("version", RESOURCE_FORMAT_VERSION.into());
	obj.insert("parameters", JsonValue::Array(parameters.collect()));
	obj.insert("layers", JsonValue::Array(machine.layers.iter().map(serialize_layer).collect()));
	JsonValue::Object(obj)
}

fn param_value_json(value: ParamValue) -> JsonValue {
	match value {
		ParamValue::Bool(v) | ParamValue::Trigger(v) => v.into(),
		ParamValue::Int(v) => v.into(),
		ParamValue::Float(v) => num(v),
	}
}

fn serialize_layer(layer: &Layer) -> JsonValue {
	let states = layer.states.iter().map(|s| {
		let mut obj = json::object::Object::new();
		obj.insert("name", s.name.as_str().into());
		obj.insert("animation_clip", s.clip.as_str().into());
		obj.insert("speed", num(s.speed));
		obj.insert("looping", s.looping.into());
		obj.insert("position", vec2_json(s.position));
		JsonValue::Object(obj)
	});

	let mut obj = json::object::Object::new();
	obj.insert("name", layer.name.as_str().into());
	obj.insert("weight", num(layer.weight));
	obj.insert("additive", layer.additive.into());
	obj.insert("default_state", layer.default_state.as_str().into());
	obj.insert("states", JsonValue::Array(states.collect()));
	obj.insert(
		"transitions",
		JsonValue::Array(layer.transitions.iter().map(serialize_transition).collect()),
	);
	JsonValue::Object(obj)
}

fn serialize_transition(t: &Transition) -> JsonValue {
	let conditions = t.conditions.iter().map(|c| {
		let mut obj = json::object::Object::new();
		obj.insert("parameter_name", c.parameter.as_str().into());
		obj.insert("operator", c.op.index().into());
		obj.insert("value", param_value_json(c.value));
		JsonValue::Object(obj)
	});

	let mut obj = json::object::Object::new();
	obj.insert("from_state", t.from.as_str().into());
	obj.insert("to_state", t.to.as_str().into());
	obj.insert("transition_duration", num(t.duration));
	obj.insert("exit_time", num(t.exit_time));
	obj.insert("has_exit_time", t.has_exit_time.into());
	obj.insert("can_transition_to_self", t.can_transition_to_self.into());
	obj.insert("conditions", JsonValue::Array(conditions.collect()));
	JsonValue::Object(obj)
}

pub fn state_machine_to_string(machine: &StateMachine) -> String {
	json::stringify_pretty(serialize_state_machine(machine), 4)
}

pub fn deserialize_state_machine(payload: &JsonValue) -> ResourceParseResult<StateMachine> {
	let obj = as_object("(state machine)", payload)?;
	expect_type(obj, STATE_MACHINE_TYPE)?;

	let mut machine = StateMachine::new();
	for (i, param) in optional(obj.get_list("parameters"))?.unwrap_or_default().iter().enumerate() {
		let (name, default) = vals("parameters", deserialize_parameter(param).map_err(|e| e.in_list(i)))?;
		machine.add_parameter(name, default);
	}
	for (i, layer) in optional(obj.get_list("layers"))?.unwrap_or_default().iter().enumerate() {
		let layer = vals("layers", deserialize_layer(&machine, layer).map_err(|e| e.in_list(i)))?;
		machine.layers.push(layer);
	}
	Ok(machine)
}

fn deserialize_parameter(val: &JsonValue) -> ResourceParseResult<(&str, ParamValue)> {
	let obj = as_object("(parameter)", val)?;
	let index = obj.get_i32("type")?;
	let ty = usize::try_from(index)
		.ok()
		.and_then(ParamType::from_index)
		.ok_or_else(|| ResourceParseError::UnknownParameterType(index.to_string()))?;

	let default = match optional(obj.get("default_value"))? {
		Some(val) => param_value(ty, val, "default_value")?,
		None => ParamValue::default_for(ty),
	};
	// triggers always start unset
	let default = match default {
		ParamValue::Trigger(_) => ParamValue::Trigger(false),
		other => other,
	};
	Ok((obj.get_str("name")?, default))
}

fn param_value(ty: ParamType, val: &JsonValue, key: &str) -> ResourceParseResult<ParamValue> {
	let value = match ty {
		ParamType::Bool => val.as_bool().map(ParamValue::Bool),
		ParamType::Trigger => val.as_bool().map(ParamValue::Trigger),
		ParamType::Int => val.as_i32().map(ParamValue::Int),
		ParamType::Float => val.as_f32().map(ParamValue::Float),
	};
	value.ok_or_else(|| match ty {
		ParamType::Bool | ParamType::Trigger => JsonError::ValueIsNotBool(key.to_owned()).into(),
		ParamType::Int | ParamType::Float => JsonError::ValueIsNotNumber(key.to_owned()).into(),
	})
}

fn deserialize_layer(machine: &StateMachine, val: &JsonValue) -> ResourceParseResult<Layer> {
	let obj = as_object("(layer)", val)?;
	let mut layer = Layer::new(obj.get_str("name")?);
	layer.weight = optional(obj.get_f32("weight"))?.unwrap_or(1.0);
	layer.additive = optional(obj.get_bool("additive"))?.unwrap_or(false);
	layer.default_state = optional(obj.get_str("default_state"))?.unwrap_or_default().to_owned();

	for (i, state) in optional(obj.get_list("states"))?.unwrap_or_default().iter().enumerate() {
		let state = vals("states", deserialize_state(state).map_err(|e| e.in_list(i)))?;
		layer.states.push(state);
	}
	for (i, t) in optional(obj.get_list("transitions"))?.unwrap_or_default().iter().enumerate() {
		let t = vals("transitions", deserialize_transition(machine, t).map_err(|e| e.in_list(i)))?;
		layer.transitions.push(t);
	}
	Ok(layer)
}

fn deserialize_state(val: &JsonValue) -> ResourceParseResult<State> {
	let obj = as_object("(state)", val)?;
	let mut state = State::new(
		obj.get_str("name")?,
		optional(obj.get_str("animation_clip"))?.unwrap_or_default(),
	);
	state.speed = optional(obj.get_f32("speed"))?.unwrap_or(1.0);
	state.looping = optional(obj.get_bool("looping"))?.unwrap_or(true);
	state.position = optional(obj.get_vec2("position"))?.unwrap_or_default();
	Ok(state)
}

fn deserialize_transition(machine: &StateMachine, val: &JsonValue) -> ResourceParseResult<Transition> {
	let obj = as_object("(transition)", val)?;
	let mut t = Transition::new(obj.get_str("from_state")?, obj.get_str("to_state")?);
	t.duration = optional(obj.get_f32("transition_duration"))?
		.unwrap_or(DEFAULT_TRANSITION_DURATION)
		.max(0.0);
	t.exit_time = optional(obj.get_f32("exit_time"))?.unwrap_or(1.0);
	t.has_exit_time = optional(obj.get_bool("has_exit_time"))?.unwrap_or(false);
	t.can_transition_to_self = optional(obj.get_bool("can_transition_to_self"))?.unwrap_or(false);

	for (i, c) in optional(obj.get_list("conditions"))?.unwrap_or_default().iter().enumerate() {
		let c = vals("conditions", deserialize_condition(machine, c).map_err(|e| e.in_list(i)))?;
		t.conditions.push(c);
	}
	Ok(t)
}

fn deserialize_condition(machine: &StateMachine, val: &JsonValue) -> ResourceParseResult<Condition> {
	let obj: JsonObject = as_object("(condition)", val)?;
	let name = obj.get_str("parameter_name")?;

	let op = obj.get("operator")?;
	let op = match op.as_str() {
		Some(symbol) => CompareOp::try_from(symbol).map_err(|e| ResourceParseError::UnknownOperator(e.0))?,
		None => op
			.as_usize()
			.and_then(CompareOp::from_index)
			.ok_or_else(|| ResourceParseError::UnknownOperator(op.dump()))?,
	};

	let value = obj.get("value")?;
	let value = match machine.parameter(name) {
		Some(param) => param_value(param.default.ty(), value, "value")?,
		None => {
			warn!("Condition on undeclared parameter {:?} will never pass", name);
			match value.as_bool() {
				Some(b) => ParamValue::Bool(b),
				None => param_value(ParamType::Float, value, "value")?,
			}
		}
	};
	Ok(Condition::new(name, op, value))
}

pub fn parse_state_machine(text: &str) -> ResourceParseResult<StateMachine> {
	deserialize_state_machine(&parse_document(text)?)
}

pub fn load_state_machine_file(path: impl AsRef<Path>) -> Result<StateMachine, LoadError> {
	let path = path.as_ref();
	parse_state_machine(&read_file(path)?).map_err(resource_error(path))
}

pub fn save_state_machine_file(machine: &StateMachine, path: impl AsRef<Path>) -> Result<(), LoadError> {
	write_file(path.as_ref(), &state_machine_to_string(machine))
}

#[cfg(test)]
mod tests {
	use glam::vec2;

	use super::*;
	use crate::animation::state_machine::ParameterStore;

	const LOCOMOTION: &str = r#"{
		"type": "StateMachine",
		"version": "1.0",
		"parameters": [
			{ "name": "speed", "type": 2, "default_value": 0.0 },
			{ "name": "grounded", "type": 0, "default_value": true },
			{ "name": "jump", "type": 3, "default_value": true }
		],
		"layers": [
			{
				"name": "Base",
				"weight": 1.0,
				"additive": false,
				"default_state": "Idle",
				"states": [
					{ "id": "a", "name": "Idle", "animation_clip": "idle", "speed": 1, "looping": true, "position": [0, 0] },
					{ "id": "b", "name": "Run", "animation_clip": "run", "speed": 1.5, "looping": true, "position": [200, 0] },
					{ "name": "Jump", "animation_clip": "jump", "looping": false }
				],
				"transitions": [
					{
						"from_state": "Idle", "to_state": "Run", "transition_duration": 0.2,
						"exit_time": 1.0, "has_exit_time": false, "can_transition_to_self": false,
						"conditions": [
							{ "parameter_name": "speed", "operator": 2, "value": 0.1 },
							{ "parameter_name": "grounded", "operator": 0, "value": true }
						]
					},
					{ "from_state": "Run", "to_state": "Jump", "conditions": [{ "parameter_name": "jump", "operator": 6, "value": true }] }
				]
			}
		]
	}"#;

	#[test]
	fn reads_layers_and_conditions() {
		let machine = parse_state_machine(LOCOMOTION).unwrap();
		assert_eq!(machine.parameter("jump").unwrap().default, ParamValue::Trigger(false));

		let base = machine.layer("Base").unwrap();
		assert_eq!(base.entry_state().unwrap().clip, "idle");
		assert_eq!(base.state("Run").unwrap().position, vec2(200.0, 0.0));
		assert!(!base.state("Jump").unwrap().looping);

		let run = &base.transitions[0];
		assert_eq!(run.duration, 0.2);
		assert_eq!(run.conditions[0], Condition::new("speed", CompareOp::Greater, ParamValue::Float(0.1)));
		assert_eq!(base.transitions[1].duration, DEFAULT_TRANSITION_DURATION);
		assert_eq!(base.transitions[1].conditions[0].op, CompareOp::IsSet);

		let mut params = ParameterStore::from_machine(&machine);
		params.set_float("speed", 1.0);
		assert!(run.conditions.iter().all(|c| c.evaluate(&params)));
	}

	#[test]
	fn written_machine_reads_back() {
		let machine = parse_state_machine(LOCOMOTION).unwrap();
		let text = state_machine_to_string(&machine);
		assert_eq!(parse_state_machine(&text).unwrap(), machine);
	}

	#[test]
	fn rejects_unknown_enumerations() {
		let bad_type = LOCOMOTION.replace(r#""type": 2"#, r#""type": 7"#);
		assert!(matches!(
			parse_state_machine(&bad_type),
			Err(ResourceParseError::UnknownParameterType(t)) if t == "7"
		));

		let bad_op = LOCOMOTION.replace(r#""operator": 6"#, r#""operator": 9"#);
		assert!(matches!(parse_state_machine(&bad_op), Err(ResourceParseError::UnknownOperator(_))));

		let bad_value = LOCOMOTION.replace(r#""value": 0.1"#, r#""value": "fast""#);
		assert!(parse_state_machine(&bad_value).is_err());
	}
}
