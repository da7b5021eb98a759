use std::collections::HashSet;

use indexmap::IndexSet;
use tracing::warn;

use crate::scene::tree::NodeTree;

use super::property::{canonical_value, read_property, write_clip, write_property};
use super::state_machine::{Layer, ParameterStore, State, StateMachine, Transition};
use super::{AnimValue, AnimationClip, AnimationResource};

/// Playback state of one layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerAnimationState {
	pub layer: String,
	pub state: Option<String>,
	pub clip: Option<String>,
	/// Wrapped clip time.
	pub clip_time: f32,
	/// Time spent in the current state, never wrapped.
	pub state_time: f32,
	pub speed: f32,
	pub looping: bool,

	pub is_transitioning: bool,
	pub next_state: Option<String>,
	pub next_clip: Option<String>,
	pub next_time: f32,
	pub next_speed: f32,
	pub next_looping: bool,
	/// Cross-fade progress in `[0, 1]`.
	pub progress: f32,
	pub transition_time: f32,
	pub transition_duration: f32,
}

impl LayerAnimationState {
	fn enter(&mut self, state: &State) {
		self.state = Some(state.name.clone());
		self.clip = Some(state.clip.clone()).filter(|c| !c.is_empty());
		self.clip_time = 0.0;
		self.state_time = 0.0;
		self.speed = state.speed;
		self.looping = state.looping;
		self.clear_transition();
	}

	fn begin_transition(&mut self, to: &State, duration: f32) {
		self.is_transitioning = true;
		self.next_state = Some(to.name.clone());
		self.next_clip = Some(to.clip.clone()).filter(|c| !c.is_empty());
		self.next_time = 0.0;
		self.next_speed = to.speed;
		self.next_looping = to.looping;
		self.progress = 0.0;
		self.transition_time = 0.0;
		self.transition_duration = duration;
	}

	/// The next state becomes current, keeping the time it already played.
	fn finish_transition(&mut self) {
		self.state = self.next_state.take();
		self.clip = self.next_clip.take();
		self.clip_time = self.next_time;
		self.state_time = self.next_time;
		self.speed = self.next_speed;
		self.looping = self.next_looping;
		self.clear_transition();
	}

	fn clear_transition(&mut self) {
		self.is_transitioning = false;
		self.next_state = None;
		self.next_clip = None;
		self.next_time = 0.0;
		self.progress = 0.0;
		self.transition_time = 0.0;
		self.transition_duration = 0.0;
	}
}

fn advance_clip(time: f32, dt: f32, clip: Option<&AnimationClip>, looping: bool) -> f32 {
	let Some(clip) = clip else {
		return time + dt;
	};
	let time = time + dt;
	if clip.duration <= 0.0 {
		0.0
	} else if looping || clip.looping {
		time.rem_euclid(clip.duration)
	} else {
		time.clamp(0.0, clip.duration)
	}
}

/// Drives a [`StateMachine`] with the clips of an [`AnimationResource`].
///
/// Per tick: fire transitions, advance clip times, write sampled values. A layer that is
/// cross-fading blends both clips by its progress; tracks missing on one side blend with the
/// property's current value.
#[derive(Debug)]
pub struct StateMachineRuntime {
	machine: StateMachine,
	clips: AnimationResource,
	params: ParameterStore,
	layers: Vec<LayerAnimationState>,
	playing: bool,
	reported: HashSet<String>,
}

impl StateMachineRuntime {
	pub fn new(machine: StateMachine, clips: AnimationResource) -> Self {
		let params = ParameterStore::from_machine(&machine);
		let mut runtime = Self {
			machine,
			clips,
			params,
			layers: Vec::new(),
			playing: true,
			reported: HashSet::new(),
		};
		runtime.reset_layers();
		runtime
	}

	/// Puts every layer back in its entry state.
	pub fn reset_layers(&mut self) {
		self.layers = self
			.machine
			.layers
			.iter()
			.map(|layer| {
				let mut state = LayerAnimationState {
					layer: layer.name.clone(),
					speed: 1.0,
					..Default::default()
				};
				match layer.entry_state() {
					Some(entry) => state.enter(entry),
					None => warn!("State machine layer {:?} has no entry state", layer.name),
				}
				state
			})
			.collect();
	}

	pub fn machine(&self) -> &StateMachine {
		&self.machine
	}

	pub fn clips(&self) -> &AnimationResource {
		&self.clips
	}

	pub fn params(&self) -> &ParameterStore {
		&self.params
	}

	pub fn params_mut(&mut self) -> &mut ParameterStore {
		&mut self.params
	}

	pub fn set_bool(&mut self, name: &str, value: bool) {
		self.params.set_bool(name, value);
	}

	pub fn set_int(&mut self, name: &str, value: i32) {
		self.params.set_int(name, value);
	}

	pub fn set_float(&mut self, name: &str, value: f32) {
		self.params.set_float(name, value);
	}

	pub fn set_trigger(&mut self, name: &str) {
		self.params.set_trigger(name);
	}

	pub fn get_bool(&self, name: &str) -> bool {
		self.params.get_bool(name)
	}

	pub fn get_int(&self, name: &str) -> i32 {
		self.params.get_int(name)
	}

	pub fn get_float(&self, name: &str) -> f32 {
		self.params.get_float(name)
	}

	// playback

	pub fn play(&mut self) {
		self.playing = true;
		self.reported.clear();
	}

	/// Halts and rewinds every layer to its entry state.
	pub fn stop(&mut self) {
		self.playing = false;
		self.reset_layers();
	}

	pub fn pause(&mut self) {
		self.playing = false;
	}

	pub fn resume(&mut self) {
		self.playing = true;
	}

	pub fn is_playing(&self) -> bool {
		self.playing
	}

	/// Jumps a layer (the first one for `None`) to a state without cross-fading.
	pub fn play_state(&mut self, state: &str, layer: Option<&str>) -> bool {
		let Some(index) = self.layer_index(layer) else {
			self.warn_once(format!("layer:{:?}", layer), format!("State machine layer {:?} not found", layer));
			return false;
		};
		let Some(found) = self.machine.layers[index].state(state) else {
			self.warn_once(format!("state:{}", state), format!("State {:?} not found", state));
			return false;
		};
		self.layers[index].enter(found);
		self.playing = true;
		true
	}

	fn layer_index(&self, layer: Option<&str>) -> Option<usize> {
		match layer {
			None => (!self.layers.is_empty()).then_some(0),
			Some(name) => self.layers.iter().position(|l| l.layer == name),
		}
	}

	pub fn layer_state(&self, layer: Option<&str>) -> Option<&LayerAnimationState> {
		self.layers.get(self.layer_index(layer)?)
	}

	pub fn layer_states(&self) -> &[LayerAnimationState] {
		&self.layers
	}

	pub fn current_state(&self, layer: Option<&str>) -> Option<&str> {
		self.layer_state(layer)?.state.as_deref()
	}

	pub fn is_in_transition(&self, layer: Option<&str>) -> bool {
		self.layer_state(layer).map(|l| l.is_transitioning).unwrap_or(false)
	}

	pub fn layer_names(&self) -> impl Iterator<Item = &str> {
		self.machine.layers.iter().map(|l| l.name.as_str())
	}

	pub fn state_names(&self, layer: Option<&str>) -> Vec<&str> {
		let Some(index) = self.layer_index(layer) else {
			return Vec::new();
		};
		self.machine.layers[index].states.iter().map(|s| s.name.as_str()).collect()
	}

	pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
		self.params.names()
	}

	// ticking

	pub fn tick(&mut self, tree: &mut NodeTree, dt: f32) {
		if !self.playing {
			return;
		}
		for index in 0..self.layers.len() {
			self.step_layer(index, dt);
		}
		for index in 0..self.layers.len() {
			for (key, msg) in self.apply_layer(tree, index) {
				self.warn_once(key, msg);
			}
		}
	}

	fn step_layer(&mut self, index: usize, dt: f32) {
		let layer = &self.machine.layers[index];
		let state = &mut self.layers[index];

		// progress starts counting on the tick after a transition fires
		let mut fired = false;
		if state.is_transitioning {
			state.transition_time += dt;
			state.progress = if state.transition_duration > 0.0 {
				(state.transition_time / state.transition_duration).min(1.0)
			} else {
				1.0
			};
		} else if let Some(transition) = pick_transition(layer, state, &self.clips, &self.params) {
			let consumed: Vec<String> = transition
				.conditions
				.iter()
				.filter(|c| c.observes_trigger(&self.params))
				.map(|c| c.parameter.clone())
				.collect();
			for name in consumed {
				self.params.reset_trigger(&name);
			}

			match layer.state(&transition.to) {
				Some(to) if transition.duration <= 0.0 => state.enter(to),
				Some(to) => {
					state.begin_transition(to, transition.duration);
					fired = true;
				}
				None => {
					if self.reported.insert(format!("state:{}", transition.to)) {
						warn!("Transition target {:?} not found in layer {:?}", transition.to, layer.name);
					}
				}
			}
		}

		let clip = state.clip.as_deref().and_then(|c| self.clips.clip(c));
		state.clip_time = advance_clip(state.clip_time, dt * state.speed, clip, state.looping);
		state.state_time += dt * state.speed;

		if state.is_transitioning && !fired {
			let next = state.next_clip.as_deref().and_then(|c| self.clips.clip(c));
			state.next_time = advance_clip(state.next_time, dt * state.next_speed, next, state.next_looping);
			if state.progress >= 1.0 {
				state.finish_transition();
			}
		}
	}

	/// Writes one layer. Returns the failures as (offender, message).
	fn apply_layer(&self, tree: &mut NodeTree, index: usize) -> Vec<(String, String)> {
		let weight = self.machine.layers[index].weight.clamp(0.0, 1.0);
		let state = &self.layers[index];
		let mut failures = Vec::new();

		let current = self.find_clip(state.clip.as_deref(), &mut failures);
		let next = if state.is_transitioning {
			self.find_clip(state.next_clip.as_deref(), &mut failures)
		} else {
			None
		};

		if !state.is_transitioning {
			if let Some(clip) = current {
				failures.extend(write_clip(tree, clip, state.clip_time, weight));
			}
			return failures;
		}

		let targets: IndexSet<(&str, &str)> = current
			.into_iter()
			.chain(next)
			.flat_map(|c| c.tracks.iter())
			.map(|t| (t.node_path.as_str(), t.property_name.as_str()))
			.collect();

		for (path, property) in targets {
			let Some(node) = tree.resolve_path(path) else {
				failures.push((
					format!("path:{}", path),
					format!("Animation track path {:?} does not resolve to a node", path),
				));
				continue;
			};
			let from = current
				.and_then(|c| c.track(path, property))
				.and_then(|t| t.sample(state.clip_time))
				.or_else(|| read_property(tree, node, property));
			let to = next
				.and_then(|c| c.track(path, property))
				.and_then(|t| t.sample(state.next_time))
				.or_else(|| read_property(tree, node, property));
			let (Some(from), Some(to)) = (from, to) else {
				continue;
			};
			let from = canonical_value(tree, node, property, from);
			let to = canonical_value(tree, node, property, to);

			let value: AnimValue = from.interpolate(&to, state.progress);
			if let Err(e) = write_property(tree, node, property, value, weight) {
				failures.push((
					format!("write:{}:{}", path, property),
					format!("Cannot animate {:?} on {:?}: {}", property, path, e),
				));
			}
		}
		failures
	}

	fn find_clip(&self, name: Option<&str>, failures: &mut Vec<(String, String)>) -> Option<&AnimationClip> {
		let name = name?;
		let clip = self.clips.clip(name);
		if clip.is_none() {
			failures.push((format!("clip:{}", name), format!("Animation clip {:?} not found", name)));
		}
		clip
	}

	fn warn_once(&mut self, key: String, msg: String) {
		if self.reported.insert(key) {
			warn!("{}", msg);
		}
	}
}

/// First transition out of the current state whose exit time and conditions pass.
fn pick_transition<'m>(
	layer: &'m Layer,
	state: &LayerAnimationState,
	clips: &AnimationResource,
	params: &ParameterStore,
) -> Option<&'m Transition> {
	let current = state.state.as_deref()?;
	layer.transitions.iter().filter(|t| t.from == current).find(|t| {
		if t.to == current && !t.can_transition_to_self {
			return false;
		}
		if t.has_exit_time {
			let duration = state.clip.as_deref().map(|c| clips.clip_duration(c)).unwrap_or(0.0);
			let played = if duration > 0.0 {
				state.state_time / duration
			} else {
				state.state_time
			};
			if played < t.exit_time {
				return false;
			}
		}
		t.conditions.iter().all(|c| c.evaluate(params))
	})
}

#[cfg(test)]
mod tests {
	use std::f32::consts::FRAC_PI_2;

	use glam::{vec2, vec3, Quat, Vec2};

	use super::*;
	use crate::animation::state_machine::{CompareOp, Condition, ParamValue};
	use crate::animation::{AnimType, Track};
	use crate::math::easing::Interpolation;
	use crate::node::{Node, NodeUuid};

	fn hold(name: &str, x: f32) -> AnimationClip {
		let track = Track::new("/R", "position", AnimType::Vec2)
			.with_keyframe(0.0, AnimValue::Vec2(vec2(x, 0.0)), Interpolation::Linear)
			.with_keyframe(1.0, AnimValue::Vec2(vec2(x, 0.0)), Interpolation::Linear);
		AnimationClip::new(name, 1.0, true).with_track(track)
	}

	fn clips() -> AnimationResource {
		AnimationResource::new().with_clip(hold("walk", 0.0)).with_clip(hold("run", 10.0))
	}

	fn scene() -> (NodeTree, NodeUuid) {
		let tree = NodeTree::new(Node::new_2d("R"));
		let root = tree.root_uuid();
		(tree, root)
	}

	fn x(tree: &NodeTree, uuid: NodeUuid) -> f32 {
		tree.get_node(uuid).and_then(Node::as_2d).map(|n| n.position().x).unwrap()
	}

	fn cross_fade() -> StateMachineRuntime {
		let machine = StateMachine::new().with_parameter("speed", ParamValue::Float(0.0)).with_layer(
			Layer::new("Base")
				.with_state(State::new("A", "walk"))
				.with_state(State::new("B", "run"))
				.with_transition(
					Transition::new("A", "B")
						.with_duration(0.25)
						.when(Condition::new("speed", CompareOp::Greater, ParamValue::Float(5.0))),
				),
		);
		StateMachineRuntime::new(machine, clips())
	}

	mod transitions {
		use super::super::*;
		use super::*;

		#[test]
		fn cross_fade_blends_both_clips() {
			let (mut tree, root) = scene();
			let mut rt = cross_fade();
			assert_eq!(rt.current_state(Some("Base")), Some("A"));

			rt.set_float("speed", 10.0);
			rt.tick(&mut tree, 0.1);
			assert!(rt.is_in_transition(None));
			assert_eq!(rt.layer_state(None).unwrap().progress, 0.0);

			rt.tick(&mut tree, 0.1);
			rt.tick(&mut tree, 0.1);
			let layer = rt.layer_state(Some("Base")).unwrap();
			assert!(layer.is_transitioning);
			assert!((layer.progress - 0.8).abs() < 1e-5);
			assert!((x(&tree, root) - 8.0).abs() < 1e-4);

			rt.tick(&mut tree, 0.1);
			assert!(!rt.is_in_transition(None));
			assert_eq!(rt.current_state(None), Some("B"));
			assert!((x(&tree, root) - 10.0).abs() < 1e-5);
		}

		#[test]
		fn cross_fade_into_euler_rotation() {
			let spin = Track::new("/R", "rotation", AnimType::Vec3)
				.with_keyframe(0.0, AnimValue::Vec3(vec3(0.0, 0.0, FRAC_PI_2)), Interpolation::Linear)
				.with_keyframe(1.0, AnimValue::Vec3(vec3(0.0, 0.0, FRAC_PI_2)), Interpolation::Linear);
			let clips = AnimationResource::new()
				.with_clip(AnimationClip::new("walk", 1.0, true))
				.with_clip(AnimationClip::new("run", 1.0, true).with_track(spin));
			let mut rt = StateMachineRuntime::new(cross_fade().machine().clone(), clips);

			let mut tree = NodeTree::new(Node::new_3d("R"));
			let root = tree.root_uuid();
			rt.set_float("speed", 10.0);
			rt.tick(&mut tree, 0.1);
			rt.tick(&mut tree, 0.1);
			assert!(rt.is_in_transition(None));

			let rotation = tree.get_node(root).and_then(Node::as_3d).map(|n| n.rotation()).unwrap();
			assert!(rotation.abs_diff_eq(Quat::from_rotation_z(0.4 * FRAC_PI_2), 1e-5));
		}

		#[test]
		fn no_transition_without_condition() {
			let (mut tree, root) = scene();
			let mut rt = cross_fade();
			for _ in 0..5 {
				rt.tick(&mut tree, 0.1);
			}
			assert_eq!(rt.current_state(None), Some("A"));
			assert_eq!(x(&tree, root), 0.0);
		}

		#[test]
		fn trigger_is_consumed() {
			let machine = StateMachine::new().with_parameter("jump", ParamValue::Trigger(false)).with_layer(
				Layer::new("Base")
					.with_state(State::new("X", "walk"))
					.with_state(State::new("Y", "run"))
					.with_transition(Transition::new("X", "Y").with_duration(0.0).when(Condition::trigger("jump"))),
			);
			let (mut tree, root) = scene();
			let mut rt = StateMachineRuntime::new(machine, clips());
			rt.set_trigger("jump");
			assert!(rt.get_bool("jump"));

			rt.tick(&mut tree, 0.1);
			assert_eq!(rt.current_state(None), Some("Y"));
			assert!(!rt.get_bool("jump"));
			assert_eq!(x(&tree, root), 10.0);
		}

		#[test]
		fn exit_time_waits_for_clip_end() {
			let mut transition = Transition::new("A", "B").with_duration(0.0);
			transition.has_exit_time = true;
			transition.exit_time = 1.0;
			let machine = StateMachine::new().with_layer(
				Layer::new("Base")
					.with_state(State::new("A", "walk"))
					.with_state(State::new("B", "run"))
					.with_transition(transition),
			);
			let (mut tree, _) = scene();
			let mut rt = StateMachineRuntime::new(machine, clips());
			rt.tick(&mut tree, 0.5);
			rt.tick(&mut tree, 0.4);
			assert_eq!(rt.current_state(None), Some("A"));
			rt.tick(&mut tree, 0.2);
			rt.tick(&mut tree, 0.1);
			assert_eq!(rt.current_state(None), Some("B"));
		}

		#[test]
		fn self_transitions_need_permission() {
			let machine = StateMachine::new().with_layer(
				Layer::new("Base")
					.with_state(State::new("A", "walk"))
					.with_transition(Transition::new("A", "A").with_duration(0.0)),
			);
			let (mut tree, _) = scene();
			let mut rt = StateMachineRuntime::new(machine, clips());
			rt.tick(&mut tree, 0.3);
			assert!((rt.layer_state(None).unwrap().state_time - 0.3).abs() < 1e-6);
		}
	}

	mod control {
		use super::super::*;
		use super::*;

		#[test]
		fn play_state_jumps() {
			let (mut tree, root) = scene();
			let mut rt = cross_fade();
			assert!(rt.play_state("B", Some("Base")));
			rt.tick(&mut tree, 0.1);
			assert_eq!(x(&tree, root), 10.0);
			assert!(!rt.play_state("C", None));
			assert!(!rt.play_state("A", Some("Upper")));
		}

		#[test]
		fn stop_rewinds_and_halts() {
			let (mut tree, root) = scene();
			let mut rt = cross_fade();
			rt.play_state("B", None);
			rt.stop();
			assert_eq!(rt.current_state(None), Some("A"));
			tree.get_node_mut(root).and_then(Node::as_2d_mut).unwrap().set_position(Vec2::ONE);
			rt.tick(&mut tree, 0.1);
			assert_eq!(x(&tree, root), 1.0);
			rt.play();
			rt.tick(&mut tree, 0.1);
			assert_eq!(x(&tree, root), 0.0);
		}

		#[test]
		fn queries() {
			let rt = cross_fade();
			assert_eq!(rt.layer_names().collect::<Vec<_>>(), ["Base"]);
			assert_eq!(rt.state_names(None), ["A", "B"]);
			assert_eq!(rt.parameter_names().collect::<Vec<_>>(), ["speed"]);
			assert_eq!(rt.get_float("missing"), 0.0);
		}

		#[test]
		fn missing_clip_is_harmless() {
			let machine = StateMachine::new().with_layer(Layer::new("Base").with_state(State::new("A", "fly")));
			let (mut tree, root) = scene();
			let mut rt = StateMachineRuntime::new(machine, clips());
			rt.tick(&mut tree, 0.1);
			rt.tick(&mut tree, 0.1);
			assert_eq!(x(&tree, root), 0.0);
			assert_eq!(rt.reported.len(), 1);
		}
	}
}
