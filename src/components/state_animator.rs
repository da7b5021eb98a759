use tracing::{debug, error};

use crate::animation::state_machine::StateMachine;
use crate::animation::{AnimationResource, LayerAnimationState, StateMachineRuntime};
use crate::component::{impl_component_base, Component, ComponentBase, NodeCtx};
use crate::formats::anim::parse_animation;
use crate::formats::state_machine::parse_state_machine;
use crate::resources::Services;
use crate::value::{ExportType, PropertyValue};

/// Runs a `.statemachine` over the clips of a `.anim` resource.
///
/// Everything is a no-op until a state machine has loaded; parameter reads then return zero.
#[derive(Debug)]
pub struct StateAnimator {
	base: ComponentBase,
	pub state_machine_resource: String,
	pub animation_resource: String,
	pub auto_play: bool,
	runtime: Option<StateMachineRuntime>,
	/// Paths the runtime was built from.
	loaded: (String, String),
}

impl Default for StateAnimator {
	fn default() -> Self {
		let mut animator = Self {
			base: ComponentBase::new("StateAnimator"),
			state_machine_resource: String::new(),
			animation_resource: String::new(),
			auto_play: false,
			runtime: None,
			loaded: (String::new(), String::new()),
		};
		animator
			.base
			.exports
			.add(
				"state_machine_resource",
				PropertyValue::FilePath(String::new()),
				"State machine resource file (.statemachine)",
				ExportType::FilePath,
			)
			.add(
				"animation_resource",
				PropertyValue::FilePath(String::new()),
				"Animation resource file (.anim)",
				ExportType::FilePath,
			)
			.add("auto_play", animator.auto_play, "Automatically start playing when ready", ExportType::Bool);
		animator
	}
}

impl StateAnimator {
	pub fn set_state_machine_resource(&mut self, path: &str) {
		self.state_machine_resource = path.to_owned();
		self.base.sync("state_machine_resource", PropertyValue::FilePath(path.to_owned()));
	}

	pub fn set_animation_resource(&mut self, path: &str) {
		self.animation_resource = path.to_owned();
		self.base.sync("animation_resource", PropertyValue::FilePath(path.to_owned()));
	}

	pub fn set_auto_play(&mut self, auto_play: bool) {
		self.auto_play = auto_play;
		self.base.sync("auto_play", auto_play);
	}

	/// Installs already parsed resources, bypassing the resource manager. Starts paused
	/// unless `auto_play` is set.
	pub fn set_resources(&mut self, machine: StateMachine, clips: AnimationResource) {
		self.loaded = (self.state_machine_resource.clone(), self.animation_resource.clone());
		self.install(machine, clips);
	}

	fn install(&mut self, machine: StateMachine, clips: AnimationResource) {
		let mut runtime = StateMachineRuntime::new(machine, clips);
		if !self.auto_play {
			runtime.pause();
		}
		self.runtime = Some(runtime);
	}

	pub fn runtime(&self) -> Option<&StateMachineRuntime> {
		self.runtime.as_ref()
	}

	fn refresh_resources(&mut self, services: &Services) {
		let wanted = (self.state_machine_resource.clone(), self.animation_resource.clone());
		if wanted == self.loaded {
			return;
		}
		self.loaded = wanted;
		self.runtime = None;
		let (machine_path, clips_path) = self.loaded.clone();
		if machine_path.is_empty() {
			return;
		}

		let machine = services
			.resources
			.read_text(&machine_path)
			.map_err(|e| e.to_string())
			.and_then(|text| parse_state_machine(&text).map_err(|e| e.to_string()));
		let machine = match machine {
			Ok(machine) => machine,
			Err(e) => {
				error!("Cannot load state machine {:?}: {}", machine_path, e);
				return;
			}
		};

		// a machine without clips still tracks states and parameters
		let clips = if clips_path.is_empty() {
			Ok(AnimationResource::new())
		} else {
			services
				.resources
				.read_text(&clips_path)
				.map_err(|e| e.to_string())
				.and_then(|text| parse_animation(&text).map_err(|e| e.to_string()))
		};
		let clips = clips.unwrap_or_else(|e| {
			error!("Cannot load animation {:?}: {}", clips_path, e);
			AnimationResource::new()
		});

		debug!(
			"Loaded state machine {:?} with {} layers and {} clips",
			machine_path,
			machine.layers.len(),
			clips.len()
		);
		self.install(machine, clips);
	}

	// parameters

	pub fn set_bool(&mut self, name: &str, value: bool) {
		if let Some(runtime) = &mut self.runtime {
			runtime.set_bool(name, value);
		}
	}

	pub fn set_int(&mut self, name: &str, value: i32) {
		if let Some(runtime) = &mut self.runtime {
			runtime.set_int(name, value);
		}
	}

	pub fn set_float(&mut self, name: &str, value: f32) {
		if let Some(runtime) = &mut self.runtime {
			runtime.set_float(name, value);
		}
	}

	pub fn set_trigger(&mut self, name: &str) {
		if let Some(runtime) = &mut self.runtime {
			runtime.set_trigger(name);
		}
	}

	pub fn get_bool(&self, name: &str) -> bool {
		self.runtime.as_ref().map(|r| r.get_bool(name)).unwrap_or(false)
	}

	pub fn get_int(&self, name: &str) -> i32 {
		self.runtime.as_ref().map(|r| r.get_int(name)).unwrap_or(0)
	}

	pub fn get_float(&self, name: &str) -> f32 {
		self.runtime.as_ref().map(|r| r.get_float(name)).unwrap_or(0.0)
	}

	// playback

	pub fn play(&mut self) {
		if let Some(runtime) = &mut self.runtime {
			runtime.play();
		}
	}

	pub fn stop(&mut self) {
		if let Some(runtime) = &mut self.runtime {
			runtime.stop();
		}
	}

	pub fn pause(&mut self) {
		if let Some(runtime) = &mut self.runtime {
			runtime.pause();
		}
	}

	pub fn resume(&mut self) {
		if let Some(runtime) = &mut self.runtime {
			runtime.resume();
		}
	}

	pub fn is_playing(&self) -> bool {
		self.runtime.as_ref().map(StateMachineRuntime::is_playing).unwrap_or(false)
	}

	/// Jumps to a state of a layer, the first layer for `None`.
	pub fn play_state(&mut self, state: &str, layer: Option<&str>) -> bool {
		match &mut self.runtime {
			Some(runtime) => runtime.play_state(state, layer),
			None => false,
		}
	}

	pub fn current_state(&self, layer: Option<&str>) -> Option<&str> {
		self.runtime.as_ref()?.current_state(layer)
	}

	pub fn is_in_transition(&self, layer: Option<&str>) -> bool {
		self.runtime.as_ref().map(|r| r.is_in_transition(layer)).unwrap_or(false)
	}

	pub fn layer_state(&self, layer: Option<&str>) -> Option<&LayerAnimationState> {
		self.runtime.as_ref()?.layer_state(layer)
	}

	pub fn available_states(&self, layer: Option<&str>) -> Vec<&str> {
		self.runtime.as_ref().map(|r| r.state_names(layer)).unwrap_or_default()
	}

	pub fn available_parameters(&self) -> Vec<&str> {
		self.runtime.as_ref().map(|r| r.parameter_names().collect()).unwrap_or_default()
	}

	pub fn available_layers(&self) -> Vec<&str> {
		self.runtime.as_ref().map(|r| r.layer_names().collect()).unwrap_or_default()
	}
}

impl Component for StateAnimator {
	impl_component_base!();

	fn type_name(&self) -> &str {
		"StateAnimator"
	}

	fn category(&self) -> &str {
		"Animation"
	}

	fn update_from_export_variables(&mut self) {
		let e = &self.base.exports;
		self.state_machine_resource =
			e.get_or("state_machine_resource", std::mem::take(&mut self.state_machine_resource));
		self.animation_resource = e.get_or("animation_resource", std::mem::take(&mut self.animation_resource));
		self.auto_play = e.get_or("auto_play", self.auto_play);
	}

	fn on_ready(&mut self, ctx: &mut NodeCtx) {
		self.update_from_export_variables();
		self.refresh_resources(ctx.services);
	}

	fn on_update(&mut self, ctx: &mut NodeCtx, dt: f32) {
		self.refresh_resources(ctx.services);
		if let Some(runtime) = &mut self.runtime {
			runtime.tick(ctx.tree, dt);
		}
	}
}

#[cfg(test)]
mod tests {
	use glam::{vec2, Vec2};

	use super::*;
	use crate::animation::state_machine::{CompareOp, Condition, Layer, ParamValue, State, Transition};
	use crate::animation::{AnimType, AnimValue, AnimationClip, Track};
	use crate::components::testing::{run, services};
	use crate::formats::anim::animation_to_string;
	use crate::formats::state_machine::state_machine_to_string;
	use crate::math::easing::Interpolation;
	use crate::node::{Node, NodeUuid};
	use crate::resources::MemoryResourceManager;
	use crate::scene::tree::NodeTree;

	fn hold(name: &str, x: f32) -> AnimationClip {
		let track = Track::new("Hero", "position", AnimType::Vec2)
			.with_keyframe(0.0, AnimValue::Vec2(vec2(x, 0.0)), Interpolation::Linear)
			.with_keyframe(1.0, AnimValue::Vec2(vec2(x, 0.0)), Interpolation::Linear);
		AnimationClip::new(name, 1.0, true).with_track(track)
	}

	fn machine() -> StateMachine {
		StateMachine::new().with_parameter("jump", ParamValue::Trigger(false)).with_layer(
			Layer::new("Base")
				.with_state(State::new("Idle", "idle"))
				.with_state(State::new("Air", "air"))
				.with_transition(
					Transition::new("Idle", "Air")
						.with_duration(0.0)
						.when(Condition::trigger("jump")),
				),
		)
	}

	fn stage() -> (NodeTree, NodeUuid, NodeUuid) {
		let mut tree = NodeTree::new(Node::new("Root"));
		let root = tree.root_uuid();
		let hero = tree.add_node(root, Node::new_2d("Hero")).unwrap();
		(tree, root, hero)
	}

	fn resources() -> MemoryResourceManager {
		let clips = AnimationResource::new().with_clip(hold("idle", 0.0)).with_clip(hold("air", 40.0));
		MemoryResourceManager::default()
			.with_text("hero.statemachine", state_machine_to_string(&machine()))
			.with_text("hero.anim", animation_to_string(&clips))
	}

	#[test]
	fn loads_and_follows_triggers() {
		let (mut tree, root, hero) = stage();
		let services = services(resources());
		let mut animator = StateAnimator::default();
		animator.set_state_machine_resource("hero.statemachine");
		animator.set_animation_resource("hero.anim");
		animator.set_auto_play(true);

		run(&mut tree, root, &mut animator, &services, 0.1);
		assert_eq!(animator.current_state(None), Some("Idle"));
		assert_eq!(animator.available_states(None), ["Idle", "Air"]);
		assert_eq!(animator.available_parameters(), ["jump"]);

		animator.set_trigger("jump");
		assert!(animator.get_bool("jump"));
		run(&mut tree, root, &mut animator, &services, 0.1);
		run(&mut tree, root, &mut animator, &services, 0.1);
		assert_eq!(animator.current_state(Some("Base")), Some("Air"));
		assert!(!animator.get_bool("jump"));
		assert!(tree.global_position_2d(hero).abs_diff_eq(vec2(40.0, 0.0), 1e-4));
	}

	#[test]
	fn waits_for_play_without_auto_play() {
		let (mut tree, root, hero) = stage();
		let services = services(resources());
		let mut animator = StateAnimator::default();
		animator.set_state_machine_resource("hero.statemachine");
		animator.set_animation_resource("hero.anim");
		tree.get_node_mut(hero).unwrap().as_2d_mut().unwrap().set_position(vec2(5.0, 5.0));

		run(&mut tree, root, &mut animator, &services, 0.1);
		assert!(!animator.is_playing());
		assert_eq!(tree.global_position_2d(hero), vec2(5.0, 5.0));

		assert!(animator.play_state("Air", None));
		run(&mut tree, root, &mut animator, &services, 0.1);
		assert!(tree.global_position_2d(hero).abs_diff_eq(vec2(40.0, 0.0), 1e-4));
	}

	#[test]
	fn missing_machine_is_a_no_op() {
		let (mut tree, root, hero) = stage();
		let services = services(MemoryResourceManager::default());
		let mut animator = StateAnimator::default();
		animator.set_state_machine_resource("gone.statemachine");
		animator.set_auto_play(true);

		run(&mut tree, root, &mut animator, &services, 0.1);
		assert!(animator.runtime().is_none());
		assert_eq!(animator.get_float("anything"), 0.0);
		assert!(!animator.play_state("Idle", None));
		assert_eq!(tree.global_position_2d(hero), Vec2::ZERO);
	}
}
