use std::fmt;
use std::rc::Rc;

use tracing::{debug, error};

use crate::animation::{AnimationResource, LoopMode, PlaybackState, TweenPlayer};
use crate::component::{impl_component_base, Component, ComponentBase, NodeCtx};
use crate::formats::anim::parse_animation;
use crate::resources::ResourceManager;
use crate::value::{ExportType, PropertyValue};

/// Plays clips of a `.anim` resource against the scene it lives in.
///
/// The resource is read through the resource manager of the scene the animator last ran
/// in. Until it has run once, a new resource path is loaded on the next tick and a `play`
/// made in between is held until then.
pub struct Animator {
	base: ComponentBase,
	pub animation_resource: String,
	pub auto_play: bool,
	/// Played on ready when `auto_play` is set. Empty picks the first clip.
	pub auto_play_clip: String,
	pub playback_speed: f32,
	player: TweenPlayer,
	loaded_path: String,
	resources: Option<Rc<dyn ResourceManager>>,
	/// `play` request waiting for the resource to load.
	queued: Option<(String, LoopMode)>,
}

impl fmt::Debug for Animator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Animator")
			.field("animation_resource", &self.animation_resource)
			.field("auto_play", &self.auto_play)
			.field("auto_play_clip", &self.auto_play_clip)
			.field("playback_speed", &self.playback_speed)
			.field("player", &self.player)
			.field("queued", &self.queued)
			.finish_non_exhaustive()
	}
}

impl Default for Animator {
	fn default() -> Self {
		let mut animator = Self {
			base: ComponentBase::new("Animator"),
			animation_resource: String::new(),
			auto_play: false,
			auto_play_clip: String::new(),
			playback_speed: 1.0,
			player: TweenPlayer::new(),
			loaded_path: String::new(),
			resources: None,
			queued: None,
		};
		animator
			.base
			.exports
			.add(
				"animation_resource",
				PropertyValue::FilePath(String::new()),
				"Path to .anim resource file",
				ExportType::FilePath,
			)
			.add("auto_play", animator.auto_play, "Automatically play animation on ready", ExportType::Bool)
			.add("auto_play_clip", "", "Animation clip to auto-play", ExportType::String)
			.add(
				"playback_speed",
				animator.playback_speed,
				"Animation playback speed multiplier",
				ExportType::Float,
			);
		animator
	}
}

impl Animator {
	/// Switches resource and clears playback. The file is read right away once the animator
	/// has run in a scene.
	pub fn set_animation_resource(&mut self, path: &str) {
		self.animation_resource = path.to_owned();
		self.base.sync("animation_resource", PropertyValue::FilePath(path.to_owned()));
		self.queued = None;
		self.player.set_resource(None);
		self.loaded_path.clear();
		self.refresh_resource();
	}

	/// Installs an already parsed resource, bypassing the resource manager.
	pub fn set_resource(&mut self, resource: AnimationResource) {
		self.player.set_resource(Some(resource));
		self.loaded_path = self.animation_resource.clone();
		self.queued = None;
	}

	pub fn resource(&self) -> Option<&AnimationResource> {
		self.player.resource()
	}

	pub fn set_auto_play(&mut self, auto_play: bool, clip: &str) {
		self.auto_play = auto_play;
		self.auto_play_clip = clip.to_owned();
		self.base.sync("auto_play", auto_play);
		self.base.sync("auto_play_clip", clip);
	}

	pub fn set_playback_speed(&mut self, speed: f32) {
		self.playback_speed = speed;
		self.player.set_speed(speed);
		self.base.sync("playback_speed", speed);
	}

	fn is_loaded(&self) -> bool {
		self.animation_resource == self.loaded_path
	}

	/// Loads `animation_resource` if it changed and a resource manager is known, then starts
	/// a queued `play`.
	fn refresh_resource(&mut self) {
		if self.is_loaded() {
			return;
		}
		let Some(resources) = self.resources.clone() else {
			return;
		};
		self.loaded_path = self.animation_resource.clone();
		self.player.set_resource(None);
		if self.loaded_path.is_empty() {
			self.queued = None;
			return;
		}

		let parsed = resources
			.read_text(&self.loaded_path)
			.map_err(|e| e.to_string())
			.and_then(|text| parse_animation(&text).map_err(|e| e.to_string()));
		match parsed {
			Ok(res) => {
				debug!("Loaded animation {:?} with {} clips", self.loaded_path, res.len());
				self.player.set_resource(Some(res));
			}
			Err(e) => error!("Cannot load animation {:?}: {}", self.loaded_path, e),
		}
		if let Some((clip, mode)) = self.queued.take() {
			self.player.play(&clip, mode);
		}
	}

	/// Starts a clip from its beginning. An empty name falls back to `auto_play_clip`, then
	/// to the first clip.
	///
	/// While the resource waits for its first load the request is queued and `true` is
	/// returned.
	pub fn play(&mut self, clip: &str, mode: LoopMode) -> bool {
		let clip = match clip {
			"" => self.auto_play_clip.clone(),
			name => name.to_owned(),
		};
		if !self.is_loaded() && self.resources.is_none() {
			self.queued = Some((clip, mode));
			return true;
		}
		self.player.play(&clip, mode)
	}

	pub fn stop(&mut self) {
		self.queued = None;
		self.player.stop();
	}

	pub fn pause(&mut self) {
		self.player.pause();
	}

	pub fn resume(&mut self) {
		self.player.resume();
	}

	pub fn set_time(&mut self, time: f32) {
		self.player.set_time(time);
	}

	pub fn set_normalized_time(&mut self, t: f32) {
		self.player.set_normalized_time(t);
	}

	pub fn is_playing(&self) -> bool {
		self.player.is_playing()
	}

	pub fn state(&self) -> PlaybackState {
		self.player.state()
	}

	pub fn current_clip(&self) -> Option<&str> {
		self.player.current_clip()
	}

	pub fn current_time(&self) -> f32 {
		self.player.current_time()
	}

	pub fn clip_duration(&self) -> f32 {
		self.player.clip_duration()
	}

	pub fn clip_names(&self) -> Vec<&str> {
		self.resource().map(|r| r.clip_names().collect()).unwrap_or_default()
	}
}

impl Component for Animator {
	impl_component_base!();

	fn type_name(&self) -> &str {
		"Animator"
	}

	fn category(&self) -> &str {
		"Animation"
	}

	fn update_from_export_variables(&mut self) {
		let e = &self.base.exports;
		self.animation_resource = e.get_or("animation_resource", std::mem::take(&mut self.animation_resource));
		self.auto_play = e.get_or("auto_play", self.auto_play);
		self.auto_play_clip = e.get_or("auto_play_clip", std::mem::take(&mut self.auto_play_clip));
		self.playback_speed = e.get_or("playback_speed", self.playback_speed);
		self.player.set_speed(self.playback_speed);
	}

	fn on_ready(&mut self, ctx: &mut NodeCtx) {
		self.update_from_export_variables();
		self.resources = Some(Rc::clone(&ctx.services.resources));
		self.refresh_resource();
		if self.auto_play && !self.player.is_playing() {
			self.play("", LoopMode::None);
		}
	}

	fn on_update(&mut self, ctx: &mut NodeCtx, dt: f32) {
		self.resources = Some(Rc::clone(&ctx.services.resources));
		self.refresh_resource();
		self.player.tick(ctx.tree, dt);
	}
}

#[cfg(test)]
mod tests {
	use glam::{vec2, Vec2};

	use super::*;
	use crate::animation::{AnimType, AnimValue, AnimationClip, Track};
	use crate::components::testing::{run, services};
	use crate::math::easing::Interpolation;
	use crate::node::{Node, NodeUuid};
	use crate::resources::MemoryResourceManager;
	use crate::scene::tree::NodeTree;

	fn slide() -> AnimationResource {
		let track = Track::new("Player", "position", AnimType::Vec2)
			.with_keyframe(0.0, AnimValue::Vec2(Vec2::ZERO), Interpolation::Linear)
			.with_keyframe(2.0, AnimValue::Vec2(vec2(100.0, 0.0)), Interpolation::Linear);
		AnimationResource::new()
			.with_clip(AnimationClip::new("idle", 1.0, true))
			.with_clip(AnimationClip::new("slide", 2.0, false).with_track(track))
	}

	fn stage() -> (NodeTree, NodeUuid, NodeUuid) {
		let mut tree = NodeTree::new(Node::new("Root"));
		let root = tree.root_uuid();
		let player = tree.add_node(root, Node::new_2d("Player")).unwrap();
		(tree, root, player)
	}

	#[test]
	fn auto_play_drives_the_tree() {
		let (mut tree, root, player) = stage();
		let text = crate::formats::anim::animation_to_string(&slide());
		let services = services(MemoryResourceManager::default().with_text("walk.anim", text));

		let mut animator = Animator::default();
		animator.set_animation_resource("walk.anim");
		animator.set_auto_play(true, "slide");
		animator.set_playback_speed(2.0);

		run(&mut tree, root, &mut animator, &services, 0.5);
		assert_eq!(animator.current_clip(), Some("slide"));
		assert_eq!(animator.current_time(), 1.0);
		assert!(tree.global_position_2d(player).abs_diff_eq(vec2(50.0, 0.0), 1e-4));

		run(&mut tree, root, &mut animator, &services, 1.0);
		assert_eq!(animator.state(), PlaybackState::Stopped);
		assert!(tree.global_position_2d(player).abs_diff_eq(vec2(100.0, 0.0), 1e-4));
	}

	#[test]
	fn empty_clip_name_falls_back() {
		let mut animator = Animator::default();
		animator.set_resource(slide());
		assert!(animator.play("", LoopMode::None));
		assert_eq!(animator.current_clip(), Some("idle"));

		animator.set_auto_play(false, "slide");
		assert!(animator.play("", LoopMode::None));
		assert_eq!(animator.current_clip(), Some("slide"));
		assert!(!animator.play("missing", LoopMode::None));
		assert_eq!(animator.clip_names(), ["idle", "slide"]);
	}

	#[test]
	fn stop_rewinds_and_resamples() {
		let (mut tree, root, player) = stage();
		let services = services(MemoryResourceManager::default());
		let mut animator = Animator::default();
		animator.set_resource(slide());
		animator.play("slide", LoopMode::None);

		run(&mut tree, root, &mut animator, &services, 1.0);
		animator.pause();
		run(&mut tree, root, &mut animator, &services, 1.0);
		assert_eq!(animator.current_time(), 1.0);

		animator.stop();
		run(&mut tree, root, &mut animator, &services, 1.0);
		assert_eq!(animator.current_time(), 0.0);
		assert_eq!(tree.global_position_2d(player), Vec2::ZERO);
	}

	#[test]
	fn switching_resource_then_playing() {
		let (mut tree, root, player) = stage();
		let idle = AnimationResource::new().with_clip(AnimationClip::new("idle", 1.0, true));
		let services = services(
			MemoryResourceManager::default()
				.with_text("idle.anim", crate::formats::anim::animation_to_string(&idle))
				.with_text("walk.anim", crate::formats::anim::animation_to_string(&slide())),
		);

		let mut animator = Animator::default();
		animator.set_animation_resource("idle.anim");
		animator.set_auto_play(true, "idle");
		run(&mut tree, root, &mut animator, &services, 0.1);
		assert_eq!(animator.current_clip(), Some("idle"));

		animator.set_animation_resource("walk.anim");
		assert!(!animator.is_playing());
		assert_eq!(animator.clip_names(), ["idle", "slide"]);
		assert!(animator.play("slide", LoopMode::None));
		run(&mut tree, root, &mut animator, &services, 1.0);
		assert_eq!(animator.current_clip(), Some("slide"));
		assert!(tree.global_position_2d(player).abs_diff_eq(vec2(50.0, 0.0), 1e-4));
	}

	#[test]
	fn play_before_first_load_is_queued() {
		let (mut tree, root, player) = stage();
		let text = crate::formats::anim::animation_to_string(&slide());
		let services = services(MemoryResourceManager::default().with_text("walk.anim", text));

		let mut animator = Animator::default();
		animator.set_animation_resource("walk.anim");
		assert!(animator.play("slide", LoopMode::None));
		run(&mut tree, root, &mut animator, &services, 1.0);
		assert_eq!(animator.current_clip(), Some("slide"));
		assert!(tree.global_position_2d(player).abs_diff_eq(vec2(50.0, 0.0), 1e-4));
	}

	#[test]
	fn missing_resource_is_tolerated() {
		let (mut tree, root, _) = stage();
		let services = services(MemoryResourceManager::default());
		let mut animator = Animator::default();
		animator.set_animation_resource("nowhere.anim");
		animator.set_auto_play(true, "");

		run(&mut tree, root, &mut animator, &services, 0.1);
		assert!(animator.resource().is_none());
		assert!(!animator.is_playing());
	}
}
