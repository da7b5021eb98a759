use std::collections::HashSet;
use std::fmt;

use tracing::warn;

use crate::scene::tree::NodeTree;

use super::property::write_clip;
use super::{AnimationClip, AnimationResource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LoopMode {
	/// Play once and stop at the end.
	#[default]
	None,
	Loop,
	PingPong,
}

impl LoopMode {
	pub const ALL: [LoopMode; 3] = [LoopMode::None, LoopMode::Loop, LoopMode::PingPong];

	pub fn as_str(self) -> &'static str {
		match self {
			LoopMode::None => "None",
			LoopMode::Loop => "Loop",
			LoopMode::PingPong => "PingPong",
		}
	}
}

impl fmt::Display for LoopMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown loop mode {0:?}")]
pub struct UnknownLoopModeError(pub String);

impl TryFrom<&str> for LoopMode {
	type Error = UnknownLoopModeError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		LoopMode::ALL
			.into_iter()
			.find(|m| m.as_str().eq_ignore_ascii_case(value))
			.ok_or_else(|| UnknownLoopModeError(value.to_owned()))
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackState {
	#[default]
	Stopped,
	Playing,
	Paused,
}

/// Plays one clip of an animation resource against a node tree.
///
/// State changes are plain flag flips; values are written by [`tick`](Self::tick) and
/// [`apply`](Self::apply), which resolve every track path against the tree they are given.
#[derive(Debug)]
pub struct TweenPlayer {
	resource: Option<AnimationResource>,
	clip: Option<String>,
	time: f32,
	/// 1 forward, -1 backward while ping-ponging.
	direction: f32,
	mode: LoopMode,
	state: PlaybackState,
	speed: f32,
	/// Set when the time moved without the tree seeing it.
	pending: bool,
	/// Offenders already logged since the last `play`.
	reported: HashSet<String>,
}

impl Default for TweenPlayer {
	fn default() -> Self {
		Self {
			resource: None,
			clip: None,
			time: 0.0,
			direction: 1.0,
			mode: LoopMode::None,
			state: PlaybackState::Stopped,
			speed: 1.0,
			pending: false,
			reported: HashSet::new(),
		}
	}
}

impl TweenPlayer {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_resource(resource: AnimationResource) -> Self {
		let mut player = Self::new();
		player.set_resource(Some(resource));
		player
	}

	/// Swaps the resource and clears playback.
	pub fn set_resource(&mut self, resource: Option<AnimationResource>) {
		self.resource = resource;
		self.clip = None;
		self.time = 0.0;
		self.direction = 1.0;
		self.state = PlaybackState::Stopped;
		self.pending = false;
		self.reported.clear();
	}

	pub fn resource(&self) -> Option<&AnimationResource> {
		self.resource.as_ref()
	}

	pub fn speed(&self) -> f32 {
		self.speed
	}

	pub fn set_speed(&mut self, speed: f32) {
		self.speed = speed;
	}

	/// Starts a clip from the beginning. An empty name plays the first clip.
	///
	/// A missing resource or clip is logged and leaves the player as it was.
	pub fn play(&mut self, clip: &str, mode: LoopMode) -> bool {
		self.reported.clear();
		let Some(resource) = &self.resource else {
			self.warn_once("resource", "No animation resource to play".to_owned());
			return false;
		};
		let found = match clip {
			"" => resource.first_clip(),
			name => resource.clip(name),
		};
		let Some(found) = found else {
			let key = format!("clip:{}", clip);
			self.warn_once(&key, format!("Animation clip {:?} not found", clip));
			return false;
		};

		self.mode = match mode {
			LoopMode::None if found.looping => LoopMode::Loop,
			mode => mode,
		};
		self.clip = Some(found.name.clone());
		self.time = 0.0;
		self.direction = 1.0;
		self.state = PlaybackState::Playing;
		self.pending = true;
		true
	}

	/// Rewinds to 0; the next `tick` or `apply` writes the initial values.
	pub fn stop(&mut self) {
		self.time = 0.0;
		self.direction = 1.0;
		self.state = PlaybackState::Stopped;
		self.pending = self.clip.is_some();
	}

	pub fn pause(&mut self) {
		if self.state == PlaybackState::Playing {
			self.state = PlaybackState::Paused;
		}
	}

	pub fn resume(&mut self) {
		if self.state == PlaybackState::Paused {
			self.state = PlaybackState::Playing;
		}
	}

	pub fn state(&self) -> PlaybackState {
		self.state
	}

	pub fn is_playing(&self) -> bool {
		self.state == PlaybackState::Playing
	}

	pub fn loop_mode(&self) -> LoopMode {
		self.mode
	}

	pub fn current_clip(&self) -> Option<&str> {
		self.clip.as_deref()
	}

	pub fn current_time(&self) -> f32 {
		self.time
	}

	pub fn clip_duration(&self) -> f32 {
		self.clip().map(|c| c.duration).unwrap_or(0.0)
	}

	fn clip(&self) -> Option<&AnimationClip> {
		self.resource.as_ref()?.clip(self.clip.as_deref()?)
	}

	fn wraps(&self) -> bool {
		self.mode != LoopMode::None || self.clip().map(|c| c.looping).unwrap_or(false)
	}

	/// Seeks, clamped to 0. Looping playback wraps, one-shot playback clamps to the end.
	pub fn set_time(&mut self, time: f32) {
		let duration = self.clip_duration();
		let time = time.max(0.0);
		self.time = if duration <= 0.0 {
			0.0
		} else if self.wraps() {
			time % duration
		} else {
			time.min(duration)
		};
		self.pending = true;
	}

	/// Seeks to a fraction of the clip duration.
	pub fn set_normalized_time(&mut self, t: f32) {
		self.set_time(t * self.clip_duration());
	}

	/// Moves time forward by `dt` scaled by the speed. Returns whether values should be written.
	fn advance(&mut self, dt: f32) -> bool {
		if self.state != PlaybackState::Playing {
			return std::mem::take(&mut self.pending);
		}
		let duration = self.clip_duration();
		if duration <= 0.0 {
			self.time = 0.0;
			if self.mode == LoopMode::None {
				self.state = PlaybackState::Stopped;
			}
			return true;
		}

		let dt = dt * self.speed;
		match self.mode {
			LoopMode::None => {
				self.time += dt;
				if self.time >= duration {
					self.time = duration;
					self.state = PlaybackState::Stopped;
				}
				self.time = self.time.max(0.0);
			}
			LoopMode::Loop => {
				self.time = (self.time + dt).rem_euclid(duration);
			}
			LoopMode::PingPong => {
				self.time += dt * self.direction;
				if self.time >= duration {
					self.time = (2.0 * duration - self.time).max(0.0);
					self.direction = -1.0;
				} else if self.time <= 0.0 {
					self.time = (-self.time).min(duration);
					self.direction = 1.0;
				}
			}
		}
		self.pending = false;
		true
	}

	/// Advances playback and writes the sampled values.
	pub fn tick(&mut self, tree: &mut NodeTree, dt: f32) {
		if self.advance(dt) {
			self.apply(tree);
		}
	}

	/// Writes every track of the current clip at the current time.
	pub fn apply(&mut self, tree: &mut NodeTree) {
		self.pending = false;
		let Some(clip) = self.clip() else {
			return;
		};

		let failures = write_clip(tree, clip, self.time, 1.0);
		for (key, msg) in failures {
			self.warn_once(&key, msg);
		}
	}

	fn warn_once(&mut self, key: &str, msg: String) {
		if self.reported.insert(key.to_owned()) {
			warn!("{}", msg);
		}
	}
}
