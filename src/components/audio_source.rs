use std::fmt;
use std::rc::Rc;

use glam::Vec3;
use tracing::{debug, warn};

use crate::audio::{AudioManager, VoiceId, VoiceParams};
use crate::component::{impl_component_base, Component, ComponentBase, NodeCtx};
use crate::node::NodeUuid;
use crate::scene::tree::NodeTree;
use crate::value::{ExportType, PropertyValue};

const MIN_PITCH: f32 = 0.1;
const MIN_DISTANCE: f32 = 1.0;

/// A playing voice and the mixer that owns it.
struct Voice {
	audio: Rc<dyn AudioManager>,
	id: VoiceId,
	/// Last parameters sent to the mixer.
	params: VoiceParams,
}

/// Plays an audio clip through the [`AudioManager`] of the running scene.
pub struct AudioSource {
	base: ComponentBase,
	pub audio_clip: String,
	/// `[0, 1]`
	pub volume: f32,
	pub pitch: f32,
	pub looping: bool,
	pub play_on_start: bool,
	/// Positional playback from the owner's global position.
	pub is_3d: bool,
	pub max_distance: f32,
	voice: Option<Voice>,
}

impl fmt::Debug for AudioSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AudioSource")
			.field("audio_clip", &self.audio_clip)
			.field("volume", &self.volume)
			.field("pitch", &self.pitch)
			.field("looping", &self.looping)
			.field("is_3d", &self.is_3d)
			.field("voice", &self.voice.as_ref().map(|v| v.id))
			.finish_non_exhaustive()
	}
}

impl Default for AudioSource {
	fn default() -> Self {
		let mut source = Self {
			base: ComponentBase::new("AudioSource"),
			audio_clip: String::new(),
			volume: 1.0,
			pitch: 1.0,
			looping: false,
			play_on_start: false,
			is_3d: false,
			max_distance: 100.0,
			voice: None,
		};
		source
			.base
			.exports
			.add("audio_clip", PropertyValue::FilePath(String::new()), "Path to audio file", ExportType::FilePath)
			.add("volume", source.volume, "Audio volume (0.0 to 1.0)", ExportType::Float)
			.add("pitch", source.pitch, "Audio pitch multiplier (1.0 = normal)", ExportType::Float)
			.add("looping", source.looping, "Whether audio should loop", ExportType::Bool)
			.add(
				"play_on_start",
				source.play_on_start,
				"Play audio automatically when component starts",
				ExportType::Bool,
			)
			.add("is_3d", source.is_3d, "Enable 3D positional audio", ExportType::Bool)
			.add(
				"max_distance",
				source.max_distance,
				"Maximum distance for 3D audio falloff",
				ExportType::Float,
			);
		source
	}
}

impl AudioSource {
	pub fn new(clip: &str) -> Self {
		let mut source = Self::default();
		source.set_audio_clip(clip);
		source
	}

	/// Stops the current voice when the clip changes.
	pub fn set_audio_clip(&mut self, path: &str) {
		if self.audio_clip != path {
			self.stop();
		}
		self.audio_clip = path.to_owned();
		self.base.sync("audio_clip", PropertyValue::FilePath(path.to_owned()));
	}

	pub fn set_volume(&mut self, volume: f32) {
		self.volume = volume.clamp(0.0, 1.0);
		self.base.sync("volume", self.volume);
	}

	pub fn set_pitch(&mut self, pitch: f32) {
		self.pitch = pitch.max(MIN_PITCH);
		self.base.sync("pitch", self.pitch);
	}

	/// Takes effect on the next `play`.
	pub fn set_looping(&mut self, looping: bool) {
		self.looping = looping;
		self.base.sync("looping", looping);
	}

	pub fn set_play_on_start(&mut self, play_on_start: bool) {
		self.play_on_start = play_on_start;
		self.base.sync("play_on_start", play_on_start);
	}

	pub fn set_spatial(&mut self, is_3d: bool, max_distance: f32) {
		self.is_3d = is_3d;
		self.max_distance = max_distance.max(MIN_DISTANCE);
		self.base.sync("is_3d", is_3d);
		self.base.sync("max_distance", self.max_distance);
	}

	pub fn is_playing(&self) -> bool {
		self.voice.is_some()
	}

	pub fn voice(&self) -> Option<VoiceId> {
		self.voice.as_ref().map(|v| v.id)
	}

	fn params(&self, position: Option<Vec3>) -> VoiceParams {
		VoiceParams {
			volume: self.volume,
			pitch: self.pitch,
			looping: self.looping,
			position: if self.is_3d { position } else { None },
			max_distance: self.max_distance,
		}
	}

	/// Restarts the clip on `audio`. `position` is only used for 3D sources.
	pub fn play(&mut self, audio: Rc<dyn AudioManager>, position: Option<Vec3>) -> bool {
		self.stop();
		if self.audio_clip.is_empty() {
			warn!("AudioSource {:?} has no clip to play", self.base.name);
			return false;
		}

		let params = self.params(position);
		match audio.play(&self.audio_clip, &params) {
			Some(id) => {
				debug!("Playing audio {:?}", self.audio_clip);
				self.voice = Some(Voice { audio, id, params });
				true
			}
			None => {
				warn!("Audio clip {:?} could not be played", self.audio_clip);
				false
			}
		}
	}

	pub fn stop(&mut self) {
		if let Some(voice) = self.voice.take() {
			voice.audio.stop(voice.id);
		}
	}

	/// Sends changed parameters to the mixer.
	fn sync_voice(&mut self, position: Option<Vec3>) {
		let params = self.params(position);
		if let Some(voice) = &mut self.voice {
			if voice.params != params {
				voice.audio.update(voice.id, &params);
				voice.params = params;
			}
		}
	}
}

/// Global position of a spatial owner, 2D nodes sitting at z = 0.
fn owner_position(tree: &NodeTree, owner: NodeUuid) -> Option<Vec3> {
	let node = tree.get_node(owner)?;
	if node.as_3d().is_some() {
		Some(tree.global_position_3d(owner))
	} else if node.as_2d().is_some() {
		Some(tree.global_position_2d(owner).extend(0.0))
	} else {
		None
	}
}

impl Component for AudioSource {
	impl_component_base!();

	fn type_name(&self) -> &str {
		"AudioSource"
	}

	fn category(&self) -> &str {
		"Audio"
	}

	fn update_from_export_variables(&mut self) {
		let clip: String = self.base.exports.get_or("audio_clip", self.audio_clip.clone());
		if clip != self.audio_clip {
			self.stop();
			self.audio_clip = clip;
		}

		let e = &self.base.exports;
		self.volume = e.get_or("volume", self.volume).clamp(0.0, 1.0);
		self.pitch = e.get_or("pitch", self.pitch).max(MIN_PITCH);
		self.looping = e.get_or("looping", self.looping);
		self.play_on_start = e.get_or("play_on_start", self.play_on_start);
		self.is_3d = e.get_or("is_3d", self.is_3d);
		self.max_distance = e.get_or("max_distance", self.max_distance).max(MIN_DISTANCE);
	}

	fn on_ready(&mut self, ctx: &mut NodeCtx) {
		self.update_from_export_variables();
		if self.play_on_start && !self.audio_clip.is_empty() {
			let position = owner_position(ctx.tree, ctx.owner);
			self.play(Rc::clone(&ctx.services.audio), position);
		}
	}

	fn on_update(&mut self, ctx: &mut NodeCtx, _dt: f32) {
		if self.voice.is_some() {
			let position = owner_position(ctx.tree, ctx.owner);
			self.sync_voice(position);
		}
	}

	fn on_destroy(&mut self) {
		self.stop();
	}
}
