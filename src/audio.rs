use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceId(pub u64);

/// Playback parameters of one voice.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceParams {
	pub volume: f32,
	pub pitch: f32,
	pub looping: bool,
	/// World position for spatial voices.
	pub position: Option<Vec3>,
	pub max_distance: f32,
}

impl Default for VoiceParams {
	fn default() -> Self {
		Self {
			volume: 1.0,
			pitch: 1.0,
			looping: false,
			position: None,
			max_distance: 1000.0,
		}
	}
}

/// Mixer collaborator. The core only starts, stops and retunes voices.
pub trait AudioManager {
	fn play(&self, clip: &str, params: &VoiceParams) -> Option<VoiceId>;
	fn stop(&self, voice: VoiceId);
	fn update(&self, voice: VoiceId, params: &VoiceParams);
}

/// Plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudioManager;

impl AudioManager for NullAudioManager {
	fn play(&self, _clip: &str, _params: &VoiceParams) -> Option<VoiceId> {
		None
	}

	fn stop(&self, _voice: VoiceId) {}

	fn update(&self, _voice: VoiceId, _params: &VoiceParams) {}
}
