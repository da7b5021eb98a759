//! Keyframed property animation: clips, their sampling, and the runtimes that play them.

mod player;
mod property;
pub mod sprite;
mod state_animator;
pub mod state_machine;

use std::fmt;

use glam::{Quat, Vec2, Vec3, Vec4};
use indexmap::IndexMap;

use crate::math::easing::Interpolation;
use crate::math::interp::InterpRange;
use crate::value::PropertyValue;

pub use player::{LoopMode, PlaybackState, TweenPlayer, UnknownLoopModeError};
pub use property::{read_property, write_property, PropertyWriteError};
pub use state_animator::{LayerAnimationState, StateMachineRuntime};

/// Declared value type of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimType {
	Float,
	Vec2,
	Vec3,
	Vec4,
	Quat,
	Color,
	Bool,
	Int,
}

impl AnimType {
	/// In on-disk enumeration order.
	pub const ALL: [AnimType; 8] = [
		AnimType::Float,
		AnimType::Vec2,
		AnimType::Vec3,
		AnimType::Vec4,
		AnimType::Quat,
		AnimType::Color,
		AnimType::Bool,
		AnimType::Int,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			AnimType::Float => "float",
			AnimType::Vec2 => "vec2",
			AnimType::Vec3 => "vec3",
			AnimType::Vec4 => "vec4",
			AnimType::Quat => "quat",
			AnimType::Color => "color",
			AnimType::Bool => "bool",
			AnimType::Int => "int",
		}
	}

	pub fn index(self) -> usize {
		self as usize
	}

	pub fn from_index(index: usize) -> Option<Self> {
		Self::ALL.get(index).copied()
	}
}

impl fmt::Display for AnimType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown property type {0:?}")]
pub struct UnknownAnimTypeError(pub String);

impl TryFrom<&str> for AnimType {
	type Error = UnknownAnimTypeError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		AnimType::ALL
			.into_iter()
			.find(|ty| ty.as_str() == value)
			.ok_or_else(|| UnknownAnimTypeError(value.to_owned()))
	}
}

/// A sampled or keyed value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimValue {
	Float(f32),
	Vec2(Vec2),
	Vec3(Vec3),
	Vec4(Vec4),
	Quat(Quat),
	Color(Vec4),
	Bool(bool),
	Int(i32),
}

impl AnimValue {
	pub fn ty(&self) -> AnimType {
		match self {
			AnimValue::Float(_) => AnimType::Float,
			AnimValue::Vec2(_) => AnimType::Vec2,
			AnimValue::Vec3(_) => AnimType::Vec3,
			AnimValue::Vec4(_) => AnimType::Vec4,
			AnimValue::Quat(_) => AnimType::Quat,
			AnimValue::Color(_) => AnimType::Color,
			AnimValue::Bool(_) => AnimType::Bool,
			AnimValue::Int(_) => AnimType::Int,
		}
	}

	pub fn default_for(ty: AnimType) -> Self {
		match ty {
			AnimType::Float => AnimValue::Float(0.0),
			AnimType::Vec2 => AnimValue::Vec2(Vec2::ZERO),
			AnimType::Vec3 => AnimValue::Vec3(Vec3::ZERO),
			AnimType::Vec4 => AnimValue::Vec4(Vec4::ZERO),
			AnimType::Quat => AnimValue::Quat(Quat::IDENTITY),
			AnimType::Color => AnimValue::Color(Vec4::ONE),
			AnimType::Bool => AnimValue::Bool(false),
			AnimType::Int => AnimValue::Int(0),
		}
	}

	/// Blends toward `other` by `t`. Values of different types do not mix: `self` is kept.
	pub fn interpolate(&self, other: &AnimValue, t: f32) -> AnimValue {
		match (*self, *other) {
			(AnimValue::Float(a), AnimValue::Float(b)) => AnimValue::Float(InterpRange::new(a, b).lerp(t)),
			(AnimValue::Vec2(a), AnimValue::Vec2(b)) => AnimValue::Vec2(InterpRange::new(a, b).lerp(t)),
			(AnimValue::Vec3(a), AnimValue::Vec3(b)) => AnimValue::Vec3(InterpRange::new(a, b).lerp(t)),
			(AnimValue::Vec4(a), AnimValue::Vec4(b)) => AnimValue::Vec4(InterpRange::new(a, b).lerp(t)),
			(AnimValue::Color(a), AnimValue::Color(b)) => AnimValue::Color(InterpRange::new(a, b).lerp(t)),
			(AnimValue::Quat(a), AnimValue::Quat(b)) => AnimValue::Quat(InterpRange::new(a, b).slerp(t)),
			(AnimValue::Int(a), AnimValue::Int(b)) => AnimValue::Int(InterpRange::new(a, b).lerp(t)),
			(AnimValue::Bool(a), AnimValue::Bool(b)) => AnimValue::Bool(InterpRange::new(a, b).step(t)),
			_ => *self,
		}
	}

	/// Quaternions become `Vec4` in `[x, y, z, w]` order.
	pub fn to_property(self) -> PropertyValue {
		match self {
			AnimValue::Float(v) => PropertyValue::Float(v),
			AnimValue::Vec2(v) => PropertyValue::Vec2(v),
			AnimValue::Vec3(v) => PropertyValue::Vec3(v),
			AnimValue::Vec4(v) => PropertyValue::Vec4(v),
			AnimValue::Quat(q) => PropertyValue::Vec4(Vec4::from(q)),
			AnimValue::Color(v) => PropertyValue::Color(v),
			AnimValue::Bool(v) => PropertyValue::Bool(v),
			AnimValue::Int(v) => PropertyValue::Int(v),
		}
	}

	/// Numeric and boolean property values; strings, paths and references cannot be animated.
	pub fn from_property(value: &PropertyValue) -> Option<Self> {
		match value {
			PropertyValue::Float(v) => Some(AnimValue::Float(*v)),
			PropertyValue::Vec2(v) => Some(AnimValue::Vec2(*v)),
			PropertyValue::Vec3(v) => Some(AnimValue::Vec3(*v)),
			PropertyValue::Vec4(v) => Some(AnimValue::Vec4(*v)),
			PropertyValue::Color(v) => Some(AnimValue::Color(*v)),
			PropertyValue::Bool(v) => Some(AnimValue::Bool(*v)),
			PropertyValue::Int(v) => Some(AnimValue::Int(*v)),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
	pub time: f32,
	pub value: AnimValue,
	/// Easing toward the next keyframe.
	pub interpolation: Interpolation,
}

impl Keyframe {
	pub fn new(time: f32, value: AnimValue, interpolation: Interpolation) -> Self {
		Self {
			time,
			value,
			interpolation,
		}
	}
}

/// Keyframes of one property of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
	/// `/`-separated node names, see [`NodeTree::resolve_path`](crate::scene::tree::NodeTree::resolve_path).
	pub node_path: String,
	pub property_name: String,
	pub property_type: AnimType,
	/// Sorted by time.
	pub keyframes: Vec<Keyframe>,
}

impl Track {
	pub fn new(node_path: &str, property_name: &str, property_type: AnimType) -> Self {
		Self {
			node_path: node_path.to_owned(),
			property_name: property_name.to_owned(),
			property_type,
			keyframes: Vec::new(),
		}
	}

	/// Inserts after any keyframe with the same time.
	pub fn add_keyframe(&mut self, keyframe: Keyframe) {
		let at = self.keyframes.partition_point(|k| k.time <= keyframe.time);
		self.keyframes.insert(at, keyframe);
	}

	pub fn with_keyframe(mut self, time: f32, value: AnimValue, interpolation: Interpolation) -> Self {
		self.add_keyframe(Keyframe::new(time, value, interpolation));
		self
	}

	pub fn is_sorted(&self) -> bool {
		self.keyframes.windows(2).all(|w| w[0].time <= w[1].time)
	}

	/// Restores time order. Returns whether anything had to move.
	pub fn sort_keyframes(&mut self) -> bool {
		if self.is_sorted() {
			return false;
		}
		self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
		true
	}

	/// Last keyframe time, 0 for an empty track.
	pub fn end_time(&self) -> f32 {
		self.keyframes.last().map(|k| k.time).unwrap_or(0.0)
	}

	/// Value at `time`, holding the first and last keyframes outside their range.
	pub fn sample(&self, time: f32) -> Option<AnimValue> {
		let (first, last) = match self.keyframes.as_slice() {
			[] => return None,
			[only] => return Some(only.value),
			[first, .., last] => (first, last),
		};

		let next = self.keyframes.partition_point(|k| k.time <= time);
		if next == 0 {
			return Some(first.value);
		}
		if next == self.keyframes.len() {
			return Some(last.value);
		}

		let beg = &self.keyframes[next - 1];
		let end = &self.keyframes[next];
		let t = InterpRange::new(beg.time, end.time).normalize(time);
		Some(beg.value.interpolate(&end.value, beg.interpolation.apply(t)))
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
	pub name: String,
	/// Seconds
	pub duration: f32,
	pub looping: bool,
	pub tracks: Vec<Track>,
}

impl AnimationClip {
	pub fn new(name: &str, duration: f32, looping: bool) -> Self {
		Self {
			name: name.to_owned(),
			duration: duration.max(0.0),
			looping,
			tracks: Vec::new(),
		}
	}

	pub fn with_track(mut self, track: Track) -> Self {
		self.tracks.push(track);
		self
	}

	pub fn track(&self, node_path: &str, property_name: &str) -> Option<&Track> {
		self.tracks
			.iter()
			.find(|t| t.node_path == node_path && t.property_name == property_name)
	}

	pub fn track_mut(&mut self, node_path: &str, property_name: &str) -> Option<&mut Track> {
		self.tracks
			.iter_mut()
			.find(|t| t.node_path == node_path && t.property_name == property_name)
	}

	/// Grows the duration to cover the last keyframe of every track.
	pub fn fit_duration(&mut self) {
		let end = self.tracks.iter().map(Track::end_time).fold(0.0, f32::max);
		self.duration = self.duration.max(end);
	}
}

/// Named clips of one `.anim` file, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationResource {
	clips: IndexMap<String, AnimationClip>,
}

impl AnimationResource {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces any clip with the same name.
	pub fn add_clip(&mut self, clip: AnimationClip) -> Option<AnimationClip> {
		self.clips.insert(clip.name.clone(), clip)
	}

	pub fn with_clip(mut self, clip: AnimationClip) -> Self {
		self.add_clip(clip);
		self
	}

	pub fn remove_clip(&mut self, name: &str) -> Option<AnimationClip> {
		self.clips.shift_remove(name)
	}

	pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
		self.clips.get(name)
	}

	pub fn clip_mut(&mut self, name: &str) -> Option<&mut AnimationClip> {
		self.clips.get_mut(name)
	}

	pub fn first_clip(&self) -> Option<&AnimationClip> {
		self.clips.values().next()
	}

	pub fn clip_names(&self) -> impl Iterator<Item = &str> {
		self.clips.keys().map(String::as_str)
	}

	pub fn clips(&self) -> impl Iterator<Item = &AnimationClip> {
		self.clips.values()
	}

	pub fn len(&self) -> usize {
		self.clips.len()
	}

	pub fn is_empty(&self) -> bool {
		self.clips.is_empty()
	}

	/// Duration of a clip, 0 when it does not exist.
	pub fn clip_duration(&self, name: &str) -> f32 {
		self.clip(name).map(|c| c.duration).unwrap_or(0.0)
	}
}

#[cfg(test)]
mod tests {
	use glam::vec2;

	use super::*;

	fn slide(interpolation: Interpolation) -> Track {
		Track::new("/R", "position", AnimType::Vec2)
			.with_keyframe(0.0, AnimValue::Vec2(Vec2::ZERO), interpolation)
			.with_keyframe(1.0, AnimValue::Vec2(vec2(10.0, 0.0)), interpolation)
	}

	fn x_at(track: &Track, t: f32) -> f32 {
		match track.sample(t) {
			Some(AnimValue::Vec2(v)) => v.x,
			other => panic!("unexpected sample {:?}", other),
		}
	}

	mod sampling {
		use super::super::*;
		use super::*;

		#[test]
		fn linear_midpoints() {
			let track = slide(Interpolation::Linear);
			assert!((x_at(&track, 0.25) - 2.5).abs() < 1e-6);
			assert!((x_at(&track, 0.5) - 5.0).abs() < 1e-6);
		}

		#[test]
		fn holds_outside_keyframes() {
			let track = slide(Interpolation::Linear);
			assert_eq!(x_at(&track, -1.0), 0.0);
			assert_eq!(x_at(&track, 0.0), 0.0);
			assert_eq!(x_at(&track, 1.0), 10.0);
			assert_eq!(x_at(&track, 7.0), 10.0);
		}

		#[test]
		fn ease_in_out_is_cubic() {
			let track = slide(Interpolation::EaseInOut);
			assert!((x_at(&track, 0.5) - 5.0).abs() < 1e-6);
			assert!((x_at(&track, 0.25) - 0.625).abs() < 1e-6);
		}

		#[test]
		fn single_keyframe_everywhere() {
			let track =
				Track::new("/R", "rotation", AnimType::Float).with_keyframe(0.5, AnimValue::Float(2.0), Interpolation::Bounce);
			for t in [-1.0, 0.0, 0.5, 3.0] {
				assert_eq!(track.sample(t), Some(AnimValue::Float(2.0)));
			}
			assert_eq!(Track::new("/R", "rotation", AnimType::Float).sample(0.0), None);
		}

		#[test]
		fn bool_steps_at_half() {
			let track = Track::new("/R", "visible", AnimType::Bool)
				.with_keyframe(0.0, AnimValue::Bool(false), Interpolation::Linear)
				.with_keyframe(1.0, AnimValue::Bool(true), Interpolation::Linear);
			assert_eq!(track.sample(0.49), Some(AnimValue::Bool(false)));
			assert_eq!(track.sample(0.5), Some(AnimValue::Bool(true)));
		}

		#[test]
		fn quaternions_slerp() {
			let half_turn = Quat::from_rotation_z(std::f32::consts::PI);
			let track = Track::new("/R", "rotation", AnimType::Quat)
				.with_keyframe(0.0, AnimValue::Quat(Quat::IDENTITY), Interpolation::Linear)
				.with_keyframe(1.0, AnimValue::Quat(half_turn), Interpolation::Linear);
			let Some(AnimValue::Quat(q)) = track.sample(0.5) else {
				panic!("expected a quaternion");
			};
			assert!(q.abs_diff_eq(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2), 1e-5));
		}

		#[test]
		fn mixed_types_keep_left() {
			let a = AnimValue::Float(1.0);
			assert_eq!(a.interpolate(&AnimValue::Int(5), 0.9), a);
		}
	}

	mod ordering {
		use super::super::*;

		#[test]
		fn add_keyframe_keeps_order() {
			let mut track = Track::new("/R", "rotation", AnimType::Float);
			track.add_keyframe(Keyframe::new(1.0, AnimValue::Float(1.0), Interpolation::Linear));
			track.add_keyframe(Keyframe::new(0.0, AnimValue::Float(0.0), Interpolation::Linear));
			track.add_keyframe(Keyframe::new(0.5, AnimValue::Float(0.5), Interpolation::Linear));
			assert!(track.is_sorted());
			assert!(!track.sort_keyframes());
		}

		#[test]
		fn sort_reports_fixes() {
			let mut track = Track::new("/R", "rotation", AnimType::Float);
			track.keyframes = vec![
				Keyframe::new(1.0, AnimValue::Float(1.0), Interpolation::Linear),
				Keyframe::new(0.0, AnimValue::Float(0.0), Interpolation::Linear),
			];
			assert!(track.sort_keyframes());
			assert_eq!(track.keyframes[0].time, 0.0);
		}

		#[test]
		fn resource_keeps_clip_order() {
			let res = AnimationResource::new()
				.with_clip(AnimationClip::new("walk", 1.0, true))
				.with_clip(AnimationClip::new("idle", 2.0, false));
			assert_eq!(res.clip_names().collect::<Vec<_>>(), ["walk", "idle"]);
			assert_eq!(res.first_clip().map(|c| c.name.as_str()), Some("walk"));
			assert_eq!(res.clip_duration("idle"), 2.0);
			assert_eq!(res.clip_duration("run"), 0.0);
		}

		#[test]
		fn anim_type_names() {
			assert_eq!(AnimType::try_from("quat").unwrap(), AnimType::Quat);
			assert!(AnimType::try_from("matrix").is_err());
			assert_eq!(AnimType::from_index(5), Some(AnimType::Color));
		}
	}
}
