use std::f32::consts::PI;
use std::fmt;

/// Easing applied between a keyframe and the next one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Interpolation {
	#[default]
	Linear,
	/// Smoothstep
	Ease,
	EaseIn,
	EaseOut,
	EaseInOut,
	Bounce,
	Elastic,
}

impl Interpolation {
	pub const ALL: [Interpolation; 7] = [
		Interpolation::Linear,
		Interpolation::Ease,
		Interpolation::EaseIn,
		Interpolation::EaseOut,
		Interpolation::EaseInOut,
		Interpolation::Bounce,
		Interpolation::Elastic,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Interpolation::Linear => "Linear",
			Interpolation::Ease => "Ease",
			Interpolation::EaseIn => "EaseIn",
			Interpolation::EaseOut => "EaseOut",
			Interpolation::EaseInOut => "EaseInOut",
			Interpolation::Bounce => "Bounce",
			Interpolation::Elastic => "Elastic",
		}
	}

	/// Position in the on-disk enumeration.
	pub fn index(self) -> usize {
		self as usize
	}

	pub fn from_index(index: usize) -> Option<Self> {
		Self::ALL.get(index).copied()
	}

	/// Maps `t` in `[0, 1]` onto the eased curve. Input is clamped.
	pub fn apply(self, t: f32) -> f32 {
		let t = t.clamp(0.0, 1.0);
		match self {
			Interpolation::Linear => t,
			Interpolation::Ease => t * t * (3.0 - 2.0 * t),
			Interpolation::EaseIn => t * t,
			Interpolation::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
			Interpolation::EaseInOut => {
				if t < 0.5 {
					4.0 * t * t * t
				} else {
					1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
				}
			}
			Interpolation::Bounce => bounce_out(t),
			Interpolation::Elastic => (t * PI * 8.0).sin() * (1.0 - t) + t,
		}
	}
}

fn bounce_out(t: f32) -> f32 {
	const N1: f32 = 7.5625;
	const D1: f32 = 2.75;

	if t < 1.0 / D1 {
		N1 * t * t
	} else if t < 2.0 / D1 {
		let t = t - 1.5 / D1;
		N1 * t * t + 0.75
	} else if t < 2.5 / D1 {
		let t = t - 2.25 / D1;
		N1 * t * t + 0.9375
	} else {
		let t = t - 2.625 / D1;
		N1 * t * t + 0.984375
	}
}

impl fmt::Display for Interpolation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown interpolation {0:?}")]
pub struct UnknownInterpolationError(pub String);

impl TryFrom<&str> for Interpolation {
	type Error = UnknownInterpolationError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Interpolation::ALL
			.into_iter()
			.find(|interp| interp.as_str() == value)
			.ok_or_else(|| UnknownInterpolationError(value.to_owned()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const EPS: f32 = 1e-6;

	#[test]
	fn endpoints_are_fixed() {
		for interp in Interpolation::ALL {
			assert!(interp.apply(0.0).abs() < EPS, "{interp} at 0");
			assert!((interp.apply(1.0) - 1.0).abs() < EPS, "{interp} at 1");
		}
	}

	#[test]
	fn ease_in_out_is_cubic() {
		let f = Interpolation::EaseInOut;
		assert!((f.apply(0.5) - 0.5).abs() < EPS);
		assert!((f.apply(0.25) - 0.0625).abs() < EPS);
		assert!((f.apply(0.75) - 0.9375).abs() < EPS);
	}

	#[test]
	fn quadratic_and_smoothstep() {
		assert!((Interpolation::EaseIn.apply(0.5) - 0.25).abs() < EPS);
		assert!((Interpolation::EaseOut.apply(0.5) - 0.75).abs() < EPS);
		assert!((Interpolation::Ease.apply(0.25) - 0.15625).abs() < EPS);
	}

	#[test]
	fn bounce_segments_are_continuous() {
		let f = Interpolation::Bounce;
		for edge in [1.0 / 2.75, 2.0 / 2.75, 2.5 / 2.75] {
			let before = f.apply(edge - 1e-4);
			let after = f.apply(edge + 1e-4);
			assert!((before - after).abs() < 1e-2);
		}
	}

	#[test]
	fn names_and_indices() {
		for (i, interp) in Interpolation::ALL.into_iter().enumerate() {
			assert_eq!(Interpolation::try_from(interp.as_str()).unwrap(), interp);
			assert_eq!(Interpolation::from_index(i), Some(interp));
		}
		assert_eq!(Interpolation::from_index(7), None);
		assert!(Interpolation::try_from("Sine").is_err());
	}
}
