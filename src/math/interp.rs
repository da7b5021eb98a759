use glam::{Quat, Vec2, Vec3, Vec4};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterpRange<T> {
	pub beg: T,
	pub end: T,
}

impl<T> InterpRange<T> {
	#[inline]
	pub fn new(beg: T, end: T) -> Self {
		Self { beg, end }
	}
}

impl InterpRange<f32> {
	/// Position of `t` inside the range, clamped to `[0, 1]`.
	///
	/// An empty range yields 0.
	#[inline]
	pub fn normalize(self, t: f32) -> f32 {
		let span = self.end - self.beg;
		if span <= f32::EPSILON {
			return 0.0;
		}
		((t - self.beg) / span).clamp(0.0, 1.0)
	}

	#[inline]
	pub fn lerp(self, t: f32) -> f32 {
		self.beg + (self.end - self.beg) * t
	}
}

impl InterpRange<Vec2> {
	#[inline]
	pub fn lerp(self, t: f32) -> Vec2 {
		self.beg.lerp(self.end, t)
	}
}

impl InterpRange<Vec3> {
	#[inline]
	pub fn lerp(self, t: f32) -> Vec3 {
		self.beg.lerp(self.end, t)
	}
}

impl InterpRange<Vec4> {
	#[inline]
	pub fn lerp(self, t: f32) -> Vec4 {
		self.beg.lerp(self.end, t)
	}
}

impl InterpRange<Quat> {
	/// Spherical interpolation along the shortest arc.
	#[inline]
	pub fn slerp(self, t: f32) -> Quat {
		self.beg.normalize().slerp(self.end.normalize(), t)
	}
}

impl InterpRange<i32> {
	/// Linear in float space, truncated toward zero.
	#[inline]
	pub fn lerp(self, t: f32) -> i32 {
		InterpRange::new(self.beg as f32, self.end as f32).lerp(t) as i32
	}
}

impl InterpRange<bool> {
	/// Holds the first value until halfway.
	#[inline]
	pub fn step(self, t: f32) -> bool {
		if t < 0.5 {
			self.beg
		} else {
			self.end
		}
	}
}
