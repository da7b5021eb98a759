use glam::{Vec2, Vec4};

/// Axis-aligned rectangle, `position` is the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
	pub position: Vec2,
	pub size: Vec2,
}

impl Rect {
	pub fn new(position: Vec2, size: Vec2) -> Self {
		Self { position, size }
	}

	/// From an `[x, y, w, h]` packed vector, the layout used by texture regions.
	pub fn from_xywh(v: Vec4) -> Self {
		Self {
			position: Vec2::new(v.x, v.y),
			size: Vec2::new(v.z, v.w),
		}
	}

	pub fn to_xywh(self) -> Vec4 {
		Vec4::new(self.position.x, self.position.y, self.size.x, self.size.y)
	}

	pub fn min(&self) -> Vec2 {
		self.position
	}

	pub fn max(&self) -> Vec2 {
		self.position + self.size
	}

	pub fn center(&self) -> Vec2 {
		self.position + self.size * 0.5
	}

	/// Edges inclusive.
	pub fn contains_point(&self, p: Vec2) -> bool {
		let max = self.max();
		p.x >= self.position.x && p.y >= self.position.y && p.x <= max.x && p.y <= max.y
	}
}
