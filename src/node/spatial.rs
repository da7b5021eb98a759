use glam::{Mat3, Mat4, Quat, Vec2, Vec3};

use crate::math::transform::{quat_from_euler_xyz, Transform2D, Transform3D};

/// 2D transform data of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node2D {
	position: Vec2,
	/// Radians
	rotation: f32,
	scale: Vec2,
}

impl Default for Node2D {
	fn default() -> Self {
		Self {
			position: Vec2::ZERO,
			rotation: 0.0,
			scale: Vec2::ONE,
		}
	}
}

impl Node2D {
	pub fn new(position: Vec2, rotation: f32, scale: Vec2) -> Self {
		Self {
			position,
			rotation,
			scale,
		}
	}

	pub fn position(&self) -> Vec2 {
		self.position
	}

	pub fn rotation(&self) -> f32 {
		self.rotation
	}

	pub fn scale(&self) -> Vec2 {
		self.scale
	}

	/// Returns the previous position.
	pub fn set_position(&mut self, position: Vec2) -> Vec2 {
		std::mem::replace(&mut self.position, position)
	}

	/// Returns the previous rotation.
	pub fn set_rotation(&mut self, rotation: f32) -> f32 {
		std::mem::replace(&mut self.rotation, rotation)
	}

	/// Returns the previous scale.
	pub fn set_scale(&mut self, scale: Vec2) -> Vec2 {
		std::mem::replace(&mut self.scale, scale)
	}

	pub fn translate(&mut self, offset: Vec2) {
		self.position += offset;
	}

	pub fn rotate(&mut self, angle: f32) {
		self.rotation += angle;
	}

	pub fn transform(&self) -> Transform2D {
		Transform2D {
			translation: self.position,
			rotation: self.rotation,
			scale: self.scale,
		}
	}

	pub fn local_matrix(&self) -> Mat3 {
		self.transform().to_mat3()
	}
}

/// 3D transform data of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node3D {
	position: Vec3,
	rotation: Quat,
	scale: Vec3,
}

impl Default for Node3D {
	fn default() -> Self {
		Self {
			position: Vec3::ZERO,
			rotation: Quat::IDENTITY,
			scale: Vec3::ONE,
		}
	}
}

impl Node3D {
	pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
		Self {
			position,
			rotation: rotation.normalize(),
			scale,
		}
	}

	pub fn position(&self) -> Vec3 {
		self.position
	}

	pub fn rotation(&self) -> Quat {
		self.rotation
	}

	pub fn scale(&self) -> Vec3 {
		self.scale
	}

	pub fn set_position(&mut self, position: Vec3) -> Vec3 {
		std::mem::replace(&mut self.position, position)
	}

	/// Stored normalized. Returns the previous rotation.
	pub fn set_rotation(&mut self, rotation: Quat) -> Quat {
		std::mem::replace(&mut self.rotation, rotation.normalize())
	}

	/// Euler angles in radians, applied X then Y then Z.
	pub fn set_euler(&mut self, euler: Vec3) -> Quat {
		self.set_rotation(quat_from_euler_xyz(euler))
	}

	pub fn euler(&self) -> Vec3 {
		let (x, y, z) = self.rotation.to_euler(glam::EulerRot::XYZ);
		Vec3::new(x, y, z)
	}

	pub fn set_scale(&mut self, scale: Vec3) -> Vec3 {
		std::mem::replace(&mut self.scale, scale)
	}

	pub fn transform(&self) -> Transform3D {
		Transform3D {
			translation: self.position,
			rotation: self.rotation,
			scale: self.scale,
		}
	}

	pub fn local_matrix(&self) -> Mat4 {
		self.transform().to_mat4()
	}
}

#[cfg(test)]
mod tests {
	use std::f32::consts::FRAC_PI_2;

	use glam::{vec2, vec3};

	use super::*;

	#[test]
	fn setters_hand_back_old_values() {
		let mut node = Node2D::default();
		assert_eq!(node.set_position(vec2(3.0, 4.0)), Vec2::ZERO);
		assert_eq!(node.set_position(vec2(5.0, 6.0)), vec2(3.0, 4.0));
		assert_eq!(node.set_rotation(FRAC_PI_2), 0.0);
		assert_eq!(node.set_scale(vec2(2.0, 2.0)), Vec2::ONE);
	}

	#[test]
	fn euler_round_trip() {
		let mut node = Node3D::default();
		node.set_euler(vec3(0.3, -0.2, 1.1));
		assert!(node.euler().abs_diff_eq(vec3(0.3, -0.2, 1.1), 1e-5));
		assert!(node.rotation().is_normalized());
	}
}
