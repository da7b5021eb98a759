use glam::{Mat3, Mat4, Quat, Vec2, Vec3};

/// 2D affine local transform, applied as translate · rotate · scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
	pub translation: Vec2,
	/// Radians, counter-clockwise.
	pub rotation: f32,
	pub scale: Vec2,
}

impl Default for Transform2D {
	fn default() -> Self {
		Self {
			translation: Vec2::ZERO,
			rotation: 0.0,
			scale: Vec2::ONE,
		}
	}
}

impl Transform2D {
	pub fn to_mat3(&self) -> Mat3 {
		Mat3::from_scale_angle_translation(self.scale, self.rotation, self.translation)
	}

	/// Recovers translation, rotation and scale from an affine matrix built without shear.
	pub fn from_mat3(mat: Mat3) -> Self {
		let x_axis = mat.x_axis.truncate();
		let y_axis = mat.y_axis.truncate();
		let mut scale = Vec2::new(x_axis.length(), y_axis.length());
		if x_axis.perp_dot(y_axis) < 0.0 {
			scale.y = -scale.y;
		}
		Self {
			translation: mat.z_axis.truncate(),
			rotation: x_axis.y.atan2(x_axis.x),
			scale,
		}
	}

	/// Lifts the transform into 3D, around the Z axis.
	pub fn to_mat4(&self) -> Mat4 {
		Mat4::from_scale_rotation_translation(
			self.scale.extend(1.0),
			Quat::from_rotation_z(self.rotation),
			self.translation.extend(0.0),
		)
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3D {
	pub translation: Vec3,
	pub rotation: Quat,
	pub scale: Vec3,
}

impl Default for Transform3D {
	fn default() -> Self {
		Self {
			translation: Vec3::ZERO,
			rotation: Quat::IDENTITY,
			scale: Vec3::ONE,
		}
	}
}

impl Transform3D {
	pub fn to_mat4(&self) -> Mat4 {
		Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
	}

	pub fn from_mat4(mat: Mat4) -> Self {
		let (scale, rotation, translation) = mat.to_scale_rotation_translation();
		Self {
			translation,
			rotation,
			scale,
		}
	}
}

/// Quaternion from Euler angles in radians, applied X then Y then Z.
pub fn quat_from_euler_xyz(euler: Vec3) -> Quat {
	Quat::from_euler(glam::EulerRot::XYZ, euler.x, euler.y, euler.z)
}

#[cfg(test)]
mod tests {
	use std::f32::consts::FRAC_PI_2;

	use glam::vec2;

	use super::*;

	#[test]
	fn decompose_2d() {
		let t = Transform2D {
			translation: vec2(3.0, 4.0),
			rotation: FRAC_PI_2,
			scale: vec2(2.0, 0.5),
		};
		let back = Transform2D::from_mat3(t.to_mat3());
		assert!(back.translation.abs_diff_eq(t.translation, 1e-5));
		assert!((back.rotation - t.rotation).abs() < 1e-5);
		assert!(back.scale.abs_diff_eq(t.scale, 1e-5));
	}

	#[test]
	fn compose_with_parent() {
		let parent = Transform2D {
			translation: vec2(10.0, 0.0),
			rotation: FRAC_PI_2,
			scale: Vec2::ONE,
		};
		let child = Transform2D {
			translation: vec2(1.0, 0.0),
			..Default::default()
		};
		let global = Transform2D::from_mat3(parent.to_mat3() * child.to_mat3());
		assert!(global.translation.abs_diff_eq(vec2(10.0, 1.0), 1e-5));
		assert!((global.rotation - FRAC_PI_2).abs() < 1e-5);
	}
}
