use glam::Vec4;

use crate::component::{Component, ExportVariableError};
use crate::math::transform::quat_from_euler_xyz;
use crate::node::{Node, NodeKind, NodeUuid};
use crate::scene::tree::NodeTree;

use super::{AnimType, AnimValue, AnimationClip};

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum PropertyWriteError {
	#[error("Node {0} not found")]
	NodeNotFound(NodeUuid),
	#[error("{node_type} has no animatable property {property:?}")]
	UnknownProperty { node_type: String, property: String },
	#[error("Property {property:?} expects {expected}, got {got}")]
	TypeMismatch {
		property: String,
		expected: AnimType,
		got: AnimType,
	},
	#[error("No {0} component on the node")]
	ComponentNotFound(String),
	#[error(transparent)]
	Export(#[from] ExportVariableError),
}

/// Where an animated property lives.
enum Target<'p> {
	Position,
	Rotation,
	Scale,
	Size,
	/// `Type.property`, both parts matched ignoring ASCII case.
	Component { type_name: &'p str, property: &'p str },
}

impl<'p> Target<'p> {
	fn parse(property: &'p str) -> Option<Self> {
		if let Some((type_name, property)) = property.split_once('.') {
			return Some(Target::Component { type_name, property });
		}
		match property {
			"position" => Some(Target::Position),
			"rotation" => Some(Target::Rotation),
			"scale" => Some(Target::Scale),
			"size" => Some(Target::Size),
			_ => None,
		}
	}
}

/// Value type a node property holds, `None` where the node kind lacks it.
fn node_property_type(kind: &NodeKind, target: &Target) -> Option<AnimType> {
	match (kind, target) {
		(NodeKind::Node2D(_), Target::Position | Target::Scale) => Some(AnimType::Vec2),
		(NodeKind::Node2D(_), Target::Rotation) => Some(AnimType::Float),
		(NodeKind::Node3D(_), Target::Position | Target::Scale) => Some(AnimType::Vec3),
		(NodeKind::Node3D(_), Target::Rotation) => Some(AnimType::Quat),
		(NodeKind::Control(_), Target::Position | Target::Size) => Some(AnimType::Vec2),
		_ => None,
	}
}

/// Node3D rotation keyed as `Vec3` holds XYZ Euler radians and is stored as a quaternion.
fn euler_rotation(kind: &NodeKind, target: &Target, value: AnimValue) -> AnimValue {
	match (kind, target, value) {
		(NodeKind::Node3D(_), Target::Rotation, AnimValue::Vec3(euler)) => AnimValue::Quat(quat_from_euler_xyz(euler)),
		_ => value,
	}
}

/// `value` in the form [`read_property`] returns for the same property, so the two blend.
pub(super) fn canonical_value(tree: &NodeTree, uuid: NodeUuid, property: &str, value: AnimValue) -> AnimValue {
	match (tree.get_node(uuid), Target::parse(property)) {
		(Some(node), Some(target)) => euler_rotation(&node.kind, &target, value),
		_ => value,
	}
}

/// Current value of an animatable property. Node3D rotation reads as a quaternion.
pub fn read_property(tree: &NodeTree, uuid: NodeUuid, property: &str) -> Option<AnimValue> {
	let node = tree.get_node(uuid)?;
	match Target::parse(property)? {
		Target::Component { type_name, property } => {
			let component = node.component_by_type_name(type_name)?;
			let name = export_name(component, property)?;
			AnimValue::from_property(component.exports().value(name)?)
		}
		target => read_node_property(node, &target),
	}
}

fn read_node_property(node: &Node, target: &Target) -> Option<AnimValue> {
	Some(match (&node.kind, target) {
		(NodeKind::Node2D(n), Target::Position) => AnimValue::Vec2(n.position()),
		(NodeKind::Node2D(n), Target::Rotation) => AnimValue::Float(n.rotation()),
		(NodeKind::Node2D(n), Target::Scale) => AnimValue::Vec2(n.scale()),
		(NodeKind::Node3D(n), Target::Position) => AnimValue::Vec3(n.position()),
		(NodeKind::Node3D(n), Target::Rotation) => AnimValue::Quat(n.rotation()),
		(NodeKind::Node3D(n), Target::Scale) => AnimValue::Vec3(n.scale()),
		(NodeKind::Control(c), Target::Position) => AnimValue::Vec2(c.position),
		(NodeKind::Control(c), Target::Size) => AnimValue::Vec2(c.size),
		_ => return None,
	})
}

/// Writes an animated value, mixed with the current one by `weight` in `[0, 1]`.
///
/// Node properties: `position`, `rotation`, `scale` on 2D and 3D nodes, `position` and
/// `size` on controls. `Type.property` writes an export variable of the first component
/// of that type. Node3D `rotation` takes a quaternion or XYZ Euler radians as `Vec3`.
/// A value of the wrong type is rejected and nothing changes.
pub fn write_property(
	tree: &mut NodeTree,
	uuid: NodeUuid,
	property: &str,
	value: AnimValue,
	weight: f32,
) -> Result<(), PropertyWriteError> {
	let node = tree.get_node_mut(uuid).ok_or(PropertyWriteError::NodeNotFound(uuid))?;
	let weight = weight.clamp(0.0, 1.0);

	let target = Target::parse(property).ok_or_else(|| PropertyWriteError::UnknownProperty {
		node_type: node.type_name().to_owned(),
		property: property.to_owned(),
	})?;

	if let Target::Component { type_name, property } = target {
		return write_component_property(node, type_name, property, value, weight);
	}

	let expected = node_property_type(&node.kind, &target).ok_or_else(|| PropertyWriteError::UnknownProperty {
		node_type: node.type_name().to_owned(),
		property: property.to_owned(),
	})?;
	let value = euler_rotation(&node.kind, &target, value);
	if value.ty() != expected {
		return Err(PropertyWriteError::TypeMismatch {
			property: property.to_owned(),
			expected,
			got: value.ty(),
		});
	}

	let value = match read_node_property(node, &target) {
		Some(current) if weight < 1.0 => current.interpolate(&value, weight),
		_ => value,
	};

	match (&mut node.kind, target, value) {
		(NodeKind::Node2D(n), Target::Position, AnimValue::Vec2(v)) => {
			n.set_position(v);
		}
		(NodeKind::Node2D(n), Target::Rotation, AnimValue::Float(v)) => {
			n.set_rotation(v);
		}
		(NodeKind::Node2D(n), Target::Scale, AnimValue::Vec2(v)) => {
			n.set_scale(v);
		}
		(NodeKind::Node3D(n), Target::Position, AnimValue::Vec3(v)) => {
			n.set_position(v);
		}
		(NodeKind::Node3D(n), Target::Rotation, AnimValue::Quat(q)) => {
			n.set_rotation(q);
		}
		(NodeKind::Node3D(n), Target::Scale, AnimValue::Vec3(v)) => {
			n.set_scale(v);
		}
		(NodeKind::Control(c), Target::Position, AnimValue::Vec2(v)) => {
			c.set_position(v);
		}
		(NodeKind::Control(c), Target::Size, AnimValue::Vec2(v)) => {
			c.set_size(v);
		}
		_ => {}
	}
	Ok(())
}

/// Export variable names match ignoring ASCII case, an exact match first.
fn export_name<'c>(component: &'c dyn Component, property: &str) -> Option<&'c str> {
	let exports = component.base().exports.iter();
	let mut fallback = None;
	for var in exports {
		if var.name == property {
			return Some(&var.name);
		}
		if fallback.is_none() && var.name.eq_ignore_ascii_case(property) {
			fallback = Some(var.name.as_str());
		}
	}
	fallback
}

fn write_component_property(
	node: &mut Node,
	type_name: &str,
	property: &str,
	value: AnimValue,
	weight: f32,
) -> Result<(), PropertyWriteError> {
	let component = node
		.component_by_type_name_mut(type_name)
		.ok_or_else(|| PropertyWriteError::ComponentNotFound(type_name.to_owned()))?;
	let name = export_name(component, property)
		.ok_or_else(|| ExportVariableError::NotFound(format!("{}.{}", type_name, property)))?
		.to_owned();

	let value = match component.exports().value(&name).and_then(AnimValue::from_property) {
		Some(current) if weight < 1.0 => current.interpolate(&coerce(value, current.ty()), weight),
		_ => value,
	};

	// animated values are not edits
	let was_dirty = component.exports().is_dirty();
	component.exports_mut().set_coerced(&name, value.to_property())?;
	if !was_dirty {
		component.exports_mut().mark_clean();
	}
	component.update_from_export_variables();
	Ok(())
}

/// Re-tags Vec4 and Color so the two blend with each other.
fn coerce(value: AnimValue, ty: AnimType) -> AnimValue {
	match (value, ty) {
		(AnimValue::Vec4(v), AnimType::Color) => AnimValue::Color(v),
		(AnimValue::Color(v), AnimType::Vec4) => AnimValue::Vec4(v),
		(AnimValue::Quat(q), AnimType::Vec4) => AnimValue::Vec4(Vec4::from(q)),
		_ => value,
	}
}

/// Writes every track of a clip at `time`. Returns the failures as (offender, message).
pub(super) fn write_clip(tree: &mut NodeTree, clip: &AnimationClip, time: f32, weight: f32) -> Vec<(String, String)> {
	let mut failures = Vec::new();
	for track in &clip.tracks {
		let Some(value) = track.sample(time) else {
			continue;
		};
		let Some(node) = tree.resolve_path(&track.node_path) else {
			failures.push((
				format!("path:{}", track.node_path),
				format!("Animation track path {:?} does not resolve to a node", track.node_path),
			));
			continue;
		};
		if let Err(e) = write_property(tree, node, &track.property_name, value, weight) {
			failures.push((
				format!("write:{}:{}", track.node_path, track.property_name),
				format!("Cannot animate {:?} on {:?}: {}", track.property_name, track.node_path, e),
			));
		}
	}
	failures
}
