//! The `.scene` document.
//!
//! ```text
//! { "uuid", "name", "root": Node }
//! Node := { "uuid", "name", "type", "active", "visible", "type_data", "components", "children" }
//! Component := { "uuid", "name", "type", "active", "export_variables": { name: { "type", "value" } } }
//! ```

use std::path::Path;

use glam::{Vec2, Vec3, Vec4};
use json::JsonValue;
use tracing::warn;

use crate::component::registry::registry;
use crate::component::{Component, ExportVariable};
use crate::components::PlaceholderComponent;
use crate::config::RuntimeConfig;
use crate::node::{Control, Node, Node2D, Node3D, NodeKind, NodeUuid};
use crate::resources::Services;
use crate::scene::tree::{NodeTree, TreeError};
use crate::scene::{Scene, SceneUuid};
use crate::value::{ExportType, FontPath, FontStyle, PropertyValue, UnknownExportTypeError};

use super::json::{num, optional, quat_json, vec2_json, vec3_json, vec4_json, JsonError, JsonObject, SerialExtend};
use super::{read_file, write_file, LoadError};

pub type SceneParseResult<T> = Result<T, SceneParseError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SceneParseError {
	#[error(transparent)]
	JsonError(#[from] JsonError),
	#[error("Malformed JSON: {0}")]
	JsonParse(String),
	#[error("Invalid uuid {0:?}")]
	InvalidUuid(String),
	#[error(transparent)]
	UnknownExportType(#[from] UnknownExportTypeError),
	#[error(transparent)]
	Tree(#[from] TreeError),
}

impl SceneParseError {
	pub fn nested(self, key: &str) -> Self {
		match self {
			SceneParseError::JsonError(err) => SceneParseError::JsonError(err.nested(key)),
			_ => self,
		}
	}
}

fn vals<T>(key: &str, res: SceneParseResult<T>) -> SceneParseResult<T> {
	res.map_err(|e| e.nested(key))
}

fn as_object<'file>(msg: &str, val: &'file JsonValue) -> SceneParseResult<JsonObject<'file>> {
	if let Some(obj) = val.as_object() {
		Ok(JsonObject(obj))
	} else {
		Err(SceneParseError::JsonError(JsonError::ValueIsNotObject(msg.to_owned())))
	}
}

fn parse_uuid<T: std::str::FromStr>(text: &str) -> SceneParseResult<T> {
	text.parse().map_err(|_| SceneParseError::InvalidUuid(text.to_owned()))
}

// serialization

pub fn serialize_scene(scene: &Scene) -> JsonValue {
	let mut obj = json::object::Object::new();
	obj.insert("uuid", scene.uuid.to_string().into());
	obj.insert("name", scene.name.as_str().into());
	obj.insert(
		"root",
		match scene.root() {
			Some(tree) => serialize_node(tree, tree.root_uuid()),
			None => JsonValue::Null,
		},
	);
	JsonValue::Object(obj)
}

/// Pretty-printed scene document, two-space indented.
pub fn scene_to_string(scene: &Scene) -> String {
	json::stringify_pretty(serialize_scene(scene), 2)
}

pub fn serialize_node(tree: &NodeTree, uuid: NodeUuid) -> JsonValue {
	let Some(node) = tree.get_node(uuid) else {
		return JsonValue::Null;
	};

	let mut obj = json::object::Object::new();
	obj.insert("uuid", node.uuid.to_string().into());
	obj.insert("name", node.name.as_str().into());
	obj.insert("type", node.type_name().into());
	obj.insert("active", node.active.into());
	obj.insert("visible", node.visible.into());
	obj.insert("type_data", serialize_type_data(&node.kind));
	obj.insert(
		"components",
		JsonValue::Array(node.components().iter().map(|c| serialize_component(c.as_ref())).collect()),
	);
	obj.insert(
		"children",
		JsonValue::Array(
			tree.children_uuids(uuid)
				.into_iter()
				.map(|child| serialize_node(tree, child))
				.collect(),
		),
	);
	JsonValue::Object(obj)
}

fn serialize_type_data(kind: &NodeKind) -> JsonValue {
	let mut obj = json::object::Object::new();
	match kind {
		NodeKind::Node => {}
		NodeKind::Node2D(n) => {
			obj.insert("position", vec2_json(n.position()));
			obj.insert("rotation", num(n.rotation()));
			obj.insert("scale", vec2_json(n.scale()));
		}
		NodeKind::Node3D(n) => {
			obj.insert("position", vec3_json(n.position()));
			obj.insert("rotation", quat_json(n.rotation()));
			obj.insert("scale", vec3_json(n.scale()));
		}
		NodeKind::Control(c) => {
			obj.insert("position", vec2_json(c.position));
			obj.insert("size", vec2_json(c.size));
			obj.insert("anchor_min", vec2_json(c.anchor_min));
			obj.insert("anchor_max", vec2_json(c.anchor_max));
			obj.insert("margin_left", num(c.margin_left));
			obj.insert("margin_top", num(c.margin_top));
			obj.insert("margin_right", num(c.margin_right));
			obj.insert("margin_bottom", num(c.margin_bottom));
			obj.insert("world_space", c.world_space.into());
		}
	}
	JsonValue::Object(obj)
}

pub fn serialize_component(component: &dyn Component) -> JsonValue {
	let mut vars = json::object::Object::new();
	for var in component.exports().iter() {
		let mut entry = json::object::Object::new();
		entry.insert("type", var.ty.as_str().into());
		entry.insert("value", serialize_value(&var.value));
		vars.insert(&var.name, JsonValue::Object(entry));
	}

	let mut obj = json::object::Object::new();
	obj.insert("uuid", component.uuid().to_string().into());
	obj.insert("name", component.name().into());
	obj.insert("type", component.type_name().into());
	obj.insert("active", component.is_active().into());
	obj.insert("export_variables", JsonValue::Object(vars));
	JsonValue::Object(obj)
}

pub fn serialize_value(value: &PropertyValue) -> JsonValue {
	match value {
		PropertyValue::Bool(b) => (*b).into(),
		PropertyValue::Int(i) => (*i).into(),
		PropertyValue::Float(f) => num(*f),
		PropertyValue::String(s) | PropertyValue::FilePath(s) => s.as_str().into(),
		PropertyValue::FontPath(font) => {
			let mut obj = json::object::Object::new();
			match font {
				FontPath::System { family, style } => {
					obj.insert("system", true.into());
					obj.insert("family", family.as_str().into());
					obj.insert("style", style.label().into());
				}
				FontPath::File(path) => {
					obj.insert("system", false.into());
					obj.insert("path", path.as_str().into());
				}
			}
			JsonValue::Object(obj)
		}
		PropertyValue::Color(v) | PropertyValue::Vec4(v) => vec4_json(*v),
		PropertyValue::Vec2(v) => vec2_json(*v),
		PropertyValue::Vec3(v) => vec3_json(*v),
		PropertyValue::NodeReference(uuid) => uuid.to_string().into(),
	}
}

// deserialization

struct ParsedNode<'file> {
	node: Node,
	components: &'file [JsonValue],
	children: &'file [JsonValue],
}

/// Reads a scene document with default collaborators.
pub fn deserialize_scene(payload: &JsonValue) -> SceneParseResult<Scene> {
	deserialize_scene_with(payload, Services::default(), RuntimeConfig::default())
}

/// Builds the scene and leaves it marked saved.
pub fn deserialize_scene_with(payload: &JsonValue, services: Services, config: RuntimeConfig) -> SceneParseResult<Scene> {
	let obj = as_object("(scene)", payload)?;

	let mut scene = Scene::with_services(obj.get_str("name")?, services, config);
	if let Some(uuid) = optional(obj.get_str("uuid"))? {
		scene.uuid = parse_uuid::<SceneUuid>(uuid)?;
	}

	match obj.get("root") {
		Ok(JsonValue::Null) | Err(JsonError::KeyDoesNotExist(_)) => {}
		Ok(root) => {
			let tree = vals("root", deserialize_tree(as_object("root", root)?))?;
			scene.set_root(tree);
		}
		Err(e) => return Err(e.into()),
	}

	scene.mark_saved();
	Ok(scene)
}

pub fn parse_scene(text: &str) -> SceneParseResult<Scene> {
	let payload = json::parse(text).map_err(|e| SceneParseError::JsonParse(e.to_string()))?;
	deserialize_scene(&payload)
}

fn deserialize_tree(obj: JsonObject) -> SceneParseResult<NodeTree> {
	let ParsedNode {
		mut node,
		components,
		children,
	} = deserialize_node(obj)?;
	load_components(&mut node, components)?;

	let mut tree = NodeTree::new(node);
	let root = tree.root_uuid();
	load_children_rec(&mut tree, root, children)?;
	Ok(tree)
}

fn load_children_rec(tree: &mut NodeTree, parent: NodeUuid, children: &[JsonValue]) -> SceneParseResult<()> {
	for (i, child) in children.iter().enumerate() {
		let msg = &format!("children[{}]", i);

		let child = as_object("child", child).map_err(|e| e.nested(msg))?;
		let ParsedNode {
			mut node,
			components,
			children,
		} = deserialize_node(child).map_err(|e| e.nested(msg))?;
		load_components(&mut node, components).map_err(|e| e.nested(msg))?;

		let uuid = tree.add_node(parent, node)?;
		if !children.is_empty() {
			load_children_rec(tree, uuid, children).map_err(|e| e.nested(msg))?;
		}
	}
	Ok(())
}

fn deserialize_node(obj: JsonObject) -> SceneParseResult<ParsedNode> {
	let ty = obj.get_str("type")?;
	let name = obj.get_str("name")?;

	let kind = match registry().create_node_kind(ty) {
		Some(kind) => kind,
		None => {
			warn!("Unknown node type {:?} for node {:?}, loading it as a plain Node", ty, name);
			NodeKind::Node
		}
	};
	let kind = match optional(obj.get_object("type_data"))? {
		Some(data) => vals("type_data", deserialize_type_data(kind, data))?,
		None => kind,
	};

	let mut node = Node::with_kind(name, kind);
	node.set_type_name(ty);
	if let Some(uuid) = optional(obj.get_str("uuid"))? {
		node.uuid = parse_uuid(uuid)?;
	}
	node.active = optional(obj.get_bool("active"))?.unwrap_or(true);
	node.visible = optional(obj.get_bool("visible"))?.unwrap_or(true);

	Ok(ParsedNode {
		node,
		components: obj.get_list("components").unwrap_or(&[]),
		children: obj.get_list("children").unwrap_or(&[]),
	})
}

fn deserialize_type_data(kind: NodeKind, data: JsonObject) -> SceneParseResult<NodeKind> {
	Ok(match kind {
		NodeKind::Node => NodeKind::Node,
		NodeKind::Node2D(d) => {
			let mut n = Node2D::default();
			n.set_position(optional(data.get_vec2("position"))?.unwrap_or(d.position()));
			n.set_rotation(optional(data.get_f32("rotation"))?.unwrap_or(d.rotation()));
			n.set_scale(optional(data.get_vec2("scale"))?.unwrap_or(d.scale()));
			NodeKind::Node2D(n)
		}
		NodeKind::Node3D(d) => {
			let mut n = Node3D::default();
			n.set_position(optional(data.get_vec3("position"))?.unwrap_or(d.position()));
			n.set_rotation(optional(data.get_quat("rotation"))?.unwrap_or(d.rotation()));
			n.set_scale(optional(data.get_vec3("scale"))?.unwrap_or(d.scale()));
			NodeKind::Node3D(n)
		}
		NodeKind::Control(d) => NodeKind::Control(Control {
			position: optional(data.get_vec2("position"))?.unwrap_or(d.position),
			size: optional(data.get_vec2("size"))?.unwrap_or(d.size),
			anchor_min: optional(data.get_vec2("anchor_min"))?.unwrap_or(d.anchor_min),
			anchor_max: optional(data.get_vec2("anchor_max"))?.unwrap_or(d.anchor_max),
			margin_left: optional(data.get_f32("margin_left"))?.unwrap_or(d.margin_left),
			margin_top: optional(data.get_f32("margin_top"))?.unwrap_or(d.margin_top),
			margin_right: optional(data.get_f32("margin_right"))?.unwrap_or(d.margin_right),
			margin_bottom: optional(data.get_f32("margin_bottom"))?.unwrap_or(d.margin_bottom),
			world_space: optional(data.get_bool("world_space"))?.unwrap_or(d.world_space),
		}),
	})
}

fn load_components(node: &mut Node, list: &[JsonValue]) -> SceneParseResult<()> {
	for (i, val) in list.iter().enumerate() {
		let msg = &format!("components[{}]", i);
		let component = as_object("component", val)
			.and_then(deserialize_component)
			.map_err(|e| e.nested(msg))?;
		node.add_component(component);
	}
	Ok(())
}

fn deserialize_component(obj: JsonObject) -> SceneParseResult<Box<dyn Component>> {
	let ty = obj.get_str("type")?;
	let mut component = match registry().create_component(ty) {
		Ok(component) => component,
		Err(e) => {
			warn!("{}, keeping its data in a placeholder", e);
			Box::new(PlaceholderComponent::new(ty))
		}
	};

	if let Some(uuid) = optional(obj.get_str("uuid"))? {
		component.base_mut().uuid = parse_uuid(uuid)?;
	}
	if let Some(name) = optional(obj.get_str("name"))? {
		component.base_mut().name = name.to_owned();
	}
	component.base_mut().active = optional(obj.get_bool("active"))?.unwrap_or(true);

	if let Some(vars) = optional(obj.get_object("export_variables"))? {
		for (name, entry) in vars.0.iter() {
			match vals(name, deserialize_export(name, entry)) {
				Ok(var) => apply_export(component.as_mut(), var),
				Err(e) => warn!("Dropping export variable {:?} of {}: {}", name, ty, e),
			}
		}
	}

	component.update_from_export_variables();
	Ok(component)
}

fn apply_export(component: &mut dyn Component, var: ExportVariable) {
	if !component.exports().contains(&var.name) {
		component.exports_mut().insert(var);
		return;
	}
	if let Err(e) = component.exports_mut().set(&var.name, var.value) {
		warn!("{} component: {}", component.type_name(), e);
	}
}

fn deserialize_export(name: &str, entry: &JsonValue) -> SceneParseResult<ExportVariable> {
	let obj = as_object(name, entry)?;
	let ty = ExportType::try_from(obj.get_str("type")?)?;
	let value = deserialize_value(ty, obj.get("value")?)?;
	Ok(ExportVariable::new(name, value, "", ty))
}

/// Reads a value written by [`serialize_value`] for a variable declared `ty`.
pub fn deserialize_value(ty: ExportType, val: &JsonValue) -> SceneParseResult<PropertyValue> {
	let not_number = || SceneParseError::JsonError(JsonError::ValueIsNotNumber("value".to_owned()));
	let not_string = || SceneParseError::JsonError(JsonError::ValueIsNotString("value".to_owned()));
	let list = || match val {
		JsonValue::Array(list) => Ok(list.as_slice()),
		_ => Err(SceneParseError::JsonError(JsonError::ValueIsNotList("value".to_owned()))),
	};

	Ok(match ty {
		ExportType::Bool => PropertyValue::Bool(
			val.as_bool()
				.ok_or_else(|| SceneParseError::JsonError(JsonError::ValueIsNotBool("value".to_owned())))?,
		),
		ExportType::Int | ExportType::Enum => {
			let f = val.as_f64().ok_or_else(not_number)?;
			if f.fract() != 0.0 || f < i32::MIN as f64 || f > i32::MAX as f64 {
				return Err(SceneParseError::JsonError(JsonError::ParseIntError("value".to_owned())));
			}
			PropertyValue::Int(f as i32)
		}
		ExportType::Float => PropertyValue::Float(val.as_f32().ok_or_else(not_number)?),
		ExportType::String => PropertyValue::String(val.as_str().ok_or_else(not_string)?.to_owned()),
		ExportType::FilePath => PropertyValue::FilePath(val.as_str().ok_or_else(not_string)?.to_owned()),
		ExportType::FontPath => PropertyValue::FontPath(deserialize_font(as_object("value", val)?)?),
		ExportType::Color => PropertyValue::Color(Vec4::from_array(super::json::floats("value", list()?)?)),
		ExportType::Vec2 => PropertyValue::Vec2(Vec2::from_array(super::json::floats("value", list()?)?)),
		ExportType::Vec3 => PropertyValue::Vec3(Vec3::from_array(super::json::floats("value", list()?)?)),
		ExportType::Vec4 => PropertyValue::Vec4(Vec4::from_array(super::json::floats("value", list()?)?)),
		ExportType::NodeReference => {
			PropertyValue::NodeReference(parse_uuid(val.as_str().ok_or_else(not_string)?)?)
		}
	})
}

fn deserialize_font(obj: JsonObject) -> SceneParseResult<FontPath> {
	if obj.get_bool("system")? {
		let style = match FontStyle::try_from(obj.get_str("style")?) {
			Ok(style) => style,
			Err(e) => {
				warn!("{}, using Regular", e);
				FontStyle::Regular
			}
		};
		Ok(FontPath::system(obj.get_str("family")?, style))
	} else {
		Ok(FontPath::file(obj.get_str("path")?))
	}
}

// files

/// Loads a `.scene` file, remembering its path. The scene comes back marked saved.
pub fn load_scene_file(path: impl AsRef<Path>, services: Services, config: RuntimeConfig) -> Result<Scene, LoadError> {
	let path = path.as_ref();
	let scene_error = |source| LoadError::Scene {
		path: path.to_owned(),
		source,
	};

	let text = read_file(path)?;
	let payload = json::parse(&text).map_err(|e| scene_error(SceneParseError::JsonParse(e.to_string())))?;
	let mut scene = deserialize_scene_with(&payload, services, config).map_err(scene_error)?;
	scene.path = Some(path.to_owned());
	Ok(scene)
}

/// Writes the scene, remembers the path and marks it saved.
pub fn save_scene_file(scene: &mut Scene, path: impl AsRef<Path>) -> Result<(), LoadError> {
	let path = path.as_ref();
	write_file(path, &scene_to_string(scene))?;
	scene.path = Some(path.to_owned());
	scene.mark_saved();
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::f32::consts::FRAC_PI_2;

	use glam::{vec2, vec4, Quat};

	use super::*;
	use crate::components::Sprite2D;
	use crate::node::AnchorPreset;

	fn scenario_scene() -> Scene {
		let mut scene = Scene::new("Main");
		let mut root = Node::new_2d("R");
		{
			let n = root.as_2d_mut().unwrap();
			n.set_position(vec2(3.0, 4.0));
			n.set_rotation(FRAC_PI_2);
		}
		let mut sprite: Box<dyn Component> = Box::new(Sprite2D::default());
		sprite
			.set_export("texture_path", PropertyValue::FilePath("t.png".to_owned()))
			.unwrap();
		sprite.set_export("color", PropertyValue::Color(vec4(1.0, 0.0, 0.0, 1.0))).unwrap();
		root.add_component(sprite);
		scene.create_root(root);
		scene
	}

	mod round_trip {
		use super::super::*;
		use super::*;

		#[test]
		fn serialized_twice_is_identical() {
			let scene = scenario_scene();
			let first = scene_to_string(&scene);
			let loaded = parse_scene(&first).unwrap();
			let second = scene_to_string(&loaded);
			assert_eq!(first, second);

			let root = loaded.root().unwrap().root();
			assert_eq!(root.name, "R");
			assert_eq!(root.as_2d().unwrap().position(), vec2(3.0, 4.0));
			assert_eq!(root.as_2d().unwrap().rotation(), FRAC_PI_2);

			let sprite = root.get_component::<Sprite2D>().unwrap();
			assert_eq!(sprite.texture_path, "t.png");
			assert_eq!(sprite.color, vec4(1.0, 0.0, 0.0, 1.0));
			assert_eq!(loaded.uuid, scene.uuid);
			assert!(!loaded.is_modified());
		}

		#[test]
		fn nested_kinds_keep_their_data() {
			let mut scene = Scene::new("Kinds");
			let root = scene.create_root(Node::new("Root"));

			let mut body = Node::new_3d("Body");
			body.as_3d_mut().unwrap().set_rotation(Quat::from_rotation_y(0.5));
			let body = scene.add_node(root, body).unwrap();

			let mut hud = Node::new_control("Hud");
			{
				let c = hud.as_control_mut().unwrap();
				c.apply_anchor_preset(AnchorPreset::FullRect);
				c.set_margins([1.0, 2.0, 3.0, 4.0]);
				c.world_space = true;
			}
			scene.add_node(body, hud).unwrap();

			let loaded = parse_scene(&scene_to_string(&scene)).unwrap();
			let tree = loaded.root().unwrap();
			let body = tree.get_node(tree.resolve_path("Body").unwrap()).unwrap();
			assert!(body.as_3d().unwrap().rotation().abs_diff_eq(Quat::from_rotation_y(0.5), 1e-6));

			let hud = tree.get_node(tree.resolve_path("/Root/Body/Hud").unwrap()).unwrap();
			let c = hud.as_control().unwrap();
			assert_eq!(c.anchor_max, Vec2::ONE);
			assert_eq!(c.margins(), [1.0, 2.0, 3.0, 4.0]);
			assert!(c.world_space);
		}

		#[test]
		fn every_value_tag() {
			let font = FontPath::system("Arial", FontStyle::BoldItalic);
			for value in [
				PropertyValue::Bool(true),
				PropertyValue::Int(-3),
				PropertyValue::Float(0.25),
				PropertyValue::String("hi".to_owned()),
				PropertyValue::FilePath("a/b.png".to_owned()),
				PropertyValue::FontPath(font),
				PropertyValue::FontPath(FontPath::file("fonts/x.ttf")),
				PropertyValue::Color(vec4(0.1, 0.2, 0.3, 0.4)),
				PropertyValue::Vec2(vec2(1.0, 2.0)),
				PropertyValue::Vec3(Vec3::ONE),
				PropertyValue::Vec4(Vec4::ONE),
				PropertyValue::NodeReference(NodeUuid::new()),
			] {
				let json = serialize_value(&value);
				assert_eq!(deserialize_value(value.tag(), &json).unwrap(), value);
			}
		}
	}

	mod tolerance {
		use super::super::*;

		#[test]
		fn unknown_types_are_kept_as_placeholders() {
			let text = r#"{
				"uuid": "6f1c2d3e-0000-4000-8000-000000000001",
				"name": "S",
				"root": {
					"uuid": "6f1c2d3e-0000-4000-8000-000000000002",
					"name": "Root", "type": "Node4D", "active": true, "visible": true,
					"components": [{
						"uuid": "6f1c2d3e-0000-4000-8000-000000000003",
						"name": "Body", "type": "RigidBody", "active": true,
						"export_variables": {
							"mass": { "type": "float", "value": 2.5 },
							"shape": { "type": "polygon", "value": [] }
						}
					}]
				}
			}"#;
			let scene = parse_scene(text).unwrap();
			let root = scene.root().unwrap().root();
			assert!(matches!(root.kind, NodeKind::Node));
			assert_eq!(root.type_name(), "Node4D");

			let body = &root.components()[0];
			assert_eq!(body.type_name(), "RigidBody");
			assert_eq!(body.exports().value("mass"), Some(&PropertyValue::Float(2.5)));
			assert!(!body.exports().contains("shape"));
		}

		#[test]
		fn mismatched_export_keeps_default() {
			let text = r#"{
				"name": "S",
				"root": {
					"name": "Root", "type": "Node2D",
					"components": [{
						"type": "Sprite2D",
						"export_variables": { "flip_h": { "type": "int", "value": 1 } }
					}]
				}
			}"#;
			let scene = parse_scene(text).unwrap();
			let root = scene.root().unwrap().root();
			let sprite = root.get_component::<crate::components::Sprite2D>().unwrap();
			assert!(!sprite.flip_h);
		}

		#[test]
		fn empty_scene_and_bad_documents() {
			let scene = parse_scene(r#"{"name": "Empty", "root": null}"#).unwrap();
			assert!(scene.root().is_none());

			assert!(matches!(parse_scene("{"), Err(SceneParseError::JsonParse(_))));
			assert!(matches!(
				parse_scene(r#"{"name": "S", "uuid": "xyz"}"#),
				Err(SceneParseError::InvalidUuid(_))
			));
			assert!(matches!(
				parse_scene(r#"{"name": "S", "root": {"name": "R"}}"#),
				Err(SceneParseError::JsonError(JsonError::ErrorInObject { .. }))
			));
		}

		#[test]
		fn duplicate_uuids_are_rejected() {
			let text = r#"{
				"name": "S",
				"root": {
					"uuid": "6f1c2d3e-0000-4000-8000-000000000002", "name": "Root", "type": "Node",
					"children": [
						{ "uuid": "6f1c2d3e-0000-4000-8000-000000000002", "name": "Twin", "type": "Node" }
					]
				}
			}"#;
			assert!(matches!(
				parse_scene(text),
				Err(SceneParseError::Tree(TreeError::DuplicateUuid(_)))
			));
		}
	}

	mod files {
		use super::super::*;
		use super::*;

		#[test]
		fn save_then_load() {
			let dir = std::env::temp_dir().join(format!("lupine-scene-{}", NodeUuid::new()));
			std::fs::create_dir_all(&dir).unwrap();
			let path = dir.join("main.scene");

			let mut scene = scenario_scene();
			assert!(scene.is_modified());
			save_scene_file(&mut scene, &path).unwrap();
			assert!(!scene.is_modified());
			assert_eq!(scene.path.as_deref(), Some(path.as_path()));

			let loaded = load_scene_file(&path, Services::default(), RuntimeConfig::default()).unwrap();
			assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
			assert!(!loaded.is_modified());
			assert_eq!(scene_to_string(&loaded), scene_to_string(&scene));

			std::fs::remove_dir_all(&dir).unwrap();
		}

		#[test]
		fn missing_file_is_io_error() {
			let res = load_scene_file(
				"/nonexistent-lupine-root/x.scene",
				Services::default(),
				RuntimeConfig::default(),
			);
			assert!(matches!(res, Err(LoadError::Io { .. })));
		}
	}
}
