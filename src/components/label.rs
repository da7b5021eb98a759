use glam::{Vec2, Vec4};

use crate::component::{impl_component_base, Component, ComponentBase, DrawCtx};
use crate::math::rect::Rect;
use crate::render::{DrawSpace, Renderer, TextAlign, TextOutline, TextRun, TextShadow, VerticalAlign};
use crate::resources::ResourceManager;
use crate::value::{ExportType, FontPath, PropertyValue};

use super::control_area;

/// Text block laid out in its Control's rectangle, or anchored at a Node2D.
#[derive(Debug)]
pub struct Label {
	base: ComponentBase,
	pub text: String,
	pub font_path: FontPath,
	/// Pixels.
	pub font_size: i32,
	pub color: Vec4,
	pub text_align: TextAlign,
	pub vertical_align: VerticalAlign,
	pub word_wrap: bool,
	/// Multiplier of the font's line height.
	pub line_spacing: f32,
	/// Extra pixels between characters.
	pub kerning: f32,
	pub outline_enabled: bool,
	pub outline_color: Vec4,
	pub outline_width: f32,
	pub shadow_enabled: bool,
	pub shadow_color: Vec4,
	pub shadow_offset: Vec2,
	pub use_localization_key: bool,
	pub localization_key: String,
}

impl Default for Label {
	fn default() -> Self {
		let mut label = Self {
			base: ComponentBase::new("Label"),
			text: "Label".to_owned(),
			font_path: FontPath::default(),
			font_size: 16,
			color: Vec4::ONE,
			text_align: TextAlign::Left,
			vertical_align: VerticalAlign::Top,
			word_wrap: false,
			line_spacing: 1.0,
			kerning: 0.0,
			outline_enabled: false,
			outline_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
			outline_width: 1.0,
			shadow_enabled: false,
			shadow_color: Vec4::new(0.0, 0.0, 0.0, 0.5),
			shadow_offset: Vec2::splat(2.0),
			use_localization_key: false,
			localization_key: String::new(),
		};
		label
			.base
			.exports
			.add("text", label.text.as_str(), "Text content to display", ExportType::String)
			.add("font_path", label.font_path.clone(), "Font selection", ExportType::FontPath)
			.add("font_size", label.font_size, "Font size in pixels", ExportType::Int)
			.add("color", PropertyValue::Color(label.color), "Text color (RGBA)", ExportType::Color)
			.add(
				"text_align",
				label.text_align.index(),
				"Text alignment (0=Left, 1=Center, 2=Right, 3=Justify)",
				ExportType::Int,
			)
			.add(
				"vertical_align",
				label.vertical_align.index(),
				"Vertical alignment (0=Top, 1=Center, 2=Bottom)",
				ExportType::Int,
			)
			.add("word_wrap", label.word_wrap, "Enable word wrapping", ExportType::Bool)
			.add("line_spacing", label.line_spacing, "Line spacing multiplier", ExportType::Float)
			.add("kerning", label.kerning, "Additional spacing between characters", ExportType::Float)
			.add("outline_enabled", label.outline_enabled, "Enable text outline", ExportType::Bool)
			.add("outline_color", PropertyValue::Color(label.outline_color), "Outline color (RGBA)", ExportType::Color)
			.add("outline_width", label.outline_width, "Outline width in pixels", ExportType::Float)
			.add("shadow_enabled", label.shadow_enabled, "Enable text shadow", ExportType::Bool)
			.add("shadow_color", PropertyValue::Color(label.shadow_color), "Shadow color (RGBA)", ExportType::Color)
			.add("shadow_offset", label.shadow_offset, "Shadow offset (X, Y)", ExportType::Vec2)
			.add(
				"use_localization_key",
				label.use_localization_key,
				"Use localization key instead of direct text",
				ExportType::Bool,
			)
			.add("localization_key", label.localization_key.as_str(), "Localization key for text", ExportType::String);
		label
	}
}

impl Label {
	pub fn new(text: &str) -> Self {
		let mut label = Self::default();
		label.set_text(text);
		label
	}

	pub fn set_text(&mut self, text: &str) {
		self.text = text.to_owned();
		self.base.sync("text", text);
	}

	pub fn set_font(&mut self, font_path: FontPath, font_size: i32) {
		self.font_path = font_path.clone();
		self.font_size = font_size;
		self.base.sync("font_path", font_path);
		self.base.sync("font_size", font_size);
	}

	pub fn set_color(&mut self, color: Vec4) {
		self.color = color;
		self.base.sync("color", PropertyValue::Color(color));
	}

	pub fn set_alignment(&mut self, align: TextAlign, vertical_align: VerticalAlign) {
		self.text_align = align;
		self.vertical_align = vertical_align;
		self.base.sync("text_align", align.index());
		self.base.sync("vertical_align", vertical_align.index());
	}

	pub fn set_word_wrap(&mut self, word_wrap: bool) {
		self.word_wrap = word_wrap;
		self.base.sync("word_wrap", word_wrap);
	}

	pub fn set_outline(&mut self, enabled: bool, color: Vec4, width: f32) {
		self.outline_enabled = enabled;
		self.outline_color = color;
		self.outline_width = width;
		self.base.sync("outline_enabled", enabled);
		self.base.sync("outline_color", PropertyValue::Color(color));
		self.base.sync("outline_width", width);
	}

	pub fn set_shadow(&mut self, enabled: bool, color: Vec4, offset: Vec2) {
		self.shadow_enabled = enabled;
		self.shadow_color = color;
		self.shadow_offset = offset;
		self.base.sync("shadow_enabled", enabled);
		self.base.sync("shadow_color", PropertyValue::Color(color));
		self.base.sync("shadow_offset", offset);
	}

	pub fn set_localization_key(&mut self, key: &str, use_key: bool) {
		self.localization_key = key.to_owned();
		self.use_localization_key = use_key;
		self.base.sync("localization_key", key);
		self.base.sync("use_localization_key", use_key);
	}

	/// The translated key when localization is on and a translation exists, else `text`.
	pub fn display_text(&self, resources: &dyn ResourceManager) -> String {
		if self.use_localization_key && !self.localization_key.is_empty() {
			if let Some(text) = resources.localize(&self.localization_key) {
				return text;
			}
		}
		self.text.clone()
	}

	fn text_run(&self, text: String, rect: Rect, space: DrawSpace) -> TextRun {
		TextRun {
			text,
			font: self.font_path.clone(),
			font_size: self.font_size as f32,
			color: self.color,
			rect,
			align: self.text_align,
			vertical_align: self.vertical_align,
			word_wrap: self.word_wrap,
			line_spacing: self.line_spacing,
			kerning: self.kerning,
			outline: self.outline_enabled.then_some(TextOutline {
				color: self.outline_color,
				width: self.outline_width,
			}),
			shadow: self.shadow_enabled.then_some(TextShadow {
				color: self.shadow_color,
				offset: self.shadow_offset,
			}),
			space,
		}
	}
}

impl Component for Label {
	impl_component_base!();

	fn type_name(&self) -> &str {
		"Label"
	}

	fn category(&self) -> &str {
		"UI"
	}

	fn update_from_export_variables(&mut self) {
		let e = &self.base.exports;
		self.text = e.get_or("text", std::mem::take(&mut self.text));
		self.font_path = e.get_or("font_path", self.font_path.clone());
		self.font_size = e.get_or("font_size", self.font_size);
		self.color = e.get_or("color", self.color);
		self.text_align = TextAlign::from_index(e.get_or("text_align", self.text_align.index()));
		self.vertical_align = VerticalAlign::from_index(e.get_or("vertical_align", self.vertical_align.index()));
		self.word_wrap = e.get_or("word_wrap", self.word_wrap);
		self.line_spacing = e.get_or("line_spacing", self.line_spacing);
		self.kerning = e.get_or("kerning", self.kerning);
		self.outline_enabled = e.get_or("outline_enabled", self.outline_enabled);
		self.outline_color = e.get_or("outline_color", self.outline_color);
		self.outline_width = e.get_or("outline_width", self.outline_width);
		self.shadow_enabled = e.get_or("shadow_enabled", self.shadow_enabled);
		self.shadow_color = e.get_or("shadow_color", self.shadow_color);
		self.shadow_offset = e.get_or("shadow_offset", self.shadow_offset);
		self.use_localization_key = e.get_or("use_localization_key", self.use_localization_key);
		self.localization_key = e.get_or("localization_key", std::mem::take(&mut self.localization_key));
	}

	fn draw(&self, ctx: &DrawCtx, renderer: &mut dyn Renderer) {
		if self.font_size <= 0 {
			return;
		}
		let text = self.display_text(ctx.services.resources.as_ref());
		if text.is_empty() {
			return;
		}

		let area = control_area(ctx).or_else(|| {
			ctx.tree
				.get_node(ctx.owner)?
				.as_2d()
				.map(|_| (Rect::new(ctx.tree.global_position_2d(ctx.owner), Vec2::ZERO), DrawSpace::World))
		});
		if let Some((rect, space)) = area {
			renderer.draw_text(&self.text_run(text, rect, space));
		}
	}
}

#[cfg(test)]
mod tests {
	use glam::vec2;

	use super::*;
	use crate::components::testing::{record, services, single_node};
	use crate::node::Node;
	use crate::resources::MemoryResourceManager;

	fn panel_node() -> Node {
		let mut node = Node::new_control("Title");
		let control = node.as_control_mut().unwrap();
		control.set_position(vec2(10.0, 20.0));
		control.set_size(vec2(200.0, 40.0));
		node
	}

	#[test]
	fn emits_text_in_control_rect() {
		let (tree, owner) = single_node(panel_node());
		let mut label = Label::new("Score");
		label.set_alignment(TextAlign::Center, VerticalAlign::Bottom);
		label.set_shadow(true, Vec4::ONE, vec2(1.0, 1.0));

		let rec = record(&tree, owner, &label, &services(MemoryResourceManager::default()));
		let runs: Vec<_> = rec.texts().collect();
		assert_eq!(runs.len(), 1);
		assert_eq!(runs[0].text, "Score");
		assert_eq!(runs[0].rect, Rect::new(vec2(10.0, 20.0), vec2(200.0, 40.0)));
		assert_eq!(runs[0].space, DrawSpace::Screen);
		assert_eq!(runs[0].align, TextAlign::Center);
		assert_eq!(runs[0].font_size, 16.0);
		assert!(runs[0].outline.is_none());
		assert!(runs[0].shadow.is_some());
	}

	#[test]
	fn localized_text_falls_back_to_text() {
		let res = MemoryResourceManager::default().with_translation("menu.start", "Commencer");
		let mut label = Label::new("Start");
		assert_eq!(label.display_text(&res), "Start");

		label.set_localization_key("menu.start", true);
		assert_eq!(label.display_text(&res), "Commencer");

		label.set_localization_key("menu.quit", true);
		assert_eq!(label.display_text(&res), "Start");
	}

	#[test]
	fn exports_drive_fields() {
		let mut label = Label::default();
		let c: &mut dyn Component = &mut label;
		c.set_export("text_align", PropertyValue::Int(3)).unwrap();
		c.set_export("font_size", PropertyValue::Int(0)).unwrap();
		c.update_from_export_variables();
		assert_eq!(label.text_align, TextAlign::Justify);

		let (tree, owner) = single_node(panel_node());
		let rec = record(&tree, owner, &label, &services(MemoryResourceManager::default()));
		assert_eq!(rec.texts().count(), 0);
	}
}
