use std::fmt;

use glam::{vec2, Vec2, Vec4};

use crate::component::{impl_component_base, Component, ComponentBase, DrawCtx};
use crate::math::rect::Rect;
use crate::render::{DrawSpace, Quad, Renderer, TextAlign, TextRun, VerticalAlign};
use crate::value::{ExportType, FontPath, PropertyValue};

use super::{control_area, draw_border};

/// Size of a bar sitting on a Node2D, before node scale.
const NODE2D_BAR_SIZE: Vec2 = vec2(100.0, 20.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillDirection {
	#[default]
	LeftToRight,
	RightToLeft,
	TopToBottom,
	BottomToTop,
}

impl FillDirection {
	pub fn from_index(index: i32) -> Option<Self> {
		match index {
			0 => Some(FillDirection::LeftToRight),
			1 => Some(FillDirection::RightToLeft),
			2 => Some(FillDirection::TopToBottom),
			3 => Some(FillDirection::BottomToTop),
			_ => None,
		}
	}

	pub fn index(self) -> i32 {
		self as i32
	}

	pub fn as_str(self) -> &'static str {
		match self {
			FillDirection::LeftToRight => "LeftToRight",
			FillDirection::RightToLeft => "RightToLeft",
			FillDirection::TopToBottom => "TopToBottom",
			FillDirection::BottomToTop => "BottomToTop",
		}
	}

	/// Part of `area` covered at `progress` in `[0, 1]`.
	pub fn fill_rect(self, area: Rect, progress: f32) -> Rect {
		let progress = progress.clamp(0.0, 1.0);
		let mut pos = area.position;
		let mut size = area.size;
		match self {
			FillDirection::LeftToRight => size.x *= progress,
			FillDirection::RightToLeft => {
				size.x *= progress;
				pos.x += area.size.x - size.x;
			}
			FillDirection::TopToBottom => size.y *= progress,
			FillDirection::BottomToTop => {
				size.y *= progress;
				pos.y += area.size.y - size.y;
			}
		}
		Rect::new(pos, size)
	}
}

impl fmt::Display for FillDirection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown fill direction {0:?}")]
pub struct UnknownFillDirectionError(pub String);

impl TryFrom<&str> for FillDirection {
	type Error = UnknownFillDirectionError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		match value {
			"LeftToRight" | "L2R" => Ok(FillDirection::LeftToRight),
			"RightToLeft" | "R2L" => Ok(FillDirection::RightToLeft),
			"TopToBottom" | "T2B" => Ok(FillDirection::TopToBottom),
			"BottomToTop" | "B2T" => Ok(FillDirection::BottomToTop),
			unknown => Err(UnknownFillDirectionError(unknown.to_owned())),
		}
	}
}

/// Bar filled in proportion to `value` between `min_value` and `max_value`.
#[derive(Debug)]
pub struct ProgressBar {
	base: ComponentBase,
	value: f32,
	min_value: f32,
	max_value: f32,
	pub fill_direction: FillDirection,
	pub background_color: Vec4,
	pub fill_color: Vec4,
	pub border_color: Vec4,
	pub border_width: f32,
	pub corner_radius: f32,
	pub show_percentage: bool,
	/// Shown instead of the percentage when not empty.
	pub custom_text: String,
	pub text_color: Vec4,
	pub font_size: i32,
	pub font_path: FontPath,
}

impl Default for ProgressBar {
	fn default() -> Self {
		let mut bar = Self {
			base: ComponentBase::new("ProgressBar"),
			value: 0.0,
			min_value: 0.0,
			max_value: 100.0,
			fill_direction: FillDirection::LeftToRight,
			background_color: Vec4::new(0.15, 0.17, 0.20, 1.0),
			fill_color: Vec4::new(0.26, 0.59, 0.98, 1.0),
			border_color: Vec4::new(0.10, 0.12, 0.15, 1.0),
			border_width: 1.0,
			corner_radius: 4.0,
			show_percentage: true,
			custom_text: String::new(),
			text_color: Vec4::new(0.875, 0.875, 0.875, 1.0),
			font_size: 12,
			font_path: FontPath::default(),
		};
		bar.base
			.exports
			.add("value", bar.value, "Current progress value", ExportType::Float)
			.add("min_value", bar.min_value, "Minimum progress value", ExportType::Float)
			.add("max_value", bar.max_value, "Maximum progress value", ExportType::Float)
			.add(
				"fill_direction",
				bar.fill_direction.index(),
				"Fill direction (0=L2R, 1=R2L, 2=T2B, 3=B2T)",
				ExportType::Int,
			)
			.add("background_color", PropertyValue::Color(bar.background_color), "Background color (RGBA)", ExportType::Color)
			.add("fill_color", PropertyValue::Color(bar.fill_color), "Fill color (RGBA)", ExportType::Color)
			.add("border_color", PropertyValue::Color(bar.border_color), "Border color (RGBA)", ExportType::Color)
			.add("border_width", bar.border_width, "Border width in pixels", ExportType::Float)
			.add("corner_radius", bar.corner_radius, "Corner radius in pixels", ExportType::Float)
			.add("show_percentage", bar.show_percentage, "Show percentage text", ExportType::Bool)
			.add(
				"custom_text",
				bar.custom_text.as_str(),
				"Custom text to display (overrides percentage)",
				ExportType::String,
			)
			.add("text_color", PropertyValue::Color(bar.text_color), "Text color (RGBA)", ExportType::Color)
			.add("font_size", bar.font_size, "Font size in pixels", ExportType::Int)
			.add("font_path", bar.font_path.clone(), "Font selection", ExportType::FontPath);
		bar
	}
}

impl ProgressBar {
	pub fn value(&self) -> f32 {
		self.value
	}

	pub fn min_value(&self) -> f32 {
		self.min_value
	}

	pub fn max_value(&self) -> f32 {
		self.max_value
	}

	/// Clamped into the range.
	pub fn set_value(&mut self, value: f32) {
		self.value = value.clamp(self.min_value, self.max_value);
		self.base.sync("value", self.value);
	}

	/// Raises `max_value` when it would fall below the new minimum.
	pub fn set_min_value(&mut self, min_value: f32) {
		self.min_value = min_value;
		self.max_value = self.max_value.max(min_value);
		self.sync_range();
	}

	/// Lowers `min_value` when it would rise above the new maximum.
	pub fn set_max_value(&mut self, max_value: f32) {
		self.max_value = max_value;
		self.min_value = self.min_value.min(max_value);
		self.sync_range();
	}

	fn sync_range(&mut self) {
		self.value = self.value.clamp(self.min_value, self.max_value);
		self.base.sync("min_value", self.min_value);
		self.base.sync("max_value", self.max_value);
		self.base.sync("value", self.value);
	}

	/// Fraction of the range covered, 0 for an empty range.
	pub fn progress(&self) -> f32 {
		if self.max_value <= self.min_value {
			return 0.0;
		}
		(self.value - self.min_value) / (self.max_value - self.min_value)
	}

	pub fn set_progress(&mut self, progress: f32) {
		let progress = progress.clamp(0.0, 1.0);
		self.value = self.min_value + progress * (self.max_value - self.min_value);
		self.base.sync("value", self.value);
	}

	pub fn set_fill_direction(&mut self, direction: FillDirection) {
		self.fill_direction = direction;
		self.base.sync("fill_direction", direction.index());
	}

	pub fn set_colors(&mut self, background: Vec4, fill: Vec4) {
		self.background_color = background;
		self.fill_color = fill;
		self.base.sync("background_color", PropertyValue::Color(background));
		self.base.sync("fill_color", PropertyValue::Color(fill));
	}

	pub fn set_border(&mut self, color: Vec4, width: f32) {
		self.border_color = color;
		self.border_width = width.max(0.0);
		self.base.sync("border_color", PropertyValue::Color(color));
		self.base.sync("border_width", self.border_width);
	}

	pub fn set_show_percentage(&mut self, show: bool) {
		self.show_percentage = show;
		self.base.sync("show_percentage", show);
	}

	pub fn set_custom_text(&mut self, text: &str) {
		self.custom_text = text.to_owned();
		self.base.sync("custom_text", text);
	}

	pub fn set_font(&mut self, font_path: FontPath, font_size: i32) {
		self.font_path = font_path.clone();
		self.font_size = font_size.max(1);
		self.base.sync("font_path", font_path);
		self.base.sync("font_size", self.font_size);
	}

	/// Custom text when set, else the truncated percentage when shown.
	pub fn display_text(&self) -> Option<String> {
		if !self.custom_text.is_empty() {
			Some(self.custom_text.clone())
		} else if self.show_percentage {
			Some(format!("{}%", (self.progress() * 100.0) as i32))
		} else {
			None
		}
	}

	fn area(ctx: &DrawCtx) -> Option<(Rect, DrawSpace)> {
		control_area(ctx).or_else(|| {
			ctx.tree.get_node(ctx.owner)?.as_2d()?;
			let global = ctx.tree.global_transform_2d(ctx.owner);
			Some((Rect::new(global.translation, NODE2D_BAR_SIZE * global.scale), DrawSpace::World))
		})
	}
}

impl Component for ProgressBar {
	impl_component_base!();

	fn type_name(&self) -> &str {
		"ProgressBar"
	}

	fn category(&self) -> &str {
		"UI"
	}

	fn update_from_export_variables(&mut self) {
		let e = &self.base.exports;
		self.min_value = e.get_or("min_value", self.min_value);
		self.max_value = e.get_or("max_value", self.max_value);
		self.value = e.get_or("value", self.value).clamp(self.min_value, self.max_value.max(self.min_value));
		if let Some(direction) = FillDirection::from_index(e.get_or("fill_direction", self.fill_direction.index())) {
			self.fill_direction = direction;
		}
		self.background_color = e.get_or("background_color", self.background_color);
		self.fill_color = e.get_or("fill_color", self.fill_color);
		self.border_color = e.get_or("border_color", self.border_color);
		self.border_width = e.get_or("border_width", self.border_width);
		self.corner_radius = e.get_or("corner_radius", self.corner_radius);
		self.show_percentage = e.get_or("show_percentage", self.show_percentage);
		self.custom_text = e.get_or("custom_text", std::mem::take(&mut self.custom_text));
		self.text_color = e.get_or("text_color", self.text_color);
		self.font_size = e.get_or("font_size", self.font_size);
		self.font_path = e.get_or("font_path", self.font_path.clone());
	}

	fn draw(&self, ctx: &DrawCtx, renderer: &mut dyn Renderer) {
		let Some((rect, space)) = Self::area(ctx) else {
			return;
		};

		renderer.draw_quad(&Quad::rect(rect, self.background_color, space));
		let fill = self.fill_direction.fill_rect(rect, self.progress());
		if fill.size.x > 0.0 && fill.size.y > 0.0 {
			renderer.draw_quad(&Quad::rect(fill, self.fill_color, space));
		}
		draw_border(renderer, rect, self.border_width, self.border_color, space);

		if self.font_size <= 0 {
			return;
		}
		if let Some(text) = self.display_text() {
			renderer.draw_text(&TextRun {
				text,
				font: self.font_path.clone(),
				font_size: self.font_size as f32,
				color: self.text_color,
				rect,
				align: TextAlign::Center,
				vertical_align: VerticalAlign::Center,
				word_wrap: false,
				line_spacing: 1.0,
				kerning: 0.0,
				outline: None,
				shadow: None,
				space,
			});
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::testing::{record, services, single_node};
	use crate::node::{Node, Node2D, NodeKind};
	use crate::resources::MemoryResourceManager;

	mod range {
		use super::*;

		#[test]
		fn value_stays_in_range() {
			let mut bar = ProgressBar::default();
			bar.set_value(150.0);
			assert_eq!(bar.value(), 100.0);

			bar.set_max_value(50.0);
			assert_eq!(bar.value(), 50.0);
			bar.set_min_value(80.0);
			assert_eq!((bar.min_value(), bar.max_value(), bar.value()), (80.0, 80.0, 80.0));
			assert_eq!(bar.progress(), 0.0);
		}

		#[test]
		fn progress_and_text() {
			let mut bar = ProgressBar::default();
			bar.set_progress(0.375);
			assert_eq!(bar.value(), 37.5);
			assert_eq!(bar.display_text().as_deref(), Some("37%"));

			bar.set_custom_text("Loading");
			assert_eq!(bar.display_text().as_deref(), Some("Loading"));

			bar.set_custom_text("");
			bar.set_show_percentage(false);
			assert_eq!(bar.display_text(), None);
		}

		#[test]
		fn directions() {
			let area = Rect::new(Vec2::ZERO, vec2(200.0, 40.0));
			assert_eq!(FillDirection::LeftToRight.fill_rect(area, 0.25), Rect::new(Vec2::ZERO, vec2(50.0, 40.0)));
			assert_eq!(
				FillDirection::RightToLeft.fill_rect(area, 0.25),
				Rect::new(vec2(150.0, 0.0), vec2(50.0, 40.0))
			);
			assert_eq!(
				FillDirection::BottomToTop.fill_rect(area, 0.5),
				Rect::new(vec2(0.0, 20.0), vec2(200.0, 20.0))
			);
			assert_eq!(FillDirection::try_from("T2B").unwrap(), FillDirection::TopToBottom);
			assert!(FillDirection::try_from("Sideways").is_err());
			assert_eq!(FillDirection::from_index(7), None);
		}
	}

	mod drawing {
		use super::*;

		#[test]
		fn background_fill_border_text() {
			let mut node = Node::new_control("Bar");
			node.as_control_mut().unwrap().set_size(vec2(200.0, 20.0));
			let (tree, owner) = single_node(node);
			let mut bar = ProgressBar::default();
			bar.set_value(50.0);

			let rec = record(&tree, owner, &bar, &services(MemoryResourceManager::default()));
			let quads: Vec<_> = rec.quads().collect();
			assert_eq!(quads.len(), 6);
			assert_eq!(quads[0].color, bar.background_color);
			assert_eq!(*quads[1], Quad::rect(Rect::new(Vec2::ZERO, vec2(100.0, 20.0)), bar.fill_color, DrawSpace::Screen));
			assert_eq!(rec.texts().next().map(|t| t.text.as_str()), Some("50%"));
		}

		#[test]
		fn empty_bar_on_node2d() {
			let node = Node::with_kind("Bar", NodeKind::Node2D(Node2D::new(vec2(5.0, 5.0), 0.0, vec2(2.0, 1.0))));
			let (tree, owner) = single_node(node);
			let mut bar = ProgressBar::default();
			bar.set_border(Vec4::ONE, 0.0);
			bar.set_show_percentage(false);

			let rec = record(&tree, owner, &bar, &services(MemoryResourceManager::default()));
			let quads: Vec<_> = rec.quads().collect();
			assert_eq!(quads.len(), 1);
			assert_eq!(
				*quads[0],
				Quad::rect(Rect::new(vec2(5.0, 5.0), vec2(200.0, 20.0)), bar.background_color, DrawSpace::World)
			);
			assert_eq!(rec.texts().count(), 0);
		}
	}
}
