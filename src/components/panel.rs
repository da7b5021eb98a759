use glam::Vec4;

use crate::component::{impl_component_base, Component, ComponentBase, DrawCtx, ExportVariables};
use crate::render::{Quad, Renderer};
use crate::value::{ExportType, PropertyValue};

use super::{control_area, draw_border};

/// Filled rectangle with an optional inner border, shared by [`Panel`] and [`ColorRectangle`].
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frame {
	fill: Vec4,
	border_color: Vec4,
	border_width: f32,
	border_enabled: bool,
	/// Kept for renderers that round corners; quads are drawn square.
	corner_radius: f32,
}

impl Frame {
	fn read(&mut self, e: &ExportVariables, fill_name: &str) {
		self.fill = e.get_or(fill_name, self.fill);
		self.border_color = e.get_or("border_color", self.border_color);
		self.border_width = e.get_or("border_width", self.border_width);
		self.border_enabled = e.get_or("border_enabled", self.border_enabled);
		self.corner_radius = e.get_or("corner_radius", self.corner_radius);
	}

	fn draw(&self, ctx: &DrawCtx, renderer: &mut dyn Renderer) {
		let Some((rect, space)) = control_area(ctx) else {
			return;
		};
		if rect.size.x <= 0.0 || rect.size.y <= 0.0 {
			return;
		}
		renderer.draw_quad(&Quad::rect(rect, self.fill, space));
		if self.border_enabled {
			draw_border(renderer, rect, self.border_width, self.border_color, space);
		}
	}
}

/// UI background panel.
#[derive(Debug)]
pub struct Panel {
	base: ComponentBase,
	frame: Frame,
}

impl Default for Panel {
	fn default() -> Self {
		let frame = Frame {
			fill: Vec4::new(0.2, 0.2, 0.2, 1.0),
			border_color: Vec4::new(0.5, 0.5, 0.5, 1.0),
			border_width: 1.0,
			border_enabled: false,
			corner_radius: 0.0,
		};
		let mut base = ComponentBase::new("Panel");
		base.exports
			.add("background_color", PropertyValue::Color(frame.fill), "Panel background color (RGBA)", ExportType::Color)
			.add("border_color", PropertyValue::Color(frame.border_color), "Panel border color (RGBA)", ExportType::Color)
			.add("border_width", frame.border_width, "Border width in pixels", ExportType::Float)
			.add("border_enabled", frame.border_enabled, "Enable panel border", ExportType::Bool)
			.add("corner_radius", frame.corner_radius, "Corner radius for rounded corners", ExportType::Float);
		Self { base, frame }
	}
}

impl Panel {
	pub fn background_color(&self) -> Vec4 {
		self.frame.fill
	}

	pub fn set_background_color(&mut self, color: Vec4) {
		self.frame.fill = color;
		self.base.sync("background_color", PropertyValue::Color(color));
	}

	pub fn set_border(&mut self, enabled: bool, color: Vec4, width: f32) {
		self.frame.border_enabled = enabled;
		self.frame.border_color = color;
		self.frame.border_width = width;
		self.base.sync("border_enabled", enabled);
		self.base.sync("border_color", PropertyValue::Color(color));
		self.base.sync("border_width", width);
	}

	pub fn corner_radius(&self) -> f32 {
		self.frame.corner_radius
	}

	pub fn set_corner_radius(&mut self, radius: f32) {
		self.frame.corner_radius = radius;
		self.base.sync("corner_radius", radius);
	}
}

impl Component for Panel {
	impl_component_base!();

	fn type_name(&self) -> &str {
		"Panel"
	}

	fn category(&self) -> &str {
		"UI"
	}

	fn update_from_export_variables(&mut self) {
		self.frame.read(&self.base.exports, "background_color");
	}

	fn draw(&self, ctx: &DrawCtx, renderer: &mut dyn Renderer) {
		self.frame.draw(ctx, renderer);
	}
}

/// Plain colored rectangle filling its Control.
#[derive(Debug)]
pub struct ColorRectangle {
	base: ComponentBase,
	frame: Frame,
}

impl Default for ColorRectangle {
	fn default() -> Self {
		let frame = Frame {
			fill: Vec4::ONE,
			border_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
			border_width: 1.0,
			border_enabled: false,
			corner_radius: 0.0,
		};
		let mut base = ComponentBase::new("ColorRectangle");
		base.exports
			.add("color", PropertyValue::Color(frame.fill), "Rectangle color (RGBA)", ExportType::Color)
			.add("corner_radius", frame.corner_radius, "Corner radius for rounded corners", ExportType::Float)
			.add("border_color", PropertyValue::Color(frame.border_color), "Border color (RGBA)", ExportType::Color)
			.add("border_width", frame.border_width, "Border width in pixels", ExportType::Float)
			.add("border_enabled", frame.border_enabled, "Enable rectangle border", ExportType::Bool);
		Self { base, frame }
	}
}

impl ColorRectangle {
	pub fn new(color: Vec4) -> Self {
		let mut rect = Self::default();
		rect.set_color(color);
		rect
	}

	pub fn color(&self) -> Vec4 {
		self.frame.fill
	}

	pub fn set_color(&mut self, color: Vec4) {
		self.frame.fill = color;
		self.base.sync("color", PropertyValue::Color(color));
	}

	pub fn set_border(&mut self, enabled: bool, color: Vec4, width: f32) {
		self.frame.border_enabled = enabled;
		self.frame.border_color = color;
		self.frame.border_width = width;
		self.base.sync("border_enabled", enabled);
		self.base.sync("border_color", PropertyValue::Color(color));
		self.base.sync("border_width", width);
	}

	pub fn set_corner_radius(&mut self, radius: f32) {
		self.frame.corner_radius = radius;
		self.base.sync("corner_radius", radius);
	}
}

impl Component for ColorRectangle {
	impl_component_base!();

	fn type_name(&self) -> &str {
		"ColorRectangle"
	}

	fn category(&self) -> &str {
		"UI"
	}

	fn update_from_export_variables(&mut self) {
		self.frame.read(&self.base.exports, "color");
	}

	fn draw(&self, ctx: &DrawCtx, renderer: &mut dyn Renderer) {
		self.frame.draw(ctx, renderer);
	}
}
