use std::fmt;

use glam::{vec2, Vec2};

use crate::math::rect::Rect;

/// Screen-space rectangle node laid out by anchors and margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Control {
	pub position: Vec2,
	pub size: Vec2,
	/// Each axis in `0..=1` of the parent size.
	pub anchor_min: Vec2,
	pub anchor_max: Vec2,
	pub margin_left: f32,
	pub margin_top: f32,
	pub margin_right: f32,
	pub margin_bottom: f32,
	/// Follows the 2D camera instead of overlaying the screen.
	pub world_space: bool,
}

impl Default for Control {
	fn default() -> Self {
		Self {
			position: Vec2::ZERO,
			size: vec2(100.0, 100.0),
			anchor_min: Vec2::ZERO,
			anchor_max: Vec2::ZERO,
			margin_left: 0.0,
			margin_top: 0.0,
			margin_right: 0.0,
			margin_bottom: 0.0,
			world_space: false,
		}
	}
}

impl Control {
	pub fn set_position(&mut self, position: Vec2) -> Vec2 {
		std::mem::replace(&mut self.position, position)
	}

	pub fn set_size(&mut self, size: Vec2) -> Vec2 {
		std::mem::replace(&mut self.size, size.max(Vec2::ZERO))
	}

	/// Returns the previous `(anchor_min, anchor_max)` pair.
	pub fn set_anchors(&mut self, min: Vec2, max: Vec2) -> (Vec2, Vec2) {
		let min = min.clamp(Vec2::ZERO, Vec2::ONE);
		let max = max.clamp(Vec2::ZERO, Vec2::ONE);
		(
			std::mem::replace(&mut self.anchor_min, min),
			std::mem::replace(&mut self.anchor_max, max),
		)
	}

	pub fn apply_anchor_preset(&mut self, preset: AnchorPreset) -> (Vec2, Vec2) {
		let (min, max) = preset.anchors();
		self.set_anchors(min, max)
	}

	/// `[left, top, right, bottom]`; returns the previous margins.
	pub fn set_margins(&mut self, margins: [f32; 4]) -> [f32; 4] {
		let old = self.margins();
		[self.margin_left, self.margin_top, self.margin_right, self.margin_bottom] = margins;
		old
	}

	pub fn margins(&self) -> [f32; 4] {
		[self.margin_left, self.margin_top, self.margin_right, self.margin_bottom]
	}

	/// Resolves this control against the rectangle of its parent.
	///
	/// An axis whose two anchors differ stretches between them, shrunk by the margins on
	/// that axis. Otherwise the literal size is used.
	pub fn rect_in(&self, parent: Rect) -> Rect {
		let margin_start = vec2(self.margin_left, self.margin_top);
		let margin_end = vec2(self.margin_right, self.margin_bottom);

		let position = parent.position + self.anchor_min * parent.size + margin_start + self.position;

		let stretched = (self.anchor_max - self.anchor_min) * parent.size - margin_start - margin_end;
		let size = Vec2::select(self.anchor_min.cmpne(self.anchor_max), stretched, self.size);

		Rect::new(position, size.max(Vec2::ZERO))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorPreset {
	TopLeft,
	TopRight,
	BottomLeft,
	BottomRight,
	CenterLeft,
	CenterTop,
	CenterRight,
	CenterBottom,
	Center,
	LeftWide,
	TopWide,
	RightWide,
	BottomWide,
	VCenterWide,
	HCenterWide,
	FullRect,
}

impl AnchorPreset {
	pub const ALL: [AnchorPreset; 16] = [
		AnchorPreset::TopLeft,
		AnchorPreset::TopRight,
		AnchorPreset::BottomLeft,
		AnchorPreset::BottomRight,
		AnchorPreset::CenterLeft,
		AnchorPreset::CenterTop,
		AnchorPreset::CenterRight,
		AnchorPreset::CenterBottom,
		AnchorPreset::Center,
		AnchorPreset::LeftWide,
		AnchorPreset::TopWide,
		AnchorPreset::RightWide,
		AnchorPreset::BottomWide,
		AnchorPreset::VCenterWide,
		AnchorPreset::HCenterWide,
		AnchorPreset::FullRect,
	];

	/// `(anchor_min, anchor_max)`
	pub fn anchors(self) -> (Vec2, Vec2) {
		let (min, max) = match self {
			AnchorPreset::TopLeft => ((0.0, 0.0), (0.0, 0.0)),
			AnchorPreset::TopRight => ((1.0, 0.0), (1.0, 0.0)),
			AnchorPreset::BottomLeft => ((0.0, 1.0), (0.0, 1.0)),
			AnchorPreset::BottomRight => ((1.0, 1.0), (1.0, 1.0)),
			AnchorPreset::CenterLeft => ((0.0, 0.5), (0.0, 0.5)),
			AnchorPreset::CenterTop => ((0.5, 0.0), (0.5, 0.0)),
			AnchorPreset::CenterRight => ((1.0, 0.5), (1.0, 0.5)),
			AnchorPreset::CenterBottom => ((0.5, 1.0), (0.5, 1.0)),
			AnchorPreset::Center => ((0.5, 0.5), (0.5, 0.5)),
			AnchorPreset::LeftWide => ((0.0, 0.0), (0.0, 1.0)),
			AnchorPreset::TopWide => ((0.0, 0.0), (1.0, 0.0)),
			AnchorPreset::RightWide => ((1.0, 0.0), (1.0, 1.0)),
			AnchorPreset::BottomWide => ((0.0, 1.0), (1.0, 1.0)),
			AnchorPreset::VCenterWide => ((0.5, 0.0), (0.5, 1.0)),
			AnchorPreset::HCenterWide => ((0.0, 0.5), (1.0, 0.5)),
			AnchorPreset::FullRect => ((0.0, 0.0), (1.0, 1.0)),
		};
		(vec2(min.0, min.1), vec2(max.0, max.1))
	}

	pub fn as_str(self) -> &'static str {
		match self {
			AnchorPreset::TopLeft => "TopLeft",
			AnchorPreset::TopRight => "TopRight",
			AnchorPreset::BottomLeft => "BottomLeft",
			AnchorPreset::BottomRight => "BottomRight",
			AnchorPreset::CenterLeft => "CenterLeft",
			AnchorPreset::CenterTop => "CenterTop",
			AnchorPreset::CenterRight => "CenterRight",
			AnchorPreset::CenterBottom => "CenterBottom",
			AnchorPreset::Center => "Center",
			AnchorPreset::LeftWide => "LeftWide",
			AnchorPreset::TopWide => "TopWide",
			AnchorPreset::RightWide => "RightWide",
			AnchorPreset::BottomWide => "BottomWide",
			AnchorPreset::VCenterWide => "VCenterWide",
			AnchorPreset::HCenterWide => "HCenterWide",
			AnchorPreset::FullRect => "FullRect",
		}
	}
}

impl fmt::Display for AnchorPreset {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown anchor preset {0:?}")]
pub struct UnknownAnchorPresetError(pub String);

impl TryFrom<&str> for AnchorPreset {
	type Error = UnknownAnchorPresetError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		AnchorPreset::ALL
			.into_iter()
			.find(|preset| preset.as_str() == value)
			.ok_or_else(|| UnknownAnchorPresetError(value.to_owned()))
	}
}
