use std::path::PathBuf;

use glam::{vec2, UVec2, Vec2};

/// Screen size parentless controls and cameras resolve against when no canvas size is given.
pub const DEFAULT_SCREEN_SIZE: Vec2 = Vec2::new(1920.0, 1080.0);

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
	#[error("Invalid canvas size {0:?}, expected WIDTHxHEIGHT")]
	InvalidCanvasSize(String),
}

/// Host-level settings a scene is run with.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
	pub screen_size: Vec2,
	/// Start without a project and log at debug level.
	pub debug: bool,
	/// Canvas override given by a web host (`--canvas-size=WxH`).
	pub canvas_size: Option<UVec2>,
	pub project_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
	fn default() -> Self {
		Self {
			screen_size: DEFAULT_SCREEN_SIZE,
			debug: false,
			canvas_size: None,
			project_path: None,
		}
	}
}

impl RuntimeConfig {
	pub fn effective_screen_size(&self) -> Vec2 {
		match self.canvas_size {
			Some(size) => vec2(size.x as f32, size.y as f32),
			None => self.screen_size,
		}
	}
}

/// Parses the `WxH` form used by `--canvas-size`.
pub fn parse_canvas_size(value: &str) -> Result<UVec2, ConfigError> {
	let invalid = || ConfigError::InvalidCanvasSize(value.to_owned());

	let (w, h) = value.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
	let w: u32 = w.trim().parse().map_err(|_| invalid())?;
	let h: u32 = h.trim().parse().map_err(|_| invalid())?;
	if w == 0 || h == 0 {
		return Err(invalid());
	}

	Ok(UVec2::new(w, h))
}
