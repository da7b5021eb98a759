//! Access to files the core reads: text resources, texture metadata, translations.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use glam::UVec2;
use tracing::warn;

use crate::audio::{AudioManager, NullAudioManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
	pub size: UVec2,
}

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
	#[error("Resource {0:?} not found")]
	NotFound(String),
	#[error("Could not read {path:?}: {source}")]
	Io { path: String, source: io::Error },
}

/// Synchronous, single-threaded resource access.
pub trait ResourceManager {
	fn read_text(&self, path: &str) -> Result<String, ResourceError>;

	/// Metadata of a loadable texture, `None` when it cannot be resolved.
	fn texture(&self, path: &str) -> Option<TextureInfo>;

	/// Translated string for a localization key.
	fn localize(&self, _key: &str) -> Option<String> {
		None
	}
}

/// Reads resources below a root directory.
///
/// Texture sizes are read from the image header once and cached, failures included.
pub struct FsResourceManager {
	root: PathBuf,
	textures: RefCell<HashMap<String, Option<TextureInfo>>>,
	translations: HashMap<String, String>,
}

impl FsResourceManager {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self {
			root: root.into(),
			textures: RefCell::new(HashMap::new()),
			translations: HashMap::new(),
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn set_translations(&mut self, translations: HashMap<String, String>) {
		self.translations = translations;
	}

	/// `res://` paths and relative paths resolve below the root.
	pub fn resolve(&self, path: &str) -> PathBuf {
		let path = path.strip_prefix("res://").unwrap_or(path);
		let p = Path::new(path);
		if p.is_absolute() {
			p.to_path_buf()
		} else {
			self.root.join(p)
		}
	}
}

impl ResourceManager for FsResourceManager {
	fn read_text(&self, path: &str) -> Result<String, ResourceError> {
		let full = self.resolve(path);
		std::fs::read_to_string(&full).map_err(|source| match source.kind() {
			io::ErrorKind::NotFound => ResourceError::NotFound(path.to_owned()),
			_ => ResourceError::Io {
				path: path.to_owned(),
				source,
			},
		})
	}

	fn texture(&self, path: &str) -> Option<TextureInfo> {
		if path.is_empty() {
			return None;
		}
		if let Some(cached) = self.textures.borrow().get(path) {
			return *cached;
		}

		let info = match image::image_dimensions(self.resolve(path)) {
			Ok((w, h)) => Some(TextureInfo { size: UVec2::new(w, h) }),
			Err(e) => {
				warn!("Cannot load texture {:?}: {}", path, e);
				None
			}
		};
		self.textures.borrow_mut().insert(path.to_owned(), info);
		info
	}

	fn localize(&self, key: &str) -> Option<String> {
		self.translations.get(key).cloned()
	}
}

/// Resources held in memory, for hosts that embed their data and for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryResourceManager {
	texts: HashMap<String, String>,
	textures: HashMap<String, TextureInfo>,
	translations: HashMap<String, String>,
}

impl MemoryResourceManager {
	pub fn with_text(mut self, path: &str, contents: impl Into<String>) -> Self {
		self.texts.insert(path.to_owned(), contents.into());
		self
	}

	pub fn with_texture(mut self, path: &str, width: u32, height: u32) -> Self {
		self.textures.insert(
			path.to_owned(),
			TextureInfo {
				size: UVec2::new(width, height),
			},
		);
		self
	}

	pub fn with_translation(mut self, key: &str, text: &str) -> Self {
		self.translations.insert(key.to_owned(), text.to_owned());
		self
	}
}

impl ResourceManager for MemoryResourceManager {
	fn read_text(&self, path: &str) -> Result<String, ResourceError> {
		self.texts
			.get(path)
			.cloned()
			.ok_or_else(|| ResourceError::NotFound(path.to_owned()))
	}

	fn texture(&self, path: &str) -> Option<TextureInfo> {
		self.textures.get(path).copied()
	}

	fn localize(&self, key: &str) -> Option<String> {
		self.translations.get(key).cloned()
	}
}

/// Collaborators handed to components during callbacks.
#[derive(Clone)]
pub struct Services {
	pub resources: Rc<dyn ResourceManager>,
	pub audio: Rc<dyn AudioManager>,
}

impl Default for Services {
	fn default() -> Self {
		Self {
			resources: Rc::new(FsResourceManager::new(".")),
			audio: Rc::new(NullAudioManager),
		}
	}
}

impl Services {
	pub fn new(resources: Rc<dyn ResourceManager>, audio: Rc<dyn AudioManager>) -> Self {
		Self { resources, audio }
	}

	pub fn with_resources(resources: impl ResourceManager + 'static) -> Self {
		Self {
			resources: Rc::new(resources),
			audio: Rc::new(NullAudioManager),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn memory_manager_lookups() {
		let res = MemoryResourceManager::default()
			.with_text("a.anim", "{}")
			.with_texture("t.png", 64, 32)
			.with_translation("greeting", "Hello");

		assert_eq!(res.read_text("a.anim").unwrap(), "{}");
		assert!(matches!(res.read_text("b.anim"), Err(ResourceError::NotFound(_))));
		assert_eq!(res.texture("t.png").unwrap().size, UVec2::new(64, 32));
		assert_eq!(res.localize("greeting").as_deref(), Some("Hello"));
	}

	#[test]
	fn fs_manager_reports_missing_files() {
		let res = FsResourceManager::new("/nonexistent-lupine-root");
		assert!(matches!(res.read_text("scene.scene"), Err(ResourceError::NotFound(_))));
		assert_eq!(res.texture("missing.png"), None);
		// cached failure
		assert_eq!(res.texture("missing.png"), None);
		assert_eq!(res.resolve("res://a/b.png"), PathBuf::from("/nonexistent-lupine-root/a/b.png"));
	}
}
