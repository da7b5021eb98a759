use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FontStyle {
	#[default]
	Regular,
	Bold,
	Italic,
	BoldItalic,
}

impl FontStyle {
	pub fn label(self) -> &'static str {
		match self {
			FontStyle::Regular => "Regular",
			FontStyle::Bold => "Bold",
			FontStyle::Italic => "Italic",
			FontStyle::BoldItalic => "Bold Italic",
		}
	}
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown font style {0:?}")]
pub struct UnknownFontStyleError(String);

impl TryFrom<&str> for FontStyle {
	type Error = UnknownFontStyleError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		match value {
			"Regular" => Ok(FontStyle::Regular),
			"Bold" => Ok(FontStyle::Bold),
			"Italic" => Ok(FontStyle::Italic),
			"Bold Italic" | "BoldItalic" => Ok(FontStyle::BoldItalic),
			unknown => Err(UnknownFontStyleError(unknown.to_owned())),
		}
	}
}

/// Handle to a font, either installed on the system or shipped as a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FontPath {
	System { family: String, style: FontStyle },
	File(String),
}

impl Default for FontPath {
	fn default() -> Self {
		FontPath::System {
			family: "Arial".to_owned(),
			style: FontStyle::Regular,
		}
	}
}

impl FontPath {
	pub fn system(family: impl Into<String>, style: FontStyle) -> Self {
		FontPath::System {
			family: family.into(),
			style,
		}
	}

	pub fn file(path: impl Into<String>) -> Self {
		FontPath::File(path.into())
	}

	pub fn is_system_font(&self) -> bool {
		matches!(self, FontPath::System { .. })
	}

	/// Human readable label, e.g. `Arial (Bold)` or `Roboto-Regular.ttf`.
	pub fn display_name(&self) -> String {
		match self {
			FontPath::System {
				family,
				style: FontStyle::Regular,
			} => family.clone(),
			FontPath::System { family, style } => format!("{} ({})", family, style.label()),
			FontPath::File(path) if path.is_empty() => "(none)".to_owned(),
			FontPath::File(path) => Path::new(path)
				.file_name()
				.map(|name| name.to_string_lossy().into_owned())
				.unwrap_or_else(|| path.clone()),
		}
	}
}

impl fmt::Display for FontPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.display_name())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_names() {
		assert_eq!(FontPath::system("Arial", FontStyle::Regular).display_name(), "Arial");
		assert_eq!(
			FontPath::system("Arial", FontStyle::BoldItalic).display_name(),
			"Arial (Bold Italic)"
		);
		assert_eq!(
			FontPath::file("assets/fonts/Roboto-Regular.ttf").display_name(),
			"Roboto-Regular.ttf"
		);
		assert_eq!(FontPath::file("").display_name(), "(none)");
	}

	#[test]
	fn style_labels_parse_back() {
		for style in [FontStyle::Regular, FontStyle::Bold, FontStyle::Italic, FontStyle::BoldItalic] {
			assert_eq!(FontStyle::try_from(style.label()).unwrap(), style);
		}
		assert!(FontStyle::try_from("Oblique").is_err());
	}
}
