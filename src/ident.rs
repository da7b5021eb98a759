use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

macro_rules! uuid_newtype {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
		pub struct $name(pub Uuid);

		impl $name {
			/// Fresh random identifier.
			pub fn new() -> Self {
				Self(Uuid::new_v4())
			}

			pub const fn nil() -> Self {
				Self(Uuid::nil())
			}

			pub fn is_nil(&self) -> bool {
				self.0.is_nil()
			}

			pub fn parse(s: &str) -> Result<Self, uuid::Error> {
				Uuid::parse_str(s).map(Self)
			}
		}

		impl Default for $name {
			fn default() -> Self {
				Self::new()
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				fmt::Display::fmt(&self.0.hyphenated(), f)
			}
		}

		impl FromStr for $name {
			type Err = uuid::Error;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::parse(s)
			}
		}
	};
}

uuid_newtype!(
	/// Identifier of a node, stable across save and load.
	NodeUuid
);

uuid_newtype!(
	/// Identifier of a component, stable across save and load.
	ComponentUuid
);

uuid_newtype!(SceneUuid);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn textual_round_trip() {
		let id = NodeUuid::new();
		let text = id.to_string();
		assert_eq!(text.len(), 36);
		assert_eq!(text.parse::<NodeUuid>().unwrap(), id);
		assert!(!id.is_nil());
		assert!(NodeUuid::nil().is_nil());
		assert!("not-a-uuid".parse::<ComponentUuid>().is_err());
	}

	#[test]
	fn fresh_ids_differ() {
		assert_ne!(ComponentUuid::new(), ComponentUuid::new());
	}
}
