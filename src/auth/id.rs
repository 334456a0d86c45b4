//! Names used to key providers and claims.
//!
//! Provider names travel through login forms and URLs, so they are limited to a conservative
//! ASCII alphabet. Claim names only need to be non-blank tokens because providers use
//! URI-shaped claims.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_name {
	($name:ident, $doc:literal, $kind:literal, $max:expr, $allowed:expr) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Maximum permitted byte length.
			pub const MAX_LEN: usize = $max;

			/// Validates and wraps `value`.
			pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
				let value = value.into();

				check_name($kind, &value, $max, $allowed)?;

				Ok(Self(value))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &str {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				Self::new(value)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

/// Error returned when a provider or claim name is rejected.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The name is empty.
	#[error("{kind} name cannot be empty.")]
	Empty {
		/// `Provider` or `Claim`.
		kind: &'static str,
	},
	/// The name contains a character outside its alphabet.
	#[error("{kind} name contains the character {ch:?}.")]
	InvalidCharacter {
		/// `Provider` or `Claim`.
		kind: &'static str,
		/// First rejected character.
		ch: char,
	},
	/// The name is longer than allowed.
	#[error("{kind} name exceeds {max} bytes.")]
	TooLong {
		/// `Provider` or `Claim`.
		kind: &'static str,
		/// Maximum permitted length.
		max: usize,
	},
}

def_name! {
	ProviderName,
	"Internal identifier of an OAuth2 provider (`OAUTH2_NAME`).",
	"Provider",
	128,
	|c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}
def_name! {
	ClaimName,
	"Name of a claim asserted in an ID token or user-info response.",
	"Claim",
	256,
	|c: char| !c.is_whitespace() && !c.is_control()
}

fn check_name(
	kind: &'static str,
	value: &str,
	max: usize,
	allowed: fn(char) -> bool,
) -> Result<(), IdentifierError> {
	if value.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if let Some(ch) = value.chars().find(|&c| !allowed(c)) {
		return Err(IdentifierError::InvalidCharacter { kind, ch });
	}
	if value.len() > max {
		return Err(IdentifierError::TooLong { kind, max });
	}

	Ok(())
}
