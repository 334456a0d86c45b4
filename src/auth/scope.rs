//! The `OAUTH2_SCOPE` setting.

// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError};
// self
use crate::_prelude::*;

/// Scope requested to receive the `email` claim.
pub const EMAIL_SCOPE: &str = "email";
/// Scope that turns an OAuth 2.0 login into an OpenID Connect one.
pub const OPENID_SCOPE: &str = "openid";

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ScopeValidationError {
	/// The setting holds only whitespace.
	#[error("Scope setting is blank.")]
	Blank,
	/// A single scope token contains whitespace.
	#[error("Scope `{scope}` contains whitespace.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
}

/// Scopes requested from a provider, in the order they were configured.
///
/// Repeated scopes are dropped so the request parameter stays minimal. The value serializes as
/// the space-delimited string used by both the setting and the `scope` request parameter.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ScopeSet(Vec<String>);
impl ScopeSet {
	/// Builds a scope list from individual scope tokens.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut out = Vec::<String>::new();

		for scope in scopes {
			let scope = scope.into();

			if scope.is_empty() || scope.chars().any(char::is_whitespace) {
				return Err(ScopeValidationError::ContainsWhitespace { scope });
			}
			if !out.contains(&scope) {
				out.push(scope);
			}
		}

		Ok(Self(out))
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no scopes are configured.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns true if the provided scope is requested.
	pub fn contains(&self, scope: &str) -> bool {
		self.0.iter().any(|candidate| candidate == scope)
	}

	/// Returns true when `email` is requested, which every login relies on.
	pub fn requests_email(&self) -> bool {
		self.contains(EMAIL_SCOPE)
	}

	/// Returns true when the login is an OpenID Connect one.
	pub fn is_openid(&self) -> bool {
		self.contains(OPENID_SCOPE)
	}

	/// Scopes in configured order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// Space-delimited value for the `scope` request parameter.
	pub fn to_param(&self) -> String {
		self.0.join(" ")
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_list().entries(self.iter()).finish()
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.to_param())
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Ok(Self::default());
		}
		if s.trim().is_empty() {
			return Err(ScopeValidationError::Blank);
		}

		Self::new(s.split_whitespace())
	}
}
impl Serialize for ScopeSet {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_str(self)
	}
}
impl<'de> Deserialize<'de> for ScopeSet {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		raw.parse().map_err(DeError::custom)
	}
}
