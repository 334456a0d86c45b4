//! The ordered `AUTHENTICATION_SOURCES` list.

// std
use std::slice::Iter;
// crates.io
use serde::{Deserializer, de::Error as DeError};
// self
use crate::_prelude::*;

/// Errors raised while validating the authentication source list.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum AuthenticationSourceError {
	/// The list is empty.
	#[error("AUTHENTICATION_SOURCES must enable at least one source.")]
	Empty,
	/// A source name is not recognized.
	#[error("Authentication source `{name}` is not supported.")]
	Unknown {
		/// Name as written in the settings.
		name: String,
	},
	/// A source appears more than once.
	#[error("Authentication source `{source_name}` is listed more than once.")]
	Duplicate {
		/// Duplicated source.
		source_name: AuthenticationSource,
	},
}

/// Authentication backends the host application can enable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationSource {
	/// Local user database.
	Internal,
	/// External OAuth2 / OIDC providers declared in `OAUTH2_CONFIG`.
	#[serde(rename = "oauth2")]
	OAuth2,
	/// LDAP directory bind.
	Ldap,
	/// Kerberos / SPNEGO.
	Kerberos,
	/// Identity asserted by a fronting web server.
	Webserver,
}
impl AuthenticationSource {
	/// Returns the settings-file spelling of the source.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthenticationSource::Internal => "internal",
			AuthenticationSource::OAuth2 => "oauth2",
			AuthenticationSource::Ldap => "ldap",
			AuthenticationSource::Kerberos => "kerberos",
			AuthenticationSource::Webserver => "webserver",
		}
	}
}
impl Display for AuthenticationSource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for AuthenticationSource {
	type Err = AuthenticationSourceError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"internal" => Ok(Self::Internal),
			"oauth2" => Ok(Self::OAuth2),
			"ldap" => Ok(Self::Ldap),
			"kerberos" => Ok(Self::Kerberos),
			"webserver" => Ok(Self::Webserver),
			other => Err(AuthenticationSourceError::Unknown { name: other.to_owned() }),
		}
	}
}
impl<'de> Deserialize<'de> for AuthenticationSource {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		raw.parse().map_err(DeError::custom)
	}
}

/// Ordered, duplicate-free, non-empty list of enabled sources.
///
/// Order is significant: the host tries sources in the listed order and the first entry is the
/// one presented by default on the login page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AuthenticationSources(Vec<AuthenticationSource>);
impl AuthenticationSources {
	/// Validates and wraps the provided sources.
	pub fn new<I>(sources: I) -> Result<Self, AuthenticationSourceError>
	where
		I: IntoIterator<Item = AuthenticationSource>,
	{
		let mut seen = BTreeSet::new();
		let mut ordered = Vec::new();

		for source in sources {
			if !seen.insert(source) {
				return Err(AuthenticationSourceError::Duplicate { source_name: source });
			}

			ordered.push(source);
		}

		if ordered.is_empty() {
			return Err(AuthenticationSourceError::Empty);
		}

		Ok(Self(ordered))
	}

	/// Returns true when `source` is enabled.
	pub fn contains(&self, source: AuthenticationSource) -> bool {
		self.0.contains(&source)
	}

	/// First enabled source.
	pub fn primary(&self) -> AuthenticationSource {
		self.0[0]
	}

	/// Iterator over enabled sources in configured order.
	pub fn iter(&self) -> Iter<'_, AuthenticationSource> {
		self.0.iter()
	}

	/// Returns the sources as a slice.
	pub fn as_slice(&self) -> &[AuthenticationSource] {
		&self.0
	}
}
impl Default for AuthenticationSources {
	fn default() -> Self {
		Self(vec![AuthenticationSource::Internal])
	}
}
impl<'de> Deserialize<'de> for AuthenticationSources {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = <Vec<AuthenticationSource>>::deserialize(deserializer)?;

		Self::new(raw).map_err(DeError::custom)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn sources_keep_configured_order() {
		let sources: AuthenticationSources = serde_json::from_str("[\"oauth2\", \"internal\"]")
			.expect("Known sources should deserialize.");

		assert_eq!(sources.primary(), AuthenticationSource::OAuth2);
		assert!(sources.contains(AuthenticationSource::Internal));
		assert!(!sources.contains(AuthenticationSource::Ldap));
		assert_eq!(
			sources.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
			vec!["oauth2", "internal"]
		);
	}

	#[test]
	fn sources_reject_empty_unknown_and_duplicates() {
		assert_eq!(AuthenticationSources::new(Vec::new()), Err(AuthenticationSourceError::Empty));
		assert_eq!(
			AuthenticationSources::new([
				AuthenticationSource::OAuth2,
				AuthenticationSource::OAuth2
			]),
			Err(AuthenticationSourceError::Duplicate { source_name: AuthenticationSource::OAuth2 })
		);
		assert!(serde_json::from_str::<AuthenticationSources>("[\"saml\"]").is_err());
		assert!(serde_json::from_str::<AuthenticationSources>("[]").is_err());
	}

	#[test]
	fn source_spelling_round_trips_through_serde() {
		let json = serde_json::to_string(&AuthenticationSources::default())
			.expect("Default sources should serialize.");

		assert_eq!(json, "[\"internal\"]");
		assert_eq!(
			serde_json::to_string(&AuthenticationSource::OAuth2)
				.expect("Source should serialize."),
			"\"oauth2\""
		);
	}
}
