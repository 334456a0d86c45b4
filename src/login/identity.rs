//! Identity claims gathered after a successful token exchange.

// self
use crate::{_prelude::*, login::LoginError};

/// Error returned when a claim payload is not a JSON object.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("The {origin} claims payload must be a JSON object.")]
pub struct MalformedClaims {
	/// Which payload was malformed (`id_token` or `userinfo`).
	pub origin: &'static str,
}

/// Claims from the ID token and the user-info response.
///
/// Lookups prefer the user-info response and fall back to the ID token, matching how the
/// profile is assembled after login.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentityClaims {
	/// Claims decoded from the ID token.
	pub id_token: JsonMap<String, JsonValue>,
	/// Claims returned by the user-info endpoint.
	pub userinfo: JsonMap<String, JsonValue>,
}
impl IdentityClaims {
	/// Wraps both claim sets.
	pub fn new(
		id_token: JsonMap<String, JsonValue>,
		userinfo: JsonMap<String, JsonValue>,
	) -> Self {
		Self { id_token, userinfo }
	}

	/// Builds the claim sets from JSON values, which must both be objects.
	pub fn from_values(id_token: JsonValue, userinfo: JsonValue) -> Result<Self, MalformedClaims> {
		Ok(Self::new(into_object("id_token", id_token)?, into_object("userinfo", userinfo)?))
	}

	/// Looks a claim up in the user-info response, then in the ID token.
	///
	/// A `null` member counts as absent.
	pub fn get(&self, name: &str) -> Option<&JsonValue> {
		present(&self.userinfo, name).or_else(|| present(&self.id_token, name))
	}

	/// Returns a claim that must be a non-empty string when present.
	pub fn string_claim(&self, name: &str) -> Result<Option<&str>, LoginError> {
		match self.get(name) {
			None | Some(JsonValue::Null) => Ok(None),
			Some(JsonValue::String(value)) if !value.is_empty() => Ok(Some(value.as_str())),
			Some(_) => Err(LoginError::InvalidClaimType { claim: name.to_owned() }),
		}
	}

	/// Returns a scalar claim as text; numbers and booleans use their JSON spelling.
	pub fn scalar_claim(&self, name: &str) -> Result<Option<String>, LoginError> {
		match self.get(name) {
			None | Some(JsonValue::Null) => Ok(None),
			Some(JsonValue::Number(n)) => Ok(Some(n.to_string())),
			Some(JsonValue::Bool(b)) => Ok(Some(b.to_string())),
			Some(_) => self.string_claim(name).map(|value| value.map(str::to_owned)),
		}
	}
}

fn present<'a>(claims: &'a JsonMap<String, JsonValue>, name: &str) -> Option<&'a JsonValue> {
	claims.get(name).filter(|value| !value.is_null())
}

fn into_object(
	origin: &'static str,
	value: JsonValue,
) -> Result<JsonMap<String, JsonValue>, MalformedClaims> {
	match value {
		JsonValue::Object(map) => Ok(map),
		JsonValue::Null => Ok(JsonMap::new()),
		_ => Err(MalformedClaims { origin }),
	}
}
