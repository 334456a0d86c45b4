//! Serde model of one `OAUTH2_CONFIG` entry.
//!
//! Every key is optional at the serde layer so missing settings surface as
//! [`ProviderDescriptorError::MissingField`] naming the key, rather than as a generic
//! deserialization failure. Unknown keys are rejected.

// self
use crate::{
	_prelude::*,
	auth::{ClaimName, ProviderName, ScopeSet},
	provider::{
		ButtonColor, ClaimRequirements, LogoutTemplate, ProviderDescriptor,
		ProviderDescriptorError,
	},
};

/// Accepted values for a gated claim: a single string or a list of strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AcceptedValues {
	/// Single accepted value.
	One(String),
	/// List of accepted values.
	Many(Vec<String>),
}
impl AcceptedValues {
	fn into_vec(self) -> Vec<String> {
		match self {
			AcceptedValues::One(value) => vec![value],
			AcceptedValues::Many(values) => values,
		}
	}
}

/// One provider entry exactly as written in the settings document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderDocument {
	/// Provider identifier.
	#[serde(rename = "OAUTH2_NAME")]
	pub name: Option<String>,
	/// Label shown on the login button.
	#[serde(rename = "OAUTH2_DISPLAY_NAME")]
	pub display_name: Option<String>,
	/// OAuth2 client identifier.
	#[serde(rename = "OAUTH2_CLIENT_ID")]
	pub client_id: Option<String>,
	/// OAuth2 client secret.
	#[serde(rename = "OAUTH2_CLIENT_SECRET")]
	pub client_secret: Option<String>,
	/// Token endpoint.
	#[serde(rename = "OAUTH2_TOKEN_URL")]
	pub token_url: Option<String>,
	/// Authorization endpoint.
	#[serde(rename = "OAUTH2_AUTHORIZATION_URL")]
	pub authorization_url: Option<String>,
	/// OIDC discovery document URL.
	#[serde(rename = "OAUTH2_SERVER_METADATA_URL")]
	pub server_metadata_url: Option<String>,
	/// Base URL that relative user-info endpoints resolve against.
	#[serde(rename = "OAUTH2_API_BASE_URL")]
	pub api_base_url: Option<String>,
	/// User-info endpoint, absolute or relative to the API base.
	#[serde(rename = "OAUTH2_USERINFO_ENDPOINT")]
	pub userinfo_endpoint: Option<String>,
	/// Space-separated scopes; must include `email`.
	#[serde(rename = "OAUTH2_SCOPE")]
	pub scope: Option<String>,
	/// Claim used as the local username; empty means the email.
	#[serde(rename = "OAUTH2_USERNAME_CLAIM")]
	pub username_claim: Option<String>,
	/// Button icon class.
	#[serde(rename = "OAUTH2_ICON")]
	pub icon: Option<String>,
	/// Button colour as `#rgb` or `#rrggbb`.
	#[serde(rename = "OAUTH2_BUTTON_COLOR")]
	pub button_color: Option<String>,
	/// Claims gate: claim name to accepted values.
	#[serde(rename = "OAUTH2_ADDITIONAL_CLAIMS")]
	pub additional_claims: Option<BTreeMap<String, AcceptedValues>>,
	/// TLS certificate verification for provider calls.
	#[serde(rename = "OAUTH2_SSL_CERT_VERIFICATION")]
	pub ssl_cert_verification: Option<bool>,
	/// End-session URL template.
	#[serde(rename = "OAUTH2_LOGOUT_URL")]
	pub logout_url: Option<String>,
}
impl ProviderDocument {
	/// Validates the entry and converts it into a [`ProviderDescriptor`].
	pub fn into_descriptor(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let name = self.name.ok_or(ProviderDescriptorError::MissingField { field: "OAUTH2_NAME" })?;
		let name = ProviderName::new(name).map_err(|source| {
			ProviderDescriptorError::InvalidIdentifier { field: "OAUTH2_NAME", source }
		})?;
		let mut builder = ProviderDescriptor::builder(name);

		if let Some(value) = self.display_name {
			builder = builder.display_name(value);
		}
		if let Some(value) = self.client_id {
			builder = builder.client_id(value);
		}
		if let Some(value) = self.client_secret {
			builder = builder.client_secret(value);
		}
		if let Some(url) = parse_url("OAUTH2_TOKEN_URL", self.token_url)? {
			builder = builder.token_endpoint(url);
		}
		if let Some(url) = parse_url("OAUTH2_AUTHORIZATION_URL", self.authorization_url)? {
			builder = builder.authorization_endpoint(url);
		}
		if let Some(url) = parse_url("OAUTH2_SERVER_METADATA_URL", self.server_metadata_url)? {
			builder = builder.server_metadata_url(url);
		}
		if let Some(url) = parse_url("OAUTH2_API_BASE_URL", self.api_base_url)? {
			builder = builder.api_base_url(url);
		}
		if let Some(value) = self.userinfo_endpoint {
			builder = builder.userinfo_endpoint(value);
		}
		if let Some(value) = self.scope {
			builder = builder.scope(ScopeSet::from_str(&value)?);
		}
		// An empty claim means "use the email".
		if let Some(value) = self.username_claim.filter(|claim| !claim.is_empty()) {
			let claim = ClaimName::new(value).map_err(|source| {
				ProviderDescriptorError::InvalidIdentifier { field: "OAUTH2_USERNAME_CLAIM", source }
			})?;

			builder = builder.username_claim(claim);
		}
		if let Some(value) = self.icon {
			builder = builder.icon(value);
		}
		if let Some(value) = self.button_color {
			builder = builder.button_color(ButtonColor::new(value)?);
		}
		if let Some(claims) = self.additional_claims {
			let mut entries = Vec::with_capacity(claims.len());

			for (claim, accepted) in claims {
				let claim = ClaimName::new(claim).map_err(|source| {
					ProviderDescriptorError::InvalidIdentifier {
						field: "OAUTH2_ADDITIONAL_CLAIMS",
						source,
					}
				})?;

				entries.push((claim, accepted.into_vec()));
			}

			builder = builder.additional_claims(ClaimRequirements::new(entries)?);
		}
		if let Some(enabled) = self.ssl_cert_verification {
			builder = builder.ssl_cert_verification(enabled);
		}
		if let Some(value) = self.logout_url.filter(|url| !url.is_empty()) {
			builder = builder.logout(LogoutTemplate::new(value)?);
		}

		builder.build()
	}
}

fn parse_url(
	field: &'static str,
	value: Option<String>,
) -> Result<Option<Url>, ProviderDescriptorError> {
	value
		.map(|raw| {
			Url::parse(&raw).map_err(|source| ProviderDescriptorError::InvalidUrl { field, source })
		})
		.transpose()
}
