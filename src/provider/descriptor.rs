//! Provider descriptor data structures and helpers shared by the loader and login helpers.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// UI presentation hints.
pub mod branding;
/// Additional-claims authorization gate.
pub mod claims;
/// End-session URL template.
pub mod logout;

pub use branding::*;
pub use builder::*;
pub use claims::*;
pub use logout::*;

// self
use crate::{
	_prelude::*,
	auth::{ClaimName, ClientSecret, ProviderName, ScopeSet},
	error::ConfigError,
};

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderEndpoints {
	/// Token endpoint (`OAUTH2_TOKEN_URL`).
	pub token: Url,
	/// Authorization endpoint (`OAUTH2_AUTHORIZATION_URL`).
	pub authorization: Url,
	/// OIDC discovery document (`OAUTH2_SERVER_METADATA_URL`).
	pub server_metadata: Option<Url>,
	/// API base URL (`OAUTH2_API_BASE_URL`).
	pub api_base: Url,
	/// User-info endpoint, already resolved against the API base when configured as a path.
	pub userinfo: Url,
	/// End-session template (`OAUTH2_LOGOUT_URL`).
	pub logout: Option<LogoutTemplate>,
}

/// Immutable, validated OAuth2 provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderDescriptor {
	/// Internal provider identifier.
	pub name: ProviderName,
	/// Label shown to end users.
	pub display_name: String,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: ClientSecret,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Requested scopes; always contains `email`.
	pub scope: ScopeSet,
	/// Claim used for the username; `None` means the email is used.
	pub username_claim: Option<ClaimName>,
	/// UI presentation hints.
	pub branding: Branding,
	/// Post-login authorization gate.
	pub additional_claims: ClaimRequirements,
	/// Whether TLS certificates are verified on calls to the provider.
	pub ssl_cert_verification: bool,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided name.
	pub fn builder(name: ProviderName) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(name)
	}

	/// Claim that yields the username, when one is configured.
	pub fn username_claim(&self) -> Option<&ClaimName> {
		self.username_claim.as_ref()
	}

	/// Renders the end-session URL for a signed-in user.
	///
	/// Returns `Ok(None)` when the provider does not declare `OAUTH2_LOGOUT_URL`.
	pub fn logout_url(&self, redirect_uri: &Url, id_token: Option<&str>) -> Result<Option<Url>> {
		let Some(template) = self.endpoints.logout.as_ref() else {
			return Ok(None);
		};
		let url = template
			.render(redirect_uri, id_token)
			.map_err(|source| ConfigError::InvalidLogoutUrl { source })?;

		Ok(Some(url))
	}
}
