//! Hand-off of provider descriptors to the `oauth2` crate.
//!
//! The crate never exchanges tokens itself. Hosts that run the code exchange with `oauth2` can
//! build a ready [`ConfiguredBasicClient`] from a descriptor instead of re-reading the settings.

// crates.io
use oauth2::{
	AuthUrl, ClientId, ClientSecret as OAuth2ClientSecret, EndpointNotSet, EndpointSet,
	RedirectUrl, TokenUrl, basic::BasicClient,
};
// self
use crate::{_prelude::*, error::ConfigError, provider::ProviderDescriptor};

/// `BasicClient` with the authorization and token endpoints set.
pub type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

impl ProviderDescriptor {
	/// Builds an `oauth2` client carrying the descriptor's credentials and endpoints.
	pub fn oauth2_client(&self, redirect_uri: &str) -> Result<ConfiguredBasicClient> {
		let redirect = RedirectUrl::new(redirect_uri.to_owned())
			.map_err(|source| ConfigError::InvalidRedirect { source })?;
		let client = BasicClient::new(ClientId::new(self.client_id.clone()))
			.set_client_secret(OAuth2ClientSecret::new(self.client_secret.expose().to_owned()))
			.set_auth_uri(AuthUrl::from_url(self.endpoints.authorization.clone()))
			.set_token_uri(TokenUrl::from_url(self.endpoints.token.clone()))
			.set_redirect_uri(redirect);

		Ok(client)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::*;

	#[test]
	fn client_mirrors_descriptor() {
		let descriptor = fixture_descriptor();
		let client = descriptor
			.oauth2_client("https://app.example.dev/oauth2/authorize")
			.expect("Client should build from the fixture descriptor.");

		assert_eq!(client.client_id().as_str(), "pgadmin-client");
		assert_eq!(client.auth_uri().url(), &descriptor.endpoints.authorization);
		assert_eq!(client.token_uri().url(), &descriptor.endpoints.token);
		assert_eq!(
			client.redirect_uri().map(|uri| uri.as_str()),
			Some("https://app.example.dev/oauth2/authorize")
		);
	}

	#[test]
	fn invalid_redirect_is_reported() {
		let err = fixture_descriptor()
			.oauth2_client("not a url")
			.expect_err("Relative redirects must be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidRedirect { .. })));
	}
}
