// self
use crate::{_prelude::*, provider::ProviderDescriptor};

/// Subset of the OIDC discovery document the crate understands. Unknown members are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
	/// Issuer identifier.
	pub issuer: Url,
	/// Advertised authorization endpoint.
	pub authorization_endpoint: Url,
	/// Advertised token endpoint.
	pub token_endpoint: Url,
	/// Advertised user-info endpoint.
	#[serde(default)]
	pub userinfo_endpoint: Option<Url>,
	/// Advertised RP-initiated logout endpoint.
	#[serde(default)]
	pub end_session_endpoint: Option<Url>,
	/// Key set used to sign ID tokens.
	#[serde(default)]
	pub jwks_uri: Option<Url>,
	/// Scopes the provider accepts.
	#[serde(default)]
	pub scopes_supported: Vec<String>,
	/// Claims the provider can return.
	#[serde(default)]
	pub claims_supported: Vec<String>,
	/// PKCE methods the provider accepts.
	#[serde(default)]
	pub code_challenge_methods_supported: Vec<String>,
}
impl ProviderMetadata {
	/// Compares the advertised document against the configured descriptor.
	///
	/// Endpoints are compared by scheme, host, port and path; query strings are ignored. Scopes
	/// are only checked when the document lists `scopes_supported`.
	pub fn reconcile(&self, descriptor: &ProviderDescriptor) -> Vec<EndpointMismatch> {
		let endpoints = &descriptor.endpoints;
		let mut mismatches = Vec::new();
		let mut check = |field: &'static str, configured: &Url, advertised: &Url| {
			if !same_resource(configured, advertised) {
				mismatches.push(EndpointMismatch::Endpoint {
					field,
					configured: configured.clone(),
					advertised: advertised.clone(),
				});
			}
		};

		check("OAUTH2_AUTHORIZATION_URL", &endpoints.authorization, &self.authorization_endpoint);
		check("OAUTH2_TOKEN_URL", &endpoints.token, &self.token_endpoint);

		if let Some(advertised) = &self.userinfo_endpoint {
			check("OAUTH2_USERINFO_ENDPOINT", &endpoints.userinfo, advertised);
		}
		if let (Some(template), Some(advertised)) = (&endpoints.logout, &self.end_session_endpoint)
			&& let Ok(configured) = Url::parse(template.as_str())
		{
			check("OAUTH2_LOGOUT_URL", &configured, advertised);
		}
		if !self.scopes_supported.is_empty() {
			for scope in descriptor.scope.iter() {
				if !self.scopes_supported.iter().any(|supported| supported == scope) {
					mismatches.push(EndpointMismatch::UnsupportedScope { scope: scope.to_owned() });
				}
			}
		}

		mismatches
	}

	/// Returns true when the provider advertises `S256` PKCE support.
	pub fn supports_s256(&self) -> bool {
		self.code_challenge_methods_supported.iter().any(|method| method == "S256")
	}
}

/// Disagreement between the settings and the provider's metadata document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EndpointMismatch {
	/// A configured endpoint differs from the advertised one.
	Endpoint {
		/// Settings key of the configured endpoint.
		field: &'static str,
		/// Endpoint from the settings.
		configured: Url,
		/// Endpoint from the metadata document.
		advertised: Url,
	},
	/// A requested scope is absent from `scopes_supported`.
	UnsupportedScope {
		/// Requested scope.
		scope: String,
	},
}
impl Display for EndpointMismatch {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			EndpointMismatch::Endpoint { field, configured, advertised } =>
				write!(f, "{field} is {configured} but the provider advertises {advertised}"),
			EndpointMismatch::UnsupportedScope { scope } =>
				write!(f, "scope `{scope}` is not listed in scopes_supported"),
		}
	}
}

fn same_resource(a: &Url, b: &Url) -> bool {
	a.scheme() == b.scheme()
		&& a.host_str() == b.host_str()
		&& a.port_or_known_default() == b.port_or_known_default()
		&& a.path().trim_end_matches('/') == b.path().trim_end_matches('/')
}
