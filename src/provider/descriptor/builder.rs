// crates.io
use url::Host;
// self
use crate::{
	_prelude::*,
	auth::{ClaimName, ClientSecret, IdentifierError, ProviderName, ScopeSet, ScopeValidationError},
	provider::{
		Branding, ButtonColor, ClaimRequirements, LogoutTemplate, ProviderDescriptor,
		ProviderEndpoints,
	},
};

/// Errors raised while constructing or validating descriptors.
///
/// Field names use the settings-file keys so messages point straight at the offending entry.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// A required setting is absent.
	#[error("Missing required setting {field}.")]
	MissingField {
		/// Settings key.
		field: &'static str,
	},
	/// A required setting is present but blank.
	#[error("Setting {field} cannot be blank.")]
	BlankField {
		/// Settings key.
		field: &'static str,
	},
	/// Provider or claim identifier is malformed.
	#[error("Setting {field} is not a valid identifier.")]
	InvalidIdentifier {
		/// Settings key.
		field: &'static str,
		/// Underlying identifier failure.
		#[source]
		source: IdentifierError,
	},
	/// A URL setting cannot be parsed.
	#[error("Setting {field} is not a valid URL.")]
	InvalidUrl {
		/// Settings key.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("Setting {field} must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Settings key.
		field: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Scope string cannot be parsed.
	#[error("Setting OAUTH2_SCOPE is invalid.")]
	InvalidScope(#[from] ScopeValidationError),
	/// The identity response must carry an email claim, so the scope must request it.
	#[error("Setting OAUTH2_SCOPE must include the `email` scope.")]
	ScopeMissingEmail,
	/// Button colour is not a hex colour.
	#[error("Setting OAUTH2_BUTTON_COLOR `{value}` is not a #rgb or #rrggbb colour.")]
	InvalidButtonColor {
		/// Value as written.
		value: String,
	},
	/// A gated claim lists no accepted values.
	#[error("Additional claim `{claim}` must list at least one accepted value.")]
	EmptyClaimValues {
		/// Claim name.
		claim: String,
	},
	/// Logout template references an unsupported `{...}` token.
	#[error("Setting OAUTH2_LOGOUT_URL references unknown placeholder `{{{name}}}`.")]
	UnknownLogoutPlaceholder {
		/// Token name between the braces.
		name: String,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub name: ProviderName,
	/// Label shown to end users.
	pub display_name: Option<String>,
	/// OAuth 2.0 client identifier.
	pub client_id: Option<String>,
	/// OAuth 2.0 client secret.
	pub client_secret: Option<ClientSecret>,
	/// Token endpoint.
	pub token_endpoint: Option<Url>,
	/// Authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// OIDC discovery document.
	pub server_metadata_url: Option<Url>,
	/// API base URL.
	pub api_base_url: Option<Url>,
	/// User-info endpoint as written: absolute URL or path relative to the API base.
	pub userinfo_endpoint: Option<String>,
	/// Requested scopes.
	pub scope: Option<ScopeSet>,
	/// Claim used for the username.
	pub username_claim: Option<ClaimName>,
	/// UI presentation hints.
	pub branding: Branding,
	/// Post-login authorization gate.
	pub additional_claims: ClaimRequirements,
	/// Whether TLS certificates are verified.
	pub ssl_cert_verification: bool,
	/// End-session template.
	pub logout: Option<LogoutTemplate>,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided name.
	pub fn new(name: ProviderName) -> Self {
		Self {
			name,
			display_name: None,
			client_id: None,
			client_secret: None,
			token_endpoint: None,
			authorization_endpoint: None,
			server_metadata_url: None,
			api_base_url: None,
			userinfo_endpoint: None,
			scope: None,
			username_claim: None,
			branding: Branding::default(),
			additional_claims: ClaimRequirements::default(),
			ssl_cert_verification: true,
			logout: None,
		}
	}

	/// Sets the display name.
	pub fn display_name(mut self, value: impl Into<String>) -> Self {
		self.display_name = Some(value.into());

		self
	}

	/// Sets the client identifier.
	pub fn client_id(mut self, value: impl Into<String>) -> Self {
		self.client_id = Some(value.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, value: impl Into<String>) -> Self {
		self.client_secret = Some(ClientSecret::new(value));

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the OIDC discovery document URL.
	pub fn server_metadata_url(mut self, url: Url) -> Self {
		self.server_metadata_url = Some(url);

		self
	}

	/// Sets the API base URL.
	pub fn api_base_url(mut self, url: Url) -> Self {
		self.api_base_url = Some(url);

		self
	}

	/// Sets the user-info endpoint (absolute URL or path relative to the API base).
	pub fn userinfo_endpoint(mut self, value: impl Into<String>) -> Self {
		self.userinfo_endpoint = Some(value.into());

		self
	}

	/// Sets the requested scopes.
	pub fn scope(mut self, scope: ScopeSet) -> Self {
		self.scope = Some(scope);

		self
	}

	/// Sets the username claim.
	pub fn username_claim(mut self, claim: ClaimName) -> Self {
		self.username_claim = Some(claim);

		self
	}

	/// Sets the button icon.
	pub fn icon(mut self, icon: impl Into<String>) -> Self {
		self.branding.icon = Some(icon.into());

		self
	}

	/// Sets the button colour.
	pub fn button_color(mut self, color: ButtonColor) -> Self {
		self.branding.button_color = Some(color);

		self
	}

	/// Overrides the additional-claims gate.
	pub fn additional_claims(mut self, claims: ClaimRequirements) -> Self {
		self.additional_claims = claims;

		self
	}

	/// Overrides TLS certificate verification (enabled by default).
	pub fn ssl_cert_verification(mut self, enabled: bool) -> Self {
		self.ssl_cert_verification = enabled;

		self
	}

	/// Sets the end-session template.
	pub fn logout(mut self, template: LogoutTemplate) -> Self {
		self.logout = Some(template);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let display_name = required_text("OAUTH2_DISPLAY_NAME", self.display_name)?;
		let client_id = required_text("OAUTH2_CLIENT_ID", self.client_id)?;
		let client_secret = self
			.client_secret
			.ok_or(ProviderDescriptorError::MissingField { field: "OAUTH2_CLIENT_SECRET" })?;

		if client_secret.is_empty() {
			return Err(ProviderDescriptorError::BlankField { field: "OAUTH2_CLIENT_SECRET" });
		}

		let token = self
			.token_endpoint
			.ok_or(ProviderDescriptorError::MissingField { field: "OAUTH2_TOKEN_URL" })?;
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingField { field: "OAUTH2_AUTHORIZATION_URL" })?;
		let api_base = self
			.api_base_url
			.ok_or(ProviderDescriptorError::MissingField { field: "OAUTH2_API_BASE_URL" })?;
		let userinfo_raw = required_text("OAUTH2_USERINFO_ENDPOINT", self.userinfo_endpoint)?;
		let userinfo = resolve_userinfo(&api_base, &userinfo_raw)?;
		let scope =
			self.scope.ok_or(ProviderDescriptorError::MissingField { field: "OAUTH2_SCOPE" })?;
		let endpoints = ProviderEndpoints {
			token,
			authorization,
			server_metadata: self.server_metadata_url,
			api_base,
			userinfo,
			logout: self.logout,
		};
		let descriptor = ProviderDescriptor {
			name: self.name,
			display_name,
			client_id,
			client_secret,
			endpoints,
			scope,
			username_claim: self.username_claim,
			branding: self.branding,
			additional_claims: self.additional_claims,
			ssl_cert_verification: self.ssl_cert_verification,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		if !self.scope.requests_email() {
			return Err(ProviderDescriptorError::ScopeMissingEmail);
		}

		validate_endpoint("OAUTH2_TOKEN_URL", &self.endpoints.token)?;
		validate_endpoint("OAUTH2_AUTHORIZATION_URL", &self.endpoints.authorization)?;
		validate_endpoint("OAUTH2_API_BASE_URL", &self.endpoints.api_base)?;
		validate_endpoint("OAUTH2_USERINFO_ENDPOINT", &self.endpoints.userinfo)?;

		if let Some(metadata) = self.endpoints.server_metadata.as_ref() {
			validate_endpoint("OAUTH2_SERVER_METADATA_URL", metadata)?;
		}
		if self.branding.icon.as_deref().is_some_and(|icon| icon.trim().is_empty()) {
			return Err(ProviderDescriptorError::BlankField { field: "OAUTH2_ICON" });
		}

		Ok(())
	}
}

pub(crate) fn validate_endpoint(
	field: &'static str,
	url: &Url,
) -> Result<(), ProviderDescriptorError> {
	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(ProviderDescriptorError::InsecureEndpoint { field, url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => ip.is_loopback(),
		Some(Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	}
}

fn required_text(
	field: &'static str,
	value: Option<String>,
) -> Result<String, ProviderDescriptorError> {
	let value = value.ok_or(ProviderDescriptorError::MissingField { field })?;

	if value.trim().is_empty() {
		return Err(ProviderDescriptorError::BlankField { field });
	}

	Ok(value)
}

// A path is joined below the API base, so the base is treated as a directory even when it
// was written without a trailing slash.
fn resolve_userinfo(api_base: &Url, raw: &str) -> Result<Url, ProviderDescriptorError> {
	let field = "OAUTH2_USERINFO_ENDPOINT";

	match Url::parse(raw) {
		Ok(url) => Ok(url),
		Err(url::ParseError::RelativeUrlWithoutBase) => {
			let mut base = api_base.clone();

			if !base.path().ends_with('/') {
				let path = format!("{}/", base.path());

				base.set_path(&path);
			}

			base.join(raw).map_err(|source| ProviderDescriptorError::InvalidUrl { field, source })
		},
		Err(source) => Err(ProviderDescriptorError::InvalidUrl { field, source }),
	}
}
