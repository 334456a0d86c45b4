//! Settings loader for the authentication subsystem.
//!
//! A settings document is a JSON object with upper-case keys:
//!
//! - `AUTHENTICATION_SOURCES`: ordered list of enabled backends (defaults to `["internal"]`).
//! - `OAUTH2_CONFIG`: list of provider entries (defaults to `[]`).
//! - `OAUTH2_AUTO_CREATE_USER`: whether a first successful external login provisions a local
//!   user (defaults to `true`).
//!
//! Loading expands `${VAR}` placeholders in every string value, deserializes the document with
//! path-aware errors, and validates every provider. The resulting [`LoginConfig`] is immutable.

// std
use std::{fs, path::Path};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	obs::{self, Stage, StageOutcome, StageSpan},
	placeholder::{self, VariableSource},
	provider::{Branding, ProviderDescriptor, ProviderDocument},
	source::{AuthenticationSource, AuthenticationSources},
};

/// Settings document exactly as written, before provider validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsDocument {
	/// Enabled authentication backends.
	#[serde(rename = "AUTHENTICATION_SOURCES", default)]
	pub sources: AuthenticationSources,
	/// Provider entries.
	#[serde(rename = "OAUTH2_CONFIG", default)]
	pub providers: Vec<ProviderDocument>,
	/// Auto-provision local users on first login.
	#[serde(rename = "OAUTH2_AUTO_CREATE_USER", default = "default_auto_create_user")]
	pub auto_create_user: bool,
}

/// Login button rendered for one provider, in configured order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginButton {
	/// Provider identifier submitted back by the login form.
	pub name: String,
	/// Label shown to end users.
	pub display_name: String,
	/// Icon and colour hints.
	#[serde(flatten)]
	pub branding: Branding,
}

/// Validated, immutable authentication settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginConfig {
	sources: AuthenticationSources,
	providers: Vec<ProviderDescriptor>,
	auto_create_user: bool,
}
impl LoginConfig {
	/// Reads and loads a settings file.
	pub fn from_path<V>(path: impl AsRef<Path>, vars: &V) -> Result<Self>
	where
		V: ?Sized + VariableSource,
	{
		let path = path.as_ref();
		let bytes = fs::read(path)
			.map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

		Self::from_json_slice(&bytes, vars)
	}

	/// Loads settings from a JSON string.
	pub fn from_json_str<V>(raw: &str, vars: &V) -> Result<Self>
	where
		V: ?Sized + VariableSource,
	{
		Self::from_json_slice(raw.as_bytes(), vars)
	}

	/// Loads settings from JSON bytes.
	pub fn from_json_slice<V>(raw: &[u8], vars: &V) -> Result<Self>
	where
		V: ?Sized + VariableSource,
	{
		let de = &mut serde_json::Deserializer::from_slice(raw);
		let value: JsonValue =
			serde_path_to_error::deserialize(de).map_err(ConfigError::from)?;

		Self::from_value(value, vars)
	}

	/// Loads settings from an already parsed JSON value.
	pub fn from_value<V>(mut value: JsonValue, vars: &V) -> Result<Self>
	where
		V: ?Sized + VariableSource,
	{
		let _guard = StageSpan::new(Stage::Load, None).entered();

		obs::record_stage_outcome(Stage::Load, None, StageOutcome::Attempt);
		obs::record_stage_result(Stage::Load, None, Self::load(&mut value, vars))
	}

	fn load<V>(value: &mut JsonValue, vars: &V) -> Result<Self>
	where
		V: ?Sized + VariableSource,
	{
		placeholder::expand_value(value, vars)
			.map_err(|(path, source)| ConfigError::Placeholder { path, source })?;

		let document: SettingsDocument =
			serde_path_to_error::deserialize(&*value).map_err(ConfigError::from)?;

		Ok(Self::from_document(document)?)
	}

	/// Validates a deserialized document.
	pub fn from_document(document: SettingsDocument) -> Result<Self, ConfigError> {
		let SettingsDocument { sources, providers: entries, auto_create_user } = document;

		if sources.contains(AuthenticationSource::OAuth2) && entries.is_empty() {
			return Err(ConfigError::MissingProviders);
		}

		let mut seen = BTreeSet::new();
		let mut providers = Vec::with_capacity(entries.len());

		for (index, entry) in entries.into_iter().enumerate() {
			let descriptor = entry
				.into_descriptor()
				.map_err(|source| ConfigError::Descriptor { index, source })?;

			if !seen.insert(descriptor.name.clone()) {
				return Err(ConfigError::DuplicateProvider { name: descriptor.name.to_string() });
			}
			if !descriptor.ssl_cert_verification {
				obs::warn(
					Stage::Load,
					&descriptor.name,
					"TLS certificate verification is disabled for this provider.",
				);
			}

			providers.push(descriptor);
		}

		Ok(Self { sources, providers, auto_create_user })
	}

	/// Enabled authentication sources in configured order.
	pub fn sources(&self) -> &AuthenticationSources {
		&self.sources
	}

	/// Returns true when the `oauth2` source is enabled.
	pub fn oauth2_enabled(&self) -> bool {
		self.sources.contains(AuthenticationSource::OAuth2)
	}

	/// All declared providers in configured order.
	pub fn providers(&self) -> &[ProviderDescriptor] {
		&self.providers
	}

	/// Looks up a provider by its `OAUTH2_NAME`.
	pub fn provider(&self, name: &str) -> Option<&ProviderDescriptor> {
		self.providers.iter().find(|descriptor| descriptor.name.as_ref() == name)
	}

	/// Whether a first successful external login provisions a local user.
	pub fn auto_create_user(&self) -> bool {
		self.auto_create_user
	}

	/// Login buttons for every provider, or none when `oauth2` is not enabled.
	pub fn login_buttons(&self) -> Vec<LoginButton> {
		if !self.oauth2_enabled() {
			return Vec::new();
		}

		self.providers
			.iter()
			.map(|descriptor| LoginButton {
				name: descriptor.name.to_string(),
				display_name: descriptor.display_name.clone(),
				branding: descriptor.branding.clone(),
			})
			.collect()
	}
}

fn default_auto_create_user() -> bool {
	true
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::{_preludet::*, placeholder::PlaceholderError, provider::ProviderDescriptorError};

	fn provider_entry(name: &str) -> JsonValue {
		json!({
			"OAUTH2_NAME": name,
			"OAUTH2_DISPLAY_NAME": name,
			"OAUTH2_CLIENT_ID": "client",
			"OAUTH2_CLIENT_SECRET": "secret",
			"OAUTH2_TOKEN_URL": "https://idp.example.com/token",
			"OAUTH2_AUTHORIZATION_URL": "https://idp.example.com/auth",
			"OAUTH2_API_BASE_URL": "https://idp.example.com/",
			"OAUTH2_USERINFO_ENDPOINT": "userinfo",
			"OAUTH2_SCOPE": "openid email"
		})
	}

	fn no_vars() -> BTreeMap<String, String> {
		BTreeMap::new()
	}

	#[test]
	fn fixture_expands_placeholders() {
		let config = fixture_config();
		let keycloak = config.provider("keycloak").expect("Fixture provider should exist.");

		assert!(config.oauth2_enabled());
		assert!(config.auto_create_user());
		assert_eq!(config.sources().primary(), AuthenticationSource::OAuth2);
		assert_eq!(keycloak.client_secret.expose(), "s3cr3t");
		assert_eq!(
			keycloak.endpoints.token.as_str(),
			"https://identity.example.dev/realms/platform/protocol/openid-connect/token"
		);
		assert_eq!(
			keycloak.endpoints.userinfo.as_str(),
			"https://identity.example.dev/realms/platform/protocol/openid-connect/userinfo"
		);
		assert_eq!(
			keycloak.username_claim().map(|claim| claim.as_ref()),
			Some("preferred_username")
		);
	}

	#[test]
	fn defaults_apply_to_empty_document() {
		let config =
			LoginConfig::from_json_str("{}", &no_vars()).expect("Empty document should load.");

		assert_eq!(config.sources().as_slice(), &[AuthenticationSource::Internal]);
		assert!(config.providers().is_empty());
		assert!(config.auto_create_user());
		assert!(config.login_buttons().is_empty());
	}

	#[test]
	fn oauth2_source_requires_providers() {
		let err =
			LoginConfig::from_value(json!({ "AUTHENTICATION_SOURCES": ["oauth2"] }), &no_vars())
				.expect_err("oauth2 without providers must fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingProviders)));
	}

	#[test]
	fn providers_without_oauth2_source_still_validate() {
		let mut entry = provider_entry("dormant");

		entry["OAUTH2_SCOPE"] = json!("openid");

		let err = LoginConfig::from_value(
			json!({ "AUTHENTICATION_SOURCES": ["internal"], "OAUTH2_CONFIG": [entry] }),
			&no_vars(),
		)
		.expect_err("Invalid providers must fail even when oauth2 is disabled.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::Descriptor {
				index: 0,
				source: ProviderDescriptorError::ScopeMissingEmail
			})
		));
	}

	#[test]
	fn duplicate_provider_names_fail() {
		let err = LoginConfig::from_value(
			json!({
				"AUTHENTICATION_SOURCES": ["oauth2"],
				"OAUTH2_CONFIG": [provider_entry("github"), provider_entry("github")]
			}),
			&no_vars(),
		)
		.expect_err("Duplicate names must fail.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::DuplicateProvider { ref name }) if name == "github"
		));
	}

	#[test]
	fn auto_create_user_must_be_boolean() {
		let err = LoginConfig::from_value(json!({ "OAUTH2_AUTO_CREATE_USER": "True" }), &no_vars())
			.expect_err("String booleans must be rejected.");

		match err {
			Error::Config(ConfigError::Parse(inner)) =>
				assert_eq!(inner.path().to_string(), "OAUTH2_AUTO_CREATE_USER"),
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	#[test]
	fn unknown_top_level_keys_are_rejected() {
		let err = LoginConfig::from_value(json!({ "OAUTH2_AUTO_CREATE_USERS": true }), &no_vars())
			.expect_err("Misspelled settings must fail.");

		match err {
			Error::Config(ConfigError::Parse(inner)) =>
				assert!(inner.inner().to_string().contains("`OAUTH2_AUTO_CREATE_USERS`")),
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	#[test]
	fn invalid_sources_surface_as_parse_errors() {
		let err = LoginConfig::from_value(
			json!({ "AUTHENTICATION_SOURCES": ["internal", "saml"] }),
			&no_vars(),
		)
		.expect_err("Unknown sources must fail.");

		match err {
			Error::Config(ConfigError::Parse(inner)) =>
				assert_eq!(inner.path().to_string(), "AUTHENTICATION_SOURCES[1]"),
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	#[test]
	fn unterminated_placeholder_names_the_setting() {
		let mut entry = provider_entry("keycloak");

		entry["OAUTH2_USERINFO_ENDPOINT"] = json!(
			"https://identity.${DOMAIN_DEV}/realms/${REALM_ID/protocol/openid-connect/userinfo"
		);

		let err = LoginConfig::from_value(
			json!({ "AUTHENTICATION_SOURCES": ["oauth2"], "OAUTH2_CONFIG": [entry] }),
			&fixture_vars(),
		)
		.expect_err("Unterminated placeholders must fail.");

		match err {
			Error::Config(ConfigError::Placeholder { path, source }) => {
				assert_eq!(path, "OAUTH2_CONFIG[0].OAUTH2_USERINFO_ENDPOINT");
				assert!(matches!(source, PlaceholderError::Unterminated { .. }));
			},
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	#[test]
	fn login_buttons_follow_provider_order() {
		let config = LoginConfig::from_value(
			json!({
				"AUTHENTICATION_SOURCES": ["internal", "oauth2"],
				"OAUTH2_CONFIG": [provider_entry("zeta"), provider_entry("alpha")]
			}),
			&no_vars(),
		)
		.expect("Two providers should load.");
		let buttons = config.login_buttons();

		assert_eq!(
			buttons.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
			vec!["zeta", "alpha"]
		);
		assert!(config.provider("missing").is_none());
	}

	#[test]
	fn from_path_reads_files_and_reports_missing_ones() {
		let path = std::env::temp_dir().join(format!(
			"oauth2_login_settings_{}_{}.json",
			std::process::id(),
			time::OffsetDateTime::now_utc().unix_timestamp_nanos(),
		));

		fs::write(&path, KEYCLOAK_FIXTURE).expect("Failed to write settings fixture.");

		let config =
			LoginConfig::from_path(&path, &fixture_vars()).expect("Settings file should load.");

		assert_eq!(config.providers().len(), 1);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary settings file {}: {e}", path.display())
		});

		let err = LoginConfig::from_path(&path, &fixture_vars())
			.expect_err("Missing files must fail.");

		assert!(matches!(err, Error::Config(ConfigError::Read { .. })));
	}
}
