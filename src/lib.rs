//! Typed loader and validator for OAuth 2.0 / OIDC login provider settings, with placeholder
//! expansion, claim gates, and metadata discovery.
//!
//! The crate reads the upper-case settings document (`AUTHENTICATION_SOURCES`,
//! `OAUTH2_CONFIG`, `OAUTH2_AUTO_CREATE_USER`), substitutes `${VAR}` deployment placeholders,
//! and returns an immutable [`config::LoginConfig`]. The [`login`] module applies the documented
//! post-login rules (email requirement, username claim, additional-claims gate, auto-provisioning)
//! without performing any token exchange itself.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
#[cfg(feature = "reqwest")] pub mod discovery;
pub mod error;
pub mod login;
pub mod oauth;
pub mod obs;
pub mod placeholder;
pub mod provider;
pub mod source;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{config::LoginConfig, provider::ProviderDescriptor};

	/// Settings document modeled on a Keycloak realm, with `${DOMAIN_DEV}`, `${REALM_ID}` and
	/// `${OAUTH2_CLIENT_SECRET}` placeholders left for expansion.
	pub const KEYCLOAK_FIXTURE: &str = r##"{
		"AUTHENTICATION_SOURCES": ["oauth2", "internal"],
		"OAUTH2_CONFIG": [
			{
				"OAUTH2_NAME": "keycloak",
				"OAUTH2_DISPLAY_NAME": "Keycloak",
				"OAUTH2_CLIENT_ID": "pgadmin-client",
				"OAUTH2_CLIENT_SECRET": "${OAUTH2_CLIENT_SECRET}",
				"OAUTH2_TOKEN_URL": "https://identity.${DOMAIN_DEV}/realms/${REALM_ID}/protocol/openid-connect/token",
				"OAUTH2_AUTHORIZATION_URL": "https://identity.${DOMAIN_DEV}/realms/${REALM_ID}/protocol/openid-connect/auth",
				"OAUTH2_SERVER_METADATA_URL": "https://identity.${DOMAIN_DEV}/realms/${REALM_ID}/.well-known/openid-configuration",
				"OAUTH2_API_BASE_URL": "https://identity.${DOMAIN_DEV}/realms/${REALM_ID}/protocol/openid-connect/",
				"OAUTH2_USERINFO_ENDPOINT": "userinfo",
				"OAUTH2_SCOPE": "openid email profile",
				"OAUTH2_USERNAME_CLAIM": "preferred_username",
				"OAUTH2_ICON": "fa-key",
				"OAUTH2_BUTTON_COLOR": "#4a86cf",
				"OAUTH2_ADDITIONAL_CLAIMS": { "groups": ["/sysadmins"] },
				"OAUTH2_SSL_CERT_VERIFICATION": true,
				"OAUTH2_LOGOUT_URL": "https://identity.${DOMAIN_DEV}/realms/${REALM_ID}/protocol/openid-connect/logout?post_logout_redirect_uri={redirect_uri}&id_token_hint={id_token}"
			}
		],
		"OAUTH2_AUTO_CREATE_USER": true
	}"##;

	/// Variables that satisfy every placeholder in [`KEYCLOAK_FIXTURE`].
	pub fn fixture_vars() -> BTreeMap<String, String> {
		BTreeMap::from_iter([
			("DOMAIN_DEV".to_owned(), "example.dev".to_owned()),
			("REALM_ID".to_owned(), "platform".to_owned()),
			("OAUTH2_CLIENT_SECRET".to_owned(), "s3cr3t".to_owned()),
		])
	}

	/// Loads [`KEYCLOAK_FIXTURE`] with [`fixture_vars`].
	pub fn fixture_config() -> LoginConfig {
		LoginConfig::from_json_str(KEYCLOAK_FIXTURE, &fixture_vars())
			.expect("Keycloak fixture should load with the fixture variables.")
	}

	/// Returns the single provider declared by [`KEYCLOAK_FIXTURE`].
	pub fn fixture_descriptor() -> ProviderDescriptor {
		fixture_config()
			.providers()
			.first()
			.cloned()
			.expect("Keycloak fixture should declare one provider.")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, BTreeSet, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		str::FromStr,
		sync::Arc,
	};

	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value as JsonValue};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(not(feature = "reqwest"))] use {async_lock as _, parking_lot as _, time as _};
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
#[cfg(all(test, not(feature = "reqwest")))] use {color_eyre as _, httpmock as _, tokio as _};
