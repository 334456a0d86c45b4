//! OIDC server metadata discovery for providers that declare `OAUTH2_SERVER_METADATA_URL`.
//!
//! [`DiscoveryClient`] fetches the `.well-known/openid-configuration` document while honouring
//! the provider's `OAUTH2_SSL_CERT_VERIFICATION` setting, [`ProviderMetadata::reconcile`]
//! reports where the advertised endpoints drift from the configured ones, and
//! [`MetadataRegistry`] caches documents per provider with single-flight refreshes.

mod metadata;
mod registry;

pub use metadata::*;
pub use registry::*;

// crates.io
use reqwest::{Client as ReqwestClient, header::ACCEPT, redirect::Policy};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransientError, TransportError},
	obs::{self, Stage, StageOutcome, StageSpan},
	provider::ProviderDescriptor,
};

/// HTTP client used to download provider metadata documents.
///
/// Redirects are never followed; a metadata URL that redirects is reported as an endpoint
/// failure so the settings can be corrected.
#[derive(Clone, Debug)]
pub struct DiscoveryClient {
	http: ReqwestClient,
}
impl DiscoveryClient {
	/// Wraps an existing reqwest client. The caller owns its TLS and redirect settings.
	pub fn with_client(http: ReqwestClient) -> Self {
		Self { http }
	}

	/// Builds a client matching the descriptor's TLS verification setting.
	pub fn for_descriptor(descriptor: &ProviderDescriptor) -> Result<Self> {
		let mut builder = ReqwestClient::builder().redirect(Policy::none());

		if !descriptor.ssl_cert_verification {
			obs::warn(
				Stage::Discovery,
				&descriptor.name,
				"Accepting invalid TLS certificates for metadata discovery.",
			);

			builder = builder.danger_accept_invalid_certs(true).danger_accept_invalid_hostnames(true);
		}

		let http = builder.build().map_err(ConfigError::http_client_build)?;

		Ok(Self { http })
	}

	/// Downloads and parses the provider's metadata document.
	pub async fn fetch(&self, descriptor: &ProviderDescriptor) -> Result<ProviderMetadata> {
		let provider = Some(&*descriptor.name);
		let span = StageSpan::new(Stage::Discovery, provider);

		obs::record_stage_outcome(Stage::Discovery, provider, StageOutcome::Attempt);

		let result = span.instrument(self.fetch_inner(descriptor)).await;

		obs::record_stage_result(Stage::Discovery, provider, result)
	}

	async fn fetch_inner(&self, descriptor: &ProviderDescriptor) -> Result<ProviderMetadata> {
		let url = descriptor.endpoints.server_metadata.as_ref().ok_or_else(|| {
			ConfigError::MissingMetadataUrl { provider: descriptor.name.to_string() }
		})?;
		let response = self
			.http
			.get(url.clone())
			.header(ACCEPT, "application/json")
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status();
		let body = response.bytes().await.map_err(TransportError::from)?;

		if !status.is_success() {
			return Err(TransientError::MetadataEndpoint {
				message: format!("HTTP {status} from {url}"),
				status: Some(status.as_u16()),
			}
			.into());
		}

		let de = &mut serde_json::Deserializer::from_slice(&body);
		let metadata = serde_path_to_error::deserialize(de).map_err(|source| {
			TransientError::MetadataParse { source, status: Some(status.as_u16()) }
		})?;

		Ok(metadata)
	}
}
