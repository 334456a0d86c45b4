//! Crate-level error types shared by the loader, login helpers, and discovery client.

// std
use std::path::PathBuf;
// self
use crate::{
	_prelude::*, login::LoginError, placeholder::PlaceholderError,
	provider::ProviderDescriptorError,
};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure; retry with backoff.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// A finished external login was refused by the configured policy.
	#[error(transparent)]
	Login(#[from] LoginError),
}

/// Configuration and validation failures raised while loading settings.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Settings file could not be read.
	#[error("Failed to read settings file {}.", .path.display())]
	Read {
		/// Path that failed to load.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Settings document does not match the expected schema.
	#[error("Settings document is malformed at `{}`.", .0.path())]
	Parse(#[from] serde_path_to_error::Error<serde_json::Error>),
	/// A `${VAR}` placeholder could not be expanded.
	#[error("Placeholder expansion failed at `{path}`.")]
	Placeholder {
		/// JSON path of the offending string value.
		path: String,
		/// Underlying expansion failure.
		#[source]
		source: PlaceholderError,
	},
	/// The `oauth2` source is enabled but no provider is declared.
	#[error("The oauth2 authentication source is enabled but OAUTH2_CONFIG is empty.")]
	MissingProviders,
	/// Two providers share the same `OAUTH2_NAME`.
	#[error("Provider `{name}` is declared more than once.")]
	DuplicateProvider {
		/// Duplicated provider name.
		name: String,
	},
	/// A provider entry failed validation.
	#[error("Provider at index {index} is invalid.")]
	Descriptor {
		/// Position of the entry inside `OAUTH2_CONFIG`.
		index: usize,
		/// Underlying descriptor failure.
		#[source]
		source: ProviderDescriptorError,
	},
	/// Discovery was requested for a provider without `OAUTH2_SERVER_METADATA_URL`.
	#[error("Provider `{provider}` does not declare a server metadata URL.")]
	MissingMetadataUrl {
		/// Provider name.
		provider: String,
	},
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Rendered end-session URL cannot be parsed.
	#[error("Logout URL is invalid.")]
	InvalidLogoutUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Metadata endpoint answered with a non-success status.
	#[error("Metadata endpoint returned an unexpected response: {message}.")]
	MetadataEndpoint {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Metadata endpoint responded with JSON that could not be parsed.
	#[error("Metadata endpoint returned malformed JSON.")]
	MetadataParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the metadata endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for TransportError {
	fn from(e: reqwest::Error) -> Self {
		Self::network(e)
	}
}
