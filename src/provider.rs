//! OAuth2 provider descriptors.
//!
//! `descriptor` exposes the validated [`ProviderDescriptor`] (endpoints, credentials, scope,
//! username claim, branding, additional-claims gate, TLS flag, logout template) together with
//! its builder. `document` holds the serde model of one `OAUTH2_CONFIG` entry, written with the
//! settings file's upper-case keys, and converts it into a descriptor.

pub mod descriptor;
pub mod document;

pub use descriptor::*;
pub use document::*;
