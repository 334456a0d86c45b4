#![cfg(feature = "reqwest")]

// std
use std::collections::BTreeMap;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use oauth2_login::{
	config::LoginConfig,
	discovery::{DiscoveryClient, EndpointMismatch, MetadataRegistry},
	error::{Error, TransientError},
	provider::ProviderDescriptor,
};

const METADATA_PATH: &str = "/realms/platform/.well-known/openid-configuration";

fn descriptor(server: &MockServer) -> ProviderDescriptor {
	let settings = json!({
		"AUTHENTICATION_SOURCES": ["oauth2"],
		"OAUTH2_CONFIG": [{
			"OAUTH2_NAME": "keycloak",
			"OAUTH2_DISPLAY_NAME": "Keycloak",
			"OAUTH2_CLIENT_ID": "pgadmin-client",
			"OAUTH2_CLIENT_SECRET": "s3cr3t",
			"OAUTH2_TOKEN_URL": "${IDP}/realms/platform/protocol/openid-connect/token",
			"OAUTH2_AUTHORIZATION_URL": "${IDP}/realms/platform/protocol/openid-connect/auth",
			"OAUTH2_SERVER_METADATA_URL": "${IDP}/realms/platform/.well-known/openid-configuration",
			"OAUTH2_API_BASE_URL": "${IDP}/realms/platform/protocol/openid-connect",
			"OAUTH2_USERINFO_ENDPOINT": "userinfo",
			"OAUTH2_SCOPE": "openid email profile",
			"OAUTH2_SSL_CERT_VERIFICATION": false
		}]
	});
	let vars = BTreeMap::from([("IDP".to_owned(), server.base_url())]);
	let config = LoginConfig::from_value(settings, &vars)
		.expect("Mock provider settings should load successfully.");

	config.providers()[0].clone()
}

fn metadata_body(server: &MockServer) -> String {
	let realm = server.url("/realms/platform");

	json!({
		"issuer": realm,
		"authorization_endpoint": format!("{realm}/protocol/openid-connect/auth"),
		"token_endpoint": format!("{realm}/protocol/openid-connect/token"),
		"userinfo_endpoint": format!("{realm}/protocol/openid-connect/userinfo"),
		"end_session_endpoint": format!("{realm}/protocol/openid-connect/logout"),
		"scopes_supported": ["openid", "email", "profile"],
		"code_challenge_methods_supported": ["S256"]
	})
	.to_string()
}

#[tokio::test]
async fn fetch_parses_metadata_that_matches_settings() {
	let server = MockServer::start_async().await;
	let descriptor = descriptor(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(METADATA_PATH).header("accept", "application/json");
			then.status(200)
				.header("content-type", "application/json")
				.body(metadata_body(&server));
		})
		.await;
	let client =
		DiscoveryClient::for_descriptor(&descriptor).expect("Discovery client should build.");
	let metadata = client.fetch(&descriptor).await.expect("Metadata fetch should succeed.");

	mock.assert_calls_async(1).await;

	assert_eq!(metadata.issuer.as_str(), server.url("/realms/platform"));
	assert!(metadata.supports_s256());
	assert!(metadata.reconcile(&descriptor).is_empty());
}

#[tokio::test]
async fn reconcile_flags_drifted_endpoints() {
	let server = MockServer::start_async().await;
	let descriptor = descriptor(&server);
	let body = metadata_body(&server).replace("openid-connect/token", "openid-connect/token2");

	server
		.mock_async(|when, then| {
			when.method(GET).path(METADATA_PATH);
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await;

	let client =
		DiscoveryClient::for_descriptor(&descriptor).expect("Discovery client should build.");
	let metadata = client.fetch(&descriptor).await.expect("Metadata fetch should succeed.");
	let mismatches = metadata.reconcile(&descriptor);

	assert_eq!(mismatches.len(), 1);

	match &mismatches[0] {
		EndpointMismatch::Endpoint { field, advertised, .. } => {
			assert_eq!(*field, "OAUTH2_TOKEN_URL");
			assert!(advertised.path().ends_with("/token2"));
		},
		other => panic!("Unexpected mismatch: {other:?}"),
	}
}

#[tokio::test]
async fn registry_caches_documents_within_ttl() {
	let server = MockServer::start_async().await;
	let descriptor = descriptor(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(METADATA_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(metadata_body(&server));
		})
		.await;
	let registry = MetadataRegistry::new();
	let first = registry.get_or_fetch(&descriptor).await.expect("First lookup should fetch.");
	let second = registry.get_or_fetch(&descriptor).await.expect("Second lookup should hit.");

	mock.assert_calls_async(1).await;

	assert_eq!(first, second);
	assert!(registry.cached("keycloak").is_some());
	assert!(registry.invalidate("keycloak"));

	registry.get_or_fetch(&descriptor).await.expect("Lookup after invalidation should fetch.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn registry_singleflights_concurrent_lookups() {
	let server = MockServer::start_async().await;
	let descriptor = descriptor(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(METADATA_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.delay(std::time::Duration::from_millis(100))
				.body(metadata_body(&server));
		})
		.await;
	let registry = MetadataRegistry::new();
	let (a, b, c) = tokio::join!(
		registry.get_or_fetch(&descriptor),
		registry.get_or_fetch(&descriptor),
		registry.get_or_fetch(&descriptor),
	);

	a.expect("First concurrent lookup should succeed.");
	b.expect("Second concurrent lookup should succeed.");
	c.expect("Third concurrent lookup should succeed.");
	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn zero_ttl_always_refetches() {
	let server = MockServer::start_async().await;
	let descriptor = descriptor(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(METADATA_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(metadata_body(&server));
		})
		.await;
	let registry = MetadataRegistry::with_ttl(time::Duration::ZERO);

	registry.get_or_fetch(&descriptor).await.expect("First lookup should fetch.");
	registry.get_or_fetch(&descriptor).await.expect("Second lookup should fetch again.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn server_errors_are_transient() {
	let server = MockServer::start_async().await;
	let descriptor = descriptor(&server);

	server
		.mock_async(|when, then| {
			when.method(GET).path(METADATA_PATH);
			then.status(503).body("maintenance");
		})
		.await;

	let registry = MetadataRegistry::new();
	let err = registry.get_or_fetch(&descriptor).await.expect_err("503 must fail.");

	assert!(matches!(
		err,
		Error::Transient(TransientError::MetadataEndpoint { status: Some(503), .. })
	));
	assert!(registry.cached("keycloak").is_none());
}

#[tokio::test]
async fn malformed_documents_report_json_path() {
	let server = MockServer::start_async().await;
	let descriptor = descriptor(&server);

	server
		.mock_async(|when, then| {
			when.method(GET).path(METADATA_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"issuer":"https://idp.example.com","authorization_endpoint":42}"#);
		})
		.await;

	let client =
		DiscoveryClient::for_descriptor(&descriptor).expect("Discovery client should build.");
	let err = client.fetch(&descriptor).await.expect_err("Malformed metadata must fail.");

	match err {
		Error::Transient(TransientError::MetadataParse { source, status }) => {
			assert_eq!(source.path().to_string(), "authorization_endpoint");
			assert_eq!(status, Some(200));
		},
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn redirects_are_not_followed() {
	let server = MockServer::start_async().await;
	let descriptor = descriptor(&server);
	let target = server
		.mock_async(|when, then| {
			when.method(GET).path("/elsewhere");
			then.status(200)
				.header("content-type", "application/json")
				.body(metadata_body(&server));
		})
		.await;

	server
		.mock_async(|when, then| {
			when.method(GET).path(METADATA_PATH);
			then.status(302).header("location", server.url("/elsewhere"));
		})
		.await;

	let client =
		DiscoveryClient::for_descriptor(&descriptor).expect("Discovery client should build.");
	let err = client.fetch(&descriptor).await.expect_err("Redirects must not be followed.");

	assert!(matches!(
		err,
		Error::Transient(TransientError::MetadataEndpoint { status: Some(302), .. })
	));
	target.assert_calls_async(0).await;
}
