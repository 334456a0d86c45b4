// crates.io
use url::form_urlencoded;
// self
use crate::{_prelude::*, provider::ProviderDescriptorError};

const REDIRECT_URI: &str = "redirect_uri";
const ID_TOKEN: &str = "id_token";

/// End-session URL template (`OAUTH2_LOGOUT_URL`).
///
/// The template may reference `{redirect_uri}` and `{id_token}`; both are substituted with
/// percent-encoded values when rendered. Any other `{...}` token is rejected at build time.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LogoutTemplate(String);
impl LogoutTemplate {
	/// Validates the template by checking its tokens and rendering it with sample values.
	pub fn new(template: impl Into<String>) -> Result<Self, ProviderDescriptorError> {
		let template = Self(template.into());

		for token in template.tokens() {
			if token != REDIRECT_URI && token != ID_TOKEN {
				return Err(ProviderDescriptorError::UnknownLogoutPlaceholder {
					name: token.to_owned(),
				});
			}
		}

		let sample = template.substitute("https://localhost/", "sample");
		let url = Url::parse(&sample).map_err(|source| ProviderDescriptorError::InvalidUrl {
			field: "OAUTH2_LOGOUT_URL",
			source,
		})?;

		super::builder::validate_endpoint("OAUTH2_LOGOUT_URL", &url)?;

		Ok(template)
	}

	/// Raw template as written in the settings.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns true when the template references `{id_token}`.
	pub fn wants_id_token(&self) -> bool {
		self.tokens().any(|token| token == ID_TOKEN)
	}

	/// Renders the template; a missing ID token substitutes the empty string.
	pub fn render(&self, redirect_uri: &Url, id_token: Option<&str>) -> Result<Url, url::ParseError> {
		Url::parse(&self.substitute(redirect_uri.as_str(), id_token.unwrap_or_default()))
	}

	fn substitute(&self, redirect_uri: &str, id_token: &str) -> String {
		self.0
			.replace(&format!("{{{REDIRECT_URI}}}"), &encode(redirect_uri))
			.replace(&format!("{{{ID_TOKEN}}}"), &encode(id_token))
	}

	fn tokens(&self) -> impl Iterator<Item = &str> {
		self.0.split('{').skip(1).map(|chunk| chunk.split_once('}').map_or(chunk, |(token, _)| token))
	}
}
impl Debug for LogoutTemplate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "LogoutTemplate({})", self.0)
	}
}
impl Display for LogoutTemplate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn encode(value: &str) -> String {
	form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const KEYCLOAK: &str = "https://example.com/realms/master/protocol/openid-connect/logout?post_logout_redirect_uri={redirect_uri}&id_token_hint={id_token}";

	#[test]
	fn renders_encoded_values() {
		let template = LogoutTemplate::new(KEYCLOAK).expect("Keycloak template should be valid.");
		let redirect =
			Url::parse("https://app.example.com/login?next=/browser").expect("Redirect should parse.");
		let url = template
			.render(&redirect, Some("eyJ.a+b/c"))
			.expect("Rendering a validated template should succeed.");
		let pairs = url.query_pairs().into_owned().collect::<BTreeMap<_, _>>();

		assert!(template.wants_id_token());
		assert_eq!(
			pairs.get("post_logout_redirect_uri").map(String::as_str),
			Some("https://app.example.com/login?next=/browser")
		);
		assert_eq!(pairs.get("id_token_hint").map(String::as_str), Some("eyJ.a+b/c"));
	}

	#[test]
	fn templates_without_tokens_render_verbatim() {
		let template = LogoutTemplate::new("https://idp.example.com/logout")
			.expect("Plain logout URL should be valid.");
		let redirect = Url::parse("https://app.example.com/").expect("Redirect should parse.");

		assert!(!template.wants_id_token());
		assert_eq!(
			template.render(&redirect, None).expect("Plain template should render.").as_str(),
			"https://idp.example.com/logout"
		);
	}

	#[test]
	fn rejects_unknown_tokens_and_insecure_urls() {
		assert_eq!(
			LogoutTemplate::new("https://idp.example.com/logout?state={state}"),
			Err(ProviderDescriptorError::UnknownLogoutPlaceholder { name: "state".into() })
		);
		assert!(matches!(
			LogoutTemplate::new("http://idp.example.com/logout"),
			Err(ProviderDescriptorError::InsecureEndpoint { field: "OAUTH2_LOGOUT_URL", .. })
		));
		assert!(matches!(
			LogoutTemplate::new("not a url"),
			Err(ProviderDescriptorError::InvalidUrl { field: "OAUTH2_LOGOUT_URL", .. })
		));
	}
}
