//! `${NAME}` placeholder expansion for deployment-specific settings.
//!
//! Settings documents keep values such as `${DOMAIN_DEV}`, `${REALM_ID}` or a client secret
//! reference as placeholders; they are substituted from a [`VariableSource`] before the document
//! is deserialized. A `$` that is not followed by `{` is kept verbatim.

// std
use std::env;
// self
use crate::_prelude::*;

/// Errors raised while expanding placeholders.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum PlaceholderError {
	/// A `${` sequence is never closed.
	#[error("Placeholder starting at byte {offset} is not terminated.")]
	Unterminated {
		/// Byte offset of the `$` that opened the placeholder.
		offset: usize,
	},
	/// The placeholder name is empty or contains unsupported characters.
	#[error("Placeholder name `{name}` is invalid.")]
	InvalidName {
		/// Offending name as written.
		name: String,
	},
	/// No value is available for the placeholder.
	#[error("Variable `{name}` is not defined.")]
	Undefined {
		/// Variable name.
		name: String,
	},
}

/// Lookup interface for placeholder values.
pub trait VariableSource {
	/// Returns the value bound to `name`, if any.
	fn lookup(&self, name: &str) -> Option<String>;
}
impl<T> VariableSource for &T
where
	T: ?Sized + VariableSource,
{
	fn lookup(&self, name: &str) -> Option<String> {
		(**self).lookup(name)
	}
}
impl VariableSource for BTreeMap<String, String> {
	fn lookup(&self, name: &str) -> Option<String> {
		self.get(name).cloned()
	}
}
impl VariableSource for HashMap<String, String> {
	fn lookup(&self, name: &str) -> Option<String> {
		self.get(name).cloned()
	}
}

/// Reads placeholder values from the process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;
impl VariableSource for ProcessEnv {
	fn lookup(&self, name: &str) -> Option<String> {
		env::var(name).ok()
	}
}

/// Expands every `${NAME}` occurrence in `input`.
pub fn expand<V>(input: &str, vars: &V) -> Result<String, PlaceholderError>
where
	V: ?Sized + VariableSource,
{
	let mut out = String::with_capacity(input.len());
	let mut rest = input;
	let mut consumed = 0;

	while let Some(start) = rest.find("${") {
		out.push_str(&rest[..start]);

		let body = &rest[start + 2..];
		let end = body
			.find('}')
			.ok_or(PlaceholderError::Unterminated { offset: consumed + start })?;
		let name = &body[..end];

		if !is_valid_name(name) {
			return Err(PlaceholderError::InvalidName { name: name.to_owned() });
		}

		let value =
			vars.lookup(name).ok_or_else(|| PlaceholderError::Undefined { name: name.to_owned() })?;

		out.push_str(&value);

		let advance = start + 2 + end + 1;

		consumed += advance;
		rest = &rest[advance..];
	}

	out.push_str(rest);

	Ok(out)
}

/// Expands placeholders in every string leaf of a JSON document, in place.
///
/// Object keys are left untouched. On failure the returned path names the offending value
/// using `serde_path_to_error`'s notation (`OAUTH2_CONFIG[0].OAUTH2_TOKEN_URL`).
pub fn expand_value<V>(value: &mut JsonValue, vars: &V) -> Result<(), (String, PlaceholderError)>
where
	V: ?Sized + VariableSource,
{
	let mut path = String::new();

	expand_at(value, vars, &mut path)
}

fn expand_at<V>(
	value: &mut JsonValue,
	vars: &V,
	path: &mut String,
) -> Result<(), (String, PlaceholderError)>
where
	V: ?Sized + VariableSource,
{
	match value {
		JsonValue::String(s) =>
			if s.contains("${") {
				*s = expand(s, vars).map_err(|e| (display_path(path), e))?;
			},
		JsonValue::Array(items) =>
			for (idx, item) in items.iter_mut().enumerate() {
				let mark = path.len();

				path.push_str(&format!("[{idx}]"));
				expand_at(item, vars, path)?;
				path.truncate(mark);
			},
		JsonValue::Object(map) =>
			for (key, item) in map.iter_mut() {
				let mark = path.len();

				if !path.is_empty() {
					path.push('.');
				}

				path.push_str(key);
				expand_at(item, vars, path)?;
				path.truncate(mark);
			},
		_ => {},
	}

	Ok(())
}

fn display_path(path: &str) -> String {
	if path.is_empty() { ".".to_owned() } else { path.to_owned() }
}

fn is_valid_name(name: &str) -> bool {
	let mut chars = name.chars();

	match chars.next() {
		Some(first) if first == '_' || first.is_ascii_alphabetic() =>
			chars.all(|c| c == '_' || c.is_ascii_alphanumeric()),
		_ => false,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn vars() -> BTreeMap<String, String> {
		BTreeMap::from_iter([
			("DOMAIN_DEV".to_owned(), "example.dev".to_owned()),
			("REALM_ID".to_owned(), "platform".to_owned()),
		])
	}

	#[test]
	fn expands_multiple_placeholders() {
		let expanded =
			expand("https://identity.${DOMAIN_DEV}/realms/${REALM_ID}/protocol", &vars())
				.expect("Known placeholders should expand.");

		assert_eq!(expanded, "https://identity.example.dev/realms/platform/protocol");
	}

	#[test]
	fn bare_dollar_signs_are_literal() {
		assert_eq!(
			expand("cost: $5 and $", &vars()).expect("Literal dollars are allowed."),
			"cost: $5 and $"
		);
		assert_eq!(expand("", &vars()).expect("Empty input is allowed."), "");
	}

	#[test]
	fn unterminated_placeholder_reports_offset() {
		let err = expand(
			"https://identity.${DOMAIN_DEV}/realms/${REALM_ID/protocol/openid-connect/userinfo",
			&vars(),
		)
		.expect_err("A placeholder without a closing brace must fail.");

		assert_eq!(err, PlaceholderError::Unterminated { offset: 38 });
	}

	#[test]
	fn invalid_and_undefined_names_fail() {
		assert_eq!(
			expand("${}", &vars()),
			Err(PlaceholderError::InvalidName { name: String::new() })
		);
		assert_eq!(
			expand("${1ABC}", &vars()),
			Err(PlaceholderError::InvalidName { name: "1ABC".into() })
		);
		assert_eq!(
			expand("${MISSING}", &vars()),
			Err(PlaceholderError::Undefined { name: "MISSING".into() })
		);
	}

	#[test]
	fn expanded_values_are_not_rescanned() {
		let vars = BTreeMap::from_iter([("NESTED".to_owned(), "${REALM_ID}".to_owned())]);

		assert_eq!(expand("${NESTED}", &vars).expect("Value should expand once."), "${REALM_ID}");
	}

	#[test]
	fn value_expansion_reports_json_path() {
		let mut doc = serde_json::json!({
			"OAUTH2_CONFIG": [
				{ "OAUTH2_NAME": "ok", "OAUTH2_TOKEN_URL": "https://${DOMAIN_DEV}/token" },
				{ "OAUTH2_NAME": "broken", "OAUTH2_TOKEN_URL": "https://${NOPE}/token" }
			]
		});
		let (path, err) =
			expand_value(&mut doc, &vars()).expect_err("Undefined variables must fail.");

		assert_eq!(path, "OAUTH2_CONFIG[1].OAUTH2_TOKEN_URL");
		assert_eq!(err, PlaceholderError::Undefined { name: "NOPE".into() });
		assert_eq!(doc["OAUTH2_CONFIG"][0]["OAUTH2_TOKEN_URL"], "https://example.dev/token");
	}

	#[test]
	fn process_env_reads_environment() {
		let path = ProcessEnv.lookup("PATH");

		assert_eq!(path, env::var("PATH").ok());
		assert_eq!(ProcessEnv.lookup("OAUTH2_LOGIN_SURELY_UNDEFINED_VARIABLE"), None);
	}
}
