// self
use crate::{_prelude::*, auth::ClaimName, provider::ProviderDescriptorError};

/// Accepted values per claim, checked after a successful external login.
///
/// An empty set of requirements accepts every identity. Otherwise the identity is authorized
/// as soon as one configured claim carries one accepted value; claims holding arrays match when
/// any element is accepted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ClaimRequirements(BTreeMap<ClaimName, BTreeSet<String>>);
impl ClaimRequirements {
	/// Builds requirements, rejecting claims with no accepted values.
	pub fn new<I, V, S>(entries: I) -> Result<Self, ProviderDescriptorError>
	where
		I: IntoIterator<Item = (ClaimName, V)>,
		V: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut map = BTreeMap::new();

		for (claim, values) in entries {
			let accepted = values.into_iter().map(Into::into).collect::<BTreeSet<String>>();

			if accepted.is_empty() {
				return Err(ProviderDescriptorError::EmptyClaimValues { claim: claim.to_string() });
			}

			map.entry(claim).or_insert_with(BTreeSet::new).extend(accepted);
		}

		Ok(Self(map))
	}

	/// Returns true when no additional claims are configured.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Number of gated claims.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Accepted values for `claim`, if it is gated.
	pub fn accepted(&self, claim: &str) -> Option<&BTreeSet<String>> {
		self.0.get(claim)
	}

	/// Iterator over gated claims and their accepted values.
	pub fn iter(&self) -> impl Iterator<Item = (&ClaimName, &BTreeSet<String>)> {
		self.0.iter()
	}

	/// Checks a claim set (ID token or user-info response) against the requirements.
	pub fn is_satisfied_by(&self, claims: &JsonMap<String, JsonValue>) -> bool {
		if self.is_empty() {
			return true;
		}

		self.0.iter().any(|(name, accepted)| {
			claims.get(&**name).is_some_and(|value| value_matches(value, accepted))
		})
	}
}

fn value_matches(value: &JsonValue, accepted: &BTreeSet<String>) -> bool {
	match value {
		JsonValue::Array(items) => items.iter().any(|item| scalar_matches(item, accepted)),
		other => scalar_matches(other, accepted),
	}
}

fn scalar_matches(value: &JsonValue, accepted: &BTreeSet<String>) -> bool {
	match value {
		JsonValue::String(s) => accepted.contains(s),
		JsonValue::Number(n) => accepted.contains(&n.to_string()),
		JsonValue::Bool(b) => accepted.contains(if *b { "true" } else { "false" }),
		_ => false,
	}
}
