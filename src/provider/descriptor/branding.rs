// self
use crate::{_prelude::*, provider::ProviderDescriptorError};

/// UI presentation hints for the provider's login button.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Branding {
	/// Icon class name, e.g. `fa-github`.
	pub icon: Option<String>,
	/// Button background colour.
	pub button_color: Option<ButtonColor>,
}

/// CSS hex colour in `#rgb` or `#rrggbb` form.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct ButtonColor(String);
impl ButtonColor {
	/// Validates a hex colour string.
	pub fn new(value: impl Into<String>) -> Result<Self, ProviderDescriptorError> {
		let value = value.into();
		let valid = value
			.strip_prefix('#')
			.filter(|hex| matches!(hex.len(), 3 | 6))
			.is_some_and(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()));

		if valid { Ok(Self(value)) } else { Err(ProviderDescriptorError::InvalidButtonColor { value }) }
	}

	/// Returns the colour as written in the settings.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl From<ButtonColor> for String {
	fn from(value: ButtonColor) -> Self {
		value.0
	}
}
impl Debug for ButtonColor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "ButtonColor({})", self.0)
	}
}
impl Display for ButtonColor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
