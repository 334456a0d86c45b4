//! Consumer-side helpers applied around an external login.
//!
//! Nothing here talks to the provider's token endpoint. [`AuthorizationRequest`] prepares the
//! redirect that starts a login, and [`LoginPolicy`] applies the documented rules to the claims
//! the host obtained once the exchange finished: an `email` claim is required, the username comes
//! from `OAUTH2_USERNAME_CLAIM` (or the email), `OAUTH2_ADDITIONAL_CLAIMS` gates access, and
//! `OAUTH2_AUTO_CREATE_USER` decides whether unknown users are provisioned.

pub mod authorization;
pub mod identity;

pub use authorization::*;
pub use identity::*;

// self
use crate::{
	_prelude::*,
	auth::ProviderName,
	config::LoginConfig,
	obs::{self, Stage, StageOutcome, StageSpan},
	provider::ProviderDescriptor,
};

const EMAIL_CLAIM: &str = "email";

/// Reasons a finished external login is refused.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum LoginError {
	/// Neither the ID token nor the user-info response carries an email.
	#[error("The identity response does not include an email claim.")]
	MissingEmail,
	/// The configured username claim is absent.
	#[error("The identity response does not include the `{claim}` claim used as username.")]
	MissingUsernameClaim {
		/// Configured username claim.
		claim: String,
	},
	/// A claim exists but has an unusable shape (empty string, array or object).
	#[error("The `{claim}` claim has an unusable value.")]
	InvalidClaimType {
		/// Offending claim.
		claim: String,
	},
	/// No additional claim matched an accepted value.
	#[error("The user is not authorized by provider `{provider}`'s additional claims.")]
	ClaimsNotAuthorized {
		/// Provider name.
		provider: String,
	},
	/// The user does not exist locally and auto-provisioning is disabled.
	#[error("User `{username}` does not exist and automatic user creation is disabled.")]
	ProvisioningDisabled {
		/// Resolved username.
		username: String,
	},
	/// The `state` returned by the provider does not match the one that was sent.
	#[error("Authorization state mismatch.")]
	StateMismatch,
}

/// What the host should do with the local user record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provisioning {
	/// The user already exists; sign them in.
	Existing,
	/// The user is new and auto-creation is enabled; create, then sign in.
	Create,
}

/// Accepted login resolved from the identity claims.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
	/// Provider that authenticated the user.
	pub provider: ProviderName,
	/// Local username.
	pub username: String,
	/// Email asserted by the provider.
	pub email: String,
	/// Local user handling.
	pub provisioning: Provisioning,
}

/// Post-login rules for one provider.
#[derive(Clone, Copy, Debug)]
pub struct LoginPolicy<'a> {
	descriptor: &'a ProviderDescriptor,
	auto_create_user: bool,
}
impl<'a> LoginPolicy<'a> {
	/// Creates a policy for `descriptor`.
	pub fn new(descriptor: &'a ProviderDescriptor, auto_create_user: bool) -> Self {
		Self { descriptor, auto_create_user }
	}

	/// Provider the policy applies to.
	pub fn descriptor(&self) -> &'a ProviderDescriptor {
		self.descriptor
	}

	/// Resolves the local username: the configured claim, or the email when none is configured.
	pub fn username(&self, claims: &IdentityClaims) -> Result<String, LoginError> {
		match self.descriptor.username_claim() {
			Some(claim) => claims
				.scalar_claim(claim)?
				.ok_or_else(|| LoginError::MissingUsernameClaim { claim: claim.to_string() }),
			None => self.email(claims),
		}
	}

	/// Returns the asserted email.
	pub fn email(&self, claims: &IdentityClaims) -> Result<String, LoginError> {
		claims.string_claim(EMAIL_CLAIM)?.map(str::to_owned).ok_or(LoginError::MissingEmail)
	}

	/// Applies the additional-claims gate to either claim set.
	pub fn is_authorized(&self, claims: &IdentityClaims) -> bool {
		let gate = &self.descriptor.additional_claims;

		gate.is_satisfied_by(&claims.id_token) || gate.is_satisfied_by(&claims.userinfo)
	}

	/// Evaluates a finished login.
	///
	/// `user_exists` reports whether the host already holds a local user for the resolved
	/// username.
	pub fn evaluate(
		&self,
		claims: &IdentityClaims,
		user_exists: bool,
	) -> Result<LoginOutcome, LoginError> {
		let provider = Some(&*self.descriptor.name);
		let _guard = StageSpan::new(Stage::Login, provider).entered();

		obs::record_stage_outcome(Stage::Login, provider, StageOutcome::Attempt);
		obs::record_stage_result(Stage::Login, provider, self.evaluate_inner(claims, user_exists))
	}

	fn evaluate_inner(
		&self,
		claims: &IdentityClaims,
		user_exists: bool,
	) -> Result<LoginOutcome, LoginError> {
		let email = self.email(claims)?;
		let username = self.username(claims)?;

		if !self.is_authorized(claims) {
			return Err(LoginError::ClaimsNotAuthorized {
				provider: self.descriptor.name.to_string(),
			});
		}

		let provisioning = match (user_exists, self.auto_create_user) {
			(true, _) => Provisioning::Existing,
			(false, true) => Provisioning::Create,
			(false, false) => return Err(LoginError::ProvisioningDisabled { username }),
		};

		Ok(LoginOutcome { provider: self.descriptor.name.clone(), username, email, provisioning })
	}
}

impl LoginConfig {
	/// Returns the post-login policy for the named provider.
	pub fn login_policy(&self, provider: &str) -> Option<LoginPolicy<'_>> {
		self.provider(provider)
			.map(|descriptor| LoginPolicy::new(descriptor, self.auto_create_user()))
	}
}
