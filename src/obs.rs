//! Optional observability helpers.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit `oauth2_login.stage` spans carrying `stage` and `provider`
//!   fields, plus `warn!` events for risky settings and endpoint drift.
//! - Enable `metrics` to increment the `oauth2_login_stage_total` counter, labeled by `stage`,
//!   `provider` and `outcome`.
//!
//! Stages that are not tied to one provider (settings loading) report the provider as
//! [`ANY_PROVIDER`].

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Provider label used by stages that span every provider.
pub const ANY_PROVIDER: &str = "*";

/// Stages observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// Settings loading and validation.
	Load,
	/// OIDC server metadata discovery.
	Discovery,
	/// Post-login policy evaluation.
	Login,
}
impl Stage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::Load => "load",
			Stage::Discovery => "discovery",
			Stage::Login => "login",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl StageOutcome {
	/// Maps a finished stage to `Success` or `Failure`.
	pub fn of<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { StageOutcome::Success } else { StageOutcome::Failure }
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Failure => "failure",
		}
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
