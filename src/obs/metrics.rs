// self
use crate::obs::{ANY_PROVIDER, Stage, StageOutcome};

/// Counts one stage outcome via the global metrics recorder (when enabled).
pub fn record_stage_outcome(stage: Stage, provider: Option<&str>, outcome: StageOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_login_stage_total",
			"stage" => stage.as_str(),
			"provider" => provider.unwrap_or(ANY_PROVIDER).to_owned(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (stage, provider.unwrap_or(ANY_PROVIDER), outcome);
	}
}

/// Counts the outcome of a finished stage and hands the result back.
pub fn record_stage_result<T, E>(
	stage: Stage,
	provider: Option<&str>,
	result: Result<T, E>,
) -> Result<T, E> {
	record_stage_outcome(stage, provider, StageOutcome::of(&result));

	result
}
