// self
use crate::{
	_prelude::*,
	obs::{ANY_PROVIDER, Stage},
};

/// Future returned by [`StageSpan::instrument`]; the future itself when tracing is disabled.
#[cfg(feature = "tracing")]
pub type InstrumentedStage<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`StageSpan::instrument`]; the future itself when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedStage<F> = F;

/// Span covering one stage for one provider.
#[derive(Clone, Debug)]
pub struct StageSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl StageSpan {
	/// Opens a span for `stage`; `None` means the stage covers every provider.
	pub fn new(stage: Stage, provider: Option<&str>) -> Self {
		let provider = provider.unwrap_or(ANY_PROVIDER);

		#[cfg(feature = "tracing")]
		{
			Self { span: tracing::info_span!("oauth2_login.stage", stage = stage.as_str(), provider) }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, provider);

			Self {}
		}
	}

	/// Enters the span for synchronous work.
	pub fn entered(self) -> StageSpanGuard {
		#[cfg(feature = "tracing")]
		{
			StageSpanGuard { _entered: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			StageSpanGuard {}
		}
	}

	/// Attaches the span to `fut` so no guard is held across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedStage<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			tracing::Instrument::instrument(fut, self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Keeps a [`StageSpan`] entered until dropped.
pub struct StageSpanGuard {
	#[cfg(feature = "tracing")]
	_entered: tracing::span::EnteredSpan,
}
impl Debug for StageSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("StageSpanGuard(..)")
	}
}

/// Emits a `warn!` event about one provider (when tracing is enabled).
pub fn warn(stage: Stage, provider: &str, message: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(stage = stage.as_str(), provider, "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, provider, message);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn spans_and_warnings_work_with_any_feature_set() {
		let _guard = StageSpan::new(Stage::Load, None).entered();

		warn(Stage::Load, "keycloak", "warnings never panic");
	}

	#[cfg(feature = "tracing")]
	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = StageSpan::new(Stage::Discovery, Some("keycloak"));

		assert_eq!(span.instrument(async { 42 }).await, 42);
	}
}
