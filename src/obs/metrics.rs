// self
use crate::obs::{FlowKind, FlowOutcome, RefreshDecision};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"academy_session_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts a refresh coordinator decision via the global metrics recorder (when enabled).
pub fn record_refresh_counter(decision: RefreshDecision) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("academy_session_refresh_total", "decision" => decision.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = decision;
	}
}
