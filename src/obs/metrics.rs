// self
use crate::obs::{MessageKind, MessageOutcome};

/// Records a message outcome via the global metrics recorder and the tracing subscriber
/// (when enabled).
pub fn record_outcome(kind: MessageKind, outcome: MessageOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_messages_total",
			"kind" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			kind = kind.as_str(),
			outcome = outcome.as_str(),
			"message outcome recorded"
		);
	}

	#[cfg(not(any(feature = "metrics", feature = "tracing")))]
	{
		let _ = (kind, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_outcome_noop_without_recorder() {
		record_outcome(MessageKind::Authorization, MessageOutcome::Failure);
	}
}
