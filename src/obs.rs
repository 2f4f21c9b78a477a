//! Optional observability helpers for message parsing and dispatch.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to emit spans named `oauth2_messages.dispatch` with the `stage`
//!   (call site) and `kind` (message family) fields, plus a debug event per outcome.
//! - Enable `metrics` to increment the `oauth2_messages_total` counter for every
//!   attempt/success/failure, labeled by `kind` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Message families handled by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
	/// Authorization request/response.
	Authorization,
	/// End-session (RP-initiated logout) request/response.
	EndSession,
	/// Token revocation request/response.
	Revocation,
}
impl MessageKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			MessageKind::Authorization => "authorization",
			MessageKind::EndSession => "end_session",
			MessageKind::Revocation => "revocation",
		}
	}
}
impl Display for MessageKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageOutcome {
	/// Entry to a parsing or dispatch helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl MessageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			MessageOutcome::Attempt => "attempt",
			MessageOutcome::Success => "success",
			MessageOutcome::Failure => "failure",
		}
	}
}
impl Display for MessageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `f` inside a span for `stage`, recording attempt and outcome for `kind`.
pub(crate) fn observe<T>(
	kind: MessageKind,
	stage: &'static str,
	f: impl FnOnce() -> Result<T>,
) -> Result<T> {
	let guard = MessageSpan::new(stage).entered();

	observe_entered(&guard, kind, f)
}

/// Same as [`observe`] for callers that discriminate `kind` after entering their span.
pub(crate) fn observe_entered<T>(
	guard: &MessageSpanGuard,
	kind: MessageKind,
	f: impl FnOnce() -> Result<T>,
) -> Result<T> {
	guard.record_kind(kind);
	record_outcome(kind, MessageOutcome::Attempt);

	let result = f();

	match &result {
		Ok(_) => record_outcome(kind, MessageOutcome::Success),
		Err(_) => record_outcome(kind, MessageOutcome::Failure),
	}

	result
}
