// self
use crate::{_prelude::*, obs::MessageKind};

/// A span builder used around parsing and dispatch entry points.
#[derive(Clone, Debug)]
pub struct MessageSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl MessageSpan {
	/// Creates a new span tagged with the provided stage; `kind` is recorded later.
	pub fn new(stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oauth2_messages.dispatch",
				stage,
				kind = tracing::field::Empty
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Creates a span whose message family is already known.
	pub fn with_kind(kind: MessageKind, stage: &'static str) -> Self {
		let span = Self::new(stage);

		span.record_kind(kind);

		span
	}

	/// Records the message family once discriminated.
	pub fn record_kind(&self, kind: MessageKind) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("kind", kind.as_str());
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = kind;
		}
	}

	/// Enters the span for the remainder of the synchronous section.
	pub fn entered(self) -> MessageSpanGuard {
		#[cfg(feature = "tracing")]
		{
			MessageSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			MessageSpanGuard {}
		}
	}
}

/// RAII guard returned by [`MessageSpan::entered`].
pub struct MessageSpanGuard {
	#[cfg(feature = "tracing")]
	guard: tracing::span::EnteredSpan,
}
impl MessageSpanGuard {
	/// Records the message family on the entered span.
	pub fn record_kind(&self, kind: MessageKind) {
		#[cfg(feature = "tracing")]
		{
			self.guard.record("kind", kind.as_str());
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = kind;
		}
	}
}
impl Debug for MessageSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("MessageSpanGuard(..)")
	}
}
