//! Error types for the session utilities.

use thiserror::Error;

use crate::session::EngineFamily;

/// Result type alias for session utility operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a browser session.
///
/// Every propagated failure names the operation and the engine family it
/// occurred on, so callers can diagnose without inspecting internal state.
/// Retry policy belongs to the caller; nothing here retries internally.
#[derive(Debug, Error)]
pub enum Error {
	/// Engine-level failure reported by a session implementation.
	#[error("driver error: {0}")]
	Driver(String),

	/// A page-interaction operation failed on a live session.
	#[error("{operation} failed on {family} session: {message}")]
	Session {
		/// Operation that failed (e.g., "setCookies").
		operation: &'static str,
		/// Engine family the session was classified as.
		family: EngineFamily,
		/// Underlying failure text.
		message: String,
	},

	/// Network instrumentation could not attach to the session.
	///
	/// Propagated rather than swallowed: the caller must know that metrics
	/// will be absent, not silently empty.
	#[error("failed to attach network instrumentation to {family} session: {message}")]
	MonitorAttach {
		/// Engine family the session was classified as.
		family: EngineFamily,
		/// Underlying failure text.
		message: String,
	},

	/// `PerformanceProfiler::stop` was called before `start`.
	#[error("performance profiler stopped before it was started")]
	ProfilerNotStarted,

	/// The session reported a URL that could not be parsed.
	#[error("invalid session URL '{url}': {message}")]
	InvalidUrl {
		/// The URL as reported by the session.
		url: String,
		/// Parse failure text.
		message: String,
	},

	/// An injected script returned a value of an unexpected shape.
	#[error("{operation} returned an unexpected value on {family} session: {message}")]
	UnexpectedValue {
		/// Operation whose result could not be interpreted.
		operation: &'static str,
		/// Engine family the session was classified as.
		family: EngineFamily,
		/// Description of the mismatch.
		message: String,
	},

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Wraps an engine-level error with operation and family context.
	pub(crate) fn in_operation(operation: &'static str, family: EngineFamily, source: Error) -> Self {
		match source {
			// Already contextualized errors pass through untouched.
			err @ (Error::Session { .. } | Error::MonitorAttach { .. }) => err,
			other => Error::Session {
				operation,
				family,
				message: other.to_string(),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_session_error_names_operation_and_family() {
		let err = Error::Session {
			operation: "setCookies",
			family: EngineFamily::DomHandle,
			message: "page closed".to_string(),
		};

		let text = err.to_string();
		assert!(text.contains("setCookies"));
		assert!(text.contains("dom-handle"));
	}

	#[test]
	fn test_in_operation_preserves_context() {
		let inner = Error::Session {
			operation: "getCookies",
			family: EngineFamily::ScriptExecution,
			message: "boom".to_string(),
		};

		let wrapped = Error::in_operation("setCookies", EngineFamily::DomHandle, inner);
		assert!(wrapped.to_string().contains("getCookies"));
	}
}
