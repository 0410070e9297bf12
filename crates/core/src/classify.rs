//! Runtime capability classification of session handles.
//!
//! Because no shared static type spans the supported engines, every utility
//! starts by classifying the handle it was given and branches on the result
//! exactly once, never re-probing mid-operation. Classification only
//! inspects which capability accessor is populated; it performs no session
//! operation with side effects.

use crate::session::{AutomationSession, DomSession, EngineFamily, ScriptSession};

/// Borrowed view of the one capability surface a handle actually has.
pub enum EngineCapabilities<'a> {
	/// The handle is backed by the DOM-handle engine family.
	DomHandle(&'a dyn DomSession),
	/// The handle is backed by the script-execution engine family.
	ScriptExecution(&'a dyn ScriptSession),
}

impl EngineCapabilities<'_> {
	/// The family tag for this capability surface.
	pub fn family(&self) -> EngineFamily {
		match self {
			Self::DomHandle(_) => EngineFamily::DomHandle,
			Self::ScriptExecution(_) => EngineFamily::ScriptExecution,
		}
	}
}

/// Determines which engine family backs `handle` and returns its
/// capability surface.
///
/// # Panics
///
/// Panics if the handle exposes neither capability surface. A well-formed
/// handle always exposes exactly one for its entire lifetime, so this is a
/// programming-contract violation in the session implementation, not a
/// recoverable runtime condition.
pub fn classify(handle: &dyn AutomationSession) -> EngineCapabilities<'_> {
	if let Some(dom) = handle.dom() {
		return EngineCapabilities::DomHandle(dom);
	}

	if let Some(scripted) = handle.scripted() {
		return EngineCapabilities::ScriptExecution(scripted);
	}

	panic!("session handle matches no known engine family; the handle implementation is malformed");
}

/// Returns only the family tag for `handle`.
///
/// # Panics
///
/// Same contract as [`classify`].
pub fn engine_family(handle: &dyn AutomationSession) -> EngineFamily {
	classify(handle).family()
}
