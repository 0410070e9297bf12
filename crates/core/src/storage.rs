//! Local/session storage synchronization.
//!
//! Structured storage access is not part of the high-level accessor API on
//! either engine family, so both families go through in-page script
//! injection here, the one operation class that does not branch its
//! behavior on the classifier (only the injection primitive differs: the
//! DOM-handle family evaluates an expression, the script-execution family
//! runs a function body that `return`s it).
//!
//! Reads iterate every index of the storage object and return a complete
//! snapshot. Writes never read back to confirm. [`clear_storage`] empties
//! local and session storage together, unconditionally; clearing only one
//! kind is not supported.

use drover_protocol::{StorageKind, StorageSnapshot};
use serde_json::Value;

use crate::classify::{EngineCapabilities, classify};
use crate::error::{Error, Result};
use crate::session::{AutomationSession, EngineFamily};

/// Writes the listed entries into `localStorage`.
pub async fn set_local_storage(handle: &dyn AutomationSession, entries: &StorageSnapshot) -> Result<()> {
	set_storage(handle, StorageKind::Local, entries).await
}

/// Writes the listed entries into `sessionStorage`.
pub async fn set_session_storage(handle: &dyn AutomationSession, entries: &StorageSnapshot) -> Result<()> {
	set_storage(handle, StorageKind::Session, entries).await
}

/// Reads a complete snapshot of `localStorage`.
pub async fn get_local_storage(handle: &dyn AutomationSession) -> Result<StorageSnapshot> {
	get_storage(handle, StorageKind::Local).await
}

/// Reads a complete snapshot of `sessionStorage`.
pub async fn get_session_storage(handle: &dyn AutomationSession) -> Result<StorageSnapshot> {
	get_storage(handle, StorageKind::Session).await
}

/// Empties both local and session storage.
pub async fn clear_storage(handle: &dyn AutomationSession) -> Result<()> {
	let expression = "(() => { localStorage.clear(); sessionStorage.clear(); return true; })()";
	inject(handle, "clearStorage", expression).await.map(|_| ())
}

async fn set_storage(handle: &dyn AutomationSession, kind: StorageKind, entries: &StorageSnapshot) -> Result<()> {
	let expression = build_set_expression(kind, entries);
	inject(handle, "setStorage", &expression).await.map(|_| ())
}

async fn get_storage(handle: &dyn AutomationSession, kind: StorageKind) -> Result<StorageSnapshot> {
	let expression = build_get_expression(kind);
	let (family, value) = inject(handle, "getStorage", &expression).await?;

	let object = value.as_object().ok_or_else(|| Error::UnexpectedValue {
		operation: "getStorage",
		family,
		message: format!("expected an object, got {value}"),
	})?;

	Ok(object
		.iter()
		.map(|(key, value)| {
			let value = match value.as_str() {
				Some(s) => s.to_string(),
				None => value.to_string(),
			};
			(key.clone(), value)
		})
		.collect())
}

/// Runs `expression` in the page through whichever injection primitive the
/// session's engine family provides, returning the family tag alongside
/// the result so callers can report it without re-classifying.
async fn inject(
	handle: &dyn AutomationSession,
	operation: &'static str,
	expression: &str,
) -> Result<(EngineFamily, Value)> {
	match classify(handle) {
		EngineCapabilities::DomHandle(dom) => dom
			.evaluate(expression)
			.await
			.map(|value| (EngineFamily::DomHandle, value))
			.map_err(|e| Error::in_operation(operation, EngineFamily::DomHandle, e)),
		EngineCapabilities::ScriptExecution(scripted) => scripted
			.execute(&format!("return ({expression});"))
			.await
			.map(|value| (EngineFamily::ScriptExecution, value))
			.map_err(|e| Error::in_operation(operation, EngineFamily::ScriptExecution, e)),
	}
}

fn build_set_expression(kind: StorageKind, entries: &StorageSnapshot) -> String {
	let object = kind.js_object();
	let mut body = String::new();

	for (key, value) in entries {
		let key = Value::String(key.clone());
		let value = Value::String(value.clone());
		body.push_str(&format!("{object}.setItem({key}, {value}); "));
	}

	format!("(() => {{ {body}return true; }})()")
}

fn build_get_expression(kind: StorageKind) -> String {
	let object = kind.js_object();

	format!(
		"(() => {{ \
const out = {{}}; \
for (let i = 0; i < {object}.length; i++) {{ \
const key = {object}.key(i); \
out[key] = {object}.getItem(key); \
}} \
return out; }})()"
	)
}
