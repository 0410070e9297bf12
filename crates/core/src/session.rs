//! The capability-polymorphic session contract.
//!
//! A scraping orchestrator may drive pages through structurally different
//! automation engines: one family exposes direct accessor methods on the
//! page handle ([`DomSession`]), the other exposes nothing but a single
//! execute-script-in-page primitive ([`ScriptSession`]). No static type
//! spans both, so the handle passed into every utility is an opaque
//! [`AutomationSession`] trait object, and each utility asks the
//! [classifier](crate::classify) which family backs it before doing
//! anything else.
//!
//! Sessions are created and destroyed entirely outside this crate. Exactly
//! one engine family backs a given handle for its whole lifetime, and
//! exactly one logical task drives a handle at a time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use downcast_rs::{DowncastSync, impl_downcast};
use serde_json::Value;
use tokio::sync::broadcast;

use drover_protocol::{Cookie, Viewport};

use crate::error::Result;

/// Caller-owned reference to a live browser page under automation.
pub type SessionHandle = Arc<dyn AutomationSession>;

/// Opaque handle to a live browser session.
///
/// Implementations override exactly one of the capability accessors.
/// A handle overriding neither is malformed and will make the
/// [classifier](crate::classify::classify) panic.
pub trait AutomationSession: DowncastSync {
	/// Returns the DOM-handle capability surface, if this session has one.
	fn dom(&self) -> Option<&dyn DomSession> {
		None
	}

	/// Returns the script-execution capability surface, if this session has one.
	fn scripted(&self) -> Option<&dyn ScriptSession> {
		None
	}
}

impl_downcast!(sync AutomationSession);

/// Which of the two automation-API shapes a session conforms to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFamily {
	/// Direct accessor methods returning native values (evaluate, cookie
	/// list, element queries, pointer control).
	DomHandle,
	/// A single "execute script in page, return its value" primitive and
	/// nothing else.
	ScriptExecution,
}

impl std::fmt::Display for EngineFamily {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::DomHandle => write!(f, "dom-handle"),
			Self::ScriptExecution => write!(f, "script-execution"),
		}
	}
}

/// Native accessor surface of the DOM-handle engine family.
#[async_trait]
pub trait DomSession: Send + Sync {
	/// Evaluates a JavaScript expression in the page and returns its value.
	async fn evaluate(&self, expression: &str) -> Result<Value>;

	/// Returns the page's current URL.
	async fn url(&self) -> Result<String>;

	/// Lists all cookies visible to the page's current origin.
	async fn cookies(&self) -> Result<Vec<Cookie>>;

	/// Adds one cookie to the session.
	async fn add_cookie(&self, cookie: Cookie) -> Result<()>;

	/// Deletes the named cookie from the session.
	async fn delete_cookie(&self, name: &str) -> Result<()>;

	/// Returns the current viewport size, or `None` if it cannot be determined.
	async fn viewport(&self) -> Result<Option<Viewport>>;

	/// Moves the virtual pointer to `(x, y)` in the given number of
	/// discrete intermediate steps.
	async fn move_mouse(&self, x: f64, y: f64, steps: u32) -> Result<()>;

	/// Subscribes to the page's request lifecycle events.
	fn request_events(&self) -> broadcast::Receiver<RequestEvent>;

	/// Opens a debug-protocol session against the page.
	async fn protocol_session(&self) -> Result<Arc<dyn ProtocolSession>>;
}

/// The single-primitive surface of the script-execution engine family.
///
/// Higher-level operations must be expressed as injected script text. The
/// script runs as a function body, so values come back via `return`.
#[async_trait]
pub trait ScriptSession: Send + Sync {
	/// Executes a script in the page and returns the script's return value.
	async fn execute(&self, script: &str) -> Result<Value>;

	/// Opens a debug-protocol session against the page.
	async fn protocol_session(&self) -> Result<Arc<dyn ProtocolSession>>;
}

/// A lower-level debug-protocol channel to the page (CDP-style).
#[async_trait]
pub trait ProtocolSession: Send + Sync {
	/// Executes a named protocol command and returns its result object.
	async fn execute(&self, method: &str, params: Value) -> Result<Value>;

	/// Subscribes to protocol events raised on this channel.
	fn events(&self) -> broadcast::Receiver<ProtocolEvent>;
}

/// One request lifecycle transition observed on a DOM-handle session.
///
/// Delivery order follows the underlying session; the only guarantee is
/// that `Finished`/`Failed` for a URL is never observed before its
/// `Started`.
#[derive(Debug, Clone)]
pub enum RequestEvent {
	/// A request was issued.
	Started {
		/// Exact request URL.
		url: String,
		/// HTTP method.
		method: String,
		/// Request headers as sent.
		headers: HashMap<String, String>,
		/// When the request left the page.
		at: Instant,
	},
	/// A request completed with a response.
	Finished {
		/// Exact request URL.
		url: String,
		/// HTTP status code of the response.
		status: u16,
		/// When the response finished.
		at: Instant,
	},
	/// A request terminated without a response.
	Failed {
		/// Exact request URL.
		url: String,
		/// Engine-reported error text (e.g., "net::ERR_ABORTED").
		error: String,
		/// When the failure was reported.
		at: Instant,
	},
}

impl RequestEvent {
	/// The URL this event concerns.
	pub fn url(&self) -> &str {
		match self {
			Self::Started { url, .. } | Self::Finished { url, .. } | Self::Failed { url, .. } => url,
		}
	}
}

/// One event raised on a debug-protocol channel.
#[derive(Debug, Clone)]
pub struct ProtocolEvent {
	/// Protocol event name (e.g., "Network.requestWillBeSent").
	pub method: String,
	/// Event payload.
	pub params: Value,
}
