//! Testing infrastructure for the session utilities.
//!
//! Provides mock session implementations for exercising the utilities
//! without spawning actual browsers:
//!
//! - [`MockDomSession`]: a DOM-handle family session with an in-memory
//!   cookie store, captured scripts and pointer movements, and a request
//!   event injector.
//! - [`MockScriptSession`]: a script-execution family session that records
//!   every executed script and replays canned return values.
//! - [`MockProtocolSession`]: a debug-protocol channel with per-command
//!   canned results and an event injector.
//!
//! Mocks capture what was asked of them; tests assert on the captures and
//! feed canned values for reads.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;

use drover_protocol::{Cookie, Viewport};

use crate::error::{Error, Result};
use crate::session::{
	AutomationSession, DomSession, ProtocolEvent, ProtocolSession, RequestEvent, ScriptSession,
};

/// Mock session for the DOM-handle engine family.
pub struct MockDomSession {
	url: Mutex<String>,
	cookie_store: Mutex<Vec<Cookie>>,
	viewport: Mutex<Option<Viewport>>,
	eval_results: Mutex<VecDeque<Value>>,
	eval_error: Mutex<Option<String>>,
	evaluated: Mutex<Vec<String>>,
	pointer_moves: Mutex<Vec<(f64, f64, u32)>>,
	request_tx: broadcast::Sender<RequestEvent>,
	protocol: Arc<MockProtocolSession>,
}

impl MockDomSession {
	/// Creates a mock with an empty cookie store and a default URL.
	pub fn new() -> Arc<Self> {
		let (request_tx, _) = broadcast::channel(256);

		Arc::new(Self {
			url: Mutex::new("https://example.com/".to_string()),
			cookie_store: Mutex::new(Vec::new()),
			viewport: Mutex::new(Some(Viewport { width: 1280, height: 720 })),
			eval_results: Mutex::new(VecDeque::new()),
			eval_error: Mutex::new(None),
			evaluated: Mutex::new(Vec::new()),
			pointer_moves: Mutex::new(Vec::new()),
			request_tx,
			protocol: MockProtocolSession::new(),
		})
	}

	/// Sets the URL the session reports.
	pub fn set_url(&self, url: &str) {
		*self.url.lock().unwrap() = url.to_string();
	}

	/// Sets the viewport the session reports; `None` means undetermined.
	pub fn set_viewport(&self, viewport: Option<Viewport>) {
		*self.viewport.lock().unwrap() = viewport;
	}

	/// Queues a canned result for the next `evaluate` call.
	pub fn push_eval_result(&self, value: Value) {
		self.eval_results.lock().unwrap().push_back(value);
	}

	/// Makes every subsequent `evaluate` call fail with the given message.
	pub fn fail_evaluations(&self, message: &str) {
		*self.eval_error.lock().unwrap() = Some(message.to_string());
	}

	/// Scripts evaluated so far, in order.
	pub fn evaluated_scripts(&self) -> Vec<String> {
		self.evaluated.lock().unwrap().clone()
	}

	/// Pointer movements performed so far.
	pub fn pointer_moves(&self) -> Vec<(f64, f64, u32)> {
		self.pointer_moves.lock().unwrap().clone()
	}

	/// Injects a request lifecycle event as the engine would raise it.
	pub fn emit_request(&self, event: RequestEvent) {
		let _ = self.request_tx.send(event);
	}

	/// The protocol channel this session hands out.
	pub fn protocol(&self) -> Arc<MockProtocolSession> {
		Arc::clone(&self.protocol)
	}
}

#[async_trait]
impl DomSession for MockDomSession {
	async fn evaluate(&self, expression: &str) -> Result<Value> {
		self.evaluated.lock().unwrap().push(expression.to_string());

		if let Some(message) = self.eval_error.lock().unwrap().clone() {
			return Err(Error::Driver(message));
		}

		Ok(self.eval_results.lock().unwrap().pop_front().unwrap_or(Value::Null))
	}

	async fn url(&self) -> Result<String> {
		Ok(self.url.lock().unwrap().clone())
	}

	async fn cookies(&self) -> Result<Vec<Cookie>> {
		Ok(self.cookie_store.lock().unwrap().clone())
	}

	async fn add_cookie(&self, cookie: Cookie) -> Result<()> {
		let mut store = self.cookie_store.lock().unwrap();
		store.retain(|existing| existing.name != cookie.name);
		store.push(cookie);
		Ok(())
	}

	async fn delete_cookie(&self, name: &str) -> Result<()> {
		self.cookie_store.lock().unwrap().retain(|cookie| cookie.name != name);
		Ok(())
	}

	async fn viewport(&self) -> Result<Option<Viewport>> {
		Ok(*self.viewport.lock().unwrap())
	}

	async fn move_mouse(&self, x: f64, y: f64, steps: u32) -> Result<()> {
		self.pointer_moves.lock().unwrap().push((x, y, steps));
		Ok(())
	}

	fn request_events(&self) -> broadcast::Receiver<RequestEvent> {
		self.request_tx.subscribe()
	}

	async fn protocol_session(&self) -> Result<Arc<dyn ProtocolSession>> {
		Ok(Arc::clone(&self.protocol) as Arc<dyn ProtocolSession>)
	}
}

impl AutomationSession for MockDomSession {
	fn dom(&self) -> Option<&dyn DomSession> {
		Some(self)
	}
}

/// Mock session for the script-execution engine family.
pub struct MockScriptSession {
	scripts: Mutex<Vec<String>>,
	results: Mutex<VecDeque<Value>>,
	execute_error: Mutex<Option<String>>,
	protocol: Arc<MockProtocolSession>,
}

impl MockScriptSession {
	/// Creates a mock that returns `null` for every script by default.
	pub fn new() -> Arc<Self> {
		Arc::new(Self {
			scripts: Mutex::new(Vec::new()),
			results: Mutex::new(VecDeque::new()),
			execute_error: Mutex::new(None),
			protocol: MockProtocolSession::new(),
		})
	}

	/// Queues a canned return value for the next executed script.
	pub fn push_result(&self, value: Value) {
		self.results.lock().unwrap().push_back(value);
	}

	/// Makes every subsequent script execution fail with the given message.
	pub fn fail_executions(&self, message: &str) {
		*self.execute_error.lock().unwrap() = Some(message.to_string());
	}

	/// Scripts executed so far, in order.
	pub fn executed_scripts(&self) -> Vec<String> {
		self.scripts.lock().unwrap().clone()
	}

	/// The protocol channel this session hands out.
	pub fn protocol(&self) -> Arc<MockProtocolSession> {
		Arc::clone(&self.protocol)
	}
}

#[async_trait]
impl ScriptSession for MockScriptSession {
	async fn execute(&self, script: &str) -> Result<Value> {
		self.scripts.lock().unwrap().push(script.to_string());

		if let Some(message) = self.execute_error.lock().unwrap().clone() {
			return Err(Error::Driver(message));
		}

		Ok(self.results.lock().unwrap().pop_front().unwrap_or(Value::Null))
	}

	async fn protocol_session(&self) -> Result<Arc<dyn ProtocolSession>> {
		Ok(Arc::clone(&self.protocol) as Arc<dyn ProtocolSession>)
	}
}

impl AutomationSession for MockScriptSession {
	fn scripted(&self) -> Option<&dyn ScriptSession> {
		Some(self)
	}
}

/// Mock debug-protocol channel.
pub struct MockProtocolSession {
	commands: Mutex<Vec<(String, Value)>>,
	results: Mutex<HashMap<String, Value>>,
	failing_command: Mutex<Option<String>>,
	event_tx: broadcast::Sender<ProtocolEvent>,
}

impl MockProtocolSession {
	/// Creates a mock channel that answers `{}` to every command.
	pub fn new() -> Arc<Self> {
		let (event_tx, _) = broadcast::channel(256);

		Arc::new(Self {
			commands: Mutex::new(Vec::new()),
			results: Mutex::new(HashMap::new()),
			failing_command: Mutex::new(None),
			event_tx,
		})
	}

	/// Sets the canned result for a named command.
	pub fn set_result(&self, method: &str, result: Value) {
		self.results.lock().unwrap().insert(method.to_string(), result);
	}

	/// Makes the named command fail when executed.
	pub fn fail_command(&self, method: &str) {
		*self.failing_command.lock().unwrap() = Some(method.to_string());
	}

	/// Commands executed so far, in order.
	pub fn commands(&self) -> Vec<(String, Value)> {
		self.commands.lock().unwrap().clone()
	}

	/// Injects a protocol event as the engine would raise it.
	pub fn emit(&self, method: &str, params: Value) {
		let _ = self.event_tx.send(ProtocolEvent {
			method: method.to_string(),
			params,
		});
	}
}

#[async_trait]
impl ProtocolSession for MockProtocolSession {
	async fn execute(&self, method: &str, params: Value) -> Result<Value> {
		self.commands.lock().unwrap().push((method.to_string(), params));

		if self.failing_command.lock().unwrap().as_deref() == Some(method) {
			return Err(Error::Driver(format!("command '{method}' rejected")));
		}

		Ok(self
			.results
			.lock()
			.unwrap()
			.get(method)
			.cloned()
			.unwrap_or_else(|| serde_json::json!({})))
	}

	fn events(&self) -> broadcast::Receiver<ProtocolEvent> {
		self.event_tx.subscribe()
	}
}
