//! Network-activity monitoring with aggregate metrics.
//!
//! A [`NetworkMonitor`] attaches to one session's request lifecycle and
//! keeps a record table keyed by exact URL. A URL seen twice within one
//! monitoring window overwrites its prior record: monitoring assumes at
//! most one in-flight request per exact URL.
//!
//! The two engine families offer very different instrumentation:
//!
//! - DOM-handle sessions raise started/finished/failed events directly on
//!   the handle, so records resolve to a status code or an error text.
//! - Script-execution sessions only expose a debug-protocol channel with a
//!   "request about to be sent" event; completion and failure events are
//!   not available, so records from these sessions stay unresolved. This
//!   is a documented asymmetry, not a bug.
//!
//! Instantiate one monitor per session handle; sharing an instance across
//! handles corrupts its record table.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use drover_protocol::TrafficMetrics;

use crate::classify::{EngineCapabilities, classify};
use crate::error::{Error, Result};
use crate::session::{AutomationSession, EngineFamily, RequestEvent};

/// One observed request, keyed by its exact URL in the monitor's table.
#[derive(Debug, Clone)]
pub struct RequestRecord {
	/// HTTP method of the request.
	pub method: String,
	/// Request headers as sent.
	pub headers: HashMap<String, String>,
	/// When the request was issued.
	pub started_at: Instant,
	/// Terminal state, once the request resolves.
	pub outcome: Option<RequestOutcome>,
}

/// Terminal state of a resolved request.
#[derive(Debug, Clone)]
pub enum RequestOutcome {
	/// The request completed with a response.
	Success {
		/// HTTP status code.
		status: u16,
		/// When the response finished.
		at: Instant,
	},
	/// The request terminated without a response.
	Failure {
		/// Engine-reported error text.
		error: String,
		/// When the failure was reported.
		at: Instant,
	},
}

impl RequestOutcome {
	fn at(&self) -> Instant {
		match self {
			Self::Success { at, .. } | Self::Failure { at, .. } => *at,
		}
	}
}

/// Records a session's request traffic and derives aggregate metrics.
#[derive(Default)]
pub struct NetworkMonitor {
	records: Arc<Mutex<HashMap<String, RequestRecord>>>,
	ingest_task: Mutex<Option<JoinHandle<()>>>,
}

impl NetworkMonitor {
	/// Creates a detached monitor with an empty record table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Attaches to the session's request lifecycle.
	///
	/// Call exactly once per monitoring window; attaching the same monitor
	/// twice is undefined. Attach failures propagate so the caller knows
	/// metrics will be absent rather than silently empty.
	pub async fn attach(&self, handle: &dyn AutomationSession) -> Result<()> {
		let task = match classify(handle) {
			EngineCapabilities::DomHandle(dom) => {
				let events = dom.request_events();
				self.spawn_request_ingest(events)
			}
			EngineCapabilities::ScriptExecution(scripted) => {
				let protocol = scripted.protocol_session().await.map_err(|e| Error::MonitorAttach {
					family: EngineFamily::ScriptExecution,
					message: e.to_string(),
				})?;

				protocol
					.execute("Network.enable", serde_json::json!({}))
					.await
					.map_err(|e| Error::MonitorAttach {
						family: EngineFamily::ScriptExecution,
						message: e.to_string(),
					})?;

				let events = protocol.events();
				self.spawn_protocol_ingest(events, protocol)
			}
		};

		*self.ingest_task.lock() = Some(task);
		Ok(())
	}

	/// Derives the current traffic metrics by scanning the full record
	/// table. Recomputed on every call, never cached.
	pub fn metrics(&self) -> TrafficMetrics {
		let records = self.records.lock();

		let mut successful = 0u64;
		let mut failed = 0u64;
		let mut resolved = 0u64;
		let mut total_duration_ms = 0.0f64;

		for record in records.values() {
			let Some(outcome) = &record.outcome else {
				continue;
			};

			match outcome {
				RequestOutcome::Success { .. } => successful += 1,
				RequestOutcome::Failure { .. } => failed += 1,
			}

			resolved += 1;
			total_duration_ms += outcome.at().duration_since(record.started_at).as_secs_f64() * 1000.0;
		}

		TrafficMetrics {
			total_requests: records.len() as u64,
			successful_requests: successful,
			failed_requests: failed,
			average_response_time_ms: if resolved == 0 { 0.0 } else { total_duration_ms / resolved as f64 },
		}
	}

	/// Returns a snapshot of the record table for diagnostics.
	pub fn records(&self) -> HashMap<String, RequestRecord> {
		self.records.lock().clone()
	}

	/// Empties the record table without detaching from the session.
	pub fn clear(&self) {
		self.records.lock().clear();
	}

	fn spawn_request_ingest(&self, mut events: broadcast::Receiver<RequestEvent>) -> JoinHandle<()> {
		let records = Arc::clone(&self.records);

		tokio::spawn(async move {
			loop {
				match events.recv().await {
					Ok(event) => ingest(&records, event),
					Err(broadcast::error::RecvError::Lagged(n)) => {
						tracing::warn!(dropped = n, "Request event receiver lagged");
					}
					Err(broadcast::error::RecvError::Closed) => break,
				}
			}
		})
	}

	fn spawn_protocol_ingest(
		&self,
		mut events: broadcast::Receiver<crate::session::ProtocolEvent>,
		protocol: Arc<dyn crate::session::ProtocolSession>,
	) -> JoinHandle<()> {
		let records = Arc::clone(&self.records);

		tokio::spawn(async move {
			// Keep the protocol channel open for the lifetime of the window.
			let _protocol = protocol;

			loop {
				match events.recv().await {
					Ok(event) => {
						if event.method != "Network.requestWillBeSent" {
							continue;
						}

						if let Some(started) = started_event_from_protocol(&event.params) {
							ingest(&records, started);
						}
					}
					Err(broadcast::error::RecvError::Lagged(n)) => {
						tracing::warn!(dropped = n, "Protocol event receiver lagged");
					}
					Err(broadcast::error::RecvError::Closed) => break,
				}
			}
		})
	}
}

impl Drop for NetworkMonitor {
	fn drop(&mut self) {
		if let Some(task) = self.ingest_task.lock().take() {
			task.abort();
		}
	}
}

/// Applies one lifecycle event to the record table.
///
/// Terminal events for a URL with no open record are dropped: the only
/// ordering assumption made is that finished/failed for a URL is never
/// delivered before its started event.
fn ingest(records: &Mutex<HashMap<String, RequestRecord>>, event: RequestEvent) {
	let mut records = records.lock();

	match event {
		RequestEvent::Started { url, method, headers, at } => {
			records.insert(
				url,
				RequestRecord {
					method,
					headers,
					started_at: at,
					outcome: None,
				},
			);
		}
		RequestEvent::Finished { url, status, at } => {
			if let Some(record) = records.get_mut(&url) {
				record.outcome = Some(RequestOutcome::Success { status, at });
			} else {
				tracing::debug!(%url, "Finished event for unknown request");
			}
		}
		RequestEvent::Failed { url, error, at } => {
			if let Some(record) = records.get_mut(&url) {
				record.outcome = Some(RequestOutcome::Failure { error, at });
			} else {
				tracing::debug!(%url, "Failed event for unknown request");
			}
		}
	}
}

/// Builds a started event from a `Network.requestWillBeSent` payload.
fn started_event_from_protocol(params: &Value) -> Option<RequestEvent> {
	let request = params.get("request")?;
	let url = request.get("url")?.as_str()?.to_string();
	let method = request.get("method").and_then(|m| m.as_str()).unwrap_or("GET").to_string();

	let headers = request
		.get("headers")
		.and_then(|h| h.as_object())
		.map(|object| {
			object
				.iter()
				.filter_map(|(name, value)| Some((name.clone(), value.as_str()?.to_string())))
				.collect()
		})
		.unwrap_or_default();

	Some(RequestEvent::Started {
		url,
		method,
		headers,
		at: Instant::now(),
	})
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;

	fn started(url: &str, at: Instant) -> RequestEvent {
		RequestEvent::Started {
			url: url.to_string(),
			method: "GET".to_string(),
			headers: HashMap::new(),
			at,
		}
	}

	#[test]
	fn test_metrics_empty_table() {
		let monitor = NetworkMonitor::new();
		let metrics = monitor.metrics();

		assert_eq!(metrics.total_requests, 0);
		assert_eq!(metrics.average_response_time_ms, 0.0);
	}

	#[test]
	fn test_single_successful_request() {
		let monitor = NetworkMonitor::new();
		let start = Instant::now();

		ingest(&monitor.records, started("https://x/a", start));
		ingest(
			&monitor.records,
			RequestEvent::Finished {
				url: "https://x/a".to_string(),
				status: 200,
				at: start + Duration::from_millis(150),
			},
		);

		let metrics = monitor.metrics();
		assert_eq!(metrics.total_requests, 1);
		assert_eq!(metrics.successful_requests, 1);
		assert_eq!(metrics.failed_requests, 0);
		assert!((metrics.average_response_time_ms - 150.0).abs() < 1.0);
	}

	#[test]
	fn test_failed_request() {
		let monitor = NetworkMonitor::new();
		let start = Instant::now();

		ingest(&monitor.records, started("https://x/b", start));
		ingest(
			&monitor.records,
			RequestEvent::Failed {
				url: "https://x/b".to_string(),
				error: "net::ERR".to_string(),
				at: start + Duration::from_millis(20),
			},
		);

		let metrics = monitor.metrics();
		assert_eq!(metrics.failed_requests, 1);
		assert_eq!(metrics.successful_requests, 0);
	}

	#[test]
	fn test_unresolved_requests_do_not_skew_average() {
		let monitor = NetworkMonitor::new();
		let start = Instant::now();

		ingest(&monitor.records, started("https://x/open", start));
		ingest(&monitor.records, started("https://x/done", start));
		ingest(
			&monitor.records,
			RequestEvent::Finished {
				url: "https://x/done".to_string(),
				status: 204,
				at: start + Duration::from_millis(100),
			},
		);

		let metrics = monitor.metrics();
		assert_eq!(metrics.total_requests, 2);
		assert!(metrics.successful_requests + metrics.failed_requests <= metrics.total_requests);
		assert!((metrics.average_response_time_ms - 100.0).abs() < 1.0);
	}

	#[test]
	fn test_average_zero_when_nothing_resolved() {
		let monitor = NetworkMonitor::new();
		ingest(&monitor.records, started("https://x/open", Instant::now()));

		assert_eq!(monitor.metrics().average_response_time_ms, 0.0);
	}

	#[test]
	fn test_repeated_url_overwrites_record() {
		let monitor = NetworkMonitor::new();
		let start = Instant::now();

		ingest(&monitor.records, started("https://x/a", start));
		ingest(
			&monitor.records,
			RequestEvent::Finished {
				url: "https://x/a".to_string(),
				status: 200,
				at: start + Duration::from_millis(10),
			},
		);
		ingest(&monitor.records, started("https://x/a", start + Duration::from_millis(50)));

		let metrics = monitor.metrics();
		assert_eq!(metrics.total_requests, 1);
		assert_eq!(metrics.successful_requests, 0);
	}

	#[test]
	fn test_terminal_event_without_start_is_dropped() {
		let monitor = NetworkMonitor::new();

		ingest(
			&monitor.records,
			RequestEvent::Finished {
				url: "https://x/ghost".to_string(),
				status: 200,
				at: Instant::now(),
			},
		);

		assert_eq!(monitor.metrics().total_requests, 0);
	}

	#[test]
	fn test_clear_empties_table() {
		let monitor = NetworkMonitor::new();
		ingest(&monitor.records, started("https://x/a", Instant::now()));

		monitor.clear();
		assert_eq!(monitor.metrics().total_requests, 0);
	}

	#[test]
	fn test_started_event_from_protocol_payload() {
		let params = serde_json::json!({
			"request": {
				"url": "https://x/api",
				"method": "POST",
				"headers": { "Accept": "application/json" }
			}
		});

		let Some(RequestEvent::Started { url, method, headers, .. }) = started_event_from_protocol(&params) else {
			panic!("expected a started event");
		};

		assert_eq!(url, "https://x/api");
		assert_eq!(method, "POST");
		assert_eq!(headers["Accept"], "application/json");
	}

	#[test]
	fn test_protocol_payload_without_url_is_ignored() {
		let params = serde_json::json!({ "request": { "method": "GET" } });
		assert!(started_event_from_protocol(&params).is_none());
	}
}
