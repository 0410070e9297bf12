//! Session performance profiling.
//!
//! A [`PerformanceProfiler`] brackets one work interval with
//! [`start`](PerformanceProfiler::start) and
//! [`stop`](PerformanceProfiler::stop), capturing whatever the session's
//! engine family can report:
//!
//! - DOM-handle sessions expose heap figures through the debug protocol's
//!   performance domain, so the sample carries [`MemoryMetrics`].
//! - Script-execution sessions have no standard heap access path; the
//!   navigation-timing object is read via script injection instead, so
//!   those samples carry a [`TimingSnapshot`].
//!
//! One profiler per session handle; instances are not shared.

use std::time::Instant;

use serde::Deserialize;

use drover_protocol::{MemoryMetrics, PerformanceSample, TimingSnapshot};

use crate::classify::{EngineCapabilities, classify};
use crate::error::{Error, Result};
use crate::session::{AutomationSession, EngineFamily};

const RESOURCE_COUNT_EXPRESSION: &str = "document.querySelectorAll('link, script, img').length";

/// Brackets a work interval and captures memory/timing snapshots.
#[derive(Default)]
pub struct PerformanceProfiler {
	started_at: Option<Instant>,
	ended_at: Option<Instant>,
	memory: Option<MemoryMetrics>,
	timing: Option<TimingSnapshot>,
	resource_count: Option<u64>,
}

impl PerformanceProfiler {
	/// Creates an idle profiler.
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts a profiling interval, discarding any previous one.
	pub async fn start(&mut self, handle: &dyn AutomationSession) -> Result<()> {
		*self = Self {
			started_at: Some(Instant::now()),
			..Self::default()
		};

		match classify(handle) {
			EngineCapabilities::DomHandle(dom) => {
				let memory = snapshot_memory(dom)
					.await
					.map_err(|e| Error::in_operation("profilerStart", EngineFamily::DomHandle, e))?;
				self.memory = Some(memory);
			}
			EngineCapabilities::ScriptExecution(scripted) => {
				let value = scripted
					.execute("return JSON.parse(JSON.stringify(performance.timing));")
					.await
					.map_err(|e| Error::in_operation("profilerStart", EngineFamily::ScriptExecution, e))?;
				let timing = serde_json::from_value(value).map_err(|e| {
					Error::in_operation("profilerStart", EngineFamily::ScriptExecution, Error::Json(e))
				})?;
				self.timing = Some(timing);
			}
		}

		Ok(())
	}

	/// Ends the profiling interval and returns the captured sample.
	///
	/// # Errors
	///
	/// Returns [`Error::ProfilerNotStarted`] when called before
	/// [`start`](Self::start).
	pub async fn stop(&mut self, handle: &dyn AutomationSession) -> Result<PerformanceSample> {
		if self.started_at.is_none() {
			return Err(Error::ProfilerNotStarted);
		}

		self.ended_at = Some(Instant::now());
		self.resource_count = count_resources(handle).await;

		Ok(self.metrics())
	}

	/// Returns the sample as currently populated.
	///
	/// `duration_ms` is present only once both `start` and `stop` have run;
	/// memory and timing fields stay absent for the engine family that does
	/// not produce them.
	pub fn metrics(&self) -> PerformanceSample {
		let duration_ms = match (self.started_at, self.ended_at) {
			(Some(start), Some(end)) => Some(end.duration_since(start).as_secs_f64() * 1000.0),
			_ => None,
		};

		PerformanceSample {
			duration_ms,
			memory: self.memory,
			timing: self.timing,
			resource_count: self.resource_count,
		}
	}
}

/// Reads heap figures through the debug protocol's performance domain.
///
/// Metric names absent from the response default to zero.
async fn snapshot_memory(dom: &dyn crate::session::DomSession) -> Result<MemoryMetrics> {
	#[derive(Deserialize)]
	struct MetricsResponse {
		#[serde(default)]
		metrics: Vec<NamedMetric>,
	}

	#[derive(Deserialize)]
	struct NamedMetric {
		name: String,
		value: f64,
	}

	let protocol = dom.protocol_session().await?;
	protocol.execute("Performance.enable", serde_json::json!({})).await?;

	let response = protocol.execute("Performance.getMetrics", serde_json::json!({})).await?;
	let response: MetricsResponse = serde_json::from_value(response)?;

	let named = |name: &str| {
		response
			.metrics
			.iter()
			.find(|metric| metric.name == name)
			.map(|metric| metric.value)
			.unwrap_or(0.0)
	};

	Ok(MemoryMetrics {
		js_heap_size_limit: named("JSHeapSizeLimit"),
		js_heap_total_size: named("JSHeapTotalSize"),
		js_heap_used_size: named("JSHeapUsedSize"),
	})
}

/// Counts link/script/image elements via the family's injection path.
///
/// A failed lookup is recovered to absence rather than failing the stop.
async fn count_resources(handle: &dyn AutomationSession) -> Option<u64> {
	let result = match classify(handle) {
		EngineCapabilities::DomHandle(dom) => dom.evaluate(RESOURCE_COUNT_EXPRESSION).await,
		EngineCapabilities::ScriptExecution(scripted) => {
			scripted.execute(&format!("return ({RESOURCE_COUNT_EXPRESSION});")).await
		}
	};

	match result {
		Ok(value) => value.as_u64().or_else(|| value.as_f64().map(|count| count as u64)),
		Err(error) => {
			tracing::warn!(%error, "Resource count lookup failed");
			None
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_metrics_before_start_has_no_duration() {
		let profiler = PerformanceProfiler::new();
		let sample = profiler.metrics();

		assert!(sample.duration_ms.is_none());
		assert!(sample.memory.is_none());
		assert!(sample.timing.is_none());
	}

	#[test]
	fn test_duration_requires_both_timestamps() {
		let profiler = PerformanceProfiler {
			started_at: Some(Instant::now()),
			..Default::default()
		};

		assert!(profiler.metrics().duration_ms.is_none());
	}

	#[test]
	fn test_duration_non_negative_once_stopped() {
		let start = Instant::now();
		let profiler = PerformanceProfiler {
			started_at: Some(start),
			ended_at: Some(start + std::time::Duration::from_millis(5)),
			..Default::default()
		};

		let duration = profiler.metrics().duration_ms.unwrap();
		assert!(duration >= 0.0);
	}
}
