//! Aggregate metrics produced by the network monitor and the performance
//! profiler.
//!
//! [`TrafficMetrics`] is derived on demand from the monitor's record table
//! and never cached. [`PerformanceSample`] carries engine-family-dependent
//! optional fields: memory metrics exist only for DOM-handle sessions,
//! navigation timing only for script-execution sessions. The asymmetry is
//! part of the contract; consumers must handle absence.

use serde::{Deserialize, Serialize};

/// Aggregate view over one monitoring window's request records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficMetrics {
	/// Number of distinct URLs observed.
	pub total_requests: u64,
	/// Resolved requests that completed with a status code.
	pub successful_requests: u64,
	/// Resolved requests that terminated with an error.
	pub failed_requests: u64,
	/// Mean duration of resolved requests in milliseconds; 0 when none resolved.
	pub average_response_time_ms: f64,
}

/// JavaScript heap figures, in bytes.
///
/// Absent metric names default to zero rather than failing the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryMetrics {
	/// Upper bound the engine will grow the heap to.
	pub js_heap_size_limit: f64,
	/// Currently allocated heap.
	pub js_heap_total_size: f64,
	/// Currently used portion of the heap.
	pub js_heap_used_size: f64,
}

/// Navigation-timing milestones read from `performance.timing`.
///
/// All fields are epoch milliseconds. Deserialization is lenient: fields
/// the page did not report stay `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimingSnapshot {
	/// When the navigation started.
	pub navigation_start: Option<f64>,
	/// When the last byte of the response arrived.
	pub response_end: Option<f64>,
	/// When the `DOMContentLoaded` handler finished.
	pub dom_content_loaded_event_end: Option<f64>,
	/// When the `load` handler finished.
	pub load_event_end: Option<f64>,
}

/// One bracketed profiling interval.
///
/// `duration_ms` is present only once both `start` and `stop` have run.
/// Which of the optional snapshots is populated depends on the session's
/// engine family; see the module docs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSample {
	/// Wall-clock span between `start` and `stop`, in milliseconds.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub duration_ms: Option<f64>,
	/// Heap snapshot (DOM-handle sessions only).
	#[serde(skip_serializing_if = "Option::is_none")]
	pub memory: Option<MemoryMetrics>,
	/// Navigation timing (script-execution sessions only).
	#[serde(skip_serializing_if = "Option::is_none")]
	pub timing: Option<TimingSnapshot>,
	/// Count of `link`, `script`, and `img` elements at `stop` time.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub resource_count: Option<u64>,
}
