// Performance profiler tests.

use drover::profiler::PerformanceProfiler;
use drover::testing::{MockDomSession, MockScriptSession};

#[tokio::test]
async fn dom_start_snapshots_heap_metrics() {
	let session = MockDomSession::new();
	session.protocol().set_result(
		"Performance.getMetrics",
		serde_json::json!({
			"metrics": [
				{ "name": "JSHeapUsedSize", "value": 1000.0 },
				{ "name": "JSHeapTotalSize", "value": 4000.0 },
				{ "name": "Documents", "value": 2.0 }
			]
		}),
	);

	let mut profiler = PerformanceProfiler::new();
	profiler.start(session.as_ref()).await.unwrap();

	let commands = session.protocol().commands();
	assert!(commands.iter().any(|(method, _)| method == "Performance.enable"));

	let memory = profiler.metrics().memory.unwrap();
	assert_eq!(memory.js_heap_used_size, 1000.0);
	assert_eq!(memory.js_heap_total_size, 4000.0);
	// Absent metric names default to zero.
	assert_eq!(memory.js_heap_size_limit, 0.0);

	assert!(profiler.metrics().timing.is_none());
}

#[tokio::test]
async fn script_family_start_reads_navigation_timing() {
	let session = MockScriptSession::new();
	session.push_result(serde_json::json!({
		"navigationStart": 1000.0,
		"responseEnd": 1400.0,
		"loadEventEnd": 2500.0
	}));

	let mut profiler = PerformanceProfiler::new();
	profiler.start(session.as_ref()).await.unwrap();

	let timing = profiler.metrics().timing.unwrap();
	assert_eq!(timing.navigation_start, Some(1000.0));
	assert_eq!(timing.load_event_end, Some(2500.0));
	assert!(timing.dom_content_loaded_event_end.is_none());

	assert!(profiler.metrics().memory.is_none());
}

#[tokio::test]
async fn timing_parse_failure_names_operation_and_family() {
	let session = MockScriptSession::new();
	session.push_result(serde_json::json!(null));

	let mut profiler = PerformanceProfiler::new();
	let err = profiler.start(session.as_ref()).await.unwrap_err();

	let text = err.to_string();
	assert!(text.contains("profilerStart"), "unexpected error: {text}");
	assert!(text.contains("script-execution"), "unexpected error: {text}");
}

#[tokio::test]
async fn stop_counts_resource_elements() {
	let session = MockDomSession::new();
	let mut profiler = PerformanceProfiler::new();
	profiler.start(session.as_ref()).await.unwrap();

	session.push_eval_result(serde_json::json!(12));
	let sample = profiler.stop(session.as_ref()).await.unwrap();

	assert_eq!(sample.resource_count, Some(12));
	assert!(sample.duration_ms.unwrap() >= 0.0);

	let scripts = session.evaluated_scripts();
	assert!(scripts.iter().any(|s| s.contains("querySelectorAll('link, script, img')")));
}

#[tokio::test]
async fn stop_before_start_is_an_error() {
	let session = MockDomSession::new();
	let mut profiler = PerformanceProfiler::new();

	let err = profiler.stop(session.as_ref()).await.unwrap_err();
	assert!(matches!(err, drover::Error::ProfilerNotStarted));
}

#[tokio::test]
async fn duration_absent_until_stopped() {
	let session = MockScriptSession::new();
	session.push_result(serde_json::json!({}));

	let mut profiler = PerformanceProfiler::new();
	profiler.start(session.as_ref()).await.unwrap();

	assert!(profiler.metrics().duration_ms.is_none());
}

#[tokio::test]
async fn failed_resource_count_does_not_fail_stop() {
	let session = MockDomSession::new();
	let mut profiler = PerformanceProfiler::new();
	profiler.start(session.as_ref()).await.unwrap();

	session.fail_evaluations("execution context destroyed");
	let sample = profiler.stop(session.as_ref()).await.unwrap();

	assert!(sample.resource_count.is_none());
	assert!(sample.duration_ms.is_some());
}
