//! Engine-agnostic browser session utilities for scraping backends.
//!
//! A scraping orchestrator acquires a live page from whichever automation
//! engine it is configured with and hands the resulting [`SessionHandle`]
//! to the utilities in this crate. The utilities never acquire or release
//! sessions themselves and never know about each other; they are unified
//! only by the session contract in [`session`] and the runtime
//! classification step in [`classify`].
//!
//! - [`cookies`]: read/write/clear cookies uniformly across engine families
//! - [`storage`]: read/write/clear local and session storage
//! - [`monitor`]: per-request network instrumentation and traffic metrics
//! - [`profiler`]: bracketed memory/timing/duration sampling
//! - [`evasion`]: best-effort anti-detection signal mutation
//!
//! All operations are asynchronous and single-flow per handle: exactly one
//! logical task drives a given handle at a time. Per-handle state (the
//! monitor's record table, the profiler's sample) must be instantiated per
//! handle. Cancellation and timeouts are the caller's responsibility.

pub mod classify;
pub mod cookies;
pub mod error;
pub mod evasion;
pub mod monitor;
pub mod profiler;
pub mod session;
pub mod storage;
pub mod testing;

pub use classify::{EngineCapabilities, classify, engine_family};
pub use error::{Error, Result};
pub use evasion::apply_evasion_techniques;
pub use monitor::{NetworkMonitor, RequestOutcome, RequestRecord};
pub use profiler::PerformanceProfiler;
pub use session::{
	AutomationSession, DomSession, EngineFamily, ProtocolEvent, ProtocolSession, RequestEvent,
	ScriptSession, SessionHandle,
};

pub use drover_protocol::{
	Cookie, CookieSet, MemoryMetrics, PerformanceSample, StorageKind, StorageSnapshot,
	TimingSnapshot, TrafficMetrics, Viewport,
};
