//! Anti-detection evasion.
//!
//! Mutates session-visible environment signals (navigator property
//! overrides) and, where the engine family permits, injects human-like
//! pointer noise. Evasion is advisory: detection is an arms race and a
//! failed override must never abort the caller's scraping operation, so
//! every failure here is logged and skipped rather than propagated.

use std::time::Duration;

use rand::Rng;

use drover_protocol::Viewport;

use crate::classify::{EngineCapabilities, classify};
use crate::session::{AutomationSession, DomSession};

/// Navigator overrides for DOM-handle sessions.
///
/// Kept as a single expression: `DomSession::evaluate` takes an
/// expression, not a statement list.
const NAVIGATOR_OVERRIDES: &str = "\
(() => {\n\
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });\n\
Object.defineProperty(navigator, 'plugins', { get: () => [1, 2, 3, 4, 5] });\n\
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });\n\
Object.defineProperty(navigator, 'platform', { get: () => 'Win32' });\n\
})()";

/// Navigator overrides for script-execution sessions.
///
/// No plugins fake here: the single script primitive gives no way to keep
/// the fake list consistent across calls, so only the stable signals are
/// overridden.
const SCRIPT_FAMILY_OVERRIDES: &str = "\
Object.defineProperty(navigator, 'webdriver', { get: () => undefined });\n\
Object.defineProperty(navigator, 'languages', { get: () => ['en-US', 'en'] });\n\
Object.defineProperty(navigator, 'platform', { get: () => 'Win32' });";

/// Number of randomized pointer movements per application.
const POINTER_MOVEMENTS: u32 = 4;

/// Reduces the session's automated-session detectability.
///
/// DOM-handle sessions get navigator property overrides plus a bounded
/// randomized pointer simulation; script-execution sessions get the
/// overrides only. If the viewport size cannot be determined the pointer
/// simulation is skipped entirely; that is not an error.
///
/// Best-effort by design: this function never fails.
pub async fn apply_evasion_techniques(handle: &dyn AutomationSession) {
	match classify(handle) {
		EngineCapabilities::DomHandle(dom) => {
			if let Err(error) = dom.evaluate(NAVIGATOR_OVERRIDES).await {
				tracing::warn!(%error, "Failed to apply navigator overrides");
			}

			match dom.viewport().await {
				Ok(Some(viewport)) => simulate_pointer_noise(dom, viewport).await,
				Ok(None) => {
					tracing::debug!("Viewport undetermined, skipping pointer simulation");
				}
				Err(error) => {
					tracing::warn!(%error, "Viewport lookup failed, skipping pointer simulation");
				}
			}
		}
		EngineCapabilities::ScriptExecution(scripted) => {
			if let Err(error) = scripted.execute(SCRIPT_FAMILY_OVERRIDES).await {
				tracing::warn!(%error, "Failed to apply navigator overrides");
			}
		}
	}
}

/// Moves the pointer to a handful of random in-viewport points, in
/// discrete steps, pausing a random sub-second interval between moves.
async fn simulate_pointer_noise(dom: &dyn DomSession, viewport: Viewport) {
	if viewport.width == 0 || viewport.height == 0 {
		tracing::debug!("Degenerate viewport, skipping pointer simulation");
		return;
	}

	for _ in 0..POINTER_MOVEMENTS {
		// thread_rng is not Send; draw everything before the awaits.
		let (x, y, steps, pause_ms) = {
			let mut rng = rand::thread_rng();
			(
				rng.gen_range(0.0..viewport.width as f64),
				rng.gen_range(0.0..viewport.height as f64),
				rng.gen_range(5..15),
				rng.gen_range(100..450),
			)
		};

		if let Err(error) = dom.move_mouse(x, y, steps).await {
			tracing::warn!(%error, "Pointer movement failed");
			return;
		}

		tokio::time::sleep(Duration::from_millis(pause_ms)).await;
	}
}
