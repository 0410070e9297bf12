// Evasion controller tests.
//
// Paused tokio time skips over the randomized pauses between pointer moves.

use drover::apply_evasion_techniques;
use drover::testing::{MockDomSession, MockScriptSession};
use drover::Viewport;

#[tokio::test(start_paused = true)]
async fn dom_session_gets_overrides_and_pointer_noise() {
	let session = MockDomSession::new();
	session.set_viewport(Some(Viewport { width: 800, height: 600 }));

	apply_evasion_techniques(session.as_ref()).await;

	let scripts = session.evaluated_scripts();
	assert_eq!(scripts.len(), 1);
	for signal in ["webdriver", "plugins", "languages", "platform"] {
		assert!(scripts[0].contains(signal), "missing override for {signal}");
	}

	let moves = session.pointer_moves();
	assert!(!moves.is_empty());
	for (x, y, steps) in moves {
		assert!((0.0..800.0).contains(&x));
		assert!((0.0..600.0).contains(&y));
		assert!(steps > 1, "movement must happen in discrete steps");
	}
}

#[tokio::test(start_paused = true)]
async fn undetermined_viewport_skips_pointer_simulation() {
	let session = MockDomSession::new();
	session.set_viewport(None);

	apply_evasion_techniques(session.as_ref()).await;

	assert!(session.pointer_moves().is_empty());
	// Overrides were still applied.
	assert_eq!(session.evaluated_scripts().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn override_failure_never_propagates() {
	let session = MockDomSession::new();
	session.fail_evaluations("CSP blocked injection");

	// Must complete; evasion is advisory and never gates the caller.
	apply_evasion_techniques(session.as_ref()).await;
}

#[tokio::test]
async fn script_family_gets_overrides_only() {
	let session = MockScriptSession::new();

	apply_evasion_techniques(session.as_ref()).await;

	let scripts = session.executed_scripts();
	assert_eq!(scripts.len(), 1);
	assert!(scripts[0].contains("webdriver"));
	assert!(scripts[0].contains("platform"));
	assert!(!scripts[0].contains("plugins"));
}
