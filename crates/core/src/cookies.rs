//! Cookie synchronization across engine families.
//!
//! The DOM-handle family has native cookie accessors, so writes become one
//! add-cookie call per entry (domain taken from the session's current URL,
//! path "/"), reads one list call, and clears one delete call per listed
//! cookie. The script-execution family has nothing but script injection,
//! so the same operations are synthesized as `document.cookie` scripts.
//!
//! Writes and clears mutate session-visible browser state and return no
//! value. After [`clear_cookies`], [`get_cookies`] returns an empty set for
//! both families.

use drover_protocol::{Cookie, CookieSet};
use serde_json::Value;
use url::Url;

use crate::classify::{EngineCapabilities, classify};
use crate::error::{Error, Result};
use crate::session::{AutomationSession, DomSession, EngineFamily, ScriptSession};

/// Writes every entry of `cookies` into the session.
///
/// Entries are scoped to the session's current origin. No read-back is
/// performed to confirm the write.
pub async fn set_cookies(handle: &dyn AutomationSession, cookies: &CookieSet) -> Result<()> {
	match classify(handle) {
		EngineCapabilities::DomHandle(dom) => set_cookies_native(dom, cookies)
			.await
			.map_err(|e| Error::in_operation("setCookies", EngineFamily::DomHandle, e)),
		EngineCapabilities::ScriptExecution(scripted) => {
			let script = build_set_script(cookies);
			scripted
				.execute(&script)
				.await
				.map(|_| ())
				.map_err(|e| Error::in_operation("setCookies", EngineFamily::ScriptExecution, e))
		}
	}
}

/// Reads every cookie visible to the session's current origin.
pub async fn get_cookies(handle: &dyn AutomationSession) -> Result<CookieSet> {
	match classify(handle) {
		EngineCapabilities::DomHandle(dom) => {
			let cookies = dom
				.cookies()
				.await
				.map_err(|e| Error::in_operation("getCookies", EngineFamily::DomHandle, e))?;

			Ok(cookies.into_iter().map(|c| (c.name, c.value)).collect())
		}
		EngineCapabilities::ScriptExecution(scripted) => {
			let value = scripted
				.execute("return document.cookie;")
				.await
				.map_err(|e| Error::in_operation("getCookies", EngineFamily::ScriptExecution, e))?;

			let raw = value.as_str().ok_or_else(|| Error::UnexpectedValue {
				operation: "getCookies",
				family: EngineFamily::ScriptExecution,
				message: format!("expected a string, got {value}"),
			})?;

			Ok(parse_cookie_string(raw))
		}
	}
}

/// Removes every cookie visible to the session's current origin.
pub async fn clear_cookies(handle: &dyn AutomationSession) -> Result<()> {
	match classify(handle) {
		EngineCapabilities::DomHandle(dom) => clear_cookies_native(dom)
			.await
			.map_err(|e| Error::in_operation("clearCookies", EngineFamily::DomHandle, e)),
		EngineCapabilities::ScriptExecution(scripted) => clear_cookies_scripted(scripted)
			.await
			.map_err(|e| Error::in_operation("clearCookies", EngineFamily::ScriptExecution, e)),
	}
}

async fn set_cookies_native(dom: &dyn DomSession, cookies: &CookieSet) -> Result<()> {
	let url = dom.url().await?;
	let parsed = Url::parse(&url).map_err(|e| Error::InvalidUrl {
		url: url.clone(),
		message: e.to_string(),
	})?;

	let host = parsed.host_str().ok_or_else(|| Error::InvalidUrl {
		url: url.clone(),
		message: "URL has no host to scope cookies to".to_string(),
	})?;

	for (name, value) in cookies {
		let cookie = Cookie::new(name.clone(), value.clone()).domain(host).path("/");
		dom.add_cookie(cookie).await?;
	}

	Ok(())
}

async fn clear_cookies_native(dom: &dyn DomSession) -> Result<()> {
	for cookie in dom.cookies().await? {
		dom.delete_cookie(&cookie.name).await?;
	}

	Ok(())
}

/// Expires each currently-listed cookie individually: the standard
/// deletion idiom of rewriting the cookie with a timestamp in the past.
async fn clear_cookies_scripted(scripted: &dyn ScriptSession) -> Result<()> {
	let script = "\
var entries = document.cookie.split(';');\n\
for (var i = 0; i < entries.length; i++) {\n\
	var name = entries[i].split('=')[0].trim();\n\
	if (name) {\n\
		document.cookie = name + '=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/';\n\
	}\n\
}";

	scripted.execute(script).await.map(|_| ())
}

/// Synthesizes one script that assigns `document.cookie` once per entry.
fn build_set_script(cookies: &CookieSet) -> String {
	let mut script = String::new();

	for (name, value) in cookies {
		let assignment = Value::String(format!("{name}={value}; path=/"));
		script.push_str(&format!("document.cookie = {assignment};\n"));
	}

	script
}

/// Parses the `document.cookie` string ("a=1; b=2") into a mapping.
fn parse_cookie_string(raw: &str) -> CookieSet {
	raw.split(';')
		.filter_map(|pair| {
			let pair = pair.trim();
			if pair.is_empty() {
				return None;
			}

			match pair.split_once('=') {
				Some((name, value)) => Some((name.trim().to_string(), value.trim().to_string())),
				None => Some((pair.to_string(), String::new())),
			}
		})
		.collect()
}
