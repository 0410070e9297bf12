//! Cookie types for session/authentication management.
//!
//! A [`Cookie`] carries the attributes an engine needs to set or report a
//! browser cookie. Callers that only care about name/value pairs work with
//! [`CookieSet`] instead and let the synchronizer fill in the attributes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Mapping from cookie name to value, scoped to the session's current origin.
///
/// Insertion order is irrelevant; two sets with the same entries are equal.
pub type CookieSet = HashMap<String, String>;

/// A browser cookie with its attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
	/// Cookie name
	pub name: String,

	/// Cookie value
	pub value: String,

	/// Domain for the cookie (e.g., ".example.com")
	#[serde(skip_serializing_if = "Option::is_none")]
	pub domain: Option<String>,

	/// Path for the cookie (default: "/")
	#[serde(skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,

	/// Unix timestamp in seconds. -1 means session cookie.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub expires: Option<f64>,

	/// Whether the cookie is HTTP-only
	#[serde(skip_serializing_if = "Option::is_none")]
	pub http_only: Option<bool>,

	/// Whether the cookie requires HTTPS
	#[serde(skip_serializing_if = "Option::is_none")]
	pub secure: Option<bool>,
}

impl Cookie {
	/// Creates a new cookie with required fields.
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: value.into(),
			domain: None,
			path: None,
			expires: None,
			http_only: None,
			secure: None,
		}
	}

	/// Sets the domain for the cookie.
	pub fn domain(mut self, domain: impl Into<String>) -> Self {
		self.domain = Some(domain.into());
		self
	}

	/// Sets the path for the cookie.
	pub fn path(mut self, path: impl Into<String>) -> Self {
		self.path = Some(path.into());
		self
	}

	/// Sets the expiration timestamp (Unix seconds). Use -1 for session cookie.
	pub fn expires(mut self, expires: f64) -> Self {
		self.expires = Some(expires);
		self
	}

	/// Sets whether the cookie is HTTP-only.
	pub fn http_only(mut self, http_only: bool) -> Self {
		self.http_only = Some(http_only);
		self
	}

	/// Sets whether the cookie requires HTTPS.
	pub fn secure(mut self, secure: bool) -> Self {
		self.secure = Some(secure);
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_cookie_new() {
		let cookie = Cookie::new("session", "abc123");
		assert_eq!(cookie.name, "session");
		assert_eq!(cookie.value, "abc123");
		assert!(cookie.domain.is_none());
	}

	#[test]
	fn test_cookie_builder() {
		let cookie = Cookie::new("auth", "token123")
			.domain(".example.com")
			.path("/api")
			.expires(1234567890.0)
			.http_only(true)
			.secure(true);

		assert_eq!(cookie.domain, Some(".example.com".to_string()));
		assert_eq!(cookie.path, Some("/api".to_string()));
		assert_eq!(cookie.expires, Some(1234567890.0));
		assert_eq!(cookie.http_only, Some(true));
		assert_eq!(cookie.secure, Some(true));
	}

	#[test]
	fn test_cookie_serialization() {
		let cookie = Cookie::new("test", "value").domain(".example.com").http_only(true);

		let json = serde_json::to_string(&cookie).unwrap();
		assert!(json.contains("\"name\":\"test\""));
		assert!(json.contains("\"httpOnly\":true"));
		assert!(!json.contains("\"secure\""));
	}
}
