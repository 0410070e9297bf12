//! Primitive types shared across the session utilities.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Key/value view of one storage object at a point in time.
///
/// Complete (every key present) when produced by a read; partial (only the
/// listed keys) when supplied to a write.
pub type StorageSnapshot = HashMap<String, String>;

/// Which in-page storage object an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
	/// `window.localStorage`
	Local,
	/// `window.sessionStorage`
	Session,
}

impl StorageKind {
	/// Name of the corresponding global storage object in page JavaScript.
	pub fn js_object(&self) -> &'static str {
		match self {
			Self::Local => "localStorage",
			Self::Session => "sessionStorage",
		}
	}
}

/// Visible page dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
	/// Width of the viewport
	pub width: u32,
	/// Height of the viewport
	pub height: u32,
}
