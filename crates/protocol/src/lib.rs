//! Data shapes shared between browser-session utilities and their callers.
//!
//! This crate contains the serde-serializable types that cross the boundary
//! between the `drover` utilities and the scraping orchestrator: cookies,
//! storage snapshots, traffic metrics, and performance samples. They are
//! deliberately engine-family-agnostic: nothing here reveals which
//! automation engine produced a value.
//!
//! Types in this crate are:
//! - **Pure data**: no behavior beyond construction and (de)serialization
//! - **Stable**: changes only when the caller-facing contract changes
//!
//! The session contract and the utilities themselves live in `drover-core`.

pub mod cookie;
pub mod metrics;
pub mod types;

pub use cookie::*;
pub use metrics::*;
pub use types::*;
