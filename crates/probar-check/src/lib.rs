//! probar-check: readable assertions for Rust tests
//!
//! A [`Check`] handle binds checkers to a test unit. Failed checks are
//! recorded with a report that shows the checker, the call site and typed
//! dumps of the values involved, plus a unified diff when a dump spans
//! several lines. The unit fails when its handle is dropped.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐    ┌───────────┐    ┌───────────┐    ┌───────────┐
//! │  Check    │───►│ compare   │───►│  reflect  │───►│   dump    │
//! │ (checkers)│    │ (verdict) │    │ (Value)   │    │ + diff    │
//! └───────────┘    └───────────┘    └───────────┘    └───────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use probar_check::prelude::*;
//!
//! let t = Check::new("example");
//! t.equal(&(2 + 2), &4);
//! t.contains(&vec![2, 4, 6], &4);
//! t.has_prefix("Sunday", "Sun");
//! t.todo().is_true(false);
//! assert!(t.verify().is_ok());
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Checkers bound to a test unit
#[allow(clippy::missing_panics_doc, clippy::should_implement_trait)]
pub mod check;

/// Value predicates behind the checkers
///
/// Every function here is usable on its own, without a [`Check`].
#[allow(clippy::missing_panics_doc)]
pub mod compare;

mod config;
mod diff;

/// Typed value dumps
pub mod dump;

/// Serde based reflection of arbitrary values
pub mod reflect;

mod result;

pub use check::{Check, CheckSummary, Failure};
pub use config::{AssertionMode, CheckConfig};
pub use diff::{unified, ACTUAL_LABEL, EXPECTED_LABEL};
pub use dump::Dump;
pub use reflect::{reflect, Reflected, Value};
pub use result::{CheckError, CheckResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::check::{Check, CheckSummary, Failure};
    pub use super::compare::{Displayed, ErrorValue, JsonText, Ordered, Pattern, Text};
    pub use super::config::{AssertionMode, CheckConfig};
    pub use super::dump::Dump;
    pub use super::result::{CheckError, CheckResult};
}
