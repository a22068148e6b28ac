//! Configuration of a test unit.

use serde::{Deserialize, Serialize};

/// What happens after a failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssertionMode {
    /// Record the failure and keep going (default)
    #[default]
    Collect,
    /// Stop the test unit at the first failure
    FailFast,
}

/// Configuration for a [`Check`](crate::Check) unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Behavior after a failed check
    pub mode: AssertionMode,
    /// Unchanged lines shown around every change of a diff
    pub diff_context: usize,
    /// Panic with the report when a unit with failures is dropped
    pub verify_on_drop: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckConfig {
    /// Collect failures, one line of diff context, verify on drop.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: AssertionMode::Collect,
            diff_context: 1,
            verify_on_drop: true,
        }
    }

    /// Set the assertion mode
    #[must_use]
    pub const fn with_mode(mut self, mode: AssertionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the diff context
    #[must_use]
    pub const fn with_diff_context(mut self, lines: usize) -> Self {
        self.diff_context = lines;
        self
    }

    /// Enable or disable verification on drop
    #[must_use]
    pub const fn with_verify_on_drop(mut self, enabled: bool) -> Self {
        self.verify_on_drop = enabled;
        self
    }

    /// Stop at the first failure
    #[must_use]
    pub const fn is_fail_fast(&self) -> bool {
        matches!(self.mode, AssertionMode::FailFast)
    }
}
