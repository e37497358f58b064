//! Test result messages

use serde::{Deserialize, Serialize};

/// One failed scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    message: String,
    display_name: String,
}

impl Failure {
    /// Failure for the scenario at 1-based position `number`
    ///
    /// The message reads `#<number>: <error>()` and the display name
    /// `#<number>: <description>`.
    #[must_use]
    pub fn for_scenario(number: usize, description: &str, error: &str) -> Self {
        Self {
            message: format!("#{number}: {error}()"),
            display_name: format!("#{number}: {description}"),
        }
    }

    /// Failure message
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Name of the failed scenario
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Outcome of one runner over its scenarios
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    /// Scenarios executed
    pub run_count: usize,
    /// Failures in execution order
    pub failures: Vec<Failure>,
}

impl RunResult {
    /// Fold another result into this one
    pub fn absorb(&mut self, other: RunResult) {
        self.run_count += other.run_count;
        self.failures.extend(other.failures);
    }
}

/// Aggregated result of one service invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResultMessage {
    identifier: String,
    run_count: usize,
    run_time_ms: u64,
    failures: Vec<Failure>,
}

impl TestResultMessage {
    /// Create message
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        run_count: usize,
        run_time_ms: u64,
        failures: Vec<Failure>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            run_count,
            run_time_ms,
            failures,
        }
    }

    /// Message for an invocation that ran nothing
    #[must_use]
    pub fn empty(identifier: impl Into<String>) -> Self {
        Self::new(identifier, 0, 0, Vec::new())
    }

    /// Build from a run result
    #[must_use]
    pub fn from_result(identifier: impl Into<String>, result: RunResult, run_time_ms: u64) -> Self {
        Self::new(identifier, result.run_count, run_time_ms, result.failures)
    }

    /// Caller supplied identifier
    #[inline]
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Scenarios executed
    #[inline]
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.run_count
    }

    /// Wall time of the run in milliseconds
    #[inline]
    #[must_use]
    pub fn run_time_ms(&self) -> u64 {
        self.run_time_ms
    }

    /// Failures in execution order
    #[inline]
    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// True when no scenario failed
    #[inline]
    #[must_use]
    pub fn was_successful(&self) -> bool {
        self.failures.is_empty()
    }
}
