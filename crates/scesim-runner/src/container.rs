//! Runtime container seam
//!
//! The rule engine or decision engine that actually evaluates scenarios is
//! provided by the host through [`RuntimeContainer`]. The runner only builds
//! an [`EvaluationRequest`] from the scenario's GIVEN cells and reads the
//! produced values back from the [`EvaluationOutcome`].

use crate::error::ContainerError;
use scesim_model::FactIdentifier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What the container should evaluate against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationTarget {
    /// Named rule session, empty for the default session
    Session(String),
    /// Path of a decision model
    Model(String),
}

/// Input values for one fact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactInput {
    /// Fact the values belong to
    pub fact: FactIdentifier,
    /// `(expression path, raw value)` pairs; an empty path sets the fact itself
    pub values: Vec<(String, String)>,
}

/// One scenario evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// Session or model to use
    pub target: EvaluationTarget,
    /// GIVEN inputs, one entry per fact
    pub inputs: Vec<FactInput>,
}

impl EvaluationRequest {
    /// Create request without inputs
    #[must_use]
    pub fn new(target: EvaluationTarget) -> Self {
        Self {
            target,
            inputs: Vec::new(),
        }
    }

    /// Inputs of a fact
    #[must_use]
    pub fn input(&self, fact_name: &str) -> Option<&FactInput> {
        self.inputs.iter().find(|i| i.fact.name == fact_name)
    }
}

/// A value produced by the container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactValue {
    /// Explicit null
    Null,
    /// Textual rendering of the value
    Text(String),
}

impl FactValue {
    /// Create text value
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Text, `None` for null
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Null => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl std::fmt::Display for FactValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Values produced by one evaluation, keyed by fact name and expression path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    values: BTreeMap<(String, String), FactValue>,
}

impl EvaluationOutcome {
    /// Create empty outcome
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a produced value
    #[must_use]
    pub fn with_value(
        mut self,
        fact_name: impl Into<String>,
        path: impl Into<String>,
        value: FactValue,
    ) -> Self {
        self.insert(fact_name, path, value);
        self
    }

    /// Record a produced value
    pub fn insert(&mut self, fact_name: impl Into<String>, path: impl Into<String>, value: FactValue) {
        self.values.insert((fact_name.into(), path.into()), value);
    }

    /// Value produced for `fact_name` at `path`
    #[must_use]
    pub fn value(&self, fact_name: &str, path: &str) -> Option<&FactValue> {
        self.values.get(&(fact_name.to_string(), path.to_string()))
    }

    /// Number of produced values
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was produced
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Engine that evaluates scenarios
///
/// Obtained from the project build; one container serves every scenario of
/// an invocation.
#[cfg_attr(test, mockall::automock)]
pub trait RuntimeContainer: Send + Sync {
    /// Evaluate one scenario
    ///
    /// # Errors
    /// Returns `ContainerError` if the target is unknown or evaluation fails
    fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationOutcome, ContainerError>;
}
