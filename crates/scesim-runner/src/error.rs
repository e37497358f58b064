//! Error types for the runner
//!
//! Two levels:
//! - [`RunnerError`] aborts a whole invocation before any scenario runs
//! - [`ScenarioError`] fails a single scenario and is reported as a
//!   [`Failure`](crate::message::Failure)

use scesim_persistence::PersistenceError;

/// Message used when the build produced no runtime container
pub const MISSING_CONTAINER_MESSAGE: &str = "Retrieving KieContainer has failed. Fix all compilation errors within the project and build the project again.";

/// Infrastructure errors of the runner service
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Caller or project state makes the request unusable
    #[error("{0}")]
    IllegalArgument(String),

    /// A scenario document could not be read
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Module lookup or file listing failed
    #[error("module error: {0}")]
    Module(String),
}

impl RunnerError {
    /// Error for a build without runtime container
    #[must_use]
    pub fn missing_container() -> Self {
        Self::IllegalArgument(MISSING_CONTAINER_MESSAGE.to_string())
    }

    /// Whether the request itself was unusable
    #[inline]
    #[must_use]
    pub fn is_illegal_argument(&self) -> bool {
        match self {
            Self::IllegalArgument(_) => true,
            Self::Persistence(e) => e.is_illegal_argument(),
            Self::Module(_) => false,
        }
    }
}

/// Failure of a single scenario
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScenarioError {
    /// Free-form failure raised by a runner
    #[error("{0}")]
    Failed(String),

    /// Expected value does not hold
    #[error("{fact}{path}: expected '{expected}' but was '{actual}'")]
    Mismatch {
        /// Fact name
        fact: String,
        /// Expression path, empty or starting with `.`
        path: String,
        /// Raw expectation from the scenario cell
        expected: String,
        /// Value produced by the container
        actual: String,
    },

    /// Container produced nothing for an expected column
    #[error("{fact}{path}: no value produced")]
    MissingValue {
        /// Fact name
        fact: String,
        /// Expression path, empty or starting with `.`
        path: String,
    },

    /// Cell refers to a column the descriptor does not declare
    #[error("no fact mapping for {fact}/{expression}")]
    UndeclaredColumn {
        /// Fact name
        fact: String,
        /// Expression name
        expression: String,
    },

    /// Raw expectation cannot be evaluated
    #[error("invalid expression '{0}'")]
    InvalidExpression(String),

    /// Container failed to evaluate the scenario
    #[error(transparent)]
    Container(#[from] ContainerError),
}

impl ScenarioError {
    /// Create free-form failure
    pub fn new(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Errors reported by a [`RuntimeContainer`](crate::container::RuntimeContainer)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContainerError {
    /// Named rule session does not exist
    #[error("session '{0}' not found")]
    UnknownSession(String),

    /// Decision model does not exist
    #[error("decision model '{0}' not found")]
    UnknownModel(String),

    /// Evaluation raised an error
    #[error("evaluation failed: {0}")]
    Evaluation(String),
}

/// Result type alias for runner service operations
pub type RunnerResult<T> = Result<T, RunnerError>;
