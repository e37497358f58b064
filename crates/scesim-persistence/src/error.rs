//! Error types for persistence
//!
//! Covers:
//! - Version detection and unsupported versions
//! - Malformed XML during migration
//! - Encoding/decoding through serde
//! - Model validation after decoding

use crate::validation::ValidationIssue;
use std::fmt::Display;

/// Errors from marshal, unmarshal and migration
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Document version has no migration path to the current version
    #[error("Version {version} of the file is not supported. Current version is {current}")]
    UnsupportedVersion {
        /// Version found in the document
        version: String,
        /// Version this build writes
        current: String,
    },

    /// Root element carries no version attribute
    #[error("version attribute not found on ScenarioSimulationModel")]
    MissingVersion,

    /// XML could not be read or written during migration
    #[error("malformed xml: {0}")]
    Xml(String),

    /// A migration step failed
    #[error("migration {from} -> {to} failed: {source}")]
    Migration {
        /// Source version of the failing step
        from: &'static str,
        /// Target version of the failing step
        to: &'static str,
        /// Underlying failure
        #[source]
        source: Box<PersistenceError>,
    },

    /// XML does not decode into the model
    #[error("failed to decode document: {0}")]
    Deserialize(String),

    /// Model does not encode to XML
    #[error("failed to encode document: {0}")]
    Serialize(String),

    /// Decoded model is inconsistent
    #[error("document validation failed: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),
}

impl PersistenceError {
    /// Create unsupported version error against the current version
    pub fn unsupported_version(version: impl Into<String>) -> Self {
        Self::UnsupportedVersion {
            version: version.into(),
            current: scesim_model::CURRENT_VERSION.to_string(),
        }
    }

    pub(crate) fn xml(err: impl Display) -> Self {
        Self::Xml(err.to_string())
    }

    /// Whether the caller passed an unusable document
    ///
    /// These are the illegal-argument conditions of the contract: the
    /// document cannot be processed at all, as opposed to failing midway.
    #[inline]
    #[must_use]
    pub fn is_illegal_argument(&self) -> bool {
        matches!(self, Self::UnsupportedVersion { .. } | Self::MissingVersion)
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;
