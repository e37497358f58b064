//! Simulation descriptor
//!
//! Holds the shared structure of all scenarios of a simulation: the
//! simulation type and its type-specific target, plus the fact mappings.

use crate::error::ModelError;
use crate::fact_mapping::{ExpressionIdentifier, FactIdentifier, FactMapping};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a simulation runs against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SimulationType {
    /// Rule base, addressed by a DMO session
    #[default]
    Rule,
    /// Decision model, addressed by its file path
    Dmn,
}

impl SimulationType {
    /// Marker used in the persisted format
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rule => "RULE",
            Self::Dmn => "DMN",
        }
    }
}

impl fmt::Display for SimulationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimulationType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "RULE" => Ok(Self::Rule),
            "DMN" => Ok(Self::Dmn),
            other => Err(ModelError::UnknownSimulationType(other.to_string())),
        }
    }
}

impl TryFrom<String> for SimulationType {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SimulationType> for String {
    fn from(value: SimulationType) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct FactMappings {
    #[serde(rename = "FactMapping", default)]
    items: Vec<FactMapping>,
}

/// Shared structure of a simulation
///
/// `dmo_session` and `dmn_file_path` are mutually exclusive: a RULE
/// descriptor always has a (possibly empty) session and no DMN path, a DMN
/// descriptor never has a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationDescriptor {
    #[serde(rename = "factMappings", default)]
    fact_mappings: FactMappings,
    #[serde(rename = "dmoSession", default, skip_serializing_if = "Option::is_none")]
    dmo_session: Option<String>,
    #[serde(rename = "dmnFilePath", default, skip_serializing_if = "Option::is_none")]
    dmn_file_path: Option<String>,
    #[serde(rename = "type", default)]
    kind: SimulationType,
}

impl Default for SimulationDescriptor {
    fn default() -> Self {
        Self {
            fact_mappings: FactMappings::default(),
            dmo_session: Some(String::new()),
            dmn_file_path: None,
            kind: SimulationType::Rule,
        }
    }
}

impl SimulationDescriptor {
    /// Create RULE descriptor with the default session
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create RULE descriptor for a named session
    #[must_use]
    pub fn rule(session: impl Into<String>) -> Self {
        let mut descriptor = Self::default();
        descriptor.set_dmo_session(session);
        descriptor
    }

    /// Create DMN descriptor for a model file
    #[must_use]
    pub fn dmn(file_path: impl Into<String>) -> Self {
        let mut descriptor = Self::default();
        descriptor.set_dmn_file_path(file_path);
        descriptor
    }

    /// Simulation type
    #[inline]
    #[must_use]
    pub fn simulation_type(&self) -> SimulationType {
        self.kind
    }

    /// Change simulation type, dropping the target of the other type
    pub fn set_type(&mut self, kind: SimulationType) {
        self.kind = kind;
        self.normalize();
    }

    /// DMO session (RULE only)
    #[inline]
    #[must_use]
    pub fn dmo_session(&self) -> Option<&str> {
        self.dmo_session.as_deref()
    }

    /// Set DMO session, switching to RULE
    pub fn set_dmo_session(&mut self, session: impl Into<String>) {
        self.kind = SimulationType::Rule;
        self.dmo_session = Some(session.into());
        self.dmn_file_path = None;
    }

    /// DMN model path (DMN only)
    #[inline]
    #[must_use]
    pub fn dmn_file_path(&self) -> Option<&str> {
        self.dmn_file_path.as_deref()
    }

    /// Set DMN model path, switching to DMN
    pub fn set_dmn_file_path(&mut self, file_path: impl Into<String>) {
        self.kind = SimulationType::Dmn;
        self.dmn_file_path = Some(file_path.into());
        self.dmo_session = None;
    }

    /// Enforce the type-specific field exclusivity
    ///
    /// Decoded documents may carry both fields or neither; the type marker
    /// decides which one survives.
    pub fn normalize(&mut self) {
        match self.kind {
            SimulationType::Rule => {
                self.dmn_file_path = None;
                if self.dmo_session.is_none() {
                    self.dmo_session = Some(String::new());
                }
            }
            SimulationType::Dmn => {
                self.dmo_session = None;
            }
        }
    }

    /// All fact mappings in column order
    #[inline]
    #[must_use]
    pub fn fact_mappings(&self) -> &[FactMapping] {
        &self.fact_mappings.items
    }

    /// Mutable fact mappings
    #[inline]
    pub fn fact_mappings_mut(&mut self) -> &mut Vec<FactMapping> {
        &mut self.fact_mappings.items
    }

    /// Append a fact mapping
    pub fn add_fact_mapping(&mut self, mapping: FactMapping) {
        self.fact_mappings.items.push(mapping);
    }

    /// Look up the mapping for cell coordinates
    #[must_use]
    pub fn fact_mapping(
        &self,
        fact: &FactIdentifier,
        expression: &ExpressionIdentifier,
    ) -> Option<&FactMapping> {
        self.fact_mappings
            .items
            .iter()
            .find(|m| m.matches(fact, expression))
    }

    /// Distinct facts referenced by the mappings, in first-seen order
    #[must_use]
    pub fn fact_identifiers(&self) -> Vec<&FactIdentifier> {
        let mut seen: Vec<&FactIdentifier> = Vec::new();
        for mapping in &self.fact_mappings.items {
            let fact = mapping.fact_identifier();
            if !seen.contains(&fact) {
                seen.push(fact);
            }
        }
        seen
    }
}
