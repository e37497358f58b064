//! Error types for the document model

/// Errors raised while building or decoding model values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Simulation type marker is not RULE or DMN
    #[error("unknown simulation type: '{0}'")]
    UnknownSimulationType(String),

    /// Expression type marker is not GIVEN, EXPECT or OTHER
    #[error("unknown fact mapping type: '{0}'")]
    UnknownFactMappingType(String),

    /// Scenario index out of range
    #[error("no scenario at index {index} (scenario count: {len})")]
    ScenarioNotFound {
        /// Requested index
        index: usize,
        /// Number of scenarios in the simulation
        len: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_display() {
        let err = ModelError::UnknownSimulationType("BPMN".to_string());
        assert_eq!(err.to_string(), "unknown simulation type: 'BPMN'");
    }

    #[test]
    fn scenario_not_found_display() {
        let err = ModelError::ScenarioNotFound { index: 4, len: 2 };
        assert!(err.to_string().contains("index 4"));
    }
}
