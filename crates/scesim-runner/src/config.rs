//! Runner configuration

use serde::{Deserialize, Serialize};

/// Settings for [`ScenarioRunnerService`](crate::service::ScenarioRunnerService)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// File extension of scenario documents, without the dot
    pub scenario_extension: String,
    /// Validate documents after decoding
    pub validate_documents: bool,
}

impl RunnerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With scenario file extension
    #[inline]
    #[must_use]
    pub fn with_scenario_extension(mut self, extension: impl Into<String>) -> Self {
        self.scenario_extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// With document validation switched on or off
    #[inline]
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate_documents = validate;
        self
    }

    /// Whether `path` names a scenario document
    #[must_use]
    pub fn is_scenario_file(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.scenario_extension))
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            scenario_extension: "scesim".to_string(),
            validate_documents: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn defaults() {
        let config = RunnerConfig::new();
        assert_eq!(config.scenario_extension, "scesim");
        assert!(config.validate_documents);
    }

    #[test]
    fn extension_filter() {
        let config = RunnerConfig::new().with_scenario_extension(".test");
        assert!(config.is_scenario_file(Path::new("src/test/resources/loan.test")));
        assert!(!config.is_scenario_file(Path::new("loan.scesim")));
        assert!(!config.is_scenario_file(Path::new("README")));
    }
}
