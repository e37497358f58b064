//! Document root

use crate::imports::Imports;
use crate::simulation::Simulation;
use serde::{Deserialize, Serialize};

/// Schema version written by this crate
pub const CURRENT_VERSION: &str = "1.3";

/// Root of a scenario-simulation document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "ScenarioSimulationModel")]
pub struct ScenarioSimulationModel {
    #[serde(rename = "@version")]
    version: String,
    #[serde(default)]
    simulation: Simulation,
    #[serde(default)]
    imports: Imports,
}

impl Default for ScenarioSimulationModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioSimulationModel {
    /// Create empty document at the current version
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_simulation(Simulation::new())
    }

    /// Create document around an existing simulation
    #[inline]
    #[must_use]
    pub fn with_simulation(simulation: Simulation) -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            simulation,
            imports: Imports::default(),
        }
    }

    /// Schema version the document was read with
    #[inline]
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Simulation
    #[inline]
    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Mutable simulation
    #[inline]
    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }

    /// Imports
    #[inline]
    #[must_use]
    pub fn imports(&self) -> &Imports {
        &self.imports
    }

    /// Mutable imports
    #[inline]
    pub fn imports_mut(&mut self) -> &mut Imports {
        &mut self.imports
    }

    /// Consume document, keeping the simulation
    #[inline]
    #[must_use]
    pub fn into_simulation(self) -> Simulation {
        self.simulation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_model_is_current() {
        let model = ScenarioSimulationModel::new();
        assert_eq!(model.version(), CURRENT_VERSION);
        assert!(model.simulation().is_empty());
        assert!(model.imports().imports().is_empty());
    }
}
