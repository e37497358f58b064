//! Simulation and scenarios

use crate::descriptor::SimulationDescriptor;
use crate::error::ModelError;
use crate::fact_mapping::{ExpressionIdentifier, FactIdentifier, FactMappingType, FactMappingValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scenarios keyed by 0-based position
///
/// Iteration order is run order; runners number scenarios from 1.
pub type ScenarioMap = BTreeMap<usize, Scenario>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct FactMappingValues {
    #[serde(rename = "FactMappingValue", default)]
    items: Vec<FactMappingValue>,
}

/// One test case
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    description: String,
    #[serde(rename = "factMappingValues", default)]
    values: FactMappingValues,
}

impl Scenario {
    /// Create empty scenario
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create scenario with description
    #[inline]
    #[must_use]
    pub fn with_description(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            values: FactMappingValues::default(),
        }
    }

    /// Human readable description
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Set description
    #[inline]
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// All cells
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[FactMappingValue] {
        &self.values.items
    }

    /// Cell at coordinates
    #[must_use]
    pub fn value(
        &self,
        fact: &FactIdentifier,
        expression: &ExpressionIdentifier,
    ) -> Option<&FactMappingValue> {
        self.values
            .items
            .iter()
            .find(|v| v.fact_identifier() == fact && v.expression_identifier() == expression)
    }

    /// Set cell content, adding the cell if missing
    pub fn add_or_update_value(
        &mut self,
        fact: FactIdentifier,
        expression: ExpressionIdentifier,
        raw_value: impl Into<String>,
    ) -> &mut FactMappingValue {
        let raw_value = Some(raw_value.into());
        let position = self
            .values
            .items
            .iter()
            .position(|v| v.fact_identifier() == &fact && v.expression_identifier() == &expression);

        match position {
            Some(i) => {
                let cell = &mut self.values.items[i];
                cell.set_raw_value(raw_value);
                cell
            }
            None => {
                self.values
                    .items
                    .push(FactMappingValue::new(fact, expression, raw_value));
                let last = self.values.items.len() - 1;
                &mut self.values.items[last]
            }
        }
    }

    /// Drop every cell of a fact
    pub fn remove_values_of(&mut self, fact: &FactIdentifier) {
        self.values.items.retain(|v| v.fact_identifier() != fact);
    }

    /// Input cells
    pub fn givens(&self) -> impl Iterator<Item = &FactMappingValue> {
        self.values_of(FactMappingType::Given)
    }

    /// Expected result cells
    pub fn expects(&self) -> impl Iterator<Item = &FactMappingValue> {
        self.values_of(FactMappingType::Expect)
    }

    fn values_of(&self, kind: FactMappingType) -> impl Iterator<Item = &FactMappingValue> {
        self.values
            .items
            .iter()
            .filter(move |v| v.expression_identifier().kind == kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct ScenarioList {
    #[serde(rename = "Scenario", default)]
    items: Vec<Scenario>,
}

/// Ordered scenarios sharing one descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Simulation {
    #[serde(rename = "simulationDescriptor", default)]
    descriptor: SimulationDescriptor,
    #[serde(default)]
    scenarios: ScenarioList,
}

impl Simulation {
    /// Create empty RULE simulation
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create simulation with descriptor
    #[inline]
    #[must_use]
    pub fn with_descriptor(descriptor: SimulationDescriptor) -> Self {
        Self {
            descriptor,
            scenarios: ScenarioList::default(),
        }
    }

    /// Shared descriptor
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &SimulationDescriptor {
        &self.descriptor
    }

    /// Mutable shared descriptor
    #[inline]
    pub fn descriptor_mut(&mut self) -> &mut SimulationDescriptor {
        &mut self.descriptor
    }

    /// Append an empty scenario and return its index
    pub fn add_scenario(&mut self) -> usize {
        self.push_scenario(Scenario::new())
    }

    /// Append a scenario and return its index
    pub fn push_scenario(&mut self, scenario: Scenario) -> usize {
        self.scenarios.items.push(scenario);
        self.scenarios.items.len() - 1
    }

    /// Scenario at 0-based index
    #[inline]
    #[must_use]
    pub fn scenario_by_index(&self, index: usize) -> Option<&Scenario> {
        self.scenarios.items.get(index)
    }

    /// Mutable scenario at 0-based index
    #[inline]
    pub fn scenario_by_index_mut(&mut self, index: usize) -> Option<&mut Scenario> {
        self.scenarios.items.get_mut(index)
    }

    /// Remove scenario; later scenarios shift down by one
    ///
    /// # Errors
    /// Returns `ModelError::ScenarioNotFound` if the index is out of range
    pub fn remove_scenario(&mut self, index: usize) -> Result<Scenario, ModelError> {
        let len = self.scenarios.items.len();
        if index >= len {
            return Err(ModelError::ScenarioNotFound { index, len });
        }
        Ok(self.scenarios.items.remove(index))
    }

    /// Scenarios in order
    #[inline]
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios.items
    }

    /// Number of scenarios
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.items.len()
    }

    /// Whether there are no scenarios
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.items.is_empty()
    }

    /// Snapshot of the scenarios keyed by index
    #[must_use]
    pub fn scenario_map(&self) -> ScenarioMap {
        self.scenarios
            .items
            .iter()
            .cloned()
            .enumerate()
            .collect()
    }
}
