//! Structural checks on decoded documents

use scesim_model::{FactMappingType, ScenarioSimulationModel, SimulationType, CURRENT_VERSION};

/// A consistency problem in a decoded document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationIssue {
    /// Model was decoded at a version other than the current one
    #[error("document version {found} differs from current version {}", CURRENT_VERSION)]
    VersionMismatch {
        /// Version carried by the model
        found: String,
    },

    /// DMN simulation without a model path
    #[error("DMN simulation has no dmnFilePath")]
    MissingDmnFilePath,

    /// Fact mapping without any expression element
    #[error("fact mapping #{mapping} has no expression elements")]
    EmptyExpressionElements {
        /// 0-based position of the mapping
        mapping: usize,
    },

    /// Two mappings describe the same cell coordinates
    #[error("fact mapping #{mapping} duplicates {fact}/{expression}")]
    DuplicateFactMapping {
        /// 0-based position of the second mapping
        mapping: usize,
        /// Fact name
        fact: String,
        /// Expression name
        expression: String,
    },

    /// Scenario cell without a matching fact mapping
    #[error("scenario #{scenario} has a value for undeclared column {fact}/{expression}")]
    UndeclaredValue {
        /// 0-based scenario index
        scenario: usize,
        /// Fact name
        fact: String,
        /// Expression name
        expression: String,
    },
}

/// Check a decoded model
///
/// # Errors
/// Returns every issue found, in document order
pub fn validate(model: &ScenarioSimulationModel) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if model.version() != CURRENT_VERSION {
        issues.push(ValidationIssue::VersionMismatch {
            found: model.version().to_string(),
        });
    }

    let descriptor = model.simulation().descriptor();
    if descriptor.simulation_type() == SimulationType::Dmn
        && descriptor.dmn_file_path().map_or(true, |p| p.trim().is_empty())
    {
        issues.push(ValidationIssue::MissingDmnFilePath);
    }

    let mappings = descriptor.fact_mappings();
    for (i, mapping) in mappings.iter().enumerate() {
        if mapping.expression_elements().is_empty() {
            issues.push(ValidationIssue::EmptyExpressionElements { mapping: i });
        }
        let duplicated = mappings[..i]
            .iter()
            .any(|m| m.matches(mapping.fact_identifier(), mapping.expression_identifier()));
        if duplicated {
            issues.push(ValidationIssue::DuplicateFactMapping {
                mapping: i,
                fact: mapping.fact_identifier().name.clone(),
                expression: mapping.expression_identifier().name.clone(),
            });
        }
    }

    for (index, scenario) in model.simulation().scenarios().iter().enumerate() {
        for value in scenario.values() {
            if value.expression_identifier().kind == FactMappingType::Other {
                continue;
            }
            if descriptor
                .fact_mapping(value.fact_identifier(), value.expression_identifier())
                .is_none()
            {
                issues.push(ValidationIssue::UndeclaredValue {
                    scenario: index,
                    fact: value.fact_identifier().name.clone(),
                    expression: value.expression_identifier().name.clone(),
                });
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scesim_model::{
        ExpressionIdentifier, FactIdentifier, FactMapping, Scenario, Simulation,
        SimulationDescriptor,
    };

    fn person() -> FactIdentifier {
        FactIdentifier::new("Person", "org.test.Person")
    }

    #[test]
    fn empty_model_is_valid() {
        assert!(validate(&ScenarioSimulationModel::new()).is_ok());
    }

    #[test]
    fn dmn_without_path() {
        let mut descriptor = SimulationDescriptor::new();
        descriptor.set_type(SimulationType::Dmn);
        let model = ScenarioSimulationModel::with_simulation(Simulation::with_descriptor(descriptor));

        assert_eq!(validate(&model).unwrap_err(), vec![ValidationIssue::MissingDmnFilePath]);
    }

    #[test]
    fn undeclared_and_duplicate_columns() {
        let given = ExpressionIdentifier::new("1|1", FactMappingType::Given);
        let mut simulation = Simulation::new();
        simulation
            .descriptor_mut()
            .add_fact_mapping(FactMapping::new(person(), given.clone()));
        simulation
            .descriptor_mut()
            .add_fact_mapping(FactMapping::new(person(), given.clone()));

        let mut scenario = Scenario::with_description("one");
        scenario.add_or_update_value(
            person(),
            ExpressionIdentifier::new("9|9", FactMappingType::Expect),
            "x",
        );
        simulation.push_scenario(scenario);

        let issues = validate(&ScenarioSimulationModel::with_simulation(simulation)).unwrap_err();
        assert_eq!(issues.len(), 2);
        assert!(matches!(issues[0], ValidationIssue::DuplicateFactMapping { mapping: 1, .. }));
        assert!(matches!(issues[1], ValidationIssue::UndeclaredValue { scenario: 0, .. }));
    }
}
