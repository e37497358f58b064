//! Scenario runners
//!
//! A runner owns one descriptor and its scenarios. [`ScenarioRunner::run`]
//! walks the scenarios in index order and turns every [`ScenarioError`]
//! into a numbered [`Failure`]; implementations only decide how a single
//! scenario is evaluated.
//!
//! # Evaluation
//!
//! ```text
//! Scenario ──extract──► ScenarioRunnerData ──request──► RuntimeContainer
//!                              │                              │
//!                              └──── expects ◄── outcome ─────┘
//! ```

use crate::container::{
    EvaluationOutcome, EvaluationRequest, EvaluationTarget, FactInput, RuntimeContainer,
};
use crate::error::ScenarioError;
use crate::evaluator;
use crate::message::{Failure, RunResult};
use scesim_model::{
    ExpressionIdentifier, FactIdentifier, FactMappingValue, Scenario, ScenarioMap,
    SimulationDescriptor,
};
use std::sync::Arc;

/// A GIVEN cell resolved against its fact mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GivenValue {
    /// Expression path below the fact, empty for the fact itself
    pub path: String,
    /// Raw cell value
    pub raw: String,
}

/// GIVEN cells of one fact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GivenFact {
    /// Fact receiving the values
    pub fact: FactIdentifier,
    /// Values in column order
    pub values: Vec<GivenValue>,
}

/// An EXPECT cell resolved against its fact mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedValue {
    /// Fact the value is read from
    pub fact: FactIdentifier,
    /// Column of the cell
    pub expression: ExpressionIdentifier,
    /// Expression path below the fact, empty for the fact itself
    pub path: String,
    /// Raw expectation
    pub raw: String,
}

/// Inputs and expectations of one scenario
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioRunnerData {
    givens: Vec<GivenFact>,
    expects: Vec<ExpectedValue>,
}

impl ScenarioRunnerData {
    /// Resolve the non-empty cells of `scenario` against `descriptor`
    ///
    /// GIVEN cells are grouped per fact in first-seen order.
    ///
    /// # Errors
    /// Returns `ScenarioError::UndeclaredColumn` for a cell without fact mapping
    pub fn extract(
        descriptor: &SimulationDescriptor,
        scenario: &Scenario,
    ) -> Result<Self, ScenarioError> {
        let mut data = Self::default();

        for value in scenario.givens() {
            let Some(raw) = value.non_blank_value() else {
                continue;
            };
            let path = resolve_path(descriptor, value)?;
            let given = GivenValue {
                path,
                raw: raw.to_string(),
            };
            match data.givens.iter_mut().find(|g| &g.fact == value.fact_identifier()) {
                Some(fact) => fact.values.push(given),
                None => data.givens.push(GivenFact {
                    fact: value.fact_identifier().clone(),
                    values: vec![given],
                }),
            }
        }

        for value in scenario.expects() {
            let Some(raw) = value.non_blank_value() else {
                continue;
            };
            data.expects.push(ExpectedValue {
                fact: value.fact_identifier().clone(),
                expression: value.expression_identifier().clone(),
                path: resolve_path(descriptor, value)?,
                raw: raw.to_string(),
            });
        }

        Ok(data)
    }

    /// GIVEN facts
    #[inline]
    #[must_use]
    pub fn givens(&self) -> &[GivenFact] {
        &self.givens
    }

    /// EXPECT cells
    #[inline]
    #[must_use]
    pub fn expects(&self) -> &[ExpectedValue] {
        &self.expects
    }

    /// Container request for these givens
    #[must_use]
    pub fn request(&self, target: EvaluationTarget) -> EvaluationRequest {
        let mut request = EvaluationRequest::new(target);
        request.inputs = self
            .givens
            .iter()
            .map(|g| FactInput {
                fact: g.fact.clone(),
                values: g.values.iter().map(|v| (v.path.clone(), v.raw.clone())).collect(),
            })
            .collect();
        request
    }

    /// Check every expectation against `outcome`
    ///
    /// # Errors
    /// The first expectation that is missing or does not hold
    pub fn verify(&self, outcome: &EvaluationOutcome) -> Result<(), ScenarioError> {
        for expected in &self.expects {
            let fact = &expected.fact.name;
            let shown_path = if expected.path.is_empty() {
                String::new()
            } else {
                format!(".{}", expected.path)
            };

            let actual = outcome.value(fact, &expected.path).ok_or_else(|| {
                ScenarioError::MissingValue {
                    fact: fact.clone(),
                    path: shown_path.clone(),
                }
            })?;

            if !evaluator::evaluate(&expected.raw, actual)? {
                return Err(ScenarioError::Mismatch {
                    fact: fact.clone(),
                    path: shown_path,
                    expected: expected.raw.clone(),
                    actual: actual.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn resolve_path(
    descriptor: &SimulationDescriptor,
    value: &FactMappingValue,
) -> Result<String, ScenarioError> {
    descriptor
        .fact_mapping(value.fact_identifier(), value.expression_identifier())
        .map(scesim_model::FactMapping::expression_path)
        .ok_or_else(|| ScenarioError::UndeclaredColumn {
            fact: value.fact_identifier().name.clone(),
            expression: value.expression_identifier().name.clone(),
        })
}

/// Executes the scenarios of one descriptor
pub trait ScenarioRunner: Send {
    /// Descriptor the scenarios are written against
    fn descriptor(&self) -> &SimulationDescriptor;

    /// Scenarios to run, by index
    fn scenarios(&self) -> &ScenarioMap;

    /// Evaluate a single scenario
    ///
    /// # Errors
    /// Returns `ScenarioError` when the scenario does not pass
    fn run_scenario(
        &self,
        scenario: &Scenario,
        data: &ScenarioRunnerData,
    ) -> Result<(), ScenarioError>;

    /// Run all scenarios in index order
    ///
    /// Scenarios are numbered from 1; a failing scenario never stops the
    /// ones after it.
    fn run(&self) -> RunResult {
        let mut result = RunResult::default();

        for (position, scenario) in self.scenarios().values().enumerate() {
            let number = position + 1;
            result.run_count += 1;

            let outcome = ScenarioRunnerData::extract(self.descriptor(), scenario)
                .and_then(|data| self.run_scenario(scenario, &data));

            match outcome {
                Ok(()) => tracing::debug!(number, description = scenario.description(), "scenario passed"),
                Err(e) => {
                    tracing::warn!(number, description = scenario.description(), error = %e, "scenario failed");
                    result
                        .failures
                        .push(Failure::for_scenario(number, scenario.description(), &e.to_string()));
                }
            }
        }

        result
    }
}

/// Runs scenarios against a rule session
pub struct RuleScenarioRunner {
    container: Arc<dyn RuntimeContainer>,
    descriptor: SimulationDescriptor,
    scenarios: ScenarioMap,
    session: String,
}

impl RuleScenarioRunner {
    /// Create runner for `session`; an empty name selects the default session
    pub fn new(
        container: Arc<dyn RuntimeContainer>,
        descriptor: SimulationDescriptor,
        scenarios: ScenarioMap,
        session: impl Into<String>,
    ) -> Self {
        Self {
            container,
            descriptor,
            scenarios,
            session: session.into(),
        }
    }

    /// Session used for evaluation
    #[inline]
    #[must_use]
    pub fn session(&self) -> &str {
        &self.session
    }
}

impl ScenarioRunner for RuleScenarioRunner {
    fn descriptor(&self) -> &SimulationDescriptor {
        &self.descriptor
    }

    fn scenarios(&self) -> &ScenarioMap {
        &self.scenarios
    }

    fn run_scenario(
        &self,
        _scenario: &Scenario,
        data: &ScenarioRunnerData,
    ) -> Result<(), ScenarioError> {
        let request = data.request(EvaluationTarget::Session(self.session.clone()));
        let outcome = self.container.evaluate(&request)?;
        data.verify(&outcome)
    }
}

/// Runs scenarios against a decision model
pub struct DmnScenarioRunner {
    container: Arc<dyn RuntimeContainer>,
    descriptor: SimulationDescriptor,
    scenarios: ScenarioMap,
}

impl DmnScenarioRunner {
    /// Create runner; the model path comes from the descriptor
    pub fn new(
        container: Arc<dyn RuntimeContainer>,
        descriptor: SimulationDescriptor,
        scenarios: ScenarioMap,
    ) -> Self {
        Self {
            container,
            descriptor,
            scenarios,
        }
    }
}

impl ScenarioRunner for DmnScenarioRunner {
    fn descriptor(&self) -> &SimulationDescriptor {
        &self.descriptor
    }

    fn scenarios(&self) -> &ScenarioMap {
        &self.scenarios
    }

    fn run_scenario(
        &self,
        _scenario: &Scenario,
        data: &ScenarioRunnerData,
    ) -> Result<(), ScenarioError> {
        let model = self
            .descriptor
            .dmn_file_path()
            .ok_or_else(|| ScenarioError::new("DMN simulation has no dmnFilePath"))?;
        let outcome = self
            .container
            .evaluate(&data.request(EvaluationTarget::Model(model.to_string())))?;
        data.verify(&outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{FactValue, MockRuntimeContainer};
    use crate::error::ContainerError;
    use scesim_model::{FactMapping, FactMappingType, Simulation};

    fn applicant() -> FactIdentifier {
        FactIdentifier::new("Applicant", "com.acme.Applicant")
    }

    fn approval() -> FactIdentifier {
        FactIdentifier::new("LoanApproval", "com.acme.LoanApproval")
    }

    fn age() -> ExpressionIdentifier {
        ExpressionIdentifier::new("1|1", FactMappingType::Given)
    }

    fn approved() -> ExpressionIdentifier {
        ExpressionIdentifier::new("1|2", FactMappingType::Expect)
    }

    fn loan_simulation(rows: &[(&str, &str, &str)]) -> Simulation {
        let mut simulation = Simulation::new();
        let descriptor = simulation.descriptor_mut();
        descriptor.add_fact_mapping(FactMapping::new(applicant(), age()).with_step("age"));
        descriptor.add_fact_mapping(FactMapping::new(approval(), approved()).with_step("approved"));

        for (description, age_value, approved_value) in rows {
            let mut scenario = Scenario::with_description(*description);
            scenario.add_or_update_value(applicant(), age(), *age_value);
            scenario.add_or_update_value(approval(), approved(), *approved_value);
            simulation.push_scenario(scenario);
        }
        simulation
    }

    fn approving_container() -> MockRuntimeContainer {
        let mut container = MockRuntimeContainer::new();
        container.expect_evaluate().returning(|request| {
            let age: u32 = request
                .input("Applicant")
                .and_then(|i| i.values.first())
                .and_then(|(_, raw)| raw.parse().ok())
                .unwrap_or_default();
            Ok(EvaluationOutcome::new().with_value(
                "LoanApproval",
                "approved",
                FactValue::text((age >= 18).to_string()),
            ))
        });
        container
    }

    #[test]
    fn extract_groups_givens_and_skips_blanks() {
        let simulation = loan_simulation(&[("one", "34", "")]);
        let scenario = simulation.scenario_by_index(0).unwrap();

        let data = ScenarioRunnerData::extract(simulation.descriptor(), scenario).unwrap();
        assert_eq!(data.givens().len(), 1);
        assert_eq!(data.givens()[0].values[0].path, "age");
        assert!(data.expects().is_empty());
    }

    #[test]
    fn rule_runner_all_pass() {
        let simulation = loan_simulation(&[("adult", "34", "true"), ("minor", "16", "false")]);
        let runner = RuleScenarioRunner::new(
            Arc::new(approving_container()),
            simulation.descriptor().clone(),
            simulation.scenario_map(),
            "loanSession",
        );

        let result = runner.run();
        assert_eq!(result.run_count, 2);
        assert!(result.failures.is_empty());
    }

    #[test]
    fn mismatch_becomes_numbered_failure() {
        let simulation = loan_simulation(&[("adult", "34", "true"), ("minor", "16", "true")]);
        let runner = RuleScenarioRunner::new(
            Arc::new(approving_container()),
            simulation.descriptor().clone(),
            simulation.scenario_map(),
            "",
        );

        let result = runner.run();
        assert_eq!(result.run_count, 2);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(
            result.failures[0].message(),
            "#2: LoanApproval.approved: expected 'true' but was 'false'()"
        );
        assert_eq!(result.failures[0].display_name(), "#2: minor");
    }

    #[test]
    fn container_errors_are_isolated() {
        let mut container = MockRuntimeContainer::new();
        container
            .expect_evaluate()
            .times(2)
            .returning(|_| Err(ContainerError::UnknownSession("missing".to_string())));
        let simulation = loan_simulation(&[("a", "1", "true"), ("b", "2", "true")]);
        let runner = RuleScenarioRunner::new(
            Arc::new(container),
            simulation.descriptor().clone(),
            simulation.scenario_map(),
            "missing",
        );

        let result = runner.run();
        assert_eq!(result.failures.len(), 2);
        assert_eq!(result.failures[1].message(), "#2: session 'missing' not found()");
    }

    #[test]
    fn dmn_runner_targets_model() {
        let mut container = MockRuntimeContainer::new();
        container
            .expect_evaluate()
            .withf(|r| r.target == EvaluationTarget::Model("loan.dmn".to_string()))
            .returning(|_| {
                Ok(EvaluationOutcome::new().with_value("LoanApproval", "approved", FactValue::text("true")))
            });

        let mut simulation = loan_simulation(&[("adult", "34", "true")]);
        simulation.descriptor_mut().set_dmn_file_path("loan.dmn");
        let runner = DmnScenarioRunner::new(
            Arc::new(container),
            simulation.descriptor().clone(),
            simulation.scenario_map(),
        );

        assert!(runner.run().failures.is_empty());
    }

    #[test]
    fn missing_output_is_reported() {
        let mut container = MockRuntimeContainer::new();
        container.expect_evaluate().returning(|_| Ok(EvaluationOutcome::new()));
        let simulation = loan_simulation(&[("adult", "34", "true")]);
        let runner = RuleScenarioRunner::new(
            Arc::new(container),
            simulation.descriptor().clone(),
            simulation.scenario_map(),
            "",
        );

        let result = runner.run();
        assert_eq!(result.failures[0].message(), "#1: LoanApproval.approved: no value produced()");
    }
}
