//! Testing utilities for the scesim workspace
//!
//! Shared fixtures, in-memory collaborators and a fake loan-approval
//! container.

#![allow(missing_docs)]

use parking_lot::Mutex;
use scesim_model::{
    ExpressionIdentifier, FactIdentifier, FactMapping, FactMappingType, Scenario, Simulation,
    SimulationDescriptor,
};
use scesim_runner::{
    BuildInfo, BuildInfoService, ContainerError, EvaluationOutcome, EvaluationRequest,
    EvaluationTarget, FactValue, ModuleInfo, ModuleService, RecordingEventSource, RunnerConfig,
    RunnerResult, RuntimeContainer, ScenarioFile, ScenarioRunnerService, TestResultMessage,
};
use std::path::Path;
use std::sync::Arc;

pub const RULE_DOCUMENT: &str =
    include_str!("../../scesim-persistence/tests/resources/scesim-rule.scesim");
pub const DMN_DOCUMENT: &str =
    include_str!("../../scesim-persistence/tests/resources/scesim-dmn.scesim");
pub const LEGACY_DOCUMENT: &str =
    include_str!("../../scesim-persistence/tests/resources/scesim-1-0.scesim");

pub const LOAN_SESSION: &str = "loanSession";
pub const ELIGIBILITY_MODEL: &str = "src/main/resources/com/acme/loan/eligibility.dmn";

pub fn applicant() -> FactIdentifier {
    FactIdentifier::new("Applicant", "com.acme.loan.Applicant")
}

pub fn loan_approval() -> FactIdentifier {
    FactIdentifier::new("LoanApproval", "com.acme.loan.LoanApproval")
}

pub fn given(name: &str) -> ExpressionIdentifier {
    ExpressionIdentifier::new(name, FactMappingType::Given)
}

pub fn expect(name: &str) -> ExpressionIdentifier {
    ExpressionIdentifier::new(name, FactMappingType::Expect)
}

/// RULE simulation with one `(description, age, approved)` row per scenario
pub fn loan_simulation(rows: &[(&str, &str, &str)]) -> Simulation {
    let mut simulation = Simulation::with_descriptor(SimulationDescriptor::rule(LOAN_SESSION));
    let descriptor = simulation.descriptor_mut();
    descriptor.add_fact_mapping(FactMapping::new(applicant(), given("1|1")).with_step("age"));
    descriptor
        .add_fact_mapping(FactMapping::new(loan_approval(), expect("1|2")).with_step("approved"));

    for (description, age, approved) in rows {
        let mut scenario = Scenario::with_description(*description);
        scenario.add_or_update_value(applicant(), given("1|1"), *age);
        scenario.add_or_update_value(loan_approval(), expect("1|2"), *approved);
        simulation.push_scenario(scenario);
    }
    simulation
}

/// Approves applicants of 18 and older
///
/// Answers `LoanApproval.approved`, also as the bare fact, for the loan
/// session and `Eligibility` for the eligibility model. Every request is
/// kept for inspection.
#[derive(Debug, Default)]
pub struct LoanContainer {
    requests: Mutex<Vec<EvaluationRequest>>,
}

impl LoanContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<EvaluationRequest> {
        self.requests.lock().clone()
    }

    fn first_number(request: &EvaluationRequest, fact: &str) -> Option<f64> {
        request
            .input(fact)
            .and_then(|i| i.values.first())
            .and_then(|(_, raw)| raw.trim().parse().ok())
    }
}

impl RuntimeContainer for LoanContainer {
    fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationOutcome, ContainerError> {
        self.requests.lock().push(request.clone());

        match &request.target {
            EvaluationTarget::Session(name) if name == LOAN_SESSION || name.is_empty() => {
                let age = Self::first_number(request, "Applicant")
                    .ok_or_else(|| ContainerError::Evaluation("Applicant.age missing".to_string()))?;
                let approved = FactValue::text((age >= 18.0).to_string());
                Ok(EvaluationOutcome::new()
                    .with_value("LoanApproval", "approved", approved.clone())
                    .with_value("LoanApproval", "", approved))
            }
            EvaluationTarget::Session(name) => Err(ContainerError::UnknownSession(name.clone())),
            EvaluationTarget::Model(path) if path == ELIGIBILITY_MODEL => {
                let eligibility = match Self::first_number(request, "Applicant age") {
                    Some(age) if age >= 18.0 => FactValue::text("ELIGIBLE"),
                    Some(_) => FactValue::text("INELIGIBLE"),
                    None => FactValue::Null,
                };
                Ok(EvaluationOutcome::new().with_value("Eligibility", "", eligibility))
            }
            EvaluationTarget::Model(path) => Err(ContainerError::UnknownModel(path.clone())),
        }
    }
}

/// Build info returning a fixed container, or none
#[derive(Clone, Default)]
pub struct StaticBuildInfo {
    container: Option<Arc<dyn RuntimeContainer>>,
}

impl StaticBuildInfo {
    pub fn with_container(container: Arc<dyn RuntimeContainer>) -> Self {
        Self {
            container: Some(container),
        }
    }

    pub fn broken() -> Self {
        Self::default()
    }
}

impl BuildInfoService for StaticBuildInfo {
    fn build_info(&self, _path: &Path) -> BuildInfo {
        match &self.container {
            Some(container) => BuildInfo::with_container(Arc::clone(container)),
            None => BuildInfo::failed(vec!["compilation failed".to_string()]),
        }
    }
}

/// Single module holding in-memory documents
#[derive(Debug, Clone, Default)]
pub struct InMemoryModules {
    files: Vec<ScenarioFile>,
}

impl InMemoryModules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.push(ScenarioFile::new(path, content));
        self
    }
}

impl ModuleService for InMemoryModules {
    fn resolve_module(&self, path: &Path) -> Option<ModuleInfo> {
        Some(ModuleInfo::new("test-module", path))
    }

    fn scenario_files(&self, _module: &ModuleInfo) -> RunnerResult<Vec<ScenarioFile>> {
        Ok(self.files.clone())
    }
}

/// Service wired to in-memory collaborators, plus its default event recorder
pub fn setup_service(
    build_info: StaticBuildInfo,
    modules: InMemoryModules,
) -> (
    ScenarioRunnerService,
    Arc<RecordingEventSource<TestResultMessage>>,
) {
    let events = Arc::new(RecordingEventSource::new());
    let service = ScenarioRunnerService::new(
        RunnerConfig::default(),
        Arc::new(build_info),
        Arc::new(modules),
        events.clone(),
    );
    (service, events)
}
