use mockall::mock;
use pretty_assertions::assert_eq;
use scesim_model::{ScenarioMap, SimulationDescriptor};
use scesim_runner::{
    ChannelEventSource, EvaluationTarget, EventSource, RecordingEventSource, RunnerError,
    RuntimeContainer, ScenarioError, ScenarioRunner, ScenarioRunnerData, TestResultMessage,
};
use scesim_test_utils::{
    loan_simulation, setup_service, InMemoryModules, LoanContainer, StaticBuildInfo, DMN_DOCUMENT,
    LEGACY_DOCUMENT, LOAN_SESSION, RULE_DOCUMENT,
};
use std::path::Path;
use std::sync::Arc;

mock! {
    Events {}

    impl EventSource<TestResultMessage> for Events {
        fn fire(&self, event: TestResultMessage);
    }
}

mock! {
    Runner {}

    impl ScenarioRunner for Runner {
        fn descriptor(&self) -> &SimulationDescriptor;
        fn scenarios(&self) -> &ScenarioMap;
        fn run_scenario(
            &self,
            scenario: &scesim_model::Scenario,
            data: &ScenarioRunnerData,
        ) -> Result<(), ScenarioError>;
    }
}

fn project() -> &'static Path {
    Path::new("/work/loan")
}

fn loan_build() -> (StaticBuildInfo, Arc<LoanContainer>) {
    let container = Arc::new(LoanContainer::new());
    (StaticBuildInfo::with_container(container.clone()), container)
}

#[test]
fn run_all_tests_fires_once_on_default_channel() {
    let (build, _) = loan_build();
    let modules = InMemoryModules::new()
        .with_file("/work/loan/src/test/resources/rule.scesim", RULE_DOCUMENT)
        .with_file("/work/loan/src/test/resources/dmn.scesim", DMN_DOCUMENT);
    let (service, events) = setup_service(build, modules);

    service.run_all_tests("all", project()).unwrap();

    let fired = events.take();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].identifier(), "all");
    assert_eq!(fired[0].run_count(), 3);
    assert!(fired[0].was_successful(), "{:?}", fired[0].failures());
}

#[test]
fn run_all_tests_migrates_legacy_documents() {
    let (build, container) = loan_build();
    let modules = InMemoryModules::new().with_file("legacy.scesim", LEGACY_DOCUMENT);
    let (service, events) = setup_service(build, modules);

    service.run_all_tests("legacy", project()).unwrap();

    let message = events.last().unwrap();
    assert_eq!(message.run_count(), 2);
    assert!(message.was_successful(), "{:?}", message.failures());
    assert!(container
        .requests()
        .iter()
        .all(|r| r.target == EvaluationTarget::Session(String::new())));
}

#[test]
fn run_all_tests_with_custom_channel() {
    let (build, _) = loan_build();
    let modules = InMemoryModules::new().with_file("rule.scesim", RULE_DOCUMENT);
    let (service, default_events) = setup_service(build, modules);

    let mut custom = MockEvents::new();
    custom
        .expect_fire()
        .withf(|m| m.identifier() == "custom" && m.run_count() == 2)
        .times(1)
        .return_const(());

    service
        .run_all_tests_with("custom", project(), &custom)
        .unwrap();

    assert!(default_events.is_empty());
}

#[test]
fn run_all_tests_with_custom_supplier() {
    let (build, _) = loan_build();
    let modules = InMemoryModules::new().with_file("rule.scesim", RULE_DOCUMENT);
    let (service, default_events) = setup_service(build, modules);

    service.set_runner_supplier(Arc::new(
        |_: Arc<dyn RuntimeContainer>,
         descriptor: &SimulationDescriptor,
         scenarios: &ScenarioMap|
         -> Box<dyn ScenarioRunner> {
            let mut runner = MockRunner::new();
            runner.expect_descriptor().return_const(descriptor.clone());
            runner.expect_scenarios().return_const(scenarios.clone());
            runner
                .expect_run_scenario()
                .returning(|_, _| Err(ScenarioError::new("not evaluated")));
            Box::new(runner)
        },
    ));

    let custom = RecordingEventSource::new();
    service.run_all_tests_with("custom", project(), &custom).unwrap();

    let message = custom.last().unwrap();
    assert_eq!(message.run_count(), 2);
    assert_eq!(message.failures()[0].message(), "#1: not evaluated()");
    assert_eq!(message.failures()[1].display_name(), "#2: Minor applicant is rejected");
    assert!(default_events.is_empty());
}

#[test]
fn run_test_reports_failed_expectations() {
    let (build, _) = loan_build();
    let (service, events) = setup_service(build, InMemoryModules::new());
    let simulation = loan_simulation(&[
        ("Adult applicant is approved", "34", "true"),
        ("Minor applicant is approved", "16", "true"),
        ("Anyone over ten", "11", ""),
    ]);

    service
        .run_test(
            "single",
            project(),
            simulation.descriptor(),
            &simulation.scenario_map(),
        )
        .unwrap();

    let message = events.last().unwrap();
    assert_eq!(message.run_count(), 3);
    assert_eq!(message.failures().len(), 1);
    assert_eq!(
        message.failures()[0].message(),
        "#2: LoanApproval.approved: expected 'true' but was 'false'()"
    );
    assert!(message.failures()[0]
        .display_name()
        .starts_with("#2: Minor applicant is approved"));
}

#[test]
fn run_test_uses_descriptor_session() {
    let (build, container) = loan_build();
    let (service, _events) = setup_service(build, InMemoryModules::new());
    let simulation = loan_simulation(&[("adult", "40", ">= 0")]);

    service
        .run_test("s", project(), simulation.descriptor(), &simulation.scenario_map())
        .unwrap();

    let requests = container.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].target, EvaluationTarget::Session(LOAN_SESSION.to_string()));
}

#[test]
fn broken_build_aborts_without_firing() {
    let modules = InMemoryModules::new().with_file("rule.scesim", RULE_DOCUMENT);
    let (service, events) = setup_service(StaticBuildInfo::broken(), modules);

    let err = service.run_all_tests("all", project()).unwrap_err();
    assert!(matches!(err, RunnerError::IllegalArgument(_)));
    assert!(events.is_empty());
}

#[test]
fn unsupported_document_aborts_without_firing() {
    let (build, _) = loan_build();
    let document = RULE_DOCUMENT.replacen("version=\"1.3\"", "version=\"0.7\"", 1);
    let modules = InMemoryModules::new().with_file("old.scesim", &document);
    let (service, events) = setup_service(build, modules);

    let err = service.run_all_tests("all", project()).unwrap_err();
    assert!(matches!(err, RunnerError::Persistence(_)));
    assert_eq!(
        err.to_string(),
        "Version 0.7 of the file is not supported. Current version is 1.3"
    );
    assert!(events.is_empty());
}

#[tokio::test]
async fn results_reach_an_async_receiver() {
    let (build, _) = loan_build();
    let modules = InMemoryModules::new().with_file("dmn.scesim", DMN_DOCUMENT);
    let (service, _events) = setup_service(build, modules);
    let (source, mut receiver) = ChannelEventSource::channel();

    tokio::task::spawn_blocking(move || service.run_all_tests_with("async", project(), &source))
        .await
        .unwrap()
        .unwrap();

    let message = receiver.recv().await.unwrap();
    assert_eq!(message.identifier(), "async");
    assert_eq!(message.run_count(), 1);
    assert!(message.was_successful());
}
