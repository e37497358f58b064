//! Scenario runner service
//!
//! Entry point used by hosts. Every invocation resolves its documents and
//! runtime container first, runs the scenarios, then fires exactly one
//! [`TestResultMessage`]. Infrastructure failures are returned as
//! [`RunnerError`] before anything runs or fires.

use crate::config::RunnerConfig;
use crate::container::RuntimeContainer;
use crate::error::{RunnerError, RunnerResult};
use crate::event::EventSource;
use crate::message::{RunResult, TestResultMessage};
use crate::runner::{DmnScenarioRunner, RuleScenarioRunner, ScenarioRunner};
use crate::services::{BuildInfoService, ModuleService, ScenarioFile};
use parking_lot::RwLock;
use scesim_model::{ScenarioMap, SimulationDescriptor, SimulationType};
use scesim_persistence::XmlPersistence;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Factory creating the runner for one descriptor
pub type RunnerSupplier = Arc<
    dyn Fn(Arc<dyn RuntimeContainer>, &SimulationDescriptor, &ScenarioMap) -> Box<dyn ScenarioRunner>
        + Send
        + Sync,
>;

/// Runner chosen by simulation type
///
/// RULE descriptors run against their DMO session, DMN descriptors against
/// their decision model.
#[must_use]
pub fn default_runner_supplier() -> RunnerSupplier {
    Arc::new(
        |container: Arc<dyn RuntimeContainer>,
         descriptor: &SimulationDescriptor,
         scenarios: &ScenarioMap|
         -> Box<dyn ScenarioRunner> {
            match descriptor.simulation_type() {
                SimulationType::Rule => Box::new(RuleScenarioRunner::new(
                    container,
                    descriptor.clone(),
                    scenarios.clone(),
                    descriptor.dmo_session().unwrap_or_default(),
                )),
                SimulationType::Dmn => Box::new(DmnScenarioRunner::new(
                    container,
                    descriptor.clone(),
                    scenarios.clone(),
                )),
            }
        },
    )
}

/// Runs scenario documents and reports their results
pub struct ScenarioRunnerService {
    config: RunnerConfig,
    build_info: Arc<dyn BuildInfoService>,
    modules: Arc<dyn ModuleService>,
    default_events: Arc<dyn EventSource<TestResultMessage>>,
    persistence: XmlPersistence,
    supplier: RwLock<RunnerSupplier>,
}

impl ScenarioRunnerService {
    /// Create service with the default runner supplier
    pub fn new(
        config: RunnerConfig,
        build_info: Arc<dyn BuildInfoService>,
        modules: Arc<dyn ModuleService>,
        default_events: Arc<dyn EventSource<TestResultMessage>>,
    ) -> Self {
        Self {
            config,
            build_info,
            modules,
            default_events,
            persistence: XmlPersistence::new(),
            supplier: RwLock::new(default_runner_supplier()),
        }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Replace the runner factory
    pub fn set_runner_supplier(&self, supplier: RunnerSupplier) {
        *self.supplier.write() = supplier;
    }

    /// Run every scenario document of the module containing `path`
    ///
    /// The result is fired on the default event source.
    ///
    /// # Errors
    /// See [`run_all_tests_with`](Self::run_all_tests_with)
    pub fn run_all_tests(&self, identifier: &str, path: &Path) -> RunnerResult<()> {
        self.run_all_tests_with(identifier, path, self.default_events.as_ref())
    }

    /// Run every scenario document of the module containing `path`
    ///
    /// The result is fired on `events` only. A module without documents
    /// yields a message with run count 0 and no container lookup.
    ///
    /// # Errors
    /// - `RunnerError::Module` if the module resources cannot be listed
    /// - `RunnerError::Persistence` if a document cannot be read
    /// - `RunnerError::IllegalArgument` if the build has no container
    pub fn run_all_tests_with(
        &self,
        identifier: &str,
        path: &Path,
        events: &dyn EventSource<TestResultMessage>,
    ) -> RunnerResult<()> {
        let started = Instant::now();
        tracing::info!(identifier, path = %path.display(), "running all scenario documents");

        let files: Vec<ScenarioFile> = match self.modules.resolve_module(path) {
            Some(module) => self
                .modules
                .scenario_files(&module)?
                .into_iter()
                .filter(|f| self.config.is_scenario_file(&f.path))
                .collect(),
            None => {
                tracing::warn!(path = %path.display(), "no module found");
                Vec::new()
            }
        };

        if files.is_empty() {
            Self::finish(identifier, RunResult::default(), started, events);
            return Ok(());
        }

        let container = self.kie_container(path)?;
        let mut documents = Vec::with_capacity(files.len());
        for file in &files {
            tracing::debug!(file = %file.path.display(), "loading scenario document");
            let model = self
                .persistence
                .unmarshal_with(&file.content, self.config.validate_documents)?;
            documents.push(model.into_simulation());
        }

        let supplier = self.supplier.read().clone();
        let mut result = RunResult::default();
        for simulation in &documents {
            let runner = supplier(
                Arc::clone(&container),
                simulation.descriptor(),
                &simulation.scenario_map(),
            );
            result.absorb(runner.run());
        }

        Self::finish(identifier, result, started, events);
        Ok(())
    }

    /// Run the given scenarios against the container of `path`
    ///
    /// The result is fired on the default event source.
    ///
    /// # Errors
    /// Returns `RunnerError::IllegalArgument` if the build has no container
    pub fn run_test(
        &self,
        identifier: &str,
        path: &Path,
        descriptor: &SimulationDescriptor,
        scenarios: &ScenarioMap,
    ) -> RunnerResult<()> {
        let started = Instant::now();
        tracing::info!(identifier, scenarios = scenarios.len(), "running scenarios");

        let container = self.kie_container(path)?;
        let supplier = self.supplier.read().clone();
        let result = supplier(container, descriptor, scenarios).run();

        Self::finish(identifier, result, started, self.default_events.as_ref());
        Ok(())
    }

    /// Runtime container built for the project of `path`
    ///
    /// # Errors
    /// Returns `RunnerError::IllegalArgument` with
    /// [`MISSING_CONTAINER_MESSAGE`](crate::error::MISSING_CONTAINER_MESSAGE)
    /// when the build produced none
    pub fn kie_container(&self, path: &Path) -> RunnerResult<Arc<dyn RuntimeContainer>> {
        let info = self.build_info.build_info(path);
        info.container().ok_or_else(|| {
            for message in info.messages() {
                tracing::warn!(path = %path.display(), "build: {message}");
            }
            RunnerError::missing_container()
        })
    }

    fn finish(
        identifier: &str,
        result: RunResult,
        started: Instant,
        events: &dyn EventSource<TestResultMessage>,
    ) {
        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let message = TestResultMessage::from_result(identifier, result, elapsed);
        tracing::info!(
            identifier,
            run_count = message.run_count(),
            failures = message.failures().len(),
            run_time_ms = elapsed,
            "scenario run finished"
        );
        events.fire(message);
    }
}

impl std::fmt::Debug for ScenarioRunnerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioRunnerService")
            .field("config", &self.config)
            .field("persistence", &self.persistence)
            .finish_non_exhaustive()
    }
}
