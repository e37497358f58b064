//! scesim Runner
//!
//! Executes scenario-simulation documents against a runtime container and
//! reports one aggregated [`TestResultMessage`] per invocation.
//!
//! # Architecture
//!
//! ```text
//! ScenarioRunnerService
//!   ├── ModuleService ──► scenario documents ──► XmlPersistence (migrate + unmarshal)
//!   ├── BuildInfoService ──► RuntimeContainer
//!   ├── RunnerSupplier ──► RuleScenarioRunner | DmnScenarioRunner
//!   └── EventSource<TestResultMessage> (default or per call)
//! ```
//!
//! # Example
//!
//! ```rust
//! use scesim_runner::prelude::*;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! struct NoBuild;
//! impl BuildInfoService for NoBuild {
//!     fn build_info(&self, _: &Path) -> BuildInfo {
//!         BuildInfo::failed(Vec::new())
//!     }
//! }
//!
//! struct NoModules;
//! impl ModuleService for NoModules {
//!     fn resolve_module(&self, _: &Path) -> Option<ModuleInfo> {
//!         None
//!     }
//!     fn scenario_files(&self, _: &ModuleInfo) -> RunnerResult<Vec<ScenarioFile>> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! let events = Arc::new(RecordingEventSource::new());
//! let service = ScenarioRunnerService::new(
//!     RunnerConfig::default(),
//!     Arc::new(NoBuild),
//!     Arc::new(NoModules),
//!     events.clone(),
//! );
//!
//! service.run_all_tests("suite", Path::new("/project")).unwrap();
//! assert_eq!(events.last().unwrap().run_count(), 0);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod container;
pub mod error;
pub mod evaluator;
pub mod event;
pub mod message;
pub mod runner;
pub mod service;
pub mod services;

pub use config::RunnerConfig;
pub use container::{
    EvaluationOutcome, EvaluationRequest, EvaluationTarget, FactInput, FactValue, RuntimeContainer,
};
pub use error::{ContainerError, RunnerError, RunnerResult, ScenarioError, MISSING_CONTAINER_MESSAGE};
pub use event::{ChannelEventSource, EventSource, RecordingEventSource};
pub use message::{Failure, RunResult, TestResultMessage};
pub use runner::{DmnScenarioRunner, RuleScenarioRunner, ScenarioRunner, ScenarioRunnerData};
pub use service::{default_runner_supplier, RunnerSupplier, ScenarioRunnerService};
pub use services::{BuildInfo, BuildInfoService, ModuleInfo, ModuleService, ScenarioFile};

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        BuildInfo, BuildInfoService, ChannelEventSource, EvaluationOutcome, EvaluationRequest,
        EvaluationTarget, EventSource, FactValue, ModuleInfo, ModuleService, RecordingEventSource,
        RunnerConfig, RunnerError, RunnerResult, RuntimeContainer, ScenarioError, ScenarioFile,
        ScenarioRunner, ScenarioRunnerService, TestResultMessage,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
