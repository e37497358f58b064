//! Project collaborators consumed by the runner service

use crate::container::RuntimeContainer;
use crate::error::RunnerResult;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of building the project a path belongs to
#[derive(Clone, Default)]
pub struct BuildInfo {
    container: Option<Arc<dyn RuntimeContainer>>,
    messages: Vec<String>,
}

impl BuildInfo {
    /// Successful build
    #[must_use]
    pub fn with_container(container: Arc<dyn RuntimeContainer>) -> Self {
        Self {
            container: Some(container),
            messages: Vec::new(),
        }
    }

    /// Build that produced no container
    #[must_use]
    pub fn failed(messages: Vec<String>) -> Self {
        Self {
            container: None,
            messages,
        }
    }

    /// Runtime container, if the build succeeded
    #[inline]
    #[must_use]
    pub fn container(&self) -> Option<Arc<dyn RuntimeContainer>> {
        self.container.clone()
    }

    /// Build diagnostics
    #[inline]
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl fmt::Debug for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildInfo")
            .field("has_container", &self.container.is_some())
            .field("messages", &self.messages)
            .finish()
    }
}

/// Provides build results for project paths
#[cfg_attr(test, mockall::automock)]
pub trait BuildInfoService: Send + Sync {
    /// Build info of the project containing `path`
    fn build_info(&self, path: &Path) -> BuildInfo;
}

/// A project module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Module name
    pub name: String,
    /// Module root directory
    pub root: PathBuf,
}

impl ModuleInfo {
    /// Create module
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }
}

/// A document found in a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioFile {
    /// Location of the document
    pub path: PathBuf,
    /// Raw XML
    pub content: String,
}

impl ScenarioFile {
    /// Create file entry
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Module lookup and resource listing
#[cfg_attr(test, mockall::automock)]
pub trait ModuleService: Send + Sync {
    /// Module that owns `path`
    fn resolve_module(&self, path: &Path) -> Option<ModuleInfo>;

    /// All resources of `module` that may be scenario documents
    ///
    /// # Errors
    /// Returns `RunnerError::Module` if the resources cannot be listed
    fn scenario_files(&self, module: &ModuleInfo) -> RunnerResult<Vec<ScenarioFile>>;
}
