//! scesim command line tools
//!
//! File-level operations behind the `scesim` binary. Each command reads one
//! document from disk and returns what the binary prints.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

use anyhow::{Context, Result};
use scesim_model::ScenarioSimulationModel;
use scesim_persistence::{migration, PersistenceError, XmlPersistence};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` when verbose.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Upgrade a document to the current version
///
/// With `in_place` the file is rewritten and the returned text is a status
/// line; otherwise the migrated XML is returned.
///
/// # Errors
/// Fails if the file cannot be read or written, or the version is unsupported
pub fn migrate_file(path: &Path, in_place: bool) -> Result<String> {
    let xml = read(path)?;
    let persistence = XmlPersistence::instance();
    let from = persistence.try_extract_version(&xml)?.to_string();
    let migrated = persistence
        .migrate_if_necessary(&xml)
        .with_context(|| format!("failed to migrate {}", path.display()))?;

    if !in_place {
        return Ok(migrated);
    }
    if from == XmlPersistence::current_version() {
        return Ok(format!("{}: already at version {from}", path.display()));
    }

    fs::write(path, &migrated).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(file = %path.display(), from = %from, "document migrated");
    Ok(format!(
        "{}: migrated {from} -> {}",
        path.display(),
        XmlPersistence::current_version()
    ))
}

/// Version report for a document
///
/// # Errors
/// Fails if the file cannot be read or carries no version
pub fn version_report(path: &Path) -> Result<String> {
    let xml = read(path)?;
    let version = XmlPersistence::instance().try_extract_version(&xml)?;
    let current = XmlPersistence::current_version();

    let mut report = format!("{}: version {version}", path.display());
    if version == current {
        report.push_str(" (current)");
        return Ok(report);
    }

    let mut steps = Vec::new();
    let mut at = version;
    while let Some(step) = migration::step_from(at) {
        steps.push(step);
        at = step.to;
    }
    if at != current {
        report.push_str(" (unsupported)");
        return Ok(report);
    }

    for step in steps {
        let _ = write!(report, "\n  {} -> {}: {}", step.from, step.to, step.summary);
    }
    Ok(report)
}

/// Decode and validate a document
///
/// # Errors
/// Fails with the persistence error, validation issues included
pub fn validate_file(path: &Path) -> Result<ScenarioSimulationModel> {
    let xml = read(path)?;
    XmlPersistence::instance()
        .unmarshal(&xml)
        .map_err(|e| match e {
            PersistenceError::Validation(issues) => anyhow::anyhow!(
                "{} is invalid:\n{}",
                path.display(),
                issues
                    .iter()
                    .map(|i| format!("  - {i}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
            other => anyhow::Error::new(other).context(format!("failed to load {}", path.display())),
        })
}

/// One scenario row in an [`Inspection`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioSummary {
    /// 1-based position
    pub number: usize,
    /// Scenario description
    pub description: String,
    /// Non-blank GIVEN cells
    pub givens: usize,
    /// Non-blank EXPECT cells
    pub expects: usize,
}

/// Overview of a decoded document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inspection {
    /// Version declared before migration
    pub source_version: String,
    /// Simulation type marker
    pub simulation_type: String,
    /// Rule session, RULE only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dmo_session: Option<String>,
    /// Decision model path, DMN only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dmn_file_path: Option<String>,
    /// Column count
    pub fact_mappings: usize,
    /// Declared imports
    pub imports: Vec<String>,
    /// Scenario rows
    pub scenarios: Vec<ScenarioSummary>,
}

impl Inspection {
    /// Summarise a document, migrating it if needed
    ///
    /// # Errors
    /// Fails if the document cannot be migrated or decoded
    pub fn of(xml: &str) -> Result<Self> {
        let persistence = XmlPersistence::instance();
        let source_version = persistence.try_extract_version(xml)?.to_string();
        let model = persistence.unmarshal_with(xml, false)?;
        let simulation = model.simulation();
        let descriptor = simulation.descriptor();

        Ok(Self {
            source_version,
            simulation_type: descriptor.simulation_type().to_string(),
            dmo_session: descriptor.dmo_session().map(str::to_string),
            dmn_file_path: descriptor.dmn_file_path().map(str::to_string),
            fact_mappings: descriptor.fact_mappings().len(),
            imports: model
                .imports()
                .imports()
                .iter()
                .map(|i| i.type_name().to_string())
                .collect(),
            scenarios: simulation
                .scenarios()
                .iter()
                .enumerate()
                .map(|(i, s)| ScenarioSummary {
                    number: i + 1,
                    description: s.description().to_string(),
                    givens: s.givens().filter(|v| v.non_blank_value().is_some()).count(),
                    expects: s.expects().filter(|v| v.non_blank_value().is_some()).count(),
                })
                .collect(),
        })
    }

    /// Human readable rendering
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "version:       {}", self.source_version);
        let _ = writeln!(out, "type:          {}", self.simulation_type);
        if let Some(session) = &self.dmo_session {
            let _ = writeln!(out, "dmoSession:    {session}");
        }
        if let Some(path) = &self.dmn_file_path {
            let _ = writeln!(out, "dmnFilePath:   {path}");
        }
        let _ = writeln!(out, "fact mappings: {}", self.fact_mappings);
        for import in &self.imports {
            let _ = writeln!(out, "import:        {import}");
        }
        let _ = writeln!(out, "scenarios:     {}", self.scenarios.len());
        for s in &self.scenarios {
            let _ = writeln!(
                out,
                "  #{}: {} ({} given, {} expect)",
                s.number, s.description, s.givens, s.expects
            );
        }
        out
    }
}

/// Inspect a document on disk
///
/// # Errors
/// Fails if the file cannot be read or decoded
pub fn inspect_file(path: &Path, json: bool) -> Result<String> {
    let inspection = Inspection::of(&read(path)?)
        .with_context(|| format!("failed to inspect {}", path.display()))?;
    if json {
        Ok(serde_json::to_string_pretty(&inspection)?)
    } else {
        Ok(inspection.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LEGACY: &str = include_str!("../../scesim-persistence/tests/resources/scesim-1-0.scesim");
    const DMN: &str = include_str!("../../scesim-persistence/tests/resources/scesim-dmn.scesim");

    fn document(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".scesim").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn migrate_in_place_rewrites_file() {
        let file = document(LEGACY);

        let status = migrate_file(file.path(), true).unwrap();
        assert!(status.ends_with("migrated 1.0 -> 1.3"));

        let rewritten = fs::read_to_string(file.path()).unwrap();
        assert_eq!(XmlPersistence::instance().extract_version(&rewritten), "1.3");
        assert!(!rewritten.contains("EXPECTED"));

        let again = migrate_file(file.path(), true).unwrap();
        assert!(again.ends_with("already at version 1.3"));
    }

    #[test]
    fn migrate_to_stdout_leaves_file() {
        let file = document(LEGACY);
        let migrated = migrate_file(file.path(), false).unwrap();

        assert!(migrated.contains("version=\"1.3\""));
        assert_eq!(fs::read_to_string(file.path()).unwrap(), LEGACY);
    }

    #[test]
    fn version_report_lists_steps() {
        let file = document(LEGACY);
        let report = version_report(file.path()).unwrap();
        let lines: Vec<&str> = report.lines().collect();

        assert!(lines[0].ends_with("version 1.0"));
        assert_eq!(lines.len(), 4);
        assert!(lines[1].trim_start().starts_with("1.0 -> 1.1"));

        let current = document(DMN);
        assert!(version_report(current.path()).unwrap().ends_with("(current)"));

        let unknown = document("<ScenarioSimulationModel version=\"0.2\"/>");
        assert!(version_report(unknown.path()).unwrap().ends_with("(unsupported)"));
    }

    #[test]
    fn validate_reports_issues() {
        let file = document(&DMN.replace(
            "<dmnFilePath>src/main/resources/com/acme/loan/eligibility.dmn</dmnFilePath>",
            "",
        ));
        let err = validate_file(file.path()).unwrap_err().to_string();
        assert!(err.contains("is invalid"));
        assert!(err.contains("dmnFilePath"));

        assert!(validate_file(document(DMN).path()).is_ok());
    }

    #[test]
    fn inspect_dmn_as_json() {
        let file = document(DMN);
        let json = inspect_file(file.path(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["simulation_type"], "DMN");
        assert_eq!(value["source_version"], "1.3");
        assert!(value.get("dmo_session").is_none());
        assert_eq!(value["scenarios"][0]["description"], "Adult is eligible");
        assert_eq!(value["scenarios"][0]["expects"], 1);
    }

    #[test]
    fn inspect_legacy_as_text() {
        let text = Inspection::of(LEGACY).unwrap().to_text();
        assert!(text.starts_with("version:       1.0\ntype:          RULE\n"));
        assert!(text.contains("  #2: Minor applicant is rejected (1 given, 1 expect)"));
    }
}
