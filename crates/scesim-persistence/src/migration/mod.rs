//! Schema migration
//!
//! Older documents are upgraded by walking [`MIGRATIONS`], an ordered table
//! of single-version steps, until the current version is reached. Every step
//! is a streaming rewrite of the XML events: the document is never decoded
//! into the model in between, so a step only has to understand the schema it
//! starts from.

use crate::error::{PersistenceError, PersistenceResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use scesim_model::CURRENT_VERSION;

mod steps;

pub(crate) const ROOT_ELEMENT: &str = "ScenarioSimulationModel";

/// One schema upgrade
#[derive(Debug, Clone, Copy)]
pub struct MigrationStep {
    /// Version the step accepts
    pub from: &'static str,
    /// Version the step produces
    pub to: &'static str,
    /// What the step changes
    pub summary: &'static str,
    apply: fn(&str, &'static str) -> PersistenceResult<String>,
}

impl MigrationStep {
    /// Run this step on a document at `from`
    ///
    /// # Errors
    /// Returns `PersistenceError::Migration` wrapping the XML failure
    pub fn apply(&self, xml: &str) -> PersistenceResult<String> {
        (self.apply)(xml, self.to).map_err(|e| PersistenceError::Migration {
            from: self.from,
            to: self.to,
            source: Box::new(e),
        })
    }
}

/// Known upgrades, oldest first
pub const MIGRATIONS: &[MigrationStep] = &[
    MigrationStep {
        from: "1.0",
        to: "1.1",
        summary: "rename EXPECTED expression type to EXPECT",
        apply: steps::rename_expected,
    },
    MigrationStep {
        from: "1.1",
        to: "1.2",
        summary: "add simulation type and DMO session to descriptors",
        apply: steps::add_type_and_session,
    },
    MigrationStep {
        from: "1.2",
        to: "1.3",
        summary: "give every fact mapping a root expression element",
        apply: steps::add_root_expression_elements,
    },
];

/// Step starting at `version`
#[must_use]
pub fn step_from(version: &str) -> Option<&'static MigrationStep> {
    MIGRATIONS.iter().find(|s| s.from == version)
}

/// Upgrade `xml` from `version` to the current version
///
/// `version` must be the version declared by `xml`.
///
/// # Errors
/// - `PersistenceError::UnsupportedVersion` if no chain of steps starts at
///   `version`
/// - `PersistenceError::Migration` if a step cannot rewrite the document
pub fn migrate(xml: &str, version: &str) -> PersistenceResult<String> {
    if version == CURRENT_VERSION {
        return Ok(xml.to_string());
    }

    if step_from(version).is_none() {
        return Err(PersistenceError::unsupported_version(version));
    }

    let mut current = version;
    let mut document = xml.to_string();

    while current != CURRENT_VERSION {
        let step = step_from(current).ok_or_else(|| PersistenceError::unsupported_version(version))?;
        tracing::debug!(from = step.from, to = step.to, "migrating document: {}", step.summary);
        document = step.apply(&document)?;
        current = step.to;
    }

    Ok(document)
}

/// Event rewrite hook used by the steps
///
/// `ancestors` holds the names of the enclosing elements of `event`; for an
/// end tag it does not include the element being closed.
pub(crate) trait Rewrite {
    fn rewrite(
        &mut self,
        event: Event<'_>,
        ancestors: &[Vec<u8>],
        out: &mut Writer<Vec<u8>>,
    ) -> PersistenceResult<()>;
}

/// Stream `xml` through `rewriter`, stamping the root with `to_version`
pub(crate) fn rewrite_document<R: Rewrite>(
    xml: &str,
    to_version: &str,
    rewriter: &mut R,
) -> PersistenceResult<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + 128));
    let mut ancestors: Vec<Vec<u8>> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            PersistenceError::Xml(format!("{} at position {}", e, reader.buffer_position()))
        })?;

        match event {
            Event::Eof => break,
            Event::Start(start) => {
                let name = start.name().as_ref().to_vec();
                let start = stamp_root(start, &ancestors, to_version)?;
                rewriter.rewrite(Event::Start(start), &ancestors, &mut writer)?;
                ancestors.push(name);
            }
            Event::Empty(start) => {
                let start = stamp_root(start, &ancestors, to_version)?;
                rewriter.rewrite(Event::Empty(start), &ancestors, &mut writer)?;
            }
            Event::End(end) => {
                ancestors.pop();
                rewriter.rewrite(Event::End(end), &ancestors, &mut writer)?;
            }
            other => rewriter.rewrite(other, &ancestors, &mut writer)?,
        }
    }

    String::from_utf8(writer.into_inner()).map_err(PersistenceError::xml)
}

fn stamp_root<'a>(
    start: BytesStart<'a>,
    ancestors: &[Vec<u8>],
    to_version: &str,
) -> PersistenceResult<BytesStart<'a>> {
    if !ancestors.is_empty() || start.name().as_ref() != ROOT_ELEMENT.as_bytes() {
        return Ok(start);
    }

    let mut stamped = BytesStart::new(ROOT_ELEMENT);
    for attr in start.attributes().with_checks(false) {
        let attr = attr.map_err(PersistenceError::xml)?;
        if attr.key.as_ref() == b"version" {
            stamped.push_attribute(("version", to_version));
        } else {
            stamped.push_attribute(attr);
        }
    }
    Ok(stamped.into_owned())
}

pub(crate) fn write_event(out: &mut Writer<Vec<u8>>, event: Event<'_>) -> PersistenceResult<()> {
    out.write_event(event).map_err(PersistenceError::xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PassThrough;

    impl Rewrite for PassThrough {
        fn rewrite(
            &mut self,
            event: Event<'_>,
            _ancestors: &[Vec<u8>],
            out: &mut Writer<Vec<u8>>,
        ) -> PersistenceResult<()> {
            write_event(out, event)
        }
    }

    #[test]
    fn table_is_a_chain_to_current() {
        let mut version = MIGRATIONS[0].from;
        for step in MIGRATIONS {
            assert_eq!(step.from, version);
            version = step.to;
        }
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn rewrite_stamps_only_root_version() {
        let xml = r#"<ScenarioSimulationModel version="1.0" other="x"><child version="1.0"/></ScenarioSimulationModel>"#;
        let out = rewrite_document(xml, "1.1", &mut PassThrough).unwrap();
        assert_eq!(
            out,
            r#"<ScenarioSimulationModel version="1.1" other="x"><child version="1.0"/></ScenarioSimulationModel>"#
        );
    }

    #[test]
    fn migrate_current_is_identity() {
        let xml = "<ScenarioSimulationModel version=\"1.3\">";
        assert_eq!(migrate(xml, CURRENT_VERSION).unwrap(), xml);
    }

    #[test]
    fn migrate_unknown_version_fails() {
        let err = migrate("<ScenarioSimulationModel version=\"0.1\"/>", "0.1").unwrap_err();
        assert!(matches!(err, PersistenceError::UnsupportedVersion { .. }));
    }

    #[test]
    fn step_from_known_versions() {
        assert_eq!(step_from("1.0").unwrap().to, "1.1");
        assert_eq!(step_from("1.2").unwrap().to, "1.3");
        assert!(step_from("1.3").is_none());
    }
}
