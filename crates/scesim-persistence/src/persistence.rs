//! XML persistence entry point
//!
//! Provides:
//! - Model → XML encoding (marshal)
//! - XML → model decoding with migration and validation (unmarshal)
//! - Version detection and migration of raw documents

use crate::error::{PersistenceError, PersistenceResult};
use crate::migration::{self, write_event};
use crate::validation;
use once_cell::sync::Lazy;
use quick_xml::events::{BytesText, Event};
use quick_xml::se::Serializer;
use quick_xml::{Reader, Writer};
use regex::Regex;
use scesim_model::{ScenarioSimulationModel, CURRENT_VERSION};
use serde::Serialize;

/// First `version` attribute of the root element; the lazy quantifier keeps
/// duplicates from winning over the first occurrence.
static VERSION_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<ScenarioSimulationModel\b[^>]*?\sversion\s*=\s*["']([^"']*)["']"#)
        .expect("version pattern is valid")
});

static INSTANCE: XmlPersistence = XmlPersistence { indent: 2 };

/// Stateless XML codec for scenario-simulation documents
///
/// Safe to share between threads; [`XmlPersistence::instance`] returns a
/// process-wide value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlPersistence {
    /// Spaces per nesting level in marshaled output, 0 for compact output
    indent: usize,
}

impl Default for XmlPersistence {
    fn default() -> Self {
        INSTANCE
    }
}

impl XmlPersistence {
    /// Create codec with default formatting
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared codec
    #[inline]
    #[must_use]
    pub fn instance() -> &'static Self {
        &INSTANCE
    }

    /// With indentation width (0 = single line)
    #[inline]
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Schema version written by [`marshal`](Self::marshal)
    #[inline]
    #[must_use]
    pub fn current_version() -> &'static str {
        CURRENT_VERSION
    }

    /// Encode model as XML at the current version
    ///
    /// The output starts with the root tag and its version attribute; only
    /// the document's tag names appear, never Rust type paths.
    ///
    /// # Errors
    /// Returns `PersistenceError::Serialize` if encoding fails
    pub fn marshal(&self, model: &ScenarioSimulationModel) -> PersistenceResult<String> {
        let mut current = model.clone();
        if current.version() != CURRENT_VERSION {
            current = restamp(current);
        }

        let mut xml = String::new();
        let mut serializer = Serializer::new(&mut xml);
        if self.indent > 0 {
            serializer.indent(' ', self.indent);
        }
        current
            .serialize(serializer)
            .map_err(|e| PersistenceError::Serialize(e.to_string()))?;
        Ok(xml)
    }

    /// Decode and validate a document, migrating it first if needed
    ///
    /// # Errors
    /// - `PersistenceError::UnsupportedVersion` / `MissingVersion` for
    ///   documents that cannot be migrated
    /// - `PersistenceError::Deserialize` if the XML does not match the schema
    /// - `PersistenceError::Validation` if the model is inconsistent
    #[inline]
    pub fn unmarshal(&self, xml: &str) -> PersistenceResult<ScenarioSimulationModel> {
        self.unmarshal_with(xml, true)
    }

    /// Decode a document, migrating it first if needed
    ///
    /// With `validate` set the decoded model must also pass
    /// [`validation::validate`].
    ///
    /// # Errors
    /// See [`unmarshal`](Self::unmarshal); validation errors only occur
    /// when `validate` is set
    pub fn unmarshal_with(
        &self,
        xml: &str,
        validate: bool,
    ) -> PersistenceResult<ScenarioSimulationModel> {
        let migrated = self.migrate_if_necessary(xml)?;
        let pinned = pin_edge_whitespace(&migrated)?;

        let mut model: ScenarioSimulationModel = quick_xml::de::from_str(&pinned)
            .map_err(|e| PersistenceError::Deserialize(e.to_string()))?;
        model.simulation_mut().descriptor_mut().normalize();

        if validate {
            validation::validate(&model).map_err(PersistenceError::Validation)?;
        }

        tracing::debug!(
            scenarios = model.simulation().len(),
            kind = %model.simulation().descriptor().simulation_type(),
            "unmarshaled document"
        );
        Ok(model)
    }

    /// Version declared by the document root
    ///
    /// Only the first `version` attribute counts; later duplicates are
    /// ignored.
    ///
    /// # Errors
    /// Returns `PersistenceError::MissingVersion` when the root has none
    pub fn try_extract_version<'a>(&self, xml: &'a str) -> PersistenceResult<&'a str> {
        VERSION_ATTRIBUTE
            .captures(xml)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .ok_or(PersistenceError::MissingVersion)
    }

    /// Version declared by the document root, empty if there is none
    #[must_use]
    pub fn extract_version<'a>(&self, xml: &'a str) -> &'a str {
        self.try_extract_version(xml).unwrap_or_default()
    }

    /// Upgrade a raw document to the current version
    ///
    /// Documents already at the current version are returned unchanged.
    ///
    /// # Errors
    /// - `PersistenceError::MissingVersion` if the root has no version
    /// - `PersistenceError::UnsupportedVersion` if the version is unknown
    /// - `PersistenceError::Migration` if a step fails on malformed XML
    pub fn migrate_if_necessary(&self, xml: &str) -> PersistenceResult<String> {
        let version = self.try_extract_version(xml)?;
        if version == CURRENT_VERSION {
            return Ok(xml.to_string());
        }

        tracing::info!(from = version, to = CURRENT_VERSION, "migrating scenario document");
        migration::migrate(xml, version)
    }
}

/// Encode leading and trailing whitespace of leaf text as character
/// references
///
/// The serde decoder trims raw text before unescaping it, so pinned
/// whitespace reaches the model intact. Whitespace between elements is left
/// alone and still discarded.
fn pin_edge_whitespace(xml: &str) -> PersistenceResult<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut after_start = false;
    let mut pending: Option<BytesText<'_>> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            PersistenceError::Xml(format!("{} at position {}", e, reader.buffer_position()))
        })?;

        match event {
            Event::Eof => break,
            Event::Text(text) if after_start && pending.is_none() => {
                pending = Some(text);
            }
            Event::End(end) => {
                if let Some(text) = pending.take() {
                    write_event(&mut writer, Event::Text(pin_text(&text)?))?;
                }
                write_event(&mut writer, Event::End(end))?;
                after_start = false;
            }
            other => {
                if let Some(text) = pending.take() {
                    write_event(&mut writer, Event::Text(text))?;
                }
                after_start = matches!(other, Event::Start(_));
                write_event(&mut writer, other)?;
            }
        }
    }

    String::from_utf8(writer.into_inner()).map_err(PersistenceError::xml)
}

fn pin_text(text: &BytesText<'_>) -> PersistenceResult<BytesText<'static>> {
    let raw = std::str::from_utf8(text).map_err(PersistenceError::xml)?;
    let body = raw.trim_matches(is_xml_space);
    if body.is_empty() {
        return Ok(BytesText::from_escaped(raw.to_string()));
    }

    let start = raw.len() - raw.trim_start_matches(is_xml_space).len();
    let end = start + body.len();
    let mut pinned = String::with_capacity(raw.len() + 16);
    push_char_refs(&mut pinned, &raw[..start]);
    pinned.push_str(body);
    push_char_refs(&mut pinned, &raw[end..]);
    Ok(BytesText::from_escaped(pinned))
}

fn is_xml_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn push_char_refs(out: &mut String, whitespace: &str) {
    for c in whitespace.chars() {
        out.push_str("&#");
        out.push_str(&u32::from(c).to_string());
        out.push(';');
    }
}

fn restamp(model: ScenarioSimulationModel) -> ScenarioSimulationModel {
    let imports = model.imports().clone();
    let mut current = ScenarioSimulationModel::with_simulation(model.into_simulation());
    *current.imports_mut() = imports;
    current
}
