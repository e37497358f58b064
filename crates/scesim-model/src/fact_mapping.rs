//! Fact mappings: the column definitions of a simulation
//!
//! A [`FactMapping`] says how a scenario cell maps onto a fact: which fact
//! ([`FactIdentifier`]), which column ([`ExpressionIdentifier`]) and which
//! field path ([`ExpressionElement`] steps). A [`FactMappingValue`] is one
//! cell of one scenario.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a column in a scenario table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FactMappingType {
    /// Input fact value
    Given,
    /// Expected result value
    Expect,
    /// Bookkeeping column (index, description)
    #[default]
    Other,
}

impl FactMappingType {
    /// Marker used in the persisted format
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Given => "GIVEN",
            Self::Expect => "EXPECT",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for FactMappingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FactMappingType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "GIVEN" => Ok(Self::Given),
            "EXPECT" => Ok(Self::Expect),
            "OTHER" => Ok(Self::Other),
            other => Err(ModelError::UnknownFactMappingType(other.to_string())),
        }
    }
}

impl TryFrom<String> for FactMappingType {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FactMappingType> for String {
    fn from(value: FactMappingType) -> Self {
        value.as_str().to_string()
    }
}

/// Identifies the fact a column belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactIdentifier {
    /// Fact name as shown in the table header
    #[serde(default)]
    pub name: String,
    /// Fully qualified type name of the fact
    #[serde(rename = "className", default)]
    pub class_name: String,
}

impl FactIdentifier {
    /// Create fact identifier
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
        }
    }

    /// Type name without its package qualifier
    ///
    /// ```rust
    /// # use scesim_model::FactIdentifier;
    /// let fact = FactIdentifier::new("Applicant", "com.acme.loan.Applicant");
    /// assert_eq!(fact.simple_class_name(), "Applicant");
    /// ```
    #[must_use]
    pub fn simple_class_name(&self) -> &str {
        self.class_name
            .rsplit(['.', '$'])
            .next()
            .unwrap_or(&self.class_name)
    }
}

/// Identifies a column of the scenario table
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpressionIdentifier {
    /// Column name
    #[serde(default)]
    pub name: String,
    /// Column role
    #[serde(rename = "type", default)]
    pub kind: FactMappingType,
}

impl ExpressionIdentifier {
    /// Create expression identifier
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FactMappingType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// One step of a field path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionElement {
    /// Step name
    #[serde(default)]
    pub step: String,
}

impl ExpressionElement {
    /// Create element
    #[inline]
    #[must_use]
    pub fn new(step: impl Into<String>) -> Self {
        Self { step: step.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct ExpressionElements {
    #[serde(rename = "ExpressionElement", default)]
    items: Vec<ExpressionElement>,
}

/// Column definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactMapping {
    #[serde(rename = "expressionElements", default)]
    expression_elements: ExpressionElements,
    #[serde(rename = "expressionIdentifier", default)]
    expression_identifier: ExpressionIdentifier,
    #[serde(rename = "factIdentifier", default)]
    fact_identifier: FactIdentifier,
    #[serde(rename = "className", default)]
    class_name: String,
    #[serde(rename = "factAlias", default)]
    fact_alias: String,
    #[serde(rename = "expressionAlias", default)]
    expression_alias: String,
}

impl FactMapping {
    /// Create mapping for fact and column
    ///
    /// The first expression element is the fact's simple type name, which is
    /// how the persisted format roots every field path.
    #[must_use]
    pub fn new(
        fact_identifier: FactIdentifier,
        expression_identifier: ExpressionIdentifier,
    ) -> Self {
        let root = ExpressionElement::new(fact_identifier.simple_class_name());
        Self {
            fact_alias: fact_identifier.name.clone(),
            expression_alias: expression_identifier.name.clone(),
            expression_elements: ExpressionElements { items: vec![root] },
            expression_identifier,
            fact_identifier,
            class_name: String::new(),
        }
    }

    /// With value type name
    #[inline]
    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Append a field step
    #[inline]
    #[must_use]
    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.add_expression_element(step);
        self
    }

    /// Append a field step
    pub fn add_expression_element(&mut self, step: impl Into<String>) {
        self.expression_elements
            .items
            .push(ExpressionElement::new(step));
    }

    /// Path steps, root first
    #[inline]
    #[must_use]
    pub fn expression_elements(&self) -> &[ExpressionElement] {
        &self.expression_elements.items
    }

    /// Dotted field path below the fact root
    ///
    /// Empty when the mapping targets the whole fact.
    #[must_use]
    pub fn expression_path(&self) -> String {
        self.expression_elements
            .items
            .iter()
            .skip(1)
            .map(|e| e.step.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Column identifier
    #[inline]
    #[must_use]
    pub fn expression_identifier(&self) -> &ExpressionIdentifier {
        &self.expression_identifier
    }

    /// Fact identifier
    #[inline]
    #[must_use]
    pub fn fact_identifier(&self) -> &FactIdentifier {
        &self.fact_identifier
    }

    /// Value type name
    #[inline]
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Header label of the fact
    #[inline]
    #[must_use]
    pub fn fact_alias(&self) -> &str {
        &self.fact_alias
    }

    /// Header label of the column
    #[inline]
    #[must_use]
    pub fn expression_alias(&self) -> &str {
        &self.expression_alias
    }

    /// Whether this mapping describes the given cell coordinates
    #[inline]
    #[must_use]
    pub fn matches(&self, fact: &FactIdentifier, expression: &ExpressionIdentifier) -> bool {
        &self.fact_identifier == fact && &self.expression_identifier == expression
    }
}

/// One cell of a scenario
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactMappingValue {
    #[serde(rename = "factIdentifier", default)]
    fact_identifier: FactIdentifier,
    #[serde(rename = "expressionIdentifier", default)]
    expression_identifier: ExpressionIdentifier,
    #[serde(rename = "rawValue", default, skip_serializing_if = "Option::is_none")]
    raw_value: Option<String>,
}

impl FactMappingValue {
    /// Create cell
    #[must_use]
    pub fn new(
        fact_identifier: FactIdentifier,
        expression_identifier: ExpressionIdentifier,
        raw_value: Option<String>,
    ) -> Self {
        Self {
            fact_identifier,
            expression_identifier,
            raw_value,
        }
    }

    /// Fact identifier
    #[inline]
    #[must_use]
    pub fn fact_identifier(&self) -> &FactIdentifier {
        &self.fact_identifier
    }

    /// Column identifier
    #[inline]
    #[must_use]
    pub fn expression_identifier(&self) -> &ExpressionIdentifier {
        &self.expression_identifier
    }

    /// Raw cell content, `None` for an empty cell
    #[inline]
    #[must_use]
    pub fn raw_value(&self) -> Option<&str> {
        self.raw_value.as_deref()
    }

    /// Replace cell content
    #[inline]
    pub fn set_raw_value(&mut self, raw_value: Option<String>) {
        self.raw_value = raw_value;
    }

    /// Cell content trimmed, `None` when blank
    #[must_use]
    pub fn non_blank_value(&self) -> Option<&str> {
        self.raw_value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}
