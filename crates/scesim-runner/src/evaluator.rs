//! Expectation evaluation
//!
//! An EXPECT cell holds either a plain literal, `null`, or a comparison
//! prefixed with one of `=`, `!=`, `<`, `<=`, `>`, `>=`. Operands compare
//! numerically when both sides parse as finite numbers and textually
//! otherwise, so words like `NaN` or `inf` stay literals.

use crate::container::FactValue;
use crate::error::ScenarioError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

static EXPRESSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(!=|<=|>=|=|<|>)?\s*(.*?)\s*$").expect("expression pattern is valid")
});

const NULL: &str = "null";

/// Comparison operator of an expectation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=` or no prefix
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl Operator {
    fn parse(symbol: Option<&str>) -> Self {
        match symbol {
            Some("!=") => Self::NotEq,
            Some("<") => Self::Lt,
            Some("<=") => Self::Le,
            Some(">") => Self::Gt,
            Some(">=") => Self::Ge,
            _ => Self::Eq,
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::NotEq => ordering != Ordering::Equal,
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Gt => ordering == Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
        }
    }

    fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::NotEq)
    }
}

/// Parsed EXPECT cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    /// Comparison to apply
    pub operator: Operator,
    /// Right-hand side, `None` for `null`
    pub operand: Option<String>,
}

impl Expectation {
    /// Parse a raw cell value
    ///
    /// # Errors
    /// Returns `ScenarioError::InvalidExpression` for an operator without
    /// operand or an ordering against `null`
    pub fn parse(raw: &str) -> Result<Self, ScenarioError> {
        let invalid = || ScenarioError::InvalidExpression(raw.to_string());
        let captures = EXPRESSION.captures(raw).ok_or_else(invalid)?;

        let symbol = captures.get(1).map(|m| m.as_str());
        let operator = Operator::parse(symbol);
        let operand = captures.get(2).map_or("", |m| m.as_str());

        if operand.is_empty() && symbol.is_some() {
            return Err(invalid());
        }
        if operand.eq_ignore_ascii_case(NULL) {
            if !operator.is_equality() {
                return Err(invalid());
            }
            return Ok(Self {
                operator,
                operand: None,
            });
        }

        Ok(Self {
            operator,
            operand: Some(operand.to_string()),
        })
    }

    /// Whether `actual` satisfies the expectation
    #[must_use]
    pub fn matches(&self, actual: &FactValue) -> bool {
        match (&self.operand, actual.as_text()) {
            (None, actual) => (self.operator == Operator::Eq) == actual.is_none(),
            (Some(_), None) => self.operator == Operator::NotEq,
            (Some(expected), Some(actual)) => self.operator.holds(compare(actual, expected)),
        }
    }
}

fn compare(actual: &str, expected: &str) -> Ordering {
    let actual = actual.trim();
    let numbers = finite(actual).zip(finite(expected));
    if let Some(ordering) = numbers.and_then(|(a, e)| a.partial_cmp(&e)) {
        return ordering;
    }
    if let (Ok(a), Ok(e)) = (
        actual.to_ascii_lowercase().parse::<bool>(),
        expected.to_ascii_lowercase().parse::<bool>(),
    ) {
        return a.cmp(&e);
    }
    actual.cmp(expected)
}

fn finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Evaluate a raw EXPECT cell against a produced value
///
/// # Errors
/// Returns `ScenarioError::InvalidExpression` if `raw` cannot be parsed
pub fn evaluate(raw: &str, actual: &FactValue) -> Result<bool, ScenarioError> {
    Ok(Expectation::parse(raw)?.matches(actual))
}
