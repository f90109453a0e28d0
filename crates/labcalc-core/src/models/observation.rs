//! Recorded result values.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A categorical result token (e.g. "Not detected", "Hemolyzed").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodedValue(String);

impl CodedValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CodedValue {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The value recorded for one analyte within one accession.
///
/// An observation carries either a quantity or a coded value, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservedValue {
    /// Numeric result; its unit comes from the unit registry
    Quantity(Decimal),
    /// Categorical result
    Coded(CodedValue),
}

impl ObservedValue {
    /// The numeric value, if this is a quantity.
    pub fn quantity(&self) -> Option<Decimal> {
        match self {
            ObservedValue::Quantity(value) => Some(*value),
            ObservedValue::Coded(_) => None,
        }
    }

    /// The coded value, if this is categorical.
    pub fn coded(&self) -> Option<&CodedValue> {
        match self {
            ObservedValue::Quantity(_) => None,
            ObservedValue::Coded(value) => Some(value),
        }
    }
}

impl From<Decimal> for ObservedValue {
    fn from(value: Decimal) -> Self {
        ObservedValue::Quantity(value)
    }
}

impl From<CodedValue> for ObservedValue {
    fn from(value: CodedValue) -> Self {
        ObservedValue::Coded(value)
    }
}
