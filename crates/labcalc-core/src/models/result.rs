//! Derived result models.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CodedValue;

/// Sentinel reported by total sperm count when the product is zero.
pub const BELOW_THRESHOLD: &str = "<0.1";

/// Outcome of one derivation.
///
/// Recomputed on every call and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedResult {
    /// Computed numeric value
    Quantity(Decimal),
    /// A contributing analyte's coded value, returned verbatim
    Coded(CodedValue),
    /// Below the quantifiable threshold (`<0.1`)
    BelowThreshold,
    /// Could not be computed from the current results
    Undetermined,
}

impl DerivedResult {
    /// Check if a value (of any kind) was produced.
    pub fn is_determined(&self) -> bool {
        !matches!(self, DerivedResult::Undetermined)
    }

    /// The numeric value, if any.
    pub fn quantity(&self) -> Option<Decimal> {
        match self {
            DerivedResult::Quantity(value) => Some(*value),
            _ => None,
        }
    }

    /// The coded value, if any.
    pub fn coded(&self) -> Option<&CodedValue> {
        match self {
            DerivedResult::Coded(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for DerivedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivedResult::Quantity(value) => write!(f, "{}", value.normalize()),
            DerivedResult::Coded(value) => write!(f, "{}", value),
            DerivedResult::BelowThreshold => f.write_str(BELOW_THRESHOLD),
            DerivedResult::Undetermined => f.write_str("calc."),
        }
    }
}
