//! Lab test catalog models.

use serde::{Deserialize, Serialize};

use super::AnalyteCode;

/// A configured lab test: a measured analyte or a derivation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabTest {
    /// Analyte (or derivation) code
    pub code: AnalyteCode,
    /// Display name
    pub name: String,
    /// Reporting unit token (e.g. "mg/dL"); `None` for unitless tests
    pub unit: Option<String>,
    /// Decimal places used when the value is reported
    pub decimals: u32,
    /// Whether the value is computed rather than measured
    pub derivation: bool,
}

impl LabTest {
    /// Create a measured test with required fields.
    pub fn new(code: impl Into<AnalyteCode>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            unit: None,
            decimals: 0,
            derivation: false,
        }
    }

    /// Set the reporting unit.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Mark the test as computed.
    pub fn derived(mut self) -> Self {
        self.derivation = true;
        self
    }
}
