//! Resolved formula inputs.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::{DerivationError, DerivationResult};
use crate::models::Sex;
use crate::units::UnitCategory;

/// Patient facts needed by the kidney-function formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Demographics {
    pub age_years: u32,
    pub sex: Sex,
}

/// Everything a formula may read, resolved before it runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    quantities: HashMap<&'static str, Decimal>,
    unit: Option<UnitCategory>,
    demographics: Option<Demographics>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a quantity under its operand key.
    pub fn with_quantity(mut self, key: &'static str, value: Decimal) -> Self {
        self.insert(key, value);
        self
    }

    pub fn with_unit(mut self, unit: UnitCategory) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_demographics(mut self, age_years: u32, sex: Sex) -> Self {
        self.demographics = Some(Demographics { age_years, sex });
        self
    }

    pub(crate) fn insert(&mut self, key: &'static str, value: Decimal) {
        self.quantities.insert(key, value);
    }

    pub(crate) fn set_unit(&mut self, unit: UnitCategory) {
        self.unit = Some(unit);
    }

    pub(crate) fn set_demographics(&mut self, demographics: Demographics) {
        self.demographics = Some(demographics);
    }

    /// The quantity resolved for `key`.
    pub fn quantity(&self, key: &str) -> DerivationResult<Decimal> {
        self.quantities
            .get(key)
            .copied()
            .ok_or_else(|| DerivationError::MissingInput(key.to_string()))
    }

    /// The unit category resolved from `analyte`'s configured unit.
    pub fn unit(&self, analyte: &str) -> DerivationResult<UnitCategory> {
        self.unit.ok_or_else(|| DerivationError::UnresolvableUnit {
            analyte: analyte.to_string(),
            unit: None,
        })
    }

    pub fn demographics(&self) -> DerivationResult<Demographics> {
        self.demographics
            .ok_or(DerivationError::MissingDemographics("patient"))
    }
}
