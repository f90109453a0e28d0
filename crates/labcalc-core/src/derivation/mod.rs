//! Derived-value computation engine.
//!
//! Pipeline: Registry lookup → Input resolution → Formula → Fault boundary
//!
//! Every outcome other than a value collapses into
//! [`DerivedResult::Undetermined`](crate::models::DerivedResult::Undetermined)
//! at the [`Evaluator`] boundary. [`DerivationError`] only exists inside it,
//! to pick the log level.

pub mod analytes;
mod evaluator;
mod formulas;
mod inputs;
pub mod registry;

pub use evaluator::*;
pub use formulas::*;
pub use inputs::*;
pub use registry::{Derivation, Operand};

use thiserror::Error;

use crate::lookup::LookupError;

/// Reasons a derivation produced no value.
#[derive(Error, Debug)]
pub enum DerivationError {
    #[error("Unknown derivation: {0}")]
    UnknownDerivation(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Missing demographics: {0}")]
    MissingDemographics(&'static str),

    #[error("Unresolvable unit for {analyte}: {unit:?}")]
    UnresolvableUnit {
        analyte: String,
        unit: Option<String>,
    },

    #[error("Arithmetic fault: {0}")]
    ArithmeticFault(&'static str),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),
}

impl DerivationError {
    /// Faults are unexpected conditions; the rest are ordinary outcomes of
    /// incomplete results.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            DerivationError::UnresolvableUnit { .. }
                | DerivationError::ArithmeticFault(_)
                | DerivationError::Lookup(_)
        )
    }
}

pub type DerivationResult<T> = Result<T, DerivationError>;
