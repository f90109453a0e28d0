//! LabCalc Core Library
//!
//! Derived laboratory result engine: computes values that are not measured
//! directly but calculated from other results of the same accession.
//!
//! # Architecture
//!
//! ```text
//!   compute(code, accession)
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │ Derivation Registry │  code → formula record
//!   └──────────┬──────────┘
//!              │
//!              ▼
//!   ┌─────────────────────┐      ┌──────────────────────┐
//!   │  Input Resolution   │ ───▶ │ ResultLookup         │
//!   │                     │ ───▶ │ UnitRegistry         │
//!   │                     │ ───▶ │ DemographicsProvider │
//!   └──────────┬──────────┘      └──────────────────────┘
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │  Formula (Decimal)  │
//!   └──────────┬──────────┘
//!              │
//!              ▼
//!      Fault boundary ──▶ value | coded | <0.1 | undetermined
//! ```
//!
//! # Core Principle
//!
//! **A derivation never fails.** Missing inputs, unknown codes, bad unit
//! configuration and arithmetic faults all come back as
//! [`DerivedResult::Undetermined`].
//!
//! # Modules
//!
//! - [`derivation`]: Registry, formulas and evaluator
//! - [`lookup`]: Collaborator traits and an in-memory implementation
//! - [`db`]: SQLite store implementing the collaborator traits
//! - [`models`]: Domain types (codes, observations, patients, results)
//! - [`units`]: Unit category catalog

pub mod db;
pub mod derivation;
pub mod lookup;
pub mod models;
pub mod units;

// Re-export commonly used types
pub use db::Database;
pub use derivation::Evaluator;
pub use lookup::{DemographicsProvider, InMemoryResults, ResultLookup, UnitRegistry};
pub use models::{
    Accession, AccessionRef, AnalyteCode, CodedValue, DerivationCode, DerivedResult, LabTest,
    ObservedValue, Patient, PatientRef, Sex,
};
pub use units::{UnitCatalog, UnitCategory};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum LabCalcError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<db::DbError> for LabCalcError {
    fn from(e: db::DbError) -> Self {
        LabCalcError::DatabaseError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for LabCalcError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        LabCalcError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<LabCalcCore>, LabCalcError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(LabCalcCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<LabCalcCore>, LabCalcError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(LabCalcCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct LabCalcCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl LabCalcCore {
    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Add or update a lab test.
    pub fn upsert_lab_test(&self, test: FfiLabTest) -> Result<(), LabCalcError> {
        let db = self.db.lock()?;
        db.upsert_lab_test(&test.into())?;
        Ok(())
    }

    // =========================================================================
    // Result Operations
    // =========================================================================

    /// Record a numeric result given as decimal text.
    pub fn record_quantity(
        &self,
        accession_id: String,
        code: String,
        value: String,
    ) -> Result<(), LabCalcError> {
        let quantity = Decimal::from_str(value.trim())
            .map_err(|e| LabCalcError::InvalidInput(format!("{}: {}", value, e)))?;
        let db = self.db.lock()?;
        db.record_quantity(&AccessionRef::from(accession_id), &code, quantity)?;
        Ok(())
    }

    /// Record a coded result.
    pub fn record_coded(
        &self,
        accession_id: String,
        code: String,
        value: String,
    ) -> Result<(), LabCalcError> {
        let db = self.db.lock()?;
        db.record_coded(&AccessionRef::from(accession_id), &code, &value)?;
        Ok(())
    }

    // =========================================================================
    // Derivation Operations
    // =========================================================================

    /// Compute one derived result.
    pub fn compute_derived(
        &self,
        code: String,
        accession_id: String,
    ) -> Result<FfiDerivedResult, LabCalcError> {
        let db = self.db.lock()?;
        let evaluator = Evaluator::for_store(&*db);
        let result = evaluator.compute(&code, &AccessionRef::from(accession_id));
        Ok(result.into())
    }

    /// Compute every supported derivation for an accession.
    pub fn compute_all_derived(
        &self,
        accession_id: String,
    ) -> Result<Vec<FfiDerivation>, LabCalcError> {
        let db = self.db.lock()?;
        let evaluator = Evaluator::for_store(&*db);
        let results = evaluator.compute_all(&AccessionRef::from(accession_id));
        Ok(results
            .into_iter()
            .map(|(code, result)| FfiDerivation {
                code: code.to_string(),
                result: result.into(),
            })
            .collect())
    }

    /// Codes of all supported derivations.
    pub fn supported_derivations(&self) -> Vec<String> {
        derivation::registry::codes()
            .into_iter()
            .map(String::from)
            .collect()
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe lab test.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLabTest {
    pub code: String,
    pub name: String,
    pub unit: Option<String>,
    pub decimals: u32,
    pub derivation: bool,
}

impl From<FfiLabTest> for LabTest {
    fn from(test: FfiLabTest) -> Self {
        LabTest {
            code: AnalyteCode::from(test.code),
            name: test.name,
            unit: test.unit,
            decimals: test.decimals,
            derivation: test.derivation,
        }
    }
}

/// FFI-safe derived result. Quantities travel as decimal text.
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum FfiDerivedResult {
    Quantity { value: String },
    Coded { value: String },
    BelowThreshold,
    Undetermined,
}

impl From<DerivedResult> for FfiDerivedResult {
    fn from(result: DerivedResult) -> Self {
        match result {
            DerivedResult::Quantity(value) => FfiDerivedResult::Quantity {
                value: value.normalize().to_string(),
            },
            DerivedResult::Coded(value) => FfiDerivedResult::Coded {
                value: value.to_string(),
            },
            DerivedResult::BelowThreshold => FfiDerivedResult::BelowThreshold,
            DerivedResult::Undetermined => FfiDerivedResult::Undetermined,
        }
    }
}

/// FFI-safe (code, result) pair.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDerivation {
    pub code: String,
    pub result: FfiDerivedResult,
}
