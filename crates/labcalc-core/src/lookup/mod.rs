//! Collaborator contracts consumed by the evaluator.
//!
//! The evaluator never reads storage directly. It asks three collaborators:
//! - [`ResultLookup`]: recorded values within one accession
//! - [`UnitRegistry`]: configured reporting unit per analyte
//! - [`DemographicsProvider`]: the patient's age and sex
//!
//! [`InMemoryResults`] implements all three for tests and embedders;
//! [`crate::db::Database`] implements them over SQLite.

mod memory;

pub use memory::*;

use thiserror::Error;

use crate::models::{AccessionRef, AnalyteCode, ObservedValue, PatientRef, Sex};

/// Collaborator errors.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),

    #[error("Invalid stored quantity for {code}: {value:?}")]
    InvalidQuantity { code: String, value: String },

    #[error("Lookup backend error: {0}")]
    Backend(String),
}

pub type LookupResult<T> = Result<T, LookupError>;

/// Recorded results, scoped by accession.
pub trait ResultLookup {
    /// The value recorded for `analyte` in `accession`, or `None` if absent.
    fn value_for(
        &self,
        accession: &AccessionRef,
        analyte: &AnalyteCode,
    ) -> LookupResult<Option<ObservedValue>>;
}

/// Configured reporting units.
pub trait UnitRegistry {
    /// The unit token configured for `analyte`, or `None` if it has none.
    fn unit_for(&self, analyte: &AnalyteCode) -> LookupResult<Option<String>>;
}

/// Patient demographics.
pub trait DemographicsProvider {
    /// The patient owning `accession`.
    fn patient_for(&self, accession: &AccessionRef) -> LookupResult<Option<PatientRef>>;

    /// Age in whole years at the time of the accession.
    fn age_years(
        &self,
        patient: &PatientRef,
        accession: &AccessionRef,
    ) -> LookupResult<Option<u32>>;

    /// Administrative sex.
    fn sex(&self, patient: &PatientRef) -> LookupResult<Option<Sex>>;
}

impl<T: ResultLookup + ?Sized> ResultLookup for &T {
    fn value_for(
        &self,
        accession: &AccessionRef,
        analyte: &AnalyteCode,
    ) -> LookupResult<Option<ObservedValue>> {
        (**self).value_for(accession, analyte)
    }
}

impl<T: UnitRegistry + ?Sized> UnitRegistry for &T {
    fn unit_for(&self, analyte: &AnalyteCode) -> LookupResult<Option<String>> {
        (**self).unit_for(analyte)
    }
}

impl<T: DemographicsProvider + ?Sized> DemographicsProvider for &T {
    fn patient_for(&self, accession: &AccessionRef) -> LookupResult<Option<PatientRef>> {
        (**self).patient_for(accession)
    }

    fn age_years(
        &self,
        patient: &PatientRef,
        accession: &AccessionRef,
    ) -> LookupResult<Option<u32>> {
        (**self).age_years(patient, accession)
    }

    fn sex(&self, patient: &PatientRef) -> LookupResult<Option<Sex>> {
        (**self).sex(patient)
    }
}
