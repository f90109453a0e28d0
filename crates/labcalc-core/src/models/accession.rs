//! Accession models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{AccessionRef, PatientRef};

/// A specimen/order grouping. Every result lookup is scoped to one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Accession {
    /// Local UUID
    pub id: AccessionRef,
    /// Owning patient
    pub patient_id: PatientRef,
    /// Specimen collection date, used as the reference date for patient age
    pub collected_on: Option<NaiveDate>,
    /// Creation timestamp
    pub created_at: String,
}

impl Accession {
    /// Create a new accession for a patient.
    pub fn new(patient_id: PatientRef) -> Self {
        Self {
            id: AccessionRef::new(uuid::Uuid::new_v4().to_string()),
            patient_id,
            collected_on: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Set the collection date.
    pub fn with_collection_date(mut self, date: NaiveDate) -> Self {
        self.collected_on = Some(date);
        self
    }

    /// Date patient age is measured against: collection date, or today.
    pub fn reference_date(&self) -> NaiveDate {
        self.collected_on
            .unwrap_or_else(|| chrono::Utc::now().date_naive())
    }
}
