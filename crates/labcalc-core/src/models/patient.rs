//! Patient models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PatientRef;

/// Administrative sex as recorded on the patient (`F`, `M`, `O`, `U`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "O")]
    Other,
    #[serde(rename = "U")]
    Unknown,
}

impl Sex {
    /// Parse the single-letter storage code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "F" => Some(Sex::Female),
            "M" => Some(Sex::Male),
            "O" => Some(Sex::Other),
            "U" => Some(Sex::Unknown),
            _ => None,
        }
    }

    /// Single-letter storage code.
    pub fn code(&self) -> &'static str {
        match self {
            Sex::Female => "F",
            Sex::Male => "M",
            Sex::Other => "O",
            Sex::Unknown => "U",
        }
    }

    pub fn is_female(&self) -> bool {
        matches!(self, Sex::Female)
    }
}

/// A patient record, reduced to what derivations need.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Local UUID
    pub id: PatientRef,
    /// Given name
    pub given_name: String,
    /// Family name
    pub family_name: Option<String>,
    /// Administrative sex
    pub sex: Sex,
    /// Date of birth; animals and anonymous samples may have none
    pub birthdate: Option<NaiveDate>,
    /// Creation timestamp
    pub created_at: String,
}

impl Patient {
    /// Create a new patient with required fields.
    pub fn new(given_name: String, sex: Sex) -> Self {
        Self {
            id: PatientRef::new(uuid::Uuid::new_v4().to_string()),
            given_name,
            family_name: None,
            sex,
            birthdate: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Set the date of birth.
    pub fn with_birthdate(mut self, birthdate: NaiveDate) -> Self {
        self.birthdate = Some(birthdate);
        self
    }

    /// Age in whole years on the given date.
    ///
    /// `None` without a birthdate or when `on` precedes it.
    pub fn age_on(&self, on: NaiveDate) -> Option<u32> {
        age_in_years(self.birthdate?, on)
    }
}

/// Completed years between `birthdate` and `on`.
pub fn age_in_years(birthdate: NaiveDate, on: NaiveDate) -> Option<u32> {
    on.years_since(birthdate)
}
