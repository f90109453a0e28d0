//! In-memory collaborator implementation.

use std::collections::HashMap;

use super::{DemographicsProvider, LookupResult, ResultLookup, UnitRegistry};
use crate::models::{Accession, AccessionRef, AnalyteCode, ObservedValue, Patient, PatientRef, Sex};

/// Results, units and demographics held in process.
///
/// Recording a value for an (accession, analyte) pair that already has one
/// replaces it, so there is at most one observation per pair.
#[derive(Debug, Clone, Default)]
pub struct InMemoryResults {
    observations: HashMap<(AccessionRef, AnalyteCode), ObservedValue>,
    units: HashMap<AnalyteCode, String>,
    accessions: HashMap<AccessionRef, Accession>,
    patients: HashMap<PatientRef, Patient>,
}

impl InMemoryResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a patient.
    pub fn add_patient(&mut self, patient: Patient) -> &mut Self {
        self.patients.insert(patient.id.clone(), patient);
        self
    }

    /// Register an accession.
    pub fn add_accession(&mut self, accession: Accession) -> &mut Self {
        self.accessions.insert(accession.id.clone(), accession);
        self
    }

    /// Record (or replace) the value for one analyte in one accession.
    pub fn record(
        &mut self,
        accession: &AccessionRef,
        analyte: impl Into<AnalyteCode>,
        value: impl Into<ObservedValue>,
    ) -> &mut Self {
        self.observations
            .insert((accession.clone(), analyte.into()), value.into());
        self
    }

    /// Remove a recorded value.
    pub fn clear(&mut self, accession: &AccessionRef, analyte: impl Into<AnalyteCode>) -> &mut Self {
        self.observations.remove(&(accession.clone(), analyte.into()));
        self
    }

    /// Configure the reporting unit of an analyte.
    pub fn set_unit(&mut self, analyte: impl Into<AnalyteCode>, unit: impl Into<String>) -> &mut Self {
        self.units.insert(analyte.into(), unit.into());
        self
    }
}

impl ResultLookup for InMemoryResults {
    fn value_for(
        &self,
        accession: &AccessionRef,
        analyte: &AnalyteCode,
    ) -> LookupResult<Option<ObservedValue>> {
        Ok(self
            .observations
            .get(&(accession.clone(), analyte.clone()))
            .cloned())
    }
}

impl UnitRegistry for InMemoryResults {
    fn unit_for(&self, analyte: &AnalyteCode) -> LookupResult<Option<String>> {
        Ok(self.units.get(analyte).cloned())
    }
}

impl DemographicsProvider for InMemoryResults {
    fn patient_for(&self, accession: &AccessionRef) -> LookupResult<Option<PatientRef>> {
        Ok(self.accessions.get(accession).map(|a| a.patient_id.clone()))
    }

    fn age_years(
        &self,
        patient: &PatientRef,
        accession: &AccessionRef,
    ) -> LookupResult<Option<u32>> {
        let Some(patient) = self.patients.get(patient) else {
            return Ok(None);
        };
        let Some(accession) = self.accessions.get(accession) else {
            return Ok(None);
        };
        Ok(patient.age_on(accession.reference_date()))
    }

    fn sex(&self, patient: &PatientRef) -> LookupResult<Option<Sex>> {
        Ok(self.patients.get(patient).map(|p| p.sex))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CodedValue;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_values_are_scoped_by_accession() {
        let first = AccessionRef::from("acc-1");
        let second = AccessionRef::from("acc-2");
        let mut store = InMemoryResults::new();
        store.record(&first, "Na", dec!(140));

        let na = AnalyteCode::from("Na");
        assert_eq!(
            store.value_for(&first, &na).unwrap(),
            Some(ObservedValue::Quantity(dec!(140)))
        );
        assert_eq!(store.value_for(&second, &na).unwrap(), None);
    }

    #[test]
    fn test_record_replaces_previous_value() {
        let acc = AccessionRef::from("acc-1");
        let mut store = InMemoryResults::new();
        store
            .record(&acc, "ABHEAD", dec!(10))
            .record(&acc, "ABHEAD", CodedValue::from("Not observed"));

        let value = store.value_for(&acc, &"ABHEAD".into()).unwrap().unwrap();
        assert!(value.quantity().is_none());

        store.clear(&acc, "ABHEAD");
        assert!(store.value_for(&acc, &"ABHEAD".into()).unwrap().is_none());
    }

    #[test]
    fn test_demographics() {
        let patient = Patient::new("Ana".into(), Sex::Female)
            .with_birthdate(NaiveDate::from_ymd_opt(1980, 3, 1).unwrap());
        let accession = Accession::new(patient.id.clone())
            .with_collection_date(NaiveDate::from_ymd_opt(2020, 2, 28).unwrap());
        let mut store = InMemoryResults::new();
        store.add_patient(patient.clone()).add_accession(accession.clone());

        let owner = store.patient_for(&accession.id).unwrap().unwrap();
        assert_eq!(owner, patient.id);
        assert_eq!(store.age_years(&owner, &accession.id).unwrap(), Some(39));
        assert_eq!(store.sex(&owner).unwrap(), Some(Sex::Female));
        assert_eq!(store.patient_for(&"missing".into()).unwrap(), None);
    }
}
