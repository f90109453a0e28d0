//! Collaborator implementations over SQLite.

use std::str::FromStr;

use rusqlite::OptionalExtension;
use rust_decimal::Decimal;

use super::patients::{parse_date, parse_sex};
use super::Database;
use crate::lookup::{DemographicsProvider, LookupError, LookupResult, ResultLookup, UnitRegistry};
use crate::models::{
    age_in_years, AccessionRef, AnalyteCode, CodedValue, ObservedValue, PatientRef, Sex,
};

impl ResultLookup for Database {
    /// A non-blank stored value is the quantity; otherwise the coded option,
    /// if any. Blank values are pending entries and count as absent.
    fn value_for(
        &self,
        accession: &AccessionRef,
        analyte: &AnalyteCode,
    ) -> LookupResult<Option<ObservedValue>> {
        let Some(stored) = self.get_observation(accession, analyte.as_str())? else {
            return Ok(None);
        };

        if let Some(text) = stored.value.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let quantity = Decimal::from_str(text).map_err(|_| LookupError::InvalidQuantity {
                code: analyte.to_string(),
                value: text.to_string(),
            })?;
            return Ok(Some(ObservedValue::Quantity(quantity)));
        }

        Ok(stored.coded.map(|c| ObservedValue::Coded(CodedValue::new(c))))
    }
}

impl UnitRegistry for Database {
    fn unit_for(&self, analyte: &AnalyteCode) -> LookupResult<Option<String>> {
        let unit: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT unit FROM lab_tests WHERE code = ?",
                [analyte.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(super::DbError::from)?;
        Ok(unit.flatten())
    }
}

impl DemographicsProvider for Database {
    fn patient_for(&self, accession: &AccessionRef) -> LookupResult<Option<PatientRef>> {
        Ok(self
            .get_accession(accession.as_str())?
            .map(|a| a.patient_id))
    }

    /// Age at the accession's collection date, or today when it has none.
    fn age_years(
        &self,
        patient: &PatientRef,
        accession: &AccessionRef,
    ) -> LookupResult<Option<u32>> {
        let row: Option<(Option<String>, Option<String>)> = self
            .conn
            .query_row(
                r#"
                SELECT p.birthdate, a.collected_on
                FROM accessions a
                JOIN patients p ON p.id = a.patient_id
                WHERE a.id = ?1 AND p.id = ?2
                "#,
                [accession.as_str(), patient.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(super::DbError::from)?;

        let Some((Some(birthdate), collected_on)) = row else {
            return Ok(None);
        };
        let birthdate = parse_date(&birthdate)?;
        let on = match collected_on {
            Some(date) => parse_date(&date)?,
            None => chrono::Utc::now().date_naive(),
        };
        Ok(age_in_years(birthdate, on))
    }

    fn sex(&self, patient: &PatientRef) -> LookupResult<Option<Sex>> {
        let gender: Option<String> = self
            .conn
            .query_row(
                "SELECT gender FROM patients WHERE id = ?",
                [patient.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(super::DbError::from)?;
        Ok(gender.as_deref().map(parse_sex).transpose()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Accession, LabTest, Patient};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn setup() -> (Database, Accession) {
        let db = Database::open_in_memory().unwrap();
        for code in ["Na", "ABHEAD", "GLU"] {
            db.upsert_lab_test(&LabTest::new(code, code)).unwrap();
        }
        db.upsert_lab_test(&LabTest::new("LDL", "LDL cholesterol").with_unit("mg/dL"))
            .unwrap();

        let patient = Patient::new("Alice".into(), Sex::Female)
            .with_birthdate(NaiveDate::from_ymd_opt(1970, 5, 20).unwrap());
        db.insert_patient(&patient).unwrap();
        let accession = Accession::new(patient.id.clone())
            .with_collection_date(NaiveDate::from_ymd_opt(2020, 5, 19).unwrap());
        db.insert_accession(&accession).unwrap();
        (db, accession)
    }

    #[test]
    fn test_quantity_and_coded_values() {
        let (db, accession) = setup();
        db.record_quantity(&accession.id, "Na", dec!(140.5)).unwrap();
        db.record_coded(&accession.id, "ABHEAD", "Not observed").unwrap();

        assert_eq!(
            db.value_for(&accession.id, &"Na".into()).unwrap(),
            Some(ObservedValue::Quantity(dec!(140.5)))
        );
        assert_eq!(
            db.value_for(&accession.id, &"ABHEAD".into()).unwrap(),
            Some(ObservedValue::Coded(CodedValue::from("Not observed")))
        );
        assert_eq!(db.value_for(&accession.id, &"GLU".into()).unwrap(), None);
    }

    #[test]
    fn test_blank_value_is_absent() {
        let (db, accession) = setup();
        db.record_text(&accession.id, "Na", "  ").unwrap();
        assert_eq!(db.value_for(&accession.id, &"Na".into()).unwrap(), None);
    }

    #[test]
    fn test_unparsable_value_is_an_error() {
        let (db, accession) = setup();
        db.record_text(&accession.id, "Na", "hemolyzed").unwrap();
        assert!(matches!(
            db.value_for(&accession.id, &"Na".into()),
            Err(LookupError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_unit_for() {
        let (db, _) = setup();
        assert_eq!(db.unit_for(&"LDL".into()).unwrap().as_deref(), Some("mg/dL"));
        assert_eq!(db.unit_for(&"Na".into()).unwrap(), None);
        assert_eq!(db.unit_for(&"UNKNOWN".into()).unwrap(), None);
    }

    #[test]
    fn test_demographics() {
        let (db, accession) = setup();
        let patient = db.patient_for(&accession.id).unwrap().unwrap();
        assert_eq!(patient, accession.patient_id);
        // Day before the 50th birthday
        assert_eq!(db.age_years(&patient, &accession.id).unwrap(), Some(49));
        assert_eq!(db.sex(&patient).unwrap(), Some(Sex::Female));
        assert_eq!(db.sex(&"missing".into()).unwrap(), None);
    }
}
