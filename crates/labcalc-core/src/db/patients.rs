//! Patient and accession database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{Accession, AccessionRef, Patient, PatientRef, Sex};

const DATE_FORMAT: &str = "%Y-%m-%d";

impl Database {
    /// Insert a new patient.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, given_name, family_name, gender, birthdate, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                patient.id.as_str(),
                patient.given_name,
                patient.family_name,
                patient.sex.code(),
                patient.birthdate.map(|d| d.format(DATE_FORMAT).to_string()),
                patient.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, given_name, family_name, gender, birthdate, created_at
                FROM patients
                WHERE id = ?
                "#,
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, given_name, family_name, gender, birthdate, created_at)) = row else {
            return Ok(None);
        };

        Ok(Some(Patient {
            id: PatientRef::from(id),
            given_name,
            family_name,
            sex: parse_sex(&gender)?,
            birthdate: birthdate.as_deref().map(parse_date).transpose()?,
            created_at,
        }))
    }

    /// Insert a new accession.
    pub fn insert_accession(&self, accession: &Accession) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO accessions (id, patient_id, collected_on, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                accession.id.as_str(),
                accession.patient_id.as_str(),
                accession
                    .collected_on
                    .map(|d| d.format(DATE_FORMAT).to_string()),
                accession.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get an accession by ID.
    pub fn get_accession(&self, id: &str) -> DbResult<Option<Accession>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, patient_id, collected_on, created_at
                FROM accessions
                WHERE id = ?
                "#,
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, patient_id, collected_on, created_at)) = row else {
            return Ok(None);
        };

        Ok(Some(Accession {
            id: AccessionRef::from(id),
            patient_id: PatientRef::from(patient_id),
            collected_on: collected_on.as_deref().map(parse_date).transpose()?,
            created_at,
        }))
    }
}

pub(super) fn parse_date(value: &str) -> DbResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| DbError::InvalidValue(format!("date {:?}: {}", value, e)))
}

pub(super) fn parse_sex(value: &str) -> DbResult<Sex> {
    Sex::from_code(value).ok_or_else(|| DbError::InvalidValue(format!("gender {:?}", value)))
}
