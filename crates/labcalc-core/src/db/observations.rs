//! Observation database operations.

use rusqlite::{params, OptionalExtension};
use rust_decimal::Decimal;

use super::{Database, DbResult};
use crate::models::AccessionRef;

/// Raw observation row: quantity text and coded option text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StoredObservation {
    pub value: Option<String>,
    pub coded: Option<String>,
}

impl Database {
    /// Record (or replace) a quantity for one analyte in one accession.
    pub fn record_quantity(
        &self,
        accession: &AccessionRef,
        code: &str,
        value: Decimal,
    ) -> DbResult<()> {
        self.upsert_observation(accession, code, Some(value.to_string()), None)
    }

    /// Record (or replace) a coded value for one analyte in one accession.
    pub fn record_coded(&self, accession: &AccessionRef, code: &str, value: &str) -> DbResult<()> {
        let option_id = self.insert_coded_option(value)?;
        self.upsert_observation(accession, code, None, Some(option_id))
    }

    /// Record a raw text value, as entered upstream.
    pub fn record_text(&self, accession: &AccessionRef, code: &str, value: &str) -> DbResult<()> {
        self.upsert_observation(accession, code, Some(value.to_string()), None)
    }

    fn upsert_observation(
        &self,
        accession: &AccessionRef,
        code: &str,
        value: Option<String>,
        option_id: Option<i64>,
    ) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO observations (accession_id, lab_test_code, value, lab_test_value_id)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(accession_id, lab_test_code) DO UPDATE SET
                value = excluded.value,
                lab_test_value_id = excluded.lab_test_value_id,
                updated_at = datetime('now')
            "#,
            params![accession.as_str(), code, value, option_id],
        )?;
        Ok(())
    }

    /// Fetch the stored observation for one analyte in one accession.
    pub(crate) fn get_observation(
        &self,
        accession: &AccessionRef,
        code: &str,
    ) -> DbResult<Option<StoredObservation>> {
        self.conn
            .query_row(
                r#"
                SELECT o.value, v.value
                FROM observations o
                JOIN lab_tests t ON t.code = o.lab_test_code
                LEFT JOIN lab_test_values v ON v.id = o.lab_test_value_id
                WHERE o.accession_id = ?1 AND t.code = ?2
                "#,
                params![accession.as_str(), code],
                |row| {
                    Ok(StoredObservation {
                        value: row.get(0)?,
                        coded: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }
}
