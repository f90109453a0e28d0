//! SQLite schema definition.

/// Complete database schema for labcalc.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    given_name TEXT NOT NULL,
    family_name TEXT,
    gender TEXT NOT NULL CHECK (gender IN ('F', 'M', 'O', 'U')),
    birthdate TEXT,                              -- ISO date, NULL for animals
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Accessions
-- ============================================================================

CREATE TABLE IF NOT EXISTS accessions (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id),
    collected_on TEXT,                           -- ISO date, reference for age
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_accessions_patient ON accessions(patient_id);

-- ============================================================================
-- Lab Test Catalog
-- ============================================================================

CREATE TABLE IF NOT EXISTS lab_tests (
    code TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    unit TEXT,                                   -- reporting unit token, e.g. 'mg/dL'
    decimals INTEGER NOT NULL DEFAULT 0,
    derivation INTEGER NOT NULL DEFAULT 0
);

-- Coded result options (valueCodeableConcept)
CREATE TABLE IF NOT EXISTS lab_test_values (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    value TEXT NOT NULL UNIQUE
);

-- ============================================================================
-- Observations
-- ============================================================================

CREATE TABLE IF NOT EXISTS observations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    accession_id TEXT NOT NULL REFERENCES accessions(id),
    lab_test_code TEXT NOT NULL REFERENCES lab_tests(code),
    value TEXT,                                  -- quantity as decimal text
    lab_test_value_id INTEGER REFERENCES lab_test_values(id),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (accession_id, lab_test_code)
);

CREATE INDEX IF NOT EXISTS idx_observations_accession ON observations(accession_id);
"#;
