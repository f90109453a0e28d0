//! Unit category resolution.
//!
//! Unit-dependent formulas (the LDL family) pick coefficients by the
//! *category* of the configured reporting unit, not by its display label.
//! [`UnitCatalog`] maps unit tokens to categories:
//! - mass per volume (mg/dL, g/L, ...)
//! - substance per volume (mmol/L, µmol/L, ...)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Kind of concentration unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitCategory {
    /// Conventional units, e.g. mg/dL
    MassPerVolume,
    /// SI units, e.g. mmol/L
    SubstancePerVolume,
}

/// Token → category table used to classify configured units.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCatalog {
    /// Lowercased unit token → category
    categories: HashMap<String, UnitCategory>,
}

impl Default for UnitCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitCatalog {
    /// Create a catalog with the default mappings.
    pub fn new() -> Self {
        Self {
            categories: Self::default_categories(),
        }
    }

    /// Create an empty catalog.
    pub fn empty() -> Self {
        Self {
            categories: HashMap::new(),
        }
    }

    /// Load site mappings from JSON, e.g. `{"mg/dl": "mass_per_volume"}`.
    ///
    /// Entries are added on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let extra: HashMap<String, UnitCategory> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for (token, category) in extra {
            catalog.add_token(&token, category);
        }
        Ok(catalog)
    }

    /// Classify a unit token. Case and surrounding whitespace are ignored.
    pub fn category(&self, token: &str) -> Option<UnitCategory> {
        self.categories.get(&token.trim().to_lowercase()).copied()
    }

    /// Add or replace a token mapping.
    pub fn add_token(&mut self, token: &str, category: UnitCategory) {
        self.categories
            .insert(token.trim().to_lowercase(), category);
    }

    /// Default unit mappings.
    fn default_categories() -> HashMap<String, UnitCategory> {
        let mut map = HashMap::new();

        // Mass/volume
        map.insert("mg/dl".into(), UnitCategory::MassPerVolume);
        map.insert("mg/l".into(), UnitCategory::MassPerVolume);
        map.insert("g/dl".into(), UnitCategory::MassPerVolume);
        map.insert("g/l".into(), UnitCategory::MassPerVolume);

        // Substance/volume
        map.insert("mmol/l".into(), UnitCategory::SubstancePerVolume);
        map.insert("µmol/l".into(), UnitCategory::SubstancePerVolume);
        map.insert("umol/l".into(), UnitCategory::SubstancePerVolume);

        map
    }
}
