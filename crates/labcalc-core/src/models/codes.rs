//! Identifier newtypes.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a measurable lab test (e.g. `Na`, `CRTSA`, `TRIG`).
    AnalyteCode
);

string_id!(
    /// Identifier of a computed quantity (e.g. `AG`, `EGFRMDRD`).
    ///
    /// Shares the analyte namespace: a derivation is usually also configured
    /// as a lab test so it can carry a unit and appear on reports.
    DerivationCode
);

string_id!(
    /// Reference to an accession, the specimen/order grouping that scopes
    /// every result lookup.
    AccessionRef
);

string_id!(
    /// Reference to the patient who owns an accession.
    PatientRef
);
