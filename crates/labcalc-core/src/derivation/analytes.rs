//! Analyte codes read by the formulas.
//!
//! Registry operands and formula lookups both use these keys.

// Chemistry
pub const NA: &str = "Na";
pub const CL: &str = "Cl";
pub const CO2: &str = "CO2";
pub const BUN: &str = "BUN";
pub const CRTSA: &str = "CRTSA";
pub const URNCRET: &str = "URNCRET";
pub const TP: &str = "TP";
pub const ALB: &str = "ALB";
pub const A1_GLO: &str = "A1-GLO";
pub const A2_GLO: &str = "A2-GLO";
pub const B_GLO: &str = "B-GLO";
pub const G_GLO: &str = "G-GLO";
pub const TBIL: &str = "TBIL";
pub const DBIL: &str = "DBIL";
pub const GLU: &str = "GLU";
pub const GLUC: &str = "GLUC";

/// Operand key for the first available glucose result (`GLU`, then `GLUC`).
pub const GLUCOSE: &str = "GLUCOSE";

// Lipids
pub const CHOL: &str = "CHOL";
pub const HDL: &str = "HDL";
pub const TRIG: &str = "TRIG";
/// Configured unit source of the LDL family
pub const LDL: &str = "LDL";

// Urine
pub const CORT24: &str = "CORT24";
pub const UPROT24H: &str = "UPROT24H";
pub const UVOL24H: &str = "UVOL24H";

// Hematology
pub const HGB: &str = "HGB";
pub const HCT: &str = "HCT";
pub const RBC: &str = "RBC";
pub const PLTC: &str = "PLTC";
pub const MPV: &str = "MPV";

// Semen analysis
pub const PR: &str = "PR";
pub const NP: &str = "NP";
pub const SCONC: &str = "SCONC";
pub const SVOL: &str = "SVOL";
pub const ABHEAD: &str = "ABHEAD";
pub const ABMID: &str = "ABMID";
pub const ABMAIN: &str = "ABMAIN";
pub const EXCESSCYT: &str = "EXCESSCYT";
