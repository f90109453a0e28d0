//! Derivation registry.
//!
//! A static table of formula records keyed by derivation code. Records
//! declare their operands up front so the evaluator can check availability
//! before any formula logic runs.

use super::analytes::*;
use super::Formula;

/// A required input of a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// The quantity recorded for one analyte
    Analyte(&'static str),
    /// The first quantity found among `codes`, stored under `key`
    FirstOf {
        key: &'static str,
        codes: &'static [&'static str],
    },
}

impl Operand {
    /// Key the resolved quantity is stored under.
    pub fn key(&self) -> &'static str {
        match *self {
            Operand::Analyte(code) => code,
            Operand::FirstOf { key, .. } => key,
        }
    }
}

/// One registry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Derivation {
    /// Derivation code (e.g. "AG")
    pub code: &'static str,
    /// Display name
    pub name: &'static str,
    /// Required quantities
    pub operands: &'static [Operand],
    /// Whether patient age and sex are needed
    pub needs_demographics: bool,
    /// Analyte whose configured unit selects the coefficients
    pub unit_source: Option<&'static str>,
    /// Analytes whose coded value is returned, in priority order, when a
    /// quantity is missing
    pub coded_fallback: &'static [&'static str],
    /// Computation
    pub formula: Formula,
}

impl Derivation {
    const fn simple(
        code: &'static str,
        name: &'static str,
        operands: &'static [Operand],
        formula: Formula,
    ) -> Self {
        Self {
            code,
            name,
            operands,
            needs_demographics: false,
            unit_source: None,
            coded_fallback: &[],
            formula,
        }
    }

    const fn with_unit_source(mut self, analyte: &'static str) -> Self {
        self.unit_source = Some(analyte);
        self
    }

    const fn with_demographics(mut self) -> Self {
        self.needs_demographics = true;
        self
    }

    const fn with_coded_fallback(mut self, codes: &'static [&'static str]) -> Self {
        self.coded_fallback = codes;
        self
    }
}

use Operand::Analyte as A;

const LIPIDS: &[Operand] = &[A(CHOL), A(HDL), A(TRIG)];
const LIPID_CODES: &[&str] = &[CHOL, HDL, TRIG];
const SERUM_CREATININE: &[Operand] = &[A(CRTSA)];
const MORPHOLOGY_CODES: &[&str] = &[ABHEAD, ABMID, ABMAIN, EXCESSCYT];

static DERIVATIONS: &[Derivation] = &[
    Derivation::simple(
        "AG",
        "Anion gap",
        &[A(NA), A(CL), A(CO2)],
        Formula::AnionGap,
    ),
    Derivation::simple(
        "BUNCRER",
        "BUN/creatinine ratio",
        &[A(BUN), A(CRTSA)],
        Formula::BunCreatinineRatio,
    ),
    Derivation::simple(
        "CHOLHDLR",
        "Cholesterol/HDL ratio",
        &[A(CHOL), A(HDL)],
        Formula::CholesterolHdlRatio,
    ),
    Derivation::simple(
        "CORT24MT",
        "Urine cortisol, 24 h total",
        &[A(CORT24), A(UVOL24H)],
        Formula::Cortisol24hTotal,
    ),
    Derivation::simple(
        "CRETCLEAR24H",
        "Creatinine clearance, 24 h",
        &[A(URNCRET), A(CRTSA), A(UVOL24H)],
        Formula::CreatinineClearance24h,
    ),
    Derivation::simple("LDL", "LDL cholesterol", LIPIDS, Formula::Ldl)
        .with_unit_source(LDL)
        .with_coded_fallback(LIPID_CODES),
    Derivation::simple("LDLHDLR", "LDL/HDL ratio", LIPIDS, Formula::LdlHdlRatio)
        .with_unit_source(LDL)
        .with_coded_fallback(LIPID_CODES),
    Derivation::simple(
        "NHDCH",
        "Non-HDL cholesterol",
        &[A(CHOL), A(HDL)],
        Formula::NonHdlCholesterol,
    ),
    Derivation::simple("GLO", "Globulin", &[A(TP), A(ALB)], Formula::Globulin),
    Derivation::simple(
        "ALBGLO",
        "Albumin/globulin ratio",
        &[
            A(ALB),
            A(A1_GLO),
            A(A2_GLO),
            A(B_GLO),
            A(G_GLO),
            A(TP),
        ],
        Formula::AlbuminGlobulinRatio,
    ),
    Derivation::simple(
        "IBIL",
        "Indirect bilirubin",
        &[A(TBIL), A(DBIL)],
        Formula::IndirectBilirubin,
    ),
    Derivation::simple(
        "IM",
        "Immotile sperm",
        &[A(PR), A(NP)],
        Formula::ImmotileSperm,
    ),
    Derivation::simple("MCH", "MCH", &[A(HGB), A(RBC)], Formula::Mch),
    Derivation::simple("MCHC", "MCHC", &[A(HGB), A(HCT)], Formula::Mchc),
    Derivation::simple("MCV", "MCV", &[A(HCT), A(RBC)], Formula::Mcv),
    Derivation::simple(
        "PCT",
        "Plateletcrit",
        &[A(PLTC), A(MPV)],
        Formula::Plateletcrit,
    ),
    Derivation::simple(
        "NORM",
        "Normal forms",
        &[A(ABHEAD), A(ABMID), A(ABMAIN), A(EXCESSCYT)],
        Formula::NormalMorphology,
    )
    .with_coded_fallback(MORPHOLOGY_CODES),
    Derivation::simple(
        "TMOTILE",
        "Total motility",
        &[A(PR), A(NP)],
        Formula::TotalMotility,
    ),
    Derivation::simple(
        "TPU24H",
        "Urine protein, 24 h total",
        &[A(UPROT24H), A(UVOL24H)],
        Formula::UrineProtein24h,
    ),
    Derivation::simple(
        "TSPERM",
        "Total sperm count",
        &[A(SCONC), A(SVOL)],
        Formula::TotalSpermCount,
    ),
    Derivation::simple("VLDL", "VLDL cholesterol", &[A(TRIG)], Formula::Vldl),
    Derivation::simple(
        "UOSMS",
        "Urine osmolality, calculated",
        &[
            A(NA),
            A(BUN),
            Operand::FirstOf {
                key: GLUCOSE,
                codes: &[GLU, GLUC],
            },
        ],
        Formula::UrineOsmolality,
    ),
    Derivation::simple(
        "EGNB",
        "eGFR (CKD-EPI)",
        SERUM_CREATININE,
        Formula::CkdEpi {
            race_adjusted: false,
        },
    )
    .with_demographics(),
    Derivation::simple(
        "EGFRMDRD",
        "eGFR (MDRD)",
        SERUM_CREATININE,
        Formula::Mdrd {
            race_adjusted: false,
        },
    )
    .with_demographics(),
    Derivation::simple(
        "EGBL",
        "eGFR (CKD-EPI), race-adjusted",
        SERUM_CREATININE,
        Formula::CkdEpi {
            race_adjusted: true,
        },
    )
    .with_demographics()
    .with_coded_fallback(&[CRTSA]),
    Derivation::simple(
        "EGFRMDRDBL",
        "eGFR (MDRD), race-adjusted",
        SERUM_CREATININE,
        Formula::Mdrd {
            race_adjusted: true,
        },
    )
    .with_demographics()
    .with_coded_fallback(&[CRTSA]),
];

/// Find the record for a derivation code.
pub fn lookup(code: &str) -> Option<&'static Derivation> {
    DERIVATIONS.iter().find(|d| d.code == code)
}

/// All records, in registry order.
pub fn iter() -> impl Iterator<Item = &'static Derivation> {
    DERIVATIONS.iter()
}

/// All supported derivation codes, in registry order.
pub fn codes() -> Vec<&'static str> {
    DERIVATIONS.iter().map(|d| d.code).collect()
}
