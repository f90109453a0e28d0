//! Formula definitions.
//!
//! Each formula is a pure function over [`Decimal`]. Arithmetic is checked:
//! a zero divisor, an overflow, or a power that has no real value is an
//! [`DerivationError::ArithmeticFault`], never a panic or a partial value.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use super::analytes::*;
use super::{DerivationError, DerivationResult, Inputs};
use crate::models::{DerivedResult, Sex};
use crate::units::UnitCategory;

/// CKD-EPI exponent applied above the creatinine knee.
const CKD_EPI_UPPER_EXPONENT: Decimal = dec!(-1.209);
/// Race coefficient of the race-adjusted CKD-EPI variant.
const CKD_EPI_RACE_FACTOR: Decimal = dec!(1.159);
/// Race coefficient of the race-adjusted MDRD variant.
const MDRD_RACE_FACTOR: Decimal = dec!(1.212);

/// Formula tag carried by each registry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formula {
    AnionGap,
    BunCreatinineRatio,
    CholesterolHdlRatio,
    Cortisol24hTotal,
    CreatinineClearance24h,
    Ldl,
    LdlHdlRatio,
    NonHdlCholesterol,
    Globulin,
    AlbuminGlobulinRatio,
    IndirectBilirubin,
    ImmotileSperm,
    Mch,
    Mchc,
    Mcv,
    Plateletcrit,
    NormalMorphology,
    TotalMotility,
    UrineProtein24h,
    TotalSpermCount,
    Vldl,
    UrineOsmolality,
    /// CKD-EPI creatinine equation
    CkdEpi { race_adjusted: bool },
    /// MDRD study equation
    Mdrd { race_adjusted: bool },
}

impl Formula {
    /// Run the formula against resolved inputs.
    pub fn evaluate(&self, inputs: &Inputs) -> DerivationResult<DerivedResult> {
        let q = |key: &str| inputs.quantity(key);

        let value = match self {
            Formula::AnionGap => anion_gap(q(NA)?, q(CL)?, q(CO2)?)?,
            Formula::BunCreatinineRatio => div(q(BUN)?, q(CRTSA)?)?,
            Formula::CholesterolHdlRatio => div(q(CHOL)?, q(HDL)?)?,
            Formula::Cortisol24hTotal => per_24h_total(q(CORT24)?, q(UVOL24H)?)?,
            Formula::CreatinineClearance24h => {
                creatinine_clearance(q(URNCRET)?, q(CRTSA)?, q(UVOL24H)?)?
            }
            Formula::Ldl => ldl(q(CHOL)?, q(HDL)?, q(TRIG)?, inputs.unit(LDL)?)?,
            Formula::LdlHdlRatio => {
                let hdl = q(HDL)?;
                div(ldl(q(CHOL)?, hdl, q(TRIG)?, inputs.unit(LDL)?)?, hdl)?
            }
            Formula::NonHdlCholesterol => sub(q(CHOL)?, q(HDL)?)?,
            Formula::Globulin => sub(q(TP)?, q(ALB)?)?,
            Formula::AlbuminGlobulinRatio => albumin_globulin_ratio(
                q(ALB)?,
                [q(A1_GLO)?, q(A2_GLO)?, q(B_GLO)?, q(G_GLO)?],
                q(TP)?,
            )?,
            Formula::IndirectBilirubin => sub(q(TBIL)?, q(DBIL)?)?,
            Formula::ImmotileSperm => sub(Decimal::ONE_HUNDRED, add(q(PR)?, q(NP)?)?)?,
            Formula::Mch => mul(div(q(HGB)?, q(RBC)?)?, Decimal::TEN)?,
            Formula::Mchc => div(mul(q(HGB)?, Decimal::ONE_HUNDRED)?, q(HCT)?)?,
            Formula::Mcv => mul(div(q(HCT)?, q(RBC)?)?, Decimal::TEN)?,
            Formula::Plateletcrit => div(mul(q(PLTC)?, q(MPV)?)?, dec!(10000000))?,
            Formula::NormalMorphology => normal_morphology(
                q(ABHEAD)?,
                q(ABMID)?,
                q(ABMAIN)?,
                q(EXCESSCYT)?,
            )?,
            Formula::TotalMotility => add(q(PR)?, q(NP)?)?,
            Formula::UrineProtein24h => per_24h_total(q(UPROT24H)?, q(UVOL24H)?)?,
            Formula::TotalSpermCount => return total_sperm_count(q(SCONC)?, q(SVOL)?),
            Formula::Vldl => mul(dec!(0.2), q(TRIG)?)?,
            Formula::UrineOsmolality => urine_osmolality(q(NA)?, q(BUN)?, q(GLUCOSE)?)?,
            Formula::CkdEpi { race_adjusted } => {
                let demographics = inputs.demographics()?;
                let race = if *race_adjusted {
                    CKD_EPI_RACE_FACTOR
                } else {
                    Decimal::ONE
                };
                ckd_epi(q(CRTSA)?, demographics.age_years, demographics.sex, race)?
            }
            Formula::Mdrd { race_adjusted } => {
                let demographics = inputs.demographics()?;
                let value = mdrd(q(CRTSA)?, demographics.age_years, demographics.sex)?;
                if *race_adjusted {
                    mul(value, MDRD_RACE_FACTOR)?
                } else {
                    value
                }
            }
        };

        Ok(DerivedResult::Quantity(value.normalize()))
    }
}

// =========================================================================
// Chemistry
// =========================================================================

/// Na − (Cl + CO2)
pub fn anion_gap(na: Decimal, cl: Decimal, co2: Decimal) -> DerivationResult<Decimal> {
    sub(na, add(cl, co2)?)
}

/// Concentration × 24 h urine volume / 100
pub fn per_24h_total(concentration: Decimal, volume: Decimal) -> DerivationResult<Decimal> {
    div(mul(concentration, volume)?, Decimal::ONE_HUNDRED)
}

/// UVOL24H × URNCRET / CRTSA / 1440
pub fn creatinine_clearance(
    urine_creatinine: Decimal,
    serum_creatinine: Decimal,
    volume: Decimal,
) -> DerivationResult<Decimal> {
    let per_day = div(mul(volume, urine_creatinine)?, serum_creatinine)?;
    div(per_day, dec!(1440))
}

/// Friedewald LDL; the TRIG divisor depends on the reporting unit.
pub fn ldl(
    chol: Decimal,
    hdl: Decimal,
    trig: Decimal,
    unit: UnitCategory,
) -> DerivationResult<Decimal> {
    let divisor = match unit {
        UnitCategory::MassPerVolume => dec!(5),
        UnitCategory::SubstancePerVolume => dec!(2.2),
    };
    sub(chol, add(hdl, div(trig, divisor)?)?)
}

/// ALB / globulin, where globulin is the sum of the electrophoresis
/// fractions, or TP − ALB when the fractions sum to zero.
pub fn albumin_globulin_ratio(
    alb: Decimal,
    fractions: [Decimal; 4],
    tp: Decimal,
) -> DerivationResult<Decimal> {
    let fraction_sum = fractions
        .into_iter()
        .try_fold(Decimal::ZERO, add)?;
    let globulin = if fraction_sum.is_zero() {
        sub(tp, alb)?
    } else {
        fraction_sum
    };
    div(alb, globulin)
}

/// Na×2 + BUN/2.8 + glucose/18
pub fn urine_osmolality(na: Decimal, bun: Decimal, glucose: Decimal) -> DerivationResult<Decimal> {
    let sodium = mul(na, Decimal::TWO)?;
    add(
        add(sodium, div(bun, dec!(2.8))?)?,
        div(glucose, dec!(18))?,
    )
}

// =========================================================================
// Semen analysis
// =========================================================================

/// 100 − (ABHEAD + ABMID + ABMAIN + EXCESSCYT)
pub fn normal_morphology(
    head: Decimal,
    midpiece: Decimal,
    principal_piece: Decimal,
    excess_cytoplasm: Decimal,
) -> DerivationResult<Decimal> {
    let abnormal = [head, midpiece, principal_piece, excess_cytoplasm]
        .into_iter()
        .try_fold(Decimal::ZERO, add)?;
    sub(Decimal::ONE_HUNDRED, abnormal)
}

/// SCONC × SVOL, reported as `<0.1` when the product is zero.
pub fn total_sperm_count(concentration: Decimal, volume: Decimal) -> DerivationResult<DerivedResult> {
    let total = mul(concentration, volume)?;
    if total.is_zero() {
        Ok(DerivedResult::BelowThreshold)
    } else {
        Ok(DerivedResult::Quantity(total.normalize()))
    }
}

// =========================================================================
// Kidney function
// =========================================================================

/// Sex-specific CKD-EPI constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CkdEpiConstants {
    /// Exponent below the knee (a)
    pub alpha: Decimal,
    /// Creatinine knee (k)
    pub kappa: Decimal,
    pub sex_factor: Decimal,
}

impl CkdEpiConstants {
    /// Female constants for `Sex::Female`, male constants otherwise.
    pub fn for_sex(sex: Sex) -> Self {
        if sex.is_female() {
            Self {
                alpha: dec!(-0.329),
                kappa: dec!(0.7),
                sex_factor: dec!(1.018),
            }
        } else {
            Self {
                alpha: dec!(-0.411),
                kappa: dec!(0.9),
                sex_factor: Decimal::ONE,
            }
        }
    }
}

/// 141 × min(Scr/k, 1)^a × max(Scr/k, 1)^−1.209 × 0.993^age × sexFactor × race
pub fn ckd_epi(
    creatinine: Decimal,
    age_years: u32,
    sex: Sex,
    race_factor: Decimal,
) -> DerivationResult<Decimal> {
    let constants = CkdEpiConstants::for_sex(sex);
    let ratio = div(creatinine, constants.kappa)?;

    let below_knee = pow(ratio.min(Decimal::ONE), constants.alpha)?;
    let above_knee = pow(ratio.max(Decimal::ONE), CKD_EPI_UPPER_EXPONENT)?;
    let age_term = dec!(0.993)
        .checked_powi(i64::from(age_years))
        .ok_or(DerivationError::ArithmeticFault("invalid power"))?;

    [
        below_knee,
        above_knee,
        age_term,
        constants.sex_factor,
        race_factor,
    ]
    .into_iter()
    .try_fold(dec!(141), mul)
}

/// 175 × Scr^−1.154 × age^−0.203 × sexFactor (female 0.742, otherwise 1)
pub fn mdrd(creatinine: Decimal, age_years: u32, sex: Sex) -> DerivationResult<Decimal> {
    let sex_factor = if sex.is_female() {
        dec!(0.742)
    } else {
        Decimal::ONE
    };

    let creatinine_term = pow(creatinine, dec!(-1.154))?;
    let age_term = pow(Decimal::from(age_years), dec!(-0.203))?;

    [creatinine_term, age_term, sex_factor]
        .into_iter()
        .try_fold(dec!(175), mul)
}

// =========================================================================
// Checked arithmetic
// =========================================================================

fn add(a: Decimal, b: Decimal) -> DerivationResult<Decimal> {
    a.checked_add(b)
        .ok_or(DerivationError::ArithmeticFault("overflow"))
}

fn sub(a: Decimal, b: Decimal) -> DerivationResult<Decimal> {
    a.checked_sub(b)
        .ok_or(DerivationError::ArithmeticFault("overflow"))
}

fn mul(a: Decimal, b: Decimal) -> DerivationResult<Decimal> {
    a.checked_mul(b)
        .ok_or(DerivationError::ArithmeticFault("overflow"))
}

fn div(a: Decimal, b: Decimal) -> DerivationResult<Decimal> {
    if b.is_zero() {
        return Err(DerivationError::ArithmeticFault("division by zero"));
    }
    a.checked_div(b)
        .ok_or(DerivationError::ArithmeticFault("overflow"))
}

/// Real power of a strictly positive base.
fn pow(base: Decimal, exponent: Decimal) -> DerivationResult<Decimal> {
    if base <= Decimal::ZERO {
        return Err(DerivationError::ArithmeticFault("non-positive base"));
    }
    base.checked_powd(exponent)
        .ok_or(DerivationError::ArithmeticFault("invalid power"))
}
