//! Derivation evaluator.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{registry, Demographics, Derivation, DerivationError, DerivationResult, Inputs, Operand};
use crate::lookup::{DemographicsProvider, ResultLookup, UnitRegistry};
use crate::models::{
    AccessionRef, AnalyteCode, CodedValue, DerivationCode, DerivedResult, ObservedValue,
};
use crate::units::{UnitCatalog, UnitCategory};

/// Values read during one computation, keyed by analyte code.
type Observed = HashMap<&'static str, Option<ObservedValue>>;

/// Computes derived results for one accession at a time.
///
/// Stateless apart from its borrowed collaborators and unit catalog, so a
/// shared evaluator can serve concurrent callers.
pub struct Evaluator<L, U, D> {
    results: L,
    units: U,
    demographics: D,
    catalog: UnitCatalog,
}

impl<'a, S> Evaluator<&'a S, &'a S, &'a S>
where
    S: ResultLookup + UnitRegistry + DemographicsProvider,
{
    /// Create an evaluator backed by a single store for all collaborators.
    pub fn for_store(store: &'a S) -> Self {
        Self::new(store, store, store)
    }
}

impl<L, U, D> Evaluator<L, U, D>
where
    L: ResultLookup,
    U: UnitRegistry,
    D: DemographicsProvider,
{
    /// Create an evaluator with the default unit catalog.
    pub fn new(results: L, units: U, demographics: D) -> Self {
        Self::with_units(results, units, demographics, UnitCatalog::new())
    }

    /// Create an evaluator with a site-specific unit catalog.
    pub fn with_units(results: L, units: U, demographics: D, catalog: UnitCatalog) -> Self {
        Self {
            results,
            units,
            demographics,
            catalog,
        }
    }

    /// Compute one derivation for an accession.
    ///
    /// Never fails: anything that prevents a value is reported as
    /// [`DerivedResult::Undetermined`].
    pub fn compute(&self, code: impl AsRef<str>, accession: &AccessionRef) -> DerivedResult {
        let code = code.as_ref();
        match self.try_compute(code, accession) {
            Ok(result) => result,
            Err(e) if e.is_fault() => {
                warn!(derivation = code, accession = %accession, error = %e, "derivation fault");
                DerivedResult::Undetermined
            }
            Err(e) => {
                debug!(derivation = code, accession = %accession, reason = %e, "derivation undetermined");
                DerivedResult::Undetermined
            }
        }
    }

    /// Compute every registered derivation for an accession, in registry order.
    pub fn compute_all(&self, accession: &AccessionRef) -> Vec<(DerivationCode, DerivedResult)> {
        registry::iter()
            .map(|d| (DerivationCode::from(d.code), self.compute(d.code, accession)))
            .collect()
    }

    pub(crate) fn try_compute(
        &self,
        code: &str,
        accession: &AccessionRef,
    ) -> DerivationResult<DerivedResult> {
        let derivation = registry::lookup(code)
            .ok_or_else(|| DerivationError::UnknownDerivation(code.to_string()))?;

        let mut observed = Observed::new();
        let mut inputs = Inputs::new();
        let mut missing = Vec::new();
        for operand in derivation.operands {
            match self.resolve_operand(&mut observed, accession, operand)? {
                Some(value) => inputs.insert(operand.key(), value),
                None => missing.push(operand.key()),
            }
        }

        if !missing.is_empty() {
            if let Some(coded) = self.coded_fallback(&mut observed, derivation, accession)? {
                return Ok(DerivedResult::Coded(coded));
            }
            return Err(DerivationError::MissingInput(missing.join(", ")));
        }

        if derivation.needs_demographics {
            inputs.set_demographics(self.resolve_demographics(accession)?);
        }
        if let Some(analyte) = derivation.unit_source {
            inputs.set_unit(self.resolve_unit(analyte)?);
        }

        derivation.formula.evaluate(&inputs)
    }

    /// The value recorded for `code`, read from the collaborator at most once
    /// per computation.
    fn observe(
        &self,
        observed: &mut Observed,
        accession: &AccessionRef,
        code: &'static str,
    ) -> DerivationResult<Option<ObservedValue>> {
        if let Some(value) = observed.get(code) {
            return Ok(value.clone());
        }
        let value = self
            .results
            .value_for(accession, &AnalyteCode::from(code))?;
        observed.insert(code, value.clone());
        Ok(value)
    }

    fn resolve_operand(
        &self,
        observed: &mut Observed,
        accession: &AccessionRef,
        operand: &Operand,
    ) -> DerivationResult<Option<Decimal>> {
        match *operand {
            Operand::Analyte(code) => {
                Ok(self.observe(observed, accession, code)?.and_then(|v| v.quantity()))
            }
            Operand::FirstOf { codes, .. } => {
                for code in codes {
                    let value = self.observe(observed, accession, *code)?;
                    if let Some(quantity) = value.and_then(|v| v.quantity()) {
                        return Ok(Some(quantity));
                    }
                }
                Ok(None)
            }
        }
    }

    /// First coded value among the record's fallback analytes.
    fn coded_fallback(
        &self,
        observed: &mut Observed,
        derivation: &Derivation,
        accession: &AccessionRef,
    ) -> DerivationResult<Option<CodedValue>> {
        for code in derivation.coded_fallback {
            let value = self.observe(observed, accession, *code)?;
            if let Some(ObservedValue::Coded(coded)) = value {
                return Ok(Some(coded));
            }
        }
        Ok(None)
    }

    fn resolve_demographics(&self, accession: &AccessionRef) -> DerivationResult<Demographics> {
        let patient = self
            .demographics
            .patient_for(accession)?
            .ok_or(DerivationError::MissingDemographics("patient"))?;
        let age_years = self
            .demographics
            .age_years(&patient, accession)?
            .ok_or(DerivationError::MissingDemographics("age"))?;
        let sex = self
            .demographics
            .sex(&patient)?
            .ok_or(DerivationError::MissingDemographics("sex"))?;
        Ok(Demographics { age_years, sex })
    }

    fn resolve_unit(&self, analyte: &str) -> DerivationResult<UnitCategory> {
        let token = self.units.unit_for(&AnalyteCode::from(analyte))?;
        token
            .as_deref()
            .and_then(|t| self.catalog.category(t))
            .ok_or_else(|| DerivationError::UnresolvableUnit {
                analyte: analyte.to_string(),
                unit: token.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{InMemoryResults, LookupError, LookupResult};
    use crate::models::{PatientRef, Sex};
    use rust_decimal_macros::dec;
    use std::cell::Cell;

    fn accession() -> AccessionRef {
        AccessionRef::from("acc-1")
    }

    #[test]
    fn test_missing_input_is_not_a_fault() {
        let store = InMemoryResults::new();
        let evaluator = Evaluator::for_store(&store);

        let err = evaluator.try_compute("AG", &accession()).unwrap_err();
        assert!(matches!(err, DerivationError::MissingInput(ref m) if m == "Na, Cl, CO2"));
        assert!(!err.is_fault());
    }

    #[test]
    fn test_unknown_code() {
        let store = InMemoryResults::new();
        let evaluator = Evaluator::for_store(&store);

        assert!(matches!(
            evaluator.try_compute("NOPE", &accession()),
            Err(DerivationError::UnknownDerivation(_))
        ));
        assert_eq!(evaluator.compute("NOPE", &accession()), DerivedResult::Undetermined);
    }

    #[test]
    fn test_unrecognized_unit_is_a_fault() {
        let acc = accession();
        let mut store = InMemoryResults::new();
        store
            .record(&acc, "CHOL", dec!(200))
            .record(&acc, "HDL", dec!(50))
            .record(&acc, "TRIG", dec!(150))
            .set_unit("LDL", "%");
        let evaluator = Evaluator::for_store(&store);

        let err = evaluator.try_compute("LDL", &acc).unwrap_err();
        assert!(err.is_fault());
        assert!(matches!(
            err,
            DerivationError::UnresolvableUnit { ref unit, .. } if unit.as_deref() == Some("%")
        ));
        assert_eq!(evaluator.compute("LDL", &acc), DerivedResult::Undetermined);
    }

    #[test]
    fn test_custom_unit_catalog() {
        let acc = accession();
        let mut store = InMemoryResults::new();
        store
            .record(&acc, "CHOL", dec!(200))
            .record(&acc, "HDL", dec!(50))
            .record(&acc, "TRIG", dec!(150))
            .set_unit("LDL", "mg%");
        let mut catalog = UnitCatalog::new();
        catalog.add_token("mg%", UnitCategory::MassPerVolume);
        let evaluator = Evaluator::with_units(&store, &store, &store, catalog);

        assert_eq!(
            evaluator.compute("LDL", &acc),
            DerivedResult::Quantity(dec!(120))
        );
    }

    #[test]
    fn test_first_available_glucose() {
        let acc = accession();
        let mut store = InMemoryResults::new();
        store
            .record(&acc, "Na", dec!(140))
            .record(&acc, "BUN", dec!(28))
            .record(&acc, "GLU", CodedValue::from("Hemolyzed"))
            .record(&acc, "GLUC", dec!(90));
        let evaluator = Evaluator::for_store(&store);

        // 280 + 10 + 5
        assert_eq!(
            evaluator.compute("UOSMS", &acc),
            DerivedResult::Quantity(dec!(295))
        );
    }

    #[test]
    fn test_missing_demographics() {
        let acc = accession();
        let mut store = InMemoryResults::new();
        store.record(&acc, "CRTSA", dec!(1.0));
        let evaluator = Evaluator::for_store(&store);

        assert!(matches!(
            evaluator.try_compute("EGNB", &acc),
            Err(DerivationError::MissingDemographics("patient"))
        ));
    }

    struct FailingLookup;

    impl ResultLookup for FailingLookup {
        fn value_for(
            &self,
            _accession: &AccessionRef,
            _analyte: &AnalyteCode,
        ) -> LookupResult<Option<ObservedValue>> {
            Err(LookupError::Backend("connection reset".into()))
        }
    }

    impl UnitRegistry for FailingLookup {
        fn unit_for(&self, _analyte: &AnalyteCode) -> LookupResult<Option<String>> {
            Ok(None)
        }
    }

    impl DemographicsProvider for FailingLookup {
        fn patient_for(&self, _accession: &AccessionRef) -> LookupResult<Option<PatientRef>> {
            Ok(None)
        }

        fn age_years(
            &self,
            _patient: &PatientRef,
            _accession: &AccessionRef,
        ) -> LookupResult<Option<u32>> {
            Ok(None)
        }

        fn sex(&self, _patient: &PatientRef) -> LookupResult<Option<Sex>> {
            Ok(None)
        }
    }

    #[test]
    fn test_lookup_failure_is_contained() {
        let evaluator = Evaluator::new(FailingLookup, FailingLookup, FailingLookup);

        let err = evaluator.try_compute("AG", &accession()).unwrap_err();
        assert!(matches!(err, DerivationError::Lookup(_)));
        assert!(err.is_fault());
        assert_eq!(evaluator.compute("AG", &accession()), DerivedResult::Undetermined);
    }

    /// Counts reads, delegating to an in-memory store.
    struct CountingLookup<'a> {
        inner: &'a InMemoryResults,
        reads: Cell<usize>,
    }

    impl ResultLookup for CountingLookup<'_> {
        fn value_for(
            &self,
            accession: &AccessionRef,
            analyte: &AnalyteCode,
        ) -> LookupResult<Option<ObservedValue>> {
            self.reads.set(self.reads.get() + 1);
            self.inner.value_for(accession, analyte)
        }
    }

    #[test]
    fn test_fallback_reuses_fetched_values() {
        let acc = accession();
        let mut store = InMemoryResults::new();
        store
            .record(&acc, "ABHEAD", dec!(40))
            .record(&acc, "ABMID", CodedValue::from("Not assessed"))
            .record(&acc, "ABMAIN", dec!(5))
            .record(&acc, "CHOL", dec!(200))
            .record(&acc, "HDL", dec!(50))
            .record(&acc, "TRIG", CodedValue::from("Lipemic"))
            .set_unit("LDL", "mg/dL");
        let counting = CountingLookup {
            inner: &store,
            reads: Cell::new(0),
        };
        let evaluator = Evaluator::new(&counting, &store, &store);

        assert_eq!(
            evaluator.compute("NORM", &acc),
            DerivedResult::Coded(CodedValue::from("Not assessed"))
        );
        assert_eq!(counting.reads.get(), 4);

        counting.reads.set(0);
        assert_eq!(
            evaluator.compute("LDL", &acc),
            DerivedResult::Coded(CodedValue::from("Lipemic"))
        );
        assert_eq!(counting.reads.get(), 3);
    }
}
