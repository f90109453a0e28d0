//! Property tests for the evaluator boundary.

use labcalc_core::derivation::{registry, Operand};
use labcalc_core::{AccessionRef, DerivedResult, Evaluator, InMemoryResults};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn quantity() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000i64..1_000_000_000, 0u32..4).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

/// Every analyte code read by any derivation.
fn all_input_codes() -> Vec<&'static str> {
    let mut codes: Vec<&'static str> = registry::iter()
        .flat_map(|d| d.operands.iter())
        .flat_map(|operand| match *operand {
            Operand::Analyte(code) => vec![code],
            Operand::FirstOf { codes, .. } => codes.to_vec(),
        })
        .collect();
    codes.sort_unstable();
    codes.dedup();
    codes
}

#[test]
fn test_empty_accession_is_undetermined_everywhere() {
    let store = InMemoryResults::new();
    let evaluator = Evaluator::for_store(&store);
    let accession = AccessionRef::from("empty");

    for (code, result) in evaluator.compute_all(&accession) {
        assert_eq!(result, DerivedResult::Undetermined, "{} should be undetermined", code);
    }
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_evaluator_is_send_and_sync() {
    assert_send_sync::<Evaluator<&InMemoryResults, &InMemoryResults, &InMemoryResults>>();
    assert_send_sync::<Evaluator<InMemoryResults, InMemoryResults, InMemoryResults>>();
}

#[test]
fn test_concurrent_compute_agrees() {
    let accession = AccessionRef::from("acc");
    let mut store = InMemoryResults::new();
    store
        .record(&accession, "Na", Decimal::from(140))
        .record(&accession, "Cl", Decimal::from(100))
        .record(&accession, "CO2", Decimal::from(24))
        .record(&accession, "TRIG", Decimal::from(150));

    let evaluator = Evaluator::for_store(&store);
    let expected = evaluator.compute_all(&accession);

    let (shared, accession_ref) = (&evaluator, &accession);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(move || shared.compute_all(accession_ref)))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });

    let ag = expected.iter().find(|(code, _)| code.as_str() == "AG").unwrap();
    assert_eq!(ag.1, DerivedResult::Quantity(Decimal::from(16)));
}

proptest! {
    #[test]
    fn anion_gap_is_exact(na in 0i64..300, cl in 0i64..200, co2 in 0i64..60) {
        let accession = AccessionRef::from("acc");
        let mut store = InMemoryResults::new();
        store
            .record(&accession, "Na", Decimal::from(na))
            .record(&accession, "Cl", Decimal::from(cl))
            .record(&accession, "CO2", Decimal::from(co2));

        let evaluator = Evaluator::for_store(&store);
        prop_assert_eq!(
            evaluator.compute("AG", &accession),
            DerivedResult::Quantity(Decimal::from(na - cl - co2))
        );
    }

    #[test]
    fn arbitrary_inputs_never_panic(values in prop::collection::vec(quantity(), 40)) {
        let accession = AccessionRef::from("acc");
        let mut store = InMemoryResults::new();
        store.set_unit("LDL", "mmol/L");
        for (code, value) in all_input_codes().into_iter().zip(values) {
            store.record(&accession, code, value);
        }

        let evaluator = Evaluator::for_store(&store);
        let first = evaluator.compute_all(&accession);
        let second = evaluator.compute_all(&accession);
        prop_assert_eq!(first.len(), registry::codes().len());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn unknown_codes_are_undetermined(code in "[a-z0-9]{1,12}") {
        let store = InMemoryResults::new();
        let evaluator = Evaluator::for_store(&store);
        prop_assert_eq!(
            evaluator.compute(&code, &AccessionRef::from("acc")),
            DerivedResult::Undetermined
        );
    }
}
