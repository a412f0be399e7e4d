//! Crisp inputs -> primary fuzzy degrees.

use crate::error::EngineError;
use crate::fuzzy::{CrispInputs, FuzzySnapshot};
use crate::policy::PolicyTable;

/// Evaluate every membership of `policy` against `inputs`, in table order.
///
/// Fails with `MissingCrisp` on the first membership whose input is absent.
pub fn fuzzify(inputs: &CrispInputs, policy: &PolicyTable) -> Result<FuzzySnapshot, EngineError> {
    inputs.validate()?;

    let mut snapshot = FuzzySnapshot::new();
    for def in &policy.memberships {
        let value = inputs.get(def.input)?;
        let degree = def.shape.evaluate(value);
        tracing::trace!(var = %def.var, input = %def.input, value, degree, "membership");
        snapshot.derive(def.var, degree);
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CrispVar, FuzzyVar};

    fn degree(snap: &FuzzySnapshot, var: FuzzyVar) -> f64 {
        snap.get(var).unwrap()
    }

    #[test]
    fn reference_inputs_produce_expected_degrees() {
        let snap = fuzzify(&CrispInputs::reference(), &PolicyTable::reference()).unwrap();
        assert_eq!(snap.len(), 11);

        assert_eq!(degree(&snap, FuzzyVar::HighGrowth), 0.0);
        assert_eq!(degree(&snap, FuzzyVar::LowGrowth), 1.0);
        assert!((degree(&snap, FuzzyVar::LowRate) - 0.4375).abs() < 1e-12);
        assert_eq!(degree(&snap, FuzzyVar::HighRate), 0.0);
        assert_eq!(degree(&snap, FuzzyVar::ShortTerm), 0.0);
        assert_eq!(degree(&snap, FuzzyVar::LongTerm), 1.0);
        assert!((degree(&snap, FuzzyVar::Accumulation) - 0.05).abs() < 1e-12);
        assert_eq!(degree(&snap, FuzzyVar::Drawdown), 0.0);
        assert_eq!(degree(&snap, FuzzyVar::Deflation), 0.0);
        assert!((degree(&snap, FuzzyVar::LowInflation) - 0.55).abs() < 1e-12);
        assert_eq!(degree(&snap, FuzzyVar::HighInflation), 0.0);
    }

    #[test]
    fn missing_input_fails_with_lookup_error() {
        let inputs = CrispInputs::from_pairs(CrispInputs::reference().iter().filter(|(v, _)| *v != CrispVar::Cpi));
        let err = fuzzify(&inputs, &PolicyTable::reference()).unwrap_err();
        assert_eq!(err, EngineError::MissingCrisp(CrispVar::Cpi));
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let mut inputs = CrispInputs::reference();
        inputs.set(CrispVar::CapeRatio, f64::INFINITY);
        assert!(matches!(
            fuzzify(&inputs, &PolicyTable::reference()),
            Err(EngineError::InvalidInput(_))
        ));
    }
}
