//! Set algebra over evaluated sub-cohorts

use crate::definition::SetOperator;
use pih_cohort_diagnostics::{ConfigError, ConfigResult};
use pih_cohort_types::PatientSet;
use std::borrow::Borrow;

/// Intersection of all sets; one set is returned unchanged
pub fn intersect_all<S: Borrow<PatientSet>>(sets: impl IntoIterator<Item = S>) -> ConfigResult<PatientSet> {
    let mut sets = sets.into_iter();
    let first = sets
        .next()
        .ok_or_else(|| ConfigError::empty_operands("intersectAll"))?;
    let mut acc = first.borrow().clone();
    for set in sets {
        if acc.is_empty() {
            break;
        }
        acc.retain(|p| set.borrow().contains(p));
    }
    Ok(acc)
}

/// Union of all sets; one set is returned unchanged
pub fn union_any<S: Borrow<PatientSet>>(sets: impl IntoIterator<Item = S>) -> ConfigResult<PatientSet> {
    let mut sets = sets.into_iter();
    let first = sets
        .next()
        .ok_or_else(|| ConfigError::empty_operands("unionAny"))?;
    let mut acc = first.borrow().clone();
    for set in sets {
        acc.extend(set.borrow().iter().copied());
    }
    Ok(acc)
}

/// Left-to-right fold of an operator chain
///
/// `[A, AND, B, AND NOT, C]` is `(A ∩ B) \ C`; the chain is never reassociated.
pub fn compose<S: Borrow<PatientSet>>(
    first: S,
    steps: impl IntoIterator<Item = (SetOperator, S)>,
) -> PatientSet {
    steps
        .into_iter()
        .fold(first.borrow().clone(), |acc, (op, set)| op.apply(acc, set.borrow()))
}
