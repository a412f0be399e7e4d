//! Variable stores threaded through a run.
//!
//! - `CrispInputs`: the immutable input snapshot
//! - `FuzzySnapshot`: derived membership degrees (primary, then compound)
//!
//! Lookups of absent identifiers fail with a `Missing*` error instead of
//! defaulting to zero.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::domain::{CrispVar, FuzzyVar};
use crate::error::EngineError;
use crate::fuzzy::membership::clamp01;

/// Crisp inputs for a single run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CrispInputs {
    values: BTreeMap<CrispVar, f64>,
}

impl CrispInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot used by the bundled reference run.
    pub fn reference() -> Self {
        Self::from_pairs([
            (CrispVar::CapeRatio, 37.63),
            (CrispVar::FedFundsRate, 0.25),
            (CrispVar::TimeHorizon, 20.0),
            (CrispVar::Cashflow, 1.0),
            (CrispVar::Cpi, 4.8),
        ])
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (CrispVar, f64)>) -> Self {
        Self {
            values: pairs.into_iter().collect(),
        }
    }

    /// Set (or replace) a crisp value.
    pub fn set(&mut self, var: CrispVar, value: f64) {
        self.values.insert(var, value);
    }

    pub fn get(&self, var: CrispVar) -> Result<f64, EngineError> {
        self.values.get(&var).copied().ok_or(EngineError::MissingCrisp(var))
    }

    pub fn contains(&self, var: CrispVar) -> bool {
        self.values.contains_key(&var)
    }

    /// Overlay `other` on top of `self` (values in `other` win).
    pub fn merged(&self, other: &CrispInputs) -> CrispInputs {
        let mut out = self.clone();
        for (&var, &value) in &other.values {
            out.values.insert(var, value);
        }
        out
    }

    /// Reject non-finite readings before they reach a membership function.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (var, value) in &self.values {
            if !value.is_finite() {
                return Err(EngineError::InvalidInput(format!("{var} = {value} is not finite")));
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (CrispVar, f64)> + '_ {
        self.values.iter().map(|(&k, &v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Derived membership degrees, in derivation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuzzySnapshot {
    entries: Vec<(FuzzyVar, f64)>,
}

// Serialized as a map so exports read `{"high_growth": 0.0, ...}`.
impl Serialize for FuzzySnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(var, degree)| (var, degree)))
    }
}

impl FuzzySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `degree` for `var`, replacing any earlier value in place.
    pub fn derive(&mut self, var: FuzzyVar, degree: f64) {
        let degree = clamp01(degree);
        match self.entries.iter_mut().find(|(v, _)| *v == var) {
            Some(entry) => entry.1 = degree,
            None => self.entries.push((var, degree)),
        }
    }

    pub fn get(&self, var: FuzzyVar) -> Result<f64, EngineError> {
        self.entries
            .iter()
            .find(|(v, _)| *v == var)
            .map(|(_, d)| *d)
            .ok_or(EngineError::MissingFuzzy(var))
    }

    /// Fuzzy AND (minimum t-norm) of two derived variables.
    pub fn and(&self, left: FuzzyVar, right: FuzzyVar) -> Result<f64, EngineError> {
        Ok(self.get(left)?.min(self.get(right)?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (FuzzyVar, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
