//! Sparse vector/row representation shared by the basis factorization, the
//! tableau, and the row bound tightener.

use crate::core::numeric;
use crate::core::variable::Variable;

/// A sparse row: a scalar constant plus coefficients on a handful of
/// (typically non-basic) variables. `x_b = constant + sum(coeff * x_var)`.
#[derive(Clone, Debug, Default)]
pub struct SparseRow {
    pub constant: f64,
    entries: Vec<(Variable, f64)>,
}

impl SparseRow {
    pub fn new(constant: f64) -> Self {
        SparseRow { constant, entries: Vec::new() }
    }

    pub fn with_capacity(constant: f64, cap: usize) -> Self {
        SparseRow { constant, entries: Vec::with_capacity(cap) }
    }

    pub fn push(&mut self, var: Variable, coeff: f64, tolerance: f64) {
        if !numeric::is_zero(coeff, tolerance) {
            self.entries.push((var, coeff));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variable, f64)> + '_ {
        self.entries.iter().map(|&(v, c)| (v, c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn coefficient_of(&self, var: Variable) -> f64 {
        self.entries.iter().find(|&&(v, _)| v == var).map(|&(_, c)| c).unwrap_or(0.0)
    }

    /// Evaluates the row given a lookup for the value of each participating
    /// variable.
    pub fn evaluate<F: Fn(Variable) -> f64>(&self, value_of: F) -> f64 {
        let mut acc = self.constant;
        for &(v, c) in &self.entries {
            acc += c * value_of(v);
        }
        acc
    }
}
