//! Entering-variable selection strategies (spec.md §4.6), one file's worth
//! of logic per rule collapsed into a single module since each rule is a
//! handful of lines: Dantzig's rule (largest-coefficient), Bland's rule
//! (lowest-index, anti-cycling), and a steepest-edge approximation.

use crate::core::numeric;
use crate::core::variable::Variable;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryRule {
    Dantzig,
    Bland,
    SteepestEdge,
}

/// A non-basic candidate eligible to enter the basis: its reduced cost and,
/// for steepest-edge, the norm of its transformed column.
#[derive(Clone, Copy, Debug)]
pub struct Candidate {
    pub variable: Variable,
    pub reduced_cost: f64,
    pub column_norm: f64,
}

/// Picks the next entering variable among `candidates`, or `None` if every
/// reduced cost is within tolerance of optimal (the caller has already
/// filtered `candidates` down to those that can actually improve, i.e.
/// non-basics at their lower bound with negative reduced cost or at their
/// upper bound with positive reduced cost).
pub fn select(rule: EntryRule, candidates: &[Candidate], tolerance: f64) -> Option<Variable> {
    match rule {
        EntryRule::Dantzig => select_dantzig(candidates, tolerance),
        EntryRule::Bland => select_bland(candidates, tolerance),
        EntryRule::SteepestEdge => select_steepest_edge(candidates, tolerance),
    }
}

/// Largest reduced cost in absolute value, ties broken by lowest variable
/// index to keep selection deterministic.
fn select_dantzig(candidates: &[Candidate], tolerance: f64) -> Option<Variable> {
    let mut best: Option<&Candidate> = None;
    for c in candidates {
        if numeric::is_zero(c.reduced_cost, tolerance) {
            continue;
        }
        best = match best {
            None => Some(c),
            Some(b) => {
                let cur = c.reduced_cost.abs();
                let top = b.reduced_cost.abs();
                if numeric::gt(cur, top, tolerance)
                    || (numeric::are_equal(cur, top, tolerance) && c.variable.index() < b.variable.index())
                {
                    Some(c)
                } else {
                    Some(b)
                }
            }
        };
    }
    best.map(|c| c.variable)
}

/// Lowest-index candidate with a non-zero reduced cost. Used as a
/// cycling-safe fallback when Dantzig's rule stalls (spec.md §4.6).
fn select_bland(candidates: &[Candidate], tolerance: f64) -> Option<Variable> {
    candidates
        .iter()
        .filter(|c| !numeric::is_zero(c.reduced_cost, tolerance))
        .min_by_key(|c| c.variable.index())
        .map(|c| c.variable)
}

/// Reduced cost scaled by the inverse column norm, approximating the
/// steepest-edge ratio without maintaining exact reference weights.
fn select_steepest_edge(candidates: &[Candidate], tolerance: f64) -> Option<Variable> {
    let mut best: Option<(f64, &Candidate)> = None;
    for c in candidates {
        if numeric::is_zero(c.reduced_cost, tolerance) {
            continue;
        }
        let norm = if c.column_norm > tolerance { c.column_norm } else { 1.0 };
        let score = (c.reduced_cost * c.reduced_cost) / norm;
        best = match best {
            None => Some((score, c)),
            Some((top_score, top)) => {
                if numeric::gt(score, top_score, tolerance)
                    || (numeric::are_equal(score, top_score, tolerance)
                        && c.variable.index() < top.variable.index())
                {
                    Some((score, c))
                } else {
                    Some((top_score, top))
                }
            }
        };
    }
    best.map(|(_, c)| c.variable)
}

/// Which variable binds the ratio test: a basic variable at some `row`
/// hitting its own bound, or the entering variable itself hitting the
/// bound opposite the one it started from (a bound flip, spec.md §4.3 step
/// 4 -- bounded-variable simplex always has to consider this case).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeavingVariable {
    Basic(usize),
    Entering,
}

/// The minimum-ratio test deciding which variable leaves when `entering`
/// moves in direction `sign` (+1 increasing, -1 decreasing) along the
/// transformed column `direction`. Candidates are every basic variable's
/// distance to the bound it is moving toward, plus the entering variable's
/// own distance to its opposite bound (`entering_range`, `f64::INFINITY`
/// if that bound doesn't exist); `excluded_rows` skips basic rows a prior
/// attempt already found unusable (an unstable pivot element), so a caller
/// can retry with the next-tightest candidate. Returns the tightest-binding
/// candidate and the signed step length, or `None` if the problem is
/// unbounded in this direction (spec.md §4.3, "Unboundedness").
pub fn ratio_test(
    direction: &[f64],
    sign: f64,
    basic_values: &[f64],
    basic_lower: &[f64],
    basic_upper: &[f64],
    entering_range: f64,
    excluded_rows: &[usize],
    tolerance: f64,
) -> Option<(LeavingVariable, f64)> {
    let mut best: Option<(LeavingVariable, f64)> = None;
    for row in 0..direction.len() {
        if excluded_rows.contains(&row) {
            continue;
        }
        let coeff = direction[row] * sign;
        if numeric::is_zero(coeff, tolerance) {
            continue;
        }
        // x_b[row] moves by -coeff * step; find the step at which it hits
        // whichever bound it is moving toward.
        let limit = if coeff > 0.0 {
            (basic_values[row] - basic_lower[row]) / coeff
        } else {
            (basic_values[row] - basic_upper[row]) / coeff
        };
        let limit = limit.max(0.0);
        best = match best {
            None => Some((LeavingVariable::Basic(row), limit)),
            Some((_, top)) if numeric::lt(limit, top, tolerance) => Some((LeavingVariable::Basic(row), limit)),
            Some(b) => Some(b),
        };
    }
    if entering_range.is_finite() {
        best = match best {
            None => Some((LeavingVariable::Entering, entering_range)),
            Some((_, top)) if numeric::lt(entering_range, top, tolerance) => Some((LeavingVariable::Entering, entering_range)),
            Some(b) => Some(b),
        };
    }
    best
}
