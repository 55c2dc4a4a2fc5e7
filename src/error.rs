//! The error taxonomy from spec.md §7.
//!
//! `Infeasibility` is an expected, recoverable-at-the-driver outcome and is
//! returned as `Err` from the call chains that can raise it, per the
//! REDESIGN FLAG replacing the original's thrown C++ exception with an
//! explicit result type. `Timeout`/`Quit` are not part of this taxonomy --
//! they surface as `Status::Timeout`/`Status::QuitRequested` directly from
//! the search loop rather than as an `Err`, since they carry no recovery
//! step the way the others do. `InvariantViolation` is the only variant
//! that signals a bug rather than an expected condition.

use derive_more::{Display, Error};

use crate::core::variable::Variable;

/// Why a bound-tightening or pivot operation could not proceed.
#[derive(Display, Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A tightening would have made `lb(v) > ub(v)` beyond tolerance.
    #[display("infeasible: tightening {variable:?} {bound:?} to {value} crosses the opposite bound")]
    Infeasibility { variable: Variable, bound: BoundKind, value: f64 },

    /// Accumulated numeric drift exceeded `degradationThreshold` and could
    /// not be repaired by refactorization alone.
    #[display("degradation: residual {residual} exceeds threshold {threshold} after refactorization")]
    Degradation { residual: f64, threshold: f64 },

    /// The basis factorization could not be rebuilt from the current
    /// partition (e.g. a singular basis).
    #[display("malformed basis: {reason}")]
    MalformedBasis { reason: String },

    /// An internal invariant was violated -- a bug, not an expected
    /// outcome. Corresponds to spec.md's `InvariantViolation` (fatal).
    #[display("invariant violated: {description}")]
    InvariantViolation { description: String },
}

#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    Lower,
    Upper,
}

pub type EngineResult<T> = Result<T, EngineError>;
