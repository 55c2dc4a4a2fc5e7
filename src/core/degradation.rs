//! The degradation checker & precision restorer (spec.md §4.9): after
//! every `K` simplex iterations, compares the residual `||Ax-b||inf`
//! against the last-known-good value; on excess drift, refactorizes, and
//! if that alone isn't enough, reloads a clean snapshot captured at
//! initialization.

use crate::core::tableau::{ConstraintMatrix, Tableau, TableauSnapshot};
use crate::error::EngineResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DegradationOutcome {
    Ok,
    Refactorized,
    Restored,
}

pub struct DegradationChecker {
    threshold: f64,
    check_every: u32,
    iterations_since_check: u32,
    last_good_residual: f64,
}

impl DegradationChecker {
    pub fn new(threshold: f64, check_every: u32) -> Self {
        DegradationChecker { threshold, check_every, iterations_since_check: 0, last_good_residual: 0.0 }
    }

    /// Called once per simplex iteration; returns `true` when a residual
    /// check is due.
    pub fn tick(&mut self) -> bool {
        self.iterations_since_check += 1;
        if self.iterations_since_check >= self.check_every {
            self.iterations_since_check = 0;
            true
        } else {
            false
        }
    }

    pub fn residual_is_degraded(&self, residual: f64) -> bool {
        residual > self.threshold
    }

    pub fn record_good_residual(&mut self, residual: f64) {
        self.last_good_residual = residual;
    }
}

/// Holds the clean state captured right after the engine is built, so it
/// can be reloaded verbatim if refactorization alone doesn't repair
/// accumulated numeric drift.
pub struct PrecisionRestorer {
    clean_snapshot: Option<TableauSnapshot>,
}

impl PrecisionRestorer {
    pub fn new() -> Self {
        PrecisionRestorer { clean_snapshot: None }
    }

    pub fn capture(&mut self, tableau: &Tableau) {
        self.clean_snapshot = Some(tableau.snapshot());
    }

    pub fn has_snapshot(&self) -> bool {
        self.clean_snapshot.is_some()
    }

    /// Reloads the captured clean state. The caller is responsible for
    /// replaying any splits that were validly applied since the snapshot
    /// was captured (spec.md §4.9 step 2) -- this restorer only owns the
    /// tableau-level state, not the trail.
    pub fn restore(&self, tableau: &mut Tableau, matrix: &ConstraintMatrix) -> EngineResult<()> {
        let snapshot = self
            .clean_snapshot
            .as_ref()
            .ok_or_else(|| crate::error::EngineError::MalformedBasis {
                reason: "precision restore requested with no captured snapshot".to_string(),
            })?;
        tableau.restore(snapshot, matrix)
    }
}

impl Default for PrecisionRestorer {
    fn default() -> Self {
        PrecisionRestorer::new()
    }
}

/// Runs the checker's decision procedure given a fresh residual reading:
/// refactorize first; if the residual is still too large afterward,
/// escalate to a full precision restore.
pub fn handle_degradation(
    checker: &mut DegradationChecker,
    restorer: &PrecisionRestorer,
    tableau: &mut Tableau,
    matrix: &ConstraintMatrix,
) -> EngineResult<DegradationOutcome> {
    tableau.refactorize(matrix)?;
    let residual = tableau.residual_infinity_norm(matrix);
    if !checker.residual_is_degraded(residual) {
        checker.record_good_residual(residual);
        return Ok(DegradationOutcome::Refactorized);
    }
    restorer.restore(tableau, matrix)?;
    let residual = tableau.residual_infinity_norm(matrix);
    checker.record_good_residual(residual);
    Ok(DegradationOutcome::Restored)
}
