//! The CDCL-style search driver (spec.md §4.8): decide a phase for one
//! violated piecewise constraint, let the engine propagate it through the
//! tableau and the other constraints, and on conflict, learn a clause and
//! backjump.
//!
//! `SearchDriver` owns only the search-level state -- the trail, the
//! learned-clause database, the branching heuristic, the restart schedule,
//! and the resource budget. It does not own the bound manager, tableau, or
//! constraint set (`core::Engine` does, per the ownership note in
//! `bound_manager.rs`), so every method that needs to observe LP state
//! takes it as a parameter rather than storing a reference to it.

pub mod budget;
pub mod clause_db;
pub mod conflict;
pub mod decision_heuristic;
pub mod luby;
pub mod trail;

use crate::core::piecewise::Phase;
use crate::core::search::budget::Budget;
use crate::core::search::clause_db::ClauseDb;
use crate::core::search::decision_heuristic::{BranchCandidate, DecisionHeuristic, DecisionHeuristicSettings};
use crate::core::search::luby::RestartSchedule;
use crate::core::search::trail::Trail;
use crate::core::variable::ConstraintId;

pub struct SearchSettings {
    pub decision_heuristic: DecisionHeuristicSettings,
    pub restart_base: f64,
    pub timeout_seconds: u64,
}

/// What the engine should do after a conflict is analyzed.
pub struct ConflictResolution {
    pub blamed: ConstraintId,
    pub blamed_phase: Phase,
    pub restart_due: bool,
}

pub struct SearchDriver {
    trail: Trail,
    clause_db: ClauseDb,
    heuristic: DecisionHeuristic,
    restarts: RestartSchedule,
    budget: Budget,
    conflicts: u64,
    decisions: u64,
}

impl SearchDriver {
    pub fn new(settings: SearchSettings) -> Self {
        SearchDriver {
            trail: Trail::new(),
            clause_db: ClauseDb::new(),
            heuristic: DecisionHeuristic::new(settings.decision_heuristic),
            restarts: RestartSchedule::new(settings.restart_base),
            budget: Budget::with_timeout_seconds(settings.timeout_seconds),
            conflicts: 0,
            decisions: 0,
        }
    }

    pub fn register_constraint(&mut self, id: ConstraintId) {
        self.heuristic.register(id);
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn clause_db(&self) -> &ClauseDb {
        &self.clause_db
    }

    pub fn conflict_count(&self) -> u64 {
        self.conflicts
    }

    pub fn decision_count(&self) -> u64 {
        self.decisions
    }

    /// Picks which constraint to split on from the candidate set; does not
    /// itself choose the phase (that is the chosen constraint's
    /// `next_feasible_case`, which only the caller -- holding the
    /// constraint set -- can compute).
    pub fn decide<'a>(&mut self, candidates: &'a [BranchCandidate]) -> Option<&'a BranchCandidate> {
        self.heuristic.pick(candidates)
    }

    /// Opens a new decision level and records the branching choice. Callers
    /// must push the bound manager and every piecewise constraint's own
    /// context in the same call, so all three stay in lockstep.
    pub fn record_decision(&mut self, constraint: ConstraintId, phase: Phase) {
        self.trail.push_level();
        self.trail.record_decision(constraint, phase);
        self.decisions += 1;
    }

    pub fn record_implication(&mut self, constraint: ConstraintId, phase: Phase) {
        self.trail.record_implication(constraint, phase);
    }

    /// A learned clause already rules out every decision on the trail.
    pub fn already_refuted(&self) -> bool {
        let decisions: Vec<_> = self.trail.decisions().iter().map(|e| (e.constraint, e.phase)).collect();
        self.clause_db.violated_by(&decisions).is_some()
    }

    /// Analyzes the current conflict, learns a clause, bumps the blamed
    /// constraint's activity, and backjumps exactly one level. Returns
    /// `None` if the conflict is at the root level (no decisions to
    /// blame), meaning the problem is unsatisfiable.
    pub fn on_conflict(&mut self) -> Option<ConflictResolution> {
        self.conflicts += 1;
        let conflict = conflict::analyze(&self.trail, &mut self.clause_db)?;
        self.heuristic.bump_activity(conflict.blamed);
        self.heuristic.decay_activity();
        self.trail.pop_level();
        let restart_due = self.restarts.on_conflict();
        Some(ConflictResolution { blamed: conflict.blamed, blamed_phase: conflict.blamed_phase, restart_due })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(i: usize) -> ConstraintId {
        ConstraintId(i)
    }

    #[test]
    fn conflict_backjumps_exactly_one_level() {
        let mut driver = SearchDriver::new(SearchSettings {
            decision_heuristic: DecisionHeuristicSettings::default(),
            restart_base: 100.0,
            timeout_seconds: 0,
        });
        driver.register_constraint(cid(0));
        driver.register_constraint(cid(1));
        driver.record_decision(cid(0), Phase(0));
        driver.record_decision(cid(1), Phase(1));

        let resolution = driver.on_conflict().unwrap();
        assert_eq!(resolution.blamed, cid(1));
        assert_eq!(driver.trail().decisions().len(), 1);
    }

    #[test]
    fn conflict_with_no_decisions_signals_unsat() {
        let mut driver = SearchDriver::new(SearchSettings {
            decision_heuristic: DecisionHeuristicSettings::default(),
            restart_base: 100.0,
            timeout_seconds: 0,
        });
        assert!(driver.on_conflict().is_none());
    }
}
