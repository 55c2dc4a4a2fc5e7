//! Learned clauses over phase literals (spec.md §4.8, "Learning"): each
//! clause records a combination of constraint/phase decisions that led to
//! a conflict, so the search driver can recognize and avoid repeating it.
//!
//! Generalizes the shape of the teacher's `minisat::search::clause_db`
//! (a flat store the solver appends to and occasionally reduces) from CNF
//! literals to `(ConstraintId, Phase)` pairs; there is no watched-literal
//! propagation here since nothing in this engine is itself clausal --
//! clauses only ever serve conflict-avoidance lookups, not unit
//! propagation.

use crate::core::piecewise::Phase;
use crate::core::variable::ConstraintId;

pub type Literal = (ConstraintId, Phase);

#[derive(Clone, Debug)]
pub struct Clause {
    pub literals: Vec<Literal>,
}

impl Clause {
    pub fn new(literals: Vec<Literal>) -> Self {
        Clause { literals }
    }

    fn subset_of(&self, decisions: &[Literal]) -> bool {
        self.literals.iter().all(|lit| decisions.contains(lit))
    }
}

#[derive(Default)]
pub struct ClauseDb {
    clauses: Vec<Clause>,
}

impl ClauseDb {
    pub fn new() -> Self {
        ClauseDb { clauses: Vec::new() }
    }

    pub fn learn(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Returns a learned clause already contradicted by `decisions` (every
    /// one of its literals is among the current decisions), if any --
    /// the search driver uses this to short-circuit an already-known-bad
    /// decision combination before paying for another simplex round.
    pub fn violated_by(&self, decisions: &[Literal]) -> Option<&Clause> {
        self.clauses.iter().find(|c| c.subset_of(decisions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(i: usize) -> ConstraintId {
        ConstraintId(i)
    }

    #[test]
    fn violated_by_matches_exact_decision_subset() {
        let mut db = ClauseDb::new();
        db.learn(Clause::new(vec![(cid(0), Phase(0)), (cid(1), Phase(1))]));
        let decisions = vec![(cid(0), Phase(0)), (cid(1), Phase(1)), (cid(2), Phase(0))];
        assert!(db.violated_by(&decisions).is_some());

        let other = vec![(cid(0), Phase(0))];
        assert!(db.violated_by(&other).is_none());
    }
}
