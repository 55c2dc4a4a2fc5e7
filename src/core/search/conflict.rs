//! Conflict analysis (spec.md §4.8, "Conflicts"). A conflict is detected
//! when a piecewise constraint's phase tracker has ruled out every phase
//! (`next_feasible_case` returns `None`) or the bound manager reports an
//! infeasible tightening while at least one decision is on the trail.
//!
//! The teacher's `minisat::search::conflict::AnalyzeContext` walks
//! resolution chains back through clause reasons to find the unique
//! implication point at the conflict's own decision level (first-UIP), then
//! backjumps to the second-highest decision level among the learned
//! clause's other literals. This engine has no resolution chain to walk --
//! piecewise infeasibility isn't derived from clausal reasons -- so
//! analysis is narrowed to: blame every decision currently on the trail,
//! learn that combination as a clause, and always backjump exactly one
//! level (see DESIGN.md, "single-level backjump"). The most recent decision
//! is retried at its constraint's next feasible phase.

use crate::core::piecewise::Phase;
use crate::core::search::clause_db::{Clause, ClauseDb};
use crate::core::search::trail::Trail;
use crate::core::variable::ConstraintId;

pub struct Conflict {
    pub blamed: ConstraintId,
    pub blamed_phase: Phase,
}

/// `None` means the trail holds no decisions -- a conflict at the root
/// level, i.e. the problem is unsatisfiable outright.
pub fn analyze(trail: &Trail, clause_db: &mut ClauseDb) -> Option<Conflict> {
    let decisions = trail.decisions();
    let last = *decisions.last()?;

    let literals = decisions.iter().map(|e| (e.constraint, e.phase)).collect();
    clause_db.learn(Clause::new(literals));

    Some(Conflict { blamed: last.constraint, blamed_phase: last.phase })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::search::trail::Trail;

    fn cid(i: usize) -> ConstraintId {
        ConstraintId(i)
    }

    #[test]
    fn analyze_blames_most_recent_decision() {
        let mut trail = Trail::new();
        trail.push_level();
        trail.record_decision(cid(0), Phase(0));
        trail.push_level();
        trail.record_decision(cid(1), Phase(1));

        let mut db = ClauseDb::new();
        let conflict = analyze(&trail, &mut db).unwrap();
        assert_eq!(conflict.blamed, cid(1));
        assert_eq!(conflict.blamed_phase, Phase(1));
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn analyze_at_root_returns_none() {
        let trail = Trail::new();
        let mut db = ClauseDb::new();
        assert!(analyze(&trail, &mut db).is_none());
    }
}
