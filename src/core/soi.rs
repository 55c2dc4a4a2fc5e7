//! The sum-of-infeasibilities local-search manager (spec.md §4.7): between
//! simplex rounds, when the LP is feasible but piecewise constraints are
//! violated, try to flip one violated constraint's chosen phase rather
//! than splitting.
//!
//! The original engine builds a genuine linear cost function from each
//! constraint's `costComponent` and re-minimizes it with simplex. This
//! engine's `PiecewiseConstraint::cost_component` is a numeric evaluator,
//! not a symbolic linear-coefficient vector (see DESIGN.md, "SoI as direct
//! numeric local search"), so the re-minimization step is replaced with a
//! direct accept/reject comparison of the aggregate cost before and after
//! a proposed phase flip, evaluated at the current assignment. This keeps
//! the same accept-on-improvement / surrender-after-`deepSoIRejectionThreshold`
//! shape spec.md describes, without threading a second objective through
//! the simplex tableau.

use std::collections::HashMap;

use crate::core::piecewise::{Phase, PiecewiseKind};
use crate::core::variable::{ConstraintId, ConstraintMap, Variable};
use crate::util::Random;

pub enum SoiOutcome {
    /// The flip was accepted; search may continue.
    Progress,
    /// Every active constraint is satisfied in its current chosen phase.
    AllSatisfied,
    /// `deepSoIRejectionThreshold` consecutive rejections; surrender to
    /// the search driver so it forces a real case split.
    Surrender,
    /// No violated constraint to repair and not all are satisfied --
    /// shouldn't happen, but surfaced rather than panicking.
    Stuck,
}

pub struct SoiManager {
    rejection_threshold: u32,
    rejections_in_a_row: u32,
    rand: Random,
    current_phase: HashMap<ConstraintId, Phase>,
    pseudo_impact: HashMap<ConstraintId, f64>,
}

impl SoiManager {
    pub fn new(rejection_threshold: u32, seed: f64) -> Self {
        SoiManager {
            rejection_threshold,
            rejections_in_a_row: 0,
            rand: Random::new(seed),
            current_phase: HashMap::new(),
            pseudo_impact: HashMap::new(),
        }
    }

    pub fn pseudo_impact(&self, id: ConstraintId) -> f64 {
        self.pseudo_impact.get(&id).copied().unwrap_or(0.0)
    }

    fn phase_of(&self, constraint: &PiecewiseKind) -> Phase {
        self.current_phase
            .get(&constraint.id())
            .copied()
            .or_else(|| constraint.phase_fixed())
            .unwrap_or(constraint.all_phases()[0])
    }

    fn cost_of(&self, constraint: &PiecewiseKind, assignment: &dyn Fn(Variable) -> f64) -> f64 {
        constraint.cost_component(self.phase_of(constraint), assignment)
    }

    pub fn total_cost(&self, constraints: &ConstraintMap<PiecewiseKind>, ids: &[ConstraintId], assignment: &dyn Fn(Variable) -> f64) -> f64 {
        ids.iter().filter_map(|id| constraints.get(id)).map(|c| self.cost_of(c, assignment)).sum()
    }

    /// One local-search step: pick a violated constraint, propose a phase
    /// flip, accept it if the aggregate cost drops, otherwise reject and
    /// count toward the surrender threshold.
    pub fn step(
        &mut self,
        constraints: &mut ConstraintMap<PiecewiseKind>,
        active_ids: &[ConstraintId],
        assignment: &dyn Fn(Variable) -> f64,
        tolerance: f64,
    ) -> SoiOutcome {
        let violated: Vec<ConstraintId> = active_ids
            .iter()
            .copied()
            .filter(|id| {
                constraints.get(id).map_or(false, |c| !c.satisfied(assignment, tolerance))
            })
            .collect();

        if violated.is_empty() {
            return SoiOutcome::AllSatisfied;
        }

        let pick = violated[self.rand.irand(violated.len())];
        let constraint = match constraints.get(&pick) {
            Some(c) => c,
            None => return SoiOutcome::Stuck,
        };

        let current = self.phase_of(constraint);
        let candidate = constraint
            .all_phases()
            .iter()
            .copied()
            .filter(|&p| p != current && !constraint.infeasible_cases().contains(&p))
            .min_by(|&a, &b| {
                let ca = constraint.cost_component(a, assignment);
                let cb = constraint.cost_component(b, assignment);
                ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
            });

        let candidate = match candidate {
            Some(p) => p,
            None => return SoiOutcome::Stuck,
        };

        let cost_before = constraint.cost_component(current, assignment);
        let cost_after = constraint.cost_component(candidate, assignment);

        if cost_after < cost_before {
            self.pseudo_impact.insert(pick, cost_before - cost_after);
            self.current_phase.insert(pick, candidate);
            self.rejections_in_a_row = 0;
            SoiOutcome::Progress
        } else {
            self.rejections_in_a_row += 1;
            if self.rejections_in_a_row >= self.rejection_threshold {
                SoiOutcome::Surrender
            } else {
                SoiOutcome::Progress
            }
        }
    }

    pub fn reset(&mut self) {
        self.rejections_in_a_row = 0;
        self.current_phase.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piecewise::relu::ReluConstraint;

    fn var(i: usize) -> Variable {
        Variable::from_index(i)
    }

    #[test]
    fn all_satisfied_when_no_constraint_is_violated() {
        let mut constraints = ConstraintMap::new();
        let relu = ReluConstraint::new(ConstraintId(0), var(0), var(1), var(2), 1e-9);
        constraints.insert(&ConstraintId(0), PiecewiseKind::Relu(relu));
        let mut mgr = SoiManager::new(20, 42.0);
        let assignment = |v: Variable| if v == var(0) { 2.0 } else if v == var(1) { 2.0 } else { 0.0 };
        match mgr.step(&mut constraints, &[ConstraintId(0)], &assignment, 1e-9) {
            SoiOutcome::AllSatisfied => {}
            _ => panic!("expected AllSatisfied"),
        }
    }
}
