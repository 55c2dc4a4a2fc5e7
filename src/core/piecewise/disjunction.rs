//! Disjunction({split1 .. splitk}): an arbitrary case split over k phases,
//! each phase a batch of bound tightenings (spec.md §3). The front-end
//! builds the phases directly (there is no fixed shape to derive them
//! from, unlike ReLU/Abs/Sign/Max); this constraint only tracks which
//! phases remain feasible given the current bounds cache and exposes them
//! through the same interface as every other piecewise constraint.
//!
//! spec.md describes Disjunction phases as "bounds + equations"; this
//! engine only ever needs the bounds half in practice (every concrete
//! catalog member reduces to tightenings via auxiliary variables set up at
//! construction), so the equation half is not represented here -- see
//! DESIGN.md, "Disjunction phases as tightenings only".

use crate::core::bound_manager::Tightening;
use crate::core::numeric;
use crate::core::piecewise::{CaseSplit, Fix, Phase, PhaseTracker, PiecewiseConstraint};
use crate::core::variable::{ConstraintId, Variable, VarMap};
use crate::error::BoundKind;

pub struct DisjunctionConstraint {
    id: ConstraintId,
    splits: Vec<CaseSplit>,
    all_phases: Vec<Phase>,
    participating: Vec<Variable>,
    lb: VarMap<f64>,
    ub: VarMap<f64>,
    tracker: PhaseTracker,
    tolerance: f64,
}

impl DisjunctionConstraint {
    pub fn new(id: ConstraintId, splits: Vec<Tightening>, phase_boundaries: Vec<usize>, tolerance: f64) -> Self {
        // `phase_boundaries[i]` is the number of tightenings belonging to
        // phase i, consumed in order from `splits`.
        let mut cursor = 0;
        let mut phases = Vec::with_capacity(phase_boundaries.len());
        for (i, &count) in phase_boundaries.iter().enumerate() {
            let phase = Phase(i as u8);
            let tightenings = splits[cursor..cursor + count].to_vec();
            cursor += count;
            phases.push(CaseSplit { phase, tightenings });
        }
        Self::from_splits(id, phases, tolerance)
    }

    pub fn from_splits(id: ConstraintId, splits: Vec<CaseSplit>, tolerance: f64) -> Self {
        let mut participating = Vec::new();
        for split in &splits {
            for t in &split.tightenings {
                if !participating.contains(&t.variable) {
                    participating.push(t.variable);
                }
            }
        }
        let all_phases: Vec<Phase> = splits.iter().map(|s| s.phase).collect();
        let mut lb = VarMap::new();
        let mut ub = VarMap::new();
        for &v in &participating {
            lb.insert(&v, f64::NEG_INFINITY);
            ub.insert(&v, f64::INFINITY);
        }
        DisjunctionConstraint {
            id,
            splits,
            all_phases,
            participating,
            lb,
            ub,
            tracker: PhaseTracker::new(),
            tolerance,
        }
    }

    fn split_by_phase(&self, phase: Phase) -> &CaseSplit {
        self.splits.iter().find(|s| s.phase == phase).expect("unknown disjunction phase")
    }

    fn recompute_feasibility(&mut self) {
        for &phase in self.all_phases.clone().iter() {
            if self.tracker.infeasible_cases().contains(&phase) {
                continue;
            }
            let split = self.split_by_phase(phase);
            let violated = split.tightenings.iter().any(|t| match t.kind {
                BoundKind::Lower => numeric::lt(*self.ub.get(&t.variable).unwrap_or(&f64::INFINITY), t.value, self.tolerance),
                BoundKind::Upper => numeric::gt(*self.lb.get(&t.variable).unwrap_or(&f64::NEG_INFINITY), t.value, self.tolerance),
            });
            if violated {
                self.tracker.mark_infeasible(phase);
            }
        }
        let survivors: Vec<Phase> =
            self.all_phases.iter().copied().filter(|p| !self.tracker.infeasible_cases().contains(p)).collect();
        if survivors.len() == 1 {
            self.tracker.fix(survivors[0]);
            self.tracker.resolve();
        }
    }
}

impl PiecewiseConstraint for DisjunctionConstraint {
    fn id(&self) -> ConstraintId {
        self.id
    }

    fn participating_variables(&self) -> &[Variable] {
        &self.participating
    }

    fn all_phases(&self) -> &[Phase] {
        &self.all_phases
    }

    fn notify_lower_bound(&mut self, variable: Variable, value: f64) {
        if self.lb.contains(&variable) {
            if value > *self.lb.get(&variable).unwrap() {
                self.lb.insert(&variable, value);
            }
            self.recompute_feasibility();
        }
    }

    fn notify_upper_bound(&mut self, variable: Variable, value: f64) {
        if self.ub.contains(&variable) {
            if value < *self.ub.get(&variable).unwrap() {
                self.ub.insert(&variable, value);
            }
            self.recompute_feasibility();
        }
    }

    fn satisfied<F: Fn(Variable) -> f64>(&self, assignment: F, tolerance: f64) -> bool {
        self.splits.iter().any(|split| {
            split.tightenings.iter().all(|t| {
                let x = assignment(t.variable);
                match t.kind {
                    BoundKind::Lower => numeric::geq(x, t.value, tolerance),
                    BoundKind::Upper => numeric::leq(x, t.value, tolerance),
                }
            })
        })
    }

    fn phase_fixed(&self) -> Option<Phase> {
        self.tracker.phase_fixed()
    }

    fn possible_fixes<F: Fn(Variable) -> f64>(&self, _assignment: F) -> Vec<Fix> {
        Vec::new()
    }

    fn case_splits(&self) -> Vec<CaseSplit> {
        self.splits.clone()
    }

    fn implied_case_split(&self) -> Option<CaseSplit> {
        self.phase_fixed().map(|p| self.split_by_phase(p).clone())
    }

    fn entailed_tightenings(&self) -> Vec<Tightening> {
        Vec::new()
    }

    fn cost_component<F: Fn(Variable) -> f64>(&self, phase: Phase, assignment: F) -> f64 {
        self.split_by_phase(phase)
            .tightenings
            .iter()
            .map(|t| {
                let x = assignment(t.variable);
                match t.kind {
                    BoundKind::Lower => (t.value - x).max(0.0),
                    BoundKind::Upper => (x - t.value).max(0.0),
                }
            })
            .sum()
    }

    fn mark_infeasible(&mut self, phase: Phase) {
        self.tracker.mark_infeasible(phase);
        self.recompute_feasibility();
    }

    fn infeasible_cases(&self) -> &[Phase] {
        self.tracker.infeasible_cases()
    }

    fn next_feasible_case(&self) -> Option<Phase> {
        self.tracker.next_feasible_case(&self.all_phases)
    }

    fn active(&self) -> bool {
        self.tracker.active()
    }

    fn resolve(&mut self) {
        self.tracker.resolve();
    }

    fn push_context(&mut self) {
        self.tracker.push();
    }

    fn pop_context(&mut self) {
        self.tracker.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(i: usize) -> Variable {
        Variable::from_index(i)
    }

    fn new_disjunction() -> DisjunctionConstraint {
        let splits = vec![
            CaseSplit {
                phase: Phase(0),
                tightenings: vec![Tightening { variable: var(0), value: 0.0, kind: BoundKind::Lower }],
            },
            CaseSplit {
                phase: Phase(1),
                tightenings: vec![Tightening { variable: var(0), value: 0.0, kind: BoundKind::Upper }],
            },
        ];
        DisjunctionConstraint::from_splits(ConstraintId(0), splits, 1e-9)
    }

    #[test]
    fn eliminates_phase_violated_by_bounds() {
        let mut d = new_disjunction();
        d.notify_lower_bound(var(0), 1.0);
        assert!(d.infeasible_cases().contains(&Phase(1)));
        assert_eq!(d.phase_fixed(), Some(Phase(0)));
    }

    #[test]
    fn satisfied_if_any_phase_holds() {
        let d = new_disjunction();
        let vals = |_: Variable| -5.0;
        assert!(d.satisfied(vals, 1e-9));
    }
}
