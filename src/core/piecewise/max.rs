//! Max(f, {e1..ek}): k phases, one per surviving element -- "f = e_i and
//! f >= e_j for every j" (spec.md §3). Elements are eliminated from
//! consideration once their upper bound is dominated by another element's
//! lower bound (spec.md §3, "elements can be eliminated if their upper
//! bound is dominated"; grounded on `MaxConstraint.h`'s element-elimination
//! invariant).
//!
//! Each element `e_i` gets an auxiliary `aux_i = f - e_i`, permanently
//! bounded `aux_i >= 0` (so `f >= e_i` holds unconditionally); phase `i`
//! additionally tightens `aux_i <= 0`, forcing `f = e_i`.

use crate::core::bound_manager::Tightening;
use crate::core::numeric;
use crate::core::piecewise::{CaseSplit, Fix, Phase, PhaseTracker, PiecewiseConstraint};
use crate::core::variable::{ConstraintId, Variable};
use crate::error::BoundKind;

pub struct MaxConstraint {
    id: ConstraintId,
    f: Variable,
    elements: Vec<Variable>,
    auxes: Vec<Variable>,
    participating: Vec<Variable>,
    all_phases: Vec<Phase>,
    lb: Vec<f64>, // indexed [f, e0, e1, ...]
    ub: Vec<f64>,
    tracker: PhaseTracker,
    tolerance: f64,
}

impl MaxConstraint {
    pub fn new(id: ConstraintId, f: Variable, elements: Vec<Variable>, auxes: Vec<Variable>, tolerance: f64) -> Self {
        assert_eq!(elements.len(), auxes.len());
        let k = elements.len();
        let mut participating = vec![f];
        participating.extend(elements.iter().copied());
        participating.extend(auxes.iter().copied());
        MaxConstraint {
            id,
            f,
            elements,
            auxes,
            participating,
            all_phases: (0..k).map(|i| Phase(i as u8)).collect(),
            lb: vec![f64::NEG_INFINITY; k + 1],
            ub: vec![f64::INFINITY; k + 1],
            tracker: PhaseTracker::new(),
            tolerance,
        }
    }

    fn slot(&self, v: Variable) -> Option<usize> {
        if v == self.f {
            return Some(0);
        }
        self.elements.iter().position(|&e| e == v).map(|i| i + 1)
    }

    fn lb_elem(&self, i: usize) -> f64 {
        self.lb[i + 1]
    }

    fn ub_elem(&self, i: usize) -> f64 {
        self.ub[i + 1]
    }

    /// Marks any element whose upper bound is strictly dominated by
    /// another surviving element's lower bound as infeasible.
    fn eliminate_dominated(&mut self) {
        let k = self.elements.len();
        for i in 0..k {
            let phase = Phase(i as u8);
            if self.tracker.infeasible_cases().contains(&phase) {
                continue;
            }
            let best_other = (0..k)
                .filter(|&j| j != i && !self.tracker.infeasible_cases().contains(&Phase(j as u8)))
                .map(|j| self.lb_elem(j))
                .fold(f64::NEG_INFINITY, f64::max);
            if numeric::lt(self.ub_elem(i), best_other, self.tolerance) {
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

    fn split_for(&self, phase: Phase) -> CaseSplit {
        let i = phase.0 as usize;
        CaseSplit {
            phase,
            tightenings: vec![Tightening { variable: self.auxes[i], value: 0.0, kind: BoundKind::Upper }],
        }
    }
}

impl PiecewiseConstraint for MaxConstraint {
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
        if let Some(i) = self.slot(variable) {
            if value > self.lb[i] {
                self.lb[i] = value;
            }
        }
        self.eliminate_dominated();
    }

    fn notify_upper_bound(&mut self, variable: Variable, value: f64) {
        if let Some(i) = self.slot(variable) {
            if value < self.ub[i] {
                self.ub[i] = value;
            }
        }
        self.eliminate_dominated();
    }

    fn satisfied<F: Fn(Variable) -> f64>(&self, assignment: F, tolerance: f64) -> bool {
        let f = assignment(self.f);
        let values: Vec<f64> = self.elements.iter().map(|&e| assignment(e)).collect();
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        numeric::are_equal(f, max, tolerance) && values.iter().all(|&v| numeric::geq(f, v, tolerance))
    }

    fn phase_fixed(&self) -> Option<Phase> {
        self.tracker.phase_fixed()
    }

    fn possible_fixes<F: Fn(Variable) -> f64>(&self, assignment: F) -> Vec<Fix> {
        let max = self.elements.iter().map(|&e| assignment(e)).fold(f64::NEG_INFINITY, f64::max);
        vec![Fix { variable: self.f, value: max }]
    }

    fn case_splits(&self) -> Vec<CaseSplit> {
        self.all_phases.iter().map(|&p| self.split_for(p)).collect()
    }

    fn implied_case_split(&self) -> Option<CaseSplit> {
        self.phase_fixed().map(|p| self.split_for(p))
    }

    fn entailed_tightenings(&self) -> Vec<Tightening> {
        let mut out = Vec::new();
        let lb_f = self.elements.iter().enumerate().map(|(i, _)| self.lb_elem(i)).fold(f64::NEG_INFINITY, f64::max);
        if lb_f.is_finite() {
            out.push(Tightening { variable: self.f, value: lb_f, kind: BoundKind::Lower });
        }
        let k = self.elements.len();
        let ub_f = (0..k)
            .filter(|&i| !self.tracker.infeasible_cases().contains(&Phase(i as u8)))
            .map(|i| self.ub_elem(i))
            .fold(f64::NEG_INFINITY, f64::max);
        if ub_f.is_finite() {
            out.push(Tightening { variable: self.f, value: ub_f, kind: BoundKind::Upper });
        }
        if let Some(phase) = self.phase_fixed() {
            let i = phase.0 as usize;
            out.push(Tightening { variable: self.auxes[i], value: 0.0, kind: BoundKind::Upper });
        }
        out
    }

    fn cost_component<F: Fn(Variable) -> f64>(&self, phase: Phase, assignment: F) -> f64 {
        let i = phase.0 as usize;
        let f = assignment(self.f);
        let ei = assignment(self.elements[i]);
        let mut cost = (f - ei).abs();
        for &e in &self.elements {
            cost += (assignment(e) - f).max(0.0);
        }
        cost
    }

    fn mark_infeasible(&mut self, phase: Phase) {
        self.tracker.mark_infeasible(phase);
        self.eliminate_dominated();
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

    fn new_max() -> MaxConstraint {
        MaxConstraint::new(
            ConstraintId(0),
            var(0),
            vec![var(1), var(2), var(3)],
            vec![var(4), var(5), var(6)],
            1e-9,
        )
    }

    #[test]
    fn dominated_element_is_eliminated() {
        let mut m = new_max();
        m.notify_lower_bound(var(1), 10.0);
        m.notify_upper_bound(var(2), 1.0);
        assert!(m.infeasible_cases().contains(&Phase(1)));
    }

    #[test]
    fn fixes_when_only_one_survivor_remains() {
        let mut m = new_max();
        m.notify_lower_bound(var(1), 10.0);
        m.notify_upper_bound(var(2), 1.0);
        m.notify_upper_bound(var(3), 1.0);
        assert_eq!(m.phase_fixed(), Some(Phase(0)));
    }

    #[test]
    fn satisfied_checks_true_max() {
        let m = new_max();
        let vals = |v: Variable| match v.index() {
            0 => 5.0,
            1 => 5.0,
            2 => 3.0,
            3 => -1.0,
            _ => 0.0,
        };
        assert!(m.satisfied(vals, 1e-9));
    }
}
