//! The `PiecewiseKind` tagged union exercised through its own dispatch
//! surface -- construction, bound notification, phase fixing, and
//! push/pop -- across more than one concrete constraint, beyond what each
//! constraint's own colocated `#[cfg(test)]` module already covers in
//! isolation.

use prlimplex::core::piecewise::relu::ReluConstraint;
use prlimplex::core::piecewise::sign::{self, SignConstraint};
use prlimplex::core::piecewise::{Phase, PiecewiseConstraint, PiecewiseKind};
use prlimplex::core::variable::{ConstraintId, Variable};

fn var(i: usize) -> Variable {
    Variable::from_index(i)
}

#[test]
fn dispatch_reaches_the_right_concrete_constraint_for_every_variant() {
    let relu = PiecewiseKind::Relu(ReluConstraint::new(ConstraintId(0), var(0), var(1), var(2), 1e-9));
    let sign = PiecewiseKind::Sign(SignConstraint::new(ConstraintId(1), var(3), var(4), 1e-9));

    assert_eq!(relu.id(), ConstraintId(0));
    assert_eq!(sign.id(), ConstraintId(1));
    assert_eq!(relu.all_phases().len(), 2);
    assert_eq!(sign.all_phases().len(), 2);
    assert!(relu.participating_variables().contains(&var(2)));
    assert!(!sign.participating_variables().contains(&var(2)));
}

#[test]
fn notify_bound_through_the_tagged_union_fixes_the_phase_like_the_concrete_type_would() {
    let mut relu = PiecewiseKind::Relu(ReluConstraint::new(ConstraintId(0), var(0), var(1), var(2), 1e-9));
    assert_eq!(relu.phase_fixed(), None);

    relu.notify_lower_bound(var(0), 0.0);
    assert_eq!(relu.phase_fixed(), Some(Phase(0)));

    let mut neg = PiecewiseKind::Sign(SignConstraint::new(ConstraintId(1), var(3), var(4), 1e-9));
    neg.notify_upper_bound(var(3), -1.0);
    assert_eq!(neg.phase_fixed(), Some(sign::NEG));
}

#[test]
fn push_and_pop_through_the_tagged_union_restores_a_fixed_phase() {
    let mut relu = PiecewiseKind::Relu(ReluConstraint::new(ConstraintId(0), var(0), var(1), var(2), 1e-9));
    relu.push_context();
    relu.notify_lower_bound(var(0), 0.0);
    assert_eq!(relu.phase_fixed(), Some(Phase(0)));

    relu.pop_context();
    assert_eq!(relu.phase_fixed(), None);
}

#[test]
fn exhausting_every_phase_via_mark_infeasible_leaves_no_feasible_case() {
    let mut sign = PiecewiseKind::Sign(SignConstraint::new(ConstraintId(0), var(0), var(1), 1e-9));
    let phases = sign.all_phases().to_vec();
    assert_eq!(phases.len(), 2);

    sign.mark_infeasible(phases[0]);
    assert_eq!(sign.next_feasible_case(), Some(phases[1]));

    sign.mark_infeasible(phases[1]);
    assert_eq!(sign.next_feasible_case(), None);
}

#[test]
fn resolve_marks_the_constraint_inactive_and_is_independent_of_phase_fixing() {
    let mut relu = PiecewiseKind::Relu(ReluConstraint::new(ConstraintId(0), var(0), var(1), var(2), 1e-9));
    assert!(relu.active());
    relu.resolve();
    assert!(!relu.active());
    // Resolving doesn't fix a phase by itself -- those are independent bits
    // on `PhaseTracker`.
    assert_eq!(relu.phase_fixed(), None);
}

#[test]
fn satisfied_and_possible_fixes_agree_on_a_relu_assignment_through_the_union() {
    let relu = PiecewiseKind::Relu(ReluConstraint::new(ConstraintId(0), var(0), var(1), var(2), 1e-9));
    let assignment = |v: Variable| if v == var(0) { 4.0 } else if v == var(1) { 0.0 } else { 0.0 };
    assert!(!relu.satisfied(&assignment, 1e-9));

    let fixes = relu.possible_fixes(&assignment);
    assert_eq!(fixes.len(), 1);
    assert_eq!(fixes[0].variable, var(1));
    assert_eq!(fixes[0].value, 4.0);

    let fixed = |v: Variable| if v == var(1) { 4.0 } else { assignment(v) };
    assert!(relu.satisfied(&fixed, 1e-9));
}
