//! The piecewise-linear constraint interface (spec.md §4.5) and the
//! concrete catalog: ReLU, LeakyReLU, Abs, Sign, Max, Disjunction.
//!
//! Per the REDESIGN FLAG in spec.md §9, the original's virtual-dispatch
//! hierarchy over a `PiecewiseLinearConstraint` base class is replaced with
//! a tagged union (`PiecewiseKind`) wrapping one struct per variant, each
//! implementing the `PiecewiseConstraint` trait below. Dispatch is a single
//! match in `PiecewiseKind`'s own trait impl, so callers never match on the
//! tag themselves.

pub mod abs;
pub mod disjunction;
pub mod leaky_relu;
pub mod max;
pub mod relu;
pub mod sign;

use crate::core::bound_manager::Tightening;
use crate::core::context::{Cdo, CdList};
use crate::core::variable::{ConstraintId, Variable};

/// A tag identifying one of the finitely many linear regions of a
/// piecewise constraint. Opaque outside the owning constraint; callers
/// compare it for equality and otherwise treat it as an index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Phase(pub u8);

/// A variable-value change that would make a constraint satisfied, for
/// local repair (SoI).
#[derive(Clone, Copy, Debug)]
pub struct Fix {
    pub variable: Variable,
    pub value: f64,
}

/// A phase expressed as a concrete batch of bound tightenings on the
/// constraint's own participating and auxiliary variables. All six
/// concrete constraints in this catalog reduce every phase to bound
/// tightenings alone (see DESIGN.md, "Disjunction phases as tightenings
/// only" for why the general "bounds + equations" case split described in
/// spec.md §3 is narrowed to bounds here).
#[derive(Clone, Debug, Default)]
pub struct CaseSplit {
    pub phase: Phase,
    pub tightenings: Vec<Tightening>,
}

/// Shared bookkeeping for the three context-dependent fields every
/// concrete constraint carries: `active`, `phaseStatus`, and
/// `infeasibleCases` (spec.md §3). Each concrete constraint embeds one of
/// these and delegates the trait's context-dependent methods to it.
pub struct PhaseTracker {
    active: Cdo<bool>,
    fixed: Cdo<Option<Phase>>,
    infeasible: CdList<Phase>,
}

impl PhaseTracker {
    pub fn new() -> Self {
        PhaseTracker { active: Cdo::new(true), fixed: Cdo::new(None), infeasible: CdList::new() }
    }

    pub fn active(&self) -> bool {
        self.active.get()
    }

    pub fn resolve(&mut self) {
        self.active.set(false);
    }

    pub fn phase_fixed(&self) -> Option<Phase> {
        self.fixed.get()
    }

    pub fn fix(&mut self, phase: Phase) {
        if self.fixed.get().is_none() {
            self.fixed.set(Some(phase));
        }
    }

    pub fn infeasible_cases(&self) -> &[Phase] {
        self.infeasible.as_slice()
    }

    pub fn mark_infeasible(&mut self, phase: Phase) {
        if !self.infeasible.as_slice().contains(&phase) {
            self.infeasible.append(phase);
        }
    }

    /// The first phase in `all_phases` not yet ruled out, or `None` if
    /// every phase has been exhausted (the constraint is unsatisfiable in
    /// the current context -- a conflict).
    pub fn next_feasible_case(&self, all_phases: &[Phase]) -> Option<Phase> {
        if let Some(p) = self.fixed.get() {
            return Some(p);
        }
        all_phases.iter().copied().find(|p| !self.infeasible.as_slice().contains(p))
    }

    pub fn push(&mut self) {
        self.active.push();
        self.fixed.push();
        self.infeasible.push();
    }

    pub fn pop(&mut self) {
        self.active.pop();
        self.fixed.pop();
        self.infeasible.pop();
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        PhaseTracker::new()
    }
}

/// The per-constraint interface from spec.md §4.5's table. `register` is
/// handled by the engine at construction time (participating variables are
/// immutable, per spec.md §3's "Lifecycle"), so it is not part of this
/// trait; everything else is.
pub trait PiecewiseConstraint {
    fn id(&self) -> ConstraintId;

    fn participating_variables(&self) -> &[Variable];

    /// Every phase this constraint can be in, in a stable order.
    fn all_phases(&self) -> &[Phase];

    fn notify_lower_bound(&mut self, variable: Variable, value: f64);

    fn notify_upper_bound(&mut self, variable: Variable, value: f64);

    fn satisfied<F: Fn(Variable) -> f64>(&self, assignment: F, tolerance: f64) -> bool
    where
        Self: Sized;

    fn phase_fixed(&self) -> Option<Phase>;

    fn possible_fixes<F: Fn(Variable) -> f64>(&self, assignment: F) -> Vec<Fix>
    where
        Self: Sized;

    fn case_splits(&self) -> Vec<CaseSplit>;

    fn implied_case_split(&self) -> Option<CaseSplit>;

    /// Bound implications derivable purely from the current bounds cache,
    /// independent of whether a phase has been fixed yet.
    fn entailed_tightenings(&self) -> Vec<Tightening>;

    fn cost_component<F: Fn(Variable) -> f64>(&self, phase: Phase, assignment: F) -> f64
    where
        Self: Sized;

    fn mark_infeasible(&mut self, phase: Phase);

    fn infeasible_cases(&self) -> &[Phase];

    fn next_feasible_case(&self) -> Option<Phase>;

    fn active(&self) -> bool;

    fn resolve(&mut self);

    fn push_context(&mut self);

    fn pop_context(&mut self);
}

/// The tagged union replacing virtual dispatch (spec.md §9). Every variant
/// wraps one concrete constraint; `PiecewiseConstraint`'s object-unsafe
/// generic methods (`satisfied`, `possible_fixes`, `cost_component` take a
/// closure) are re-exposed here as trait-object-friendly methods taking a
/// `&dyn Fn`, since a single `Vec<PiecewiseKind>` needs a uniform call
/// surface regardless of which concrete constraint it holds.
pub enum PiecewiseKind {
    Relu(relu::ReluConstraint),
    LeakyRelu(leaky_relu::LeakyReluConstraint),
    Abs(abs::AbsConstraint),
    Sign(sign::SignConstraint),
    Max(max::MaxConstraint),
    Disjunction(disjunction::DisjunctionConstraint),
}

macro_rules! dispatch {
    ($self:ident, $m:ident $(, $arg:expr)*) => {
        match $self {
            PiecewiseKind::Relu(c) => c.$m($($arg),*),
            PiecewiseKind::LeakyRelu(c) => c.$m($($arg),*),
            PiecewiseKind::Abs(c) => c.$m($($arg),*),
            PiecewiseKind::Sign(c) => c.$m($($arg),*),
            PiecewiseKind::Max(c) => c.$m($($arg),*),
            PiecewiseKind::Disjunction(c) => c.$m($($arg),*),
        }
    };
}

impl PiecewiseKind {
    pub fn id(&self) -> ConstraintId {
        dispatch!(self, id)
    }

    pub fn participating_variables(&self) -> &[Variable] {
        dispatch!(self, participating_variables)
    }

    pub fn all_phases(&self) -> &[Phase] {
        dispatch!(self, all_phases)
    }

    pub fn notify_lower_bound(&mut self, variable: Variable, value: f64) {
        dispatch!(self, notify_lower_bound, variable, value)
    }

    pub fn notify_upper_bound(&mut self, variable: Variable, value: f64) {
        dispatch!(self, notify_upper_bound, variable, value)
    }

    pub fn satisfied(&self, assignment: &dyn Fn(Variable) -> f64, tolerance: f64) -> bool {
        match self {
            PiecewiseKind::Relu(c) => c.satisfied(assignment, tolerance),
            PiecewiseKind::LeakyRelu(c) => c.satisfied(assignment, tolerance),
            PiecewiseKind::Abs(c) => c.satisfied(assignment, tolerance),
            PiecewiseKind::Sign(c) => c.satisfied(assignment, tolerance),
            PiecewiseKind::Max(c) => c.satisfied(assignment, tolerance),
            PiecewiseKind::Disjunction(c) => c.satisfied(assignment, tolerance),
        }
    }

    pub fn phase_fixed(&self) -> Option<Phase> {
        dispatch!(self, phase_fixed)
    }

    pub fn possible_fixes(&self, assignment: &dyn Fn(Variable) -> f64) -> Vec<Fix> {
        match self {
            PiecewiseKind::Relu(c) => c.possible_fixes(assignment),
            PiecewiseKind::LeakyRelu(c) => c.possible_fixes(assignment),
            PiecewiseKind::Abs(c) => c.possible_fixes(assignment),
            PiecewiseKind::Sign(c) => c.possible_fixes(assignment),
            PiecewiseKind::Max(c) => c.possible_fixes(assignment),
            PiecewiseKind::Disjunction(c) => c.possible_fixes(assignment),
        }
    }

    pub fn case_splits(&self) -> Vec<CaseSplit> {
        dispatch!(self, case_splits)
    }

    pub fn implied_case_split(&self) -> Option<CaseSplit> {
        dispatch!(self, implied_case_split)
    }

    pub fn entailed_tightenings(&self) -> Vec<Tightening> {
        dispatch!(self, entailed_tightenings)
    }

    pub fn cost_component(&self, phase: Phase, assignment: &dyn Fn(Variable) -> f64) -> f64 {
        match self {
            PiecewiseKind::Relu(c) => c.cost_component(phase, assignment),
            PiecewiseKind::LeakyRelu(c) => c.cost_component(phase, assignment),
            PiecewiseKind::Abs(c) => c.cost_component(phase, assignment),
            PiecewiseKind::Sign(c) => c.cost_component(phase, assignment),
            PiecewiseKind::Max(c) => c.cost_component(phase, assignment),
            PiecewiseKind::Disjunction(c) => c.cost_component(phase, assignment),
        }
    }

    pub fn mark_infeasible(&mut self, phase: Phase) {
        dispatch!(self, mark_infeasible, phase)
    }

    pub fn infeasible_cases(&self) -> &[Phase] {
        dispatch!(self, infeasible_cases)
    }

    pub fn next_feasible_case(&self) -> Option<Phase> {
        dispatch!(self, next_feasible_case)
    }

    pub fn active(&self) -> bool {
        dispatch!(self, active)
    }

    pub fn resolve(&mut self) {
        dispatch!(self, resolve)
    }

    pub fn push_context(&mut self) {
        dispatch!(self, push_context)
    }

    pub fn pop_context(&mut self) {
        dispatch!(self, pop_context)
    }
}
