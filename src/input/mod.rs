//! `InputProblem` (spec.md §6): the boundary struct an external parser or
//! front-end builds to hand a problem to the engine. This module owns only
//! the assembly step -- canonicalizing linear constraints to equalities over
//! fresh slack variables, and expanding each piecewise-linear constraint
//! spec into its auxiliary variables, linking equations, and concrete
//! `PiecewiseKind` -- not parsing any external file format (spec.md §1's
//! Non-goals keep file formats out of this crate entirely).

use crate::core::piecewise::abs::AbsConstraint;
use crate::core::piecewise::disjunction::DisjunctionConstraint;
use crate::core::piecewise::leaky_relu::LeakyReluConstraint;
use crate::core::piecewise::max::MaxConstraint;
use crate::core::piecewise::relu::ReluConstraint;
use crate::core::piecewise::sign::SignConstraint;
use crate::core::piecewise::{CaseSplit, Phase, PiecewiseKind};
use crate::core::tableau::ConstraintMatrix;
use crate::core::variable::{ConstraintId, Variable, VarVec};
use crate::error::BoundKind;

/// One linear row before canonicalization: `sum(coefficients) <op> scalar`.
#[derive(Clone, Debug)]
pub struct Equation {
    pub coefficients: Vec<(usize, f64)>,
    pub scalar: f64,
    pub kind: EquationKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EquationKind {
    Eq,
    Le,
    Ge,
}

/// A single bound tightening expressed over an input-level variable index,
/// used to describe a `Disjunction` phase wholesale (spec.md §3: Disjunction
/// phases carry no fixed shape, so the front-end supplies them directly).
#[derive(Clone, Copy, Debug)]
pub struct RawTightening {
    pub variable: usize,
    pub kind: BoundKind,
    pub value: f64,
}

/// One entry in the piecewise-linear constraint catalog (spec.md §3). Every
/// variable reference is an input-level index, resolved to a `Variable` (and,
/// for ReLU/LeakyReLU/Abs/Max, paired with freshly allocated auxiliary
/// variables) during `assemble`.
#[derive(Clone, Debug)]
pub enum PiecewiseSpec {
    Relu { b: usize, f: usize },
    LeakyRelu { b: usize, f: usize, slope: f64 },
    Abs { b: usize, f: usize },
    Sign { b: usize, f: usize },
    Max { f: usize, elements: Vec<usize> },
    /// Phases supplied wholesale; each inner `Vec` is one phase's batch of
    /// tightenings (see `disjunction.rs`, "Disjunction phases as
    /// tightenings only").
    Disjunction { splits: Vec<Vec<RawTightening>> },
}

/// The boundary struct itself: a flat description of a linear-arithmetic
/// problem plus its piecewise-linear constraints, indexed 0..num_variables.
#[derive(Clone, Debug)]
pub struct InputProblem {
    pub num_variables: usize,
    pub lower_bounds: Vec<f64>,
    pub upper_bounds: Vec<f64>,
    pub equations: Vec<Equation>,
    pub piecewise: Vec<PiecewiseSpec>,
}

impl InputProblem {
    pub fn new(num_variables: usize, lower_bounds: Vec<f64>, upper_bounds: Vec<f64>) -> Self {
        assert_eq!(lower_bounds.len(), num_variables);
        assert_eq!(upper_bounds.len(), num_variables);
        InputProblem { num_variables, lower_bounds, upper_bounds, equations: Vec::new(), piecewise: Vec::new() }
    }

    pub fn add_equation(&mut self, equation: Equation) {
        self.equations.push(equation);
    }

    pub fn add_piecewise(&mut self, spec: PiecewiseSpec) {
        self.piecewise.push(spec);
    }
}

/// Everything `core::Engine::new` needs to build the initial tableau and
/// constraint set from an `InputProblem`.
pub struct AssembledProblem {
    pub total_variables: usize,
    pub lower_bounds: VarVec<f64>,
    pub upper_bounds: VarVec<f64>,
    pub matrix: ConstraintMatrix,
    pub basic_vars: Vec<Variable>,
    pub piecewise: Vec<PiecewiseKind>,
}

/// Allocates fresh variables for slacks and piecewise auxiliaries, past the
/// input's own `0..num_variables` range.
struct Allocator {
    next: usize,
    lb: Vec<f64>,
    ub: Vec<f64>,
}

impl Allocator {
    fn new(start: usize) -> Self {
        Allocator { next: start, lb: Vec::new(), ub: Vec::new() }
    }

    fn alloc(&mut self, lb: f64, ub: f64) -> Variable {
        let v = Variable::from_index(self.next);
        self.next += 1;
        self.lb.push(lb);
        self.ub.push(ub);
        v
    }
}

pub fn assemble(problem: &InputProblem, tolerance: f64) -> AssembledProblem {
    let mut alloc = Allocator::new(problem.num_variables);
    let mut rows: Vec<(Vec<(Variable, f64)>, f64)> = Vec::new();
    let mut basic_vars: Vec<Variable> = Vec::new();

    for equation in &problem.equations {
        let mut coeffs: Vec<(Variable, f64)> =
            equation.coefficients.iter().map(|&(i, c)| (Variable::from_index(i), c)).collect();
        let (slack_lb, slack_ub) = match equation.kind {
            EquationKind::Eq => (0.0, 0.0),
            EquationKind::Le => (0.0, f64::INFINITY),
            EquationKind::Ge => (f64::NEG_INFINITY, 0.0),
        };
        let slack = alloc.alloc(slack_lb, slack_ub);
        coeffs.push((slack, 1.0));
        rows.push((coeffs, equation.scalar));
        basic_vars.push(slack);
    }

    let mut piecewise: Vec<PiecewiseKind> = Vec::with_capacity(problem.piecewise.len());
    for (idx, spec) in problem.piecewise.iter().enumerate() {
        let id = ConstraintId::from_index(idx);
        match spec {
            PiecewiseSpec::Relu { b, f } => {
                let (b, f) = (Variable::from_index(*b), Variable::from_index(*f));
                let aux = alloc.alloc(0.0, f64::INFINITY);
                // aux = f - b, rearranged for the matrix as aux - f + b = 0.
                rows.push((vec![(aux, 1.0), (f, -1.0), (b, 1.0)], 0.0));
                basic_vars.push(aux);
                piecewise.push(PiecewiseKind::Relu(ReluConstraint::new(id, b, f, aux, tolerance)));
            }

            PiecewiseSpec::LeakyRelu { b, f, slope } => {
                let (b, f) = (Variable::from_index(*b), Variable::from_index(*f));
                let aux_active = alloc.alloc(0.0, f64::INFINITY);
                let aux_inactive = alloc.alloc(0.0, f64::INFINITY);
                rows.push((vec![(aux_active, 1.0), (f, -1.0), (b, 1.0)], 0.0));
                basic_vars.push(aux_active);
                rows.push((vec![(aux_inactive, 1.0), (f, -1.0), (b, *slope)], 0.0));
                basic_vars.push(aux_inactive);
                piecewise.push(PiecewiseKind::LeakyRelu(LeakyReluConstraint::new(
                    id, b, f, aux_active, aux_inactive, *slope, tolerance,
                )));
            }

            PiecewiseSpec::Abs { b, f } => {
                let (b, f) = (Variable::from_index(*b), Variable::from_index(*f));
                let aux_pos = alloc.alloc(0.0, f64::INFINITY);
                let aux_neg = alloc.alloc(0.0, f64::INFINITY);
                rows.push((vec![(aux_pos, 1.0), (f, -1.0), (b, 1.0)], 0.0));
                basic_vars.push(aux_pos);
                rows.push((vec![(aux_neg, 1.0), (f, -1.0), (b, -1.0)], 0.0));
                basic_vars.push(aux_neg);
                piecewise.push(PiecewiseKind::Abs(AbsConstraint::new(id, b, f, aux_pos, aux_neg, tolerance)));
            }

            PiecewiseSpec::Sign { b, f } => {
                let (b, f) = (Variable::from_index(*b), Variable::from_index(*f));
                piecewise.push(PiecewiseKind::Sign(SignConstraint::new(id, b, f, tolerance)));
            }

            PiecewiseSpec::Max { f, elements } => {
                let f = Variable::from_index(*f);
                let elements: Vec<Variable> = elements.iter().map(|&e| Variable::from_index(e)).collect();
                let mut auxes = Vec::with_capacity(elements.len());
                for &e in &elements {
                    let aux = alloc.alloc(0.0, f64::INFINITY);
                    rows.push((vec![(aux, 1.0), (f, -1.0), (e, 1.0)], 0.0));
                    basic_vars.push(aux);
                    auxes.push(aux);
                }
                piecewise.push(PiecewiseKind::Max(MaxConstraint::new(id, f, elements, auxes, tolerance)));
            }

            PiecewiseSpec::Disjunction { splits } => {
                let case_splits: Vec<CaseSplit> = splits
                    .iter()
                    .enumerate()
                    .map(|(i, phase_tightenings)| CaseSplit {
                        phase: Phase(i as u8),
                        tightenings: phase_tightenings
                            .iter()
                            .map(|t| crate::core::bound_manager::Tightening {
                                variable: Variable::from_index(t.variable),
                                value: t.value,
                                kind: t.kind,
                            })
                            .collect(),
                    })
                    .collect();
                piecewise.push(PiecewiseKind::Disjunction(DisjunctionConstraint::from_splits(id, case_splits, tolerance)));
            }
        }
    }

    let total_variables = alloc.next;

    let mut lower = vec![0.0; total_variables];
    let mut upper = vec![0.0; total_variables];
    lower[..problem.num_variables].copy_from_slice(&problem.lower_bounds);
    upper[..problem.num_variables].copy_from_slice(&problem.upper_bounds);
    for (i, &lb) in alloc.lb.iter().enumerate() {
        lower[problem.num_variables + i] = lb;
    }
    for (i, &ub) in alloc.ub.iter().enumerate() {
        upper[problem.num_variables + i] = ub;
    }

    let num_rows = rows.len();
    let mut raw_columns: Vec<Vec<f64>> = vec![vec![0.0; num_rows]; total_variables];
    let mut rhs = vec![0.0; num_rows];
    for (row_idx, (coeffs, scalar)) in rows.iter().enumerate() {
        rhs[row_idx] = *scalar;
        for &(v, c) in coeffs {
            raw_columns[v.index()][row_idx] += c;
        }
    }

    let mut columns: VarVec<Vec<f64>> = VarVec::new();
    for (i, column) in raw_columns.into_iter().enumerate() {
        let v = Variable::from_index(i);
        columns.init(v);
        columns[v] = column;
    }

    let matrix = ConstraintMatrix { columns, rhs, num_rows };

    AssembledProblem {
        total_variables,
        lower_bounds: to_var_vec(lower),
        upper_bounds: to_var_vec(upper),
        matrix,
        basic_vars,
        piecewise,
    }
}

fn to_var_vec(values: Vec<f64>) -> VarVec<f64> {
    let mut out = VarVec::new();
    for (i, value) in values.into_iter().enumerate() {
        let v = Variable::from_index(i);
        out.init(v);
        out[v] = value;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_row_gets_a_fixed_slack() {
        let mut problem = InputProblem::new(2, vec![0.0, 0.0], vec![10.0, 10.0]);
        problem.add_equation(Equation { coefficients: vec![(0, 1.0), (1, 1.0)], scalar: 5.0, kind: EquationKind::Eq });

        let assembled = assemble(&problem, 1e-9);
        assert_eq!(assembled.matrix.num_rows, 1);
        assert_eq!(assembled.basic_vars.len(), 1);
        let slack = assembled.basic_vars[0];
        assert_eq!(assembled.lower_bounds[slack], 0.0);
        assert_eq!(assembled.upper_bounds[slack], 0.0);
    }

    #[test]
    fn inequality_rows_get_one_sided_slacks() {
        let mut problem = InputProblem::new(1, vec![0.0], vec![10.0]);
        problem.add_equation(Equation { coefficients: vec![(0, 1.0)], scalar: 5.0, kind: EquationKind::Le });
        problem.add_equation(Equation { coefficients: vec![(0, 1.0)], scalar: 1.0, kind: EquationKind::Ge });

        let assembled = assemble(&problem, 1e-9);
        let le_slack = assembled.basic_vars[0];
        let ge_slack = assembled.basic_vars[1];
        assert_eq!(assembled.lower_bounds[le_slack], 0.0);
        assert_eq!(assembled.upper_bounds[le_slack], f64::INFINITY);
        assert_eq!(assembled.lower_bounds[ge_slack], f64::NEG_INFINITY);
        assert_eq!(assembled.upper_bounds[ge_slack], 0.0);
    }

    #[test]
    fn relu_spec_allocates_one_aux_and_one_equation_row() {
        let mut problem = InputProblem::new(2, vec![-10.0, 0.0], vec![10.0, 10.0]);
        problem.add_piecewise(PiecewiseSpec::Relu { b: 0, f: 1 });

        let assembled = assemble(&problem, 1e-9);
        assert_eq!(assembled.matrix.num_rows, 1);
        assert_eq!(assembled.piecewise.len(), 1);
        let aux = assembled.basic_vars[0];
        assert_eq!(assembled.lower_bounds[aux], 0.0);
        assert_eq!(assembled.upper_bounds[aux], f64::INFINITY);
    }

    #[test]
    fn max_spec_allocates_one_aux_per_element() {
        let mut problem = InputProblem::new(4, vec![-10.0; 4], vec![10.0; 4]);
        problem.add_piecewise(PiecewiseSpec::Max { f: 0, elements: vec![1, 2, 3] });

        let assembled = assemble(&problem, 1e-9);
        assert_eq!(assembled.matrix.num_rows, 3);
        assert_eq!(assembled.total_variables, 7);
    }

    #[test]
    fn sign_spec_needs_no_aux_or_equation() {
        let mut problem = InputProblem::new(2, vec![-10.0, -1.0], vec![10.0, 1.0]);
        problem.add_piecewise(PiecewiseSpec::Sign { b: 0, f: 1 });

        let assembled = assemble(&problem, 1e-9);
        assert_eq!(assembled.matrix.num_rows, 0);
        assert_eq!(assembled.total_variables, 2);
    }
}
