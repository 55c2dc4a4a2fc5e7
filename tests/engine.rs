//! End-to-end scenarios over `prlimplex::solve`: pure LP feasibility and
//! infeasibility, ReLU/Max networks, and a restart smoke test. Each problem
//! is built directly against the `InputProblem` boundary, the way an
//! external front-end would.

use prlimplex::config::EngineSettings;
use prlimplex::core::variable::Variable;
use prlimplex::core::Status;
use prlimplex::input::{Equation, EquationKind, InputProblem, PiecewiseSpec};

fn eq(coefficients: &[(usize, f64)], scalar: f64) -> Equation {
    Equation { coefficients: coefficients.to_vec(), scalar, kind: EquationKind::Eq }
}

fn assignment_of(solution: &prlimplex::Solution, i: usize) -> f64 {
    solution.assignment.as_ref().unwrap().get(&Variable::from_index(i)).copied().unwrap()
}

#[test]
fn lp_feasible_pure() {
    // x0 in [0,2], x1 in [-3,3], x2 in [4,6], x3 >= 0; x0 + 2*x1 - x2 + x3 = 11.
    let mut problem = InputProblem::new(
        4,
        vec![0.0, -3.0, 4.0, 0.0],
        vec![2.0, 3.0, 6.0, f64::INFINITY],
    );
    problem.add_equation(eq(&[(0, 1.0), (1, 2.0), (2, -1.0), (3, 1.0)], 11.0));

    let solution = prlimplex::solve(&problem, EngineSettings::default());
    assert_eq!(solution.status, Status::Sat);

    let (x0, x1, x2, x3) = (assignment_of(&solution, 0), assignment_of(&solution, 1), assignment_of(&solution, 2), assignment_of(&solution, 3));
    assert!((x0 + 2.0 * x1 - x2 + x3 - 11.0).abs() < 1e-6);
    assert!(x0 >= -1e-9 && x0 <= 2.0 + 1e-9);
    assert!(x1 >= -3.0 - 1e-9 && x1 <= 3.0 + 1e-9);
    assert!(x2 >= 4.0 - 1e-9 && x2 <= 6.0 + 1e-9);
    assert!(x3 >= -1e-9);
}

#[test]
fn lp_infeasible_pure() {
    // x0,x1 in [0,1], x2 in [-1,0], x3 in [0.5,1], x4=x5=x6=0.
    // x0-x1+x4=0, x0+x2+x5=0, -x1-x2+x3+x6=0 forces x3=0, contradicting x3>=0.5.
    let mut problem = InputProblem::new(
        7,
        vec![0.0, 0.0, -1.0, 0.5, 0.0, 0.0, 0.0],
        vec![1.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0],
    );
    problem.add_equation(eq(&[(0, 1.0), (1, -1.0), (4, 1.0)], 0.0));
    problem.add_equation(eq(&[(0, 1.0), (2, 1.0), (5, 1.0)], 0.0));
    problem.add_equation(eq(&[(1, -1.0), (2, -1.0), (3, 1.0), (6, 1.0)], 0.0));

    let solution = prlimplex::solve(&problem, EngineSettings::default());
    assert_eq!(solution.status, Status::Unsat);
    assert!(solution.assignment.is_none());
}

#[test]
fn relu_feasible() {
    // x0 in [0,1], x3 in [0.5,1]; x1b = x0, x2b = -x0, f1 = relu(x1b),
    // f2 = relu(x2b), f1 + f2 = x3. Since x0 >= 0, x2b <= 0 so f2 = 0 and
    // f1 = x1b = x0, forcing x3 = x0 in [0.5, 1].
    let mut problem = InputProblem::new(
        6,
        vec![0.0, -10.0, -10.0, 0.5, -10.0, -10.0],
        vec![1.0, 10.0, 10.0, 1.0, 10.0, 10.0],
    );
    problem.add_equation(eq(&[(1, 1.0), (0, -1.0)], 0.0)); // x1b - x0 = 0
    problem.add_equation(eq(&[(2, 1.0), (0, 1.0)], 0.0)); // x2b + x0 = 0
    problem.add_equation(eq(&[(4, 1.0), (5, 1.0), (3, -1.0)], 0.0)); // f1 + f2 - x3 = 0
    problem.add_piecewise(PiecewiseSpec::Relu { b: 1, f: 4 });
    problem.add_piecewise(PiecewiseSpec::Relu { b: 2, f: 5 });

    let solution = prlimplex::solve(&problem, EngineSettings::default());
    assert_eq!(solution.status, Status::Sat);

    let (x0, f2, x3) = (assignment_of(&solution, 0), assignment_of(&solution, 5), assignment_of(&solution, 3));
    assert!((f2 - 0.0).abs() < 1e-6);
    assert!((x3 - x0).abs() < 1e-6);
    assert!(x3 >= 0.5 - 1e-9 && x3 <= 1.0 + 1e-9);
}

#[test]
fn max_feasible_triangle_inequality() {
    // a,b,c in [0.001,1]; d = |a-b|; f1 = relu(d-c); f2 = relu(c-a-b); f1+f2=0.
    // Variables: a(0) b(1) c(2) d(3) diff_ab(4) diff_dc(5) f1(6) diff_cab(7) f2(8).
    let mut problem = InputProblem::new(
        9,
        vec![0.001, 0.001, 0.001, -10.0, -10.0, -10.0, -10.0, -10.0, -10.0],
        vec![1.0, 1.0, 1.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0],
    );
    problem.add_equation(eq(&[(4, 1.0), (0, -1.0), (1, 1.0)], 0.0)); // diff_ab = a - b
    problem.add_piecewise(PiecewiseSpec::Abs { b: 4, f: 3 }); // d = |diff_ab|

    problem.add_equation(eq(&[(5, 1.0), (3, -1.0), (2, 1.0)], 0.0)); // diff_dc = d - c
    problem.add_piecewise(PiecewiseSpec::Relu { b: 5, f: 6 }); // f1 = relu(diff_dc)

    problem.add_equation(eq(&[(7, 1.0), (2, -1.0), (0, 1.0), (1, 1.0)], 0.0)); // diff_cab = c - a - b
    problem.add_piecewise(PiecewiseSpec::Relu { b: 7, f: 8 }); // f2 = relu(diff_cab)

    problem.add_equation(eq(&[(6, 1.0), (8, 1.0)], 0.0)); // f1 + f2 = 0

    let solution = prlimplex::solve(&problem, EngineSettings::default());
    assert_eq!(solution.status, Status::Sat);

    let (a, b, c) = (assignment_of(&solution, 0), assignment_of(&solution, 1), assignment_of(&solution, 2));
    let largest = a.max(b).max(c);
    assert!(2.0 * largest < a + b + c + 1e-6);
}

#[test]
fn max_infeasible_overlapping_constraints() {
    // x0 = max(x1, x2), x3 = max(x2, x4); x1 and x4 are pinned above every
    // other element so both maxima are forced to equal them, but x0 and x3
    // are themselves pinned to zero by the coupling equation below.
    let mut problem = InputProblem::new(5, vec![0.0, 5.0, 0.0, 0.0, 5.0], vec![0.0, 5.0, 1.0, 0.0, 5.0]);
    problem.add_equation(eq(&[(0, 1.0), (3, 1.0)], 0.0)); // x0 + x3 = 0 (both already fixed to 0)
    problem.add_piecewise(PiecewiseSpec::Max { f: 0, elements: vec![1, 2] });
    problem.add_piecewise(PiecewiseSpec::Max { f: 3, elements: vec![2, 4] });

    let solution = prlimplex::solve(&problem, EngineSettings::default());
    assert_eq!(solution.status, Status::Unsat);
}

#[test]
fn restart_smoke_over_many_sign_constraints() {
    // 16 independent Sign constraints on ambiguous b_i in [-1,1], coupled by
    // one equation pinning exactly two of the sixteen f_i to -1. The
    // decision heuristic's first guess (every f_i = +1, per Sign's phase
    // ordering) violates the sum, so the driver has to backtrack through
    // several phase assignments before it lands on a satisfying one -- a
    // small but genuine exercise of the conflict/restart machinery rather
    // than a single propagation pass.
    const N: usize = 16;
    let num_vars = 2 * N;
    let mut lower = vec![-1.0; num_vars];
    let mut upper = vec![1.0; num_vars];
    for i in 0..N {
        lower[2 * i] = -1.0;
        upper[2 * i] = 1.0;
    }
    let mut problem = InputProblem::new(num_vars, lower, upper);
    for i in 0..N {
        problem.add_piecewise(PiecewiseSpec::Sign { b: 2 * i, f: 2 * i + 1 });
    }
    let f_coeffs: Vec<(usize, f64)> = (0..N).map(|i| (2 * i + 1, 1.0)).collect();
    problem.add_equation(eq(&f_coeffs, (N as f64) - 4.0)); // exactly two f_i = -1

    let settings = EngineSettings { restart_base: 1.0, ..EngineSettings::default() };
    let solution = prlimplex::solve(&problem, settings);

    assert!(solution.status == Status::Sat || solution.status == Status::Unsat);
    if solution.stats.conflicts > 0 {
        assert!(solution.stats.restarts > 0);
    }
}
