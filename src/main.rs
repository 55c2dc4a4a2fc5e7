//! A smoke-test runner: builds a couple of hand-written problems and prints
//! how the engine resolved them. Not a front-end -- there is no file format
//! to parse (see `lib.rs`), so this exists only to exercise the library from
//! an executable the way the teacher's own CLI exercised its solver.

#[macro_use]
extern crate log;

use prlimplex::config::EngineSettings;
use prlimplex::core::Status;
use prlimplex::input::{Equation, EquationKind, InputProblem, PiecewiseSpec};

fn main() {
    env_logger::init();

    run("feasible LP: x + y = 5, x,y in [0,10]", feasible_lp());
    run("relu network: f = relu(b), b in [-5,5], f in [3,3]", relu_problem());
}

fn run(name: &str, problem: InputProblem) {
    let solution = prlimplex::solve(&problem, EngineSettings::default());
    info!("{}: {:?}", name, status_label(&solution.status));
    if let Some(assignment) = &solution.assignment {
        for i in 0..problem.num_variables {
            let v = prlimplex::core::variable::Variable::from_index(i);
            info!("  x{} = {}", i, assignment.get(&v).copied().unwrap_or(0.0));
        }
    }
    info!(
        "  decisions={} conflicts={} pivots={}",
        solution.stats.decisions, solution.stats.conflicts, solution.stats.pivots
    );
}

fn status_label(status: &Status) -> &'static str {
    match status {
        Status::Sat => "SAT",
        Status::Unsat => "UNSAT",
        Status::Timeout => "TIMEOUT",
        Status::QuitRequested => "QUIT",
        Status::Error(_) => "ERROR",
    }
}

fn feasible_lp() -> InputProblem {
    let mut problem = InputProblem::new(2, vec![0.0, 0.0], vec![10.0, 10.0]);
    problem.add_equation(Equation { coefficients: vec![(0, 1.0), (1, 1.0)], scalar: 5.0, kind: EquationKind::Eq });
    problem
}

fn relu_problem() -> InputProblem {
    let mut problem = InputProblem::new(2, vec![-5.0, 3.0], vec![5.0, 3.0]);
    problem.add_piecewise(PiecewiseSpec::Relu { b: 0, f: 1 });
    problem
}
