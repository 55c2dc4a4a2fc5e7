//! `Tableau` exercised across an actual pivot on a two-row system, beyond
//! the single-row construction check already covered by `tableau.rs`'s own
//! `#[cfg(test)]` module.

use prlimplex::core::tableau::{ConstraintMatrix, NonBasicStatus, Tableau};
use prlimplex::core::variable::{Variable, VarVec};

fn var(i: usize) -> Variable {
    Variable::from_index(i)
}

// x0 + x1 + s0 = 6 (s0 basic), x1 + x2 + s1 = 4 (s1 basic). x0,x1,x2 start
// non-basic at their lower bound 0, so s0=6, s1=4.
fn fixture() -> (ConstraintMatrix, Tableau) {
    let mut cols = VarVec::new();
    for v in [var(0), var(1), var(2), var(3), var(4)] {
        cols.init(v);
    }
    cols[var(0)] = vec![1.0, 0.0];
    cols[var(1)] = vec![1.0, 1.0];
    cols[var(2)] = vec![0.0, 1.0];
    cols[var(3)] = vec![1.0, 0.0];
    cols[var(4)] = vec![0.0, 1.0];
    let matrix = ConstraintMatrix { columns: cols, rhs: vec![6.0, 4.0], num_rows: 2 };

    let all_vars = vec![var(0), var(1), var(2), var(3), var(4)];
    let lower = vec![0.0; 5];
    let upper = vec![f64::INFINITY; 5];
    let tableau = Tableau::new(&matrix, vec![var(3), var(4)], &all_vars, &lower, &upper, 1e-9, 100).unwrap();
    (matrix, tableau)
}

#[test]
fn pivot_moves_entering_variable_and_keeps_the_system_consistent() {
    let (matrix, mut tableau) = fixture();
    assert_eq!(tableau.assignment_of(var(3)), 6.0);
    assert_eq!(tableau.assignment_of(var(4)), 4.0);

    // Bring x0 into the basis in place of s0 (var 3): x0's column is [1,0],
    // so B^-1 a_0 = [1,0] (B is the identity here) and x0 must rise all the
    // way to 6 to drive s0 down to its lower bound of 0.
    let direction = tableau.forward_transform(&matrix.columns[var(0)]);
    assert_eq!(direction, vec![1.0, 0.0]);

    tableau.pivot(var(0), var(3), NonBasicStatus::AtLower, &direction, 6.0, &matrix).unwrap();

    assert!((tableau.assignment_of(var(0)) - 6.0).abs() < 1e-9);
    assert!(tableau.is_basic(var(0)));
    assert!(!tableau.is_basic(var(3)));
    assert!((tableau.residual_infinity_norm(&matrix)).abs() < 1e-9);
}

#[test]
fn snapshot_restore_round_trips_the_partition() {
    let (matrix, mut tableau) = fixture();
    let snapshot = tableau.snapshot();

    let direction = tableau.forward_transform(&matrix.columns[var(0)]);
    tableau.pivot(var(0), var(3), NonBasicStatus::AtLower, &direction, 6.0, &matrix).unwrap();
    assert!(tableau.is_basic(var(0)));

    tableau.restore(&snapshot, &matrix).unwrap();
    assert!(!tableau.is_basic(var(0)));
    assert!(tableau.is_basic(var(3)));
    assert_eq!(tableau.assignment_of(var(3)), 6.0);
}
