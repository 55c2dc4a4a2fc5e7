//! The revised simplex tableau (spec.md §4.3): the basic/non-basic
//! partition, the current assignment, and the pivot operation. Row
//! extraction is delegated to the basis factorization.

use crate::core::basis_factorization::BasisFactorization;
use crate::core::numeric;
use crate::core::sparse::SparseRow;
use crate::core::variable::{Variable, VarMap, VarVec};
use crate::error::{EngineError, EngineResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NonBasicStatus {
    AtLower,
    AtUpper,
}

/// Where a basic variable sits relative to its bounds, the information the
/// Phase-1 cost function needs to decide which direction to push it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BasicStatus {
    Between,
    AtLowerBound,
    AtUpperBound,
    ViolatedLowerBound,
    ViolatedUpperBound,
}

/// The columns of `A`, one per variable, dense for simplicity (spec.md §9
/// permits dense storage for correctness; sparse is a scale-only
/// follow-up).
pub struct ConstraintMatrix {
    pub columns: VarVec<Vec<f64>>,
    pub rhs: Vec<f64>,
    pub num_rows: usize,
}

/// A clean engine state captured at initialization and reloaded by the
/// precision restorer (spec.md §4.9) when accumulated drift can't be
/// fixed by refactorization alone.
#[derive(Clone, Debug)]
pub struct TableauSnapshot {
    basic_of_row: Vec<Variable>,
    nonbasic_of_col: Vec<Variable>,
    nonbasic_status: Vec<(Variable, NonBasicStatus)>,
    assignment: Vec<f64>,
}

pub struct Tableau {
    n: usize,
    m: usize,
    basic_of_row: Vec<Variable>,
    row_of_basic: VarMap<usize>,
    nonbasic_of_col: Vec<Variable>,
    col_of_nonbasic: VarMap<usize>,
    nonbasic_status: VarMap<NonBasicStatus>,
    assignment: VarVec<f64>,
    factorization: BasisFactorization,
    tolerance: f64,
}

impl Tableau {
    /// Builds the initial tableau from a constraint matrix and a choice of
    /// basis (typically the slack/auxiliary variables introduced when
    /// canonicalizing inequalities to equalities). Every non-basic starts
    /// at its lower bound (or upper, if no finite lower bound exists).
    pub fn new(
        matrix: &ConstraintMatrix,
        basic_vars: Vec<Variable>,
        all_vars: &[Variable],
        lower_bounds: &[f64],
        upper_bounds: &[f64],
        tolerance: f64,
        refactorization_eta_threshold: u32,
    ) -> EngineResult<Self> {
        let m = matrix.num_rows;
        let n = all_vars.len();
        assert_eq!(basic_vars.len(), m);

        let mut row_of_basic = VarMap::new();
        for (row, &v) in basic_vars.iter().enumerate() {
            row_of_basic.insert(&v, row);
        }

        let nonbasic_of_col: Vec<Variable> =
            all_vars.iter().copied().filter(|v| !row_of_basic.contains(v)).collect();
        let mut col_of_nonbasic = VarMap::new();
        for (col, &v) in nonbasic_of_col.iter().enumerate() {
            col_of_nonbasic.insert(&v, col);
        }

        let mut nonbasic_status = VarMap::new();
        let mut assignment = VarVec::new();
        for &v in all_vars {
            assignment.init(v);
        }
        for &v in &nonbasic_of_col {
            let lb = lower_bounds[v.index()];
            if lb.is_finite() {
                nonbasic_status.insert(&v, NonBasicStatus::AtLower);
                assignment[v] = lb;
            } else {
                let ub = upper_bounds[v.index()];
                if ub.is_finite() {
                    nonbasic_status.insert(&v, NonBasicStatus::AtUpper);
                    assignment[v] = ub;
                } else {
                    nonbasic_status.insert(&v, NonBasicStatus::AtLower);
                    assignment[v] = 0.0;
                }
            }
        }

        let basis_columns: Vec<Vec<f64>> = basic_vars
            .iter()
            .map(|&v| matrix.columns[v].clone())
            .collect();
        // BasisFactorization wants the basis as rows-of-B (square m x m),
        // i.e. the transpose of the column list we just built.
        let basis_as_rows = transpose(&basis_columns, m);
        let factorization = BasisFactorization::new(&basis_as_rows, tolerance, refactorization_eta_threshold)?;

        let mut tableau = Tableau {
            n,
            m,
            basic_of_row: basic_vars,
            row_of_basic,
            nonbasic_of_col,
            col_of_nonbasic,
            nonbasic_status,
            assignment,
            factorization,
            tolerance,
        };
        tableau.recompute_basic_assignment(matrix);
        Ok(tableau)
    }

    fn recompute_basic_assignment(&mut self, matrix: &ConstraintMatrix) {
        let mut rhs = matrix.rhs.clone();
        for &nb in &self.nonbasic_of_col {
            let coeff_col = &matrix.columns[nb];
            let x_nb = self.assignment[nb];
            if x_nb != 0.0 {
                for row in 0..self.m {
                    rhs[row] -= coeff_col[row] * x_nb;
                }
            }
        }
        let x_b = self.factorization.solve_forward(&rhs);
        for (row, &var) in self.basic_of_row.iter().enumerate() {
            self.assignment[var] = x_b[row];
        }
    }

    pub fn assignment_of(&self, v: Variable) -> f64 {
        self.assignment[v]
    }

    pub fn is_basic(&self, v: Variable) -> bool {
        self.row_of_basic.contains(&v)
    }

    pub fn basic_status(&self, v: Variable, lb: f64, ub: f64) -> BasicStatus {
        let x = self.assignment[v];
        if numeric::lt(x, lb, self.tolerance) {
            BasicStatus::ViolatedLowerBound
        } else if numeric::gt(x, ub, self.tolerance) {
            BasicStatus::ViolatedUpperBound
        } else if numeric::are_equal(x, lb, self.tolerance) {
            BasicStatus::AtLowerBound
        } else if numeric::are_equal(x, ub, self.tolerance) {
            BasicStatus::AtUpperBound
        } else {
            BasicStatus::Between
        }
    }

    pub fn basic_too_low(&self, row: usize, lb: f64) -> bool {
        numeric::lt(self.assignment[self.basic_of_row[row]], lb, self.tolerance)
    }

    pub fn basic_too_high(&self, row: usize, ub: f64) -> bool {
        numeric::gt(self.assignment[self.basic_of_row[row]], ub, self.tolerance)
    }

    pub fn num_rows(&self) -> usize {
        self.m
    }

    pub fn num_vars(&self) -> usize {
        self.n
    }

    pub fn basic_vars(&self) -> &[Variable] {
        &self.basic_of_row
    }

    pub fn nonbasic_vars(&self) -> &[Variable] {
        &self.nonbasic_of_col
    }

    pub fn nonbasic_status(&self, v: Variable) -> NonBasicStatus {
        self.nonbasic_status[v]
    }

    pub fn forward_transform(&self, col: &[f64]) -> Vec<f64> {
        self.factorization.solve_forward(col)
    }

    pub fn backward_transform(&self, row: &[f64]) -> Vec<f64> {
        self.factorization.solve_backward(row)
    }

    /// Row `basic_index`, i.e. `x_b = constant + sum(coeff * x_nonbasic)`,
    /// restricted to non-basic columns. Used by the row bound tightener.
    pub fn extract_row(&self, basic_index: usize, matrix: &ConstraintMatrix) -> SparseRow {
        // e_r^T B^-1 gives the basic_index-th row of B^-1.
        let mut e_r = vec![0.0; self.m];
        e_r[basic_index] = 1.0;
        let b_inv_row = self.factorization.solve_backward(&e_r);

        let mut row = SparseRow::with_capacity(0.0, self.nonbasic_of_col.len());
        let mut constant = 0.0;
        for i in 0..self.m {
            constant += b_inv_row[i] * matrix.rhs[i];
        }
        for &nb in &self.nonbasic_of_col {
            let col = &matrix.columns[nb];
            let mut coeff = 0.0;
            for i in 0..self.m {
                coeff += b_inv_row[i] * col[i];
            }
            row.push(nb, -coeff, self.tolerance);
        }
        // x_b = (B^-1 b) - (B^-1 N) x_N; the constant is B^-1 b directly.
        SparseRow { constant, ..row }
    }

    /// Swaps `entering` (currently non-basic) into the basis at the row
    /// occupied by `leaving`, and `leaving` out to non-basic status
    /// `leaving_status`. `direction` is the forward-transformed entering
    /// column (`B^-1 a_enter`); `step` is the signed distance the entering
    /// variable moves.
    pub fn pivot(
        &mut self,
        entering: Variable,
        leaving: Variable,
        leaving_status: NonBasicStatus,
        direction: &[f64],
        step: f64,
        matrix: &ConstraintMatrix,
    ) -> EngineResult<()> {
        let pivot_row = *self
            .row_of_basic
            .get(&leaving)
            .ok_or_else(|| EngineError::InvariantViolation {
                description: format!("pivot: {:?} is not basic", leaving),
            })?;
        let entering_col = *self
            .col_of_nonbasic
            .get(&entering)
            .ok_or_else(|| EngineError::InvariantViolation {
                description: format!("pivot: {:?} is not non-basic", entering),
            })?;

        if direction[pivot_row].abs() < self.tolerance {
            return Err(EngineError::MalformedBasis {
                reason: "unstable pivot element".to_string(),
            });
        }

        // Update the assignment: entering moves by `step`, every basic
        // variable moves along `direction` by `-step` times its
        // coefficient, and the leaving variable lands exactly on its
        // target bound.
        for (row, &basic_var) in self.basic_of_row.iter().enumerate() {
            self.assignment[basic_var] -= direction[row] * step;
        }
        self.assignment[entering] += step;

        self.factorization.push_eta_update(pivot_row, direction.to_vec());

        self.row_of_basic.remove(&leaving);
        self.row_of_basic.insert(&entering, pivot_row);
        self.basic_of_row[pivot_row] = entering;

        self.col_of_nonbasic.remove(&entering);
        self.col_of_nonbasic.insert(&leaving, entering_col);
        self.nonbasic_of_col[entering_col] = leaving;
        self.nonbasic_status.insert(&leaving, leaving_status);

        if self.factorization.should_refactorize() {
            self.refactorize(matrix)?;
        }
        Ok(())
    }

    pub fn refactorize(&mut self, matrix: &ConstraintMatrix) -> EngineResult<()> {
        let basis_columns: Vec<Vec<f64>> =
            self.basic_of_row.iter().map(|&v| matrix.columns[v].clone()).collect();
        let basis_as_rows = transpose(&basis_columns, self.m);
        self.factorization.refactorize(&basis_as_rows)?;
        self.recompute_basic_assignment(matrix);
        Ok(())
    }

    pub fn residual_infinity_norm(&self, matrix: &ConstraintMatrix) -> f64 {
        let mut residual = matrix.rhs.clone();
        for v in 0..self.n {
            let var = Variable::from_index(v);
            let x = self.assignment[var];
            if x == 0.0 {
                continue;
            }
            let col = &matrix.columns[var];
            for row in 0..self.m {
                residual[row] -= col[row] * x;
            }
        }
        residual.iter().fold(0.0_f64, |acc, &r| acc.max(r.abs()))
    }

    /// A clean-state snapshot for the precision restorer (spec.md §4.9):
    /// enough to rebuild the partition and assignment from scratch via
    /// `restore`, discarding however many etas have accumulated since.
    pub fn snapshot(&self) -> TableauSnapshot {
        TableauSnapshot {
            basic_of_row: self.basic_of_row.clone(),
            nonbasic_of_col: self.nonbasic_of_col.clone(),
            nonbasic_status: self.nonbasic_of_col.iter().map(|&v| (v, self.nonbasic_status[&v])).collect(),
            assignment: (0..self.n).map(|i| self.assignment[Variable::from_index(i)]).collect(),
        }
    }

    pub fn restore(&mut self, snapshot: &TableauSnapshot, matrix: &ConstraintMatrix) -> EngineResult<()> {
        self.row_of_basic = VarMap::new();
        for (row, &v) in snapshot.basic_of_row.iter().enumerate() {
            self.row_of_basic.insert(&v, row);
        }
        self.basic_of_row = snapshot.basic_of_row.clone();

        self.col_of_nonbasic = VarMap::new();
        self.nonbasic_status = VarMap::new();
        for (col, &v) in snapshot.nonbasic_of_col.iter().enumerate() {
            self.col_of_nonbasic.insert(&v, col);
        }
        for &(v, status) in &snapshot.nonbasic_status {
            self.nonbasic_status.insert(&v, status);
        }
        self.nonbasic_of_col = snapshot.nonbasic_of_col.clone();

        for (i, &x) in snapshot.assignment.iter().enumerate() {
            self.assignment[Variable::from_index(i)] = x;
        }

        self.refactorize(matrix)
    }

    pub fn set_nonbasic_to_bound(&mut self, v: Variable, value: f64, status: NonBasicStatus) {
        self.assignment[v] = value;
        self.nonbasic_status.insert(&v, status);
    }

    /// A bound flip (spec.md §4.3 step 4): `v` stays non-basic but moves
    /// from one bound to the other by `step`, with every basic variable
    /// shifted along `direction` the same way a pivot would shift them,
    /// and no change to the basic/non-basic partition.
    pub fn flip_nonbasic_bound(&mut self, v: Variable, new_value: f64, status: NonBasicStatus, direction: &[f64], step: f64) {
        for (row, &basic_var) in self.basic_of_row.iter().enumerate() {
            self.assignment[basic_var] -= direction[row] * step;
        }
        self.set_nonbasic_to_bound(v, new_value, status);
    }
}

fn transpose(columns: &[Vec<f64>], m: usize) -> Vec<Vec<f64>> {
    let mut rows = vec![vec![0.0; columns.len()]; m];
    for (col_idx, col) in columns.iter().enumerate() {
        for row in 0..m {
            rows[row][col_idx] = col[row];
        }
    }
    rows
}
