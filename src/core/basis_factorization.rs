//! The basis factorization (spec.md §4.2): an LU decomposition of the last
//! full basis `B`, plus an ordered list of eta matrices recording every
//! pivot since. `solve_forward`/`solve_backward` apply L, U, and the etas in
//! the appropriate order; `refactorize` rebuilds from scratch.
//!
//! Dense storage throughout -- sparse eta/column storage is flagged in
//! DESIGN.md as a scale-only follow-up the spec explicitly allows omitting
//! (spec.md §9, "Eta/factorization memory").

use crate::error::{EngineError, EngineResult};

/// One rank-one update to the basis: replacing the column at `pivot_row`
/// (the position, within the basis ordering, of the variable that just
/// left) with `column`, the transformed entering column
/// (`column = B^-1 * a_enter`).
#[derive(Clone, Debug)]
pub struct EtaMatrix {
    pivot_row: usize,
    column: Vec<f64>,
}

impl EtaMatrix {
    pub fn new(pivot_row: usize, column: Vec<f64>) -> Self {
        EtaMatrix { pivot_row, column }
    }

    /// Applies this eta's effect to a FTRAN vector (in place), the
    /// forward-substitution direction.
    fn apply_forward(&self, x: &mut [f64]) {
        let pivot = self.column[self.pivot_row];
        let xr = x[self.pivot_row];
        for i in 0..x.len() {
            if i != self.pivot_row {
                x[i] -= self.column[i] / pivot * xr;
            }
        }
        x[self.pivot_row] = xr / pivot;
    }

    /// Applies this eta's transpose to a BTRAN vector (in place), the
    /// backward-substitution direction.
    fn apply_backward(&self, y: &mut [f64]) {
        let pivot = self.column[self.pivot_row];
        let mut acc = y[self.pivot_row];
        for i in 0..y.len() {
            if i != self.pivot_row {
                acc -= y[i] * self.column[i];
            }
        }
        y[self.pivot_row] = acc / pivot;
    }
}

#[derive(Clone, Debug)]
struct LuFactors {
    // Doolittle LU with partial pivoting: perm[i] is the original row that
    // ended up at row i after pivoting.
    lower: Vec<Vec<f64>>,
    upper: Vec<Vec<f64>>,
    perm: Vec<usize>,
}

impl LuFactors {
    fn decompose(matrix: &[Vec<f64>], tolerance: f64) -> EngineResult<Self> {
        let m = matrix.len();
        let mut a: Vec<Vec<f64>> = matrix.to_vec();
        let mut perm: Vec<usize> = (0..m).collect();
        let mut lower = vec![vec![0.0; m]; m];

        for k in 0..m {
            // Partial pivoting: choose the largest-magnitude entry in column k.
            let (pivot_row, _) = (k..m)
                .map(|i| (i, a[i][k].abs()))
                .fold((k, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });

            if a[pivot_row][k].abs() < tolerance {
                return Err(EngineError::MalformedBasis {
                    reason: format!("column {} is numerically singular", k),
                });
            }

            if pivot_row != k {
                a.swap(pivot_row, k);
                perm.swap(pivot_row, k);
                lower.swap(pivot_row, k);
            }

            for i in (k + 1)..m {
                let factor = a[i][k] / a[k][k];
                lower[i][k] = factor;
                for j in k..m {
                    a[i][j] -= factor * a[k][j];
                }
            }
        }

        for i in 0..m {
            lower[i][i] = 1.0;
        }

        Ok(LuFactors { lower, upper: a, perm })
    }

    fn dim(&self) -> usize {
        self.lower.len()
    }

    /// Solves `B x = b` via `P`, then forward substitution on `L`, then
    /// backward substitution on `U`.
    fn solve_forward(&self, b: &[f64]) -> Vec<f64> {
        let m = self.dim();
        let permuted: Vec<f64> = self.perm.iter().map(|&p| b[p]).collect();

        let mut y = vec![0.0; m];
        for i in 0..m {
            let mut acc = permuted[i];
            for j in 0..i {
                acc -= self.lower[i][j] * y[j];
            }
            y[i] = acc;
        }

        let mut x = vec![0.0; m];
        for i in (0..m).rev() {
            let mut acc = y[i];
            for j in (i + 1)..m {
                acc -= self.upper[i][j] * x[j];
            }
            x[i] = acc / self.upper[i][i];
        }
        x
    }

    /// Solves `y^T B = c^T`, i.e. `B^T y = c`, via back-substitution on
    /// `U^T` then forward-substitution on `L^T`, then un-permuting.
    fn solve_backward(&self, c: &[f64]) -> Vec<f64> {
        let m = self.dim();

        let mut z = vec![0.0; m];
        for i in 0..m {
            let mut acc = c[i];
            for j in 0..i {
                acc -= self.upper[j][i] * z[j];
            }
            z[i] = acc / self.upper[i][i];
        }

        let mut w = vec![0.0; m];
        for i in (0..m).rev() {
            let mut acc = z[i];
            for j in (i + 1)..m {
                acc -= self.lower[j][i] * w[j];
            }
            w[i] = acc;
        }

        let mut y = vec![0.0; m];
        for (i, &p) in self.perm.iter().enumerate() {
            y[p] = w[i];
        }
        y
    }
}

pub struct BasisFactorization {
    lu: LuFactors,
    etas: Vec<EtaMatrix>,
    refactorization_threshold: u32,
    tolerance: f64,
}

impl BasisFactorization {
    pub fn new(initial_basis: &[Vec<f64>], tolerance: f64, refactorization_threshold: u32) -> EngineResult<Self> {
        Ok(BasisFactorization {
            lu: LuFactors::decompose(initial_basis, tolerance)?,
            etas: Vec::new(),
            refactorization_threshold,
            tolerance,
        })
    }

    /// `B x = b`.
    pub fn solve_forward(&self, b: &[f64]) -> Vec<f64> {
        let mut x = self.lu.solve_forward(b);
        for eta in &self.etas {
            eta.apply_forward(&mut x);
        }
        x
    }

    /// `y^T B = c^T`.
    pub fn solve_backward(&self, c: &[f64]) -> Vec<f64> {
        let mut y = c.to_vec();
        for eta in self.etas.iter().rev() {
            eta.apply_backward(&mut y);
        }
        self.lu.solve_backward(&y)
    }

    pub fn push_eta_update(&mut self, pivot_row: usize, column_values: Vec<f64>) {
        self.etas.push(EtaMatrix::new(pivot_row, column_values));
    }

    pub fn refactorize(&mut self, columns_of_b: &[Vec<f64>]) -> EngineResult<()> {
        self.lu = LuFactors::decompose(columns_of_b, self.tolerance)?;
        self.etas.clear();
        Ok(())
    }

    pub fn should_refactorize(&self) -> bool {
        self.etas.len() as u32 >= self.refactorization_threshold
    }

    pub fn eta_count(&self) -> usize {
        self.etas.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(n: usize) -> Vec<Vec<f64>> {
        (0..n)
            .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect()
    }

    #[test]
    fn identity_basis_round_trips() {
        let basis = identity(3);
        let f = BasisFactorization::new(&basis, 1e-9, 100).unwrap();
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(f.solve_forward(&b), b);
        assert_eq!(f.solve_backward(&b), b);
    }

    #[test]
    fn solves_a_small_diagonal_system() {
        let basis = vec![
            vec![2.0, 0.0, 0.0],
            vec![0.0, 4.0, 0.0],
            vec![0.0, 0.0, 5.0],
        ];
        let f = BasisFactorization::new(&basis, 1e-9, 100).unwrap();
        let x = f.solve_forward(&[2.0, 8.0, 10.0]);
        for (got, want) in x.iter().zip([1.0, 2.0, 2.0].iter()) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn refactorize_resets_eta_count() {
        let basis = identity(2);
        let mut f = BasisFactorization::new(&basis, 1e-9, 2).unwrap();
        f.push_eta_update(0, vec![2.0, 0.0]);
        f.push_eta_update(1, vec![0.0, 2.0]);
        assert!(f.should_refactorize());
        f.refactorize(&identity(2)).unwrap();
        assert!(!f.should_refactorize());
        assert_eq!(f.eta_count(), 0);
    }

    #[test]
    fn singular_basis_is_malformed() {
        let basis = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert!(BasisFactorization::new(&basis, 1e-9, 100).is_err());
    }
}
