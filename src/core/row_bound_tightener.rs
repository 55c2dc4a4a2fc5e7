//! The row bound tightener (spec.md §4.4): derives bounds on a basic
//! variable (and, by symmetric inversion, on each non-basic in its row)
//! from one explicit tableau row at a time.

use crate::core::bound_manager::BoundManager;
use crate::core::numeric;
use crate::core::sparse::SparseRow;
use crate::core::tableau::{ConstraintMatrix, Tableau};
use crate::core::variable::Variable;
use crate::error::EngineResult;

pub struct RowBoundTightener {
    saturation_cap: u32,
}

impl RowBoundTightener {
    pub fn new(saturation_cap: u32) -> Self {
        RowBoundTightener { saturation_cap }
    }

    /// `x_b = row.constant + sum(coeff * x_nonbasic)`. Tightens the bound
    /// of the basic variable from the current bounds of the non-basics in
    /// its row, then symmetrically inverts to tighten each non-basic from
    /// the basic's bound and the other non-basics'.
    fn tighten_row(
        &self,
        basic: Variable,
        row: &SparseRow,
        bm: &mut BoundManager,
    ) -> EngineResult<usize> {
        let mut changed = 0;

        let (mut lower, mut upper) = (row.constant, row.constant);
        for (v, c) in row.iter() {
            if c > 0.0 {
                lower += c * bm.lb(v);
                upper += c * bm.ub(v);
            } else {
                lower += c * bm.ub(v);
                upper += c * bm.lb(v);
            }
        }
        if lower.is_finite() && bm.tighten_lower(basic, lower)? {
            changed += 1;
        }
        if upper.is_finite() && bm.tighten_upper(basic, upper)? {
            changed += 1;
        }

        let basic_lb = bm.lb(basic);
        let basic_ub = bm.ub(basic);
        for (v, c) in row.iter() {
            if numeric::is_zero(c, 1e-12) {
                continue;
            }
            // Contribution of every non-basic other than `v`, bracketed
            // the same way as above.
            let mut other_lower = row.constant;
            let mut other_upper = row.constant;
            for (w, cw) in row.iter() {
                if w == v {
                    continue;
                }
                if cw > 0.0 {
                    other_lower += cw * bm.lb(w);
                    other_upper += cw * bm.ub(w);
                } else {
                    other_lower += cw * bm.ub(w);
                    other_upper += cw * bm.lb(w);
                }
            }
            // c * x_v = x_b - others, so x_v = (x_b - others) / c.
            let (hi_num, lo_num) = (basic_ub - other_lower, basic_lb - other_upper);
            let (cand_a, cand_b) = (hi_num / c, lo_num / c);
            let (new_lb, new_ub) = if c > 0.0 { (cand_b, cand_a) } else { (cand_a, cand_b) };
            if new_lb.is_finite() && bm.tighten_lower(v, new_lb)? {
                changed += 1;
            }
            if new_ub.is_finite() && bm.tighten_upper(v, new_ub)? {
                changed += 1;
            }
        }

        Ok(changed)
    }

    /// One pass over every basic row.
    pub fn tighten_once(
        &self,
        tableau: &Tableau,
        matrix: &ConstraintMatrix,
        bm: &mut BoundManager,
    ) -> EngineResult<usize> {
        let mut total = 0;
        for row_idx in 0..tableau.num_rows() {
            let basic = tableau.basic_vars()[row_idx];
            let row = tableau.extract_row(row_idx, matrix);
            total += self.tighten_row(basic, &row, bm)?;
        }
        Ok(total)
    }

    /// Iterates full passes until one yields no improvement, bounded by
    /// `saturation_cap` (spec.md §4.4, "Saturation mode").
    pub fn saturate(
        &self,
        tableau: &Tableau,
        matrix: &ConstraintMatrix,
        bm: &mut BoundManager,
    ) -> EngineResult<usize> {
        let mut total = 0;
        for _ in 0..self.saturation_cap {
            let changed = self.tighten_once(tableau, matrix, bm)?;
            total += changed;
            if changed == 0 {
                break;
            }
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::variable::VarVec;

    fn var(i: usize) -> Variable {
        Variable::from_index(i)
    }

    #[test]
    fn tightens_basic_from_nonbasic_bounds() {
        // x0 + x1 = 5, x1 in [0,2] => x0 in [3,5].
        let matrix = ConstraintMatrix {
            columns: {
                let mut cols = VarVec::new();
                cols.init(var(0));
                cols.init(var(1));
                cols[var(0)] = vec![1.0];
                cols[var(1)] = vec![1.0];
                cols
            },
            rhs: vec![5.0],
            num_rows: 1,
        };
        let all_vars = vec![var(0), var(1)];
        let lower = vec![0.0, 0.0];
        let upper = vec![1000.0, 2.0];
        let tableau = Tableau::new(&matrix, vec![var(0)], &all_vars, &lower, &upper, 1e-9, 100).unwrap();

        let mut bm = BoundManager::new(1e-9);
        bm.register_new_variable(-1000.0, 1000.0);
        bm.register_new_variable(0.0, 2.0);

        let tightener = RowBoundTightener::new(20);
        tightener.tighten_once(&tableau, &matrix, &mut bm).unwrap();
        assert_eq!(bm.lb(var(0)), 3.0);
        assert_eq!(bm.ub(var(0)), 5.0);
    }
}
