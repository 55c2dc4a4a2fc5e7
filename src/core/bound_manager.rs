//! The bound manager (spec.md §4.1): context-dependent per-variable
//! lower/upper bounds, a drainable tightening queue, and infeasibility
//! detection.
//!
//! Watcher notification (spec.md §4.1 "Watchers") is *not* implemented as
//! synchronous callbacks stored inside this struct -- doing so would
//! require either raw pointers back into the tableau/constraint set (the
//! exact cyclic-ownership problem the Design Notes call out) or `Rc<RefCell<_>>`
//! cycles. Instead `BoundManager` only queues tightenings; the engine
//! (`core::Engine`, the sole owner of all three siblings) drains the queue
//! and dispatches to the tableau and the constraint set immediately after
//! every call that can produce a tightening, so from every caller's
//! perspective a tightening is still fully propagated before control
//! returns to it, preserving the FIFO / "complete before return" guarantees
//! of spec.md §5.

use crate::core::context::UndoLog;
use crate::core::numeric;
use crate::core::variable::{Variable, VarVec};
use crate::error::{BoundKind, EngineError, EngineResult};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tightening {
    pub variable: Variable,
    pub value: f64,
    pub kind: BoundKind,
}

#[derive(Clone, Copy, Debug)]
struct UndoRecord {
    variable: Variable,
    kind: BoundKind,
    old_value: f64,
}

pub struct BoundManager {
    lower: VarVec<f64>,
    upper: VarVec<f64>,
    undo: UndoLog<UndoRecord>,
    tightenings: Vec<Tightening>,
    consistent: bool,
    first_inconsistent: Option<Tightening>,
    tolerance: f64,
}

impl BoundManager {
    pub fn new(tolerance: f64) -> Self {
        BoundManager {
            lower: VarVec::new(),
            upper: VarVec::new(),
            undo: UndoLog::new(),
            tightenings: Vec::new(),
            consistent: true,
            first_inconsistent: None,
            tolerance,
        }
    }

    pub fn register_new_variable(&mut self, lb: f64, ub: f64) -> Variable {
        let v = Variable::from_index(self.lower.len());
        self.lower.init(v);
        self.upper.init(v);
        self.lower[v] = lb;
        self.upper[v] = ub;
        v
    }

    pub fn number_of_variables(&self) -> usize {
        self.lower.len()
    }

    #[inline]
    pub fn lb(&self, v: Variable) -> f64 {
        self.lower[v]
    }

    #[inline]
    pub fn ub(&self, v: Variable) -> f64 {
        self.upper[v]
    }

    pub fn lower_bounds(&self) -> &[f64] {
        self.lower.as_slice()
    }

    pub fn upper_bounds(&self) -> &[f64] {
        self.upper.as_slice()
    }

    /// Installs `value` as the lower bound of `v` iff it strictly improves
    /// the current one. Returns `Ok(true)` if the bound moved, `Ok(false)`
    /// if `value` was not an improvement, and `Err` if installing it
    /// crossed `ub(v)` beyond tolerance.
    pub fn tighten_lower(&mut self, v: Variable, value: f64) -> EngineResult<bool> {
        self.tighten(v, value, BoundKind::Lower)
    }

    pub fn tighten_upper(&mut self, v: Variable, value: f64) -> EngineResult<bool> {
        self.tighten(v, value, BoundKind::Upper)
    }

    fn tighten(&mut self, v: Variable, value: f64, kind: BoundKind) -> EngineResult<bool> {
        let current = match kind {
            BoundKind::Lower => self.lower[v],
            BoundKind::Upper => self.upper[v],
        };
        let improves = match kind {
            BoundKind::Lower => numeric::gt(value, current, self.tolerance),
            BoundKind::Upper => numeric::lt(value, current, self.tolerance),
        };
        if !improves {
            return Ok(false);
        }

        self.undo.record(UndoRecord { variable: v, kind, old_value: current });
        match kind {
            BoundKind::Lower => self.lower[v] = value,
            BoundKind::Upper => self.upper[v] = value,
        }

        let tightening = Tightening { variable: v, value, kind };
        self.tightenings.push(tightening);

        if numeric::gt(self.lower[v], self.upper[v], self.tolerance) {
            self.consistent = false;
            if self.first_inconsistent.is_none() {
                self.first_inconsistent = Some(tightening);
            }
            return Err(EngineError::Infeasibility { variable: v, bound: kind, value });
        }

        Ok(true)
    }

    /// Returns and clears the queue of tightenings performed since the last
    /// drain.
    pub fn drain_tightenings(&mut self) -> Vec<Tightening> {
        std::mem::take(&mut self.tightenings)
    }

    pub fn has_pending_tightenings(&self) -> bool {
        !self.tightenings.is_empty()
    }

    pub fn consistent(&self) -> bool {
        self.consistent
    }

    pub fn consistent_at(&self, v: Variable) -> bool {
        numeric::leq(self.lower[v], self.upper[v], self.tolerance)
    }

    pub fn first_inconsistent_tightening(&self) -> Option<Tightening> {
        self.first_inconsistent
    }

    pub fn push(&mut self) {
        self.undo.push();
    }

    pub fn pop(&mut self) {
        let (lower, upper) = (&mut self.lower, &mut self.upper);
        self.undo.pop(|r| match r.kind {
            BoundKind::Lower => lower[r.variable] = r.old_value,
            BoundKind::Upper => upper[r.variable] = r.old_value,
        });
        // Whatever drove us into an inconsistent state is gone now.
        self.consistent = true;
        self.first_inconsistent = None;
        self.tightenings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tighten_only_strict_improvements() {
        let mut bm = BoundManager::new(numeric::DEFAULT_TOLERANCE);
        let v = bm.register_new_variable(0.0, 10.0);
        assert_eq!(bm.tighten_lower(v, 1.0).unwrap(), true);
        assert_eq!(bm.tighten_lower(v, 0.5).unwrap(), false);
        assert_eq!(bm.lb(v), 1.0);
    }

    #[test]
    fn crossing_bound_reports_infeasibility() {
        let mut bm = BoundManager::new(numeric::DEFAULT_TOLERANCE);
        let v = bm.register_new_variable(0.0, 1.0);
        assert!(bm.tighten_lower(v, 2.0).is_err());
        assert!(!bm.consistent());
    }

    #[test]
    fn push_pop_restores_bounds() {
        let mut bm = BoundManager::new(numeric::DEFAULT_TOLERANCE);
        let v = bm.register_new_variable(0.0, 10.0);
        bm.push();
        bm.tighten_lower(v, 3.0).unwrap();
        bm.tighten_upper(v, 7.0).unwrap();
        assert_eq!((bm.lb(v), bm.ub(v)), (3.0, 7.0));
        bm.pop();
        assert_eq!((bm.lb(v), bm.ub(v)), (0.0, 10.0));
    }

    #[test]
    fn drain_clears_queue() {
        let mut bm = BoundManager::new(numeric::DEFAULT_TOLERANCE);
        let v = bm.register_new_variable(0.0, 10.0);
        bm.tighten_lower(v, 1.0).unwrap();
        assert_eq!(bm.drain_tightenings().len(), 1);
        assert!(bm.drain_tightenings().is_empty());
    }
}
