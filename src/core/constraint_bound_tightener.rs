//! The constraint bound tightener (spec.md §4.5, listed in the component
//! table of §2): a narrow batching queue that piecewise constraints push
//! tightenings into, distinct from the bound manager's own queue. Mirrors
//! `ConstraintBoundTightener.cpp`'s batch-then-flush pattern: tightenings
//! accumulate across a round of constraint notifications and are flushed
//! into the bound manager (and, transitively, every watcher) in one shot.

use crate::core::bound_manager::{BoundManager, Tightening};
use crate::error::EngineResult;

#[derive(Default)]
pub struct ConstraintBoundTightener {
    pending: Vec<Tightening>,
}

impl ConstraintBoundTightener {
    pub fn new() -> Self {
        ConstraintBoundTightener { pending: Vec::new() }
    }

    pub fn enqueue(&mut self, tightening: Tightening) {
        self.pending.push(tightening);
    }

    pub fn enqueue_all<I: IntoIterator<Item = Tightening>>(&mut self, tightenings: I) {
        self.pending.extend(tightenings);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Flushes every queued tightening into the bound manager, returning
    /// how many strictly improved a bound. Stops (returning `Err`) at the
    /// first tightening that crosses the opposite bound, but has already
    /// applied every tightening before it -- callers that need all-or-
    /// nothing semantics should check `bm.consistent()` rather than rely
    /// on this call not having partially flushed.
    pub fn flush(&mut self, bm: &mut BoundManager) -> EngineResult<usize> {
        let batch = std::mem::take(&mut self.pending);
        let mut applied = 0;
        for t in batch {
            use crate::error::BoundKind;
            let improved = match t.kind {
                BoundKind::Lower => bm.tighten_lower(t.variable, t.value)?,
                BoundKind::Upper => bm.tighten_upper(t.variable, t.value)?,
            };
            if improved {
                applied += 1;
            }
        }
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::variable::Variable;
    use crate::error::BoundKind;

    #[test]
    fn flush_applies_every_queued_tightening() {
        let mut bm = BoundManager::new(1e-9);
        let v = bm.register_new_variable(0.0, 10.0);
        let mut cbt = ConstraintBoundTightener::new();
        cbt.enqueue(Tightening { variable: v, value: 3.0, kind: BoundKind::Lower });
        cbt.enqueue(Tightening { variable: v, value: 7.0, kind: BoundKind::Upper });
        let applied = cbt.flush(&mut bm).unwrap();
        assert_eq!(applied, 2);
        assert_eq!((bm.lb(v), bm.ub(v)), (3.0, 7.0));
        assert!(!cbt.has_pending());
    }
}
