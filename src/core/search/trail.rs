//! The search trail (spec.md §4.8): a linear record of which piecewise
//! constraint was fixed to which phase and why -- a branching decision, or
//! an implication driven purely by bound propagation. Conflict analysis
//! walks this record to build a learned clause.

use crate::core::context::CdList;
use crate::core::piecewise::Phase;
use crate::core::variable::ConstraintId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrailEntryKind {
    Decision,
    Implication,
}

#[derive(Clone, Copy, Debug)]
pub struct TrailEntry {
    pub constraint: ConstraintId,
    pub phase: Phase,
    pub kind: TrailEntryKind,
}

/// One level per branching decision. `push_level`/`pop_level` must be
/// called in lockstep with every other context-dependent component (the
/// bound manager, the piecewise constraints' phase trackers) so that a
/// backjump restores all three together.
#[derive(Default)]
pub struct Trail {
    entries: CdList<TrailEntry>,
}

impl Trail {
    pub fn new() -> Self {
        Trail { entries: CdList::new() }
    }

    pub fn push_level(&mut self) {
        self.entries.push();
    }

    /// Backjumps one level, returning the entries that were undone.
    pub fn pop_level(&mut self) -> Vec<TrailEntry> {
        self.entries.pop()
    }

    pub fn record_decision(&mut self, constraint: ConstraintId, phase: Phase) {
        self.entries.append(TrailEntry { constraint, phase, kind: TrailEntryKind::Decision });
    }

    pub fn record_implication(&mut self, constraint: ConstraintId, phase: Phase) {
        self.entries.append(TrailEntry { constraint, phase, kind: TrailEntryKind::Implication });
    }

    pub fn entries(&self) -> &[TrailEntry] {
        self.entries.as_slice()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every decision still on the trail, in the order they were made.
    /// This is the literal set a learned clause blames (see
    /// `search::conflict`).
    pub fn decisions(&self) -> Vec<TrailEntry> {
        self.entries.as_slice().iter().copied().filter(|e| e.kind == TrailEntryKind::Decision).collect()
    }
}
