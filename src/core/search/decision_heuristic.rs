//! Branching strategies for picking which piecewise constraint (and which
//! phase of it) to split on next (spec.md §4.8, "Picking the split").
//!
//! The VSIDS-style activity bookkeeping (`bump_activity`, `decay_activity`,
//! the priority queue) is carried over from the teacher's
//! `minisat::search::DecisionHeuristic`, generalized from `Var` to
//! `ConstraintId`; the other three strategies have no teacher analogue and
//! are scored directly from the fields the caller supplies per candidate.

use crate::core::variable::{ConstraintId, IdxHeap};
use crate::util::Random;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchingHeuristic {
    Topological,
    Polarity,
    PseudoImpact,
    LargestInterval,
}

/// Everything a branch candidate offers to every strategy; strategies that
/// don't use a field simply ignore it.
#[derive(Clone, Copy, Debug)]
pub struct BranchCandidate {
    pub constraint: ConstraintId,
    /// Position in a topological ordering of the network (lower = earlier).
    pub topological_rank: usize,
    /// How close to balanced (phase-neutral) the constraint currently is;
    /// higher means more undecided / more worth splitting on.
    pub polarity_balance: f64,
    /// Expected reduction in sum-of-infeasibilities from splitting here.
    pub pseudo_impact: f64,
    /// Width of the tightest relevant input interval.
    pub interval_width: f64,
}

pub struct DecisionHeuristicSettings {
    pub strategy: BranchingHeuristic,
    pub activity_decay: f64,
    pub random_seed: f64,
    pub random_split_freq: f64,
}

impl Default for DecisionHeuristicSettings {
    fn default() -> Self {
        DecisionHeuristicSettings {
            strategy: BranchingHeuristic::Polarity,
            activity_decay: 0.95,
            random_seed: 91648253.0,
            random_split_freq: 0.0,
        }
    }
}

pub struct DecisionHeuristic {
    settings: DecisionHeuristicSettings,
    activity_inc: f64,
    activity: std::collections::HashMap<ConstraintId, f64>,
    rand: Random,
    queue: IdxHeap<ConstraintId>,
}

impl DecisionHeuristic {
    pub fn new(settings: DecisionHeuristicSettings) -> Self {
        let seed = settings.random_seed;
        DecisionHeuristic {
            settings,
            activity_inc: 1.0,
            activity: std::collections::HashMap::new(),
            rand: Random::new(seed),
            queue: IdxHeap::new(),
        }
    }

    pub fn register(&mut self, id: ConstraintId) {
        self.activity.entry(id).or_insert(0.0);
        let act = &self.activity;
        self.queue.insert(id, |a, b| act[a] > act[b]);
    }

    pub fn bump_activity(&mut self, id: ConstraintId) {
        let entry = self.activity.entry(id).or_insert(0.0);
        *entry += self.activity_inc;
        if *entry > 1e100 {
            self.activity_inc *= 1e-100;
            for v in self.activity.values_mut() {
                *v *= 1e-100;
            }
        }
        if self.queue.contains(&id) {
            let act = &self.activity;
            self.queue.update(&id, |a, b| act[a] > act[b]);
        }
    }

    pub fn decay_activity(&mut self) {
        self.activity_inc *= 1.0 / self.settings.activity_decay;
    }

    /// Picks the candidate to split on next, or `None` if `candidates` is
    /// empty. Every strategy is deterministic apart from
    /// `random_split_freq`, which occasionally overrides the strategy with
    /// a uniformly random pick (mirroring `rnd_pol`/`rnd_var`-style jitter
    /// in the teacher's heuristic).
    pub fn pick<'a>(&mut self, candidates: &'a [BranchCandidate]) -> Option<&'a BranchCandidate> {
        if candidates.is_empty() {
            return None;
        }
        if self.rand.chance(self.settings.random_split_freq) {
            let idx = self.rand.irand(candidates.len());
            return Some(&candidates[idx]);
        }
        match self.settings.strategy {
            BranchingHeuristic::Topological => {
                candidates.iter().min_by_key(|c| c.topological_rank)
            }
            BranchingHeuristic::Polarity => candidates.iter().max_by(|a, b| {
                let score_a = self.activity.get(&a.constraint).copied().unwrap_or(0.0) + a.polarity_balance;
                let score_b = self.activity.get(&b.constraint).copied().unwrap_or(0.0) + b.polarity_balance;
                score_a.partial_cmp(&score_b).unwrap_or(std::cmp::Ordering::Equal)
            }),
            BranchingHeuristic::PseudoImpact => candidates
                .iter()
                .max_by(|a, b| a.pseudo_impact.partial_cmp(&b.pseudo_impact).unwrap_or(std::cmp::Ordering::Equal)),
            BranchingHeuristic::LargestInterval => candidates
                .iter()
                .max_by(|a, b| a.interval_width.partial_cmp(&b.interval_width).unwrap_or(std::cmp::Ordering::Equal)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(i: usize) -> ConstraintId {
        ConstraintId(i)
    }

    #[test]
    fn topological_picks_earliest_rank() {
        let mut h = DecisionHeuristic::new(DecisionHeuristicSettings {
            strategy: BranchingHeuristic::Topological,
            ..Default::default()
        });
        let candidates = vec![
            BranchCandidate { constraint: cid(0), topological_rank: 5, polarity_balance: 0.0, pseudo_impact: 0.0, interval_width: 0.0 },
            BranchCandidate { constraint: cid(1), topological_rank: 2, polarity_balance: 0.0, pseudo_impact: 0.0, interval_width: 0.0 },
        ];
        assert_eq!(h.pick(&candidates).unwrap().constraint, cid(1));
    }

    #[test]
    fn pseudo_impact_picks_largest_expected_reduction() {
        let mut h = DecisionHeuristic::new(DecisionHeuristicSettings {
            strategy: BranchingHeuristic::PseudoImpact,
            ..Default::default()
        });
        let candidates = vec![
            BranchCandidate { constraint: cid(0), topological_rank: 0, polarity_balance: 0.0, pseudo_impact: 0.3, interval_width: 0.0 },
            BranchCandidate { constraint: cid(1), topological_rank: 0, polarity_balance: 0.0, pseudo_impact: 0.9, interval_width: 0.0 },
        ];
        assert_eq!(h.pick(&candidates).unwrap().constraint, cid(1));
    }
}
