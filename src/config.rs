//! The enumerated configuration options from spec.md §6, collected into an
//! immutable struct threaded through the engine at construction -- the
//! REDESIGN FLAG in spec.md §9 replacing the original's global configuration
//! constants. Mirrors the teacher's own `minisat::Settings`
//! (struct-of-structs: `heur`, `db`, `ccmin_mode`, `restart`, `learnt`,
//! `core`).

use crate::core::pivot_rules::EntryRule;
use crate::core::search::decision_heuristic::BranchingHeuristic;

#[derive(Clone, Copy, Debug)]
pub struct EngineSettings {
    pub simplex_tolerance: f64,
    pub entry_rule: EntryRule,
    pub row_tightening_saturation_cap: u32,
    pub refactorization_eta_threshold: u32,
    pub degradation_threshold: f64,
    pub constraint_violation_split_threshold: u32,
    pub deep_soi_rejection_threshold: u32,
    pub restart_base: f64,
    pub branching_heuristic: BranchingHeuristic,
    pub produce_proofs: bool,
    pub timeout_seconds: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            simplex_tolerance: 1e-9,
            entry_rule: EntryRule::Dantzig,
            row_tightening_saturation_cap: 20,
            refactorization_eta_threshold: 100,
            degradation_threshold: 1e-2,
            constraint_violation_split_threshold: 20,
            deep_soi_rejection_threshold: 20,
            restart_base: 512.0,
            branching_heuristic: BranchingHeuristic::Polarity,
            produce_proofs: false,
            timeout_seconds: None,
        }
    }
}
