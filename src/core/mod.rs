//! The engine (spec.md §4.8): owns the bound manager, tableau, constraint
//! matrix, and piecewise-linear constraint set as siblings (none of them
//! hold a reference to another -- see `bound_manager.rs`'s note on why
//! watcher notification is dispatched by the owner instead of stored as a
//! callback), and drives the decision procedure's main loop: simplex to
//! LP-feasibility, bound tightening, sum-of-infeasibilities local search,
//! and case-split search over piecewise constraints.

pub mod basis_factorization;
pub mod bound_manager;
pub mod constraint_bound_tightener;
pub mod context;
pub mod cost_function_manager;
pub mod degradation;
pub mod numeric;
pub mod piecewise;
pub mod pivot_rules;
pub mod row_bound_tightener;
pub mod search;
pub mod soi;
pub mod sparse;
pub mod tableau;
pub mod variable;

use crate::config::EngineSettings;
use crate::core::bound_manager::BoundManager;
use crate::core::constraint_bound_tightener::ConstraintBoundTightener;
use crate::core::context::Context;
use crate::core::cost_function_manager::CostFunctionManager;
use crate::core::degradation::{self, DegradationChecker, DegradationOutcome, PrecisionRestorer};
use crate::core::piecewise::{Phase, PiecewiseKind};
use crate::core::pivot_rules::{self, Candidate, EntryRule};
use crate::core::row_bound_tightener::RowBoundTightener;
use crate::core::search::decision_heuristic::{BranchCandidate, DecisionHeuristicSettings};
use crate::core::search::{SearchDriver, SearchSettings};
use crate::core::soi::{SoiManager, SoiOutcome};
use crate::core::tableau::{ConstraintMatrix, NonBasicStatus, Tableau};
use crate::core::variable::{ConstraintId, ConstraintMap, Variable, VarMap};
use crate::error::{BoundKind, EngineError, EngineResult};
use crate::input::{self, InputProblem};

/// Simplex iterations, restarts, pivots and the like (spec.md §1's ambient
/// "Stats" note, parallel to the teacher's `sat::Stats`).
#[derive(Clone, Copy, Debug, Default)]
pub struct EngineStats {
    pub decisions: u64,
    pub conflicts: u64,
    pub pivots: u64,
    pub refactorizations: u64,
    pub restarts: u64,
    pub soi_attempts: u64,
}

/// How a `solve` call ended (spec.md §6). `Timeout`/`QuitRequested` are not
/// part of `EngineError` (see `error.rs`) since they carry no recovery step.
#[derive(Clone, Debug, PartialEq)]
pub enum Status {
    Sat,
    Unsat,
    Timeout,
    QuitRequested,
    Error(String),
}

#[derive(Clone, Debug)]
pub struct Solution {
    pub status: Status,
    pub assignment: Option<VarMap<f64>>,
    pub stats: EngineStats,
}

/// How many simplex iterations the degradation checker waits between
/// residual checks. Not one of `EngineSettings`'s tunables (spec.md §6
/// enumerates the configuration surface exhaustively and doesn't include
/// it); fixed here the way the teacher fixes small internal constants that
/// aren't meant to be user-facing knobs.
const DEGRADATION_CHECK_INTERVAL: u32 = 100;

pub struct Engine {
    settings: EngineSettings,
    context: Context,
    bound_manager: BoundManager,
    tableau: Tableau,
    matrix: ConstraintMatrix,
    constraints: ConstraintMap<PiecewiseKind>,
    constraint_order: Vec<ConstraintId>,
    cost_manager: CostFunctionManager,
    row_tightener: RowBoundTightener,
    constraint_tightener: ConstraintBoundTightener,
    degradation_checker: DegradationChecker,
    precision_restorer: PrecisionRestorer,
    search: SearchDriver,
    soi: SoiManager,
    stats: EngineStats,
}

impl Engine {
    pub fn new(problem: &InputProblem, settings: EngineSettings) -> EngineResult<Self> {
        let assembled = input::assemble(problem, settings.simplex_tolerance);

        let mut bound_manager = BoundManager::new(settings.simplex_tolerance);
        for i in 0..assembled.total_variables {
            let v = Variable::from_index(i);
            bound_manager.register_new_variable(assembled.lower_bounds[v], assembled.upper_bounds[v]);
        }

        let all_vars: Vec<Variable> = (0..assembled.total_variables).map(Variable::from_index).collect();
        let tableau = Tableau::new(
            &assembled.matrix,
            assembled.basic_vars,
            &all_vars,
            assembled.lower_bounds.as_slice(),
            assembled.upper_bounds.as_slice(),
            settings.simplex_tolerance,
            settings.refactorization_eta_threshold,
        )?;

        let mut constraints: ConstraintMap<PiecewiseKind> = ConstraintMap::new();
        let mut constraint_order = Vec::with_capacity(assembled.piecewise.len());
        for constraint in assembled.piecewise {
            let id = constraint.id();
            constraint_order.push(id);
            constraints.insert(&id, constraint);
        }

        let mut search = SearchDriver::new(SearchSettings {
            decision_heuristic: DecisionHeuristicSettings { strategy: settings.branching_heuristic, ..Default::default() },
            restart_base: settings.restart_base,
            timeout_seconds: settings.timeout_seconds.unwrap_or(0),
        });
        for &id in &constraint_order {
            search.register_constraint(id);
        }

        if settings.produce_proofs {
            log::debug!("produce_proofs is set but proof emission is an external collaborator's job here; ignoring");
        }

        let mut precision_restorer = PrecisionRestorer::new();
        precision_restorer.capture(&tableau);

        let mut engine = Engine {
            settings,
            context: Context::new(),
            bound_manager,
            tableau,
            matrix: assembled.matrix,
            constraints,
            constraint_order,
            cost_manager: CostFunctionManager::new(),
            row_tightener: RowBoundTightener::new(settings.row_tightening_saturation_cap),
            constraint_tightener: ConstraintBoundTightener::new(),
            degradation_checker: DegradationChecker::new(settings.degradation_threshold, DEGRADATION_CHECK_INTERVAL),
            precision_restorer,
            search,
            soi: SoiManager::new(settings.deep_soi_rejection_threshold, 91648253.0),
            stats: EngineStats::default(),
        };

        engine.seed_constraint_bounds()?;
        Ok(engine)
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Notifies every constraint of the bounds it starts with, so a
    /// constraint whose phase is already implied by the input's own bounds
    /// (e.g. a ReLU whose `b` is bounded below by zero) is fixed before the
    /// first simplex round rather than only after its first observed
    /// tightening.
    fn seed_constraint_bounds(&mut self) -> EngineResult<()> {
        let order = self.constraint_order.clone();
        for id in order {
            let vars: Vec<Variable> =
                self.constraints.get(&id).map(|c| c.participating_variables().to_vec()).unwrap_or_default();
            for v in vars {
                let (lb, ub) = (self.bound_manager.lb(v), self.bound_manager.ub(v));
                if let Some(c) = self.constraints.get_mut(&id) {
                    c.notify_lower_bound(v, lb);
                    c.notify_upper_bound(v, ub);
                    self.constraint_tightener.enqueue_all(c.entailed_tightenings());
                }
            }
        }
        self.propagate(None)
    }

    /// Drains the bound manager's tightening queue, dispatches each one to
    /// every participating constraint, collects whatever those constraints
    /// in turn entail, and flushes that into the bound manager -- repeating
    /// until a fixed point, so one call leaves every derivable bound fully
    /// propagated (spec.md §5's "complete before return" guarantee).
    ///
    /// `decided` is the constraint a case split was just applied for, if
    /// any -- its own phase fixing is already on the trail as a decision
    /// (`record_decision`), so it's excluded from being re-recorded here as
    /// an implication. Every other constraint whose phase becomes fixed as
    /// a side effect of this propagation genuinely is one.
    fn propagate(&mut self, decided: Option<ConstraintId>) -> EngineResult<()> {
        let order = self.constraint_order.clone();
        loop {
            let drained = self.bound_manager.drain_tightenings();
            if drained.is_empty() && !self.constraint_tightener.has_pending() {
                break;
            }
            for t in &drained {
                for &id in &order {
                    let participates =
                        self.constraints.get(&id).map(|c| c.participating_variables().contains(&t.variable)).unwrap_or(false);
                    if !participates {
                        continue;
                    }
                    let was_fixed = self.constraints.get(&id).map(|c| c.phase_fixed().is_some()).unwrap_or(true);
                    if let Some(c) = self.constraints.get_mut(&id) {
                        match t.kind {
                            BoundKind::Lower => c.notify_lower_bound(t.variable, t.value),
                            BoundKind::Upper => c.notify_upper_bound(t.variable, t.value),
                        }
                        self.constraint_tightener.enqueue_all(c.entailed_tightenings());
                    }
                    if !was_fixed && Some(id) != decided {
                        if let Some(phase) = self.constraints.get(&id).and_then(|c| c.phase_fixed()) {
                            self.search.record_implication(id, phase);
                        }
                    }
                }
            }
            self.constraint_tightener.flush(&mut self.bound_manager)?;
        }
        Ok(())
    }

    fn tighten_bounds(&mut self, decided: Option<ConstraintId>) -> EngineResult<()> {
        self.row_tightener.saturate(&self.tableau, &self.matrix, &mut self.bound_manager)?;
        self.propagate(decided)
    }

    fn push_context(&mut self) {
        self.context.push();
        self.bound_manager.push();
        let order = self.constraint_order.clone();
        for id in order {
            if let Some(c) = self.constraints.get_mut(&id) {
                c.push_context();
            }
        }
    }

    fn pop_context(&mut self) {
        self.context.pop();
        self.bound_manager.pop();
        let order = self.constraint_order.clone();
        for id in order {
            if let Some(c) = self.constraints.get_mut(&id) {
                c.pop_context();
            }
        }
    }

    /// Drives the revised simplex method to LP-feasibility (spec.md §4.3):
    /// repeatedly pick an entering variable whose reduced cost can still
    /// improve the Phase-1 objective, ratio-test for the leaving variable,
    /// and pivot. Returns `Ok(true)` once every basic variable is within its
    /// bounds, `Ok(false)` if no entering candidate remains while the
    /// objective is still strictly positive (LP-infeasible in the current
    /// context).
    fn run_simplex(&mut self) -> EngineResult<bool> {
        let tol = self.settings.simplex_tolerance;
        let max_iterations = 10_000usize.max(50 * self.tableau.num_vars().max(1));

        for _ in 0..max_iterations {
            if !self.search.budget().within() {
                return Ok(true);
            }

            self.cost_manager.recompute(&self.tableau, &self.matrix, &self.bound_manager);
            let objective = self.cost_manager.phase1_objective(&self.tableau, &self.bound_manager);
            if numeric::is_zero(objective, tol) {
                return Ok(true);
            }

            let mut candidates = Vec::new();
            for &v in self.tableau.nonbasic_vars() {
                if numeric::are_equal(self.bound_manager.lb(v), self.bound_manager.ub(v), tol) {
                    continue;
                }
                let z = self.cost_manager.reduced_cost(v);
                let eligible = match self.tableau.nonbasic_status(v) {
                    NonBasicStatus::AtLower => numeric::is_negative(z, tol),
                    NonBasicStatus::AtUpper => numeric::is_positive(z, tol),
                };
                if !eligible {
                    continue;
                }
                let direction = self.tableau.forward_transform(&self.matrix.columns[v]);
                let column_norm = direction.iter().map(|d| d * d).sum();
                candidates.push(Candidate { variable: v, reduced_cost: z, column_norm });
            }

            let entering = match pivot_rules::select(self.settings.entry_rule, &candidates, tol) {
                Some(v) => v,
                None => match pivot_rules::select(EntryRule::Bland, &candidates, tol) {
                    Some(v) => v,
                    None => return Ok(false),
                },
            };

            let sign = match self.tableau.nonbasic_status(entering) {
                NonBasicStatus::AtLower => 1.0,
                NonBasicStatus::AtUpper => -1.0,
            };

            match self.apply_ratio_test(entering, sign, tol)? {
                true => {}
                false => return Ok(false),
            }

            if self.degradation_checker.tick() {
                let residual = self.tableau.residual_infinity_norm(&self.matrix);
                if self.degradation_checker.residual_is_degraded(residual) {
                    let outcome = degradation::handle_degradation(
                        &mut self.degradation_checker,
                        &self.precision_restorer,
                        &mut self.tableau,
                        &self.matrix,
                    )?;
                    if outcome == DegradationOutcome::Restored {
                        self.stats.refactorizations += 1;
                    }
                } else {
                    self.degradation_checker.record_good_residual(residual);
                }
            }
        }

        Err(EngineError::InvariantViolation {
            description: "simplex did not terminate within the iteration cap".to_string(),
        })
    }

    /// Ratio-tests `entering` (moving in direction `sign`) and applies
    /// whichever candidate binds tightest: a pivot against a basic
    /// variable's bound, or a bound flip against the entering variable's
    /// own opposite bound (spec.md §4.3 step 4). Returns `Ok(false)` if the
    /// problem is unbounded in this direction -- no candidate binds at all.
    ///
    /// A pivot whose element is numerically unstable (`MalformedBasis`) is
    /// retried through the ladder spec.md §4.3 step 6 calls for: first
    /// against an alternate row (excluding the one that just failed), then
    /// after a refactorization, then after a full precision restore; still
    /// unstable after all three escalations is a genuine error.
    fn apply_ratio_test(&mut self, entering: Variable, sign: f64, tol: f64) -> EngineResult<bool> {
        let entering_lb = self.bound_manager.lb(entering);
        let entering_ub = self.bound_manager.ub(entering);
        let entering_range =
            if entering_lb.is_finite() && entering_ub.is_finite() { entering_ub - entering_lb } else { f64::INFINITY };

        let mut excluded_rows: Vec<usize> = Vec::new();
        for stage in 0..4u32 {
            match stage {
                2 => {
                    self.tableau.refactorize(&self.matrix)?;
                    self.stats.refactorizations += 1;
                    excluded_rows.clear();
                }
                3 => {
                    if !self.precision_restorer.has_snapshot() {
                        return Err(EngineError::MalformedBasis {
                            reason: "pivot element unstable and no clean snapshot to restore".to_string(),
                        });
                    }
                    self.precision_restorer.restore(&mut self.tableau, &self.matrix)?;
                    self.stats.refactorizations += 1;
                    // The restored partition may no longer have `entering`
                    // non-basic; let the next simplex iteration re-derive
                    // its own candidates rather than act on a stale one.
                    if self.tableau.is_basic(entering) {
                        return Ok(true);
                    }
                    excluded_rows.clear();
                }
                _ => {}
            }

            let direction = self.tableau.forward_transform(&self.matrix.columns[entering]);
            let basic_values: Vec<f64> = self.tableau.basic_vars().iter().map(|&v| self.tableau.assignment_of(v)).collect();
            let basic_lower: Vec<f64> = self.tableau.basic_vars().iter().map(|&v| self.bound_manager.lb(v)).collect();
            let basic_upper: Vec<f64> = self.tableau.basic_vars().iter().map(|&v| self.bound_manager.ub(v)).collect();

            let hit = pivot_rules::ratio_test(
                &direction, sign, &basic_values, &basic_lower, &basic_upper, entering_range, &excluded_rows, tol,
            );
            let (leaving, limit) = match hit {
                Some(h) => h,
                None => return Ok(false),
            };
            let step = sign * limit;

            match leaving {
                pivot_rules::LeavingVariable::Entering => {
                    let new_value = self.tableau.assignment_of(entering) + step;
                    let status = match self.tableau.nonbasic_status(entering) {
                        NonBasicStatus::AtLower => NonBasicStatus::AtUpper,
                        NonBasicStatus::AtUpper => NonBasicStatus::AtLower,
                    };
                    self.tableau.flip_nonbasic_bound(entering, new_value, status, &direction, step);
                    return Ok(true);
                }
                pivot_rules::LeavingVariable::Basic(row) => {
                    let leaving_var = self.tableau.basic_vars()[row];
                    let coeff = direction[row] * sign;
                    let leaving_status = if coeff > 0.0 { NonBasicStatus::AtLower } else { NonBasicStatus::AtUpper };
                    match self.tableau.pivot(entering, leaving_var, leaving_status, &direction, step, &self.matrix) {
                        Ok(()) => {
                            self.stats.pivots += 1;
                            self.cost_manager.invalidate();
                            return Ok(true);
                        }
                        Err(EngineError::MalformedBasis { .. }) if stage < 3 => {
                            excluded_rows.push(row);
                            continue;
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        Err(EngineError::MalformedBasis {
            reason: "pivot element stayed unstable after an alternate pivot, refactorization, and precision restore"
                .to_string(),
        })
    }

    fn run_soi(&mut self) {
        let active_ids: Vec<ConstraintId> = self
            .constraint_order
            .iter()
            .copied()
            .filter(|id| self.constraints.get(id).map(|c| c.active()).unwrap_or(false))
            .collect();

        loop {
            if !self.search.budget().within() {
                return;
            }
            self.stats.soi_attempts += 1;
            let tableau = &self.tableau;
            let assignment = |v: Variable| tableau.assignment_of(v);
            let outcome = self.soi.step(&mut self.constraints, &active_ids, &assignment, self.settings.simplex_tolerance);
            match outcome {
                SoiOutcome::Progress => continue,
                SoiOutcome::AllSatisfied | SoiOutcome::Surrender | SoiOutcome::Stuck => return,
            }
        }
    }

    fn all_constraints_satisfied(&self) -> bool {
        let tableau = &self.tableau;
        let assignment = |v: Variable| tableau.assignment_of(v);
        self.constraint_order.iter().all(|id| {
            self.constraints
                .get(id)
                .map(|c| !c.active() || c.satisfied(&assignment, self.settings.simplex_tolerance))
                .unwrap_or(true)
        })
    }

    /// Picks a violated active constraint to split on (spec.md §4.8,
    /// "Picking the split") and applies its next feasible phase. Returns
    /// `Ok(false)` if no violated constraint remains but
    /// `all_constraints_satisfied` already said otherwise, or if the chosen
    /// constraint has no feasible phase left -- both are conflicts at the
    /// current level rather than a true decision. `Ok(Some(status))` means
    /// the search ended while deciding (always `Unsat`, routed through
    /// `resolve_conflict` the same as every other conflict source);
    /// `Ok(None)` covers both "made a decision, keep looping" and
    /// "backtracked, keep looping" -- the caller can't tell the two apart
    /// and doesn't need to, since either way the main loop just retries.
    fn decide_and_split(&mut self) -> EngineResult<Option<Status>> {
        let tol = self.settings.simplex_tolerance;
        let tableau = &self.tableau;
        let assignment = |v: Variable| tableau.assignment_of(v);

        let mut candidates = Vec::new();
        for (rank, &id) in self.constraint_order.iter().enumerate() {
            let c = match self.constraints.get(&id) {
                Some(c) => c,
                None => continue,
            };
            if !c.active() || c.satisfied(&assignment, tol) {
                continue;
            }
            let interval_width = c
                .participating_variables()
                .iter()
                .map(|&v| self.bound_manager.ub(v) - self.bound_manager.lb(v))
                .filter(|w| w.is_finite())
                .fold(0.0_f64, f64::max);
            candidates.push(BranchCandidate {
                constraint: id,
                topological_rank: rank,
                polarity_balance: 0.0,
                pseudo_impact: self.soi.pseudo_impact(id),
                interval_width,
            });
        }

        if candidates.is_empty() {
            return self.resolve_conflict();
        }

        let chosen = match self.search.decide(&candidates) {
            Some(c) => c.constraint,
            None => return self.resolve_conflict(),
        };

        let phase = match self.constraints.get(&chosen).and_then(|c| c.next_feasible_case()) {
            Some(p) => p,
            None => return self.resolve_conflict(),
        };

        self.push_context();
        self.search.record_decision(chosen, phase);
        self.stats.decisions += 1;
        match self.apply_split(chosen, phase) {
            Ok(()) => Ok(None),
            Err(EngineError::Infeasibility { .. }) => self.resolve_conflict(),
            Err(e) => Err(e),
        }
    }

    fn apply_split(&mut self, id: ConstraintId, phase: Phase) -> EngineResult<()> {
        let tightenings = self
            .constraints
            .get(&id)
            .map(|c| c.case_splits().into_iter().find(|s| s.phase == phase).map(|s| s.tightenings).unwrap_or_default())
            .unwrap_or_default();
        for t in tightenings {
            match t.kind {
                BoundKind::Lower => {
                    self.bound_manager.tighten_lower(t.variable, t.value)?;
                }
                BoundKind::Upper => {
                    self.bound_manager.tighten_upper(t.variable, t.value)?;
                }
            }
        }
        self.tighten_bounds(Some(id))
    }

    /// Analyzes the conflict, backjumps exactly one level (see DESIGN.md,
    /// "single-level backjump"), and marks the blamed constraint's phase
    /// infeasible *at the level backjumped to* -- since that mark happens
    /// after `pop_context`, it survives the backjump and is what stands in
    /// here for replaying an asserted implication above the popped level
    /// (see DESIGN.md, "implication replay under single-level backjump").
    fn backtrack_on_conflict(&mut self) -> EngineResult<()> {
        let resolution = self.search.on_conflict().ok_or_else(|| EngineError::InvariantViolation {
            description: "conflict at root level should have returned Unsat before backtracking".to_string(),
        })?;
        self.stats.conflicts += 1;
        self.pop_context();
        if let Some(c) = self.constraints.get_mut(&resolution.blamed) {
            c.mark_infeasible(resolution.blamed_phase);
        }
        if resolution.restart_due {
            self.stats.restarts += 1;
        }
        self.tighten_bounds(None)
    }

    fn current_assignment(&self) -> VarMap<f64> {
        let mut out = VarMap::new();
        for i in 0..self.tableau.num_vars() {
            let v = Variable::from_index(i);
            out.insert(&v, self.tableau.assignment_of(v));
        }
        out
    }

    /// The main loop (spec.md §4.8): simplex to LP-feasibility, tighten
    /// bounds, run SoI, check every piecewise constraint, and either return
    /// SAT or split. LP-infeasibility and a stuck SoI/split both funnel
    /// through conflict analysis, which returns UNSAT once the trail is
    /// empty.
    pub fn solve(&mut self) -> Status {
        loop {
            if self.search.budget().timed_out() {
                return Status::Timeout;
            }
            if self.search.budget().quit_requested() {
                return Status::QuitRequested;
            }

            match self.run_simplex() {
                Ok(true) => {}
                Ok(false) => match self.resolve_conflict() {
                    Ok(Some(status)) => return status,
                    Ok(None) => continue,
                    Err(e) => return Status::Error(e.to_string()),
                },
                Err(e) => return Status::Error(e.to_string()),
            }

            if let Err(e) = self.tighten_bounds(None) {
                match e {
                    EngineError::Infeasibility { .. } => match self.resolve_conflict() {
                        Ok(Some(status)) => return status,
                        Ok(None) => continue,
                        Err(e2) => return Status::Error(e2.to_string()),
                    },
                    other => return Status::Error(other.to_string()),
                }
            }

            self.run_soi();

            if self.all_constraints_satisfied() {
                return Status::Sat;
            }

            match self.decide_and_split() {
                Ok(None) => continue,
                Ok(Some(status)) => return status,
                Err(e) => return Status::Error(e.to_string()),
            }
        }
    }

    /// `Ok(Some(status))` means the search is over (always `Unsat` here);
    /// `Ok(None)` means backtracking succeeded and the caller should retry
    /// the main loop. An ordinary case-split tightening crossing an
    /// existing bound raises `Infeasibility` out of `backtrack_on_conflict`
    /// itself (the tightening it replays to reach the backjumped-to level
    /// can conflict just as well as the one that got us here) -- that's
    /// still just another conflict at whatever level we backtracked to, so
    /// it loops back into conflict analysis rather than surfacing as an
    /// error.
    fn resolve_conflict(&mut self) -> EngineResult<Option<Status>> {
        loop {
            if self.context.is_ground() {
                return Ok(Some(Status::Unsat));
            }
            match self.backtrack_on_conflict() {
                Ok(()) => return Ok(None),
                Err(EngineError::Infeasibility { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

pub fn solve(problem: &InputProblem, settings: EngineSettings) -> Solution {
    let mut engine = match Engine::new(problem, settings) {
        Ok(e) => e,
        // The input's own bounds already conflict before any decision was
        // made -- the ground-level case of spec.md §8's "a tightening that
        // crosses a ground bound yields UNSAT immediately", reached here
        // because seeding runs inside `Engine::new` rather than the search
        // loop.
        Err(EngineError::Infeasibility { .. }) => {
            return Solution { status: Status::Unsat, assignment: None, stats: EngineStats::default() }
        }
        Err(e) => return Solution { status: Status::Error(e.to_string()), assignment: None, stats: EngineStats::default() },
    };
    let status = engine.solve();
    let assignment = if status == Status::Sat { Some(engine.current_assignment()) } else { None };
    let stats = engine.stats();
    Solution { status, assignment, stats }
}
