//! Resource limits for the search driver (spec.md §4.8, "Termination"):
//! a wall-clock deadline plus an externally-settable quit flag, checked
//! between search steps so a caller on another thread can cancel a run in
//! progress.
//!
//! Generalizes the teacher's `minisat::budget::Budget`, which tracked
//! conflict/propagation counts against `i64` limits (`-1` meaning
//! unbounded) plus an `AtomicBool` interrupt flag. This engine's
//! termination condition is wall-clock time (spec.md §6,
//! `timeoutSeconds`), so the counters are replaced with an
//! `Instant`-based deadline; the interrupt flag is carried over as-is.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

pub struct Budget {
    deadline: Option<Instant>,
    quit_requested: AtomicBool,
}

impl Budget {
    pub fn new() -> Self {
        Budget { deadline: None, quit_requested: AtomicBool::new(false) }
    }

    pub fn with_timeout_seconds(seconds: u64) -> Self {
        let deadline = if seconds == 0 { None } else { Some(Instant::now() + Duration::from_secs(seconds)) };
        Budget { deadline, quit_requested: AtomicBool::new(false) }
    }

    /// `true` while the search is still allowed to keep running.
    pub fn within(&self) -> bool {
        if self.quit_requested.load(Ordering::Relaxed) {
            return false;
        }
        match self.deadline {
            Some(d) => Instant::now() < d,
            None => true,
        }
    }

    pub fn timed_out(&self) -> bool {
        match self.deadline {
            Some(d) => Instant::now() >= d,
            None => false,
        }
    }

    pub fn request_quit(&self) {
        self.quit_requested.store(true, Ordering::Relaxed);
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested.load(Ordering::Relaxed)
    }

    pub fn off(&mut self) {
        self.deadline = None;
        self.quit_requested.store(false, Ordering::Relaxed);
    }
}

impl Default for Budget {
    fn default() -> Self {
        Budget::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_budget_never_times_out() {
        let budget = Budget::new();
        assert!(budget.within());
        assert!(!budget.timed_out());
    }

    #[test]
    fn zero_second_timeout_means_unbounded() {
        let budget = Budget::with_timeout_seconds(0);
        assert!(budget.within());
    }

    #[test]
    fn request_quit_stops_the_budget() {
        let budget = Budget::new();
        budget.request_quit();
        assert!(!budget.within());
        assert!(budget.quit_requested());
    }

    #[test]
    fn expired_deadline_is_not_within_budget() {
        let budget = Budget { deadline: Some(Instant::now() - Duration::from_secs(1)), quit_requested: AtomicBool::new(false) };
        assert!(!budget.within());
        assert!(budget.timed_out());
    }
}
