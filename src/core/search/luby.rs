//! The Luby restart sequence (spec.md §4.8, "Restarts"), carried over
//! verbatim from the teacher's `minisat::search::util::luby`.

/// Returns `base^seq`, where `seq` is the index of the finite subsequence
/// containing `x` in the Luby sequence 1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 4, 8, ...
pub fn luby(base: f64, mut x: u32) -> f64 {
    let mut size = 1;
    let mut seq = 0;

    while size < x + 1 {
        seq += 1;
        size = 2 * size + 1;
    }

    while size - 1 != x {
        size = (size - 1) >> 1;
        seq -= 1;
        x %= size;
    }

    base.powi(seq)
}

/// Tracks when the next restart is due: a running conflict count compared
/// against `restart_base * luby(restart_base, restart_index)`.
pub struct RestartSchedule {
    base: f64,
    index: u32,
    conflicts_since_restart: u64,
}

impl RestartSchedule {
    pub fn new(base: f64) -> Self {
        RestartSchedule { base, index: 0, conflicts_since_restart: 0 }
    }

    pub fn on_conflict(&mut self) -> bool {
        self.conflicts_since_restart += 1;
        let threshold = self.base * luby(2.0, self.index);
        if (self.conflicts_since_restart as f64) >= threshold {
            self.conflicts_since_restart = 0;
            self.index += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luby_matches_known_prefix() {
        let seq: Vec<f64> = (0..7).map(|i| luby(2.0, i)).collect();
        assert_eq!(seq, vec![1.0, 1.0, 2.0, 1.0, 1.0, 2.0, 4.0]);
    }

    #[test]
    fn restart_schedule_fires_eventually() {
        let mut schedule = RestartSchedule::new(1.0);
        let mut fired = false;
        for _ in 0..10 {
            if schedule.on_conflict() {
                fired = true;
                break;
            }
        }
        assert!(fired);
    }
}
