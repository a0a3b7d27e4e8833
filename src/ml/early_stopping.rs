// ============================================================
// Layer 5 — Early Stopping
// ============================================================
// Lower validation loss is better.
//
//   update = value < best
//   update → best = value, cur_step = 0
//   else   → cur_step += 1
//   stop   = cur_step >= max_step
//
// Example (max_step = 2, best starts at 1e9):
//
//   value   3.0  2.0  2.5  2.4  ...
//   best    3.0  2.0  2.0  2.0
//   step    0    0    1    2
//   stop    -    -    -    yes

/// Initial best score: larger than any real loss.
pub const INITIAL_BEST_SCORE: f64 = 1e9;

/// Outcome of one evaluation under the early-stopping policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarlyStopDecision {
    pub best_valid_score: f64,
    pub cur_step:         usize,
    pub stop_flag:        bool,
    pub update_flag:      bool,
}

/// Apply the early-stopping policy to a new validation score.
pub fn early_stopping(value: f64, best: f64, cur_step: usize, max_step: usize) -> EarlyStopDecision {
    let update_flag = value < best;
    let (best_valid_score, cur_step) = if update_flag {
        (value, 0)
    } else {
        (best, cur_step + 1)
    };

    EarlyStopDecision {
        best_valid_score,
        cur_step,
        stop_flag: cur_step >= max_step,
        update_flag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(values: &[f64], max_step: usize) -> Vec<EarlyStopDecision> {
        let mut best = INITIAL_BEST_SCORE;
        let mut step = 0;
        values
            .iter()
            .map(|&v| {
                let d = early_stopping(v, best, step, max_step);
                best = d.best_valid_score;
                step = d.cur_step;
                d
            })
            .collect()
    }

    #[test]
    fn test_strictly_improving_never_stops() {
        let decisions = run(&[5.0, 4.0, 3.0, 2.0, 1.0], 1);
        assert!(decisions.iter().all(|d| d.update_flag && d.cur_step == 0 && !d.stop_flag));
        assert_eq!(decisions.last().unwrap().best_valid_score, 1.0);
    }

    #[test]
    fn test_flat_sequence_stops_after_max_step() {
        let decisions = run(&[2.0, 2.0, 2.0, 2.0], 3);
        let stops: Vec<bool> = decisions.iter().map(|d| d.stop_flag).collect();
        assert_eq!(stops, vec![false, false, false, true]);
        assert_eq!(decisions[3].cur_step, 3);
        assert_eq!(decisions[3].best_valid_score, 2.0);
    }

    #[test]
    fn test_worsening_keeps_minimum() {
        let decisions = run(&[3.0, 2.0, 2.5, 2.4], 2);
        let last = decisions.last().unwrap();
        assert!(last.stop_flag);
        assert_eq!(last.best_valid_score, 2.0);
        assert_eq!(last.cur_step, 2);
    }

    #[test]
    fn test_improvement_resets_counter() {
        let decisions = run(&[3.0, 3.5, 2.0], 5);
        assert_eq!(decisions[1].cur_step, 1);
        assert_eq!(decisions[2].cur_step, 0);
        assert!(decisions[2].update_flag);
    }

    #[test]
    fn test_equal_score_is_not_an_improvement() {
        let d = early_stopping(1.0, 1.0, 0, 10);
        assert!(!d.update_flag);
        assert_eq!(d.cur_step, 1);
    }

    #[test]
    fn test_nan_counts_as_no_improvement() {
        let d = early_stopping(f64::NAN, 1.0, 0, 1);
        assert!(!d.update_flag);
        assert!(d.stop_flag);
        assert_eq!(d.best_valid_score, 1.0);
    }
}
