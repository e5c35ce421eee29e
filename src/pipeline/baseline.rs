// ECG Sentinel — Baseline Estimator
//
// Moving average over the last BASELINE_WINDOW raw samples, used to strip
// the DC offset and wander from the ECG.

use crate::config::BASELINE_WINDOW;
use crate::ring::RingBuffer;

#[derive(Debug, Clone)]
pub struct BaselineEstimator {
    window: RingBuffer<i32, BASELINE_WINDOW>,
    sum: i64, // always equals the sum of `window`
    baseline: i32,
}

impl BaselineEstimator {
    /// Start with the whole window pre-filled with `seed`.
    pub fn new(seed: i32) -> Self {
        Self {
            window: RingBuffer::filled(seed),
            sum: seed as i64 * BASELINE_WINDOW as i64,
            baseline: seed,
        }
    }

    /// Refill the window with `seed` so the baseline does not jump.
    pub fn reset(&mut self, seed: i32) {
        *self = Self::new(seed);
    }

    /// Fold in one raw sample and return the new baseline.
    pub fn update(&mut self, raw: i32) -> i32 {
        let oldest = self.window.push(raw).unwrap_or(0);
        self.sum += raw as i64 - oldest as i64;
        self.baseline = (self.sum / BASELINE_WINDOW as i64) as i32;
        self.baseline
    }

    pub fn baseline(&self) -> i32 {
        self.baseline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn seeded_window_reports_seed() {
        let mut est = BaselineEstimator::new(2000);
        assert_eq!(est.baseline(), 2000);
        assert_eq!(est.update(2000), 2000);
    }

    #[test]
    fn single_outlier_moves_baseline_by_one_sixty_fourth() {
        let mut est = BaselineEstimator::new(1000);
        assert_eq!(est.update(1000 + 640), 1010);
    }

    #[test]
    fn reset_reseeds() {
        let mut est = BaselineEstimator::new(100);
        for _ in 0..10 {
            est.update(4000);
        }
        est.reset(3000);
        assert_eq!(est.baseline(), 3000);
        assert_eq!(est.update(3000), 3000);
    }

    proptest! {
        #[test]
        fn baseline_is_mean_of_last_window(
            seed in 0i32..=4095,
            samples in prop::collection::vec(0i32..=4095, 0..300),
        ) {
            let mut est = BaselineEstimator::new(seed);
            let mut history = vec![seed; BASELINE_WINDOW];
            for &s in &samples {
                history.push(s);
                let got = est.update(s);
                let tail = &history[history.len() - BASELINE_WINDOW..];
                let expected = tail.iter().map(|&v| v as i64).sum::<i64>() / BASELINE_WINDOW as i64;
                prop_assert_eq!(got as i64, expected);
            }
        }
    }
}
