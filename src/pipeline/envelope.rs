// ECG Sentinel — Envelope & Threshold Unit
//
// Tracks the smoothed magnitude of the baseline-removed signal and derives
// an amplitude-normalised beat threshold from it.

use crate::config::SignalConfig;

#[derive(Debug, Clone)]
pub struct EnvelopeTracker {
    alpha: f32,
    scale: f32,
    floor: f32,
    envelope: f32,
}

impl EnvelopeTracker {
    pub fn new(cfg: &SignalConfig) -> Self {
        Self {
            alpha: cfg.envelope_alpha,
            scale: cfg.threshold_scale,
            floor: cfg.min_threshold,
            envelope: 0.0,
        }
    }

    /// Returns `(hp, threshold)` for this sample.
    pub fn update(&mut self, raw: i32, baseline: i32) -> (i32, f32) {
        let hp = raw - baseline;
        let rectified = hp.unsigned_abs() as f32;
        self.envelope += self.alpha * (rectified - self.envelope);
        (hp, self.threshold())
    }

    pub fn threshold(&self) -> f32 {
        self.floor.max(self.envelope * self.scale)
    }

    pub fn envelope(&self) -> f32 {
        self.envelope
    }

    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn threshold_has_a_floor() {
        let mut env = EnvelopeTracker::new(&SignalConfig::default());
        let (hp, thr) = env.update(2050, 2048);
        assert_eq!(hp, 2);
        assert_eq!(thr, 8.0);
    }

    #[test]
    fn converges_towards_constant_amplitude() {
        let mut env = EnvelopeTracker::new(&SignalConfig::default());
        for _ in 0..500 {
            env.update(1100, 1000);
        }
        assert!((env.envelope() - 100.0).abs() < 0.1);
        assert!((env.threshold() - 60.0).abs() < 0.1);
    }

    #[test]
    fn reset_zeroes_envelope() {
        let mut env = EnvelopeTracker::new(&SignalConfig::default());
        env.update(3000, 1000);
        env.reset();
        assert_eq!(env.envelope(), 0.0);
    }

    proptest! {
        #[test]
        fn envelope_bounded_by_peak_magnitude(
            hps in prop::collection::vec(-2048i32..=2047, 1..400)
        ) {
            let mut env = EnvelopeTracker::new(&SignalConfig::default());
            let mut peak = 0f32;
            for &hp in &hps {
                peak = peak.max(hp.unsigned_abs() as f32);
                env.update(hp, 0);
                prop_assert!(env.envelope() >= 0.0);
                prop_assert!(env.envelope() <= peak + 1e-3);
            }
        }
    }
}
