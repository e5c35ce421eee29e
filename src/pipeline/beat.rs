// ECG Sentinel — Beat Detection
//
// `BeatDetector` is the capability the pipeline consumes; the ECG strategy
// lives here, the pulse-sensor strategy in `ppg.rs`.

use crate::config::SignalConfig;
use crate::pipeline::baseline::BaselineEstimator;
use crate::pipeline::envelope::EnvelopeTracker;

/// What a detector reports for one processed sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Detection {
    /// Conditioned signal value (ECG: baseline-removed `hp`; PPG: raw).
    pub signal: i32,
    pub threshold: f32,
    /// RR interval ending at this sample, if a beat was confirmed and a
    /// previous beat exists.
    pub rr_ms: Option<u32>,
}

pub trait BeatDetector {
    fn process(&mut self, raw: i32, now_ms: u32) -> Detection;

    /// Current beat threshold in the units of `Detection::signal`.
    fn threshold(&self) -> f32;

    /// Forget all beat history and re-seed signal conditioning with `seed`.
    fn reset(&mut self, seed: i32);
}

// ---------------------------------------------------------------------------
// Rising-edge trigger with refractory gate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RisingEdgeTrigger {
    refractory_ms: u32,
    prev_above: bool,
    last_beat_ms: Option<u32>,
}

impl RisingEdgeTrigger {
    pub fn new(refractory_ms: u32) -> Self {
        Self {
            refractory_ms,
            prev_above: false,
            last_beat_ms: None,
        }
    }

    /// Returns the RR interval when a beat is confirmed on this sample.
    pub fn update(&mut self, hp: i32, threshold: f32, now_ms: u32) -> Option<u32> {
        let above = hp as f32 > threshold;
        let rising = above && !self.prev_above;
        self.prev_above = above;

        if !rising {
            return None;
        }
        match self.last_beat_ms {
            None => {
                self.last_beat_ms = Some(now_ms);
                None
            }
            Some(last) => {
                let ibi = now_ms.wrapping_sub(last);
                if ibi > self.refractory_ms {
                    self.last_beat_ms = Some(now_ms);
                    Some(ibi)
                } else {
                    None
                }
            }
        }
    }

    pub fn last_beat_ms(&self) -> Option<u32> {
        self.last_beat_ms
    }

    pub fn reset(&mut self) {
        self.prev_above = false;
        self.last_beat_ms = None;
    }
}

// ---------------------------------------------------------------------------
// ECG strategy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EcgDetector {
    baseline: BaselineEstimator,
    envelope: EnvelopeTracker,
    trigger: RisingEdgeTrigger,
}

impl EcgDetector {
    pub fn new(cfg: &SignalConfig, seed: i32) -> Self {
        Self {
            baseline: BaselineEstimator::new(seed),
            envelope: EnvelopeTracker::new(cfg),
            trigger: RisingEdgeTrigger::new(cfg.refractory_ms),
        }
    }

    pub fn baseline(&self) -> i32 {
        self.baseline.baseline()
    }

    pub fn envelope(&self) -> f32 {
        self.envelope.envelope()
    }
}

impl BeatDetector for EcgDetector {
    fn process(&mut self, raw: i32, now_ms: u32) -> Detection {
        let baseline = self.baseline.update(raw);
        let (hp, threshold) = self.envelope.update(raw, baseline);
        let rr_ms = self.trigger.update(hp, threshold, now_ms);
        Detection {
            signal: hp,
            threshold,
            rr_ms,
        }
    }

    fn threshold(&self) -> f32 {
        self.envelope.threshold()
    }

    fn reset(&mut self, seed: i32) {
        self.baseline.reset(seed);
        self.envelope.reset();
        self.trigger.reset();
    }
}
