// ECG Sentinel — Pulse-Sensor (PPG) Beat Detection
//
// Peak/trough adaptive threshold for an optical pulse sensor. The sensor is
// evaluated at its own slower rate; ticks in between return the last state.

use crate::config::{PpgConfig, ADC_MID_SCALE};
use crate::pipeline::beat::{BeatDetector, Detection};

#[derive(Debug, Clone)]
pub struct PpgDetector {
    cfg: PpgConfig,
    peak: i32,
    trough: i32,
    last_signal: i32,
    rising: bool,
    last_beat_ms: Option<u32>,
    last_sample_ms: Option<u32>,
    last_reset_ms: u32,
}

impl PpgDetector {
    pub fn new(cfg: &PpgConfig) -> Self {
        let mid = ADC_MID_SCALE as i32;
        Self {
            cfg: *cfg,
            peak: mid,
            trough: mid,
            last_signal: 0,
            rising: false,
            last_beat_ms: None,
            last_sample_ms: None,
            last_reset_ms: 0,
        }
    }

    fn evaluate(&mut self, signal: i32, now_ms: u32) -> Option<u32> {
        self.peak = self.peak.max(signal);
        self.trough = self.trough.min(signal);
        let threshold = self.threshold();
        let value = signal as f32;

        let mut rr_ms = None;
        if value > threshold && self.last_signal as f32 <= threshold && !self.rising {
            self.rising = true;
            if let Some(last) = self.last_beat_ms {
                let ibi = now_ms.wrapping_sub(last);
                if ibi > self.cfg.min_rr_ms && ibi < self.cfg.max_rr_ms {
                    rr_ms = Some(ibi);
                }
            }
            self.last_beat_ms = Some(now_ms);
        }
        if value <= threshold {
            self.rising = false;
        }
        self.last_signal = signal;

        if now_ms.wrapping_sub(self.last_reset_ms) > self.cfg.extremes_reset_ms {
            let mid = ADC_MID_SCALE as i32;
            self.peak = signal.max(mid);
            self.trough = signal.min(mid);
            self.last_reset_ms = now_ms;
        }
        rr_ms
    }
}

impl BeatDetector for PpgDetector {
    fn process(&mut self, raw: i32, now_ms: u32) -> Detection {
        let due = match self.last_sample_ms {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) >= self.cfg.sample_interval_ms,
        };
        let rr_ms = if due {
            self.last_sample_ms = Some(now_ms);
            self.evaluate(raw, now_ms)
        } else {
            None
        };
        Detection {
            signal: self.last_signal,
            threshold: self.threshold(),
            rr_ms,
        }
    }

    fn threshold(&self) -> f32 {
        self.trough as f32 + (self.peak - self.trough) as f32 * self.cfg.threshold_fraction
    }

    fn reset(&mut self, _seed: i32) {
        let cfg = self.cfg;
        let last_reset_ms = self.last_reset_ms;
        *self = Self::new(&cfg);
        self.last_reset_ms = last_reset_ms;
    }
}
