//! Synthetic front-end signals for scenario tests.

#![allow(dead_code)]

use ecg_sentinel::{AdcSample, FrontEndReading};

pub const TICK_MS: u32 = 4; // 250 Hz
pub const BASE: i32 = 2048;
pub const R_PEAK: i32 = 2648;
pub const QRS_MS: u32 = 12;

pub fn reading(raw: i32) -> FrontEndReading {
    FrontEndReading {
        raw: AdcSample::try_from(raw).unwrap(),
        lo_plus: false,
        lo_minus: false,
    }
}

pub fn lead_off(raw: i32) -> FrontEndReading {
    FrontEndReading {
        lo_plus: true,
        ..reading(raw)
    }
}

/// Flat baseline with a short rectangular R complex at each beat; RR
/// intervals cycle through `rr`. Yields `(now_ms, reading)` at 250 Hz.
pub struct EcgSynth {
    rr: Vec<u32>,
    idx: usize,
    next_beat_ms: u32,
    now_ms: u32,
}

impl EcgSynth {
    pub fn new(rr: &[u32], start_ms: u32) -> Self {
        assert!(!rr.is_empty());
        Self {
            rr: rr.to_vec(),
            idx: 0,
            next_beat_ms: start_ms + 100,
            now_ms: start_ms,
        }
    }
}

impl Iterator for EcgSynth {
    type Item = (u32, FrontEndReading);

    fn next(&mut self) -> Option<Self::Item> {
        let t = self.now_ms;
        let in_qrs = t >= self.next_beat_ms && t < self.next_beat_ms + QRS_MS;
        if t + TICK_MS >= self.next_beat_ms + QRS_MS {
            self.next_beat_ms += self.rr[self.idx % self.rr.len()];
            self.idx += 1;
        }
        self.now_ms += TICK_MS;
        Some((t, reading(if in_qrs { R_PEAK } else { BASE })))
    }
}

/// Square-ish optical pulse: high for 100 ms of every `period_ms`.
pub fn ppg_pulse(now_ms: u32, period_ms: u32) -> i32 {
    if now_ms % period_ms < 100 {
        3000
    } else {
        1200
    }
}
