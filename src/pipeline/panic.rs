// ECG Sentinel — Panic Signature Detector
//
// Four independent stress signatures, OR-combined, evaluated on a fixed
// cadence. An alert latches for the episode and only re-arms once the
// subject is back in the calm band.

use std::fmt::Write as _;

use crate::config::PanicConfig;
use crate::pipeline::analyzer::HeartRateState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    Spike,
    SustainedTachycardia,
    LowHrv,
    RapidAcceleration,
}

impl Signature {
    fn describe(self, hr: &HeartRateState, out: &mut String) {
        // Writing to a String cannot fail.
        let _ = match self {
            Self::Spike => write!(out, "Sudden HR spike: {} BPM. ", hr.bpm),
            Self::SustainedTachycardia => write!(out, "Sustained tachycardia: {} BPM. ", hr.bpm),
            Self::LowHrv => write!(out, "Low HRV: {:.1}ms. ", hr.rmssd),
            Self::RapidAcceleration => {
                write!(out, "Rapid HR acceleration: +{} BPM/min. ", hr.hr_trend)
            }
        };
    }
}

/// State carried between evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanicState {
    /// An alert has been dispatched for the current episode.
    pub alert_sent: bool,
    /// Start of the current run of BPM above the tachycardia limit.
    pub tachy_start_ms: Option<u32>,
    pub last_check_ms: Option<u32>,
}

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanicEvaluation {
    pub signatures: Vec<Signature>,
    /// Set only on the evaluation that latched a new episode.
    pub alert: Option<String>,
    pub recovered: bool,
}

#[derive(Debug, Clone)]
pub struct PanicDetector {
    cfg: PanicConfig,
}

impl PanicDetector {
    pub fn new(cfg: &PanicConfig) -> Self {
        Self { cfg: *cfg }
    }

    /// Evaluate if the cadence has elapsed; `None` otherwise.
    pub fn poll(
        &self,
        state: &mut PanicState,
        hr: &HeartRateState,
        now_ms: u32,
    ) -> Option<PanicEvaluation> {
        if let Some(last) = state.last_check_ms {
            if now_ms.wrapping_sub(last) < self.cfg.check_interval_ms {
                return None;
            }
        }
        state.last_check_ms = Some(now_ms);
        Some(self.evaluate(state, hr, now_ms))
    }

    pub fn evaluate(
        &self,
        state: &mut PanicState,
        hr: &HeartRateState,
        now_ms: u32,
    ) -> PanicEvaluation {
        let c = &self.cfg;
        let mut signatures = Vec::new();

        let spike_limit = hr.baseline_hr.saturating_add(c.spike_margin_bpm);
        if hr.bpm > spike_limit && hr.bpm > c.spike_floor_bpm {
            signatures.push(Signature::Spike);
        }

        if hr.bpm > c.tachy_bpm {
            let start = *state.tachy_start_ms.get_or_insert(now_ms);
            if now_ms.wrapping_sub(start) >= c.tachy_duration_ms {
                signatures.push(Signature::SustainedTachycardia);
            }
        } else {
            state.tachy_start_ms = None;
        }

        if hr.rmssd > 0.0 && hr.rmssd < c.low_hrv_ms && hr.bpm > c.low_hrv_min_bpm {
            signatures.push(Signature::LowHrv);
        }

        if hr.hr_trend > c.trend_limit {
            signatures.push(Signature::RapidAcceleration);
        }

        let mut alert = None;
        if !signatures.is_empty() && !state.alert_sent {
            let mut message = String::new();
            for sig in &signatures {
                sig.describe(hr, &mut message);
            }
            state.alert_sent = true;
            alert = Some(message);
        }

        let calm = hr.bpm < hr.baseline_hr.saturating_add(c.recovery_margin_bpm)
            && hr.rmssd > c.recovery_rmssd_ms;
        let recovered = calm && state.alert_sent;
        if calm {
            state.alert_sent = false;
        }

        PanicEvaluation {
            signatures,
            alert,
            recovered,
        }
    }
}
