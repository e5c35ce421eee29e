// ECG Sentinel — Analysis Pipeline
//
// detector (baseline → envelope → beat) → rate & HRV → panic signatures,
// all advanced once per sample tick. Lead-off gates the whole chain.

pub mod analyzer;
pub mod baseline;
pub mod beat;
pub mod envelope;
pub mod panic;
pub mod ppg;

use crate::config::{DetectorKind, PipelineConfig};
use crate::events::{FrontEndReading, PipelineSnapshot};

use analyzer::{HeartRateState, RateAnalyzer};
use beat::{BeatDetector, Detection, EcgDetector};
use panic::{PanicDetector, PanicEvaluation, PanicState};
use ppg::PpgDetector;

/// Outcome of one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// Leads are off; the pipeline was reset and nothing was analysed.
    LeadOff,
    Processed {
        detection: Detection,
        panic: Option<PanicEvaluation>,
    },
}

pub struct Pipeline<D: BeatDetector> {
    detector: D,
    analyzer: RateAnalyzer,
    panic_detector: PanicDetector,
    panic: PanicState,
    last: Detection,
    now_ms: u32,
}

impl<D: BeatDetector> Pipeline<D> {
    pub fn with_detector(detector: D, cfg: &PipelineConfig) -> Self {
        Self {
            analyzer: RateAnalyzer::new(&cfg.analyzer),
            panic_detector: PanicDetector::new(&cfg.panic),
            panic: PanicState::default(),
            last: Detection {
                threshold: detector.threshold(),
                ..Detection::default()
            },
            detector,
            now_ms: 0,
        }
    }

    pub fn tick(&mut self, reading: FrontEndReading, now_ms: u32) -> Tick {
        self.now_ms = now_ms;
        let raw = i32::from(reading.raw);

        if reading.is_lead_off() {
            self.reset_signal(raw);
            return Tick::LeadOff;
        }

        let detection = self.detector.process(raw, now_ms);
        if let Some(rr) = detection.rr_ms {
            self.analyzer.on_beat(rr, now_ms);
        }
        self.analyzer.on_tick(now_ms);
        self.last = detection;

        let hr = self.analyzer.state();
        let panic = self.panic_detector.poll(&mut self.panic, &hr, now_ms);
        Tick::Processed { detection, panic }
    }

    /// Sensor bounce: drop all signal and rate history, keep the panic latch.
    fn reset_signal(&mut self, seed: i32) {
        self.detector.reset(seed);
        self.analyzer.reset();
        self.last = Detection {
            threshold: self.detector.threshold(),
            ..Detection::default()
        };
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn heart_rate(&self) -> HeartRateState {
        self.analyzer.state()
    }

    pub fn panic_state(&self) -> PanicState {
        self.panic
    }

    pub fn snapshot(&self) -> PipelineSnapshot {
        let hr = self.analyzer.state();
        PipelineSnapshot {
            signal: self.last.signal,
            threshold: self.last.threshold,
            bpm: hr.bpm,
            baseline_hr: hr.baseline_hr,
            rmssd: hr.rmssd,
            hr_trend: hr.hr_trend,
            timestamp_ms: self.now_ms,
        }
    }
}

/// Either detection strategy, chosen when the pipeline is built.
pub enum AnyDetector {
    Ecg(EcgDetector),
    Ppg(PpgDetector),
}

impl BeatDetector for AnyDetector {
    fn process(&mut self, raw: i32, now_ms: u32) -> Detection {
        match self {
            Self::Ecg(d) => d.process(raw, now_ms),
            Self::Ppg(d) => d.process(raw, now_ms),
        }
    }

    fn threshold(&self) -> f32 {
        match self {
            Self::Ecg(d) => d.threshold(),
            Self::Ppg(d) => d.threshold(),
        }
    }

    fn reset(&mut self, seed: i32) {
        match self {
            Self::Ecg(d) => d.reset(seed),
            Self::Ppg(d) => d.reset(seed),
        }
    }
}

impl Pipeline<AnyDetector> {
    /// Build the pipeline for `cfg.detector`, seeding signal conditioning
    /// with the first reading.
    pub fn new(cfg: &PipelineConfig, seed: i32) -> Self {
        let detector = match cfg.detector {
            DetectorKind::Ecg => AnyDetector::Ecg(EcgDetector::new(&cfg.signal, seed)),
            DetectorKind::Ppg => AnyDetector::Ppg(PpgDetector::new(&cfg.ppg)),
        };
        Self::with_detector(detector, cfg)
    }
}
