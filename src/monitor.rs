// ECG Sentinel — Per-Tick Monitor
//
// Wraps the pipeline with the output cadences: the decimated diagnostic
// stream, once-a-second telemetry, the lead-off notice and panic alerts.
// The sampler task and the host replay both drive this, one reading at a
// time.

use crate::config::{DIAGNOSTIC_DECIMATION, LEAD_OFF_LOG_INTERVAL_MS, TELEMETRY_INTERVAL_MS};
use crate::events::{FrontEndReading, PanicAlert, PipelineSnapshot, Telemetry};
use crate::pipeline::beat::BeatDetector;
use crate::pipeline::{Pipeline, Tick};
use crate::schedule::Every;

/// Everything one tick produced for the outside world.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutput {
    /// `(hp, threshold)` for the serial plotter.
    pub diagnostic: Option<(i32, i32)>,
    pub telemetry: Option<Telemetry>,
    pub alert: Option<PanicAlert>,
    pub lead_off_notice: bool,
    pub snapshot: PipelineSnapshot,
}

pub struct Monitor<D: BeatDetector> {
    pipeline: Pipeline<D>,
    device_id: String,
    diag_counter: u32,
    telemetry: Every,
    lead_off_notice: Every,
}

impl<D: BeatDetector> Monitor<D> {
    pub fn new(pipeline: Pipeline<D>, device_id: impl Into<String>) -> Self {
        Self {
            pipeline,
            device_id: device_id.into(),
            diag_counter: 0,
            telemetry: Every::new(TELEMETRY_INTERVAL_MS),
            lead_off_notice: Every::new(LEAD_OFF_LOG_INTERVAL_MS),
        }
    }

    pub fn pipeline(&self) -> &Pipeline<D> {
        &self.pipeline
    }

    pub fn step(&mut self, reading: FrontEndReading, now_ms: u32) -> StepOutput {
        let mut out = StepOutput::default();

        match self.pipeline.tick(reading, now_ms) {
            Tick::LeadOff => {
                if self.lead_off_notice.due(now_ms) {
                    log::warn!("LEADS_OFF");
                    out.lead_off_notice = true;
                }
            }
            Tick::Processed { detection, panic } => {
                self.diag_counter += 1;
                if self.diag_counter >= DIAGNOSTIC_DECIMATION {
                    self.diag_counter = 0;
                    out.diagnostic = Some((detection.signal, detection.threshold as i32));
                }

                if let Some(eval) = panic {
                    if let Some(message) = eval.alert {
                        log::warn!("PANIC_ALERT: {}", message);
                        out.alert = Some(PanicAlert {
                            message,
                            timestamp_ms: now_ms,
                        });
                    }
                    if eval.recovered {
                        log::info!("Heart rate back in calm band — panic alerts re-armed");
                    }
                }
            }
        }

        out.snapshot = self.pipeline.snapshot();
        if self.telemetry.due(now_ms) {
            out.telemetry = Some(Telemetry::from_snapshot(&out.snapshot, &self.device_id));
        }
        out
    }
}
