// ECG Sentinel — Sampler Task
//
// Runs the 250 Hz control loop: read the front end, advance the analysis
// pipeline, print the plot stream and hand telemetry/alerts to the network
// task. Nothing in here waits on the network.

use std::sync::mpsc::SyncSender;

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::AnyInputPin;

use ecg_sentinel::config::*;
use ecg_sentinel::events::NetEvent;
use ecg_sentinel::schedule::FixedRateSchedule;
use ecg_sentinel::{Monitor, Outbox, Pipeline};

use crate::drivers::ad8232::Ad8232;

const DETECTOR: DetectorKind = if cfg!(feature = "ppg") {
    DetectorKind::Ppg
} else {
    DetectorKind::Ecg
};

const SENSOR_GPIO: i32 = if cfg!(feature = "ppg") { PIN_PPG } else { PIN_ECG };

pub fn sampler_task(
    lo_plus: AnyInputPin,
    lo_minus: AnyInputPin,
    net_tx: SyncSender<NetEvent>,
    device_id: String,
) {
    log::info!("Sampler task started ({:?} detector)", DETECTOR);

    let mut front_end = match Ad8232::new(SENSOR_GPIO, lo_plus, lo_minus) {
        Ok(fe) => fe,
        Err(e) => {
            log::error!("AD8232 init failed in sampler task: {:#}", e);
            return;
        }
    };

    let cfg = PipelineConfig {
        detector: DETECTOR,
        ..PipelineConfig::default()
    };
    if let Err(e) = cfg.validate() {
        log::error!("Invalid pipeline configuration: {}", e);
        return;
    }

    let seed = match front_end.read_raw() {
        Ok(s) => i32::from(s),
        Err(e) => {
            log::warn!("Seed read failed ({:#}), starting from mid-scale", e);
            ADC_MID_SCALE as i32
        }
    };
    let mut monitor = Monitor::new(Pipeline::new(&cfg, seed), device_id);
    let mut outbox = Outbox::new();

    println!("hp,threshold");
    let mut schedule = FixedRateSchedule::new(SAMPLE_PERIOD_US, crate::now_us());

    loop {
        let now_us = crate::now_us();
        if !schedule.poll(now_us) {
            // Block in whole ticks; sub-millisecond remainders are polled.
            let wait_ms = schedule.next_due_us().saturating_sub(now_us) / 1000;
            if wait_ms > 0 {
                FreeRtos::delay_ms(wait_ms as u32);
            }
            continue;
        }

        let reading = match front_end.read() {
            Ok(r) => r,
            Err(e) => {
                log::warn!("ECG read error: {:#}", e);
                continue;
            }
        };

        let out = monitor.step(reading, (now_us / 1000) as u32);

        if let Some((hp, thr)) = out.diagnostic {
            println!("{},{}", hp, thr);
        }
        outbox.forward(&net_tx, out.telemetry, out.alert);
    }
}
