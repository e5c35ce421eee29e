// ECG Sentinel — Host Replay
//
// Runs a recorded front-end capture through the same monitor the firmware
// uses. The plot stream goes to stdout, everything else to the log.
//
//   ecg-sentinel [capture.csv]        (reads stdin when no file is given)

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use anyhow::Context;

use ecg_sentinel::capture::parse_line;
use ecg_sentinel::config::{PipelineConfig, SAMPLE_PERIOD_US};
use ecg_sentinel::events::Notification;
use ecg_sentinel::{Monitor, Pipeline};

const REPLAY_DEVICE_ID: &str = "HOST_REPLAY";
const REPLAY_DASHBOARD: &str = "(offline replay)";

pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let input: Box<dyn BufRead> = match std::env::args().nth(1) {
        Some(path) => Box::new(BufReader::new(
            File::open(&path).with_context(|| format!("cannot open capture {path}"))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut cfg = PipelineConfig::default();
    if cfg!(feature = "ppg") {
        cfg.detector = ecg_sentinel::config::DetectorKind::Ppg;
    }
    cfg.validate()?;
    log::info!("Replaying capture with {:?} detector", cfg.detector);

    let tick_ms = (SAMPLE_PERIOD_US / 1000) as u32;
    let mut monitor = None;
    let mut index: u32 = 0;
    let mut alerts = 0usize;

    println!("hp,threshold");
    for (line_no, line) in input.lines().enumerate() {
        let line = line.context("capture read failed")?;
        let record = match parse_line(&line, line_no + 1)? {
            Some(r) => r,
            None => continue,
        };

        let now_ms = record.t_ms.unwrap_or(index.wrapping_mul(tick_ms));
        index += 1;

        let monitor = monitor.get_or_insert_with(|| {
            Monitor::new(
                Pipeline::new(&cfg, i32::from(record.reading.raw)),
                REPLAY_DEVICE_ID,
            )
        });
        let out = monitor.step(record.reading, now_ms);

        if let Some((hp, thr)) = out.diagnostic {
            println!("{},{}", hp, thr);
        }
        if let Some(telemetry) = out.telemetry {
            log::info!("telemetry {}", telemetry.to_json()?);
        }
        if let Some(alert) = out.alert {
            alerts += 1;
            log::warn!("{}", Notification::from(&alert).render(REPLAY_DASHBOARD));
        }
    }

    match monitor {
        Some(m) => {
            let hr = m.pipeline().heart_rate();
            log::info!(
                "Replay done: {} samples, {} alert(s), final BPM {}, RMSSD {:.1} ms, baseline {}",
                index,
                alerts,
                hr.bpm,
                hr.rmssd,
                hr.baseline_hr
            );
        }
        None => log::warn!("Capture contained no readings"),
    }
    Ok(())
}
