mod common;

use common::{lead_off, EcgSynth, TICK_MS};
use ecg_sentinel::config::{DetectorKind, PipelineConfig};
use ecg_sentinel::pipeline::panic::Signature;
use ecg_sentinel::{AnyDetector, Pipeline, Tick};

fn pipeline() -> Pipeline<AnyDetector> {
    Pipeline::new(&PipelineConfig::default(), common::BASE)
}

/// Run `ms` milliseconds of `rr` rhythm, collecting every tick.
fn run(p: &mut Pipeline<AnyDetector>, rr: &[u32], start_ms: u32, ms: u32) -> Vec<(u32, Tick)> {
    EcgSynth::new(rr, start_ms)
        .take((ms / TICK_MS) as usize)
        .map(|(t, r)| (t, p.tick(r, t)))
        .collect()
}

fn alerts(ticks: &[(u32, Tick)]) -> Vec<(u32, String)> {
    ticks
        .iter()
        .filter_map(|(t, tick)| match tick {
            Tick::Processed { panic: Some(eval), .. } => eval.alert.clone().map(|a| (*t, a)),
            _ => None,
        })
        .collect()
}

#[test]
fn steady_sixty_bpm_is_quiet() {
    let mut p = pipeline();
    let ticks = run(&mut p, &[1000], 0, 12_000);

    let beats = ticks
        .iter()
        .filter(|(_, t)| {
            matches!(t, Tick::Processed { detection, .. } if detection.rr_ms.is_some())
        })
        .count();
    assert!(beats >= 10, "only {beats} beats");

    let hr = p.heart_rate();
    assert_eq!(hr.bpm, 60);
    assert!(hr.rmssd.abs() < 1e-3);
    assert!(alerts(&ticks).is_empty());
    for (_, tick) in &ticks {
        if let Tick::Processed { panic: Some(eval), .. } = tick {
            assert!(eval.signatures.is_empty());
        }
    }
}

#[test]
fn sustained_tachycardia_alerts_once() {
    let mut p = pipeline();
    let ticks = run(&mut p, &[500, 300], 0, 400_000);

    let sent = alerts(&ticks);
    assert_eq!(sent.len(), 1, "{sent:?}");

    let first_sustained = ticks.iter().find_map(|(t, tick)| match tick {
        Tick::Processed { panic: Some(eval), .. }
            if eval.signatures.contains(&Signature::SustainedTachycardia) =>
        {
            Some(*t)
        }
        _ => None,
    });
    let at = first_sustained.expect("sustained tachycardia never reported");
    assert!(at >= 300_000);
    assert!(p.panic_state().alert_sent);
    assert!(p.heart_rate().bpm > 100);
}

#[test]
fn lead_off_resets_rate_but_keeps_latch() {
    let mut p = pipeline();
    let ticks = run(&mut p, &[400], 0, 15_000);
    assert_eq!(alerts(&ticks).len(), 1);
    assert!(p.heart_rate().bpm > 100);
    assert!(p.heart_rate().rmssd < 1.0);

    let tick = p.tick(lead_off(1234), 15_004);
    assert_eq!(tick, Tick::LeadOff);

    let AnyDetector::Ecg(ecg) = p.detector() else {
        panic!("default pipeline should use the ECG detector");
    };
    assert_eq!(ecg.baseline(), 1234);
    assert_eq!(ecg.envelope(), 0.0);
    assert_eq!(p.heart_rate().bpm, 0);
    assert_eq!(p.heart_rate().rmssd, 0.0);
    assert!(p.panic_state().alert_sent);
    assert_eq!(p.snapshot().bpm, 0);
}

#[test]
fn identical_input_gives_identical_trajectories() {
    let rhythm = [800, 840, 780, 860, 820];
    let trace = |p: &mut Pipeline<AnyDetector>, start: u32| -> Vec<(u16, u32, i32)> {
        EcgSynth::new(&rhythm, start)
            .take(30_000 / TICK_MS as usize)
            .map(|(t, r)| {
                p.tick(r, t);
                let hr = p.heart_rate();
                (hr.bpm, hr.rmssd.to_bits(), hr.hr_trend)
            })
            .collect()
    };

    let mut a = pipeline();
    let mut b = pipeline();
    let first = trace(&mut a, 0);
    assert_eq!(first, trace(&mut b, 0));
    assert!(first.last().unwrap().0 > 0);

    // A sensor bounce is a full signal reset: replaying reproduces the run.
    a.tick(lead_off(common::BASE), 30_000);
    assert_eq!(trace(&mut a, 40_000), first);
}

#[test]
fn ppg_strategy_tracks_pulse_rate() {
    let cfg = PipelineConfig {
        detector: DetectorKind::Ppg,
        ..PipelineConfig::default()
    };
    let mut p = Pipeline::new(&cfg, 0);
    for i in 0..(20_000 / TICK_MS) {
        let now = i * TICK_MS;
        p.tick(common::reading(common::ppg_pulse(now, 800)), now);
    }
    assert_eq!(p.heart_rate().bpm, 75);
}
