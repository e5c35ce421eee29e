// ECG Sentinel — Rate & HRV Analyzer
//
// Folds confirmed beats into a smoothed BPM, an RR ring buffer and RMSSD,
// and once per trend window derives the HR trend and adapts the resting
// baseline.

use crate::config::{AnalyzerConfig, RR_CAPACITY};
use crate::ring::RingBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeartRateState {
    pub bpm: u16,
    pub baseline_hr: u16,
    pub hr_trend: i32,
    pub rmssd: f32,
}

#[derive(Debug, Clone)]
pub struct RateAnalyzer {
    cfg: AnalyzerConfig,
    state: HeartRateState,
    rr: RingBuffer<u32, RR_CAPACITY>,
    trend_window_start: Option<u32>,
}

impl RateAnalyzer {
    pub fn new(cfg: &AnalyzerConfig) -> Self {
        Self {
            cfg: *cfg,
            state: HeartRateState {
                baseline_hr: cfg.initial_baseline_hr,
                ..HeartRateState::default()
            },
            rr: RingBuffer::new(),
            trend_window_start: None,
        }
    }

    pub fn state(&self) -> HeartRateState {
        self.state
    }

    pub fn rr_intervals(&self) -> impl Iterator<Item = u32> + '_ {
        self.rr.iter()
    }

    /// Fold in one RR interval.
    pub fn on_beat(&mut self, ibi_ms: u32, _now_ms: u32) {
        if ibi_ms == 0 {
            return;
        }
        self.rr.push(ibi_ms);

        let inst = (60_000 / ibi_ms).min(u16::MAX as u32) as u16;
        self.state.bpm = if self.state.bpm == 0 {
            inst
        } else {
            // 0.8 * bpm + 0.2 * inst, truncated to whole BPM
            (0.8 * self.state.bpm as f32 + 0.2 * inst as f32) as u16
        };

        if let Some(rmssd) = self.rmssd() {
            self.state.rmssd = rmssd;
        }
    }

    /// Trend bookkeeping, called every tick.
    pub fn on_tick(&mut self, now_ms: u32) {
        let start = match self.trend_window_start {
            None => {
                self.trend_window_start = Some(now_ms);
                return;
            }
            Some(start) => start,
        };
        if now_ms.wrapping_sub(start) <= self.cfg.trend_window_ms {
            return;
        }
        self.trend_window_start = Some(now_ms);

        let s = &mut self.state;
        if s.bpm == 0 {
            // No rate yet; nothing to compare against.
            return;
        }
        s.hr_trend = s.bpm as i32 - s.baseline_hr as i32;
        if s.bpm < self.cfg.calm_bpm_limit && s.rmssd > self.cfg.calm_rmssd_ms {
            s.baseline_hr = ((3 * s.baseline_hr as u32 + s.bpm as u32) / 4) as u16;
        }
    }

    /// RMSSD over chronologically adjacent RR pairs where both sides are
    /// plausible. `None` when there is not enough data.
    fn rmssd(&self) -> Option<f32> {
        if self.rr.len() < self.cfg.rmssd_min_samples {
            return None;
        }
        let valid = |rr: u32| (self.cfg.min_valid_rr_ms..=self.cfg.max_valid_rr_ms).contains(&rr);

        let mut sum_sq = 0.0f32;
        let mut pairs = 0usize;
        let mut prev: Option<u32> = None;
        for curr in self.rr.iter() {
            if let Some(p) = prev {
                if valid(p) && valid(curr) {
                    let diff = curr as f32 - p as f32;
                    sum_sq += diff * diff;
                    pairs += 1;
                }
            }
            prev = Some(curr);
        }

        if pairs < self.cfg.rmssd_min_pairs {
            return None;
        }
        Some((sum_sq / pairs as f32).sqrt())
    }

    /// Drop rate and HRV history. The learned resting baseline survives.
    pub fn reset(&mut self) {
        self.rr.clear();
        self.state.bpm = 0;
        self.state.rmssd = 0.0;
        self.state.hr_trend = 0;
        self.trend_window_start = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> RateAnalyzer {
        RateAnalyzer::new(&AnalyzerConfig::default())
    }

    fn feed(a: &mut RateAnalyzer, intervals: &[u32]) {
        for &rr in intervals {
            a.on_beat(rr, 0);
        }
    }

    #[test]
    fn first_beat_seeds_bpm() {
        let mut a = analyzer();
        a.on_beat(500, 0);
        assert_eq!(a.state().bpm, 120);
    }

    #[test]
    fn later_beats_blend_eighty_twenty() {
        let mut a = analyzer();
        feed(&mut a, &[1000, 500]);
        // 0.8 * 60 + 0.2 * 120 = 72
        assert_eq!(a.state().bpm, 72);
    }

    #[test]
    fn blended_rate_truncates() {
        let mut a = analyzer();
        // inst = 60000 / 952 = 63; 0.8 * 60 + 0.2 * 63 = 60.6
        feed(&mut a, &[1000, 952]);
        assert_eq!(a.state().bpm, 60);
    }

    #[test]
    fn rmssd_waits_for_five_samples() {
        let mut a = analyzer();
        feed(&mut a, &[800, 900, 800, 900]);
        assert_eq!(a.state().rmssd, 0.0);
        a.on_beat(800, 0);
        assert_eq!(a.state().rmssd, 100.0);
    }

    #[test]
    fn rmssd_skips_pairs_with_implausible_side() {
        let mut a = analyzer();
        // Pairs: (800,250) (250,820) invalid; (820,800) (800,830) (830,800) valid.
        feed(&mut a, &[800, 250, 820, 800, 830, 800]);
        let expected = ((400.0f32 + 900.0 + 900.0) / 3.0).sqrt();
        assert!((a.state().rmssd - expected).abs() < 1e-4);
    }

    #[test]
    fn rmssd_unchanged_without_three_valid_pairs() {
        let mut a = analyzer();
        feed(&mut a, &[800, 900, 800, 900, 800]);
        let before = a.state().rmssd;
        assert_eq!(before, 100.0);
        // Each new interval is implausible, so no new valid pair appears.
        feed(&mut a, &[100; 20]);
        assert_eq!(a.state().rmssd, before);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let mut a = analyzer();
        feed(&mut a, &[300, 2000, 300, 2000, 300]);
        assert_eq!(a.state().rmssd, 1700.0);
    }

    #[test]
    fn buffer_keeps_last_twenty() {
        let mut a = analyzer();
        feed(&mut a, &(1..=25).map(|i| 600 + i).collect::<Vec<_>>());
        let kept: Vec<u32> = a.rr_intervals().collect();
        assert_eq!(kept.len(), 20);
        assert_eq!(kept[0], 606);
        assert_eq!(kept[19], 625);
    }

    #[test]
    fn rmssd_after_wrap_uses_chronological_pairs() {
        let mut a = analyzer();
        let mut intervals = vec![2000; 5];
        intervals.push(1600);
        intervals.extend([800; 18]);
        intervals.push(1200);
        feed(&mut a, &intervals);

        // Storage has wrapped: the newest (1200) sits just before the oldest (1600).
        let kept: Vec<u32> = a.rr_intervals().collect();
        assert_eq!((kept[0], kept[19]), (1600, 1200));

        // (1600,800) and (800,1200) plus 17 zero diffs; never (1200,1600).
        let expected = ((800.0f32 * 800.0 + 400.0 * 400.0) / 19.0).sqrt();
        assert!((a.state().rmssd - expected).abs() < 1e-3);
        let with_wrap_pair = ((800.0f32 * 800.0 + 2.0 * 400.0 * 400.0) / 20.0).sqrt();
        assert!((a.state().rmssd - with_wrap_pair).abs() > 1.0);
    }

    #[test]
    fn steady_rhythm_has_no_variability() {
        let mut a = analyzer();
        feed(&mut a, &[1000; 10]);
        assert_eq!(a.state().bpm, 60);
        assert_eq!(a.state().rmssd, 0.0);
    }

    #[test]
    fn trend_updates_once_per_window() {
        let mut a = analyzer();
        a.on_tick(0);
        feed(&mut a, &[500; 6]);
        a.on_tick(60_000);
        assert_eq!(a.state().hr_trend, 0);
        a.on_tick(60_004);
        assert_eq!(a.state().hr_trend, 120 - 70);
        // Stressed reading: baseline does not adapt.
        assert_eq!(a.state().baseline_hr, 70);
    }

    #[test]
    fn calm_minute_pulls_baseline_towards_bpm() {
        let mut a = analyzer();
        a.on_tick(0);
        feed(&mut a, &[1000, 1050, 1000, 1050, 1000, 1050]);
        let bpm = a.state().bpm;
        assert!(bpm < 90);
        assert!(a.state().rmssd > 25.0);
        a.on_tick(60_001);
        assert_eq!(a.state().baseline_hr, ((3 * 70 + bpm as u32) / 4) as u16);
    }

    #[test]
    fn reset_keeps_learned_baseline() {
        let mut a = analyzer();
        a.on_tick(0);
        feed(&mut a, &[1000, 1050, 1000, 1050, 1000, 1050]);
        a.on_tick(60_001);
        let learned = a.state().baseline_hr;
        assert!(learned < 70);
        a.reset();
        let s = a.state();
        assert_eq!((s.bpm, s.rmssd, s.hr_trend), (0, 0.0, 0));
        assert_eq!(s.baseline_hr, learned);
        assert_eq!(a.rr_intervals().count(), 0);
    }
}
