// ECG Sentinel — Hardware & System Configuration
// Target: ESP32 (Xtensa) + AD8232 single-lead ECG front end

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// GPIO Pin Definitions
// ---------------------------------------------------------------------------
pub const PIN_ECG: i32 = 34;      // GPIO34 (ADC1_CH6) — AD8232 OUTPUT, input-only pin
pub const PIN_LO_PLUS: i32 = 32;  // GPIO32 — AD8232 LO+ (HIGH when a lead is off)
pub const PIN_LO_MINUS: i32 = 33; // GPIO33 — AD8232 LO- (HIGH when a lead is off)
pub const PIN_PPG: i32 = 35;      // GPIO35 (ADC1_CH7) — optional pulse sensor

// ---------------------------------------------------------------------------
// ADC
// ---------------------------------------------------------------------------
pub const ADC_MAX: u16 = 4095; // 12-bit
pub const ADC_MID_SCALE: u16 = 2048;

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_SAMPLER: usize = 8192;
pub const STACK_NETWORK: usize = 12288; // TLS handshakes need the headroom

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------
pub const SAMPLE_HZ: u32 = 250;
pub const SAMPLE_PERIOD_US: u64 = 1_000_000 / SAMPLE_HZ as u64; // 4 ms
pub const DIAGNOSTIC_DECIMATION: u32 = 5;          // Every 5th sample → 50 Hz plot stream
pub const TELEMETRY_INTERVAL_MS: u32 = 1000;
pub const LEAD_OFF_LOG_INTERVAL_MS: u32 = 1000;
pub const NETWORK_POLL_INTERVAL_MS: u64 = 1000;
pub const CONNECT_ATTEMPTS: u32 = 3;
pub const CONNECT_BACKOFF_MS: u64 = 2000;
pub const NET_QUEUE_DEPTH: usize = 8;

// ---------------------------------------------------------------------------
// Signal conditioning & beat detection (ECG)
// ---------------------------------------------------------------------------
pub const BASELINE_WINDOW: usize = 64;
pub const ENVELOPE_ALPHA: f32 = 0.05;
pub const THRESH_SCALE: f32 = 0.6;
pub const MIN_THRESHOLD: f32 = 8.0;  // ADC counts after baseline removal
pub const REFRACTORY_MS: u32 = 250;  // ~240 BPM ceiling

// ---------------------------------------------------------------------------
// Beat detection (PPG)
// ---------------------------------------------------------------------------
pub const PPG_SAMPLE_INTERVAL_MS: u32 = 20; // 50 Hz
pub const PPG_THRESHOLD_FRACTION: f32 = 0.6;
pub const PPG_EXTREMES_RESET_MS: u32 = 5000;

// ---------------------------------------------------------------------------
// Rate & HRV
// ---------------------------------------------------------------------------
pub const RR_CAPACITY: usize = 20;
pub const RR_MIN_VALID_MS: u32 = 300;
pub const RR_MAX_VALID_MS: u32 = 2000;
pub const RMSSD_MIN_SAMPLES: usize = 5;
pub const RMSSD_MIN_PAIRS: usize = 3;
pub const TREND_WINDOW_MS: u32 = 60_000;
pub const CALM_BPM_LIMIT: u16 = 90;
pub const CALM_RMSSD_MS: f32 = 25.0;
pub const INITIAL_BASELINE_HR: u16 = 70;

// ---------------------------------------------------------------------------
// Panic signatures
// ---------------------------------------------------------------------------
pub const PANIC_CHECK_INTERVAL_MS: u32 = 10_000;
pub const SPIKE_MARGIN_BPM: u16 = 20;
pub const SPIKE_FLOOR_BPM: u16 = 90;
pub const TACHY_BPM: u16 = 100;
pub const TACHY_DURATION_MS: u32 = 300_000; // 5 minutes
pub const LOW_HRV_MS: f32 = 20.0;
pub const LOW_HRV_MIN_BPM: u16 = 80;
pub const TREND_LIMIT_BPM_PER_MIN: i32 = 30;
pub const RECOVERY_MARGIN_BPM: u16 = 10;
pub const RECOVERY_RMSSD_MS: f32 = 25.0;

// ---------------------------------------------------------------------------
// Network endpoints & secrets (build-time environment, empty = disabled)
// ---------------------------------------------------------------------------
pub const WIFI_SSID: &str = env_or_empty(option_env!("ECG_WIFI_SSID"));
pub const WIFI_PASS: &str = env_or_empty(option_env!("ECG_WIFI_PASS"));
pub const MQTT_URL: &str = env_or_empty(option_env!("ECG_MQTT_URL")); // e.g. mqtts://broker:8883
pub const MQTT_TOPIC: &str = env_or(option_env!("ECG_MQTT_TOPIC"), "ecg/heart");
pub const MQTT_USER: &str = env_or_empty(option_env!("ECG_MQTT_USER"));
pub const MQTT_PASS: &str = env_or_empty(option_env!("ECG_MQTT_PASS"));
pub const TELEGRAM_BOT_TOKEN: &str = env_or_empty(option_env!("ECG_TELEGRAM_TOKEN"));
pub const TELEGRAM_CHAT_ID: &str = env_or_empty(option_env!("ECG_TELEGRAM_CHAT_ID"));
pub const DASHBOARD_URL: &str = env_or(
    option_env!("ECG_DASHBOARD_URL"),
    "https://ecg-measurement.onrender.com/",
);

const fn env_or(value: Option<&'static str>, fallback: &'static str) -> &'static str {
    match value {
        Some(v) => v,
        None => fallback,
    }
}

const fn env_or_empty(value: Option<&'static str>) -> &'static str {
    env_or(value, "")
}

// ---------------------------------------------------------------------------
// Runtime-tunable parameter sets
// ---------------------------------------------------------------------------

/// Signal conditioning and ECG beat-detection tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalConfig {
    pub envelope_alpha: f32,
    pub threshold_scale: f32,
    pub min_threshold: f32,
    pub refractory_ms: u32,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            envelope_alpha: ENVELOPE_ALPHA,
            threshold_scale: THRESH_SCALE,
            min_threshold: MIN_THRESHOLD,
            refractory_ms: REFRACTORY_MS,
        }
    }
}

/// Pulse-sensor detector tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PpgConfig {
    pub sample_interval_ms: u32,
    pub threshold_fraction: f32,
    pub extremes_reset_ms: u32,
    pub min_rr_ms: u32,
    pub max_rr_ms: u32,
}

impl Default for PpgConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: PPG_SAMPLE_INTERVAL_MS,
            threshold_fraction: PPG_THRESHOLD_FRACTION,
            extremes_reset_ms: PPG_EXTREMES_RESET_MS,
            min_rr_ms: RR_MIN_VALID_MS,
            max_rr_ms: RR_MAX_VALID_MS,
        }
    }
}

/// Rate, HRV and resting-baseline tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerConfig {
    pub min_valid_rr_ms: u32,
    pub max_valid_rr_ms: u32,
    pub rmssd_min_samples: usize,
    pub rmssd_min_pairs: usize,
    pub trend_window_ms: u32,
    pub calm_bpm_limit: u16,
    pub calm_rmssd_ms: f32,
    pub initial_baseline_hr: u16,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_valid_rr_ms: RR_MIN_VALID_MS,
            max_valid_rr_ms: RR_MAX_VALID_MS,
            rmssd_min_samples: RMSSD_MIN_SAMPLES,
            rmssd_min_pairs: RMSSD_MIN_PAIRS,
            trend_window_ms: TREND_WINDOW_MS,
            calm_bpm_limit: CALM_BPM_LIMIT,
            calm_rmssd_ms: CALM_RMSSD_MS,
            initial_baseline_hr: INITIAL_BASELINE_HR,
        }
    }
}

/// Panic signature thresholds and the trigger/recovery hysteresis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanicConfig {
    pub check_interval_ms: u32,
    pub spike_margin_bpm: u16,
    pub spike_floor_bpm: u16,
    pub tachy_bpm: u16,
    pub tachy_duration_ms: u32,
    pub low_hrv_ms: f32,
    pub low_hrv_min_bpm: u16,
    pub trend_limit: i32,
    pub recovery_margin_bpm: u16,
    pub recovery_rmssd_ms: f32,
}

impl Default for PanicConfig {
    fn default() -> Self {
        Self {
            check_interval_ms: PANIC_CHECK_INTERVAL_MS,
            spike_margin_bpm: SPIKE_MARGIN_BPM,
            spike_floor_bpm: SPIKE_FLOOR_BPM,
            tachy_bpm: TACHY_BPM,
            tachy_duration_ms: TACHY_DURATION_MS,
            low_hrv_ms: LOW_HRV_MS,
            low_hrv_min_bpm: LOW_HRV_MIN_BPM,
            trend_limit: TREND_LIMIT_BPM_PER_MIN,
            recovery_margin_bpm: RECOVERY_MARGIN_BPM,
            recovery_rmssd_ms: RECOVERY_RMSSD_MS,
        }
    }
}

/// Which beat-detection strategy the pipeline is built around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectorKind {
    #[default]
    Ecg,
    Ppg,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PipelineConfig {
    pub detector: DetectorKind,
    pub signal: SignalConfig,
    pub ppg: PpgConfig,
    pub analyzer: AnalyzerConfig,
    pub panic: PanicConfig,
}

impl PipelineConfig {
    /// Reject parameter combinations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.signal;
        if !(s.envelope_alpha > 0.0 && s.envelope_alpha <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "signal.envelope_alpha",
                value: s.envelope_alpha,
            });
        }
        if !(s.threshold_scale > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "signal.threshold_scale",
                value: s.threshold_scale,
            });
        }
        if !(s.min_threshold >= 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "signal.min_threshold",
                value: s.min_threshold,
            });
        }
        if s.refractory_ms == 0 {
            return Err(ConfigError::Zero("signal.refractory_ms"));
        }

        let p = &self.ppg;
        if p.sample_interval_ms == 0 {
            return Err(ConfigError::Zero("ppg.sample_interval_ms"));
        }
        if !(p.threshold_fraction > 0.0 && p.threshold_fraction < 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "ppg.threshold_fraction",
                value: p.threshold_fraction,
            });
        }

        let a = &self.analyzer;
        if a.min_valid_rr_ms >= a.max_valid_rr_ms {
            return Err(ConfigError::EmptyRange {
                field: "analyzer.valid_rr_ms",
                min: a.min_valid_rr_ms,
                max: a.max_valid_rr_ms,
            });
        }
        if a.rmssd_min_pairs == 0 {
            return Err(ConfigError::Zero("analyzer.rmssd_min_pairs"));
        }
        if a.rmssd_min_samples > RR_CAPACITY {
            return Err(ConfigError::ExceedsCapacity {
                field: "analyzer.rmssd_min_samples",
                value: a.rmssd_min_samples,
                capacity: RR_CAPACITY,
            });
        }
        if a.trend_window_ms == 0 {
            return Err(ConfigError::Zero("analyzer.trend_window_ms"));
        }

        let c = &self.panic;
        if c.check_interval_ms == 0 {
            return Err(ConfigError::Zero("panic.check_interval_ms"));
        }
        if c.recovery_margin_bpm >= c.spike_margin_bpm {
            return Err(ConfigError::NoHysteresis {
                recovery: c.recovery_margin_bpm,
                spike: c.spike_margin_bpm,
            });
        }
        Ok(())
    }
}
