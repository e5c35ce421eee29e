// ECG Sentinel — System Events & Data Types

use serde::{Serialize, Serializer};

use crate::config::ADC_MAX;
use crate::error::SampleError;

// ---------------------------------------------------------------------------
// Sensor input
// ---------------------------------------------------------------------------

/// One 12-bit ADC reading (0..=4095).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct AdcSample(u16);

impl AdcSample {
    pub fn value(self) -> u16 {
        self.0
    }
}

impl TryFrom<i32> for AdcSample {
    type Error = SampleError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        if (0..=ADC_MAX as i32).contains(&raw) {
            Ok(Self(raw as u16))
        } else {
            Err(SampleError::OutOfRange(raw))
        }
    }
}

impl From<AdcSample> for i32 {
    fn from(s: AdcSample) -> i32 {
        s.0 as i32
    }
}

/// Everything the analog front end reports for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontEndReading {
    pub raw: AdcSample,
    pub lo_plus: bool,
    pub lo_minus: bool,
}

impl FrontEndReading {
    /// Either electrode reported as detached.
    pub fn is_lead_off(&self) -> bool {
        self.lo_plus || self.lo_minus
    }
}

// ---------------------------------------------------------------------------
// Pipeline output
// ---------------------------------------------------------------------------

/// Immutable view of the pipeline after one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PipelineSnapshot {
    pub signal: i32,
    pub threshold: f32,
    pub bpm: u16,
    pub baseline_hr: u16,
    pub rmssd: f32,
    pub hr_trend: i32,
    pub timestamp_ms: u32,
}

/// Telemetry record published once per second.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
    pub data_type: &'static str,
    pub hp: i32,
    pub threshold: i32,
    pub bpm: u16,
    #[serde(rename = "baselineHR")]
    pub baseline_hr: u16,
    #[serde(serialize_with = "one_decimal")]
    pub rmssd: f32,
    pub hr_trend: i32,
    pub timestamp: String,
    pub device_id: String,
}

impl Telemetry {
    pub fn from_snapshot(snapshot: &PipelineSnapshot, device_id: &str) -> Self {
        Self {
            data_type: "ecg_analysis",
            hp: snapshot.signal,
            threshold: snapshot.threshold as i32,
            bpm: snapshot.bpm,
            baseline_hr: snapshot.baseline_hr,
            rmssd: snapshot.rmssd,
            hr_trend: snapshot.hr_trend,
            timestamp: snapshot.timestamp_ms.to_string(),
            device_id: device_id.to_owned(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

fn one_decimal<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((*value as f64 * 10.0).round() / 10.0)
}

/// Stable per-device identifier, derived from the low 16 bits of the
/// factory MAC (little-endian, as the eFuse word is laid out).
pub fn device_id(mac: [u8; 6]) -> String {
    format!("ESP32_{:04X}", u16::from_le_bytes([mac[0], mac[1]]))
}

/// MQTT client identifier, derived from the low 32 bits of the factory MAC.
pub fn mqtt_client_id(mac: [u8; 6]) -> String {
    format!(
        "ESP32Client-{:x}",
        u32::from_le_bytes([mac[0], mac[1], mac[2], mac[3]])
    )
}

// ---------------------------------------------------------------------------
// Alerts & notifications
// ---------------------------------------------------------------------------

/// A panic episode that has just been latched.
#[derive(Debug, Clone, PartialEq)]
pub struct PanicAlert {
    pub message: String,
    pub timestamp_ms: u32,
}

/// Human-readable push messages.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Panic { message: String, uptime_s: u32 },
    Connected { ip: String, rssi_dbm: i8 },
}

impl Notification {
    pub fn render(&self, dashboard_url: &str) -> String {
        match self {
            Self::Panic { message, uptime_s } => format!(
                "🚨 PANIC ALERT: {message}Time: {uptime_s}s\n\n📊 View live ECG data: {dashboard_url}"
            ),
            Self::Connected { ip, rssi_dbm } => format!(
                "✅ ECG Monitor connected successfully!\n\
                 📍 Device IP: {ip}\n\
                 📶 Signal: {rssi_dbm} dBm\n\n\
                 📊 View live ECG dashboard: {dashboard_url}"
            ),
        }
    }
}

impl From<&PanicAlert> for Notification {
    fn from(alert: &PanicAlert) -> Self {
        Self::Panic {
            message: alert.message.clone(),
            uptime_s: alert.timestamp_ms / 1000,
        }
    }
}

// ---------------------------------------------------------------------------
// Network events (sampler to network task)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone)]
pub enum NetEvent {
    Publish(Telemetry),
    Alert(PanicAlert),
}
