// ECG Sentinel — Entry Point
//
// On the ESP32 this is the firmware: bring up logging, the AD8232 front end
// and Wi-Fi, then hand off to two tasks:
//   - sampler: 250 Hz acquisition and analysis, never blocks on I/O.
//   - network: Wi-Fi upkeep, MQTT telemetry and Telegram alerts.
//
// On a host build the same analysis runs over a recorded capture instead
// (see `replay`).

#[cfg(target_os = "espidf")]
mod drivers;
#[cfg(target_os = "espidf")]
mod net;
#[cfg(target_os = "espidf")]
mod tasks;

#[cfg(not(target_os = "espidf"))]
mod replay;

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    replay::run()
}

// ---------------------------------------------------------------------------
// Utility: microseconds since boot
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
pub fn now_us() -> u64 {
    unsafe { esp_idf_sys::esp_timer_get_time() as u64 }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use esp_idf_hal::gpio::{InputPin, Pin};
    use esp_idf_hal::prelude::*;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_sys::esp;

    use ecg_sentinel::config::*;
    use ecg_sentinel::events::{device_id, mqtt_client_id};

    use crate::net::wifi::WifiLink;

    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("ECG Sentinel firmware starting…");

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ---- Identity (factory MAC) -------------------------------------------
    let mut mac = [0u8; 6];
    esp!(unsafe { esp_idf_sys::esp_efuse_mac_get_default(mac.as_mut_ptr()) })?;
    let device = device_id(mac);
    let client_id = mqtt_client_id(mac);
    log::info!("Device ID: {}", device);

    // ---- Network link -----------------------------------------------------
    let wifi = WifiLink::new(peripherals.modem, sysloop, nvs, WIFI_SSID, WIFI_PASS)?;
    if !wifi.is_configured() {
        log::warn!("No Wi-Fi credentials compiled in — running offline");
    }

    // ---- Channels ---------------------------------------------------------
    let (net_tx, net_rx) = mpsc::sync_channel(NET_QUEUE_DEPTH);

    // ---- Spawn tasks (map to FreeRTOS tasks via std::thread) ---------------

    // Sampler task: tightest timing, owns the ADC and lead-off pins.
    let lo_plus = peripherals.pins.gpio32.downgrade_input();
    let lo_minus = peripherals.pins.gpio33.downgrade_input();
    anyhow::ensure!(
        lo_plus.pin() == PIN_LO_PLUS && lo_minus.pin() == PIN_LO_MINUS,
        "lead-off pins do not match the configured wiring"
    );
    thread::Builder::new()
        .name("sampler".into())
        .stack_size(STACK_SAMPLER)
        .spawn(move || {
            tasks::sampler::sampler_task(lo_plus, lo_minus, net_tx, device);
        })?;

    // Network task
    thread::Builder::new()
        .name("network".into())
        .stack_size(STACK_NETWORK)
        .spawn(move || {
            tasks::network::network_task(wifi, net_rx, client_id);
        })?;

    // Main thread has nothing left to do; park it forever.
    loop {
        thread::sleep(Duration::from_secs(60));
    }
}
