// ECG Sentinel — Network Task
//
// Owns Wi-Fi, the MQTT publisher and the Telegram notifier. Checks
// connectivity once per second with a bounded retry, and forwards whatever
// the sampler queued in between. Blocking here never reaches the sampler.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use ecg_sentinel::config::*;
use ecg_sentinel::events::{NetEvent, Notification};
use ecg_sentinel::schedule::RetryPolicy;

use crate::net::mqtt::TelemetryPublisher;
use crate::net::telegram::TelegramNotifier;
use crate::net::wifi::WifiLink;

pub fn network_task(mut wifi: WifiLink, net_rx: Receiver<NetEvent>, client_id: String) {
    log::info!("Network task started");

    let retry = RetryPolicy::default();
    let notifier = TelegramNotifier::new(TELEGRAM_BOT_TOKEN, TELEGRAM_CHAT_ID);
    let mut publisher: Option<TelemetryPublisher> = None;

    let poll = Duration::from_millis(NETWORK_POLL_INTERVAL_MS);
    let mut last_check: Option<Instant> = None;

    loop {
        if last_check.map_or(true, |t| t.elapsed() >= poll) {
            last_check = Some(Instant::now());
            ensure_link(&mut wifi, &retry, &notifier);
            if wifi.is_connected() && publisher.is_none() {
                publisher = start_publisher(&retry, &client_id);
            }
        }

        match net_rx.recv_timeout(poll) {
            Ok(NetEvent::Publish(telemetry)) => {
                if let Some(p) = publisher.as_mut().filter(|p| p.is_connected()) {
                    if let Err(e) = p.publish(&telemetry) {
                        log::warn!("[MQTT] Publish failed: {:#}", e);
                    }
                }
            }
            Ok(NetEvent::Alert(alert)) => {
                if !wifi.is_connected() {
                    log::warn!("Offline, panic alert not delivered");
                    continue;
                }
                let text = Notification::from(&alert).render(DASHBOARD_URL);
                if let Err(e) = notifier.send(&text) {
                    log::error!("Panic notification failed: {:#}", e);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("Sampler channel closed — exiting network task");
                return;
            }
        }
    }
}

/// Re-attach Wi-Fi if it dropped; announce every successful attach.
fn ensure_link(wifi: &mut WifiLink, retry: &RetryPolicy, notifier: &TelegramNotifier) {
    if !wifi.is_configured() || wifi.is_connected() {
        return;
    }

    let attached = retry.run(
        |attempt| {
            let res = wifi.connect();
            if let Err(e) = &res {
                log::warn!("Wi-Fi attempt {}/{} failed: {:#}", attempt, retry.attempts, e);
            }
            res
        },
        thread::sleep,
    );
    if attached.is_err() {
        log::error!("Wi-Fi connection FAILED, will retry");
        return;
    }

    let ip = wifi.ip().unwrap_or_else(|_| "unknown".into());
    let rssi_dbm = wifi.rssi().unwrap_or(0);
    log::info!("WiFi connected successfully! IP: {} Signal: {} dBm", ip, rssi_dbm);

    let text = Notification::Connected { ip, rssi_dbm }.render(DASHBOARD_URL);
    if let Err(e) = notifier.send(&text) {
        log::warn!("Connect notification failed: {:#}", e);
    }
}

fn start_publisher(retry: &RetryPolicy, client_id: &str) -> Option<TelemetryPublisher> {
    if MQTT_URL.is_empty() {
        return None;
    }
    let started = retry.run(
        |attempt| {
            log::info!("[MQTT] Attempting connection ({}/{})", attempt, retry.attempts);
            TelemetryPublisher::new(MQTT_URL, client_id, MQTT_USER, MQTT_PASS, MQTT_TOPIC)
        },
        thread::sleep,
    );
    match started {
        Ok(p) => Some(p),
        Err(e) => {
            log::warn!("[MQTT] Client start failed: {:#}", e);
            None
        }
    }
}
