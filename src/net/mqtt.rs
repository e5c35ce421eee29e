// ECG Sentinel — MQTT Telemetry Publisher
//
// TLS MQTT client (ESP-IDF certificate bundle). The client reconnects on its
// own once created; connection state is mirrored from its event callback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use embedded_svc::mqtt::client::QoS;
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration};

use ecg_sentinel::Telemetry;

pub struct TelemetryPublisher {
    client: EspMqttClient<'static>,
    topic: &'static str,
    connected: Arc<AtomicBool>,
}

impl TelemetryPublisher {
    pub fn new(
        url: &str,
        client_id: &str,
        username: &str,
        password: &str,
        topic: &'static str,
    ) -> anyhow::Result<Self> {
        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            username: (!username.is_empty()).then_some(username),
            password: (!password.is_empty()).then_some(password),
            crt_bundle_attach: Some(esp_idf_sys::esp_crt_bundle_attach),
            ..Default::default()
        };

        let connected = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&connected);
        let client = EspMqttClient::new_cb(url, &conf, move |event| match event.payload() {
            EventPayload::Connected(_) => {
                log::info!("[MQTT] Connected to broker");
                flag.store(true, Ordering::Relaxed);
            }
            EventPayload::Disconnected => {
                log::warn!("[MQTT] Disconnected");
                flag.store(false, Ordering::Relaxed);
            }
            EventPayload::Error(e) => log::warn!("[MQTT] Error: {:?}", e),
            _ => {}
        })?;

        Ok(Self {
            client,
            topic,
            connected,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Queue one record (QoS 0). Returns without waiting for the broker.
    pub fn publish(&mut self, telemetry: &Telemetry) -> anyhow::Result<()> {
        let payload = telemetry.to_json()?;
        self.client
            .enqueue(self.topic, QoS::AtMostOnce, false, payload.as_bytes())?;
        log::debug!("[MQTT] Published: {}", payload);
        Ok(())
    }
}
