// ECG Sentinel — Telegram Push Notifications
//
// One HTTPS POST to the Bot API per message.

use anyhow::bail;
use embedded_svc::http::client::Client;
use embedded_svc::io::Write;
use esp_idf_svc::http::client::{Configuration as HttpConfiguration, EspHttpConnection};

pub struct TelegramNotifier {
    token: &'static str,
    chat_id: &'static str,
}

impl TelegramNotifier {
    pub fn new(token: &'static str, chat_id: &'static str) -> Self {
        Self { token, chat_id }
    }

    pub fn is_configured(&self) -> bool {
        !self.token.is_empty() && !self.chat_id.is_empty()
    }

    pub fn send(&self, text: &str) -> anyhow::Result<()> {
        if !self.is_configured() {
            log::debug!("Telegram not configured, dropping notification");
            return Ok(());
        }

        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        let body = serde_json::json!({ "chat_id": self.chat_id, "text": text }).to_string();
        let content_length = body.len().to_string();
        let headers = [
            ("content-type", "application/json"),
            ("content-length", content_length.as_str()),
        ];

        let conn = EspHttpConnection::new(&HttpConfiguration {
            crt_bundle_attach: Some(esp_idf_sys::esp_crt_bundle_attach),
            ..Default::default()
        })?;
        let mut client = Client::wrap(conn);
        let mut request = client.post(&url, &headers)?;
        request.write_all(body.as_bytes())?;
        request.flush()?;
        let response = request.submit()?;

        let status = response.status();
        if !(200..300).contains(&status) {
            bail!("Telegram API returned HTTP {}", status);
        }
        log::info!("Telegram notification delivered");
        Ok(())
    }
}
