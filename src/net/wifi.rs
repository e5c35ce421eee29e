// ECG Sentinel — Wi-Fi Station
//
// Thin wrapper over the blocking ESP-IDF Wi-Fi driver. Each `connect` call
// is one attempt; callers bound the number of attempts.

use anyhow::{anyhow, Context};
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use esp_idf_sys::esp;

pub struct WifiLink {
    wifi: BlockingWifi<EspWifi<'static>>,
    ssid: &'static str,
}

impl WifiLink {
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        ssid: &'static str,
        password: &'static str,
    ) -> anyhow::Result<Self> {
        let mut wifi =
            BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;

        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| anyhow!("SSID {:?} is too long", ssid))?,
            password: password.try_into().map_err(|_| anyhow!("Wi-Fi password is too long"))?,
            auth_method,
            ..Default::default()
        }))?;

        Ok(Self { wifi, ssid })
    }

    /// Network credentials were provided at build time.
    pub fn is_configured(&self) -> bool {
        !self.ssid.is_empty()
    }

    pub fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    /// One attach attempt: start the driver if needed, associate, wait for DHCP.
    pub fn connect(&mut self) -> anyhow::Result<()> {
        if !self.wifi.is_started()? {
            self.wifi.start()?;
        }
        log::info!("Connecting to Wi-Fi network: {}", self.ssid);
        self.wifi.connect().context("Wi-Fi association failed")?;
        self.wifi.wait_netif_up().context("no IP lease")?;
        Ok(())
    }

    pub fn ip(&self) -> anyhow::Result<String> {
        let info = self.wifi.wifi().sta_netif().get_ip_info()?;
        Ok(info.ip.to_string())
    }

    /// Signal strength of the current access point.
    pub fn rssi(&self) -> anyhow::Result<i8> {
        let mut ap: esp_idf_sys::wifi_ap_record_t = unsafe { core::mem::zeroed() };
        esp!(unsafe { esp_idf_sys::esp_wifi_sta_get_ap_info(&mut ap) })?;
        Ok(ap.rssi)
    }
}
