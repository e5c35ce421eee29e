// ECG Sentinel — AD8232 Front-End Driver
//
// ECG OUTPUT on an ADC1 oneshot channel (11 dB, 12-bit) plus the LO+/LO-
// lead-off comparators on two digital inputs.

use anyhow::{bail, Context};
use esp_idf_hal::gpio::{AnyInputPin, Input, PinDriver};
use esp_idf_sys::esp;

use ecg_sentinel::{AdcSample, FrontEndReading};

pub struct Ad8232<'d> {
    adc: esp_idf_sys::adc_oneshot_unit_handle_t,
    channel: esp_idf_sys::adc_channel_t,
    lo_plus: PinDriver<'d, AnyInputPin, Input>,
    lo_minus: PinDriver<'d, AnyInputPin, Input>,
}

impl<'d> Ad8232<'d> {
    /// `out_gpio` carries the analog output and must be an ADC1 pin;
    /// ADC2 is unusable while Wi-Fi is up.
    pub fn new(
        out_gpio: i32,
        lo_plus: AnyInputPin,
        lo_minus: AnyInputPin,
    ) -> anyhow::Result<Self> {
        let mut unit: esp_idf_sys::adc_unit_t = 0;
        let mut channel: esp_idf_sys::adc_channel_t = 0;
        esp!(unsafe { esp_idf_sys::adc_oneshot_io_to_channel(out_gpio, &mut unit, &mut channel) })
            .with_context(|| format!("GPIO{} has no ADC channel", out_gpio))?;
        if unit != esp_idf_sys::adc_unit_t_ADC_UNIT_1 {
            bail!("GPIO{} is not on ADC1", out_gpio);
        }

        let mut adc: esp_idf_sys::adc_oneshot_unit_handle_t = core::ptr::null_mut();

        // One-time ADC setup via raw ESP-IDF calls.
        unsafe {
            let unit_cfg = esp_idf_sys::adc_oneshot_unit_init_cfg_t {
                unit_id: unit,
                ulp_mode: esp_idf_sys::adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
                ..core::mem::zeroed()
            };
            esp!(esp_idf_sys::adc_oneshot_new_unit(&unit_cfg, &mut adc))?;

            let chan_cfg = esp_idf_sys::adc_oneshot_chan_cfg_t {
                atten: esp_idf_sys::adc_atten_t_ADC_ATTEN_DB_11, // 0-3.6 V span
                bitwidth: esp_idf_sys::adc_bitwidth_t_ADC_BITWIDTH_12,
            };
            let configured = esp_idf_sys::adc_oneshot_config_channel(adc, channel, &chan_cfg);
            if let Err(e) = esp!(configured) {
                esp_idf_sys::adc_oneshot_del_unit(adc);
                return Err(e.into());
            }
        }

        let lo_plus = PinDriver::input(lo_plus)?;
        let lo_minus = PinDriver::input(lo_minus)?;

        log::info!(
            "AD8232 ready: OUT GPIO{} (ADC1 ch {}), LO+ GPIO{}, LO- GPIO{}",
            out_gpio,
            channel,
            lo_plus.pin(),
            lo_minus.pin()
        );
        Ok(Self {
            adc,
            channel,
            lo_plus,
            lo_minus,
        })
    }

    pub fn read_raw(&mut self) -> anyhow::Result<AdcSample> {
        let mut raw: i32 = 0;
        esp!(unsafe { esp_idf_sys::adc_oneshot_read(self.adc, self.channel, &mut raw) })?;
        Ok(AdcSample::try_from(raw)?)
    }

    /// LO+ / LO- go HIGH when an electrode is detached.
    pub fn read(&mut self) -> anyhow::Result<FrontEndReading> {
        Ok(FrontEndReading {
            raw: self.read_raw()?,
            lo_plus: self.lo_plus.is_high(),
            lo_minus: self.lo_minus.is_high(),
        })
    }
}

impl Drop for Ad8232<'_> {
    fn drop(&mut self) {
        unsafe {
            esp_idf_sys::adc_oneshot_del_unit(self.adc);
        }
    }
}
