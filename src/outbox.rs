// ECG Sentinel — Sampler Outbox
//
// Non-blocking hand-off from the sampler to the network task. Telemetry is
// best effort and dropped when the queue is full. A panic alert is the only
// one of its episode, so it is held back and retried every tick until the
// queue takes it; telemetry waits behind it.

use std::sync::mpsc::{SyncSender, TrySendError};

use crate::events::{NetEvent, PanicAlert, Telemetry};

#[derive(Debug, Default)]
pub struct Outbox {
    pending_alert: Option<PanicAlert>,
    dropped_telemetry: u32,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer this tick's output. Never blocks.
    pub fn forward(
        &mut self,
        tx: &SyncSender<NetEvent>,
        telemetry: Option<Telemetry>,
        alert: Option<PanicAlert>,
    ) {
        if let Some(alert) = alert {
            if self.pending_alert.replace(alert).is_some() {
                log::warn!("Undelivered panic alert superseded");
            }
        }

        if let Some(alert) = self.pending_alert.take() {
            match tx.try_send(NetEvent::Alert(alert)) {
                Ok(()) => {}
                Err(TrySendError::Full(NetEvent::Alert(alert))) => {
                    log::debug!("Network queue full, holding panic alert");
                    self.pending_alert = Some(alert);
                }
                Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Disconnected(_)) => {
                    log::warn!("Network task gone, panic alert not forwarded");
                }
            }
        }

        let Some(telemetry) = telemetry else {
            return;
        };
        if self.pending_alert.is_some() {
            self.dropped_telemetry += 1;
            return;
        }
        match tx.try_send(NetEvent::Publish(telemetry)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped_telemetry += 1;
                log::debug!("Network queue full, telemetry dropped");
            }
            Err(TrySendError::Disconnected(_)) => log::debug!("Network task gone"),
        }
    }

    pub fn has_pending_alert(&self) -> bool {
        self.pending_alert.is_some()
    }

    /// Telemetry records dropped since start.
    pub fn dropped_telemetry(&self) -> u32 {
        self.dropped_telemetry
    }
}
