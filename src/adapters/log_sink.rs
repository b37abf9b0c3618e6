//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing beacon events to the ESP-IDF
//! logger (UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::BeaconEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`BeaconEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BeaconEvent) {
        match event {
            BeaconEvent::Booted { mac, base } => {
                info!("BOOT | mac={} base={}", mac, base);
            }
            BeaconEvent::AdvertisingStarted { fallback } => {
                if *fallback {
                    warn!("ADV | started with default payload");
                } else {
                    info!("ADV | started");
                }
            }
            BeaconEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            BeaconEvent::DocumentRejected(reason) => {
                warn!("PROV | rejected: {}", reason);
            }
            BeaconEvent::ForeignWriteDropped { conn } => {
                warn!("PROV | foreign write from conn {} dropped", conn);
            }
            BeaconEvent::BufferOverflow { discarded } => {
                warn!("PROV | overflow, {} bytes discarded", discarded);
            }
            BeaconEvent::Committed(cfg) => {
                info!("PROV | committed mac={} adv_hex={}", cfg.mac, cfg.adv_hex);
            }
        }
    }
}
