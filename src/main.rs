//! Beacon firmware entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  BleAdapter    PinIndicators   Esp32System   NvsAdapter  │
//! │  (RadioPort)   (IndicatorPort) (SystemPort)  (Storage)   │
//! │        └──────── HardwareAdapter ───────┘                │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ──────────────      │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │        BeaconService (pure logic)              │      │
//! │  │  Provisioning · Advertiser · Heartbeat         │      │
//! │  └────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Bluedroid callbacks feed the radio event queue; this task drains it,
//! polls the heartbeat and yields for 10 ms, forever.
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_hal::gpio::{AnyOutputPin, PinDriver};

use beacon::adapters::ble::BleAdapter;
use beacon::adapters::hardware::HardwareAdapter;
use beacon::adapters::log_sink::LogEventSink;
use beacon::adapters::nvs::NvsAdapter;
use beacon::adapters::system::Esp32System;
use beacon::app::ports::{IndicatorPort, SystemPort};
use beacon::app::service::BeaconService;
use beacon::config::{BeaconConfig, MAIN_LOOP_DELAY_MS};
use beacon::config_store::ConfigStore;
use beacon::drivers::indicator::{PinIndicators, SinglePinIndicator};
use beacon::events;
use beacon::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    info!("Beacon v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults and no persistence", e);
            NvsAdapter::default()
        }
    };
    let store = ConfigStore::new(nvs);
    let config = store.load();

    // ── 3. Indicator pins ─────────────────────────────────────
    // SAFETY: each GPIO number is claimed exactly once, here.
    let left = PinDriver::output(unsafe { AnyOutputPin::new(pins::LEFT_LED_GPIO) })?;
    if pins::indicators_share_pin() {
        run(SinglePinIndicator::new(left), config, store)
    } else {
        let right = PinDriver::output(unsafe { AnyOutputPin::new(pins::RIGHT_LED_GPIO) })?;
        run(PinIndicators::new(left, right), config, store)
    }
}

fn run<I: IndicatorPort>(
    indicators: I,
    config: BeaconConfig,
    mut store: ConfigStore<NvsAdapter>,
) -> Result<()> {
    let mut hw = HardwareAdapter::new(BleAdapter::new(), indicators, Esp32System::new());
    let mut sink = LogEventSink::new();
    let mut service = BeaconService::new(config);

    // ── 4. Boot: base address, radio, advertising ─────────────
    if let Err(e) = service.boot(&mut hw, &mut sink) {
        // The radio is in an undefined state; wait for the watchdog or a
        // power cycle.
        error!("Boot failed: {}, halting", e);
        loop {
            hw.delay_ms(1_000);
        }
    }

    info!("Beacon ready. Entering event loop.");

    // ── 5. Event loop ─────────────────────────────────────────
    loop {
        events::drain_events(|event| {
            service.handle_event(event, &mut hw, &mut store, &mut sink);
        });
        service.poll_heartbeat(&mut hw);
        hw.delay_ms(MAIN_LOOP_DELAY_MS);
    }
}
