//! Hardware adapter: bridges the board to the domain port traits.
//!
//! Owns the radio, the indicator LEDs and the system controls, exposing
//! them through [`RadioPort`], [`IndicatorPort`] and [`SystemPort`] so
//! the service can hand a single `&mut` to the state machine. On
//! non-espidf targets the parts use their simulation backends.

use crate::adapters::ble::BleAdapter;
use crate::adapters::system::Esp32System;
use crate::app::ports::{AdvertisingParams, IndicatorPort, RadioError, RadioPort, SystemPort};
use crate::mac::MacAddress;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I> {
    radio: BleAdapter,
    indicators: I,
    system: Esp32System,
}

impl<I: IndicatorPort> HardwareAdapter<I> {
    pub fn new(radio: BleAdapter, indicators: I, system: Esp32System) -> Self {
        Self {
            radio,
            indicators,
            system,
        }
    }

    pub fn radio(&self) -> &BleAdapter {
        &self.radio
    }

    pub fn system(&self) -> &Esp32System {
        &self.system
    }
}

// ── RadioPort implementation ──────────────────────────────────

impl<I> RadioPort for HardwareAdapter<I> {
    fn set_base_address(&mut self, base: MacAddress) -> Result<(), RadioError> {
        self.radio.set_base_address(base)
    }

    fn activate(&mut self) -> Result<(), RadioError> {
        self.radio.activate()
    }

    fn set_local_mtu(&mut self, mtu: u16) -> Result<(), RadioError> {
        self.radio.set_local_mtu(mtu)
    }

    fn start_advertising(&mut self, params: &AdvertisingParams) -> Result<(), RadioError> {
        self.radio.start_advertising(params)
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl<I: IndicatorPort> IndicatorPort for HardwareAdapter<I> {
    fn set_left(&mut self, on: bool) {
        self.indicators.set_left(on);
    }

    fn set_right(&mut self, on: bool) {
        self.indicators.set_right(on);
    }
}

// ── SystemPort implementation ─────────────────────────────────

impl<I> SystemPort for HardwareAdapter<I> {
    fn uptime_ms(&self) -> u32 {
        self.system.uptime_ms()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.system.delay_ms(ms);
    }

    fn restart(&mut self) {
        self.system.restart();
    }
}
