//! Application service, the hexagonal core.
//!
//! [`BeaconService`] owns the configuration snapshot, the provisioning
//! state machine and the heartbeat. All I/O flows through port traits
//! passed in at call sites, so the whole service runs against mock
//! adapters in tests.
//!
//! ```text
//!  RadioEvent ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │      BeaconService        │
//!  RadioPort  ◀── │  Provisioning · Heartbeat │ ──▶ IndicatorPort
//!  StoragePort ◀─ └──────────────────────────┘ ──▶ SystemPort
//! ```

use log::{info, warn};

use crate::advertiser::AdvertiserController;
use crate::config::{BOOT_BLINK_COUNT, BOOT_BLINK_MS, BeaconConfig, LOCAL_MTU};
use crate::config_store::ConfigStore;
use crate::drivers::indicator::{self, Heartbeat, Indicator};
use crate::error::BootError;
use crate::events::RadioEvent;
use crate::mac;
use crate::provisioning::{ProvisioningMachine, ProvisioningState, WriteOutcome};

use super::events::BeaconEvent;
use super::ports::{EventSink, IndicatorPort, RadioPort, StoragePort, SystemPort};

// ───────────────────────────────────────────────────────────────
// BeaconService
// ───────────────────────────────────────────────────────────────

pub struct BeaconService {
    /// Loaded once at boot; a new config only takes effect after restart.
    config: BeaconConfig,
    provisioning: ProvisioningMachine,
    heartbeat: Heartbeat,
}

impl BeaconService {
    pub fn new(config: BeaconConfig) -> Self {
        Self::with_advertiser(config, AdvertiserController::default())
    }

    pub fn with_advertiser(config: BeaconConfig, advertiser: AdvertiserController) -> Self {
        Self {
            config,
            provisioning: ProvisioningMachine::new(advertiser),
            heartbeat: Heartbeat::default(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Bring the radio up with the configured identity and start
    /// advertising.
    ///
    /// The base address is programmed before the stack is activated; the
    /// hardware ignores it afterwards. An MTU refusal is not fatal.
    pub fn boot<H>(&mut self, hw: &mut H, sink: &mut impl EventSink) -> Result<(), BootError>
    where
        H: RadioPort + IndicatorPort + SystemPort,
    {
        let mac = self.config.mac_address()?;
        let base = mac::derive_base(mac)?;
        info!("Boot: mac={} base={}", mac, base);

        hw.set_base_address(base)?;
        hw.activate()?;
        if let Err(e) = hw.set_local_mtu(LOCAL_MTU) {
            warn!("Boot: {}, continuing with default MTU", e);
        }

        self.provisioning
            .advertiser()
            .start(&self.config, hw, sink);

        indicator::blink_burst(hw, Indicator::Both, BOOT_BLINK_COUNT, BOOT_BLINK_MS);
        sink.emit(&BeaconEvent::Booted { mac, base });
        Ok(())
    }

    // ── Event dispatch ────────────────────────────────────────

    /// Handle one radio event to completion. Returns the outcome for
    /// writes.
    pub fn handle_event<H, S>(
        &mut self,
        event: RadioEvent,
        hw: &mut H,
        store: &mut ConfigStore<S>,
        sink: &mut impl EventSink,
    ) -> Option<WriteOutcome>
    where
        H: RadioPort + IndicatorPort + SystemPort,
        S: StoragePort,
    {
        match event {
            RadioEvent::Connected { conn } => {
                self.provisioning.on_connect(conn, sink);
                None
            }
            RadioEvent::Disconnected { conn } => {
                self.provisioning
                    .on_disconnect(conn, &self.config, hw, sink);
                None
            }
            RadioEvent::Write { conn, data } => {
                Some(self.provisioning.on_write(conn, &data, hw, store, sink))
            }
        }
    }

    /// Advance the heartbeat. Never blocks.
    pub fn poll_heartbeat(&mut self, hw: &mut (impl IndicatorPort + SystemPort)) {
        if let Some(on) = self.heartbeat.poll(hw.uptime_ms()) {
            hw.set_left(on);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &BeaconConfig {
        &self.config
    }

    pub fn state(&self) -> ProvisioningState {
        self.provisioning.state()
    }

    pub fn provisioning(&self) -> &ProvisioningMachine {
        &self.provisioning
    }
}
