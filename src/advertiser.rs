//! Advertising data and lifecycle.
//!
//! Builds the advertising and scan-response payloads from the current
//! [`BeaconConfig`] and hands them to the radio. Advertising is started
//! once at boot and again after every disconnect (the stack stops
//! advertising when a central connects).

use core::fmt;

use log::{info, warn};

use crate::app::events::BeaconEvent;
use crate::app::ports::{AdvertisingParams, EventSink, RadioPort};
use crate::config::{self, ADV_INTERVAL_US, BeaconConfig, DEVICE_NAME, MAX_ADV_DATA_LEN};

/// AD type "Complete Local Name".
pub const AD_TYPE_COMPLETE_LOCAL_NAME: u8 = 0x09;

/// One radio advertising interval unit, in microseconds.
const INTERVAL_UNIT_US: u32 = 625;
const MIN_INTERVAL_UNITS: u16 = 0x0020;
const MAX_INTERVAL_UNITS: u16 = 0x4000;

/// Largest name one AD structure can carry (the length byte counts the
/// type byte too).
pub const MAX_NAME_LEN: usize = u8::MAX as usize - 1;

/// The local name does not fit one AD structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameTooLong(pub usize);

impl fmt::Display for NameTooLong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "local name is {} bytes, at most {} fit", self.0, MAX_NAME_LEN)
    }
}

/// Scan response carrying a single Complete Local Name structure.
///
/// Names are never truncated. Anything over the 31-byte legacy limit is
/// built as is and refused by the radio.
pub fn build_scan_response(name: &str) -> Result<Vec<u8>, NameTooLong> {
    let bytes = name.as_bytes();
    let len = u8::try_from(bytes.len() + 1).map_err(|_| NameTooLong(bytes.len()))?;
    let mut out = Vec::with_capacity(bytes.len() + 2);
    out.push(len);
    out.push(AD_TYPE_COMPLETE_LOCAL_NAME);
    out.extend_from_slice(bytes);
    Ok(out)
}

/// Convert an interval in microseconds to 0.625 ms radio units, clamped
/// to the range the controller accepts.
pub fn interval_units(interval_us: u32) -> u16 {
    let units = interval_us / INTERVAL_UNIT_US;
    u16::try_from(units)
        .unwrap_or(MAX_INTERVAL_UNITS)
        .clamp(MIN_INTERVAL_UNITS, MAX_INTERVAL_UNITS)
}

/// Starts advertising for a configuration.
#[derive(Debug, Clone)]
pub struct AdvertiserController {
    device_name: &'static str,
    interval_us: u32,
}

impl Default for AdvertiserController {
    fn default() -> Self {
        Self {
            device_name: DEVICE_NAME,
            interval_us: ADV_INTERVAL_US,
        }
    }
}

impl AdvertiserController {
    pub fn new(device_name: &'static str, interval_us: u32) -> Self {
        Self {
            device_name,
            interval_us,
        }
    }

    /// Build the radio parameters for `config`. The flag is set when the
    /// configured payload did not decode and the default was used.
    pub fn params_for(
        &self,
        config: &BeaconConfig,
    ) -> Result<(AdvertisingParams, bool), NameTooLong> {
        let scan_response = build_scan_response(self.device_name)?;
        let (adv_data, fallback) = match config.advertisement_payload() {
            Ok(payload) => (payload, false),
            Err(e) => {
                warn!(
                    "ADV: payload '{}' is not valid hex ({}), using default",
                    config.adv_hex, e
                );
                (config::default_payload(), true)
            }
        };
        if adv_data.len() > MAX_ADV_DATA_LEN {
            warn!(
                "ADV: payload is {} bytes, over the {}-byte legacy limit",
                adv_data.len(),
                MAX_ADV_DATA_LEN
            );
        }
        let params = AdvertisingParams {
            interval_us: self.interval_us,
            adv_data,
            scan_response,
        };
        Ok((params, fallback))
    }

    /// (Re)start advertising. Radio failures are logged; the next
    /// disconnect tries again.
    pub fn start(
        &self,
        config: &BeaconConfig,
        radio: &mut impl RadioPort,
        sink: &mut impl EventSink,
    ) {
        let (params, fallback) = match self.params_for(config) {
            Ok(built) => built,
            Err(e) => {
                warn!("ADV: not started: {}", e);
                return;
            }
        };
        match radio.start_advertising(&params) {
            Ok(()) => {
                info!(
                    "ADV: advertising {} bytes every {} us as '{}'",
                    params.adv_data.len(),
                    params.interval_us,
                    self.device_name
                );
                sink.emit(&BeaconEvent::AdvertisingStarted { fallback });
            }
            Err(e) => warn!("ADV: start failed: {}", e),
        }
    }
}
