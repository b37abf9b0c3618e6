//! Beacon configuration and compiled-in constants.
//!
//! A [`BeaconConfig`] is what gets persisted and what a provisioning
//! client writes: the advertised MAC address and the raw advertising
//! payload, both in text form. It is loaded once per boot and never
//! mutated afterwards; a new configuration only takes effect through a
//! restart.

use data_encoding::{DecodeError, HEXUPPER, HEXUPPER_PERMISSIVE};
use serde::{Deserialize, Serialize};

use crate::mac::{MacAddress, MacError};

// --- Radio contract ---

/// Primary GATT service carrying the provisioning characteristic.
pub const SERVICE_UUID: u128 = 0x6E40_0001_B5A3_F393_E0A9_E50E_24DC_CA9E;
/// Writable provisioning characteristic (write + write-without-response).
pub const CONFIG_CHAR_UUID: u128 = 0x6E40_0002_B5A3_F393_E0A9_E50E_24DC_CA9E;

/// Local name carried in the scan response.
pub const DEVICE_NAME: &str = "ESP32-Config";
/// Advertising interval in microseconds.
pub const ADV_INTERVAL_US: u32 = 100_000;
/// ATT MTU requested from the stack.
pub const LOCAL_MTU: u16 = 512;
/// Legacy advertising data limit.
pub const MAX_ADV_DATA_LEN: usize = 31;

// --- Defaults ---

pub const DEFAULT_MAC: &str = "7C:88:99:94:E8:62";
pub const DEFAULT_ADV_HEX: &str = "02010617FF0001B5000223AAE2C3000001AAAA20761B011000000003033CFE";

// --- Indicator timing (milliseconds) ---

pub const HEARTBEAT_ON_MS: u32 = 2_000;
pub const HEARTBEAT_OFF_MS: u32 = 1_000;
pub const BOOT_BLINK_COUNT: u8 = 3;
pub const BOOT_BLINK_MS: u32 = 100;
pub const COMMIT_BLINK_COUNT: u8 = 5;
pub const COMMIT_BLINK_MS: u32 = 50;
/// Time given to the in-flight write response before the restart.
pub const COMMIT_SETTLE_MS: u32 = 1_000;
/// Main loop yield between event drains.
pub const MAIN_LOOP_DELAY_MS: u32 = 10;

/// Persisted / provisioned beacon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconConfig {
    /// Advertised address, `AA:BB:CC:DD:EE:FF`.
    pub mac: String,
    /// Advertising payload as hex text.
    pub adv_hex: String,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            mac: DEFAULT_MAC.into(),
            adv_hex: DEFAULT_ADV_HEX.into(),
        }
    }
}

impl BeaconConfig {
    /// Build a config in canonical text form from typed values.
    pub fn from_parts(mac: MacAddress, payload: &[u8]) -> Self {
        Self {
            mac: mac.to_string(),
            adv_hex: HEXUPPER.encode(payload),
        }
    }

    pub fn mac_address(&self) -> Result<MacAddress, MacError> {
        self.mac.parse()
    }

    /// Decode the advertising payload. Only hex validity is checked, not
    /// the AD structure layout.
    pub fn advertisement_payload(&self) -> Result<Vec<u8>, DecodeError> {
        decode_hex(&self.adv_hex)
    }
}

/// Hex decode accepting either case.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, DecodeError> {
    HEXUPPER_PERMISSIVE.decode(text.as_bytes())
}

/// The compiled-in default payload, decoded.
pub fn default_payload() -> Vec<u8> {
    // The constant is valid hex; an empty payload is only reachable if it
    // is ever edited into something that is not.
    decode_hex(DEFAULT_ADV_HEX).unwrap_or_default()
}
