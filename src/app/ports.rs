//! Port traits: the hexagonal boundary between the beacon core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BeaconService / ProvisioningMachine
//! ```
//!
//! Driven adapters (radio stack, NVS, indicator pins, system control)
//! implement these traits. The domain consumes them via generics, so the
//! provisioning core never touches hardware directly and runs unchanged
//! against the mocks in `tests/integration/mock_hw.rs`.

use crate::mac::MacAddress;

// ───────────────────────────────────────────────────────────────
// Radio port (driven adapter: domain → BLE stack)
// ───────────────────────────────────────────────────────────────

/// Everything [`RadioPort::start_advertising`] needs, already encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisingParams {
    /// Advertising interval in microseconds.
    pub interval_us: u32,
    /// Raw advertising data (sequence of AD structures).
    pub adv_data: Vec<u8>,
    /// Raw scan response data.
    pub scan_response: Vec<u8>,
}

/// The BLE stack as seen by the domain.
///
/// Call order during boot is fixed: [`set_base_address`] →
/// [`activate`] → [`set_local_mtu`] → [`start_advertising`]. Changing the
/// base address after activation is undefined on the hardware, so
/// adapters are not required to detect it.
///
/// [`set_base_address`]: RadioPort::set_base_address
/// [`activate`]: RadioPort::activate
/// [`set_local_mtu`]: RadioPort::set_local_mtu
/// [`start_advertising`]: RadioPort::start_advertising
pub trait RadioPort {
    /// Program the hardware base address the public address is derived from.
    fn set_base_address(&mut self, base: MacAddress) -> Result<(), RadioError>;

    /// Bring up the controller, host stack and the provisioning GATT service.
    fn activate(&mut self) -> Result<(), RadioError>;

    /// Request a local ATT MTU.
    fn set_local_mtu(&mut self, mtu: u16) -> Result<(), RadioError>;

    /// (Re)start advertising. A running advertisement is stopped first.
    fn start_advertising(&mut self, params: &AdvertisingParams) -> Result<(), RadioError>;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → LEDs)
// ───────────────────────────────────────────────────────────────

/// Two write-only binary indicators.
pub trait IndicatorPort {
    fn set_left(&mut self, on: bool);
    fn set_right(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// System port (driven adapter: domain → scheduler / reset)
// ───────────────────────────────────────────────────────────────

/// Blocking delay, monotonic time and warm restart.
pub trait SystemPort {
    /// Milliseconds since boot (wraps).
    fn uptime_ms(&self) -> u32;

    /// Block the calling task for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);

    /// Warm-restart the device. Does not return on hardware; test doubles
    /// record the request and return.
    fn restart(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`BeaconEvent`](super::events::BeaconEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::BeaconEvent);
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage.
///
/// Keys are namespaced to prevent collisions between subsystems. Writes
/// are only as atomic as the backend makes them; callers must tolerate a
/// corrupt value after a power loss.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write (overwrite) a value.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`RadioPort`] operations. Codes are raw `esp_err_t` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// Controller / host stack bring-up failed.
    InitFailed(i32),
    /// The base address was refused.
    BaseAddressRejected(i32),
    /// The MTU request was refused.
    MtuRejected(i32),
    /// Advertising data or parameters were refused.
    AdvertisingFailed(i32),
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for RadioError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InitFailed(rc) => write!(f, "BLE stack init failed (rc={})", rc),
            Self::BaseAddressRejected(rc) => write!(f, "base address rejected (rc={})", rc),
            Self::MtuRejected(rc) => write!(f, "local MTU rejected (rc={})", rc),
            Self::AdvertisingFailed(rc) => write!(f, "advertising failed (rc={})", rc),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
