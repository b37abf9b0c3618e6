//! Persisted beacon configuration.
//!
//! The record is a small JSON document stored as one blob in NVS:
//!
//! ```text
//! namespace "beacon", key "ble_config"
//! { "mac": "AA:BB:CC:DD:EE:FF", "adv_hex": "<even-length hex>" }
//! ```
//!
//! [`ConfigStore::load`] never fails: a missing, truncated or otherwise
//! unusable record yields [`BeaconConfig::default`]. Writes are
//! best-effort; a power loss mid-write is recovered on the next boot by
//! the same fallback.

use core::fmt;

use log::{info, warn};

use crate::app::ports::{StorageError, StoragePort};
use crate::config::BeaconConfig;
use crate::mac;
use crate::provisioning::reassembly::MAX_DOCUMENT_LEN;

const CONFIG_NAMESPACE: &str = "beacon";
const CONFIG_KEY: &str = "ble_config";

/// A canonical record is at most a few bytes longer than the document
/// that produced it (colons added to a bare MAC).
const MAX_RECORD_LEN: usize = MAX_DOCUMENT_LEN + 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The record could not be serialised.
    Encode,
    /// The storage backend refused the operation.
    Storage(StorageError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode => write!(f, "record encoding failed"),
            Self::Storage(e) => write!(f, "storage: {e}"),
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

/// Loads and saves the [`BeaconConfig`] record through a [`StoragePort`].
pub struct ConfigStore<S> {
    storage: S,
}

impl<S: StoragePort> ConfigStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Load the persisted config, or the compiled-in default.
    pub fn load(&self) -> BeaconConfig {
        let mut buf = vec![0u8; MAX_RECORD_LEN];
        let len = match self.storage.read(CONFIG_NAMESPACE, CONFIG_KEY, &mut buf) {
            Ok(len) => len,
            Err(StorageError::NotFound) => {
                info!("ConfigStore: no stored config, using defaults");
                return BeaconConfig::default();
            }
            Err(e) => {
                warn!("ConfigStore: read failed ({}), using defaults", e);
                return BeaconConfig::default();
            }
        };

        let config: BeaconConfig = match serde_json::from_slice(&buf[..len]) {
            Ok(c) => c,
            Err(e) => {
                warn!("ConfigStore: record corrupt ({}), using defaults", e);
                return BeaconConfig::default();
            }
        };

        // A record whose address cannot be programmed would fail the boot;
        // treat it like any other corruption.
        if let Err(e) = config.mac_address().and_then(mac::derive_base) {
            warn!("ConfigStore: stored mac '{}' unusable ({}), using defaults", config.mac, e);
            return BeaconConfig::default();
        }

        info!("ConfigStore: loaded config (mac={}, {} bytes)", config.mac, len);
        config
    }

    /// Overwrite the persisted record.
    pub fn save(&mut self, config: &BeaconConfig) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(config).map_err(|_| StoreError::Encode)?;
        self.storage.write(CONFIG_NAMESPACE, CONFIG_KEY, &bytes)?;
        info!("ConfigStore: config saved ({} bytes)", bytes.len());
        Ok(())
    }

    /// Remove the record so the next boot uses the defaults.
    pub fn erase(&mut self) -> Result<(), StoreError> {
        self.storage.delete(CONFIG_NAMESPACE, CONFIG_KEY)?;
        info!("ConfigStore: config erased");
        Ok(())
    }

    pub fn has_record(&self) -> bool {
        self.storage.exists(CONFIG_NAMESPACE, CONFIG_KEY)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}
