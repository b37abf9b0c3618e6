//! Configurable BLE advertising beacon firmware library.
//!
//! Exposes the pure-logic modules for integration testing. All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod advertiser;
pub mod app;
pub mod config;
pub mod config_store;
pub mod error;
pub mod events;
pub mod mac;
pub mod pins;
pub mod provisioning;

pub mod adapters;
pub mod drivers;
