//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                            | Connects to               |
//! |------------|---------------------------------------|---------------------------|
//! | `ble`      | RadioPort                             | Bluedroid GAP/GATTS       |
//! | `hardware` | RadioPort, IndicatorPort, SystemPort  | radio + LEDs + system     |
//! | `log_sink` | EventSink                             | Serial log output         |
//! | `nvs`      | StoragePort                           | NVS / in-memory store     |
//! | `system`   | SystemPort                            | ESP timer, FreeRTOS, reset|

pub mod ble;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod system;
