//! Application core: pure domain logic, zero I/O.
//!
//! The boot sequence and radio event dispatch live here. All interaction
//! with hardware happens through the **port traits** in [`ports`],
//! keeping this layer testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
