//! Outbound domain events.
//!
//! The [`BeaconService`](super::service::BeaconService) and the
//! provisioning state machine emit these through the
//! [`EventSink`](super::ports::EventSink) port. The production sink logs
//! them; tests record them.

use crate::config::BeaconConfig;
use crate::events::ConnHandle;
use crate::mac::MacAddress;
use crate::provisioning::document::Rejection;
use crate::provisioning::ProvisioningState;

/// Structured events emitted by the beacon core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeaconEvent {
    /// Boot finished; the radio advertises `mac` from base address `base`.
    Booted { mac: MacAddress, base: MacAddress },

    /// Advertising (re)started. `fallback` is set when the configured
    /// payload could not be decoded and the default was used instead.
    AdvertisingStarted { fallback: bool },

    /// The provisioning state machine moved between states.
    StateChanged {
        from: ProvisioningState,
        to: ProvisioningState,
    },

    /// A framed document was rejected; the session keeps accumulating.
    DocumentRejected(Rejection),

    /// A write arrived from a connection that does not own the session.
    ForeignWriteDropped { conn: ConnHandle },

    /// The pending fragments exceeded the reassembly limit and were dropped.
    BufferOverflow { discarded: usize },

    /// A new configuration was persisted; restart follows.
    Committed(BeaconConfig),
}
