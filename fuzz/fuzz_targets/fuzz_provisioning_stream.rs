//! Fuzz target: provisioning state machine
//!
//! Interprets the input as a stream of radio events and drives
//! `BeaconService::handle_event` with it. The machine must never panic,
//! must save at most once, and must restart exactly when it saved.
//!
//! Input layout, repeated: `op conn len bytes[len]`, where `op % 3`
//! selects connect / disconnect / write.
//!
//! cargo fuzz run fuzz_provisioning_stream

#![no_main]

use std::collections::HashMap;

use beacon::app::events::BeaconEvent;
use beacon::app::ports::{
    AdvertisingParams, EventSink, IndicatorPort, RadioError, RadioPort, StorageError,
    StoragePort, SystemPort,
};
use beacon::app::service::BeaconService;
use beacon::config::BeaconConfig;
use beacon::config_store::ConfigStore;
use beacon::events::RadioEvent;
use beacon::mac::MacAddress;
use beacon::provisioning::ProvisioningState;
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct Board {
    restarts: usize,
}

impl RadioPort for Board {
    fn set_base_address(&mut self, _: MacAddress) -> Result<(), RadioError> {
        Ok(())
    }
    fn activate(&mut self) -> Result<(), RadioError> {
        Ok(())
    }
    fn set_local_mtu(&mut self, _: u16) -> Result<(), RadioError> {
        Ok(())
    }
    fn start_advertising(&mut self, _: &AdvertisingParams) -> Result<(), RadioError> {
        Ok(())
    }
}

impl IndicatorPort for Board {
    fn set_left(&mut self, _: bool) {}
    fn set_right(&mut self, _: bool) {}
}

impl SystemPort for Board {
    fn uptime_ms(&self) -> u32 {
        0
    }
    fn delay_ms(&mut self, _: u32) {}
    fn restart(&mut self) {
        self.restarts += 1;
    }
}

#[derive(Default)]
struct MemStore {
    data: HashMap<String, Vec<u8>>,
    writes: usize,
}

impl StoragePort for MemStore {
    fn read(&self, ns: &str, k: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let v = self
            .data
            .get(&format!("{ns}::{k}"))
            .ok_or(StorageError::NotFound)?;
        let n = v.len().min(buf.len());
        buf[..n].copy_from_slice(&v[..n]);
        Ok(n)
    }
    fn write(&mut self, ns: &str, k: &str, d: &[u8]) -> Result<(), StorageError> {
        self.writes += 1;
        self.data.insert(format!("{ns}::{k}"), d.to_vec());
        Ok(())
    }
    fn delete(&mut self, ns: &str, k: &str) -> Result<(), StorageError> {
        self.data.remove(&format!("{ns}::{k}"));
        Ok(())
    }
    fn exists(&self, ns: &str, k: &str) -> bool {
        self.data.contains_key(&format!("{ns}::{k}"))
    }
}

struct Quiet;

impl EventSink for Quiet {
    fn emit(&mut self, _: &BeaconEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let mut svc = BeaconService::new(BeaconConfig::default());
    let mut hw = Board::default();
    let mut store = ConfigStore::new(MemStore::default());

    let mut rest = data;
    while let [op, conn, len, tail @ ..] = rest {
        let conn = u16::from(*conn % 4);
        let event = match op % 3 {
            0 => RadioEvent::Connected { conn },
            1 => RadioEvent::Disconnected { conn },
            _ => {
                let n = usize::from(*len).min(tail.len());
                let (chunk, remaining) = tail.split_at(n);
                rest = remaining;
                // `len` is a u8, so the chunk always fits one write.
                let Some(event) = RadioEvent::write(conn, chunk) else {
                    unreachable!();
                };
                svc.handle_event(event, &mut hw, &mut store, &mut Quiet);
                continue;
            }
        };
        rest = tail;
        svc.handle_event(event, &mut hw, &mut store, &mut Quiet);
    }

    let saved = store.storage().writes;
    assert!(saved <= 1, "a session must never save twice");
    assert_eq!(hw.restarts, saved, "restart follows every save");
    assert_eq!(
        svc.state() == ProvisioningState::Committing,
        saved == 1,
        "committing exactly when saved"
    );
});
