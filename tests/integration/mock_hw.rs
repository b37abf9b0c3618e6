//! Mock adapters for integration tests.
//!
//! Records every port call so tests can assert on the full history
//! without touching a radio, GPIO or flash.

use beacon::app::events::BeaconEvent;
use beacon::app::ports::{
    AdvertisingParams, EventSink, IndicatorPort, RadioError, RadioPort, StorageError,
    StoragePort, SystemPort,
};
use beacon::mac::MacAddress;
use std::collections::HashMap;

// ── Hardware call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HwCall {
    SetBase(MacAddress),
    Activate,
    SetMtu(u16),
    Advertise(AdvertisingParams),
    Left(bool),
    Right(bool),
    Delay(u32),
    Restart,
}

// ── MockHw ────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockHw {
    pub calls: Vec<HwCall>,
    pub now_ms: u32,
    pub fail_base: bool,
    pub fail_mtu: bool,
    pub fail_advertise: bool,
}

#[allow(dead_code)]
impl MockHw {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn restarts(&self) -> usize {
        self.count(|c| matches!(c, HwCall::Restart))
    }

    pub fn adverts(&self) -> Vec<&AdvertisingParams> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Advertise(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn position(&self, pred: impl Fn(&HwCall) -> bool) -> Option<usize> {
        self.calls.iter().position(pred)
    }

    pub fn count(&self, pred: impl Fn(&HwCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

impl RadioPort for MockHw {
    fn set_base_address(&mut self, base: MacAddress) -> Result<(), RadioError> {
        self.calls.push(HwCall::SetBase(base));
        if self.fail_base {
            return Err(RadioError::BaseAddressRejected(0x102));
        }
        Ok(())
    }

    fn activate(&mut self) -> Result<(), RadioError> {
        self.calls.push(HwCall::Activate);
        Ok(())
    }

    fn set_local_mtu(&mut self, mtu: u16) -> Result<(), RadioError> {
        self.calls.push(HwCall::SetMtu(mtu));
        if self.fail_mtu {
            return Err(RadioError::MtuRejected(0x102));
        }
        Ok(())
    }

    fn start_advertising(&mut self, params: &AdvertisingParams) -> Result<(), RadioError> {
        self.calls.push(HwCall::Advertise(params.clone()));
        if self.fail_advertise {
            return Err(RadioError::AdvertisingFailed(-1));
        }
        Ok(())
    }
}

impl IndicatorPort for MockHw {
    fn set_left(&mut self, on: bool) {
        self.calls.push(HwCall::Left(on));
    }

    fn set_right(&mut self, on: bool) {
        self.calls.push(HwCall::Right(on));
    }
}

impl SystemPort for MockHw {
    fn uptime_ms(&self) -> u32 {
        self.now_ms
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls.push(HwCall::Delay(ms));
        self.now_ms = self.now_ms.wrapping_add(ms);
    }

    fn restart(&mut self) {
        self.calls.push(HwCall::Restart);
    }
}

// ── MockStorage ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockStorage {
    pub data: HashMap<String, Vec<u8>>,
    pub fail_writes: bool,
    pub writes: usize,
}

#[allow(dead_code)]
impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn with_record(raw: &[u8]) -> Self {
        let mut s = Self::default();
        s.data.insert("beacon::ble_config".into(), raw.to_vec());
        s
    }

    pub fn record(&self) -> Option<&[u8]> {
        self.data.get("beacon::ble_config").map(Vec::as_slice)
    }
}

impl StoragePort for MockStorage {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let data = self
            .data
            .get(&format!("{namespace}::{key}"))
            .ok_or(StorageError::NotFound)?;
        if data.len() > buf.len() {
            return Err(StorageError::IoError);
        }
        buf[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Full);
        }
        self.writes += 1;
        self.data.insert(format!("{namespace}::{key}"), data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.data.remove(&format!("{namespace}::{key}"));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.data.contains_key(&format!("{namespace}::{key}"))
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<BeaconEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&BeaconEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &BeaconEvent) {
        self.events.push(event.clone());
    }
}
