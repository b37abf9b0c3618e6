//! Boot sequence: identity, radio ordering, advertising and signalling.

use crate::mock_hw::{HwCall, MockHw, MockStorage, RecordingSink};
use beacon::advertiser::build_scan_response;
use beacon::app::events::BeaconEvent;
use beacon::app::ports::RadioError;
use beacon::app::service::BeaconService;
use beacon::config::{self, BeaconConfig, DEVICE_NAME};
use beacon::config_store::ConfigStore;
use beacon::error::BootError;
use beacon::mac::{MacAddress, MacError};

fn mac(s: &str) -> MacAddress {
    s.parse().unwrap()
}

fn booted(config: BeaconConfig) -> (BeaconService, MockHw, RecordingSink) {
    let mut svc = BeaconService::new(config);
    let mut hw = MockHw::new();
    let mut sink = RecordingSink::new();
    svc.boot(&mut hw, &mut sink).unwrap();
    (svc, hw, sink)
}

#[test]
fn default_boot_programs_base_one_below() {
    let (_, hw, sink) = booted(BeaconConfig::default());
    assert_eq!(hw.calls[0], HwCall::SetBase(mac("7C:88:99:94:E8:61")));
    assert_eq!(
        sink.events.last(),
        Some(&BeaconEvent::Booted {
            mac: mac("7C:88:99:94:E8:62"),
            base: mac("7C:88:99:94:E8:61"),
        })
    );
}

#[test]
fn base_address_precedes_activation_and_advertising() {
    let (_, hw, _) = booted(BeaconConfig::default());
    let base = hw.position(|c| matches!(c, HwCall::SetBase(_))).unwrap();
    let activate = hw.position(|c| matches!(c, HwCall::Activate)).unwrap();
    let mtu = hw.position(|c| matches!(c, HwCall::SetMtu(512))).unwrap();
    let adv = hw.position(|c| matches!(c, HwCall::Advertise(_))).unwrap();
    assert!(base < activate && activate < mtu && mtu < adv);
    assert_eq!(hw.count(|c| matches!(c, HwCall::SetBase(_))), 1);
}

#[test]
fn advertises_default_payload_and_name() {
    let (_, hw, sink) = booted(BeaconConfig::default());
    let adverts = hw.adverts();
    assert_eq!(adverts.len(), 1);
    assert_eq!(adverts[0].adv_data, config::default_payload());
    assert_eq!(adverts[0].interval_us, 100_000);
    assert_eq!(adverts[0].scan_response, build_scan_response(DEVICE_NAME).unwrap());
    assert!(sink
        .events
        .contains(&BeaconEvent::AdvertisingStarted { fallback: false }));
}

#[test]
fn boot_signal_blinks_both_three_times_after_advertising() {
    let (_, hw, _) = booted(BeaconConfig::default());
    let adv = hw.position(|c| matches!(c, HwCall::Advertise(_))).unwrap();
    let blinks: Vec<_> = hw.calls[adv + 1..].to_vec();
    let one = [
        HwCall::Left(true),
        HwCall::Right(true),
        HwCall::Delay(100),
        HwCall::Left(false),
        HwCall::Right(false),
        HwCall::Delay(100),
    ];
    let expected: Vec<HwCall> = one.iter().cloned().cycle().take(one.len() * 3).collect();
    assert_eq!(blinks, expected);
}

#[test]
fn mtu_refusal_is_not_fatal() {
    let mut svc = BeaconService::new(BeaconConfig::default());
    let mut hw = MockHw {
        fail_mtu: true,
        ..MockHw::default()
    };
    let mut sink = RecordingSink::new();
    assert!(svc.boot(&mut hw, &mut sink).is_ok());
    assert_eq!(hw.adverts().len(), 1);
}

#[test]
fn base_address_refusal_is_a_boot_fault() {
    let mut svc = BeaconService::new(BeaconConfig::default());
    let mut hw = MockHw {
        fail_base: true,
        ..MockHw::default()
    };
    let mut sink = RecordingSink::new();
    assert_eq!(
        svc.boot(&mut hw, &mut sink),
        Err(BootError::Radio(RadioError::BaseAddressRejected(0x102)))
    );
    assert!(hw.adverts().is_empty());
    assert!(!hw.calls.contains(&HwCall::Activate));
}

#[test]
fn underivable_address_is_a_boot_fault() {
    let cfg = BeaconConfig {
        mac: "AA:BB:CC:DD:EE:00".into(),
        ..BeaconConfig::default()
    };
    let mut svc = BeaconService::new(cfg);
    let mut hw = MockHw::new();
    let mut sink = RecordingSink::new();
    assert_eq!(
        svc.boot(&mut hw, &mut sink),
        Err(BootError::Address(MacError::BaseUnderflow))
    );
    assert!(hw.calls.is_empty());
}

#[test]
fn bad_payload_hex_falls_back_to_default() {
    let cfg = BeaconConfig {
        mac: "AA:BB:CC:DD:EE:FF".into(),
        adv_hex: "02010".into(),
    };
    let (_, hw, sink) = booted(cfg);
    assert_eq!(hw.adverts()[0].adv_data, config::default_payload());
    assert!(sink
        .events
        .contains(&BeaconEvent::AdvertisingStarted { fallback: true }));
}

#[test]
fn advertising_failure_does_not_fail_boot() {
    let mut svc = BeaconService::new(BeaconConfig::default());
    let mut hw = MockHw {
        fail_advertise: true,
        ..MockHw::default()
    };
    let mut sink = RecordingSink::new();
    assert!(svc.boot(&mut hw, &mut sink).is_ok());
    assert_eq!(
        sink.count(|e| matches!(e, BeaconEvent::AdvertisingStarted { .. })),
        0
    );
}

#[test]
fn corrupt_record_boots_with_default_identity() {
    let store = ConfigStore::new(MockStorage::with_record(b"{\"mac\":\"AA:BB"));
    let (_, hw, _) = booted(store.load());
    assert_eq!(hw.calls[0], HwCall::SetBase(mac("7C:88:99:94:E8:61")));
}

#[test]
fn stored_record_sets_identity_and_payload() {
    let store = ConfigStore::new(MockStorage::with_record(
        br#"{"mac":"11:22:33:44:55:66","adv_hex":"0201060303AAFE"}"#,
    ));
    let (svc, hw, _) = booted(store.load());
    assert_eq!(svc.config().mac, "11:22:33:44:55:66");
    assert_eq!(hw.calls[0], HwCall::SetBase(mac("11:22:33:44:55:65")));
    assert_eq!(
        hw.adverts()[0].adv_data,
        vec![0x02, 0x01, 0x06, 0x03, 0x03, 0xAA, 0xFE]
    );
}

#[test]
fn heartbeat_runs_on_left_indicator() {
    let (mut svc, mut hw, _) = booted(BeaconConfig::default());
    hw.clear();
    hw.now_ms = 10_000;

    svc.poll_heartbeat(&mut hw);
    assert_eq!(hw.calls, vec![HwCall::Left(true)]);

    hw.now_ms += 1_999;
    svc.poll_heartbeat(&mut hw);
    assert_eq!(hw.calls.len(), 1);

    hw.now_ms += 1;
    svc.poll_heartbeat(&mut hw);
    assert_eq!(hw.calls.last(), Some(&HwCall::Left(false)));

    hw.now_ms += 1_000;
    svc.poll_heartbeat(&mut hw);
    assert_eq!(hw.calls.last(), Some(&HwCall::Left(true)));
    assert!(!hw.calls.iter().any(|c| matches!(c, HwCall::Right(_))));
}
