//! End-to-end provisioning flow through `BeaconService::handle_event`.
//!
//! Radio events are fed exactly as the bridge queue would deliver them;
//! storage, radio, indicators and restart are mocks.

use crate::mock_hw::{HwCall, MockHw, MockStorage, RecordingSink};
use beacon::app::events::BeaconEvent;
use beacon::app::service::BeaconService;
use beacon::config::{self, BeaconConfig};
use beacon::config_store::ConfigStore;
use beacon::events::{ConnHandle, RadioEvent};
use beacon::provisioning::document::{FIELD_ADV_HEX, Rejection};
use beacon::provisioning::{ProvisioningState, WriteOutcome};

const DOC: &str = r#"{"mac":"AA:BB:CC:DD:EE:FF","adv_hex":"020106"}"#;

struct Fixture {
    svc: BeaconService,
    hw: MockHw,
    store: ConfigStore<MockStorage>,
    sink: RecordingSink,
}

impl Fixture {
    fn new() -> Self {
        Self::with_storage(MockStorage::new())
    }

    fn with_storage(storage: MockStorage) -> Self {
        let store = ConfigStore::new(storage);
        let mut svc = BeaconService::new(store.load());
        let mut hw = MockHw::new();
        let mut sink = RecordingSink::new();
        svc.boot(&mut hw, &mut sink).unwrap();
        hw.clear();
        sink.events.clear();
        Self {
            svc,
            hw,
            store,
            sink,
        }
    }

    fn send(&mut self, event: RadioEvent) -> Option<WriteOutcome> {
        self.svc
            .handle_event(event, &mut self.hw, &mut self.store, &mut self.sink)
    }

    fn connect(&mut self, conn: ConnHandle) {
        self.send(RadioEvent::Connected { conn });
    }

    fn disconnect(&mut self, conn: ConnHandle) {
        self.send(RadioEvent::Disconnected { conn });
    }

    fn write(&mut self, conn: ConnHandle, bytes: &[u8]) -> WriteOutcome {
        self.send(RadioEvent::write(conn, bytes).unwrap()).unwrap()
    }

    fn state(&self) -> ProvisioningState {
        self.svc.state()
    }

    fn saved(&self) -> Option<BeaconConfig> {
        self.store
            .storage()
            .record()
            .map(|raw| serde_json::from_slice(raw).unwrap())
    }
}

// ── Happy path ────────────────────────────────────────────────

#[test]
fn single_write_commits_and_restarts() {
    let mut f = Fixture::new();
    f.connect(1);
    assert_eq!(f.write(1, DOC.as_bytes()), WriteOutcome::Committed);

    assert_eq!(f.state(), ProvisioningState::Committing);
    assert_eq!(
        f.saved(),
        Some(BeaconConfig {
            mac: "AA:BB:CC:DD:EE:FF".into(),
            adv_hex: "020106".into(),
        })
    );
    assert_eq!(f.hw.restarts(), 1);
}

#[test]
fn commit_sequence_is_ack_settle_restart() {
    let mut f = Fixture::new();
    f.connect(1);
    f.write(1, DOC.as_bytes());

    let mut expected = Vec::new();
    for _ in 0..5 {
        expected.extend([
            HwCall::Right(true),
            HwCall::Delay(50),
            HwCall::Right(false),
            HwCall::Delay(50),
        ]);
    }
    expected.push(HwCall::Delay(1_000));
    expected.push(HwCall::Restart);
    assert_eq!(f.hw.calls, expected);
}

#[test]
fn committed_event_carries_saved_record() {
    let mut f = Fixture::new();
    f.connect(1);
    f.write(1, DOC.as_bytes());
    assert_eq!(f.store.storage().writes, 1);
    let committed: Vec<_> = f
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            BeaconEvent::Committed(c) => Some(c.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(committed, vec![f.saved().unwrap()]);
}

#[test]
fn fragmented_document_commits_once() {
    let mut f = Fixture::new();
    f.connect(1);
    assert_eq!(f.write(1, br#"{"mac":"AA:BB:CC:"#), WriteOutcome::Buffered);
    assert_eq!(f.state(), ProvisioningState::Accumulating);
    assert_eq!(f.write(1, br#"DD:EE:FF","adv_hex":"#), WriteOutcome::Buffered);
    assert_eq!(f.write(1, br#""020106"}"#), WriteOutcome::Committed);

    assert_eq!(f.saved().unwrap().mac, "AA:BB:CC:DD:EE:FF");
    assert_eq!(f.store.storage().writes, 1);
    assert_eq!(f.hw.restarts(), 1);
}

#[test]
fn three_fragment_document_split_inside_values() {
    let mut f = Fixture::new();
    f.connect(1);
    assert_eq!(f.write(1, br#"{"mac":"AA:BB:"#), WriteOutcome::Buffered);
    assert_eq!(
        f.write(1, br#"CC:DD:EE:FF","adv_hex":"0201"#),
        WriteOutcome::Buffered
    );
    assert_eq!(f.write(1, br#"06"}"#), WriteOutcome::Committed);

    assert_eq!(
        f.saved(),
        Some(BeaconConfig {
            mac: "AA:BB:CC:DD:EE:FF".into(),
            adv_hex: "020106".into(),
        })
    );
    assert_eq!(f.store.storage().writes, 1);
    assert_eq!(f.hw.restarts(), 1);
}

#[test]
fn saved_values_are_canonical() {
    let mut f = Fixture::new();
    f.connect(1);
    f.write(
        1,
        br#" {"mac": "aa:bb:cc:dd:ee:ff", "adv_hex": "0201060303aafe", "extra": true} "#,
    );
    let saved = f.saved().unwrap();
    assert_eq!(saved.mac, "AA:BB:CC:DD:EE:FF");
    assert_eq!(saved.adv_hex, "0201060303AAFE");
}

#[test]
fn committed_config_is_used_after_restart() {
    let mut f = Fixture::new();
    f.connect(1);
    f.write(1, DOC.as_bytes());

    // Simulated reboot on the same flash.
    let mut next = Fixture::with_storage(std::mem::take(f.store.storage_mut()));
    assert_eq!(next.svc.config().mac, "AA:BB:CC:DD:EE:FF");
    next.disconnect(9);
    assert_eq!(next.hw.adverts()[0].adv_data, vec![0x02, 0x01, 0x06]);
}

#[test]
fn write_before_connect_opens_session() {
    let mut f = Fixture::new();
    assert_eq!(f.write(4, br#"{"mac":"#), WriteOutcome::Buffered);
    assert_eq!(f.svc.provisioning().session(), Some(4));
    f.connect(4);
    assert_eq!(f.write(4, br#""AA:BB:CC:DD:EE:FF","adv_hex":"02"}"#), WriteOutcome::Committed);
}

// ── Rejections ────────────────────────────────────────────────

#[test]
fn invalid_json_is_not_saved_and_keeps_accumulating() {
    let mut f = Fixture::new();
    f.connect(1);
    assert_eq!(
        f.write(1, br#"{"mac":,}"#),
        WriteOutcome::Rejected(Rejection::MalformedJson)
    );
    assert_eq!(f.state(), ProvisioningState::Accumulating);
    assert!(f.saved().is_none());
    assert_eq!(f.hw.restarts(), 0);
    assert_eq!(
        f.sink.events.last(),
        Some(&BeaconEvent::DocumentRejected(Rejection::MalformedJson))
    );
}

#[test]
fn missing_field_is_not_saved() {
    let mut f = Fixture::new();
    f.connect(1);
    assert_eq!(
        f.write(1, br#"{"mac":"AA:BB:CC:DD:EE:FF"}"#),
        WriteOutcome::Rejected(Rejection::MissingField(FIELD_ADV_HEX))
    );
    assert_eq!(f.state(), ProvisioningState::Accumulating);
    assert_eq!(
        f.svc.provisioning().last_rejection(),
        Some(Rejection::MissingField(FIELD_ADV_HEX))
    );
    assert!(f.saved().is_none());
}

#[test]
fn rejected_document_stays_buffered_until_disconnect() {
    let mut f = Fixture::new();
    f.connect(1);
    f.write(1, b"{\"oops\":1}");
    assert_eq!(f.svc.provisioning().buffered_len(), 10);
    // Appending to a rejected document can never produce a valid one.
    assert!(matches!(f.write(1, DOC.as_bytes()), WriteOutcome::Rejected(_)));

    f.disconnect(1);
    assert_eq!(f.state(), ProvisioningState::Idle);
    assert_eq!(f.svc.provisioning().last_rejection(), None);
    f.connect(2);
    assert_eq!(f.write(2, DOC.as_bytes()), WriteOutcome::Committed);
}

#[test]
fn bad_hex_and_unusable_mac_are_rejected() {
    let mut f = Fixture::new();
    f.connect(1);
    assert_eq!(
        f.write(1, br#"{"mac":"AA:BB:CC:DD:EE:FF","adv_hex":"123"}"#),
        WriteOutcome::Rejected(Rejection::BadPayloadHex)
    );
    f.disconnect(1);
    f.connect(1);
    assert!(matches!(
        f.write(1, br#"{"mac":"AA:BB:CC:DD:EE:00","adv_hex":"02"}"#),
        WriteOutcome::Rejected(Rejection::BadMac(_))
    ));
    assert!(f.saved().is_none());
}

#[test]
fn brace_inside_string_does_not_trigger_parse() {
    let mut f = Fixture::new();
    f.connect(1);
    assert_eq!(
        f.write(1, br#"{"adv_hex":"020106","note":"}"#),
        WriteOutcome::Buffered
    );
    assert_eq!(f.sink.count(|e| matches!(e, BeaconEvent::DocumentRejected(_))), 0);
    assert_eq!(
        f.write(1, br#"","mac":"AA:BB:CC:DD:EE:FF"}"#),
        WriteOutcome::Committed
    );
}

#[test]
fn character_split_across_writes() {
    let doc = r#"{"mac":"AA:BB:CC:DD:EE:FF","adv_hex":"02","name":"café"}"#.as_bytes();
    let cut = doc.len() - 3; // inside the two-byte 'é'
    let mut f = Fixture::new();
    f.connect(1);
    assert_eq!(f.write(1, &doc[..cut]), WriteOutcome::Buffered);
    assert_eq!(f.write(1, &doc[cut..]), WriteOutcome::Committed);
}

// ── Sessions ──────────────────────────────────────────────────

#[test]
fn disconnect_mid_stream_clears_buffer_and_readvertises() {
    let mut f = Fixture::new();
    f.connect(1);
    f.write(1, br#"{"mac":"AA:BB:CC:DD:EE:FF","#);
    f.disconnect(1);

    assert_eq!(f.state(), ProvisioningState::Idle);
    assert_eq!(f.svc.provisioning().buffered_len(), 0);
    let adverts = f.hw.adverts();
    assert_eq!(adverts.len(), 1);
    assert_eq!(adverts[0].adv_data, config::default_payload());

    // Remainder of the old document alone is not valid.
    f.connect(2);
    assert!(matches!(
        f.write(2, br#""adv_hex":"020106"}"#),
        WriteOutcome::Rejected(_)
    ));
    assert!(f.saved().is_none());
}

#[test]
fn disconnect_while_idle_readvertises() {
    let mut f = Fixture::new();
    f.disconnect(3);
    assert_eq!(f.hw.adverts().len(), 1);
    assert_eq!(f.state(), ProvisioningState::Idle);
}

#[test]
fn foreign_writes_are_dropped() {
    let mut f = Fixture::new();
    f.connect(1);
    f.write(1, br#"{"mac":"AA:BB:CC:DD:EE:FF","#);
    assert_eq!(f.write(2, br#"{"mac":"11:22:33:44:55:66","adv_hex":"02"}"#), WriteOutcome::Ignored);
    assert_eq!(f.sink.count(|e| *e == BeaconEvent::ForeignWriteDropped { conn: 2 }), 1);
    assert_eq!(f.write(1, br#""adv_hex":"020106"}"#), WriteOutcome::Committed);
    assert_eq!(f.saved().unwrap().mac, "AA:BB:CC:DD:EE:FF");
}

#[test]
fn second_connection_does_not_disturb_session() {
    let mut f = Fixture::new();
    f.connect(1);
    f.write(1, br#"{"mac":"AA:BB:CC:DD:EE:FF","#);
    f.connect(2);
    f.disconnect(2);
    assert_eq!(f.state(), ProvisioningState::Accumulating);
    assert_eq!(f.svc.provisioning().session(), Some(1));
    assert!(f.hw.adverts().is_empty());
    assert_eq!(f.write(1, br#""adv_hex":"020106"}"#), WriteOutcome::Committed);
}

#[test]
fn overflow_discards_pending_bytes() {
    let mut f = Fixture::new();
    f.connect(1);
    let filler = [b' '; 500];
    for _ in 0..4 {
        assert_eq!(f.write(1, &filler), WriteOutcome::Buffered);
    }
    assert_eq!(f.write(1, &filler), WriteOutcome::Overflowed);
    assert_eq!(f.svc.provisioning().buffered_len(), 0);
    assert_eq!(f.state(), ProvisioningState::Connected);
    assert!(f
        .sink
        .events
        .contains(&BeaconEvent::BufferOverflow { discarded: 2_500 }));

    assert_eq!(f.write(1, DOC.as_bytes()), WriteOutcome::Committed);
}

// ── Persistence failure and terminal state ────────────────────

#[test]
fn save_failure_returns_to_connected_without_restart() {
    let mut f = Fixture::with_storage(MockStorage::failing());
    f.connect(1);
    assert_eq!(f.write(1, DOC.as_bytes()), WriteOutcome::SaveFailed);
    assert_eq!(f.state(), ProvisioningState::Connected);
    assert_eq!(f.svc.provisioning().buffered_len(), 0);
    assert_eq!(f.hw.restarts(), 0);
    assert!(f.hw.calls.is_empty());

    f.store.storage_mut().fail_writes = false;
    assert_eq!(f.write(1, DOC.as_bytes()), WriteOutcome::Committed);
    assert_eq!(f.hw.restarts(), 1);
}

#[test]
fn events_after_commit_are_ignored() {
    let mut f = Fixture::new();
    f.connect(1);
    f.write(1, DOC.as_bytes());
    f.hw.clear();

    assert_eq!(f.write(1, DOC.as_bytes()), WriteOutcome::Ignored);
    f.disconnect(1);
    f.connect(2);
    assert_eq!(f.state(), ProvisioningState::Committing);
    assert!(f.hw.calls.is_empty());
    assert_eq!(f.store.storage().writes, 1);
}

#[test]
fn state_changes_are_reported() {
    let mut f = Fixture::new();
    f.connect(1);
    f.write(1, DOC.as_bytes());
    let transitions: Vec<_> = f
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            BeaconEvent::StateChanged { to, .. } => Some(*to),
            _ => None,
        })
        .collect();
    assert_eq!(
        transitions,
        vec![
            ProvisioningState::Connected,
            ProvisioningState::Accumulating,
            ProvisioningState::Committing,
        ]
    );
}
