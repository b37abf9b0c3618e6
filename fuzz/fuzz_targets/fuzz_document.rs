//! Fuzz target: `document::assess`
//!
//! Feeds arbitrary bytes through the reassembly buffer and the validator.
//! Anything accepted must be canonical and programmable: the stored text
//! re-validates to itself and the address has a base.
//!
//! cargo fuzz run fuzz_document

#![no_main]

use beacon::mac;
use beacon::provisioning::document::{self, Assessment};
use beacon::provisioning::reassembly::ReassemblyBuffer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut buf = ReassemblyBuffer::new();
    if buf.append(data).is_err() {
        assert!(buf.is_empty(), "overflow must discard pending bytes");
        return;
    }
    let Some(text) = buf.text() else {
        return;
    };

    if let Assessment::Valid(config) = document::assess(text) {
        let address = config.mac_address().expect("accepted mac must parse");
        assert!(mac::derive_base(address).is_ok());
        assert_eq!(config.mac, address.to_string());
        assert!(config.advertisement_payload().is_ok());

        let json = serde_json::to_string(&config).expect("config serialises");
        assert_eq!(document::validate(&json), Ok(config));
    }
});
