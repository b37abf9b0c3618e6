//! Provisioning document validation.
//!
//! A framed buffer is assessed into one of three outcomes:
//!
//! | Outcome      | Meaning                                          |
//! |--------------|--------------------------------------------------|
//! | `Incomplete` | framing not closed yet, keep accumulating        |
//! | `Invalid`    | complete but unusable, with the reason           |
//! | `Valid`      | a candidate [`BeaconConfig`] in canonical form   |
//!
//! Wire format: `{"mac": "<colon-hex>", "adv_hex": "<hex>"}`. Unknown
//! fields are ignored.

use core::fmt;

use serde_json::Value;

use super::reassembly::{Framing, scan_framing};
use crate::config::{self, BeaconConfig};
use crate::mac::{self, MacAddress, MacError};

pub const FIELD_MAC: &str = "mac";
pub const FIELD_ADV_HEX: &str = "adv_hex";

/// Why a complete document was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Not parseable as JSON.
    MalformedJson,
    /// Valid JSON, but not an object.
    NotAnObject,
    /// A required field is absent.
    MissingField(&'static str),
    /// A required field is present but not a string.
    FieldNotString(&'static str),
    /// `mac` is not six hex octets, or has no base address.
    BadMac(MacError),
    /// `adv_hex` is not an even-length hex string.
    BadPayloadHex,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson => write!(f, "document is not valid JSON"),
            Self::NotAnObject => write!(f, "document is not a JSON object"),
            Self::MissingField(name) => write!(f, "missing field '{}'", name),
            Self::FieldNotString(name) => write!(f, "field '{}' is not a string", name),
            Self::BadMac(e) => write!(f, "bad mac: {}", e),
            Self::BadPayloadHex => write!(f, "adv_hex is not valid hex"),
        }
    }
}

/// Tri-state outcome of [`assess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assessment {
    Incomplete,
    Invalid(Rejection),
    Valid(BeaconConfig),
}

/// Assess the reassembled text of a provisioning session.
pub fn assess(text: &str) -> Assessment {
    if scan_framing(text) == Framing::Incomplete {
        return Assessment::Incomplete;
    }
    match validate(text.trim()) {
        Ok(config) => Assessment::Valid(config),
        Err(reason) => Assessment::Invalid(reason),
    }
}

/// Parse and validate a complete document into canonical form.
pub fn validate(text: &str) -> Result<BeaconConfig, Rejection> {
    let value: Value = serde_json::from_str(text).map_err(|_| Rejection::MalformedJson)?;
    let obj = value.as_object().ok_or(Rejection::NotAnObject)?;

    let mac_text = string_field(obj, FIELD_MAC)?;
    let adv_text = string_field(obj, FIELD_ADV_HEX)?;

    let mac: MacAddress = mac_text.parse().map_err(Rejection::BadMac)?;
    // Only addresses the radio can actually be programmed with are accepted.
    mac::derive_base(mac).map_err(Rejection::BadMac)?;

    let payload = config::decode_hex(adv_text).map_err(|_| Rejection::BadPayloadHex)?;

    Ok(BeaconConfig::from_parts(mac, &payload))
}

fn string_field<'a>(
    obj: &'a serde_json::Map<String, Value>,
    name: &'static str,
) -> Result<&'a str, Rejection> {
    obj.get(name)
        .ok_or(Rejection::MissingField(name))?
        .as_str()
        .ok_or(Rejection::FieldNotString(name))
}
