//! Bluetooth device addresses and base-address derivation.
//!
//! The radio stack derives the public BLE address from a lower "base"
//! address burned into (or overridden in) the MCU. To advertise a chosen
//! public address, the firmware programs a base address that sits exactly
//! [`BASE_ADDRESS_OFFSET`] below it.
//!
//! Text form is six colon-separated uppercase hex octets
//! (`7C:88:99:94:E8:62`). Parsing is lenient about case and about the
//! colons themselves: the colons are stripped and the remaining digits
//! must decode to exactly six octets.

use core::fmt;
use core::str::FromStr;

use data_encoding::HEXUPPER_PERMISSIVE;

/// Distance between the advertised address and the base address, applied
/// to the last octet.
pub const BASE_ADDRESS_OFFSET: u8 = 1;

const MAC_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacError {
    /// The text contained something other than hex digits and colons.
    InvalidHex,
    /// The digits decoded to the wrong number of octets.
    WrongLength(usize),
    /// The last octet is `0x00`; a base address below it does not exist.
    BaseUnderflow,
}

impl fmt::Display for MacError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHex => write!(f, "address is not colon-separated hex"),
            Self::WrongLength(n) => write!(f, "address has {} octets, expected {}", n, MAC_LEN),
            Self::BaseUnderflow => write!(f, "last octet is 00, base address would underflow"),
        }
    }
}

/// A 6-byte Bluetooth device address, most significant octet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress(pub [u8; MAC_LEN]);

impl MacAddress {
    pub const fn new(octets: [u8; MAC_LEN]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; MAC_LEN] {
        self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            a, b, c, d, e, g
        )
    }
}

impl FromStr for MacAddress {
    type Err = MacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(|c| *c != ':').collect();
        let bytes = HEXUPPER_PERMISSIVE
            .decode(digits.as_bytes())
            .map_err(|_| MacError::InvalidHex)?;
        let octets: [u8; MAC_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| MacError::WrongLength(bytes.len()))?;
        Ok(Self(octets))
    }
}

/// Compute the hardware base address for a desired advertised address.
///
/// Returns [`MacError::BaseUnderflow`] when the last octet is `0x00`
/// instead of wrapping to `0xFF` (the carry would have to propagate into
/// the vendor-assigned part of the address).
pub fn derive_base(target: MacAddress) -> Result<MacAddress, MacError> {
    let mut octets = target.0;
    octets[MAC_LEN - 1] = octets[MAC_LEN - 1]
        .checked_sub(BASE_ADDRESS_OFFSET)
        .ok_or(MacError::BaseUnderflow)?;
    Ok(MacAddress(octets))
}
