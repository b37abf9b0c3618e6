//! Boot-time error type.
//!
//! Runtime failures in the provisioning path are absorbed where they
//! happen (defaults, fallbacks, rejected documents). The only failures
//! that escape are the ones that leave the radio in an undefined state
//! during boot; `main` logs them and halts.

use core::fmt;

use crate::app::ports::RadioError;
use crate::mac::MacError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootError {
    /// The configured address has no valid base address.
    Address(MacError),
    /// The radio refused the base address or failed to come up.
    Radio(RadioError),
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(e) => write!(f, "address: {e}"),
            Self::Radio(e) => write!(f, "radio: {e}"),
        }
    }
}

impl std::error::Error for BootError {}

impl From<MacError> for BootError {
    fn from(e: MacError) -> Self {
        Self::Address(e)
    }
}

impl From<RadioError> for BootError {
    fn from(e: RadioError) -> Self {
        Self::Radio(e)
    }
}
