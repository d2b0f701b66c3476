//! Wallet address type with `0x` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ValidationError;

/// A syntactically valid wallet address: `0x` followed by 40 hex digits.
///
/// Only the shape is checked. Mixed-case (EIP-55) checksums are not verified
/// and the original casing is preserved.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// The literal prefix every address starts with.
    pub const PREFIX: &'static str = "0x";

    /// Number of hex digits after the prefix.
    pub const HEX_DIGITS: usize = 40;

    /// Total address length in bytes.
    pub const LEN: usize = Self::PREFIX.len() + Self::HEX_DIGITS;

    /// Parse and validate an address.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let s = raw.into();
        if Self::is_valid_format(&s) {
            Ok(Self(s))
        } else {
            Err(ValidationError::InvalidAddress(s))
        }
    }

    /// Whether `s` has the `0x` + 40 hex digit shape.
    pub fn is_valid_format(s: &str) -> bool {
        s.len() == Self::LEN
            && s.starts_with(Self::PREFIX)
            && s[Self::PREFIX.len()..].bytes().all(|b| b.is_ascii_hexdigit())
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WalletAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<WalletAddress> for String {
    fn from(addr: WalletAddress) -> Self {
        addr.0
    }
}

impl AsRef<str> for WalletAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
