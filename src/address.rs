//! Bech32 addresses
//!
//! An address is a 32-byte Ed25519 public key displayed as bech32 text under a
//! human-readable prefix (`drt` on the main network). The checksum itself is
//! handled by the `bech32` crate; this module only enforces the payload shape.
//!
//! Only the lowercase, classic Bech32 form is accepted. The network renders
//! addresses that way from the public key, so any other spelling of the same
//! key would end up in signed bytes the network cannot reproduce.

use crate::constants::{DEFAULT_HRP, PUBKEY_LENGTH};
use crate::error::{DrtxError, Result};
use bech32::primitives::decode::CheckedHrpstring;
use bech32::primitives::iter::{ByteIterExt, Fe32IterExt};
use bech32::{Bech32, Hrp};
use std::fmt;
use std::str::FromStr;

/// A validated account address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pubkey: [u8; PUBKEY_LENGTH],
    hrp: Hrp,
    bech32: String,
}

impl Address {
    /// Build an address from a raw public key and a human-readable prefix
    pub fn new(pubkey: [u8; PUBKEY_LENGTH], hrp: &str) -> Result<Self> {
        let hrp = Hrp::parse(hrp)
            .map_err(|e| DrtxError::InvalidAddress(format!("invalid prefix {:?}: {}", hrp, e)))?;
        Ok(Self::with_hrp(pubkey, hrp))
    }

    /// Build an address under the default `drt` prefix
    pub fn from_pubkey(pubkey: [u8; PUBKEY_LENGTH]) -> Self {
        Self::with_hrp(pubkey, Hrp::parse_unchecked(DEFAULT_HRP))
    }

    fn with_hrp(pubkey: [u8; PUBKEY_LENGTH], hrp: Hrp) -> Self {
        let bech32 = pubkey
            .iter()
            .copied()
            .bytes_to_fes()
            .with_checksum::<Bech32>(&hrp)
            .chars()
            .collect();
        Self { pubkey, hrp, bech32 }
    }

    /// Decode bech32 text, rejecting anything that is not a lowercase Bech32
    /// string carrying a 32-byte payload
    pub fn from_bech32(text: &str) -> Result<Self> {
        if text.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(DrtxError::InvalidAddress(format!(
                "address {:?} must be lowercase",
                text
            )));
        }

        let checked = CheckedHrpstring::new::<Bech32>(text)?;
        let hrp = checked.hrp();
        let data: Vec<u8> = checked.byte_iter().collect();

        let pubkey: [u8; PUBKEY_LENGTH] = data.as_slice().try_into().map_err(|_| {
            DrtxError::InvalidAddress(format!(
                "expected a {}-byte public key, got {} bytes",
                PUBKEY_LENGTH,
                data.len()
            ))
        })?;

        Ok(Self {
            pubkey,
            hrp,
            bech32: text.to_string(),
        })
    }

    /// Decode a hex-encoded public key under the given prefix
    pub fn from_hex(pubkey_hex: &str, hrp: &str) -> Result<Self> {
        let bytes = hex::decode(pubkey_hex)?;
        let pubkey: [u8; PUBKEY_LENGTH] = bytes.as_slice().try_into().map_err(|_| {
            DrtxError::InvalidAddress(format!(
                "expected {} hex-encoded bytes, got {}",
                PUBKEY_LENGTH,
                bytes.len()
            ))
        })?;
        Self::new(pubkey, hrp)
    }

    pub fn pubkey(&self) -> &[u8; PUBKEY_LENGTH] {
        &self.pubkey
    }

    pub fn hrp(&self) -> String {
        self.hrp.to_string()
    }

    pub fn to_bech32(&self) -> &str {
        &self.bech32
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.pubkey)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bech32)
    }
}

impl FromStr for Address {
    type Err = DrtxError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_bech32(s)
    }
}

/// Validate bech32 text and return the raw public key it carries
pub fn validate_and_decode(text: &str) -> Result<[u8; PUBKEY_LENGTH]> {
    Address::from_bech32(text).map(|address| address.pubkey)
}

/// Check whether `text` is a well-formed address
pub fn is_valid_bech32(text: &str) -> bool {
    Address::from_bech32(text).is_ok()
}
