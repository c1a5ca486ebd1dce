//! # Address
//!
//! A 32-byte identity. Holder addresses are Ed25519 public keys and sit on
//! the curve; derived record addresses are SHA-256 outputs that were chosen
//! to sit *off* it, so no private key can ever sign for them.

use curve25519_dalek::edwards::CompressedEdwardsY;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Errors from parsing an [`Address`].
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("invalid base58: {0}")]
    InvalidBase58(#[from] bs58::decode::Error),

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid address length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// A 32-byte ledger address.
///
/// Serializes as a base58 string in human-readable formats (JSON) and as
/// raw bytes in binary ones (bincode), so ledger records stay compact while
/// CLI output stays legible.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 32]);

impl Address {
    /// Wraps raw bytes. `const` so program identities can be constants.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Builds an address from a slice, checking the length.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, AddressError> {
        let bytes: [u8; 32] = slice
            .try_into()
            .map_err(|_| AddressError::InvalidLength(slice.len()))?;
        Ok(Self(bytes))
    }

    /// Base58 encoding, the canonical display form.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    /// Parses a base58-encoded address.
    pub fn from_base58(s: &str) -> Result<Self, AddressError> {
        let bytes = bs58::decode(s).into_vec()?;
        Self::try_from_slice(&bytes)
    }

    /// Hex encoding, matching how raw ledger keys are dumped.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hex-encoded address.
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let bytes = hex::decode(s)?;
        Self::try_from_slice(&bytes)
    }

    /// Returns `true` if these bytes decompress to an Ed25519 point.
    ///
    /// An on-curve address *might* have a private key behind it. An
    /// off-curve one cannot: there is no scalar whose public key it is.
    pub fn is_on_curve(&self) -> bool {
        CompressedEdwardsY(self.0).decompress().is_some()
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl std::str::FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_base58())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_base58(&s).map_err(serde::de::Error::custom)
        } else {
            <[u8; 32]>::deserialize(deserializer).map(Self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::Keypair;

    #[test]
    fn base58_roundtrip() {
        let addr = Address::new([42u8; 32]);
        let parsed: Address = addr.to_base58().parse().unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn wrong_length_rejected() {
        let short = bs58::encode([1u8; 31]).into_string();
        assert!(matches!(
            Address::from_base58(&short),
            Err(AddressError::InvalidLength(31))
        ));
        assert!(Address::from_hex("abcd").is_err());
    }

    #[test]
    fn garbage_base58_rejected() {
        // '0', 'O', 'I' and 'l' are not in the base58 alphabet.
        assert!(matches!(
            Address::from_base58("0OIl"),
            Err(AddressError::InvalidBase58(_))
        ));
    }

    #[test]
    fn public_keys_are_on_curve() {
        for _ in 0..8 {
            let kp = Keypair::generate();
            assert!(kp.address().is_on_curve());
        }
    }

    #[test]
    fn ed25519_basepoint_is_on_curve() {
        let basepoint =
            Address::from_hex("5866666666666666666666666666666666666666666666666666666666666666")
                .unwrap();
        assert!(basepoint.is_on_curve());
    }

    #[test]
    fn hex_form_is_the_raw_key() {
        let addr = Address::new([0xAB; 32]);
        assert_eq!(addr.to_hex(), "ab".repeat(32));
        assert_eq!(Address::from_hex(&addr.to_hex()).unwrap(), addr);
    }

    #[test]
    fn json_uses_base58_string() {
        let addr = Address::new([9u8; 32]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.to_base58()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn bincode_uses_raw_bytes() {
        let addr = Address::new([3u8; 32]);
        let bytes = bincode::serialize(&addr).unwrap();
        assert_eq!(bytes.len(), 32);
        let back: Address = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, addr);
    }
}
