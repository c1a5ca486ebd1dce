//! # Key Management
//!
//! Ed25519 keypairs for holder identities. A holder's [`Address`] *is* its
//! public key, which is why holder addresses sit on the curve and derived
//! record addresses deliberately do not.
//!
//! ## Security considerations
//!
//! - Private keys are zeroized on drop (ed25519-dalek does this for us).
//! - Key generation uses `OsRng`.
//! - Secret bytes are never logged. `Debug` prints only the public half.

use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH,
    SIGNATURE_LENGTH,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::address::Address;

/// Errors from loading key material.
///
/// Deliberately vague about *why* a secret failed to parse.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: expected {SECRET_KEY_LENGTH} bytes of hex")]
    InvalidSecretKey,

    #[error("invalid signature bytes: expected {SIGNATURE_LENGTH} bytes")]
    InvalidSignature,
}

/// An Ed25519 holder keypair.
///
/// Intentionally not `Serialize`. Exporting a secret should be a deliberate
/// call to [`secret_hex`](Self::secret_hex), not a side effect of dumping a
/// struct to JSON.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generates a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Builds a keypair from a 32-byte secret seed.
    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Loads a keypair from a hex-encoded 32-byte secret, the format the
    /// CLI writes key files in. Surrounding whitespace is ignored.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str.trim()).map_err(|_| KeyError::InvalidSecretKey)?;
        let seed: [u8; SECRET_KEY_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self::from_seed(&seed))
    }

    /// Hex-encoded secret. **Handle with care.**
    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// The holder address: this keypair's public key.
    pub fn address(&self) -> Address {
        Address::new(self.signing_key.verifying_key().to_bytes())
    }

    /// Signs `message`. Deterministic per RFC 8032.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }
}

impl Clone for Keypair {
    fn clone(&self) -> Self {
        Self::from_seed(&self.signing_key.to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair(pub={})", self.address())
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "signature_bytes")] [u8; SIGNATURE_LENGTH]);

impl Signature {
    /// Parses a signature from a byte slice.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; SIGNATURE_LENGTH] =
            slice.try_into().map_err(|_| KeyError::InvalidSignature)?;
        Ok(Self(bytes))
    }

    /// Raw signature bytes.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        self.0
    }

    /// Returns `true` if this is a valid signature by `signer` over
    /// `message`.
    ///
    /// A boolean rather than a `Result`: callers only need yes/no, and a
    /// detailed failure reason is an oracle we don't want to hand out.
    /// Off-curve signers (derived addresses) always fail.
    pub fn verify(&self, signer: &Address, message: &[u8]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(signer.as_bytes()) else {
            return false;
        };
        let signature = DalekSignature::from_bytes(&self.0);
        verifying_key.verify(message, &signature).is_ok()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &hex::encode(self.0)[..16])
    }
}

/// serde only derives for arrays up to 32 elements; route the 64-byte
/// signature through a byte slice instead.
mod signature_bytes {
    use ed25519_dalek::SIGNATURE_LENGTH;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &[u8; SIGNATURE_LENGTH],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(bytes)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[u8; SIGNATURE_LENGTH], D::Error> {
        let bytes: Vec<u8> = Deserialize::deserialize(deserializer)?;
        bytes
            .as_slice()
            .try_into()
            .map_err(|_| serde::de::Error::invalid_length(bytes.len(), &"64 bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify() {
        let kp = Keypair::generate();
        let sig = kp.sign(b"move 1 token");
        assert!(sig.verify(&kp.address(), b"move 1 token"));
    }

    #[test]
    fn verify_rejects_wrong_message_and_signer() {
        let kp = Keypair::generate();
        let other = Keypair::generate();
        let sig = kp.sign(b"move 1 token");
        assert!(!sig.verify(&kp.address(), b"move 2 tokens"));
        assert!(!sig.verify(&other.address(), b"move 1 token"));
    }

    #[test]
    fn hex_secret_roundtrip() {
        let kp = Keypair::generate();
        let restored = Keypair::from_hex(&format!("{}\n", kp.secret_hex())).unwrap();
        assert_eq!(kp.address(), restored.address());
    }

    #[test]
    fn bad_hex_rejected() {
        assert!(Keypair::from_hex("not hex").is_err());
        assert!(Keypair::from_hex("abcd").is_err());
    }

    #[test]
    fn seed_is_deterministic() {
        let a = Keypair::from_seed(&[5u8; 32]);
        let b = Keypair::from_seed(&[5u8; 32]);
        assert_eq!(a.address(), b.address());
        assert_eq!(a.sign(b"x"), b.sign(b"x"));
    }

    #[test]
    fn debug_never_prints_secret() {
        let kp = Keypair::from_seed(&[0xAB; 32]);
        let printed = format!("{kp:?}");
        assert!(!printed.contains(&kp.secret_hex()));
    }

    #[test]
    fn signature_slice_length_checked() {
        assert!(Signature::try_from_slice(&[0u8; 63]).is_err());
        assert!(Signature::try_from_slice(&[0u8; 64]).is_ok());
    }

    #[test]
    fn signature_bincode_roundtrip() {
        let kp = Keypair::generate();
        let sig = kp.sign(b"payload");
        let bytes = bincode::serialize(&sig).unwrap();
        let back: Signature = bincode::deserialize(&bytes).unwrap();
        assert_eq!(sig, back);
    }
}
