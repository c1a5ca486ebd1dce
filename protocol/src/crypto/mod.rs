//! # Cryptographic Primitives
//!
//! The vault needs exactly two kinds of cryptography:
//!
//! - **Hashing** — SHA-256 for address derivation (the format is fixed by
//!   the addresses external tools already compute), BLAKE3 with derive-key
//!   domain separation for request digests.
//! - **Ed25519** — holder identities and the signatures that prove a
//!   transfer was authorized by its sender.
//!
//! Everything here is a thin wrapper around audited crates. The vault's own
//! authority never touches a private key at all; see
//! [`crate::vault::authority`].

pub mod hash;
pub mod keys;

pub use hash::{domain_separated_hash, sha256_multi};
pub use keys::{KeyError, Keypair, Signature};
