//! # Hashing Utilities
//!
//! Two hash functions, two jobs:
//!
//! - **SHA-256** — address derivation. The derivation format is shared with
//!   off-ledger tooling, so the hash is not ours to choose.
//! - **BLAKE3** — request digests. Internal to the vault, so we use the
//!   faster hash and its built-in `derive_key` mode for domain separation.

use sha2::{Digest, Sha256};

/// SHA-256 over several byte slices, fed sequentially without building a
/// concatenated buffer.
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Domain-separated BLAKE3 hash.
///
/// Uses BLAKE3's `derive_key` mode, which switches the internal IV based on
/// the context string. Two contexts can never produce colliding digests for
/// the same data, so a signature over a transfer request can't be replayed
/// as a signature over anything else.
pub fn domain_separated_hash(context: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    *hasher.finalize().as_bytes()
}
