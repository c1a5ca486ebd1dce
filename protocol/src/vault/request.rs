//! # Signed Transfer Requests
//!
//! A holder who is not running the vault locally authorizes a transfer by
//! signing a [`TransferRequest`]. The signature covers a domain-separated
//! BLAKE3 digest of every field, so it can't be lifted onto a different
//! amount, recipient, or token type, nor reused as a signature over any
//! other kind of message.
//!
//! A verified request is only ever executed as written, through
//! [`TokenVault::transfer_signed`](super::TokenVault::transfer_signed).
//! Verification never hands out an authority the caller could point at
//! some other transfer.
//!
//! Replay of an identical request is not prevented here. Callers that
//! accept requests over an untrusted channel must deduplicate them.

use serde::{Deserialize, Serialize};

use super::authority::UserAuthority;
use crate::address::Address;
use crate::config::TRANSFER_SIGNING_DOMAIN;
use crate::crypto::{domain_separated_hash, Keypair, Signature};
use crate::error::VaultResult;

/// A sender's intent to move `amount` units of `token_type` to `recipient`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub token_type: Address,
    pub sender: Address,
    pub recipient: Address,
    pub amount: u64,
}

impl TransferRequest {
    /// The 32-byte digest the sender signs.
    ///
    /// Fixed layout: `token_type || sender || recipient || amount (LE)`.
    pub fn signing_bytes(&self) -> [u8; 32] {
        let mut preimage = Vec::with_capacity(32 * 3 + 8);
        preimage.extend_from_slice(self.token_type.as_bytes());
        preimage.extend_from_slice(self.sender.as_bytes());
        preimage.extend_from_slice(self.recipient.as_bytes());
        preimage.extend_from_slice(&self.amount.to_le_bytes());
        domain_separated_hash(TRANSFER_SIGNING_DOMAIN, &preimage)
    }

    /// Signs the request with the sender's keypair.
    pub fn sign(&self, keypair: &Keypair) -> Signature {
        keypair.sign(&self.signing_bytes())
    }

    /// Verifies `signature` against the sender and yields the sender's
    /// authority for executing this request.
    pub(crate) fn authorize(&self, signature: &Signature) -> VaultResult<UserAuthority> {
        UserAuthority::verify(self.sender, &self.signing_bytes(), signature)
    }
}
