//! # Addresses & Deterministic Derivation
//!
//! Everything in the vault is found by address: holders, program
//! identities, and the three record kinds. This module owns both halves of
//! that story:
//!
//! ```text
//! pubkey.rs  — the 32-byte Address type, base58/hex codecs, curve check
//! derive.rs  — seed-based derivation of off-curve control addresses
//! ```
//!
//! Derived addresses are the vault's global namespace. There is no registry
//! of token types and no "list of vaults": given the fixed seeds and the
//! program identities, anyone can compute where a record lives without
//! asking the ledger first.

pub mod derive;
pub mod pubkey;

pub use derive::{
    create_derived_address, find_derived_address, holder_account_address, token_type_address,
    vault_address, DerivationError,
};
pub use pubkey::{Address, AddressError};
