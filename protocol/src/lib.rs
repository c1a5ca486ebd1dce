// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # MintVault Protocol — Core Library
//!
//! A deterministic-address token vault: one fungible token type, one vault
//! that alone may mint it, and per-holder accounts that only their owners
//! may debit. Every record lives at an address derived from fixed seeds, so
//! anyone can compute where to look without asking first.
//!
//! ## Architecture
//!
//! - **address** — The 32-byte address type and off-curve seed derivation.
//! - **crypto** — SHA-256/BLAKE3 hashing and Ed25519 holder keys.
//! - **storage** — Ledger records and the sled-backed store.
//! - **vault** — Authorities, token primitives, and the operation handlers.
//! - **error** — The error taxonomy every handler returns.
//! - **config** — Seeds, program identities, and derivation limits.
//!
//! ## Quick Look
//!
//! ```no_run
//! use mintvault_protocol::crypto::Keypair;
//! use mintvault_protocol::storage::LedgerDb;
//! use mintvault_protocol::vault::{TokenVault, UserAuthority};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let vault = TokenVault::new(LedgerDb::open("./ledger")?)?;
//! let (alice, bob) = (Keypair::generate(), Keypair::generate());
//!
//! vault.create_token_type(&alice.address())?;
//! vault.distribute_to_holder(&alice.address(), &alice.address(), 1)?;
//! vault.transfer_between_holders(
//!     &alice.address(),
//!     &UserAuthority::from_keypair(&alice),
//!     &bob.address(),
//!     1,
//! )?;
//! assert_eq!(vault.balance_of(&bob.address())?, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Philosophy
//!
//! 1. Nothing happens halfway. Every operation commits whole or not at all.
//! 2. No unsafe code. The curve check and signatures come from audited crates.
//! 3. If it touches a balance, it has tests. Plural.

pub mod address;
pub mod config;
pub mod crypto;
pub mod error;
pub mod storage;
pub mod vault;

pub use address::Address;
pub use error::{VaultError, VaultResult};
