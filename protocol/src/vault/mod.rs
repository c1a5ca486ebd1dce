//! # Vault Module — Token Custody & Authority
//!
//! The vault is the only thing that can create supply. It owns one token
//! type, signs every mint, and administers freezes, all without holding a
//! private key: its authority comes from re-deriving its own address.
//! Holders move their own balances with their own signatures.
//!
//! ## Architecture
//!
//! ```text
//! authority.rs  — SigningAuthority: VaultSigner (seed + bump) and UserAuthority
//! request.rs    — signed TransferRequest for remote holders
//! token.rs      — token primitives: initialize, mint_to, transfer, freeze, thaw
//! resolver.rs   — typed, owner-checked record loads and holder-account lookup
//! processor.rs  — TokenVault: the atomic operation handlers
//! ```
//!
//! ## Design Principles
//!
//! 1. **All amounts are `u64` in smallest-unit denomination.** Decimals are
//!    zero and the vault never divides.
//!
//! 2. **No partial effects.** A handler either commits every record it
//!    touched or none of them.
//!
//! 3. **Authority is structural.** A mint is valid because the code that
//!    performs it can reproduce the vault address, not because a caller
//!    presented something.

pub mod authority;
pub mod processor;
pub mod request;
pub mod resolver;
pub mod token;

pub use authority::{AuthorityKind, SigningAuthority, UserAuthority, VaultSigner};
pub use processor::{
    CreateReceipt, DistributeReceipt, FreezeReceipt, TokenVault, TransferReceipt, VaultAddresses,
};
pub use request::TransferRequest;
