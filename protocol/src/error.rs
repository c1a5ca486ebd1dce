//! Error types for vault operations.
//!
//! Every handler returns a [`VaultError`] on failure. Every variant means
//! "nothing happened": the ledger is exactly as it was before the call.

use thiserror::Error;

use crate::address::{Address, DerivationError};
use crate::storage::DbError;

/// Errors that can occur while creating, minting, transferring, or
/// freezing.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The token type (or its vault) already exists.
    #[error("token type is already initialized")]
    AlreadyInitialized,

    /// The token type or vault has not been created yet.
    #[error("token type is not initialized")]
    Uninitialized,

    /// The operation was not authorized by the entity the record names, or
    /// a presented signature does not verify.
    #[error("authority mismatch: operation requires {expected}")]
    AuthorityMismatch {
        /// The authority the record requires.
        expected: Address,
    },

    /// The sender does not hold enough units.
    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Sender balance at the time of the check.
        available: u64,
        /// Amount the operation tried to move.
        requested: u64,
    },

    /// A record is of the wrong kind, has the wrong owner, or points at a
    /// different token type.
    #[error("invalid account {address}: {reason}")]
    InvalidAccount {
        /// Address of the offending record.
        address: Address,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// No bump produced an off-curve address.
    #[error("address derivation exhausted every bump")]
    DerivationExhausted,

    /// Seed configuration rejected by the derivation.
    #[error("address derivation failed: {0}")]
    Derivation(DerivationError),

    /// Zero-unit mints and transfers are rejected.
    #[error("amount must be greater than zero")]
    InvalidAmount,

    /// Sender and recipient resolve to the same holder account.
    #[error("sender and recipient are the same holder account")]
    SelfTransferRejected,

    /// The holder account is frozen.
    #[error("holder account {0} is frozen")]
    AccountFrozen(Address),

    /// Freezing a frozen account, or thawing an active one.
    #[error("holder account {0} is already in the requested state")]
    InvalidAccountState(Address),

    /// A balance or the supply would exceed `u64::MAX`.
    #[error("arithmetic overflow")]
    Overflow,

    #[error("storage error: {0}")]
    Storage(#[from] DbError),
}

impl From<DerivationError> for VaultError {
    fn from(err: DerivationError) -> Self {
        match err {
            DerivationError::Exhausted => VaultError::DerivationExhausted,
            other => VaultError::Derivation(other),
        }
    }
}

pub type VaultResult<T> = Result<T, VaultError>;
