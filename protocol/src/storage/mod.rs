//! # Storage Module
//!
//! Ledger records and the sled-backed store they live in.
//!
//! ```text
//! state.rs  — TokenType, Vault, HolderAccount and the LedgerAccount envelope
//! db.rs     — LedgerDb: sled persistence with transactional mutation
//! ```
//!
//! Records are bincode-encoded and keyed by their derived address. Nothing
//! outside the vault handlers writes to the `accounts` tree.

pub mod db;
pub mod state;

pub use db::{DbError, DbResult, LedgerDb, LedgerTx, TxResult};
pub use state::{AccountData, HolderAccount, HolderState, LedgerAccount, TokenType, Vault};
