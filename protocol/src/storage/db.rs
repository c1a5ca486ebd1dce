//! # LedgerDb — Persistent Account Store
//!
//! The persistence layer for the vault, built on sled's embedded
//! key-value store. Every record the vault reads or writes goes through
//! this module.
//!
//! ## Tree Layout
//!
//! | Tree       | Key                  | Value                    |
//! |------------|----------------------|--------------------------|
//! | `accounts` | `address` (32 bytes) | `bincode(LedgerAccount)` |
//! | `metadata` | key (UTF-8)          | value (bytes)            |
//!
//! The commit sequence is stored as a big-endian u64 under
//! [`META_COMMIT_SEQUENCE`].
//!
//! ## Atomicity
//!
//! Mutations run inside [`LedgerDb::transact`], a sled transaction spanning
//! both trees. The closure reads what it needs, validates, and stages
//! writes. If it returns an error nothing lands. If another writer touched
//! the same keys first, sled re-runs the closure against the fresh state,
//! so every check is re-evaluated before anything commits.
//!
//! Because the closure may run more than once it must not have side
//! effects beyond the staged writes. Log after `transact` returns, not
//! inside it.

use sled::transaction::{ConflictableTransactionError, TransactionError, TransactionalTree};
use sled::{Db, Transactional, Tree};
use std::marker::PhantomData;
use std::path::Path;

use super::state::LedgerAccount;
use crate::address::Address;
use crate::config::META_COMMIT_SEQUENCE;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Result type inside a [`LedgerDb::transact`] closure. `Abort(e)` rolls the
/// transaction back and surfaces `e`; conflicts are retried by sled.
pub type TxResult<T, E> = Result<T, ConflictableTransactionError<E>>;

fn encode(account: &LedgerAccount) -> DbResult<Vec<u8>> {
    bincode::serialize(account).map_err(|e| DbError::Serialization(e.to_string()))
}

fn decode(bytes: &[u8]) -> DbResult<LedgerAccount> {
    bincode::deserialize(bytes).map_err(|e| DbError::Serialization(e.to_string()))
}

fn decode_sequence(bytes: &[u8]) -> DbResult<u64> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| DbError::Serialization("invalid commit sequence bytes".to_string()))?;
    Ok(u64::from_be_bytes(raw))
}

fn abort_with<E: From<DbError>>(err: DbError) -> ConflictableTransactionError<E> {
    ConflictableTransactionError::Abort(E::from(err))
}

// ---------------------------------------------------------------------------
// LedgerDb
// ---------------------------------------------------------------------------

/// Persistent account store.
///
/// Wraps a sled `Db` and exposes typed, bincode-encoded access to ledger
/// accounts plus the commit sequence.
///
/// # Thread Safety
///
/// sled is thread-safe. `LedgerDb` is `Clone` (the handles are reference
/// counted) and can be shared across threads via `Arc<LedgerDb>` or by
/// cloning, without external locking.
#[derive(Debug, Clone)]
pub struct LedgerDb {
    db: Db,
    /// Ledger accounts keyed by raw 32-byte address.
    accounts: Tree,
    /// Commit sequence and other bookkeeping.
    metadata: Tree,
}

impl LedgerDb {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary database that is removed when dropped.
    ///
    /// Intended for tests. No cleanup needed.
    pub fn open_temporary() -> DbResult<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> DbResult<Self> {
        let accounts = db.open_tree("accounts")?;
        let metadata = db.open_tree("metadata")?;
        Ok(Self {
            db,
            accounts,
            metadata,
        })
    }

    // -- Transactions -------------------------------------------------------

    /// Runs `f` as one atomic, isolated mutation.
    ///
    /// On success the commit sequence is advanced in the same transaction
    /// and the new value is returned alongside `f`'s result. On abort the
    /// ledger is untouched and the abort error is returned.
    pub fn transact<T, E, F>(&self, f: F) -> Result<(T, u64), E>
    where
        F: Fn(&LedgerTx<'_, E>) -> TxResult<T, E>,
        E: From<DbError>,
    {
        let result: Result<(T, u64), TransactionError<E>> =
            (&self.accounts, &self.metadata).transaction(|(accounts, metadata)| {
                let tx = LedgerTx {
                    accounts,
                    metadata,
                    _error: PhantomData,
                };
                let value = f(&tx)?;
                let sequence = tx.advance_sequence()?;
                Ok((value, sequence))
            });

        match result {
            Ok(committed) => Ok(committed),
            Err(TransactionError::Abort(e)) => Err(e),
            Err(TransactionError::Storage(e)) => Err(E::from(DbError::Sled(e))),
        }
    }

    // -- Reads --------------------------------------------------------------

    /// Retrieve the account stored at `address`, if any.
    pub fn get_account(&self, address: &Address) -> DbResult<Option<LedgerAccount>> {
        match self.accounts.get(address.as_ref())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Number of committed mutations. Zero for a fresh ledger.
    pub fn commit_sequence(&self) -> DbResult<u64> {
        match self.metadata.get(META_COMMIT_SEQUENCE)? {
            Some(bytes) => decode_sequence(&bytes),
            None => Ok(0),
        }
    }

    /// Number of accounts stored.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Block until all pending writes are durable.
    pub fn flush(&self) -> DbResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LedgerTx
// ---------------------------------------------------------------------------

/// Typed view of the ledger inside a [`LedgerDb::transact`] closure.
///
/// Reads see this transaction's own staged writes. Nothing is visible to
/// other readers until the closure returns `Ok`.
pub struct LedgerTx<'a, E> {
    accounts: &'a TransactionalTree,
    metadata: &'a TransactionalTree,
    _error: PhantomData<fn() -> E>,
}

impl<E: From<DbError>> LedgerTx<'_, E> {
    /// Load the account at `address`.
    pub fn get_account(&self, address: &Address) -> TxResult<Option<LedgerAccount>, E> {
        match self.accounts.get(address.as_ref())? {
            Some(bytes) => decode(&bytes).map(Some).map_err(abort_with),
            None => Ok(None),
        }
    }

    /// Stage `account` at `address`, replacing whatever was there.
    pub fn put_account(&self, address: &Address, account: &LedgerAccount) -> TxResult<(), E> {
        let bytes = encode(account).map_err(abort_with)?;
        self.accounts.insert(address.as_ref(), bytes)?;
        Ok(())
    }

    fn advance_sequence(&self) -> TxResult<u64, E> {
        let current = match self.metadata.get(META_COMMIT_SEQUENCE)? {
            Some(bytes) => decode_sequence(&bytes).map_err(abort_with)?,
            None => 0,
        };
        let next = current.saturating_add(1);
        self.metadata
            .insert(META_COMMIT_SEQUENCE, &next.to_be_bytes())?;
        Ok(next)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
