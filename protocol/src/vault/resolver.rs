//! # Record Resolution
//!
//! Turns raw [`LedgerAccount`]s into typed records, and holder identities
//! into holder-account addresses.
//!
//! Every load checks two things before trusting the bytes: the record is
//! the expected kind, and it is owned by the program that is supposed to
//! own it. Either mismatch is [`VaultError::InvalidAccount`].
//!
//! The `*_in` loaders run inside a [`LedgerTx`], so a get-or-create of a
//! holder account is part of the same transaction as the write that
//! follows it.

use sled::transaction::ConflictableTransactionError;
use tracing::debug;

use crate::address::{holder_account_address, Address};
use crate::config::ProgramIds;
use crate::error::{VaultError, VaultResult};
use crate::storage::{
    AccountData, HolderAccount, LedgerAccount, LedgerTx, TokenType, TxResult, Vault,
};

use super::token::initialize_holder_account;

/// Holder-account address for `holder` under `token_type`.
pub fn holder_address(
    programs: &ProgramIds,
    token_type: &Address,
    holder: &Address,
) -> VaultResult<Address> {
    let (address, _bump) = holder_account_address(
        holder,
        &programs.token_program,
        token_type,
        &programs.associated_account_program,
    )?;
    Ok(address)
}

// ---------------------------------------------------------------------------
// Typed views
// ---------------------------------------------------------------------------

fn invalid(address: &Address, reason: &'static str) -> VaultError {
    VaultError::InvalidAccount {
        address: *address,
        reason,
    }
}

fn wrong_kind(
    found: &'static str,
    address: &Address,
    expected: &'static str,
    reason: &'static str,
) -> VaultError {
    debug!(%address, found, expected, "record kind mismatch");
    invalid(address, reason)
}

fn require_owner(account: &LedgerAccount, address: &Address, owner: &Address) -> VaultResult<()> {
    if account.owner != *owner {
        return Err(invalid(address, "record is owned by a different program"));
    }
    Ok(())
}

pub fn as_token_type(
    account: LedgerAccount,
    address: &Address,
    programs: &ProgramIds,
) -> VaultResult<TokenType> {
    require_owner(&account, address, &programs.token_program)?;
    let found = account.kind();
    match account.data {
        AccountData::TokenType(token_type) => Ok(token_type),
        _ => Err(wrong_kind(found, address, "token_type", "record is not a token type")),
    }
}

pub fn as_vault(
    account: LedgerAccount,
    address: &Address,
    programs: &ProgramIds,
) -> VaultResult<Vault> {
    require_owner(&account, address, &programs.vault_program)?;
    let found = account.kind();
    match account.data {
        AccountData::Vault(vault) => Ok(vault),
        _ => Err(wrong_kind(found, address, "vault", "record is not a vault")),
    }
}

pub fn as_holder(
    account: LedgerAccount,
    address: &Address,
    programs: &ProgramIds,
) -> VaultResult<HolderAccount> {
    require_owner(&account, address, &programs.token_program)?;
    let found = account.kind();
    match account.data {
        AccountData::Holder(holder) => Ok(holder),
        _ => Err(wrong_kind(found, address, "holder_account", "record is not a holder account")),
    }
}

// ---------------------------------------------------------------------------
// Transactional loads
// ---------------------------------------------------------------------------

/// Lifts a validation failure into a transaction abort.
pub(crate) fn abort<T>(result: VaultResult<T>) -> TxResult<T, VaultError> {
    result.map_err(ConflictableTransactionError::Abort)
}

pub fn token_type_in(
    tx: &LedgerTx<'_, VaultError>,
    address: &Address,
    programs: &ProgramIds,
) -> TxResult<Option<TokenType>, VaultError> {
    match tx.get_account(address)? {
        Some(account) => abort(as_token_type(account, address, programs)).map(Some),
        None => Ok(None),
    }
}

pub fn vault_in(
    tx: &LedgerTx<'_, VaultError>,
    address: &Address,
    programs: &ProgramIds,
) -> TxResult<Option<Vault>, VaultError> {
    match tx.get_account(address)? {
        Some(account) => abort(as_vault(account, address, programs)).map(Some),
        None => Ok(None),
    }
}

pub fn holder_in(
    tx: &LedgerTx<'_, VaultError>,
    address: &Address,
    programs: &ProgramIds,
) -> TxResult<Option<HolderAccount>, VaultError> {
    match tx.get_account(address)? {
        Some(account) => abort(as_holder(account, address, programs)).map(Some),
        None => Ok(None),
    }
}

/// Loads the holder account at `address`, or a fresh one for `owner` if
/// nothing is there yet. The fresh account is not staged; the caller
/// writes it back together with whatever else the operation changes.
pub fn holder_or_new_in(
    tx: &LedgerTx<'_, VaultError>,
    address: &Address,
    owner: &Address,
    token_type: &Address,
    programs: &ProgramIds,
) -> TxResult<HolderAccount, VaultError> {
    match holder_in(tx, address, programs)? {
        Some(holder) => Ok(holder),
        None => Ok(initialize_holder_account(owner, token_type)),
    }
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

pub fn token_type_record(token_type: TokenType, programs: &ProgramIds) -> LedgerAccount {
    LedgerAccount {
        owner: programs.token_program,
        data: AccountData::TokenType(token_type),
    }
}

pub fn vault_record(vault: Vault, programs: &ProgramIds) -> LedgerAccount {
    LedgerAccount {
        owner: programs.vault_program,
        data: AccountData::Vault(vault),
    }
}

pub fn holder_record(holder: HolderAccount, programs: &ProgramIds) -> LedgerAccount {
    LedgerAccount {
        owner: programs.token_program,
        data: AccountData::Holder(holder),
    }
}
