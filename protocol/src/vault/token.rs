//! # Token Primitives
//!
//! The instruction set of the token program, as plain functions over
//! in-memory records. Each one validates everything first and only then
//! mutates, so a returned error always means the records are untouched.
//!
//! None of these touch storage. The handlers in
//! [`processor`](super::processor) load records inside a ledger
//! transaction, call a primitive, and stage the results.
//!
//! | Primitive                   | Authority required            |
//! |-----------------------------|-------------------------------|
//! | [`initialize_token_type`]   | none (one-time, address-bound)|
//! | [`initialize_holder_account`]| none                         |
//! | [`mint_to`]                 | the token type's mint authority |
//! | [`transfer`]                | the source account's owner    |
//! | [`freeze_account`]          | the token type's freeze authority |
//! | [`thaw_account`]            | the token type's freeze authority |

use super::authority::SigningAuthority;
use crate::address::Address;
use crate::error::{VaultError, VaultResult};
use crate::storage::{HolderAccount, HolderState, LedgerAccount, TokenType};

// ---------------------------------------------------------------------------
// Initialization
// ---------------------------------------------------------------------------

/// Creates a token type controlled by `mint_authority`.
///
/// `existing` is whatever currently occupies the token type's address.
/// Anything at all there means the type was already created.
pub fn initialize_token_type(
    existing: Option<&LedgerAccount>,
    mint_authority: &Address,
    bump: u8,
) -> VaultResult<TokenType> {
    if existing.is_some() {
        return Err(VaultError::AlreadyInitialized);
    }
    Ok(TokenType::new(*mint_authority, bump))
}

/// Creates an empty, active holder account for `owner`.
pub fn initialize_holder_account(owner: &Address, token_type: &Address) -> HolderAccount {
    HolderAccount::new(*owner, *token_type)
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

fn require_amount(amount: u64) -> VaultResult<()> {
    if amount == 0 {
        return Err(VaultError::InvalidAmount);
    }
    Ok(())
}

fn require_signer(authority: &dyn SigningAuthority, expected: &Address) -> VaultResult<()> {
    if authority.signer() != expected {
        return Err(VaultError::AuthorityMismatch {
            expected: *expected,
        });
    }
    Ok(())
}

fn require_linked(holder: &HolderAccount, token_type: &Address) -> VaultResult<()> {
    if holder.token_type != *token_type {
        return Err(VaultError::InvalidAccount {
            address: holder.token_type,
            reason: "holder account belongs to a different token type",
        });
    }
    Ok(())
}

fn require_active(holder: &HolderAccount) -> VaultResult<()> {
    if holder.is_frozen() {
        return Err(VaultError::AccountFrozen(holder.owner));
    }
    Ok(())
}

fn require_freeze_authority(
    token_type: &TokenType,
    token_type_address: &Address,
    authority: &dyn SigningAuthority,
) -> VaultResult<()> {
    match &token_type.freeze_authority {
        Some(freeze_authority) => require_signer(authority, freeze_authority),
        None => Err(VaultError::InvalidAccount {
            address: *token_type_address,
            reason: "token type has no freeze authority",
        }),
    }
}

// ---------------------------------------------------------------------------
// Supply and Balances
// ---------------------------------------------------------------------------

/// Issues `amount` new units into `holder`.
///
/// Raises the supply and the holder balance together, so the sum of all
/// balances never exceeds the supply.
pub fn mint_to(
    token_type: &mut TokenType,
    token_type_address: &Address,
    holder: &mut HolderAccount,
    amount: u64,
    authority: &dyn SigningAuthority,
) -> VaultResult<()> {
    require_amount(amount)?;
    require_signer(authority, &token_type.mint_authority)?;
    require_linked(holder, token_type_address)?;
    require_active(holder)?;

    let new_supply = token_type
        .supply
        .checked_add(amount)
        .ok_or(VaultError::Overflow)?;
    let new_balance = holder
        .amount
        .checked_add(amount)
        .ok_or(VaultError::Overflow)?;

    token_type.supply = new_supply;
    holder.amount = new_balance;
    Ok(())
}

/// Moves `amount` units from `source` to `destination`. Supply is unchanged.
///
/// Only the owner of `source` may authorize the debit. `source` and
/// `destination` must be distinct accounts; callers reject self-transfers
/// before getting here.
pub fn transfer(
    source: &mut HolderAccount,
    destination: &mut HolderAccount,
    token_type_address: &Address,
    amount: u64,
    authority: &dyn SigningAuthority,
) -> VaultResult<()> {
    require_amount(amount)?;
    require_linked(source, token_type_address)?;
    require_linked(destination, token_type_address)?;
    require_signer(authority, &source.owner)?;
    require_active(source)?;
    require_active(destination)?;

    if source.amount < amount {
        return Err(VaultError::InsufficientBalance {
            available: source.amount,
            requested: amount,
        });
    }
    let credited = destination
        .amount
        .checked_add(amount)
        .ok_or(VaultError::Overflow)?;

    source.amount -= amount;
    destination.amount = credited;
    Ok(())
}

// ---------------------------------------------------------------------------
// Freeze / Thaw
// ---------------------------------------------------------------------------

/// Blocks all credits and debits on `holder`.
pub fn freeze_account(
    token_type: &TokenType,
    token_type_address: &Address,
    holder: &mut HolderAccount,
    authority: &dyn SigningAuthority,
) -> VaultResult<()> {
    require_freeze_authority(token_type, token_type_address, authority)?;
    require_linked(holder, token_type_address)?;
    if holder.is_frozen() {
        return Err(VaultError::InvalidAccountState(holder.owner));
    }
    holder.state = HolderState::Frozen;
    Ok(())
}

/// Lifts a freeze.
pub fn thaw_account(
    token_type: &TokenType,
    token_type_address: &Address,
    holder: &mut HolderAccount,
    authority: &dyn SigningAuthority,
) -> VaultResult<()> {
    require_freeze_authority(token_type, token_type_address, authority)?;
    require_linked(holder, token_type_address)?;
    if !holder.is_frozen() {
        return Err(VaultError::InvalidAccountState(holder.owner));
    }
    holder.state = HolderState::Active;
    Ok(())
}
