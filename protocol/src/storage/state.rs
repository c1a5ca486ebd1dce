//! # Ledger Records
//!
//! The three record kinds the vault persists, and the envelope they are
//! stored in. Every record sits at a derived address; none is keyed by a
//! user-chosen name.
//!
//! | Record          | Address seeds                              | Owner program   |
//! |-----------------|--------------------------------------------|-----------------|
//! | `TokenType`     | `"spl-token-mint"`                         | token program   |
//! | `Vault`         | `"vault"`                                  | vault program   |
//! | `HolderAccount` | `holder ‖ token program ‖ token type`      | token program   |
//!
//! All amounts are `u64` in the smallest unit. No floats, no division.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::config::TOKEN_DECIMALS;

// ---------------------------------------------------------------------------
// LedgerAccount
// ---------------------------------------------------------------------------

/// What is stored at an address: the owning program plus the record.
///
/// The owner is checked on every load. A record of the right shape under
/// the wrong program is treated as foreign data, never trusted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAccount {
    /// Program identity allowed to mutate this record.
    pub owner: Address,
    /// The record itself.
    pub data: AccountData,
}

/// The record kinds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountData {
    TokenType(TokenType),
    Vault(Vault),
    Holder(HolderAccount),
}

impl LedgerAccount {
    /// Short name of the record kind, for logs and error context.
    pub fn kind(&self) -> &'static str {
        match self.data {
            AccountData::TokenType(_) => "token_type",
            AccountData::Vault(_) => "vault",
            AccountData::Holder(_) => "holder_account",
        }
    }
}

// ---------------------------------------------------------------------------
// TokenType
// ---------------------------------------------------------------------------

/// One fungible token type and its issued supply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenType {
    /// Display precision. Fixed at [`TOKEN_DECIMALS`]; the vault never divides.
    pub decimals: u8,

    /// Units issued so far. Only ever raised, and only together with the
    /// matching holder credit.
    pub supply: u64,

    /// The only entity that may mint: the vault's derived address.
    pub mint_authority: Address,

    /// The entity that may freeze holder accounts. Also the vault.
    pub freeze_authority: Option<Address>,

    /// Bump that reproduces this record's derived address.
    pub bump: u8,
}

impl TokenType {
    /// A fresh token type with zero supply, controlled by `vault`.
    pub fn new(vault: Address, bump: u8) -> Self {
        Self {
            decimals: TOKEN_DECIMALS,
            supply: 0,
            mint_authority: vault,
            freeze_authority: Some(vault),
            bump,
        }
    }
}

// ---------------------------------------------------------------------------
// Vault
// ---------------------------------------------------------------------------

/// The signing authority record. Holds no key material, only the bumps
/// needed to re-derive its own address and the token type it controls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    /// The token type this vault controls. Set once, never reassigned.
    pub token_type: Address,

    /// Bump for the vault's own address.
    pub bump: u8,

    /// Bump for the token type's address.
    pub token_type_bump: u8,

    /// Identity that funded creation. Administers freezes.
    pub creator: Address,

    /// When the vault was created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// HolderAccount
// ---------------------------------------------------------------------------

/// Freeze state of a holder account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HolderState {
    Active,
    /// No credits, no debits, until thawed.
    Frozen,
}

/// One holder's balance of one token type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderAccount {
    /// The holder. Only this identity may authorize debits.
    pub owner: Address,

    /// The token type this balance is denominated in.
    pub token_type: Address,

    /// Balance in smallest units.
    pub amount: u64,

    pub state: HolderState,
}

impl HolderAccount {
    /// An empty, active account.
    pub fn new(owner: Address, token_type: Address) -> Self {
        Self {
            owner,
            token_type,
            amount: 0,
            state: HolderState::Active,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.state == HolderState::Frozen
    }
}
