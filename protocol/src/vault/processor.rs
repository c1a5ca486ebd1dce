//! # Operation Handlers
//!
//! [`TokenVault`] is the only code path that mutates ledger records. Each
//! handler is one [`LedgerDb::transact`] call:
//!
//! ```text
//! derive addresses ──► transact {
//!                        load records (owner + kind checked)
//!                        reconstruct authority
//!                        run token primitive on in-memory copies
//!                        stage every changed record
//!                      } ──► commit (sequence += 1) or abort (no change)
//! ```
//!
//! sled re-runs the closure if a concurrent commit touched any record it
//! read, so balance checks are always evaluated against the state the
//! write lands on. Two concurrent creations see each other: exactly one
//! commits and the other re-runs, finds the token type, and aborts with
//! `AlreadyInitialized`.
//!
//! The funding identity is the payer for any record the operation
//! allocates. Storage fees are not modelled; the identity is recorded on
//! the vault at creation and logged otherwise.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::authority::{SigningAuthority, UserAuthority, VaultSigner};
use super::request::TransferRequest;
use super::resolver::{
    abort, as_holder, as_token_type, as_vault, holder_address, holder_in, holder_or_new_in,
    holder_record, token_type_in, token_type_record, vault_in, vault_record,
};
use super::token;
use crate::address::{token_type_address, vault_address, Address};
use crate::config::ProgramIds;
use crate::crypto::Signature;
use crate::error::{VaultError, VaultResult};
use crate::storage::{HolderAccount, HolderState, LedgerDb, LedgerTx, TokenType, TxResult, Vault};

fn log_rejection<T>(operation: &'static str, result: VaultResult<T>) -> VaultResult<T> {
    if let Err(e) = &result {
        warn!(operation, error = %e, "operation rejected");
    }
    result
}

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

/// The fixed addresses of a vault deployment and their bumps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct VaultAddresses {
    pub token_type: Address,
    pub token_type_bump: u8,
    pub vault: Address,
    pub vault_bump: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CreateReceipt {
    pub token_type: Address,
    pub vault: Address,
    pub sequence: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DistributeReceipt {
    pub holder_account: Address,
    pub new_balance: u64,
    pub new_total_supply: u64,
    pub sequence: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    pub sender_account: Address,
    pub recipient_account: Address,
    pub sender_balance: u64,
    pub recipient_balance: u64,
    pub sequence: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FreezeReceipt {
    pub holder_account: Address,
    pub state: HolderState,
    pub sequence: u64,
}

// ---------------------------------------------------------------------------
// TokenVault
// ---------------------------------------------------------------------------

/// A vault deployment over one ledger.
///
/// Cheap to clone; clones share the underlying database. Safe to use from
/// many threads at once.
#[derive(Debug, Clone)]
pub struct TokenVault {
    db: LedgerDb,
    programs: ProgramIds,
    addresses: VaultAddresses,
}

impl TokenVault {
    /// A vault under the production program identities.
    pub fn new(db: LedgerDb) -> VaultResult<Self> {
        Self::with_programs(db, ProgramIds::default())
    }

    /// A vault under custom program identities.
    ///
    /// Derives the token-type and vault addresses up front. Nothing is
    /// written to the ledger.
    pub fn with_programs(db: LedgerDb, programs: ProgramIds) -> VaultResult<Self> {
        let (token_type, token_type_bump) = token_type_address(&programs.vault_program)?;
        let (vault, vault_bump) = vault_address(&programs.vault_program)?;
        Ok(Self {
            db,
            programs,
            addresses: VaultAddresses {
                token_type,
                token_type_bump,
                vault,
                vault_bump,
            },
        })
    }

    pub fn addresses(&self) -> &VaultAddresses {
        &self.addresses
    }

    pub fn programs(&self) -> &ProgramIds {
        &self.programs
    }

    pub fn ledger(&self) -> &LedgerDb {
        &self.db
    }

    /// Where `holder`'s balance of this token type lives.
    pub fn holder_account_address(&self, holder: &Address) -> VaultResult<Address> {
        holder_address(&self.programs, &self.addresses.token_type, holder)
    }

    // -- Handlers -----------------------------------------------------------

    /// Creates the token type and its vault. Succeeds exactly once per
    /// ledger; every later call fails with `AlreadyInitialized` and changes
    /// nothing.
    pub fn create_token_type(&self, funding: &Address) -> VaultResult<CreateReceipt> {
        let addresses = self.addresses;
        let programs = self.programs;
        let created_at = Utc::now();

        let result = self.db.transact::<_, VaultError, _>(|tx| {
            let existing = tx.get_account(&addresses.token_type)?;
            let token_type = abort(token::initialize_token_type(
                existing.as_ref(),
                &addresses.vault,
                addresses.token_type_bump,
            ))?;
            if tx.get_account(&addresses.vault)?.is_some() {
                return abort(Err(VaultError::AlreadyInitialized));
            }

            let vault = Vault {
                token_type: addresses.token_type,
                bump: addresses.vault_bump,
                token_type_bump: addresses.token_type_bump,
                creator: *funding,
                created_at,
            };
            tx.put_account(
                &addresses.token_type,
                &token_type_record(token_type, &programs),
            )?;
            tx.put_account(&addresses.vault, &vault_record(vault, &programs))?;
            Ok(())
        });

        let ((), sequence) = log_rejection("create_token_type", result)?;
        info!(
            token_type = %addresses.token_type,
            vault = %addresses.vault,
            funding = %funding,
            sequence,
            "token type created"
        );
        Ok(CreateReceipt {
            token_type: addresses.token_type,
            vault: addresses.vault,
            sequence,
        })
    }

    /// Mints `amount` new units into `recipient`'s holder account, creating
    /// the account if this is its first credit. The vault signs.
    pub fn distribute_to_holder(
        &self,
        funding: &Address,
        recipient: &Address,
        amount: u64,
    ) -> VaultResult<DistributeReceipt> {
        let result = self
            .holder_account_address(recipient)
            .and_then(|holder_account| {
                self.distribute_in_ledger(holder_account, recipient, amount)
                    .map(|committed| (holder_account, committed))
            });

        let (holder_account, ((new_balance, new_total_supply), sequence)) =
            log_rejection("distribute_to_holder", result)?;
        info!(
            recipient = %recipient,
            holder_account = %holder_account,
            amount,
            new_balance,
            new_total_supply,
            funding = %funding,
            sequence,
            "units distributed"
        );
        Ok(DistributeReceipt {
            holder_account,
            new_balance,
            new_total_supply,
            sequence,
        })
    }

    fn distribute_in_ledger(
        &self,
        holder_account: Address,
        recipient: &Address,
        amount: u64,
    ) -> VaultResult<((u64, u64), u64)> {
        let addresses = self.addresses;
        let programs = self.programs;

        self.db.transact::<_, VaultError, _>(|tx| {
            let (mut token_type, vault) = self.initialized_in(tx)?;
            let signer = abort(VaultSigner::reconstruct(
                &programs.vault_program,
                vault.bump,
                &addresses.vault,
            ))?;

            let mut holder = holder_or_new_in(
                tx,
                &holder_account,
                recipient,
                &addresses.token_type,
                &programs,
            )?;
            abort(token::mint_to(
                &mut token_type,
                &addresses.token_type,
                &mut holder,
                amount,
                &signer,
            ))?;

            let totals = (holder.amount, token_type.supply);
            tx.put_account(
                &addresses.token_type,
                &token_type_record(token_type, &programs),
            )?;
            tx.put_account(&holder_account, &holder_record(holder, &programs))?;
            Ok(totals)
        })
    }

    /// Moves `amount` units from `sender` to `recipient`. The sender
    /// authorizes the debit; the vault is not involved and supply does not
    /// change.
    pub fn transfer_between_holders(
        &self,
        funding: &Address,
        sender: &UserAuthority,
        recipient: &Address,
        amount: u64,
    ) -> VaultResult<TransferReceipt> {
        let result = self.transfer_in_ledger(sender, recipient, amount);
        let (sender_account, recipient_account, ((sender_balance, recipient_balance), sequence)) =
            log_rejection("transfer_between_holders", result)?;

        info!(
            sender = %sender.address(),
            recipient = %recipient,
            amount,
            sender_balance,
            recipient_balance,
            funding = %funding,
            sequence,
            "units transferred"
        );
        Ok(TransferReceipt {
            sender_account,
            recipient_account,
            sender_balance,
            recipient_balance,
            sequence,
        })
    }

    /// Executes a transfer the sender signed elsewhere.
    ///
    /// The request runs exactly as signed, against this vault's token type
    /// only. Any edit after signing fails verification with
    /// `AuthorityMismatch`.
    pub fn transfer_signed(
        &self,
        funding: &Address,
        request: &TransferRequest,
        signature: &Signature,
    ) -> VaultResult<TransferReceipt> {
        let sender = log_rejection("transfer_signed", self.authorize_request(request, signature))?;
        self.transfer_between_holders(funding, &sender, &request.recipient, request.amount)
    }

    fn authorize_request(
        &self,
        request: &TransferRequest,
        signature: &Signature,
    ) -> VaultResult<UserAuthority> {
        if request.token_type != self.addresses.token_type {
            return Err(VaultError::InvalidAccount {
                address: request.token_type,
                reason: "request names a different token type",
            });
        }
        request.authorize(signature)
    }

    fn transfer_in_ledger(
        &self,
        sender: &UserAuthority,
        recipient: &Address,
        amount: u64,
    ) -> VaultResult<(Address, Address, ((u64, u64), u64))> {
        if amount == 0 {
            return Err(VaultError::InvalidAmount);
        }
        let sender_account = self.holder_account_address(sender.address())?;
        let recipient_account = self.holder_account_address(recipient)?;
        if sender_account == recipient_account {
            return Err(VaultError::SelfTransferRejected);
        }

        let addresses = self.addresses;
        let programs = self.programs;

        let committed = self.db.transact::<_, VaultError, _>(|tx| {
            if token_type_in(tx, &addresses.token_type, &programs)?.is_none() {
                return abort(Err(VaultError::Uninitialized));
            }

            // No account means nothing to send. Abort before allocating the
            // recipient so a failed transfer leaves no trace.
            let Some(mut source) = holder_in(tx, &sender_account, &programs)? else {
                return abort(Err(VaultError::InsufficientBalance {
                    available: 0,
                    requested: amount,
                }));
            };
            let mut destination = holder_or_new_in(
                tx,
                &recipient_account,
                recipient,
                &addresses.token_type,
                &programs,
            )?;

            abort(token::transfer(
                &mut source,
                &mut destination,
                &addresses.token_type,
                amount,
                sender,
            ))?;

            let balances = (source.amount, destination.amount);
            tx.put_account(&sender_account, &holder_record(source, &programs))?;
            tx.put_account(&recipient_account, &holder_record(destination, &programs))?;
            Ok(balances)
        })?;

        Ok((sender_account, recipient_account, committed))
    }

    /// Freezes `holder`'s account. Only the vault's creator may ask; the
    /// vault signs as freeze authority.
    pub fn freeze_holder(&self, admin: &UserAuthority, holder: &Address) -> VaultResult<FreezeReceipt> {
        self.set_holder_state(admin, holder, HolderState::Frozen)
    }

    /// Lifts a freeze placed by [`freeze_holder`](Self::freeze_holder).
    pub fn thaw_holder(&self, admin: &UserAuthority, holder: &Address) -> VaultResult<FreezeReceipt> {
        self.set_holder_state(admin, holder, HolderState::Active)
    }

    fn set_holder_state(
        &self,
        admin: &UserAuthority,
        holder: &Address,
        target: HolderState,
    ) -> VaultResult<FreezeReceipt> {
        let operation = match target {
            HolderState::Frozen => "freeze_holder",
            HolderState::Active => "thaw_holder",
        };
        let result = self
            .holder_account_address(holder)
            .and_then(|holder_account| {
                self.set_state_in_ledger(admin, holder_account, target)
                    .map(|((), sequence)| (holder_account, sequence))
            });

        let (holder_account, sequence) = log_rejection(operation, result)?;
        info!(
            holder = %holder,
            holder_account = %holder_account,
            admin = %admin.address(),
            state = ?target,
            sequence,
            "holder account state changed"
        );
        Ok(FreezeReceipt {
            holder_account,
            state: target,
            sequence,
        })
    }

    fn set_state_in_ledger(
        &self,
        admin: &UserAuthority,
        holder_account: Address,
        target: HolderState,
    ) -> VaultResult<((), u64)> {
        let addresses = self.addresses;
        let programs = self.programs;

        self.db.transact::<_, VaultError, _>(|tx| {
            let (token_type, vault) = self.initialized_in(tx)?;
            if admin.signer() != &vault.creator {
                return abort(Err(VaultError::AuthorityMismatch {
                    expected: vault.creator,
                }));
            }
            let signer = abort(VaultSigner::reconstruct(
                &programs.vault_program,
                vault.bump,
                &addresses.vault,
            ))?;

            let Some(mut holder) = holder_in(tx, &holder_account, &programs)? else {
                return abort(Err(VaultError::InvalidAccount {
                    address: holder_account,
                    reason: "holder account does not exist",
                }));
            };
            abort(match target {
                HolderState::Frozen => {
                    token::freeze_account(&token_type, &addresses.token_type, &mut holder, &signer)
                }
                HolderState::Active => {
                    token::thaw_account(&token_type, &addresses.token_type, &mut holder, &signer)
                }
            })?;

            tx.put_account(&holder_account, &holder_record(holder, &programs))?;
            Ok(())
        })
    }

    /// Loads the token type and vault, checking the vault still points at
    /// this token type.
    fn initialized_in(
        &self,
        tx: &LedgerTx<'_, VaultError>,
    ) -> TxResult<(TokenType, Vault), VaultError> {
        let addresses = &self.addresses;
        let token_type = token_type_in(tx, &addresses.token_type, &self.programs)?;
        let vault = vault_in(tx, &addresses.vault, &self.programs)?;
        let (Some(token_type), Some(vault)) = (token_type, vault) else {
            return abort(Err(VaultError::Uninitialized));
        };
        if vault.token_type != addresses.token_type {
            return abort(Err(VaultError::InvalidAccount {
                address: addresses.vault,
                reason: "vault controls a different token type",
            }));
        }
        Ok((token_type, vault))
    }

    // -- Readers ------------------------------------------------------------

    /// The token type record, if created.
    pub fn token_type(&self) -> VaultResult<Option<TokenType>> {
        let address = &self.addresses.token_type;
        self.db
            .get_account(address)?
            .map(|account| as_token_type(account, address, &self.programs))
            .transpose()
    }

    /// The vault record, if created.
    pub fn vault(&self) -> VaultResult<Option<Vault>> {
        let address = &self.addresses.vault;
        self.db
            .get_account(address)?
            .map(|account| as_vault(account, address, &self.programs))
            .transpose()
    }

    /// `holder`'s account, if it has ever been credited.
    pub fn holder_account(&self, holder: &Address) -> VaultResult<Option<HolderAccount>> {
        let address = self.holder_account_address(holder)?;
        self.db
            .get_account(&address)?
            .map(|account| as_holder(account, &address, &self.programs))
            .transpose()
    }

    /// `holder`'s balance. Zero if the account was never allocated.
    pub fn balance_of(&self, holder: &Address) -> VaultResult<u64> {
        Ok(self
            .holder_account(holder)?
            .map_or(0, |account| account.amount))
    }

    /// Units issued so far.
    pub fn total_supply(&self) -> VaultResult<u64> {
        self.token_type()?
            .map(|token_type| token_type.supply)
            .ok_or(VaultError::Uninitialized)
    }
}
