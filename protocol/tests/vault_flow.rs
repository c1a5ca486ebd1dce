//! End-to-end tests for the vault.
//!
//! These drive the public API the way an external caller would: create the
//! token type, distribute to a holder, move units between holders, and
//! inspect the resulting records. Each test opens its own temporary ledger.

use mintvault_protocol::address::{
    find_derived_address, holder_account_address, token_type_address, vault_address, Address,
};
use mintvault_protocol::config::{ProgramIds, TOKEN_TYPE_SEED, VAULT_PROGRAM_ID};
use mintvault_protocol::crypto::Keypair;
use mintvault_protocol::storage::{HolderState, LedgerDb};
use mintvault_protocol::vault::{TokenVault, TransferRequest, UserAuthority};
use mintvault_protocol::VaultError;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn fresh_vault() -> TokenVault {
    TokenVault::new(LedgerDb::open_temporary().expect("temp db")).expect("vault")
}

/// A created token type plus the identity that funded it.
fn created_vault() -> (TokenVault, Keypair) {
    let vault = fresh_vault();
    let payer = Keypair::generate();
    vault.create_token_type(&payer.address()).expect("create");
    (vault, payer)
}

fn transfer(
    vault: &TokenVault,
    payer: &Keypair,
    from: &Keypair,
    to: &Address,
    amount: u64,
) -> Result<(u64, u64), VaultError> {
    vault
        .transfer_between_holders(
            &payer.address(),
            &UserAuthority::from_keypair(from),
            to,
            amount,
        )
        .map(|receipt| (receipt.sender_balance, receipt.recipient_balance))
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn scenario_create_token_type() {
    let (vault, _) = created_vault();

    let token_type = vault.token_type().unwrap().expect("token type exists");
    let record = vault.vault().unwrap().expect("vault exists");

    assert_eq!(token_type.supply, 0);
    assert_eq!(token_type.decimals, 0);
    assert_eq!(record.token_type, vault.addresses().token_type);
    assert_eq!(token_type.mint_authority, vault.addresses().vault);
}

#[test]
fn scenario_distribute_one_unit() {
    let (vault, payer) = created_vault();
    let holder_a = Keypair::generate();

    let receipt = vault
        .distribute_to_holder(&payer.address(), &holder_a.address(), 1)
        .unwrap();

    assert_eq!(receipt.new_balance, 1);
    assert_eq!(receipt.new_total_supply, 1);
    assert_eq!(vault.balance_of(&holder_a.address()).unwrap(), 1);
    assert_eq!(vault.total_supply().unwrap(), 1);
}

#[test]
fn scenario_transfer_one_unit() {
    let (vault, payer) = created_vault();
    let holder_a = Keypair::generate();
    let holder_b = Keypair::generate();
    vault
        .distribute_to_holder(&payer.address(), &holder_a.address(), 1)
        .unwrap();

    let (a, b) = transfer(&vault, &payer, &holder_a, &holder_b.address(), 1).unwrap();

    assert_eq!((a, b), (0, 1));
    assert_eq!(vault.balance_of(&holder_a.address()).unwrap(), 0);
    assert_eq!(vault.balance_of(&holder_b.address()).unwrap(), 1);
    assert_eq!(vault.total_supply().unwrap(), 1);

    // The emptied account persists at zero.
    let emptied = vault.holder_account(&holder_a.address()).unwrap().unwrap();
    assert_eq!(emptied.amount, 0);
}

#[test]
fn scenario_transfer_from_empty_account_fails() {
    let (vault, payer) = created_vault();
    let holder_a = Keypair::generate();
    let holder_b = Keypair::generate();
    vault
        .distribute_to_holder(&payer.address(), &holder_a.address(), 1)
        .unwrap();
    transfer(&vault, &payer, &holder_a, &holder_b.address(), 1).unwrap();
    let sequence = vault.ledger().commit_sequence().unwrap();

    let result = transfer(&vault, &payer, &holder_a, &holder_b.address(), 1);

    assert!(matches!(
        result,
        Err(VaultError::InsufficientBalance {
            available: 0,
            requested: 1
        })
    ));
    assert_eq!(vault.balance_of(&holder_a.address()).unwrap(), 0);
    assert_eq!(vault.balance_of(&holder_b.address()).unwrap(), 1);
    assert_eq!(vault.ledger().commit_sequence().unwrap(), sequence);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn repeated_creation_succeeds_exactly_once() {
    let vault = fresh_vault();
    let payer = Keypair::generate();
    let mut successes = Vec::new();

    for _ in 0..5 {
        match vault.create_token_type(&payer.address()) {
            Ok(receipt) => successes.push(receipt),
            Err(VaultError::AlreadyInitialized) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].token_type, vault.addresses().token_type);
    assert_eq!(successes[0].vault, vault.addresses().vault);
    assert_eq!(vault.ledger().account_count(), 2);
}

#[test]
fn transfers_never_change_supply() {
    let (vault, payer) = created_vault();
    let holders: Vec<Keypair> = (0..4).map(|_| Keypair::generate()).collect();
    vault
        .distribute_to_holder(&payer.address(), &holders[0].address(), 10)
        .unwrap();
    vault
        .distribute_to_holder(&payer.address(), &holders[1].address(), 5)
        .unwrap();
    let supply = vault.total_supply().unwrap();

    let moves = [(0, 1, 3), (1, 2, 6), (2, 3, 6), (3, 0, 1), (0, 2, 2)];
    for (from, to, amount) in moves {
        transfer(&vault, &payer, &holders[from], &holders[to].address(), amount).unwrap();
        assert_eq!(vault.total_supply().unwrap(), supply);
    }

    let sum: u64 = holders
        .iter()
        .map(|h| vault.balance_of(&h.address()).unwrap())
        .sum();
    assert_eq!(sum, supply);
}

#[test]
fn overdraw_leaves_both_balances_unchanged() {
    let (vault, payer) = created_vault();
    let alice = Keypair::generate();
    let bob = Keypair::generate();
    vault
        .distribute_to_holder(&payer.address(), &alice.address(), 3)
        .unwrap();
    vault
        .distribute_to_holder(&payer.address(), &bob.address(), 2)
        .unwrap();

    let result = transfer(&vault, &payer, &alice, &bob.address(), 4);

    assert!(matches!(
        result,
        Err(VaultError::InsufficientBalance {
            available: 3,
            requested: 4
        })
    ));
    assert_eq!(vault.balance_of(&alice.address()).unwrap(), 3);
    assert_eq!(vault.balance_of(&bob.address()).unwrap(), 2);
}

#[test]
fn derived_addresses_match_independent_computation() {
    let vault = fresh_vault();
    let holder = Keypair::generate();

    let (token_type, _) = token_type_address(&VAULT_PROGRAM_ID).unwrap();
    let (vault_addr, _) = vault_address(&VAULT_PROGRAM_ID).unwrap();
    let programs = ProgramIds::default();
    let (holder_account, _) = holder_account_address(
        &holder.address(),
        &programs.token_program,
        &token_type,
        &programs.associated_account_program,
    )
    .unwrap();

    assert_eq!(vault.addresses().token_type, token_type);
    assert_eq!(vault.addresses().vault, vault_addr);
    assert_eq!(
        vault.holder_account_address(&holder.address()).unwrap(),
        holder_account
    );
    assert_eq!(
        find_derived_address(&[TOKEN_TYPE_SEED], &VAULT_PROGRAM_ID).unwrap(),
        token_type_address(&VAULT_PROGRAM_ID).unwrap()
    );
}

#[test]
fn isolated_program_ids_use_disjoint_addresses() {
    let programs = ProgramIds {
        vault_program: Address::new([0x11; 32]),
        ..ProgramIds::default()
    };
    let custom =
        TokenVault::with_programs(LedgerDb::open_temporary().unwrap(), programs).unwrap();
    let default = fresh_vault();

    assert_ne!(custom.addresses().token_type, default.addresses().token_type);
    assert_ne!(custom.addresses().vault, default.addresses().vault);
    custom.create_token_type(&Address::new([1; 32])).unwrap();
}

// ---------------------------------------------------------------------------
// Signed requests, freezes, persistence
// ---------------------------------------------------------------------------

#[test]
fn signed_transfer_request_authorizes_sender() {
    let (vault, payer) = created_vault();
    let alice = Keypair::generate();
    let bob = Keypair::generate();
    vault
        .distribute_to_holder(&payer.address(), &alice.address(), 2)
        .unwrap();

    let request = TransferRequest {
        token_type: vault.addresses().token_type,
        sender: alice.address(),
        recipient: bob.address(),
        amount: 2,
    };
    let signature = request.sign(&alice);

    // Bob cannot forge a request on Alice's behalf.
    assert!(matches!(
        vault.transfer_signed(&payer.address(), &request, &request.sign(&bob)),
        Err(VaultError::AuthorityMismatch { .. })
    ));

    let receipt = vault
        .transfer_signed(&payer.address(), &request, &signature)
        .unwrap();
    assert_eq!(receipt.sender_balance, 0);
    assert_eq!(vault.balance_of(&bob.address()).unwrap(), 2);
}

#[test]
fn relayed_request_cannot_be_redirected() {
    let (vault, payer) = created_vault();
    let alice = Keypair::generate();
    let bob = Keypair::generate();
    let mallory = Keypair::generate();
    vault
        .distribute_to_holder(&payer.address(), &alice.address(), 5)
        .unwrap();

    let request = TransferRequest {
        token_type: vault.addresses().token_type,
        sender: alice.address(),
        recipient: bob.address(),
        amount: 1,
    };
    let signature = request.sign(&alice);

    // The relay rewrites the destination and the amount.
    let rewritten = TransferRequest {
        recipient: mallory.address(),
        amount: 5,
        ..request.clone()
    };
    assert!(matches!(
        vault.transfer_signed(&mallory.address(), &rewritten, &signature),
        Err(VaultError::AuthorityMismatch { .. })
    ));
    assert_eq!(vault.balance_of(&mallory.address()).unwrap(), 0);
    assert_eq!(vault.balance_of(&alice.address()).unwrap(), 5);

    vault
        .transfer_signed(&mallory.address(), &request, &signature)
        .unwrap();
    assert_eq!(vault.balance_of(&bob.address()).unwrap(), 1);
    assert_eq!(vault.balance_of(&mallory.address()).unwrap(), 0);
}

#[test]
fn frozen_holder_is_locked_until_thawed() {
    let (vault, payer) = created_vault();
    let admin = UserAuthority::from_keypair(&payer);
    let alice = Keypair::generate();
    let bob = Keypair::generate();
    vault
        .distribute_to_holder(&payer.address(), &alice.address(), 2)
        .unwrap();
    vault
        .distribute_to_holder(&payer.address(), &bob.address(), 2)
        .unwrap();

    vault.freeze_holder(&admin, &bob.address()).unwrap();
    assert_eq!(
        vault.holder_account(&bob.address()).unwrap().unwrap().state,
        HolderState::Frozen
    );

    // Incoming transfers are blocked too.
    assert!(matches!(
        transfer(&vault, &payer, &alice, &bob.address(), 1),
        Err(VaultError::AccountFrozen(owner)) if owner == bob.address()
    ));
    assert_eq!(vault.balance_of(&alice.address()).unwrap(), 2);

    vault.thaw_holder(&admin, &bob.address()).unwrap();
    transfer(&vault, &payer, &bob, &alice.address(), 2).unwrap();
    assert_eq!(vault.balance_of(&alice.address()).unwrap(), 4);
}

#[test]
fn ledger_state_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let alice = Keypair::generate();
    let payer = Keypair::generate();

    {
        let vault = TokenVault::new(LedgerDb::open(dir.path()).unwrap()).unwrap();
        vault.create_token_type(&payer.address()).unwrap();
        vault
            .distribute_to_holder(&payer.address(), &alice.address(), 7)
            .unwrap();
        vault.ledger().flush().unwrap();
    }

    let vault = TokenVault::new(LedgerDb::open(dir.path()).unwrap()).unwrap();
    assert_eq!(vault.balance_of(&alice.address()).unwrap(), 7);
    assert_eq!(vault.total_supply().unwrap(), 7);
    assert_eq!(vault.ledger().commit_sequence().unwrap(), 2);
    assert!(matches!(
        vault.create_token_type(&payer.address()),
        Err(VaultError::AlreadyInitialized)
    ));
}
