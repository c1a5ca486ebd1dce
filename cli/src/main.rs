// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # MintVault CLI
//!
//! Entry point for the `mintvault` binary. Parses CLI arguments, sets up
//! logging, opens the ledger, and runs one vault operation per invocation.
//!
//! - `keygen`            — write a fresh holder key file
//! - `addresses`         — print derived addresses without touching the ledger
//! - `create-token-type` — one-time creation of the token type and vault
//! - `distribute`        — vault-signed mint into a holder account
//! - `transfer`          — holder-signed move between holder accounts
//! - `freeze` / `thaw`   — creator-requested, vault-signed account locks
//! - `show`              — read back records

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use std::path::Path;

use mintvault_protocol::address::{holder_account_address, token_type_address, vault_address};
use mintvault_protocol::config::ProgramIds;
use mintvault_protocol::crypto::Keypair;
use mintvault_protocol::storage::LedgerDb;
use mintvault_protocol::vault::{TokenVault, UserAuthority};

use cli::{Commands, MintVaultCli};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = MintVaultCli::parse();
    logging::init_logging(&cli.log_level, LogFormat::from_str_lossy(&cli.log_format));

    match cli.command {
        Commands::Keygen(args) => keygen(args),
        Commands::Addresses(args) => addresses(args),
        Commands::CreateTokenType(args) => {
            let vault = open_vault(&cli.db)?;
            let payer = load_key(&args.payer)?;
            let receipt = vault
                .create_token_type(&payer.address())
                .context("create-token-type failed")?;
            finish(&vault, &receipt)
        }
        Commands::Distribute(args) => {
            let vault = open_vault(&cli.db)?;
            let payer = load_key(&args.payer)?;
            let receipt = vault
                .distribute_to_holder(&payer.address(), &args.recipient, args.amount)
                .context("distribute failed")?;
            finish(&vault, &receipt)
        }
        Commands::Transfer(args) => {
            let vault = open_vault(&cli.db)?;
            let payer = load_key(&args.payer)?;
            let sender = load_key(&args.sender)?;
            let receipt = vault
                .transfer_between_holders(
                    &payer.address(),
                    &UserAuthority::from_keypair(&sender),
                    &args.recipient,
                    args.amount,
                )
                .context("transfer failed")?;
            finish(&vault, &receipt)
        }
        Commands::Freeze(args) => {
            let vault = open_vault(&cli.db)?;
            let admin = load_key(&args.admin)?;
            let receipt = vault
                .freeze_holder(&UserAuthority::from_keypair(&admin), &args.holder)
                .context("freeze failed")?;
            finish(&vault, &receipt)
        }
        Commands::Thaw(args) => {
            let vault = open_vault(&cli.db)?;
            let admin = load_key(&args.admin)?;
            let receipt = vault
                .thaw_holder(&UserAuthority::from_keypair(&admin), &args.holder)
                .context("thaw failed")?;
            finish(&vault, &receipt)
        }
        Commands::Show(args) => show(&cli.db, args),
    }
}

/// Opens (or creates) the ledger at `path`.
fn open_vault(path: &Path) -> Result<TokenVault> {
    let db = LedgerDb::open(path)
        .with_context(|| format!("failed to open ledger at {}", path.display()))?;
    tracing::debug!(path = %path.display(), "ledger opened");
    TokenVault::new(db).context("failed to derive vault addresses")
}

/// Reads a hex secret key file.
fn load_key(path: &Path) -> Result<Keypair> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read key file {}", path.display()))?;
    Keypair::from_hex(&contents).with_context(|| format!("invalid key file {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Flushes the ledger and prints the receipt.
fn finish<T: Serialize>(vault: &TokenVault, receipt: &T) -> Result<()> {
    vault.ledger().flush().context("failed to flush ledger")?;
    print_json(receipt)
}

fn keygen(args: cli::KeygenArgs) -> Result<()> {
    if args.out.exists() && !args.force {
        bail!(
            "{} already exists; pass --force to overwrite",
            args.out.display()
        );
    }

    let keypair = Keypair::generate();
    std::fs::write(&args.out, keypair.secret_hex())
        .with_context(|| format!("failed to write key file {}", args.out.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&args.out, std::fs::Permissions::from_mode(0o600))?;
    }

    tracing::info!(address = %keypair.address(), path = %args.out.display(), "keypair generated");
    print_json(&json!({
        "address": keypair.address(),
        "key_file": args.out.display().to_string(),
    }))
}

fn addresses(args: cli::AddressesArgs) -> Result<()> {
    let programs = ProgramIds::default();
    let (token_type, token_type_bump) = token_type_address(&programs.vault_program)?;
    let (vault, vault_bump) = vault_address(&programs.vault_program)?;

    let mut out = json!({
        "token_type": token_type,
        "token_type_bump": token_type_bump,
        "vault": vault,
        "vault_bump": vault_bump,
    });
    if let Some(holder) = args.holder {
        let (holder_account, bump) = holder_account_address(
            &holder,
            &programs.token_program,
            &token_type,
            &programs.associated_account_program,
        )?;
        out["holder"] = json!(holder);
        out["holder_account"] = json!(holder_account);
        out["holder_account_bump"] = json!(bump);
    }
    print_json(&out)
}

fn show(path: &Path, args: cli::ShowArgs) -> Result<()> {
    let vault = open_vault(path)?;
    let mut out = json!({
        "addresses": vault.addresses(),
        "token_type": vault.token_type()?,
        "vault": vault.vault()?,
        "commit_sequence": vault.ledger().commit_sequence()?,
    });
    if let Some(holder) = args.holder {
        out["holder"] = json!(holder);
        out["holder_account"] = json!(vault.holder_account(&holder)?);
        out["balance"] = json!(vault.balance_of(&holder)?);
    }
    print_json(&out)
}
