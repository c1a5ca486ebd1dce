//! # CLI Interface
//!
//! Defines the command-line argument structure for `mintvault` using
//! `clap` derive. Global options pick the ledger and logging; each
//! subcommand maps to one vault operation or a read.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use mintvault_protocol::Address;

/// Operator CLI for the mintvault token vault.
///
/// Every command prints its result as JSON on stdout. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(
    name = "mintvault",
    about = "Deterministic-address token vault",
    version,
    propagate_version = true
)]
pub struct MintVaultCli {
    /// Path to the ledger directory. Created on first use.
    #[arg(long, global = true, env = "MINTVAULT_DB", default_value = "./mintvault-ledger")]
    pub db: PathBuf,

    /// Log output format: "pretty" or "json".
    #[arg(long, global = true, env = "MINTVAULT_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Default log filter when RUST_LOG is unset.
    #[arg(
        long,
        global = true,
        env = "MINTVAULT_LOG_LEVEL",
        default_value = "mintvault=info,mintvault_protocol=info"
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a holder keypair and write its hex secret to a file.
    Keygen(KeygenArgs),
    /// Print the derived token-type, vault, and (optionally) holder-account
    /// addresses. Does not open the ledger.
    Addresses(AddressesArgs),
    /// Create the token type and its vault. Succeeds once per ledger.
    CreateTokenType(CreateArgs),
    /// Mint units into a holder's account. The vault signs.
    Distribute(DistributeArgs),
    /// Move units between holders. The sender's key signs.
    Transfer(TransferArgs),
    /// Freeze a holder account. Only the vault creator may do this.
    Freeze(FreezeArgs),
    /// Lift a freeze.
    Thaw(FreezeArgs),
    /// Print the token type, vault, and optionally one holder's account.
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Where to write the hex-encoded secret key.
    #[arg(long, short = 'o')]
    pub out: PathBuf,

    /// Overwrite an existing key file.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct AddressesArgs {
    /// Also derive this holder's account address (base58).
    #[arg(long)]
    pub holder: Option<Address>,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Key file of the funding identity. Recorded as the vault's creator.
    #[arg(long)]
    pub payer: PathBuf,
}

#[derive(Args, Debug)]
pub struct DistributeArgs {
    /// Key file of the funding identity.
    #[arg(long)]
    pub payer: PathBuf,

    /// Holder to credit (base58).
    #[arg(long)]
    pub recipient: Address,

    /// Units to mint.
    #[arg(long, default_value_t = 1)]
    pub amount: u64,
}

#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Key file of the funding identity.
    #[arg(long)]
    pub payer: PathBuf,

    /// Key file of the sending holder.
    #[arg(long)]
    pub sender: PathBuf,

    /// Holder to credit (base58).
    #[arg(long)]
    pub recipient: Address,

    /// Units to move.
    #[arg(long, default_value_t = 1)]
    pub amount: u64,
}

#[derive(Args, Debug)]
pub struct FreezeArgs {
    /// Key file of the vault creator.
    #[arg(long)]
    pub admin: PathBuf,

    /// Holder whose account changes state (base58).
    #[arg(long)]
    pub holder: Address,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Holder whose account to include (base58).
    #[arg(long)]
    pub holder: Option<Address>,
}
