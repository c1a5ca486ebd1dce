//! # Vault Configuration & Constants
//!
//! Every fixed seed, program identity, and derivation limit lives here.
//! These values decide which addresses the vault, the token type, and every
//! holder account land on. Change one and every previously derived address
//! moves with it, so treat this file as part of the on-ledger format.

use crate::address::Address;

// ---------------------------------------------------------------------------
// Program Identities
// ---------------------------------------------------------------------------

/// The vault program. Owns the [`Vault`](crate::storage::Vault) record and
/// is the namespace for the token-type and vault derivations.
///
/// Base58: `29iiLtNregFkwH4n4K95GrKYcGUGC3F6D5thPE2jWQQs`
pub const VAULT_PROGRAM_ID: Address = Address::new([
    17, 23, 127, 139, 109, 5, 87, 149, 149, 181, 25, 7, 71, 207, 61, 231, 13, 226, 77, 28, 42, 171,
    226, 94, 245, 101, 215, 170, 106, 254, 178, 172,
]);

/// The token program. Owns token-type and holder-account records, and is
/// mixed into every holder-account derivation.
///
/// Base58: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: Address = Address::new([
    6, 221, 246, 225, 215, 101, 161, 147, 217, 203, 225, 70, 206, 235, 121, 172, 28, 180, 133, 237,
    95, 91, 55, 145, 58, 140, 245, 133, 126, 255, 0, 169,
]);

/// The associated-account program: the namespace holder accounts are
/// derived under.
///
/// Base58: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_ACCOUNT_PROGRAM_ID: Address = Address::new([
    140, 151, 37, 143, 78, 36, 137, 241, 187, 61, 16, 41, 20, 142, 13, 131, 11, 90, 19, 153, 218,
    255, 16, 132, 4, 142, 123, 216, 219, 233, 248, 89,
]);

// ---------------------------------------------------------------------------
// Seeds
// ---------------------------------------------------------------------------

/// Fixed label for the single token-type record.
pub const TOKEN_TYPE_SEED: &[u8] = b"spl-token-mint";

/// Fixed label for the vault record. Distinct from [`TOKEN_TYPE_SEED`] so
/// the two records can never collide.
pub const VAULT_SEED: &[u8] = b"vault";

// ---------------------------------------------------------------------------
// Derivation Parameters
// ---------------------------------------------------------------------------

/// Maximum length of a single seed, in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds per derivation, bump included.
pub const MAX_SEEDS: usize = 16;

/// Suffix appended to every derivation preimage. Keeps derived addresses in
/// their own hash domain, apart from anything else hashed with SHA-256.
pub const DERIVED_ADDRESS_MARKER: &[u8] = b"ProgramDerivedAddress";

// ---------------------------------------------------------------------------
// Token Parameters
// ---------------------------------------------------------------------------

/// Decimal precision of the token type. Zero: one unit is one token.
pub const TOKEN_DECIMALS: u8 = 0;

/// BLAKE3 derive-key context for signed transfer requests.
pub const TRANSFER_SIGNING_DOMAIN: &str = "mintvault 2026-01 transfer request v1";

/// Metadata key holding the number of committed operations.
pub const META_COMMIT_SEQUENCE: &[u8] = b"commit_sequence";

// ---------------------------------------------------------------------------
// ProgramIds
// ---------------------------------------------------------------------------

/// The three program identities a vault deployment is keyed on.
///
/// `Default` gives the production identities above. Tests and tooling can
/// swap them to run an isolated vault whose addresses don't overlap the
/// real ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramIds {
    /// Namespace for the token-type and vault derivations.
    pub vault_program: Address,
    /// Owner of token-type and holder-account records.
    pub token_program: Address,
    /// Namespace for holder-account derivations.
    pub associated_account_program: Address,
}

impl Default for ProgramIds {
    fn default() -> Self {
        Self {
            vault_program: VAULT_PROGRAM_ID,
            token_program: TOKEN_PROGRAM_ID,
            associated_account_program: ASSOCIATED_ACCOUNT_PROGRAM_ID,
        }
    }
}
