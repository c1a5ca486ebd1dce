//! # Signing Authorities
//!
//! Two kinds of entity can authorize a ledger mutation:
//!
//! - [`VaultSigner`]: the vault itself. It has no private key. The only way
//!   to obtain one is to re-derive the vault address from the fixed seed and
//!   the recorded bump inside this crate, so no caller can forge it and no
//!   "vault signature" is ever accepted from outside.
//! - [`UserAuthority`]: a holder, proven either by a verified Ed25519
//!   signature or by presenting the holder's keypair locally.
//!
//! Token primitives take `&dyn SigningAuthority` and compare
//! [`signer`](SigningAuthority::signer) against the authority recorded on
//! the account they mutate.

use std::fmt;

use crate::address::{create_derived_address, Address, DerivationError};
use crate::config::VAULT_SEED;
use crate::crypto::{Keypair, Signature};
use crate::error::{VaultError, VaultResult};

/// Which kind of authority signed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthorityKind {
    /// The derived vault address.
    Vault,
    /// A holder's own key.
    User,
}

impl fmt::Display for AuthorityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorityKind::Vault => write!(f, "vault"),
            AuthorityKind::User => write!(f, "user"),
        }
    }
}

/// An entity whose authorization has already been established.
pub trait SigningAuthority {
    /// Address the authority acts as.
    fn signer(&self) -> &Address;

    fn kind(&self) -> AuthorityKind;
}

// ---------------------------------------------------------------------------
// VaultSigner
// ---------------------------------------------------------------------------

/// The vault acting as signer. Constructible only inside this crate.
#[derive(Debug)]
pub struct VaultSigner {
    address: Address,
}

impl VaultSigner {
    /// Rebuilds the vault's signing capability from its seed and bump.
    ///
    /// Fails with [`VaultError::AuthorityMismatch`] if the bump does not
    /// reproduce `expected`, or lands on the curve.
    pub(crate) fn reconstruct(
        vault_program: &Address,
        bump: u8,
        expected: &Address,
    ) -> VaultResult<Self> {
        let bump_seed = [bump];
        let derived = match create_derived_address(
            &[VAULT_SEED, bump_seed.as_slice()],
            vault_program,
        ) {
            Ok(address) => address,
            Err(DerivationError::OnCurve) => {
                return Err(VaultError::AuthorityMismatch {
                    expected: *expected,
                })
            }
            Err(other) => return Err(other.into()),
        };

        if derived != *expected {
            return Err(VaultError::AuthorityMismatch {
                expected: *expected,
            });
        }
        Ok(Self { address: derived })
    }
}

impl SigningAuthority for VaultSigner {
    fn signer(&self) -> &Address {
        &self.address
    }

    fn kind(&self) -> AuthorityKind {
        AuthorityKind::Vault
    }
}

// ---------------------------------------------------------------------------
// UserAuthority
// ---------------------------------------------------------------------------

/// A holder whose identity has been proven.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserAuthority {
    address: Address,
}

impl UserAuthority {
    /// Proof by possession: the caller holds the keypair.
    pub fn from_keypair(keypair: &Keypair) -> Self {
        Self {
            address: keypair.address(),
        }
    }

    /// Proof by signature: `signature` must verify over `message` for
    /// `claimed`. Only for messages that pin down the whole operation.
    pub(crate) fn verify(
        claimed: Address,
        message: &[u8],
        signature: &Signature,
    ) -> VaultResult<Self> {
        if !signature.verify(&claimed, message) {
            return Err(VaultError::AuthorityMismatch { expected: claimed });
        }
        Ok(Self { address: claimed })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }
}

impl SigningAuthority for UserAuthority {
    fn signer(&self) -> &Address {
        &self.address
    }

    fn kind(&self) -> AuthorityKind {
        AuthorityKind::User
    }
}
