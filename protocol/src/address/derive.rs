//! # Derived Addresses
//!
//! Maps a list of seeds plus a program identity to an address that no
//! private key controls.
//!
//! ```text
//! candidate = SHA-256(seed_0 || ... || seed_n || program_id || "ProgramDerivedAddress")
//! ```
//!
//! Roughly half of all SHA-256 outputs happen to decode as Ed25519 points.
//! Those are rejected, because an on-curve address could in principle have
//! a matching secret key. [`find_derived_address`] appends a one-byte
//! "bump" as the last seed and walks it down from 255 until the candidate
//! lands off the curve. The first bump that works is the canonical one.
//!
//! Derivation is pure: same seeds, same program, same address, in every
//! process, forever.

use thiserror::Error;
use tracing::debug;

use super::pubkey::Address;
use crate::crypto::hash::sha256_multi;
use crate::config::{DERIVED_ADDRESS_MARKER, MAX_SEEDS, MAX_SEED_LEN, TOKEN_TYPE_SEED, VAULT_SEED};

/// Errors from address derivation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerivationError {
    #[error("seed {index} is {len} bytes, maximum is {MAX_SEED_LEN}")]
    MaxSeedLengthExceeded { index: usize, len: usize },

    #[error("{0} seeds supplied, maximum is {MAX_SEEDS}")]
    TooManySeeds(usize),

    /// The candidate is a valid curve point. Try another bump.
    #[error("derived address lies on the ed25519 curve")]
    OnCurve,

    /// Every bump from 255 to 0 produced an on-curve candidate.
    #[error("no bump in 0..=255 yields an off-curve address")]
    Exhausted,
}

/// Computes the address for an exact seed list (bump included, if any).
///
/// # Errors
///
/// Fails on oversized or too many seeds, and with
/// [`DerivationError::OnCurve`] when the hash lands on the curve.
pub fn create_derived_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<Address, DerivationError> {
    if seeds.len() > MAX_SEEDS {
        return Err(DerivationError::TooManySeeds(seeds.len()));
    }

    if let Some((index, seed)) = seeds
        .iter()
        .enumerate()
        .find(|(_, seed)| seed.len() > MAX_SEED_LEN)
    {
        return Err(DerivationError::MaxSeedLengthExceeded {
            index,
            len: seed.len(),
        });
    }

    let mut preimage: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 2);
    preimage.extend_from_slice(seeds);
    preimage.push(program_id.as_ref());
    preimage.push(DERIVED_ADDRESS_MARKER);

    let candidate = Address::new(sha256_multi(&preimage));
    if candidate.is_on_curve() {
        return Err(DerivationError::OnCurve);
    }
    Ok(candidate)
}

/// Finds the canonical off-curve address and its bump for `seeds`.
///
/// One seed slot is reserved for the bump, so at most `MAX_SEEDS - 1`
/// seeds may be supplied here.
///
/// # Errors
///
/// Propagates seed-limit errors immediately. Returns
/// [`DerivationError::Exhausted`] if no bump works, which for any sane seed
/// set has probability around 2^-256.
pub fn find_derived_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<(Address, u8), DerivationError> {
    if seeds.len() >= MAX_SEEDS {
        return Err(DerivationError::TooManySeeds(seeds.len() + 1));
    }

    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut with_bump: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 1);
        with_bump.extend_from_slice(seeds);
        with_bump.push(&bump_seed);

        match create_derived_address(&with_bump, program_id) {
            Ok(address) => {
                debug!(
                    %address,
                    key = %address.to_hex(),
                    bump,
                    program = %program_id,
                    "derived address"
                );
                return Ok((address, bump));
            }
            Err(DerivationError::OnCurve) => continue,
            Err(other) => return Err(other),
        }
    }

    Err(DerivationError::Exhausted)
}

/// Address of the single token-type record under `vault_program`.
pub fn token_type_address(vault_program: &Address) -> Result<(Address, u8), DerivationError> {
    find_derived_address(&[TOKEN_TYPE_SEED], vault_program)
}

/// Address of the vault record under `vault_program`.
pub fn vault_address(vault_program: &Address) -> Result<(Address, u8), DerivationError> {
    find_derived_address(&[VAULT_SEED], vault_program)
}

/// Address of `holder`'s custody account for `token_type`.
///
/// Seeds are `holder || token_program || token_type`, derived under the
/// associated-account program, so each (holder, token type) pair has
/// exactly one account.
pub fn holder_account_address(
    holder: &Address,
    token_program: &Address,
    token_type: &Address,
    associated_account_program: &Address,
) -> Result<(Address, u8), DerivationError> {
    find_derived_address(
        &[
            holder.as_ref(),
            token_program.as_ref(),
            token_type.as_ref(),
        ],
        associated_account_program,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ASSOCIATED_ACCOUNT_PROGRAM_ID, TOKEN_PROGRAM_ID, VAULT_PROGRAM_ID};

    fn addr(s: &str) -> Address {
        Address::from_base58(s).unwrap()
    }

    // Known vectors. These are the same addresses the reference harness
    // computes for the deployed program, so they pin the wire format.

    #[test]
    fn token_type_address_known_vector() {
        let (address, bump) = token_type_address(&VAULT_PROGRAM_ID).unwrap();
        assert_eq!(address, addr("CvzAmCAkfbKCzteWMbPCuAy1nsCshKBb7LRVn2wsQPWS"));
        assert_eq!(bump, 255);
    }

    #[test]
    fn vault_address_known_vector() {
        let (address, bump) = vault_address(&VAULT_PROGRAM_ID).unwrap();
        assert_eq!(address, addr("CNMLqo2AXAgSyUNtoqMKPiDcVqiuaxWhykejuL8dS3RC"));
        assert_eq!(bump, 255);
    }

    #[test]
    fn holder_account_known_vector_skips_on_curve_bump() {
        let holder = Address::new([7u8; 32]);
        let (token_type, _) = token_type_address(&VAULT_PROGRAM_ID).unwrap();
        let (address, bump) = holder_account_address(
            &holder,
            &TOKEN_PROGRAM_ID,
            &token_type,
            &ASSOCIATED_ACCOUNT_PROGRAM_ID,
        )
        .unwrap();
        assert_eq!(address, addr("2EHngGLAqc7jAwWLvFrtoSa5gMF96odXozZGZagHQBsv"));
        assert_eq!(bump, 254);

        // Bump 255 is the one that landed on the curve.
        let rejected = create_derived_address(
            &[
                holder.as_ref(),
                TOKEN_PROGRAM_ID.as_ref(),
                token_type.as_ref(),
                [255u8].as_slice(),
            ],
            &ASSOCIATED_ACCOUNT_PROGRAM_ID,
        );
        assert_eq!(rejected, Err(DerivationError::OnCurve));
    }

    #[test]
    fn derivation_is_deterministic() {
        let seeds = [b"alpha".as_slice(), b"beta".as_slice()];
        let a = find_derived_address(&seeds, &VAULT_PROGRAM_ID).unwrap();
        let b = find_derived_address(&seeds, &VAULT_PROGRAM_ID).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn derived_addresses_are_off_curve() {
        for i in 0u8..32 {
            let seed = [i];
            let (address, _) =
                find_derived_address(&[seed.as_slice()], &VAULT_PROGRAM_ID).unwrap();
            assert!(!address.is_on_curve());
        }
    }

    #[test]
    fn create_with_found_bump_reproduces_address() {
        let (address, bump) = vault_address(&VAULT_PROGRAM_ID).unwrap();
        let recreated =
            create_derived_address(&[VAULT_SEED, [bump].as_slice()], &VAULT_PROGRAM_ID).unwrap();
        assert_eq!(address, recreated);
    }

    #[test]
    fn different_programs_produce_different_addresses() {
        let (a, _) = vault_address(&VAULT_PROGRAM_ID).unwrap();
        let (b, _) = vault_address(&TOKEN_PROGRAM_ID).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn token_type_and_vault_never_collide() {
        let (token_type, _) = token_type_address(&VAULT_PROGRAM_ID).unwrap();
        let (vault, _) = vault_address(&VAULT_PROGRAM_ID).unwrap();
        assert_ne!(token_type, vault);
    }

    #[test]
    fn holder_accounts_are_distinct_per_holder() {
        let (token_type, _) = token_type_address(&VAULT_PROGRAM_ID).unwrap();
        let derive = |holder: Address| {
            holder_account_address(
                &holder,
                &TOKEN_PROGRAM_ID,
                &token_type,
                &ASSOCIATED_ACCOUNT_PROGRAM_ID,
            )
            .unwrap()
            .0
        };
        assert_ne!(derive(Address::new([1; 32])), derive(Address::new([2; 32])));
    }

    #[test]
    fn oversized_seed_rejected() {
        let long = [0u8; MAX_SEED_LEN + 1];
        assert_eq!(
            find_derived_address(&[b"ok".as_slice(), long.as_slice()], &VAULT_PROGRAM_ID),
            Err(DerivationError::MaxSeedLengthExceeded {
                index: 1,
                len: MAX_SEED_LEN + 1
            })
        );
    }

    #[test]
    fn too_many_seeds_rejected() {
        let seed: &[u8] = b"s";
        let seeds = vec![seed; MAX_SEEDS];
        assert_eq!(
            find_derived_address(&seeds, &VAULT_PROGRAM_ID),
            Err(DerivationError::TooManySeeds(MAX_SEEDS + 1))
        );
        let seeds = vec![seed; MAX_SEEDS + 1];
        assert_eq!(
            create_derived_address(&seeds, &VAULT_PROGRAM_ID),
            Err(DerivationError::TooManySeeds(MAX_SEEDS + 1))
        );
    }
}
