//! Key-switching key export.
//!
//! Keys are stored in Montgomery form over Q·P. Export works on a deep copy of
//! the digits it needs:
//!
//! ```text
//! stored digits ──copy──> unmask Q and P ──(× 2^k)──> flatten at level
//! ```

use tracing::debug;

use crate::error::{ContractViolation, Result};
use crate::keys::{CiphertextQP, GaloisKeySet, RelinearizationKey, SwitchingKey};

use super::layout::{ExportedGaloisKey, ExportedKeySwitchKey, ExportedPublicKey};
use super::poly::export_polynomial_qp;
use super::ExportContext;

/// Number of digits exported for `key`
///
/// With a target level `L` this is the minimal number covering it,
/// `(L + 1 + level_p) / (level_p + 1)`, capped at the stored count. Without one
/// it is the stored count.
pub fn key_switch_digit_count(key: &SwitchingKey, level: Option<usize>) -> usize {
    match level {
        Some(level) => key.digits_for_level(level).min(key.digit_count()),
        None => key.digit_count(),
    }
}

/// Flatten a public-key-like pair at a shared override level
pub fn export_public_key(pk: &CiphertextQP, level: Option<usize>) -> Result<ExportedPublicKey> {
    let exported_level = level.map_or(pk.level_q(), |l| l.min(pk.level_q()));
    Ok(ExportedPublicKey {
        level: exported_level as i32,
        degree: 1,
        polys: [
            export_polynomial_qp(&pk.value[0], level)?,
            export_polynomial_qp(&pk.value[1], level)?,
        ],
    })
}

/// Export a key-switching key in the standard domain
///
/// # Arguments
///
/// * `ctx` - Export context with the Q and P chains and the rescale exponent
/// * `key` - Stored key (Montgomery form); never modified
/// * `level` - Target base level, or `None` for the stored level
///
/// # Returns
///
/// The first [`key_switch_digit_count`] digits, unmasked on every modulus
pub fn export_key_switch_key(
    ctx: &ExportContext,
    key: &SwitchingKey,
    level: Option<usize>,
) -> Result<ExportedKeySwitchKey> {
    check_key_fits(ctx, key)?;

    let digit_count = key_switch_digit_count(key, level);
    let mut digits = key.digits()[..digit_count].to_vec();

    for digit in &mut digits {
        for poly in &mut digit.value {
            ctx.ring_q().inv_mform(&mut poly.q);
            ctx.ring_p().inv_mform(&mut poly.p);
            if ctx.mform_bits() != 0 {
                ctx.ring_q().mul_by_pow2(&mut poly.q, ctx.mform_bits());
                ctx.ring_p().mul_by_pow2(&mut poly.p, ctx.mform_bits());
            }
        }
    }

    let digits = digits
        .iter()
        .map(|digit| export_public_key(digit, level))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        digits = digits.len(),
        stored = key.digit_count(),
        level = ?level,
        "exported key-switching key"
    );
    Ok(ExportedKeySwitchKey { digits })
}

/// Export the relinearization key
pub fn export_relin_key(
    ctx: &ExportContext,
    rlk: &RelinearizationKey,
    level: Option<usize>,
) -> Result<ExportedKeySwitchKey> {
    export_key_switch_key(ctx, &rlk.key, level)
}

/// Export galois keys in exactly the order of `galois_elements`
///
/// All keys share `level`; callers pass the maximum of the requested
/// per-element levels.
///
/// # Errors
///
/// [`ContractViolation::MissingGaloisKey`] for an element absent from `set`,
/// [`ContractViolation::GaloisKeyLevel`] for a key stored below `level`.
pub fn export_galois_key(
    ctx: &ExportContext,
    set: &GaloisKeySet,
    galois_elements: &[u64],
    level: Option<usize>,
) -> Result<ExportedGaloisKey> {
    let key_switch_keys = galois_elements
        .iter()
        .map(|&galois_element| {
            let key = set
                .get(galois_element)
                .ok_or(ContractViolation::MissingGaloisKey { galois_element })?;
            if let Some(required) = level.filter(|&l| key.level_q() < l) {
                return Err(ContractViolation::GaloisKeyLevel {
                    galois_element,
                    required,
                    actual: key.level_q(),
                }
                .into());
            }
            export_key_switch_key(ctx, key, level)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ExportedGaloisKey {
        galois_elements: galois_elements.to_vec(),
        key_switch_keys,
    })
}

fn check_key_fits(ctx: &ExportContext, key: &SwitchingKey) -> Result<()> {
    for digit in key.digits() {
        for poly in &digit.value {
            if poly.q.limb_count() > ctx.ring_q().len() || poly.p.limb_count() > ctx.ring_p().len() {
                return Err(ContractViolation::ParameterMismatch {
                    field: "key".to_string(),
                    expected: format!(
                        "at most {} base and {} extension limbs",
                        ctx.ring_q().len(),
                        ctx.ring_p().len()
                    ),
                    actual: format!("{} and {}", poly.q.limb_count(), poly.p.limb_count()),
                }
                .into());
            }
        }
    }
    Ok(())
}
