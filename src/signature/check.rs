//! Contract validation.
//!
//! Checks run in a fixed order and stop at the first violation:
//! algorithm, keys, parameters, then each argument by position.

use tracing::debug;

use crate::argument::{VectorArgument, GALOIS_KEY_ID, RELIN_KEY_ID};
use crate::error::{ContractViolation, Result};
use crate::keys::{GaloisKeySet, RelinearizationKey};
use crate::params::{Algorithm, HeParams};

use super::types::{ArgSignature, KeySignature, ParameterSignature, Phase, TaskSignature};

/// Scheme family of `params` must match the contract
pub fn check_algorithm(params: &HeParams, sig: &TaskSignature) -> Result<()> {
    if params.algorithm != sig.algorithm {
        return Err(ContractViolation::AlgorithmMismatch {
            expected: sig.algorithm,
            actual: params.algorithm,
        }
        .into());
    }
    Ok(())
}

/// Supplied keys must cover the declared key levels
///
/// A declared relin level needs a relinearization key whose stored level is at
/// least that level. Declared galois levels need a key set holding every named
/// element. All galois keys are exported at one shared level, the maximum
/// declared level, so every key must be stored at least at that level.
pub fn check_key_signature(
    sig: &KeySignature,
    rlk: Option<&RelinearizationKey>,
    glk: Option<&GaloisKeySet>,
) -> Result<()> {
    if let Some(required) = sig.rlk {
        let rlk = rlk.ok_or(ContractViolation::MissingRelinKey)?;
        if rlk.level() < required {
            return Err(ContractViolation::RelinKeyLevel {
                required,
                actual: rlk.level(),
            }
            .into());
        }
    }

    if let Some(required) = sig.glk.max_level() {
        let glk = glk.ok_or(ContractViolation::MissingGaloisKeySet)?;
        for (galois_element, _) in sig.glk.iter() {
            let key = glk
                .get(galois_element)
                .ok_or(ContractViolation::MissingGaloisKey { galois_element })?;
            if key.level_q() < required {
                return Err(ContractViolation::GaloisKeyLevel {
                    galois_element,
                    required,
                    actual: key.level_q(),
                }
                .into());
            }
        }
    }

    Ok(())
}

fn mismatch(field: impl Into<String>, expected: impl ToString, actual: impl ToString) -> Result<()> {
    Err(ContractViolation::ParameterMismatch {
        field: field.into(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
    .into())
}

fn check_chain(name: &str, expected: &[u64], actual: &[u64]) -> Result<()> {
    if expected.len() != actual.len() {
        return mismatch(format!("{name} count"), expected.len(), actual.len());
    }
    for (i, (e, a)) in expected.iter().zip(actual).enumerate() {
        if e != a {
            return mismatch(format!("{name}[{i}]"), e, a);
        }
    }
    Ok(())
}

/// Runtime parameters must equal the parameter contract
///
/// `n` and `q` are always checked, `p` when declared, and `t` for BFV when
/// declared.
pub fn check_parameter(params: &HeParams, sig: &ParameterSignature) -> Result<()> {
    if params.ring_dim != sig.n {
        return mismatch("N", sig.n, params.ring_dim);
    }
    check_chain("Q", &sig.q, &params.q)?;
    if let Some(p) = &sig.p {
        check_chain("P", p, &params.p)?;
    }
    if params.algorithm == Algorithm::Bfv {
        if let Some(t) = sig.t {
            match params.t {
                Some(actual) if actual == t => {}
                Some(actual) => return mismatch("t", t, actual),
                None => return mismatch("t", t, "none"),
            }
        }
    }
    Ok(())
}

/// Declared levels must fit the runtime Q chain
///
/// Covers the relin level, every galois level and every descriptor of `phase`.
/// Operand levels are tied to descriptor levels by [`check_with_sig`], so they
/// are bounded too once both checks pass.
pub fn check_level_range(params: &HeParams, sig: &TaskSignature, phase: Phase) -> Result<()> {
    let max_level = params.max_level();
    let out_of_range = |id: &str, level: usize| -> Result<()> {
        if level > max_level {
            return Err(ContractViolation::LevelOutOfRange {
                id: id.to_string(),
                level,
                max_level,
            }
            .into());
        }
        Ok(())
    };

    if let Some(level) = sig.key.rlk {
        out_of_range(RELIN_KEY_ID, level)?;
    }
    if let Some(level) = sig.key.glk.max_level() {
        out_of_range(GALOIS_KEY_ID, level)?;
    }
    for desc in sig.descriptors(phase) {
        out_of_range(&desc.id, desc.level)?;
    }
    Ok(())
}

/// Check one argument against its descriptor
pub fn check_with_sig(arg: &VectorArgument, sig: &ArgSignature) -> Result<()> {
    if arg.id != sig.id {
        return Err(ContractViolation::ArgumentId {
            expected: sig.id.clone(),
            actual: arg.id.clone(),
        }
        .into());
    }

    let expected = sig.expected_count();
    if arg.len() != expected {
        return Err(ContractViolation::ArgumentSize {
            id: arg.id.clone(),
            expected,
            actual: arg.len(),
        }
        .into());
    }

    for op in &arg.data {
        if op.kind() != sig.kind {
            return Err(ContractViolation::ArgumentType {
                id: arg.id.clone(),
                expected: sig.kind.to_string(),
                actual: op.kind().to_string(),
            }
            .into());
        }
        if op.level() != sig.level {
            return Err(ContractViolation::ArgumentLevel {
                id: arg.id.clone(),
                expected: sig.level,
                actual: op.level(),
            }
            .into());
        }
    }
    Ok(())
}

/// Check every argument against the descriptors of `phase`
///
/// # Returns
///
/// The number of input arguments (descriptors tagged `in` or `offline`)
pub fn check_arguments(sig: &TaskSignature, args: &[VectorArgument], phase: Phase) -> Result<usize> {
    let descriptors = sig.descriptors(phase);
    if args.len() != descriptors.len() {
        return Err(ContractViolation::ArgumentCount {
            expected: descriptors.len(),
            actual: args.len(),
        }
        .into());
    }

    let mut input_count = 0;
    for (arg, desc) in args.iter().zip(descriptors) {
        check_with_sig(arg, desc)?;
        if desc.phase.is_input() {
            input_count += 1;
        }
    }
    Ok(input_count)
}

/// Run all checks in order
///
/// # Arguments
///
/// * `params` - Runtime scheme parameters
/// * `sig` - Task contract
/// * `param_sig` - Parameter contract
/// * `rlk` / `glk` - Supplied keys
/// * `args` - Data arguments, inputs first
/// * `phase` - Descriptor list to check against
///
/// # Returns
///
/// The number of input arguments
pub fn check_signatures(
    params: &HeParams,
    sig: &TaskSignature,
    param_sig: &ParameterSignature,
    rlk: Option<&RelinearizationKey>,
    glk: Option<&GaloisKeySet>,
    args: &[VectorArgument],
    phase: Phase,
) -> Result<usize> {
    check_algorithm(params, sig)?;
    check_key_signature(&sig.key, rlk, glk)?;
    check_parameter(params, param_sig)?;
    check_level_range(params, sig, phase)?;
    let input_count = check_arguments(sig, args, phase)?;
    debug!(%phase, args = args.len(), input_count, "task signature checks passed");
    Ok(input_count)
}
