//! Argument marshaling
//!
//! A [`VectorArgument`] is a named homogeneous list of operands as supplied by
//! the caller. [`export_argument`] turns one into an engine [`Argument`];
//! [`export_key_arguments`] synthesizes the relinearization and galois key
//! arguments a task contract asks for.

use std::fmt;

use tracing::debug;

use crate::error::{AccError, ContractViolation, Result};
use crate::export::{
    export_ciphertext, export_galois_key, export_plaintext, export_plaintext_mul,
    export_plaintext_ringt, export_relin_key, import_ciphertext, ExportContext,
    ExportedCiphertext, ExportedGaloisKey, ExportedKeySwitchKey, ExportedPlaintext,
};
use crate::keys::{GaloisKeySet, RelinearizationKey};
use crate::operand::{Operand, OperandKind};
use crate::signature::KeySignature;

/// Id of the synthesized relinearization key argument
pub const RELIN_KEY_ID: &str = "rlk_ntt";
/// Id of the synthesized galois key argument
pub const GALOIS_KEY_ID: &str = "glk_ntt";

/// Named list of operands passed to a task
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VectorArgument {
    pub id: String,
    pub data: Vec<Operand>,
}

impl VectorArgument {
    pub fn new(id: impl Into<String>, data: Vec<Operand>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Number of operands
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Engine argument type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentType {
    Ciphertext,
    Plaintext,
    RelinKey,
    GaloisKey,
}

impl ArgumentType {
    /// Numeric tag used in the engine layout
    pub fn tag(&self) -> u32 {
        match self {
            ArgumentType::Ciphertext => 0,
            ArgumentType::Plaintext => 1,
            ArgumentType::RelinKey => 2,
            ArgumentType::GaloisKey => 3,
        }
    }

    /// Inverse of [`ArgumentType::tag`]
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(ArgumentType::Ciphertext),
            1 => Some(ArgumentType::Plaintext),
            2 => Some(ArgumentType::RelinKey),
            3 => Some(ArgumentType::GaloisKey),
            _ => None,
        }
    }
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgumentType::Ciphertext => "ciphertext",
            ArgumentType::Plaintext => "plaintext",
            ArgumentType::RelinKey => "relin key",
            ArgumentType::GaloisKey => "galois key",
        };
        f.write_str(name)
    }
}

/// Exported payload of an argument
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgumentData {
    Ciphertexts(Vec<ExportedCiphertext>),
    Plaintexts(Vec<ExportedPlaintext>),
    RelinKey(ExportedKeySwitchKey),
    GaloisKey(ExportedGaloisKey),
}

/// One argument in the engine layout
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Argument {
    pub id: String,
    pub count: i32,
    pub level: i32,
    pub data: ArgumentData,
}

impl Argument {
    /// Type tag, derived from the payload
    pub fn arg_type(&self) -> ArgumentType {
        match &self.data {
            ArgumentData::Ciphertexts(_) => ArgumentType::Ciphertext,
            ArgumentData::Plaintexts(_) => ArgumentType::Plaintext,
            ArgumentData::RelinKey(_) => ArgumentType::RelinKey,
            ArgumentData::GaloisKey(_) => ArgumentType::GaloisKey,
        }
    }

    /// Exported ciphertexts, for ciphertext arguments
    pub fn ciphertexts(&self) -> Option<&[ExportedCiphertext]> {
        match &self.data {
            ArgumentData::Ciphertexts(cts) => Some(cts),
            _ => None,
        }
    }

    /// Mutable exported ciphertexts, for the engine to fill
    pub fn ciphertexts_mut(&mut self) -> Option<&mut [ExportedCiphertext]> {
        match &mut self.data {
            ArgumentData::Ciphertexts(cts) => Some(cts),
            _ => None,
        }
    }
}

/// Export one homogeneous operand list
///
/// Dispatches on the variant of `data[0]`; every other operand must have the
/// same variant and the same level.
///
/// # Errors
///
/// * [`ContractViolation::EmptyArgument`] for an empty list
/// * [`ContractViolation::MixedOperands`] for a variant mismatch
/// * [`ContractViolation::HeterogeneousLevel`] for a level mismatch
pub fn export_argument(ctx: &ExportContext, arg: &VectorArgument) -> Result<Argument> {
    let first = arg.data.first().ok_or_else(|| ContractViolation::EmptyArgument {
        id: arg.id.clone(),
    })?;
    check_homogeneous(arg, first)?;

    let count = arg.data.len();
    let mut data = match first {
        Operand::Ciphertext(_) => ArgumentData::Ciphertexts(Vec::with_capacity(count)),
        Operand::Plaintext(_) | Operand::PlaintextRingT(_) | Operand::PlaintextMul(_) => {
            ArgumentData::Plaintexts(Vec::with_capacity(count))
        }
    };

    for (index, op) in arg.data.iter().enumerate() {
        match (&mut data, op) {
            (ArgumentData::Ciphertexts(cts), Operand::Ciphertext(ct)) => {
                cts.push(export_ciphertext(ct)?)
            }
            (ArgumentData::Plaintexts(pts), Operand::Plaintext(pt)) => pts.push(export_plaintext(pt)?),
            (ArgumentData::Plaintexts(pts), Operand::PlaintextRingT(pt)) => {
                pts.push(export_plaintext_ringt(pt)?)
            }
            (ArgumentData::Plaintexts(pts), Operand::PlaintextMul(pt)) => {
                pts.push(export_plaintext_mul(ctx, pt)?)
            }
            _ => return Err(mixed_operands(arg, first, index, op)),
        }
    }

    Ok(Argument {
        id: arg.id.clone(),
        count: arg.data.len() as i32,
        level: first.level() as i32,
        data,
    })
}

fn mixed_operands(arg: &VectorArgument, first: &Operand, index: usize, op: &Operand) -> AccError {
    ContractViolation::MixedOperands {
        id: arg.id.clone(),
        index,
        expected: first.kind().to_string(),
        actual: op.kind().to_string(),
    }
    .into()
}

fn check_homogeneous(arg: &VectorArgument, first: &Operand) -> Result<()> {
    for (index, op) in arg.data.iter().enumerate().skip(1) {
        if op.kind() != first.kind() {
            return Err(mixed_operands(arg, first, index, op));
        }
        if op.level() != first.level() {
            return Err(ContractViolation::HeterogeneousLevel {
                id: arg.id.clone(),
                index,
                expected: first.level(),
                actual: op.level(),
            }
            .into());
        }
    }
    Ok(())
}

/// Export all data arguments, split into inputs and outputs
///
/// The first `input_count` arguments are inputs, the rest outputs. Outputs
/// must be ciphertext lists.
pub fn export_arguments(
    ctx: &ExportContext,
    args: &[VectorArgument],
    input_count: usize,
) -> Result<(Vec<Argument>, Vec<Argument>)> {
    let split = input_count.min(args.len());
    let (inputs, outputs) = args.split_at(split);

    for arg in outputs {
        if let Some(op) = arg.data.iter().find(|op| op.kind() != OperandKind::Ciphertext) {
            return Err(ContractViolation::UnsupportedOutput {
                id: arg.id.clone(),
                actual: op.kind().to_string(),
            }
            .into());
        }
    }

    let inputs = inputs
        .iter()
        .map(|arg| export_argument(ctx, arg))
        .collect::<Result<Vec<_>>>()?;
    let outputs = outputs
        .iter()
        .map(|arg| export_argument(ctx, arg))
        .collect::<Result<Vec<_>>>()?;

    debug!(inputs = inputs.len(), outputs = outputs.len(), "exported data arguments");
    Ok((inputs, outputs))
}

/// Synthesize key arguments required by the key contract
///
/// A relinearization key argument is produced when the contract declares a
/// relin level. A galois key argument is produced when the contract declares
/// galois levels; its elements follow the canonical order and all keys are
/// exported at the maximum declared level.
pub fn export_key_arguments(
    ctx: &ExportContext,
    key_sig: &KeySignature,
    rlk: Option<&RelinearizationKey>,
    glk: Option<&GaloisKeySet>,
) -> Result<Vec<Argument>> {
    let mut args = Vec::new();

    if let Some(level) = key_sig.rlk {
        let rlk = rlk.ok_or(ContractViolation::MissingRelinKey)?;
        args.push(Argument {
            id: RELIN_KEY_ID.to_string(),
            count: 1,
            level: level as i32,
            data: ArgumentData::RelinKey(export_relin_key(ctx, rlk, Some(level))?),
        });
    }

    if let Some(level) = key_sig.glk.max_level() {
        let glk = glk.ok_or(ContractViolation::MissingGaloisKeySet)?;
        let elements = key_sig.glk.canonical_order();
        args.push(Argument {
            id: GALOIS_KEY_ID.to_string(),
            count: 1,
            level: level as i32,
            data: ArgumentData::GaloisKey(export_galois_key(ctx, glk, &elements, Some(level))?),
        });
    }

    debug!(count = args.len(), "exported key arguments");
    Ok(args)
}

/// Copy engine outputs back into the caller's output ciphertexts
///
/// `outputs` and `dst` are matched by position.
pub fn import_outputs(outputs: &[Argument], dst: &mut [VectorArgument]) -> Result<()> {
    for (out, arg) in outputs.iter().zip(dst.iter_mut()) {
        let exported = out.ciphertexts().ok_or_else(|| ContractViolation::UnsupportedOutput {
            id: out.id.clone(),
            actual: out.arg_type().to_string(),
        })?;
        if exported.len() != arg.data.len() {
            return Err(ContractViolation::ImportShape {
                id: arg.id.clone(),
                detail: format!("expected {} ciphertexts, got {}", arg.data.len(), exported.len()),
            }
            .into());
        }
        for (src, op) in exported.iter().zip(arg.data.iter_mut()) {
            let kind = op.kind();
            let ct = op.as_ciphertext_mut().ok_or_else(|| ContractViolation::UnsupportedOutput {
                id: arg.id.clone(),
                actual: kind.to_string(),
            })?;
            import_ciphertext(&arg.id, src, ct)?;
        }
    }
    Ok(())
}
