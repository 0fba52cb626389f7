//! acc-bridge: Accelerator argument export for RNS homomorphic encryption
//!
//! This crate hands ciphertexts, plaintexts and evaluation keys of an RNS-based
//! HE library (BFV or CKKS) to an accelerator engine that runs a pre-compiled
//! task.
//!
//! Key components:
//! - Export: flattening of RNS polynomials into the engine layout, including
//!   unmasking of Montgomery-form values and the optional power-of-two rescale
//! - Signature validation: the task contract (`task_signature.json`) and the
//!   parameter contract (`mega_ag.json`) are checked against the live objects
//! - Task lifecycle: open, run and free a task bound to an [`task::AccEngine`]

pub mod argument;
pub mod error;
pub mod export;
pub mod keys;
pub mod math;
pub mod operand;
pub mod params;
pub mod ring;
pub mod signature;
pub mod task;

pub use argument::{
    export_argument, export_arguments, export_key_arguments, import_outputs, Argument,
    ArgumentData, ArgumentType, VectorArgument,
};
pub use error::{AccError, ContractViolation, Result};
pub use export::ExportContext;
pub use keys::{CiphertextQP, GaloisKeySet, RelinearizationKey, SwitchingKey};
pub use operand::{Ciphertext, Operand, OperandKind, Plaintext, PlaintextMul, PlaintextRingT};
pub use params::{Algorithm, HeParams};
pub use ring::{RnsPoly, RnsPolyQP};
pub use signature::{
    check_signatures, load_task_contract, KeySignature, ParameterSignature, Phase, TaskContract,
    TaskSignature,
};
pub use task::{AccEngine, AccTask, ExportArena, TaskHandle, TaskOptions, TaskState};
