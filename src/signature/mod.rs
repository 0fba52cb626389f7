//! Task contracts and their validation
//!
//! A task directory holds two contract files:
//!
//! - `task_signature.json`: scheme family, key requirements and one descriptor
//!   per argument (`online` and `offline` lists)
//! - `mega_ag.json`: the compiled task, whose `parameter` object declares the
//!   ring dimension and modulus chains
//!
//! Contracts are parsed into typed structs once at load time
//! ([`load_task_contract`]) and checked against the live objects before every
//! run ([`check_signatures`]).

pub mod check;
pub mod load;
pub mod types;

pub use check::{
    check_algorithm, check_arguments, check_key_signature, check_level_range, check_parameter,
    check_signatures, check_with_sig,
};
pub use load::{
    load_parameter_signature, load_task_contract, load_task_signature, TaskContract,
    PARAMETER_FILE, TASK_SIGNATURE_FILE,
};
pub use types::{
    canonical_galois_order, ArgPhase, ArgSignature, GaloisLevels, KeySignature,
    ParameterSignature, Phase, TaskSignature,
};
