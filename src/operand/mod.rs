//! Data operands: ciphertexts and the three plaintext variants.
//!
//! | Variant | Tag | Numeric domain |
//! |---|---|---|
//! | [`Ciphertext`] | `ct` | standard |
//! | [`Plaintext`] | `pt` | standard |
//! | [`PlaintextRingT`] | `pt_ringt` | standard, plaintext ring, level 0 |
//! | [`PlaintextMul`] | `pt_mul` | Montgomery form |
//!
//! [`Operand`] is the closed sum over the variants; exporters and the
//! validator match on it exhaustively.

mod types;

pub use types::{Ciphertext, Operand, OperandKind, Plaintext, PlaintextMul, PlaintextRingT};
