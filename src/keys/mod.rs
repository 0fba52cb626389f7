//! Key-switching key material
//!
//! A key-switching key from s to s' consists of gadget digits, each an
//! encryption over the extended basis Q·P:
//! ```text
//! K = [CiphertextQP_0, CiphertextQP_1, ..., CiphertextQP_(dnum-1)]
//! ```
//!
//! - Relinearization keys hold one switching key (s² → s)
//! - Galois key sets hold one switching key per automorphism X → X^g
//!
//! All digits are stored in Montgomery form and are unmasked on export.

mod types;

pub use types::{CiphertextQP, GaloisKeySet, RelinearizationKey, SwitchingKey};
