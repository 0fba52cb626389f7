//! Export of operands and keys into the engine layout
//!
//! - [`poly`]: ring element flattening (no value change)
//! - [`operand`]: ciphertexts and plaintexts, plus output import
//! - [`key`]: public-key-like pairs, key-switching, relinearization and galois keys
//! - [`layout`]: the flat structures handed to the engine
//! - [`wire`]: little-endian byte encoding of exported arguments
//!
//! Values held in Montgomery form (multiplication plaintexts, key digits) are
//! unmasked on a private copy before flattening, then multiplied by
//! `2^mform_bits` when a rescale is configured.

pub mod key;
pub mod layout;
pub mod operand;
pub mod poly;
pub mod wire;

pub use key::{
    export_galois_key, export_key_switch_key, export_public_key, export_relin_key,
    key_switch_digit_count,
};
pub use layout::{
    Component, ExportedCiphertext, ExportedGaloisKey, ExportedKeySwitchKey, ExportedPlaintext,
    ExportedPublicKey, Polynomial,
};
pub use operand::{
    export_ciphertext, export_plaintext, export_plaintext_mul, export_plaintext_ringt,
    import_ciphertext,
};
pub use poly::{export_component, export_polynomial, export_polynomial_qp};

use crate::math::RnsBasis;
use crate::params::HeParams;

/// Modulus chains and rescale exponent shared by one export pass
#[derive(Debug, Clone)]
pub struct ExportContext {
    ring_q: RnsBasis,
    ring_p: RnsBasis,
    mform_bits: u32,
}

impl ExportContext {
    /// Build the per-limb arithmetic for `params`
    pub fn new(params: &HeParams, mform_bits: u32) -> Self {
        Self {
            ring_q: params.ring_q(),
            ring_p: params.ring_p(),
            mform_bits,
        }
    }

    pub fn ring_q(&self) -> &RnsBasis {
        &self.ring_q
    }

    pub fn ring_p(&self) -> &RnsBasis {
        &self.ring_p
    }

    /// Power-of-two rescale exponent (0 disables the rescale)
    pub fn mform_bits(&self) -> u32 {
        self.mform_bits
    }
}
