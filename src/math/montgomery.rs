//! Montgomery form ("multiplication domain") for a single modulus.
//!
//! Values stored for fast multiplication are kept as `a_mont = a * R mod q`
//! where `R = 2^64`. The HE library keeps multiplication-domain plaintexts and
//! every key-switching digit in this form; the accelerator expects standard
//! residues, so export has to undo the mask with a Montgomery reduction:
//!
//! ```text
//! from_mont(a_mont) = a_mont * R^(-1) mod q = a
//! ```
//!
//! # Example
//!
//! ```
//! use acc_bridge::math::Montgomery;
//!
//! let m = Montgomery::new(1152921504606830593);
//! let masked = m.to_mont(42);
//! assert_ne!(masked, 42);
//! assert_eq!(m.from_mont(masked), 42);
//! ```

use super::modular::ModQ;

/// Largest supported modulus; keeps the reduction sum inside u128.
pub const MAX_MODULUS: u64 = 1 << 62;

/// Precomputed Montgomery constants for one modulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Montgomery {
    /// The modulus q (odd).
    q: u64,
    /// -q^(-1) mod 2^64.
    q_inv_neg: u64,
    /// R^2 mod q, used to enter Montgomery form.
    r_squared: u64,
}

impl Montgomery {
    /// Precompute constants for an odd modulus below [`MAX_MODULUS`].
    ///
    /// # Panics
    ///
    /// Panics if `q` is even or out of range.
    pub fn new(q: u64) -> Self {
        assert!(q % 2 == 1 && q >= 3, "Montgomery modulus must be odd, got {q}");
        assert!(q < MAX_MODULUS, "modulus {q} exceeds 62 bits");
        Self {
            q,
            q_inv_neg: Self::compute_q_inv_neg(q),
            r_squared: Self::compute_r_squared(q),
        }
    }

    /// The modulus q.
    pub fn modulus(&self) -> u64 {
        self.q
    }

    /// Mask a standard residue: a -> a * R mod q
    #[inline]
    pub fn to_mont(&self, a: u64) -> u64 {
        self.montgomery_mul(a % self.q, self.r_squared)
    }

    /// Unmask a Montgomery residue: a * R -> a
    #[inline]
    pub fn from_mont(&self, a: u64) -> u64 {
        self.montgomery_mul(a % self.q, 1)
    }

    /// Multiply a residue by 2^k mod q
    #[inline]
    pub fn mul_by_pow2(&self, a: u64, k: u32) -> u64 {
        ModQ::mul(a, ModQ::pow2(k, self.q), self.q)
    }

    /// -q^(-1) mod 2^64 by Newton iteration (each step doubles the correct bits)
    fn compute_q_inv_neg(q: u64) -> u64 {
        let mut inv: u64 = q;
        for _ in 0..5 {
            inv = inv.wrapping_mul(2u64.wrapping_sub(q.wrapping_mul(inv)));
        }
        debug_assert_eq!(q.wrapping_mul(inv), 1);
        inv.wrapping_neg()
    }

    /// R^2 mod q where R = 2^64
    fn compute_r_squared(q: u64) -> u64 {
        let r_mod_q = (1u128 << 64) % (q as u128);
        ((r_mod_q * r_mod_q) % (q as u128)) as u64
    }

    /// (a * b * R^(-1)) mod q
    fn montgomery_mul(&self, a: u64, b: u64) -> u64 {
        let ab = (a as u128) * (b as u128);
        let m = ((ab as u64).wrapping_mul(self.q_inv_neg)) as u128;
        let t = ((ab + m * (self.q as u128)) >> 64) as u64;
        if t >= self.q {
            t - self.q
        } else {
            t
        }
    }
}
