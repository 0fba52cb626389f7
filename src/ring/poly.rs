//! RNS polynomials over R_Q = Z_Q[X]/(X^N + 1).
//!
//! A polynomial is stored as one residue vector (limb) per modulus of the
//! chain. The number of limbs determines the level: `level = limbs - 1`.
//!
//! # Example
//!
//! ```
//! use acc_bridge::ring::RnsPoly;
//!
//! let poly = RnsPoly::zero(8, 2);
//! assert_eq!(poly.level(), 2);
//! assert_eq!(poly.ring_dim(), 8);
//! ```

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// Polynomial in RNS representation (the ring element of one modulus chain).
///
/// # Fields
///
/// * `limbs` - One coefficient vector per modulus, lowest level first
///
/// Always holds at least one limb, and all limbs have the same length.
/// Deserialization goes through the same checks as [`RnsPoly::from_limbs`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u64>>", into = "Vec<Vec<u64>>")]
pub struct RnsPoly {
    /// Residue vectors, one per modulus.
    limbs: Vec<Vec<u64>>,
}

impl RnsPoly {
    /// Create a zero polynomial with `level + 1` limbs of dimension `n`
    pub fn zero(n: usize, level: usize) -> Self {
        Self {
            limbs: vec![vec![0; n]; level + 1],
        }
    }

    /// Create a polynomial from raw limbs
    ///
    /// # Panics
    ///
    /// Panics if `limbs` is empty or the limbs differ in length.
    pub fn from_limbs(limbs: Vec<Vec<u64>>) -> Self {
        match Self::try_from(limbs) {
            Ok(poly) => poly,
            Err(msg) => panic!("{msg}"),
        }
    }

    /// Generate a uniformly random polynomial reduced limb-wise by `moduli`
    pub fn random_with_rng<R: Rng>(n: usize, moduli: &[u64], rng: &mut R) -> Self {
        let limbs = moduli
            .iter()
            .map(|&q| (0..n).map(|_| rng.gen_range(0..q)).collect())
            .collect();
        Self::from_limbs(limbs)
    }

    /// Generate a deterministic random polynomial from a 32-byte seed
    ///
    /// Uses ChaCha20 for expansion. The same seed always produces the same polynomial.
    pub fn from_seed(seed: &[u8; 32], n: usize, moduli: &[u64]) -> Self {
        let mut rng = ChaCha20Rng::from_seed(*seed);
        Self::random_with_rng(n, moduli, &mut rng)
    }

    /// Level of the polynomial (index of its last modulus)
    pub fn level(&self) -> usize {
        self.limbs.len().saturating_sub(1)
    }

    /// Number of limbs
    pub fn limb_count(&self) -> usize {
        self.limbs.len()
    }

    /// Ring dimension N (length of each limb)
    pub fn ring_dim(&self) -> usize {
        self.limbs.first().map_or(0, Vec::len)
    }

    /// Residues of limb `i`
    pub fn limb(&self, i: usize) -> &[u64] {
        &self.limbs[i]
    }

    /// All limbs
    pub fn limbs(&self) -> &[Vec<u64>] {
        &self.limbs
    }

    /// Mutable access to all limbs
    pub fn limbs_mut(&mut self) -> &mut [Vec<u64>] {
        &mut self.limbs
    }

    /// Copy of the polynomial with only limbs `0..=level`
    pub fn truncated(&self, level: usize) -> Self {
        Self {
            limbs: self.limbs[..=level.min(self.level())].to_vec(),
        }
    }
}

impl TryFrom<Vec<Vec<u64>>> for RnsPoly {
    type Error = &'static str;

    fn try_from(limbs: Vec<Vec<u64>>) -> Result<Self, Self::Error> {
        let n = match limbs.first() {
            Some(limb) => limb.len(),
            None => return Err("RNS polynomial needs at least one limb"),
        };
        if limbs.iter().any(|l| l.len() != n) {
            return Err("all limbs must have the same dimension");
        }
        Ok(Self { limbs })
    }
}

impl From<RnsPoly> for Vec<Vec<u64>> {
    fn from(poly: RnsPoly) -> Self {
        poly.limbs
    }
}

/// Polynomial over the extended basis Q·P: a base part and an extension part.
///
/// Key-switching keys live in this ring. The base part may be exported at a
/// lower level than stored; the extension part is always exported whole.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RnsPolyQP {
    /// Part over the base chain Q.
    pub q: RnsPoly,
    /// Part over the extension chain P.
    pub p: RnsPoly,
}

impl RnsPolyQP {
    /// Pair a base and an extension polynomial
    pub fn new(q: RnsPoly, p: RnsPoly) -> Self {
        debug_assert_eq!(
            q.ring_dim(),
            p.ring_dim(),
            "base and extension parts must have the same dimension"
        );
        Self { q, p }
    }

    /// Zero polynomial with the given base and extension levels
    pub fn zero(n: usize, level_q: usize, level_p: usize) -> Self {
        Self {
            q: RnsPoly::zero(n, level_q),
            p: RnsPoly::zero(n, level_p),
        }
    }

    /// Stored level of the base part
    pub fn level_q(&self) -> usize {
        self.q.level()
    }

    /// Stored level of the extension part
    pub fn level_p(&self) -> usize {
        self.p.level()
    }
}
