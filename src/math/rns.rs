//! Limb-wise arithmetic over an RNS modulus chain.
//!
//! Limb `i` of an [`RnsPoly`] is always reduced with modulus `i` of the
//! basis. None of the operations here reduce with a single global modulus.

use super::montgomery::Montgomery;
use crate::ring::RnsPoly;

/// Ordered modulus chain with per-modulus Montgomery constants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RnsBasis {
    limbs: Vec<Montgomery>,
}

impl RnsBasis {
    /// Build a basis from moduli, lowest level first
    pub fn new(moduli: &[u64]) -> Self {
        Self {
            limbs: moduli.iter().map(|&q| Montgomery::new(q)).collect(),
        }
    }

    /// Moduli of the chain
    pub fn moduli(&self) -> Vec<u64> {
        self.limbs.iter().map(|m| m.modulus()).collect()
    }

    /// Number of moduli
    pub fn len(&self) -> usize {
        self.limbs.len()
    }

    /// Whether the chain is empty
    pub fn is_empty(&self) -> bool {
        self.limbs.is_empty()
    }

    /// Highest level of the chain
    pub fn max_level(&self) -> usize {
        self.limbs.len().saturating_sub(1)
    }

    /// Mask limbs `0..=level` into Montgomery form
    pub fn mform_lvl(&self, level: usize, poly: &mut RnsPoly) {
        self.map_limbs(level, poly, |m, c| m.to_mont(c));
    }

    /// Unmask limbs `0..=level` out of Montgomery form
    pub fn inv_mform_lvl(&self, level: usize, poly: &mut RnsPoly) {
        self.map_limbs(level, poly, |m, c| m.from_mont(c));
    }

    /// Multiply limbs `0..=level` by 2^k
    pub fn mul_by_pow2_lvl(&self, level: usize, poly: &mut RnsPoly, k: u32) {
        self.map_limbs(level, poly, |m, c| m.mul_by_pow2(c, k));
    }

    /// Mask every limb the polynomial holds
    pub fn mform(&self, poly: &mut RnsPoly) {
        self.mform_lvl(poly.level(), poly);
    }

    /// Unmask every limb the polynomial holds
    pub fn inv_mform(&self, poly: &mut RnsPoly) {
        self.inv_mform_lvl(poly.level(), poly);
    }

    /// Multiply every limb the polynomial holds by 2^k
    pub fn mul_by_pow2(&self, poly: &mut RnsPoly, k: u32) {
        self.mul_by_pow2_lvl(poly.level(), poly, k);
    }

    fn map_limbs(&self, level: usize, poly: &mut RnsPoly, f: impl Fn(&Montgomery, u64) -> u64) {
        assert!(
            level < poly.limb_count() && level < self.limbs.len(),
            "level {} out of range (poly has {} limbs, basis has {} moduli)",
            level,
            poly.limb_count(),
            self.limbs.len()
        );
        for (limb, m) in poly.limbs_mut().iter_mut().zip(&self.limbs).take(level + 1) {
            for c in limb.iter_mut() {
                *c = f(m, *c);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ModQ;

    const MODULI: [u64; 3] = [1152921504606830593, 0x7fffe0001, 65537];

    fn sample_poly() -> RnsPoly {
        RnsPoly::from_limbs(vec![
            vec![1, 2, 3, 4],
            vec![5, 6, 7, 8],
            vec![9, 10, 11, 12],
        ])
    }

    #[test]
    fn test_mask_unmask_roundtrip() {
        let basis = RnsBasis::new(&MODULI);
        let original = sample_poly();
        let mut poly = original.clone();
        basis.mform(&mut poly);
        assert_ne!(poly, original);
        basis.inv_mform(&mut poly);
        assert_eq!(poly, original);
    }

    #[test]
    fn test_level_limits_touched_limbs() {
        let basis = RnsBasis::new(&MODULI);
        let original = sample_poly();
        let mut poly = original.clone();
        basis.mul_by_pow2_lvl(1, &mut poly, 3);
        assert_eq!(poly.limb(0), &[8, 16, 24, 32]);
        assert_eq!(poly.limb(1), &[40, 48, 56, 64]);
        assert_eq!(poly.limb(2), original.limb(2));
    }

    #[test]
    fn test_each_limb_uses_its_own_modulus() {
        let basis = RnsBasis::new(&MODULI);
        let mut poly = RnsPoly::from_limbs(vec![vec![1], vec![1], vec![1]]);
        basis.mform(&mut poly);
        for (i, &q) in MODULI.iter().enumerate() {
            let r_mod_q = ((1u128 << 64) % q as u128) as u64;
            assert_eq!(poly.limb(i)[0], ModQ::reduce(r_mod_q, q));
        }
    }
}
