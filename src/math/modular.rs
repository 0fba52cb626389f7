//! Modular arithmetic operations

/// Modular arithmetic operations over Z_q
pub struct ModQ;

impl ModQ {
    /// Multiply two values modulo q
    #[inline]
    pub fn mul(a: u64, b: u64, q: u64) -> u64 {
        let prod = (a as u128) * (b as u128);
        (prod % (q as u128)) as u64
    }

    /// Square-and-multiply exponentiation modulo q
    pub fn pow(base: u64, mut exp: u64, q: u64) -> u64 {
        let mut result = 1 % q;
        let mut base = base % q;
        while exp > 0 {
            if exp & 1 == 1 {
                result = Self::mul(result, base, q);
            }
            base = Self::mul(base, base, q);
            exp >>= 1;
        }
        result
    }

    /// 2^k mod q
    #[inline]
    pub fn pow2(k: u32, q: u64) -> u64 {
        Self::pow(2, k as u64, q)
    }

    /// Inverse of a modulo prime q (Fermat), None for zero
    pub fn inv(a: u64, q: u64) -> Option<u64> {
        if a % q == 0 {
            None
        } else {
            Some(Self::pow(a, q - 2, q))
        }
    }

    /// Reduce a value modulo q
    #[inline]
    pub fn reduce(a: u64, q: u64) -> u64 {
        a % q
    }
}
