//! Runtime scheme parameters
//!
//! The parameter object every exported value is checked and unmasked against:
//! scheme family, ring dimension, the base modulus chain Q, the optional
//! extension chain P used by key-switching keys, and (BFV only) the plaintext
//! modulus t.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::montgomery::MAX_MODULUS;
use crate::math::RnsBasis;

/// HE scheme family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// Brakerski/Fan-Vercauteren (exact integer arithmetic)
    #[serde(rename = "BFV")]
    Bfv,
    /// Cheon-Kim-Kim-Song (approximate arithmetic)
    #[serde(rename = "CKKS")]
    Ckks,
}

impl Algorithm {
    /// Contract spelling of the family
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Bfv => "BFV",
            Algorithm::Ckks => "CKKS",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheme parameters of the live cryptographic context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeParams {
    /// Scheme family
    pub algorithm: Algorithm,

    /// Ring dimension N (power of two)
    pub ring_dim: usize,

    /// Base modulus chain Q, lowest level first
    pub q: Vec<u64>,

    /// Extension modulus chain P (special primes for key switching)
    #[serde(default)]
    pub p: Vec<u64>,

    /// Plaintext modulus t (BFV only)
    #[serde(default)]
    pub t: Option<u64>,
}

impl HeParams {
    /// BFV parameters
    pub fn bfv(ring_dim: usize, q: Vec<u64>, p: Vec<u64>, t: u64) -> Self {
        Self {
            algorithm: Algorithm::Bfv,
            ring_dim,
            q,
            p,
            t: Some(t),
        }
    }

    /// CKKS parameters
    pub fn ckks(ring_dim: usize, q: Vec<u64>, p: Vec<u64>) -> Self {
        Self {
            algorithm: Algorithm::Ckks,
            ring_dim,
            q,
            p,
            t: None,
        }
    }

    /// Highest level of the base chain
    pub fn max_level(&self) -> usize {
        self.q.len().saturating_sub(1)
    }

    /// Highest level of the extension chain (None without an extension chain)
    pub fn max_level_p(&self) -> Option<usize> {
        self.p.len().checked_sub(1)
    }

    /// Per-limb arithmetic for the base chain
    pub fn ring_q(&self) -> RnsBasis {
        RnsBasis::new(&self.q)
    }

    /// Per-limb arithmetic for the extension chain
    pub fn ring_p(&self) -> RnsBasis {
        RnsBasis::new(&self.p)
    }

    /// Check if parameters are usable for export
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.ring_dim.is_power_of_two() {
            return Err("ring_dim must be a power of two");
        }

        if self.q.is_empty() {
            return Err("q chain must not be empty");
        }

        // Montgomery reduction needs odd moduli
        if self.q.iter().chain(self.p.iter()).any(|&m| m % 2 == 0 || m < 3) {
            return Err("moduli must be odd and >= 3");
        }

        if self.q.iter().chain(self.p.iter()).any(|&m| m >= MAX_MODULUS) {
            return Err("moduli must be below 2^62");
        }

        match (self.algorithm, self.t) {
            (Algorithm::Bfv, None) => Err("BFV parameters require a plaintext modulus t"),
            (Algorithm::Ckks, Some(_)) => Err("CKKS parameters carry no plaintext modulus"),
            _ => Ok(()),
        }
    }
}
