//! Ciphertext and plaintext types handed to the bridge.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::RnsBasis;
use crate::ring::RnsPoly;

/// Ciphertext: `degree + 1` polynomials over Q at a shared level.
///
/// # Example
///
/// ```
/// use acc_bridge::operand::Ciphertext;
///
/// let ct = Ciphertext::zero(16, 1, 3);
/// assert_eq!(ct.degree(), 1);
/// assert_eq!(ct.level(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext {
    /// Polynomials c_0 .. c_degree.
    pub value: Vec<RnsPoly>,
}

impl Ciphertext {
    /// Create a ciphertext from its polynomials
    ///
    /// # Panics
    ///
    /// Debug-asserts that all polynomials share one level and dimension.
    pub fn from_polys(value: Vec<RnsPoly>) -> Self {
        assert!(!value.is_empty(), "ciphertext needs at least one polynomial");
        debug_assert!(
            value.iter().all(|p| p.level() == value[0].level()),
            "ciphertext polynomials must share one level"
        );
        debug_assert!(
            value.iter().all(|p| p.ring_dim() == value[0].ring_dim()),
            "ciphertext polynomials must share one dimension"
        );
        Self { value }
    }

    /// Zero ciphertext of the given degree and level
    pub fn zero(n: usize, degree: usize, level: usize) -> Self {
        Self {
            value: vec![RnsPoly::zero(n, level); degree + 1],
        }
    }

    /// Degree (number of polynomials minus one)
    pub fn degree(&self) -> usize {
        self.value.len().saturating_sub(1)
    }

    /// Level shared by the polynomials
    pub fn level(&self) -> usize {
        self.value.first().map_or(0, RnsPoly::level)
    }
}

/// Plaintext in the ciphertext domain (R_Q).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plaintext {
    pub value: RnsPoly,
}

impl Plaintext {
    pub fn new(value: RnsPoly) -> Self {
        Self { value }
    }

    pub fn level(&self) -> usize {
        self.value.level()
    }
}

/// Plaintext over the plaintext ring R_t (always level 0).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaintextRingT {
    pub value: RnsPoly,
}

impl PlaintextRingT {
    pub fn new(value: RnsPoly) -> Self {
        Self { value }
    }

    /// Reduced-domain plaintexts live at level 0 regardless of limb count
    pub fn level(&self) -> usize {
        0
    }
}

/// Plaintext prepared for ct × pt multiplication.
///
/// The stored residues are in Montgomery form (`a·2^64 mod q_i` per limb) and
/// must be unmasked before leaving the process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaintextMul {
    /// Residues in Montgomery form.
    pub value: RnsPoly,
}

impl PlaintextMul {
    /// Wrap a polynomial that is already in Montgomery form
    pub fn from_mform(value: RnsPoly) -> Self {
        Self { value }
    }

    /// Mask a standard-domain polynomial with the base chain of `ring_q`
    pub fn from_standard(mut value: RnsPoly, ring_q: &RnsBasis) -> Self {
        ring_q.mform(&mut value);
        Self { value }
    }

    pub fn level(&self) -> usize {
        self.value.level()
    }
}

/// Contract tag of an operand type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandKind {
    #[serde(rename = "ct")]
    Ciphertext,
    #[serde(rename = "pt")]
    Plaintext,
    #[serde(rename = "pt_ringt")]
    PlaintextRingT,
    #[serde(rename = "pt_mul")]
    PlaintextMul,
}

impl OperandKind {
    /// Contract spelling of the tag
    pub fn as_str(&self) -> &'static str {
        match self {
            OperandKind::Ciphertext => "ct",
            OperandKind::Plaintext => "pt",
            OperandKind::PlaintextRingT => "pt_ringt",
            OperandKind::PlaintextMul => "pt_mul",
        }
    }
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One data operand of a task argument
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    Ciphertext(Ciphertext),
    Plaintext(Plaintext),
    PlaintextRingT(PlaintextRingT),
    PlaintextMul(PlaintextMul),
}

impl Operand {
    /// Contract tag of this operand
    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::Ciphertext(_) => OperandKind::Ciphertext,
            Operand::Plaintext(_) => OperandKind::Plaintext,
            Operand::PlaintextRingT(_) => OperandKind::PlaintextRingT,
            Operand::PlaintextMul(_) => OperandKind::PlaintextMul,
        }
    }

    /// Level of this operand
    pub fn level(&self) -> usize {
        match self {
            Operand::Ciphertext(ct) => ct.level(),
            Operand::Plaintext(pt) => pt.level(),
            Operand::PlaintextRingT(pt) => pt.level(),
            Operand::PlaintextMul(pt) => pt.level(),
        }
    }

    /// Borrow the ciphertext, if this operand is one
    pub fn as_ciphertext(&self) -> Option<&Ciphertext> {
        match self {
            Operand::Ciphertext(ct) => Some(ct),
            _ => None,
        }
    }

    /// Mutably borrow the ciphertext, if this operand is one
    pub fn as_ciphertext_mut(&mut self) -> Option<&mut Ciphertext> {
        match self {
            Operand::Ciphertext(ct) => Some(ct),
            _ => None,
        }
    }
}

impl From<Ciphertext> for Operand {
    fn from(ct: Ciphertext) -> Self {
        Operand::Ciphertext(ct)
    }
}

impl From<Plaintext> for Operand {
    fn from(pt: Plaintext) -> Self {
        Operand::Plaintext(pt)
    }
}

impl From<PlaintextRingT> for Operand {
    fn from(pt: PlaintextRingT) -> Self {
        Operand::PlaintextRingT(pt)
    }
}

impl From<PlaintextMul> for Operand {
    fn from(pt: PlaintextMul) -> Self {
        Operand::PlaintextMul(pt)
    }
}
