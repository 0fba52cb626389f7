//! Key-switching key material.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ContractViolation;
use crate::math::RnsBasis;
use crate::ring::RnsPolyQP;

/// Public-key-like pair (b, a) over the extended basis Q·P.
///
/// One gadget digit of a key-switching key has this shape.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiphertextQP {
    pub value: [RnsPolyQP; 2],
}

impl CiphertextQP {
    pub fn new(b: RnsPolyQP, a: RnsPolyQP) -> Self {
        Self { value: [b, a] }
    }

    /// Stored base level
    pub fn level_q(&self) -> usize {
        self.value[0].level_q()
    }

    /// Stored extension level
    pub fn level_p(&self) -> usize {
        self.value[0].level_p()
    }
}

/// Key-switching key: one [`CiphertextQP`] per gadget-decomposition digit.
///
/// Every residue (base and extension part) is held in Montgomery form, as the
/// HE library keeps it for fast key switching. A key always holds at least one
/// digit; deserialization rejects an empty digit list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CiphertextQP>", into = "Vec<CiphertextQP>")]
pub struct SwitchingKey {
    value: Vec<CiphertextQP>,
}

impl SwitchingKey {
    /// Wrap digits that are already in Montgomery form
    ///
    /// # Panics
    ///
    /// Panics if `value` is empty. Use `SwitchingKey::try_from` to get a
    /// [`ContractViolation::EmptyKey`] instead.
    pub fn from_mform(value: Vec<CiphertextQP>) -> Self {
        match Self::try_from(value) {
            Ok(key) => key,
            Err(v) => panic!("{v}"),
        }
    }

    /// Mask standard-domain digits with the given bases
    ///
    /// # Panics
    ///
    /// Panics if `value` is empty.
    pub fn from_standard(mut value: Vec<CiphertextQP>, ring_q: &RnsBasis, ring_p: &RnsBasis) -> Self {
        for digit in &mut value {
            for poly in &mut digit.value {
                ring_q.mform(&mut poly.q);
                ring_p.mform(&mut poly.p);
            }
        }
        Self::from_mform(value)
    }

    /// Stored digits, Montgomery form
    pub fn digits(&self) -> &[CiphertextQP] {
        &self.value
    }

    fn first(&self) -> &CiphertextQP {
        // non-empty by construction
        &self.value[0]
    }

    /// Number of stored digits
    pub fn digit_count(&self) -> usize {
        self.value.len()
    }

    /// Stored base level
    pub fn level_q(&self) -> usize {
        self.first().level_q()
    }

    /// Stored extension level
    pub fn level_p(&self) -> usize {
        self.first().level_p()
    }

    /// Digits needed to cover base level `level`: ⌈(level + 1) / (level_p + 1)⌉
    pub fn digits_for_level(&self, level: usize) -> usize {
        (level + 1 + self.level_p()) / (self.level_p() + 1)
    }
}

impl TryFrom<Vec<CiphertextQP>> for SwitchingKey {
    type Error = ContractViolation;

    fn try_from(value: Vec<CiphertextQP>) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(ContractViolation::EmptyKey);
        }
        Ok(Self { value })
    }
}

impl From<SwitchingKey> for Vec<CiphertextQP> {
    fn from(key: SwitchingKey) -> Self {
        key.value
    }
}

/// Relinearization key: the single switching key for s² → s.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelinearizationKey {
    pub key: SwitchingKey,
}

impl RelinearizationKey {
    pub fn new(key: SwitchingKey) -> Self {
        Self { key }
    }

    /// Stored base level of the key
    pub fn level(&self) -> usize {
        self.key.level_q()
    }
}

/// Galois (rotation) keys indexed by galois element.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaloisKeySet {
    keys: HashMap<u64, SwitchingKey>,
}

impl GaloisKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the key for `galois_element`
    pub fn insert(&mut self, galois_element: u64, key: SwitchingKey) {
        self.keys.insert(galois_element, key);
    }

    /// Key for `galois_element`
    pub fn get(&self, galois_element: u64) -> Option<&SwitchingKey> {
        self.keys.get(&galois_element)
    }

    pub fn contains(&self, galois_element: u64) -> bool {
        self.keys.contains_key(&galois_element)
    }

    /// Galois elements held, in ascending numeric order
    pub fn galois_elements(&self) -> Vec<u64> {
        let mut els: Vec<u64> = self.keys.keys().copied().collect();
        els.sort_unstable();
        els
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<(u64, SwitchingKey)> for GaloisKeySet {
    fn from_iter<I: IntoIterator<Item = (u64, SwitchingKey)>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
