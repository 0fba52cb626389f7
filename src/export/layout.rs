//! Flat layouts handed to the accelerator engine.
//!
//! Every structure is self-describing: counts and lengths come first, raw
//! residues last. Levels, degrees and counts are `i32` and component lengths
//! `u32`, as the engine ABI declares them.

use serde::{Deserialize, Serialize};

/// Residues of one limb
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub values: Vec<u64>,
}

impl Component {
    pub fn new(values: Vec<u64>) -> Self {
        Self { values }
    }

    /// Number of residues
    pub fn len(&self) -> u32 {
        self.values.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One polynomial as an ordered list of components (limbs)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polynomial {
    pub components: Vec<Component>,
}

impl Polynomial {
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }

    /// Number of components
    pub fn component_count(&self) -> u32 {
        self.components.len() as u32
    }
}

/// Exported ciphertext: `degree + 1` polynomials at `level`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedCiphertext {
    pub level: i32,
    pub degree: i32,
    pub polys: Vec<Polynomial>,
}

/// Exported plaintext of any domain
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedPlaintext {
    pub level: i32,
    pub poly: Polynomial,
}

/// Exported public-key-like pair over Q·P.
///
/// Each polynomial holds the base components followed by the extension
/// components.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedPublicKey {
    pub level: i32,
    /// Always 1
    pub degree: i32,
    pub polys: [Polynomial; 2],
}

/// Exported key-switching key: one public-key-like pair per digit
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedKeySwitchKey {
    pub digits: Vec<ExportedPublicKey>,
}

impl ExportedKeySwitchKey {
    pub fn digit_count(&self) -> i32 {
        self.digits.len() as i32
    }
}

/// Exported galois keys, parallel arrays in export order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedGaloisKey {
    pub galois_elements: Vec<u64>,
    pub key_switch_keys: Vec<ExportedKeySwitchKey>,
}

impl ExportedGaloisKey {
    pub fn key_count(&self) -> i32 {
        self.galois_elements.len() as i32
    }
}
