//! Typed task and parameter contracts.
//!
//! Contract files are parsed into private raw structs first, then converted
//! into the public typed forms. Semantic problems found during conversion are
//! reported as [`ContractViolation::Malformed`].

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{malformed, Result};
use crate::operand::OperandKind;
use crate::params::Algorithm;

/// Which descriptor list of the task contract applies to a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Online,
    Offline,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Online => f.write_str("online"),
            Phase::Offline => f.write_str("offline"),
        }
    }
}

/// Phase tag of a single argument descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgPhase {
    In,
    Out,
    Offline,
    Online,
}

impl ArgPhase {
    /// `in` and `offline` descriptors count as task inputs
    pub fn is_input(&self) -> bool {
        matches!(self, ArgPhase::In | ArgPhase::Offline)
    }
}

/// Declared shape, type, level and phase of one argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSignature {
    pub id: String,
    pub kind: OperandKind,
    pub size: Vec<usize>,
    pub level: usize,
    pub phase: ArgPhase,
}

impl ArgSignature {
    /// Operand count implied by the shape (1 for an empty shape)
    pub fn expected_count(&self) -> usize {
        self.size.iter().product()
    }
}

/// Galois elements with their required levels, in canonical order.
///
/// The canonical order is the ascending lexicographic order of the decimal
/// spelling of each element, so `{20, 3, 100}` orders as `[100, 20, 3]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GaloisLevels {
    entries: Vec<(u64, usize)>,
}

impl GaloisLevels {
    /// Collect `(galois_element, level)` pairs into canonical order
    ///
    /// A repeated element keeps its last level.
    pub fn from_levels(levels: impl IntoIterator<Item = (u64, usize)>) -> Self {
        let by_text: BTreeMap<String, (u64, usize)> = levels
            .into_iter()
            .map(|(g, level)| (g.to_string(), (g, level)))
            .collect();
        Self {
            entries: by_text.into_values().collect(),
        }
    }

    /// Galois elements in canonical order
    pub fn canonical_order(&self) -> Vec<u64> {
        self.entries.iter().map(|&(g, _)| g).collect()
    }

    /// Required level for `galois_element`
    pub fn level(&self, galois_element: u64) -> Option<usize> {
        self.entries
            .iter()
            .find(|&&(g, _)| g == galois_element)
            .map(|&(_, level)| level)
    }

    /// Shared export level: the maximum declared level
    pub fn max_level(&self) -> Option<usize> {
        self.entries.iter().map(|&(_, level)| level).max()
    }

    /// `(galois_element, level)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (u64, usize)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sort galois elements into canonical (decimal-string lexicographic) order
pub fn canonical_galois_order(elements: &[u64]) -> Vec<u64> {
    let mut sorted = elements.to_vec();
    sorted.sort_by_key(|g| g.to_string());
    sorted
}

/// Key requirements of a task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySignature {
    /// Required relinearization key level, `None` if no key is needed
    pub rlk: Option<usize>,
    /// Required galois keys
    pub glk: GaloisLevels,
}

/// Task contract (`task_signature.json`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSignature {
    pub algorithm: Algorithm,
    pub key: KeySignature,
    pub online: Vec<ArgSignature>,
    pub offline: Vec<ArgSignature>,
}

impl TaskSignature {
    /// Descriptor list for `phase`
    pub fn descriptors(&self, phase: Phase) -> &[ArgSignature] {
        match phase {
            Phase::Online => &self.online,
            Phase::Offline => &self.offline,
        }
    }
}

/// Parameter contract (the `parameter` object of `mega_ag.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSignature {
    /// Ring dimension
    pub n: usize,
    /// Base modulus chain
    pub q: Vec<u64>,
    /// Extension modulus chain, checked only when declared
    #[serde(default)]
    pub p: Option<Vec<u64>>,
    /// Plaintext modulus, checked for BFV only and only when declared
    #[serde(default)]
    pub t: Option<u64>,
}

/// Relin level as written in the contract: an integer (negative for none)
/// or the string `"none"`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawRelinLevel {
    Level(i64),
    Text(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawKeySignature {
    #[serde(default)]
    rlk: Option<RawRelinLevel>,
    #[serde(default)]
    glk: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawArgSignature {
    id: String,
    #[serde(rename = "type")]
    kind: OperandKind,
    #[serde(default)]
    size: Vec<i64>,
    level: i64,
    phase: ArgPhase,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawTaskSignature {
    algorithm: Algorithm,
    #[serde(default)]
    key: RawKeySignature,
    #[serde(default)]
    online: Vec<RawArgSignature>,
    #[serde(default)]
    offline: Vec<RawArgSignature>,
}

impl KeySignature {
    pub(crate) fn from_raw(raw: RawKeySignature) -> Result<Self> {
        let rlk = match raw.rlk {
            None => None,
            Some(RawRelinLevel::Level(level)) if level < 0 => None,
            Some(RawRelinLevel::Level(level)) => Some(level as usize),
            Some(RawRelinLevel::Text(text)) if text.eq_ignore_ascii_case("none") => None,
            Some(RawRelinLevel::Text(text)) => {
                return Err(malformed!("key.rlk", "expected a level or \"none\", got {:?}", text));
            }
        };

        let mut seen = HashSet::new();
        let mut levels = Vec::with_capacity(raw.glk.len());
        for (text, level) in raw.glk {
            let g: u64 = text
                .parse()
                .map_err(|_| malformed!("key.glk", "galois element {:?} is not an integer", text))?;
            if !seen.insert(g) {
                return Err(malformed!("key.glk", "galois element {} declared twice", g));
            }
            if level < 0 {
                return Err(malformed!("key.glk", "galois element {} has negative level {}", g, level));
            }
            levels.push((g, level as usize));
        }

        Ok(KeySignature {
            rlk,
            glk: GaloisLevels::from_levels(levels),
        })
    }
}

impl ArgSignature {
    pub(crate) fn from_raw(raw: RawArgSignature) -> Result<Self> {
        if raw.level < 0 {
            return Err(malformed!(
                format!("{}.level", raw.id),
                "negative level {}",
                raw.level
            ));
        }
        let size = raw
            .size
            .iter()
            .map(|&dim| {
                usize::try_from(dim)
                    .map_err(|_| malformed!(format!("{}.size", raw.id), "negative dimension {}", dim))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ArgSignature {
            id: raw.id,
            kind: raw.kind,
            size,
            level: raw.level as usize,
            phase: raw.phase,
        })
    }
}

impl TaskSignature {
    pub(crate) fn from_raw(raw: RawTaskSignature) -> Result<Self> {
        let convert = |list: Vec<RawArgSignature>| {
            list.into_iter()
                .map(ArgSignature::from_raw)
                .collect::<Result<Vec<_>>>()
        };

        let sig = TaskSignature {
            algorithm: raw.algorithm,
            key: KeySignature::from_raw(raw.key)?,
            online: convert(raw.online)?,
            offline: convert(raw.offline)?,
        };

        let mut ids = HashSet::new();
        for arg in sig.online.iter().chain(&sig.offline) {
            if !ids.insert(arg.id.as_str()) {
                return Err(malformed!("id", "argument id `{}` declared twice", arg.id));
            }
        }

        Ok(sig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContractViolation;

    fn parse(text: &str) -> Result<TaskSignature> {
        let raw: RawTaskSignature = serde_json::from_str(text).unwrap();
        TaskSignature::from_raw(raw)
    }

    #[test]
    fn test_parse_full_contract() {
        let sig = parse(
            r#"{
                "algorithm": "CKKS",
                "key": {"rlk": 3, "glk": {"20": 2, "3": 3, "100": 1}},
                "online": [
                    {"id": "x", "type": "ct", "size": [2, 3], "level": 3, "phase": "in"},
                    {"id": "y", "type": "ct", "size": [], "level": 3, "phase": "out"}
                ],
                "ckks_btp_swk": {}
            }"#,
        )
        .unwrap();

        assert_eq!(sig.algorithm, Algorithm::Ckks);
        assert_eq!(sig.key.rlk, Some(3));
        assert_eq!(sig.key.glk.canonical_order(), vec![100, 20, 3]);
        assert_eq!(sig.key.glk.max_level(), Some(3));
        assert_eq!(sig.key.glk.level(20), Some(2));
        assert_eq!(sig.online[0].expected_count(), 6);
        assert_eq!(sig.online[1].expected_count(), 1);
        assert!(sig.offline.is_empty());
        assert_eq!(sig.descriptors(Phase::Online).len(), 2);
    }

    #[test]
    fn test_relin_none_spellings() {
        for rlk in ["-1", "\"none\""] {
            let text = format!(r#"{{"algorithm": "BFV", "key": {{"rlk": {rlk}, "glk": {{}}}}}}"#);
            let sig = parse(&text).unwrap();
            assert_eq!(sig.key.rlk, None, "rlk = {rlk}");
        }
    }

    #[test]
    fn test_non_integer_galois_element() {
        let err = parse(r#"{"algorithm": "BFV", "key": {"glk": {"abc": 1}}}"#).unwrap_err();
        assert!(matches!(
            err.violation(),
            Some(ContractViolation::Malformed { field, .. }) if field == "key.glk"
        ));
    }

    #[test]
    fn test_duplicate_ids_across_phases() {
        let err = parse(
            r#"{
                "algorithm": "BFV",
                "key": {},
                "online": [{"id": "a", "type": "ct", "size": [1], "level": 0, "phase": "in"}],
                "offline": [{"id": "a", "type": "pt", "size": [1], "level": 0, "phase": "offline"}]
            }"#,
        )
        .unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_negative_level_rejected() {
        let err = parse(
            r#"{"algorithm": "BFV", "key": {},
                "online": [{"id": "a", "type": "ct", "size": [1], "level": -2, "phase": "in"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("a.level"));
    }

    #[test]
    fn test_syntax_error_is_json_error() {
        assert!(serde_json::from_str::<RawTaskSignature>("{not json").is_err());
        assert!(serde_json::from_str::<RawTaskSignature>(r#"{"algorithm": "RSA"}"#).is_err());
    }

    #[test]
    fn test_canonical_galois_order() {
        assert_eq!(canonical_galois_order(&[20, 3, 100]), vec![100, 20, 3]);
        let levels = GaloisLevels::from_levels([(20, 1), (3, 1), (100, 1)]);
        assert_eq!(levels.canonical_order(), vec![100, 20, 3]);
    }

    #[test]
    fn test_arg_phase_inputs() {
        assert!(ArgPhase::In.is_input());
        assert!(ArgPhase::Offline.is_input());
        assert!(!ArgPhase::Out.is_input());
        assert!(!ArgPhase::Online.is_input());
    }
}
