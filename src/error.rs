//! Error handling for the accelerator bridge
//!
//! Two classes of failure are distinguished:
//!
//! - **Reported** errors (missing task directory, unreadable or malformed files,
//!   engine status codes, truncated wire data). Callers may retry or report.
//! - **Contract violations** ([`ContractViolation`]). The supplied parameters,
//!   keys or arguments do not match the task contract. Continuing would hand the
//!   engine mistyped data, so callers are expected to abort the task.

use std::fmt;
use std::path::PathBuf;

use crate::params::Algorithm;

/// Accelerator bridge error
#[derive(Debug)]
pub enum AccError {
    /// Task directory (or another required path) does not exist
    NotFound(PathBuf),
    /// A file could not be opened or read
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A contract file is not valid JSON or misses a required field
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// The engine returned a non-zero status code
    Engine { status: i32 },
    /// Encoded argument bytes are truncated or carry an unknown tag
    Wire(String),
    /// `run` was called on a task whose engine handle was already released
    TaskReleased,
    /// Parameters, keys or arguments violate the task contract
    Contract(ContractViolation),
}

impl AccError {
    /// Whether this error is a contract violation (unrecoverable for the task)
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, AccError::Contract(_))
    }

    /// Borrow the violation, if this is one
    pub fn violation(&self) -> Option<&ContractViolation> {
        match self {
            AccError::Contract(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for AccError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccError::NotFound(path) => write!(f, "{} does not exist", path.display()),
            AccError::Io { path, source } => {
                write!(f, "cannot open {}: {}", path.display(), source)
            }
            AccError::Json { path, source } => {
                write!(f, "malformed contract file {}: {}", path.display(), source)
            }
            AccError::Engine { status } => {
                write!(f, "accelerator engine failed with status {status}")
            }
            AccError::Wire(msg) => write!(f, "wire decoding failed: {msg}"),
            AccError::TaskReleased => write!(f, "task has already been freed"),
            AccError::Contract(v) => write!(f, "contract violation: {v}"),
        }
    }
}

impl std::error::Error for AccError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AccError::Io { source, .. } => Some(source),
            AccError::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ContractViolation> for AccError {
    fn from(v: ContractViolation) -> Self {
        AccError::Contract(v)
    }
}

/// Mismatch between the live objects and the declared task contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    /// Scheme family of the parameters differs from the contract's algorithm
    AlgorithmMismatch {
        expected: Algorithm,
        actual: Algorithm,
    },
    /// Contract requires a relinearization key but none was supplied
    MissingRelinKey,
    /// Contract names galois elements but no key set was supplied
    MissingGaloisKeySet,
    /// Contract names a galois element absent from the key set
    MissingGaloisKey { galois_element: u64 },
    /// Relinearization key stored level is below the required level
    RelinKeyLevel { required: usize, actual: usize },
    /// Galois key stored level is below the required level
    GaloisKeyLevel {
        galois_element: u64,
        required: usize,
        actual: usize,
    },
    /// A scalar or modulus-chain parameter differs
    ParameterMismatch {
        field: String,
        expected: String,
        actual: String,
    },
    /// Number of supplied arguments differs from the number of descriptors
    ArgumentCount { expected: usize, actual: usize },
    /// Argument id at a position differs from the descriptor's id
    ArgumentId { expected: String, actual: String },
    /// Operand count differs from the product of the declared shape
    ArgumentSize {
        id: String,
        expected: usize,
        actual: usize,
    },
    /// Operand type tag differs from the declared type
    ArgumentType {
        id: String,
        expected: String,
        actual: String,
    },
    /// Operand level differs from the declared level
    ArgumentLevel {
        id: String,
        expected: usize,
        actual: usize,
    },
    /// A declared or supplied level exceeds the runtime modulus chain
    LevelOutOfRange {
        id: String,
        level: usize,
        max_level: usize,
    },
    /// An argument carries no operands
    EmptyArgument { id: String },
    /// An operand's variant differs from the first operand's variant
    MixedOperands {
        id: String,
        index: usize,
        expected: String,
        actual: String,
    },
    /// An operand's level differs from the first operand's level
    HeterogeneousLevel {
        id: String,
        index: usize,
        expected: usize,
        actual: usize,
    },
    /// Output arguments must be ciphertext lists
    UnsupportedOutput { id: String, actual: String },
    /// A polynomial component has no coefficients
    EmptyComponent,
    /// A switching key holds no digits
    EmptyKey,
    /// Engine output does not fit the destination operand
    ImportShape { id: String, detail: String },
    /// A contract file field is present but semantically invalid
    Malformed { field: String, detail: String },
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ContractViolation::*;
        match self {
            AlgorithmMismatch { expected, actual } => write!(
                f,
                "task signature algorithm {expected} does not match {actual} parameters"
            ),
            MissingRelinKey => write!(f, "the relinearization key is required but not provided"),
            MissingGaloisKeySet => write!(f, "galois keys are required but not provided"),
            MissingGaloisKey { galois_element } => {
                write!(f, "the rotation key glk_{galois_element} is not prepared")
            }
            RelinKeyLevel { required, actual } => write!(
                f,
                "relinearization key level {actual} is below the signature level {required}"
            ),
            GaloisKeyLevel {
                galois_element,
                required,
                actual,
            } => write!(
                f,
                "rotation key glk_{galois_element} level {actual} is below the signature level {required}"
            ),
            ParameterMismatch {
                field,
                expected,
                actual,
            } => write!(f, "parameter {field} mismatch: expected {expected}, got {actual}"),
            ArgumentCount { expected, actual } => write!(
                f,
                "expected {expected} arguments, got {actual}"
            ),
            ArgumentId { expected, actual } => {
                write!(f, "argument `{actual}`: expected id `{expected}`")
            }
            ArgumentSize {
                id,
                expected,
                actual,
            } => write!(f, "argument `{id}`: expected size {expected}, got {actual}"),
            ArgumentType {
                id,
                expected,
                actual,
            } => write!(f, "argument `{id}`: expected type {expected}, got {actual}"),
            ArgumentLevel {
                id,
                expected,
                actual,
            } => write!(f, "argument `{id}`: expected level {expected}, got {actual}"),
            LevelOutOfRange {
                id,
                level,
                max_level,
            } => write!(
                f,
                "argument `{id}`: level {level} exceeds the maximum level {max_level} of the modulus chain"
            ),
            EmptyArgument { id } => write!(f, "argument `{id}` has no operands"),
            MixedOperands {
                id,
                index,
                expected,
                actual,
            } => write!(
                f,
                "argument `{id}`: operand {index} is {actual}, but operand 0 is {expected}"
            ),
            HeterogeneousLevel {
                id,
                index,
                expected,
                actual,
            } => write!(
                f,
                "argument `{id}`: operand {index} has level {actual}, but operand 0 has level {expected}"
            ),
            UnsupportedOutput { id, actual } => write!(
                f,
                "output argument `{id}` has type {actual}, only ciphertext outputs are supported"
            ),
            EmptyComponent => write!(f, "polynomial component has no coefficients"),
            EmptyKey => write!(f, "switching key has no digits"),
            ImportShape { id, detail } => write!(f, "output argument `{id}`: {detail}"),
            Malformed { field, detail } => write!(f, "field `{field}`: {detail}"),
        }
    }
}

impl std::error::Error for ContractViolation {}

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, AccError>;

/// Create a `ContractViolation::Malformed` wrapped in `AccError`
macro_rules! malformed {
    ($field:expr, $($arg:tt)*) => {
        $crate::error::AccError::Contract($crate::error::ContractViolation::Malformed {
            field: ($field).to_string(),
            detail: format!($($arg)*),
        })
    };
}

pub(crate) use malformed;
