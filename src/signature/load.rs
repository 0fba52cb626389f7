//! Task directory loading.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{AccError, Result};

use super::types::{ParameterSignature, RawTaskSignature, TaskSignature};

/// Task contract file name inside a task directory
pub const TASK_SIGNATURE_FILE: &str = "task_signature.json";
/// Compiled task file holding the parameter contract
pub const PARAMETER_FILE: &str = "mega_ag.json";

/// Both contracts of one task directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskContract {
    pub dir: PathBuf,
    pub signature: TaskSignature,
    pub parameter: ParameterSignature,
}

#[derive(Deserialize)]
struct ParameterFile {
    parameter: ParameterSignature,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|source| AccError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| AccError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and validate a task contract file
pub fn load_task_signature(path: &Path) -> Result<TaskSignature> {
    let raw: RawTaskSignature = read_json(path)?;
    let sig = TaskSignature::from_raw(raw)?;
    debug!(
        path = %path.display(),
        algorithm = %sig.algorithm,
        online = sig.online.len(),
        offline = sig.offline.len(),
        "loaded task signature"
    );
    Ok(sig)
}

/// Load the `parameter` object of a compiled task file
pub fn load_parameter_signature(path: &Path) -> Result<ParameterSignature> {
    let file: ParameterFile = read_json(path)?;
    Ok(file.parameter)
}

/// Load both contracts from a task directory
///
/// # Errors
///
/// * [`AccError::NotFound`] if `dir` does not exist
/// * [`AccError::Io`] if a contract file cannot be opened
/// * [`AccError::Json`] if a contract file is not valid JSON or misses a field
/// * [`AccError::Contract`] for semantically invalid fields
pub fn load_task_contract(dir: &Path) -> Result<TaskContract> {
    if !dir.is_dir() {
        return Err(AccError::NotFound(dir.to_path_buf()));
    }

    let signature = load_task_signature(&dir.join(TASK_SIGNATURE_FILE))?;
    let parameter = load_parameter_signature(&dir.join(PARAMETER_FILE))?;

    info!(
        dir = %dir.display(),
        algorithm = %signature.algorithm,
        n = parameter.n,
        "loaded task contract"
    );

    Ok(TaskContract {
        dir: dir.to_path_buf(),
        signature,
        parameter,
    })
}
