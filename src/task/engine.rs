//! Accelerator engine interface.

use std::path::Path;

use crate::argument::Argument;
use crate::error::Result;
use crate::params::Algorithm;

/// Opaque engine-side task handle
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

impl TaskHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Accelerator runtime that executes compiled tasks
///
/// Implementations wrap the device runtime. The bridge calls
/// [`create_task`](AccEngine::create_task) once per task directory,
/// [`run_task`](AccEngine::run_task) once per run, and
/// [`release_task`](AccEngine::release_task) at most once per handle.
pub trait AccEngine {
    /// Allocate an engine task for the compiled task in `dir`
    fn create_task(&mut self, dir: &Path) -> Result<TaskHandle>;

    /// Execute one run
    ///
    /// `inputs` holds the data arguments followed by any key arguments;
    /// `outputs` holds the exported output ciphertexts, which the engine
    /// overwrites in place. Returns 0 on success, the engine status otherwise.
    fn run_task(
        &mut self,
        handle: &TaskHandle,
        inputs: &[Argument],
        outputs: &mut [Argument],
        algorithm: Algorithm,
    ) -> i32;

    /// Release the engine task
    fn release_task(&mut self, handle: TaskHandle);
}
