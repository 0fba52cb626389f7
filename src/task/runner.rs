//! Task lifecycle: open, run, free.

use std::fmt;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::argument::{export_arguments, export_key_arguments, import_outputs, VectorArgument};
use crate::error::{malformed, AccError, Result};
use crate::export::ExportContext;
use crate::keys::{GaloisKeySet, RelinearizationKey};
use crate::params::HeParams;
use crate::signature::{check_signatures, load_task_contract, TaskContract};

use super::arena::ExportArena;
use super::engine::{AccEngine, TaskHandle};
use super::options::TaskOptions;

/// Lifecycle state of an [`AccTask`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Contracts loaded and engine task allocated
    Created,
    /// Inside a run
    Running,
    /// Engine task released
    Freed,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskState::Created => "created",
            TaskState::Running => "running",
            TaskState::Freed => "freed",
        };
        f.write_str(name)
    }
}

/// One compiled task bound to an accelerator engine
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use acc_bridge::task::{AccEngine, AccTask, TaskHandle, TaskOptions};
/// use acc_bridge::argument::Argument;
/// use acc_bridge::params::Algorithm;
///
/// struct Device;
///
/// impl AccEngine for Device {
///     fn create_task(&mut self, _dir: &Path) -> acc_bridge::Result<TaskHandle> {
///         Ok(TaskHandle::new(1))
///     }
///     fn run_task(&mut self, _: &TaskHandle, _: &[Argument], _: &mut [Argument], _: Algorithm) -> i32 {
///         0
///     }
///     fn release_task(&mut self, _: TaskHandle) {}
/// }
///
/// let mut task = AccTask::open(Device, "tasks/bfv_mult", TaskOptions::default())?;
/// task.free();
/// # Ok::<(), acc_bridge::AccError>(())
/// ```
pub struct AccTask<E: AccEngine> {
    engine: E,
    handle: Option<TaskHandle>,
    contract: TaskContract,
    options: TaskOptions,
    arena: ExportArena,
    state: TaskState,
}

impl<E: AccEngine> AccTask<E> {
    /// Load the contracts in `dir` and allocate the engine task
    ///
    /// # Errors
    ///
    /// [`AccError::NotFound`] if `dir` does not exist; load errors of
    /// [`load_task_contract`]; engine allocation errors.
    pub fn open(mut engine: E, dir: impl AsRef<Path>, options: TaskOptions) -> Result<Self> {
        options
            .validate()
            .map_err(|msg| malformed!("options", "{}", msg))?;

        let dir = dir.as_ref();
        let contract = load_task_contract(dir)?;
        let handle = engine.create_task(dir)?;

        info!(
            dir = %dir.display(),
            handle = handle.raw(),
            phase = %options.phase,
            mform_bits = options.mform_bits,
            "created accelerator task"
        );

        Ok(Self {
            engine,
            handle: Some(handle),
            contract,
            options,
            arena: ExportArena::new(),
            state: TaskState::Created,
        })
    }

    pub fn contract(&self) -> &TaskContract {
        &self.contract
    }

    pub fn options(&self) -> &TaskOptions {
        &self.options
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Exported buffers kept alive by this task
    pub fn arena(&self) -> &ExportArena {
        &self.arena
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Validate, export, execute and write outputs back
    ///
    /// `args` lists the input arguments followed by the output arguments in
    /// descriptor order. Output ciphertexts are overwritten with the engine
    /// results.
    ///
    /// Every run that reaches the engine adds one batch to the task's arena, with
    /// the deep-copied relinearization and galois keys. Batches are only
    /// dropped by [`free`](AccTask::free), so memory held by a long-lived task
    /// grows with each call; free the task and open a new one to reclaim it.
    ///
    /// # Errors
    ///
    /// * [`AccError::TaskReleased`] after [`free`](AccTask::free)
    /// * [`AccError::Contract`] when parameters, keys or arguments violate the
    ///   contract; nothing is sent to the engine in that case
    /// * [`AccError::Engine`] when the engine returns a non-zero status
    pub fn run(
        &mut self,
        params: &HeParams,
        rlk: Option<&RelinearizationKey>,
        glk: Option<&GaloisKeySet>,
        args: &mut [VectorArgument],
    ) -> Result<()> {
        if self.state == TaskState::Freed || self.handle.is_none() {
            return Err(AccError::TaskReleased);
        }

        self.state = TaskState::Running;
        let result = self.run_inner(params, rlk, glk, args);
        self.state = TaskState::Created;

        if let Err(err) = &result {
            warn!(error = %err, "task run failed");
        }
        result
    }

    fn run_inner(
        &mut self,
        params: &HeParams,
        rlk: Option<&RelinearizationKey>,
        glk: Option<&GaloisKeySet>,
        args: &mut [VectorArgument],
    ) -> Result<()> {
        params
            .validate()
            .map_err(|msg| malformed!("params", "{}", msg))?;

        let input_count = check_signatures(
            params,
            &self.contract.signature,
            &self.contract.parameter,
            rlk,
            glk,
            args,
            self.options.phase,
        )?;

        let ctx = ExportContext::new(params, self.options.mform_bits);
        let (mut inputs, outputs) = export_arguments(&ctx, args, input_count)?;
        inputs.extend(export_key_arguments(&ctx, &self.contract.signature.key, rlk, glk)?);

        debug!(
            inputs = inputs.len(),
            outputs = outputs.len(),
            "dispatching task to engine"
        );

        let handle = self.handle.as_ref().ok_or(AccError::TaskReleased)?;
        let batch = self.arena.push(inputs, outputs);
        let status = self
            .engine
            .run_task(handle, &batch.inputs, &mut batch.outputs, params.algorithm);
        if status != 0 {
            return Err(AccError::Engine { status });
        }

        import_outputs(&batch.outputs, &mut args[input_count..])?;

        info!(
            outputs = args.len() - input_count,
            "task run completed"
        );
        Ok(())
    }

    /// Release the engine task and drop all exported buffers
    ///
    /// Safe to call more than once.
    pub fn free(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!(handle = handle.raw(), "releasing accelerator task");
            self.engine.release_task(handle);
        }
        self.arena.clear();
        self.state = TaskState::Freed;
    }
}

impl<E: AccEngine> Drop for AccTask<E> {
    fn drop(&mut self) {
        self.free();
    }
}

impl<E: AccEngine> fmt::Debug for AccTask<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccTask")
            .field("dir", &self.contract.dir)
            .field("handle", &self.handle)
            .field("state", &self.state)
            .field("arena_batches", &self.arena.len())
            .finish()
    }
}
