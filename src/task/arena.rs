//! Ownership of exported buffers across engine calls.

use crate::argument::Argument;

/// Exported arguments of one run
#[derive(Debug, Default)]
pub struct ExportBatch {
    pub inputs: Vec<Argument>,
    pub outputs: Vec<Argument>,
}

/// Exported buffers owned by one task
///
/// Each run adds a batch; the buffers stay alive until [`ExportArena::clear`]
/// is called when the task is freed. Nothing is evicted before that, so the
/// arena grows by one batch per run.
#[derive(Debug, Default)]
pub struct ExportArena {
    batches: Vec<ExportBatch>,
}

impl ExportArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of one run's arguments and return them for the engine call
    pub fn push(&mut self, inputs: Vec<Argument>, outputs: Vec<Argument>) -> &mut ExportBatch {
        self.batches.push(ExportBatch { inputs, outputs });
        let last = self.batches.len() - 1;
        &mut self.batches[last]
    }

    /// Number of batches held
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Number of exported arguments held across all batches
    pub fn argument_count(&self) -> usize {
        self.batches
            .iter()
            .map(|b| b.inputs.len() + b.outputs.len())
            .sum()
    }

    /// Drop every held buffer
    pub fn clear(&mut self) {
        self.batches.clear();
    }
}
