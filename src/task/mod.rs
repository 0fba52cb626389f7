//! Task lifecycle controller
//!
//! ```text
//! open ──> Created ──run──> Running ──> Created ──free──> Freed
//! ```
//!
//! Each run checks the contracts, exports the data and key arguments into the
//! task's [`ExportArena`], calls the [`AccEngine`] and copies the output
//! ciphertexts back into the caller's operands.

pub mod arena;
pub mod engine;
pub mod options;
pub mod runner;

pub use arena::{ExportArena, ExportBatch};
pub use engine::{AccEngine, TaskHandle};
pub use options::TaskOptions;
pub use runner::{AccTask, TaskState};
