//! Per-task run options.

use serde::{Deserialize, Serialize};

use crate::signature::Phase;

/// Options applied to every run of a task
///
/// # Fields
///
/// * `mform_bits` - Exponent k of the power-of-two rescale applied to
///   Montgomery-form values after unmasking (0 disables it)
/// * `phase` - Descriptor list (`online` or `offline`) the arguments are checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOptions {
    #[serde(default)]
    pub mform_bits: u32,
    #[serde(default)]
    pub phase: Phase,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self::online()
    }
}

impl TaskOptions {
    /// Online phase, no rescale
    pub fn online() -> Self {
        Self {
            mform_bits: 0,
            phase: Phase::Online,
        }
    }

    /// Offline phase, no rescale
    pub fn offline() -> Self {
        Self {
            mform_bits: 0,
            phase: Phase::Offline,
        }
    }

    /// Set the power-of-two rescale exponent
    pub fn with_mform_bits(mut self, bits: u32) -> Self {
        self.mform_bits = bits;
        self
    }

    /// Check if options are usable
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.mform_bits >= 64 {
            return Err("mform_bits must be below 64");
        }
        Ok(())
    }
}
