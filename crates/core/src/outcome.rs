//! The result contract shared by all four engines.

use serde::{Deserialize, Serialize};

use crate::bits::BitString;
use crate::error::{Error, Result};
use crate::trace::StepTrace;

/// Everything a run produces: the frames on both ends of the channel, the
/// verdict, and the full step trace.
///
/// `transmitted_data` is always the processed (padded) data followed by the
/// redundancy field. `received_data` equals it unless error injection was
/// requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Data exactly as supplied by the caller
    pub original_data: BitString,

    /// Frame put on the channel
    pub transmitted_data: BitString,

    /// Frame taken off the channel
    pub received_data: BitString,

    /// Receiver verdict
    pub error_detected: bool,

    /// Every step, in execution order.
    ///
    /// Named `trace` in Rust but serialized as `steps`, the key the HTTP API
    /// and the step visualizer read. `trace` is still accepted when reading.
    #[serde(rename = "steps", alias = "trace")]
    pub trace: StepTrace,

    /// One-line summary of the verdict
    pub explanation: String,
}

impl DetectionResult {
    /// Whether the channel actually altered the frame.
    pub fn was_corrupted(&self) -> bool {
        self.transmitted_data != self.received_data
    }

    /// Bits added on top of the original data (padding plus check field).
    pub fn overhead_bits(&self) -> usize {
        self.transmitted_data
            .len()
            .saturating_sub(self.original_data.len())
    }
}

/// Reject zero-length data before any step is recorded.
pub(crate) fn ensure_non_empty(data: &BitString) -> Result<()> {
    if data.is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(())
}
