//! errdetect-core: step-traced link-layer error detection
//!
//! This library simulates four classic error-detection techniques over
//! binary strings and records every intermediate arithmetic step:
//! - VRC: a single even-parity bit over the whole frame
//! - LRC: per-column parity over fixed-width blocks
//! - CRC: remainder of mod-2 polynomial long division
//! - Checksum: one's-complement block sum with end-around carry
//!
//! Each run goes sender → channel (optionally flipping bit 0) → receiver and
//! returns a [`DetectionResult`] with the verdict and the full [`StepTrace`].
//!
//! # Architecture
//!
//! - `bits`: bit strings, XOR, complement, parity, fixed-width addition
//! - `trace`: append-only step log and per-step state snapshots
//! - `channel`: the single-bit corruption model
//! - `vrc`, `lrc`, `crc`, `checksum`: the four engines
//! - `dispatch`: technique enum and run-by-name
//! - `metrics`: detection statistics across many runs
//!
//! # Design Principles
//!
//! - **No panics**: malformed input is a typed error raised before any step
//! - **Pure**: engines do no I/O and share no mutable state
//! - **Deterministic**: identical inputs give bit-identical traces

pub mod bits;
pub mod channel;
pub mod checksum;
pub mod crc;
pub mod dispatch;
pub mod error;
pub mod lrc;
pub mod metrics;
pub mod outcome;
pub mod trace;
pub mod vrc;

// Re-export commonly used types
pub use bits::BitString;
pub use dispatch::{run, run_named, DispatchError, Technique};
pub use error::{Error, Result};
pub use outcome::DetectionResult;
pub use trace::{StateValue, Step, StepTrace};
