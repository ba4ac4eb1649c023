//! Error types for the error-detection engines.
//!
//! Every failure here is a pre-execution validation failure: it aborts a run
//! before any step is recorded, so callers never see a partial trace. Once an
//! engine starts, the arithmetic is total over well-formed input.

use thiserror::Error;

/// Top-level error type for all core operations.
///
/// Each variant corresponds to a specific failure domain:
/// - Alphabet: input text contains something other than '0' or '1'
/// - Generator: CRC divisor too short to leave a remainder
/// - Empty input: nothing to protect
/// - Length mismatch: bitwise operands of different widths
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Input contains a symbol outside the binary alphabet
    #[error("invalid symbol {symbol:?} at position {position}: only '0' and '1' are allowed")]
    InvalidAlphabet { position: usize, symbol: char },

    /// CRC generator shorter than two bits (remainder would be empty)
    #[error("degenerate generator of length {length}: at least 2 bits are required")]
    DegenerateGenerator { length: usize },

    /// Zero-length data string
    #[error("empty input: data must contain at least one bit")]
    EmptyInput,

    /// Bitwise operation invoked on operands of different widths
    #[error("length mismatch: left operand has {left} bits, right operand has {right}")]
    LengthMismatch { left: usize, right: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
