//! Bit-string primitives shared by every engine.
//!
//! A [`BitString`] is an immutable, ordered run of bits addressed MSB-first:
//! index 0 is the leftmost, most significant bit. The free functions in this
//! module are the only arithmetic the engines use:
//! - [`xor`]: bitwise XOR of equal-width strings (GF(2) subtraction)
//! - [`ones_complement`]: flip every bit
//! - [`parity`]: even-parity bit over a string
//! - [`add_fixed_width`]: ordinary binary addition with carry-out
//!
//! # Example
//! ```
//! use errdetect_core::bits::{add_fixed_width, BitString};
//!
//! let a: BitString = "1011".parse().unwrap();
//! let b: BitString = "0110".parse().unwrap();
//! let (sum, carry) = add_fixed_width(&a, &b).unwrap();
//! assert_eq!(sum.to_string(), "0001");
//! assert!(carry);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Inputs up to this many bits are framed into small blocks.
pub const SMALL_INPUT_LIMIT: usize = 16;

/// Block width used for inputs of at most [`SMALL_INPUT_LIMIT`] bits.
pub const SMALL_BLOCK_WIDTH: usize = 4;

/// Block width used for longer inputs.
pub const LARGE_BLOCK_WIDTH: usize = 8;

/// An immutable sequence of bits, MSB-first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BitString {
    bits: Vec<bool>,
}

impl BitString {
    /// Create an empty bit string.
    pub fn new() -> Self {
        Self { bits: Vec::new() }
    }

    /// Create a bit string from raw bits (`true` = '1').
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// `len` zero bits.
    pub fn zeros(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    /// The value 1 at the given width: `0..01`.
    ///
    /// This is the addend used to fold an end-around carry back in.
    pub fn one(width: usize) -> Self {
        let mut bits = vec![false; width];
        if let Some(last) = bits.last_mut() {
            *last = true;
        }
        Self { bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Bit at `index` (0 = MSB), or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    /// Leading (most significant) bit.
    pub fn first(&self) -> Option<bool> {
        self.bits.first().copied()
    }

    /// Trailing (least significant) bit.
    pub fn last(&self) -> Option<bool> {
        self.bits.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    /// Number of '1' bits.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// True if every bit is '0' (vacuously true when empty).
    pub fn is_all_zeros(&self) -> bool {
        self.bits.iter().all(|&b| !b)
    }

    /// True if every bit is '1' (vacuously true when empty).
    pub fn is_all_ones(&self) -> bool {
        self.bits.iter().all(|&b| b)
    }

    /// `self ++ other`.
    pub fn concat(&self, other: &BitString) -> BitString {
        let mut bits = Vec::with_capacity(self.len() + other.len());
        bits.extend_from_slice(&self.bits);
        bits.extend_from_slice(&other.bits);
        Self { bits }
    }

    /// Append a single bit, returning the longer string.
    pub fn push(&self, bit: bool) -> BitString {
        let mut bits = self.bits.clone();
        bits.push(bit);
        Self { bits }
    }

    /// Drop the leading bit.
    pub fn without_first(&self) -> BitString {
        Self {
            bits: self.bits.iter().skip(1).copied().collect(),
        }
    }

    /// Split into `(self[..mid], self[mid..])`, clamping `mid` to the length.
    pub fn split_at(&self, mid: usize) -> (BitString, BitString) {
        let mid = mid.min(self.len());
        let (head, tail) = self.bits.split_at(mid);
        (Self::from_bits(head.to_vec()), Self::from_bits(tail.to_vec()))
    }

    /// Copy of this string with the bit at `index` inverted.
    ///
    /// An out-of-range index leaves the string unchanged.
    pub fn with_bit_flipped(&self, index: usize) -> BitString {
        let mut bits = self.bits.clone();
        if let Some(bit) = bits.get_mut(index) {
            *bit = !*bit;
        }
        Self { bits }
    }

    /// Append zeros until the length is a multiple of `width`.
    pub fn padded_right(&self, width: usize) -> BitString {
        self.concat(&BitString::zeros(padding_for(self.len(), width)))
    }

    /// Prepend zeros until the length is a multiple of `width`.
    ///
    /// Leading zeros keep the numeric value of the first block intact.
    pub fn padded_left(&self, width: usize) -> BitString {
        BitString::zeros(padding_for(self.len(), width)).concat(self)
    }

    /// Split into consecutive `width`-bit blocks. A short tail becomes its
    /// own (shorter) block; callers pad first when they need aligned blocks.
    pub fn blocks(&self, width: usize) -> Vec<BitString> {
        if width == 0 {
            return Vec::new();
        }
        self.bits
            .chunks(width)
            .map(|chunk| Self::from_bits(chunk.to_vec()))
            .collect()
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for BitString {
    type Err = Error;

    /// Parse text made of '0' and '1'. The empty string parses to an empty
    /// bit string; engines reject it separately.
    fn from_str(s: &str) -> Result<Self> {
        let bits = s
            .chars()
            .enumerate()
            .map(|(position, symbol)| match symbol {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(Error::InvalidAlphabet { position, symbol }),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { bits })
    }
}

impl Serialize for BitString {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BitString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Render one bit as '0' or '1'.
pub fn bit_char(bit: bool) -> char {
    if bit {
        '1'
    } else {
        '0'
    }
}

/// Zeros needed to bring `len` up to a multiple of `width`.
pub fn padding_for(len: usize, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    (width - len % width) % width
}

/// Block width shared by LRC and checksum framing.
///
/// `len <= 16` gives 4-bit blocks, anything longer gives 8-bit blocks.
pub fn block_width(len: usize) -> usize {
    if len <= SMALL_INPUT_LIMIT {
        SMALL_BLOCK_WIDTH
    } else {
        LARGE_BLOCK_WIDTH
    }
}

/// Blocks separated by single spaces, as used in step snapshots.
pub fn join_blocks(blocks: &[BitString]) -> String {
    blocks
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Blocks rendered as a bracketed list for step descriptions.
pub fn list_blocks(blocks: &[BitString]) -> String {
    format!("[{}]", join_blocks(blocks).replace(' ', ", "))
}

/// Bitwise XOR of two equal-width strings.
///
/// # Errors
/// Returns `Error::LengthMismatch` if the widths differ.
pub fn xor(a: &BitString, b: &BitString) -> Result<BitString> {
    ensure_same_width(a, b)?;
    Ok(BitString::from_bits(
        a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect(),
    ))
}

/// Flip every bit.
pub fn ones_complement(bits: &BitString) -> BitString {
    BitString::from_bits(bits.iter().map(|b| !b).collect())
}

/// Even-parity bit: `true` ('1') when the count of ones is odd.
///
/// Appending this bit makes the total count of ones even.
pub fn parity(bits: &BitString) -> bool {
    bits.count_ones() % 2 == 1
}

/// Add two equal-width strings as unsigned binary numbers.
///
/// Carries propagate from the LSB (rightmost) toward the MSB. Returns the
/// same-width sum and whether a carry fell off the top.
///
/// # Errors
/// Returns `Error::LengthMismatch` if the widths differ.
pub fn add_fixed_width(a: &BitString, b: &BitString) -> Result<(BitString, bool)> {
    ensure_same_width(a, b)?;

    let mut sum = vec![false; a.len()];
    let mut carry = false;

    for i in (0..a.len()).rev() {
        let x = a.bits[i];
        let y = b.bits[i];
        sum[i] = x ^ y ^ carry;
        carry = (x && y) || (carry && (x ^ y));
    }

    Ok((BitString::from_bits(sum), carry))
}

fn ensure_same_width(a: &BitString, b: &BitString) -> Result<()> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}
