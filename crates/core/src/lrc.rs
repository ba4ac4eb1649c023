//! Longitudinal Redundancy Check: one parity bit per column of a block matrix.
//!
//! # Framing
//!
//! ```text
//!   data (right-padded with zeros)   LRC block
//! +------+------+-----+------+     +------+
//! | blk0 | blk1 | ... | blkN |  ++ | even |
//! +------+------+-----+------+     +------+
//!   each block is `width` bits; width = 4 for <= 16 bits, else 8
//! ```
//!
//! The receiver re-frames the whole received string, LRC block included, and
//! recomputes column parity over every block. A clean frame yields all zeros
//! because each column, check bit included, carries an even number of ones.

use crate::bits::{
    bit_char, block_width, join_blocks, list_blocks, padding_for, parity, BitString,
};
use crate::channel;
use crate::error::Result;
use crate::outcome::{ensure_non_empty, DetectionResult};
use crate::trace::{Step, StepTrace};

/// Run sender, channel and receiver for LRC.
///
/// # Errors
/// Returns `Error::EmptyInput` if `data` has no bits.
pub fn run(data: &BitString, introduce_error: bool) -> Result<DetectionResult> {
    ensure_non_empty(data)?;

    let mut trace = StepTrace::new();
    trace.record("Start LRC", format!("Input Data: {}", data));

    let width = block_width(data.len());
    trace.push(
        Step::new("Configuration", format!("Block Size set to {} bits.", width))
            .with("block_size", width),
    );

    let padding = padding_for(data.len(), width);
    let processed = data.padded_right(width);
    if padding > 0 {
        trace.record(
            "Padding",
            format!("Added {} zero(s) to end. Data: {}", padding, processed),
        );
    }

    let blocks = processed.blocks(width);
    trace.push(
        Step::new(
            "Blocking",
            format!(
                "Data split into {} blocks: {}",
                blocks.len(),
                list_blocks(&blocks)
            ),
        )
        .with("action", "init")
        .with("blocks", join_blocks(&blocks)),
    );

    // Sender
    trace.record("Sender: Calculating Column Parity", "Iterating columns...");
    let mut lrc_bits = Vec::with_capacity(width);
    for col in 0..width {
        let column = column_bits(&blocks, col);
        let ones_count = column.count_ones();
        let parity_bit = parity(&column);
        lrc_bits.push(parity_bit);

        trace.push(
            Step::new(
                format!("Sender: Column {}", col),
                format!(
                    "Bits: {}. 1s count: {}. Parity: {}",
                    column,
                    ones_count,
                    bit_char(parity_bit)
                ),
            )
            .with("blocks", join_blocks(&blocks))
            .with("highlight_col", col)
            .with("count", ones_count)
            .with("parity_bit", bit_char(parity_bit).to_string()),
        );
    }

    let lrc_block = BitString::from_bits(lrc_bits);
    let transmitted = processed.concat(&lrc_block);
    trace.push(
        Step::new(
            "Sender: Finalize",
            format!("LRC Block: {}. Transmitted: {}", lrc_block, transmitted),
        )
        .with("lrc_block", &lrc_block),
    );

    let received = trace.absorb(channel::transmit(&transmitted, introduce_error));

    // Receiver
    trace.record("Receiver: Start Check", format!("Received Data: {}", received));

    let received_blocks = received.blocks(width);
    trace.push(
        Step::new(
            "Receiver: Blocking",
            format!("Received blocks: {}", list_blocks(&received_blocks)),
        )
        .with("action", "init")
        .with("blocks", join_blocks(&received_blocks)),
    );

    let check = column_parity(&received_blocks, width);
    let error_detected = !check.is_all_zeros();
    trace.push(
        Step::new(
            "Receiver: Validation",
            format!("Computed Parity of all blocks (including LRC): {}", check),
        )
        .with("check", &check)
        .with("error_detected", error_detected),
    );

    let explanation = if error_detected {
        "Error Detected: Columns do not sum to even parity."
    } else {
        "Accepted: All columns sum to even parity."
    };

    Ok(DetectionResult {
        original_data: data.clone(),
        transmitted_data: transmitted,
        received_data: received,
        error_detected,
        trace,
        explanation: explanation.to_string(),
    })
}

/// Even parity of every column across `blocks`.
pub fn column_parity(blocks: &[BitString], width: usize) -> BitString {
    BitString::from_bits(
        (0..width)
            .map(|col| parity(&column_bits(blocks, col)))
            .collect(),
    )
}

/// The bits at column `col` of each block, top to bottom.
fn column_bits(blocks: &[BitString], col: usize) -> BitString {
    BitString::from_bits(
        blocks
            .iter()
            .map(|block| block.get(col).unwrap_or(false))
            .collect(),
    )
}
