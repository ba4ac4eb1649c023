//! Internet-style checksum: one's-complement block sum with end-around carry.
//!
//! Data is left-padded with zeros to a whole number of blocks (leading zeros
//! keep the numeric value of the first block). Blocks are added pairwise; a
//! carry out of the top bit is folded back in by adding 1 until no carry
//! remains. The checksum is the one's complement of the final sum.
//!
//! The receiver sums the data blocks the same way, adds the received
//! checksum, and accepts only an all-ones result.
//!
//! Note the padding side differs from LRC, which pads on the right.

use crate::bits::{
    add_fixed_width, block_width, join_blocks, list_blocks, ones_complement, padding_for, BitString,
};
use crate::channel;
use crate::error::Result;
use crate::outcome::{ensure_non_empty, DetectionResult};
use crate::trace::{Step, StepTrace, Traced};

/// Add two blocks, folding every carry-out back into the LSB.
///
/// `label` names the addition step (e.g. "Sender: Add Block 2").
///
/// # Errors
/// Returns `Error::LengthMismatch` if the blocks differ in width.
pub fn add_with_wrap(
    a: &BitString,
    b: &BitString,
    stage: &str,
    label: &str,
) -> Result<Traced<BitString>> {
    let mut steps = StepTrace::new();
    let (mut sum, mut carry) = add_fixed_width(a, b)?;

    steps.push(
        Step::new(
            label,
            format!("{} + {} = {}, Carry: {}", a, b, sum, u8::from(carry)),
        )
        .with("action", "add")
        .with("operand1", a)
        .with("operand2", b)
        .with("result", &sum)
        .with("carry", usize::from(carry)),
    );

    let one = BitString::one(a.len());
    while carry {
        let (wrapped, next_carry) = add_fixed_width(&sum, &one)?;
        steps.push(
            Step::new(
                format!("{}: Wrap Carry", stage),
                format!(
                    "Wrapped carry: {} + 1 = {}, New Carry: {}",
                    sum,
                    wrapped,
                    u8::from(next_carry)
                ),
            )
            .with("action", "wrap")
            .with("operand1", &sum)
            .with("operand2", &one)
            .with("result", &wrapped)
            .with("carry", usize::from(next_carry)),
        );
        sum = wrapped;
        carry = next_carry;
    }

    Ok(Traced::new(sum, steps))
}

/// One's-complement sum of equal-width blocks.
///
/// An empty slice sums to an empty string.
///
/// # Errors
/// Returns `Error::LengthMismatch` if the blocks differ in width.
pub fn sum_blocks(blocks: &[BitString], stage: &str) -> Result<Traced<BitString>> {
    let mut steps = StepTrace::new();
    let Some((first, rest)) = blocks.split_first() else {
        return Ok(Traced::new(BitString::new(), steps));
    };

    steps.record(
        format!("{}: Summation", stage),
        format!("Initial Sum = Block 0: {}", first),
    );

    let mut sum = first.clone();
    for (i, block) in rest.iter().enumerate() {
        let label = format!("{}: Add Block {}", stage, i + 1);
        sum = steps.absorb(add_with_wrap(&sum, block, stage, &label)?);
    }

    Ok(Traced::new(sum, steps))
}

/// Run sender, channel and receiver for the checksum.
///
/// # Errors
/// Returns `Error::EmptyInput` if `data` has no bits.
pub fn run(data: &BitString, introduce_error: bool) -> Result<DetectionResult> {
    ensure_non_empty(data)?;

    let mut trace = StepTrace::new();
    trace.record("Start Checksum", format!("Input Data: {}", data));

    let width = block_width(data.len());
    let padding = padding_for(data.len(), width);
    let processed = data.padded_left(width);
    if padding > 0 {
        trace.record(
            "Padding",
            format!(
                "Padded with {} zeros at start. Data: {}",
                padding, processed
            ),
        );
    }

    let blocks = processed.blocks(width);
    trace.push(
        Step::new("Blocking", format!("Blocks: {}", list_blocks(&blocks)))
            .with("action", "init")
            .with("blocks", join_blocks(&blocks))
            .with("block_size", width),
    );

    // Sender
    let sum = trace.absorb(sum_blocks(&blocks, "Sender")?);
    let checksum = ones_complement(&sum);
    trace.push(
        Step::new(
            "Sender: Complement",
            format!("Sum: {} -> Checksum (1s Comp): {}", sum, checksum),
        )
        .with("action", "complement")
        .with("sum", &sum)
        .with("checksum", &checksum),
    );

    let transmitted = processed.concat(&checksum);
    trace.record("Sender: Finalize", format!("Sent: {}", transmitted));

    let received = trace.absorb(channel::transmit(&transmitted, introduce_error));

    // Receiver
    let (received_payload, received_checksum) = received.split_at(received.len() - width);
    let received_blocks = received_payload.blocks(width);
    trace.push(
        Step::new(
            "Receiver: Parsing",
            format!(
                "Data Blocks: {}. Received Checksum: {}",
                list_blocks(&received_blocks),
                received_checksum
            ),
        )
        .with("action", "init")
        .with("blocks", join_blocks(&received_blocks))
        .with("checksum", &received_checksum),
    );

    let data_sum = trace.absorb(sum_blocks(&received_blocks, "Receiver")?);
    trace.push(
        Step::new(
            "Receiver: Data Sum",
            format!("Sum of data segments: {}", data_sum),
        )
        .with("sum", &data_sum),
    );

    let final_sum = trace.absorb(add_with_wrap(
        &data_sum,
        &received_checksum,
        "Receiver",
        "Receiver: Add Checksum",
    )?);

    let is_valid = final_sum.is_all_ones();
    let complement = ones_complement(&final_sum);
    trace.push(
        Step::new(
            "Receiver: Final Check",
            format!(
                "Sum is {}. Complement is {}. All 0s expected.",
                final_sum, complement
            ),
        )
        .with("action", "complement")
        .with("sum", &final_sum)
        .with("checksum", &complement)
        .with("error_detected", !is_valid),
    );

    let explanation = if is_valid {
        "Valid (All 1s in sum)"
    } else {
        "Error Detected (Sum not all 1s)"
    };

    Ok(DetectionResult {
        original_data: data.clone(),
        transmitted_data: transmitted,
        received_data: received,
        error_detected: !is_valid,
        trace,
        explanation: explanation.to_string(),
    })
}
