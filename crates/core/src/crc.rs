//! Cyclic Redundancy Check: remainder of mod-2 polynomial long division.
//!
//! The sender appends `len(generator) - 1` zeros and divides; the remainder
//! replaces those zeros on the wire. The receiver divides the whole received
//! frame by the same generator and accepts only a zero remainder.
//!
//! # Division procedure
//!
//! A working register holds `len(generator)` bits, starting with the head of
//! the dividend. For every remaining dividend bit:
//! - leading bit '1': XOR with the generator, drop the (now zero) leading bit,
//!   pull down the next dividend bit
//! - leading bit '0': drop it and pull down the next bit (XOR with all zeros)
//!
//! One last check/XOR on the full register then yields the remainder.

use crate::bits::{bit_char, xor, BitString};
use crate::channel;
use crate::error::{Error, Result};
use crate::outcome::{ensure_non_empty, DetectionResult};
use crate::trace::{Step, StepTrace, Traced};

/// Generator used when the caller does not supply one (x^3 + 1).
pub const DEFAULT_GENERATOR: &str = "1001";

/// Reject generators too short to leave a remainder.
///
/// # Errors
/// Returns `Error::DegenerateGenerator` for generators under 2 bits.
pub fn validate_generator(generator: &BitString) -> Result<()> {
    if generator.len() < 2 {
        return Err(Error::DegenerateGenerator {
            length: generator.len(),
        });
    }
    Ok(())
}

/// Mod-2 long division of `dividend` by `divisor`, recording each step under
/// the given stage label ("Sender" or "Receiver").
///
/// Returns the `len(divisor) - 1` bit remainder.
///
/// # Errors
/// - `Error::DegenerateGenerator` if the divisor is shorter than 2 bits
/// - `Error::LengthMismatch` if the dividend is shorter than the divisor
pub fn mod2_divide(
    dividend: &BitString,
    divisor: &BitString,
    stage: &str,
) -> Result<Traced<BitString>> {
    validate_generator(divisor)?;
    if dividend.len() < divisor.len() {
        return Err(Error::LengthMismatch {
            left: dividend.len(),
            right: divisor.len(),
        });
    }

    let mut steps = StepTrace::new();
    let (mut register, rest) = dividend.split_at(divisor.len());

    steps.push(
        Step::new(
            format!("{}: Div Start", stage),
            format!(
                "Dividend: {}, Divisor: {}, Initial Chunk: {}",
                dividend, divisor, register
            ),
        )
        .with("action", "init")
        .with("dividend", dividend)
        .with("divisor", divisor)
        .with("current_chunk", &register),
    );

    for next_bit in rest.iter() {
        let next = bit_char(next_bit).to_string();

        if register.first() == Some(true) {
            let result = xor(divisor, &register)?;
            let updated = result.without_first().push(next_bit);
            steps.push(
                Step::new(
                    format!("{}: Step (XOR)", stage),
                    format!(
                        "Current: {} (Starts with 1). XOR {} -> {}. Pull down {} -> New: {}",
                        register, divisor, result, next, updated
                    ),
                )
                .with("action", "xor")
                .with("current_chunk", &register)
                .with("divisor", divisor)
                .with("xor_result", &result)
                .with("next_bit", next),
            );
            register = updated;
        } else {
            let updated = register.without_first().push(next_bit);
            steps.push(
                Step::new(
                    format!("{}: Step (Skip)", stage),
                    format!(
                        "Current: {} (Starts with 0). No XOR (Shift). Pull down {} -> New: {}",
                        register, next, updated
                    ),
                )
                .with("action", "skip")
                .with("current_chunk", &register)
                .with("divisor", divisor)
                .with("next_bit", next),
            );
            register = updated;
        }
    }

    let remainder = if register.first() == Some(true) {
        let result = xor(divisor, &register)?;
        let remainder = result.without_first();
        steps.push(
            Step::new(
                format!("{}: Final Step", stage),
                format!(
                    "Current: {}. XOR {} -> {}. Remainder: {}",
                    register, divisor, result, remainder
                ),
            )
            .with("action", "final_xor")
            .with("current_chunk", &register)
            .with("divisor", divisor)
            .with("xor_result", &result)
            .with("remainder", &remainder),
        );
        remainder
    } else {
        let remainder = register.without_first();
        steps.push(
            Step::new(
                format!("{}: Final Step", stage),
                format!("Current: {}. Starts with 0. Remainder: {}", register, remainder),
            )
            .with("action", "final_skip")
            .with("current_chunk", &register)
            .with("divisor", divisor)
            .with("remainder", &remainder),
        );
        remainder
    };

    Ok(Traced::new(remainder, steps))
}

/// Run sender, channel and receiver for CRC with the given generator.
///
/// # Errors
/// - `Error::EmptyInput` if `data` has no bits
/// - `Error::DegenerateGenerator` if `generator` is shorter than 2 bits
pub fn run(
    data: &BitString,
    generator: &BitString,
    introduce_error: bool,
) -> Result<DetectionResult> {
    ensure_non_empty(data)?;
    validate_generator(generator)?;

    let mut trace = StepTrace::new();
    trace.record("Start CRC", format!("Data: {}, Generator: {}", data, generator));

    // Sender
    let zeros = generator.len() - 1;
    let appended = data.concat(&BitString::zeros(zeros));
    trace.record("Sender: Padding", format!("Appended {} zeros: {}", zeros, appended));

    let remainder = trace.absorb(mod2_divide(&appended, generator, "Sender")?);
    let transmitted = data.concat(&remainder);
    trace.push(
        Step::new(
            "Sender: Finalize",
            format!("CRC Remainder: {}. Transmitted: {}", remainder, transmitted),
        )
        .with("remainder", &remainder),
    );

    let received = trace.absorb(channel::transmit(&transmitted, introduce_error));

    // Receiver
    trace.record("Receiver: Verification", "Dividing Received Data by Generator...");
    let check = trace.absorb(mod2_divide(&received, generator, "Receiver")?);
    let error_detected = !check.is_all_zeros();

    trace.push(
        Step::new(
            "Result",
            format!("Final Remainder: {}. Error Detected: {}", check, error_detected),
        )
        .with("remainder", &check)
        .with("error_detected", error_detected),
    );

    let explanation = if error_detected {
        "Detected error via non-zero remainder"
    } else {
        "Transmission clean"
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

#[cfg(test)]
mod tests {
    use super::*;

    fn bs(text: &str) -> BitString {
        text.parse().unwrap()
    }

    #[test]
    fn test_division_remainder() {
        let out = mod2_divide(&bs("1101011011000"), &bs("1001"), "Sender").unwrap();
        assert_eq!(out.value, bs("100"));
        assert_eq!(out.value.len(), 3);
    }

    #[test]
    fn test_textbook_generator() {
        let out = mod2_divide(&bs("11010110110000"), &bs("10011"), "Sender").unwrap();
        assert_eq!(out.value, bs("1110"));
    }

    #[test]
    fn test_division_step_count() {
        // One start step, one per pulled-down bit, one final step
        let out = mod2_divide(&bs("1101011011000"), &bs("1001"), "Sender").unwrap();
        assert_eq!(out.steps.len(), 1 + (13 - 4) + 1);
        assert_eq!(out.steps.titles().first(), Some(&"Sender: Div Start"));
        assert_eq!(out.steps.titles().last(), Some(&"Sender: Final Step"));
    }

    #[test]
    fn test_exact_length_dividend() {
        // No bits to pull down: only the final check runs
        let out = mod2_divide(&bs("1001"), &bs("1001"), "Receiver").unwrap();
        assert_eq!(out.value, bs("000"));
        assert_eq!(out.steps.len(), 2);
    }

    #[test]
    fn test_round_trip() {
        let result = run(&bs("1101011011"), &bs("1001"), false).unwrap();
        assert_eq!(result.transmitted_data, bs("1101011011100"));
        assert!(!result.error_detected);
        assert_eq!(result.explanation, "Transmission clean");
    }

    #[test]
    fn test_flipped_bit_detected() {
        let result = run(&bs("1101011011"), &bs("1001"), true).unwrap();
        assert_eq!(result.received_data, bs("0101011011100"));
        assert!(result.error_detected);
        assert_eq!(result.explanation, "Detected error via non-zero remainder");
    }

    #[test]
    fn test_degenerate_generator() {
        assert_eq!(
            run(&bs("1011"), &bs("1"), false).unwrap_err(),
            Error::DegenerateGenerator { length: 1 }
        );
        assert_eq!(
            run(&bs("1011"), &bs(""), false).unwrap_err(),
            Error::DegenerateGenerator { length: 0 }
        );
    }

    #[test]
    fn test_empty_data() {
        assert_eq!(
            run(&bs(""), &bs("1001"), false).unwrap_err(),
            Error::EmptyInput
        );
    }

    #[test]
    fn test_short_dividend() {
        assert_eq!(
            mod2_divide(&bs("10"), &bs("1001"), "Sender").unwrap_err(),
            Error::LengthMismatch { left: 2, right: 4 }
        );
    }

    #[test]
    fn test_two_bit_generator_is_parity() {
        // Dividing by x + 1 leaves the overall parity of the message
        let result = run(&bs("1011"), &bs("11"), false).unwrap();
        assert_eq!(result.transmitted_data, bs("10111"));
        assert!(!result.error_detected);
    }
}
