//! Vertical Redundancy Check: one even-parity bit over the whole frame.
//!
//! Sender counts the ones and appends '1' when the count is odd, '0' when it
//! is even. Receiver strips the last bit and recomputes parity over the rest.
//! Any odd number of flipped bits is detected; an even number is not.

use crate::bits::{bit_char, parity, BitString};
use crate::channel;
use crate::error::Result;
use crate::outcome::{ensure_non_empty, DetectionResult};
use crate::trace::{Step, StepTrace};

/// Run sender, channel and receiver for VRC.
///
/// # Errors
/// Returns `Error::EmptyInput` if `data` has no bits.
pub fn run(data: &BitString, introduce_error: bool) -> Result<DetectionResult> {
    ensure_non_empty(data)?;

    let mut trace = StepTrace::new();
    trace.record("Start VRC", format!("Input Data: {}", data));

    // Sender
    trace.record("Sender: Counting 1s", "Iterating through bits...");
    let mut ones_count = 0usize;
    for (index, bit) in data.iter().enumerate() {
        let action = if bit {
            ones_count += 1;
            "increment"
        } else {
            "skip"
        };
        trace.push(
            Step::new(
                format!("Sender: Bit {}", index),
                format!("Found '{}'. Current count: {}", bit_char(bit), ones_count),
            )
            .with("action", action)
            .with("index", index)
            .with("bit", bit_char(bit).to_string())
            .with("count", ones_count),
        );
    }

    let parity_bit = parity(data);
    let transmitted = data.push(parity_bit);
    trace.push(
        Step::new(
            "Sender: Parity Calculation",
            format!(
                "Total 1s: {}. {} is {}. Parity Bit: {}",
                ones_count,
                ones_count,
                if ones_count % 2 == 1 { "Odd" } else { "Even" },
                bit_char(parity_bit)
            ),
        )
        .with("data", data)
        .with("parity", bit_char(parity_bit).to_string()),
    );

    let received = trace.absorb(channel::transmit(&transmitted, introduce_error));

    // Receiver
    trace.record("Receiver: Start Check", format!("Received Data: {}", received));

    let (payload, check) = received.split_at(received.len() - 1);
    let received_parity = check.first().unwrap_or(false);
    let computed_parity = parity(&payload);
    let error_detected = computed_parity != received_parity;

    trace.push(
        Step::new(
            "Receiver: Verification",
            format!(
                "Count of 1s in data part: {}. Expected Parity: {}. Received Parity: {}.",
                payload.count_ones(),
                bit_char(computed_parity),
                bit_char(received_parity)
            ),
        )
        .with("count", payload.count_ones())
        .with("expected_parity", bit_char(computed_parity).to_string())
        .with("received_parity", bit_char(received_parity).to_string()),
    );

    let explanation = if error_detected {
        "Error Detected: Parity mismatch."
    } else {
        "Accepted: Parity matches."
    };
    trace.push(Step::new("Result", explanation).with("error_detected", error_detected));

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
    use crate::error::Error;

    fn bs(text: &str) -> BitString {
        text.parse().unwrap()
    }

    #[test]
    fn test_odd_ones_get_parity_one() {
        let result = run(&bs("1001001"), false).unwrap();
        assert_eq!(result.transmitted_data, bs("10010011"));
        assert_eq!(result.received_data, result.transmitted_data);
        assert!(!result.error_detected);
        assert_eq!(result.explanation, "Accepted: Parity matches.");
    }

    #[test]
    fn test_even_ones_get_parity_zero() {
        let result = run(&bs("1100"), false).unwrap();
        assert_eq!(result.transmitted_data, bs("11000"));
        assert!(!result.error_detected);
    }

    #[test]
    fn test_flipped_bit_detected() {
        let result = run(&bs("1001001"), true).unwrap();
        assert_eq!(result.received_data, bs("00010011"));
        assert!(result.error_detected);
        assert_eq!(result.explanation, "Error Detected: Parity mismatch.");
    }

    #[test]
    fn test_single_bit_input() {
        // Frame "00" -> corrupted "10": the parity bit is the only other bit
        let result = run(&bs("0"), true).unwrap();
        assert_eq!(result.transmitted_data, bs("00"));
        assert_eq!(result.received_data, bs("10"));
        assert!(result.error_detected);
    }

    #[test]
    fn test_trace_has_one_step_per_bit() {
        let data = bs("1011");
        let result = run(&data, false).unwrap();
        let per_bit = result
            .trace
            .iter()
            .filter(|s| s.title.starts_with("Sender: Bit "))
            .count();
        assert_eq!(per_bit, data.len());

        let last_bit = result.trace.find("Sender: Bit 3").unwrap();
        assert_eq!(
            last_bit.get("count"),
            Some(&crate::trace::StateValue::Number(3))
        );
        assert_eq!(result.trace.titles().last(), Some(&"Result"));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert_eq!(run(&bs(""), false).unwrap_err(), Error::EmptyInput);
    }
}
