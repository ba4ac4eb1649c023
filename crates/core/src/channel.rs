//! The simulated transmission channel.
//!
//! The only corruption model is a single flipped bit at [`ERROR_POSITION`]
//! of the transmitted frame. A clean channel delivers the frame unchanged.

use crate::bits::BitString;
use crate::trace::{Step, StepTrace, Traced};

/// Index of the bit inverted when error injection is requested.
pub const ERROR_POSITION: usize = 0;

/// Deliver `sent` through the channel, optionally corrupting it.
///
/// Records a "Channel: Error Injection" step when a bit is flipped, and a
/// plain "Channel" step otherwise.
pub fn transmit(sent: &BitString, introduce_error: bool) -> Traced<BitString> {
    let mut steps = StepTrace::new();

    if !introduce_error {
        steps.record("Channel", "Transmission successful. No errors.");
        return Traced::new(sent.clone(), steps);
    }

    let received = sent.with_bit_flipped(ERROR_POSITION);
    steps.push(
        Step::new(
            "Channel: Error Injection",
            format!(
                "Noise introduced! Bit {} flipped. {} -> {}",
                ERROR_POSITION, sent, received
            ),
        )
        .with("position", ERROR_POSITION)
        .with("sent", sent)
        .with("received", &received),
    );

    Traced::new(received, steps)
}
