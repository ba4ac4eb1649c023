//! Random input generation for runs and sweeps.
//!
//! When no data is given, we generate a bit string from the seeded RNG.
//!
//! # Design
//!
//! Generated strings mix three shapes so framing edge cases come up often:
//! - Uniform random bits
//! - Long runs of a single bit (all-zero and all-one blocks)
//! - Short repeating patterns
//!
//! Everything flows from a ChaCha8 RNG, so a seed reproduces the exact input.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Generate `len` bits as '0'/'1' text.
pub fn generate_bits(rng: &mut ChaCha8Rng, len: usize) -> String {
    let mut bits = String::with_capacity(len);

    while bits.len() < len {
        let remaining = len - bits.len();
        let span = remaining.min(rng.gen_range(1..=8));

        // Choose span type randomly
        match rng.gen_range(0..10u8) {
            // 20% runs of one bit
            0..=1 => {
                let bit = if rng.gen() { '1' } else { '0' };
                bits.extend(std::iter::repeat(bit).take(span));
            }

            // 20% repeating patterns
            2..=3 => {
                let pattern = generate_pattern(rng);
                bits.extend(pattern.chars().cycle().take(span));
            }

            // 60% uniform bits
            _ => {
                for _ in 0..span {
                    bits.push(if rng.gen() { '1' } else { '0' });
                }
            }
        }
    }

    bits
}

/// Generate a small repeating pattern.
fn generate_pattern(rng: &mut ChaCha8Rng) -> String {
    let pattern_len = rng.gen_range(2..=4);
    (0..pattern_len)
        .map(|_| if rng.gen() { '1' } else { '0' })
        .collect()
}
