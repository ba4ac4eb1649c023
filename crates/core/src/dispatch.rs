//! Technique selection: one closed enum over the four engines.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::bits::BitString;
use crate::crc::{self, DEFAULT_GENERATOR};
use crate::error::Error;
use crate::outcome::DetectionResult;
use crate::{checksum, lrc, vrc};

/// Names accepted by [`Technique::from_name`], in display order.
pub const TECHNIQUE_NAMES: [&str; 4] = ["vrc", "lrc", "crc", "checksum"];

/// Errors raised while selecting or running a technique by name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Name is not one of [`TECHNIQUE_NAMES`]
    #[error("unknown technique: {name}")]
    UnknownTechnique { name: String },

    /// Input or engine validation failed
    #[error(transparent)]
    Engine(#[from] Error),
}

/// Which engine to run. CRC carries its generator polynomial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Technique {
    Vrc,
    Lrc,
    Crc { generator: BitString },
    Checksum,
}

impl Technique {
    /// CRC with the default generator `1001` (x^3 + 1).
    pub fn default_crc() -> Self {
        Technique::Crc {
            generator: BitString::from_bits(vec![true, false, false, true]),
        }
    }

    /// Select a technique by case-insensitive name.
    ///
    /// `generator` is only read for CRC and falls back to `1001`.
    ///
    /// # Errors
    /// - `DispatchError::UnknownTechnique` for an unrecognized name
    /// - `Error::InvalidAlphabet` if the generator is not binary text
    /// - `Error::DegenerateGenerator` if the generator is under 2 bits
    pub fn from_name(name: &str, generator: Option<&str>) -> Result<Self, DispatchError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "vrc" => Ok(Technique::Vrc),
            "lrc" => Ok(Technique::Lrc),
            "checksum" => Ok(Technique::Checksum),
            "crc" => {
                let generator: BitString = generator.unwrap_or(DEFAULT_GENERATOR).parse()?;
                crc::validate_generator(&generator)?;
                Ok(Technique::Crc { generator })
            }
            _ => Err(DispatchError::UnknownTechnique {
                name: name.to_string(),
            }),
        }
    }

    /// Lowercase technique name.
    pub fn name(&self) -> &'static str {
        match self {
            Technique::Vrc => "vrc",
            Technique::Lrc => "lrc",
            Technique::Crc { .. } => "crc",
            Technique::Checksum => "checksum",
        }
    }

    /// All four techniques, CRC with the default generator.
    pub fn all() -> Vec<Technique> {
        vec![
            Technique::Vrc,
            Technique::Lrc,
            Technique::default_crc(),
            Technique::Checksum,
        ]
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Technique::Crc { generator } => write!(f, "crc (generator {})", generator),
            other => f.write_str(other.name()),
        }
    }
}

/// Run one technique end to end: sender, channel, receiver.
///
/// # Errors
/// Propagates the engine's validation error; no partial result is produced.
pub fn run(
    technique: &Technique,
    data: &BitString,
    introduce_error: bool,
) -> Result<DetectionResult, Error> {
    debug!(
        technique = technique.name(),
        data_len = data.len(),
        introduce_error,
        "running engine"
    );

    let outcome = match technique {
        Technique::Vrc => vrc::run(data, introduce_error),
        Technique::Lrc => lrc::run(data, introduce_error),
        Technique::Crc { generator } => crc::run(data, generator, introduce_error),
        Technique::Checksum => checksum::run(data, introduce_error),
    };

    match &outcome {
        Ok(result) => debug!(
            technique = technique.name(),
            error_detected = result.error_detected,
            steps = result.trace.len(),
            "engine finished"
        ),
        Err(err) => warn!(technique = technique.name(), error = %err, "run rejected"),
    }

    outcome
}

/// Parse raw text inputs, then [`run`].
///
/// # Errors
/// Any [`DispatchError`]; parsing failures surface before any step runs.
pub fn run_named(
    name: &str,
    data: &str,
    generator: Option<&str>,
    introduce_error: bool,
) -> Result<DetectionResult, DispatchError> {
    let technique = Technique::from_name(name, generator)?;
    let data: BitString = data.parse()?;
    Ok(run(&technique, &data, introduce_error)?)
}
