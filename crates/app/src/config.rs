//! Configuration for the errdetect-sim application.
//!
//! Handles parsing command-line arguments and generating sensible defaults
//! (including randomized defaults that are reproducible with a seed).
//!
//! # Philosophy
//!
//! The tool should work with ZERO arguments, using intelligent defaults.
//! All defaults can be printed so runs are reproducible.

use errdetect_core::crc::DEFAULT_GENERATOR;
use errdetect_core::dispatch::TECHNIQUE_NAMES;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::input_gen::generate_bits;

/// Environment variable that overrides the default bind address.
pub const ADDR_ENV: &str = "ERRDETECT_ADDR";

/// Bind address used when neither `--bind` nor [`ADDR_ENV`] is set.
pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";

/// What the binary does once configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Run one technique and print its trace
    Run,
    /// Run every technique over many random inputs and print statistics
    Sweep,
    /// Serve the HTTP API
    Serve,
}

impl Mode {
    fn parse(value: &str) -> Result<Self, String> {
        match value {
            "run" => Ok(Mode::Run),
            "sweep" => Ok(Mode::Sweep),
            "serve" => Ok(Mode::Serve),
            other => Err(format!("invalid mode: {} (expected run, sweep or serve)", other)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Run => "run",
            Mode::Sweep => "sweep",
            Mode::Serve => "serve",
        }
    }
}

/// Complete configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,

    // === Single run ===
    /// Technique name (validated when the run starts)
    pub technique: String,

    /// Data bits as text (validated when the run starts)
    pub data: String,

    /// CRC generator bits
    pub generator: String,

    /// Flip bit 0 on the channel
    pub introduce_error: bool,

    // === Randomness ===
    /// Seed for every randomized default
    pub seed: u64,

    // === Sweep ===
    /// Random inputs per technique
    pub trials: usize,

    /// Longest generated input
    pub max_length: usize,

    // === Server ===
    pub bind_addr: String,

    // === Output ===
    /// Print the result as JSON
    pub json: bool,

    /// Suppress the per-step listing (sweep: print `key=value` lines)
    pub quiet: bool,

    /// Whether to print the resolved configuration
    pub print_config: bool,

    /// Whether to print per-technique sweep statistics
    pub print_metrics: bool,
}

impl Config {
    /// Parse configuration from command-line arguments and the environment.
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        Self::parse(args, std::env::var(ADDR_ENV).ok())
    }

    /// Parse configuration with an explicit fallback bind address.
    ///
    /// If --seed is provided, every randomized default derives from it.
    /// Otherwise a time-based seed is used.
    pub fn parse(args: &[String], env_addr: Option<String>) -> Result<Self, String> {
        let mut mode = Mode::Run;
        let mut technique: Option<String> = None;
        let mut data: Option<String> = None;
        let mut generator: Option<String> = None;
        let mut introduce_error: Option<bool> = None;
        let mut seed: Option<u64> = None;
        let mut length: Option<usize> = None;
        let mut trials: Option<usize> = None;
        let mut max_length: Option<usize> = None;
        let mut bind_addr: Option<String> = None;
        let mut json = false;
        let mut quiet = false;
        let mut print_config = false;
        let mut print_metrics = true;

        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "--mode" => {
                    mode = Mode::parse(next_value(args, &mut i, "a mode")?)?;
                }
                "--technique" => {
                    technique = Some(next_value(args, &mut i, "a name")?.to_string());
                }
                "--data" => {
                    data = Some(next_value(args, &mut i, "a bit string")?.to_string());
                }
                "--generator" => {
                    generator = Some(next_value(args, &mut i, "a bit string")?.to_string());
                }
                "--error" => {
                    introduce_error = Some(true);
                }
                "--no-error" => {
                    introduce_error = Some(false);
                }
                "--seed" => {
                    seed = Some(parse_number(next_value(args, &mut i, "a number")?, "seed")?);
                }
                "--length" => {
                    length = Some(parse_number(next_value(args, &mut i, "a number")?, "length")?);
                }
                "--trials" => {
                    trials = Some(parse_number(next_value(args, &mut i, "a number")?, "trials")?);
                }
                "--max-length" => {
                    max_length = Some(parse_number(
                        next_value(args, &mut i, "a number")?,
                        "max-length",
                    )?);
                }
                "--bind" => {
                    bind_addr = Some(next_value(args, &mut i, "an address")?.to_string());
                }
                "--json" => {
                    json = true;
                }
                "--quiet" | "-q" => {
                    quiet = true;
                }
                "--print-config" => {
                    print_config = true;
                }
                "--no-metrics" => {
                    print_metrics = false;
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                _ => {
                    return Err(format!("unknown argument: {}", flag));
                }
            }
            i += 1;
        }

        if length == Some(0) {
            return Err("--length must be at least 1".to_string());
        }
        if max_length == Some(0) {
            return Err("--max-length must be at least 1".to_string());
        }

        // Determine seed (explicit or time-based)
        let seed = seed.unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

        // Generate defaults using seed
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let technique = technique.unwrap_or_else(|| {
            TECHNIQUE_NAMES[rng.gen_range(0..TECHNIQUE_NAMES.len())].to_string()
        });
        let data = data.unwrap_or_else(|| {
            let len = length.unwrap_or_else(|| rng.gen_range(4..=24));
            generate_bits(&mut rng, len)
        });
        let introduce_error = introduce_error.unwrap_or_else(|| rng.gen_bool(0.5));

        let config = Config {
            mode,
            technique,
            data,
            generator: generator.unwrap_or_else(|| DEFAULT_GENERATOR.to_string()),
            introduce_error,
            seed,
            trials: trials.unwrap_or(500),
            max_length: max_length.unwrap_or(40),
            bind_addr: bind_addr
                .or(env_addr)
                .unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            json,
            quiet,
            print_config,
            print_metrics,
        };

        Ok(config)
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        println!("Mode: {}", self.mode.name());
        println!("Seed: {}", self.seed);
        println!();
        match self.mode {
            Mode::Run => {
                println!("Technique: {}", self.technique);
                println!("Data: {} ({} bits)", self.data, self.data.len());
                println!("Generator: {}", self.generator);
                println!("Introduce error: {}", self.introduce_error);
            }
            Mode::Sweep => {
                println!("Trials: {} per technique", self.trials);
                println!("Input length: 1-{} bits", self.max_length);
                println!("CRC generator: {}", self.generator);
            }
            Mode::Serve => {
                println!("Bind address: {}", self.bind_addr);
            }
        }
        println!();
    }
}

/// Advance past `args[*i]` and return the value that follows it.
fn next_value<'a>(args: &'a [String], i: &mut usize, what: &str) -> Result<&'a str, String> {
    let flag = &args[*i];
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires {}", flag, what))
}

fn parse_number<T: std::str::FromStr>(value: &str, name: &str) -> Result<T, String> {
    value.parse().map_err(|_| format!("invalid {}: {}", name, value))
}

fn print_help() {
    println!("errdetect-sim: Step-by-step VRC, LRC, CRC and checksum simulator");
    println!();
    println!("USAGE:");
    println!("    errdetect-sim [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --mode <MODE>           run | sweep | serve (default: run)");
    println!();
    println!("    --technique <NAME>      vrc | lrc | crc | checksum (default: random)");
    println!("    --data <BITS>           Data to protect (default: random bits)");
    println!("    --length <N>            Length of generated data (default: random 4-24)");
    println!("    --generator <BITS>      CRC generator polynomial (default: 1001)");
    println!("    --error                 Flip bit 0 on the channel");
    println!("    --no-error              Keep the channel clean");
    println!("    --seed <N>              Random seed for determinism");
    println!();
    println!("    --trials <N>            Sweep: random inputs per technique (default: 500)");
    println!("    --max-length <N>        Sweep: longest generated input (default: 40)");
    println!();
    println!("    --bind <ADDR>           Serve: listen address (default: $ERRDETECT_ADDR or 127.0.0.1:8000)");
    println!();
    println!("    --json                  Print the result as JSON");
    println!("    --quiet, -q             Only print the verdict (sweep: key=value lines)");
    println!("    --print-config          Print resolved configuration");
    println!("    --no-metrics            Don't print sweep statistics");
    println!("    --help, -h              Print this help");
    println!();
    println!("EXAMPLES:");
    println!("    errdetect-sim                                          # Random technique and data");
    println!("    errdetect-sim --technique vrc --data 1001001 --error   # Parity with a flipped bit");
    println!("    errdetect-sim --technique crc --data 1101011011 --generator 10011");
    println!("    errdetect-sim --mode sweep --seed 42                   # Detection statistics");
    println!("    errdetect-sim --mode serve --bind 0.0.0.0:8000         # HTTP API");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_explicit_run() {
        let config = Config::parse(
            &args(&["--technique", "crc", "--data", "1101", "--generator", "10011", "--error"]),
            None,
        )
        .unwrap();

        assert_eq!(config.mode, Mode::Run);
        assert_eq!(config.technique, "crc");
        assert_eq!(config.data, "1101");
        assert_eq!(config.generator, "10011");
        assert!(config.introduce_error);
        assert_eq!(config.bind_addr, DEFAULT_ADDR);
    }

    #[test]
    fn test_seeded_defaults_are_reproducible() {
        let a = Config::parse(&args(&["--seed", "42"]), None).unwrap();
        let b = Config::parse(&args(&["--seed", "42"]), None).unwrap();

        assert_eq!(a.technique, b.technique);
        assert_eq!(a.data, b.data);
        assert_eq!(a.introduce_error, b.introduce_error);
        assert!(TECHNIQUE_NAMES.contains(&a.technique.as_str()));
        assert!((4..=24).contains(&a.data.len()));
        assert_eq!(a.generator, DEFAULT_GENERATOR);
    }

    #[test]
    fn test_length_controls_generated_data() {
        let config = Config::parse(&args(&["--seed", "1", "--length", "33"]), None).unwrap();
        assert_eq!(config.data.len(), 33);
        assert!(config.data.chars().all(|c| c == '0' || c == '1'));
    }

    #[test]
    fn test_sweep_and_serve_modes() {
        let config = Config::parse(
            &args(&["--mode", "sweep", "--trials", "10", "--max-length", "12"]),
            None,
        )
        .unwrap();
        assert_eq!(config.mode, Mode::Sweep);
        assert_eq!(config.trials, 10);
        assert_eq!(config.max_length, 12);

        let config = Config::parse(&args(&["--mode", "serve"]), Some("0.0.0.0:9000".to_string()))
            .unwrap();
        assert_eq!(config.mode, Mode::Serve);
        assert_eq!(config.bind_addr, "0.0.0.0:9000");

        let config = Config::parse(
            &args(&["--mode", "serve", "--bind", "127.0.0.1:1"]),
            Some("0.0.0.0:9000".to_string()),
        )
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:1");
    }

    #[test]
    fn test_errors() {
        assert!(Config::parse(&args(&["--data"]), None)
            .unwrap_err()
            .contains("--data requires"));
        assert!(Config::parse(&args(&["--seed", "abc"]), None)
            .unwrap_err()
            .contains("invalid seed"));
        assert!(Config::parse(&args(&["--mode", "fast"]), None)
            .unwrap_err()
            .contains("invalid mode"));
        assert!(Config::parse(&args(&["--bogus"]), None)
            .unwrap_err()
            .contains("unknown argument"));
        assert!(Config::parse(&args(&["--length", "0"]), None).is_err());
    }
}
