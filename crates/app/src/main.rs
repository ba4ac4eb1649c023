//! errdetect-sim: run, sweep or serve the error-detection engines.
//!
//! - `run` (default): one technique on one input, printing every step
//! - `sweep`: every technique over many seeded random inputs, clean and
//!   corrupted, printing detection statistics
//! - `serve`: the HTTP API

mod config;
mod input_gen;
mod logging;
mod report;
mod server;
mod validate;

use std::process::ExitCode;

use anyhow::Context;
use errdetect_core::metrics::DetectionMetrics;
use errdetect_core::{BitString, Technique};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info};

use config::{Config, Mode};
use input_gen::generate_bits;

fn main() -> ExitCode {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            eprintln!("Run with --help for usage.");
            return ExitCode::from(2);
        }
    };

    if config.print_config {
        config.print();
    }

    let outcome = match config.mode {
        Mode::Run => run_single(&config),
        Mode::Sweep => run_sweep(&config),
        Mode::Serve => run_server(&config),
    };

    match outcome {
        Ok(code) => code,
        Err(err) => {
            error!(mode = config.mode.name(), "{:#}", err);
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_single(config: &Config) -> anyhow::Result<ExitCode> {
    let technique = Technique::from_name(&config.technique, Some(&config.generator))?;
    let data: BitString = config.data.parse().context("invalid --data")?;

    let result = errdetect_core::run(&technique, &data, config.introduce_error)?;
    debug!(steps = result.trace.len(), "run complete");

    if config.json {
        println!("{}", report::render_json(&result)?);
    } else {
        print!("{}", report::render(&technique, &result, config.quiet));
    }

    Ok(ExitCode::SUCCESS)
}

fn run_sweep(config: &Config) -> anyhow::Result<ExitCode> {
    let techniques = [
        Technique::Vrc,
        Technique::Lrc,
        Technique::from_name("crc", Some(&config.generator))?,
        Technique::Checksum,
    ];
    let mut totals: Vec<DetectionMetrics> = techniques
        .iter()
        .map(|t| DetectionMetrics::new(t.name()))
        .collect();

    info!(
        trials = config.trials,
        max_length = config.max_length,
        seed = config.seed,
        "starting sweep"
    );

    // Inputs come from one seeded stream so the sweep does not depend on
    // how many workers run it.
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut inputs: Vec<BitString> = Vec::with_capacity(config.trials);
    for _ in 0..config.trials {
        let len = rng.gen_range(1..=config.max_length);
        inputs.push(generate_bits(&mut rng, len).parse()?);
    }

    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let chunk_size = inputs.len().div_ceil(workers).max(1);
    debug!(workers, chunk_size, "sweep inputs generated");

    let batches = std::thread::scope(|scope| {
        let techniques = &techniques;
        let handles: Vec<_> = inputs
            .chunks(chunk_size)
            .map(|chunk| scope.spawn(move || sweep_batch(techniques, chunk)))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                let batch = handle
                    .join()
                    .map_err(|_| anyhow::anyhow!("sweep worker panicked"))??;
                Ok(batch)
            })
            .collect::<anyhow::Result<Vec<_>>>()
    })?;

    for batch in &batches {
        for (total, part) in totals.iter_mut().zip(batch) {
            total.merge(part);
        }
    }

    for total in &mut totals {
        total.complete();
        if config.quiet {
            print!("{}", total.export_text());
        } else if config.print_metrics {
            total.print_summary();
        }
    }
    if !config.quiet {
        for total in &totals {
            total.print_result();
        }
    }

    let false_alarms: u64 = totals.iter().map(|m| m.false_alarms).sum();
    if false_alarms > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Tally every technique over `inputs`, clean and with bit 0 flipped.
fn sweep_batch(
    techniques: &[Technique],
    inputs: &[BitString],
) -> errdetect_core::Result<Vec<DetectionMetrics>> {
    let mut tallies: Vec<DetectionMetrics> = techniques
        .iter()
        .map(|t| DetectionMetrics::new(t.name()))
        .collect();

    for data in inputs {
        for (technique, tally) in techniques.iter().zip(tallies.iter_mut()) {
            for introduce_error in [false, true] {
                tally.record(&errdetect_core::run(technique, data, introduce_error)?);
            }
        }
    }

    Ok(tallies)
}

fn run_server(config: &Config) -> anyhow::Result<ExitCode> {
    let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
    runtime.block_on(server::serve(&config.bind_addr))?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_inputs(seed: u64, count: usize) -> Vec<BitString> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                let len = rng.gen_range(1..=24);
                generate_bits(&mut rng, len).parse().unwrap()
            })
            .collect()
    }

    #[test]
    fn test_sweep_batch_tallies_every_technique() {
        let inputs = sample_inputs(8, 20);
        let tallies = sweep_batch(&Technique::all(), &inputs).unwrap();

        assert_eq!(tallies.len(), 4);
        for tally in &tallies {
            assert_eq!(tally.clean_runs, 20);
            assert_eq!(tally.corrupted_runs, 20);
            assert_eq!(tally.false_alarms, 0);
            assert_eq!(tally.missed, 0);
        }
    }

    #[test]
    fn test_merged_batches_match_single_batch() {
        let techniques = Technique::all();
        let inputs = sample_inputs(21, 30);

        let whole = sweep_batch(&techniques, &inputs).unwrap();
        let mut merged = sweep_batch(&techniques, &inputs[..11]).unwrap();
        let rest = sweep_batch(&techniques, &inputs[11..]).unwrap();
        for (total, part) in merged.iter_mut().zip(&rest) {
            total.merge(part);
        }

        for (a, b) in merged.iter().zip(&whole) {
            assert_eq!(a.total_runs(), b.total_runs());
            assert_eq!(a.detected, b.detected);
            assert_eq!(a.payload_bits, b.payload_bits);
            assert_eq!(a.overhead_bits, b.overhead_bits);
            assert_eq!(a.total_steps, b.total_steps);
        }
    }
}
