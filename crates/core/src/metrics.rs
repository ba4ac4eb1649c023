//! Detection statistics over many runs.
//!
//! A [`DetectionMetrics`] tallies results for one technique:
//! - Clean vs corrupted runs
//! - Detected and missed corruptions
//! - False alarms (clean frames rejected)
//! - Payload and redundancy bit counts
//!
//! # Thread Safety
//!
//! Not thread-safe. Keep one instance per worker and [`merge`] at the end.
//!
//! [`merge`]: DetectionMetrics::merge

use std::time::{Duration, Instant};

use crate::outcome::DetectionResult;

/// Tallies for one technique across a batch of runs.
#[derive(Debug, Clone)]
pub struct DetectionMetrics {
    /// Technique name these counts belong to
    pub technique: String,

    // === Timing ===
    /// When the batch started
    pub start_time: Instant,

    /// When the batch ended (set on completion)
    pub end_time: Option<Instant>,

    // === Runs ===
    /// Runs whose frame crossed the channel unchanged
    pub clean_runs: u64,

    /// Runs whose frame was altered by the channel
    pub corrupted_runs: u64,

    // === Verdicts ===
    /// Corrupted runs the receiver rejected
    pub detected: u64,

    /// Corrupted runs the receiver accepted
    pub missed: u64,

    /// Clean runs the receiver rejected
    pub false_alarms: u64,

    // === Volume ===
    /// Original data bits across all runs
    pub payload_bits: u64,

    /// Padding and check bits added across all runs
    pub overhead_bits: u64,

    /// Steps recorded across all runs
    pub total_steps: u64,
}

impl DetectionMetrics {
    /// Create empty metrics with start time set to now.
    pub fn new(technique: impl Into<String>) -> Self {
        Self {
            technique: technique.into(),
            start_time: Instant::now(),
            end_time: None,
            clean_runs: 0,
            corrupted_runs: 0,
            detected: 0,
            missed: 0,
            false_alarms: 0,
            payload_bits: 0,
            overhead_bits: 0,
            total_steps: 0,
        }
    }

    /// Tally one result.
    pub fn record(&mut self, result: &DetectionResult) {
        if result.was_corrupted() {
            self.corrupted_runs += 1;
            if result.error_detected {
                self.detected += 1;
            } else {
                self.missed += 1;
            }
        } else {
            self.clean_runs += 1;
            if result.error_detected {
                self.false_alarms += 1;
            }
        }

        self.payload_bits += result.original_data.len() as u64;
        self.overhead_bits += result.overhead_bits() as u64;
        self.total_steps += result.trace.len() as u64;
    }

    /// Fold another batch for the same technique into this one.
    pub fn merge(&mut self, other: &DetectionMetrics) {
        self.clean_runs += other.clean_runs;
        self.corrupted_runs += other.corrupted_runs;
        self.detected += other.detected;
        self.missed += other.missed;
        self.false_alarms += other.false_alarms;
        self.payload_bits += other.payload_bits;
        self.overhead_bits += other.overhead_bits;
        self.total_steps += other.total_steps;
    }

    /// Mark the batch as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Total duration (or elapsed so far if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    pub fn total_runs(&self) -> u64 {
        self.clean_runs + self.corrupted_runs
    }

    /// Detected / corrupted. Returns 0.0 if nothing was corrupted.
    pub fn detection_rate(&self) -> f64 {
        if self.corrupted_runs == 0 {
            0.0
        } else {
            self.detected as f64 / self.corrupted_runs as f64
        }
    }

    /// False alarms / clean runs.
    pub fn false_alarm_rate(&self) -> f64 {
        if self.clean_runs == 0 {
            0.0
        } else {
            self.false_alarms as f64 / self.clean_runs as f64
        }
    }

    /// Added bits per payload bit.
    pub fn overhead_ratio(&self) -> f64 {
        if self.payload_bits == 0 {
            0.0
        } else {
            self.overhead_bits as f64 / self.payload_bits as f64
        }
    }

    /// Average steps per run.
    pub fn mean_steps(&self) -> f64 {
        let runs = self.total_runs();
        if runs == 0 {
            0.0
        } else {
            self.total_steps as f64 / runs as f64
        }
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("=== {} ===", self.technique.to_uppercase());
        println!(
            "Runs: {} ({} clean, {} corrupted)",
            self.total_runs(),
            self.clean_runs,
            self.corrupted_runs
        );
        println!(
            "Detected: {} / {} ({:.2}%)",
            self.detected,
            self.corrupted_runs,
            self.detection_rate() * 100.0
        );
        println!("Missed: {}", self.missed);
        println!(
            "False alarms: {} ({:.2}%)",
            self.false_alarms,
            self.false_alarm_rate() * 100.0
        );
        println!(
            "Overhead: {} bits over {} payload bits ({:.1}%)",
            self.overhead_bits,
            self.payload_bits,
            self.overhead_ratio() * 100.0
        );
        println!("Mean steps per run: {:.1}", self.mean_steps());
        println!("Duration: {} ms", self.duration().as_millis());
        println!();
    }

    /// One-line verdict for the batch.
    pub fn print_result(&self) {
        if self.false_alarms > 0 {
            println!(
                "✗ {}: {} false alarms on clean frames",
                self.technique, self.false_alarms
            );
        } else if self.missed > 0 {
            println!(
                "~ {}: {} corruptions slipped through",
                self.technique, self.missed
            );
        } else {
            println!(
                "✓ {}: every corruption detected, no false alarms",
                self.technique
            );
        }
    }

    /// Export as `key=value` lines (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "technique={}\n\
             duration_ms={}\n\
             clean_runs={}\n\
             corrupted_runs={}\n\
             detected={}\n\
             missed={}\n\
             false_alarms={}\n\
             detection_rate={:.4}\n\
             overhead_ratio={:.4}\n\
             total_steps={}\n",
            self.technique,
            self.duration().as_millis(),
            self.clean_runs,
            self.corrupted_runs,
            self.detected,
            self.missed,
            self.false_alarms,
            self.detection_rate(),
            self.overhead_ratio(),
            self.total_steps,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::BitString;
    use crate::vrc;

    fn bs(text: &str) -> BitString {
        text.parse().unwrap()
    }

    #[test]
    fn test_metrics_creation() {
        let metrics = DetectionMetrics::new("vrc");
        assert!(metrics.end_time.is_none());
        assert_eq!(metrics.total_runs(), 0);
        assert_eq!(metrics.detection_rate(), 0.0);
    }

    #[test]
    fn test_record_clean_and_corrupted() {
        let mut metrics = DetectionMetrics::new("vrc");
        metrics.record(&vrc::run(&bs("1001001"), false).unwrap());
        metrics.record(&vrc::run(&bs("1001001"), true).unwrap());

        assert_eq!(metrics.clean_runs, 1);
        assert_eq!(metrics.corrupted_runs, 1);
        assert_eq!(metrics.detected, 1);
        assert_eq!(metrics.false_alarms, 0);
        assert_eq!(metrics.payload_bits, 14);
        assert_eq!(metrics.overhead_bits, 2);
        assert_eq!(metrics.detection_rate(), 1.0);
    }

    #[test]
    fn test_merge() {
        let mut a = DetectionMetrics::new("vrc");
        a.record(&vrc::run(&bs("1"), true).unwrap());
        let mut b = DetectionMetrics::new("vrc");
        b.record(&vrc::run(&bs("10"), false).unwrap());

        a.merge(&b);
        assert_eq!(a.total_runs(), 2);
        assert_eq!(a.payload_bits, 3);
    }

    #[test]
    fn test_export_text() {
        let mut metrics = DetectionMetrics::new("crc");
        metrics.corrupted_runs = 4;
        metrics.detected = 3;
        metrics.missed = 1;
        metrics.complete();

        let text = metrics.export_text();
        assert!(text.contains("technique=crc"));
        assert!(text.contains("detected=3"));
        assert!(text.contains("detection_rate=0.7500"));
    }
}
