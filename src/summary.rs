//! Per-request outcome recording and end-of-run reporting.
//!
//! Workers record every attempt as a [`RequestOutcome`] so that failures
//! stay observable without aborting the run. The driver merges worker
//! summaries and prints one report, uniform across all modes. Latencies
//! are tracked with HdrHistogram.

use std::collections::HashMap;
use std::time::Duration;

use hdrhistogram::Histogram;
use tracing::warn;

use crate::errors::ErrorCategory;

/// Outcome of one issued request.
#[derive(Debug, Clone)]
pub enum RequestOutcome {
    /// The server responded. Error statuses (4xx/5xx) are categorized as
    /// failures at record time.
    Completed { status: u16, latency: Duration },

    /// The request never completed (connect failure, timeout, ...).
    Failed {
        category: ErrorCategory,
        latency: Duration,
    },
}

/// Latency statistics extracted from the run histogram.
///
/// All values are in microseconds.
#[derive(Debug, Clone)]
pub struct LatencyStats {
    pub count: u64,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
}

impl LatencyStats {
    /// Format statistics as a human-readable string.
    pub fn format(&self) -> String {
        format!(
            "count={}, min={:.2}ms, mean={:.2}ms, p50={:.2}ms, p90={:.2}ms, p99={:.2}ms, max={:.2}ms",
            self.count,
            self.min as f64 / 1000.0,
            self.mean / 1000.0,
            self.p50 as f64 / 1000.0,
            self.p90 as f64 / 1000.0,
            self.p99 as f64 / 1000.0,
            self.max as f64 / 1000.0,
        )
    }
}

/// Aggregated results of a load run.
///
/// Elapsed time is injected by the caller (the driver stamps its own wall
/// clock) so reporting math stays testable with a stubbed duration.
pub struct RunSummary {
    attempted: u64,
    succeeded: u64,
    failed: u64,
    failures_by_category: HashMap<ErrorCategory, u64>,
    /// Latencies from 1us to 60s with 3 significant digits.
    histogram: Histogram<u64>,
    elapsed: Duration,
}

impl RunSummary {
    /// Create an empty summary.
    pub fn new() -> Self {
        let histogram =
            Histogram::new_with_bounds(1, 60_000_000, 3).expect("Failed to create histogram");

        Self {
            attempted: 0,
            succeeded: 0,
            failed: 0,
            failures_by_category: HashMap::new(),
            histogram,
            elapsed: Duration::ZERO,
        }
    }

    /// Record the outcome of one request.
    pub fn record(&mut self, outcome: RequestOutcome) {
        self.attempted += 1;

        let latency = match outcome {
            RequestOutcome::Completed { status, latency } => {
                match ErrorCategory::from_status_code(status) {
                    None => self.succeeded += 1,
                    Some(category) => self.record_failure(category),
                }
                latency
            }
            RequestOutcome::Failed { category, latency } => {
                self.record_failure(category);
                latency
            }
        };

        self.record_latency(latency);
    }

    /// Count `count` requests as failed without latency samples.
    ///
    /// Used when a worker is lost (task join failure) and its requests can
    /// no longer be accounted individually.
    pub fn record_aborted(&mut self, count: u64) {
        self.attempted += count;
        self.failed += count;
        *self
            .failures_by_category
            .entry(ErrorCategory::OtherError)
            .or_insert(0) += count;
    }

    fn record_failure(&mut self, category: ErrorCategory) {
        self.failed += 1;
        *self.failures_by_category.entry(category).or_insert(0) += 1;
    }

    fn record_latency(&mut self, latency: Duration) {
        // Clamp to the histogram's trackable range (1us to 60s)
        let latency_us = (latency.as_micros() as u64).clamp(1, 60_000_000);
        if let Err(e) = self.histogram.record(latency_us) {
            warn!(latency_us, error = %e, "Failed to record latency in histogram");
        }
    }

    /// Fold another worker's summary into this one.
    ///
    /// Counts and histograms are summed; this summary's elapsed time is
    /// kept, since worker wall clocks overlap.
    pub fn merge(&mut self, other: &RunSummary) {
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        for (category, count) in &other.failures_by_category {
            *self.failures_by_category.entry(*category).or_insert(0) += count;
        }
        if let Err(e) = self.histogram.add(&other.histogram) {
            warn!(error = %e, "Failed to merge latency histograms");
        }
    }

    /// Stamp the wall-clock duration of the run.
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    pub fn attempted(&self) -> u64 {
        self.attempted
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Failure count for one category.
    pub fn failures(&self, category: ErrorCategory) -> u64 {
        self.failures_by_category.get(&category).copied().unwrap_or(0)
    }

    /// Requests per second: attempted / elapsed seconds.
    pub fn throughput(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.attempted as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Latency statistics, or None if no latency was recorded.
    pub fn latency_stats(&self) -> Option<LatencyStats> {
        if self.histogram.is_empty() {
            return None;
        }

        Some(LatencyStats {
            count: self.histogram.len(),
            min: self.histogram.min(),
            max: self.histogram.max(),
            mean: self.histogram.mean(),
            p50: self.histogram.value_at_quantile(0.50),
            p90: self.histogram.value_at_quantile(0.90),
            p99: self.histogram.value_at_quantile(0.99),
        })
    }

    /// Format the end-of-run report.
    pub fn format_report(&self, mode: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n--- RUN SUMMARY ({}) ---\n", mode));
        output.push_str(&format!("Requests attempted: {}\n", self.attempted));
        output.push_str(&format!("Succeeded:          {}\n", self.succeeded));
        output.push_str(&format!("Failed:             {}\n", self.failed));

        for category in ErrorCategory::all() {
            let count = self.failures(category);
            if count > 0 {
                output.push_str(&format!("  {:<17} {}\n", format!("{}:", category.label()), count));
            }
        }

        output.push_str(&format!(
            "Elapsed:            {:.2}s\n",
            self.elapsed.as_secs_f64()
        ));
        output.push_str(&format!(
            "Throughput:         {:.2} req/s\n",
            self.throughput()
        ));

        if let Some(stats) = self.latency_stats() {
            output.push_str(&format!("Latency:            {}\n", stats.format()));
        }

        output
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(status: u16, ms: u64) -> RequestOutcome {
        RequestOutcome::Completed {
            status,
            latency: Duration::from_millis(ms),
        }
    }

    #[test]
    fn records_successes_and_failures() {
        let mut summary = RunSummary::new();
        summary.record(completed(200, 10));
        summary.record(completed(301, 12));
        summary.record(completed(404, 8));
        summary.record(RequestOutcome::Failed {
            category: ErrorCategory::NetworkError,
            latency: Duration::from_millis(1),
        });

        assert_eq!(summary.attempted(), 4);
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 2);
        assert_eq!(summary.failures(ErrorCategory::ClientError), 1);
        assert_eq!(summary.failures(ErrorCategory::NetworkError), 1);
    }

    #[test]
    fn throughput_with_stubbed_elapsed() {
        let mut summary = RunSummary::new();
        for _ in 0..100 {
            summary.record(completed(200, 5));
        }
        summary.set_elapsed(Duration::from_secs(4));

        assert!((summary.throughput() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn throughput_zero_elapsed_is_zero() {
        let mut summary = RunSummary::new();
        summary.record(completed(200, 5));
        assert_eq!(summary.throughput(), 0.0);
    }

    #[test]
    fn merge_sums_counts_and_histograms() {
        let mut a = RunSummary::new();
        a.record(completed(200, 10));
        a.record(completed(500, 20));
        a.set_elapsed(Duration::from_secs(1));

        let mut b = RunSummary::new();
        b.record(completed(200, 30));
        b.record(RequestOutcome::Failed {
            category: ErrorCategory::TimeoutError,
            latency: Duration::from_millis(40),
        });

        a.merge(&b);

        assert_eq!(a.attempted(), 4);
        assert_eq!(a.succeeded(), 2);
        assert_eq!(a.failed(), 2);
        assert_eq!(a.failures(ErrorCategory::ServerError), 1);
        assert_eq!(a.failures(ErrorCategory::TimeoutError), 1);
        // merge keeps this summary's elapsed
        assert_eq!(a.elapsed(), Duration::from_secs(1));
        assert_eq!(a.latency_stats().unwrap().count, 4);
    }

    #[test]
    fn record_aborted_counts_as_other_failures() {
        let mut summary = RunSummary::new();
        summary.record_aborted(5);

        assert_eq!(summary.attempted(), 5);
        assert_eq!(summary.failed(), 5);
        assert_eq!(summary.failures(ErrorCategory::OtherError), 5);
        assert!(summary.latency_stats().is_none());
    }

    #[test]
    fn latency_stats_reflect_samples() {
        let mut summary = RunSummary::new();
        summary.record(completed(200, 10));
        summary.record(completed(200, 20));
        summary.record(completed(200, 30));

        let stats = summary.latency_stats().unwrap();
        assert_eq!(stats.count, 3);
        assert!(stats.min <= stats.p50 && stats.p50 <= stats.max);
        // 3 sig-fig histogram: 30ms recorded as ~30_000us
        assert!(stats.max >= 29_000 && stats.max <= 31_000, "max was {}", stats.max);
    }

    #[test]
    fn report_contains_counts_and_throughput() {
        let mut summary = RunSummary::new();
        summary.record(completed(200, 10));
        summary.record(completed(404, 10));
        summary.set_elapsed(Duration::from_secs(2));

        let report = summary.format_report("single");
        assert!(report.contains("RUN SUMMARY (single)"));
        assert!(report.contains("Requests attempted: 2"));
        assert!(report.contains("client_error"));
        assert!(report.contains("Throughput:         1.00 req/s"));
        assert!(report.contains("Latency:"));
    }
}
