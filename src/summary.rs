//! Comparative summary of a benchmark run.

use crate::benches::{ALLOCATION, REFERENCE_ITERATION, SERIALIZATION, VALUE_ITERATION};
use crate::schema::{BenchmarkResult, BenchmarkSummary, RatioStatus};

/// Ratio reported when it cannot be computed.
pub const DEFAULT_IMPROVEMENT_RATIO: f64 = 1.0;

/// `improvement_ratio = reference / value`, or 1.0 when either duration is
/// zero or missing. Names other than the four canonical ones are ignored.
pub fn summarize(results: &[BenchmarkResult]) -> BenchmarkSummary {
    let mut value_ns = 0.0_f64;
    let mut reference_ns = 0.0_f64;
    let mut memory_bytes: u64 = 0;

    for r in results {
        match r.name.as_str() {
            VALUE_ITERATION => value_ns = r.duration_ns as f64,
            REFERENCE_ITERATION => reference_ns = r.duration_ns as f64,
            ALLOCATION | SERIALIZATION => {
                memory_bytes = memory_bytes.saturating_add(r.bytes_allocated)
            }
            _ => {}
        }
    }

    let (improvement_ratio, ratio_status) = if value_ns > 0.0 && reference_ns > 0.0 {
        let ratio = reference_ns / value_ns;
        if ratio.is_finite() {
            (ratio, RatioStatus::Computed)
        } else {
            (DEFAULT_IMPROVEMENT_RATIO, RatioStatus::NotComputed)
        }
    } else {
        (DEFAULT_IMPROVEMENT_RATIO, RatioStatus::NotComputed)
    };

    BenchmarkSummary {
        value_avg_duration_ns: value_ns,
        reference_avg_duration_ns: reference_ns,
        improvement_ratio,
        ratio_status,
        memory_savings_bytes: memory_bytes,
    }
}
