//! Synthetic dataset factories for the representation benchmarks.
//!
//! Every benchmark builds its own dataset through these functions, sized by
//! the caller; nothing is cached between calls. Numeric fields are a pure
//! function of the element index, so a reduction over a dataset has a known
//! result:
//!
//! ```text
//!   id        = "dp_<i>"
//!   value     = i * 1.5
//!   timestamp = 1_000_000 + i
//!   tags      = 0..=2 labels drawn from a ChaCha8 stream seeded by `seed`
//! ```

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::generated::{
    DataPoint, Metadata, MetricPoint, PerformanceTestMessage, ProcessingResult,
    ValidationTestMessage,
};

const TAG_VOCABULARY: &[&str] = &["cpu", "memory", "io", "network", "latency", "batch"];

/// Base of the synthetic timestamp sequence.
const TIMESTAMP_BASE: i64 = 1_000_000;

fn synthetic_point(index: usize, rng: &mut ChaCha8Rng) -> DataPoint {
    let tag_count = rng.gen_range(0..=2);
    let tags = TAG_VOCABULARY
        .choose_multiple(rng, tag_count)
        .map(|t| t.to_string())
        .collect();

    DataPoint {
        id: format!("dp_{index}"),
        value: index as f64 * 1.5,
        timestamp: TIMESTAMP_BASE + index as i64,
        tags,
    }
}

/// `count` points stored inline.
pub fn value_points(count: usize, seed: u64) -> Vec<DataPoint> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|i| synthetic_point(i, &mut rng)).collect()
}

/// The same `count` points, each behind its own allocation.
pub fn reference_points(count: usize, seed: u64) -> Vec<Box<DataPoint>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count).map(|i| Box::new(synthetic_point(i, &mut rng))).collect()
}

/// Sum of `value` over a dataset of `count` points.
pub fn expected_sum(count: usize) -> f64 {
    // 1.5 * (0 + 1 + ... + count-1)
    let n = count as f64;
    1.5 * n * (n - 1.0) / 2.0
}

/// Fresh message holding `count` default points; one buffer allocation.
pub fn blank_performance_message(count: usize) -> PerformanceTestMessage {
    PerformanceTestMessage {
        value_slice_data: vec![DataPoint::default(); count],
        ..Default::default()
    }
}

/// Fixed-size payload for the serialization benchmark.
pub fn performance_message(count: usize, seed: u64) -> PerformanceTestMessage {
    PerformanceTestMessage {
        value_slice_data: value_points(count, seed),
        ..Default::default()
    }
}

/// Message with every collection field populated.
pub fn populated_performance_message(count: usize, seed: u64) -> PerformanceTestMessage {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let value_slice_data = (0..count).map(|i| synthetic_point(i, &mut rng)).collect();
    let pointer_slice_data = (0..count)
        .map(|i| {
            let mut attributes = BTreeMap::new();
            attributes.insert("version".to_string(), "1.0".to_string());
            Box::new(Metadata {
                key: format!("key_{i}"),
                value: format!("value_{i}"),
                attributes,
            })
        })
        .collect();
    let results = (0..count)
        .map(|i| ProcessingResult {
            operation_id: format!("op_{i}"),
            success: true,
            duration_ms: rng.gen_range(0.5..50.0),
            error_messages: Vec::new(),
        })
        .collect();

    PerformanceTestMessage {
        value_slice_data,
        pointer_slice_data,
        results,
    }
}

/// Stream payload with `values` inline points, `references` boxed points and
/// `metrics` metric points.
pub fn validation_message(
    values: usize,
    references: usize,
    metrics: usize,
    seed: u64,
) -> ValidationTestMessage {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let value_slice_data = (0..values).map(|i| synthetic_point(i, &mut rng)).collect();
    let pointer_slice_data = (0..references)
        .map(|i| Box::new(synthetic_point(values + i, &mut rng)))
        .collect();
    let metrics = (0..metrics)
        .map(|i| {
            let mut labels = BTreeMap::new();
            labels.insert("env".to_string(), "bench".to_string());
            MetricPoint {
                name: format!("metric_{i}"),
                measurement: rng.gen_range(0.0..1.0),
                labels,
            }
        })
        .collect();

    ValidationTestMessage {
        value_slice_data,
        pointer_slice_data,
        metrics,
    }
}
