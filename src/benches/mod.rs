//! The four canonical representation benchmarks.
//!
//! Each benchmark builds its dataset from [`crate::dataset`] before the timer
//! starts and runs entirely on the calling thread. The allocation behaviour of
//! every benchmark is stated up front by its [`AllocationModel`]; reported
//! `allocation_count` is derived from the model, and the reduction loops are
//! checked against it by a counting-allocator test.


use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::harness::{BenchConfig, Deadline, Measured};
use crate::schema::BenchmarkResult;

pub const VALUE_ITERATION: &str = "value_collection.iteration";
pub const REFERENCE_ITERATION: &str = "reference_collection.iteration";
pub const ALLOCATION: &str = "allocation";
pub const SERIALIZATION: &str = "serialization";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Benchmark {
    ValueIteration,
    ReferenceIteration,
    Allocation,
    Serialization,
}

/// Where a benchmark allocates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocationModel {
    /// Container allocations made while building the dataset, per element
    /// (`per_element`) and in total regardless of size (`fixed`).
    pub construction_fixed: u64,
    pub construction_per_element: u64,
    /// Top-level allocations inside one timed iteration.
    pub timed_per_iteration: u64,
}

impl AllocationModel {
    pub fn construction_allocations(&self, data_size: usize) -> u64 {
        self.construction_fixed + self.construction_per_element * data_size as u64
    }
}

impl Benchmark {
    pub const ALL: [Benchmark; 4] = [
        Benchmark::ValueIteration,
        Benchmark::ReferenceIteration,
        Benchmark::Allocation,
        Benchmark::Serialization,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Benchmark::ValueIteration => VALUE_ITERATION,
            Benchmark::ReferenceIteration => REFERENCE_ITERATION,
            Benchmark::Allocation => ALLOCATION,
            Benchmark::Serialization => SERIALIZATION,
        }
    }

    fn alias(&self) -> &'static str {
        match self {
            Benchmark::ValueIteration => "value_slice",
            Benchmark::ReferenceIteration => "pointer_slice",
            Benchmark::Allocation => "memory",
            Benchmark::Serialization => "serialization",
        }
    }

    /// Looks up a benchmark by canonical name or short alias.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.name() == name || b.alias() == name)
    }

    pub fn allocation_model(&self) -> AllocationModel {
        match self {
            // One contiguous buffer; the reduction only reads it.
            Benchmark::ValueIteration => AllocationModel {
                construction_fixed: 1,
                construction_per_element: 0,
                timed_per_iteration: 0,
            },
            // Buffer of pointers plus one box per element; the reduction only reads.
            Benchmark::ReferenceIteration => AllocationModel {
                construction_fixed: 1,
                construction_per_element: 1,
                timed_per_iteration: 0,
            },
            Benchmark::Allocation => AllocationModel {
                construction_fixed: 0,
                construction_per_element: 0,
                timed_per_iteration: 1,
            },
            // Output buffer of each encode.
            Benchmark::Serialization => AllocationModel {
                construction_fixed: 1,
                construction_per_element: 0,
                timed_per_iteration: 1,
            },
        }
    }

    fn run(&self, cfg: &BenchConfig, params: &BenchParams) -> BenchmarkResult {
        match self {
            Benchmark::ValueIteration => iteration::run_value(cfg, params),
            Benchmark::ReferenceIteration => iteration::run_reference(cfg, params),
            Benchmark::Allocation => allocation::run(cfg, params),
            Benchmark::Serialization => serialization::run(cfg, params),
        }
    }

    pub(crate) fn result(&self, m: &Measured, bytes_allocated: u64) -> BenchmarkResult {
        BenchmarkResult {
            name: self.name().to_string(),
            iterations: m.iters,
            warmup_iters: m.warmup_iters,
            duration_ns: m.total_ns,
            allocation_count: self.allocation_model().timed_per_iteration * m.iters,
            bytes_allocated,
            throughput: m.throughput(),
        }
    }
}

/// Resolve requested names to benchmarks. Unknown names are skipped; an empty
/// or fully unknown selection means every benchmark.
pub fn select(names: &[String]) -> Vec<Benchmark> {
    let mut selected: Vec<Benchmark> = Vec::new();
    for name in names {
        match Benchmark::from_name(name) {
            Some(b) if !selected.contains(&b) => selected.push(b),
            Some(_) => {}
            None => debug!(name = name.as_str(), "ignoring unknown benchmark name"),
        }
    }
    if selected.is_empty() {
        return Benchmark::ALL.to_vec();
    }
    // Canonical order regardless of request order.
    Benchmark::ALL
        .into_iter()
        .filter(|b| selected.contains(b))
        .collect()
}

/// Validated benchmark parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BenchParams {
    iterations: u64,
    data_size: usize,
}

impl BenchParams {
    pub fn new(iterations: i64, data_size: i64) -> Result<Self> {
        if iterations <= 0 {
            return Err(Error::InvalidArgument("iterations must be > 0".to_string()));
        }
        if data_size <= 0 {
            return Err(Error::InvalidArgument("data_size must be > 0".to_string()));
        }
        let data_size = usize::try_from(data_size)
            .map_err(|_| Error::InvalidArgument(format!("data_size {data_size} is too large")))?;
        Ok(Self {
            iterations: iterations as u64,
            data_size,
        })
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn data_size(&self) -> usize {
        self.data_size
    }
}

#[derive(Clone, Debug, Default)]
pub struct BenchmarkEngine {
    config: BenchConfig,
}

impl BenchmarkEngine {
    pub fn new(config: BenchConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, params: &BenchParams, deadline: &Deadline) -> Result<Vec<BenchmarkResult>> {
        self.run_selected(params, &Benchmark::ALL, deadline)
    }

    /// Runs `selection` in order. The deadline is checked before each
    /// benchmark; once it has passed the whole call fails.
    pub fn run_selected(
        &self,
        params: &BenchParams,
        selection: &[Benchmark],
        deadline: &Deadline,
    ) -> Result<Vec<BenchmarkResult>> {
        let mut out = Vec::with_capacity(selection.len());
        for bench in selection {
            deadline.check(bench.name())?;
            let result = bench.run(&self.config, params);
            debug!(
                name = result.name.as_str(),
                duration_ns = result.duration_ns as u64,
                throughput = result.throughput,
                "benchmark finished"
            );
            out.push(result);
        }
        info!(
            iterations = params.iterations(),
            data_size = params.data_size() as u64,
            count = out.len() as u64,
            "benchmarks complete"
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_parameters() {
        assert!(matches!(BenchParams::new(0, 10), Err(Error::InvalidArgument(_))));
        assert!(matches!(BenchParams::new(-1, 10), Err(Error::InvalidArgument(_))));
        assert!(matches!(BenchParams::new(10, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(BenchParams::new(10, -5), Err(Error::InvalidArgument(_))));
        assert!(BenchParams::new(1, 1).is_ok());
    }

    #[test]
    fn runs_four_named_benchmarks() {
        let engine = BenchmarkEngine::default();
        let params = BenchParams::new(50, 20).unwrap();
        let results = engine.run(&params, &Deadline::none()).unwrap();

        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec![VALUE_ITERATION, REFERENCE_ITERATION, ALLOCATION, SERIALIZATION]);
        for r in &results {
            assert_eq!(r.iterations, 50);
        }
    }

    #[test]
    fn allocation_counts_follow_model() {
        let params = BenchParams::new(25, 8).unwrap();
        let results = BenchmarkEngine::default()
            .run(&params, &Deadline::none())
            .unwrap();

        assert_eq!(results[0].allocation_count, 0);
        assert_eq!(results[0].bytes_allocated, 0);
        assert_eq!(results[1].allocation_count, 0);
        assert_eq!(results[1].bytes_allocated, 0);
        assert_eq!(results[2].allocation_count, 25);
        assert_eq!(results[2].bytes_allocated, 25 * 8 * allocation::ESTIMATED_ELEMENT_BYTES);
        assert_eq!(results[3].allocation_count, 25);
        assert!(results[3].bytes_allocated > 0);
    }

    #[test]
    fn expired_deadline_yields_no_results() {
        let params = BenchParams::new(10, 10).unwrap();
        let past = std::time::Instant::now();
        let err = BenchmarkEngine::default()
            .run(&params, &Deadline::at(past))
            .unwrap_err();
        assert!(matches!(err, Error::DeadlineExceeded { .. }));
    }

    #[test]
    fn selection_by_alias_keeps_canonical_order() {
        let names = vec!["pointer_slice".to_string(), "value_slice".to_string()];
        assert_eq!(
            select(&names),
            vec![Benchmark::ValueIteration, Benchmark::ReferenceIteration]
        );
    }

    #[test]
    fn unknown_or_empty_selection_runs_everything() {
        assert_eq!(select(&[]), Benchmark::ALL.to_vec());
        assert_eq!(select(&["nope".to_string()]), Benchmark::ALL.to_vec());
        assert_eq!(
            select(&["serialization".to_string(), "nope".to_string()]),
            vec![Benchmark::Serialization]
        );
    }

    #[test]
    fn reference_model_scales_with_size() {
        let model = Benchmark::ReferenceIteration.allocation_model();
        assert_eq!(model.construction_allocations(100), 101);
        assert_eq!(Benchmark::ValueIteration.allocation_model().construction_allocations(100), 1);
    }
}
