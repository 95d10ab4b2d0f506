use serde::{Deserialize, Serialize};

use crate::contract::ValidationResult;
use crate::generated::ValidationTestMessage;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub bench_version: String,
    pub profile: String,
    pub seed: u64,
    pub timestamp_utc: String,
    pub git_sha: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub name: String,

    pub iterations: u64,
    pub warmup_iters: u64,

    pub duration_ns: u128,
    pub allocation_count: u64,
    pub bytes_allocated: u64,

    /// Iterations per second of the timed region.
    pub throughput: f64,
}

impl BenchmarkResult {
    pub fn duration_secs(&self) -> f64 {
        (self.duration_ns as f64) / 1e9
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioStatus {
    Computed,
    /// A source duration was zero or absent; the ratio holds its 1.0 default.
    #[default]
    NotComputed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub value_avg_duration_ns: f64,
    pub reference_avg_duration_ns: f64,
    pub improvement_ratio: f64,
    pub ratio_status: RatioStatus,
    pub memory_savings_bytes: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidateTypesRequest {
    #[serde(default)]
    pub scenarios: Vec<String>,
    #[serde(default)]
    pub deep_validation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateTypesResponse {
    pub success: bool,
    pub results: Vec<ValidationResult>,
    pub value_collection_count: u32,
    pub reference_collection_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRequest {
    pub iterations: i64,
    pub data_size: i64,
    #[serde(default)]
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResponse {
    pub success: bool,
    pub results: Vec<BenchmarkResult>,
    pub summary: BenchmarkSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamRequest {
    pub request_id: String,
    pub sequence_number: i64,
    #[serde(default)]
    pub payload: Option<ValidationTestMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub processing_time_ns: u128,
    pub items_processed: u64,
    pub throughput: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamResponse {
    pub request_id: String,
    pub sequence_number: i64,
    pub success: bool,
    pub message: String,
    pub stats: ProcessingStats,
}

/// JSON document written by the CLI for one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractReport {
    pub run: RunMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ValidateTypesResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmarks: Option<BenchmarkResponse>,
}

impl ContractReport {
    pub fn success(&self) -> bool {
        self.validation.iter().all(|v| v.success)
            && self.benchmarks.as_ref().map_or(true, |b| b.success)
    }
}
