//! Transport-agnostic validation service: the unary calls plus streaming.
//!
//! Every call builds its own candidates and datasets; the service itself only
//! holds immutable configuration, so it can be shared across threads freely.

use tracing::{debug, info};

use crate::benches::{self, BenchParams, BenchmarkEngine};
use crate::contract::{all_passed, ContractValidator, RepresentationCounts, ValidationResult};
use crate::dataset;
use crate::error::{Error, Result};
use crate::generated::{GeneratedType, PerformanceTestMessage, ValidationTestMessage};
use crate::harness::{BenchConfig, Deadline};
use crate::schema::{
    BenchmarkRequest, BenchmarkResponse, ValidateTypesRequest, ValidateTypesResponse,
};
use crate::stream::{StreamTransport, StreamingProcessor};
use crate::summary::summarize;

/// Suffix appended to scenario ids of populated-instance checks.
pub const POPULATED_SUFFIX: &str = "[populated]";

/// Element count per field for populated-instance checks.
const DEEP_SAMPLE_SIZE: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scenario {
    Basic,
    Performance,
}

impl Scenario {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "basic" => Some(Scenario::Basic),
            "performance" => Some(Scenario::Performance),
            _ => None,
        }
    }

    /// Recognized scenarios in `labels`, or all of them if none is recognized.
    fn select(labels: &[String]) -> Vec<Scenario> {
        let wanted: Vec<Scenario> = labels.iter().filter_map(|l| Self::from_label(l)).collect();
        [Scenario::Basic, Scenario::Performance]
            .into_iter()
            .filter(|s| wanted.is_empty() || wanted.contains(s))
            .collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct ValidationService {
    config: BenchConfig,
    validator: ContractValidator,
}

impl ValidationService {
    pub fn new(config: BenchConfig) -> Self {
        Self {
            config,
            validator: ContractValidator::default(),
        }
    }

    pub fn validate_types(
        &self,
        request: &ValidateTypesRequest,
        deadline: &Deadline,
    ) -> Result<ValidateTypesResponse> {
        deadline.check("validate_types")?;

        let scenarios = Scenario::select(&request.scenarios);
        let mut results = Vec::new();

        for scenario in &scenarios {
            let candidate: Box<dyn GeneratedType> = match scenario {
                Scenario::Basic => Box::new(ValidationTestMessage::default()),
                Scenario::Performance => Box::new(PerformanceTestMessage::default()),
            };
            results.extend(self.validator.validate(candidate.as_ref()));
        }

        if request.deep_validation {
            results.extend(self.validate_populated(&scenarios, deadline)?);
        }

        let counts = RepresentationCounts::tally(&results);
        let success = all_passed(&results);
        debug!(
            results = results.len() as u64,
            success,
            deep = request.deep_validation,
            "validate_types"
        );

        Ok(ValidateTypesResponse {
            success,
            results,
            value_collection_count: counts.value_collection,
            reference_collection_count: counts.reference_collection,
        })
    }

    /// Second phase of `validate_types`: the same contracts against populated
    /// instances.
    fn validate_populated(
        &self,
        scenarios: &[Scenario],
        deadline: &Deadline,
    ) -> Result<Vec<ValidationResult>> {
        deadline.check("deep_validation")?;
        let mut results = Vec::new();
        for scenario in scenarios {
            let candidate: Box<dyn GeneratedType> = match scenario {
                Scenario::Basic => Box::new(dataset::validation_message(
                    DEEP_SAMPLE_SIZE,
                    DEEP_SAMPLE_SIZE,
                    DEEP_SAMPLE_SIZE,
                    self.config.seed,
                )),
                Scenario::Performance => Box::new(dataset::populated_performance_message(
                    DEEP_SAMPLE_SIZE,
                    self.config.seed,
                )),
            };
            results.extend(
                self.validator
                    .validate(candidate.as_ref())
                    .into_iter()
                    .map(with_populated_suffix),
            );
        }
        Ok(results)
    }

    pub fn run_benchmarks(
        &self,
        request: &BenchmarkRequest,
        deadline: &Deadline,
    ) -> Result<BenchmarkResponse> {
        let params = BenchParams::new(request.iterations, request.data_size)?;
        deadline.check("run_benchmarks")?;

        let selection = benches::select(&request.names);
        let engine = BenchmarkEngine::new(self.config.clone());
        let results = engine.run_selected(&params, &selection, deadline)?;
        let summary = summarize(&results);

        info!(
            improvement_ratio = summary.improvement_ratio,
            memory_savings_bytes = summary.memory_savings_bytes,
            "run_benchmarks"
        );

        Ok(BenchmarkResponse {
            success: !results.is_empty(),
            results,
            summary,
        })
    }

    /// Serve one streaming connection to completion.
    pub fn stream_validate<T: StreamTransport>(&self, transport: &mut T) -> Result<usize> {
        StreamingProcessor::new(self.validator).run(transport)
    }

    /// Smoke check: the `basic` scenario must validate cleanly.
    pub fn readiness(&self) -> Result<()> {
        let request = ValidateTypesRequest {
            scenarios: vec!["basic".to_string()],
            deep_validation: false,
        };
        let response = self.validate_types(&request, &Deadline::none())?;
        if response.success {
            Ok(())
        } else {
            let failed = response.results.iter().filter(|r| !r.passed).count();
            Err(Error::NotReady(format!("{failed} representation contract(s) failing")))
        }
    }
}

fn with_populated_suffix(mut result: ValidationResult) -> ValidationResult {
    result.scenario_id.push_str(POPULATED_SUFFIX);
    result
}
