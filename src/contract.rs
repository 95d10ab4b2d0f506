//! Field representation contracts and the validator that checks them.

use serde::{Deserialize, Serialize};

use crate::generated::{
    DataPoint, Element, GeneratedType, Metadata, MetricPoint, PerformanceTestMessage,
    ProcessingResult, ValidationTestMessage,
};

/// Actual descriptor reported when a candidate does not expose a contracted field.
pub const MISSING_DESCRIPTOR: &str = "<missing>";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepresentationKind {
    /// Elements stored inline in one buffer.
    ValueCollection,
    /// Each element separately allocated behind a `Box`.
    ReferenceCollection,
}

impl RepresentationKind {
    pub fn descriptor(&self, element_type: &str) -> String {
        match self {
            RepresentationKind::ValueCollection => format!("Vec<{element_type}>"),
            RepresentationKind::ReferenceCollection => format!("Vec<Box<{element_type}>>"),
        }
    }

    /// Recover the kind from a descriptor produced by [`Self::descriptor`].
    pub fn classify(descriptor: &str) -> Option<Self> {
        let inner = descriptor.strip_prefix("Vec<")?.strip_suffix('>')?;
        if inner.starts_with("Box<") && inner.ends_with('>') {
            Some(RepresentationKind::ReferenceCollection)
        } else if inner.is_empty() {
            None
        } else {
            Some(RepresentationKind::ValueCollection)
        }
    }
}

/// Expected representation for one field of one generated message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldContract {
    pub message: &'static str,
    pub field_name: &'static str,
    pub expected_kind: RepresentationKind,
    pub element_type: &'static str,
}

impl FieldContract {
    pub const fn value(
        message: &'static str,
        field_name: &'static str,
        element_type: &'static str,
    ) -> Self {
        Self {
            message,
            field_name,
            expected_kind: RepresentationKind::ValueCollection,
            element_type,
        }
    }

    pub const fn reference(
        message: &'static str,
        field_name: &'static str,
        element_type: &'static str,
    ) -> Self {
        Self {
            message,
            field_name,
            expected_kind: RepresentationKind::ReferenceCollection,
            element_type,
        }
    }

    pub fn scenario_id(&self) -> String {
        format!("{}.{}", self.message, self.field_name)
    }

    pub fn expected_descriptor(&self) -> String {
        self.expected_kind.descriptor(self.element_type)
    }
}

/// Every field the generator is expected to emit, with its representation.
pub static FIELD_CONTRACTS: &[FieldContract] = &[
    FieldContract::value(
        ValidationTestMessage::TYPE_NAME,
        "value_slice_data",
        <DataPoint as Element>::TYPE_NAME,
    ),
    FieldContract::reference(
        ValidationTestMessage::TYPE_NAME,
        "pointer_slice_data",
        <DataPoint as Element>::TYPE_NAME,
    ),
    FieldContract::value(
        ValidationTestMessage::TYPE_NAME,
        "metrics",
        <MetricPoint as Element>::TYPE_NAME,
    ),
    FieldContract::value(
        PerformanceTestMessage::TYPE_NAME,
        "value_slice_data",
        <DataPoint as Element>::TYPE_NAME,
    ),
    FieldContract::reference(
        PerformanceTestMessage::TYPE_NAME,
        "pointer_slice_data",
        <Metadata as Element>::TYPE_NAME,
    ),
    FieldContract::value(
        PerformanceTestMessage::TYPE_NAME,
        "results",
        <ProcessingResult as Element>::TYPE_NAME,
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub scenario_id: String,
    pub passed: bool,
    pub expected_descriptor: String,
    pub actual_descriptor: String,
    pub error_message: String,
}

impl ValidationResult {
    /// `passed` and `error_message` are derived from the two descriptors.
    pub fn compare(scenario_id: String, expected: String, actual: String) -> Self {
        let passed = expected == actual;
        let error_message = if passed {
            String::new()
        } else {
            format!("expected {expected}, got {actual}")
        };
        Self {
            scenario_id,
            passed,
            expected_descriptor: expected,
            actual_descriptor: actual,
            error_message,
        }
    }

    pub fn actual_kind(&self) -> Option<RepresentationKind> {
        RepresentationKind::classify(&self.actual_descriptor)
    }
}

/// How many validated fields resolved to each representation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentationCounts {
    pub value_collection: u32,
    pub reference_collection: u32,
}

impl RepresentationCounts {
    pub fn tally(results: &[ValidationResult]) -> Self {
        let mut counts = Self::default();
        for result in results {
            match result.actual_kind() {
                Some(RepresentationKind::ValueCollection) => counts.value_collection += 1,
                Some(RepresentationKind::ReferenceCollection) => counts.reference_collection += 1,
                None => {}
            }
        }
        counts
    }
}

pub fn all_passed(results: &[ValidationResult]) -> bool {
    results.iter().all(|r| r.passed)
}

#[derive(Clone, Copy, Debug)]
pub struct ContractValidator {
    registry: &'static [FieldContract],
}

impl Default for ContractValidator {
    fn default() -> Self {
        Self::new(FIELD_CONTRACTS)
    }
}

impl ContractValidator {
    pub fn new(registry: &'static [FieldContract]) -> Self {
        Self { registry }
    }

    pub fn contracts_for<'a>(&self, message: &'a str) -> impl Iterator<Item = &'static FieldContract> + 'a {
        let registry = self.registry;
        registry.iter().filter(move |c| c.message == message)
    }

    /// One result per registry contract naming the candidate's type.
    pub fn validate(&self, candidate: &dyn GeneratedType) -> Vec<ValidationResult> {
        let fields = candidate.fields();
        self.contracts_for(candidate.type_name())
            .map(|contract| {
                let actual = fields
                    .iter()
                    .find(|f| f.name == contract.field_name)
                    .map(|f| f.descriptor())
                    .unwrap_or_else(|| MISSING_DESCRIPTOR.to_string());
                ValidationResult::compare(contract.scenario_id(), contract.expected_descriptor(), actual)
            })
            .collect()
    }
}
