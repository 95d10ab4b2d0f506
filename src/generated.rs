//! Candidate data types as emitted by the code generator.
//!
//! Each message lists its collection fields as [`FieldView`]s. A field view can
//! only be built with [`FieldView::values`] from a `&[T]` of elements or with
//! [`FieldView::references`] from a `&[Box<T>]`, and `Box<T>` never implements
//! [`Element`]. The representation kind of a field is therefore fixed by its
//! Rust type at compile time and does not depend on how many elements it holds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::contract::RepresentationKind;

/// A generated element type that may appear inside a collection field.
pub trait Element {
    const TYPE_NAME: &'static str;
}

/// A generated message type whose collection fields can be inspected.
pub trait GeneratedType {
    fn type_name(&self) -> &'static str;

    fn fields(&self) -> Vec<FieldView>;

    /// Number of elements across all collection fields.
    fn items_processed(&self) -> usize {
        self.fields().iter().map(|f| f.len).sum()
    }
}

/// Type-level description of one collection field of a message instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldView {
    pub name: &'static str,
    pub kind: RepresentationKind,
    pub element_type: &'static str,
    pub len: usize,
}

impl FieldView {
    pub fn values<T: Element>(name: &'static str, items: &[T]) -> Self {
        Self {
            name,
            kind: RepresentationKind::ValueCollection,
            element_type: T::TYPE_NAME,
            len: items.len(),
        }
    }

    pub fn references<T: Element>(name: &'static str, items: &[Box<T>]) -> Self {
        Self {
            name,
            kind: RepresentationKind::ReferenceCollection,
            element_type: T::TYPE_NAME,
            len: items.len(),
        }
    }

    pub fn descriptor(&self) -> String {
        self.kind.descriptor(self.element_type)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub id: String,
    pub value: f64,
    pub timestamp: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub name: String,
    pub measurement: f64,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub operation_id: String,
    pub success: bool,
    pub duration_ms: f64,
    #[serde(default)]
    pub error_messages: Vec<String>,
}

impl Element for DataPoint {
    const TYPE_NAME: &'static str = "DataPoint";
}

impl Element for MetricPoint {
    const TYPE_NAME: &'static str = "MetricPoint";
}

impl Element for Metadata {
    const TYPE_NAME: &'static str = "Metadata";
}

impl Element for ProcessingResult {
    const TYPE_NAME: &'static str = "ProcessingResult";
}

/// Message whose `value_slice_data` and `metrics` fields are generated inline,
/// with `pointer_slice_data` left as boxed elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationTestMessage {
    #[serde(default)]
    pub value_slice_data: Vec<DataPoint>,
    #[serde(default)]
    pub pointer_slice_data: Vec<Box<DataPoint>>,
    #[serde(default)]
    pub metrics: Vec<MetricPoint>,
}

impl ValidationTestMessage {
    pub const TYPE_NAME: &'static str = "ValidationTestMessage";
}

impl GeneratedType for ValidationTestMessage {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            FieldView::values("value_slice_data", &self.value_slice_data),
            FieldView::references("pointer_slice_data", &self.pointer_slice_data),
            FieldView::values("metrics", &self.metrics),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceTestMessage {
    #[serde(default)]
    pub value_slice_data: Vec<DataPoint>,
    #[serde(default)]
    pub pointer_slice_data: Vec<Box<Metadata>>,
    #[serde(default)]
    pub results: Vec<ProcessingResult>,
}

impl PerformanceTestMessage {
    pub const TYPE_NAME: &'static str = "PerformanceTestMessage";
}

impl GeneratedType for PerformanceTestMessage {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn fields(&self) -> Vec<FieldView> {
        vec![
            FieldView::values("value_slice_data", &self.value_slice_data),
            FieldView::references("pointer_slice_data", &self.pointer_slice_data),
            FieldView::values("results", &self.results),
        ]
    }
}
