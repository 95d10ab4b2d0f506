//! Representation contract validation for generated data types.
//!
//! A generated message must lay some collection fields out inline
//! (`Vec<T>`, a value-collection) and others as independently allocated
//! elements (`Vec<Box<T>>`, a reference-collection). This crate checks those
//! contracts, measures what each layout costs, and serves both over a
//! transport-agnostic request/response surface.

pub mod benches;
pub mod contract;
pub mod dataset;
pub mod error;
pub mod generated;
pub mod harness;
pub mod schema;
pub mod service;
pub mod stream;
pub mod summary;
pub mod wire;

pub use error::{Error, Result, TransportError};
pub use service::ValidationService;
