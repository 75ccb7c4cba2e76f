//! Test-data generation utilities for the FDS decoder crates.
//!
//! This crate fabricates what the decoder consumes in tests: schema JSON in
//! the FeaturizedDataset conventions, generic [`fds_decode::Datum`] values,
//! and the binary wire bytes for whole records. Encoding lives here, not in
//! the product crates; the decoder never writes the wire format.

pub mod data_gen;
pub mod schema_gen;

pub use data_gen::{BinaryEncoder, ByteArray, IntoDatum, encode, null_datum, nullable, sparse_datum};
pub use schema_gen::FdsSchemaBuilder;
