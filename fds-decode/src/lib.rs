//! Columnar feature decoding for FeaturizedDataset records.
//!
//! A [`FdsDecoder`] binds user-declared feature metadata to a record schema
//! once, compiling a per-column decoder plan, and then executes that plan
//! against the binary wire decoder for every record of a batch. Declared
//! features land in driver-owned [`tensor::DenseTensor`]s or in the shared
//! [`buffer::ValueBuffer`]; every other schema column is consumed into a
//! generic skipped-data sink to keep the stream aligned.

pub mod buffer;
pub mod datum;
pub mod decoder;
pub mod dtype;
pub mod element;
pub mod fds_decoder;
pub mod metadata;
pub mod shape;
pub mod tensor;

pub use buffer::ValueBuffer;
pub use datum::{Datum, SkippedDatum};
pub use dtype::DataType;
pub use fds_decoder::FdsDecoder;
pub use metadata::{DenseMetadata, FeatureKind, SparseMetadata, VarlenMetadata};
pub use shape::PartialShape;
pub use tensor::DenseTensor;
