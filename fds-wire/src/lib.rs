//! The binary wire codec for FeaturizedDataset records.
//!
//! Records are encoded with the standard binary rules: zig-zag varints for
//! ints and longs, fixed little-endian floats and doubles, one-byte booleans,
//! length-prefixed byte strings, block-structured arrays and index-prefixed
//! unions. Record fields are concatenated in schema order with no framing.

pub mod decoder;

pub use decoder::BinaryDecoder;
