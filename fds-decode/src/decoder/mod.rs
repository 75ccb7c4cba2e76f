//! Per-column feature decoders.
//!
//! A compiled column plan holds one [`FeatureDecoder`] per schema column.
//! The enum wraps the concrete decoder shapes and dispatches the single
//! decode-one-record operation; a nullable column is the inner decoder
//! wrapped in the [`FeatureDecoder::Nullable`] variant rather than a separate
//! object, so the hot path pays no extra indirection beyond the union-index
//! read.

use fds_common::{Result, error::Error};
use fds_format::SchemaNode;
use fds_wire::BinaryDecoder;

use crate::buffer::ValueBuffer;
use crate::datum::SkippedDatum;
use crate::dtype::DataType;
use crate::tensor::DenseTensor;

pub mod dense;
pub mod skipped;
pub mod sparse;
pub mod varlen;

pub use dense::DenseDecoder;
pub use skipped::SkippedDecoder;
pub use sparse::SparseDecoder;
pub use varlen::VarlenDecoder;

/// Decoder for one schema column, bound at initialization time.
#[derive(Debug)]
pub enum FeatureDecoder {
    Dense(DenseDecoder),
    Sparse(SparseDecoder),
    Varlen(VarlenDecoder),
    Skipped(SkippedDecoder),
    Nullable(NullableDecoder),
}

/// A nullable column: the carrier decoder plus the union branch index that
/// carries the value. Reading any other branch is a null-value error.
#[derive(Debug)]
pub struct NullableDecoder {
    name: String,
    non_null_branch: usize,
    inner: Box<FeatureDecoder>,
}

impl NullableDecoder {
    pub(crate) fn new(
        name: impl Into<String>,
        non_null_branch: usize,
        inner: FeatureDecoder,
    ) -> NullableDecoder {
        NullableDecoder {
            name: name.into(),
            non_null_branch,
            inner: Box::new(inner),
        }
    }
}

impl FeatureDecoder {
    /// Consumes exactly this column's bytes from the wire, writing declared
    /// output into `tensors` or `buffer` and skipped output into `skipped`.
    pub fn decode(
        &self,
        decoder: &mut BinaryDecoder,
        tensors: &mut [DenseTensor],
        buffer: &mut ValueBuffer,
        skipped: &mut [SkippedDatum],
        row_offset: usize,
    ) -> Result<()> {
        match self {
            FeatureDecoder::Dense(d) => d.decode(decoder, tensors, row_offset),
            FeatureDecoder::Sparse(d) => d.decode(decoder, buffer, row_offset),
            FeatureDecoder::Varlen(d) => d.decode(decoder, buffer, row_offset),
            FeatureDecoder::Skipped(d) => d.decode(decoder, skipped),
            FeatureDecoder::Nullable(n) => {
                let branch = decoder.decode_union_index()?;
                if branch != n.non_null_branch {
                    return Err(Error::null_value(&n.name));
                }
                n.inner.decode(decoder, tensors, buffer, skipped, row_offset)
            }
        }
    }
}

/// Checks that `node` is a nest of `rank` array levels around a primitive
/// carrying `dtype`. Rank 0 means the primitive itself.
pub(crate) fn validate_nested_primitive(
    node: &SchemaNode,
    name: &str,
    dtype: DataType,
    rank: usize,
) -> Result<()> {
    let mut current = node;
    for _ in 0..rank {
        if current.basic_type() != fds_format::BasicType::Array {
            return Err(carrier_mismatch(name, dtype, rank, node));
        }
        current = current.child_at(0);
    }
    if !dtype.matches(current.basic_type()) {
        return Err(carrier_mismatch(name, dtype, rank, node));
    }
    Ok(())
}

pub(crate) fn carrier_mismatch(
    name: &str,
    dtype: DataType,
    rank: usize,
    node: &SchemaNode,
) -> Error {
    Error::schema_mismatch(
        name,
        format!("{dtype} column of rank {rank}"),
        node.to_json().to_string(),
    )
}
