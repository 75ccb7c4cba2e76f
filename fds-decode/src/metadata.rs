use crate::dtype::DataType;
use crate::shape::PartialShape;

/// How a schema column materializes. `Skipped` is never declared by the
/// caller; it is assigned at bind time to every column no metadata matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Dense,
    Sparse,
    Varlen,
    Skipped,
}

/// A feature materialized as a dense tensor.
///
/// `tensor_index` selects the destination tensor in the driver-supplied
/// vector. Rank 0 declares a scalar column; all dimensions of a dense shape
/// must be fixed.
#[derive(Debug, Clone)]
pub struct DenseMetadata {
    pub name: String,
    pub dtype: DataType,
    pub shape: PartialShape,
    pub tensor_index: usize,
}

impl DenseMetadata {
    pub fn new(
        name: impl Into<String>,
        dtype: DataType,
        shape: PartialShape,
        tensor_index: usize,
    ) -> DenseMetadata {
        DenseMetadata {
            name: name.into(),
            dtype,
            shape,
            tensor_index,
        }
    }
}

/// A feature materialized as a coordinate-list sparse tensor.
///
/// `indices_index` selects the coordinate vector (and the per-column element
/// counter) in the value buffer; `values_index` selects the slot within the
/// per-dtype value vector group.
#[derive(Debug, Clone)]
pub struct SparseMetadata {
    pub name: String,
    pub dtype: DataType,
    pub shape: PartialShape,
    pub indices_index: usize,
    pub values_index: usize,
}

impl SparseMetadata {
    pub fn new(
        name: impl Into<String>,
        dtype: DataType,
        shape: PartialShape,
        indices_index: usize,
        values_index: usize,
    ) -> SparseMetadata {
        SparseMetadata {
            name: name.into(),
            dtype,
            shape,
            indices_index,
            values_index,
        }
    }
}

/// A feature that is dense on the wire but materializes as a ragged tensor.
///
/// At the buffer level a varlen column is represented exactly like a sparse
/// column whose coordinates are the nested-array traversal positions.
#[derive(Debug, Clone)]
pub struct VarlenMetadata {
    pub name: String,
    pub dtype: DataType,
    pub shape: PartialShape,
    pub indices_index: usize,
    pub values_index: usize,
}

impl VarlenMetadata {
    pub fn new(
        name: impl Into<String>,
        dtype: DataType,
        shape: PartialShape,
        indices_index: usize,
        values_index: usize,
    ) -> VarlenMetadata {
        VarlenMetadata {
            name: name.into(),
            dtype,
            shape,
            indices_index,
            values_index,
        }
    }
}
