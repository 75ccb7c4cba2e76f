use fds_common::Result;

use crate::dtype::DataType;
use crate::element::Element;

/// Flat typed storage behind a dense tensor, one variant per dtype group.
/// String and Bytes dtypes share the byte-string variant.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TensorValues {
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Bool(Vec<bool>),
    Bytes(Vec<Vec<u8>>),
}

/// A driver-owned destination tensor with a fixed shape.
///
/// The decoder only observes the shape and writes elements at flat offsets;
/// for batched decoding the driver supplies a tensor shaped
/// `(batch_size, d0, d1, ...)` and each record writes the flat slice starting
/// at `row_offset * d0 * d1 * ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseTensor {
    dtype: DataType,
    shape: Vec<usize>,
    pub(crate) values: TensorValues,
}

impl DenseTensor {
    /// Creates a tensor of the given shape filled with default elements
    /// (zero, `false`, or the empty byte string).
    pub fn zeroed(dtype: DataType, shape: impl Into<Vec<usize>>) -> DenseTensor {
        let shape = shape.into();
        let len = shape.iter().product();
        let values = match dtype {
            DataType::Int32 => TensorValues::Int32(vec![0; len]),
            DataType::Int64 => TensorValues::Int64(vec![0; len]),
            DataType::Float32 => TensorValues::Float32(vec![0.0; len]),
            DataType::Float64 => TensorValues::Float64(vec![0.0; len]),
            DataType::Bool => TensorValues::Bool(vec![false; len]),
            DataType::String | DataType::Bytes => TensorValues::Bytes(vec![Vec::new(); len]),
        };
        DenseTensor {
            dtype,
            shape,
            values,
        }
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The total number of elements across all dimensions.
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// The flat element storage, typed.
    ///
    /// Fails when `T` does not match the tensor's dtype.
    pub fn values<T: Element>(&self) -> Result<&[T]> {
        T::tensor_values(self).map(Vec::as_slice)
    }

    pub fn values_mut<T: Element>(&mut self) -> Result<&mut Vec<T>> {
        T::tensor_values_mut(self)
    }
}
