//! Typed access to wire reads, value-buffer slots and tensor storage.

use fds_common::{Result, error::Error};
use fds_wire::BinaryDecoder;

use crate::buffer::ValueBuffer;
use crate::tensor::{DenseTensor, TensorValues};

/// An element type a feature column can materialize as.
///
/// The trait ties together the three places a typed value flows through: the
/// wire read that produces it, the per-dtype vector group of the
/// [`ValueBuffer`] it lands in for sparse and varlen columns, and the
/// [`DenseTensor`] storage it lands in for dense columns. Decoders are
/// generic over `Element` and are instantiated per dtype at bind time.
///
/// Byte strings (`Vec<u8>`) serve both the `String` and `Bytes` dtypes.
pub trait Element: Sized + Clone {
    fn decode(decoder: &mut BinaryDecoder) -> Result<Self>;

    fn buffer_values(buffer: &ValueBuffer, index: usize) -> Option<&Vec<Self>>;

    fn buffer_values_mut(buffer: &mut ValueBuffer, index: usize) -> Result<&mut Vec<Self>>;

    fn tensor_values(tensor: &DenseTensor) -> Result<&Vec<Self>>;

    fn tensor_values_mut(tensor: &mut DenseTensor) -> Result<&mut Vec<Self>>;
}

fn no_values_slot(index: usize) -> Error {
    Error::invalid_arg(
        "values_index",
        format!("buffer has no values slot {index} for this dtype"),
    )
}

fn tensor_type_mismatch(expected: &str) -> Error {
    Error::invalid_arg(
        "tensor",
        format!("dense tensor does not hold {expected} elements"),
    )
}

macro_rules! impl_element {
    ($ty:ty, $decode:ident, $buffer_field:ident, $tensor_variant:ident, $label:literal) => {
        impl Element for $ty {
            fn decode(decoder: &mut BinaryDecoder) -> Result<Self> {
                decoder.$decode()
            }

            fn buffer_values(buffer: &ValueBuffer, index: usize) -> Option<&Vec<Self>> {
                buffer.$buffer_field.get(index)
            }

            fn buffer_values_mut(
                buffer: &mut ValueBuffer,
                index: usize,
            ) -> Result<&mut Vec<Self>> {
                buffer
                    .$buffer_field
                    .get_mut(index)
                    .ok_or_else(|| no_values_slot(index))
            }

            fn tensor_values(tensor: &DenseTensor) -> Result<&Vec<Self>> {
                match &tensor.values {
                    TensorValues::$tensor_variant(v) => Ok(v),
                    _ => Err(tensor_type_mismatch($label)),
                }
            }

            fn tensor_values_mut(tensor: &mut DenseTensor) -> Result<&mut Vec<Self>> {
                match &mut tensor.values {
                    TensorValues::$tensor_variant(v) => Ok(v),
                    _ => Err(tensor_type_mismatch($label)),
                }
            }
        }
    };
}

impl_element!(i32, decode_int, int32_values, Int32, "int32");
impl_element!(i64, decode_long, int64_values, Int64, "int64");
impl_element!(f32, decode_float, float_values, Float32, "float32");
impl_element!(f64, decode_double, double_values, Float64, "float64");
impl_element!(bool, decode_bool, bool_values, Bool, "bool");
impl_element!(Vec<u8>, decode_bytes, string_values, Bytes, "byte-string");
