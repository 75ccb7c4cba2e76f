//! Decoder for dense feature columns.

use fds_common::{Result, error::Error};
use fds_format::SchemaNode;
use fds_wire::BinaryDecoder;

use crate::dtype::DataType;
use crate::element::Element;
use crate::metadata::DenseMetadata;
use crate::tensor::DenseTensor;

use super::validate_nested_primitive;

/// Decodes one fixed-shape column per record into the destination tensor at
/// the batch row's flat offset.
#[derive(Debug)]
pub struct DenseDecoder {
    dtype: DataType,
    tensor_index: usize,
    rank: usize,
    element_count: usize,
}

impl DenseDecoder {
    /// Validates the carrier node against the metadata and compiles the
    /// decoder. The carrier must be `rank` nested arrays around a primitive
    /// matching the dtype, and every dense dimension must be fixed.
    pub(crate) fn bind(node: &SchemaNode, metadata: &DenseMetadata) -> Result<DenseDecoder> {
        let rank = metadata.shape.rank();
        let element_count = metadata.shape.known_element_count().ok_or_else(|| {
            Error::invalid_arg(
                "shape",
                format!(
                    "dense feature '{}' requires a fully defined shape, got {}",
                    metadata.name, metadata.shape
                ),
            )
        })?;
        validate_nested_primitive(node, &metadata.name, metadata.dtype, rank)?;
        Ok(DenseDecoder {
            dtype: metadata.dtype,
            tensor_index: metadata.tensor_index,
            rank,
            element_count,
        })
    }

    pub(crate) fn decode(
        &self,
        decoder: &mut BinaryDecoder,
        tensors: &mut [DenseTensor],
        row_offset: usize,
    ) -> Result<()> {
        match self.dtype {
            DataType::Int32 => self.decode_typed::<i32>(decoder, tensors, row_offset),
            DataType::Int64 => self.decode_typed::<i64>(decoder, tensors, row_offset),
            DataType::Float32 => self.decode_typed::<f32>(decoder, tensors, row_offset),
            DataType::Float64 => self.decode_typed::<f64>(decoder, tensors, row_offset),
            DataType::Bool => self.decode_typed::<bool>(decoder, tensors, row_offset),
            DataType::String | DataType::Bytes => {
                self.decode_typed::<Vec<u8>>(decoder, tensors, row_offset)
            }
        }
    }

    fn decode_typed<T: Element>(
        &self,
        decoder: &mut BinaryDecoder,
        tensors: &mut [DenseTensor],
        row_offset: usize,
    ) -> Result<()> {
        let tensor = tensors.get_mut(self.tensor_index).ok_or_else(|| {
            Error::invalid_arg(
                "tensor_index",
                format!("no destination tensor at index {}", self.tensor_index),
            )
        })?;
        let values = T::tensor_values_mut(tensor)?;
        let start = row_offset * self.element_count;
        let end = start + self.element_count;
        if end > values.len() {
            return Err(Error::invalid_arg(
                "row_offset",
                format!(
                    "row {row_offset} does not fit the destination tensor \
                     ({} elements per row, {} total)",
                    self.element_count,
                    values.len()
                ),
            ));
        }
        let out = &mut values[start..end];

        let mut written = 0;
        decode_level::<T>(decoder, self.rank, out, &mut written)?;
        if written != self.element_count {
            return Err(Error::decode(format!(
                "dense column yielded {written} elements, shape requires {}",
                self.element_count
            )));
        }
        Ok(())
    }
}

fn decode_level<T: Element>(
    decoder: &mut BinaryDecoder,
    levels_left: usize,
    out: &mut [T],
    written: &mut usize,
) -> Result<()> {
    if levels_left == 0 {
        if *written >= out.len() {
            return Err(Error::decode(
                "dense column yielded more elements than its shape holds",
            ));
        }
        out[*written] = T::decode(decoder)?;
        *written += 1;
        return Ok(());
    }
    let mut count = decoder.array_start()?;
    while count != 0 {
        for _ in 0..count {
            decode_level::<T>(decoder, levels_left - 1, out, written)?;
        }
        count = decoder.array_next()?;
    }
    Ok(())
}
