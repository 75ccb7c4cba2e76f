//! Decoder for variable-length (ragged) feature columns.

use fds_common::{Result, error::Error};
use fds_format::SchemaNode;
use fds_wire::BinaryDecoder;

use crate::buffer::ValueBuffer;
use crate::dtype::DataType;
use crate::element::Element;
use crate::metadata::VarlenMetadata;

use super::validate_nested_primitive;

/// Decodes a column that is wire-identical to a dense nested-array column but
/// has no fixed dimensions. Each element lands in the value buffer as if it
/// came from a sparse column: one value plus one coordinate row
/// `(row_offset, p0, .., p{r-1})`, where the positions advance
/// lexicographically with the nested traversal. Empty inner arrays produce
/// no elements and no rows.
#[derive(Debug)]
pub struct VarlenDecoder {
    dtype: DataType,
    indices_index: usize,
    values_index: usize,
    rank: usize,
}

impl VarlenDecoder {
    pub(crate) fn bind(node: &SchemaNode, metadata: &VarlenMetadata) -> Result<VarlenDecoder> {
        let rank = metadata.shape.rank();
        if rank == 0 {
            return Err(Error::invalid_arg(
                "shape",
                format!("varlen feature '{}' requires rank >= 1", metadata.name),
            ));
        }
        validate_nested_primitive(node, &metadata.name, metadata.dtype, rank)?;
        Ok(VarlenDecoder {
            dtype: metadata.dtype,
            indices_index: metadata.indices_index,
            values_index: metadata.values_index,
            rank,
        })
    }

    pub(crate) fn decode(
        &self,
        decoder: &mut BinaryDecoder,
        buffer: &mut ValueBuffer,
        row_offset: usize,
    ) -> Result<()> {
        match self.dtype {
            DataType::Int32 => self.decode_typed::<i32>(decoder, buffer, row_offset),
            DataType::Int64 => self.decode_typed::<i64>(decoder, buffer, row_offset),
            DataType::Float32 => self.decode_typed::<f32>(decoder, buffer, row_offset),
            DataType::Float64 => self.decode_typed::<f64>(decoder, buffer, row_offset),
            DataType::Bool => self.decode_typed::<bool>(decoder, buffer, row_offset),
            DataType::String | DataType::Bytes => {
                self.decode_typed::<Vec<u8>>(decoder, buffer, row_offset)
            }
        }
    }

    fn decode_typed<T: Element>(
        &self,
        decoder: &mut BinaryDecoder,
        buffer: &mut ValueBuffer,
        row_offset: usize,
    ) -> Result<()> {
        // Validate both slots before touching the wire.
        buffer.indices_mut(self.indices_index)?;
        T::buffer_values_mut(buffer, self.values_index)?;

        let mut positions = vec![0i64; self.rank];
        let count = self.decode_level::<T>(decoder, buffer, 0, &mut positions, row_offset)?;
        buffer.add_elements(self.indices_index, count)
    }

    fn decode_level<T: Element>(
        &self,
        decoder: &mut BinaryDecoder,
        buffer: &mut ValueBuffer,
        level: usize,
        positions: &mut Vec<i64>,
        row_offset: usize,
    ) -> Result<usize> {
        let innermost = level + 1 == self.rank;
        positions[level] = 0;
        let mut count = 0;
        let mut block = decoder.array_start()?;
        while block != 0 {
            for _ in 0..block {
                if innermost {
                    let value = T::decode(decoder)?;
                    T::buffer_values_mut(buffer, self.values_index)?.push(value);
                    let rows = buffer.indices_mut(self.indices_index)?;
                    rows.push(row_offset as i64);
                    rows.extend_from_slice(&positions[..]);
                    count += 1;
                } else {
                    count +=
                        self.decode_level::<T>(decoder, buffer, level + 1, positions, row_offset)?;
                }
                positions[level] += 1;
            }
            block = decoder.array_next()?;
        }
        Ok(count)
    }
}
