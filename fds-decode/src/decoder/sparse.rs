//! Decoder for sparse (coordinate-list) feature columns.

use fds_common::{Result, error::Error};
use fds_format::{BasicType, SchemaNode};
use fds_wire::BinaryDecoder;

use crate::buffer::ValueBuffer;
use crate::dtype::DataType;
use crate::element::Element;
use crate::metadata::SparseMetadata;

use super::carrier_mismatch;

/// Decodes a sparse column of rank `r`: a sub-record of one `values` field
/// (1-D array of the dtype primitive) and `r` `indicesK` fields (1-D arrays
/// of long coordinates), in whatever order the schema declares them.
///
/// The sub-record's field order is compiled into `fields` at bind time, so
/// decoding never dispatches by field name. The decimal suffix of an
/// `indicesK` field is its logical dimension; it lands in coordinate column
/// `K + 1`, after the batch row column.
#[derive(Debug)]
pub struct SparseDecoder {
    dtype: DataType,
    indices_index: usize,
    values_index: usize,
    rank: usize,
    fields: Vec<InternalDecoder>,
}

/// One sub-field of the sparse record, in schema order.
#[derive(Debug)]
enum InternalDecoder {
    Values,
    Indices { dim: usize },
}

impl SparseDecoder {
    pub(crate) fn bind(node: &SchemaNode, metadata: &SparseMetadata) -> Result<SparseDecoder> {
        let rank = metadata.shape.rank();
        if rank == 0 {
            return Err(Error::invalid_arg(
                "shape",
                format!("sparse feature '{}' requires rank >= 1", metadata.name),
            ));
        }
        if node.basic_type() != BasicType::Record || node.child_count() != rank + 1 {
            return Err(carrier_mismatch(&metadata.name, metadata.dtype, rank, node));
        }

        let mut fields = Vec::with_capacity(rank + 1);
        let mut seen_values = false;
        let mut seen_dims = vec![false; rank];
        for child in node.children() {
            let name = child.name().unwrap_or_default();
            if name == "values" {
                if !is_flat_array_of(child, |t| metadata.dtype.matches(t)) {
                    return Err(carrier_mismatch(&metadata.name, metadata.dtype, rank, node));
                }
                seen_values = true;
                fields.push(InternalDecoder::Values);
            } else if let Some(suffix) = name.strip_prefix("indices") {
                let dim = suffix.parse::<usize>().map_err(|_| {
                    Error::schema_mismatch(
                        &metadata.name,
                        "indices fields with decimal dimension suffixes",
                        format!("field '{name}'"),
                    )
                })?;
                if dim >= rank || seen_dims[dim] {
                    return Err(Error::schema_mismatch(
                        &metadata.name,
                        format!("one indices field per dimension 0..{rank}"),
                        format!("field '{name}'"),
                    ));
                }
                if !is_flat_array_of(child, |t| t == BasicType::Long) {
                    return Err(carrier_mismatch(&metadata.name, metadata.dtype, rank, node));
                }
                seen_dims[dim] = true;
                fields.push(InternalDecoder::Indices { dim });
            } else {
                return Err(Error::schema_mismatch(
                    &metadata.name,
                    "fields named 'values' or 'indicesK'",
                    format!("field '{name}'"),
                ));
            }
        }
        if !seen_values {
            return Err(carrier_mismatch(&metadata.name, metadata.dtype, rank, node));
        }

        Ok(SparseDecoder {
            dtype: metadata.dtype,
            indices_index: metadata.indices_index,
            values_index: metadata.values_index,
            rank,
            fields,
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
        let rank_with_batch = self.rank + 1;
        let indices_start = buffer.indices_mut(self.indices_index)?.len();

        let mut record_count = None;
        for field in &self.fields {
            let count = match field {
                InternalDecoder::Values => decode_values::<T>(
                    decoder,
                    buffer,
                    self.values_index,
                    self.indices_index,
                    indices_start,
                    rank_with_batch,
                    row_offset,
                )?,
                InternalDecoder::Indices { dim } => decode_indices(
                    decoder,
                    buffer,
                    self.indices_index,
                    indices_start,
                    rank_with_batch,
                    *dim,
                    row_offset,
                )?,
            };
            match record_count {
                None => record_count = Some(count),
                Some(expected) if expected != count => {
                    return Err(Error::decode(format!(
                        "sparse sub-fields disagree on the element count: \
                         {expected} vs {count}"
                    )));
                }
                Some(_) => {}
            }
        }

        buffer.add_elements(self.indices_index, record_count.unwrap_or(0))
    }
}

fn is_flat_array_of(node: &SchemaNode, matches: impl Fn(BasicType) -> bool) -> bool {
    node.basic_type() == BasicType::Array && matches(node.child_at(0).basic_type())
}

/// Reads the 1-D values array, appending each element to the column's value
/// vector and reserving coordinate rows as the count grows.
fn decode_values<T: Element>(
    decoder: &mut BinaryDecoder,
    buffer: &mut ValueBuffer,
    values_index: usize,
    indices_index: usize,
    indices_start: usize,
    rank_with_batch: usize,
    row_offset: usize,
) -> Result<usize> {
    let mut count = 0;
    let mut block = decoder.array_start()?;
    while block != 0 {
        {
            let values = T::buffer_values_mut(buffer, values_index)?;
            values.reserve(block);
            for _ in 0..block {
                values.push(T::decode(decoder)?);
            }
        }
        count += block;
        buffer.ensure_index_rows(indices_index, indices_start, count, rank_with_batch, row_offset)?;
        block = decoder.array_next()?;
    }
    Ok(count)
}

/// Reads one 1-D coordinate array into its column of the interleaved rows.
fn decode_indices(
    decoder: &mut BinaryDecoder,
    buffer: &mut ValueBuffer,
    indices_index: usize,
    indices_start: usize,
    rank_with_batch: usize,
    dim: usize,
    row_offset: usize,
) -> Result<usize> {
    let column = dim + 1;
    let mut count = 0;
    let mut block = decoder.array_start()?;
    while block != 0 {
        let block_start = indices_start + count * rank_with_batch;
        count += block;
        buffer.ensure_index_rows(indices_index, indices_start, count, rank_with_batch, row_offset)?;
        let rows = buffer.indices_mut(indices_index)?;
        for i in 0..block {
            rows[block_start + i * rank_with_batch + column] = decoder.decode_long()?;
        }
        block = decoder.array_next()?;
    }
    Ok(count)
}
