use fds_common::{Result, error::Error};

/// The batch-scoped scratch area for sparse and varlen output.
///
/// The buffer is owned by the batching driver, which sizes the slot vectors
/// up front (one `indices` / `num_of_elements` slot per sparse or varlen
/// column, and one slot in the matching per-dtype value vector group) and
/// threads the buffer through every record of the batch.
///
/// For a column of rank `r` bound to `indices_index` c, `indices[c]` holds
/// one `(r + 1)`-tuple of longs per element: the batch row offset in column
/// 0 followed by the `r` coordinates. `num_of_elements[c]` is the running
/// element count across the records decoded so far. Value vectors only ever
/// grow within a batch.
#[derive(Debug, Clone, Default)]
pub struct ValueBuffer {
    pub bool_values: Vec<Vec<bool>>,
    pub int32_values: Vec<Vec<i32>>,
    pub int64_values: Vec<Vec<i64>>,
    pub float_values: Vec<Vec<f32>>,
    pub double_values: Vec<Vec<f64>>,
    pub string_values: Vec<Vec<Vec<u8>>>,
    pub indices: Vec<Vec<i64>>,
    pub num_of_elements: Vec<usize>,
}

impl ValueBuffer {
    pub fn new() -> ValueBuffer {
        ValueBuffer::default()
    }

    /// Extends `indices[indices_index]` so that it holds `element_count`
    /// complete coordinate rows past `indices_start`, appending new rows with
    /// the batch column pre-filled with `row_offset` and the coordinate
    /// columns zeroed.
    ///
    /// Internal decoders of a sparse column may observe the sub-record fields
    /// in any schema order, so whichever decoder first reaches an element
    /// count reserves the rows; later decoders only write their own column.
    pub(crate) fn ensure_index_rows(
        &mut self,
        indices_index: usize,
        indices_start: usize,
        element_count: usize,
        rank_with_batch: usize,
        row_offset: usize,
    ) -> Result<()> {
        let v = self.indices_mut(indices_index)?;
        let target = indices_start + element_count * rank_with_batch;
        if v.len() < target {
            v.reserve(target - v.len());
            while v.len() < target {
                v.push(row_offset as i64);
                v.extend(std::iter::repeat(0).take(rank_with_batch - 1));
            }
        }
        Ok(())
    }

    pub(crate) fn indices_mut(&mut self, indices_index: usize) -> Result<&mut Vec<i64>> {
        self.indices.get_mut(indices_index).ok_or_else(|| {
            Error::invalid_arg(
                "indices_index",
                format!("buffer has no indices slot {indices_index}"),
            )
        })
    }

    pub(crate) fn add_elements(&mut self, indices_index: usize, count: usize) -> Result<()> {
        let slot = self.num_of_elements.get_mut(indices_index).ok_or_else(|| {
            Error::invalid_arg(
                "indices_index",
                format!("buffer has no element-count slot {indices_index}"),
            )
        })?;
        *slot += count;
        Ok(())
    }
}
