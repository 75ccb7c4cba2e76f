//! Decoder for schema columns no metadata declared.

use fds_common::{Result, error::Error};
use fds_wire::BinaryDecoder;

use crate::datum::SkippedDatum;

/// Consumes an undeclared column into its slot of the skipped-data sink.
/// The decoded value only serves to keep the stream aligned for the columns
/// that follow.
#[derive(Debug)]
pub struct SkippedDecoder {
    datum_index: usize,
}

impl SkippedDecoder {
    pub(crate) fn new(datum_index: usize) -> SkippedDecoder {
        SkippedDecoder { datum_index }
    }

    pub(crate) fn decode(
        &self,
        decoder: &mut BinaryDecoder,
        skipped: &mut [SkippedDatum],
    ) -> Result<()> {
        let slot = skipped.get_mut(self.datum_index).ok_or_else(|| {
            Error::invalid_arg(
                "skipped_data",
                format!("sink has no slot {}", self.datum_index),
            )
        })?;
        slot.decode_from(decoder)
    }
}
