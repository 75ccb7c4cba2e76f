//! Generic decode destinations for skipped columns.

use std::sync::Arc;

use fds_common::{Result, error::Error};
use fds_format::{BasicType, SchemaNode};
use fds_wire::BinaryDecoder;

/// A discriminated value mirroring a schema node: primitive, array, union or
/// record. Skipped columns decode into a `Datum` purely to keep the byte
/// stream aligned; the value is observable but otherwise discarded.
///
/// String and bytes columns both decode into [`Datum::Bytes`].
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    Array(Vec<Datum>),
    Record(Vec<Datum>),
    Union { branch: usize, value: Box<Datum> },
}

impl Datum {
    /// Builds the default-shaped value for a schema node: zero primitives,
    /// empty arrays and byte strings, records of defaults, unions resting on
    /// their first branch.
    pub fn empty(node: &SchemaNode) -> Datum {
        match node.basic_type() {
            BasicType::Null => Datum::Null,
            BasicType::Boolean => Datum::Boolean(false),
            BasicType::Int => Datum::Int(0),
            BasicType::Long => Datum::Long(0),
            BasicType::Float => Datum::Float(0.0),
            BasicType::Double => Datum::Double(0.0),
            BasicType::Bytes | BasicType::String => Datum::Bytes(Vec::new()),
            BasicType::Array => Datum::Array(Vec::new()),
            BasicType::Record => Datum::Record(
                node.children()
                    .iter()
                    .map(|child| Datum::empty(child))
                    .collect(),
            ),
            BasicType::Union => Datum::Union {
                branch: 0,
                value: Box::new(
                    node.children()
                        .first()
                        .map(|branch| Datum::empty(branch))
                        .unwrap_or(Datum::Null),
                ),
            },
        }
    }

    /// Decodes one value shaped by `node` from the wire.
    pub fn decode(node: &SchemaNode, decoder: &mut BinaryDecoder) -> Result<Datum> {
        match node.basic_type() {
            BasicType::Null => Ok(Datum::Null),
            BasicType::Boolean => Ok(Datum::Boolean(decoder.decode_bool()?)),
            BasicType::Int => Ok(Datum::Int(decoder.decode_int()?)),
            BasicType::Long => Ok(Datum::Long(decoder.decode_long()?)),
            BasicType::Float => Ok(Datum::Float(decoder.decode_float()?)),
            BasicType::Double => Ok(Datum::Double(decoder.decode_double()?)),
            BasicType::Bytes | BasicType::String => Ok(Datum::Bytes(decoder.decode_bytes()?)),
            BasicType::Array => {
                let items_node = node.child_at(0);
                let mut items = Vec::new();
                let mut count = decoder.array_start()?;
                while count != 0 {
                    for _ in 0..count {
                        items.push(Datum::decode(items_node, decoder)?);
                    }
                    count = decoder.array_next()?;
                }
                Ok(Datum::Array(items))
            }
            BasicType::Record => {
                let mut fields = Vec::with_capacity(node.child_count());
                for child in node.children() {
                    fields.push(Datum::decode(child, decoder)?);
                }
                Ok(Datum::Record(fields))
            }
            BasicType::Union => {
                let branch = decoder.decode_union_index()?;
                let branch_node = node.children().get(branch).ok_or_else(|| {
                    Error::decode(format!(
                        "union branch index {branch} out of range for {} branches",
                        node.child_count()
                    ))
                })?;
                Ok(Datum::Union {
                    branch,
                    value: Box::new(Datum::decode(branch_node, decoder)?),
                })
            }
        }
    }
}

/// One slot of the skipped-data sink: the schema node a skipped column was
/// bound to and the value decoded from the most recent record.
#[derive(Debug, Clone)]
pub struct SkippedDatum {
    node: Arc<SchemaNode>,
    value: Datum,
}

impl SkippedDatum {
    pub(crate) fn new(node: Arc<SchemaNode>) -> SkippedDatum {
        let value = Datum::empty(&node);
        SkippedDatum { node, value }
    }

    pub fn node(&self) -> &SchemaNode {
        &self.node
    }

    pub fn value(&self) -> &Datum {
        &self.value
    }

    /// Overwrites the held value with the next record's column.
    pub(crate) fn decode_from(&mut self, decoder: &mut BinaryDecoder) -> Result<()> {
        self.value = Datum::decode(&self.node, decoder)?;
        Ok(())
    }
}
