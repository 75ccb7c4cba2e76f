//! Datum construction and binary encoding of test records.

use fds_decode::Datum;

/// Writes the binary wire encoding, mirroring what the decoder reads: zig-zag
/// varints, little-endian floats, one-byte booleans, length-prefixed byte
/// strings, single-block arrays with a zero terminator, and index-prefixed
/// unions.
#[derive(Default)]
pub struct BinaryEncoder {
    buf: Vec<u8>,
}

impl BinaryEncoder {
    pub fn new() -> BinaryEncoder {
        BinaryEncoder::default()
    }

    fn write_varint(&mut self, mut n: u64) {
        loop {
            let byte = (n & 0x7f) as u8;
            n >>= 7;
            if n == 0 {
                self.buf.push(byte);
                return;
            }
            self.buf.push(byte | 0x80);
        }
    }

    fn write_zigzag(&mut self, v: i64) {
        self.write_varint(((v << 1) ^ (v >> 63)) as u64);
    }

    pub fn encode_int(&mut self, v: i32) {
        self.write_zigzag(i64::from(v));
    }

    pub fn encode_long(&mut self, v: i64) {
        self.write_zigzag(v);
    }

    pub fn encode_float(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn encode_double(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn encode_bool(&mut self, v: bool) {
        self.buf.push(v as u8);
    }

    pub fn encode_bytes(&mut self, v: &[u8]) {
        self.write_zigzag(v.len() as i64);
        self.buf.extend_from_slice(v);
    }

    pub fn encode_union_index(&mut self, index: usize) {
        self.write_zigzag(index as i64);
    }

    /// Writes an array as one block of `len` elements (when non-empty)
    /// followed by the zero terminator. The caller encodes the elements
    /// between `begin_array` and `end_array`.
    pub fn begin_array(&mut self, len: usize) {
        if len != 0 {
            self.write_zigzag(len as i64);
        }
    }

    pub fn end_array(&mut self) {
        self.write_zigzag(0);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Encodes a datum tree to wire bytes. A record datum encodes as its fields
/// concatenated in order with no framing, exactly as a full FDS row does.
pub fn encode(datum: &Datum) -> Vec<u8> {
    let mut encoder = BinaryEncoder::new();
    encode_datum(datum, &mut encoder);
    encoder.into_bytes()
}

fn encode_datum(datum: &Datum, encoder: &mut BinaryEncoder) {
    match datum {
        Datum::Null => {}
        Datum::Boolean(v) => encoder.encode_bool(*v),
        Datum::Int(v) => encoder.encode_int(*v),
        Datum::Long(v) => encoder.encode_long(*v),
        Datum::Float(v) => encoder.encode_float(*v),
        Datum::Double(v) => encoder.encode_double(*v),
        Datum::Bytes(v) => encoder.encode_bytes(v),
        Datum::Array(items) => {
            encoder.begin_array(items.len());
            for item in items {
                encode_datum(item, encoder);
            }
            encoder.end_array();
        }
        Datum::Record(fields) => {
            for field in fields {
                encode_datum(field, encoder);
            }
        }
        Datum::Union { branch, value } => {
            encoder.encode_union_index(*branch);
            encode_datum(value, encoder);
        }
    }
}

/// Conversion of plain Rust values into [`Datum`] trees.
pub trait IntoDatum {
    fn into_datum(self) -> Datum;
}

impl IntoDatum for Datum {
    fn into_datum(self) -> Datum {
        self
    }
}

impl IntoDatum for i32 {
    fn into_datum(self) -> Datum {
        Datum::Int(self)
    }
}

impl IntoDatum for i64 {
    fn into_datum(self) -> Datum {
        Datum::Long(self)
    }
}

impl IntoDatum for f32 {
    fn into_datum(self) -> Datum {
        Datum::Float(self)
    }
}

impl IntoDatum for f64 {
    fn into_datum(self) -> Datum {
        Datum::Double(self)
    }
}

impl IntoDatum for bool {
    fn into_datum(self) -> Datum {
        Datum::Boolean(self)
    }
}

impl IntoDatum for &str {
    fn into_datum(self) -> Datum {
        Datum::Bytes(self.as_bytes().to_vec())
    }
}

impl IntoDatum for String {
    fn into_datum(self) -> Datum {
        Datum::Bytes(self.into_bytes())
    }
}

impl<T: IntoDatum> IntoDatum for Vec<T> {
    fn into_datum(self) -> Datum {
        Datum::Array(self.into_iter().map(IntoDatum::into_datum).collect())
    }
}

/// A raw byte-string element, for bytes-carrier columns.
#[derive(Debug, Clone)]
pub struct ByteArray(pub Vec<u8>);

impl IntoDatum for ByteArray {
    fn into_datum(self) -> Datum {
        Datum::Bytes(self.0)
    }
}

/// Wraps a value as the non-null branch of a `[null, T]` union.
pub fn nullable(value: impl IntoDatum) -> Datum {
    Datum::Union {
        branch: 1,
        value: Box::new(value.into_datum()),
    }
}

/// The null branch of a `[null, T]` union.
pub fn null_datum() -> Datum {
    Datum::Union {
        branch: 0,
        value: Box::new(Datum::Null),
    }
}

/// Builds the sub-record datum of a sparse column.
///
/// `indices[k]` carries dimension `k`'s coordinate array; `order` lists the
/// sub-record's field layout exactly as given to
/// [`crate::FdsSchemaBuilder::add_sparse_feature_with_order`]: entry `i` is
/// the logical field at position `i`, with the value `rank` standing for
/// `values` and any other value `K` for `indicesK`.
pub fn sparse_datum<V: IntoDatum>(indices: &[Vec<i64>], values: Vec<V>, order: &[usize]) -> Datum {
    let rank = indices.len();
    assert_eq!(order.len(), rank + 1, "order must cover indices plus values");
    let mut values_datum = Some(values.into_datum());
    let fields = order
        .iter()
        .map(|&slot| {
            if slot == rank {
                values_datum.take().expect("order names 'values' once")
            } else {
                indices[slot].clone().into_datum()
            }
        })
        .collect();
    Datum::Record(fields)
}
