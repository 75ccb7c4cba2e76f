use std::fmt;

use fds_format::BasicType;

/// The element type a declared feature materializes as.
///
/// `String` and `Bytes` share the same length-prefixed read path on the wire
/// and both materialize as raw byte strings; they differ only in declared
/// intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    String,
    Bytes,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Bool => "bool",
            DataType::String => "string",
            DataType::Bytes => "bytes",
        }
    }

    /// Whether a primitive schema node of `basic_type` can carry this dtype.
    pub fn matches(&self, basic_type: BasicType) -> bool {
        match self {
            DataType::Int32 => basic_type == BasicType::Int,
            DataType::Int64 => basic_type == BasicType::Long,
            DataType::Float32 => basic_type == BasicType::Float,
            DataType::Float64 => basic_type == BasicType::Double,
            DataType::Bool => basic_type == BasicType::Boolean,
            DataType::String | DataType::Bytes => {
                basic_type == BasicType::String || basic_type == BasicType::Bytes
            }
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
